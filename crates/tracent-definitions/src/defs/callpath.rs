// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Call paths: region nodes in the call tree, optionally refined by
//! parameter values.

use super::{parameter::ParameterHandle, region::RegionHandle, string::StringHandle};
use tracent_memory::Handle;

pub type CallpathHandle = Handle<CallpathDef>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterValue {
    Int64(i64),
    Uint64(u64),
    String(StringHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallpathParameter {
    pub parameter: ParameterHandle,
    pub value: ParameterValue,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CallpathDef {
    pub parent: Option<CallpathHandle>,
    pub region: RegionHandle,
    pub parameters: Box<[CallpathParameter]>,
}
