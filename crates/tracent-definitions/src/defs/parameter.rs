// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Parameters: named, typed slots whose per-call values distinguish call
//! paths.

use super::string::StringHandle;
use tracent_memory::Handle;

pub type ParameterHandle = Handle<ParameterDef>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    Int64,
    Uint64,
    String,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct ParameterDef {
    pub name: StringHandle,
    pub parameter_type: ParameterType,
}
