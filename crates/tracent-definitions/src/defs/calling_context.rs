// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sampling call stacks: source code locations and calling-context nodes.
//! Unlike call paths, calling contexts carry instruction-level detail for
//! unwound stacks.

use super::{region::RegionHandle, string::StringHandle};
use tracent_memory::Handle;

pub type SourceCodeLocationHandle = Handle<SourceCodeLocationDef>;
pub type CallingContextHandle = Handle<CallingContextDef>;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct SourceCodeLocationDef {
    pub file: StringHandle,
    pub line: u32,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CallingContextDef {
    pub region: RegionHandle,
    pub source_code_location: Option<SourceCodeLocationHandle>,
    /// Offset of the sampled instruction within its enclosing region.
    pub ip_offset: u64,
    pub parent: Option<CallingContextHandle>,
}
