// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Source files, identified by their (interned) file name.

use super::string::StringHandle;
use tracent_memory::Handle;

pub type SourceFileHandle = Handle<SourceFileDef>;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct SourceFileDef {
    pub name: StringHandle,
}
