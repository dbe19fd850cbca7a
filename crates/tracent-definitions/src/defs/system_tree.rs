// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! The system tree: machines, racks, nodes. Each node names its class
//! ("machine", "node", ...) and points at its parent; roots have none.

use super::string::StringHandle;
use tracent_memory::Handle;

pub type SystemTreeNodeHandle = Handle<SystemTreeNodeDef>;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct SystemTreeNodeDef {
    pub parent: Option<SystemTreeNodeHandle>,
    pub name: StringHandle,
    pub class_name: StringHandle,
}
