// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Groups: ordered member lists over locations, regions, metrics or
//! communication ranks. Members are raw 64-bit identifiers whose meaning
//! depends on the group type.

use super::string::StringHandle;
use tracent_memory::Handle;

pub type GroupHandle = Handle<GroupDef>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupType {
    Unknown,
    Locations,
    Regions,
    Metric,
    MpiGroup,
    MpiSelf,
    CommLocations,
    CommGroup,
    CommSelf,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct GroupDef {
    pub group_type: GroupType,
    pub name: StringHandle,
    pub members: Box<[u64]>,
}
