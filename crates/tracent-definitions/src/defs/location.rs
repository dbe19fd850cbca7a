// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Locations and location groups. A location group is typically a process,
//! attached to a system tree node; a location is a stream of events within
//! it, typically a thread.

use super::{string::StringHandle, system_tree::SystemTreeNodeHandle};
use tracent_memory::Handle;

pub type LocationGroupHandle = Handle<LocationGroupDef>;
pub type LocationHandle = Handle<LocationDef>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationGroupType {
    Process,
    AcceleratorContext,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct LocationGroupDef {
    pub name: StringHandle,
    pub parent: Option<SystemTreeNodeHandle>,
    pub group_type: LocationGroupType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationType {
    CpuThread,
    AcceleratorStream,
    MetricLocation,
}

/// A location. `global_id` is the process-spanning 64-bit identifier
/// assigned by the measurement system; it, not the sequence number, names
/// the location in event traces.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct LocationDef {
    pub global_id: u64,
    pub name: StringHandle,
    pub location_type: LocationType,
    pub number_of_events: u64,
}
