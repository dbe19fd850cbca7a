// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sampling sets: the ordered metric tuples recorded together at an event.
//!
//! A scoped sampling set is an alias for a plain one, restricting it to a
//! recorder location and a scope; both variants share one table and one
//! sequence-number space, so a scoped set can stand in wherever a sampling
//! set handle is expected.

use super::{
    location::{LocationGroupHandle, LocationHandle},
    metric::MetricHandle,
    system_tree::SystemTreeNodeHandle,
};
use tracent_memory::Handle;

pub type SamplingSetHandle = Handle<SamplingSetDef>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricOccurrence {
    /// Recorded at every enter and exit.
    SynchronousStrict,
    /// Recorded at enters and exits, but not necessarily all of them.
    Synchronous,
    Asynchronous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplingSetClass {
    Abstract,
    Cpu,
    Gpu,
}

/// What a scoped sampling set is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeRef {
    Location(LocationHandle),
    LocationGroup(LocationGroupHandle),
    SystemTreeNode(SystemTreeNodeHandle),
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum SamplingSetDef {
    Plain {
        metrics: Box<[MetricHandle]>,
        occurrence: MetricOccurrence,
        class: SamplingSetClass,
    },
    Scoped {
        sampling_set: SamplingSetHandle,
        recorder: LocationHandle,
        scope: ScopeRef,
    },
}

impl SamplingSetDef {
    pub fn is_scoped(&self) -> bool {
        matches!(self, SamplingSetDef::Scoped { .. })
    }
}
