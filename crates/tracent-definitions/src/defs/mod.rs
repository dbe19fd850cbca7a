// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! The definition payload types, one module per family.
//!
//! Payloads hold only plain data and handles into sibling tables; all
//! creation protocols live on [`crate::DefinitionManager`]. Reference
//! fields always point at definitions of the same manager.

pub mod attribute;
pub mod callpath;
pub mod calling_context;
pub mod communicator;
pub mod group;
pub mod io;
pub mod location;
pub mod metric;
pub mod parameter;
pub mod region;
pub mod rma_window;
pub mod sampling_set;
pub mod source_file;
pub mod string;
pub mod system_tree;
pub mod topology;

pub use attribute::{AttributeDef, AttributeHandle, AttributeType};
pub use callpath::{
    CallpathDef, CallpathHandle, CallpathParameter, ParameterValue,
};
pub use calling_context::{
    CallingContextDef, CallingContextHandle, SourceCodeLocationDef, SourceCodeLocationHandle,
};
pub use communicator::{
    CommunicatorDef, CommunicatorHandle, CommunicatorPayload, InterimCommunicatorDef,
    InterimCommunicatorHandle,
};
pub use group::{GroupDef, GroupHandle, GroupType};
pub use io::{IoFileDef, IoFileHandle, IoHandleDef, IoHandleFlags, IoHandleHandle, IoParadigm};
pub use location::{
    LocationDef, LocationGroupDef, LocationGroupHandle, LocationGroupType, LocationHandle,
    LocationType,
};
pub use metric::{
    MetricBase, MetricDef, MetricHandle, MetricMode, MetricProfilingType, MetricSourceType,
    MetricValueType,
};
pub use parameter::{ParameterDef, ParameterHandle, ParameterType};
pub use region::{RegionDef, RegionHandle, RegionType, INVALID_LINE_NO};
pub use rma_window::{RmaWindowDef, RmaWindowHandle};
pub use sampling_set::{
    MetricOccurrence, SamplingSetClass, SamplingSetDef, SamplingSetHandle, ScopeRef,
};
pub use source_file::{SourceFileDef, SourceFileHandle};
pub use string::{StringDef, StringHandle};
pub use system_tree::{SystemTreeNodeDef, SystemTreeNodeHandle};
pub use topology::{
    CartesianCoordsDef, CartesianCoordsHandle, CartesianDimension, CartesianTopologyDef,
    CartesianTopologyHandle, TopologyRecorder,
};

/// The programming model a definition originates from. Used to attribute
/// regions and communicators to their adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Paradigm {
    User,
    Compiler,
    Sampling,
    Openmp,
    Pthread,
    Mpi,
    Shmem,
    Cuda,
    Opencl,
    Io,
    Measurement,
}
