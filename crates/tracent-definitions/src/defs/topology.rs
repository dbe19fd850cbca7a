// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cartesian topologies and per-rank coordinates.
//!
//! Adapters declare a topology with a fixed dimension count, then feed the
//! dimensions one by one before initializing it; the [`TopologyRecorder`]
//! staging type enforces that protocol.

use super::string::StringHandle;
use crate::manager::DefinitionManager;
use tracent_memory::Handle;

pub type CartesianTopologyHandle = Handle<CartesianTopologyDef>;
pub type CartesianCoordsHandle = Handle<CartesianCoordsDef>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CartesianDimension {
    pub name: StringHandle,
    pub size: u32,
    pub periodic: bool,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CartesianTopologyDef {
    pub name: StringHandle,
    pub dimensions: Box<[CartesianDimension]>,
}

/// Coordinates of one rank/thread within a topology. One definition per
/// participant, never deduplicated.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CartesianCoordsDef {
    pub topology: CartesianTopologyHandle,
    pub rank: u32,
    pub thread: u32,
    pub coords: Box<[u32]>,
}

/// Staging area for a topology under construction.
pub struct TopologyRecorder {
    name: String,
    declared_dimensions: usize,
    dimensions: Vec<CartesianDimension>,
    handle: Option<CartesianTopologyHandle>,
}

impl TopologyRecorder {
    pub fn new(name: impl Into<String>, declared_dimensions: usize) -> Self {
        TopologyRecorder {
            name: name.into(),
            declared_dimensions,
            dimensions: Vec::with_capacity(declared_dimensions),
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records the next dimension. Adding after initialization is a
    /// soft error and leaves the topology unchanged.
    pub fn add_dimension(
        &mut self,
        manager: &DefinitionManager,
        name: &str,
        size: u32,
        periodic: bool,
    ) {
        if self.handle.is_some() {
            log::warn!(
                "ignoring dimension {:?} added to already initialized topology {:?}",
                name,
                self.name
            );
            return;
        }
        let name = manager.new_string(name);
        self.dimensions.push(CartesianDimension {
            name,
            size,
            periodic,
        });
    }

    /// Creates the topology definition from the recorded dimensions.
    ///
    /// Aborts when called twice or when the number of recorded dimensions
    /// does not match the declared count.
    pub fn initialize(&mut self, manager: &DefinitionManager) -> CartesianTopologyHandle {
        assert!(
            self.handle.is_none(),
            "re-initialization of topology {:?}",
            self.name
        );
        assert!(
            self.dimensions.len() == self.declared_dimensions,
            "topology {:?} declared {} dimensions but {} were added",
            self.name,
            self.declared_dimensions,
            self.dimensions.len()
        );
        let handle = manager.new_cartesian_topology(&self.name, self.dimensions.clone());
        self.handle = Some(handle);
        handle
    }

    /// The created topology, once [`Self::initialize`] has run.
    pub fn handle(&self) -> Option<CartesianTopologyHandle> {
        self.handle
    }
}
