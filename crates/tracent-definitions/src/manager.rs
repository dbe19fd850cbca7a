// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! The definition manager: one table per definition type, each behind its
//! own lock so adapters on different threads can register concurrently.
//!
//! Creation protocols come in two flavors. `new_string`, `new_metric` and
//! the other hash-consing operations probe under a read lock first and only
//! take the write lock on a miss, re-checking under it. Append-only
//! operations (`new_region`, `new_location`, ...) take the write lock
//! directly; their callers guarantee at-most-once registration.
//!
//! Lock order: the string table lock is always taken and released before
//! the target table's lock, never nested inside it.

use crate::defs::*;
use crate::table::DefinitionTable;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

/// Creation-time description of a region. String fields fall back to
/// defaults: a missing name becomes `"<unknown region>"`, a missing
/// canonical name becomes the name, a missing description the empty string.
pub struct RegionSpec<'a> {
    pub name: Option<&'a str>,
    pub canonical_name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub region_type: RegionType,
    pub file_name: Option<&'a str>,
    pub begin_line: u32,
    pub end_line: u32,
    pub paradigm: Paradigm,
}

/// Creation-time description of a metric.
pub struct MetricSpec<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub source_type: MetricSourceType,
    pub mode: MetricMode,
    pub value_type: MetricValueType,
    pub base: MetricBase,
    pub exponent: i64,
    pub unit: &'a str,
    pub profiling_type: MetricProfilingType,
}

pub struct DefinitionManager {
    pub strings: RwLock<DefinitionTable<StringDef>>,
    pub source_files: RwLock<DefinitionTable<SourceFileDef>>,
    pub regions: RwLock<DefinitionTable<RegionDef>>,
    pub groups: RwLock<DefinitionTable<GroupDef>>,
    pub system_tree_nodes: RwLock<DefinitionTable<SystemTreeNodeDef>>,
    pub location_groups: RwLock<DefinitionTable<LocationGroupDef>>,
    pub locations: RwLock<DefinitionTable<LocationDef>>,
    pub metrics: RwLock<DefinitionTable<MetricDef>>,
    pub sampling_sets: RwLock<DefinitionTable<SamplingSetDef>>,
    pub parameters: RwLock<DefinitionTable<ParameterDef>>,
    pub callpaths: RwLock<DefinitionTable<CallpathDef>>,
    pub source_code_locations: RwLock<DefinitionTable<SourceCodeLocationDef>>,
    pub calling_contexts: RwLock<DefinitionTable<CallingContextDef>>,
    pub attributes: RwLock<DefinitionTable<AttributeDef>>,
    pub communicators: RwLock<DefinitionTable<CommunicatorDef>>,
    pub interim_communicators: RwLock<DefinitionTable<InterimCommunicatorDef>>,
    pub rma_windows: RwLock<DefinitionTable<RmaWindowDef>>,
    pub cartesian_topologies: RwLock<DefinitionTable<CartesianTopologyDef>>,
    pub cartesian_coords: RwLock<DefinitionTable<CartesianCoordsDef>>,
    pub io_files: RwLock<DefinitionTable<IoFileDef>>,
    pub io_handles: RwLock<DefinitionTable<IoHandleDef>>,
}

impl DefinitionManager {
    /// A manager for the measurement phase. Types adapters may register
    /// redundantly get a dedup index; types registered at most once per
    /// entity are append-only.
    pub fn new() -> Self {
        DefinitionManager {
            strings: RwLock::new(DefinitionTable::with_dedup("String")),
            source_files: RwLock::new(DefinitionTable::with_dedup("SourceFile")),
            regions: RwLock::new(DefinitionTable::new("Region")),
            groups: RwLock::new(DefinitionTable::with_dedup("Group")),
            system_tree_nodes: RwLock::new(DefinitionTable::new("SystemTreeNode")),
            location_groups: RwLock::new(DefinitionTable::new("LocationGroup")),
            locations: RwLock::new(DefinitionTable::new("Location")),
            metrics: RwLock::new(DefinitionTable::with_dedup("Metric")),
            sampling_sets: RwLock::new(DefinitionTable::with_dedup("SamplingSet")),
            parameters: RwLock::new(DefinitionTable::with_dedup("Parameter")),
            callpaths: RwLock::new(DefinitionTable::new("Callpath")),
            source_code_locations: RwLock::new(DefinitionTable::with_dedup("SourceCodeLocation")),
            calling_contexts: RwLock::new(DefinitionTable::new("CallingContext")),
            attributes: RwLock::new(DefinitionTable::with_dedup("Attribute")),
            communicators: RwLock::new(DefinitionTable::with_dedup("Communicator")),
            interim_communicators: RwLock::new(DefinitionTable::with_dedup("InterimCommunicator")),
            rma_windows: RwLock::new(DefinitionTable::with_dedup("RmaWindow")),
            cartesian_topologies: RwLock::new(DefinitionTable::new("CartesianTopology")),
            cartesian_coords: RwLock::new(DefinitionTable::new("CartesianCoords")),
            io_files: RwLock::new(DefinitionTable::with_dedup("IoFile")),
            io_handles: RwLock::new(DefinitionTable::with_dedup("IoHandle")),
        }
    }

    /// A manager for the unified definitions. Every table gets a dedup
    /// index, since unification hash-conses all types.
    pub fn new_unified() -> Self {
        DefinitionManager {
            strings: RwLock::new(DefinitionTable::with_dedup("String")),
            source_files: RwLock::new(DefinitionTable::with_dedup("SourceFile")),
            regions: RwLock::new(DefinitionTable::with_dedup("Region")),
            groups: RwLock::new(DefinitionTable::with_dedup("Group")),
            system_tree_nodes: RwLock::new(DefinitionTable::with_dedup("SystemTreeNode")),
            location_groups: RwLock::new(DefinitionTable::with_dedup("LocationGroup")),
            locations: RwLock::new(DefinitionTable::with_dedup("Location")),
            metrics: RwLock::new(DefinitionTable::with_dedup("Metric")),
            sampling_sets: RwLock::new(DefinitionTable::with_dedup("SamplingSet")),
            parameters: RwLock::new(DefinitionTable::with_dedup("Parameter")),
            callpaths: RwLock::new(DefinitionTable::with_dedup("Callpath")),
            source_code_locations: RwLock::new(DefinitionTable::with_dedup("SourceCodeLocation")),
            calling_contexts: RwLock::new(DefinitionTable::with_dedup("CallingContext")),
            attributes: RwLock::new(DefinitionTable::with_dedup("Attribute")),
            communicators: RwLock::new(DefinitionTable::with_dedup("Communicator")),
            interim_communicators: RwLock::new(DefinitionTable::with_dedup("InterimCommunicator")),
            rma_windows: RwLock::new(DefinitionTable::with_dedup("RmaWindow")),
            cartesian_topologies: RwLock::new(DefinitionTable::with_dedup("CartesianTopology")),
            cartesian_coords: RwLock::new(DefinitionTable::with_dedup("CartesianCoords")),
            io_files: RwLock::new(DefinitionTable::with_dedup("IoFile")),
            io_handles: RwLock::new(DefinitionTable::with_dedup("IoHandle")),
        }
    }

    // ---------------------------------------------------------------------
    // Strings and source files

    /// Interns a string. The hit path takes only the read lock; a miss
    /// upgrades to the write lock and re-probes, since another thread may
    /// have interned the same string in between.
    pub fn new_string(&self, content: &str) -> StringHandle {
        {
            let strings = self.strings.read();
            let hash = strings.hash_value(content);
            if let Some(handle) = strings.find_hashed(hash, |existing| existing.content() == content)
            {
                return handle;
            }
        }
        self.strings.write().intern_str(content)
    }

    /// The interned text of a string definition.
    pub fn string(&self, handle: StringHandle) -> MappedRwLockReadGuard<'_, str> {
        RwLockReadGuard::map(self.strings.read(), |strings| {
            strings.get(handle).payload().content()
        })
    }

    pub fn new_source_file(&self, name: &str) -> SourceFileHandle {
        let name = self.new_string(name);
        self.source_files.write().intern(SourceFileDef { name }).0
    }

    // ---------------------------------------------------------------------
    // Regions

    /// Registers a region. Regions are appended unconditionally: every
    /// instrumented code location registers itself exactly once, and
    /// distinct instrumentation points stay distinct even when their
    /// descriptions coincide.
    pub fn new_region(&self, spec: RegionSpec<'_>) -> RegionHandle {
        let name = self.new_string(spec.name.unwrap_or("<unknown region>"));
        let canonical_name = match spec.canonical_name {
            Some(canonical) => self.new_string(canonical),
            None => name,
        };
        let description = self.new_string(spec.description.unwrap_or(""));
        let file_name = spec.file_name.map(|file| self.new_string(file));

        self.regions.write().append(RegionDef {
            name,
            canonical_name,
            description,
            region_type: spec.region_type,
            file_name,
            begin_line: spec.begin_line,
            end_line: spec.end_line,
            paradigm: spec.paradigm,
            group_name: None,
        })
    }

    pub fn region(&self, handle: RegionHandle) -> MappedRwLockReadGuard<'_, RegionDef> {
        RwLockReadGuard::map(self.regions.read(), |regions| {
            regions.get(handle).payload()
        })
    }

    /// Assigns the profiling group of a region, at most once. A second
    /// assignment is ignored with a warning.
    pub fn region_set_group(&self, handle: RegionHandle, group_name: &str) {
        let group_name = self.new_string(group_name);
        let mut regions = self.regions.write();
        let region = regions.get_mut(handle).payload_mut();
        if region.group_name.is_some() {
            log::warn!("ignoring group reassignment of region {}", handle.index());
            return;
        }
        region.group_name = Some(group_name);
    }

    // ---------------------------------------------------------------------
    // System tree, location groups, locations

    pub fn new_system_tree_node(
        &self,
        parent: Option<SystemTreeNodeHandle>,
        class_name: &str,
        name: &str,
    ) -> SystemTreeNodeHandle {
        let name = self.new_string(name);
        let class_name = self.new_string(class_name);
        self.system_tree_nodes.write().append(SystemTreeNodeDef {
            parent,
            name,
            class_name,
        })
    }

    pub fn new_location_group(
        &self,
        name: &str,
        parent: Option<SystemTreeNodeHandle>,
        group_type: LocationGroupType,
    ) -> LocationGroupHandle {
        let name = self.new_string(name);
        self.location_groups.write().append(LocationGroupDef {
            name,
            parent,
            group_type,
        })
    }

    pub fn new_location(
        &self,
        global_id: u64,
        name: &str,
        location_type: LocationType,
    ) -> LocationHandle {
        let name = self.new_string(name);
        self.locations.write().append(LocationDef {
            global_id,
            name,
            location_type,
            number_of_events: 0,
        })
    }

    /// Records the final event count of a location, at measurement end.
    pub fn location_set_number_of_events(&self, handle: LocationHandle, number_of_events: u64) {
        let mut locations = self.locations.write();
        locations.get_mut(handle).payload_mut().number_of_events = number_of_events;
    }

    // ---------------------------------------------------------------------
    // Groups, metrics, sampling sets

    pub fn new_group(&self, group_type: GroupType, name: &str, members: Vec<u64>) -> GroupHandle {
        let name = self.new_string(name);
        self.groups
            .write()
            .intern(GroupDef {
                group_type,
                name,
                members: members.into_boxed_slice(),
            })
            .0
    }

    pub fn new_metric(&self, spec: MetricSpec<'_>) -> MetricHandle {
        let name = self.new_string(spec.name);
        let description = self.new_string(spec.description);
        let unit = self.new_string(spec.unit);
        self.metrics
            .write()
            .intern(MetricDef {
                name,
                description,
                source_type: spec.source_type,
                mode: spec.mode,
                value_type: spec.value_type,
                base: spec.base,
                exponent: spec.exponent,
                unit,
                profiling_type: spec.profiling_type,
            })
            .0
    }

    pub fn new_sampling_set(
        &self,
        metrics: &[MetricHandle],
        occurrence: MetricOccurrence,
        class: SamplingSetClass,
    ) -> SamplingSetHandle {
        self.sampling_sets
            .write()
            .intern(SamplingSetDef::Plain {
                metrics: metrics.into(),
                occurrence,
                class,
            })
            .0
    }

    /// Registers a scoped alias of a sampling set. The referenced set must
    /// itself be plain.
    pub fn new_scoped_sampling_set(
        &self,
        sampling_set: SamplingSetHandle,
        recorder: LocationHandle,
        scope: ScopeRef,
    ) -> SamplingSetHandle {
        let mut sampling_sets = self.sampling_sets.write();
        assert!(
            !sampling_sets.get(sampling_set).payload().is_scoped(),
            "scoped sampling set {} may not alias another scoped set",
            sampling_set.index()
        );
        sampling_sets
            .intern(SamplingSetDef::Scoped {
                sampling_set,
                recorder,
                scope,
            })
            .0
    }

    /// Resolves a possibly scoped sampling set to the plain set it records.
    pub fn sampling_set_of(&self, handle: SamplingSetHandle) -> SamplingSetHandle {
        let sampling_sets = self.sampling_sets.read();
        match sampling_sets.get(handle).payload() {
            SamplingSetDef::Scoped { sampling_set, .. } => *sampling_set,
            SamplingSetDef::Plain { .. } => handle,
        }
    }

    // ---------------------------------------------------------------------
    // Call paths, calling contexts

    pub fn new_parameter(&self, name: &str, parameter_type: ParameterType) -> ParameterHandle {
        let name = self.new_string(name);
        self.parameters
            .write()
            .intern(ParameterDef {
                name,
                parameter_type,
            })
            .0
    }

    pub fn new_callpath(
        &self,
        parent: Option<CallpathHandle>,
        region: RegionHandle,
        parameters: Vec<CallpathParameter>,
    ) -> CallpathHandle {
        self.callpaths.write().append(CallpathDef {
            parent,
            region,
            parameters: parameters.into_boxed_slice(),
        })
    }

    pub fn new_source_code_location(&self, file: &str, line: u32) -> SourceCodeLocationHandle {
        let file = self.new_string(file);
        self.source_code_locations
            .write()
            .intern(SourceCodeLocationDef { file, line })
            .0
    }

    pub fn new_calling_context(
        &self,
        region: RegionHandle,
        source_code_location: Option<SourceCodeLocationHandle>,
        ip_offset: u64,
        parent: Option<CallingContextHandle>,
    ) -> CallingContextHandle {
        self.calling_contexts.write().append(CallingContextDef {
            region,
            source_code_location,
            ip_offset,
            parent,
        })
    }

    pub fn new_attribute(
        &self,
        name: &str,
        description: &str,
        attribute_type: AttributeType,
    ) -> AttributeHandle {
        let name = self.new_string(name);
        let description = self.new_string(description);
        self.attributes
            .write()
            .intern(AttributeDef {
                name,
                description,
                attribute_type,
            })
            .0
    }

    // ---------------------------------------------------------------------
    // Communicators, RMA windows

    pub fn new_communicator(
        &self,
        group: GroupHandle,
        name: Option<&str>,
        parent: Option<CommunicatorHandle>,
    ) -> CommunicatorHandle {
        let name = name.map(|name| self.new_string(name));
        self.communicators
            .write()
            .intern(CommunicatorDef {
                group,
                name,
                parent,
            })
            .0
    }

    /// Registers an interim communicator under its paradigm-specific
    /// payload. On a dedup hit the candidate payload is dropped.
    pub fn new_interim_communicator(
        &self,
        parent: Option<InterimCommunicatorHandle>,
        paradigm: Paradigm,
        payload: Box<dyn CommunicatorPayload>,
    ) -> InterimCommunicatorHandle {
        self.interim_communicators
            .write()
            .intern(InterimCommunicatorDef {
                parent,
                paradigm,
                name: None,
                payload,
            })
            .0
    }

    /// Names an interim communicator, at most once. Later assignments are
    /// ignored with a warning; the name is not part of the identity.
    pub fn interim_communicator_set_name(&self, handle: InterimCommunicatorHandle, name: &str) {
        let name = self.new_string(name);
        let mut interim_communicators = self.interim_communicators.write();
        let communicator = interim_communicators.get_mut(handle).payload_mut();
        if communicator.name.is_some() {
            log::warn!(
                "ignoring renaming of interim communicator {}",
                handle.index()
            );
            return;
        }
        communicator.name = Some(name);
    }

    pub fn new_rma_window(&self, name: &str, communicator: CommunicatorHandle) -> RmaWindowHandle {
        let name = self.new_string(name);
        self.rma_windows
            .write()
            .intern(RmaWindowDef { name, communicator })
            .0
    }

    // ---------------------------------------------------------------------
    // Topologies

    /// Creates a topology from fully staged dimensions. Adapters normally
    /// go through [`TopologyRecorder`] instead of calling this directly.
    pub fn new_cartesian_topology(
        &self,
        name: &str,
        dimensions: Vec<CartesianDimension>,
    ) -> CartesianTopologyHandle {
        let name = self.new_string(name);
        self.cartesian_topologies.write().append(CartesianTopologyDef {
            name,
            dimensions: dimensions.into_boxed_slice(),
        })
    }

    /// Records the coordinates of one rank/thread. Aborts when the
    /// coordinate count does not match the topology's dimension count.
    pub fn new_cartesian_coords(
        &self,
        topology: CartesianTopologyHandle,
        rank: u32,
        thread: u32,
        coords: Vec<u32>,
    ) -> CartesianCoordsHandle {
        let dimension_count = {
            let topologies = self.cartesian_topologies.read();
            topologies.get(topology).payload().dimensions.len()
        };
        assert!(
            coords.len() == dimension_count,
            "coordinates for rank {} have {} entries but the topology has {} dimensions",
            rank,
            coords.len(),
            dimension_count
        );
        self.cartesian_coords.write().append(CartesianCoordsDef {
            topology,
            rank,
            thread,
            coords: coords.into_boxed_slice(),
        })
    }

    // ---------------------------------------------------------------------
    // I/O

    pub fn new_io_file(&self, file_name: &str) -> IoFileHandle {
        let file_name = self.new_string(file_name);
        self.io_files.write().intern(IoFileDef { file_name }).0
    }

    /// Registers an I/O handle in its incomplete state. `name` and `file`
    /// may still be placeholders until [`Self::io_handle_complete`].
    pub fn new_io_handle(
        &self,
        name: &str,
        file: Option<IoFileHandle>,
        paradigm: IoParadigm,
        flags: IoHandleFlags,
        scope: Option<CommunicatorHandle>,
        parent: Option<IoHandleHandle>,
    ) -> IoHandleHandle {
        let name = self.new_string(name);
        self.io_handles
            .write()
            .intern(IoHandleDef {
                name,
                file,
                paradigm,
                flags,
                scope,
                parent,
                completed: false,
            })
            .0
    }

    /// Completes an I/O handle with its final name and file. Aborts on a
    /// second completion.
    pub fn io_handle_complete(
        &self,
        handle: IoHandleHandle,
        name: &str,
        file: Option<IoFileHandle>,
    ) {
        let name = self.new_string(name);
        let mut io_handles = self.io_handles.write();
        let io_handle = io_handles.get_mut(handle).payload_mut();
        assert!(
            !io_handle.completed,
            "completing an already completed I/O handle {}",
            handle.index()
        );
        io_handle.name = name;
        io_handle.file = file;
        io_handle.completed = true;
    }
}

impl Default for DefinitionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::assert_some_eq;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn function_region(manager: &DefinitionManager, name: &str) -> RegionHandle {
        manager.new_region(RegionSpec {
            name: Some(name),
            canonical_name: None,
            description: None,
            region_type: RegionType::Function,
            file_name: Some("main.c"),
            begin_line: 10,
            end_line: 20,
            paradigm: Paradigm::Compiler,
        })
    }

    #[test]
    fn strings_are_shared_across_definition_types() {
        let manager = DefinitionManager::new();
        let file = manager.new_source_file("main.c");
        let region = function_region(&manager, "main.c");

        let file_name = manager.source_files.read().get(file).payload().name;
        assert_eq!(manager.region(region).name, file_name);
        assert_eq!(&*manager.string(file_name), "main.c");
    }

    #[test]
    fn region_fields_fall_back_to_defaults() {
        let manager = DefinitionManager::new();
        let region = manager.new_region(RegionSpec {
            name: None,
            canonical_name: None,
            description: None,
            region_type: RegionType::Unknown,
            file_name: None,
            begin_line: INVALID_LINE_NO,
            end_line: INVALID_LINE_NO,
            paradigm: Paradigm::User,
        });

        let (name, canonical, description) = {
            let region = manager.region(region);
            (region.name, region.canonical_name, region.description)
        };
        assert_eq!(&*manager.string(name), "<unknown region>");
        assert_eq!(canonical, name);
        assert_eq!(&*manager.string(description), "");
    }

    #[test]
    fn regions_are_never_deduplicated_locally() {
        let manager = DefinitionManager::new();
        let a = function_region(&manager, "work");
        let b = function_region(&manager, "work");
        assert_ne!(a, b);
        assert_eq!(manager.regions.read().len(), 2);
    }

    #[test]
    fn region_group_is_set_once() {
        let manager = DefinitionManager::new();
        let region = function_region(&manager, "work");
        manager.region_set_group(region, "USR");
        let first = manager.region(region).group_name;
        manager.region_set_group(region, "OMP");
        assert_eq!(manager.region(region).group_name, first);
        assert_eq!(&*manager.string(first.unwrap()), "USR");
    }

    #[test]
    fn scoped_sampling_sets_resolve_to_their_plain_set() {
        let manager = DefinitionManager::new();
        let metric = manager.new_metric(MetricSpec {
            name: "PAPI_TOT_CYC",
            description: "total cycles",
            source_type: MetricSourceType::Papi,
            mode: MetricMode::AccumulatedStart,
            value_type: MetricValueType::Uint64,
            base: MetricBase::Decimal,
            exponent: 0,
            unit: "#",
            profiling_type: MetricProfilingType::Exclusive,
        });
        let plain = manager.new_sampling_set(
            &[metric],
            MetricOccurrence::SynchronousStrict,
            SamplingSetClass::Cpu,
        );
        let location = manager.new_location(0, "Master thread", LocationType::CpuThread);
        let scoped =
            manager.new_scoped_sampling_set(plain, location, ScopeRef::Location(location));

        assert_ne!(plain, scoped);
        assert_eq!(manager.sampling_set_of(scoped), plain);
        assert_eq!(manager.sampling_set_of(plain), plain);
    }

    #[test]
    #[should_panic(expected = "may not alias another scoped set")]
    fn scoped_sampling_sets_do_not_nest() {
        let manager = DefinitionManager::new();
        let plain =
            manager.new_sampling_set(&[], MetricOccurrence::Synchronous, SamplingSetClass::Cpu);
        let location = manager.new_location(0, "Master thread", LocationType::CpuThread);
        let scoped =
            manager.new_scoped_sampling_set(plain, location, ScopeRef::Location(location));
        manager.new_scoped_sampling_set(scoped, location, ScopeRef::Location(location));
    }

    #[test]
    fn io_handle_completion_is_exactly_once() {
        let manager = DefinitionManager::new();
        let handle = manager.new_io_handle(
            "",
            None,
            IoParadigm::Posix,
            IoHandleFlags::NONE,
            None,
            None,
        );
        let file = manager.new_io_file("/tmp/out.dat");
        manager.io_handle_complete(handle, "out", Some(file));

        let payload = manager.io_handles.read().get(handle).payload().clone();
        assert!(payload.completed);
        assert_some_eq!(payload.file, file);
        assert_eq!(&*manager.string(payload.name), "out");
    }

    #[test]
    #[should_panic(expected = "already completed I/O handle")]
    fn double_completion_aborts() {
        let manager = DefinitionManager::new();
        let handle = manager.new_io_handle(
            "",
            None,
            IoParadigm::Posix,
            IoHandleFlags::NONE,
            None,
            None,
        );
        manager.io_handle_complete(handle, "out", None);
        manager.io_handle_complete(handle, "out", None);
    }

    #[derive(Debug, Clone)]
    struct Token(u64);
    impl CommunicatorPayload for Token {
        fn payload_hash(&self) -> u64 {
            self.0
        }
        fn payload_eq(&self, other: &dyn CommunicatorPayload) -> bool {
            other
                .as_any()
                .downcast_ref::<Token>()
                .is_some_and(|other| self.0 == other.0)
        }
        fn boxed_clone(&self) -> Box<dyn CommunicatorPayload> {
            Box::new(self.clone())
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[test]
    fn interim_communicator_name_is_set_once() {
        let manager = DefinitionManager::new();
        let a = manager.new_interim_communicator(None, Paradigm::Mpi, Box::new(Token(42)));
        let b = manager.new_interim_communicator(None, Paradigm::Mpi, Box::new(Token(42)));
        assert_eq!(a, b);

        manager.interim_communicator_set_name(a, "MPI_COMM_WORLD");
        manager.interim_communicator_set_name(a, "renamed");
        let name = manager
            .interim_communicators
            .read()
            .get(a)
            .payload()
            .name
            .unwrap();
        assert_eq!(&*manager.string(name), "MPI_COMM_WORLD");
    }

    #[test]
    #[should_panic(expected = "the topology has 3 dimensions")]
    fn coordinate_arity_is_checked() {
        let manager = DefinitionManager::new();
        let mut recorder = TopologyRecorder::new("grid", 3);
        recorder.add_dimension(&manager, "x", 4, true);
        recorder.add_dimension(&manager, "y", 4, true);
        recorder.add_dimension(&manager, "z", 2, false);
        let topology = recorder.initialize(&manager);
        manager.new_cartesian_coords(topology, 0, 0, vec![0, 1]);
    }

    #[test]
    #[should_panic(expected = "declared 3 dimensions but 2 were added")]
    fn topology_dimension_count_is_checked() {
        let manager = DefinitionManager::new();
        let mut recorder = TopologyRecorder::new("grid", 3);
        recorder.add_dimension(&manager, "x", 4, true);
        recorder.add_dimension(&manager, "y", 4, true);
        recorder.initialize(&manager);
    }

    #[test]
    fn concurrent_interning_yields_one_definition_per_distinct_string() {
        for thread_count in [1usize, 2, 8] {
            let manager = Arc::new(DefinitionManager::new());
            let names: Vec<String> = (0..64).map(|i| format!("region_{i}")).collect();

            let handles: Vec<_> = (0..thread_count)
                .map(|_| {
                    let manager = Arc::clone(&manager);
                    let names = names.clone();
                    std::thread::spawn(move || {
                        let mut seen = Vec::new();
                        for _ in 0..10 {
                            for name in &names {
                                seen.push(manager.new_string(name));
                            }
                        }
                        seen
                    })
                })
                .collect();

            let per_thread: Vec<Vec<StringHandle>> =
                handles.into_iter().map(|h| h.join().unwrap()).collect();

            assert_eq!(manager.strings.read().len(), 64);
            for seen in &per_thread {
                assert_eq!(seen[..64], per_thread[0][..64]);
            }
        }
    }

    #[test]
    fn concurrent_metric_registration_deduplicates() {
        let manager = Arc::new(DefinitionManager::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || {
                    manager.new_metric(MetricSpec {
                        name: "PAPI_L2_DCM",
                        description: "L2 data cache misses",
                        source_type: MetricSourceType::Papi,
                        mode: MetricMode::AccumulatedStart,
                        value_type: MetricValueType::Uint64,
                        base: MetricBase::Decimal,
                        exponent: 0,
                        unit: "#",
                        profiling_type: MetricProfilingType::Exclusive,
                    })
                })
            })
            .collect();

        let metrics: Vec<MetricHandle> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(manager.metrics.read().len(), 1);
        assert!(metrics.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn concurrent_interim_communicator_registration_deduplicates() {
        let manager = Arc::new(DefinitionManager::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || {
                    let mut seen = Vec::new();
                    for _ in 0..100 {
                        seen.push(manager.new_interim_communicator(
                            None,
                            Paradigm::Mpi,
                            Box::new(Token(42)),
                        ));
                    }
                    seen
                })
            })
            .collect();

        let per_thread: Vec<Vec<InterimCommunicatorHandle>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(manager.interim_communicators.read().len(), 1);
        let first = per_thread[0][0];
        assert!(per_thread.iter().flatten().all(|&h| h == first));
    }

    proptest! {
        #[test]
        fn interning_any_strings_is_idempotent(contents in proptest::collection::vec(".*", 1..32)) {
            let manager = DefinitionManager::new();
            let first: Vec<StringHandle> =
                contents.iter().map(|s| manager.new_string(s)).collect();
            let second: Vec<StringHandle> =
                contents.iter().map(|s| manager.new_string(s)).collect();
            prop_assert_eq!(&first, &second);

            let distinct: std::collections::HashSet<&String> = contents.iter().collect();
            prop_assert_eq!(manager.strings.read().len() as usize, distinct.len());

            for (content, handle) in contents.iter().zip(&first) {
                prop_assert_eq!(&*manager.string(*handle), content.as_str());
            }
        }
    }
}
