// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! The unification pass.
//!
//! Each local manager is folded into the unified manager one definition
//! type at a time, in an order where every cross-type reference points at
//! a type processed earlier. Within a type, records are walked in sequence
//! order, so intra-type parent links (system tree, call paths, I/O handle
//! hierarchies) are already resolved when a child is reached: a parent is
//! always created before its children.
//!
//! For every local record the pass builds a candidate payload with all
//! handles rewritten to unified ones, hash-conses it into the unified
//! table, and stores the resulting handle as the record's unified link.
//! Afterwards the links are flattened into per-type mapping arrays for the
//! writers.

use crate::policy::UnifyPolicy;
use tracent_definitions::defs::*;
use tracent_definitions::DefinitionManager;

/// Merges the local managers into a fresh unified manager.
///
/// The empty string is interned first, so it gets global sequence number 0
/// in every measurement regardless of what the locals contain.
pub fn unify(locals: &mut [&mut DefinitionManager], policy: &UnifyPolicy) -> DefinitionManager {
    let mut unified = DefinitionManager::new_unified();
    unified.strings.get_mut().intern_str("");

    for local in locals.iter_mut() {
        unify_manager(local, &mut unified, policy);
    }
    for local in locals.iter_mut() {
        allocate_mappings(local);
    }
    unified
}

fn unify_manager(
    local: &mut DefinitionManager,
    unified: &mut DefinitionManager,
    policy: &UnifyPolicy,
) {
    unify_strings(local, unified);
    unify_system_tree_nodes(local, unified);
    unify_location_groups(local, unified);
    unify_locations(local, unified);
    unify_source_files(local, unified);
    unify_regions(local, unified, policy);
    unify_groups(local, unified);
    unify_communicators(local, unified);
    unify_interim_communicators(local, unified);
    unify_rma_windows(local, unified);
    unify_metrics(local, unified);
    unify_sampling_sets(local, unified);
    unify_parameters(local, unified);
    unify_callpaths(local, unified);
    unify_source_code_locations(local, unified);
    unify_calling_contexts(local, unified);
    unify_attributes(local, unified);
    unify_cartesian_topologies(local, unified);
    unify_cartesian_coords(local, unified);
    unify_io_files(local, unified);
    unify_io_handles(local, unified);
}

/// Allocates and fills the local→global mapping arrays of every table.
pub fn allocate_mappings(local: &mut DefinitionManager) {
    macro_rules! fill {
        ($($table:ident),* $(,)?) => {$(
            let table = local.$table.get_mut();
            table.alloc_mapping();
            table.assign_mapping_from_unified();
        )*};
    }
    fill!(
        strings,
        source_files,
        regions,
        groups,
        system_tree_nodes,
        location_groups,
        locations,
        metrics,
        sampling_sets,
        parameters,
        callpaths,
        source_code_locations,
        calling_contexts,
        attributes,
        communicators,
        interim_communicators,
        rma_windows,
        cartesian_topologies,
        cartesian_coords,
        io_files,
        io_handles,
    );
}

/// Releases every mapping array once the writers are done with them.
pub fn free_mappings(local: &mut DefinitionManager) {
    macro_rules! free {
        ($($table:ident),* $(,)?) => {$(
            local.$table.get_mut().free_mapping();
        )*};
    }
    free!(
        strings,
        source_files,
        regions,
        groups,
        system_tree_nodes,
        location_groups,
        locations,
        metrics,
        sampling_sets,
        parameters,
        callpaths,
        source_code_locations,
        calling_contexts,
        attributes,
        communicators,
        interim_communicators,
        rma_windows,
        cartesian_topologies,
        cartesian_coords,
        io_files,
        io_handles,
    );
}

fn unify_strings(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let src = local.strings.get_mut();
    let dst = unified.strings.get_mut();
    for index in 0..src.len() {
        let content = src.get_at(index).payload().clone();
        let (handle, _) = dst.intern(content);
        src.set_unified_at(index, handle);
    }
}

fn unify_system_tree_nodes(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let src = local.system_tree_nodes.get_mut();
    let dst = unified.system_tree_nodes.get_mut();
    for index in 0..src.len() {
        let node = src.get_at(index).payload().clone();
        let candidate = SystemTreeNodeDef {
            parent: node.parent.map(|parent| src.expect_unified(parent)),
            name: strings.expect_unified(node.name),
            class_name: strings.expect_unified(node.class_name),
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_location_groups(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let system_tree_nodes = local.system_tree_nodes.get_mut();
    let src = local.location_groups.get_mut();
    let dst = unified.location_groups.get_mut();
    for index in 0..src.len() {
        let group = src.get_at(index).payload().clone();
        let candidate = LocationGroupDef {
            name: strings.expect_unified(group.name),
            parent: group
                .parent
                .map(|parent| system_tree_nodes.expect_unified(parent)),
            group_type: group.group_type,
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_locations(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let src = local.locations.get_mut();
    let dst = unified.locations.get_mut();
    for index in 0..src.len() {
        let location = src.get_at(index).payload().clone();
        let candidate = LocationDef {
            name: strings.expect_unified(location.name),
            ..location
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_source_files(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let src = local.source_files.get_mut();
    let dst = unified.source_files.get_mut();
    for index in 0..src.len() {
        let name = strings.expect_unified(src.get_at(index).payload().name);
        let (handle, _) = dst.intern(SourceFileDef { name });
        src.set_unified_at(index, handle);
    }
}

fn unify_regions(
    local: &mut DefinitionManager,
    unified: &mut DefinitionManager,
    policy: &UnifyPolicy,
) {
    let strings = local.strings.get_mut();
    let src = local.regions.get_mut();
    let dst = unified.regions.get_mut();
    let significant = policy.region_paradigm_significant;
    for index in 0..src.len() {
        let region = src.get_at(index).payload().clone();
        let candidate = RegionDef {
            name: strings.expect_unified(region.name),
            canonical_name: strings.expect_unified(region.canonical_name),
            description: strings.expect_unified(region.description),
            region_type: region.region_type,
            file_name: region.file_name.map(|file| strings.expect_unified(file)),
            begin_line: region.begin_line,
            end_line: region.end_line,
            paradigm: region.paradigm,
            group_name: region.group_name.map(|group| strings.expect_unified(group)),
        };
        let hash = dst.hash_with(|state| candidate.identity_hash(state, significant));
        let (handle, _) = dst.find_or_insert_with(
            hash,
            |existing| existing.identity_eq(&candidate, significant),
            || candidate.clone(),
        );
        src.set_unified_at(index, handle);
    }
}

fn unify_groups(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let src = local.groups.get_mut();
    let dst = unified.groups.get_mut();
    for index in 0..src.len() {
        let group = src.get_at(index).payload().clone();
        let candidate = GroupDef {
            name: strings.expect_unified(group.name),
            ..group
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_communicators(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let groups = local.groups.get_mut();
    let src = local.communicators.get_mut();
    let dst = unified.communicators.get_mut();
    for index in 0..src.len() {
        let communicator = src.get_at(index).payload().clone();
        let candidate = CommunicatorDef {
            group: groups.expect_unified(communicator.group),
            name: communicator.name.map(|name| strings.expect_unified(name)),
            parent: communicator
                .parent
                .map(|parent| src.expect_unified(parent)),
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_interim_communicators(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let src = local.interim_communicators.get_mut();
    let dst = unified.interim_communicators.get_mut();
    for index in 0..src.len() {
        let communicator = src.get_at(index).payload().clone();
        let candidate = InterimCommunicatorDef {
            parent: communicator
                .parent
                .map(|parent| src.expect_unified(parent)),
            paradigm: communicator.paradigm,
            name: communicator.name.map(|name| strings.expect_unified(name)),
            payload: communicator.payload,
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_rma_windows(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let communicators = local.communicators.get_mut();
    let src = local.rma_windows.get_mut();
    let dst = unified.rma_windows.get_mut();
    for index in 0..src.len() {
        let window = src.get_at(index).payload().clone();
        let candidate = RmaWindowDef {
            name: strings.expect_unified(window.name),
            communicator: communicators.expect_unified(window.communicator),
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_metrics(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let src = local.metrics.get_mut();
    let dst = unified.metrics.get_mut();
    for index in 0..src.len() {
        let metric = src.get_at(index).payload().clone();
        let candidate = MetricDef {
            name: strings.expect_unified(metric.name),
            description: strings.expect_unified(metric.description),
            unit: strings.expect_unified(metric.unit),
            ..metric
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_sampling_sets(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let metrics = local.metrics.get_mut();
    let locations = local.locations.get_mut();
    let location_groups = local.location_groups.get_mut();
    let system_tree_nodes = local.system_tree_nodes.get_mut();
    let src = local.sampling_sets.get_mut();
    let dst = unified.sampling_sets.get_mut();
    for index in 0..src.len() {
        let sampling_set = src.get_at(index).payload().clone();
        let candidate = match sampling_set {
            SamplingSetDef::Plain {
                metrics: set_metrics,
                occurrence,
                class,
            } => SamplingSetDef::Plain {
                metrics: set_metrics
                    .iter()
                    .map(|&metric| metrics.expect_unified(metric))
                    .collect(),
                occurrence,
                class,
            },
            SamplingSetDef::Scoped {
                sampling_set,
                recorder,
                scope,
            } => {
                // A scoped set is only meaningful if everything it is
                // scoped to made it into the unified definitions; an
                // orphaned one is skipped and stays unmapped.
                let Some(recorder) = locations.unified_of(recorder) else {
                    log::debug!("skipping scoped sampling set {index} with unmapped recorder");
                    continue;
                };
                let scope = match scope {
                    ScopeRef::Location(location) => {
                        locations.unified_of(location).map(ScopeRef::Location)
                    }
                    ScopeRef::LocationGroup(group) => {
                        location_groups.unified_of(group).map(ScopeRef::LocationGroup)
                    }
                    ScopeRef::SystemTreeNode(node) => {
                        system_tree_nodes.unified_of(node).map(ScopeRef::SystemTreeNode)
                    }
                };
                let Some(scope) = scope else {
                    log::debug!("skipping scoped sampling set {index} with unmapped scope");
                    continue;
                };
                SamplingSetDef::Scoped {
                    sampling_set: src.expect_unified(sampling_set),
                    recorder,
                    scope,
                }
            }
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_parameters(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let src = local.parameters.get_mut();
    let dst = unified.parameters.get_mut();
    for index in 0..src.len() {
        let parameter = src.get_at(index).payload().clone();
        let candidate = ParameterDef {
            name: strings.expect_unified(parameter.name),
            ..parameter
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_callpaths(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let regions = local.regions.get_mut();
    let parameters = local.parameters.get_mut();
    let src = local.callpaths.get_mut();
    let dst = unified.callpaths.get_mut();
    for index in 0..src.len() {
        let callpath = src.get_at(index).payload().clone();
        let candidate = CallpathDef {
            parent: callpath.parent.map(|parent| src.expect_unified(parent)),
            region: regions.expect_unified(callpath.region),
            parameters: callpath
                .parameters
                .iter()
                .map(|entry| CallpathParameter {
                    parameter: parameters.expect_unified(entry.parameter),
                    value: match entry.value {
                        ParameterValue::String(string) => {
                            ParameterValue::String(strings.expect_unified(string))
                        }
                        value => value,
                    },
                })
                .collect(),
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_source_code_locations(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let src = local.source_code_locations.get_mut();
    let dst = unified.source_code_locations.get_mut();
    for index in 0..src.len() {
        let location = src.get_at(index).payload().clone();
        let candidate = SourceCodeLocationDef {
            file: strings.expect_unified(location.file),
            line: location.line,
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_calling_contexts(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let regions = local.regions.get_mut();
    let source_code_locations = local.source_code_locations.get_mut();
    let src = local.calling_contexts.get_mut();
    let dst = unified.calling_contexts.get_mut();
    for index in 0..src.len() {
        let context = src.get_at(index).payload().clone();
        let candidate = CallingContextDef {
            region: regions.expect_unified(context.region),
            source_code_location: context
                .source_code_location
                .map(|scl| source_code_locations.expect_unified(scl)),
            ip_offset: context.ip_offset,
            parent: context.parent.map(|parent| src.expect_unified(parent)),
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_attributes(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let src = local.attributes.get_mut();
    let dst = unified.attributes.get_mut();
    for index in 0..src.len() {
        let attribute = src.get_at(index).payload().clone();
        let candidate = AttributeDef {
            name: strings.expect_unified(attribute.name),
            description: strings.expect_unified(attribute.description),
            ..attribute
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_cartesian_topologies(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let src = local.cartesian_topologies.get_mut();
    let dst = unified.cartesian_topologies.get_mut();
    for index in 0..src.len() {
        let topology = src.get_at(index).payload().clone();
        let candidate = CartesianTopologyDef {
            name: strings.expect_unified(topology.name),
            dimensions: topology
                .dimensions
                .iter()
                .map(|dimension| CartesianDimension {
                    name: strings.expect_unified(dimension.name),
                    ..*dimension
                })
                .collect(),
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_cartesian_coords(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let topologies = local.cartesian_topologies.get_mut();
    let src = local.cartesian_coords.get_mut();
    let dst = unified.cartesian_coords.get_mut();
    for index in 0..src.len() {
        let coords = src.get_at(index).payload().clone();
        let candidate = CartesianCoordsDef {
            topology: topologies.expect_unified(coords.topology),
            ..coords
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}

fn unify_io_files(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let src = local.io_files.get_mut();
    let dst = unified.io_files.get_mut();
    for index in 0..src.len() {
        let file_name = strings.expect_unified(src.get_at(index).payload().file_name);
        let (handle, _) = dst.intern(IoFileDef { file_name });
        src.set_unified_at(index, handle);
    }
}

fn unify_io_handles(local: &mut DefinitionManager, unified: &mut DefinitionManager) {
    let strings = local.strings.get_mut();
    let io_files = local.io_files.get_mut();
    let communicators = local.communicators.get_mut();
    let src = local.io_handles.get_mut();
    let dst = unified.io_handles.get_mut();
    for index in 0..src.len() {
        let io_handle = src.get_at(index).payload().clone();
        let candidate = IoHandleDef {
            name: strings.expect_unified(io_handle.name),
            file: io_handle.file.map(|file| io_files.expect_unified(file)),
            scope: io_handle
                .scope
                .map(|scope| communicators.expect_unified(scope)),
            parent: io_handle.parent.map(|parent| src.expect_unified(parent)),
            ..io_handle
        };
        let (handle, _) = dst.intern(candidate);
        src.set_unified_at(index, handle);
    }
}
