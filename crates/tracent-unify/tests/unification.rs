// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

use claims::{assert_err, assert_ok, assert_ok_eq};
use proptest::prelude::*;
use tracent_definitions::defs::*;
use tracent_definitions::manager::{MetricSpec, RegionSpec};
use tracent_definitions::{DefinitionError, DefinitionManager};
use tracent_unify::{free_mappings, unify, UnifyPolicy};

fn function_region(manager: &DefinitionManager, name: &str, paradigm: Paradigm) -> RegionHandle {
    manager.new_region(RegionSpec {
        name: Some(name),
        canonical_name: None,
        description: None,
        region_type: RegionType::Function,
        file_name: Some("foo.c"),
        begin_line: INVALID_LINE_NO,
        end_line: INVALID_LINE_NO,
        paradigm,
    })
}

#[test]
fn empty_string_gets_global_sequence_number_zero() {
    let mut local = DefinitionManager::new();
    local.new_string("alpha");

    let unified = unify(&mut [&mut local], &UnifyPolicy::default());

    let strings = unified.strings.read();
    assert_eq!(strings.get_at(0).payload().content(), "");
    assert_eq!(strings.len(), 2);
}

#[test]
fn equal_definitions_from_different_processes_merge() {
    let mut first = DefinitionManager::new();
    let mut second = DefinitionManager::new();
    let file_first = first.new_source_file("foo.c");
    let file_second = second.new_source_file("foo.c");
    let file_other = second.new_source_file("bar.c");

    let unified = unify(&mut [&mut first, &mut second], &UnifyPolicy::default());

    assert_eq!(unified.source_files.read().len(), 2);
    assert_ok_eq!(
        first.source_files.read().global_id(file_first),
        second.source_files.read().global_id(file_second).unwrap()
    );
    assert_ne!(
        second.source_files.read().global_id(file_second).unwrap(),
        second.source_files.read().global_id(file_other).unwrap()
    );
}

#[test]
fn global_id_is_unavailable_before_unification() {
    let manager = DefinitionManager::new();
    let file = manager.new_source_file("foo.c");
    assert_err!(manager.source_files.read().global_id(file));
    assert_eq!(
        manager.source_files.read().global_id(file),
        Err(DefinitionError::MappingNotAllocated { kind: "SourceFile" })
    );
}

#[test]
fn identical_regions_with_unknown_lines_unify() {
    let mut first = DefinitionManager::new();
    let mut second = DefinitionManager::new();
    let region_first = function_region(&first, "main", Paradigm::Compiler);
    let region_second = function_region(&second, "main", Paradigm::Compiler);

    let unified = unify(&mut [&mut first, &mut second], &UnifyPolicy::default());

    assert_eq!(unified.regions.read().len(), 1);
    assert_ok_eq!(
        first.regions.read().global_id(region_first),
        second.regions.read().global_id(region_second).unwrap()
    );
}

#[test]
fn region_paradigm_significance_is_policy_controlled() {
    let significant = UnifyPolicy {
        region_paradigm_significant: true,
    };
    let folded = UnifyPolicy {
        region_paradigm_significant: false,
    };

    for (policy, expected_regions) in [(significant, 2), (folded, 1)] {
        let mut local = DefinitionManager::new();
        function_region(&local, "work", Paradigm::User);
        function_region(&local, "work", Paradigm::Openmp);

        let unified = unify(&mut [&mut local], &policy);
        assert_eq!(unified.regions.read().len(), expected_regions);
    }
}

#[test]
fn cross_references_are_rewritten_to_unified_handles() {
    let mut local = DefinitionManager::new();
    let region = function_region(&local, "main", Paradigm::Compiler);
    let callpath = local.new_callpath(None, region, Vec::new());

    let unified = unify(&mut [&mut local], &UnifyPolicy::default());

    let unified_region = local.regions.read().unified_of(region).unwrap();
    let unified_callpath = local.callpaths.read().unified_of(callpath).unwrap();
    assert_eq!(
        unified.callpaths.read().get(unified_callpath).payload().region,
        unified_region
    );
}

#[test]
fn parent_chains_unify_root_first() {
    let mut first = DefinitionManager::new();
    let mut second = DefinitionManager::new();
    for manager in [&first, &second] {
        let machine = manager.new_system_tree_node(None, "machine", "cluster");
        let node = manager.new_system_tree_node(Some(machine), "node", "n01");
        manager.new_location_group("rank", Some(node), LocationGroupType::Process);
    }

    let unified = unify(&mut [&mut first, &mut second], &UnifyPolicy::default());

    assert_eq!(unified.system_tree_nodes.read().len(), 2);
    assert_eq!(unified.location_groups.read().len(), 1);
    let nodes = unified.system_tree_nodes.read();
    let child = nodes.get_at(1).payload().clone();
    assert_eq!(child.parent, Some(nodes.handle_at(0)));
}

#[test]
fn interim_communicators_merge_by_payload() {
    #[derive(Debug, Clone)]
    struct WorldId(u64);
    impl CommunicatorPayload for WorldId {
        fn payload_hash(&self) -> u64 {
            self.0
        }
        fn payload_eq(&self, other: &dyn CommunicatorPayload) -> bool {
            other
                .as_any()
                .downcast_ref::<WorldId>()
                .is_some_and(|other| self.0 == other.0)
        }
        fn boxed_clone(&self) -> Box<dyn CommunicatorPayload> {
            Box::new(self.clone())
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    let mut first = DefinitionManager::new();
    let mut second = DefinitionManager::new();
    let comm_first = first.new_interim_communicator(None, Paradigm::Mpi, Box::new(WorldId(1)));
    let comm_second = second.new_interim_communicator(None, Paradigm::Mpi, Box::new(WorldId(1)));
    second.new_interim_communicator(None, Paradigm::Mpi, Box::new(WorldId(2)));

    let unified = unify(&mut [&mut first, &mut second], &UnifyPolicy::default());

    assert_eq!(unified.interim_communicators.read().len(), 2);
    assert_ok_eq!(
        first.interim_communicators.read().global_id(comm_first),
        second
            .interim_communicators
            .read()
            .global_id(comm_second)
            .unwrap()
    );
}

#[test]
fn scoped_sampling_sets_survive_unification() {
    let mut local = DefinitionManager::new();
    let metric = local.new_metric(MetricSpec {
        name: "PAPI_TOT_CYC",
        description: "",
        source_type: MetricSourceType::Papi,
        mode: MetricMode::AccumulatedStart,
        value_type: MetricValueType::Uint64,
        base: MetricBase::Decimal,
        exponent: 0,
        unit: "#",
        profiling_type: MetricProfilingType::Exclusive,
    });
    let plain = local.new_sampling_set(
        &[metric],
        MetricOccurrence::SynchronousStrict,
        SamplingSetClass::Cpu,
    );
    let location = local.new_location(7, "Master thread", LocationType::CpuThread);
    let scoped = local.new_scoped_sampling_set(plain, location, ScopeRef::Location(location));

    let unified = unify(&mut [&mut local], &UnifyPolicy::default());

    let unified_plain = local.sampling_sets.read().unified_of(plain).unwrap();
    let unified_scoped = local.sampling_sets.read().unified_of(scoped).unwrap();
    assert_eq!(unified.sampling_set_of(unified_scoped), unified_plain);
    assert_ok!(local.sampling_sets.read().global_id(scoped));
}

#[test]
fn io_hierarchy_unifies_with_completion_state() {
    let mut first = DefinitionManager::new();
    let mut second = DefinitionManager::new();
    for manager in [&first, &second] {
        let file = manager.new_io_file("/scratch/out.dat");
        let handle = manager.new_io_handle(
            "",
            None,
            IoParadigm::Posix,
            IoHandleFlags::PRE_CREATED,
            None,
            None,
        );
        manager.io_handle_complete(handle, "out", Some(file));
    }

    let unified = unify(&mut [&mut first, &mut second], &UnifyPolicy::default());

    assert_eq!(unified.io_files.read().len(), 1);
    assert_eq!(unified.io_handles.read().len(), 1);
    assert!(unified.io_handles.read().get_at(0).payload().completed);
}

#[test]
fn mappings_are_dense_and_freeable() {
    let mut local = DefinitionManager::new();
    for i in 0..100 {
        function_region(&local, &format!("region_{i}"), Paradigm::User);
    }

    let _unified = unify(&mut [&mut local], &UnifyPolicy::default());

    {
        let regions = local.regions.read();
        let mapping = regions.mapping().unwrap();
        assert_eq!(mapping.len(), 100);
        assert!(mapping.iter().all(|&id| id != u32::MAX));
    }

    free_mappings(&mut local);
    assert!(local.regions.read().mapping().is_none());
}

proptest! {
    // The unified contents must not depend on the order the local
    // managers are processed in, only the sequence numbers may differ.
    #[test]
    fn unified_contents_are_order_independent(
        names in proptest::collection::vec(
            proptest::collection::vec("[a-z]{1,8}", 1..16),
            2..5,
        ),
        seed in any::<u64>(),
    ) {
        use rand::seq::SliceRandom;
        use rand::SeedableRng;

        let build = |order: &[usize]| {
            let mut managers: Vec<DefinitionManager> = names
                .iter()
                .map(|per_process| {
                    let manager = DefinitionManager::new();
                    for name in per_process {
                        function_region(&manager, name, Paradigm::User);
                    }
                    manager
                })
                .collect();
            let mut refs: Vec<&mut DefinitionManager> = Vec::with_capacity(order.len());
            let mut rest: Vec<Option<&mut DefinitionManager>> =
                managers.iter_mut().map(Some).collect();
            for &i in order {
                refs.push(rest[i].take().unwrap());
            }
            let unified = unify(&mut refs, &UnifyPolicy::default());
            let strings = unified.strings.read();
            let mut contents: Vec<String> = strings
                .iter()
                .map(|(_, def)| def.payload().content().to_owned())
                .collect();
            contents.sort();
            drop(strings);
            let region_count = unified.regions.read().len();
            (region_count, contents)
        };

        let forward: Vec<usize> = (0..names.len()).collect();
        let mut shuffled = forward.clone();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        shuffled.shuffle(&mut rng);

        prop_assert_eq!(build(&forward), build(&shuffled));
    }
}
