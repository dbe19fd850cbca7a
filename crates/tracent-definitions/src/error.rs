// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! The few recoverable error conditions of the registry.
//!
//! Almost everything that can go wrong here is an invariant violation that
//! poisons every subsequent measurement, so the registry aborts with a
//! diagnostic instead of returning an error. What remains recoverable is
//! the mapping-lookup surface, which a writer may probe before or after
//! unification has run.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionError {
    /// The local→global mapping for this definition type has not been
    /// allocated; unification has not run for this manager.
    #[error("no {kind} mapping allocated; unification has not run")]
    MappingNotAllocated { kind: &'static str },

    /// The definition exists locally but was never assigned a unified
    /// counterpart (e.g. it was skipped during unification).
    #[error("{kind} definition {sequence_number} has no unified counterpart")]
    NotUnified {
        kind: &'static str,
        sequence_number: u32,
    },
}
