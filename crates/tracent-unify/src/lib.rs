// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Definition unification.
//!
//! After measurement every process (and possibly every location) holds its
//! own [`DefinitionManager`] with process-local sequence numbers. This
//! crate merges them into a single unified manager, links every local
//! record to its unified counterpart, and fills the per-table mapping
//! arrays that translate local sequence numbers to global ones.
//!
//! [`DefinitionManager`]: tracent_definitions::DefinitionManager

#![forbid(unsafe_code)]

pub mod policy;
pub mod subsystem;
mod unify;

pub use policy::UnifyPolicy;
pub use subsystem::{Subsystem, SubsystemRegistry};
pub use unify::{allocate_mappings, free_mappings, unify};
