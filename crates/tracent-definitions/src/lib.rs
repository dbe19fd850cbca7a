// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! The definition registry of the tracent measurement core.
//!
//! Every adapter (user instrumentation, threading, MPI, I/O, ...) obtains
//! process-unique handles for the entities it measures — source files,
//! regions, metrics, communicators, call paths — by registering them here.
//! Registration is either a plain append (for entities an adapter promises
//! to register at most once) or a hash-consing "create or find" that
//! guarantees structural sharing.
//!
//! A [`DefinitionManager`] aggregates one [`table::DefinitionTable`] per
//! definition type. One manager exists per process during measurement (plus
//! optional per-location managers owned by a single thread each); a second,
//! unified flavor is produced after measurement by the unification engine
//! in `tracent-unify`.

#![forbid(unsafe_code)]

pub mod defs;
pub mod error;
pub mod manager;
pub mod record;
pub mod table;

pub use error::DefinitionError;
pub use manager::DefinitionManager;
pub use record::Definition;
pub use table::DefinitionTable;
