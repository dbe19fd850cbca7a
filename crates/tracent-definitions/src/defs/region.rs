// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Code regions: functions, loops, phases, parallel constructs. The most
//! frequently defined type, and the one whose identity is policy-dependent
//! during unification (the paradigm may or may not be significant).

use super::{string::StringHandle, Paradigm};
use std::hash::{Hash, Hasher};
use tracent_memory::Handle;

pub type RegionHandle = Handle<RegionDef>;

/// Line number meaning "not known". Regions whose begin and end lines are
/// both invalid compare equal on the remaining identity fields.
pub const INVALID_LINE_NO: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionType {
    Unknown,
    Function,
    Loop,
    UserRegion,
    Code,
    Phase,
    Barrier,
    ImplicitBarrier,
    Parallel,
    Task,
    Allocate,
    Deallocate,
    FileIo,
}

/// A region definition.
///
/// `group_name` is not part of the region's identity: profiling assigns it
/// after creation, and two regions differing only in group membership are
/// the same region. It is therefore excluded from hashing and equality.
#[derive(Debug, Clone)]
pub struct RegionDef {
    pub name: StringHandle,
    pub canonical_name: StringHandle,
    pub description: StringHandle,
    pub region_type: RegionType,
    pub file_name: Option<StringHandle>,
    pub begin_line: u32,
    pub end_line: u32,
    pub paradigm: Paradigm,
    pub group_name: Option<StringHandle>,
}

impl RegionDef {
    /// Hashes the identity fields. `paradigm_significant` selects whether
    /// the paradigm distinguishes otherwise-identical regions, which
    /// differs between measurement modes.
    pub fn identity_hash<H: Hasher>(&self, state: &mut H, paradigm_significant: bool) {
        self.name.hash(state);
        self.canonical_name.hash(state);
        self.description.hash(state);
        self.region_type.hash(state);
        self.file_name.hash(state);
        self.begin_line.hash(state);
        self.end_line.hash(state);
        if paradigm_significant {
            self.paradigm.hash(state);
        }
    }

    pub fn identity_eq(&self, other: &RegionDef, paradigm_significant: bool) -> bool {
        self.name == other.name
            && self.canonical_name == other.canonical_name
            && self.description == other.description
            && self.region_type == other.region_type
            && self.file_name == other.file_name
            && self.begin_line == other.begin_line
            && self.end_line == other.end_line
            && (!paradigm_significant || self.paradigm == other.paradigm)
    }
}

impl Hash for RegionDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_hash(state, true);
    }
}

impl PartialEq for RegionDef {
    fn eq(&self, other: &Self) -> bool {
        self.identity_eq(other, true)
    }
}

impl Eq for RegionDef {}
