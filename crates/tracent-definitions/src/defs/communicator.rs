// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Communicators.
//!
//! During measurement an adapter only knows its own, paradigm-specific
//! identification of a communicator (an MPI communicator id, a SHMEM team,
//! ...), so it registers an *interim* communicator whose payload is opaque
//! to the registry. Unification resolves interim communicators into proper
//! communicators over rank groups.

use super::{group::GroupHandle, string::StringHandle, Paradigm};
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracent_memory::Handle;

pub type CommunicatorHandle = Handle<CommunicatorDef>;
pub type InterimCommunicatorHandle = Handle<InterimCommunicatorDef>;

#[derive(Debug, Clone)]
pub struct CommunicatorDef {
    pub group: GroupHandle,
    /// Not part of the communicator's identity; may be assigned once after
    /// creation.
    pub name: Option<StringHandle>,
    pub parent: Option<CommunicatorHandle>,
}

impl Hash for CommunicatorDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group.hash(state);
        self.parent.hash(state);
    }
}

impl PartialEq for CommunicatorDef {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group && self.parent == other.parent
    }
}

impl Eq for CommunicatorDef {}

/// The paradigm-specific identification an adapter attaches to an interim
/// communicator. The registry treats it as an opaque identity token.
pub trait CommunicatorPayload: Any + Send + Sync + fmt::Debug {
    fn payload_hash(&self) -> u64;
    fn payload_eq(&self, other: &dyn CommunicatorPayload) -> bool;
    fn boxed_clone(&self) -> Box<dyn CommunicatorPayload>;
    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug)]
pub struct InterimCommunicatorDef {
    pub parent: Option<InterimCommunicatorHandle>,
    pub paradigm: Paradigm,
    /// Not part of the identity; may be assigned once after creation.
    pub name: Option<StringHandle>,
    pub payload: Box<dyn CommunicatorPayload>,
}

impl Clone for InterimCommunicatorDef {
    fn clone(&self) -> Self {
        InterimCommunicatorDef {
            parent: self.parent,
            paradigm: self.paradigm,
            name: self.name,
            payload: self.payload.boxed_clone(),
        }
    }
}

impl Hash for InterimCommunicatorDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parent.hash(state);
        self.paradigm.hash(state);
        state.write_u64(self.payload.payload_hash());
    }
}

impl PartialEq for InterimCommunicatorDef {
    fn eq(&self, other: &Self) -> bool {
        self.parent == other.parent
            && self.paradigm == other.paradigm
            && self.payload.payload_eq(other.payload.as_ref())
    }
}

impl Eq for InterimCommunicatorDef {}
