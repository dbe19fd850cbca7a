// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! The record header shared by every definition type.

use tracent_memory::Handle;

/// One definition record: the common header plus the type-specific payload.
///
/// The header carries the structural hash cached at creation time and, once
/// unification has run, the handle of this definition's counterpart in the
/// unified manager. The sequence number is not stored: the arena index of
/// the record is dense, zero-based and in creation order, so the handle's
/// index is the sequence number.
#[derive(Debug, Clone)]
pub struct Definition<T> {
    hash: u64,
    unified: Option<Handle<T>>,
    payload: T,
}

impl<T> Definition<T> {
    pub(crate) fn new(hash: u64, payload: T) -> Self {
        Definition {
            hash,
            unified: None,
            payload,
        }
    }

    /// The structural hash cached when the record was created.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// The unified counterpart, present only after unification.
    pub fn unified(&self) -> Option<Handle<T>> {
        self.unified
    }

    pub(crate) fn set_unified(&mut self, unified: Handle<T>) {
        assert!(
            self.unified.is_none(),
            "definition unified twice; unification must run exactly once"
        );
        self.unified = Some(unified);
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Mutable payload access, used only by the set-once mutators.
    ///
    /// Fields reachable through this must not participate in the
    /// structural hash, which is cached at creation.
    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }
}
