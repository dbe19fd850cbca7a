// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! The per-type entry table: an arena of records, an optional hash-consing
//! index, and the local→global mapping produced by unification.

use crate::{error::DefinitionError, record::Definition};
use ahash::RandomState;
use hashbrown::raw::RawTable;
use std::hash::{BuildHasher, Hash, Hasher};
use tracent_memory::{ArenaId, Handle, PageArena};

/// Bookkeeping for one definition type within one manager.
///
/// The arena holds the records in creation order; the handle index is the
/// sequence number. Tables of hash-consed types additionally carry a dedup
/// index mapping structural hashes to record indices. The mapping array
/// exists only between unification and the final serialization pass.
pub struct DefinitionTable<T> {
    kind: &'static str,
    arena: PageArena<Definition<T>>,
    dedup: Option<RawTable<u32>>,
    hasher: RandomState,
    mapping: Option<Vec<u32>>,
}

impl<T> DefinitionTable<T> {
    /// A table for definitions that are unique by construction and appended
    /// unconditionally.
    pub fn new(kind: &'static str) -> Self {
        DefinitionTable {
            kind,
            arena: PageArena::new(),
            dedup: None,
            hasher: RandomState::new(),
            mapping: None,
        }
    }

    /// A table with a dedup index, for hash-consed definition types.
    pub fn with_dedup(kind: &'static str) -> Self {
        let mut table = Self::new(kind);
        table.dedup = Some(RawTable::new());
        table
    }

    /// The definition type name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn has_dedup(&self) -> bool {
        self.dedup.is_some()
    }

    pub fn arena_id(&self) -> ArenaId {
        self.arena.id()
    }

    /// Number of definitions created so far; the next sequence number.
    pub fn len(&self) -> u32 {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    fn typed(&self, index: u32) -> Handle<T> {
        Handle::from_parts(self.arena.id(), index)
    }

    fn untyped(handle: Handle<T>) -> Handle<Definition<T>> {
        Handle::from_parts(handle.arena(), handle.index())
    }

    /// Dereferences a handle issued by this table. Aborts on a handle from
    /// a different manager.
    pub fn get(&self, handle: Handle<T>) -> &Definition<T> {
        self.arena.get(Self::untyped(handle))
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> &mut Definition<T> {
        self.arena.get_mut(Self::untyped(handle))
    }

    /// Dereferences by sequence number.
    pub fn get_at(&self, index: u32) -> &Definition<T> {
        self.arena.get_at(index)
    }

    /// Rebuilds the handle for a sequence number issued by this table.
    pub fn handle_at(&self, index: u32) -> Handle<T> {
        self.arena.handle_at(index);
        self.typed(index)
    }

    /// Iterates all definitions in sequence-number order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &Definition<T>)> {
        let id = self.arena.id();
        self.arena
            .iter()
            .map(move |(h, def)| (Handle::from_parts(id, h.index()), def))
    }

    /// Hashes an arbitrary key with this table's hasher.
    pub fn hash_value<K: Hash + ?Sized>(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    /// Runs a custom hashing closure against this table's hasher. Used
    /// where structural hashing is policy-dependent and the plain `Hash`
    /// impl does not apply.
    pub fn hash_with(&self, f: impl FnOnce(&mut ahash::AHasher)) -> u64 {
        let mut state = self.hasher.build_hasher();
        f(&mut state);
        state.finish()
    }

    /// Appends a definition unconditionally, assigning the next sequence
    /// number. The structural hash is cached for later unification.
    pub fn append(&mut self, payload: T) -> Handle<T>
    where
        T: Hash,
    {
        let hash = self.hasher.hash_one(&payload);
        self.append_hashed(hash, payload)
    }

    /// [`Self::append`] with a caller-computed hash.
    pub fn append_hashed(&mut self, hash: u64, payload: T) -> Handle<T> {
        let handle = self.arena.alloc(Definition::new(hash, payload));
        let index = handle.index();
        if let Some(dedup) = self.dedup.as_mut() {
            let arena = &self.arena;
            dedup.insert(hash, index, |&i| arena.get_at(i).hash());
        }
        log::trace!("new {} definition #{}", self.kind, index);
        self.typed(index)
    }

    /// Probes the dedup index without inserting.
    pub fn find_hashed(&self, hash: u64, mut eq: impl FnMut(&T) -> bool) -> Option<Handle<T>> {
        let dedup = self.dedup.as_ref()?;
        let arena = &self.arena;
        dedup
            .get(hash, |&i| {
                let def = arena.get_at(i);
                def.hash() == hash && eq(def.payload())
            })
            .map(|&index| self.typed(index))
    }

    /// The create-or-find protocol shared by all hash-consed definition
    /// types: probe the dedup index with a caller-supplied equality
    /// closure; on a miss, materialize the payload and link it in.
    ///
    /// Returns the handle and whether a new definition was created.
    pub fn find_or_insert_with(
        &mut self,
        hash: u64,
        eq: impl FnMut(&T) -> bool,
        make: impl FnOnce() -> T,
    ) -> (Handle<T>, bool) {
        assert!(
            self.dedup.is_some(),
            "find-or-insert on {} table without a dedup index",
            self.kind
        );
        if let Some(existing) = self.find_hashed(hash, eq) {
            return (existing, false);
        }
        (self.append_hashed(hash, make()), true)
    }

    /// Hash-conses a fully formed candidate payload. On a dedup hit the
    /// candidate is discarded and the existing handle returned.
    pub fn intern(&mut self, payload: T) -> (Handle<T>, bool)
    where
        T: Hash + Eq,
    {
        let hash = self.hasher.hash_one(&payload);
        if let Some(existing) = self.find_hashed(hash, |existing| *existing == payload) {
            return (existing, false);
        }
        (self.append_hashed(hash, payload), true)
    }

    /// The unified counterpart of a definition, if unification assigned one.
    pub fn unified_of(&self, handle: Handle<T>) -> Option<Handle<T>> {
        self.get(handle).unified()
    }

    /// As [`Self::unified_of`], but aborts if the definition has not been
    /// unified yet. Used while rewriting cross-references, where a missing
    /// link means the type order violated the reference DAG.
    pub fn expect_unified(&self, handle: Handle<T>) -> Handle<T> {
        self.unified_of(handle).unwrap_or_else(|| {
            panic!(
                "invalid unification order: {} definition {} referenced before being unified",
                self.kind,
                handle.index()
            )
        })
    }

    /// Records the unified counterpart for a sequence number.
    pub fn set_unified_at(&mut self, index: u32, unified: Handle<T>) {
        self.arena.get_at_mut(index).set_unified(unified);
    }

    /// Allocates the local→global mapping array, one slot per definition,
    /// all slots initially invalid (0xFF bytes).
    pub fn alloc_mapping(&mut self) {
        self.mapping = Some(vec![u32::MAX; self.len() as usize]);
    }

    /// Fills the mapping array from the unified links recorded during
    /// unification. Definitions without a unified counterpart keep the
    /// invalid marker.
    pub fn assign_mapping_from_unified(&mut self) {
        let mapping = self
            .mapping
            .as_mut()
            .unwrap_or_else(|| panic!("assigning {} mapping before allocating it", self.kind));
        for (handle, def) in self.arena.iter() {
            if let Some(unified) = def.unified() {
                mapping[handle.index() as usize] = unified.index();
            }
        }
    }

    /// Releases the mapping array once its consumers are done.
    pub fn free_mapping(&mut self) {
        self.mapping = None;
    }

    pub fn mapping(&self) -> Option<&[u32]> {
        self.mapping.as_deref()
    }

    /// Translates a local handle into its global sequence number.
    pub fn global_id(&self, handle: Handle<T>) -> Result<u32, DefinitionError> {
        // Deref first so foreign handles abort rather than mis-translate.
        let _ = self.get(handle);
        let mapping = self
            .mapping
            .as_ref()
            .ok_or(DefinitionError::MappingNotAllocated { kind: self.kind })?;
        let id = mapping[handle.index() as usize];
        if id == u32::MAX {
            return Err(DefinitionError::NotUnified {
                kind: self.kind,
                sequence_number: handle.index(),
            });
        }
        Ok(id)
    }
}
