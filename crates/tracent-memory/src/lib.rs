// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page-chunked storage for measurement definitions.
//!
//! A [`PageArena`] owns its values in pages of exponentially growing
//! capacity (256, 512, 1024, ...). Values are addressed by a dense `u32`
//! index instead of a pointer, so an address stays valid no matter how the
//! backing pages grow or get reorganized. The index order is the insertion
//! order, which makes the index double as the per-type sequence number of
//! the definition stored in the slot.
//!
//! Every arena carries a process-unique [`ArenaId`]. A [`Handle`] pairs
//! that id with the slot index; dereferencing a handle against an arena
//! that did not issue it aborts with a diagnostic instead of silently
//! yielding foreign data.

#![forbid(unsafe_code)]

use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    sync::atomic::{AtomicU32, Ordering},
};

/// Number of slots in the first page. Page `k` holds `PAGE_BASE << k`
/// slots, mirroring the doubling growth of the interner pools this arena
/// is modeled on.
const PAGE_BASE: u32 = 256;

static NEXT_ARENA_ID: AtomicU32 = AtomicU32::new(0);

/// Process-unique identity of one arena.
///
/// Local and unified definition managers hold distinct arenas for the same
/// definition type; the id is what catches a handle crossing between them.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ArenaId(u32);

impl ArenaId {
    fn fresh() -> Self {
        let id = NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed);
        assert!(id != u32::MAX, "arena id space exhausted");
        ArenaId(id)
    }
}

/// Opaque, typed reference to a definition slot in a specific arena.
///
/// A handle is only meaningful together with the arena (and thus the
/// definition manager) that issued it. The payload type is a phantom, so
/// using a region handle where a string handle is expected is a compile
/// error; using a handle against the wrong manager is a runtime abort.
pub struct Handle<T> {
    arena: ArenaId,
    index: u32,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Builds a handle from its raw parts.
    ///
    /// Normally handles are obtained from the table that owns the slot;
    /// this is the escape hatch the table layer itself uses.
    pub fn from_parts(arena: ArenaId, index: u32) -> Self {
        Handle {
            arena,
            index,
            _payload: PhantomData,
        }
    }

    /// The arena this handle belongs to.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// The slot index, which is also the definition's sequence number
    /// within its type and manager.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.arena == other.arena && self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.arena.hash(state);
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}:{})", self.arena.0, self.index)
    }
}

/// Splits a dense index into (page, slot-in-page).
///
/// Page `k` covers indices `[PAGE_BASE * (2^k - 1), PAGE_BASE * (2^(k+1) - 1))`.
fn locate(index: u32) -> (usize, usize) {
    let n = index / PAGE_BASE + 1;
    let page = n.ilog2();
    let slot = index - PAGE_BASE * ((1u32 << page) - 1);
    (page as usize, slot as usize)
}

/// A grow-only arena addressed by dense indices.
///
/// Pages never reallocate once created (each page vector is created with
/// its final capacity), so issued indices stay valid for the lifetime of
/// the arena. Values are never individually freed; the whole arena is
/// dropped when its definition manager is torn down.
pub struct PageArena<T> {
    id: ArenaId,
    pages: Vec<Vec<T>>,
    len: u32,
}

impl<T> PageArena<T> {
    /// Creates an empty arena with a fresh process-unique identity.
    pub fn new() -> Self {
        PageArena {
            id: ArenaId::fresh(),
            pages: Vec::new(),
            len: 0,
        }
    }

    /// The identity of this arena.
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// Number of allocated slots; equals the next index to be issued.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocates a slot and returns its handle.
    ///
    /// Definitions are load-bearing infrastructure: exhausting the index
    /// space aborts the process rather than degrading.
    pub fn alloc(&mut self, value: T) -> Handle<T> {
        assert!(
            self.len != u32::MAX,
            "definition arena exhausted: {} slots in use",
            self.len
        );
        let index = self.len;
        let (page, slot) = locate(index);
        if page == self.pages.len() {
            self.pages
                .push(Vec::with_capacity((PAGE_BASE as usize) << page));
        }
        debug_assert_eq!(self.pages[page].len(), slot);
        self.pages[page].push(value);
        self.len += 1;
        Handle::from_parts(self.id, index)
    }

    fn check_owner(&self, handle_arena: ArenaId) {
        assert!(
            handle_arena == self.id,
            "handle from arena {:?} dereferenced against arena {:?}; \
             handles must only be used with the manager that issued them",
            handle_arena,
            self.id
        );
    }

    /// Dereferences a handle issued by this arena.
    pub fn get(&self, handle: Handle<T>) -> &T {
        self.check_owner(handle.arena);
        self.get_at(handle.index)
    }

    /// Mutable counterpart of [`Self::get`].
    pub fn get_mut(&mut self, handle: Handle<T>) -> &mut T {
        self.check_owner(handle.arena);
        self.get_at_mut(handle.index)
    }

    /// Dereferences by raw index. The index must have been issued by this
    /// arena; out-of-range indices abort.
    pub fn get_at(&self, index: u32) -> &T {
        assert!(index < self.len, "arena index {} out of range", index);
        let (page, slot) = locate(index);
        &self.pages[page][slot]
    }

    /// Mutable counterpart of [`Self::get_at`].
    pub fn get_at_mut(&mut self, index: u32) -> &mut T {
        assert!(index < self.len, "arena index {} out of range", index);
        let (page, slot) = locate(index);
        &mut self.pages[page][slot]
    }

    /// Rebuilds the handle for an issued index.
    pub fn handle_at(&self, index: u32) -> Handle<T> {
        assert!(index < self.len, "arena index {} out of range", index);
        Handle::from_parts(self.id, index)
    }

    /// Iterates all slots in insertion (= sequence number) order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        let id = self.id;
        self.pages
            .iter()
            .flatten()
            .enumerate()
            .map(move |(index, value)| (Handle::from_parts(id, index as u32), value))
    }
}

impl<T> Default for PageArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
