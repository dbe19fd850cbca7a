// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Interned strings. Every other definition type refers to its names and
//! descriptions through [`StringHandle`]s, so equal strings are stored once
//! per manager.

use crate::table::DefinitionTable;
use tracent_memory::Handle;

pub type StringHandle = Handle<StringDef>;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct StringDef {
    content: Box<str>,
}

impl StringDef {
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl DefinitionTable<StringDef> {
    /// Interns a string without allocating on the hit path.
    ///
    /// The probe hashes the borrowed `&str`; `StringDef` being a single
    /// `Box<str>` field, its derived hash matches the bare string's.
    pub fn intern_str(&mut self, content: &str) -> StringHandle {
        let hash = self.hash_value(content);
        let (handle, _created) = self.find_or_insert_with(
            hash,
            |existing| existing.content() == content,
            || StringDef {
                content: content.into(),
            },
        );
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut table = DefinitionTable::with_dedup("String");
        let a = table.intern_str("MPI_Send");
        let b = table.intern_str("MPI_Send");
        let c = table.intern_str("MPI_Recv");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(a).payload().content(), "MPI_Send");
    }

    #[test]
    fn empty_string_is_a_regular_entry() {
        let mut table = DefinitionTable::with_dedup("String");
        let empty = table.intern_str("");
        assert_eq!(empty.index(), 0);
        assert_eq!(table.get(empty).payload().content(), "");
        assert_eq!(table.intern_str(""), empty);
    }

    #[test]
    fn borrowed_probe_hash_matches_stored_hash() {
        let mut table = DefinitionTable::with_dedup("String");
        let h = table.intern_str("main");
        let probe = table.hash_value("main");
        assert_eq!(table.get(h).hash(), probe);
    }
}
