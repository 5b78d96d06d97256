// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type metadata side table.
//!
//! Entries are keyed by `(member, key)`; a `None` member addresses the type
//! itself. Every built member records one entry per descriptor attribute:
//! `definition:<attr>` for instance members and `static:definition:<attr>`
//! for static ones. Reads fall through to the base type.

use crate::definition::TypeId;
use crate::member::MemberScope;
use crate::registry::Container;
use crate::value::Value;
use indexmap::IndexMap;

/// Metadata key recording descriptor attribute `attr` of a `scope` member.
pub(crate) fn definition_key(scope: MemberScope, attr: &str) -> String {
    match scope {
        MemberScope::Instance => format!("definition:{}", attr),
        MemberScope::Static => format!("static:definition:{}", attr),
    }
}

#[derive(Debug, Default)]
pub struct MetadataTable {
    entries: IndexMap<(Option<String>, String), Value>,
}

impl MetadataTable {
    pub fn get(&self, member: Option<&str>, key: &str) -> Option<&Value> {
        self.entries
            .get(&(member.map(str::to_string), key.to_string()))
    }

    pub fn set(&mut self, member: Option<&str>, key: &str, value: Value) {
        self.entries
            .insert((member.map(str::to_string), key.to_string()), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn keys_for<'a>(&'a self, member: Option<&'a str>) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.entries
            .iter()
            .filter(move |((m, _), _)| m.as_deref() == member)
            .map(|((_, k), v)| (k.as_str(), v))
    }
}

// ---------------------------------------------------------------------------
// Container API
// ---------------------------------------------------------------------------

impl Container {
    fn metadata_chain(&self, id: TypeId) -> impl Iterator<Item = &MetadataTable> + '_ {
        std::iter::successors(Some(id), move |t| self.type_def(*t).inherits_from)
            .map(move |t| &self.type_def(t).metadata)
    }

    pub fn has_metadata(&self, ty: TypeId, key: &str, member: Option<&str>) -> bool {
        self.get_metadata(ty, key, member).is_some()
    }

    /// Nearest entry for `(member, key)` along the inheritance chain.
    pub fn get_metadata(&self, ty: TypeId, key: &str, member: Option<&str>) -> Option<Value> {
        self.metadata_chain(ty)
            .find_map(|table| table.get(member, key))
            .cloned()
    }

    /// All entries visible for `member`; nearer types shadow their bases.
    pub fn get_all_metadata(&self, ty: TypeId, member: Option<&str>) -> IndexMap<String, Value> {
        let mut out: IndexMap<String, Value> = IndexMap::new();
        for table in self.metadata_chain(ty) {
            for (key, value) in table.keys_for(member) {
                if !out.contains_key(key) {
                    out.insert(key.to_string(), value.clone());
                }
            }
        }
        out
    }

    pub fn set_metadata(&mut self, ty: TypeId, key: &str, value: Value, member: Option<&str>) {
        self.type_def_mut(ty).metadata.set(member, key, value);
    }
}
