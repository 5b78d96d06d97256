// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dotted namespace tree holding defined types by short name.

use crate::definition::TypeId;
use std::collections::BTreeMap;

/// Which namespace tree of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceRoot {
    /// Every defined type, by full name.
    Models,
    /// Types whose name starts with the global prefix, with the prefix removed.
    Global,
}

/// One node of a namespace tree.
#[derive(Debug, Default)]
pub struct Namespace {
    children: BTreeMap<String, Namespace>,
    types: BTreeMap<String, TypeId>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self, name: &str) -> Option<&Namespace> {
        self.children.get(name)
    }

    /// Walk (creating as needed) the nodes for `segments`.
    pub fn create_or_get(&mut self, segments: &[&str]) -> &mut Namespace {
        let mut node = self;
        for segment in segments {
            node = node.children.entry((*segment).to_string()).or_default();
        }
        node
    }

    pub fn get_path(&self, segments: &[&str]) -> Option<&Namespace> {
        let mut node = self;
        for segment in segments {
            node = node.children.get(*segment)?;
        }
        Some(node)
    }

    /// Type declared directly in this node.
    pub fn type_named(&self, name: &str) -> Option<TypeId> {
        self.types.get(name).copied()
    }

    /// Look up `"A.B.Name"` relative to this node.
    pub fn lookup(&self, dotted: &str) -> Option<TypeId> {
        let segments: Vec<&str> = dotted.split('.').collect();
        let (name, path) = segments.split_last()?;
        self.get_path(path)?.type_named(name)
    }

    pub(crate) fn insert_type(&mut self, name: &str, id: TypeId) -> Option<TypeId> {
        self.types.insert(name.to_string(), id)
    }

    pub fn types(&self) -> impl Iterator<Item = (&str, TypeId)> {
        self.types.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Namespace)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_lookup() {
        let mut root = Namespace::new();
        root.create_or_get(&["App", "Model"])
            .insert_type("Person", TypeId::from_index(9));
        assert_eq!(root.lookup("App.Model.Person"), Some(TypeId::from_index(9)));
        assert_eq!(root.lookup("App.Person"), None);
        assert!(root.child("App").is_some());
        assert!(!root.is_empty());
    }

    #[test]
    fn create_or_get_reuses_nodes() {
        let mut root = Namespace::new();
        root.create_or_get(&["A"]).insert_type("X", TypeId::from_index(1));
        root.create_or_get(&["A", "B"]).insert_type("Y", TypeId::from_index(2));
        let a = root.child("A").unwrap();
        assert_eq!(a.type_named("X"), Some(TypeId::from_index(1)));
        assert_eq!(a.children().count(), 1);
        assert_eq!(root.lookup("A.B.Y"), Some(TypeId::from_index(2)));
    }
}
