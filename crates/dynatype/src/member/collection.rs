// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type member descriptor store with cached derived views.
//!
//! A collection only holds the members its type declared (or copied in from
//! mixins). Lookups that miss fall through to the base type's collection, so
//! inherited members are visible without being copied.

use super::{MemberDefinition, TypeRef};
use crate::definition::TypeId;
use crate::registry::{Container, TypeRegistry};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Which of a type's two collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberScope {
    Instance,
    Static,
}

#[derive(Debug, Default)]
struct ViewCache {
    epoch: u64,
    all: Option<Arc<[MemberDefinition]>>,
    public_properties: Option<Arc<[MemberDefinition]>>,
    public_property_names: Option<Arc<[String]>>,
    key_properties: Option<Arc<[MemberDefinition]>>,
    public_methods: Option<Arc<[MemberDefinition]>>,
    by_type: HashMap<TypeId, Arc<[MemberDefinition]>>,
}

impl ViewCache {
    fn reset(&mut self, epoch: u64) {
        *self = ViewCache {
            epoch,
            ..ViewCache::default()
        };
    }
}

/// Ordered descriptor store owned by exactly one type.
#[derive(Debug)]
pub struct MemberDefinitionCollection {
    owner: TypeId,
    scope: MemberScope,
    parent: Option<TypeId>,
    entries: IndexMap<String, MemberDefinition>,
    cache: Mutex<ViewCache>,
}

impl MemberDefinitionCollection {
    pub(crate) fn new(owner: TypeId, scope: MemberScope, parent: Option<TypeId>) -> Self {
        Self {
            owner,
            scope,
            parent,
            entries: IndexMap::new(),
            cache: Mutex::new(ViewCache::default()),
        }
    }

    pub fn owner(&self) -> TypeId {
        self.owner
    }

    pub fn scope(&self) -> MemberScope {
        self.scope
    }

    /// Collection lookups fall through to.
    pub fn parent(&self) -> Option<TypeId> {
        self.parent
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Own entry only, no delegation.
    pub fn get_own(&self, name: &str) -> Option<&MemberDefinition> {
        self.entries.get(name)
    }

    pub fn own_members(&self) -> impl Iterator<Item = &MemberDefinition> {
        self.entries.values()
    }

    pub(crate) fn get_own_mut(&mut self, name: &str) -> Option<&mut MemberDefinition> {
        self.entries.get_mut(name)
    }

    /// Insert or overwrite, dropping every cached view.
    pub(crate) fn set_member(&mut self, definition: MemberDefinition) {
        self.entries.insert(definition.name.clone(), definition);
        self.clear_cache();
    }

    pub(crate) fn clear_cache(&mut self) {
        let epoch = self.cache.get_mut().epoch;
        self.cache.get_mut().reset(epoch);
    }
}

/// Read view over a type's collection and its ancestors.
#[derive(Clone, Copy)]
pub struct MemberView<'a> {
    container: &'a Container,
    owner: TypeId,
    scope: MemberScope,
}

impl<'a> MemberView<'a> {
    pub(crate) fn new(container: &'a Container, owner: TypeId, scope: MemberScope) -> Self {
        Self {
            container,
            owner,
            scope,
        }
    }

    fn collection(&self) -> &'a MemberDefinitionCollection {
        self.container.type_def(self.owner).collection(self.scope)
    }

    /// Collections from the owner up the delegation chain.
    fn chain(&self) -> impl Iterator<Item = &'a MemberDefinitionCollection> + 'a {
        let container = self.container;
        let scope = self.scope;
        std::iter::successors(Some(self.collection()), move |c| {
            c.parent.map(|p| container.type_def(p).collection(scope))
        })
    }

    /// Exact lookup, falling through to the ancestor chain.
    pub fn get_member(&self, name: &str) -> Option<&'a MemberDefinition> {
        self.chain().find_map(|c| c.entries.get(name))
    }

    /// Resolve a dotted path (`"address.city.name"`) hop by hop.
    ///
    /// Each hop continues in the member's element type when present,
    /// otherwise its type. Returns `None` when any hop is missing.
    pub fn get_deep_member(&self, path: &str) -> Option<&'a MemberDefinition> {
        if let Some(def) = self.get_member(path) {
            return Some(def);
        }
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.get_member(first)?;
        for segment in segments {
            let next_type = match current.path_type()? {
                TypeRef::Resolved(id) => *id,
                TypeRef::Pending(name) | TypeRef::Literal(name) => {
                    self.container.resolve_type(name).ok()?
                }
            };
            current = self.container.member_definitions(next_type).get_member(segment)?;
        }
        Some(current)
    }

    fn with_cache<T>(
        &self,
        read: impl FnOnce(&ViewCache) -> Option<T>,
        compute: impl FnOnce() -> T,
        store: impl FnOnce(&mut ViewCache, &T),
    ) -> T {
        let collection = self.collection();
        let epoch = self.container.epoch();
        {
            let mut cache = collection.cache.lock();
            if cache.epoch != epoch {
                cache.reset(epoch);
            }
            if let Some(hit) = read(&cache) {
                return hit;
            }
        }
        let value = compute();
        let mut cache = collection.cache.lock();
        if cache.epoch == epoch {
            store(&mut cache, &value);
        }
        value
    }

    fn compute_all(&self) -> Arc<[MemberDefinition]> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        for collection in self.chain() {
            for def in collection.entries.values() {
                if seen.insert(def.name.as_str()) {
                    out.push(def.clone());
                }
            }
        }
        out.into()
    }

    fn filtered(&self, pred: impl Fn(&MemberDefinition) -> bool) -> Arc<[MemberDefinition]> {
        self.as_array()
            .iter()
            .filter(|d| pred(d))
            .cloned()
            .collect::<Vec<_>>()
            .into()
    }

    /// Every visible member: own entries first, then inherited ones not shadowed.
    pub fn as_array(&self) -> Arc<[MemberDefinition]> {
        self.with_cache(
            |c| c.all.clone(),
            || self.compute_all(),
            |c, v| c.all = Some(v.clone()),
        )
    }

    pub fn get_public_mapped_properties(&self) -> Arc<[MemberDefinition]> {
        self.with_cache(
            |c| c.public_properties.clone(),
            || self.filtered(MemberDefinition::is_public_mapped_property),
            |c, v| c.public_properties = Some(v.clone()),
        )
    }

    pub fn get_public_mapped_property_names(&self) -> Arc<[String]> {
        self.with_cache(
            |c| c.public_property_names.clone(),
            || {
                self.get_public_mapped_properties()
                    .iter()
                    .map(|d| d.name.clone())
                    .collect::<Vec<_>>()
                    .into()
            },
            |c, v| c.public_property_names = Some(v.clone()),
        )
    }

    pub fn get_key_properties(&self) -> Arc<[MemberDefinition]> {
        self.with_cache(
            |c| c.key_properties.clone(),
            || self.filtered(MemberDefinition::is_key_property),
            |c, v| c.key_properties = Some(v.clone()),
        )
    }

    pub fn get_public_mapped_methods(&self) -> Arc<[MemberDefinition]> {
        self.with_cache(
            |c| c.public_methods.clone(),
            || self.filtered(MemberDefinition::is_public_mapped_method),
            |c, v| c.public_methods = Some(v.clone()),
        )
    }

    /// Members whose resolved data type is `ty`, cached per requested type.
    pub fn get_property_by_type(&self, ty: TypeId) -> Arc<[MemberDefinition]> {
        self.with_cache(
            |c| c.by_type.get(&ty).cloned(),
            || self.filtered(|d| d.data_type.as_ref().and_then(TypeRef::resolved) == Some(ty)),
            |c, v| {
                c.by_type.insert(ty, v.clone());
            },
        )
    }
}

impl std::fmt::Debug for MemberView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberView")
            .field("owner", &self.owner)
            .field("scope", &self.scope)
            .finish()
    }
}
