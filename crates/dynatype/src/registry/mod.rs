// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry and the container that owns every defined type.

mod namespace;

pub use namespace::{Namespace, NamespaceRoot};

use crate::callable::ValueFactory;
use crate::config::TypeSystemConfig;
use crate::definition::{TypeDefinition, TypeId};
use crate::error::{Result, TypeSystemError};
use crate::instance::{Receiver, Slots};
use crate::member::{MemberScope, MemberView};
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Name ↔ type lookup used by resolution and export.
pub trait TypeRegistry {
    /// Resolve a registered name (full name or alias).
    fn resolve_type(&self, name: &str) -> Result<TypeId>;

    fn is_type_registered(&self, name: &str) -> bool {
        self.resolve_type(name).is_ok()
    }

    /// Register `name` for `ty`; the first name registered is canonical.
    fn register_type(&mut self, name: &str, ty: TypeId) -> Result<()>;

    /// Canonical name of `ty`.
    fn resolve_name(&self, ty: TypeId) -> Result<String>;
}

/// Owner of all type definitions, their names and namespaces.
///
/// Definition, member addition and resolution need `&mut self`; member
/// access and instance construction only need `&self`.
///
/// # Panics
///
/// APIs taking a [`TypeId`] panic when the id was minted by another
/// container and is out of range here. Use [`Container::get_type`] to check
/// an id of unknown origin.
pub struct Container {
    config: TypeSystemConfig,
    types: Vec<TypeDefinition>,
    by_name: HashMap<String, TypeId>,
    canonical: HashMap<TypeId, String>,
    models: Namespace,
    globals: Namespace,
    root: TypeId,
    epoch: u64,
    member_serial: u64,
    open_type_default: ValueFactory,
}

impl Container {
    /// Container with default configuration and the built-in types.
    pub fn new() -> Result<Self> {
        Self::with_config(TypeSystemConfig::default())
    }

    pub fn with_config(config: TypeSystemConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| TypeSystemError::configuration(e.to_string()))?;

        let mut container = Self {
            config,
            types: Vec::new(),
            by_name: HashMap::new(),
            canonical: HashMap::new(),
            models: Namespace::new(),
            globals: Namespace::new(),
            root: TypeId::from_index(0),
            epoch: 0,
            member_serial: 0,
            open_type_default: ValueFactory::new(|| Value::Map(IndexMap::new())),
        };
        container.bootstrap()?;
        Ok(container)
    }

    pub fn config(&self) -> &TypeSystemConfig {
        &self.config
    }

    // ---- Arena ------------------------------------------------------------

    /// Panics on an id minted by another container.
    pub(crate) fn type_def(&self, id: TypeId) -> &TypeDefinition {
        &self.types[id.index()]
    }

    pub(crate) fn type_def_mut(&mut self, id: TypeId) -> &mut TypeDefinition {
        &mut self.types[id.index()]
    }

    pub(crate) fn push_type(&mut self, full_name: &str, inherits_from: Option<TypeId>) -> TypeId {
        let id = TypeId::from_index(self.types.len());
        self.types
            .push(TypeDefinition::new(id, full_name, inherits_from));
        id
    }

    pub fn get_type(&self, id: TypeId) -> Option<&TypeDefinition> {
        self.types.get(id.index())
    }

    /// Definition for a registered name.
    pub fn type_named(&self, name: &str) -> Result<&TypeDefinition> {
        Ok(self.type_def(self.resolve_type(name)?))
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ---- Capabilities -----------------------------------------------------

    /// Root of every inheritance chain.
    pub fn root_type(&self) -> TypeId {
        self.root
    }

    pub(crate) fn set_root_type(&mut self, id: TypeId) {
        self.root = id;
    }

    pub fn entity_type(&self) -> Option<TypeId> {
        self.by_name.get(&self.config.entity_type).copied()
    }

    /// Whether `id` carries the composable/entity capability.
    pub fn is_entity(&self, id: TypeId) -> bool {
        match self.entity_type() {
            Some(entity) => self.type_def(id).is_assignable_to(entity),
            None => false,
        }
    }

    pub fn is_assignable_to(&self, ty: TypeId, other: TypeId) -> bool {
        self.type_def(ty).is_assignable_to(other)
    }

    // ---- Member views -----------------------------------------------------

    pub fn member_definitions(&self, id: TypeId) -> MemberView<'_> {
        MemberView::new(self, id, MemberScope::Instance)
    }

    pub fn static_definitions(&self, id: TypeId) -> MemberView<'_> {
        MemberView::new(self, id, MemberScope::Static)
    }

    pub(crate) fn view(&self, id: TypeId, scope: MemberScope) -> MemberView<'_> {
        MemberView::new(self, id, scope)
    }

    /// Mutation counter stamped on cached member views.
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    pub(crate) fn next_member_serial(&mut self) -> u64 {
        self.member_serial += 1;
        self.member_serial
    }

    pub(crate) fn slots_of<'s>(&'s self, receiver: &'s Receiver) -> &'s Slots {
        match receiver {
            Receiver::Instance(inst) => inst.slots(),
            Receiver::Type(id) => &self.type_def(*id).static_slots,
        }
    }

    // ---- Open type --------------------------------------------------------

    /// Factory for the default value of injected open-type members.
    pub fn set_open_type_default_value(&mut self, factory: ValueFactory) {
        self.open_type_default = factory;
    }

    pub fn open_type_default_value(&self) -> &ValueFactory {
        &self.open_type_default
    }

    // ---- Namespaces -------------------------------------------------------

    pub fn namespace(&self, root: NamespaceRoot) -> &Namespace {
        match root {
            NamespaceRoot::Models => &self.models,
            NamespaceRoot::Global => &self.globals,
        }
    }

    pub fn create_or_get_namespace(
        &mut self,
        segments: &[&str],
        root: NamespaceRoot,
    ) -> &mut Namespace {
        let tree = match root {
            NamespaceRoot::Models => &mut self.models,
            NamespaceRoot::Global => &mut self.globals,
        };
        tree.create_or_get(segments)
    }

    /// Place `id` in the models tree and, under the global prefix, in the
    /// global tree without that prefix.
    pub(crate) fn place_in_namespaces(&mut self, id: TypeId) {
        let full_name = self.type_def(id).full_name.clone();
        let segments: Vec<&str> = full_name.split('.').collect();
        let Some((short, path)) = segments.split_last() else {
            return;
        };

        self.create_or_get_namespace(path, NamespaceRoot::Models)
            .insert_type(short, id);

        if path.first().copied() == Some(self.config.global_prefix.as_str()) {
            let mirrored = path[1..].to_vec();
            self.create_or_get_namespace(&mirrored, NamespaceRoot::Global)
                .insert_type(short, id);
        }
    }

    /// Extra lookup name for an existing type.
    pub fn register_alias(&mut self, alias: &str, ty: TypeId) {
        self.by_name.insert(alias.to_string(), ty);
    }
}

impl TypeRegistry for Container {
    fn resolve_type(&self, name: &str) -> Result<TypeId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| TypeSystemError::not_found(format!("Type '{}' is not registered", name)))
    }

    fn register_type(&mut self, name: &str, ty: TypeId) -> Result<()> {
        if self.get_type(ty).is_none() {
            return Err(TypeSystemError::invalid_operation(format!(
                "cannot register '{}': unknown type {}",
                name, ty
            )));
        }
        if let Some(prev) = self.by_name.insert(name.to_string(), ty) {
            if prev != ty {
                log::warn!("[registry] '{}' re-registered ({} -> {})", name, prev, ty);
            }
        }
        self.canonical
            .entry(ty)
            .or_insert_with(|| name.to_string());
        Ok(())
    }

    fn resolve_name(&self, ty: TypeId) -> Result<String> {
        self.canonical
            .get(&ty)
            .cloned()
            .ok_or_else(|| TypeSystemError::not_found(format!("no name registered for {}", ty)))
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("types", &self.types.len())
            .field("names", &self.by_name.len())
            .field("epoch", &self.epoch)
            .finish()
    }
}
