// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built type objects.

use crate::composer::{Attachment, CompositionSpec, ConstructorPlan};
use crate::instance::Slots;
use crate::member::{MemberDefinitionCollection, MemberScope, MemberTranslator};
use crate::metadata::MetadataTable;
use crate::registry::Container;
use crate::resolver::ForwardResolver;
use crate::error::Result;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Index of a type in its container.
///
/// Ids are scoped to the container that minted them. Passing an id to
/// another container is a caller bug: `get_type` returns `None` for an
/// unknown id, while the member and dispatch APIs panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hook run for every type defined with this type among its ancestors.
pub type TypeProcessor = Arc<dyn Fn(&mut Container, TypeId) -> Result<()> + Send + Sync>;

/// Member name → attached accessor or method.
pub(crate) type MemberTable = IndexMap<String, Attachment>;

/// A fully built type.
pub struct TypeDefinition {
    pub(crate) id: TypeId,
    pub(crate) full_name: String,
    pub(crate) short_name: String,
    pub(crate) namespace: String,
    pub(crate) inherits_from: Option<TypeId>,
    pub(crate) base_types: Vec<TypeId>,
    pub(crate) derived_types: Vec<TypeId>,
    pub(crate) member_definitions: MemberDefinitionCollection,
    pub(crate) static_definitions: MemberDefinitionCollection,
    pub(crate) prototype: MemberTable,
    pub(crate) static_table: MemberTable,
    pub(crate) static_slots: Slots,
    pub(crate) mixins: Vec<CompositionSpec>,
    pub(crate) propagations: Vec<CompositionSpec>,
    pub(crate) constructor: ConstructorPlan,
    pub(crate) resolver: ForwardResolver,
    pub(crate) metadata: MetadataTable,
    pub(crate) translator: Option<Arc<dyn MemberTranslator>>,
    pub(crate) processor: Option<TypeProcessor>,
}

impl TypeDefinition {
    pub(crate) fn new(id: TypeId, full_name: &str, inherits_from: Option<TypeId>) -> Self {
        let (namespace, short_name) = match full_name.rfind('.') {
            Some(pos) => (&full_name[..pos], &full_name[pos + 1..]),
            None => ("", full_name),
        };
        Self {
            id,
            full_name: full_name.to_string(),
            short_name: short_name.to_string(),
            namespace: namespace.to_string(),
            inherits_from,
            base_types: Vec::new(),
            derived_types: Vec::new(),
            member_definitions: MemberDefinitionCollection::new(
                id,
                MemberScope::Instance,
                inherits_from,
            ),
            static_definitions: MemberDefinitionCollection::new(id, MemberScope::Static, None),
            prototype: MemberTable::new(),
            static_table: MemberTable::new(),
            static_slots: Slots::new(),
            mixins: Vec::new(),
            propagations: Vec::new(),
            constructor: ConstructorPlan::default(),
            resolver: ForwardResolver::default(),
            metadata: MetadataTable::default(),
            translator: None,
            processor: None,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Last segment of the full name.
    pub fn name(&self) -> &str {
        &self.short_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn inherits_from(&self) -> Option<TypeId> {
        self.inherits_from
    }

    /// Linearized ancestry, frozen when the type was defined.
    pub fn base_types(&self) -> &[TypeId] {
        &self.base_types
    }

    /// Types defined with this one as their direct base.
    pub fn derived_types(&self) -> &[TypeId] {
        &self.derived_types
    }

    pub fn mixins(&self) -> &[CompositionSpec] {
        &self.mixins
    }

    pub fn propagations(&self) -> &[CompositionSpec] {
        &self.propagations
    }

    pub fn constructor_plan(&self) -> &ConstructorPlan {
        &self.constructor
    }

    /// Instance members declared on this type only.
    pub fn members(&self) -> &MemberDefinitionCollection {
        &self.member_definitions
    }

    pub fn statics(&self) -> &MemberDefinitionCollection {
        &self.static_definitions
    }

    pub fn resolver(&self) -> &ForwardResolver {
        &self.resolver
    }

    pub fn is_assignable_to(&self, other: TypeId) -> bool {
        self.id == other || self.base_types.contains(&other)
    }

    pub fn has_translator(&self) -> bool {
        self.translator.is_some()
    }

    pub(crate) fn collection(&self, scope: MemberScope) -> &MemberDefinitionCollection {
        match scope {
            MemberScope::Instance => &self.member_definitions,
            MemberScope::Static => &self.static_definitions,
        }
    }

    pub(crate) fn collection_mut(&mut self, scope: MemberScope) -> &mut MemberDefinitionCollection {
        match scope {
            MemberScope::Instance => &mut self.member_definitions,
            MemberScope::Static => &mut self.static_definitions,
        }
    }

    pub(crate) fn table_mut(&mut self, scope: MemberScope) -> &mut MemberTable {
        match scope {
            MemberScope::Instance => &mut self.prototype,
            MemberScope::Static => &mut self.static_table,
        }
    }
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("id", &self.id)
            .field("full_name", &self.full_name)
            .field("inherits_from", &self.inherits_from)
            .field("base_types", &self.base_types)
            .field("members", &self.member_definitions.len())
            .field("statics", &self.static_definitions.len())
            .field("resolution", &self.resolver.state())
            .finish()
    }
}
