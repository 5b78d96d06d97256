// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type composition.
//!
//! A definition names one base type and any number of mixins and
//! propagations:
//!
//! - the base is inherited: lookups fall through to it at runtime;
//! - a mixin's members are copied into the new type, first writer wins;
//! - a propagation's members are copied as forwarders to a delegate instance
//!   the constructor stores in a named slot.
//!
//! Member types may be given by name and are resolved later, see
//! [`Container::resolve_forward_declarations`].

mod accessor;
mod constructor;
mod open_type;

pub use accessor::{AccessorPolicy, Attachment};
pub use constructor::{ConstructorPlan, ConstructorStep, CtorParam};

use crate::callable::{Getter, Setter};
use crate::definition::{TypeId, TypeProcessor};
use crate::error::{Result, TypeSystemError};
use crate::instance::CallContext;
use crate::member::{
    translate_definition, MemberAttributes, MemberDefinition, MemberMap, MemberScope, MemberSpec,
    MemberTranslator, TypeRef,
};
use crate::registry::{Container, TypeRegistry};
use crate::value::Value;
use crate::{CONSTRUCTOR_MEMBER, OPEN_TYPE_MEMBER};
use std::collections::HashSet;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// CompositionSpec
// ---------------------------------------------------------------------------

/// One entry of a definition's base list.
///
/// Index 0 is the real base; later entries are mixins, or propagations when
/// `propagate_to` names a slot.
#[derive(Debug, Clone)]
pub struct CompositionSpec {
    pub ty: Option<TypeId>,
    pub params: Option<Vec<CtorParam>>,
    pub propagate_to: Option<String>,
}

impl CompositionSpec {
    pub fn base(ty: TypeId) -> Self {
        Self {
            ty: Some(ty),
            params: None,
            propagate_to: None,
        }
    }

    pub fn mixin(ty: TypeId) -> Self {
        Self::base(ty)
    }

    pub fn propagation(ty: TypeId, slot: impl Into<String>) -> Self {
        Self {
            propagate_to: Some(slot.into()),
            ..Self::base(ty)
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<CtorParam>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn is_propagation(&self) -> bool {
        self.propagate_to.is_some()
    }
}

impl From<TypeId> for CompositionSpec {
    fn from(ty: TypeId) -> Self {
        CompositionSpec::base(ty)
    }
}

// ---------------------------------------------------------------------------
// TypeBuilder
// ---------------------------------------------------------------------------

/// Fluent front end for [`Container::define_ex`].
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    name: String,
    base: Option<CompositionSpec>,
    composition: Vec<CompositionSpec>,
    instance: MemberMap,
    statics: MemberMap,
}

impl TypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            composition: Vec::new(),
            instance: MemberMap::new(),
            statics: MemberMap::new(),
        }
    }

    pub fn base(mut self, ty: TypeId) -> Self {
        self.base = Some(CompositionSpec::base(ty));
        self
    }

    pub fn base_with_params(mut self, ty: TypeId, params: Vec<CtorParam>) -> Self {
        self.base = Some(CompositionSpec::base(ty).with_params(params));
        self
    }

    pub fn mixin(mut self, ty: TypeId) -> Self {
        self.composition.push(CompositionSpec::mixin(ty));
        self
    }

    pub fn propagate(mut self, ty: TypeId, slot: impl Into<String>) -> Self {
        self.composition.push(CompositionSpec::propagation(ty, slot));
        self
    }

    pub fn propagate_with(
        mut self,
        ty: TypeId,
        slot: impl Into<String>,
        params: Vec<CtorParam>,
    ) -> Self {
        self.composition
            .push(CompositionSpec::propagation(ty, slot).with_params(params));
        self
    }

    pub fn member(mut self, name: impl Into<String>, spec: impl Into<MemberSpec>) -> Self {
        self.instance.insert(name, spec);
        self
    }

    pub fn static_member(mut self, name: impl Into<String>, spec: impl Into<MemberSpec>) -> Self {
        self.statics.insert(name, spec);
        self
    }

    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&CallContext<'_>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.instance = self.instance.constructor(f);
        self
    }

    /// Mark the type open: `true` for the default bag name, or a name.
    pub fn open_type(mut self, flag: impl Into<Value>) -> Self {
        self.statics
            .insert(OPEN_TYPE_MEMBER, MemberAttributes::new().value(flag));
        self
    }

    pub fn define(self, container: &mut Container) -> Result<TypeId> {
        let mut bases = Vec::with_capacity(1 + self.composition.len());
        if self.base.is_some() || !self.composition.is_empty() {
            bases.push(self.base.unwrap_or(CompositionSpec {
                ty: None,
                params: None,
                propagate_to: None,
            }));
        }
        bases.extend(self.composition);
        container.define_ex(&self.name, bases, self.instance, self.statics)
    }
}

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

impl Container {
    /// Define a type with a single base (the root when `None`).
    pub fn define(
        &mut self,
        name: &str,
        base: Option<TypeId>,
        instance: MemberMap,
        statics: MemberMap,
    ) -> Result<TypeId> {
        let bases = base.map(CompositionSpec::base).into_iter().collect();
        self.define_ex(name, bases, instance, statics)
    }

    /// Define a type deriving from `base`.
    pub fn extend(
        &mut self,
        base: TypeId,
        name: &str,
        instance: MemberMap,
        statics: MemberMap,
    ) -> Result<TypeId> {
        self.define_ex(name, vec![CompositionSpec::base(base)], instance, statics)
    }

    /// Define a type from a base/mixin/propagation list and member maps.
    ///
    /// The type is registered before its members are built; an error while
    /// building leaves it registered but incomplete.
    pub fn define_ex(
        &mut self,
        name: &str,
        bases: Vec<CompositionSpec>,
        instance: MemberMap,
        statics: MemberMap,
    ) -> Result<TypeId> {
        if name.is_empty() || name.split('.').any(str::is_empty) {
            return Err(TypeSystemError::configuration(format!(
                "invalid type name '{}'",
                name
            )));
        }
        let bases = self.normalize_bases(bases)?;
        let base = bases[0].ty.unwrap_or(self.root_type());

        let id = self.push_type(name, Some(base));
        self.register_type(name, id)?;

        let plan = self.assemble_constructor(base, &bases, &instance);
        self.type_def_mut(id).constructor = plan;

        self.build_type(id, &bases, instance, statics).map_err(|e| {
            if e.context().is_none() {
                e.with_context(name.to_string())
            } else {
                e
            }
        })?;

        self.place_in_namespaces(id);
        self.run_inherited_processors(id)?;

        log::debug!(
            "[composer] defined {} ({} members, {} statics, {} mixins, {} propagations)",
            name,
            self.type_def(id).member_definitions.len(),
            self.type_def(id).static_definitions.len(),
            self.type_def(id).mixins.len(),
            self.type_def(id).propagations.len()
        );
        Ok(id)
    }

    fn normalize_bases(&self, mut bases: Vec<CompositionSpec>) -> Result<Vec<CompositionSpec>> {
        if bases.is_empty() {
            bases.push(CompositionSpec::base(self.root_type()));
        }
        for (i, entry) in bases.iter_mut().enumerate() {
            if i == 0 {
                if entry.is_propagation() {
                    return Err(TypeSystemError::configuration(
                        "the first composition entry is the base type and cannot propagate",
                    ));
                }
                entry.ty.get_or_insert(self.root_type());
            }
            let Some(ty) = entry.ty else {
                return Err(TypeSystemError::configuration(format!(
                    "composition entry {} has no type",
                    i
                )));
            };
            if self.get_type(ty).is_none() {
                return Err(TypeSystemError::configuration(format!(
                    "composition entry {} references unknown type {}",
                    i, ty
                )));
            }
            if entry.propagate_to.as_deref() == Some("") {
                return Err(TypeSystemError::configuration(format!(
                    "composition entry {} has an empty propagation slot",
                    i
                )));
            }
        }
        Ok(bases)
    }

    fn assemble_constructor(
        &self,
        base: TypeId,
        bases: &[CompositionSpec],
        instance: &MemberMap,
    ) -> ConstructorPlan {
        let mut plan = ConstructorPlan::default();
        let extra = || bases.iter().skip(1).filter_map(|e| e.ty.map(|t| (t, e)));

        for (ty, _) in extra().filter(|(_, e)| !e.is_propagation()) {
            let body = self
                .member_definitions(ty)
                .get_member(CONSTRUCTOR_MEMBER)
                .and_then(|d| d.method.clone());
            if let Some(body) = body {
                plan.push(ConstructorStep::Mixin { ty, body });
            }
        }

        if base != self.root_type() {
            plan.push(ConstructorStep::Base {
                ty: base,
                params: bases[0].params.clone(),
            });
        }

        let own = match instance.get(CONSTRUCTOR_MEMBER) {
            Some(MemberSpec::Method(body)) => Some(body.clone()),
            Some(MemberSpec::Attributes(attrs)) => attrs.method.clone(),
            _ => None,
        };
        if let Some(body) = own {
            plan.push(ConstructorStep::Own(body));
        }

        for (ty, entry) in extra() {
            if let Some(slot) = &entry.propagate_to {
                plan.push(ConstructorStep::Propagation {
                    ty,
                    params: entry.params.clone(),
                    slot: slot.clone(),
                });
            }
        }
        plan
    }

    fn build_type(
        &mut self,
        id: TypeId,
        bases: &[CompositionSpec],
        mut instance: MemberMap,
        mut statics: MemberMap,
    ) -> Result<()> {
        let base = self.type_def(id).inherits_from.unwrap_or(self.root_type());
        self.type_def_mut(base).derived_types.push(id);

        let mut base_types = self.type_def(base).base_types.clone();
        base_types.extend(bases.iter().filter_map(|b| b.ty));
        self.type_def_mut(id).base_types = base_types;

        let inherited_statics = self.static_definitions(base).as_array();
        for def in inherited_statics.iter() {
            self.copy_member(id, def.clone(), None, MemberScope::Static)?;
        }

        let open_type_inherited = self
            .static_definitions(id)
            .get_member(OPEN_TYPE_MEMBER)
            .is_some();
        if open_type_inherited {
            statics.remove(OPEN_TYPE_MEMBER);
        }
        for (name, spec) in statics.iter() {
            if name == CONSTRUCTOR_MEMBER {
                continue;
            }
            let def = translate_definition(self, spec, name, id, MemberScope::Static)?;
            self.build_member(id, def, None, MemberScope::Static)?;
        }

        if !open_type_inherited {
            self.apply_open_type(id, &mut instance)?;
        }
        for (name, spec) in instance.iter() {
            let def = translate_definition(self, spec, name, id, MemberScope::Instance)?;
            self.build_member(id, def, None, MemberScope::Instance)?;
        }

        for entry in bases.iter().skip(1) {
            let Some(source) = entry.ty else { continue };
            self.merge_members(id, source, entry.propagate_to.clone())?;
            let target = self.type_def_mut(id);
            if entry.is_propagation() {
                target.propagations.push(entry.clone());
            } else {
                target.mixins.push(entry.clone());
            }
        }
        Ok(())
    }

    /// Copy every member of `source` not yet visible on `id`.
    ///
    /// Propagations forward instance members to the delegate slot and do not
    /// bring statics along.
    fn merge_members(&mut self, id: TypeId, source: TypeId, slot: Option<String>) -> Result<()> {
        let members = self.member_definitions(source).as_array();
        for def in members.iter() {
            if def.name == CONSTRUCTOR_MEMBER
                || self.member_definitions(id).get_member(&def.name).is_some()
            {
                continue;
            }
            self.copy_member(id, def.clone(), slot.clone(), MemberScope::Instance)?;
        }

        if slot.is_some() {
            return Ok(());
        }
        let statics = self.static_definitions(source).as_array();
        for def in statics.iter() {
            if def.name == CONSTRUCTOR_MEMBER
                || self.static_definitions(id).get_member(&def.name).is_some()
            {
                continue;
            }
            self.copy_member(id, def.clone(), None, MemberScope::Static)?;
        }
        Ok(())
    }

    /// Build an already translated descriptor on another type, queueing its
    /// own resolution of any pending type names.
    fn copy_member(
        &mut self,
        id: TypeId,
        mut def: MemberDefinition,
        propagation: Option<String>,
        scope: MemberScope,
    ) -> Result<()> {
        crate::member::enqueue_forward_refs(self, id, scope, &mut def);
        self.build_member(id, def, propagation, scope)
    }

    fn run_inherited_processors(&mut self, id: TypeId) -> Result<()> {
        let mut seen = HashSet::new();
        let processors: Vec<TypeProcessor> = self
            .type_def(id)
            .base_types
            .iter()
            .filter(|b| seen.insert(**b))
            .filter_map(|b| self.type_def(*b).processor.clone())
            .collect();
        for processor in processors {
            processor(self, id)?;
        }
        Ok(())
    }

    // ---- Type-level member API -------------------------------------------

    /// Member visible on instances of `ty`, own or inherited.
    pub fn get_member_definition(&self, ty: TypeId, name: &str) -> Option<&MemberDefinition> {
        self.member_definitions(ty).get_member(name)
    }

    /// Add an instance member, or a static one with `class_member`.
    pub fn add_member(
        &mut self,
        ty: TypeId,
        name: &str,
        spec: impl Into<MemberSpec>,
        class_member: bool,
    ) -> Result<()> {
        let scope = if class_member {
            MemberScope::Static
        } else {
            MemberScope::Instance
        };
        let def = translate_definition(self, &spec.into(), name, ty, scope)?;
        self.build_member(ty, def, None, scope)
    }

    /// Add an unmapped instance property with explicit accessors.
    ///
    /// Missing halves default to a getter returning null and a setter that
    /// ignores the value.
    pub fn add_property(
        &mut self,
        ty: TypeId,
        name: &str,
        type_ref: Option<TypeRef>,
        get: Option<Getter>,
        set: Option<Setter>,
    ) -> Result<()> {
        let mut attrs = MemberAttributes::new()
            .not_mapped()
            .store_on_object()
            .get(get.unwrap_or_else(|| Getter::new(|_| Ok(Value::Null))))
            .set(set.unwrap_or_else(|| Setter::new(|_, _| Ok(()))));
        attrs.ty = type_ref;
        self.add_member(ty, name, attrs, false)
    }

    /// Add an instance member that must not exist yet.
    pub fn describe_field(&mut self, ty: TypeId, name: &str, spec: impl Into<MemberSpec>) -> Result<()> {
        if self.get_member_definition(ty, name).is_some() {
            return Err(TypeSystemError::invalid_operation(format!(
                "Field '{}' already defined!",
                name
            ))
            .with_context(self.type_def(ty).full_name.clone()));
        }
        self.add_member(ty, name, spec, false)
    }

    /// Give `ty` the capability to translate members declared with it.
    pub fn set_member_translator(&mut self, ty: TypeId, translator: Arc<dyn MemberTranslator>) {
        self.type_def_mut(ty).translator = Some(translator);
    }

    /// Run `processor` for every type later defined with `ty` in its ancestry.
    pub fn set_inherited_type_processor(&mut self, ty: TypeId, processor: TypeProcessor) {
        self.type_def_mut(ty).processor = Some(processor);
    }
}
