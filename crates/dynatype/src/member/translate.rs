// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Normalization of raw member declarations into descriptors.

use super::{MemberAttributes, MemberDefinition, MemberKind, MemberScope, MemberSpec, TypeRef};
use crate::bootstrap::{BOOLEAN_TYPE, NUMBER_TYPE, STRING_TYPE};
use crate::callable::MethodBody;
use crate::definition::TypeId;
use crate::error::{Result, TypeSystemError};
use crate::registry::{Container, TypeRegistry};
use crate::resolver::TypeField;
use crate::value::Value;

/// Capability of a type to rewrite declarations of members typed with it.
///
/// Returning `Ok(None)` keeps the original declaration.
pub trait MemberTranslator: Send + Sync {
    fn translate_definition(
        &self,
        spec: &MemberSpec,
        name: &str,
        owner: TypeId,
    ) -> Result<Option<MemberSpec>>;
}

impl<F> MemberTranslator for F
where
    F: Fn(&MemberSpec, &str, TypeId) -> Result<Option<MemberSpec>> + Send + Sync,
{
    fn translate_definition(
        &self,
        spec: &MemberSpec,
        name: &str,
        owner: TypeId,
    ) -> Result<Option<MemberSpec>> {
        self(spec, name, owner)
    }
}

/// Translate one declaration of `owner` into a descriptor.
///
/// Pending type names are queued on `owner` for later resolution; nothing is
/// looked up eagerly except to find a delegating translator.
pub(crate) fn translate_definition(
    container: &mut Container,
    spec: &MemberSpec,
    name: &str,
    owner: TypeId,
    scope: MemberScope,
) -> Result<MemberDefinition> {
    let mut holder = owner;
    let mut translated = None;
    if let Some(target) = translator_target(container, spec) {
        if let Some(translator) = container.type_def(target).translator.clone() {
            log::trace!(
                "[member] {} delegates translation of '{}'",
                container.type_def(target).full_name,
                name
            );
            holder = target;
            translated = translator.translate_definition(spec, name, owner)?;
        }
    }

    let source = translated.as_ref().unwrap_or(spec);
    let mut def = normalize(container, source, name)?;
    def.defined_by = Some(holder);
    if scope == MemberScope::Static {
        def.class_member = true;
    }
    enqueue_forward_refs(container, owner, scope, &mut def);
    Ok(def)
}

/// Registered type named by the declaration's `type` attribute, if any.
fn translator_target(container: &Container, spec: &MemberSpec) -> Option<TypeId> {
    match spec.attributes()?.ty.as_ref()? {
        TypeRef::Resolved(id) => Some(*id),
        TypeRef::Pending(name) if !name.starts_with(container.config().escape_marker.as_str()) => {
            container.resolve_type(name).ok()
        }
        _ => None,
    }
}

fn normalize(container: &Container, spec: &MemberSpec, name: &str) -> Result<MemberDefinition> {
    let def = match spec {
        MemberSpec::Method(body) => {
            let mut def = MemberDefinition::new(name, MemberKind::Method);
            def.method = Some(body.clone());
            def
        }
        MemberSpec::Abstract => {
            let mut def = MemberDefinition::new(name, MemberKind::Method);
            def.method = Some(abstract_body(name));
            def
        }
        MemberSpec::Number(n) => shorthand(container, name, NUMBER_TYPE, Value::Number(*n)),
        MemberSpec::Text(s) => shorthand(container, name, STRING_TYPE, Value::String(s.clone())),
        MemberSpec::Boolean(b) => shorthand(container, name, BOOLEAN_TYPE, Value::Bool(*b)),
        MemberSpec::Attributes(attrs) => from_attributes(name, attrs),
    };
    if def.kind == MemberKind::Method && def.method.is_none() {
        return Err(TypeSystemError::configuration(format!(
            "Method member '{}' has no body",
            name
        )));
    }
    Ok(def)
}

fn shorthand(container: &Container, name: &str, type_name: &str, value: Value) -> MemberDefinition {
    let ty = match container.resolve_type(type_name) {
        Ok(id) => TypeRef::Resolved(id),
        Err(_) => TypeRef::Pending(type_name.to_string()),
    };
    let mut def = MemberDefinition::new(name, MemberKind::Property);
    def.ty = Some(ty.clone());
    def.data_type = Some(ty.clone());
    def.original_type = Some(ty);
    def.value = Some(value);
    def.enumerable = Some(true);
    def.configurable = Some(true);
    def
}

fn from_attributes(name: &str, attrs: &MemberAttributes) -> MemberDefinition {
    let kind = attrs.kind.unwrap_or(if attrs.method.is_some() {
        MemberKind::Method
    } else {
        MemberKind::Property
    });
    let mut def = MemberDefinition::new(name, kind);

    let data_type = attrs.data_type.clone().or_else(|| attrs.ty.clone());
    def.ty = attrs.ty.clone().or_else(|| data_type.clone());
    def.data_type = data_type;
    def.original_type = def.ty.clone();
    def.element_type = attrs.element_type.clone();
    def.original_element_type = attrs.element_type.clone();

    def.key = attrs.key.unwrap_or(false);
    def.computed = attrs.computed.unwrap_or(false);
    def.store_on_object = attrs.store_on_object.unwrap_or(false);
    def.not_mapped = attrs.not_mapped.unwrap_or(false);
    def.enumerable = Some(attrs.enumerable.unwrap_or(true));
    def.configurable = Some(attrs.configurable.unwrap_or(true));
    def.value = attrs.value.clone();
    def.default_value = attrs.default_value.clone();
    def.method = attrs.method.clone();
    def.getter = attrs.get.clone();
    def.setter = attrs.set.clone();
    def.extra = attrs.extra.clone();
    def
}

fn abstract_body(name: &str) -> MethodBody {
    let member = name.to_string();
    MethodBody::new(move |ctx, _| {
        let owner = ctx
            .container()
            .resolve_name(ctx.this().type_id())
            .unwrap_or_default();
        Err(TypeSystemError::not_implemented(format!(
            "Pure class: {} is abstract",
            member
        ))
        .with_context(owner))
    })
}

/// Queue resolution work for the type fields of `def`, owned by `owner`.
///
/// Escaped names become literals. A field already holding a composable type
/// queues a cascade into it. `def` gets a fresh serial, so steps queued for a
/// member it later replaces are skipped.
pub(crate) fn enqueue_forward_refs(
    container: &mut Container,
    owner: TypeId,
    scope: MemberScope,
    def: &mut MemberDefinition,
) {
    let marker = container.config().escape_marker.clone();
    def.serial = container.next_member_serial();

    match def.ty.clone() {
        Some(TypeRef::Resolved(id)) => container.add_child_thunk(owner, id),
        Some(TypeRef::Pending(name)) => match TypeRef::parse(&name, &marker) {
            literal @ TypeRef::Literal(_) => {
                def.ty = Some(literal.clone());
                def.data_type = Some(literal);
            }
            _ => container.add_member_thunk(owner, scope, def, TypeField::Type, name),
        },
        _ => {}
    }

    match def.element_type.clone() {
        Some(TypeRef::Resolved(id)) => container.add_child_thunk(owner, id),
        Some(TypeRef::Pending(name)) => match TypeRef::parse(&name, &marker) {
            literal @ TypeRef::Literal(_) => def.element_type = Some(literal),
            _ => container.add_member_thunk(owner, scope, def, TypeField::ElementType, name),
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_and_data_type_alias_each_other() {
        let def = from_attributes("a", &MemberAttributes::new().ty("App.X"));
        assert_eq!(def.data_type, Some(TypeRef::Pending("App.X".into())));
        assert_eq!(def.original_type, Some(TypeRef::Pending("App.X".into())));

        let def = from_attributes("b", &MemberAttributes::new().data_type("App.Y"));
        assert_eq!(def.ty, Some(TypeRef::Pending("App.Y".into())));
    }

    #[test]
    fn attribute_defaults() {
        let def = from_attributes("a", &MemberAttributes::new());
        assert_eq!(def.kind, MemberKind::Property);
        assert_eq!(def.enumerable, Some(true));
        assert_eq!(def.configurable, Some(true));
        assert!(!def.key);

        let def = from_attributes("b", &MemberAttributes::new().enumerable(false));
        assert_eq!(def.enumerable, Some(false));
    }
}
