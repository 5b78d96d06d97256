// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Open types: composable types that accept arbitrary extra properties
//! through one well-known bag member.

use crate::definition::TypeId;
use crate::error::{Result, TypeSystemError};
use crate::instance::Receiver;
use crate::member::{MemberAttributes, MemberMap, TypeRef};
use crate::registry::{Container, TypeRegistry};
use crate::value::Value;
use crate::OPEN_TYPE_MEMBER;

impl Container {
    /// Name of the bag member requested by the type's `openType` static.
    fn open_type_property(&self, id: TypeId) -> Option<String> {
        match self.get(&Receiver::Type(id), OPEN_TYPE_MEMBER).ok()? {
            Value::String(name) if !name.is_empty() => Some(name),
            Value::String(_) | Value::Bool(true) => {
                Some(self.config().open_type.property_name.clone())
            }
            _ => None,
        }
    }

    fn resolve_ref(&self, r: Option<&TypeRef>) -> Option<TypeId> {
        match r? {
            TypeRef::Resolved(id) => Some(*id),
            TypeRef::Pending(name) => self.resolve_type(name).ok(),
            TypeRef::Literal(_) => None,
        }
    }

    /// Inject the bag member into `instance` when the type is open and
    /// composable, or check a declared one against the default type.
    ///
    /// Callers skip this when the base type already declared `openType`.
    pub(crate) fn apply_open_type(&self, id: TypeId, instance: &mut MemberMap) -> Result<()> {
        let Some(property) = self.open_type_property(id) else {
            return Ok(());
        };
        if !self.is_entity(id) {
            return Ok(());
        }
        let default_type = self.resolve_type(&self.config().open_type.default_type)?;
        let mismatch = || {
            TypeSystemError::type_mismatch("OpenType default type mismatch").with_context(format!(
                "{}.{}",
                self.type_def(id).full_name,
                property
            ))
        };

        if let Some(existing) = self.member_definitions(id).get_member(&property) {
            let declared = existing.ty.as_ref().or(existing.data_type.as_ref());
            if self.resolve_ref(declared) != Some(default_type) {
                return Err(mismatch());
            }
            return Ok(());
        }

        if let Some(spec) = instance.get(&property) {
            if self.resolve_ref(spec.declared_type().as_ref()) != Some(default_type) {
                return Err(mismatch());
            }
            return Ok(());
        }

        log::debug!(
            "[composer] open type {}: injecting '{}'",
            self.type_def(id).full_name,
            property
        );
        instance.insert(
            property,
            MemberAttributes::new()
                .ty(default_type)
                .default_value(self.open_type_default_value().clone()),
        );
        Ok(())
    }
}
