// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Normalized member descriptor.

use super::{MemberKind, TypeRef};
use crate::callable::{Getter, MethodBody, Setter, ValueFactory};
use crate::definition::TypeId;
use crate::registry::TypeRegistry;
use crate::value::Value;
use indexmap::IndexMap;

/// Normalized declaration of one member of a type.
///
/// Built once per definition or `add_member` call; afterwards only forward
/// resolution rewrites its type fields.
#[derive(Debug, Clone)]
pub struct MemberDefinition {
    pub name: String,
    pub kind: MemberKind,
    pub ty: Option<TypeRef>,
    pub data_type: Option<TypeRef>,
    pub original_type: Option<TypeRef>,
    pub element_type: Option<TypeRef>,
    pub original_element_type: Option<TypeRef>,
    pub key: bool,
    pub computed: bool,
    pub store_on_object: bool,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
    pub not_mapped: bool,
    pub class_member: bool,
    pub value: Option<Value>,
    pub default_value: Option<ValueFactory>,
    pub method: Option<MethodBody>,
    pub getter: Option<Getter>,
    pub setter: Option<Setter>,
    pub extra: IndexMap<String, Value>,
    pub(crate) defined_by: Option<TypeId>,
    pub(crate) storage_model: Option<Value>,
    /// Stamp matched by queued resolution steps; a replaced member gets a new one.
    pub(crate) serial: u64,
}

impl MemberDefinition {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ty: None,
            data_type: None,
            original_type: None,
            element_type: None,
            original_element_type: None,
            key: false,
            computed: false,
            store_on_object: false,
            enumerable: None,
            configurable: None,
            not_mapped: false,
            class_member: false,
            value: None,
            default_value: None,
            method: None,
            getter: None,
            setter: None,
            extra: IndexMap::new(),
            defined_by: None,
            storage_model: None,
            serial: 0,
        }
    }

    /// Type that declared (or translated) this member.
    pub fn defined_by(&self) -> Option<TypeId> {
        self.defined_by
    }

    /// Storage-layer annotation; never exported.
    pub fn storage_model(&self) -> Option<&Value> {
        self.storage_model.as_ref()
    }

    pub fn is_public_mapped_property(&self) -> bool {
        self.kind == MemberKind::Property && self.enumerable == Some(true) && !self.not_mapped
    }

    pub fn is_public_mapped_method(&self) -> bool {
        self.kind == MemberKind::Method && self.method.is_some()
    }

    pub fn is_key_property(&self) -> bool {
        self.kind == MemberKind::Property && self.key
    }

    /// Type followed when walking a dotted member path.
    pub fn path_type(&self) -> Option<&TypeRef> {
        self.element_type.as_ref().or(self.ty.as_ref())
    }

    /// Produce a fresh default from the factory, if any.
    pub fn make_default(&self) -> Option<Value> {
        self.default_value.as_ref().map(ValueFactory::produce)
    }

    /// Own attributes that are set, in a stable order.
    ///
    /// Callables and the bookkeeping fields are left out.
    pub fn attributes(&self) -> Vec<(String, Value)> {
        let mut out: Vec<(String, Value)> = Vec::with_capacity(12 + self.extra.len());
        out.push(("name".into(), Value::from(self.name.as_str())));
        out.push(("kind".into(), Value::from(self.kind.as_str())));

        let refs = [
            ("type", &self.ty),
            ("dataType", &self.data_type),
            ("originalType", &self.original_type),
            ("elementType", &self.element_type),
            ("originalElementType", &self.original_element_type),
        ];
        for (label, r) in refs {
            if let Some(r) = r {
                out.push((label.into(), type_ref_value(r)));
            }
        }

        let flags = [
            ("key", self.key),
            ("computed", self.computed),
            ("storeOnObject", self.store_on_object),
            ("notMapped", self.not_mapped),
            ("classMember", self.class_member),
        ];
        for (label, set) in flags {
            if set {
                out.push((label.into(), Value::Bool(true)));
            }
        }
        if let Some(e) = self.enumerable {
            out.push(("enumerable".into(), Value::Bool(e)));
        }
        if let Some(c) = self.configurable {
            out.push(("configurable".into(), Value::Bool(c)));
        }
        if let Some(v) = &self.value {
            out.push(("value".into(), v.clone()));
        }
        for (k, v) in &self.extra {
            out.push((k.clone(), v.clone()));
        }
        out
    }

    /// Export as a JSON object with type references rendered by name.
    pub fn to_json(&self, registry: &dyn TypeRegistry) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .attributes()
            .into_iter()
            .map(|(k, v)| (k, v.to_json(registry)))
            .collect();
        serde_json::Value::Object(map)
    }
}

fn type_ref_value(r: &TypeRef) -> Value {
    match r {
        TypeRef::Resolved(id) => Value::Type(*id),
        TypeRef::Pending(s) | TypeRef::Literal(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_skip_unset_fields() {
        let mut def = MemberDefinition::new("id", MemberKind::Property);
        def.key = true;
        def.ty = Some(TypeRef::Pending("App.Id".into()));
        def.storage_model = Some(Value::from("table"));
        let attrs = def.attributes();
        let names: Vec<&str> = attrs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["name", "kind", "type", "key"]);
    }

    #[test]
    fn classification() {
        let mut def = MemberDefinition::new("n", MemberKind::Property);
        assert!(!def.is_public_mapped_property());
        def.enumerable = Some(true);
        assert!(def.is_public_mapped_property());
        def.not_mapped = true;
        assert!(!def.is_public_mapped_property());

        let m = MemberDefinition::new("run", MemberKind::Method);
        assert!(!m.is_public_mapped_method());
    }

    #[test]
    fn path_type_prefers_element_type() {
        let mut def = MemberDefinition::new("items", MemberKind::Property);
        def.ty = Some(TypeRef::Pending("Array".into()));
        assert_eq!(def.path_type(), Some(&TypeRef::Pending("Array".into())));
        def.element_type = Some(TypeRef::Pending("App.Item".into()));
        assert_eq!(def.path_type(), Some(&TypeRef::Pending("App.Item".into())));
    }
}
