// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Raw declarative member input.

use super::{MemberKind, TypeRef};
use crate::bootstrap::{BOOLEAN_TYPE, NUMBER_TYPE, STRING_TYPE};
use crate::callable::{Getter, MethodBody, Setter, ValueFactory};
use crate::error::Result;
use crate::instance::CallContext;
use crate::value::Value;
use indexmap::IndexMap;

/// Attribute-object form of a member declaration.
///
/// Every field is optional; translation copies what is set.
#[derive(Debug, Clone, Default)]
pub struct MemberAttributes {
    pub kind: Option<MemberKind>,
    pub ty: Option<TypeRef>,
    pub data_type: Option<TypeRef>,
    pub element_type: Option<TypeRef>,
    pub key: Option<bool>,
    pub computed: Option<bool>,
    pub store_on_object: Option<bool>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
    pub not_mapped: Option<bool>,
    pub value: Option<Value>,
    pub default_value: Option<ValueFactory>,
    pub method: Option<MethodBody>,
    pub get: Option<Getter>,
    pub set: Option<Setter>,
    pub extra: IndexMap<String, Value>,
}

impl MemberAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: MemberKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn ty(mut self, ty: impl Into<TypeRef>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn data_type(mut self, ty: impl Into<TypeRef>) -> Self {
        self.data_type = Some(ty.into());
        self
    }

    pub fn element_type(mut self, ty: impl Into<TypeRef>) -> Self {
        self.element_type = Some(ty.into());
        self
    }

    pub fn key(mut self) -> Self {
        self.key = Some(true);
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = Some(true);
        self
    }

    pub fn store_on_object(mut self) -> Self {
        self.store_on_object = Some(true);
        self
    }

    pub fn enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    pub fn configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    pub fn not_mapped(mut self) -> Self {
        self.not_mapped = Some(true);
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn default_value(mut self, factory: ValueFactory) -> Self {
        self.default_value = Some(factory);
        self
    }

    pub fn method(mut self, body: MethodBody) -> Self {
        self.kind.get_or_insert(MemberKind::Method);
        self.method = Some(body);
        self
    }

    pub fn get(mut self, getter: Getter) -> Self {
        self.get = Some(getter);
        self
    }

    pub fn set(mut self, setter: Setter) -> Self {
        self.set = Some(setter);
        self
    }

    /// Free-form attribute carried through to export and metadata.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// One member declaration as supplied to a definition call.
#[derive(Debug, Clone)]
pub enum MemberSpec {
    /// Bare method body.
    Method(MethodBody),
    /// Method that fails with `NotImplemented` when invoked.
    Abstract,
    /// Number shorthand: a number property with this default.
    Number(f64),
    /// String shorthand: a string property with this default.
    Text(String),
    /// Boolean shorthand: a boolean property with this default.
    Boolean(bool),
    Attributes(MemberAttributes),
}

impl MemberSpec {
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&CallContext<'_>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        MemberSpec::Method(MethodBody::new(f))
    }

    pub fn abstract_method() -> Self {
        MemberSpec::Abstract
    }

    /// Property of the given type.
    pub fn property(ty: impl Into<TypeRef>) -> Self {
        MemberSpec::Attributes(MemberAttributes::new().ty(ty))
    }

    pub fn attributes(&self) -> Option<&MemberAttributes> {
        match self {
            MemberSpec::Attributes(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Type the declaration implies, before any resolution.
    pub fn declared_type(&self) -> Option<TypeRef> {
        match self {
            MemberSpec::Method(_) | MemberSpec::Abstract => None,
            MemberSpec::Number(_) => Some(TypeRef::Pending(NUMBER_TYPE.to_string())),
            MemberSpec::Text(_) => Some(TypeRef::Pending(STRING_TYPE.to_string())),
            MemberSpec::Boolean(_) => Some(TypeRef::Pending(BOOLEAN_TYPE.to_string())),
            MemberSpec::Attributes(attrs) => attrs.ty.clone().or_else(|| attrs.data_type.clone()),
        }
    }
}

impl From<MemberAttributes> for MemberSpec {
    fn from(attrs: MemberAttributes) -> Self {
        MemberSpec::Attributes(attrs)
    }
}

impl From<MethodBody> for MemberSpec {
    fn from(body: MethodBody) -> Self {
        MemberSpec::Method(body)
    }
}

impl From<f64> for MemberSpec {
    fn from(v: f64) -> Self {
        MemberSpec::Number(v)
    }
}

impl From<i32> for MemberSpec {
    fn from(v: i32) -> Self {
        MemberSpec::Number(f64::from(v))
    }
}

impl From<&str> for MemberSpec {
    fn from(v: &str) -> Self {
        MemberSpec::Text(v.to_string())
    }
}

impl From<String> for MemberSpec {
    fn from(v: String) -> Self {
        MemberSpec::Text(v)
    }
}

impl From<bool> for MemberSpec {
    fn from(v: bool) -> Self {
        MemberSpec::Boolean(v)
    }
}

/// Ordered name → declaration map for instance or static members.
///
/// The entry named `constructor` is the type's own constructor body.
#[derive(Debug, Clone, Default)]
pub struct MemberMap {
    entries: IndexMap<String, MemberSpec>,
}

impl MemberMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, spec: impl Into<MemberSpec>) -> Self {
        self.insert(name, spec);
        self
    }

    /// Builder-style constructor body.
    pub fn constructor<F>(self, f: F) -> Self
    where
        F: Fn(&CallContext<'_>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.with(crate::CONSTRUCTOR_MEMBER, MemberSpec::method(f))
    }

    /// Insert or replace; a replaced entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, spec: impl Into<MemberSpec>) {
        self.entries.insert(name.into(), spec.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<MemberSpec> {
        self.entries.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&MemberSpec> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MemberSpec)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, S: Into<MemberSpec>> FromIterator<(K, S)> for MemberMap {
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        let mut map = MemberMap::new();
        for (k, s) in iter {
            map.insert(k, s);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_declared_types() {
        assert_eq!(
            MemberSpec::from(5).declared_type(),
            Some(TypeRef::Pending(NUMBER_TYPE.into()))
        );
        assert_eq!(
            MemberSpec::from("x").declared_type(),
            Some(TypeRef::Pending(STRING_TYPE.into()))
        );
        assert!(MemberSpec::abstract_method().declared_type().is_none());
    }

    #[test]
    fn attributes_prefer_type_over_data_type() {
        let spec = MemberSpec::from(MemberAttributes::new().data_type("B").ty("A"));
        assert_eq!(spec.declared_type(), Some(TypeRef::Pending("A".into())));
        let spec = MemberSpec::from(MemberAttributes::new().data_type("B"));
        assert_eq!(spec.declared_type(), Some(TypeRef::Pending("B".into())));
    }

    #[test]
    fn member_map_keeps_position_on_replace() {
        let mut map = MemberMap::new().with("a", 1).with("b", "x");
        map.insert("a", true);
        let names: Vec<&str> = map.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(matches!(map.get("a"), Some(MemberSpec::Boolean(true))));
    }

    #[test]
    fn method_builder_sets_kind() {
        let attrs = MemberAttributes::new().method(MethodBody::new(|_, _| Ok(Value::Null)));
        assert_eq!(attrs.kind, Some(MemberKind::Method));
    }
}
