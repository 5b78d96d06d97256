// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declarative model documents.
//!
//! A model lists type definitions in JSON or TOML. Members use the same
//! shorthand forms as [`MemberSpec`]: a number, string or boolean declares a
//! typed property with that default, an object gives the attributes.
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "Shop.Order", "base": "$data.Entity",
//!       "members": { "id": { "type": "int", "key": true },
//!                    "customer": { "type": "Shop.Customer" } } },
//!     { "name": "Shop.Customer", "base": "$data.Entity",
//!       "members": { "name": "" } }
//!   ]
//! }
//! ```
//!
//! Methods cannot carry a body in a document; a member of kind `method`
//! becomes abstract.

use crate::composer::{CtorParam, TypeBuilder};
use crate::definition::TypeId;
use crate::error::TypeSystemError;
use crate::member::{MemberAttributes, MemberKind, MemberSpec, TypeRef};
use crate::registry::{Container, TypeRegistry};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Model loading errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("Definition failed: {0}")]
    Define(#[from] TypeSystemError),
}

/// Ordered list of type definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub types: Vec<TypeDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDocument {
    pub name: String,

    /// Registered base name; the root type when absent.
    #[serde(default)]
    pub base: Option<String>,

    /// Positional parameters passed to the base constructor.
    #[serde(default)]
    pub base_params: Option<Vec<ParamDocument>>,

    #[serde(default)]
    pub mixins: Vec<String>,

    #[serde(default)]
    pub propagations: Vec<PropagationDocument>,

    /// `true` or a bag member name.
    #[serde(default)]
    pub open_type: Option<serde_json::Value>,

    #[serde(default)]
    pub members: IndexMap<String, MemberDocument>,

    #[serde(default)]
    pub static_members: IndexMap<String, MemberDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationDocument {
    #[serde(rename = "type")]
    pub ty: String,
    pub slot: String,
    #[serde(default)]
    pub params: Option<Vec<ParamDocument>>,
}

/// `{ "arg": n }` forwards the caller's n-th argument; anything else is a
/// literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamDocument {
    Arg { arg: usize },
    Literal(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberDocument {
    Boolean(bool),
    Number(f64),
    Text(String),
    Attributes(AttributeDocument),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDocument {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub element_type: Option<String>,
    #[serde(default)]
    pub key: Option<bool>,
    #[serde(default)]
    pub computed: Option<bool>,
    #[serde(default)]
    pub store_on_object: Option<bool>,
    #[serde(default)]
    pub enumerable: Option<bool>,
    #[serde(default)]
    pub configurable: Option<bool>,
    #[serde(default)]
    pub not_mapped: Option<bool>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl ModelDocument {
    pub fn from_json_str(content: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SchemaError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a model file, picking the format from its extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content = std::fs::read_to_string(path)?;
        match extension.as_str() {
            "json" => Self::from_json_str(&content),
            "toml" => Self::from_toml_str(&content),
            other => Err(SchemaError::UnsupportedFormat(if other.is_empty() {
                path.display().to_string()
            } else {
                other.to_string()
            })),
        }
    }
}

impl MemberDocument {
    fn to_spec(&self) -> Result<MemberSpec, TypeSystemError> {
        let attrs = match self {
            MemberDocument::Boolean(v) => return Ok(MemberSpec::Boolean(*v)),
            MemberDocument::Number(v) => return Ok(MemberSpec::Number(*v)),
            MemberDocument::Text(v) => return Ok(MemberSpec::Text(v.clone())),
            MemberDocument::Attributes(attrs) => attrs,
        };

        let kind = attrs
            .kind
            .as_deref()
            .map(str::parse::<MemberKind>)
            .transpose()?;
        if kind == Some(MemberKind::Method) {
            return Ok(MemberSpec::Abstract);
        }

        let type_ref = |name: &Option<String>| name.clone().map(TypeRef::from);
        let mut out = MemberAttributes {
            kind,
            ty: type_ref(&attrs.ty),
            data_type: type_ref(&attrs.data_type),
            element_type: type_ref(&attrs.element_type),
            key: attrs.key,
            computed: attrs.computed,
            store_on_object: attrs.store_on_object,
            enumerable: attrs.enumerable,
            configurable: attrs.configurable,
            not_mapped: attrs.not_mapped,
            value: attrs.value.as_ref().map(Value::from_json),
            ..MemberAttributes::default()
        };
        for (name, value) in &attrs.extra {
            out.extra.insert(name.clone(), Value::from_json(value));
        }
        Ok(MemberSpec::Attributes(out))
    }
}

fn ctor_params(params: &Option<Vec<ParamDocument>>) -> Option<Vec<CtorParam>> {
    params.as_ref().map(|list| {
        list.iter()
            .map(|p| match p {
                ParamDocument::Arg { arg } => CtorParam::arg(*arg),
                ParamDocument::Literal(v) => CtorParam::literal(Value::from_json(v)),
            })
            .collect()
    })
}

fn builder_for(container: &Container, doc: &TypeDocument) -> Result<TypeBuilder, TypeSystemError> {
    let mut builder = TypeBuilder::new(doc.name.as_str());
    if let Some(base) = &doc.base {
        let base = container.resolve_type(base)?;
        builder = match ctor_params(&doc.base_params) {
            Some(params) => builder.base_with_params(base, params),
            None => builder.base(base),
        };
    }
    for mixin in &doc.mixins {
        builder = builder.mixin(container.resolve_type(mixin)?);
    }
    for propagation in &doc.propagations {
        let ty = container.resolve_type(&propagation.ty)?;
        builder = match ctor_params(&propagation.params) {
            Some(params) => builder.propagate_with(ty, propagation.slot.as_str(), params),
            None => builder.propagate(ty, propagation.slot.as_str()),
        };
    }
    if let Some(flag) = &doc.open_type {
        builder = builder.open_type(Value::from_json(flag));
    }
    for (name, member) in &doc.members {
        builder = builder.member(name.as_str(), member.to_spec()?);
    }
    for (name, member) in &doc.static_members {
        builder = builder.static_member(name.as_str(), member.to_spec()?);
    }
    Ok(builder)
}

/// Define every type of `model` in document order, then resolve their
/// forward declarations.
///
/// Bases, mixins and propagations must name types defined earlier (or
/// built in); member types may name any type of the model.
pub fn load_model(container: &mut Container, model: &ModelDocument) -> Result<Vec<TypeId>, SchemaError> {
    let mut defined = Vec::with_capacity(model.types.len());
    for doc in &model.types {
        let id = builder_for(container, doc)
            .and_then(|b| b.define(container))
            .map_err(|e| {
                if e.context().is_none() {
                    e.with_context(doc.name.clone())
                } else {
                    e
                }
            })?;
        defined.push(id);
    }
    for id in &defined {
        container.resolve_forward_declarations(*id)?;
    }
    log::debug!("[schema] loaded {} types", defined.len());
    Ok(defined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    const SHOP: &str = r#"{
        "types": [
            { "name": "Shop.Order", "base": "$data.Entity",
              "members": {
                "id": { "type": "int", "key": true },
                "lines": { "type": "array", "elementType": "Shop.Line" },
                "note": "",
                "submit": { "kind": "method" }
              } },
            { "name": "Shop.Line", "base": "$data.Entity",
              "members": { "qty": 1, "gift": false, "label": { "type": "@Label" } } }
        ]
    }"#;

    #[test]
    fn json_model_resolves_forward_references() {
        let mut c = Container::new().unwrap();
        let model = ModelDocument::from_json_str(SHOP).unwrap();
        let ids = load_model(&mut c, &model).unwrap();
        assert_eq!(ids.len(), 2);

        let line = c.resolve_type("Shop.Line").unwrap();
        let lines = c.get_member_definition(ids[0], "lines").unwrap();
        assert_eq!(lines.element_type, Some(TypeRef::Resolved(line)));
        assert_eq!(c.member_definitions(ids[0]).get_key_properties().len(), 1);

        let label = c.get_member_definition(line, "label").unwrap();
        assert_eq!(label.ty, Some(TypeRef::Literal("Label".to_string())));
        let qty = c.get_member_definition(line, "qty").unwrap();
        assert_eq!(qty.value, Some(Value::from(1)));
    }

    #[test]
    fn document_methods_are_abstract() {
        let mut c = Container::new().unwrap();
        let ids = load_model(&mut c, &ModelDocument::from_json_str(SHOP).unwrap()).unwrap();
        let order = c.create_instance(ids[0], &[]).unwrap();
        let err = c.invoke(&order.into(), "submit", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn toml_file_with_propagation_params() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[[types]]
name = "App.Engine"
members = {{ power = 0 }}

[[types]]
name = "App.Car"
openType = true

[[types.propagations]]
type = "App.Engine"
slot = "engine"
params = [{{ arg = 1 }}, "v8"]
"#
        )
        .unwrap();

        let model = ModelDocument::from_file(file.path()).unwrap();
        assert_eq!(model.types.len(), 2);
        assert_eq!(model.types[1].propagations[0].slot, "engine");
        assert!(matches!(
            model.types[1].propagations[0].params.as_deref(),
            Some([ParamDocument::Arg { arg: 1 }, ParamDocument::Literal(_)])
        ));

        let mut c = Container::new().unwrap();
        let ids = load_model(&mut c, &model).unwrap();
        let car = c.create_instance(ids[1], &[]).unwrap();
        assert!(car.slot("engine").and_then(|v| v.as_instance().cloned()).is_some());
    }

    #[test]
    fn unknown_base_names_the_type() {
        let mut c = Container::new().unwrap();
        let model = ModelDocument::from_json_str(
            r#"{ "types": [ { "name": "App.X", "base": "App.Missing" } ] }"#,
        )
        .unwrap();
        match load_model(&mut c, &model) {
            Err(SchemaError::Define(e)) => {
                assert_eq!(e.kind(), ErrorKind::NotFound);
                assert_eq!(e.context(), Some("App.X"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            ModelDocument::from_file(file.path()),
            Err(SchemaError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
    }
}
