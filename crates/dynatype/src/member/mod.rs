// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member declarations: raw input forms, normalized descriptors and the
//! per-type descriptor collections.

mod collection;
mod descriptor;
mod spec;
mod translate;

pub use collection::{MemberDefinitionCollection, MemberScope, MemberView};
pub use descriptor::MemberDefinition;
pub use spec::{MemberAttributes, MemberMap, MemberSpec};
pub use translate::MemberTranslator;

pub(crate) use translate::{enqueue_forward_refs, translate_definition};

use crate::definition::TypeId;
use crate::error::{Result, TypeSystemError};
use std::fmt;
use std::str::FromStr;

/// Kind of a declared member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Property,
    NavProperty,
    ComplexProperty,
    /// Declared kind with no materialization; building one is an error.
    Field,
}

impl MemberKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberKind::Method => "method",
            MemberKind::Property => "property",
            MemberKind::NavProperty => "navProperty",
            MemberKind::ComplexProperty => "complexProperty",
            MemberKind::Field => "field",
        }
    }

    /// Property, navigation property or complex property.
    pub fn is_property_like(self) -> bool {
        matches!(
            self,
            MemberKind::Property | MemberKind::NavProperty | MemberKind::ComplexProperty
        )
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberKind {
    type Err = TypeSystemError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "method" => Ok(MemberKind::Method),
            "property" => Ok(MemberKind::Property),
            "navProperty" => Ok(MemberKind::NavProperty),
            "complexProperty" => Ok(MemberKind::ComplexProperty),
            "field" => Ok(MemberKind::Field),
            other => Err(TypeSystemError::configuration(format!(
                "Unknown member type: {}",
                other
            ))),
        }
    }
}

/// Reference to a member's type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A registered type.
    Resolved(TypeId),
    /// A type name not yet resolved through the registry.
    Pending(String),
    /// An escaped name kept as a plain string and never looked up.
    Literal(String),
}

impl TypeRef {
    /// Classify a declared type name: a leading `marker` escapes it.
    pub fn parse(name: &str, marker: &str) -> Self {
        match name.strip_prefix(marker) {
            Some(rest) if !marker.is_empty() => TypeRef::Literal(rest.to_string()),
            _ => TypeRef::Pending(name.to_string()),
        }
    }

    pub fn resolved(&self) -> Option<TypeId> {
        match self {
            TypeRef::Resolved(id) => Some(*id),
            _ => None,
        }
    }

    /// The textual name for pending and literal references.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Pending(s) | TypeRef::Literal(s) => Some(s),
            TypeRef::Resolved(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TypeRef::Pending(_))
    }
}

impl From<TypeId> for TypeRef {
    fn from(id: TypeId) -> Self {
        TypeRef::Resolved(id)
    }
}

/// Raw declared name; escape markers are applied during translation.
impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::Pending(name.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::from(name.as_str())
    }
}
