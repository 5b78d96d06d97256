// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic type composition engine.
//!
//! Types are defined at runtime from member maps and composed from one base,
//! any number of mixins and propagations (members forwarded to a delegate
//! instance). Member types may be declared by name before the referenced
//! type exists; they are resolved on demand.
//!
//! # Architecture
//!
//! ```text
//!   MemberMap / ModelDocument
//!        |
//!        v
//!   Container::define_ex  ---> translate -> descriptors + forward thunks
//!        |                          |
//!        v                          v
//!   TypeDefinition (arena)     resolve_forward_declarations
//!        |
//!        v
//!   MemberView (cached)  /  get, set, invoke, create_instance
//! ```
//!
//! # Example
//!
//! ```
//! use dynatype::{Container, MemberAttributes, MemberMap, TypeRegistry};
//!
//! let mut c = Container::new().unwrap();
//! let entity = c.entity_type().unwrap();
//! let order = c
//!     .define(
//!         "Shop.Order",
//!         Some(entity),
//!         MemberMap::new().with("customer", MemberAttributes::new().ty("Shop.Customer")),
//!         MemberMap::new(),
//!     )
//!     .unwrap();
//! c.define("Shop.Customer", Some(entity), MemberMap::new(), MemberMap::new())
//!     .unwrap();
//! c.resolve_forward_declarations(order).unwrap();
//!
//! let customer = c.resolve_type("Shop.Customer").unwrap();
//! assert_eq!(c.member_definitions(order).get_property_by_type(customer).len(), 1);
//! ```

pub mod bootstrap;
pub mod callable;
pub mod composer;
pub mod config;
pub mod definition;
pub mod error;
pub mod instance;
pub mod member;
pub mod metadata;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod value;

/// Instance member holding the user constructor.
pub const CONSTRUCTOR_MEMBER: &str = "constructor";
/// Static member marking a type open.
pub const OPEN_TYPE_MEMBER: &str = "openType";
/// Method backing stored properties on write.
pub const STORE_PROPERTY: &str = "storeProperty";
/// Method backing stored properties on read.
pub const RETRIEVE_PROPERTY: &str = "retrieveProperty";

pub use callable::{Getter, MethodBody, Setter, ValueFactory};
pub use composer::{
    AccessorPolicy, Attachment, CompositionSpec, ConstructorPlan, ConstructorStep, CtorParam,
    TypeBuilder,
};
pub use config::{ConfigError, OpenTypeConfig, TypeSystemConfig};
pub use definition::{TypeDefinition, TypeId, TypeProcessor};
pub use error::{ErrorKind, Result, TypeSystemError};
pub use instance::{CallContext, Instance, Receiver, Slots};
pub use member::{
    MemberAttributes, MemberDefinition, MemberDefinitionCollection, MemberKind, MemberMap,
    MemberScope, MemberSpec, MemberTranslator, MemberView, TypeRef,
};
pub use metadata::MetadataTable;
pub use registry::{Container, Namespace, NamespaceRoot, TypeRegistry};
pub use resolver::{ForwardResolver, ResolutionState};
pub use schema::{load_model, ModelDocument, SchemaError};
pub use value::Value;
