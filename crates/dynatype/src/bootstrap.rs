// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in types every container starts with.
//!
//! - the root type (`$data.Base` by default) with the default storage
//!   protocol: `storeProperty` / `retrieveProperty` keep a backing slot
//!   named `<prefix><member>` on the receiver;
//! - the entity marker type carrying the composable capability;
//! - primitive types used by shorthand declarations, plus lowercase aliases;
//! - the abstract storage-provider root.

use crate::callable::MethodBody;
use crate::error::{Result, TypeSystemError};
use crate::instance::CallContext;
use crate::member::{MemberAttributes, MemberMap, MemberSpec};
use crate::registry::{Container, TypeRegistry};
use crate::value::Value;
use crate::{RETRIEVE_PROPERTY, STORE_PROPERTY};
use indexmap::IndexMap;

pub const OBJECT_TYPE: &str = "$data.Object";
pub const NUMBER_TYPE: &str = "$data.Number";
pub const STRING_TYPE: &str = "$data.String";
pub const BOOLEAN_TYPE: &str = "$data.Boolean";
pub const ARRAY_TYPE: &str = "$data.Array";
pub const DATE_TYPE: &str = "$data.Date";
pub const STORAGE_PROVIDER_TYPE: &str = "$data.StorageProviderBase";

const ALIASES: &[(&str, &str)] = &[
    ("object", OBJECT_TYPE),
    ("number", NUMBER_TYPE),
    ("int", NUMBER_TYPE),
    ("float", NUMBER_TYPE),
    ("string", STRING_TYPE),
    ("text", STRING_TYPE),
    ("bool", BOOLEAN_TYPE),
    ("boolean", BOOLEAN_TYPE),
    ("array", ARRAY_TYPE),
    ("date", DATE_TYPE),
];

fn member_name(args: &[Value], op: &str) -> Result<String> {
    args.first()
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            TypeSystemError::invalid_operation(format!("{} expects a member name", op))
        })
}

fn backing_field(ctx: &CallContext<'_>, member: &str) -> String {
    format!("{}{}", ctx.container().config().backing_field_prefix, member)
}

fn store_property() -> MethodBody {
    MethodBody::new(|ctx, args| {
        let member = member_name(args, STORE_PROPERTY)?;
        let value = args.get(1).cloned().unwrap_or_default();
        ctx.set_slot(backing_field(ctx, &member), value);
        Ok(Value::Null)
    })
}

fn retrieve_property() -> MethodBody {
    MethodBody::new(|ctx, args| {
        let member = member_name(args, RETRIEVE_PROPERTY)?;
        Ok(ctx.slot(&backing_field(ctx, &member)).unwrap_or_default())
    })
}

impl Container {
    pub(crate) fn bootstrap(&mut self) -> Result<()> {
        let root_name = self.config().root_type.clone();
        let root = self.push_type(&root_name, None);
        self.set_root_type(root);
        self.register_type(&root_name, root)?;

        self.add_member(root, STORE_PROPERTY, store_property(), false)?;
        self.add_member(root, RETRIEVE_PROPERTY, retrieve_property(), false)?;
        self.add_member(
            root,
            "setProperty",
            MemberSpec::method(|ctx, args| {
                let member = member_name(args, "setProperty")?;
                ctx.set(&member, args.get(1).cloned().unwrap_or_default())?;
                Ok(Value::Null)
            }),
            false,
        )?;
        self.add_member(
            root,
            "getProperty",
            MemberSpec::method(|ctx, args| {
                let member = member_name(args, "getProperty")?;
                ctx.get(&member)
            }),
            false,
        )?;
        self.add_member(root, STORE_PROPERTY, store_property(), true)?;
        self.add_member(root, RETRIEVE_PROPERTY, retrieve_property(), true)?;
        self.place_in_namespaces(root);

        let entity_name = self.config().entity_type.clone();
        self.define(&entity_name, None, MemberMap::new(), MemberMap::new())?;

        for name in [OBJECT_TYPE, NUMBER_TYPE, STRING_TYPE, BOOLEAN_TYPE, ARRAY_TYPE, DATE_TYPE] {
            self.define(name, None, MemberMap::new(), MemberMap::new())?;
        }
        for (alias, target) in ALIASES {
            let id = self.resolve_type(target)?;
            self.register_alias(alias, id);
        }

        self.define_storage_provider_base()?;
        log::debug!("[bootstrap] {} built-in types", self.len());
        Ok(())
    }

    fn define_storage_provider_base(&mut self) -> Result<()> {
        let instance = MemberMap::new()
            .constructor(|ctx, args| {
                let configuration = match args.first() {
                    Some(v) if !v.is_null() => v.clone(),
                    _ => Value::Map(IndexMap::new()),
                };
                ctx.set("providerConfiguration", configuration)?;
                let name = ctx
                    .instance()
                    .and_then(|inst| ctx.container().get_type(inst.type_id()))
                    .map(|t| t.name().to_string())
                    .unwrap_or_default();
                ctx.set("name", name)?;
                Ok(Value::Null)
            })
            .with("providerConfiguration", MemberAttributes::new().ty(OBJECT_TYPE))
            .with("name", MemberAttributes::new().ty(STRING_TYPE))
            .with("context", MemberAttributes::new().ty(OBJECT_TYPE))
            .with(
                "supportedDataTypes",
                MemberAttributes::new().value(Value::List(Vec::new())),
            )
            .with("initializeStore", MemberSpec::abstract_method())
            .with("executeQuery", MemberSpec::abstract_method())
            .with("getTraceString", MemberSpec::abstract_method())
            .with(
                "loadRawData",
                MemberSpec::method(|_, _| {
                    Err(TypeSystemError::invalid_operation(
                        "loadRawData is not supported",
                    ))
                }),
            )
            .with(
                "setContext",
                MemberSpec::method(|ctx, args| {
                    ctx.set("context", args.first().cloned().unwrap_or_default())?;
                    Ok(Value::Null)
                }),
            );
        self.define(STORAGE_PROVIDER_TYPE, None, instance, MemberMap::new())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::instance::Receiver;
    use crate::registry::NamespaceRoot;

    #[test]
    fn builtins_are_registered() {
        let c = Container::new().unwrap();
        for name in ["$data.Base", "$data.Entity", OBJECT_TYPE, NUMBER_TYPE, STORAGE_PROVIDER_TYPE] {
            assert!(c.is_type_registered(name), "{} missing", name);
        }
        assert_eq!(c.resolve_type("string").unwrap(), c.resolve_type(STRING_TYPE).unwrap());
        assert!(c.get_type(c.root_type()).unwrap().inherits_from().is_none());
    }

    #[test]
    fn builtins_mirror_into_global_namespace() {
        let c = Container::new().unwrap();
        let global = c.namespace(NamespaceRoot::Global);
        assert_eq!(global.lookup("Number"), Some(c.resolve_type(NUMBER_TYPE).unwrap()));
        let models = c.namespace(NamespaceRoot::Models);
        assert_eq!(models.lookup("$data.Base"), Some(c.root_type()));
    }

    #[test]
    fn default_storage_protocol_uses_backing_slot() {
        let c = Container::new().unwrap();
        let inst = c.create_instance(c.root_type(), &[]).unwrap();
        let receiver: Receiver = inst.clone().into();
        c.invoke(&receiver, STORE_PROPERTY, &[Value::from("age"), Value::from(4)])
            .unwrap();
        assert_eq!(inst.slot("_age"), Some(Value::from(4)));
        assert_eq!(
            c.invoke(&receiver, RETRIEVE_PROPERTY, &[Value::from("age")]).unwrap(),
            Value::from(4)
        );

        let err = c.invoke(&receiver, STORE_PROPERTY, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[test]
    fn storage_provider_operations_are_abstract() {
        let c = Container::new().unwrap();
        let provider_ty = c.resolve_type(STORAGE_PROVIDER_TYPE).unwrap();
        let provider = c.create_instance(provider_ty, &[]).unwrap();
        let receiver: Receiver = provider.into();

        for op in ["initializeStore", "executeQuery", "getTraceString"] {
            let err = c.invoke(&receiver, op, &[]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotImplemented, "{}", op);
            assert_eq!(err.context(), Some(STORAGE_PROVIDER_TYPE));
        }
        assert_eq!(
            c.get(&receiver, "name").unwrap(),
            Value::from("StorageProviderBase")
        );
        assert_eq!(c.get(&receiver, "supportedDataTypes").unwrap(), Value::List(Vec::new()));
    }
}
