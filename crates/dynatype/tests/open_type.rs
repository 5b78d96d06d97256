// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Open type injection tests.

use dynatype::{
    Container, ErrorKind, MemberAttributes, TypeBuilder, TypeRef, TypeRegistry, Value,
    ValueFactory,
};
use indexmap::IndexMap;

#[test]
fn open_entity_gets_the_default_bag() {
    let mut c = Container::new().unwrap();
    let entity = c.entity_type().unwrap();
    let doc = TypeBuilder::new("Open.Doc")
        .base(entity)
        .open_type(true)
        .member("title", "")
        .define(&mut c)
        .unwrap();

    let object = c.resolve_type("$data.Object").unwrap();
    let bag = c.get_member_definition(doc, "dynamicProperties").unwrap();
    assert_eq!(bag.data_type, Some(TypeRef::Resolved(object)));
    assert_eq!(bag.make_default(), Some(Value::Map(IndexMap::new())));
    assert!(c.member_definitions(doc).get_property_by_type(object).len() == 1);
}

#[test]
fn bag_name_and_default_value_are_configurable() {
    let mut c = Container::new().unwrap();
    c.set_open_type_default_value(ValueFactory::new(|| Value::from("fresh")));
    let entity = c.entity_type().unwrap();
    let doc = TypeBuilder::new("Open.Named")
        .base(entity)
        .open_type("extras")
        .define(&mut c)
        .unwrap();

    let bag = c.get_member_definition(doc, "extras").unwrap();
    assert_eq!(bag.make_default(), Some(Value::from("fresh")));
    assert!(c.get_member_definition(doc, "dynamicProperties").is_none());
}

#[test]
fn non_composable_types_are_not_opened() {
    let mut c = Container::new().unwrap();
    let plain = TypeBuilder::new("Open.Plain").open_type(true).define(&mut c).unwrap();
    assert!(c.get_member_definition(plain, "dynamicProperties").is_none());
}

#[test]
fn declared_bag_with_matching_type_is_kept() {
    let mut c = Container::new().unwrap();
    let entity = c.entity_type().unwrap();
    let doc = TypeBuilder::new("Open.Declared")
        .base(entity)
        .open_type(true)
        .member(
            "dynamicProperties",
            MemberAttributes::new().ty("$data.Object").attr("note", "mine"),
        )
        .define(&mut c)
        .unwrap();
    let bag = c.get_member_definition(doc, "dynamicProperties").unwrap();
    assert_eq!(bag.extra.get("note"), Some(&Value::from("mine")));
}

#[test]
fn declared_bag_with_other_type_is_a_mismatch() {
    let mut c = Container::new().unwrap();
    let entity = c.entity_type().unwrap();
    let err = TypeBuilder::new("Open.Wrong")
        .base(entity)
        .open_type(true)
        .member("dynamicProperties", MemberAttributes::new().ty("$data.String"))
        .define(&mut c)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.message(), "OpenType default type mismatch");
    assert_eq!(err.context(), Some("Open.Wrong.dynamicProperties"));
}

#[test]
fn derived_types_inherit_the_open_type() {
    let mut c = Container::new().unwrap();
    let entity = c.entity_type().unwrap();
    let base = TypeBuilder::new("Open.Base")
        .base(entity)
        .open_type(true)
        .define(&mut c)
        .unwrap();
    let child = TypeBuilder::new("Open.Child")
        .base(base)
        .open_type("other")
        .define(&mut c)
        .unwrap();

    assert!(c.get_member_definition(child, "other").is_none());
    let bag = c.get_member_definition(child, "dynamicProperties").unwrap();
    assert_eq!(bag.defined_by(), Some(base));
    assert_eq!(c.get_static(child, "openType").unwrap(), Value::Bool(true));
}
