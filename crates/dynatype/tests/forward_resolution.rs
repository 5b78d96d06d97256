// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Forward declaration tests.
//!
//! Member types named before their type exists, cycles between composable
//! types, escaped literal names and recovery after a failed pass.

use dynatype::{
    Container, ErrorKind, MemberAttributes, MemberMap, ResolutionState, TypeId, TypeRef,
    TypeRegistry, Value,
};

fn entity(c: &mut Container, name: &str, members: MemberMap) -> TypeId {
    let base = c.entity_type().unwrap();
    c.define(name, Some(base), members, MemberMap::new()).unwrap()
}

#[test]
fn cyclic_references_resolve_through_cascade() {
    let mut c = Container::new().unwrap();
    let order = entity(
        &mut c,
        "Shop.Order",
        MemberMap::new().with("customer", MemberAttributes::new().ty("Shop.Customer")),
    );
    let customer = entity(
        &mut c,
        "Shop.Customer",
        MemberMap::new().with(
            "orders",
            MemberAttributes::new().ty("array").element_type("Shop.Order"),
        ),
    );

    assert_eq!(
        c.get_member_definition(order, "customer").unwrap().ty,
        Some(TypeRef::Pending("Shop.Customer".into()))
    );
    assert_eq!(c.resolution_state(order), ResolutionState::Unresolved);

    c.resolve_forward_declarations(order).unwrap();

    let field = c.get_member_definition(order, "customer").unwrap();
    assert_eq!(field.ty, Some(TypeRef::Resolved(customer)));
    assert_eq!(field.data_type, Some(TypeRef::Resolved(customer)));
    assert_eq!(field.original_type, Some(TypeRef::Pending("Shop.Customer".into())));

    // Reached through the cascade, not a direct call.
    assert_eq!(c.resolution_state(customer), ResolutionState::Resolved);
    let orders = c.get_member_definition(customer, "orders").unwrap();
    assert_eq!(orders.element_type, Some(TypeRef::Resolved(order)));
    assert_eq!(
        orders.ty,
        Some(TypeRef::Resolved(c.resolve_type("$data.Array").unwrap()))
    );
}

#[test]
fn resolution_is_idempotent() {
    let mut c = Container::new().unwrap();
    let a = entity(&mut c, "Idem.A", MemberMap::new().with("b", MemberAttributes::new().ty("Idem.B")));
    entity(&mut c, "Idem.B", MemberMap::new().with("a", MemberAttributes::new().ty("Idem.A")));

    c.resolve_forward_declarations(a).unwrap();
    let before = c.member_definitions(a).as_array();
    c.resolve_forward_declarations(a).unwrap();
    let after = c.member_definitions(a).as_array();
    assert!(std::sync::Arc::ptr_eq(&before, &after), "no work means no invalidation");
    assert_eq!(c.get_type(a).unwrap().resolver().pending(), (0, 0));
}

#[test]
fn non_composable_targets_are_not_cascaded() {
    let mut c = Container::new().unwrap();
    let plain = c
        .define(
            "Util.Plain",
            None,
            MemberMap::new().with("next", MemberAttributes::new().ty("Util.Missing")),
            MemberMap::new(),
        )
        .unwrap();
    let holder = entity(
        &mut c,
        "Util.Holder",
        MemberMap::new().with("plain", MemberAttributes::new().ty("Util.Plain")),
    );

    c.resolve_forward_declarations(holder).unwrap();
    assert_eq!(
        c.get_member_definition(holder, "plain").unwrap().ty,
        Some(TypeRef::Resolved(plain))
    );
    assert_eq!(c.resolution_state(plain), ResolutionState::Unresolved);
}

#[test]
fn unknown_name_fails_and_recovers() {
    let mut c = Container::new().unwrap();
    let post = entity(
        &mut c,
        "Blog.Post",
        MemberMap::new()
            .with("title", "")
            .with("author", MemberAttributes::new().ty("Blog.Author")),
    );

    let err = c.resolve_forward_declarations(post).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(c.resolution_state(post), ResolutionState::Unresolved);
    assert_eq!(c.get_type(post).unwrap().resolver().pending().0, 1);

    let author = entity(&mut c, "Blog.Author", MemberMap::new());
    c.resolve_forward_declarations(post).unwrap();
    assert_eq!(c.resolution_state(post), ResolutionState::Resolved);
    assert_eq!(
        c.get_member_definition(post, "author").unwrap().ty,
        Some(TypeRef::Resolved(author))
    );
}

#[test]
fn failure_in_cascade_requeues_remaining_work() {
    let mut c = Container::new().unwrap();
    let root = entity(
        &mut c,
        "Deep.Root",
        MemberMap::new()
            .with("left", MemberAttributes::new().ty("Deep.Left"))
            .with("right", MemberAttributes::new().ty("Deep.Right")),
    );
    let left = entity(
        &mut c,
        "Deep.Left",
        MemberMap::new().with("ghost", MemberAttributes::new().ty("Deep.Ghost")),
    );
    let right = entity(&mut c, "Deep.Right", MemberMap::new());

    let err = c.resolve_forward_declarations(root).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(c.resolution_state(root), ResolutionState::Resolved);
    assert_eq!(c.resolution_state(left), ResolutionState::Unresolved);
    assert_eq!(c.resolution_state(right), ResolutionState::Unresolved);

    entity(&mut c, "Deep.Ghost", MemberMap::new());
    c.resolve_forward_declarations(root).unwrap();
    assert_eq!(c.resolution_state(left), ResolutionState::Resolved);
    assert_eq!(c.resolution_state(right), ResolutionState::Resolved);
}

#[test]
fn escaped_names_stay_literal() {
    let mut c = Container::new().unwrap();
    let doc = entity(
        &mut c,
        "Docs.Page",
        MemberMap::new().with(
            "body",
            MemberAttributes::new().ty("@Markdown").element_type("@Block"),
        ),
    );
    let body = c.get_member_definition(doc, "body").unwrap();
    assert_eq!(body.ty, Some(TypeRef::Literal("Markdown".into())));
    assert_eq!(body.data_type, Some(TypeRef::Literal("Markdown".into())));
    assert_eq!(body.element_type, Some(TypeRef::Literal("Block".into())));

    // Registering types with the escaped names must not change anything.
    let markdown = entity(&mut c, "Docs.Markdown", MemberMap::new());
    let block = entity(&mut c, "Docs.Block", MemberMap::new());
    c.register_type("Markdown", markdown).unwrap();
    c.register_type("Block", block).unwrap();

    c.resolve_forward_declarations(doc).unwrap();
    let body = c.get_member_definition(doc, "body").unwrap();
    assert_eq!(body.ty, Some(TypeRef::Literal("Markdown".into())));
    assert_eq!(body.data_type, Some(TypeRef::Literal("Markdown".into())));
    assert_eq!(body.element_type, Some(TypeRef::Literal("Block".into())));
    assert_eq!(c.get_type(doc).unwrap().resolver().pending(), (0, 0));
}

#[test]
fn derived_static_replaces_the_inherited_copy_before_resolution() {
    let mut c = Container::new().unwrap();
    let target = entity(&mut c, "P.X", MemberMap::new());
    let base = c
        .define(
            "P.Base",
            None,
            MemberMap::new(),
            MemberMap::new().with("kind", MemberAttributes::new().ty("P.X")),
        )
        .unwrap();
    let derived = c
        .extend(
            base,
            "P.Derived",
            MemberMap::new(),
            MemberMap::new().with("kind", MemberAttributes::new().ty("@Raw")),
        )
        .unwrap();

    c.resolve_forward_declarations(derived).unwrap();
    let kind = c.static_definitions(derived).get_member("kind").unwrap();
    assert_eq!(kind.ty, Some(TypeRef::Literal("Raw".into())));
    assert_eq!(kind.data_type, Some(TypeRef::Literal("Raw".into())));
    assert_eq!(
        c.get_metadata(derived, "static:definition:type", Some("kind")),
        Some(Value::from("Raw"))
    );

    c.resolve_forward_declarations(base).unwrap();
    let kind = c.static_definitions(base).get_member("kind").unwrap();
    assert_eq!(kind.ty, Some(TypeRef::Resolved(target)));
    assert_eq!(
        c.get_metadata(base, "static:definition:type", Some("kind")),
        Some(Value::Type(target))
    );
}

#[test]
fn replaced_members_drop_their_pending_steps() {
    let mut c = Container::new().unwrap();
    entity(&mut c, "Q.A", MemberMap::new());
    let t = entity(
        &mut c,
        "Q.T",
        MemberMap::new()
            .with("x", MemberAttributes::new().ty("Q.A"))
            .with("y", MemberAttributes::new().ty("Q.Missing")),
    );
    c.add_member(t, "x", 5, false).unwrap();
    c.add_member(t, "y", "", false).unwrap();

    // Nothing names Q.Missing any more, so resolution succeeds.
    c.resolve_forward_declarations(t).unwrap();
    let number = c.resolve_type("$data.Number").unwrap();
    let string = c.resolve_type("$data.String").unwrap();
    assert_eq!(c.get_member_definition(t, "x").unwrap().ty, Some(TypeRef::Resolved(number)));
    assert_eq!(
        c.get_member_definition(t, "x").unwrap().data_type,
        Some(TypeRef::Resolved(number))
    );
    assert_eq!(c.get_member_definition(t, "y").unwrap().ty, Some(TypeRef::Resolved(string)));
    assert_eq!(
        c.get_metadata(t, "definition:type", Some("x")),
        Some(Value::Type(number))
    );
}

#[test]
fn resolution_updates_views_and_metadata() {
    let mut c = Container::new().unwrap();
    let invoice = entity(
        &mut c,
        "Bill.Invoice",
        MemberMap::new()
            .with("payer", MemberAttributes::new().ty("Bill.Party"))
            .with("payee", MemberAttributes::new().ty("Bill.Party")),
    );
    let party = entity(&mut c, "Bill.Party", MemberMap::new());

    assert!(c.member_definitions(invoice).get_property_by_type(party).is_empty());
    c.resolve_forward_declarations(invoice).unwrap();

    let by_type = c.member_definitions(invoice).get_property_by_type(party);
    let names: Vec<&str> = by_type.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["payer", "payee"]);
    assert_eq!(
        c.get_metadata(invoice, "definition:type", Some("payer")),
        Some(Value::Type(party))
    );
}

#[test]
fn custom_escape_marker() {
    let config = dynatype::TypeSystemConfig {
        escape_marker: "!".into(),
        ..Default::default()
    };
    let mut c = Container::with_config(config).unwrap();
    let t = entity(
        &mut c,
        "Esc.T",
        MemberMap::new()
            .with("a", MemberAttributes::new().ty("!Raw"))
            .with("b", MemberAttributes::new().ty("@Raw")),
    );
    assert_eq!(
        c.get_member_definition(t, "a").unwrap().ty,
        Some(TypeRef::Literal("Raw".into()))
    );
    assert!(c.get_member_definition(t, "b").unwrap().ty.as_ref().unwrap().is_pending());
}
