// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deferred resolution of forward-declared member types.
//!
//! Definitions record type names instead of looking them up, so types may
//! reference each other in any order (including cycles). Each type keeps two
//! queues: its own member rewrites, and cascades into referenced composable
//! types. The first resolution trigger drains both, own work first; later
//! triggers are no-ops unless new work was queued in between.

use crate::definition::TypeId;
use crate::error::Result;
use crate::member::{MemberDefinition, MemberScope, TypeRef};
use crate::metadata::definition_key;
use crate::registry::{Container, TypeRegistry};
use crate::value::Value;
use std::collections::VecDeque;

/// Resolution progress of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    /// Own queue is being drained.
    Resolving,
    /// Terminal.
    Resolved,
}

/// Which descriptor field a pending name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeField {
    /// Rewrites both `type` and `dataType`.
    Type,
    ElementType,
}

/// Deferred rewrite of one member's type field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MemberThunk {
    pub(crate) scope: MemberScope,
    pub(crate) member: String,
    pub(crate) serial: u64,
    pub(crate) field: TypeField,
    pub(crate) type_name: String,
}

/// Per-type resolution queues.
#[derive(Debug, Default)]
pub struct ForwardResolver {
    state: ResolutionState,
    own: VecDeque<MemberThunk>,
    children: VecDeque<TypeId>,
}

impl ForwardResolver {
    pub fn state(&self) -> ResolutionState {
        self.state
    }

    /// Number of queued own and cascade steps.
    pub fn pending(&self) -> (usize, usize) {
        (self.own.len(), self.children.len())
    }

    fn is_idle(&self) -> bool {
        self.state == ResolutionState::Resolved && self.own.is_empty() && self.children.is_empty()
    }
}

impl Container {
    pub(crate) fn add_member_thunk(
        &mut self,
        owner: TypeId,
        scope: MemberScope,
        member: &MemberDefinition,
        field: TypeField,
        type_name: String,
    ) {
        log::trace!(
            "[resolver] {} defers '{}' -> {}",
            self.type_def(owner).full_name,
            member.name,
            type_name
        );
        self.type_def_mut(owner).resolver.own.push_back(MemberThunk {
            scope,
            member: member.name.clone(),
            serial: member.serial,
            field,
            type_name,
        });
    }

    /// Queue a cascade into `child` if it carries the composable capability.
    pub(crate) fn add_child_thunk(&mut self, owner: TypeId, child: TypeId) {
        if self.is_entity(child) {
            self.type_def_mut(owner).resolver.children.push_back(child);
        }
    }

    pub fn resolution_state(&self, id: TypeId) -> ResolutionState {
        self.type_def(id).resolver.state
    }

    /// Run all queued resolution work for `id` and, transitively, for every
    /// composable type it references.
    ///
    /// Idempotent: a resolved type with empty queues is skipped, which also
    /// terminates cycles. On failure the failing step stays queued on its type
    /// (which stays unresolved), and that type plus the cascades not yet
    /// reached are re-queued on `id`, so a later call picks up where this one
    /// stopped.
    pub fn resolve_forward_declarations(&mut self, id: TypeId) -> Result<()> {
        let mut worklist: Vec<TypeId> = vec![id];
        while let Some(current) = worklist.pop() {
            if let Err(err) = self.resolve_one(current, &mut worklist) {
                let remaining: Vec<TypeId> = std::iter::once(current)
                    .filter(|t| *t != id)
                    .chain(worklist.drain(..).rev())
                    .collect();
                self.type_def_mut(id).resolver.children.extend(remaining);
                return Err(err);
            }
        }
        Ok(())
    }

    fn resolve_one(&mut self, current: TypeId, worklist: &mut Vec<TypeId>) -> Result<()> {
        let resolver = &self.type_def(current).resolver;
        if resolver.is_idle() || resolver.state == ResolutionState::Resolving {
            return Ok(());
        }
        let first_pass = resolver.state == ResolutionState::Unresolved;
        if first_pass {
            log::debug!("[resolver] resolving: {}", self.type_def(current).full_name);
            self.type_def_mut(current).resolver.state = ResolutionState::Resolving;
        }

        while let Some(thunk) = self.type_def_mut(current).resolver.own.pop_front() {
            if let Err(err) = self.run_member_thunk(current, &thunk) {
                let resolver = &mut self.type_def_mut(current).resolver;
                resolver.own.push_front(thunk);
                if first_pass {
                    resolver.state = ResolutionState::Unresolved;
                }
                return Err(err.with_context(format!(
                    "resolving {}",
                    self.type_def(current).full_name
                )));
            }
        }

        let resolver = &mut self.type_def_mut(current).resolver;
        resolver.state = ResolutionState::Resolved;
        let children: Vec<TypeId> = resolver.children.drain(..).collect();
        // Reverse so the stack pops children in enqueue order.
        worklist.extend(children.into_iter().rev());
        Ok(())
    }

    fn run_member_thunk(&mut self, owner: TypeId, thunk: &MemberThunk) -> Result<()> {
        let current = self
            .type_def(owner)
            .collection(thunk.scope)
            .get_own(&thunk.member)
            .map(|m| m.serial);
        if current != Some(thunk.serial) {
            log::trace!(
                "[resolver] skipping stale step for '{}' of {}",
                thunk.member,
                self.type_def(owner).full_name
            );
            return Ok(());
        }

        let resolved = self.resolve_type(&thunk.type_name)?;
        self.add_child_thunk(owner, resolved);

        let def = self.type_def_mut(owner);
        let Some(member) = def.collection_mut(thunk.scope).get_own_mut(&thunk.member) else {
            return Ok(());
        };
        let new_ref = Some(TypeRef::Resolved(resolved));
        match thunk.field {
            TypeField::Type => {
                member.ty = new_ref.clone();
                member.data_type = new_ref;
            }
            TypeField::ElementType => member.element_type = new_ref,
        }
        def.collection_mut(thunk.scope).clear_cache();
        let keys: &[&str] = match thunk.field {
            TypeField::Type => &["type", "dataType"],
            TypeField::ElementType => &["elementType"],
        };
        for key in keys {
            def.metadata.set(
                Some(&thunk.member),
                &definition_key(thunk.scope, key),
                Value::Type(resolved),
            );
        }
        self.bump_epoch();
        Ok(())
    }
}
