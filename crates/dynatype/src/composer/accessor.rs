// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member materialization and dispatch.
//!
//! Building a member stores its descriptor and attaches either a method or an
//! accessor to the type's instance or static table. Instance lookups walk the
//! inheritance chain of tables; static tables are self-contained because base
//! statics are copied at definition time.

use crate::callable::{Getter, MethodBody, Setter};
use crate::definition::TypeId;
use crate::error::{Result, TypeSystemError};
use crate::instance::{CallContext, Receiver};
use crate::member::{MemberDefinition, MemberKind, MemberScope};
use crate::metadata::definition_key;
use crate::registry::Container;
use crate::value::Value;
use crate::{RETRIEVE_PROPERTY, STORE_PROPERTY};

/// How a property reads and writes its value.
#[derive(Debug, Clone)]
pub enum AccessorPolicy {
    /// User-supplied getter and setter.
    Explicit { get: Getter, set: Setter },
    /// Plain slot named after the member, with a default until first write.
    Plain { default: Value },
    /// Delegates to the receiver's `storeProperty` / `retrieveProperty`.
    Stored { member: String },
}

impl AccessorPolicy {
    /// Explicit accessors need both halves; otherwise a literal value gives a
    /// plain slot, and anything else is stored through the receiver.
    pub fn for_member(def: &MemberDefinition) -> Self {
        match (&def.getter, &def.setter, &def.value) {
            (Some(get), Some(set), _) => AccessorPolicy::Explicit {
                get: get.clone(),
                set: set.clone(),
            },
            (_, _, Some(value)) => AccessorPolicy::Plain {
                default: value.clone(),
            },
            _ => AccessorPolicy::Stored {
                member: def.name.clone(),
            },
        }
    }
}

/// Entry of a type's instance or static member table.
#[derive(Debug, Clone)]
pub enum Attachment {
    Method {
        body: MethodBody,
        propagation: Option<String>,
    },
    Accessor {
        policy: AccessorPolicy,
        propagation: Option<String>,
    },
}

impl Attachment {
    /// Delegate slot this member forwards to, if any.
    pub fn propagation(&self) -> Option<&str> {
        match self {
            Attachment::Method { propagation, .. } | Attachment::Accessor { propagation, .. } => {
                propagation.as_deref()
            }
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Attachment::Method { .. })
    }
}

impl Container {
    /// Store `def` in the owner's collection and attach its runtime form.
    pub(crate) fn build_member(
        &mut self,
        owner: TypeId,
        def: MemberDefinition,
        propagation: Option<String>,
        scope: MemberScope,
    ) -> Result<()> {
        let attachment = match def.kind {
            MemberKind::Method => {
                let body = def.method.clone().ok_or_else(|| {
                    TypeSystemError::configuration(format!("Method member '{}' has no body", def.name))
                })?;
                Attachment::Method { body, propagation }
            }
            kind if kind.is_property_like() => Attachment::Accessor {
                policy: AccessorPolicy::for_member(&def),
                propagation,
            },
            kind => {
                return Err(TypeSystemError::configuration(format!(
                    "Unknown member type: {},{}",
                    kind, def.name
                ))
                .with_context(self.type_def(owner).full_name.clone()))
            }
        };

        log::trace!(
            "[composer] {}.{} ({}{})",
            self.type_def(owner).full_name,
            def.name,
            def.kind,
            if scope == MemberScope::Static { ", static" } else { "" }
        );

        let name = def.name.clone();
        let target = self.type_def_mut(owner);
        for (attr, value) in def.attributes() {
            target
                .metadata
                .set(Some(&name), &definition_key(scope, attr.as_str()), value);
        }
        target.collection_mut(scope).set_member(def);
        target.table_mut(scope).insert(name, attachment);
        self.bump_epoch();
        Ok(())
    }

    fn find_attachment(&self, receiver: &Receiver, name: &str) -> Option<&Attachment> {
        match receiver {
            Receiver::Instance(inst) => {
                std::iter::successors(Some(inst.type_id()), |t| self.type_def(*t).inherits_from)
                    .find_map(|t| self.type_def(t).prototype.get(name))
            }
            Receiver::Type(id) => self.type_def(*id).static_table.get(name),
        }
    }

    /// Receiver a forwarding member acts on.
    fn forward_target(&self, receiver: &Receiver, propagation: Option<&str>, member: &str) -> Result<Receiver> {
        let Some(slot) = propagation else {
            return Ok(receiver.clone());
        };
        match self.slots_of(receiver).get(slot) {
            Some(Value::Instance(delegate)) => Ok(Receiver::Instance(delegate)),
            _ => Err(TypeSystemError::initialization(format!(
                "propagation '{}' is not initialized",
                slot
            ))
            .with_context(member.to_string())),
        }
    }

    /// Read `name` through its accessor; unknown names read raw slots.
    pub fn get(&self, receiver: &Receiver, name: &str) -> Result<Value> {
        let Some(attachment) = self.find_attachment(receiver, name) else {
            return Ok(self.slots_of(receiver).get(name).unwrap_or_default());
        };
        let Attachment::Accessor { policy, propagation } = attachment else {
            return Err(TypeSystemError::invalid_operation(format!("'{}' is a method", name)));
        };
        let target = self.forward_target(receiver, propagation.as_deref(), name)?;
        match policy {
            AccessorPolicy::Explicit { get, .. } => get.call(&CallContext::new(self, target)),
            AccessorPolicy::Plain { default } => {
                Ok(self.slots_of(&target).get(name).unwrap_or_else(|| default.clone()))
            }
            AccessorPolicy::Stored { member } => {
                self.invoke(&target, RETRIEVE_PROPERTY, &[Value::from(member.as_str())])
            }
        }
    }

    /// Write `name` through its accessor; unknown names write raw slots.
    pub fn set(&self, receiver: &Receiver, name: &str, value: Value) -> Result<()> {
        let Some(attachment) = self.find_attachment(receiver, name) else {
            self.slots_of(receiver).set(name, value);
            return Ok(());
        };
        let Attachment::Accessor { policy, propagation } = attachment else {
            return Err(TypeSystemError::invalid_operation(format!(
                "cannot assign to method '{}'",
                name
            )));
        };
        let target = self.forward_target(receiver, propagation.as_deref(), name)?;
        match policy {
            AccessorPolicy::Explicit { set, .. } => set.call(&CallContext::new(self, target), value),
            AccessorPolicy::Plain { .. } => {
                self.slots_of(&target).set(name, value);
                Ok(())
            }
            AccessorPolicy::Stored { member } => self
                .invoke(&target, STORE_PROPERTY, &[Value::from(member.as_str()), value])
                .map(|_| ()),
        }
    }

    /// Call method `name` on the receiver.
    pub fn invoke(&self, receiver: &Receiver, name: &str, args: &[Value]) -> Result<Value> {
        match self.find_attachment(receiver, name) {
            Some(Attachment::Method { body, propagation }) => {
                let target = self.forward_target(receiver, propagation.as_deref(), name)?;
                body.call(&CallContext::new(self, target), args)
            }
            Some(Attachment::Accessor { .. }) => Err(TypeSystemError::invalid_operation(format!(
                "'{}' is not a method",
                name
            ))),
            None => Err(TypeSystemError::not_found(format!("no method '{}'", name))
                .with_context(self.type_def(receiver.type_id()).full_name.clone())),
        }
    }

    pub fn get_static(&self, ty: TypeId, name: &str) -> Result<Value> {
        self.get(&Receiver::Type(ty), name)
    }

    pub fn set_static(&self, ty: TypeId, name: &str, value: Value) -> Result<()> {
        self.set(&Receiver::Type(ty), name, value)
    }

    pub fn invoke_static(&self, ty: TypeId, name: &str, args: &[Value]) -> Result<Value> {
        self.invoke(&Receiver::Type(ty), name, args)
    }

    /// Whether `name` resolves to an attached member for the receiver.
    pub fn responds_to(&self, receiver: &Receiver, name: &str) -> bool {
        self.find_attachment(receiver, name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Getter;

    #[test]
    fn policy_selection() {
        let mut def = MemberDefinition::new("a", MemberKind::Property);
        assert!(matches!(AccessorPolicy::for_member(&def), AccessorPolicy::Stored { .. }));

        def.value = Some(Value::from(1));
        assert!(matches!(AccessorPolicy::for_member(&def), AccessorPolicy::Plain { .. }));

        def.getter = Some(Getter::new(|_| Ok(Value::Null)));
        assert!(
            matches!(AccessorPolicy::for_member(&def), AccessorPolicy::Plain { .. }),
            "a getter without setter does not make an explicit accessor"
        );

        def.setter = Some(Setter::new(|_, _| Ok(())));
        assert!(matches!(AccessorPolicy::for_member(&def), AccessorPolicy::Explicit { .. }));
    }

    #[test]
    fn attachment_reports_propagation() {
        let a = Attachment::Accessor {
            policy: AccessorPolicy::Plain { default: Value::Null },
            propagation: Some("inner".into()),
        };
        assert_eq!(a.propagation(), Some("inner"));
        assert!(!a.is_method());
    }
}
