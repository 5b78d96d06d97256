// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instances, slot storage and the call context handed to member bodies.

use crate::definition::TypeId;
use crate::error::Result;
use crate::registry::Container;
use crate::value::Value;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Named value slots guarded by a lock.
///
/// Locks are held only for the duration of a single read or write, never
/// across a call into member code.
#[derive(Debug, Default)]
pub struct Slots {
    values: RwLock<IndexMap<String, Value>>,
}

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.read().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.values.write().insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.read().contains_key(name)
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.values.write().shift_remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }

    pub fn snapshot(&self) -> IndexMap<String, Value> {
        self.values.read().clone()
    }
}

struct InstanceInner {
    type_id: TypeId,
    slots: Slots,
}

/// Shared handle to an instance of a composed type.
///
/// Cloning the handle does not copy the instance.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

impl Instance {
    pub(crate) fn new(type_id: TypeId) -> Self {
        Self {
            inner: Arc::new(InstanceInner {
                type_id,
                slots: Slots::new(),
            }),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.inner.type_id
    }

    pub fn slots(&self) -> &Slots {
        &self.inner.slots
    }

    /// Raw slot read, bypassing accessors.
    pub fn slot(&self, name: &str) -> Option<Value> {
        self.inner.slots.get(name)
    }

    /// Raw slot write, bypassing accessors.
    pub fn set_slot(&self, name: impl Into<String>, value: Value) {
        self.inner.slots.set(name, value);
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_id", &self.inner.type_id)
            .field("slots", &self.inner.slots.names())
            .finish()
    }
}

/// Target of a member access: an instance, or a type for static members.
#[derive(Debug, Clone)]
pub enum Receiver {
    Instance(Instance),
    Type(TypeId),
}

impl Receiver {
    /// Type whose member tables serve this receiver.
    pub fn type_id(&self) -> TypeId {
        match self {
            Receiver::Instance(inst) => inst.type_id(),
            Receiver::Type(id) => *id,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Receiver::Type(_))
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Receiver::Instance(inst) => Some(inst),
            Receiver::Type(_) => None,
        }
    }
}

impl From<Instance> for Receiver {
    fn from(inst: Instance) -> Self {
        Receiver::Instance(inst)
    }
}

impl From<&Instance> for Receiver {
    fn from(inst: &Instance) -> Self {
        Receiver::Instance(inst.clone())
    }
}

impl From<TypeId> for Receiver {
    fn from(id: TypeId) -> Self {
        Receiver::Type(id)
    }
}

/// Context passed to method bodies, accessors and computed parameters.
pub struct CallContext<'a> {
    container: &'a Container,
    this: Receiver,
}

impl<'a> CallContext<'a> {
    pub fn new(container: &'a Container, this: Receiver) -> Self {
        Self { container, this }
    }

    pub fn container(&self) -> &'a Container {
        self.container
    }

    pub fn this(&self) -> &Receiver {
        &self.this
    }

    /// The receiving instance, if the call is not static.
    pub fn instance(&self) -> Option<&Instance> {
        self.this.as_instance()
    }

    /// Read a member of the receiver through its accessor.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.container.get(&self.this, name)
    }

    /// Write a member of the receiver through its accessor.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.container.set(&self.this, name, value.into())
    }

    /// Invoke a method of the receiver.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.container.invoke(&self.this, name, args)
    }

    /// Raw slot read on the receiver.
    pub fn slot(&self, name: &str) -> Option<Value> {
        self.container.slots_of(&self.this).get(name)
    }

    /// Raw slot write on the receiver.
    pub fn set_slot(&self, name: impl Into<String>, value: Value) {
        self.container.slots_of(&self.this).set(name, value);
    }
}

impl fmt::Debug for CallContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext").field("this", &self.this).finish()
    }
}
