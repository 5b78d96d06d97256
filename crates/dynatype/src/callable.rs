// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared callable wrappers stored in member descriptors.
//!
//! Each wrapper is a cheap `Arc` clone so descriptors can be copied between
//! types (mixins, propagations, inherited statics) without duplicating code.

use crate::error::Result;
use crate::instance::CallContext;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

type MethodFn = dyn Fn(&CallContext<'_>, &[Value]) -> Result<Value> + Send + Sync;
type GetterFn = dyn Fn(&CallContext<'_>) -> Result<Value> + Send + Sync;
type SetterFn = dyn Fn(&CallContext<'_>, Value) -> Result<()> + Send + Sync;
type FactoryFn = dyn Fn() -> Value + Send + Sync;

/// Body of a method member.
#[derive(Clone)]
pub struct MethodBody(Arc<MethodFn>);

impl MethodBody {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CallContext<'_>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, ctx: &CallContext<'_>, args: &[Value]) -> Result<Value> {
        (self.0)(ctx, args)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MethodBody(..)")
    }
}

/// Explicit property getter.
#[derive(Clone)]
pub struct Getter(Arc<GetterFn>);

impl Getter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CallContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, ctx: &CallContext<'_>) -> Result<Value> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Getter(..)")
    }
}

/// Explicit property setter.
#[derive(Clone)]
pub struct Setter(Arc<SetterFn>);

impl Setter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CallContext<'_>, Value) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, ctx: &CallContext<'_>, value: Value) -> Result<()> {
        (self.0)(ctx, value)
    }
}

impl fmt::Debug for Setter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Setter(..)")
    }
}

/// Produces a fresh default value each time it is called.
#[derive(Clone)]
pub struct ValueFactory(Arc<FactoryFn>);

impl ValueFactory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Factory returning a clone of `value` on every call.
    pub fn constant(value: Value) -> Self {
        Self::new(move || value.clone())
    }

    pub fn produce(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for ValueFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueFactory(..)")
    }
}
