// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Synthesized constructors.
//!
//! A type's constructor is a fixed list of steps assembled when the type is
//! defined: mixin constructors, the base constructor, the type's own
//! constructor, then one step per propagation.

use crate::callable::MethodBody;
use crate::definition::TypeId;
use crate::error::Result;
use crate::instance::{CallContext, Instance, Receiver};
use crate::registry::Container;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

type ComputedFn = dyn Fn(&CallContext<'_>) -> Result<Value> + Send + Sync;

/// One positional argument passed to a base or propagated constructor.
#[derive(Clone)]
pub enum CtorParam {
    /// Passed through unchanged.
    Literal(Value),
    /// The caller's argument at this index (null when absent).
    Arg(usize),
    /// Evaluated against the instance under construction.
    Computed(Arc<ComputedFn>),
}

impl CtorParam {
    pub fn literal(value: impl Into<Value>) -> Self {
        CtorParam::Literal(value.into())
    }

    pub fn arg(index: usize) -> Self {
        CtorParam::Arg(index)
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&CallContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        CtorParam::Computed(Arc::new(f))
    }
}

impl fmt::Debug for CtorParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CtorParam::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            CtorParam::Arg(i) => f.debug_tuple("Arg").field(i).finish(),
            CtorParam::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConstructorStep {
    /// A mixin's own constructor, called with no arguments.
    Mixin { ty: TypeId, body: MethodBody },
    /// The full constructor of a composed base type.
    Base {
        ty: TypeId,
        params: Option<Vec<CtorParam>>,
    },
    /// The type's own constructor, called with the caller's arguments.
    Own(MethodBody),
    /// Construct a delegate and store it in `slot`.
    Propagation {
        ty: TypeId,
        params: Option<Vec<CtorParam>>,
        slot: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ConstructorPlan {
    steps: Vec<ConstructorStep>,
}

impl ConstructorPlan {
    pub fn steps(&self) -> &[ConstructorStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub(crate) fn push(&mut self, step: ConstructorStep) {
        self.steps.push(step);
    }
}

impl Container {
    /// Allocate an instance of `ty` and run its constructor plan.
    pub fn create_instance(&self, ty: TypeId, args: &[Value]) -> Result<Instance> {
        let instance = Instance::new(ty);
        self.construct(ty, &instance, args)?;
        Ok(instance)
    }

    fn construct(&self, ty: TypeId, instance: &Instance, args: &[Value]) -> Result<()> {
        let this = Receiver::Instance(instance.clone());
        for step in self.type_def(ty).constructor.steps() {
            match step {
                ConstructorStep::Mixin { body, .. } => {
                    body.call(&CallContext::new(self, this.clone()), &[])?;
                }
                ConstructorStep::Base { ty: base, params } => {
                    let mapped = self.map_params(params.as_deref(), args, &this)?;
                    self.construct(*base, instance, &mapped)?;
                }
                ConstructorStep::Own(body) => {
                    body.call(&CallContext::new(self, this.clone()), args)?;
                }
                ConstructorStep::Propagation { ty: delegate_ty, params, slot } => {
                    let mapped = self.map_params(params.as_deref(), args, &this)?;
                    let delegate = Instance::new(*delegate_ty);
                    self.construct(*delegate_ty, &delegate, &mapped)?;
                    instance.set_slot(slot.as_str(), Value::Instance(delegate));
                }
            }
        }
        Ok(())
    }

    fn map_params(
        &self,
        params: Option<&[CtorParam]>,
        args: &[Value],
        this: &Receiver,
    ) -> Result<Vec<Value>> {
        let Some(params) = params else {
            return Ok(args.to_vec());
        };
        params
            .iter()
            .map(|p| match p {
                CtorParam::Literal(v) => Ok(v.clone()),
                CtorParam::Arg(i) => Ok(args.get(*i).cloned().unwrap_or_default()),
                CtorParam::Computed(f) => f(&CallContext::new(self, this.clone())),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_debug_hides_closures() {
        let p = CtorParam::computed(|_| Ok(Value::Null));
        assert_eq!(format!("{:?}", p), "Computed(..)");
        assert_eq!(format!("{:?}", CtorParam::arg(2)), "Arg(2)");
    }

    #[test]
    fn map_params_forwards_when_absent() {
        let container = Container::new().unwrap();
        let this = Receiver::Type(container.root_type());
        let args = vec![Value::from(1), Value::from("b")];
        assert_eq!(container.map_params(None, &args, &this).unwrap(), args);

        let params = vec![CtorParam::arg(1), CtorParam::literal(7), CtorParam::arg(5)];
        let mapped = container.map_params(Some(&params), &args, &this).unwrap();
        assert_eq!(mapped, vec![Value::from("b"), Value::from(7), Value::Null]);
    }
}
