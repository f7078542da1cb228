//! Invocation of wrapped native callables.
//!
//! [`Invoker`] runs a [`NativeFn`] for a given [`CallSite`]: it checks the
//! arity, builds the [`CallContext`], optionally contains panics, and turns
//! the resulting [`NativeError`] into a [`BindingError`] that names the
//! callable and parameter involved.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::convert::NumericPolicy;
use crate::error::{BindingError, NativeError};
use crate::meta::ParamMeta;
use crate::{CallContext, HostValue, NativeFn, ObjectHandle, ObjectHeap};

/// What is being called, for arity checks and error messages.
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    owner: Option<&'a str>,
    name: &'a str,
    params: &'a [ParamMeta],
    shape: SiteShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SiteShape {
    Call,
    Field,
}

impl<'a> CallSite<'a> {
    pub fn function(name: &'a str, params: &'a [ParamMeta]) -> Self {
        Self {
            owner: None,
            name,
            params,
            shape: SiteShape::Call,
        }
    }

    pub fn constructor(type_name: &'a str, params: &'a [ParamMeta]) -> Self {
        Self {
            owner: None,
            name: type_name,
            params,
            shape: SiteShape::Call,
        }
    }

    pub fn method(type_name: &'a str, name: &'a str, params: &'a [ParamMeta]) -> Self {
        Self {
            owner: Some(type_name),
            name,
            params,
            shape: SiteShape::Call,
        }
    }

    /// A field accessor; setters take the field itself as their one parameter.
    pub fn field(type_name: &'a str, name: &'a str, params: &'a [ParamMeta]) -> Self {
        Self {
            owner: Some(type_name),
            name,
            params,
            shape: SiteShape::Field,
        }
    }

    pub fn params(&self) -> &'a [ParamMeta] {
        self.params
    }

    fn param_name(&self, index: usize) -> String {
        self.params
            .get(index)
            .map_or_else(|| format!("#{index}"), |param| param.name.to_string())
    }

    fn translate(&self, error: NativeError) -> BindingError {
        match error {
            NativeError::Argument { index, source } => {
                BindingError::conversion(self.to_string(), self.param_name(index), source)
            }
            NativeError::StaleHandle { index, generation } => BindingError::UseAfterFree { index, generation },
            other => BindingError::NativeFailure {
                context: self.to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl fmt::Display for CallSite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(owner) = self.owner {
            write!(f, "{owner}.")?;
        }
        match self.shape {
            SiteShape::Call => write!(f, "{}()", self.name),
            SiteShape::Field => f.write_str(self.name),
        }
    }
}

/// Runs native callables under a numeric policy and panic strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invoker {
    policy: NumericPolicy,
    catch_panics: bool,
}

impl Default for Invoker {
    fn default() -> Self {
        Self::new(NumericPolicy::default(), true)
    }
}

impl Invoker {
    pub fn new(policy: NumericPolicy, catch_panics: bool) -> Self {
        Self { policy, catch_panics }
    }

    /// Invoke `native` for `site` and return the marshalled result.
    ///
    /// Arity is checked before any argument is marshalled and every argument
    /// is marshalled before the native code runs.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke(
        &self,
        native: &NativeFn,
        site: &CallSite<'_>,
        receiver: Option<ObjectHandle>,
        args: &[HostValue],
        heap: &mut ObjectHeap,
    ) -> Result<HostValue, BindingError> {
        if args.len() != site.params.len() {
            return Err(BindingError::Arity {
                context: site.to_string(),
                expected: site.params.len(),
                received: args.len(),
            });
        }

        let mut ret = HostValue::None;
        let outcome = {
            let mut ctx = CallContext::new(args, receiver, &mut ret, heap).with_policy(self.policy);
            if self.catch_panics {
                panic::catch_unwind(AssertUnwindSafe(|| native.call(&mut ctx))).unwrap_or_else(|payload| {
                    Err(NativeError::Panic {
                        message: panic_message(payload.as_ref()),
                    })
                })
            } else {
                native.call(&mut ctx)
            }
        };

        outcome.map_err(|error| site.translate(error))?;
        Ok(ret)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::{TypeHash, ValueKind};

    fn add(ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        let a: i64 = ctx.arg(0)?;
        let b: i64 = ctx.arg(1)?;
        ctx.set_return(a + b)
    }

    fn explode(_ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        panic!("boom")
    }

    const ADD_PARAMS: [ParamMeta; 2] = [ParamMeta::new("a", ValueKind::Int), ParamMeta::new("b", ValueKind::Int)];

    fn add_fn() -> NativeFn {
        NativeFn::new(TypeHash::from_function("add"), add)
    }

    #[test]
    fn invokes_and_marshals_result() {
        let mut heap = ObjectHeap::new();
        let site = CallSite::function("add", &ADD_PARAMS);
        let result = Invoker::default()
            .invoke(&add_fn(), &site, None, &[HostValue::Int(2), HostValue::Int(3)], &mut heap)
            .unwrap();
        assert_eq!(result, HostValue::Int(5));
    }

    #[test]
    fn arity_is_checked_first() {
        let mut heap = ObjectHeap::new();
        let site = CallSite::function("add", &ADD_PARAMS);
        let err = Invoker::default()
            .invoke(&add_fn(), &site, None, &[HostValue::Int(2)], &mut heap)
            .unwrap_err();
        assert_eq!(
            err,
            BindingError::Arity {
                context: "add()".into(),
                expected: 2,
                received: 1
            }
        );
    }

    #[test]
    fn mismatch_names_parameter() {
        let mut heap = ObjectHeap::new();
        let site = CallSite::function("add", &ADD_PARAMS);
        let err = Invoker::default()
            .invoke(&add_fn(), &site, None, &[HostValue::Int(2), HostValue::from("x")], &mut heap)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.identifier(), Some("b"));
    }

    #[test]
    fn panics_become_native_failures() {
        let mut heap = ObjectHeap::new();
        let native = NativeFn::new(TypeHash::from_function("explode"), explode);
        let site = CallSite::function("explode", &[]);
        let err = Invoker::default().invoke(&native, &site, None, &[], &mut heap).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NativeFailure);
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn site_display() {
        assert_eq!(CallSite::function("add", &[]).to_string(), "add()");
        assert_eq!(CallSite::method("Point", "scaled", &[]).to_string(), "Point.scaled()");
        assert_eq!(CallSite::field("Point", "x", &[]).to_string(), "Point.x");
        assert_eq!(CallSite::constructor("Point", &[]).to_string(), "Point()");
    }
}
