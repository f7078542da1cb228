//! Native function storage and callable trait.

use std::fmt;
use std::sync::Arc;

use crate::error::NativeError;
use crate::{CallContext, TypeHash};

/// Type-erased native callable.
///
/// Every generated wrapper (free function, constructor, method, field
/// accessor) is stored as one of these. The callable sits behind an `Arc` so
/// descriptors can be cloned into the registry and shared across threads.
pub struct NativeFn {
    /// Identity of the wrapped callable
    pub id: TypeHash,
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    /// Create a new NativeFn from a callable with a specific ID.
    pub fn new<F>(id: TypeHash, f: F) -> Self
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        Self { id, inner: Arc::new(f) }
    }

    /// Call this native function with the given context.
    pub fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        self.inner.call(ctx)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Clone for NativeFn {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Trait for callable native functions.
///
/// The `call` method receives a `CallContext` that provides access to the
/// arguments, the receiver and the return slot.
pub trait NativeCallable {
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError>;
}

impl<F> NativeCallable for F
where
    F: Fn(&mut CallContext<'_>) -> Result<(), NativeError>,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        (self)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HostValue, ObjectHeap};

    fn double(ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        let v: i64 = ctx.arg(0)?;
        ctx.set_return(v * 2)
    }

    #[test]
    fn call_fn_item() {
        let native = NativeFn::new(TypeHash::from_function("double"), double);
        let mut heap = ObjectHeap::new();
        let mut ret = HostValue::None;
        let args = [HostValue::Int(21)];
        let mut ctx = CallContext::new(&args, None, &mut ret, &mut heap);
        native.call(&mut ctx).unwrap();
        assert_eq!(ret, HostValue::Int(42));
    }

    fn noop(_ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        Ok(())
    }

    #[test]
    fn clone_shares_callable() {
        let native = NativeFn::new(TypeHash::from_function("noop"), noop);
        let copy = native.clone();
        assert_eq!(copy.id, native.id);
        assert!(format!("{copy:?}").contains("NativeFn"));
    }
}
