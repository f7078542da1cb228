//! Call context bridging the host runtime and native Rust functions.

use std::fmt;

use crate::convert::{FromHost, IntoHost, MarshalContext, NumericPolicy};
use crate::error::{ConversionError, NativeError};
use crate::{HostValue, NativeType, ObjectHandle, ObjectHeap};

/// Context for one wrapped native call.
///
/// ## Typed Argument Access
///
/// ```ignore
/// let dx: f64 = ctx.arg(0)?;
/// let dy: f64 = ctx.arg(1)?;
/// ```
///
/// ## Receiver
///
/// Methods and field accessors reach their instance through `this::<T>()`
/// or `this_mut::<T>()`. Generated wrappers marshal every argument before
/// borrowing the receiver.
///
/// ## Return Values
///
/// ```ignore
/// ctx.set_return(point.distance_from_origin())?;
/// ```
pub struct CallContext<'a> {
    args: &'a [HostValue],
    receiver: Option<ObjectHandle>,
    return_slot: &'a mut HostValue,
    heap: &'a mut ObjectHeap,
    policy: NumericPolicy,
}

impl<'a> CallContext<'a> {
    /// Create a new call context with the default numeric policy.
    pub fn new(
        args: &'a [HostValue],
        receiver: Option<ObjectHandle>,
        return_slot: &'a mut HostValue,
        heap: &'a mut ObjectHeap,
    ) -> Self {
        Self {
            args,
            receiver,
            return_slot,
            heap,
            policy: NumericPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: NumericPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of arguments, excluding the receiver.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Get a raw reference to an argument.
    pub fn arg_slot(&self, index: usize) -> Result<&HostValue, NativeError> {
        self.args.get(index).ok_or(NativeError::ArgumentIndexOutOfBounds {
            index,
            count: self.args.len(),
        })
    }

    /// Get a typed argument value.
    ///
    /// Conversion failures carry the argument index so the wrapper can name
    /// the parameter.
    pub fn arg<T: FromHost>(&self, index: usize) -> Result<T, NativeError> {
        let slot = self.arg_slot(index)?;
        let cx = MarshalContext::new(self.heap, self.policy);
        T::from_host(slot, &cx).map_err(|source| NativeError::Argument { index, source })
    }

    fn receiver(&self) -> Result<ObjectHandle, NativeError> {
        self.receiver
            .ok_or_else(|| NativeError::invalid_this("call has no receiver"))
    }

    /// Get an immutable reference to the receiver.
    pub fn this<T: NativeType>(&self) -> Result<&T, NativeError> {
        let handle = self.receiver()?;
        self.heap.get::<T>(handle).map_err(receiver_error)
    }

    /// Get a mutable reference to the receiver.
    ///
    /// The receiver's handle moves to `Mutated`.
    pub fn this_mut<T: NativeType>(&mut self) -> Result<&mut T, NativeError> {
        let handle = self.receiver()?;
        self.heap.get_mut::<T>(handle).map_err(receiver_error)
    }

    /// Set a typed return value.
    ///
    /// Objects are moved into the heap; the host receives a fresh handle.
    pub fn set_return<T: IntoHost>(&mut self, value: T) -> Result<(), NativeError> {
        *self.return_slot = value.into_host(self.heap).map_err(NativeError::Return)?;
        Ok(())
    }
}

fn receiver_error(error: ConversionError) -> NativeError {
    match error {
        ConversionError::StaleHandle { index, generation } => NativeError::StaleHandle { index, generation },
        other => NativeError::invalid_this(other.to_string()),
    }
}

impl fmt::Debug for CallContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("arg_count", &self.args.len())
            .field("receiver", &self.receiver)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HandleState, TypeHash};

    #[derive(Debug, Clone, PartialEq)]
    struct Meter(f64);

    impl NativeType for Meter {
        fn type_hash() -> TypeHash {
            TypeHash::from_name("Meter")
        }
        fn type_name() -> &'static str {
            "Meter"
        }
    }

    impl IntoHost for Meter {
        fn into_host(self, heap: &mut ObjectHeap) -> Result<HostValue, ConversionError> {
            crate::convert::object_into_host(self, heap)
        }
    }

    #[test]
    fn typed_arguments() {
        let mut heap = ObjectHeap::new();
        let mut ret = HostValue::None;
        let args = [HostValue::Int(2), HostValue::Float(0.5), HostValue::from("s")];
        let ctx = CallContext::new(&args, None, &mut ret, &mut heap);

        assert_eq!(ctx.arg_count(), 3);
        assert_eq!(ctx.arg::<i32>(0).unwrap(), 2);
        assert_eq!(ctx.arg::<f64>(1).unwrap(), 0.5);
        assert_eq!(ctx.arg::<String>(2).unwrap(), "s");
        assert!(matches!(
            ctx.arg::<i32>(1),
            Err(NativeError::Argument { index: 1, .. })
        ));
        assert!(matches!(
            ctx.arg::<i32>(3),
            Err(NativeError::ArgumentIndexOutOfBounds { index: 3, count: 3 })
        ));
    }

    #[test]
    fn strict_policy_reaches_arguments() {
        let mut heap = ObjectHeap::new();
        let mut ret = HostValue::None;
        let args = [HostValue::Int(2)];
        let ctx = CallContext::new(&args, None, &mut ret, &mut heap).with_policy(NumericPolicy::Strict);
        assert!(ctx.arg::<f64>(0).is_err());
    }

    #[test]
    fn receiver_access() {
        let mut heap = ObjectHeap::new();
        let handle = heap.allocate(Meter(1.0)).unwrap();
        let mut ret = HostValue::None;
        let mut ctx = CallContext::new(&[], Some(handle), &mut ret, &mut heap);

        assert_eq!(ctx.this::<Meter>().unwrap(), &Meter(1.0));
        ctx.this_mut::<Meter>().unwrap().0 = 4.0;
        assert_eq!(heap.get::<Meter>(handle).unwrap().0, 4.0);
        assert_eq!(heap.state(handle), HandleState::Mutated);
    }

    #[test]
    fn missing_or_stale_receiver() {
        let mut heap = ObjectHeap::new();
        let handle = heap.allocate(Meter(1.0)).unwrap();
        heap.release(handle).unwrap();
        let mut ret = HostValue::None;

        let ctx = CallContext::new(&[], None, &mut ret, &mut heap);
        assert!(matches!(ctx.this::<Meter>(), Err(NativeError::InvalidThis { .. })));

        let ctx = CallContext::new(&[], Some(handle), &mut ret, &mut heap);
        assert!(matches!(ctx.this::<Meter>(), Err(NativeError::StaleHandle { .. })));
    }

    #[test]
    fn returning_an_object_allocates() {
        let mut heap = ObjectHeap::new();
        let mut ret = HostValue::None;
        let mut ctx = CallContext::new(&[], None, &mut ret, &mut heap);
        ctx.set_return(Meter(2.0)).unwrap();
        let handle = ret.as_object().unwrap();
        assert_eq!(heap.get::<Meter>(handle).unwrap().0, 2.0);
    }
}
