//! Conversion traits between native values and [`HostValue`]s.
//!
//! - [`FromHost`]: extract a native value from a host value
//! - [`IntoHost`]: hand a native value to the host
//! - [`HostType`]: the semantic kind a native type presents to the host
//!
//! ## Supported Types
//!
//! - Integers: `i8`..`i64`, `u8`..`u64`, `isize`, `usize` (range-checked, never truncated)
//! - Floats: `f32`, `f64` (integers widen under [`NumericPolicy::Widening`])
//! - `bool`, `String`, `()` and `Option<T>`
//! - Exposed native types, through the impls `#[derive(NativeType)]` generates
//!
//! ## Example
//!
//! ```
//! use hostbind_core::{FromHost, HostValue, IntoHost, MarshalContext, NumericPolicy, ObjectHeap};
//!
//! let mut heap = ObjectHeap::new();
//! let value = 42u8.into_host(&mut heap).unwrap();
//! assert_eq!(value, HostValue::Int(42));
//!
//! let cx = MarshalContext::new(&heap, NumericPolicy::Widening);
//! assert_eq!(u8::from_host(&value, &cx), Ok(42));
//! assert!(u8::from_host(&HostValue::Int(300), &cx).is_err());
//! ```

use crate::error::ConversionError;
use crate::{HostValue, NativeType, ObjectHeap, ValueKind};

/// How host integers are treated when a float is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericPolicy {
    /// Accept integers that the float target represents exactly.
    #[default]
    Widening,
    /// Refuse integers for float targets.
    Strict,
}

/// Read-only view of the runtime state a conversion may need.
#[derive(Debug, Clone, Copy)]
pub struct MarshalContext<'a> {
    heap: &'a ObjectHeap,
    policy: NumericPolicy,
}

impl<'a> MarshalContext<'a> {
    pub fn new(heap: &'a ObjectHeap, policy: NumericPolicy) -> Self {
        Self { heap, policy }
    }

    pub fn heap(&self) -> &'a ObjectHeap {
        self.heap
    }

    pub fn policy(&self) -> NumericPolicy {
        self.policy
    }
}

/// Extract a native value from a host value.
pub trait FromHost: Sized {
    /// Returns a `ConversionError` if the host value cannot become `Self`
    /// without loss.
    fn from_host(value: &HostValue, cx: &MarshalContext<'_>) -> Result<Self, ConversionError>;
}

/// Convert a native value into a host value.
///
/// Objects move into the heap, which is why the heap is borrowed mutably.
pub trait IntoHost {
    fn into_host(self, heap: &mut ObjectHeap) -> Result<HostValue, ConversionError>;
}

/// The semantic kind a native type presents in signatures.
pub trait HostType {
    fn host_kind() -> ValueKind;
}

fn mismatch(expected: &'static str, value: &HostValue) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        actual: value.type_name(),
    }
}

// ============================================================================
// Integer implementations
// ============================================================================

macro_rules! impl_host_int {
    ($($ty:ty),*) => {
        $(
            impl FromHost for $ty {
                fn from_host(value: &HostValue, _cx: &MarshalContext<'_>) -> Result<Self, ConversionError> {
                    match value {
                        HostValue::Int(v) => <$ty>::try_from(*v).map_err(|_| ConversionError::IntegerOutOfRange {
                            value: i128::from(*v),
                            target_type: stringify!($ty),
                        }),
                        other => Err(mismatch("int", other)),
                    }
                }
            }

            impl IntoHost for $ty {
                fn into_host(self, _heap: &mut ObjectHeap) -> Result<HostValue, ConversionError> {
                    i64::try_from(self)
                        .map(HostValue::Int)
                        .map_err(|_| ConversionError::IntegerOutOfRange {
                            value: self as i128,
                            target_type: "int",
                        })
                }
            }

            impl HostType for $ty {
                fn host_kind() -> ValueKind {
                    ValueKind::Int
                }
            }
        )*
    };
}

impl_host_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// ============================================================================
// Float implementations
// ============================================================================

/// Widen a host integer for a float target with `mantissa_bits` of precision.
fn widen(value: i64, mantissa_bits: u32, target_type: &'static str, policy: NumericPolicy) -> Result<f64, ConversionError> {
    match policy {
        NumericPolicy::Strict => Err(ConversionError::TypeMismatch {
            expected: "float",
            actual: "int",
        }),
        NumericPolicy::Widening if value.unsigned_abs() <= 1u64 << mantissa_bits => Ok(value as f64),
        NumericPolicy::Widening => Err(ConversionError::LossyWidening { value, target_type }),
    }
}

impl FromHost for f64 {
    fn from_host(value: &HostValue, cx: &MarshalContext<'_>) -> Result<Self, ConversionError> {
        match value {
            HostValue::Float(v) => Ok(*v),
            HostValue::Int(v) => widen(*v, f64::MANTISSA_DIGITS, "f64", cx.policy()),
            other => Err(mismatch("float", other)),
        }
    }
}

impl FromHost for f32 {
    fn from_host(value: &HostValue, cx: &MarshalContext<'_>) -> Result<Self, ConversionError> {
        match value {
            HostValue::Float(v) if v.is_finite() && v.abs() > f64::from(f32::MAX) => {
                Err(ConversionError::FloatOutOfRange {
                    value: *v,
                    target_type: "f32",
                })
            }
            HostValue::Float(v) if v.is_nan() || f64::from(*v as f32) == *v => Ok(*v as f32),
            HostValue::Float(v) => Err(ConversionError::LossyNarrowing {
                value: *v,
                target_type: "f32",
            }),
            HostValue::Int(v) => widen(*v, f32::MANTISSA_DIGITS, "f32", cx.policy()).map(|v| v as f32),
            other => Err(mismatch("float", other)),
        }
    }
}

impl IntoHost for f64 {
    fn into_host(self, _heap: &mut ObjectHeap) -> Result<HostValue, ConversionError> {
        Ok(HostValue::Float(self))
    }
}

impl IntoHost for f32 {
    fn into_host(self, _heap: &mut ObjectHeap) -> Result<HostValue, ConversionError> {
        Ok(HostValue::Float(f64::from(self)))
    }
}

impl HostType for f64 {
    fn host_kind() -> ValueKind {
        ValueKind::Float
    }
}

impl HostType for f32 {
    fn host_kind() -> ValueKind {
        ValueKind::Float
    }
}

// ============================================================================
// Bool, String and unit implementations
// ============================================================================

impl FromHost for bool {
    fn from_host(value: &HostValue, _cx: &MarshalContext<'_>) -> Result<Self, ConversionError> {
        match value {
            HostValue::Bool(v) => Ok(*v),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl IntoHost for bool {
    fn into_host(self, _heap: &mut ObjectHeap) -> Result<HostValue, ConversionError> {
        Ok(HostValue::Bool(self))
    }
}

impl HostType for bool {
    fn host_kind() -> ValueKind {
        ValueKind::Bool
    }
}

impl FromHost for String {
    fn from_host(value: &HostValue, _cx: &MarshalContext<'_>) -> Result<Self, ConversionError> {
        match value {
            HostValue::Str(v) => Ok(v.clone()),
            other => Err(mismatch("str", other)),
        }
    }
}

impl IntoHost for String {
    fn into_host(self, _heap: &mut ObjectHeap) -> Result<HostValue, ConversionError> {
        Ok(HostValue::Str(self))
    }
}

impl IntoHost for &str {
    fn into_host(self, _heap: &mut ObjectHeap) -> Result<HostValue, ConversionError> {
        Ok(HostValue::Str(self.to_owned()))
    }
}

impl HostType for String {
    fn host_kind() -> ValueKind {
        ValueKind::Str
    }
}

impl HostType for &str {
    fn host_kind() -> ValueKind {
        ValueKind::Str
    }
}

impl FromHost for () {
    fn from_host(value: &HostValue, _cx: &MarshalContext<'_>) -> Result<Self, ConversionError> {
        match value {
            HostValue::None => Ok(()),
            other => Err(mismatch("none", other)),
        }
    }
}

impl IntoHost for () {
    fn into_host(self, _heap: &mut ObjectHeap) -> Result<HostValue, ConversionError> {
        Ok(HostValue::None)
    }
}

impl HostType for () {
    fn host_kind() -> ValueKind {
        ValueKind::None
    }
}

// ============================================================================
// Option
// ============================================================================

impl<T: FromHost> FromHost for Option<T> {
    fn from_host(value: &HostValue, cx: &MarshalContext<'_>) -> Result<Self, ConversionError> {
        match value {
            HostValue::None => Ok(None),
            other => T::from_host(other, cx).map(Some),
        }
    }
}

impl<T: IntoHost> IntoHost for Option<T> {
    fn into_host(self, heap: &mut ObjectHeap) -> Result<HostValue, ConversionError> {
        match self {
            Some(value) => value.into_host(heap),
            None => Ok(HostValue::None),
        }
    }
}

impl<T: HostType> HostType for Option<T> {
    fn host_kind() -> ValueKind {
        T::host_kind()
    }
}

// ============================================================================
// Exposed native types
// ============================================================================

/// Move an instance into the heap. Backs the generated `IntoHost` impls.
pub fn object_into_host<T: NativeType>(value: T, heap: &mut ObjectHeap) -> Result<HostValue, ConversionError> {
    Ok(HostValue::Object(heap.allocate(value)?))
}

/// Copy an instance out of the heap. Backs the generated `FromHost` impls
/// of types declared `clone`.
pub fn object_from_host<T: NativeType + Clone>(value: &HostValue, cx: &MarshalContext<'_>) -> Result<T, ConversionError> {
    match value {
        HostValue::Object(handle) => cx.heap().get::<T>(*handle).cloned(),
        other => Err(mismatch(T::type_name(), other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeHash;

    fn with_cx<R>(policy: NumericPolicy, f: impl FnOnce(&MarshalContext<'_>) -> R) -> R {
        let heap = ObjectHeap::new();
        let cx = MarshalContext::new(&heap, policy);
        f(&cx)
    }

    #[test]
    fn narrow_integers_are_range_checked() {
        with_cx(NumericPolicy::Widening, |cx| {
            assert_eq!(i8::from_host(&HostValue::Int(-128), cx), Ok(-128));
            assert_eq!(
                u8::from_host(&HostValue::Int(256), cx),
                Err(ConversionError::IntegerOutOfRange {
                    value: 256,
                    target_type: "u8"
                })
            );
            assert!(u32::from_host(&HostValue::Int(-1), cx).is_err());
            assert_eq!(u64::from_host(&HostValue::Int(i64::MAX), cx), Ok(i64::MAX as u64));
        });
    }

    #[test]
    fn float_for_integer_is_a_mismatch() {
        with_cx(NumericPolicy::Widening, |cx| {
            assert_eq!(
                i64::from_host(&HostValue::Float(2.0), cx),
                Err(ConversionError::TypeMismatch {
                    expected: "int",
                    actual: "float"
                })
            );
        });
    }

    #[test]
    fn u64_above_i64_max_cannot_reach_the_host() {
        let mut heap = ObjectHeap::new();
        assert!(matches!(
            u64::MAX.into_host(&mut heap),
            Err(ConversionError::IntegerOutOfRange { .. })
        ));
        assert_eq!(7u64.into_host(&mut heap), Ok(HostValue::Int(7)));
    }

    #[test]
    fn widening_policy() {
        with_cx(NumericPolicy::Widening, |cx| {
            assert_eq!(f64::from_host(&HostValue::Int(3), cx), Ok(3.0));
            assert_eq!(f64::from_host(&HostValue::Int(1 << 53), cx), Ok(9007199254740992.0));
            assert!(matches!(
                f64::from_host(&HostValue::Int((1 << 53) + 1), cx),
                Err(ConversionError::LossyWidening { .. })
            ));
            assert_eq!(f32::from_host(&HostValue::Int(1 << 24), cx), Ok(16777216.0));
            assert!(f32::from_host(&HostValue::Int((1 << 24) + 1), cx).is_err());
        });
    }

    #[test]
    fn strict_policy_refuses_integers() {
        with_cx(NumericPolicy::Strict, |cx| {
            assert_eq!(
                f64::from_host(&HostValue::Int(3), cx),
                Err(ConversionError::TypeMismatch {
                    expected: "float",
                    actual: "int"
                })
            );
            assert_eq!(f64::from_host(&HostValue::Float(3.5), cx), Ok(3.5));
        });
    }

    #[test]
    fn f32_range() {
        with_cx(NumericPolicy::Widening, |cx| {
            assert_eq!(f32::from_host(&HostValue::Float(1.5), cx), Ok(1.5));
            assert!(matches!(
                f32::from_host(&HostValue::Float(1e300), cx),
                Err(ConversionError::FloatOutOfRange { .. })
            ));
            assert!(f32::from_host(&HostValue::Float(f64::INFINITY), cx).unwrap().is_infinite());
        });
    }

    #[test]
    fn f32_refuses_rounding() {
        with_cx(NumericPolicy::Widening, |cx| {
            assert!(matches!(
                f32::from_host(&HostValue::Float(0.1), cx),
                Err(ConversionError::LossyNarrowing { target_type: "f32", .. })
            ));
            assert_eq!(f32::from_host(&HostValue::Float(-0.25), cx), Ok(-0.25));
            assert!(f32::from_host(&HostValue::Float(f64::NAN), cx).unwrap().is_nan());
        });
    }

    #[test]
    fn f64_passes_through_bit_for_bit() {
        let mut heap = ObjectHeap::new();
        for v in [-0.0f64, f64::NAN, f64::MIN_POSITIVE, 1e308] {
            let host = v.into_host(&mut heap).unwrap();
            let cx = MarshalContext::new(&heap, NumericPolicy::Strict);
            let back = f64::from_host(&host, &cx).unwrap();
            assert_eq!(back.to_bits(), v.to_bits());
        }
    }

    #[test]
    fn bool_string_unit() {
        with_cx(NumericPolicy::Widening, |cx| {
            assert_eq!(bool::from_host(&HostValue::Bool(true), cx), Ok(true));
            assert!(bool::from_host(&HostValue::Int(1), cx).is_err());
            assert_eq!(String::from_host(&HostValue::from("hi"), cx), Ok("hi".to_string()));
            assert_eq!(<()>::from_host(&HostValue::None, cx), Ok(()));
            assert!(<()>::from_host(&HostValue::Int(0), cx).is_err());
        });
    }

    #[test]
    fn option_maps_none() {
        with_cx(NumericPolicy::Widening, |cx| {
            assert_eq!(Option::<i32>::from_host(&HostValue::None, cx), Ok(None));
            assert_eq!(Option::<i32>::from_host(&HostValue::Int(4), cx), Ok(Some(4)));
        });
        let mut heap = ObjectHeap::new();
        assert_eq!(None::<String>.into_host(&mut heap), Ok(HostValue::None));
        assert_eq!(<Option<i64> as HostType>::host_kind(), ValueKind::Int);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Pair(i32, i32);

    impl NativeType for Pair {
        fn type_hash() -> TypeHash {
            TypeHash::from_name("Pair")
        }
        fn type_name() -> &'static str {
            "Pair"
        }
    }

    #[test]
    fn objects_move_in_and_copy_out() {
        let mut heap = ObjectHeap::new();
        let host = object_into_host(Pair(1, 2), &mut heap).unwrap();
        let handle = host.as_object().unwrap();
        assert_eq!(handle.type_hash, Pair::type_hash());

        let cx = MarshalContext::new(&heap, NumericPolicy::Widening);
        let copy: Pair = object_from_host(&host, &cx).unwrap();
        assert_eq!(copy, Pair(1, 2));
        assert_eq!(
            object_from_host::<Pair>(&HostValue::Int(1), &cx),
            Err(ConversionError::TypeMismatch {
                expected: "Pair",
                actual: "int"
            })
        );
    }

    #[test]
    fn reclaimed_object_is_stale() {
        let mut heap = ObjectHeap::new();
        let host = object_into_host(Pair(1, 2), &mut heap).unwrap();
        heap.release(host.as_object().unwrap()).unwrap();
        let cx = MarshalContext::new(&heap, NumericPolicy::Widening);
        assert!(matches!(
            object_from_host::<Pair>(&host, &cx),
            Err(ConversionError::StaleHandle { .. })
        ));
    }
}
