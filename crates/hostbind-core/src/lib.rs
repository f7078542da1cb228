//! Core types for hostbind.
//!
//! This crate holds everything generated bindings need at runtime:
//!
//! - [`HostValue`] / [`ValueKind`]: values and semantic types as the host sees them
//! - [`FromHost`] / [`IntoHost`] / [`HostType`]: the value marshaller
//! - [`ObjectHeap`] / [`ObjectHandle`]: ownership of native instances behind host handles
//! - [`NativeFn`] / [`CallContext`]: type-erased wrappers and their calling convention
//! - [`Invoker`]: arity checks, panic containment and error translation for one call
//! - descriptor types in [`meta`] and the error taxonomy in [`error`]

pub mod call_context;
pub mod convert;
pub mod error;
pub mod meta;
pub mod native_fn;
pub mod native_type;
pub mod object_heap;
pub mod type_hash;
pub mod value;
pub mod wrapper;

pub use call_context::CallContext;
pub use convert::{FromHost, HostType, IntoHost, MarshalContext, NumericPolicy};
pub use error::{BindingError, ConversionError, ErrorKind, Namespace, NativeError, RegistrationError};
pub use meta::{
    BindingKind, ClassMeta, ConstructorMeta, CopyFn, FieldAccess, FieldMeta, FunctionMeta, MethodMeta, MethodTable,
    ParamMeta, ReceiverMode,
};
pub use native_fn::{NativeCallable, NativeFn};
pub use native_type::{HasClassMeta, HasMethods, NativeType, SharingPolicy};
pub use object_heap::{HandleState, ObjectHandle, ObjectHeap};
pub use type_hash::TypeHash;
pub use value::{HostValue, ValueKind};
pub use wrapper::{CallSite, Invoker};
