//! Traits implemented by exposed native types.
//!
//! These are normally generated: `#[derive(NativeType)]` implements
//! [`NativeType`], [`HostType`](crate::HostType), the conversions and
//! [`HasClassMeta`]; `#[hostbind::methods]` implements [`HasMethods`].
//!
//! # Example
//!
//! ```
//! use hostbind_core::{NativeType, SharingPolicy, TypeHash};
//!
//! struct Counter {
//!     value: i64,
//! }
//!
//! impl NativeType for Counter {
//!     fn type_hash() -> TypeHash {
//!         TypeHash::from_name("Counter")
//!     }
//!
//!     fn type_name() -> &'static str {
//!         "Counter"
//!     }
//!
//!     fn sharing() -> SharingPolicy {
//!         SharingPolicy::Shared
//!     }
//! }
//! ```

use crate::meta::{ClassMeta, MethodTable};
use crate::TypeHash;

/// How many host holders a native instance may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SharingPolicy {
    /// One live holder; `share` is refused.
    #[default]
    Exclusive,
    /// Reference-counted; every holder observes the same instance.
    Shared,
}

/// A native type that can live in the object heap behind a host handle.
pub trait NativeType: std::any::Any + Send + Sync {
    /// Identity used to dispatch on handles.
    fn type_hash() -> TypeHash;

    /// The name the host uses for this type.
    fn type_name() -> &'static str;

    fn sharing() -> SharingPolicy {
        SharingPolicy::Exclusive
    }
}

/// Exposes a type's fields (and copy support) to the registry.
pub trait HasClassMeta: NativeType {
    fn class_meta() -> ClassMeta;
}

/// Exposes a type's constructor and methods to the registry.
pub trait HasMethods: NativeType {
    fn method_table() -> MethodTable;
}
