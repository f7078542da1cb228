//! Automatic bindings between native Rust code and a dynamic host runtime.
//!
//! Declare functions and types with the binding macros, collect them into a
//! [`Module`], build it into a [`Registry`] and drive it from the host
//! through a [`Runtime`]:
//!
//! ```ignore
//! use hostbind::{Module, NativeType, Runtime, HostValue, wrap_function};
//!
//! #[hostbind::function]
//! pub fn add(a: i64, b: i64) -> i64 {
//!     a + b
//! }
//!
//! #[derive(Clone, NativeType)]
//! #[hostbind(clone, get_all, set_all)]
//! pub struct Point {
//!     pub x: f64,
//!     pub y: f64,
//! }
//!
//! #[hostbind::methods]
//! impl Point {
//!     pub fn new(x: f64, y: f64) -> Self { Self { x, y } }
//! }
//!
//! let registry = Module::new("sample")
//!     .function(wrap_function!(add))
//!     .class::<Point>()
//!     .methods::<Point>()
//!     .build()?;
//!
//! let mut runtime = Runtime::new(registry.into());
//! assert_eq!(runtime.call("add", &[HostValue::Int(2), HostValue::Int(3)])?, HostValue::Int(5));
//! ```
//!
//! Failures reach the host as a [`HostError`] tagged with a stable
//! [`ErrorKind`].

pub mod config;
pub mod runtime;
pub mod translate;

pub use config::RuntimeConfig;
pub use runtime::Runtime;
pub use translate::HostError;

pub use hostbind_core::{
    BindingError, BindingKind, ErrorKind, FromHost, HandleState, HostType, HostValue, IntoHost, NativeType,
    NumericPolicy, ObjectHandle, RegistrationError, SharingPolicy, ValueKind,
};
pub use hostbind_macros::{NativeType, function, methods};
pub use hostbind_registry::{BindingDescriptor, ClassEntry, Module, Registry, wrap_function};
