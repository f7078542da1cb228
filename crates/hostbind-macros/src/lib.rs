//! hostbind Proc Macros
//!
//! This crate provides the procedural macros that generate binding
//! descriptors for native Rust code.
//!
//! # Macros
//!
//! - `#[derive(NativeType)]` - Expose a struct and its fields
//! - `#[hostbind::function]` - Expose a free function
//! - `#[hostbind::methods]` - Expose the constructor and methods of an impl block
//!
//! # Example
//!
//! ```ignore
//! use hostbind::NativeType;
//!
//! #[derive(Clone, NativeType)]
//! #[hostbind(clone, get_all, set_all)]
//! pub struct Point {
//!     pub x: f64,
//!     pub y: f64,
//! }
//! ```

use proc_macro::TokenStream;

mod attrs;
mod derive_native_type;
mod function;
mod methods;
mod signature;

/// Derive `NativeType` and the marshalling traits for a struct.
///
/// Generates `NativeType`, `HostType`, `IntoHost`, `HasClassMeta` and, for
/// `clone` types, `FromHost` and a copy function.
///
/// # Attributes
///
/// - `#[hostbind(name = "...")]` - Override the host type name
/// - `#[hostbind(shared)]` - Allow several host holders of one instance
/// - `#[hostbind(clone)]` - Allow copies and by-value parameters (requires `Clone`)
/// - `#[hostbind(get_all)]` - Expose every field for reading
/// - `#[hostbind(set_all)]` - Expose every field for writing
///
/// # Field Attributes
///
/// - `#[hostbind(get)]` - Expose for reading
/// - `#[hostbind(get, set)]` - Expose for reading and writing
/// - `#[hostbind(name = "...")]` - Override the field name
/// - `#[hostbind(skip)]` - Hide a field from `get_all`/`set_all`
///
/// Exposed fields must be `Clone`; reads hand the host a copy.
///
/// # Example
///
/// ```ignore
/// #[derive(NativeType)]
/// #[hostbind(name = "Account", shared)]
/// pub struct Ledger {
///     #[hostbind(get, name = "balance")]
///     cents: i64,
///
///     owner: String,
/// }
/// ```
#[proc_macro_derive(NativeType, attributes(hostbind))]
pub fn derive_native_type(input: TokenStream) -> TokenStream {
    derive_native_type::derive_native_type_impl(input)
}

/// Expose a free function.
///
/// The function is kept as written. Next to it the macro emits a hidden
/// descriptor constructor that `wrap_function!` resolves.
///
/// # Attributes
///
/// - `name = "..."` - Override the host name
///
/// Parameters must be owned and convertible from host values. A
/// `Result<T, E>` return reports `Err` to the host as a native failure
/// carrying `E`'s `Display` text.
///
/// # Example
///
/// ```ignore
/// #[hostbind::function]
/// pub fn add(a: i64, b: i64) -> i64 {
///     a + b
/// }
///
/// let module = Module::new("sample").function(wrap_function!(add));
/// ```
#[proc_macro_attribute]
pub fn function(attr: TokenStream, item: TokenStream) -> TokenStream {
    function::function_impl(attr, item)
}

/// Expose the constructor and methods of an inherent impl block.
///
/// Every method is exposed unless marked `#[hostbind(skip)]`. How the
/// receiver is taken decides the binding kind:
///
/// - `&mut self` - mutating
/// - `&self` returning `Self` - value-producing
/// - `self` - called on a copy of the instance (the type must be `clone`)
/// - any other `&self` - read-only
///
/// The constructor is `fn new(..) -> Self` or any associated function
/// marked `#[hostbind(constructor)]`. Other associated functions without a
/// receiver must be skipped.
///
/// # Method Attributes
///
/// - `#[hostbind(name = "...")]` - Override the host name
/// - `#[hostbind(constructor)]` - Mark the constructor
/// - `#[hostbind(skip)]` - Keep a method native-only
///
/// # Example
///
/// ```ignore
/// #[hostbind::methods]
/// impl Point {
///     pub fn new(x: f64, y: f64) -> Self { Self { x, y } }
///
///     pub fn translate(&mut self, dx: f64, dy: f64) { ... }
///
///     pub fn scaled(&self, factor: f64) -> Self { ... }
/// }
/// ```
#[proc_macro_attribute]
pub fn methods(attr: TokenStream, item: TokenStream) -> TokenStream {
    methods::methods_impl(attr, item)
}
