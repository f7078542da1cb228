//! Binding registry for hostbind.
//!
//! A [`Module`] collects the descriptors generated by the binding macros;
//! [`Module::build`] validates them and freezes them into a [`Registry`],
//! which is immutable from then on and can be shared across threads.

mod describe;
mod entries;
mod module;
mod registry;

pub use describe::BindingDescriptor;
pub use entries::ClassEntry;
pub use module::Module;
pub use registry::Registry;

#[doc(hidden)]
pub mod __private {
    pub use paste::paste;
}
