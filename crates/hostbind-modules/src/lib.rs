//! Binding modules built with hostbind.
//!
//! - **sample** - `add`, `fibonacci` and a 2-D `Point` type
//!
//! # Usage
//!
//! Each module provides a function that returns a `Module`, which is built
//! into a `Registry` once and then shared:
//!
//! ```ignore
//! use hostbind_modules::sample;
//!
//! let registry = sample::module().build()?;
//! ```

use std::sync::{Arc, OnceLock};

use hostbind_core::RegistrationError;
use hostbind_registry::Registry;

pub mod sample;

pub use sample::{Point, SampleError};

/// The process-wide `sample` registry, built on first use.
pub fn sample_registry() -> Result<Arc<Registry>, RegistrationError> {
    static REGISTRY: OnceLock<Result<Arc<Registry>, RegistrationError>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| sample::module().build().map(Arc::new))
        .clone()
}
