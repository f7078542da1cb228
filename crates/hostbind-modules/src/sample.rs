//! The `sample` module: integer helpers and a 2-D `Point`.
//!
//! Bindings, as the host sees them:
//!
//! ```text
//! add(a: int, b: int) -> int
//! fibonacci(n: int) -> int
//! Point(x: float, y: float)
//! Point.x, Point.y: float (read-write)
//! Point.distance_from_origin() -> float
//! Point.translate(dx: float, dy: float) -> none
//! Point.scaled(factor: float) -> Point
//! ```

use hostbind_macros::NativeType;
use hostbind_registry::Module;
use thiserror::Error;

/// Failures reported by the sample functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("integer overflow in {0}")]
    Overflow(&'static str),

    #[error("fibonacci is undefined for negative n (got {0})")]
    NegativeInput(i64),
}

// =============================================================================
// FUNCTIONS
// =============================================================================

/// Sum of two integers.
#[hostbind_macros::function]
pub fn add(a: i64, b: i64) -> Result<i64, SampleError> {
    a.checked_add(b).ok_or(SampleError::Overflow("add"))
}

/// The `n`th Fibonacci number, with `fibonacci(0) == 0`.
///
/// `n` above 92 overflows `i64`.
#[hostbind_macros::function]
pub fn fibonacci(n: i64) -> Result<i64, SampleError> {
    if n < 0 {
        return Err(SampleError::NegativeInput(n));
    }

    if n == 0 {
        return Ok(0);
    }

    let (mut previous, mut current) = (0i64, 1i64);
    for _ in 1..n {
        let next = previous
            .checked_add(current)
            .ok_or(SampleError::Overflow("fibonacci"))?;
        previous = current;
        current = next;
    }
    Ok(current)
}

// =============================================================================
// POINT
// =============================================================================

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, NativeType)]
#[hostbind(clone, get_all, set_all)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[hostbind_macros::methods]
impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_from_origin(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Move in place.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// A new point with both coordinates multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// Creates the `sample` module.
pub fn module() -> Module {
    Module::new("sample")
        .function(hostbind_registry::wrap_function!(add))
        .function(hostbind_registry::wrap_function!(fibonacci))
        .class::<Point>()
        .methods::<Point>()
}
