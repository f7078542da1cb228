//! Runtime configuration.

use hostbind_core::{Invoker, NumericPolicy};

/// Configuration for a [`Runtime`](crate::Runtime).
///
/// # Example
///
/// ```ignore
/// let config = RuntimeConfig::new()
///     .numeric_policy(NumericPolicy::Strict)
///     .catch_panics(false);
/// let runtime = Runtime::with_config(registry, config);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Whether host integers may fill float parameters
    pub numeric_policy: NumericPolicy,
    /// Contain native panics at the boundary as `NativeFailure`
    pub catch_panics: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            numeric_policy: NumericPolicy::Widening,
            catch_panics: true,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn numeric_policy(mut self, policy: NumericPolicy) -> Self {
        self.numeric_policy = policy;
        self
    }

    pub fn catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }

    pub(crate) fn invoker(&self) -> Invoker {
        Invoker::new(self.numeric_policy, self.catch_panics)
    }
}
