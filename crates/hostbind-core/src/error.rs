//! Error types for the binding layer.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ConversionError    - a single value failed to marshal
//! NativeError        - failure inside a wrapped native call (carries ConversionError)
//! RegistrationError  - module build rejected a declaration
//! BindingError       - wrapper-level failure, tagged with an ErrorKind
//! ```
//!
//! A wrapper turns the `NativeError` of a call into a `BindingError` once it
//! knows which function, parameter or field was involved. The root crate
//! translates `BindingError` into the host-visible error.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Conversion Errors
// ============================================================================

/// Errors that can occur when converting between native and host values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The host value has the wrong shape for the target
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Integer does not fit the target width
    #[error("integer {value} is out of range for {target_type}")]
    IntegerOutOfRange { value: i128, target_type: &'static str },

    /// Integer cannot be represented exactly by the float target
    #[error("integer {value} cannot be widened to {target_type} without loss")]
    LossyWidening { value: i64, target_type: &'static str },

    /// Finite float outside the target's range
    #[error("float {value} is out of range for {target_type}")]
    FloatOutOfRange { value: f64, target_type: &'static str },

    /// Float has no exact representation in the narrower target
    #[error("float {value} cannot be narrowed to {target_type} without rounding")]
    LossyNarrowing { value: f64, target_type: &'static str },

    /// Object handle refers to a reclaimed instance
    #[error("object handle #{index}.{generation} has been reclaimed")]
    StaleHandle { index: u32, generation: u32 },

    /// Every addressable heap slot is live or retired
    #[error("object heap has no addressable slot left")]
    HeapExhausted,
}

impl ConversionError {
    /// The target the conversion was aiming for.
    pub fn expected(&self) -> &'static str {
        match self {
            ConversionError::TypeMismatch { expected, .. } => expected,
            ConversionError::IntegerOutOfRange { target_type, .. }
            | ConversionError::LossyWidening { target_type, .. }
            | ConversionError::FloatOutOfRange { target_type, .. }
            | ConversionError::LossyNarrowing { target_type, .. } => target_type,
            ConversionError::StaleHandle { .. } => "live object",
            ConversionError::HeapExhausted => "free heap slot",
        }
    }

    /// What was actually offered, including the value for range failures.
    pub fn actual(&self) -> String {
        match self {
            ConversionError::TypeMismatch { actual, .. } => (*actual).to_string(),
            ConversionError::IntegerOutOfRange { value, .. } => format!("int {value}"),
            ConversionError::LossyWidening { value, .. } => format!("int {value}"),
            ConversionError::FloatOutOfRange { value, .. } | ConversionError::LossyNarrowing { value, .. } => {
                format!("float {value}")
            }
            ConversionError::StaleHandle { .. } => "reclaimed object".to_string(),
            ConversionError::HeapExhausted => "exhausted heap".to_string(),
        }
    }
}

// ============================================================================
// Native Call Errors
// ============================================================================

/// Errors that can occur during a wrapped native call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    /// An argument failed to marshal
    #[error("argument {index}: {source}")]
    Argument {
        index: usize,
        source: ConversionError,
    },

    /// Argument index out of bounds
    #[error("argument index {index} out of bounds (call has {count} arguments)")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    /// The native return value could not be handed to the host
    #[error("return value: {0}")]
    Return(#[source] ConversionError),

    /// Invalid receiver for a method or field access
    #[error("invalid receiver: {message}")]
    InvalidThis { message: String },

    /// Receiver handle refers to a reclaimed instance
    #[error("object handle #{index}.{generation} has been reclaimed")]
    StaleHandle { index: u32, generation: u32 },

    /// Native function panicked
    #[error("native function panicked: {message}")]
    Panic { message: String },

    /// Native function reported an error
    #[error("{message}")]
    Failed { message: String },
}

impl NativeError {
    /// Create an "invalid receiver" error with a message.
    pub fn invalid_this(message: impl Into<String>) -> Self {
        NativeError::InvalidThis {
            message: message.into(),
        }
    }

    /// Create an error reported by the native function itself.
    pub fn failed(message: impl Into<String>) -> Self {
        NativeError::Failed {
            message: message.into(),
        }
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while building a module into a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("function '{name}' is already registered")]
    DuplicateFunction { name: String },

    #[error("type '{name}' is already registered")]
    DuplicateType { name: String },

    /// Fields and methods of one type share a namespace
    #[error("type '{type_name}' already has a member named '{member}'")]
    DuplicateMember { type_name: String, member: String },

    #[error("methods registered for '{type_name}', which is not a registered type")]
    MethodsWithoutClass { type_name: String },

    #[error("methods for '{type_name}' are already registered")]
    DuplicateMethodTable { type_name: String },
}

// ============================================================================
// Binding Errors
// ============================================================================

/// Stable classification of binding failures.
///
/// The string tags returned by [`ErrorKind::as_str`] are part of the host
/// contract and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ArityError,
    TypeMismatch,
    NoSuchField,
    NoSuchMethod,
    ConstructionError,
    NotFound,
    UseAfterFree,
    ReadOnlyField,
    SharingViolation,
    NativeFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ArityError => "ArityError",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::NoSuchField => "NoSuchField",
            ErrorKind::NoSuchMethod => "NoSuchMethod",
            ErrorKind::ConstructionError => "ConstructionError",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::UseAfterFree => "UseAfterFree",
            ErrorKind::ReadOnlyField => "ReadOnlyField",
            ErrorKind::SharingViolation => "SharingViolation",
            ErrorKind::NativeFailure => "NativeFailure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which registry namespace a failed lookup searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Function,
    Type,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Function => f.write_str("function"),
            Namespace::Type => f.write_str("type"),
        }
    }
}

/// A failure at the binding boundary, with enough context to name the
/// callable, parameter or field involved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    #[error("{context} takes {expected} argument(s) but {received} were given")]
    Arity {
        context: String,
        expected: usize,
        received: usize,
    },

    #[error("{context}: '{target}' expected {expected}, got {actual}")]
    TypeMismatch {
        context: String,
        target: String,
        expected: String,
        actual: String,
    },

    #[error("'{type_name}' has no field '{field}'")]
    NoSuchField { type_name: String, field: String },

    #[error("field '{type_name}.{field}' is read-only")]
    ReadOnlyField { type_name: String, field: String },

    #[error("'{type_name}' has no method '{method}'")]
    NoSuchMethod { type_name: String, method: String },

    #[error("cannot construct '{type_name}': {reason}")]
    Construction {
        type_name: String,
        param: Option<String>,
        expected: Option<String>,
        actual: Option<String>,
        reason: String,
    },

    #[error("no {namespace} named '{name}'")]
    NotFound { namespace: Namespace, name: String },

    #[error("object handle #{index}.{generation} has been reclaimed")]
    UseAfterFree { index: u32, generation: u32 },

    #[error("'{type_name}' does not permit {operation}")]
    SharingViolation {
        type_name: String,
        operation: &'static str,
    },

    #[error("{context}: {message}")]
    NativeFailure { context: String, message: String },
}

impl BindingError {
    /// Map a marshalling failure for `target` within `context`.
    ///
    /// Stale handles are always reported as use-after-free, whatever the
    /// conversion was for.
    pub fn conversion(context: impl Into<String>, target: impl Into<String>, error: ConversionError) -> Self {
        match error {
            ConversionError::StaleHandle { index, generation } => BindingError::UseAfterFree { index, generation },
            other => BindingError::TypeMismatch {
                context: context.into(),
                target: target.into(),
                expected: other.expected().to_string(),
                actual: other.actual(),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BindingError::Arity { .. } => ErrorKind::ArityError,
            BindingError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            BindingError::NoSuchField { .. } => ErrorKind::NoSuchField,
            BindingError::ReadOnlyField { .. } => ErrorKind::ReadOnlyField,
            BindingError::NoSuchMethod { .. } => ErrorKind::NoSuchMethod,
            BindingError::Construction { .. } => ErrorKind::ConstructionError,
            BindingError::NotFound { .. } => ErrorKind::NotFound,
            BindingError::UseAfterFree { .. } => ErrorKind::UseAfterFree,
            BindingError::SharingViolation { .. } => ErrorKind::SharingViolation,
            BindingError::NativeFailure { .. } => ErrorKind::NativeFailure,
        }
    }

    /// The name of the function, parameter, field, method or type at fault.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            BindingError::Arity { context, .. } | BindingError::NativeFailure { context, .. } => Some(context.as_str()),
            BindingError::TypeMismatch { target, .. } => Some(target.as_str()),
            BindingError::NoSuchField { field, .. } | BindingError::ReadOnlyField { field, .. } => Some(field.as_str()),
            BindingError::NoSuchMethod { method, .. } => Some(method.as_str()),
            BindingError::Construction { type_name, param, .. } => Some(param.as_deref().unwrap_or(type_name.as_str())),
            BindingError::NotFound { name, .. } => Some(name.as_str()),
            BindingError::SharingViolation { type_name, .. } => Some(type_name.as_str()),
            BindingError::UseAfterFree { .. } => None,
        }
    }

    pub fn expected(&self) -> Option<String> {
        match self {
            BindingError::Arity { expected, .. } => Some(expected.to_string()),
            BindingError::TypeMismatch { expected, .. } => Some(expected.clone()),
            BindingError::Construction { expected, .. } => expected.clone(),
            _ => None,
        }
    }

    pub fn actual(&self) -> Option<String> {
        match self {
            BindingError::Arity { received, .. } => Some(received.to_string()),
            BindingError::TypeMismatch { actual, .. } => Some(actual.clone()),
            BindingError::Construction { actual, .. } => actual.clone(),
            _ => None,
        }
    }

    /// Re-frame a failure raised while running a constructor of `type_name`.
    ///
    /// Arity and use-after-free keep their kind; everything else names the
    /// type being constructed.
    pub fn into_construction(self, type_name: &str) -> Self {
        match self {
            BindingError::TypeMismatch {
                target, expected, actual, ..
            } => BindingError::Construction {
                type_name: type_name.to_string(),
                reason: format!("argument '{target}' expected {expected}, got {actual}"),
                param: Some(target),
                expected: Some(expected),
                actual: Some(actual),
            },
            BindingError::NativeFailure { message, .. } => BindingError::Construction {
                type_name: type_name.to_string(),
                param: None,
                expected: None,
                actual: None,
                reason: message,
            },
            other => other,
        }
    }
}
