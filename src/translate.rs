//! Translation of binding failures into host-visible errors.

use hostbind_core::{BindingError, ErrorKind};
use thiserror::Error;

/// A failure as the host runtime sees it.
///
/// `kind` is the stable tag the host dispatches on; `identifier`,
/// `expected` and `actual` carry the offending name and the type or count
/// mismatch when the failure has one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct HostError {
    pub kind: ErrorKind,
    pub message: String,
    pub identifier: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl HostError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The stable string tag, e.g. `"TypeMismatch"`.
    pub fn kind_str(&self) -> &'static str {
        self.kind.as_str()
    }
}

impl From<BindingError> for HostError {
    fn from(error: BindingError) -> Self {
        HostError {
            kind: error.kind(),
            message: error.to_string(),
            identifier: error.identifier().map(str::to_string),
            expected: error.expected(),
            actual: error.actual(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostbind_core::Namespace;

    #[test]
    fn test_translates_type_mismatch() {
        let error = HostError::from(BindingError::TypeMismatch {
            context: "add()".to_string(),
            target: "b".to_string(),
            expected: "int".to_string(),
            actual: "str".to_string(),
        });
        assert_eq!(error.kind(), ErrorKind::TypeMismatch);
        assert_eq!(error.identifier.as_deref(), Some("b"));
        assert_eq!(error.expected.as_deref(), Some("int"));
        assert_eq!(error.actual.as_deref(), Some("str"));
        assert_eq!(error.to_string(), "TypeMismatch: add(): 'b' expected int, got str");
    }

    #[test]
    fn test_translates_not_found() {
        let error = HostError::from(BindingError::NotFound {
            namespace: Namespace::Function,
            name: "mul".to_string(),
        });
        assert_eq!(error.kind_str(), "NotFound");
        assert_eq!(error.identifier.as_deref(), Some("mul"));
        assert!(error.expected.is_none());
    }
}
