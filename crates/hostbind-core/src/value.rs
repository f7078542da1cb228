//! Host-side values and their semantic kinds.

use std::fmt;

use crate::ObjectHandle;

/// A value as the host runtime sees it.
///
/// Every value crossing the boundary is one of these. Primitives are copied;
/// objects travel as an [`ObjectHandle`] into the runtime's heap, so cloning a
/// `HostValue` copies the handle and never the native instance behind it.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum HostValue {
    /// The host's "nothing" value
    #[default]
    None,
    /// Boolean value
    Bool(bool),
    /// Integer value (every native integer width travels as i64)
    Int(i64),
    /// Floating point value (f32 and f64 both travel as f64)
    Float(f64),
    /// String value (owned)
    Str(String),
    /// Handle to a native instance held by the object heap
    Object(ObjectHandle),
}

impl HostValue {
    /// Human-readable name of this value's kind, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::None => "none",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::Str(_) => "str",
            HostValue::Object(_) => "object",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, HostValue::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            HostValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            HostValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectHandle> {
        match self {
            HostValue::Object(h) => Some(*h),
            _ => None,
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::None => write!(f, "none"),
            HostValue::Bool(v) => write!(f, "{v}"),
            HostValue::Int(v) => write!(f, "{v}"),
            HostValue::Float(v) => write!(f, "{v:?}"),
            HostValue::Str(v) => write!(f, "{v:?}"),
            HostValue::Object(h) => write!(f, "<object #{}.{}>", h.index, h.generation),
        }
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        HostValue::Bool(v)
    }
}

impl From<i64> for HostValue {
    fn from(v: i64) -> Self {
        HostValue::Int(v)
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        HostValue::Float(v)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::Str(v.to_owned())
    }
}

impl From<String> for HostValue {
    fn from(v: String) -> Self {
        HostValue::Str(v)
    }
}

impl From<ObjectHandle> for HostValue {
    fn from(h: ObjectHandle) -> Self {
        HostValue::Object(h)
    }
}

/// Semantic type of a parameter, return value or field.
///
/// This is what the host sees in signatures; the exact native width
/// (`i32` vs `u8`) stays on the native side and is enforced by the
/// marshaller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    None,
    Bool,
    Int,
    Float,
    Str,
    /// An exposed native type, by its exposed name
    Object(&'static str),
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::None => write!(f, "none"),
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Int => write!(f, "int"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Str => write!(f, "str"),
            ValueKind::Object(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeHash;

    #[test]
    fn type_names() {
        assert_eq!(HostValue::None.type_name(), "none");
        assert_eq!(HostValue::Bool(true).type_name(), "bool");
        assert_eq!(HostValue::Int(1).type_name(), "int");
        assert_eq!(HostValue::Float(1.0).type_name(), "float");
        assert_eq!(HostValue::from("a").type_name(), "str");
    }

    #[test]
    fn cloning_an_object_value_copies_the_handle() {
        let handle = ObjectHandle::new(3, 7, TypeHash::from_name("Point"));
        let value = HostValue::Object(handle);
        let copy = value.clone();
        assert_eq!(copy.as_object(), Some(handle));
    }

    #[test]
    fn accessors_reject_other_kinds() {
        assert_eq!(HostValue::Int(5).as_float(), None);
        assert_eq!(HostValue::Float(5.0).as_int(), None);
        assert_eq!(HostValue::Str("x".into()).as_str(), Some("x"));
        assert!(HostValue::default().is_none());
    }

    #[test]
    fn kind_display() {
        assert_eq!(ValueKind::Int.to_string(), "int");
        assert_eq!(ValueKind::Object("Point").to_string(), "Point");
    }
}
