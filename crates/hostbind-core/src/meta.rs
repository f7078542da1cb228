//! Descriptors produced by the binding macros.
//!
//! Each descriptor pairs the host-visible signature of a binding with the
//! [`NativeFn`] that implements it. The registry stores them unchanged once
//! a module is built.

use std::fmt;

use bitflags::bitflags;

use crate::error::ConversionError;
use crate::{NativeFn, ObjectHandle, ObjectHeap, SharingPolicy, TypeHash, ValueKind};

/// One named parameter of a callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamMeta {
    pub name: &'static str,
    pub kind: ValueKind,
}

impl ParamMeta {
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self { name, kind }
    }
}

/// Writes `(a: int, b: int)` for a parameter list.
pub fn write_params(f: &mut impl fmt::Write, params: &[ParamMeta]) -> fmt::Result {
    f.write_char('(')?;
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {}", param.name, param.kind)?;
    }
    f.write_char(')')
}

/// A free function exposed to the host.
#[derive(Debug, Clone)]
pub struct FunctionMeta {
    pub name: &'static str,
    pub params: Vec<ParamMeta>,
    pub returns: ValueKind,
    pub native: NativeFn,
}

/// How a method uses its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverMode {
    /// `&self`; the instance is unchanged
    ReadOnly,
    /// `&mut self`; changes are visible through the same handle
    Mutating,
    /// Reads the instance and returns a new one in a new handle
    ValueProducing,
}

/// A method exposed on a native type.
#[derive(Debug, Clone)]
pub struct MethodMeta {
    pub name: &'static str,
    pub receiver: ReceiverMode,
    pub params: Vec<ParamMeta>,
    pub returns: ValueKind,
    pub native: NativeFn,
}

/// The constructor of a native type.
#[derive(Debug, Clone)]
pub struct ConstructorMeta {
    pub params: Vec<ParamMeta>,
    pub native: NativeFn,
}

bitflags! {
    /// Host access to a field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldAccess: u8 {
        const READ = 0x01;
        const WRITE = 0x02;
    }
}

/// A field exposed on a native type.
#[derive(Debug, Clone)]
pub struct FieldMeta {
    pub name: &'static str,
    pub kind: ValueKind,
    pub access: FieldAccess,
    pub getter: NativeFn,
    /// Present only when `access` contains `WRITE`
    pub setter: Option<NativeFn>,
}

impl FieldMeta {
    pub fn is_writable(&self) -> bool {
        self.access.contains(FieldAccess::WRITE)
    }
}

/// Copies an instance into a new, independently owned handle.
pub type CopyFn = fn(&mut ObjectHeap, ObjectHandle) -> Result<ObjectHandle, ConversionError>;

/// Type-level descriptor generated by `#[derive(NativeType)]`.
#[derive(Debug, Clone)]
pub struct ClassMeta {
    pub name: &'static str,
    pub type_hash: TypeHash,
    pub sharing: SharingPolicy,
    pub fields: Vec<FieldMeta>,
    /// Present for types declared `clone`
    pub copy: Option<CopyFn>,
}

/// Constructor and methods generated by `#[hostbind::methods]`.
#[derive(Debug, Clone)]
pub struct MethodTable {
    pub type_hash: TypeHash,
    pub type_name: &'static str,
    pub constructor: Option<ConstructorMeta>,
    pub methods: Vec<MethodMeta>,
}

/// Every kind of binding a registry can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Function,
    Constructor,
    FieldRead,
    FieldWrite,
    MethodReadOnly,
    MethodMutating,
    MethodValueProducing,
}

impl From<ReceiverMode> for BindingKind {
    fn from(mode: ReceiverMode) -> Self {
        match mode {
            ReceiverMode::ReadOnly => BindingKind::MethodReadOnly,
            ReceiverMode::Mutating => BindingKind::MethodMutating,
            ReceiverMode::ValueProducing => BindingKind::MethodValueProducing,
        }
    }
}
