//! Registry entry for an exposed type.

use rustc_hash::FxHashMap;

use hostbind_core::{
    BindingError, ClassMeta, ConstructorMeta, CopyFn, FieldMeta, MethodMeta, MethodTable, RegistrationError,
    SharingPolicy, TypeHash,
};

/// Everything the runtime needs to construct, access and dispatch on one
/// exposed type: its fields from `#[derive(NativeType)]` plus the
/// constructor and methods from `#[hostbind::methods]`.
///
/// Fields and methods share one member namespace.
#[derive(Debug, Clone)]
pub struct ClassEntry {
    name: &'static str,
    type_hash: TypeHash,
    sharing: SharingPolicy,
    copy: Option<CopyFn>,
    fields: Vec<FieldMeta>,
    methods: Vec<MethodMeta>,
    constructor: Option<ConstructorMeta>,
    /// Member name -> position in `fields` or `methods`
    members: FxHashMap<&'static str, Member>,
    has_method_table: bool,
}

#[derive(Debug, Clone, Copy)]
enum Member {
    Field(usize),
    Method(usize),
}

impl ClassEntry {
    pub(crate) fn new(meta: ClassMeta) -> Result<Self, RegistrationError> {
        let mut entry = Self {
            name: meta.name,
            type_hash: meta.type_hash,
            sharing: meta.sharing,
            copy: meta.copy,
            fields: Vec::with_capacity(meta.fields.len()),
            methods: Vec::new(),
            constructor: None,
            members: FxHashMap::default(),
            has_method_table: false,
        };

        for field in meta.fields {
            entry.claim(field.name, Member::Field(entry.fields.len()))?;
            entry.fields.push(field);
        }
        Ok(entry)
    }

    pub(crate) fn attach(&mut self, table: MethodTable) -> Result<(), RegistrationError> {
        if self.has_method_table {
            return Err(RegistrationError::DuplicateMethodTable {
                type_name: self.name.to_string(),
            });
        }
        self.has_method_table = true;
        self.constructor = table.constructor;

        for method in table.methods {
            self.claim(method.name, Member::Method(self.methods.len()))?;
            self.methods.push(method);
        }
        Ok(())
    }

    fn claim(&mut self, name: &'static str, member: Member) -> Result<(), RegistrationError> {
        if self.members.insert(name, member).is_some() {
            return Err(RegistrationError::DuplicateMember {
                type_name: self.name.to_string(),
                member: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    pub fn sharing(&self) -> SharingPolicy {
        self.sharing
    }

    /// Copy support, present for types declared `clone`.
    pub fn copy_fn(&self) -> Option<CopyFn> {
        self.copy
    }

    pub fn constructor(&self) -> Option<&ConstructorMeta> {
        self.constructor.as_ref()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> &[MethodMeta] {
        &self.methods
    }

    pub fn field(&self, name: &str) -> Result<&FieldMeta, BindingError> {
        match self.members.get(name) {
            Some(Member::Field(index)) => Ok(&self.fields[*index]),
            _ => Err(BindingError::NoSuchField {
                type_name: self.name.to_string(),
                field: name.to_string(),
            }),
        }
    }

    pub fn method(&self, name: &str) -> Result<&MethodMeta, BindingError> {
        match self.members.get(name) {
            Some(Member::Method(index)) => Ok(&self.methods[*index]),
            _ => Err(BindingError::NoSuchMethod {
                type_name: self.name.to_string(),
                method: name.to_string(),
            }),
        }
    }
}
