//! Registry - the frozen table of every binding in a module.
//!
//! # Storage Model
//!
//! - **Functions**: stored in registration order, indexed by name
//! - **Types**: [`ClassEntry`] values in registration order, indexed by name
//!   and by `TypeHash` (for dispatch on object handles)
//!
//! # Thread Safety
//!
//! A `Registry` is only produced by [`Module::build`](crate::Module::build)
//! and has no mutating methods, so it is `Send + Sync` and is shared across
//! threads as `Arc<Registry>` without locking.

use rustc_hash::FxHashMap;

use hostbind_core::{BindingError, ClassMeta, FunctionMeta, MethodTable, Namespace, RegistrationError, TypeHash};

use crate::ClassEntry;

/// Immutable binding table.
#[derive(Debug)]
pub struct Registry {
    name: String,
    functions: Vec<FunctionMeta>,
    function_index: FxHashMap<&'static str, usize>,
    classes: Vec<ClassEntry>,
    class_index: FxHashMap<&'static str, usize>,
    /// Reverse index: hash -> position in `classes`
    class_hash_index: FxHashMap<TypeHash, usize>,
}

impl Registry {
    pub(crate) fn empty(name: String) -> Self {
        Self {
            name,
            functions: Vec::new(),
            function_index: FxHashMap::default(),
            classes: Vec::new(),
            class_index: FxHashMap::default(),
            class_hash_index: FxHashMap::default(),
        }
    }

    pub(crate) fn register_function(&mut self, meta: FunctionMeta) -> Result<(), RegistrationError> {
        if self.function_index.contains_key(meta.name) {
            return Err(RegistrationError::DuplicateFunction {
                name: meta.name.to_string(),
            });
        }
        log::debug!("registered function '{}' in '{}'", meta.name, self.name);
        self.function_index.insert(meta.name, self.functions.len());
        self.functions.push(meta);
        Ok(())
    }

    pub(crate) fn register_class(&mut self, meta: ClassMeta) -> Result<(), RegistrationError> {
        if self.class_index.contains_key(meta.name) || self.class_hash_index.contains_key(&meta.type_hash) {
            return Err(RegistrationError::DuplicateType {
                name: meta.name.to_string(),
            });
        }
        let entry = ClassEntry::new(meta)?;
        log::debug!(
            "registered type '{}' with {} field(s) in '{}'",
            entry.name(),
            entry.fields().len(),
            self.name
        );
        let index = self.classes.len();
        self.class_index.insert(entry.name(), index);
        self.class_hash_index.insert(entry.type_hash(), index);
        self.classes.push(entry);
        Ok(())
    }

    pub(crate) fn register_methods(&mut self, table: MethodTable) -> Result<(), RegistrationError> {
        let Some(&index) = self.class_hash_index.get(&table.type_hash) else {
            return Err(RegistrationError::MethodsWithoutClass {
                type_name: table.type_name.to_string(),
            });
        };
        log::debug!(
            "registered {} method(s) for '{}' in '{}'",
            table.methods.len(),
            table.type_name,
            self.name
        );
        self.classes[index].attach(table)
    }

    /// Name of the module this registry was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function(&self, name: &str) -> Result<&FunctionMeta, BindingError> {
        self.function_index
            .get(name)
            .map(|&index| &self.functions[index])
            .ok_or_else(|| BindingError::NotFound {
                namespace: Namespace::Function,
                name: name.to_string(),
            })
    }

    pub fn class(&self, name: &str) -> Result<&ClassEntry, BindingError> {
        self.class_index
            .get(name)
            .map(|&index| &self.classes[index])
            .ok_or_else(|| BindingError::NotFound {
                namespace: Namespace::Type,
                name: name.to_string(),
            })
    }

    /// Look up the type behind an object handle.
    pub fn class_by_hash(&self, hash: TypeHash) -> Option<&ClassEntry> {
        self.class_hash_index.get(&hash).map(|&index| &self.classes[index])
    }

    /// Functions in registration order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionMeta> {
        self.functions.iter()
    }

    /// Types in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.iter()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Module;
    use hostbind_core::{
        CallContext, ConstructorMeta, ErrorKind, FieldAccess, FieldMeta, MethodMeta, NativeError, NativeFn, ParamMeta,
        ReceiverMode, SharingPolicy, ValueKind,
    };

    fn noop(_ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        Ok(())
    }

    fn native(name: &str) -> NativeFn {
        NativeFn::new(TypeHash::from_function(name), noop)
    }

    fn function(name: &'static str) -> FunctionMeta {
        FunctionMeta {
            name,
            params: vec![ParamMeta::new("n", ValueKind::Int)],
            returns: ValueKind::Int,
            native: native(name),
        }
    }

    fn field(name: &'static str) -> FieldMeta {
        FieldMeta {
            name,
            kind: ValueKind::Float,
            access: FieldAccess::READ,
            getter: native(name),
            setter: None,
        }
    }

    fn class(name: &'static str, fields: Vec<FieldMeta>) -> ClassMeta {
        ClassMeta {
            name,
            type_hash: TypeHash::from_name(name),
            sharing: SharingPolicy::Exclusive,
            fields,
            copy: None,
        }
    }

    fn methods(type_name: &'static str, names: &[&'static str]) -> MethodTable {
        MethodTable {
            type_hash: TypeHash::from_name(type_name),
            type_name,
            constructor: Some(ConstructorMeta {
                params: Vec::new(),
                native: native("new"),
            }),
            methods: names
                .iter()
                .map(|&name| MethodMeta {
                    name,
                    receiver: ReceiverMode::ReadOnly,
                    params: Vec::new(),
                    returns: ValueKind::None,
                    native: native(name),
                })
                .collect(),
        }
    }

    #[test]
    fn lookups_after_build() {
        let registry = Module::new("test")
            .function(function("fibonacci"))
            .class_meta(class("Point", vec![field("x"), field("y")]))
            .method_table(methods("Point", &["norm"]))
            .build()
            .unwrap();

        assert_eq!(registry.name(), "test");
        assert_eq!(registry.function("fibonacci").unwrap().params.len(), 1);
        let point = registry.class("Point").unwrap();
        assert_eq!(point.fields().len(), 2);
        assert!(point.constructor().is_some());
        assert_eq!(point.method("norm").unwrap().receiver, ReceiverMode::ReadOnly);
        assert_eq!(
            registry.class_by_hash(TypeHash::from_name("Point")).map(ClassEntry::name),
            Some("Point")
        );
        assert_eq!(registry.function_count(), 1);
        assert_eq!(registry.class_count(), 1);
    }

    #[test]
    fn missing_names() {
        let registry = Module::new("test")
            .class_meta(class("Point", vec![field("x")]))
            .build()
            .unwrap();

        assert_eq!(registry.function("nope").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(registry.class("Nope").unwrap_err().kind(), ErrorKind::NotFound);
        let point = registry.class("Point").unwrap();
        assert_eq!(point.field("z").unwrap_err().kind(), ErrorKind::NoSuchField);
        assert_eq!(point.method("x").unwrap_err().kind(), ErrorKind::NoSuchMethod);
        assert_eq!(point.field("x").unwrap().name, "x");
    }

    #[test]
    fn duplicate_function() {
        let err = Module::new("test")
            .function(function("add"))
            .function(function("add"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateFunction { name: "add".into() });
    }

    #[test]
    fn duplicate_type() {
        let err = Module::new("test")
            .class_meta(class("Point", vec![]))
            .class_meta(class("Point", vec![]))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateType { name: "Point".into() });
    }

    #[test]
    fn fields_and_methods_share_a_namespace() {
        let err = Module::new("test")
            .class_meta(class("Point", vec![field("x")]))
            .method_table(methods("Point", &["x"]))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateMember {
                type_name: "Point".into(),
                member: "x".into()
            }
        );
    }

    #[test]
    fn functions_and_members_do_not_collide() {
        let registry = Module::new("test")
            .function(function("norm"))
            .class_meta(class("Point", vec![]))
            .method_table(methods("Point", &["norm"]))
            .build();
        assert!(registry.is_ok());
    }

    #[test]
    fn methods_need_their_type() {
        let err = Module::new("test")
            .method_table(methods("Ghost", &["boo"]))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistrationError::MethodsWithoutClass { type_name: "Ghost".into() });
    }

    #[test]
    fn one_method_table_per_type() {
        let err = Module::new("test")
            .class_meta(class("Point", vec![]))
            .method_table(methods("Point", &["a"]))
            .method_table(methods("Point", &["b"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateMethodTable { .. }));
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }

    #[test]
    fn concurrent_reads() {
        let registry = std::sync::Arc::new(
            Module::new("test")
                .function(function("fibonacci"))
                .build()
                .unwrap(),
        );
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let registry = std::sync::Arc::clone(&registry);
                scope.spawn(move || {
                    assert_eq!(registry.function("fibonacci").unwrap().name, "fibonacci");
                });
            }
        });
    }
}
