//! Module builder.

use hostbind_core::{ClassMeta, FunctionMeta, HasClassMeta, HasMethods, MethodTable, RegistrationError};

use crate::Registry;

/// Collects bindings and freezes them into a [`Registry`].
///
/// # Example
///
/// ```ignore
/// let registry = Module::new("sample")
///     .function(wrap_function!(add))
///     .class::<Point>()
///     .methods::<Point>()
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct Module {
    name: String,
    functions: Vec<FunctionMeta>,
    classes: Vec<ClassMeta>,
    method_tables: Vec<MethodTable>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a free function, usually via `wrap_function!`.
    pub fn function(mut self, meta: FunctionMeta) -> Self {
        self.functions.push(meta);
        self
    }

    /// Add a type declared with `#[derive(NativeType)]`.
    pub fn class<T: HasClassMeta>(self) -> Self {
        self.class_meta(T::class_meta())
    }

    /// Add the constructor and methods declared with `#[hostbind::methods]`.
    pub fn methods<T: HasMethods>(self) -> Self {
        self.method_table(T::method_table())
    }

    pub fn class_meta(mut self, meta: ClassMeta) -> Self {
        self.classes.push(meta);
        self
    }

    pub fn method_table(mut self, table: MethodTable) -> Self {
        self.method_tables.push(table);
        self
    }

    /// Append every binding of `other` to this module.
    pub fn merge(mut self, other: Module) -> Self {
        self.functions.extend(other.functions);
        self.classes.extend(other.classes);
        self.method_tables.extend(other.method_tables);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate every binding and freeze the module.
    ///
    /// Types are registered before method tables, so the order of `class`
    /// and `methods` calls does not matter.
    pub fn build(self) -> Result<Registry, RegistrationError> {
        let mut registry = Registry::empty(self.name);
        for meta in self.functions {
            registry.register_function(meta)?;
        }
        for meta in self.classes {
            registry.register_class(meta)?;
        }
        for table in self.method_tables {
            registry.register_methods(table)?;
        }
        log::debug!(
            "built module '{}': {} function(s), {} type(s)",
            registry.name(),
            registry.function_count(),
            registry.class_count()
        );
        Ok(registry)
    }
}

/// Resolve the descriptor generated by `#[hostbind::function]`.
///
/// The function must be in scope; its hidden descriptor shares its
/// visibility, so a glob import of the defining module brings both in.
///
/// ```ignore
/// Module::new("sample").function(wrap_function!(add))
/// ```
#[macro_export]
macro_rules! wrap_function {
    ($name:ident) => {
        $crate::__private::paste! { [<__hostbind_fn_ $name>]() }
    };
}
