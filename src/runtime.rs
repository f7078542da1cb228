//! The host-facing entry points.
//!
//! A [`Runtime`] pairs a frozen [`Registry`] with the [`ObjectHeap`] that
//! owns every native instance the host holds. Every entry point resolves a
//! binding by name, runs it through the configured [`Invoker`] and
//! translates failures into [`HostError`].

use std::slice;
use std::sync::Arc;

use hostbind_core::{
    BindingError, CallSite, HandleState, HostValue, Invoker, Namespace, ObjectHandle, ObjectHeap, ParamMeta,
};
use hostbind_registry::{ClassEntry, Registry};

use crate::config::RuntimeConfig;
use crate::translate::HostError;

/// Host-side execution state over a shared registry.
///
/// Calls take `&mut self`: a runtime serves one host thread at a time,
/// while the registry behind it is shared freely.
#[derive(Debug)]
pub struct Runtime {
    registry: Arc<Registry>,
    heap: ObjectHeap,
    config: RuntimeConfig,
}

impl Runtime {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, RuntimeConfig::default())
    }

    pub fn with_config(registry: Arc<Registry>, config: RuntimeConfig) -> Self {
        Self {
            registry,
            heap: ObjectHeap::new(),
            config,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    fn invoker(&self) -> Invoker {
        self.config.invoker()
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    /// Call an exposed free function.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call(&mut self, function: &str, args: &[HostValue]) -> Result<HostValue, HostError> {
        let registry = Arc::clone(&self.registry);
        let invoker = self.invoker();

        let result = registry.function(function).and_then(|meta| {
            let site = CallSite::function(meta.name, &meta.params);
            invoker.invoke(&meta.native, &site, None, args, &mut self.heap)
        });
        result.map_err(translate)
    }

    // ==========================================================================
    // Construction
    // ==========================================================================

    /// Construct an instance from positional arguments.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn construct(&mut self, type_name: &str, args: &[HostValue]) -> Result<ObjectHandle, HostError> {
        let registry = Arc::clone(&self.registry);
        let result = registry
            .class(type_name)
            .and_then(|class| self.run_constructor(class, args));
        result.map_err(translate)
    }

    /// Construct an instance from positional and keyword arguments.
    ///
    /// Keywords name constructor parameters. Positional arguments fill the
    /// leading parameters; every remaining parameter must be given exactly
    /// once by keyword.
    pub fn construct_with_keywords(
        &mut self,
        type_name: &str,
        args: &[HostValue],
        keywords: &[(&str, HostValue)],
    ) -> Result<ObjectHandle, HostError> {
        let registry = Arc::clone(&self.registry);
        let result = registry.class(type_name).and_then(|class| {
            let args = bind_keywords(class, args, keywords)?;
            self.run_constructor(class, &args)
        });
        result.map_err(translate)
    }

    fn run_constructor(&mut self, class: &ClassEntry, args: &[HostValue]) -> Result<ObjectHandle, BindingError> {
        let constructor = class.constructor().ok_or_else(|| construction(class, None, "type has no constructor"))?;

        let site = CallSite::constructor(class.name(), &constructor.params);
        let value = self
            .invoker()
            .invoke(&constructor.native, &site, None, args, &mut self.heap)
            .map_err(|error| error.into_construction(class.name()))?;

        match value {
            HostValue::Object(handle) if handle.type_hash == class.type_hash() => {
                log::debug!("constructed {} as #{}.{}", class.name(), handle.index, handle.generation);
                Ok(handle)
            }
            other => {
                if let HostValue::Object(handle) = other {
                    self.heap.release(handle)?;
                }
                Err(construction(
                    class,
                    None,
                    format!("constructor returned {} instead of an instance", other.type_name()),
                ))
            }
        }
    }

    // ==========================================================================
    // Fields
    // ==========================================================================

    /// Read a field. The host receives a copy of the current value.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get_field(&mut self, handle: ObjectHandle, field: &str) -> Result<HostValue, HostError> {
        let registry = Arc::clone(&self.registry);
        let invoker = self.invoker();

        let result = class_for(&registry, &self.heap, handle).and_then(|class| {
            let field = class.field(field)?;
            let site = CallSite::field(class.name(), field.name, &[]);
            invoker.invoke(&field.getter, &site, Some(handle), &[], &mut self.heap)
        });
        result.map_err(translate)
    }

    /// Overwrite a field in place.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn set_field(&mut self, handle: ObjectHandle, field: &str, value: HostValue) -> Result<(), HostError> {
        let registry = Arc::clone(&self.registry);
        let invoker = self.invoker();

        let result = class_for(&registry, &self.heap, handle).and_then(|class| {
            let field = class.field(field)?;
            let setter = field.setter.as_ref().ok_or_else(|| BindingError::ReadOnlyField {
                type_name: class.name().to_string(),
                field: field.name.to_string(),
            })?;

            let params = [ParamMeta::new(field.name, field.kind)];
            let site = CallSite::field(class.name(), field.name, &params);
            invoker
                .invoke(setter, &site, Some(handle), slice::from_ref(&value), &mut self.heap)
                .map(drop)
        });
        result.map_err(translate)
    }

    // ==========================================================================
    // Methods
    // ==========================================================================

    /// Call a method on an instance.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call_method(&mut self, handle: ObjectHandle, method: &str, args: &[HostValue]) -> Result<HostValue, HostError> {
        let registry = Arc::clone(&self.registry);
        let invoker = self.invoker();

        let result = class_for(&registry, &self.heap, handle).and_then(|class| {
            let method = class.method(method)?;
            let site = CallSite::method(class.name(), method.name, &method.params);
            invoker.invoke(&method.native, &site, Some(handle), args, &mut self.heap)
        });
        result.map_err(translate)
    }

    // ==========================================================================
    // Handles
    // ==========================================================================

    /// Drop one reference to an instance.
    ///
    /// Returns `true` when this was the last reference and the instance was
    /// reclaimed.
    pub fn release(&mut self, handle: ObjectHandle) -> Result<bool, HostError> {
        let reclaimed = self.heap.release(handle).map_err(translate)?;
        if reclaimed {
            log::debug!("reclaimed #{}.{}", handle.index, handle.generation);
        }
        Ok(reclaimed)
    }

    /// Add a holder to an instance of a `shared` type.
    ///
    /// The returned handle is the same handle; every holder observes the same
    /// instance until the last one releases it.
    pub fn share(&mut self, handle: ObjectHandle) -> Result<ObjectHandle, HostError> {
        self.heap.add_ref(handle).map_err(translate)?;
        Ok(handle)
    }

    /// Copy an instance of a `clone` type into a new, independently owned
    /// handle.
    pub fn copy(&mut self, handle: ObjectHandle) -> Result<ObjectHandle, HostError> {
        let registry = Arc::clone(&self.registry);

        let result = class_for(&registry, &self.heap, handle).and_then(|class| {
            let copy = class.copy_fn().ok_or_else(|| BindingError::SharingViolation {
                type_name: class.name().to_string(),
                operation: "copy",
            })?;
            copy(&mut self.heap, handle).map_err(|error| BindingError::conversion(class.name(), class.name(), error))
        });
        result.map_err(translate)
    }

    pub fn state(&self, handle: ObjectHandle) -> HandleState {
        self.heap.state(handle)
    }

    /// The exposed type name of a live instance.
    pub fn type_of(&self, handle: ObjectHandle) -> Result<&'static str, HostError> {
        class_for(&self.registry, &self.heap, handle)
            .map(ClassEntry::name)
            .map_err(translate)
    }

    pub fn ref_count(&self, handle: ObjectHandle) -> Option<u32> {
        self.heap.ref_count(handle)
    }

    /// Number of instances currently owned by the heap.
    pub fn live_objects(&self) -> usize {
        self.heap.live_count()
    }
}

/// Resolve the registered type behind a live handle.
fn class_for<'r>(registry: &'r Registry, heap: &ObjectHeap, handle: ObjectHandle) -> Result<&'r ClassEntry, BindingError> {
    heap.validate(handle).map_err(|_| BindingError::UseAfterFree {
        index: handle.index,
        generation: handle.generation,
    })?;
    registry
        .class_by_hash(handle.type_hash)
        .ok_or_else(|| BindingError::NotFound {
            namespace: Namespace::Type,
            name: heap.type_name(handle).unwrap_or("<unregistered>").to_string(),
        })
}

/// Order positional and keyword arguments by constructor parameter.
fn bind_keywords(
    class: &ClassEntry,
    args: &[HostValue],
    keywords: &[(&str, HostValue)],
) -> Result<Vec<HostValue>, BindingError> {
    let constructor = class.constructor().ok_or_else(|| construction(class, None, "type has no constructor"))?;
    let params = &constructor.params;

    if args.len() > params.len() {
        return Err(BindingError::Arity {
            context: CallSite::constructor(class.name(), params).to_string(),
            expected: params.len(),
            received: args.len() + keywords.len(),
        });
    }

    let mut slots: Vec<Option<HostValue>> = args.iter().cloned().map(Some).collect();
    slots.resize(params.len(), None);

    for (keyword, value) in keywords {
        let Some(index) = params.iter().position(|param| param.name == *keyword) else {
            return Err(construction(
                class,
                Some(*keyword),
                format!("unknown keyword argument '{keyword}'"),
            ));
        };
        if slots[index].is_some() {
            return Err(construction(
                class,
                Some(*keyword),
                format!("argument '{keyword}' given more than once"),
            ));
        }
        slots[index] = Some(value.clone());
    }

    slots
        .into_iter()
        .zip(params)
        .map(|(slot, param)| {
            slot.ok_or_else(|| construction(class, Some(param.name), format!("missing argument '{}'", param.name)))
        })
        .collect()
}

fn construction(class: &ClassEntry, param: Option<&str>, reason: impl Into<String>) -> BindingError {
    BindingError::Construction {
        type_name: class.name().to_string(),
        param: param.map(str::to_string),
        expected: None,
        actual: None,
        reason: reason.into(),
    }
}

fn translate(error: BindingError) -> HostError {
    log::debug!("binding failure: {error}");
    HostError::from(error)
}
