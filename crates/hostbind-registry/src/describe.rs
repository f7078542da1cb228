//! Signature summaries of a registry's bindings.

use std::fmt::{self, Write as _};

use hostbind_core::meta::write_params;
use hostbind_core::{BindingKind, FieldAccess};

use crate::Registry;

/// One host-visible binding and its rendered signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDescriptor {
    pub kind: BindingKind,
    /// `add`, `Point`, `Point.x`, `Point.scaled`
    pub qualified_name: String,
    /// `add(a: int, b: int) -> int`, `Point.x: float`
    pub signature: String,
}

impl fmt::Display for BindingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.signature, kind_label(self.kind))
    }
}

fn kind_label(kind: BindingKind) -> &'static str {
    match kind {
        BindingKind::Function => "function",
        BindingKind::Constructor => "constructor",
        BindingKind::FieldRead => "get",
        BindingKind::FieldWrite => "set",
        BindingKind::MethodReadOnly => "read-only",
        BindingKind::MethodMutating => "mutating",
        BindingKind::MethodValueProducing => "value-producing",
    }
}

impl Registry {
    /// Every binding in registration order.
    ///
    /// A type contributes its constructor, then each field (read, then write
    /// when writable), then each method.
    pub fn bindings(&self) -> Vec<BindingDescriptor> {
        let mut out = Vec::new();

        for function in self.functions() {
            let mut signature = function.name.to_string();
            let _ = write_params(&mut signature, &function.params);
            let _ = write!(signature, " -> {}", function.returns);
            out.push(BindingDescriptor {
                kind: BindingKind::Function,
                qualified_name: function.name.to_string(),
                signature,
            });
        }

        for class in self.classes() {
            let type_name = class.name();

            if let Some(constructor) = class.constructor() {
                let mut signature = type_name.to_string();
                let _ = write_params(&mut signature, &constructor.params);
                out.push(BindingDescriptor {
                    kind: BindingKind::Constructor,
                    qualified_name: type_name.to_string(),
                    signature,
                });
            }

            for field in class.fields() {
                let qualified_name = format!("{type_name}.{}", field.name);
                let signature = format!("{qualified_name}: {}", field.kind);
                for (flag, kind) in [
                    (FieldAccess::READ, BindingKind::FieldRead),
                    (FieldAccess::WRITE, BindingKind::FieldWrite),
                ] {
                    if field.access.contains(flag) {
                        out.push(BindingDescriptor {
                            kind,
                            qualified_name: qualified_name.clone(),
                            signature: signature.clone(),
                        });
                    }
                }
            }

            for method in class.methods() {
                let qualified_name = format!("{type_name}.{}", method.name);
                let mut signature = qualified_name.clone();
                let _ = write_params(&mut signature, &method.params);
                let _ = write!(signature, " -> {}", method.returns);
                out.push(BindingDescriptor {
                    kind: BindingKind::from(method.receiver),
                    qualified_name,
                    signature,
                });
            }
        }

        out
    }

    /// Render the module's available bindings, one per line.
    pub fn describe(&self) -> String {
        let mut out = format!("module {}\n", self.name());
        for binding in self.bindings() {
            let _ = writeln!(out, "  {binding}");
        }
        out
    }
}
