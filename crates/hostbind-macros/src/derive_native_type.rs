//! Implementation of the `#[derive(NativeType)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, parse_macro_input};

use crate::attrs::{FieldAttrs, TypeAttrs};

pub fn derive_native_type_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_native_type_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

pub(crate) fn derive_native_type_inner(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic types cannot be exposed; expose a concrete newtype instead",
        ));
    }

    let attrs = TypeAttrs::from_attrs(&input.attrs)?;
    let host_name = attrs.name.clone().unwrap_or_else(|| name.to_string());

    let fields = exposed_fields(input, &attrs)?;

    let native_type_impl = generate_native_type_impl(name, &host_name, &attrs);
    let conversions = generate_conversions(name, &host_name, &attrs);
    let class_meta = generate_class_meta(name, &attrs, &fields);

    Ok(quote! {
        #native_type_impl
        #conversions
        #class_meta
    })
}

/// A field visible to the host.
struct ExposedField<'a> {
    ident: &'a Ident,
    ty: &'a syn::Type,
    host_name: String,
    writable: bool,
}

fn exposed_fields<'a>(input: &'a DeriveInput, attrs: &TypeAttrs) -> syn::Result<Vec<ExposedField<'a>>> {
    let data = match &input.data {
        Data::Struct(data) => data,
        Data::Enum(data) => {
            return Err(syn::Error::new_spanned(
                data.enum_token,
                "NativeType can only be derived for structs",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "NativeType can only be derived for structs",
            ));
        }
    };

    let named = match &data.fields {
        Fields::Named(named) => named,
        Fields::Unit => return Ok(Vec::new()),
        Fields::Unnamed(unnamed) => {
            return Err(syn::Error::new_spanned(
                unnamed,
                "NativeType requires named fields",
            ));
        }
    };

    let mut fields = Vec::new();
    for field in &named.named {
        let field_attrs = FieldAttrs::from_attrs(&field.attrs)?;
        if field_attrs.skip {
            continue;
        }

        let readable = field_attrs.get || attrs.get_all;
        let writable = field_attrs.set || attrs.set_all;
        if writable && !readable {
            return Err(syn::Error::new_spanned(
                field,
                "write-only fields are not supported; add `get` alongside `set`",
            ));
        }
        if !readable {
            continue;
        }

        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let host_name = field_attrs
            .name
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());

        fields.push(ExposedField {
            ident,
            ty: &field.ty,
            host_name,
            writable,
        });
    }

    Ok(fields)
}

fn generate_native_type_impl(name: &Ident, host_name: &str, attrs: &TypeAttrs) -> TokenStream2 {
    let sharing = if attrs.shared {
        quote! { ::hostbind_core::SharingPolicy::Shared }
    } else {
        quote! { ::hostbind_core::SharingPolicy::Exclusive }
    };

    quote! {
        impl ::hostbind_core::NativeType for #name {
            fn type_hash() -> ::hostbind_core::TypeHash {
                ::hostbind_core::TypeHash::from_name(#host_name)
            }

            fn type_name() -> &'static str {
                #host_name
            }

            fn sharing() -> ::hostbind_core::SharingPolicy {
                #sharing
            }
        }
    }
}

/// `HostType` and `IntoHost` always; `FromHost` only for `clone` types,
/// since taking a parameter by value copies it out of the heap.
fn generate_conversions(name: &Ident, host_name: &str, attrs: &TypeAttrs) -> TokenStream2 {
    let from_host = attrs.clone.then(|| {
        quote! {
            impl ::hostbind_core::FromHost for #name {
                fn from_host(
                    value: &::hostbind_core::HostValue,
                    cx: &::hostbind_core::MarshalContext<'_>,
                ) -> ::core::result::Result<Self, ::hostbind_core::ConversionError> {
                    ::hostbind_core::convert::object_from_host::<#name>(value, cx)
                }
            }
        }
    });

    quote! {
        impl ::hostbind_core::HostType for #name {
            fn host_kind() -> ::hostbind_core::ValueKind {
                ::hostbind_core::ValueKind::Object(#host_name)
            }
        }

        impl ::hostbind_core::IntoHost for #name {
            fn into_host(
                self,
                heap: &mut ::hostbind_core::ObjectHeap,
            ) -> ::core::result::Result<::hostbind_core::HostValue, ::hostbind_core::ConversionError> {
                ::hostbind_core::convert::object_into_host(self, heap)
            }
        }

        #from_host
    }
}

fn generate_class_meta(name: &Ident, attrs: &TypeAttrs, fields: &[ExposedField<'_>]) -> TokenStream2 {
    let field_metas = fields.iter().map(|field| generate_field_meta(name, field));

    let copy = if attrs.clone {
        quote! {{
            fn __copy(
                heap: &mut ::hostbind_core::ObjectHeap,
                handle: ::hostbind_core::ObjectHandle,
            ) -> ::core::result::Result<::hostbind_core::ObjectHandle, ::hostbind_core::ConversionError> {
                let value = ::core::clone::Clone::clone(heap.get::<#name>(handle)?);
                heap.allocate(value)
            }
            ::core::option::Option::Some(__copy as ::hostbind_core::CopyFn)
        }}
    } else {
        quote! { ::core::option::Option::None }
    };

    quote! {
        impl ::hostbind_core::HasClassMeta for #name {
            fn class_meta() -> ::hostbind_core::ClassMeta {
                ::hostbind_core::ClassMeta {
                    name: <#name as ::hostbind_core::NativeType>::type_name(),
                    type_hash: <#name as ::hostbind_core::NativeType>::type_hash(),
                    sharing: <#name as ::hostbind_core::NativeType>::sharing(),
                    fields: ::std::vec![#(#field_metas),*],
                    copy: #copy,
                }
            }
        }
    }
}

fn generate_field_meta(name: &Ident, field: &ExposedField<'_>) -> TokenStream2 {
    let ident = field.ident;
    let ty = field.ty;
    let host_name = &field.host_name;

    let getter = quote! {{
        fn __get(
            ctx: &mut ::hostbind_core::CallContext<'_>,
        ) -> ::core::result::Result<(), ::hostbind_core::NativeError> {
            let value: #ty = ::core::clone::Clone::clone(&ctx.this::<#name>()?.#ident);
            ctx.set_return(value)
        }
        ::hostbind_core::NativeFn::new(
            ::hostbind_core::TypeHash::from_field(<#name as ::hostbind_core::NativeType>::type_hash(), #host_name),
            __get,
        )
    }};

    let (access, setter) = if field.writable {
        let setter = quote! {{
            fn __set(
                ctx: &mut ::hostbind_core::CallContext<'_>,
            ) -> ::core::result::Result<(), ::hostbind_core::NativeError> {
                let value: #ty = ctx.arg(0)?;
                ctx.this_mut::<#name>()?.#ident = value;
                ::core::result::Result::Ok(())
            }
            ::core::option::Option::Some(::hostbind_core::NativeFn::new(
                ::hostbind_core::TypeHash::from_field_setter(
                    <#name as ::hostbind_core::NativeType>::type_hash(),
                    #host_name,
                ),
                __set,
            ))
        }};
        (
            quote! { ::hostbind_core::FieldAccess::READ.union(::hostbind_core::FieldAccess::WRITE) },
            setter,
        )
    } else {
        (
            quote! { ::hostbind_core::FieldAccess::READ },
            quote! { ::core::option::Option::None },
        )
    };

    quote! {
        ::hostbind_core::FieldMeta {
            name: #host_name,
            kind: <#ty as ::hostbind_core::HostType>::host_kind(),
            access: #access,
            getter: #getter,
            setter: #setter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand(input: DeriveInput) -> syn::Result<String> {
        derive_native_type_inner(&input).map(|tokens| tokens.to_string())
    }

    #[test]
    fn point_with_all_fields() {
        let out = expand(parse_quote! {
            #[hostbind(clone, get_all, set_all)]
            pub struct Point {
                pub x: f64,
                pub y: f64,
            }
        })
        .unwrap();

        assert!(out.contains("impl :: hostbind_core :: NativeType for Point"));
        assert!(out.contains("impl :: hostbind_core :: FromHost for Point"));
        assert!(out.contains("from_field_setter"));
        assert!(out.contains("name : \"x\""));
        assert!(out.contains("name : \"y\""));
        assert!(out.contains("fn __copy"));
    }

    #[test]
    fn exclusive_without_clone_has_no_from_host() {
        let out = expand(parse_quote! {
            struct Counter {
                #[hostbind(get)]
                count: u32,
                hidden: u32,
            }
        })
        .unwrap();

        assert!(!out.contains("FromHost for Counter"));
        assert!(out.contains("SharingPolicy :: Exclusive"));
        assert!(out.contains("name : \"count\""));
        assert!(!out.contains("\"hidden\""));
        assert!(!out.contains("from_field_setter"));
        assert!(out.contains("copy : :: core :: option :: Option :: None"));
    }

    #[test]
    fn shared_and_renamed() {
        let out = expand(parse_quote! {
            #[hostbind(name = "Account", shared)]
            struct Ledger {
                #[hostbind(get, name = "balance")]
                cents: i64,
            }
        })
        .unwrap();

        assert!(out.contains("SharingPolicy :: Shared"));
        assert!(out.contains("from_name (\"Account\")"));
        assert!(out.contains("name : \"balance\""));
    }

    #[test]
    fn skip_overrides_get_all() {
        let out = expand(parse_quote! {
            #[hostbind(get_all)]
            struct Config {
                level: u8,
                #[hostbind(skip)]
                secret: String,
            }
        })
        .unwrap();

        assert!(out.contains("name : \"level\""));
        assert!(!out.contains("\"secret\""));
    }

    #[test]
    fn rejects_write_only_field() {
        let err = expand(parse_quote! {
            struct Sink {
                #[hostbind(set)]
                value: i64,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("write-only"));
    }

    #[test]
    fn rejects_enums_and_generics() {
        let err = expand(parse_quote! { enum Shape { Circle, Square } }).unwrap_err();
        assert!(err.to_string().contains("only be derived for structs"));

        let err = expand(parse_quote! { struct Wrapper<T> { inner: T } }).unwrap_err();
        assert!(err.to_string().contains("generic types"));
    }

    #[test]
    fn rejects_tuple_structs() {
        let err = expand(parse_quote! { struct Meters(f64); }).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }
}
