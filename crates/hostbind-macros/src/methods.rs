//! Implementation of the `#[hostbind::methods]` attribute macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::{ImplItem, ImplItemFn, ItemImpl, Receiver, ReturnType, Type, parse_macro_input};

use crate::attrs::{MethodAttrs, is_helper};
use crate::signature::{
    ReturnShape, bindings, collect_params, extract_args, is_self_type, output_span, param_metas, replace_self,
};

pub fn methods_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = TokenStream2::from(attr);
    if !attr.is_empty() {
        return syn::Error::new_spanned(attr, "#[hostbind::methods] takes no arguments")
            .to_compile_error()
            .into();
    }

    let input = parse_macro_input!(item as ItemImpl);

    match methods_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// How a method reaches its receiver.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ReceiverAccess {
    Shared,
    Exclusive,
    /// `self` by value; the wrapper calls it on a copy
    Copied,
}

pub(crate) fn methods_inner(input: &ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[hostbind::methods] must be applied to an inherent impl block",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic impl blocks cannot be exposed",
        ));
    }

    let self_ty = input.self_ty.as_ref();
    let mut constructor: Option<TokenStream2> = None;
    let mut methods = Vec::new();

    for item in &input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let attrs = MethodAttrs::from_attrs(&method.attrs)?;
        if attrs.skip {
            continue;
        }

        match method.sig.receiver() {
            None => {
                let is_new = method.sig.ident == "new" && returns_self(method, self_ty)?;
                if !attrs.constructor && !is_new {
                    return Err(syn::Error::new_spanned(
                        &method.sig.ident,
                        "associated functions without a receiver must be the constructor or marked #[hostbind(skip)]",
                    ));
                }
                if constructor.is_some() {
                    return Err(syn::Error::new_spanned(
                        &method.sig.ident,
                        "a type can only expose one constructor",
                    ));
                }
                constructor = Some(generate_constructor(self_ty, method)?);
            }
            Some(receiver) => {
                if attrs.constructor {
                    return Err(syn::Error::new_spanned(
                        receiver,
                        "a constructor cannot take `self`",
                    ));
                }
                methods.push(generate_method(self_ty, method, receiver, attrs.name)?);
            }
        }
    }

    let constructor = match constructor {
        Some(tokens) => quote! { ::core::option::Option::Some(#tokens) },
        None => quote! { ::core::option::Option::None },
    };

    let mut cleaned = input.clone();
    for item in &mut cleaned.items {
        if let ImplItem::Fn(method) = item {
            method.attrs.retain(|attr| !is_helper(attr));
        }
    }

    Ok(quote! {
        #cleaned

        impl ::hostbind_core::HasMethods for #self_ty {
            fn method_table() -> ::hostbind_core::MethodTable {
                ::hostbind_core::MethodTable {
                    type_hash: <#self_ty as ::hostbind_core::NativeType>::type_hash(),
                    type_name: <#self_ty as ::hostbind_core::NativeType>::type_name(),
                    constructor: #constructor,
                    methods: ::std::vec![#(#methods),*],
                }
            }
        }
    })
}

/// The method's return type with `Self` spelled out.
fn resolved_output(method: &ImplItemFn, self_ty: &Type) -> syn::Result<ReturnType> {
    syn::parse2(replace_self(method.sig.output.to_token_stream(), self_ty))
}

fn returns_self(method: &ImplItemFn, self_ty: &Type) -> syn::Result<bool> {
    let shape = ReturnShape::of(&resolved_output(method, self_ty)?);
    Ok(shape.value_type().is_some_and(|ty| is_self_type(ty, self_ty)))
}

fn generate_constructor(self_ty: &Type, method: &ImplItemFn) -> syn::Result<TokenStream2> {
    if !returns_self(method, self_ty)? {
        return Err(syn::Error::new(
            output_span(&method.sig.output),
            "a constructor must return `Self` or `Result<Self, E>`",
        ));
    }

    let ident = &method.sig.ident;
    let params = collect_params(method.sig.inputs.iter(), Some(self_ty))?;
    let shape = ReturnShape::of(&resolved_output(method, self_ty)?);

    let extract = extract_args(&params);
    let args = bindings(&params);
    let body = shape.emit(quote! { <#self_ty>::#ident(#(#args),*) });
    let param_metas = param_metas(&params);

    Ok(quote! {{
        #[allow(unused_variables)]
        fn __call(
            ctx: &mut ::hostbind_core::CallContext<'_>,
        ) -> ::core::result::Result<(), ::hostbind_core::NativeError> {
            #extract
            #body
        }

        ::hostbind_core::ConstructorMeta {
            params: ::std::vec![#(#param_metas),*],
            native: ::hostbind_core::NativeFn::new(
                ::hostbind_core::TypeHash::from_constructor(<#self_ty as ::hostbind_core::NativeType>::type_hash()),
                __call,
            ),
        }
    }})
}

fn receiver_access(receiver: &Receiver) -> syn::Result<ReceiverAccess> {
    if receiver.colon_token.is_some() {
        return Err(syn::Error::new_spanned(
            receiver,
            "typed receivers are not supported; use `self`, `&self` or `&mut self`",
        ));
    }
    Ok(match (&receiver.reference, &receiver.mutability) {
        (Some(_), Some(_)) => ReceiverAccess::Exclusive,
        (Some(_), None) => ReceiverAccess::Shared,
        (None, _) => ReceiverAccess::Copied,
    })
}

fn generate_method(
    self_ty: &Type,
    method: &ImplItemFn,
    receiver: &Receiver,
    rename: Option<String>,
) -> syn::Result<TokenStream2> {
    let access = receiver_access(receiver)?;
    let output = resolved_output(method, self_ty)?;
    let shape = ReturnShape::of(&output);

    if let Some(Type::Reference(reference)) = shape.value_type() {
        return Err(syn::Error::new_spanned(
            reference,
            "exposed methods must return owned values",
        ));
    }

    let produces_self = shape.value_type().is_some_and(|ty| is_self_type(ty, self_ty));
    let mode = match access {
        ReceiverAccess::Exclusive => quote! { ::hostbind_core::ReceiverMode::Mutating },
        _ if produces_self => quote! { ::hostbind_core::ReceiverMode::ValueProducing },
        _ => quote! { ::hostbind_core::ReceiverMode::ReadOnly },
    };

    let ident = &method.sig.ident;
    let host_name = rename.unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());
    let params = collect_params(method.sig.inputs.iter(), Some(self_ty))?;

    // arguments are marshalled before the receiver is borrowed
    let extract = extract_args(&params);
    let args = bindings(&params);
    let this = match access {
        ReceiverAccess::Shared => quote! { ctx.this::<#self_ty>()? },
        ReceiverAccess::Exclusive => quote! { ctx.this_mut::<#self_ty>()? },
        ReceiverAccess::Copied => quote! { ::core::clone::Clone::clone(ctx.this::<#self_ty>()?) },
    };
    let body = shape.emit(quote! { <#self_ty>::#ident(#this, #(#args),*) });
    let param_metas = param_metas(&params);
    let returns = shape.kind_tokens();

    Ok(quote! {{
        #[allow(unused_variables)]
        fn __call(
            ctx: &mut ::hostbind_core::CallContext<'_>,
        ) -> ::core::result::Result<(), ::hostbind_core::NativeError> {
            #extract
            #body
        }

        ::hostbind_core::MethodMeta {
            name: #host_name,
            receiver: #mode,
            params: ::std::vec![#(#param_metas),*],
            returns: #returns,
            native: ::hostbind_core::NativeFn::new(
                ::hostbind_core::TypeHash::from_method(
                    <#self_ty as ::hostbind_core::NativeType>::type_hash(),
                    #host_name,
                ),
                __call,
            ),
        }
    }})
}
