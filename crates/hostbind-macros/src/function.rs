//! Implementation of the `#[hostbind::function]` attribute macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{FnArg, ItemFn, parse_macro_input};

use crate::attrs::FunctionAttrs;
use crate::signature::{ReturnShape, bindings, collect_params, extract_args, param_metas};

pub fn function_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut attrs = FunctionAttrs::default();
    let parser = syn::meta::parser(|meta| attrs.parse_meta(meta));
    parse_macro_input!(attr with parser);

    let input = parse_macro_input!(item as ItemFn);

    match function_inner(&attrs, &input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

pub(crate) fn function_inner(attrs: &FunctionAttrs, input: &ItemFn) -> syn::Result<TokenStream2> {
    let sig = &input.sig;

    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(asyncness, "async functions cannot be exposed"));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "generic functions cannot be exposed; wrap a concrete instantiation instead",
        ));
    }
    if let Some(receiver) = sig.inputs.iter().find(|arg| matches!(arg, FnArg::Receiver(_))) {
        return Err(syn::Error::new_spanned(
            receiver,
            "methods must be exposed through #[hostbind::methods] on their impl block",
        ));
    }

    let fn_name = &sig.ident;
    let vis = &input.vis;
    let host_name = attrs
        .name
        .clone()
        .unwrap_or_else(|| fn_name.to_string().trim_start_matches("r#").to_string());
    let descriptor = format_ident!("__hostbind_fn_{}", fn_name);

    let params = collect_params(sig.inputs.iter(), None)?;
    let shape = ReturnShape::of(&sig.output);

    let extract = extract_args(&params);
    let args = bindings(&params);
    let body = shape.emit(quote! { #fn_name(#(#args),*) });
    let param_metas = param_metas(&params);
    let returns = shape.kind_tokens();

    Ok(quote! {
        #input

        #[doc(hidden)]
        #vis fn #descriptor() -> ::hostbind_core::FunctionMeta {
            #[allow(unused_variables)]
            fn __call(
                ctx: &mut ::hostbind_core::CallContext<'_>,
            ) -> ::core::result::Result<(), ::hostbind_core::NativeError> {
                #extract
                #body
            }

            ::hostbind_core::FunctionMeta {
                name: #host_name,
                params: ::std::vec![#(#param_metas),*],
                returns: #returns,
                native: ::hostbind_core::NativeFn::new(
                    ::hostbind_core::TypeHash::from_function(#host_name),
                    __call,
                ),
            }
        }
    })
}
