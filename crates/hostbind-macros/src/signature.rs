//! Signature analysis and wrapper codegen shared by the attribute macros.

use proc_macro2::{Group, Ident, Span, TokenStream as TokenStream2, TokenTree};
use quote::{ToTokens, format_ident, quote};
use syn::{FnArg, GenericArgument, Pat, PathArguments, ReturnType, Type};

/// A marshalled parameter of a wrapped callable.
pub struct Param {
    /// Local binding in the generated wrapper
    pub binding: Ident,
    /// Name the host sees
    pub name: String,
    pub ty: Type,
}

/// Collect the non-receiver parameters of a signature.
///
/// `self_ty` replaces `Self` in parameter types, since the generated wrapper
/// is a free function where `Self` is not in scope.
pub fn collect_params<'a>(inputs: impl Iterator<Item = &'a FnArg>, self_ty: Option<&Type>) -> syn::Result<Vec<Param>> {
    let mut params = Vec::new();

    for arg in inputs {
        let FnArg::Typed(pat_type) = arg else {
            continue;
        };

        let name = match pat_type.pat.as_ref() {
            Pat::Ident(ident) if ident.by_ref.is_none() => ident.ident.to_string(),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "exposed parameters must be plain identifiers",
                ));
            }
        };

        let ty = pat_type.ty.as_ref();
        if let Type::Reference(_) | Type::ImplTrait(_) = ty {
            return Err(syn::Error::new_spanned(
                ty,
                "exposed parameters must be owned values; borrowed and `impl Trait` parameters cannot be marshalled",
            ));
        }

        let ty = match self_ty {
            Some(self_ty) => syn::parse2(replace_self(ty.to_token_stream(), self_ty))?,
            None => ty.clone(),
        };

        params.push(Param {
            binding: format_ident!("__arg{}", params.len()),
            name: name.trim_start_matches("r#").to_string(),
            ty,
        });
    }

    Ok(params)
}

/// How a callable's return value reaches the host.
pub enum ReturnShape {
    Unit,
    Value(Type),
    /// `Result<T, E>`: `Ok` is marshalled, `Err` becomes a native failure
    Result(Type),
}

impl ReturnShape {
    pub fn of(output: &ReturnType) -> Self {
        let ReturnType::Type(_, ty) = output else {
            return ReturnShape::Unit;
        };
        match result_ok_type(ty) {
            Some(ok) => ReturnShape::Result(ok.clone()),
            None => ReturnShape::Value((**ty).clone()),
        }
    }

    /// The native type handed to the host, if any.
    pub fn value_type(&self) -> Option<&Type> {
        match self {
            ReturnShape::Unit => None,
            ReturnShape::Value(ty) | ReturnShape::Result(ty) => Some(ty),
        }
    }

    /// Tokens evaluating to the `ValueKind` of the returned value.
    pub fn kind_tokens(&self) -> TokenStream2 {
        match self.value_type() {
            Some(ty) => quote! { <#ty as ::hostbind_core::HostType>::host_kind() },
            None => quote! { ::hostbind_core::ValueKind::None },
        }
    }

    /// Tokens that evaluate `call` inside a wrapper and store its result.
    pub fn emit(&self, call: TokenStream2) -> TokenStream2 {
        match self {
            ReturnShape::Unit => quote! {
                #call;
                ::core::result::Result::Ok(())
            },
            ReturnShape::Value(_) => quote! {
                let __ret = #call;
                ctx.set_return(__ret)
            },
            ReturnShape::Result(_) => quote! {
                match #call {
                    ::core::result::Result::Ok(__ret) => ctx.set_return(__ret),
                    ::core::result::Result::Err(__err) => ::core::result::Result::Err(
                        ::hostbind_core::NativeError::failed(::std::string::ToString::to_string(&__err)),
                    ),
                }
            },
        }
    }
}

/// `T` when `ty` is spelled `Result<T, ..>` (or a path ending in `Result`).
fn result_ok_type(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let last = path.path.segments.last()?;
    if last.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

/// `let __argN: T = ctx.arg(N)?;` for every parameter.
pub fn extract_args(params: &[Param]) -> TokenStream2 {
    let lets = params.iter().enumerate().map(|(index, param)| {
        let binding = &param.binding;
        let ty = &param.ty;
        quote! { let #binding: #ty = ctx.arg(#index)?; }
    });
    quote! { #(#lets)* }
}

/// `ParamMeta` constructors for every parameter.
pub fn param_metas(params: &[Param]) -> Vec<TokenStream2> {
    params
        .iter()
        .map(|param| {
            let name = &param.name;
            let ty = &param.ty;
            quote! {
                ::hostbind_core::ParamMeta::new(#name, <#ty as ::hostbind_core::HostType>::host_kind())
            }
        })
        .collect()
}

pub fn bindings(params: &[Param]) -> impl Iterator<Item = &Ident> {
    params.iter().map(|param| &param.binding)
}

/// Replace every `Self` token with `with`.
pub fn replace_self(tokens: TokenStream2, with: &Type) -> TokenStream2 {
    tokens
        .into_iter()
        .flat_map(|tree| -> TokenStream2 {
            match tree {
                TokenTree::Ident(ident) if ident == "Self" => with.to_token_stream(),
                TokenTree::Group(group) => {
                    let mut replaced = Group::new(group.delimiter(), replace_self(group.stream(), with));
                    replaced.set_span(group.span());
                    TokenTree::Group(replaced).into()
                }
                other => other.into(),
            }
        })
        .collect()
}

/// Whether `ty` names the implementing type (`Self` or its written name).
pub fn is_self_type(ty: &Type, self_ty: &Type) -> bool {
    let written = ty.to_token_stream().to_string();
    written == "Self" || written == self_ty.to_token_stream().to_string()
}

/// Span to blame for errors about a whole signature.
pub fn output_span(output: &ReturnType) -> Span {
    match output {
        ReturnType::Default => Span::call_site(),
        ReturnType::Type(_, ty) => syn::spanned::Spanned::span(ty.as_ref()),
    }
}
