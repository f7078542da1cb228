//! Attribute parsing for hostbind macros.

use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr};

/// Whether an attribute is one of ours (`#[hostbind(...)]`).
pub fn is_helper(attr: &Attribute) -> bool {
    attr.path().is_ident("hostbind")
}

fn unknown(meta: &ParseNestedMeta<'_>, what: &str) -> syn::Error {
    meta.error(format!(
        "unknown hostbind {what} attribute: {}",
        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
    ))
}

/// Container attributes of `#[derive(NativeType)]`.
#[derive(Debug, Default)]
pub struct TypeAttrs {
    /// Host name override
    pub name: Option<String>,
    /// Reference-counted sharing
    pub shared: bool,
    /// Copy-on-share and by-value parameters
    pub clone: bool,
    /// Expose every field for reading
    pub get_all: bool,
    /// Expose every field for writing
    pub set_all: bool,
}

impl TypeAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs.iter().filter(|a| is_helper(a)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else if meta.path.is_ident("shared") {
                    result.shared = true;
                } else if meta.path.is_ident("clone") {
                    result.clone = true;
                } else if meta.path.is_ident("get_all") {
                    result.get_all = true;
                } else if meta.path.is_ident("set_all") {
                    result.set_all = true;
                } else {
                    return Err(unknown(&meta, "type"));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

/// Field attributes of `#[derive(NativeType)]`.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    pub get: bool,
    pub set: bool,
    pub skip: bool,
    pub name: Option<String>,
}

impl FieldAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs.iter().filter(|a| is_helper(a)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("get") {
                    result.get = true;
                } else if meta.path.is_ident("set") {
                    result.set = true;
                } else if meta.path.is_ident("skip") {
                    result.skip = true;
                } else if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else {
                    return Err(unknown(&meta, "field"));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

/// Arguments of `#[hostbind::function(...)]`.
#[derive(Debug, Default)]
pub struct FunctionAttrs {
    pub name: Option<String>,
}

impl FunctionAttrs {
    pub fn parse_meta(&mut self, meta: ParseNestedMeta<'_>) -> syn::Result<()> {
        if meta.path.is_ident("name") {
            let value: LitStr = meta.value()?.parse()?;
            self.name = Some(value.value());
            Ok(())
        } else {
            Err(unknown(&meta, "function"))
        }
    }
}

/// Per-method attributes inside `#[hostbind::methods]`.
#[derive(Debug, Default)]
pub struct MethodAttrs {
    pub name: Option<String>,
    pub constructor: bool,
    pub skip: bool,
}

impl MethodAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs.iter().filter(|a| is_helper(a)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else if meta.path.is_ident("constructor") {
                    result.constructor = true;
                } else if meta.path.is_ident("skip") {
                    result.skip = true;
                } else {
                    return Err(unknown(&meta, "method"));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn type_attrs() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[hostbind(name = "Vec2", clone)]),
            parse_quote!(#[hostbind(get_all, set_all)]),
            parse_quote!(#[derive(Clone)]),
        ];
        let parsed = TypeAttrs::from_attrs(&attrs).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("Vec2"));
        assert!(parsed.clone && parsed.get_all && parsed.set_all);
        assert!(!parsed.shared);
    }

    #[test]
    fn unknown_type_attr_is_rejected() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[hostbind(frozen)])];
        let err = TypeAttrs::from_attrs(&attrs).unwrap_err();
        assert!(err.to_string().contains("unknown hostbind type attribute: frozen"));
    }

    #[test]
    fn field_attrs() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[hostbind(get, set, name = "px")])];
        let parsed = FieldAttrs::from_attrs(&attrs).unwrap();
        assert!(parsed.get && parsed.set && !parsed.skip);
        assert_eq!(parsed.name.as_deref(), Some("px"));
    }

    #[test]
    fn method_attrs() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[hostbind(constructor)])];
        assert!(MethodAttrs::from_attrs(&attrs).unwrap().constructor);
        let attrs: Vec<Attribute> = vec![parse_quote!(#[hostbind(static)])];
        assert!(MethodAttrs::from_attrs(&attrs).is_err());
    }
}
