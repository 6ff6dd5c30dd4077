//! Derive macro for `fallible_outcome::FailureKind`.

use proc_macro::TokenStream;
use quote::quote;
use std::collections::BTreeSet;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Variant};

/// Derive `fallible_outcome::FailureKind` for a closed failure enum.
///
/// Container attribute: `#[failure(domain = "name")]` (defaults to the enum name).
/// Variant attributes: `#[failure(name = "kind")]` overrides the kind name,
/// `#[failure(cancellation)]` marks the variant as the family's cancellation kind.
#[proc_macro_derive(FailureKind, attributes(failure))]
pub fn derive_failure_kind(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand_failure_kind(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_failure_kind(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let Data::Enum(enum_data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "FailureKind can only be derived for enums",
        ));
    };
    if enum_data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            input,
            "FailureKind requires at least one variant",
        ));
    }

    let name = &input.ident;
    let domain = parse_domain(&input.attrs)?.unwrap_or_else(|| name.to_string());

    let mut kinds = Vec::new();
    let mut seen = BTreeSet::new();
    let mut kind_arms = Vec::new();
    let mut cancellation_patterns = Vec::new();
    for variant in &enum_data.variants {
        let options = parse_variant_options(variant)?;
        let kind = options
            .name
            .unwrap_or_else(|| variant.ident.to_string());
        if !seen.insert(kind.clone()) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("duplicate failure kind name `{kind}`"),
            ));
        }
        let pattern = variant_pattern(&variant.ident, &variant.fields);
        let kind_lit = LitStr::new(&kind, proc_macro2::Span::call_site());
        kind_arms.push(quote! { #pattern => #kind_lit, });
        if options.cancellation {
            cancellation_patterns.push(pattern);
        }
        kinds.push(kind_lit);
    }

    let cancellation = if cancellation_patterns.is_empty() {
        None
    } else {
        Some(quote! {
            fn is_cancellation(&self) -> bool {
                matches!(self, #(#cancellation_patterns)|*)
            }
        })
    };

    let domain_lit = LitStr::new(&domain, proc_macro2::Span::call_site());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::fallible_outcome::FailureKind for #name #ty_generics #where_clause {
            const KINDS: &'static [&'static str] = &[#(#kinds),*];

            fn domain() -> &'static str {
                #domain_lit
            }

            fn kind(&self) -> &'static str {
                match self {
                    #(#kind_arms)*
                }
            }

            #cancellation
        }
    })
}

fn variant_pattern(ident: &Ident, fields: &Fields) -> proc_macro2::TokenStream {
    match fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

fn parse_domain(attrs: &[Attribute]) -> Result<Option<String>, syn::Error> {
    let mut domain: Option<String> = None;
    for attr in attrs {
        if !attr.path().is_ident("failure") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("domain") {
                let value: LitStr = meta.value()?.parse()?;
                if domain.is_some() {
                    return Err(meta.error("duplicate failure(domain = ...)"));
                }
                if value.value().trim().is_empty() {
                    return Err(meta.error("failure domain must be non-empty"));
                }
                domain = Some(value.value());
                return Ok(());
            }
            Err(meta.error("unsupported failure attribute on enum"))
        })?;
    }
    Ok(domain)
}

#[derive(Debug, Default)]
struct VariantOptions {
    name: Option<String>,
    cancellation: bool,
}

fn parse_variant_options(variant: &Variant) -> Result<VariantOptions, syn::Error> {
    let mut options = VariantOptions::default();
    for attr in &variant.attrs {
        if !attr.path().is_ident("failure") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if options.name.is_some() {
                    return Err(meta.error("duplicate failure(name = ...)"));
                }
                if value.value().trim().is_empty() {
                    return Err(meta.error("failure kind name must be non-empty"));
                }
                options.name = Some(value.value());
                return Ok(());
            }
            if meta.path.is_ident("cancellation") {
                options.cancellation = true;
                return Ok(());
            }
            Err(meta.error("unsupported failure attribute on variant"))
        })?;
    }
    Ok(options)
}
