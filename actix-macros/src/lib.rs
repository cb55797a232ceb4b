extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::Attribute;

fn find_status_code(attrs: &[Attribute]) -> Option<proc_macro2::TokenStream> {
    attrs
        .iter()
        .find_map(|attr| -> Option<proc_macro2::TokenStream> {
            if !attr.path().is_ident("status_code") {
                return None;
            }

            let meta = attr.meta.require_name_value().ok()?;

            let code = meta.value.to_token_stream().to_string();
            let trimmed_code = code.trim_matches('"');

            if let Ok(numeric_code) = trimmed_code.parse::<u16>() {
                Some(quote! {
                    actix_web::http::StatusCode::from_u16(#numeric_code)
                        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
                })
            } else {
                let string_code: proc_macro2::TokenStream = trimmed_code.parse().ok()?;

                Some(quote! { #string_code })
            }
        })
}

fn variant_pattern(name: &syn::Ident, variant: &syn::Variant) -> proc_macro2::TokenStream {
    let variant_name = &variant.ident;

    match &variant.fields {
        syn::Fields::Unit => quote! { #name::#variant_name },
        syn::Fields::Unnamed(_) => quote! { #name::#variant_name(..) },
        syn::Fields::Named(_) => quote! { #name::#variant_name { .. } },
    }
}

fn impl_err_response(ast: &syn::DeriveInput) -> TokenStream {
    let name = &ast.ident;

    let variants = if let syn::Data::Enum(data) = &ast.data {
        &data.variants
    } else {
        return syn::Error::new_spanned(name, "Only enums are supported")
            .to_compile_error()
            .into();
    };

    let mut status_code_arms: Vec<proc_macro2::TokenStream> = variants
        .iter()
        .filter_map(|v| -> Option<proc_macro2::TokenStream> {
            let status_code = find_status_code(&v.attrs)?;
            let pattern = variant_pattern(name, v);

            Some(quote! { #pattern => #status_code, })
        })
        .collect();

    if status_code_arms.len() < variants.len() {
        let status_code = find_status_code(&ast.attrs)
            .unwrap_or_else(|| quote! { actix_web::http::StatusCode::INTERNAL_SERVER_ERROR });

        status_code_arms.push(quote! { _ => #status_code });
    }

    TokenStream::from(quote! {
        impl crate::routes::schema::PartialErrResponse for #name {
            fn status_code(&self) -> actix_web::http::StatusCode {
                match self {
                    #(#status_code_arms)*
                }
            }
        }
    })
}

fn impl_ok_response(ast: &syn::DeriveInput) -> TokenStream {
    let name = &ast.ident;

    TokenStream::from(quote! {
        impl crate::routes::schema::PartialOkResponse for #name {}
    })
}

/// Status code of every error variant, taken from `#[status_code = ...]`.
///
/// The attribute on the enum itself is used for variants without one.
#[proc_macro_derive(ErrResponse, attributes(status_code))]
pub fn err_response_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_err_response(&ast)
}

#[proc_macro_derive(OkResponse)]
pub fn ok_response_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_ok_response(&ast)
}
