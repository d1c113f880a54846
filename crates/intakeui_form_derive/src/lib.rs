use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derives `intakeui::form::DefaultValues` for a struct with named fields.
///
/// Every field becomes one entry of the default-value table, keyed by the
/// field's identifier. Field types must be `Clone + Into<FieldValue>`.
#[proc_macro_derive(DefaultValues)]
pub fn derive_default_values(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "DefaultValues derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let model_ident = input.ident;

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "DefaultValues derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                Span::call_site(),
                "DefaultValues derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let intakeui = intakeui_path();
    let mut field_names = Vec::new();
    let mut entries = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let field_name = unraw(&field_ident);
        entries.push(quote! {
            .with(#field_name, ::core::clone::Clone::clone(&self.#field_ident))
        });
        field_names.push(field_name);
    }

    quote! {
        impl #intakeui::form::DefaultValues for #model_ident {
            fn field_names() -> &'static [&'static str] {
                &[#(#field_names),*]
            }

            fn default_values(&self) -> #intakeui::form::FormDefaults {
                #intakeui::form::FormDefaults::new()
                    #(#entries)*
            }
        }
    }
    .into()
}

fn intakeui_path() -> TokenStream2 {
    match crate_name("intakeui") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::intakeui),
    }
}

fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}
