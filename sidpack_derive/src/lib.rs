//! Derive macros for sidpack.

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{ToTokens, quote};

/// Collects the identifiers of a unit-only enum together with a string rendering of each.
fn unit_variants(
	enum_: &syn::DataEnum,
	derive_name: &str,
	render: impl Fn(&syn::Ident) -> String,
) -> Vec<(syn::Ident, String)> {
	enum_
		.variants
		.iter()
		.map(|variant| match variant.fields {
			syn::Fields::Unit => (variant.ident.clone(), render(&variant.ident)),
			_ => panic!(
				"{derive_name} cannot be derived for enums containing non-unit variants; variant {} is not a unit.",
				variant.to_token_stream()
			),
		})
		.collect()
}

/// Implements `std::str::FromStr` for a unit-only enum, accepting the lowercase variant names. Matching is
/// case-insensitive.
#[proc_macro_derive(Parse)]
pub fn parse_macro_derive(input: TokenStream) -> TokenStream {
	let type_ = syn::parse::<syn::DeriveInput>(input).unwrap();

	match type_.data {
		syn::Data::Enum(enum_) => {
			let name = type_.ident;
			let name_string = format!("{name}").to_lowercase();
			let variants = unit_variants(&enum_, "Parse", |ident| format!("{ident}").to_lowercase());
			let variant_identifiers = variants.iter().map(|(identifier, _)| identifier);
			let variant_strings = variants.iter().map(|(_, string)| string);

			quote! {
				#[automatically_derived]
				#[allow(missing_docs)]
				impl ::std::str::FromStr for #name {
					type Err = ::std::string::String;

					fn from_str(value: &str) -> ::std::result::Result<Self, Self::Err> {
						Ok(match value.to_lowercase().as_str() {
							#( #variant_strings => Self::#variant_identifiers, )*
							_ => return Err(format!("`{}` is not a valid {}", value, #name_string)),
						})
					}
				}
			}
			.into()
		},
		_ => panic!("Parse cannot be derived for non-enum types."),
	}
}

/// Implements `crate::VariantName` for a unit-only enum. The name is the uppercased variant identifier, which is the
/// conventional spelling of 6502 mnemonics.
#[proc_macro_derive(VariantName)]
pub fn variant_name_derive(input: TokenStream) -> TokenStream {
	let type_ = syn::parse::<syn::DeriveInput>(input).unwrap();

	match type_.data {
		syn::Data::Enum(enum_) => {
			let name = type_.ident;
			let variants = unit_variants(&enum_, "VariantName", |ident| format!("{ident}").to_uppercase());
			let variant_identifiers = variants.iter().map(|(identifier, _)| identifier);
			let variant_strings = variants.iter().map(|(_, string)| string);

			quote! {
				#[automatically_derived]
				impl crate::VariantName for #name {
					fn variant_name(&self) -> &'static str {
						match self {
							#( Self::#variant_identifiers => #variant_strings, )*
						}
					}
				}
			}
			.into()
		},
		_ => panic!("VariantName cannot be derived for non-enum types."),
	}
}
