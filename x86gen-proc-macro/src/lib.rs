//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! `vocabulary!` turns a listing of `Variant = "token"` pairs into a closed
//! enum that knows how to spell itself and how to recognize its own spelling.
//!
//! ```ignore
//! vocabulary! {
//! 	/// Registers named outright by the notation.
//! 	pub enum NamedRegister {
//! 		Al = "AL",
//! 		Ax = "AX",
//! 	}
//! }
//! ```
//!
//! expands to the enum itself (deriving the usual comparison traits) plus
//! `ALL`, `token()`, `from_token()` and a `Display` impl that writes the token.

use std::collections::HashMap;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
	braced,
	parse::{Parse, ParseStream},
	parse_macro_input, Attribute, Ident, LitStr, Token, Visibility,
};

#[derive(Debug, Clone)]
struct Entry {
	attrs: Vec<Attribute>,
	name: Ident,
	token: LitStr,
}

#[derive(Debug, Clone)]
struct Vocabulary {
	attrs: Vec<Attribute>,
	vis: Visibility,
	name: Ident,
	entries: Vec<Entry>,
}

struct Vocabularies(Vec<Vocabulary>);

impl Parse for Vocabularies {
	fn parse(input: ParseStream) -> syn::Result<Self> {
		let mut vocabularies = Vec::new();

		while !input.is_empty() {
			vocabularies.push(input.parse()?);
		}

		Ok(Self(vocabularies))
	}
}

impl Parse for Vocabulary {
	fn parse(input: ParseStream) -> syn::Result<Self> {
		let attrs = input.call(Attribute::parse_outer)?;
		let vis: Visibility = input.parse()?;
		input.parse::<Token![enum]>()?;
		let name: Ident = input.parse()?;

		let body;
		braced!(body in input);

		let mut entries: Vec<Entry> = Vec::new();
		let mut seen_tokens: HashMap<String, Ident> = HashMap::new();

		while !body.is_empty() {
			let entry: Entry = body.parse()?;
			let token = entry.token.value();

			if token.is_empty() {
				return Err(syn::Error::new(
					entry.token.span(),
					"Expected a non-empty token",
				));
			}

			if let Some(previous) = seen_tokens.get(&token) {
				return Err(syn::Error::new(
					entry.token.span(),
					format!("Token \"{}\" is already used by `{}`", token, previous),
				));
			}

			if entries.iter().any(|other| other.name == entry.name) {
				return Err(syn::Error::new(
					entry.name.span(),
					format!("Variant `{}` is declared more than once", entry.name),
				));
			}

			seen_tokens.insert(token, entry.name.clone());
			entries.push(entry);

			if body.is_empty() {
				break;
			}
			body.parse::<Token![,]>()?;
		}

		Ok(Self {
			attrs,
			vis,
			name,
			entries,
		})
	}
}

impl Parse for Entry {
	fn parse(input: ParseStream) -> syn::Result<Self> {
		let attrs = input.call(Attribute::parse_outer)?;
		let name: Ident = input.parse()?;
		input.parse::<Token![=]>()?;

		Ok(Self {
			attrs,
			name,
			token: input.parse()?,
		})
	}
}

fn expand_vocabulary(vocabulary: &Vocabulary) -> TokenStream {
	let Vocabulary {
		attrs,
		vis,
		name,
		entries,
	} = vocabulary;

	let variants = entries.iter().map(|entry| {
		let attrs = &entry.attrs;
		let name = &entry.name;
		quote! {
			#(#attrs)*
			#name,
		}
	});
	let names: Vec<_> = entries.iter().map(|entry| &entry.name).collect();
	let tokens: Vec<_> = entries.iter().map(|entry| &entry.token).collect();

	quote! {
		#(#attrs)*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
		#vis enum #name {
			#(#variants)*
		}

		#[allow(dead_code)]
		impl #name {
			/// Every variant, in declaration order.
			pub const ALL: &'static [Self] = &[#(Self::#names),*];

			/// The spelling of this variant in the source notation.
			pub const fn token(self) -> &'static str {
				match self {
					#(Self::#names => #tokens,)*
				}
			}

			/// Looks up the variant spelled exactly as `token`.
			pub fn from_token(token: &str) -> ::core::option::Option<Self> {
				match token {
					#(#tokens => ::core::option::Option::Some(Self::#names),)*
					_ => ::core::option::Option::None,
				}
			}
		}

		impl ::core::fmt::Display for #name {
			fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
				f.write_str(self.token())
			}
		}
	}
}

#[proc_macro]
pub fn vocabulary(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let vocabularies = parse_macro_input!(item as Vocabularies);
	let mut result = quote!();

	for vocabulary in &vocabularies.0 {
		let expanded = expand_vocabulary(vocabulary);
		result = quote! {
			#result
			#expanded
		};
	}

	result.into()
}
