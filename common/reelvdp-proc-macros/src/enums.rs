use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

// Enum name and its variant names; panics if the input is not an enum of unit variants
fn unit_variants(input: TokenStream, macro_name: &str) -> (Ident, Vec<Ident>) {
    let ast: DeriveInput = syn::parse(input).expect("unable to parse input");
    let name = ast.ident;

    let Data::Enum(data) = ast.data else {
        panic!("{macro_name} can only be applied to enums; {name} is not an enum");
    };

    let variants = data
        .variants
        .into_iter()
        .map(|variant| {
            assert!(
                matches!(variant.fields, Fields::Unit),
                "{macro_name} only supports fieldless variants; {name}::{} has fields",
                variant.ident
            );
            variant.ident
        })
        .collect();

    (name, variants)
}

pub fn enum_display(input: TokenStream) -> TokenStream {
    let (name, variants) = unit_variants(input, "EnumDisplay");
    let variant_strs = variants.iter().map(ToString::to_string);

    let expanded = quote! {
        impl #name {
            #[must_use]
            pub fn to_str(&self) -> &'static str {
                match self {
                    #(Self::#variants => #variant_strs,)*
                }
            }
        }

        impl ::std::fmt::Display for #name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.to_str())
            }
        }
    };

    expanded.into()
}

pub fn enum_from_str(input: TokenStream) -> TokenStream {
    let (name, variants) = unit_variants(input, "EnumFromStr");
    let lowercase_strs = variants.iter().map(|variant| variant.to_string().to_ascii_lowercase());

    let err_fmt_string = format!("invalid {name} string: '{{}}'");
    let expanded = quote! {
        impl ::std::str::FromStr for #name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    #(#lowercase_strs => ::std::result::Result::Ok(Self::#variants),)*
                    _ => ::std::result::Result::Err(::std::format!(#err_fmt_string, s)),
                }
            }
        }
    };

    expanded.into()
}

pub fn enum_all(input: TokenStream) -> TokenStream {
    let (name, variants) = unit_variants(input, "EnumAll");
    let num_variants = variants.len();

    let expanded = quote! {
        impl #name {
            pub const ALL: [Self; #num_variants] = [#(Self::#variants,)*];
        }
    };

    expanded.into()
}

pub fn custom_value_enum(input: TokenStream) -> TokenStream {
    let ast: DeriveInput = syn::parse(input).expect("unable to parse input");
    let name = &ast.ident;

    let expanded = quote! {
        impl ::clap::ValueEnum for #name {
            fn value_variants<'a>() -> &'a [Self] {
                &Self::ALL
            }

            fn to_possible_value(&self) -> ::std::option::Option<::clap::builder::PossibleValue> {
                ::std::option::Option::Some(::clap::builder::PossibleValue::new(self.to_str()))
            }
        }
    };

    expanded.into()
}
