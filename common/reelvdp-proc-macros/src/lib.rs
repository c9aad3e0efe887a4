mod enums;

use proc_macro::TokenStream;

/// Implement `Display` and a `to_str()` method returning the variant name.
///
/// Only supports enums with fieldless variants.
#[proc_macro_derive(EnumDisplay)]
pub fn enum_display(input: TokenStream) -> TokenStream {
    enums::enum_display(input)
}

/// Implement `FromStr` by case-insensitive match on the variant name.
///
/// Only supports enums with fieldless variants.
#[proc_macro_derive(EnumFromStr)]
pub fn enum_from_str(input: TokenStream) -> TokenStream {
    enums::enum_from_str(input)
}

/// Add an `ALL` constant listing every variant in declaration order.
///
/// Only supports enums with fieldless variants.
#[proc_macro_derive(EnumAll)]
pub fn enum_all(input: TokenStream) -> TokenStream {
    enums::enum_all(input)
}

/// Implement `clap::ValueEnum` using the variant names as they are displayed.
///
/// Requires `EnumDisplay` and `EnumAll` on the same enum.
#[proc_macro_derive(CustomValueEnum)]
pub fn custom_value_enum(input: TokenStream) -> TokenStream {
    enums::custom_value_enum(input)
}
