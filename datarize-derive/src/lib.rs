//! Derive macros for the datarize fixture populator
//!
//! This crate provides the `Describe` derive, which writes the descriptor table the populator
//! uses to construct a type.

use proc_macro::TokenStream;

mod derive;

/// Derive macro for the `Describe` trait
///
/// Structs get constructors, static factory methods and setters over their fields. Enums whose
/// variants carry no data get an enumeration descriptor.
///
/// # Basic Usage
///
/// ```rust
/// use datarize::Describe;
///
/// #[derive(Describe)]
/// struct User {
///     id: u32,
///     name: String,
///     active: bool,
/// }
/// ```
///
/// Without attributes the struct gets a public constructor taking every field in declaration
/// order.
///
/// # Customization
///
/// ```rust
/// use datarize::Describe;
///
/// #[derive(Default, Describe)]
/// #[describe(default, setters)]
/// struct Profile {
///     nickname: Option<String>,
///     parent: Option<Box<Profile>>,
///     #[describe(skip)]
///     cache: Vec<u8>,
/// }
///
/// #[derive(Describe)]
/// #[describe(constructor = "private", builder = "of")]
/// struct Money {
///     amount: i64,
///     currency: String,
/// }
/// ```
///
/// # Supported Attributes
///
/// - `default`: public zero-argument constructor through `Default`
/// - `constructor` / `constructor = "public" | "crate" | "private"`: constructor over all fields
/// - `builder = "name"`: public static factory method over all fields, repeatable
/// - `setters`: public `set_<field>` method for every named field
/// - `skip` (on a field): leave the field out and fill it with `Default::default()`
///
/// `Option<T>` fields become optional parameters of type `T`, so an absent value is accepted.
/// Any other field is required and an absent value fails the call. `Box<T>` is unwrapped the same
/// way, which lets a type refer to itself.
///
/// # Enums
///
/// ```rust
/// use datarize::Describe;
///
/// #[derive(Clone, Describe)]
/// enum Status {
///     Active,
///     Inactive,
/// }
/// ```
#[proc_macro_derive(Describe, attributes(describe))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    derive::derive_describe_impl(input)
}
