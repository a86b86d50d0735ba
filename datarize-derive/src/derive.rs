//! Derive macro implementation for the `Describe` trait
//!
//! Structs get a descriptor table with constructors, static factory methods and setters chosen
//! through `#[describe(...)]` attributes. Enums with unit variants get an enumeration descriptor.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DataEnum, DeriveInput, Error, Fields, GenericArgument, GenericParam, Ident,
    LitStr, Member, PathArguments, Result, Type, parse_macro_input, parse_quote,
};

/// Main entry point for the Describe derive macro
pub fn derive_describe_impl(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_describe_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Generate the Describe implementation for the given input
fn generate_describe_impl(input: &DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    let mut bounded_generics = input.generics.clone();
    add_trait_bounds(&mut bounded_generics);
    let (impl_generics, ty_generics, where_clause) = bounded_generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data_struct) => {
            let options = ContainerOptions::from_attributes(&input.attrs)?;
            generate_struct_descriptor(&options, &data_struct.fields)?
        }
        Data::Enum(data_enum) => {
            if let Some(attr) = input.attrs.iter().find(|attr| attr.path().is_ident("describe")) {
                return Err(Error::new_spanned(
                    attr,
                    "describe attributes are not supported on enums",
                ));
            }
            generate_enum_descriptor(data_enum)?
        }
        Data::Union(_) => {
            return Err(Error::new_spanned(
                input,
                "Describe derive is not supported for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics datarize::Describe for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn describe() -> datarize::TypeDescriptor {
                #body
            }
        }
    })
}

/// Add the Describe bound to every type parameter
fn add_trait_bounds(generics: &mut syn::Generics) {
    for param in &mut generics.params {
        if let GenericParam::Type(ref mut type_param) = *param {
            type_param.bounds.push(parse_quote!(datarize::Describe));
        }
    }
}

/// Visibility given to a generated member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberVisibility {
    Public,
    Crate,
    Private,
}

impl MemberVisibility {
    fn parse(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "public" | "pub" => Ok(Self::Public),
            "crate" => Ok(Self::Crate),
            "private" => Ok(Self::Private),
            other => Err(Error::new_spanned(
                lit,
                format!(
                    "unknown visibility `{}`, expected \"public\", \"crate\" or \"private\"",
                    other
                ),
            )),
        }
    }

    fn tokens(self) -> TokenStream {
        match self {
            Self::Public => quote! { datarize::Visibility::Public },
            Self::Crate => quote! { datarize::Visibility::Crate },
            Self::Private => quote! { datarize::Visibility::Private },
        }
    }
}

/// Struct-level `#[describe(...)]` options
#[derive(Debug, Default)]
struct ContainerOptions {
    default: bool,
    constructor: Option<MemberVisibility>,
    builders: Vec<LitStr>,
    setters: bool,
}

impl ContainerOptions {
    fn from_attributes(attrs: &[Attribute]) -> Result<Self> {
        let mut options = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("describe")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    options.default = true;
                    Ok(())
                } else if meta.path.is_ident("constructor") {
                    let visibility = if meta.input.peek(syn::Token![=]) {
                        MemberVisibility::parse(&meta.value()?.parse::<LitStr>()?)?
                    } else {
                        MemberVisibility::Public
                    };
                    options.constructor = Some(visibility);
                    Ok(())
                } else if meta.path.is_ident("builder") {
                    options.builders.push(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("setters") {
                    options.setters = true;
                    Ok(())
                } else {
                    Err(meta.error(
                        "unsupported describe attribute, expected `default`, `constructor`, \
                         `builder` or `setters`",
                    ))
                }
            })?;
        }

        // a bare derive gets a public all-fields constructor
        if !options.default && options.constructor.is_none() && options.builders.is_empty() {
            options.constructor = Some(MemberVisibility::Public);
        }
        Ok(options)
    }
}

/// How one field takes part in the descriptor
struct FieldInfo {
    member: Member,
    ident: Option<Ident>,
    param_ty: Type,
    optional: bool,
    boxed: bool,
    skip: bool,
}

impl FieldInfo {
    fn analyze(fields: &Fields) -> Result<Vec<Self>> {
        fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let skip = has_skip_attribute(&field.attrs)?;
                let (optional, inner) = match unwrap_single_generic(&field.ty, "Option") {
                    Some(inner) => (true, inner),
                    None => (false, &field.ty),
                };
                let (boxed, param_ty) = match unwrap_single_generic(inner, "Box") {
                    Some(inner) => (true, inner.clone()),
                    None => (false, inner.clone()),
                };
                let member = match &field.ident {
                    Some(ident) => Member::Named(ident.clone()),
                    None => Member::Unnamed(index.into()),
                };
                Ok(Self {
                    member,
                    ident: field.ident.clone(),
                    param_ty,
                    optional,
                    boxed,
                    skip,
                })
            })
            .collect()
    }

    /// Expression pulling this field's value out of `args`
    fn read_argument(&self) -> TokenStream {
        let param_ty = &self.param_ty;
        match (self.optional, self.boxed) {
            (true, true) => {
                quote! { args.optional::<#param_ty>()?.map(::std::boxed::Box::new) }
            }
            (true, false) => quote! { args.optional::<#param_ty>()? },
            (false, true) => {
                quote! { ::std::boxed::Box::new(args.required::<#param_ty>()?) }
            }
            (false, false) => quote! { args.required::<#param_ty>()? },
        }
    }
}

fn has_skip_attribute(attrs: &[Attribute]) -> Result<bool> {
    let mut skip = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("describe")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported describe field attribute, expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

/// The `T` in `wrapper<T>` when the last path segment of `ty` is `wrapper`
fn unwrap_single_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    if arguments.args.len() != 1 {
        return None;
    }
    match arguments.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// Generate the descriptor expression for a struct
fn generate_struct_descriptor(options: &ContainerOptions, fields: &Fields) -> Result<TokenStream> {
    let infos = FieldInfo::analyze(fields)?;
    let params = parameter_list(&infos);
    let construct = construct_expression(fields, &infos);

    let default_constructor = options.default.then(|| {
        quote! {
            .constructor(
                datarize::Visibility::Public,
                ::std::vec::Vec::new(),
                |args| Ok(<Self as ::core::default::Default>::default()),
            )
        }
    });

    let all_fields_constructor = options.constructor.map(|visibility| {
        let visibility = visibility.tokens();
        quote! {
            .constructor(#visibility, #params, |args| Ok(#construct))
        }
    });

    let builders = options.builders.iter().map(|name| {
        quote! {
            .static_method::<Self, _>(
                #name,
                datarize::Visibility::Public,
                #params,
                |args| Ok(#construct),
            )
        }
    });

    let setters = if options.setters {
        generate_setters(fields, &infos)?
    } else {
        Vec::new()
    };

    Ok(quote! {
        datarize::TypeDescriptor::object::<Self>()
            #default_constructor
            #all_fields_constructor
            #(#builders)*
            #(#setters)*
    })
}

fn parameter_list(infos: &[FieldInfo]) -> TokenStream {
    let types = infos
        .iter()
        .filter(|info| !info.skip)
        .map(|info| &info.param_ty);
    quote! { ::std::vec![#(datarize::TypeRef::of::<#types>()),*] }
}

/// `Self { .. }` / `Self(..)` / `Self` reading arguments in field order
fn construct_expression(fields: &Fields, infos: &[FieldInfo]) -> TokenStream {
    let values = infos.iter().map(|info| {
        if info.skip {
            quote! { ::core::default::Default::default() }
        } else {
            info.read_argument()
        }
    });
    match fields {
        Fields::Named(_) => {
            let members = infos.iter().map(|info| &info.member);
            quote! { Self { #(#members: #values),* } }
        }
        Fields::Unnamed(_) => quote! { Self(#(#values),*) },
        Fields::Unit => quote! { Self },
    }
}

/// One public `set_<field>` method per named, non-skipped field
fn generate_setters(fields: &Fields, infos: &[FieldInfo]) -> Result<Vec<TokenStream>> {
    if !matches!(fields, Fields::Named(_)) {
        return Err(Error::new_spanned(
            fields,
            "`setters` requires a struct with named fields",
        ));
    }

    Ok(infos
        .iter()
        .filter(|info| !info.skip)
        .filter_map(|info| {
            let ident = info.ident.as_ref()?;
            let setter = LitStr::new(&format!("set_{}", ident.unraw()), ident.span());
            let param_ty = &info.param_ty;
            let assign = match (info.optional, info.boxed) {
                (true, true) => quote! {
                    this.#ident = args.optional::<#param_ty>()?.map(::std::boxed::Box::new);
                },
                (true, false) => quote! {
                    this.#ident = args.optional::<#param_ty>()?;
                },
                (false, true) => quote! {
                    if let Some(value) = args.optional::<#param_ty>()? {
                        this.#ident = ::std::boxed::Box::new(value);
                    }
                },
                (false, false) => quote! {
                    if let Some(value) = args.optional::<#param_ty>()? {
                        this.#ident = value;
                    }
                },
            };
            Some(quote! {
                .method::<Self, _>(
                    #setter,
                    datarize::Visibility::Public,
                    ::std::vec![datarize::TypeRef::of::<#param_ty>()],
                    |this, args| {
                        #assign
                        Ok(())
                    },
                )
            })
        })
        .collect())
}

/// Generate the enumeration descriptor for a unit-only enum
fn generate_enum_descriptor(data_enum: &DataEnum) -> Result<TokenStream> {
    if let Some(variant) = data_enum
        .variants
        .iter()
        .find(|variant| !matches!(variant.fields, Fields::Unit))
    {
        return Err(Error::new_spanned(
            variant,
            "Describe can only be derived for enums whose variants have no fields",
        ));
    }

    let count = data_enum.variants.len();
    let arms = data_enum.variants.iter().enumerate().map(|(index, variant)| {
        let ident = &variant.ident;
        quote! { #index => ::core::option::Option::Some(Self::#ident), }
    });

    Ok(quote! {
        datarize::TypeDescriptor::enumeration::<Self, _>(#count, |index| match index {
            #(#arms)*
            _ => ::core::option::Option::None,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand(input: DeriveInput) -> String {
        generate_describe_impl(&input)
            .expect("derive should expand")
            .to_string()
    }

    #[test]
    fn test_add_trait_bounds() {
        let mut generics: syn::Generics = parse_quote! { <T, U> };
        add_trait_bounds(&mut generics);

        if let GenericParam::Type(type_param) = &generics.params[0] {
            assert_eq!(type_param.bounds.len(), 1);
        }
    }

    #[test]
    fn test_unwrap_single_generic() {
        let ty: Type = parse_quote! { Option<Box<Node>> };
        let inner = unwrap_single_generic(&ty, "Option").expect("Option unwraps");
        let node = unwrap_single_generic(inner, "Box").expect("Box unwraps");
        let expected: Type = parse_quote! { Node };
        assert_eq!(node, &expected);

        let ty: Type = parse_quote! { std::option::Option<String> };
        assert!(unwrap_single_generic(&ty, "Option").is_some());

        let ty: Type = parse_quote! { Vec<String> };
        assert!(unwrap_single_generic(&ty, "Option").is_none());
    }

    #[test]
    fn test_field_analysis() {
        let fields: syn::FieldsNamed = parse_quote! {
            {
                name: String,
                next: Option<Box<Node>>,
                #[describe(skip)]
                cache: Vec<u8>,
            }
        };
        let infos = FieldInfo::analyze(&Fields::Named(fields)).expect("fields parse");
        assert_eq!(infos.len(), 3);
        assert!(!infos[0].optional && !infos[0].boxed && !infos[0].skip);
        assert!(infos[1].optional && infos[1].boxed);
        assert!(infos[2].skip);
    }

    #[test]
    fn test_bare_struct_gets_constructor() {
        let options = ContainerOptions::from_attributes(&[]).expect("no attributes");
        assert_eq!(options.constructor, Some(MemberVisibility::Public));
        assert!(!options.default);
        assert!(options.builders.is_empty());
    }

    #[test]
    fn test_container_options() {
        let input: DeriveInput = parse_quote! {
            #[describe(default, setters, builder = "of", builder = "create")]
            #[describe(constructor = "private")]
            struct Account {
                id: String,
            }
        };
        let options = ContainerOptions::from_attributes(&input.attrs).expect("attributes parse");
        assert!(options.default);
        assert!(options.setters);
        assert_eq!(options.constructor, Some(MemberVisibility::Private));
        let names: Vec<_> = options.builders.iter().map(LitStr::value).collect();
        assert_eq!(names, vec!["of", "create"]);
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let input: DeriveInput = parse_quote! {
            #[describe(factory)]
            struct Account {
                id: String,
            }
        };
        assert!(generate_describe_impl(&input).is_err());
    }

    #[test]
    fn test_struct_expansion() {
        let output = expand(parse_quote! {
            #[describe(builder = "of", setters)]
            struct Node {
                value: String,
                r#next: Option<Box<Node>>,
            }
        });
        assert!(output.contains("static_method"));
        assert!(output.contains("\"of\""));
        assert!(output.contains("\"set_value\""));
        assert!(output.contains("\"set_next\""));
        assert!(output.contains("TypeRef :: of :: < Node >"));
        assert!(!output.contains(". constructor"));
    }

    #[test]
    fn test_generic_struct_is_bounded() {
        let output = expand(parse_quote! {
            struct Wrapper<T> {
                value: T,
            }
        });
        assert!(output.contains("T : datarize :: Describe"));
        assert!(output.contains(". constructor"));
    }

    #[test]
    fn test_enum_expansion() {
        let output = expand(parse_quote! {
            enum Suit {
                Hearts,
                Spades,
            }
        });
        assert!(output.contains("enumeration"));
        assert!(output.contains("Self :: Hearts"));
        assert!(output.contains("Self :: Spades"));
    }

    #[test]
    fn test_enum_with_fields_rejected() {
        let input: DeriveInput = parse_quote! {
            enum Shape {
                Circle(f64),
            }
        };
        assert!(generate_describe_impl(&input).is_err());
    }

    #[test]
    fn test_union_rejected() {
        let input: DeriveInput = parse_quote! {
            union Bits {
                int: u32,
                float: f32,
            }
        };
        assert!(generate_describe_impl(&input).is_err());
    }

    #[test]
    fn test_setters_require_named_fields() {
        let input: DeriveInput = parse_quote! {
            #[describe(setters)]
            struct Pair(String, i32);
        };
        assert!(generate_describe_impl(&input).is_err());
    }
}
