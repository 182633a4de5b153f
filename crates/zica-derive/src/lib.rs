//! Derive macros for zica message types.
//!
//! `#[derive(Message)]` turns a struct with `#[zica(tag = N)]` field
//! attributes into a wire-format message: it emits the static field
//! descriptor table, the size/emission walk, and the field-number dispatch
//! for decoding. Field numbers are validated at build time: they must be
//! strictly increasing in declaration order, within `1..=2^29 - 1`, and
//! outside the reserved `19000..=19999` range.
//!
//! `#[derive(Enumeration)]` implements the enumeration trait for fieldless
//! enums; unknown wire values decode to the `Default` variant.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DeriveInput, Expr, Fields, Ident, Type, UnOp};

/// Maximum valid protobuf field number (2^29 - 1).
const MAX_FIELD_NUMBER: u32 = 536_870_911;

fn is_valid_field_number(number: u32) -> bool {
    number >= 1 && !(19_000..=19_999).contains(&number) && number <= MAX_FIELD_NUMBER
}

/// The value kinds a field can declare or infer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Bool,
    Enumeration,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Float,
    Double,
    Str,
    Bytes,
    Message,
}

impl Kind {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "int32" => Kind::Int32,
            "int64" => Kind::Int64,
            "uint32" => Kind::Uint32,
            "uint64" => Kind::Uint64,
            "sint32" => Kind::Sint32,
            "sint64" => Kind::Sint64,
            "bool" => Kind::Bool,
            "enum" | "enumeration" => Kind::Enumeration,
            "fixed32" => Kind::Fixed32,
            "fixed64" => Kind::Fixed64,
            "sfixed32" => Kind::Sfixed32,
            "sfixed64" => Kind::Sfixed64,
            "float" => Kind::Float,
            "double" => Kind::Double,
            "string" => Kind::Str,
            "bytes" => Kind::Bytes,
            "message" => Kind::Message,
            _ => return None,
        })
    }

    /// Infers the kind from the last path segment of a Rust type.
    fn infer(ident: &Ident) -> Self {
        match ident.to_string().as_str() {
            "i32" => Kind::Int32,
            "i64" => Kind::Int64,
            "u32" => Kind::Uint32,
            "u64" => Kind::Uint64,
            "bool" => Kind::Bool,
            "f32" => Kind::Float,
            "f64" => Kind::Double,
            "String" => Kind::Str,
            _ => Kind::Message,
        }
    }

    /// The `zica_core::encoding` submodule implementing this kind.
    fn module(self) -> Ident {
        let name = match self {
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Sint32 => "sint32",
            Kind::Sint64 => "sint64",
            Kind::Bool => "bool",
            Kind::Enumeration => "enumeration",
            Kind::Fixed32 => "fixed32",
            Kind::Fixed64 => "fixed64",
            Kind::Sfixed32 => "sfixed32",
            Kind::Sfixed64 => "sfixed64",
            Kind::Float => "float",
            Kind::Double => "double",
            Kind::Str => "string",
            Kind::Bytes => "bytes",
            Kind::Message => "message",
        };
        format_ident!("{}", name)
    }

    /// The `zica_core::Kind` variant for the descriptor table.
    fn descriptor_variant(self) -> Ident {
        let name = match self {
            Kind::Int32 => "Int32",
            Kind::Int64 => "Int64",
            Kind::Uint32 => "Uint32",
            Kind::Uint64 => "Uint64",
            Kind::Sint32 => "Sint32",
            Kind::Sint64 => "Sint64",
            Kind::Bool => "Bool",
            Kind::Enumeration => "Enum",
            Kind::Fixed32 => "Fixed32",
            Kind::Fixed64 => "Fixed64",
            Kind::Sfixed32 => "Sfixed32",
            Kind::Sfixed64 => "Sfixed64",
            Kind::Float => "Float",
            Kind::Double => "Double",
            Kind::Str => "String",
            Kind::Bytes => "Bytes",
            Kind::Message => "Message",
        };
        format_ident!("{}", name)
    }

    /// The canonical wire type of one value of this kind.
    fn wire_type(self) -> TokenStream2 {
        match self {
            Kind::Int32
            | Kind::Int64
            | Kind::Uint32
            | Kind::Uint64
            | Kind::Sint32
            | Kind::Sint64
            | Kind::Bool
            | Kind::Enumeration => quote!(zica_core::WireType::Varint),
            Kind::Fixed64 | Kind::Sfixed64 | Kind::Double => quote!(zica_core::WireType::Fixed64),
            Kind::Fixed32 | Kind::Sfixed32 | Kind::Float => quote!(zica_core::WireType::Fixed32),
            Kind::Str | Kind::Bytes | Kind::Message => {
                quote!(zica_core::WireType::LengthDelimited)
            }
        }
    }

    fn is_packable(self) -> bool {
        !matches!(self, Kind::Str | Kind::Bytes | Kind::Message)
    }

    fn is_valid_map_key(self) -> bool {
        !matches!(
            self,
            Kind::Float | Kind::Double | Kind::Enumeration | Kind::Bytes | Kind::Message
        )
    }

    /// Nested-message helpers carry the depth counter; scalars do not.
    fn needs_depth(self) -> bool {
        matches!(self, Kind::Message)
    }

    /// The Rust scalar type this kind stores in, when it is pinned down.
    fn expected_type(self) -> Option<&'static str> {
        Some(match self {
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => "i32",
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => "i64",
            Kind::Uint32 | Kind::Fixed32 => "u32",
            Kind::Uint64 | Kind::Fixed64 => "u64",
            Kind::Bool => "bool",
            Kind::Float => "f32",
            Kind::Double => "f64",
            Kind::Str => "String",
            Kind::Bytes | Kind::Enumeration | Kind::Message => return None,
        })
    }
}

/// Container shape of a field member.
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Plain { boxed: bool },
    Optional { boxed: bool },
    Repeated,
    Map,
}

/// One parsed `#[zica(...)]` field.
#[derive(Debug)]
struct FieldSpec {
    ident: Ident,
    tag: u32,
    shape: Shape,
    kind: Kind,
    elem_ty: Type,
    key: Option<(Kind, Type)>,
}

#[derive(Default)]
struct ZicaAttrs {
    tag: Option<u32>,
    kind: Option<Kind>,
    key: Option<Kind>,
    value: Option<Kind>,
}

/// Parses `#[zica(tag = N, kind = "...", key = "...", value = "...")]`.
fn parse_attrs(field: &syn::Field) -> syn::Result<ZicaAttrs> {
    let mut parsed = ZicaAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("zica") {
            continue;
        }
        attr.parse_args_with(|input: syn::parse::ParseStream<'_>| {
            while !input.is_empty() {
                let ident = input.parse::<Ident>()?;
                input.parse::<syn::Token![=]>()?;
                if ident == "tag" {
                    let lit = input.parse::<syn::LitInt>()?;
                    parsed.tag = Some(lit.base10_parse::<u32>()?);
                } else if ident == "kind" || ident == "key" || ident == "value" {
                    let lit = input.parse::<syn::LitStr>()?;
                    let kind = Kind::from_name(&lit.value()).ok_or_else(|| {
                        syn::Error::new(lit.span(), format!("unknown kind `{}`", lit.value()))
                    })?;
                    match ident.to_string().as_str() {
                        "kind" => parsed.kind = Some(kind),
                        "key" => parsed.key = Some(kind),
                        _ => parsed.value = Some(kind),
                    }
                } else {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown zica attribute `{ident}`"),
                    ));
                }
                if input.peek(syn::Token![,]) {
                    input.parse::<syn::Token![,]>()?;
                }
            }
            Ok(())
        })?;
    }
    Ok(parsed)
}

/// Splits a path type into its last segment ident and type arguments.
fn path_parts(ty: &Type) -> Option<(&Ident, Vec<&Type>)> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    let args = match &segment.arguments {
        syn::PathArguments::None => Vec::new(),
        syn::PathArguments::AngleBracketed(brackets) => brackets
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        syn::PathArguments::Parenthesized(_) => return None,
    };
    Some((&segment.ident, args))
}

fn is_container_ident(ident: &Ident) -> bool {
    matches!(
        ident.to_string().as_str(),
        "Option" | "Box" | "Vec" | "VecDeque" | "BTreeMap" | "HashMap" | "BTreeSet" | "HashSet"
    )
}

/// Resolves the kind of a non-container element type.
fn element_kind(ty: &Type, declared: Option<Kind>) -> syn::Result<Kind> {
    let Some((ident, args)) = path_parts(ty) else {
        return Err(syn::Error::new(ty.span(), "unsupported field type"));
    };
    if is_container_ident(ident) && !args.is_empty() {
        return Err(syn::Error::new(
            ty.span(),
            "nested containers are not supported here; wrap the inner type in a message",
        ));
    }
    let kind = declared.unwrap_or_else(|| Kind::infer(ident));
    if let Some(expected) = kind.expected_type() {
        if ident != expected {
            return Err(syn::Error::new(
                ty.span(),
                format!("kind expects a `{expected}` member"),
            ));
        }
    }
    Ok(kind)
}

fn is_u8(ty: &Type) -> bool {
    matches!(path_parts(ty), Some((ident, args)) if ident == "u8" && args.is_empty())
}

/// Classifies a member type into shape + kind.
fn analyze_field(field: &syn::Field) -> syn::Result<FieldSpec> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new(field.span(), "fields must be named"))?;
    let attrs = parse_attrs(field)?;
    let tag = attrs.tag.ok_or_else(|| {
        syn::Error::new(field.span(), "field is missing its #[zica(tag = N)] attribute")
    })?;
    if !is_valid_field_number(tag) {
        return Err(syn::Error::new(
            field.span(),
            "field numbers must be 1..=536870911 and outside the reserved 19000..=19999 range",
        ));
    }

    let (outer_ident, outer_args) = path_parts(&field.ty)
        .ok_or_else(|| syn::Error::new(field.ty.span(), "unsupported field type"))?;

    let spec = match (outer_ident.to_string().as_str(), outer_args.as_slice()) {
        ("Option", [inner]) => {
            let (boxed, elem_ty) = match path_parts(inner) {
                Some((id, args)) if id == "Box" && args.len() == 1 => (true, args[0].clone()),
                _ => (false, (*inner).clone()),
            };
            let kind = element_kind(&elem_ty, attrs.kind)?;
            FieldSpec {
                ident,
                tag,
                shape: Shape::Optional { boxed },
                kind,
                elem_ty,
                key: None,
            }
        }
        ("Box", [inner]) => {
            let elem_ty = (*inner).clone();
            let kind = element_kind(&elem_ty, attrs.kind)?;
            FieldSpec {
                ident,
                tag,
                shape: Shape::Plain { boxed: true },
                kind,
                elem_ty,
                key: None,
            }
        }
        ("Vec", [inner]) => {
            if is_u8(inner) && matches!(attrs.kind, None | Some(Kind::Bytes)) {
                FieldSpec {
                    ident,
                    tag,
                    shape: Shape::Plain { boxed: false },
                    kind: Kind::Bytes,
                    elem_ty: (*inner).clone(),
                    key: None,
                }
            } else {
                let elem_ty = (*inner).clone();
                let kind = element_kind(&elem_ty, attrs.kind)?;
                FieldSpec {
                    ident,
                    tag,
                    shape: Shape::Repeated,
                    kind,
                    elem_ty,
                    key: None,
                }
            }
        }
        ("BTreeMap" | "HashMap", [key_ty, value_ty]) => {
            let key_kind = element_kind(key_ty, attrs.key)?;
            if !key_kind.is_valid_map_key() {
                return Err(syn::Error::new(
                    key_ty.span(),
                    "map keys must be an integral, zigzag, fixed, or string kind",
                ));
            }
            let value_kind = element_kind(value_ty, attrs.value.or(attrs.kind))?;
            FieldSpec {
                ident,
                tag,
                shape: Shape::Map,
                kind: value_kind,
                elem_ty: (*value_ty).clone(),
                key: Some((key_kind, (*key_ty).clone())),
            }
        }
        _ => {
            let kind = element_kind(&field.ty, attrs.kind)?;
            FieldSpec {
                ident,
                tag,
                shape: Shape::Plain { boxed: false },
                kind,
                elem_ty: field.ty.clone(),
                key: None,
            }
        }
    };
    Ok(spec)
}

impl FieldSpec {
    fn descriptor(&self) -> TokenStream2 {
        let number = self.tag;
        let name = self.ident.to_string();
        let kind = self.kind.descriptor_variant();
        let label = match self.shape {
            Shape::Plain { .. } => quote!(Singular),
            Shape::Optional { .. } => quote!(Optional),
            Shape::Repeated => quote!(Repeated),
            Shape::Map => quote!(Map),
        };
        let map_key = match &self.key {
            Some((key_kind, _)) => {
                let variant = key_kind.descriptor_variant();
                quote!(::core::option::Option::Some(zica_core::Kind::#variant))
            }
            None => quote!(::core::option::Option::None),
        };
        quote! {
            zica_core::FieldDescriptor {
                number: #number,
                name: #name,
                kind: zica_core::Kind::#kind,
                label: zica_core::Label::#label,
                map_key: #map_key,
            }
        }
    }

    fn size_stmt(&self) -> TokenStream2 {
        let tag = self.tag;
        let ident = &self.ident;
        let module = self.kind.module();
        match &self.shape {
            Shape::Plain { boxed } => {
                let value = if *boxed {
                    quote!(&*self.#ident)
                } else {
                    quote!(&self.#ident)
                };
                quote! {
                    size += zica_core::encoding::#module::encoded_len(#tag, #value);
                }
            }
            Shape::Optional { boxed } => {
                let value = if *boxed {
                    quote!(&**value)
                } else {
                    quote!(value)
                };
                quote! {
                    if let ::core::option::Option::Some(value) = &self.#ident {
                        size += zica_core::encoding::#module::encoded_len(#tag, #value);
                    }
                }
            }
            Shape::Repeated if self.kind.is_packable() => quote! {
                size += zica_core::encoding::#module::packed_len(#tag, &self.#ident);
            },
            Shape::Repeated => quote! {
                for value in &self.#ident {
                    size += zica_core::encoding::#module::encoded_len(#tag, value);
                }
            },
            Shape::Map => {
                let entry_len = self.map_entry_len();
                quote! {
                    for (key, value) in &self.#ident {
                        let entry = #entry_len;
                        size += u64::from(zica_core::wire::tag_len(#tag))
                            + u64::from(zica_core::wire::varint_len(entry))
                            + entry;
                    }
                }
            }
        }
    }

    fn map_entry_len(&self) -> TokenStream2 {
        let (key_kind, _) = self.key.as_ref().expect("map field has a key");
        let key_module = key_kind.module();
        let value_module = self.kind.module();
        quote! {
            zica_core::encoding::#key_module::encoded_len(1, key)
                + zica_core::encoding::#value_module::encoded_len(2, value)
        }
    }

    fn encode_stmt(&self) -> TokenStream2 {
        let tag = self.tag;
        let ident = &self.ident;
        let module = self.kind.module();
        match &self.shape {
            Shape::Plain { boxed } => {
                let value = if *boxed {
                    quote!(&*self.#ident)
                } else {
                    quote!(&self.#ident)
                };
                quote! {
                    zica_core::encoding::#module::encode(#tag, #value, buf);
                }
            }
            Shape::Optional { boxed } => {
                let value = if *boxed {
                    quote!(&**value)
                } else {
                    quote!(value)
                };
                quote! {
                    if let ::core::option::Option::Some(value) = &self.#ident {
                        zica_core::encoding::#module::encode(#tag, #value, buf);
                    }
                }
            }
            Shape::Repeated if self.kind.is_packable() => quote! {
                zica_core::encoding::#module::encode_packed(#tag, &self.#ident, buf);
            },
            Shape::Repeated => quote! {
                for value in &self.#ident {
                    zica_core::encoding::#module::encode(#tag, value, buf);
                }
            },
            Shape::Map => {
                let (key_kind, _) = self.key.as_ref().expect("map field has a key");
                let key_module = key_kind.module();
                let value_module = self.kind.module();
                let entry_len = self.map_entry_len();
                quote! {
                    for (key, value) in &self.#ident {
                        let entry = #entry_len;
                        zica_core::wire::put_tag(
                            #tag,
                            zica_core::WireType::LengthDelimited,
                            buf,
                        );
                        zica_core::wire::put_varint(entry, buf);
                        zica_core::encoding::#key_module::encode(1, key, buf);
                        zica_core::encoding::#value_module::encode(2, value, buf);
                    }
                }
            }
        }
    }

    fn merge_arm(&self) -> TokenStream2 {
        let tag = self.tag;
        let ident = &self.ident;
        let module = self.kind.module();
        let wire = self.kind.wire_type();
        let depth_arg = if self.kind.needs_depth() {
            quote!(, depth)
        } else {
            quote!()
        };
        match &self.shape {
            Shape::Plain { boxed } => {
                let target = if *boxed {
                    quote!(&mut *self.#ident)
                } else {
                    quote!(&mut self.#ident)
                };
                quote! {
                    #tag => {
                        if wire_type == #wire {
                            zica_core::encoding::#module::merge(#target, buf #depth_arg)
                        } else {
                            zica_core::encoding::skip(wire_type, buf)
                        }
                    }
                }
            }
            Shape::Optional { boxed } => {
                let target = if *boxed {
                    quote!(&mut **self.#ident.get_or_insert_with(::core::default::Default::default))
                } else {
                    quote!(self.#ident.get_or_insert_with(::core::default::Default::default))
                };
                quote! {
                    #tag => {
                        if wire_type == #wire {
                            zica_core::encoding::#module::merge(#target, buf #depth_arg)
                        } else {
                            zica_core::encoding::skip(wire_type, buf)
                        }
                    }
                }
            }
            Shape::Repeated if self.kind.is_packable() => {
                let elem_ty = &self.elem_ty;
                quote! {
                    #tag => match wire_type {
                        #wire => {
                            let mut value: #elem_ty = ::core::default::Default::default();
                            zica_core::encoding::#module::merge(&mut value, buf)?;
                            self.#ident.push(value);
                            ::core::result::Result::Ok(())
                        }
                        zica_core::WireType::LengthDelimited => {
                            zica_core::encoding::#module::merge_packed(&mut self.#ident, buf)
                        }
                        _ => zica_core::encoding::skip(wire_type, buf),
                    }
                }
            }
            Shape::Repeated => {
                let elem_ty = &self.elem_ty;
                quote! {
                    #tag => {
                        if wire_type == zica_core::WireType::LengthDelimited {
                            let mut value: #elem_ty = ::core::default::Default::default();
                            zica_core::encoding::#module::merge(&mut value, buf #depth_arg)?;
                            self.#ident.push(value);
                            ::core::result::Result::Ok(())
                        } else {
                            zica_core::encoding::skip(wire_type, buf)
                        }
                    }
                }
            }
            Shape::Map => {
                let (key_kind, key_ty) = self.key.as_ref().expect("map field has a key");
                let key_module = key_kind.module();
                let key_wire = key_kind.wire_type();
                let value_module = self.kind.module();
                let value_ty = &self.elem_ty;
                let merge_value = if self.kind.needs_depth() {
                    quote! {
                        |value, buf, depth| zica_core::encoding::#value_module::merge(value, buf, depth)
                    }
                } else {
                    quote! {
                        |value, buf, _depth| zica_core::encoding::#value_module::merge(value, buf)
                    }
                };
                quote! {
                    #tag => {
                        if wire_type == zica_core::WireType::LengthDelimited {
                            let (key, value) = zica_core::encoding::map::merge_entry::<#key_ty, #value_ty>(
                                buf,
                                depth,
                                #key_wire,
                                |key, buf, _depth| zica_core::encoding::#key_module::merge(key, buf),
                                #wire,
                                #merge_value,
                            )?;
                            self.#ident.insert(key, value);
                            ::core::result::Result::Ok(())
                        } else {
                            zica_core::encoding::skip(wire_type, buf)
                        }
                    }
                }
            }
        }
    }
}

fn expand_message(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "Message can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            input.ident.span(),
            "Message requires named fields",
        ));
    };

    let mut specs = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        specs.push(analyze_field(field)?);
    }
    for pair in specs.windows(2) {
        if pair[0].tag >= pair[1].tag {
            return Err(syn::Error::new(
                pair[1].ident.span(),
                "field numbers must be strictly increasing in declaration order",
            ));
        }
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let descriptors: Vec<_> = specs.iter().map(FieldSpec::descriptor).collect();
    let size_stmts: Vec<_> = specs.iter().map(FieldSpec::size_stmt).collect();
    let encode_stmts: Vec<_> = specs.iter().map(FieldSpec::encode_stmt).collect();
    let merge_arms: Vec<_> = specs.iter().map(FieldSpec::merge_arm).collect();

    Ok(quote! {
        impl #impl_generics zica_core::Message for #name #ty_generics #where_clause {
            const FIELDS: &'static [zica_core::FieldDescriptor] = &[
                #(#descriptors),*
            ];

            #[allow(unused_mut)]
            fn encoded_len(&self) -> u64 {
                let mut size = 0u64;
                #(#size_stmts)*
                size
            }

            #[allow(unused_variables)]
            fn encode_fields<B: zica_core::bytes::BufMut>(&self, buf: &mut B) {
                #(#encode_stmts)*
            }

            #[allow(unused_variables)]
            fn merge_field(
                &mut self,
                field_number: u32,
                wire_type: zica_core::WireType,
                buf: &mut &[u8],
                depth: u32,
            ) -> zica_core::Result<()> {
                match field_number {
                    #(#merge_arms)*
                    _ => zica_core::encoding::skip(wire_type, buf),
                }
            }
        }

        const _: () = zica_core::field::assert_field_list_valid(
            <#name #ty_generics as zica_core::Message>::FIELDS,
        );
    })
}

/// Derives `zica_core::Message` for a struct with `#[zica(tag = N)]` fields.
#[proc_macro_derive(Message, attributes(zica))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_message(&input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn variant_discriminant(expr: &Expr) -> syn::Result<i32> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            syn::Lit::Int(int) => int.base10_parse::<i32>(),
            _ => Err(syn::Error::new(lit.span(), "expected an integer discriminant")),
        },
        Expr::Unary(unary) => {
            if matches!(unary.op, UnOp::Neg(_)) {
                variant_discriminant(&unary.expr).map(|value| -value)
            } else {
                Err(syn::Error::new(unary.span(), "expected an integer discriminant"))
            }
        }
        other => Err(syn::Error::new(other.span(), "expected an integer discriminant")),
    }
}

fn expand_enumeration(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "Enumeration can only be derived for enums",
        ));
    };

    let name = &input.ident;
    let mut arms = Vec::with_capacity(data.variants.len());
    let mut next = 0i32;
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.ident.span(),
                "Enumeration variants cannot carry data",
            ));
        }
        let value = match &variant.discriminant {
            Some((_, expr)) => variant_discriminant(expr)?,
            None => next,
        };
        next = value.wrapping_add(1);
        let ident = &variant.ident;
        arms.push(quote!(#value => #name::#ident,));
    }

    Ok(quote! {
        impl zica_core::Enumeration for #name {
            fn from_wire(value: i32) -> Self {
                match value {
                    #(#arms)*
                    _ => <#name as ::core::default::Default>::default(),
                }
            }

            fn to_wire(self) -> i32 {
                self as i32
            }
        }
    })
}

/// Derives `zica_core::Enumeration` for a fieldless enum.
///
/// The enum must implement `Default` (and `Copy`); unknown wire values
/// decode to the default variant.
#[proc_macro_derive(Enumeration)]
pub fn derive_enumeration(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_enumeration(&input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}
