use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type, parse_macro_input, spanned::Spanned};

#[proc_macro_derive(TableModel, attributes(table, column))]
pub fn derive_table_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_table_model(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_table_model(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "TableModel does not support generic structs yet",
        ));
    }

    let table_options = parse_table_options(&input.attrs)?;

    let data_struct = match input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "TableModel can only be derived for structs",
            ));
        }
    };

    let named_fields = match data_struct.fields {
        Fields::Named(fields) => fields,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "TableModel requires named fields",
            ));
        }
    };

    let mut fields = Vec::<FieldColumn>::new();
    for field in named_fields.named {
        let span = field.span();
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(span, "TableModel requires named fields"))?;

        let column_name =
            parse_column_name(&field.attrs)?.unwrap_or_else(|| ident.to_string());
        for existing in &fields {
            if existing.column_name.eq_ignore_ascii_case(&column_name) {
                return Err(syn::Error::new(
                    span,
                    format!("Duplicate column name '{}'", column_name),
                ));
            }
        }

        let (kind, nullable) = match option_inner_type(&field.ty) {
            Some(inner) => match scalar_kind(&inner) {
                Some(kind) => (kind, true),
                None => return Err(unsupported_field_type(&field.ty)),
            },
            None => match scalar_kind(&field.ty) {
                Some(kind) => (kind, false),
                None => return Err(unsupported_field_type(&field.ty)),
            },
        };

        fields.push(FieldColumn {
            ident,
            column_name,
            kind,
            nullable,
        });
    }

    if fields.is_empty() {
        return Err(syn::Error::new(
            struct_name.span(),
            "TableModel requires at least one field",
        ));
    }

    let table_expr = match table_options.name {
        Some(name) => quote! { #name },
        None => quote! { stringify!(#struct_name) },
    };

    let column_entries = fields.iter().map(|field| {
        let column_name = field.column_name.as_str();
        let data_type = data_type_tokens(&field.kind);
        if field.nullable {
            quote! { ::rowbridge::Column::new(#column_name, #data_type) }
        } else {
            quote! { ::rowbridge::Column::new(#column_name, #data_type).not_null() }
        }
    });

    let get_arms = fields.iter().map(|field| {
        let ident = &field.ident;
        let column_name = field.column_name.as_str();
        quote! {
            name if name.eq_ignore_ascii_case(#column_name) => {
                Some(::rowbridge::Value::from(self.#ident.clone()))
            }
        }
    });

    let set_arms = fields.iter().map(|field| {
        let ident = &field.ident;
        let column_name = field.column_name.as_str();
        let convert = conversion_tokens(&field.kind);
        if field.nullable {
            quote! {
                name if name.eq_ignore_ascii_case(#column_name) => {
                    if value.is_null() {
                        self.#ident = None;
                    } else {
                        self.#ident = Some(#convert);
                    }
                    Ok(())
                }
            }
        } else {
            quote! {
                name if name.eq_ignore_ascii_case(#column_name) => {
                    self.#ident = #convert;
                    Ok(())
                }
            }
        }
    });

    Ok(quote! {
        impl ::rowbridge::TableModel for #struct_name {
            fn table_name() -> &'static str {
                #table_expr
            }

            fn columns() -> Vec<::rowbridge::Column> {
                vec![ #(#column_entries),* ]
            }

            fn get(&self, column: &str) -> Option<::rowbridge::Value> {
                match column {
                    #(#get_arms)*
                    _ => None,
                }
            }

            fn set(&mut self, column: &str, value: ::rowbridge::Value) -> ::rowbridge::Result<()> {
                match column {
                    #(#set_arms)*
                    _ => Err(::rowbridge::BridgeError::ColumnNotFound(
                        column.to_string(),
                        <Self as ::rowbridge::TableModel>::table_name().to_string(),
                    )),
                }
            }
        }
    })
}

struct FieldColumn {
    ident: Ident,
    column_name: String,
    kind: ScalarKind,
    nullable: bool,
}

enum ScalarKind {
    Integer64,
    Integer32,
    Float64,
    Float32,
    Text,
    Boolean,
    Timestamp,
    Date,
    Uuid,
}

fn scalar_kind(ty: &Type) -> Option<ScalarKind> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    match segment.ident.to_string().as_str() {
        "i64" => Some(ScalarKind::Integer64),
        "i32" => Some(ScalarKind::Integer32),
        "f64" => Some(ScalarKind::Float64),
        "f32" => Some(ScalarKind::Float32),
        "String" => Some(ScalarKind::Text),
        "bool" => Some(ScalarKind::Boolean),
        "DateTime" => Some(ScalarKind::Timestamp),
        "NaiveDate" => Some(ScalarKind::Date),
        "Uuid" => Some(ScalarKind::Uuid),
        _ => None,
    }
}

fn option_inner_type(ty: &Type) -> Option<Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    first_generic_type(segment)
}

fn first_generic_type(segment: &syn::PathSegment) -> Option<Type> {
    let syn::PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };

    for arg in &arguments.args {
        if let syn::GenericArgument::Type(ty) = arg {
            return Some(ty.clone());
        }
    }
    None
}

fn data_type_tokens(kind: &ScalarKind) -> TokenStream2 {
    match kind {
        ScalarKind::Integer64 | ScalarKind::Integer32 => quote!(::rowbridge::DataType::Integer),
        ScalarKind::Float64 | ScalarKind::Float32 => quote!(::rowbridge::DataType::Float),
        ScalarKind::Text => quote!(::rowbridge::DataType::Text),
        ScalarKind::Boolean => quote!(::rowbridge::DataType::Boolean),
        ScalarKind::Timestamp => quote!(::rowbridge::DataType::Timestamp),
        ScalarKind::Date => quote!(::rowbridge::DataType::Date),
        ScalarKind::Uuid => quote!(::rowbridge::DataType::Uuid),
    }
}

fn conversion_tokens(kind: &ScalarKind) -> TokenStream2 {
    match kind {
        ScalarKind::Integer64 => quote!(value.try_into_i64()?),
        ScalarKind::Integer32 => quote!({
            let raw = value.try_into_i64()?;
            i32::try_from(raw).map_err(|_| {
                ::rowbridge::BridgeError::Conversion(format!(
                    "Value {} is out of range for i32",
                    raw
                ))
            })?
        }),
        ScalarKind::Float64 => quote!(value.try_into_f64()?),
        ScalarKind::Float32 => quote!(value.try_into_f64()? as f32),
        ScalarKind::Text => quote!(value.try_into_string()?),
        ScalarKind::Boolean => quote!(value.try_into_bool()?),
        ScalarKind::Timestamp => quote!(value.try_into_timestamp()?),
        ScalarKind::Date => quote!(value.try_into_date()?),
        ScalarKind::Uuid => quote!(value.try_into_uuid()?),
    }
}

fn unsupported_field_type(ty: &Type) -> syn::Error {
    syn::Error::new(
        ty.span(),
        "TableModel fields must be i64, i32, f64, f32, String, bool, DateTime<Utc>, \
         NaiveDate, Uuid, or Option of one of these",
    )
}

struct TableOptions {
    name: Option<String>,
}

fn parse_table_options(attrs: &[syn::Attribute]) -> syn::Result<TableOptions> {
    let mut options = TableOptions { name: None };

    for attr in attrs {
        if !attr.path().is_ident("table") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                options.name = Some(lit.value());
                return Ok(());
            }

            Err(meta.error("Unsupported table attribute. Supported: name = \"...\""))
        })?;
    }

    Ok(options)
}

fn parse_column_name(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    let mut parsed: Option<Option<String>> = None;

    for attr in attrs {
        if !attr.path().is_ident("column") {
            continue;
        }

        if parsed.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "Duplicate #[column(...)] attribute on field",
            ));
        }

        let mut name: Option<String> = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                name = Some(lit.value());
                return Ok(());
            }

            Err(meta.error("Unsupported column attribute. Supported: name = \"...\""))
        })?;
        parsed = Some(name);
    }

    Ok(parsed.flatten())
}
