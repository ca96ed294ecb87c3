use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Lit, Meta, Type};

/// Derive macro describing the CSV columns of an input record.
///
/// Each named field becomes one column:
/// - the column name honours `#[serde(rename = "...")]`
/// - a column is optional when the field is an `Option<T>` or carries `#[serde(default)]`
/// - the description is taken from the field's doc comment
///
/// Generates `csv_schema() -> &'static [CsvField]` and `csv_header() -> String`.
/// `CsvField` must be in scope where the derive is used.
#[proc_macro_derive(CsvSchema, attributes(serde))]
pub fn derive_csv_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(name, "CsvSchema requires named fields")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "CsvSchema can only be derived for structs")
                .to_compile_error()
                .into()
        }
    };

    let columns: Vec<Column> = named
        .iter()
        .filter_map(|field| {
            let ident = field.ident.as_ref()?.to_string();
            let serde_args = serde_args(&field.attrs);
            Some(Column {
                name: serde_rename(&serde_args).unwrap_or(ident),
                required: !is_option(&field.ty) && !has_serde_default(&serde_args),
                description: doc_comment(&field.attrs),
            })
        })
        .collect();

    let entries = columns.iter().map(|c| {
        let Column {
            name,
            required,
            description,
        } = c;
        quote! {
            CsvField {
                name: #name,
                required: #required,
                description: #description,
            }
        }
    });
    let header = columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let expanded = quote! {
        impl #name {
            pub fn csv_schema() -> &'static [CsvField] {
                static COLUMNS: &[CsvField] = &[
                    #(#entries),*
                ];
                COLUMNS
            }

            pub fn csv_header() -> String {
                #header.to_string()
            }
        }
    };

    TokenStream::from(expanded)
}

struct Column {
    name: String,
    required: bool,
    description: String,
}

/// Token text of every `#[serde(...)]` attribute on a field.
fn serde_args(attrs: &[Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("serde"))
        .filter_map(|attr| match &attr.meta {
            Meta::List(list) => Some(list.tokens.to_string()),
            _ => None,
        })
        .collect()
}

fn serde_rename(args: &[String]) -> Option<String> {
    args.iter().find_map(|tokens| {
        let rest = &tokens[tokens.find("rename")?..];
        let value = rest[rest.find('=')? + 1..].trim().strip_prefix('"')?;
        Some(value[..value.find('"')?].to_string())
    })
}

fn has_serde_default(args: &[String]) -> bool {
    args.iter()
        .flat_map(|tokens| tokens.split(','))
        .any(|arg| arg.trim().starts_with("default"))
}

fn doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(meta) => match &meta.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Option"),
        _ => false,
    }
}
