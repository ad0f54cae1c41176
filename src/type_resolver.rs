use crate::error::{Error, Result};
use crate::model::{bare_type_name, FieldDef, FieldShape, FieldTags, ModelDef, ScalarKind};
use crate::parser::ParsedFile;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Type resolver - turns struct and enum definitions found in parsed source
/// files into model descriptions.
///
/// Field types are mapped onto [`FieldShape`]s. Field annotations are read
/// from `#[openapi(...)]` attributes, with `#[serde(rename)]` and
/// `#[serde(skip)]` honoured as well.
pub struct TypeResolver {
    /// All parsed files, searched in order
    parsed_files: Vec<ParsedFile>,
    /// Resolved models by bare type name
    type_cache: HashMap<String, ModelDef>,
    /// Types currently being resolved, to detect circular references
    resolving_stack: HashSet<String>,
}

impl TypeResolver {
    /// Create a new TypeResolver with parsed files
    pub fn new(parsed_files: Vec<ParsedFile>) -> Self {
        debug!("Initializing TypeResolver with {} files", parsed_files.len());
        Self {
            parsed_files,
            type_cache: HashMap::new(),
            resolving_stack: HashSet::new(),
        }
    }

    fn items(&self) -> impl Iterator<Item = &syn::Item> {
        self.parsed_files
            .iter()
            .flat_map(|file| file.syntax_tree.items.iter())
    }

    /// Find a struct definition by name across all parsed files
    pub fn find_struct_definition(&self, name: &str) -> Option<&syn::ItemStruct> {
        self.items().find_map(|item| match item {
            syn::Item::Struct(item_struct) if item_struct.ident == name => Some(item_struct),
            _ => None,
        })
    }

    /// Find an enum definition by name across all parsed files
    pub fn find_enum_definition(&self, name: &str) -> Option<&syn::ItemEnum> {
        self.items().find_map(|item| match item {
            syn::Item::Enum(item_enum) if item_enum.ident == name => Some(item_enum),
            _ => None,
        })
    }

    /// Resolve a model by type name. Module qualifiers are ignored.
    ///
    /// Structs become object models, enums become leaf models.
    ///
    /// # Errors
    ///
    /// `Error::UnknownModel` if no struct or enum of that name exists, and
    /// `Error::MalformedTag` for unparseable field attributes.
    pub fn resolve_model(&mut self, type_name: &str) -> Result<ModelDef> {
        let name = bare_type_name(type_name);
        debug!("Resolving model: {}", name);

        if let Some(cached) = self.type_cache.get(name) {
            return Ok(cached.clone());
        }

        if let Some(item_struct) = self.find_struct_definition(name).cloned() {
            return self.resolve_struct(&item_struct);
        }
        if self.find_enum_definition(name).is_some() {
            let model = ModelDef::leaf(name);
            self.type_cache.insert(name.to_string(), model.clone());
            return Ok(model);
        }

        Err(Error::UnknownModel(type_name.to_string()))
    }

    fn resolve_struct(&mut self, item_struct: &syn::ItemStruct) -> Result<ModelDef> {
        let name = item_struct.ident.to_string();
        debug!("Parsing struct definition: {}", name);

        self.resolving_stack.insert(name.clone());
        let result = self.struct_model(&name, item_struct);
        self.resolving_stack.remove(&name);

        let model = result?;
        // A model resolved below an ancestor may reference that ancestor by
        // name; only trees resolved from the top are self-contained.
        if self.resolving_stack.is_empty() {
            self.type_cache.insert(name, model.clone());
        }
        Ok(model)
    }

    fn struct_model(&mut self, name: &str, item_struct: &syn::ItemStruct) -> Result<ModelDef> {
        let syn::Fields::Named(named_fields) = &item_struct.fields else {
            // Tuple and unit structs carry no named properties
            return Ok(ModelDef::leaf(name));
        };

        let mut model = ModelDef::object(name);
        for field in &named_fields.named {
            let Some(ident) = &field.ident else {
                continue;
            };
            let field_name = ident.to_string();
            let tags = Self::parse_field_tags(&field_name, &field.attrs)?;
            let shape = self.field_shape(&field.ty)?;
            debug!("Field {}.{}: {:?}", name, field_name, shape);
            model = model.field(FieldDef {
                name: field_name,
                shape,
                tags,
            });
        }
        Ok(model)
    }

    /// Map a field type onto its shape, resolving named structs on the way.
    fn field_shape(&mut self, ty: &syn::Type) -> Result<FieldShape> {
        match ty {
            syn::Type::Path(type_path) => match type_path.path.segments.last() {
                Some(segment) => self.segment_shape(segment),
                None => Ok(FieldShape::Dynamic),
            },
            syn::Type::Reference(reference) => self.field_shape(&reference.elem),
            syn::Type::Paren(paren) => self.field_shape(&paren.elem),
            syn::Type::Group(group) => self.field_shape(&group.elem),
            syn::Type::Slice(slice) => self.sequence_shape(&slice.elem),
            syn::Type::Array(array) => self.sequence_shape(&array.elem),
            _ => Ok(FieldShape::Dynamic),
        }
    }

    fn segment_shape(&mut self, segment: &syn::PathSegment) -> Result<FieldShape> {
        let type_name = segment.ident.to_string();
        let args = generic_types(segment);

        let shape = match type_name.as_str() {
            "Option" | "Box" | "Arc" | "Rc" | "Cow" => match args.first() {
                Some(inner) => self.field_shape(inner)?,
                None => FieldShape::Dynamic,
            },
            "Vec" | "VecDeque" | "HashSet" | "BTreeSet" | "IndexSet" => match args.first() {
                Some(inner) => self.sequence_shape(inner)?,
                None => FieldShape::seq(FieldShape::Dynamic),
            },
            "HashMap" | "BTreeMap" | "IndexMap" => match args.get(1) {
                Some(value) => FieldShape::map(self.field_shape(value)?),
                None => FieldShape::map(FieldShape::Dynamic),
            },
            "Value" => FieldShape::Dynamic,
            name => match scalar_kind(name) {
                Some(kind) => FieldShape::Scalar(kind),
                None => self.named_shape(name)?,
            },
        };
        Ok(shape)
    }

    fn sequence_shape(&mut self, elem: &syn::Type) -> Result<FieldShape> {
        let shape = match last_ident(elem).as_deref() {
            Some("u8") => FieldShape::Scalar(ScalarKind::Bytes),
            Some(name) if is_file_type(name) => FieldShape::Scalar(ScalarKind::FileList),
            _ => FieldShape::seq(self.field_shape(elem)?),
        };
        Ok(shape)
    }

    /// Shape of a user-defined type name. Names that do not resolve are
    /// dynamic; broken annotations on a resolved struct are errors.
    fn named_shape(&mut self, name: &str) -> Result<FieldShape> {
        if self.resolving_stack.contains(name) {
            debug!("Circular reference to {}, using a reference", name);
            return Ok(FieldShape::Ref(name.to_string()));
        }

        if let Some(item_enum) = self.find_enum_definition(name) {
            // Unit-only enums serialize as their variant names
            if item_enum.variants.iter().all(|v| v.fields.is_empty()) {
                return Ok(FieldShape::Scalar(ScalarKind::String));
            }
        }

        match self.resolve_model(name) {
            Ok(model) => Ok(FieldShape::Struct(model)),
            Err(Error::UnknownModel(_)) => {
                warn!("Could not resolve type {}; treating it as dynamic", name);
                Ok(FieldShape::Dynamic)
            }
            Err(e) => Err(e),
        }
    }

    /// Collect field annotations from `#[openapi(...)]` and `#[serde(...)]`.
    fn parse_field_tags(field: &str, attrs: &[syn::Attribute]) -> Result<FieldTags> {
        let mut tags = FieldTags::default();
        let mut serde_rename = None;

        for attr in attrs {
            if attr.path().is_ident("openapi") {
                Self::parse_openapi_attr(attr, &mut tags).map_err(|e| Error::MalformedTag {
                    field: field.to_string(),
                    message: e.to_string(),
                })?;
            } else if attr.path().is_ident("serde") {
                Self::parse_serde_attr(attr, &mut serde_rename, &mut tags);
            }
        }

        if tags.json.is_none() {
            tags.json = serde_rename;
        }
        Ok(tags)
    }

    fn parse_openapi_attr(attr: &syn::Attribute, tags: &mut FieldTags) -> syn::Result<()> {
        attr.parse_nested_meta(|meta| {
            let slot = if meta.path.is_ident("json") {
                &mut tags.json
            } else if meta.path.is_ident("form") {
                &mut tags.form
            } else if meta.path.is_ident("query") {
                &mut tags.query
            } else if meta.path.is_ident("uri") {
                &mut tags.uri
            } else if meta.path.is_ident("header") {
                &mut tags.header
            } else if meta.path.is_ident("cookie") {
                &mut tags.cookie
            } else if meta.path.is_ident("binding") {
                &mut tags.binding
            } else if meta.path.is_ident("description") {
                &mut tags.description
            } else if meta.path.is_ident("default") {
                &mut tags.default
            } else if meta.path.is_ident("enum") || meta.path.is_ident("enum_tag") {
                &mut tags.enum_tag
            } else {
                return Err(meta.error("unsupported openapi attribute"));
            };
            let value: syn::LitStr = meta.value()?.parse()?;
            *slot = Some(value.value());
            Ok(())
        })
    }

    /// Only `rename = "..."` and `skip` matter here; anything serde accepts
    /// that we cannot read is left alone.
    fn parse_serde_attr(attr: &syn::Attribute, rename: &mut Option<String>, tags: &mut FieldTags) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                let value: syn::LitStr = meta.value()?.parse()?;
                *rename = Some(value.value());
            } else if meta.path.is_ident("skip") {
                tags.json = Some("-".to_string());
            } else if meta.input.peek(syn::Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
        if let Err(e) = parsed {
            debug!("Ignoring unreadable serde attribute: {}", e);
        }
    }
}

fn generic_types(segment: &syn::PathSegment) -> Vec<&syn::Type> {
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn last_ident(ty: &syn::Type) -> Option<String> {
    match ty {
        syn::Type::Path(type_path) => type_path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

fn is_file_type(name: &str) -> bool {
    matches!(name, "FileUpload" | "UploadedFile")
}

/// Scalar kind of a type name, if it has a fixed primitive mapping.
fn scalar_kind(type_name: &str) -> Option<ScalarKind> {
    let kind = match type_name {
        "String" | "str" | "char" => ScalarKind::String,
        "bool" => ScalarKind::Bool,
        "isize" => ScalarKind::Int,
        "i8" => ScalarKind::Int8,
        "i16" => ScalarKind::Int16,
        "i32" => ScalarKind::Int32,
        "i64" | "i128" => ScalarKind::Int64,
        "usize" => ScalarKind::Uint,
        "u8" => ScalarKind::Uint8,
        "u16" => ScalarKind::Uint16,
        "u32" => ScalarKind::Uint32,
        "u64" | "u128" => ScalarKind::Uint64,
        "f32" => ScalarKind::Float32,
        "f64" => ScalarKind::Float64,
        "DateTime" | "NaiveDateTime" | "NaiveDate" | "OffsetDateTime" | "PrimitiveDateTime"
        | "SystemTime" => ScalarKind::DateTime,
        name if is_file_type(name) => ScalarKind::File,
        _ => return None,
    };
    Some(kind)
}
