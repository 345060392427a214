//! API model
//!
//! Aggregates categories, enums, functions and types read from the expanded
//! API description, rejecting the first definition that contradicts an
//! earlier one.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::config::OutputFormat;
use crate::document::ApiDocument;
use crate::error::{ApiError, Result};
use crate::synonyms::SynonymMap;
use crate::types::{decode_enum_value, normalize_type};
use crate::xml::XmlElement;

/// Return type recorded for functions without a `<return>` element
pub const VOID: &str = "void";

/// Whether a category is a core GL version or an extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryKind {
    /// Core version, stored as ten times the version number (`4.5` -> 45)
    GlVersion { version_x10: i64 },
    /// Extension, named by the category name verbatim
    Extension { name: String },
}

impl CategoryKind {
    /// Classify a category by its name: anything that reads as a number is
    /// a GL version, everything else is an extension. Numbers whose scaled
    /// version does not fit an `i64` count as extensions.
    pub fn classify(category_name: &str) -> Self {
        let scaled = category_name
            .trim()
            .parse::<f64>()
            .map(|version| (version * 10.0).round());
        match scaled {
            Ok(x10) if x10.is_finite() && x10 >= i64::MIN as f64 && x10 < i64::MAX as f64 => {
                Self::GlVersion {
                    version_x10: x10 as i64,
                }
            }
            _ => Self::Extension {
                name: category_name.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub kind: CategoryKind,
    pub enums: BTreeSet<String>,
    pub functions: BTreeSet<String>,
    pub types: BTreeSet<String>,
}

impl Category {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: CategoryKind::classify(name),
            enums: BTreeSet::new(),
            functions: BTreeSet::new(),
            types: BTreeSet::new(),
        }
    }

    pub fn kind(&self) -> &CategoryKind {
        &self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    /// Literal exactly as written in the XML
    pub value_str: String,
    pub value_int: i128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    /// Canonical type string
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: String,
}

impl Function {
    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn param_types(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.type_name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
}

/// The deduplicated API model
#[derive(Debug, Default)]
pub struct Api {
    categories: BTreeMap<String, Category>,
    enums: BTreeMap<String, EnumDef>,
    functions: BTreeMap<String, Function>,
    function_aliases: SynonymMap,
    types: BTreeMap<String, TypeDef>,
}

impl Api {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from a fully expanded document.
    pub fn from_xml(root: &XmlElement) -> Result<Self> {
        let mut api = Self::new();
        api.read_xml(root)?;
        info!(
            categories = api.categories.len(),
            enums = api.enums.len(),
            functions = api.functions.len(),
            types = api.types.len(),
            "built API model"
        );
        Ok(api)
    }

    /// Add every category found below `root`, in document order.
    pub fn read_xml(&mut self, root: &XmlElement) -> Result<()> {
        for category_xml in root.descendants_named("category") {
            self.read_category(category_xml)?;
        }
        Ok(())
    }

    fn read_category(&mut self, category_xml: &XmlElement) -> Result<()> {
        let category_name = category_xml.require_attr("name")?;
        if self.categories.contains_key(category_name) {
            return Err(ApiError::DuplicateCategory {
                name: category_name.to_string(),
            });
        }

        let mut category = Category::new(category_name);
        debug!(category = %category_name, kind = ?category.kind, "reading category");

        for enum_xml in category_xml.children_named("enum") {
            category.enums.insert(self.read_enum(enum_xml)?);
        }
        for function_xml in category_xml.children_named("function") {
            category
                .functions
                .insert(self.read_function(category_name, function_xml)?);
        }
        for type_xml in category_xml.children_named("type") {
            category.types.insert(self.read_type(type_xml)?);
        }

        self.categories.insert(category.name.clone(), category);
        Ok(())
    }

    fn read_enum(&mut self, enum_xml: &XmlElement) -> Result<String> {
        let name = enum_xml.require_attr("name")?;
        let value_str = enum_xml.require_attr("value")?;

        match self.enums.get(name) {
            Some(existing) if existing.value_str != value_str => {
                return Err(ApiError::InconsistentEnum {
                    name: name.to_string(),
                    existing: existing.value_str.clone(),
                    new: value_str.to_string(),
                });
            }
            Some(_) => {}
            None => {
                let value_int = decode_enum_value(name, value_str)?;
                self.enums.insert(
                    name.to_string(),
                    EnumDef {
                        name: name.to_string(),
                        value_str: value_str.to_string(),
                        value_int,
                    },
                );
            }
        }
        Ok(name.to_string())
    }

    fn read_function(&mut self, category_name: &str, function_xml: &XmlElement) -> Result<String> {
        let name = function_xml.require_attr("name")?;

        let returns: Vec<&XmlElement> = function_xml.children_named("return").collect();
        let return_type = match returns.as_slice() {
            [] => VOID.to_string(),
            [single] => normalize_type(single.require_attr("type")?),
            _ => {
                return Err(ApiError::MultipleReturns {
                    function: name.to_string(),
                    category: category_name.to_string(),
                });
            }
        };

        let params = function_xml
            .children_named("param")
            .map(|param_xml| -> Result<Param> {
                Ok(Param {
                    name: param_xml.require_attr("name")?.to_string(),
                    type_name: normalize_type(param_xml.require_attr("type")?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        match self.functions.get(name) {
            Some(existing) => check_signature(existing, &params, &return_type)?,
            None => {
                self.functions.insert(
                    name.to_string(),
                    Function {
                        name: name.to_string(),
                        params,
                        return_type,
                    },
                );
            }
        }

        match function_xml.attr("alias") {
            Some(alias) => {
                self.function_aliases.add_alias(name, alias);
            }
            None => {
                self.function_aliases.add_singleton(name);
            }
        }
        Ok(name.to_string())
    }

    fn read_type(&mut self, type_xml: &XmlElement) -> Result<String> {
        let name = type_xml.require_attr("name")?;
        // Types carry no payload, so a repeat declaration cannot conflict
        self.types
            .entry(name.to_string())
            .or_insert_with(|| TypeDef {
                name: name.to_string(),
            });
        Ok(name.to_string())
    }

    pub fn categories(&self) -> &BTreeMap<String, Category> {
        &self.categories
    }

    pub fn enums(&self) -> &BTreeMap<String, EnumDef> {
        &self.enums
    }

    pub fn functions(&self) -> &BTreeMap<String, Function> {
        &self.functions
    }

    pub fn function_aliases(&self) -> &SynonymMap {
        &self.function_aliases
    }

    pub fn types(&self) -> &BTreeMap<String, TypeDef> {
        &self.types
    }

    /// Snapshot of the model in its serialized shape
    pub fn to_document(&self) -> ApiDocument {
        ApiDocument::from(self)
    }

    /// Canonical pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        self.to_json_with(OutputFormat::Pretty)
    }

    pub fn to_json_with(&self, format: OutputFormat) -> Result<String> {
        self.to_document().to_json(format)
    }
}

fn check_signature(existing: &Function, params: &[Param], return_type: &str) -> Result<()> {
    if existing.return_type != return_type {
        return Err(ApiError::InconsistentFunction {
            name: existing.name.clone(),
            field: "return types",
            existing: existing.return_type.clone(),
            new: return_type.to_string(),
        });
    }

    let new_types: Vec<&str> = params.iter().map(|p| p.type_name.as_str()).collect();
    if existing.param_types() != new_types {
        return Err(ApiError::InconsistentFunction {
            name: existing.name.clone(),
            field: "param types",
            existing: format!("({})", existing.param_types().join(", ")),
            new: format!("({})", new_types.join(", ")),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;
    use rstest::rstest;

    fn build(xml: &str) -> Result<Api> {
        Api::from_xml(&parse_document(xml).unwrap())
    }

    #[rstest]
    #[case("1.0", CategoryKind::GlVersion { version_x10: 10 })]
    #[case("4.5", CategoryKind::GlVersion { version_x10: 45 })]
    #[case("2.1", CategoryKind::GlVersion { version_x10: 21 })]
    #[case("GL_ARB_sample", CategoryKind::Extension { name: "GL_ARB_sample".to_string() })]
    #[case("ARB_sample", CategoryKind::Extension { name: "ARB_sample".to_string() })]
    #[case("nan", CategoryKind::Extension { name: "nan".to_string() })]
    #[case("inf", CategoryKind::Extension { name: "inf".to_string() })]
    #[case("1e18", CategoryKind::Extension { name: "1e18".to_string() })]
    #[case("1e300", CategoryKind::Extension { name: "1e300".to_string() })]
    #[case("1e17", CategoryKind::GlVersion { version_x10: 1_000_000_000_000_000_000 })]
    fn test_classify_category(#[case] name: &str, #[case] expected: CategoryKind) {
        assert_eq!(CategoryKind::classify(name), expected);
    }

    #[test]
    fn test_build_basic_model() {
        let api = build(
            r#"<OpenGLAPI>
                 <category name="1.0">
                   <type name="float"/>
                   <enum name="ONE" value="1"/>
                   <function name="ClearColor">
                     <param name="red" type="GLclampf"/>
                   </function>
                   <function name="GetString">
                     <param name="name" type="GLenum"/>
                     <return type="const GLubyte*"/>
                   </function>
                 </category>
               </OpenGLAPI>"#,
        )
        .unwrap();

        let core = &api.categories()["1.0"];
        assert_eq!(core.kind(), &CategoryKind::GlVersion { version_x10: 10 });
        assert!(core.enums.contains("ONE"));
        assert!(core.types.contains("float"));
        assert_eq!(core.functions.len(), 2);

        assert_eq!(api.enums()["ONE"].value_int, 1);
        assert_eq!(api.functions()["ClearColor"].return_type, VOID);
        assert_eq!(api.functions()["GetString"].return_type, "const GLubyte *");
        assert_eq!(api.function_aliases().len(), 2);
    }

    #[test]
    fn test_repeated_declarations_are_shared() {
        let api = build(
            r#"<OpenGLAPI>
                 <category name="GL_ARB_a">
                   <enum name="SAMPLES" value="0x80A9"/>
                   <function name="Foo"><param name="x" type="GLint"/></function>
                   <type name="int"/>
                 </category>
                 <category name="GL_ARB_b">
                   <enum name="SAMPLES" value="0x80A9"/>
                   <function name="Foo"><param name="renamed" type="GLint "/></function>
                   <type name="int"/>
                 </category>
               </OpenGLAPI>"#,
        )
        .unwrap();

        assert_eq!(api.enums().len(), 1);
        assert_eq!(api.functions().len(), 1);
        assert_eq!(api.types().len(), 1);
        // first declaration wins for parameter names
        assert_eq!(api.functions()["Foo"].param_names(), vec!["x"]);
        assert!(api.categories()["GL_ARB_b"].functions.contains("Foo"));
    }

    #[test]
    fn test_duplicate_category() {
        let err = build(r#"<r><category name="1.0"/><category name="1.0"/></r>"#).unwrap_err();
        assert!(matches!(err, ApiError::DuplicateCategory { ref name } if name == "1.0"));
    }

    #[test]
    fn test_inconsistent_enum_uses_literal_equality() {
        let err = build(
            r#"<r>
                 <category name="1.0"><enum name="FOO" value="0x10"/></category>
                 <category name="1.1"><enum name="FOO" value="16"/></category>
               </r>"#,
        )
        .unwrap_err();
        match err {
            ApiError::InconsistentEnum { name, existing, new } => {
                assert_eq!(name, "FOO");
                assert_eq!(existing, "0x10");
                assert_eq!(new, "16");
            }
            other => panic!("Expected InconsistentEnum, got {:?}", other),
        }
    }

    #[test]
    fn test_inconsistent_return_type() {
        let err = build(
            r#"<r>
                 <category name="1.0"><function name="Foo"/></category>
                 <category name="1.1"><function name="Foo"><return type="GLint"/></function></category>
               </r>"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ApiError::InconsistentFunction { field: "return types", .. }
        ));
    }

    #[test]
    fn test_inconsistent_param_arity() {
        let err = build(
            r#"<r>
                 <category name="1.0"><function name="Foo"><param name="a" type="GLint"/></function></category>
                 <category name="1.1"><function name="Foo"/></category>
               </r>"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ApiError::InconsistentFunction { field: "param types", .. }
        ));
    }

    #[test]
    fn test_multiple_returns() {
        let err = build(
            r#"<r><category name="1.0">
                 <function name="Foo"><return type="GLint"/><return type="GLuint"/></function>
               </category></r>"#,
        )
        .unwrap_err();
        match err {
            ApiError::MultipleReturns { function, category } => {
                assert_eq!(function, "Foo");
                assert_eq!(category, "1.0");
            }
            other => panic!("Expected MultipleReturns, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_enum_value_is_fatal() {
        let err = build(r#"<r><category name="1.0"><enum name="BAD" value="0xZZ"/></category></r>"#)
            .unwrap_err();
        assert!(matches!(err, ApiError::MalformedEnumValue { .. }));
    }

    #[test]
    fn test_missing_attribute() {
        let err = build(r#"<r><category name="1.0"><enum name="NOVALUE"/></category></r>"#).unwrap_err();
        assert!(matches!(err, ApiError::MissingAttribute { attribute: "value", .. }));
    }

    #[test]
    fn test_alias_chain_forms_one_set() {
        let api = build(
            r#"<r>
                 <category name="GL_ARB_a"><function name="Foo" alias="Bar"/></category>
                 <category name="GL_ARB_b"><function name="Bar" alias="Baz"/></category>
                 <category name="GL_ARB_c"><function name="Qux"/></category>
               </r>"#,
        )
        .unwrap();

        let sets: Vec<Vec<&str>> = api
            .function_aliases()
            .synonym_sets()
            .into_iter()
            .map(|s| s.iter().map(String::as_str).collect())
            .collect();
        assert_eq!(sets, vec![vec!["Bar", "Baz", "Foo"], vec!["Qux"]]);
    }
}
