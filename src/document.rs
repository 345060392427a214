//! Serialized form of the API model
//!
//! The JSON output format is as follows:
//!
//! ```text
//! {
//!   "categories": {
//!     <category name>: {
//!       "enums": <list of enum names>,
//!       "extension_name": <for an extension, name of the extension>,
//!       "functions": <list of function names>,
//!       "gl_10x_version": <for a GL version, version number times 10>,
//!       "kind": <"GL" for a GL version, "extension" for an extension>,
//!       "types": <list of type names>
//!     }, ...
//!   },
//!   "enums": { <enum name>: { "value_int": <int>, "value_str": <str> }, ... },
//!   "function_alias_sets": [ <sorted list of synonymous names>, ... ],
//!   "functions": {
//!     <function name>: {
//!       "param_names": [..], "param_types": [..], "return_type": <str>
//!     }, ...
//!   },
//!   "types": { <type name>: {}, ... }
//! }
//! ```
//!
//! Every name is unprefixed, every set is a sorted list and object keys are
//! sorted at every level, so identical models always render byte-identical.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{Api, CategoryKind};
use crate::config::OutputFormat;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDocument {
    pub categories: BTreeMap<String, CategoryEntry>,
    pub enums: BTreeMap<String, EnumEntry>,
    pub functions: BTreeMap<String, FunctionEntry>,
    pub function_alias_sets: Vec<Vec<String>>,
    pub types: BTreeMap<String, TypeEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub enums: Vec<String>,
    pub functions: Vec<String>,
    pub types: Vec<String>,
    #[serde(flatten)]
    pub kind: KindEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum KindEntry {
    #[serde(rename = "GL")]
    Gl { gl_10x_version: i64 },
    #[serde(rename = "extension")]
    Extension { extension_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumEntry {
    pub value_int: i128,
    pub value_str: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub param_names: Vec<String>,
    pub param_types: Vec<String>,
    pub return_type: String,
}

/// Types carry no attributes and serialize as `{}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {}

impl From<&CategoryKind> for KindEntry {
    fn from(kind: &CategoryKind) -> Self {
        match kind {
            CategoryKind::GlVersion { version_x10 } => Self::Gl {
                gl_10x_version: *version_x10,
            },
            CategoryKind::Extension { name } => Self::Extension {
                extension_name: name.clone(),
            },
        }
    }
}

impl From<&Api> for ApiDocument {
    fn from(api: &Api) -> Self {
        let categories = api
            .categories()
            .iter()
            .map(|(name, category)| {
                let entry = CategoryEntry {
                    enums: category.enums.iter().cloned().collect(),
                    functions: category.functions.iter().cloned().collect(),
                    types: category.types.iter().cloned().collect(),
                    kind: KindEntry::from(category.kind()),
                };
                (name.clone(), entry)
            })
            .collect();

        let enums = api
            .enums()
            .iter()
            .map(|(name, def)| {
                let entry = EnumEntry {
                    value_int: def.value_int,
                    value_str: def.value_str.clone(),
                };
                (name.clone(), entry)
            })
            .collect();

        let functions = api
            .functions()
            .iter()
            .map(|(name, function)| {
                let entry = FunctionEntry {
                    param_names: function.params.iter().map(|p| p.name.clone()).collect(),
                    param_types: function.params.iter().map(|p| p.type_name.clone()).collect(),
                    return_type: function.return_type.clone(),
                };
                (name.clone(), entry)
            })
            .collect();

        let function_alias_sets = api
            .function_aliases()
            .synonym_sets()
            .into_iter()
            .map(|set| set.iter().cloned().collect())
            .collect();

        let types = api
            .types()
            .keys()
            .map(|name| (name.clone(), TypeEntry::default()))
            .collect();

        Self {
            categories,
            enums,
            functions,
            function_alias_sets,
            types,
        }
    }
}

impl ApiDocument {
    /// Render as JSON with keys sorted at every level.
    pub fn to_json(&self, format: OutputFormat) -> Result<String> {
        let value = sort_keys(serde_json::to_value(self)?);
        let json = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(&value)?,
            OutputFormat::Compact => serde_json::to_string(&value)?,
        };
        Ok(json)
    }

    /// Parse a previously rendered document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Rebuild every object with its keys in lexicographic order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
