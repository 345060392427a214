//! API Description Linting
//!
//! Checks the expanded XML tree for every structural and naming problem at
//! once, instead of stopping at the first one like the model builder does.
//!
//! ## Rules
//! 1. **Nesting**: children must be allowed for their parent tag
//! 2. **Category names**: `digit.digit` or `GL_` followed by identifier chars
//! 3. **Type names**: declared without the `GL` prefix
//! 4. **Enums**: unprefixed names, decodable values, one value per name
//! 5. **Function names**: declared without the `gl` prefix
//! 6. **Type usage**: every token of every parameter and return type is known

pub mod nesting;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use regex::Regex;
use tracing::info;

use crate::config::{ConverterConfig, LintConfig, NamingConfig};
use crate::error::{ApiError, Result};
use crate::types::{decode_enum_value, type_tokens};
use crate::xml::XmlElement;

pub use nesting::check_nesting;

/// Diagnostic code for categorizing violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationCode {
    /// Child element not allowed under its parent
    InvalidNesting,
    /// Element nested beyond the configured depth
    NestingTooDeep,
    /// Category name is neither a version nor an extension name
    InvalidCategoryName,
    /// Type name still carries the API prefix
    PrefixedTypeName,
    /// Enum name still carries the API prefix
    PrefixedEnumName,
    /// Enum value is not an integer literal
    MalformedEnumValue,
    /// Same enum declared with different values
    InconsistentEnum,
    /// Function name still carries the API prefix
    PrefixedFunctionName,
    /// Parameter or return type uses an unrecognized token
    UnknownType,
    /// Function declares more than one return element
    MultipleReturns,
    /// Required attribute is absent
    MissingAttribute,
}

impl ViolationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidNesting => "E001",
            Self::NestingTooDeep => "E002",
            Self::InvalidCategoryName => "E003",
            Self::PrefixedTypeName => "E004",
            Self::PrefixedEnumName => "E005",
            Self::MalformedEnumValue => "E006",
            Self::InconsistentEnum => "E007",
            Self::PrefixedFunctionName => "E008",
            Self::UnknownType => "E009",
            Self::MultipleReturns => "E010",
            Self::MissingAttribute => "E011",
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single rule violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub code: ViolationCode,
    /// Offending element, e.g. `<enum name="ONE">`
    pub element: String,
    pub message: String,
    /// Extra lines, e.g. the distinct values of an inconsistent enum
    pub context: Vec<String>,
}

impl Violation {
    pub fn new(code: ViolationCode, element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            element: element.into(),
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.context = context;
        self
    }

    fn missing_attribute(element: &XmlElement, attribute: &str) -> Self {
        Self::new(
            ViolationCode::MissingAttribute,
            element.short_desc(),
            format!("{} has no {:?} attribute", element.short_desc(), attribute),
        )
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error [{}]: {}", self.code, self.message)?;
        for line in &self.context {
            write!(f, "\n  {}", line)?;
        }
        Ok(())
    }
}

/// Counts of what the linter looked at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeclarationStats {
    pub categories: usize,
    pub enum_elements: usize,
    pub distinct_enums: usize,
    pub functions: usize,
    pub types: usize,
}

impl fmt::Display for DeclarationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found {} categories", self.categories)?;
        writeln!(
            f,
            "Found {} enum declarations ({} elements)",
            self.distinct_enums, self.enum_elements
        )?;
        writeln!(f, "Found {} function declarations", self.functions)?;
        write!(f, "Found {} type declarations", self.types)
    }
}

/// Result of linting a document
#[derive(Debug, Default)]
pub struct LintReport {
    pub violations: Vec<Violation>,
    pub stats: DeclarationStats,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn count(&self, code: ViolationCode) -> usize {
        self.violations.iter().filter(|v| v.code == code).count()
    }
}

/// The API description linter
pub struct ApiLinter {
    naming: NamingConfig,
    max_depth: usize,
    category_pattern: Regex,
    qualifiers: HashSet<String>,
    base_types: HashSet<String>,
    struct_tags: HashSet<String>,
}

impl ApiLinter {
    pub fn new(config: &ConverterConfig) -> Result<Self> {
        Self::with_settings(&config.naming, &config.lint)
    }

    pub fn with_settings(naming: &NamingConfig, lint: &LintConfig) -> Result<Self> {
        let category_pattern = Regex::new(&format!(
            r"^(?:[0-9]\.[0-9]|{}[A-Za-z0-9_]+)$",
            regex::escape(&naming.enum_prefix)
        ))
        .map_err(|e| ApiError::Pattern(e.to_string()))?;

        Ok(Self {
            naming: naming.clone(),
            max_depth: lint.max_depth,
            category_pattern,
            qualifiers: lint.qualifiers.iter().cloned().collect(),
            base_types: lint.base_types.iter().cloned().collect(),
            struct_tags: lint.struct_tags.iter().cloned().collect(),
        })
    }

    /// Run every rule over the document.
    pub fn lint(&self, root: &XmlElement) -> LintReport {
        let mut report = LintReport::default();

        report.violations.extend(check_nesting(root, self.max_depth));
        report.violations.extend(self.check_categories(root, &mut report.stats));

        let (type_violations, known_types) = self.check_types(root, &mut report.stats);
        report.violations.extend(type_violations);

        report.violations.extend(self.check_enums(root, &mut report.stats));
        report.violations.extend(self.check_functions(root, &mut report.stats));
        report.violations.extend(self.check_type_usage(root, &known_types));

        info!(
            violations = report.violations.len(),
            enums = report.stats.distinct_enums,
            functions = report.stats.functions,
            "lint finished"
        );
        report
    }

    pub fn check_categories(&self, root: &XmlElement, stats: &mut DeclarationStats) -> Vec<Violation> {
        let mut violations = Vec::new();
        for category in root.descendants_named("category") {
            stats.categories += 1;
            let Some(name) = category.name() else {
                violations.push(Violation::missing_attribute(category, "name"));
                continue;
            };
            if !self.category_pattern.is_match(name) {
                violations.push(Violation::new(
                    ViolationCode::InvalidCategoryName,
                    category.short_desc(),
                    format!("Invalid category: {:?}", name),
                ));
            }
        }
        violations
    }

    /// Check type names and collect the prefixed names they declare.
    pub fn check_types(
        &self,
        root: &XmlElement,
        stats: &mut DeclarationStats,
    ) -> (Vec<Violation>, HashSet<String>) {
        let prefix = &self.naming.type_prefix;
        let mut violations = Vec::new();
        let mut known_types = HashSet::new();

        for type_xml in root.descendants_named("type") {
            stats.types += 1;
            let Some(name) = type_xml.name() else {
                violations.push(Violation::missing_attribute(type_xml, "name"));
                continue;
            };
            if name.starts_with(prefix.as_str()) {
                violations.push(Violation::new(
                    ViolationCode::PrefixedTypeName,
                    type_xml.short_desc(),
                    format!("Type name {:?} should not start with {:?}", name, prefix),
                ));
            }
            known_types.insert(format!("{}{}", prefix, name));
        }
        (violations, known_types)
    }

    pub fn check_enums(&self, root: &XmlElement, stats: &mut DeclarationStats) -> Vec<Violation> {
        let prefix = &self.naming.enum_prefix;
        let mut violations = Vec::new();
        let mut values_by_name: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

        for enum_xml in root.descendants_named("enum") {
            stats.enum_elements += 1;
            let Some(name) = enum_xml.name() else {
                violations.push(Violation::missing_attribute(enum_xml, "name"));
                continue;
            };
            if name.starts_with(prefix.as_str()) {
                violations.push(Violation::new(
                    ViolationCode::PrefixedEnumName,
                    enum_xml.short_desc(),
                    format!("Enum name {:?} should not start with {:?}", name, prefix),
                ));
            }
            let Some(value) = enum_xml.attr("value") else {
                violations.push(Violation::missing_attribute(enum_xml, "value"));
                continue;
            };
            if let Err(err) = decode_enum_value(name, value) {
                violations.push(Violation::new(
                    ViolationCode::MalformedEnumValue,
                    enum_xml.short_desc(),
                    err.to_string(),
                ));
            }
            values_by_name.entry(name).or_default().insert(value);
        }

        stats.distinct_enums = values_by_name.len();
        for (name, values) in values_by_name {
            if values.len() > 1 {
                violations.push(
                    Violation::new(
                        ViolationCode::InconsistentEnum,
                        format!("<enum name=\"{}\">", name),
                        format!("inconsistent definitions of enum {:?}:", name),
                    )
                    .with_context(values.into_iter().map(String::from).collect()),
                );
            }
        }
        violations
    }

    pub fn check_functions(&self, root: &XmlElement, stats: &mut DeclarationStats) -> Vec<Violation> {
        let prefix = &self.naming.function_prefix;
        let mut violations = Vec::new();

        for function in root.descendants_named("function") {
            stats.functions += 1;
            let Some(name) = function.name() else {
                violations.push(Violation::missing_attribute(function, "name"));
                continue;
            };
            if name.starts_with(prefix.as_str()) {
                violations.push(Violation::new(
                    ViolationCode::PrefixedFunctionName,
                    function.short_desc(),
                    format!("Function name {:?} should not start with {:?}", name, prefix),
                ));
            }
        }
        violations
    }

    /// Check every parameter and return type against the known vocabulary.
    pub fn check_type_usage(&self, root: &XmlElement, known_types: &HashSet<String>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for function in root.descendants_named("function") {
            let function_name = function.name().unwrap_or("<unnamed>");

            if function.children_named("return").count() > 1 {
                violations.push(Violation::new(
                    ViolationCode::MultipleReturns,
                    function.short_desc(),
                    format!("Function {} declares more than one return type", function_name),
                ));
            }

            for typed in function
                .children
                .iter()
                .filter(|c| c.tag == "param" || c.tag == "return")
            {
                let Some(type_str) = typed.attr("type") else {
                    violations.push(Violation::missing_attribute(typed, "type"));
                    continue;
                };
                if let Some(token) = self.unknown_token(type_str, known_types) {
                    violations.push(Violation::new(
                        ViolationCode::UnknownType,
                        typed.short_desc(),
                        format!(
                            "Function {} uses unrecognized type {:?} ({:?})",
                            function_name, type_str, token
                        ),
                    ));
                }
            }
        }
        violations
    }

    /// First token of `type_str` that is not part of the allowed vocabulary.
    ///
    /// Only that first token is reported; a type string with several unknown
    /// tokens still yields a single violation.
    fn unknown_token<'a>(&self, type_str: &'a str, known_types: &HashSet<String>) -> Option<&'a str> {
        let mut tokens = type_tokens(type_str).into_iter();
        while let Some(token) = tokens.next() {
            if token == "struct" {
                match tokens.next() {
                    Some(tag) if self.struct_tags.contains(tag) => continue,
                    Some(tag) => return Some(tag),
                    None => return Some(token),
                }
            }
            if self.qualifiers.contains(token)
                || self.base_types.contains(token)
                || known_types.contains(token)
            {
                continue;
            }
            return Some(token);
        }
        None
    }
}
