//! Converter configuration
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (glapi.toml)
//! - Environment variables (GLAPI__*)
//!
//! ## Example config file (glapi.toml):
//! ```toml
//! [naming]
//! enum_prefix = "GL_"
//! function_prefix = "gl"
//! type_prefix = "GL"
//!
//! [lint]
//! base_types = ["void", "char", "int", "float", "double"]
//! struct_tags = ["_cl_context", "_cl_event"]
//! max_depth = 64
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration for the converter and the linter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Prefixes the source XML is expected to have stripped
    #[serde(default)]
    pub naming: NamingConfig,

    /// Linter settings
    #[serde(default)]
    pub lint: LintConfig,

    /// Serializer settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// API name prefixes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Prefix of enum names in C headers (and of extension categories)
    #[serde(default = "default_enum_prefix")]
    pub enum_prefix: String,

    /// Prefix of function names in C headers
    #[serde(default = "default_function_prefix")]
    pub function_prefix: String,

    /// Prefix of type names in C headers
    #[serde(default = "default_type_prefix")]
    pub type_prefix: String,
}

/// Type-usage rule settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Tokens allowed anywhere in a type spelling
    #[serde(default = "default_qualifiers")]
    pub qualifiers: Vec<String>,

    /// Primitive C types accepted without a `<type>` declaration
    #[serde(default = "default_base_types")]
    pub base_types: Vec<String>,

    /// Opaque struct tags that may follow the `struct` keyword
    #[serde(default = "default_struct_tags")]
    pub struct_tags: Vec<String>,

    /// Deepest element nesting accepted by the nesting rule
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Serializer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

// Default value functions
fn default_enum_prefix() -> String {
    "GL_".to_string()
}

fn default_function_prefix() -> String {
    "gl".to_string()
}

fn default_type_prefix() -> String {
    "GL".to_string()
}

fn default_qualifiers() -> Vec<String> {
    ["const", "*"].iter().map(|s| s.to_string()).collect()
}

fn default_base_types() -> Vec<String> {
    [
        "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_struct_tags() -> Vec<String> {
    ["_cl_context", "_cl_event"].iter().map(|s| s.to_string()).collect()
}

fn default_max_depth() -> usize {
    64
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            enum_prefix: default_enum_prefix(),
            function_prefix: default_function_prefix(),
            type_prefix: default_type_prefix(),
        }
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            qualifiers: default_qualifiers(),
            base_types: default_base_types(),
            struct_tags: default_struct_tags(),
            max_depth: default_max_depth(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, additionally reading a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["glapi.toml", ".glapi.toml", "config/glapi.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("org", "glapi", "glapi-model") {
            let xdg_config = config_dir.config_dir().join("glapi.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // GLAPI__OUTPUT__FORMAT=compact and friends
        builder = builder.add_source(
            Environment::with_prefix("GLAPI")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
