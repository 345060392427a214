//! GL API Model
//!
//! Reads the XML description of the GL API (enums, functions and types grouped
//! into core versions and extensions) and turns it into a deduplicated model
//! for code generators.
//!
//! ## Modes
//!
//! - **Build**: [`Api::from_xml`] walks the document once and stops at the
//!   first irreconcilable conflict; [`Api::to_json`] renders the canonical JSON.
//! - **Check**: [`ApiLinter::lint`] runs every structural and naming rule over
//!   the whole document and reports all violations together.
//!
//! ## Input
//!
//! ```text
//! <OpenGLAPI>
//!   <category name="1.5">
//!     <enum name="BUFFER_SIZE" value="0x8764"/>
//!     <type name="sizeiptr"/>
//!     <function name="BindBuffer" alias="BindBufferARB">
//!       <param name="target" type="GLenum"/>
//!       <param name="buffer" type="GLuint"/>
//!     </function>
//!   </category>
//!   <xi:include href="ARB_sync.xml"/>
//! </OpenGLAPI>
//! ```
//!
//! Includes are expanded by [`load_document`] before either mode sees the tree.

pub mod api;
pub mod config;
pub mod document;
pub mod error;
pub mod include;
pub mod lint;
pub mod synonyms;
pub mod types;
pub mod xml;

pub use api::{Api, Category, CategoryKind, EnumDef, Function, Param, TypeDef};
pub use config::{ConverterConfig, OutputFormat};
pub use document::ApiDocument;
pub use error::{ApiError, Result};
pub use include::{expand_includes, load_document};
pub use lint::{ApiLinter, LintReport, Violation, ViolationCode};
pub use synonyms::{SynonymMap, SynonymSet};
pub use types::{decode_enum_value, normalize_type};
pub use xml::{parse_document, XmlElement};
