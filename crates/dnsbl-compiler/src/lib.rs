//! dnsbl Blocklist Compiler
//!
//! This crate turns upstream blocklist feeds into whitelisted, categorized
//! rule-set documents.

pub mod config;
pub mod emitter;
pub mod error;
pub mod merge;
pub mod parser;

pub use config::SourceCatalog;
pub use emitter::{emit_plain, emit_single, emit_structured, to_json, RuleSetDocument, RULE_SET_VERSION};
pub use error::{ConfigError, ParseError, WriteError};
pub use merge::{load_intermediate_dir, merge, merge_into, MergeStats, INTERMEDIATE_SUFFIX};
pub use parser::{parse_domains, parse_source_file};
