//! dnsbl Core Library
//!
//! Domain model shared by the dnsbl pipeline stages.
//!
//! # Modules
//!
//! - `types`: rule types, source formats and source descriptors
//! - `whitelist`: whitelist parsing and exact / suffix / keyword suppression
//! - `collection`: per-rule-type domain accumulator

pub mod collection;
pub mod types;
pub mod whitelist;

// Re-export commonly used types
pub use collection::CategorizedDomains;
pub use types::{RuleType, SourceDescriptor, SourceFormat, UnknownRuleType};
pub use whitelist::{Suppression, Whitelist};
