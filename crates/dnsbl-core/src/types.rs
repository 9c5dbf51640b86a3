//! Core type definitions for dnsbl
//!
//! These types describe upstream feeds and the rule categories understood by
//! the downstream rule-set format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Rule Types (keys of the rule-set document)
// =============================================================================

/// Classification of a blocked domain entry.
///
/// Variant order matches the lexicographic order of the type names, so the
/// derived `Ord` can be used directly for deterministic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Exact match only
    Domain,
    /// Substring match anywhere in the queried name
    DomainKeyword,
    /// Matches the domain and all of its subdomains
    DomainSuffix,
}

impl RuleType {
    pub const ALL: [RuleType; 3] = [Self::Domain, Self::DomainKeyword, Self::DomainSuffix];

    /// Key used for this type in the rule-set document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::DomainKeyword => "domain_keyword",
            Self::DomainSuffix => "domain_suffix",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rule type {0:?} (expected domain, domain_suffix or domain_keyword)")]
pub struct UnknownRuleType(pub String);

impl FromStr for RuleType {
    type Err = UnknownRuleType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "domain" => Ok(Self::Domain),
            "domain_suffix" => Ok(Self::DomainSuffix),
            "domain_keyword" => Ok(Self::DomainKeyword),
            _ => Err(UnknownRuleType(s.to_string())),
        }
    }
}

// =============================================================================
// Source Formats
// =============================================================================

/// Layout of a raw upstream feed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// `/etc/hosts` style: `0.0.0.0 <domain>`
    Hosts,
    /// One domain per line, `#` comments
    Domains,
    /// `server=/<domain>/` or `local=/<domain>/` directives
    Dnsmasq,
}

impl SourceFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hosts => "hosts",
            Self::Domains => "domains",
            Self::Dnsmasq => "dnsmasq",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Source Descriptor
// =============================================================================

/// Static description of one upstream feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub name: String,
    pub format: SourceFormat,
    /// Token index of the domain on a hosts line.
    pub domain_index: usize,
    /// `None` when the configured type is missing or not recognized. Such
    /// sources are still parsed but never contribute to the merged rule set.
    pub rule_type: Option<RuleType>,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, format: SourceFormat, domain_index: usize, rule_type: RuleType) -> Self {
        Self {
            name: name.into(),
            format,
            domain_index,
            rule_type: Some(rule_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_type_order_is_lexicographic() {
        let mut names: Vec<&str> = RuleType::ALL.iter().map(|t| t.as_str()).collect();
        let expected = names.clone();
        names.sort();
        assert_eq!(names, expected);

        let mut types = vec![RuleType::DomainSuffix, RuleType::Domain, RuleType::DomainKeyword];
        types.sort();
        assert_eq!(types, RuleType::ALL.to_vec());
    }

    #[test]
    fn parses_rule_type_names() {
        assert_eq!("domain".parse::<RuleType>(), Ok(RuleType::Domain));
        assert_eq!(" Domain_Suffix ".parse::<RuleType>(), Ok(RuleType::DomainSuffix));
        assert_eq!("domain_keyword".parse::<RuleType>(), Ok(RuleType::DomainKeyword));
        assert!("domain_regex".parse::<RuleType>().is_err());
        assert!("".parse::<RuleType>().is_err());
    }

    #[test]
    fn display_matches_document_keys() {
        assert_eq!(RuleType::DomainSuffix.to_string(), "domain_suffix");
        assert_eq!(SourceFormat::Dnsmasq.to_string(), "dnsmasq");
    }
}
