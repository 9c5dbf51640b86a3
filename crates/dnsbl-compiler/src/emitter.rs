//! Plain-text and rule-set document output.
//!
//! Both forms are sorted ascending so identical inputs produce identical
//! bytes.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use dnsbl_core::{CategorizedDomains, RuleType};

use crate::error::WriteError;

/// Rule-set document version understood by the downstream compiler.
pub const RULE_SET_VERSION: u32 = 3;

/// `{"version": 3, "rules": [{"domain": [...]}, {"domain_suffix": [...]}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetDocument {
    pub version: u32,
    pub rules: Vec<BTreeMap<String, Vec<String>>>,
}

/// Sorted, deduplicated domains, one per line.
pub fn emit_plain<'a, I>(domains: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let sorted: BTreeSet<&str> = domains.into_iter().collect();
    let mut out = String::new();
    for domain in sorted {
        out.push_str(domain);
        out.push('\n');
    }
    out
}

/// One rule object per non-empty category, in type-name order.
pub fn emit_structured(domains: &CategorizedDomains) -> RuleSetDocument {
    let rules = domains
        .iter()
        .map(|(rule_type, bucket)| rule_object(rule_type, bucket))
        .collect();

    RuleSetDocument {
        version: RULE_SET_VERSION,
        rules,
    }
}

/// Document holding a single category, used for per-source output.
pub fn emit_single(rule_type: RuleType, domains: &BTreeSet<String>) -> RuleSetDocument {
    let rules = if domains.is_empty() {
        Vec::new()
    } else {
        vec![rule_object(rule_type, domains)]
    };

    RuleSetDocument {
        version: RULE_SET_VERSION,
        rules,
    }
}

fn rule_object(rule_type: RuleType, domains: &BTreeSet<String>) -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(rule_type.as_str().to_string(), domains.iter().cloned().collect())])
}

/// Render a document as JSON with four-space indentation.
pub fn to_json(document: &RuleSetDocument) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut ser)?;
    String::from_utf8(buf)
        .map_err(|e| serde_json::Error::io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Write `contents` next to `path` and rename it into place, creating
/// parent directories as needed. A failed write leaves any previous file
/// untouched.
pub fn write_output(path: &Path, contents: &str) -> Result<(), WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let tmp = tmp_path(path);
    let result = fs::write(&tmp, contents).and_then(|()| fs::rename(&tmp, path));
    if let Err(source) = result {
        let _ = fs::remove_file(&tmp);
        return Err(WriteError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    log::debug!("wrote '{}' ({} bytes)", path.display(), contents.len());
    Ok(())
}

pub fn write_plain<'a, I>(path: &Path, domains: I) -> Result<(), WriteError>
where
    I: IntoIterator<Item = &'a str>,
{
    write_output(path, &emit_plain(domains))
}

pub fn write_document(path: &Path, document: &RuleSetDocument) -> Result<(), WriteError> {
    let json = to_json(document).map_err(|source| WriteError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    write_output(path, &json)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CategorizedDomains {
        let mut domains = CategorizedDomains::new();
        domains.insert(RuleType::DomainSuffix, "tracker.example");
        domains.insert(RuleType::Domain, "zeta.com");
        domains.insert(RuleType::Domain, "alpha.com");
        domains.insert(RuleType::DomainKeyword, "casino");
        domains
    }

    #[test]
    fn plain_is_sorted_and_deduplicated() {
        let text = emit_plain(["b.com", "a.com", "b.com"]);
        assert_eq!(text, "a.com\nb.com\n");
        assert_eq!(emit_plain(Vec::<&str>::new()), "");
    }

    #[test]
    fn structured_orders_categories_by_name() {
        let document = emit_structured(&sample());
        assert_eq!(document.version, 3);

        let keys: Vec<&str> = document
            .rules
            .iter()
            .flat_map(|rule| rule.keys().map(String::as_str))
            .collect();
        assert_eq!(keys, vec!["domain", "domain_keyword", "domain_suffix"]);
        assert_eq!(document.rules[0]["domain"], vec!["alpha.com", "zeta.com"]);
    }

    #[test]
    fn structured_skips_empty_categories() {
        let mut domains = CategorizedDomains::new();
        domains.insert(RuleType::Domain, "bad.com");
        let document = emit_structured(&domains);
        assert_eq!(document.rules.len(), 1);
        assert!(emit_structured(&CategorizedDomains::new()).rules.is_empty());
    }

    #[test]
    fn json_layout_is_stable() {
        let mut domains = CategorizedDomains::new();
        domains.insert(RuleType::Domain, "bad.com");
        let json = to_json(&emit_structured(&domains)).unwrap();
        let expected = "{\n    \"version\": 3,\n    \"rules\": [\n        {\n            \"domain\": [\n                \"bad.com\"\n            ]\n        }\n    ]\n}";
        assert_eq!(json, expected);
        assert_eq!(to_json(&emit_structured(&domains)).unwrap(), json);
    }

    #[test]
    fn json_parses_back_to_the_same_document() {
        let document = emit_structured(&sample());
        let json = to_json(&document).unwrap();
        let parsed: RuleSetDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, document);
    }

    #[test]
    fn single_category_document() {
        let domains: BTreeSet<String> = ["b.net", "a.net"].iter().map(|s| s.to_string()).collect();
        let document = emit_single(RuleType::DomainSuffix, &domains);
        assert_eq!(document.rules.len(), 1);
        assert_eq!(document.rules[0]["domain_suffix"], vec!["a.net", "b.net"]);
        assert!(emit_single(RuleType::Domain, &BTreeSet::new()).rules.is_empty());
    }

    #[test]
    fn write_output_creates_parent_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domains").join("list.txt");

        write_plain(&path, ["b.com", "a.com"]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a.com\nb.com\n");

        write_plain(&path, ["c.com"]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "c.com\n");
        assert!(!dir.path().join("domains").join("list.txt.tmp").exists());
    }

    #[test]
    fn write_failure_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let err = write_plain(&blocker.join("out.txt"), ["a.com"]).unwrap_err();
        assert!(matches!(err, WriteError::CreateDir { .. }));
        assert!(err.to_string().contains("file"));
    }
}
