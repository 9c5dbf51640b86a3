//! Rule classification and whitelist-aware merging.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use dnsbl_core::{CategorizedDomains, RuleType, Suppression, Whitelist};

use crate::config::SourceCatalog;
use crate::parser::read_text;

/// File name suffix of the per-source intermediate domain lists.
pub const INTERMEDIATE_SUFFIX: &str = "_domains.txt";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub sources_merged: usize,
    pub sources_skipped: usize,
    pub domains_seen: usize,
    pub suppressed_exact: usize,
    pub suppressed_suffix: usize,
    pub suppressed_keyword: usize,
    /// Domains accepted, before cross-source deduplication.
    pub accepted: usize,
}

impl MergeStats {
    pub fn suppressed(&self) -> usize {
        self.suppressed_exact + self.suppressed_suffix + self.suppressed_keyword
    }
}

/// Resolve the rule type a source's domains are emitted as. Sources missing
/// from the catalog or without a usable type are reported and yield `None`.
pub fn classify(source_name: &str, catalog: &SourceCatalog) -> Option<RuleType> {
    let Some(source) = catalog.get(source_name) else {
        log::warn!("source '{}' is not in the source config; skipping its domains", source_name);
        return None;
    };

    if source.rule_type.is_none() {
        log::warn!("source '{}' has no valid rule type; skipping its domains", source_name);
    }
    source.rule_type
}

/// Merge every parsed source into `out`, dropping whitelisted domains.
pub fn merge_into(
    out: &mut CategorizedDomains,
    parsed: &BTreeMap<String, BTreeSet<String>>,
    catalog: &SourceCatalog,
    whitelist: &Whitelist,
) -> MergeStats {
    let mut stats = MergeStats::default();

    for (source_name, domains) in parsed {
        let Some(rule_type) = classify(source_name, catalog) else {
            stats.sources_skipped += 1;
            continue;
        };
        stats.sources_merged += 1;

        let mut accepted = 0usize;
        for domain in domains {
            stats.domains_seen += 1;
            let domain = domain.to_lowercase();
            match whitelist.check(&domain) {
                Some(Suppression::Exact) => stats.suppressed_exact += 1,
                Some(Suppression::Suffix) => stats.suppressed_suffix += 1,
                Some(Suppression::Keyword) => stats.suppressed_keyword += 1,
                None => {
                    out.insert(rule_type, &domain);
                    accepted += 1;
                }
            }
        }
        stats.accepted += accepted;

        log::debug!(
            "source '{}' -> {}: {} of {} domains kept",
            source_name,
            rule_type,
            accepted,
            domains.len()
        );
    }

    stats
}

/// Merge into a fresh collection.
pub fn merge(
    parsed: &BTreeMap<String, BTreeSet<String>>,
    catalog: &SourceCatalog,
    whitelist: &Whitelist,
) -> (CategorizedDomains, MergeStats) {
    let mut out = CategorizedDomains::new();
    let stats = merge_into(&mut out, parsed, catalog, whitelist);
    (out, stats)
}

/// Read one intermediate domain list: one domain per line.
pub fn parse_domain_list(text: &str) -> BTreeSet<String> {
    text.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Load every `<source>_domains.txt` file in `dir`, keyed by source name.
/// Unreadable files and a missing directory are reported and skipped.
pub fn load_intermediate_dir(dir: &Path) -> BTreeMap<String, BTreeSet<String>> {
    let mut parsed = BTreeMap::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("failed to read intermediate directory '{}': {}", dir.display(), e);
            return parsed;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(source_name) = file_name.strip_suffix(INTERMEDIATE_SUFFIX) else {
            continue;
        };
        if source_name.is_empty() {
            continue;
        }

        let domains = match read_text(&path) {
            Ok(text) => parse_domain_list(&text),
            Err(e) => {
                log::warn!("source '{}': {}; contributing no domains", source_name, e);
                BTreeSet::new()
            }
        };
        parsed.insert(source_name.to_string(), domains);
    }

    parsed
}
