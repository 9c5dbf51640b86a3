//! Whitelist loading and suppression matching
//!
//! A whitelist file is line oriented:
//!
//! ```text
//! # comment
//! example.com            plain: the domain itself and every subdomain
//! full:login.example.org exact domain only
//! keyword:bank           any domain containing the substring
//! ```
//!
//! # Examples
//!
//! ```
//! use dnsbl_core::whitelist::{Suppression, Whitelist};
//!
//! let whitelist = Whitelist::parse("example.com\nkeyword:ads\n");
//! assert_eq!(whitelist.check("example.com"), Some(Suppression::Exact));
//! assert_eq!(whitelist.check("a.b.example.com"), Some(Suppression::Suffix));
//! assert_eq!(whitelist.check("myads.net"), Some(Suppression::Keyword));
//! assert_eq!(whitelist.check("notexample.com"), None);
//! ```
//!
//! Keyword matching is unanchored substring containment and therefore
//! over-broad: `keyword:ads` also suppresses `leads.com`.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

const KEYWORD_PREFIX: &str = "keyword:";
const FULL_PREFIX: &str = "full:";

/// Which whitelist check suppressed a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    Exact,
    Suffix,
    Keyword,
}

/// Domains and keywords exempted from blocking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    pub exact: HashSet<String>,
    pub suffixes: HashSet<String>,
    pub keywords: HashSet<String>,
}

impl Whitelist {
    /// Create an empty whitelist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse whitelist text.
    pub fn parse(text: &str) -> Self {
        let mut whitelist = Self::new();
        for raw_line in text.lines() {
            whitelist.add_line(raw_line);
        }
        whitelist
    }

    /// Load a whitelist file. A missing or unreadable file yields an empty
    /// whitelist so the run can continue.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => {
                let whitelist = Self::parse(&text);
                log::info!(
                    "loaded whitelist '{}': {} exact, {} suffix, {} keyword",
                    path.display(),
                    whitelist.exact.len(),
                    whitelist.suffixes.len(),
                    whitelist.keywords.len()
                );
                whitelist
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("whitelist '{}' not found, nothing will be exempted", path.display());
                Self::new()
            }
            Err(e) => {
                log::warn!("failed to read whitelist '{}': {}, continuing without it", path.display(), e);
                Self::new()
            }
        }
    }

    /// Add a single whitelist line. Returns `false` if the line carried no rule.
    pub fn add_line(&mut self, raw_line: &str) -> bool {
        let line = raw_line.trim().to_lowercase();
        if line.is_empty() || line.starts_with('#') {
            return false;
        }

        if let Some(keyword) = line.strip_prefix(KEYWORD_PREFIX) {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                return false;
            }
            self.keywords.insert(keyword.to_string());
            return true;
        }

        if let Some(domain) = line.strip_prefix(FULL_PREFIX) {
            let domain = domain.trim();
            if domain.is_empty() {
                return false;
            }
            self.exact.insert(domain.to_string());
            return true;
        }

        // Anything after the first token is an inline note.
        let Some(domain) = line.split_whitespace().next() else {
            return false;
        };
        self.exact.insert(domain.to_string());
        self.suffixes.insert(domain.to_string());
        true
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.suffixes.is_empty() && self.keywords.is_empty()
    }

    /// Total number of rules across the three lookup sets.
    pub fn len(&self) -> usize {
        self.exact.len() + self.suffixes.len() + self.keywords.len()
    }

    /// Check a lowercase domain against the whitelist.
    ///
    /// Checks run in priority order exact, suffix, keyword and stop at the
    /// first hit.
    pub fn check(&self, domain: &str) -> Option<Suppression> {
        if self.exact.contains(domain) {
            return Some(Suppression::Exact);
        }

        if !self.suffixes.is_empty() && dot_suffixes(domain).any(|s| self.suffixes.contains(s)) {
            return Some(Suppression::Suffix);
        }

        if self.keywords.iter().any(|k| domain.contains(k.as_str())) {
            return Some(Suppression::Keyword);
        }

        None
    }

    pub fn is_suppressed(&self, domain: &str) -> bool {
        self.check(domain).is_some()
    }
}

/// Iterate `domain` itself followed by every tail that starts right after a
/// `.`, so `a.b.c` yields `a.b.c`, `b.c`, `c`.
///
/// A suffix `s` matches `d` when `d == s` or `d` ends with `"." + s`, which is
/// exactly membership of `s` in this sequence.
pub fn dot_suffixes(domain: &str) -> DotSuffixIter<'_> {
    DotSuffixIter {
        domain,
        next: Some(0),
    }
}

pub struct DotSuffixIter<'a> {
    domain: &'a str,
    next: Option<usize>,
}

impl<'a> Iterator for DotSuffixIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next?;
        let tail = &self.domain[start..];
        self.next = tail.find('.').map(|pos| start + pos + 1);
        Some(tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn plain_line_populates_exact_and_suffix() {
        let whitelist = Whitelist::parse("Example.COM\n");
        assert!(whitelist.exact.contains("example.com"));
        assert!(whitelist.suffixes.contains("example.com"));
        assert!(whitelist.keywords.is_empty());
    }

    #[test]
    fn prefixed_lines_populate_single_set() {
        let whitelist = Whitelist::parse("keyword: ads \nfull:login.example.org\n");
        assert_eq!(whitelist.keywords.len(), 1);
        assert!(whitelist.keywords.contains("ads"));
        assert!(whitelist.exact.contains("login.example.org"));
        assert!(whitelist.suffixes.is_empty());
    }

    #[test]
    fn skips_comments_blank_and_empty_prefixes() {
        let whitelist = Whitelist::parse("# header\n\n   \nkeyword:\nkeyword:   \nfull:\n  # indented\n");
        assert!(whitelist.is_empty());
        assert_eq!(whitelist.len(), 0);
    }

    #[test]
    fn inline_note_after_domain_is_ignored() {
        let whitelist = Whitelist::parse("bank.example  needed for payroll\n");
        assert!(whitelist.exact.contains("bank.example"));
        assert_eq!(whitelist.exact.len(), 1);
    }

    #[test]
    fn suffix_semantics() {
        let whitelist = Whitelist::parse("example.com");
        assert!(whitelist.is_suppressed("example.com"));
        assert!(whitelist.is_suppressed("sub.example.com"));
        assert!(whitelist.is_suppressed("a.b.example.com"));
        assert!(!whitelist.is_suppressed("notexample.com"));
        assert!(!whitelist.is_suppressed("example.com.evil"));
    }

    #[test]
    fn full_line_does_not_cover_subdomains() {
        let whitelist = Whitelist::parse("full:example.com");
        assert_eq!(whitelist.check("example.com"), Some(Suppression::Exact));
        assert_eq!(whitelist.check("sub.example.com"), None);
    }

    #[test]
    fn keyword_semantics() {
        let whitelist = Whitelist::parse("keyword:ads");
        assert_eq!(whitelist.check("ads.example.com"), Some(Suppression::Keyword));
        assert_eq!(whitelist.check("myads.net"), Some(Suppression::Keyword));
        // Unanchored containment over-suppresses.
        assert_eq!(whitelist.check("leads.com"), Some(Suppression::Keyword));
        assert_eq!(whitelist.check("example.com"), None);
    }

    #[test]
    fn any_check_suppresses_regardless_of_overlap() {
        let whitelist = Whitelist::parse("full:ads.example.com\nkeyword:ads\n");
        assert_eq!(whitelist.check("ads.example.com"), Some(Suppression::Exact));
        assert_eq!(whitelist.check("cdn-ads.example.com"), Some(Suppression::Keyword));
    }

    #[test]
    fn dot_suffixes_walks_label_boundaries() {
        let tails: Vec<&str> = dot_suffixes("a.b.example.com").collect();
        assert_eq!(tails, vec!["a.b.example.com", "b.example.com", "example.com", "com"]);

        let tails: Vec<&str> = dot_suffixes("host").collect();
        assert_eq!(tails, vec!["host"]);

        let tails: Vec<&str> = dot_suffixes("x.").collect();
        assert_eq!(tails, vec!["x.", ""]);
    }

    #[test]
    fn dot_suffixes_matches_linear_scan() {
        let suffixes = ["example.com", "com", ".com", "b.c", ""];
        let domains = ["example.com", "x.example.com", "x..com", "a.b.c", "ab.c", "trailing.", "none"];
        for domain in domains {
            for suffix in suffixes {
                let linear = domain == suffix || domain.ends_with(&format!(".{}", suffix));
                let walked = dot_suffixes(domain).any(|s| s == suffix);
                assert_eq!(linear, walked, "domain {domain:?} suffix {suffix:?}");
            }
        }
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let whitelist = Whitelist::load(&dir.path().join("whitelist.txt"));
        assert!(whitelist.is_empty());
    }

    #[test]
    fn load_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# allow").unwrap();
        writeln!(file, "good.com").unwrap();
        writeln!(file, "keyword:bank").unwrap();
        file.flush().unwrap();

        let whitelist = Whitelist::load(file.path());
        assert!(whitelist.is_suppressed("www.good.com"));
        assert!(whitelist.is_suppressed("mybank.io"));
        assert!(!whitelist.is_suppressed("bad.com"));
    }
}
