//! Upstream feed parsers.
//!
//! Each supported [`SourceFormat`] is reduced to a sorted set of lowercase
//! domain strings.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use dnsbl_core::{SourceDescriptor, SourceFormat};

use crate::error::ParseError;

/// Only hosts lines pointing at this address are blocking entries.
const HOSTS_BLOCK_ADDRESS: &str = "0.0.0.0";

const DNSMASQ_DIRECTIVES: &[&str] = &["server=/", "local=/"];

pub fn parse_domains(text: &str, format: SourceFormat, domain_index: usize) -> BTreeSet<String> {
    let mut domains = BTreeSet::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let domain = match format {
            SourceFormat::Hosts => parse_hosts_line(line, domain_index),
            SourceFormat::Domains => parse_domains_line(line),
            SourceFormat::Dnsmasq => parse_dnsmasq_line(line),
        };

        if let Some(domain) = domain {
            domains.insert(domain.to_lowercase());
        }
    }

    domains
}

/// Read a raw file line by line. Lines that are not valid UTF-8 are dropped.
pub fn read_text(path: &Path) -> Result<String, ParseError> {
    let bytes = fs::read(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode_lines(&bytes, path))
}

fn decode_lines(bytes: &[u8], path: &Path) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let mut text = String::with_capacity(bytes.len());
    for (line_no, line) in bytes.split(|b| *b == b'\n').enumerate() {
        match std::str::from_utf8(line) {
            Ok(line) => {
                text.push_str(line);
                text.push('\n');
            }
            Err(e) => log::debug!("'{}' line {}: skipping invalid UTF-8 ({})", path.display(), line_no + 1, e),
        }
    }
    text
}

/// Parse one upstream feed file. An unreadable file is reported and yields an
/// empty set so the remaining sources still run.
pub fn parse_source_file(path: &Path, source: &SourceDescriptor) -> BTreeSet<String> {
    let text = match read_text(path) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("source '{}': {}; contributing no domains", source.name, e);
            return BTreeSet::new();
        }
    };

    let domains = parse_domains(&text, source.format, source.domain_index);
    log::debug!(
        "source '{}' ({}): {} lines, {} domains",
        source.name,
        source.format,
        text.lines().count(),
        domains.len()
    );
    domains
}

fn parse_hosts_line(line: &str, domain_index: usize) -> Option<&str> {
    let mut parts = line.split_whitespace();
    if parts.next()? != HOSTS_BLOCK_ADDRESS {
        return None;
    }
    if domain_index == 0 {
        return Some(HOSTS_BLOCK_ADDRESS);
    }
    parts.nth(domain_index - 1)
}

fn parse_domains_line(line: &str) -> Option<&str> {
    if line.starts_with('#') {
        return None;
    }
    Some(line)
}

fn parse_dnsmasq_line(line: &str) -> Option<&str> {
    for directive in DNSMASQ_DIRECTIVES {
        if let Some(rest) = line.strip_prefix(directive) {
            let end = rest.find('/')?;
            if end == 0 {
                return None;
            }
            return Some(&rest[..end]);
        }
    }
    None
}
