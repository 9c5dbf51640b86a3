use std::path::{Path, PathBuf};
use std::time::Instant;

use dnsbl_compiler::emitter::{write_document, write_plain};
use dnsbl_compiler::{
    emit_single, emit_structured, load_intermediate_dir, merge, parse_source_file, SourceCatalog,
    WriteError, INTERMEDIATE_SUFFIX,
};
use dnsbl_core::Whitelist;

pub struct ParseOptions {
    pub config: PathBuf,
    pub src_dir: PathBuf,
    pub plain_dir: PathBuf,
    pub json_dir: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct ParseStats {
    pub sources: usize,
    pub domains: usize,
    pub write_failures: usize,
    pub total_ms: f64,
}

/// Parse every configured feed into `<plain_dir>/<source>_domains.txt` and a
/// per-source rule-set document in `json_dir`.
pub fn run_parse(opts: &ParseOptions) -> Result<ParseStats, String> {
    let start = Instant::now();
    let catalog = load_catalog(&opts.config)?;
    let mut stats = ParseStats::default();

    for source in catalog.iter() {
        let feed_path = opts.src_dir.join(format!("{}.txt", source.name));
        let domains = parse_source_file(&feed_path, source);
        stats.sources += 1;
        stats.domains += domains.len();

        let plain_path = opts.plain_dir.join(format!("{}{}", source.name, INTERMEDIATE_SUFFIX));
        report(write_plain(&plain_path, domains.iter().map(String::as_str)), &mut stats.write_failures);

        match source.rule_type {
            Some(rule_type) => {
                let json_path = opts.json_dir.join(format!("{}_domains.json", source.name));
                report(write_document(&json_path, &emit_single(rule_type, &domains)), &mut stats.write_failures);
            }
            None => log::warn!("source '{}' has no valid rule type; skipping its rule-set document", source.name),
        }

        log::info!("parsed '{}': {} domains", source.name, domains.len());
    }

    stats.total_ms = start.elapsed().as_secs_f64() * 1000.0;
    Ok(stats)
}

pub struct MergeOptions {
    pub config: PathBuf,
    pub plain_dir: PathBuf,
    pub whitelist: PathBuf,
    pub output_dir: PathBuf,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub sources_merged: usize,
    pub sources_skipped: usize,
    pub domains_seen: usize,
    pub suppressed: usize,
    pub rules: usize,
    pub unique_domains: usize,
    pub write_failures: usize,
    pub total_ms: f64,
}

/// Merge the intermediate lists into `<output_dir>/<name>.txt` and
/// `<output_dir>/<name>.json`.
pub fn run_merge(opts: &MergeOptions) -> Result<MergeReport, String> {
    let start = Instant::now();
    let catalog = load_catalog(&opts.config)?;
    let whitelist = Whitelist::load(&opts.whitelist);
    let parsed = load_intermediate_dir(&opts.plain_dir);

    let (domains, stats) = merge(&parsed, &catalog, &whitelist);

    let mut write_failures = 0usize;
    let plain_path = opts.output_dir.join(format!("{}.txt", opts.name));
    let all_domains = domains.all_domains();
    report(write_plain(&plain_path, all_domains.iter().copied()), &mut write_failures);

    let json_path = opts.output_dir.join(format!("{}.json", opts.name));
    report(write_document(&json_path, &emit_structured(&domains)), &mut write_failures);

    Ok(MergeReport {
        sources_merged: stats.sources_merged,
        sources_skipped: stats.sources_skipped,
        domains_seen: stats.domains_seen,
        suppressed: stats.suppressed(),
        rules: domains.len(),
        unique_domains: all_domains.len(),
        write_failures,
        total_ms: start.elapsed().as_secs_f64() * 1000.0,
    })
}

fn load_catalog(path: &Path) -> Result<SourceCatalog, String> {
    SourceCatalog::load(path).map_err(|e| format!("Cannot load sources: {}", e))
}

fn report(result: Result<(), WriteError>, failures: &mut usize) {
    if let Err(e) = result {
        log::error!("{}", e);
        *failures += 1;
    }
}
