//! dnsbl CLI
//!
//! CLI tool for turning upstream blocklist feeds into whitelisted rule sets.

mod compile;
mod pipeline;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use compile::{run_compile, CompileOptions};
use pipeline::{run_merge, run_parse, MergeOptions, ParseOptions};

#[derive(Parser)]
#[command(name = "dnsbl")]
#[command(about = "DNS blocklist aggregator and rule-set builder")]
struct Cli {
    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse raw feeds into per-source domain lists
    Parse {
        #[command(flatten)]
        sources: SourceArgs,

        /// Directory holding the raw `<source>.txt` feeds
        #[arg(long, default_value = "src")]
        src_dir: PathBuf,

        /// Directory for per-source rule-set documents
        #[arg(long, default_value = "json")]
        json_dir: PathBuf,
    },

    /// Merge per-source domain lists into the final rule set
    Merge {
        #[command(flatten)]
        sources: SourceArgs,

        #[command(flatten)]
        merge: MergeArgs,
    },

    /// Compile rule-set documents with the external rule-set compiler
    Compile {
        #[command(flatten)]
        compile: CompileArgs,
    },

    /// Run parse and merge, then optionally compile
    Build {
        #[command(flatten)]
        sources: SourceArgs,

        /// Directory holding the raw `<source>.txt` feeds
        #[arg(long, default_value = "src")]
        src_dir: PathBuf,

        /// Directory for per-source rule-set documents
        #[arg(long, default_value = "json")]
        json_dir: PathBuf,

        #[command(flatten)]
        merge: MergeArgs,

        /// Also compile every document in the json and output directories
        #[arg(long)]
        compile: bool,

        /// Output directory for compiled rule sets
        #[arg(long, default_value = "srs")]
        srs_dir: PathBuf,

        /// Rule-set compiler executable
        #[arg(long, default_value = "sing-box")]
        compiler: String,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Source config (TOML or JSON)
    #[arg(short, long, default_value = "sources.toml")]
    config: PathBuf,

    /// Directory for `<source>_domains.txt` lists
    #[arg(long, default_value = "plain")]
    plain_dir: PathBuf,
}

#[derive(Args)]
struct MergeArgs {
    /// Whitelist file; a missing file means nothing is exempted
    #[arg(short, long, default_value = "whitelist.txt")]
    whitelist: PathBuf,

    /// Output directory for the merged rule set
    #[arg(short, long, default_value = "domains")]
    output_dir: PathBuf,

    /// Base name of the merged `.txt` and `.json` outputs
    #[arg(short, long, default_value = "anotherblacklist")]
    name: String,
}

#[derive(Args)]
struct CompileArgs {
    /// Directories of rule-set documents to compile
    #[arg(short, long = "input", default_values = ["json", "domains"])]
    inputs: Vec<PathBuf>,

    /// Output directory for compiled rule sets
    #[arg(short, long, default_value = "srs")]
    output_dir: PathBuf,

    /// Rule-set compiler executable
    #[arg(long, default_value = "sing-box")]
    compiler: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            sources,
            src_dir,
            json_dir,
        } => cmd_parse(&ParseOptions {
            config: sources.config,
            src_dir,
            plain_dir: sources.plain_dir,
            json_dir,
        }),
        Commands::Merge { sources, merge } => cmd_merge(&merge_options(&sources, merge)),
        Commands::Compile { compile } => cmd_compile(&CompileOptions {
            json_dirs: compile.inputs,
            output_dir: compile.output_dir,
            compiler: compile.compiler,
        }),
        Commands::Build {
            sources,
            src_dir,
            json_dir,
            merge,
            compile,
            srs_dir,
            compiler,
        } => {
            let parse_opts = ParseOptions {
                config: sources.config.clone(),
                src_dir,
                plain_dir: sources.plain_dir.clone(),
                json_dir: json_dir.clone(),
            };
            let merge_opts = merge_options(&sources, merge);
            let compile_opts = compile.then(|| CompileOptions {
                json_dirs: vec![json_dir, merge_opts.output_dir.clone()],
                output_dir: srs_dir,
                compiler,
            });
            cmd_build(&parse_opts, &merge_opts, compile_opts.as_ref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn merge_options(sources: &SourceArgs, merge: MergeArgs) -> MergeOptions {
    MergeOptions {
        config: sources.config.clone(),
        plain_dir: sources.plain_dir.clone(),
        whitelist: merge.whitelist,
        output_dir: merge.output_dir,
        name: merge.name,
    }
}

fn cmd_parse(opts: &ParseOptions) -> Result<(), String> {
    let stats = run_parse(opts)?;

    println!("Parsed {} sources into '{}'", stats.sources, opts.plain_dir.display());
    println!("  Domains:  {}", stats.domains);
    println!("  Time:     {:.1}ms", stats.total_ms);

    if stats.write_failures > 0 {
        return Err(format!("{} output file(s) could not be written", stats.write_failures));
    }
    Ok(())
}

fn cmd_merge(opts: &MergeOptions) -> Result<(), String> {
    let report = run_merge(opts)?;

    println!(
        "Merged {} sources into '{}'",
        report.sources_merged,
        opts.output_dir.join(&opts.name).display()
    );
    if report.sources_skipped > 0 {
        println!("  Skipped:  {} sources (unconfigured or untyped)", report.sources_skipped);
    }
    println!("  Domains:  {} -> {} rules (whitelist removed {})", report.domains_seen, report.rules, report.suppressed);
    println!("  Unique:   {}", report.unique_domains);
    println!("  Time:     {:.1}ms", report.total_ms);

    if report.write_failures > 0 {
        return Err(format!("{} output file(s) could not be written", report.write_failures));
    }
    Ok(())
}

fn cmd_compile(opts: &CompileOptions) -> Result<(), String> {
    let stats = run_compile(opts)?;

    println!("Compiled {} rule sets into '{}'", stats.compiled, opts.output_dir.display());
    if stats.failed > 0 {
        println!("  Failed:   {}", stats.failed);
    }
    Ok(())
}

fn cmd_build(parse: &ParseOptions, merge: &MergeOptions, compile: Option<&CompileOptions>) -> Result<(), String> {
    let parse_result = cmd_parse(parse);
    let merge_result = cmd_merge(merge);
    if parse_result.is_err() || merge_result.is_err() {
        return parse_result.and(merge_result);
    }
    if let Some(compile) = compile {
        cmd_compile(compile)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_skips_compile_when_an_earlier_stage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("json")).unwrap();
        std::fs::write(root.join("json/stale_domains.json"), "{}").unwrap();

        let parse = ParseOptions {
            config: root.join("missing.toml"),
            src_dir: root.join("src"),
            plain_dir: root.join("plain"),
            json_dir: root.join("json"),
        };
        let merge = MergeOptions {
            config: root.join("missing.toml"),
            plain_dir: root.join("plain"),
            whitelist: root.join("whitelist.txt"),
            output_dir: root.join("domains"),
            name: "blocklist".to_string(),
        };
        let compile = CompileOptions {
            json_dirs: vec![root.join("json")],
            output_dir: root.join("srs"),
            compiler: "false".to_string(),
        };

        assert!(cmd_build(&parse, &merge, Some(&compile)).is_err());
        assert!(!root.join("srs").exists());
    }
}
