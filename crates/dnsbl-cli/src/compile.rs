use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct CompileOptions {
    pub json_dirs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// Rule-set compiler executable, invoked as
    /// `<compiler> rule-set compile --output <srs> <json>`.
    pub compiler: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompileStats {
    pub compiled: usize,
    pub failed: usize,
}

/// Compile every `.json` document in each input directory into
/// `<output_dir>/<dir name>/<stem>.srs`. A failing file is reported and the
/// rest continue.
pub fn run_compile(opts: &CompileOptions) -> Result<CompileStats, String> {
    let mut stats = CompileStats::default();

    for json_dir in &opts.json_dirs {
        let dir_name = json_dir
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "rules".into());
        let out_dir = opts.output_dir.join(dir_name);
        fs::create_dir_all(&out_dir)
            .map_err(|e| format!("Failed to create '{}': {}", out_dir.display(), e))?;

        for json_file in list_documents(json_dir) {
            let srs_file = out_dir.join(json_file.with_extension("srs").file_name().unwrap_or_default());
            match compile_one(&opts.compiler, &json_file, &srs_file) {
                Ok(()) => {
                    log::info!("compiled '{}' to '{}'", json_file.display(), srs_file.display());
                    stats.compiled += 1;
                }
                Err(e) => {
                    log::error!("{}", e);
                    stats.failed += 1;
                }
            }
        }
    }

    Ok(stats)
}

/// `.json` files in `dir`, sorted by path. An unreadable directory is
/// reported and treated as empty.
fn list_documents(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("failed to read '{}': {}; nothing to compile there", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

fn compile_one(compiler: &str, json_file: &Path, srs_file: &Path) -> Result<(), String> {
    let status = Command::new(compiler)
        .arg("rule-set")
        .arg("compile")
        .arg("--output")
        .arg(srs_file)
        .arg(json_file)
        .status()
        .map_err(|e| format!("Failed to run '{}' for '{}': {}", compiler, json_file.display(), e))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("Error compiling '{}': {} exited with {}", json_file.display(), compiler, status))
    }
}
