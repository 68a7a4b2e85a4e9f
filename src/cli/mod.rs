pub mod analyze;
pub mod assemble;
pub mod compile;
pub mod translate;

use std::path::{Path, PathBuf};
use std::process;

use jackc::diagnostic::{render_diagnostics, Diagnostic};

/// Read a source file or exit with a message.
pub fn read_source(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

/// Write an output file or exit with a message.
pub fn write_output(path: &Path, contents: &str) {
    if let Err(e) = std::fs::write(path, contents) {
        eprintln!("error: cannot write '{}': {}", path.display(), e);
        process::exit(1);
    }
}

/// Exit unless `path` is an existing file with the given extension.
pub fn require_file_with_extension(path: &Path, extension: &str) {
    if !path.exists() {
        eprintln!("error: '{}' not found", path.display());
        process::exit(1);
    }
    if !path.extension().is_some_and(|e| e == extension) {
        eprintln!(
            "error: input must be a .{} file, got '{}'",
            extension,
            path.display()
        );
        process::exit(1);
    }
}

/// All files with the given extension directly under `dir`, sorted by
/// filename. Exits if the directory is unreadable or holds none.
pub fn sorted_files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("error: cannot read directory '{}': {}", dir.display(), e);
            process::exit(1);
        }
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == extension))
        .collect();
    files.sort();
    if files.is_empty() {
        eprintln!(
            "error: no .{} files found in '{}'",
            extension,
            dir.display()
        );
        process::exit(1);
    }
    files
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("out")
        .to_string()
}

/// Render diagnostics against their source file and exit nonzero.
pub fn exit_with_diagnostics(diagnostics: &[Diagnostic], path: &Path, source: &str) -> ! {
    render_diagnostics(diagnostics, &path.to_string_lossy(), source);
    process::exit(1);
}
