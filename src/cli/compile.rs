use std::path::{Path, PathBuf};

use clap::Args;

use super::{
    exit_with_diagnostics, read_source, require_file_with_extension,
    sorted_files_with_extension, write_output,
};

#[derive(Args)]
pub struct CompileArgs {
    /// Input .jack file, or a directory of .jack files
    pub input: PathBuf,
}

pub fn cmd_compile(args: CompileArgs) {
    if args.input.is_dir() {
        for path in sorted_files_with_extension(&args.input, "jack") {
            compile_file(&path);
        }
    } else {
        require_file_with_extension(&args.input, "jack");
        compile_file(&args.input);
    }
}

/// Compile one `.jack` file to a `.vm` sibling.
fn compile_file(path: &Path) {
    let source = read_source(path);
    let vm_code = match jackc::compile_source(&source) {
        Ok(vm_code) => vm_code,
        Err(errors) => exit_with_diagnostics(&errors, path, &source),
    };
    let out_path = path.with_extension("vm");
    write_output(&out_path, &vm_code);
    eprintln!("Compiled {} -> {}", path.display(), out_path.display());
}
