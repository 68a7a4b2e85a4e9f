use std::path::{Path, PathBuf};

use clap::Args;

use super::{
    exit_with_diagnostics, file_stem, read_source, require_file_with_extension,
    sorted_files_with_extension, write_output,
};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input .jack file, or a directory of .jack files
    pub input: PathBuf,
    /// Emit the token stream only, to <stem>T.xml
    #[arg(short = 't', long)]
    pub tokens: bool,
}

pub fn cmd_analyze(args: AnalyzeArgs) {
    if args.input.is_dir() {
        for path in sorted_files_with_extension(&args.input, "jack") {
            analyze_file(&path, args.tokens);
        }
    } else {
        require_file_with_extension(&args.input, "jack");
        analyze_file(&args.input, args.tokens);
    }
}

fn analyze_file(path: &Path, tokens_only: bool) {
    let source = read_source(path);
    let result = if tokens_only {
        jackc::tokenize_source(&source)
    } else {
        jackc::analyze_source(&source)
    };
    let xml = match result {
        Ok(xml) => xml,
        Err(errors) => exit_with_diagnostics(&errors, path, &source),
    };

    let file_name = if tokens_only {
        format!("{}T.xml", file_stem(path))
    } else {
        format!("{}.xml", file_stem(path))
    };
    let out_path = path.with_file_name(file_name);
    write_output(&out_path, &xml);
    eprintln!("Analyzed {} -> {}", path.display(), out_path.display());
}
