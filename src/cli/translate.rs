use std::path::PathBuf;

use clap::Args;

use jackc::vm::{lower_units, parse_commands, VmUnit};

use super::{
    exit_with_diagnostics, file_stem, read_source, require_file_with_extension,
    sorted_files_with_extension, write_output,
};

#[derive(Args)]
pub struct TranslateArgs {
    /// Input .vm file, or a directory of .vm files
    pub input: PathBuf,
    /// Skip the SP=256 / call Sys.init 0 bootstrap
    #[arg(short = 'n', long)]
    pub no_bootstrap: bool,
    /// Emit the bootstrap (the default; kept for symmetry with -n)
    #[arg(short = 'y', long = "bootstrap", conflicts_with = "no_bootstrap")]
    pub bootstrap: bool,
    /// Output .asm file (default: <input stem>.asm, or <dir>/<dir>.asm)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn cmd_translate(args: TranslateArgs) {
    let bootstrap = args.bootstrap || !args.no_bootstrap;

    let (sources, default_output) = if args.input.is_dir() {
        // Directory mode: every .vm file, in filename order, into one
        // program named after the directory.
        let files = sorted_files_with_extension(&args.input, "vm");
        let dir_name = args
            .input
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| file_stem(&args.input));
        let output = args.input.join(format!("{}.asm", dir_name));
        (files, output)
    } else {
        require_file_with_extension(&args.input, "vm");
        let output = args.input.with_extension("asm");
        (vec![args.input.clone()], output)
    };

    let mut units = Vec::new();
    for path in &sources {
        let source = read_source(path);
        match parse_commands(&source) {
            Ok(commands) => units.push(VmUnit {
                stem: file_stem(path),
                commands,
            }),
            Err(errors) => exit_with_diagnostics(&errors, path, &source),
        }
    }

    let assembly = lower_units(&units, bootstrap);
    let out_path = args.output.unwrap_or(default_output);
    write_output(&out_path, &assembly);
    eprintln!(
        "Translated {} file{} -> {}",
        units.len(),
        if units.len() == 1 { "" } else { "s" },
        out_path.display()
    );
}
