use std::path::PathBuf;

use clap::Args;

use super::{exit_with_diagnostics, read_source, require_file_with_extension, write_output};

#[derive(Args)]
pub struct AssembleArgs {
    /// Input .asm file
    pub input: PathBuf,
    /// Output .hack file (default: <input stem>.hack)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn cmd_assemble(args: AssembleArgs) {
    require_file_with_extension(&args.input, "asm");
    let source = read_source(&args.input);

    let binary = match jackc::asm::assemble(&source) {
        Ok(binary) => binary,
        Err(errors) => exit_with_diagnostics(&errors, &args.input, &source),
    };

    let out_path = args
        .output
        .unwrap_or_else(|| args.input.with_extension("hack"));
    write_output(&out_path, &binary);
    eprintln!(
        "Assembled {} instructions -> {}",
        binary.lines().count(),
        out_path.display()
    );
}
