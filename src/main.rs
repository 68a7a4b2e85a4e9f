mod cli;

use clap::{Parser, Subcommand};

use cli::analyze::AnalyzeArgs;
use cli::assemble::AssembleArgs;
use cli::compile::CompileArgs;
use cli::translate::TranslateArgs;

#[derive(Parser)]
#[command(
    name = "jackc",
    version,
    about = "Jack-to-Hack toolchain: compiler, analyzer, VM translator, assembler"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile .jack files to .vm files
    Compile(CompileArgs),
    /// Emit the parse tree (or token stream) of .jack files as XML
    Analyze(AnalyzeArgs),
    /// Translate .vm files to a Hack .asm file
    Translate(TranslateArgs),
    /// Assemble a .asm file into .hack binary code
    Assemble(AssembleArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile(args) => cli::compile::cmd_compile(args),
        Command::Analyze(args) => cli::analyze::cmd_analyze(args),
        Command::Translate(args) => cli::translate::cmd_translate(args),
        Command::Assemble(args) => cli::assemble::cmd_assemble(args),
    }
}
