pub mod asm;
pub mod ast;
pub mod codegen;
pub mod diagnostic;
pub mod lexeme;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod symtab;
pub mod vm;
pub mod xml;

use diagnostic::Diagnostic;
use lexer::Lexer;
use parser::Parser;

/// Tokenize and parse a Jack class.
pub fn parse_source(source: &str) -> Result<ast::Class, Vec<Diagnostic>> {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }
    Parser::new(tokens).parse_class()
}

/// Compile Jack source to VM code.
pub fn compile_source(source: &str) -> Result<String, Vec<Diagnostic>> {
    let class = parse_source(source)?;
    codegen::emit_class(&class)
}

/// Render the parse-tree XML for Jack source.
pub fn analyze_source(source: &str) -> Result<String, Vec<Diagnostic>> {
    let class = parse_source(source)?;
    Ok(xml::class_to_xml(&class))
}

/// Render the flat `<tokens>` XML for Jack source (analyzer `-t` mode).
pub fn tokenize_source(source: &str) -> Result<String, Vec<Diagnostic>> {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }
    Ok(xml::tokens_to_xml(&tokens))
}

/// Translate one `.vm` unit to Hack assembly. `stem` names the unit's
/// static variables.
pub fn translate_source(stem: &str, source: &str, bootstrap: bool) -> Result<String, Vec<Diagnostic>> {
    let commands = vm::parse_commands(source)?;
    let unit = vm::VmUnit {
        stem: stem.to_string(),
        commands,
    };
    Ok(vm::lower_units(&[unit], bootstrap))
}

/// Assemble Hack assembly into binary machine code.
pub fn assemble_source(source: &str) -> Result<String, Vec<Diagnostic>> {
    asm::assemble(source)
}
