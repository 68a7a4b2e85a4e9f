//! Two-pass Hack assembler.
//!
//! Pass one walks the commands with a ROM counter that skips label
//! definitions and binds each `(LABEL)` to the address of the following
//! instruction. Pass two emits one 16-bit word per A- or C-command,
//! allocating variables from RAM[16] in order of first reference.

pub mod code;
mod symbols;

pub use symbols::SymbolTable;

use crate::diagnostic::Diagnostic;
use crate::span::{Span, Spanned};

/// A-instruction constants and ROM addresses are 15-bit.
const MAX_ADDRESS: u32 = 32767;

/// One Hack assembly command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AsmCommand {
    /// `@N` with a numeric constant.
    Address(u16),
    /// `@symbol` to be resolved against the symbol table.
    Symbol(String),
    /// `(LABEL)` — binds a name, emits no code.
    Label(String),
    /// `dest=comp;jump` with optional dest and jump.
    Compute {
        dest: Option<String>,
        comp: String,
        jump: Option<String>,
    },
}

/// Parse `.asm` text. Mnemonics are checked here, so a parsed program
/// always encodes.
pub fn parse_commands(source: &str) -> Result<Vec<Spanned<AsmCommand>>, Vec<Diagnostic>> {
    let mut commands = Vec::new();
    let mut diagnostics = Vec::new();
    let mut offset = 0usize;

    for line in source.split('\n') {
        let line_len = line.len();
        let code_part = match line.find("//") {
            Some(at) => &line[..at],
            None => line,
        };
        let trimmed = code_part.trim();
        if !trimmed.is_empty() {
            let start = offset + (code_part.len() - code_part.trim_start().len());
            let span = Span::new(start as u32, (start + trimmed.len()) as u32);
            match parse_line(trimmed, span) {
                Ok(cmd) => commands.push(Spanned::new(cmd, span)),
                Err(diag) => diagnostics.push(diag),
            }
        }
        offset += line_len + 1;
    }

    if diagnostics.is_empty() {
        Ok(commands)
    } else {
        Err(diagnostics)
    }
}

fn parse_line(line: &str, span: Span) -> Result<AsmCommand, Diagnostic> {
    if let Some(symbol) = line.strip_prefix('@') {
        if symbol.is_empty() {
            return Err(Diagnostic::error(
                "'@' must be followed by a symbol or number".to_string(),
                span,
            ));
        }
        if symbol.bytes().all(|b| b.is_ascii_digit()) {
            let value: u32 = symbol.parse().map_err(|_| {
                Diagnostic::error(format!("invalid address '{}'", symbol), span)
            })?;
            if value > MAX_ADDRESS {
                return Err(Diagnostic::error(
                    format!("address {} out of range (maximum {})", value, MAX_ADDRESS),
                    span,
                ));
            }
            return Ok(AsmCommand::Address(value as u16));
        }
        return Ok(AsmCommand::Symbol(symbol.to_string()));
    }

    if let Some(inner) = line.strip_prefix('(') {
        let Some(label) = inner.strip_suffix(')') else {
            return Err(Diagnostic::error(
                "unterminated label: expected ')'".to_string(),
                span,
            ));
        };
        if label.is_empty() {
            return Err(Diagnostic::error("empty label".to_string(), span));
        }
        return Ok(AsmCommand::Label(label.to_string()));
    }

    // C-command: optional `dest=`, comp, optional `;jump`.
    let (dest, rest) = match line.split_once('=') {
        Some((dest, rest)) => (Some(dest), rest),
        None => (None, line),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => (comp, Some(jump)),
        None => (rest, None),
    };

    if code::dest(dest).is_none() {
        return Err(Diagnostic::error(
            format!("unknown dest mnemonic '{}'", dest.unwrap_or_default()),
            span,
        ));
    }
    if code::comp(comp).is_none() {
        return Err(Diagnostic::error(
            format!("unknown comp mnemonic '{}'", comp),
            span,
        ));
    }
    if code::jump(jump).is_none() {
        return Err(Diagnostic::error(
            format!("unknown jump mnemonic '{}'", jump.unwrap_or_default()),
            span,
        ));
    }

    Ok(AsmCommand::Compute {
        dest: dest.map(str::to_string),
        comp: comp.to_string(),
        jump: jump.map(str::to_string),
    })
}

/// Assemble `.asm` text into `.hack` lines.
pub fn assemble(source: &str) -> Result<String, Vec<Diagnostic>> {
    let commands = parse_commands(source)?;

    let mut table = SymbolTable::new();
    let mut diagnostics = Vec::new();

    // Pass one: bind labels to ROM addresses.
    let mut rom_address: u32 = 0;
    for cmd in &commands {
        match &cmd.node {
            AsmCommand::Label(label) => {
                if table.contains(label) {
                    diagnostics.push(Diagnostic::error(
                        format!("label '{}' is already defined", label),
                        cmd.span,
                    ));
                } else {
                    table.bind_label(label, rom_address as u16);
                }
            }
            _ => {
                rom_address += 1;
                if rom_address > MAX_ADDRESS + 1 {
                    diagnostics.push(Diagnostic::error(
                        "program exceeds the 32K instruction ROM".to_string(),
                        cmd.span,
                    ));
                    break;
                }
            }
        }
    }
    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }

    // Pass two: emit one word per instruction.
    let mut output = String::new();
    for cmd in &commands {
        match &cmd.node {
            AsmCommand::Address(value) => emit_word(&mut output, *value),
            AsmCommand::Symbol(symbol) => {
                let address = table.resolve_or_allocate(symbol);
                emit_word(&mut output, address);
            }
            AsmCommand::Compute { dest, comp, jump } => {
                // mnemonics were validated at parse time
                let comp_bits = code::comp(comp).unwrap();
                let dest_bits = code::dest(dest.as_deref()).unwrap();
                let jump_bits = code::jump(jump.as_deref()).unwrap();
                output.push_str("111");
                output.push_str(comp_bits);
                output.push_str(dest_bits);
                output.push_str(jump_bits);
                output.push('\n');
            }
            AsmCommand::Label(_) => {}
        }
    }
    Ok(output)
}

fn emit_word(output: &mut String, value: u16) {
    output.push_str(&format!("{:016b}", value));
    output.push('\n');
}
