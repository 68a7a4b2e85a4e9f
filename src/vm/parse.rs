use super::{Segment, VmCommand, VmOp};
use crate::diagnostic::Diagnostic;
use crate::span::{Span, Spanned};

/// Indices address 15-bit RAM, same ceiling as an A-instruction constant.
const MAX_INDEX: u16 = 32767;

/// Parse `.vm` text into commands. Lines hold one command each; `//`
/// starts a comment; blank lines are skipped.
pub fn parse_commands(source: &str) -> Result<Vec<Spanned<VmCommand>>, Vec<Diagnostic>> {
    let mut commands = Vec::new();
    let mut diagnostics = Vec::new();
    let mut offset = 0usize;

    for line in source.split('\n') {
        let line_len = line.len();
        let code = match line.find("//") {
            Some(at) => &line[..at],
            None => line,
        };
        let trimmed = code.trim();
        if !trimmed.is_empty() {
            let start = offset + (code.len() - code.trim_start().len());
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

fn parse_line(line: &str, span: Span) -> Result<VmCommand, Diagnostic> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let head = parts[0];

    if let Some(op) = VmOp::from_str(head) {
        expect_arity(&parts, 1, span)?;
        return Ok(VmCommand::Arithmetic(op));
    }

    match head {
        "push" | "pop" => {
            expect_arity(&parts, 3, span)?;
            let segment = Segment::from_str(parts[1]).ok_or_else(|| {
                Diagnostic::error(format!("unknown segment '{}'", parts[1]), span).with_note(
                    "segments: constant, local, argument, this, that, temp, pointer, static"
                        .to_string(),
                )
            })?;
            let index = parse_index(parts[2], span)?;
            check_segment_index(segment, index, span)?;
            if head == "push" {
                Ok(VmCommand::Push(segment, index))
            } else {
                if segment == Segment::Constant {
                    return Err(Diagnostic::error(
                        "cannot pop to the constant segment".to_string(),
                        span,
                    ));
                }
                Ok(VmCommand::Pop(segment, index))
            }
        }
        "label" => {
            expect_arity(&parts, 2, span)?;
            Ok(VmCommand::Label(parts[1].to_string()))
        }
        "goto" => {
            expect_arity(&parts, 2, span)?;
            Ok(VmCommand::Goto(parts[1].to_string()))
        }
        "if-goto" => {
            expect_arity(&parts, 2, span)?;
            Ok(VmCommand::IfGoto(parts[1].to_string()))
        }
        "function" => {
            expect_arity(&parts, 3, span)?;
            Ok(VmCommand::Function(
                parts[1].to_string(),
                parse_index(parts[2], span)?,
            ))
        }
        "call" => {
            expect_arity(&parts, 3, span)?;
            Ok(VmCommand::Call(
                parts[1].to_string(),
                parse_index(parts[2], span)?,
            ))
        }
        "return" => {
            expect_arity(&parts, 1, span)?;
            Ok(VmCommand::Return)
        }
        other => Err(Diagnostic::error(
            format!("unknown VM command '{}'", other),
            span,
        )),
    }
}

fn expect_arity(parts: &[&str], arity: usize, span: Span) -> Result<(), Diagnostic> {
    if parts.len() == arity {
        Ok(())
    } else {
        Err(Diagnostic::error(
            format!(
                "'{}' takes {} argument{}, found {}",
                parts[0],
                arity - 1,
                if arity == 2 { "" } else { "s" },
                parts.len() - 1
            ),
            span,
        ))
    }
}

fn parse_index(text: &str, span: Span) -> Result<u16, Diagnostic> {
    let value: u32 = text
        .parse()
        .map_err(|_| Diagnostic::error(format!("expected a number, found '{}'", text), span))?;
    if value > MAX_INDEX as u32 {
        return Err(Diagnostic::error(
            format!("index {} out of range (maximum {})", value, MAX_INDEX),
            span,
        ));
    }
    Ok(value as u16)
}

fn check_segment_index(segment: Segment, index: u16, span: Span) -> Result<(), Diagnostic> {
    match segment {
        Segment::Pointer if index > 1 => Err(Diagnostic::error(
            format!("pointer index must be 0 or 1, found {}", index),
            span,
        )),
        Segment::Temp if index > 7 => Err(Diagnostic::error(
            format!("temp index must be 0..=7, found {}", index),
            span,
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Vec<VmCommand> {
        parse_commands(source)
            .unwrap_or_else(|errs| {
                panic!(
                    "parse failed: {:?}",
                    errs.iter().map(|e| &e.message).collect::<Vec<_>>()
                )
            })
            .into_iter()
            .map(|c| c.node)
            .collect()
    }

    #[test]
    fn test_basic_commands() {
        let cmds = parse_ok(
            "push constant 7\n\
             pop local 0\n\
             add\n\
             label LOOP\n\
             goto LOOP\n\
             if-goto END\n\
             function Main.main 2\n\
             call Math.abs 1\n\
             return\n",
        );
        assert_eq!(
            cmds,
            vec![
                VmCommand::Push(Segment::Constant, 7),
                VmCommand::Pop(Segment::Local, 0),
                VmCommand::Arithmetic(VmOp::Add),
                VmCommand::Label("LOOP".to_string()),
                VmCommand::Goto("LOOP".to_string()),
                VmCommand::IfGoto("END".to_string()),
                VmCommand::Function("Main.main".to_string(), 2),
                VmCommand::Call("Math.abs".to_string(), 1),
                VmCommand::Return,
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let cmds = parse_ok("// header\n\npush constant 1 // trailing\n   \nneg\n");
        assert_eq!(cmds.len(), 2);
    }

    #[test]
    fn test_unknown_command() {
        let errs = parse_commands("frobnicate local 0\n").unwrap_err();
        assert!(errs[0].message.contains("unknown VM command 'frobnicate'"));
    }

    #[test]
    fn test_unknown_segment() {
        let errs = parse_commands("push heap 0\n").unwrap_err();
        assert!(errs[0].message.contains("unknown segment 'heap'"));
    }

    #[test]
    fn test_pop_constant_rejected() {
        let errs = parse_commands("pop constant 5\n").unwrap_err();
        assert!(errs[0].message.contains("cannot pop to the constant segment"));
    }

    #[test]
    fn test_bad_arity() {
        let errs = parse_commands("push constant\n").unwrap_err();
        assert!(errs[0].message.contains("'push' takes 2 arguments, found 1"));
        let errs = parse_commands("add 1\n").unwrap_err();
        assert!(errs[0].message.contains("'add' takes 0 arguments"));
    }

    #[test]
    fn test_segment_index_ranges() {
        let errs = parse_commands("push pointer 2\n").unwrap_err();
        assert!(errs[0].message.contains("pointer index must be 0 or 1"));
        let errs = parse_commands("pop temp 8\n").unwrap_err();
        assert!(errs[0].message.contains("temp index must be 0..=7"));
        assert_eq!(parse_ok("push pointer 1\npop temp 7\n").len(), 2);
    }

    #[test]
    fn test_non_numeric_index() {
        let errs = parse_commands("push constant x\n").unwrap_err();
        assert!(errs[0].message.contains("expected a number"));
    }

    #[test]
    fn test_error_span_points_at_line() {
        let source = "push constant 1\nbogus\n";
        let errs = parse_commands(source).unwrap_err();
        let span = errs[0].span;
        assert_eq!(&source[span.start as usize..span.end as usize], "bogus");
    }
}
