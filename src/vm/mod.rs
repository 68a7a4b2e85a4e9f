//! The stack VM layer: command model, `.vm` parser, and Hack lowering.

pub mod lower;
mod parse;

pub use lower::HackLowering;
pub use parse::parse_commands;

use crate::span::Spanned;

/// The nine VM arithmetic-logical commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VmOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl VmOp {
    pub fn from_str(s: &str) -> Option<VmOp> {
        match s {
            "add" => Some(VmOp::Add),
            "sub" => Some(VmOp::Sub),
            "neg" => Some(VmOp::Neg),
            "eq" => Some(VmOp::Eq),
            "gt" => Some(VmOp::Gt),
            "lt" => Some(VmOp::Lt),
            "and" => Some(VmOp::And),
            "or" => Some(VmOp::Or),
            "not" => Some(VmOp::Not),
            _ => None,
        }
    }
}

/// The eight VM memory segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
}

impl Segment {
    pub fn from_str(s: &str) -> Option<Segment> {
        match s {
            "constant" => Some(Segment::Constant),
            "local" => Some(Segment::Local),
            "argument" => Some(Segment::Argument),
            "this" => Some(Segment::This),
            "that" => Some(Segment::That),
            "temp" => Some(Segment::Temp),
            "pointer" => Some(Segment::Pointer),
            "static" => Some(Segment::Static),
            _ => None,
        }
    }

    /// The base-pointer register for the four indirect segments.
    pub fn base_register(self) -> Option<&'static str> {
        match self {
            Segment::Local => Some("LCL"),
            Segment::Argument => Some("ARG"),
            Segment::This => Some("THIS"),
            Segment::That => Some("THAT"),
            _ => None,
        }
    }
}

/// One VM command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VmCommand {
    Arithmetic(VmOp),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function(String, u16),
    Call(String, u16),
    Return,
}

/// A parsed `.vm` translation unit: the file stem (used to name static
/// variables) and its commands.
pub struct VmUnit {
    pub stem: String,
    pub commands: Vec<Spanned<VmCommand>>,
}

/// Lower a sequence of parsed units into one assembly program.
///
/// Units are emitted in the order given; directory mode sorts filenames
/// before parsing. With `bootstrap` set, the output starts with `SP=256`
/// and a `call Sys.init 0` expansion.
pub fn lower_units(units: &[VmUnit], bootstrap: bool) -> String {
    let mut lowering = HackLowering::new();
    if bootstrap {
        lowering.emit_bootstrap();
    }
    for unit in units {
        lowering.set_file(&unit.stem);
        for cmd in &unit.commands {
            lowering.lower_command(&cmd.node);
        }
    }
    lowering.finish()
}
