//! Hack assembly lowering — realizes the VM's stack semantics on the
//! Hack machine.
//!
//! SP points at the next free cell above the top of stack. Indexed pops
//! stage the target address in R13 so the data pop cannot clobber D;
//! `return` stages the frame pointer in R13 and the return address in R14.

use super::{Segment, VmCommand, VmOp};

#[cfg(test)]
mod tests;

pub struct HackLowering {
    output: Vec<String>,
    /// Shared counter for `TRUE_`/`END_`/`RETURN_` labels, unique across
    /// the whole translation unit.
    label_counter: u32,
    /// Stem of the current `.vm` file, naming its static variables.
    file_stem: String,
    /// Enclosing function, scoping `label`/`goto`/`if-goto`.
    current_function: Option<String>,
}

impl Default for HackLowering {
    fn default() -> Self {
        Self::new()
    }
}

impl HackLowering {
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            label_counter: 0,
            file_stem: String::new(),
            current_function: None,
        }
    }

    /// Begin translating a new source file; statics switch to `stem.i`.
    pub fn set_file(&mut self, stem: &str) {
        self.file_stem = stem.to_string();
    }

    /// SP = 256, then call Sys.init with no arguments.
    pub fn emit_bootstrap(&mut self) {
        self.inst("@256");
        self.inst("D=A");
        self.inst("@SP");
        self.inst("M=D");
        self.lower_call("Sys.init", 0);
    }

    pub fn finish(self) -> String {
        let mut out = self.output.join("\n");
        out.push('\n');
        out
    }

    pub fn lower_command(&mut self, cmd: &VmCommand) {
        match cmd {
            VmCommand::Arithmetic(op) => self.lower_arithmetic(*op),
            VmCommand::Push(segment, index) => self.lower_push(*segment, *index),
            VmCommand::Pop(segment, index) => self.lower_pop(*segment, *index),
            VmCommand::Label(label) => {
                let scoped = self.scoped_label(label);
                self.inst(&format!("({})", scoped));
            }
            VmCommand::Goto(label) => {
                let scoped = self.scoped_label(label);
                self.inst(&format!("@{}", scoped));
                self.inst("0;JMP");
            }
            VmCommand::IfGoto(label) => {
                // Pops the condition; jumps on any non-zero value.
                self.pop_to_d();
                let scoped = self.scoped_label(label);
                self.inst(&format!("@{}", scoped));
                self.inst("D;JNE");
            }
            VmCommand::Function(name, n_locals) => self.lower_function(name, *n_locals),
            VmCommand::Call(name, n_args) => self.lower_call(name, *n_args),
            VmCommand::Return => self.lower_return(),
        }
    }

    fn lower_arithmetic(&mut self, op: VmOp) {
        match op {
            VmOp::Add => self.binary_op("M=M+D"),
            VmOp::Sub => self.binary_op("M=M-D"),
            VmOp::And => self.binary_op("M=M&D"),
            VmOp::Or => self.binary_op("M=M|D"),
            VmOp::Neg => self.unary_op("M=-M"),
            VmOp::Not => self.unary_op("M=!M"),
            VmOp::Eq => self.comparison("JEQ"),
            VmOp::Gt => self.comparison("JGT"),
            VmOp::Lt => self.comparison("JLT"),
        }
    }

    /// x op y with y in D, operating in place on x's cell.
    fn binary_op(&mut self, compute: &str) {
        self.pop_to_d();
        self.inst("@SP");
        self.inst("AM=M-1");
        self.inst(compute);
        self.inc_sp();
    }

    fn unary_op(&mut self, compute: &str) {
        self.inst("@SP");
        self.inst("A=M-1");
        self.inst(compute);
    }

    /// Compute x - y and branch; true pushes -1, false pushes 0.
    fn comparison(&mut self, jump: &str) {
        let k = self.next_label_index();
        let true_label = format!("TRUE_{}", k);
        let end_label = format!("END_{}", k);

        self.pop_to_d();
        self.inst("@SP");
        self.inst("AM=M-1");
        self.inst("D=M-D");
        self.inst(&format!("@{}", true_label));
        self.inst(&format!("D;{}", jump));
        self.inst("@SP");
        self.inst("A=M");
        self.inst("M=0");
        self.inst(&format!("@{}", end_label));
        self.inst("0;JMP");
        self.inst(&format!("({})", true_label));
        self.inst("@SP");
        self.inst("A=M");
        self.inst("M=-1");
        self.inst(&format!("({})", end_label));
        self.inc_sp();
    }

    fn lower_push(&mut self, segment: Segment, index: u16) {
        match segment {
            Segment::Constant => {
                self.inst(&format!("@{}", index));
                self.inst("D=A");
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = segment.base_register().unwrap();
                self.inst(&format!("@{}", base));
                self.inst("D=M");
                self.inst(&format!("@{}", index));
                self.inst("A=D+A");
                self.inst("D=M");
            }
            Segment::Temp => {
                self.inst(&format!("@{}", 5 + index));
                self.inst("D=M");
            }
            Segment::Pointer => {
                self.inst(if index == 0 { "@THIS" } else { "@THAT" });
                self.inst("D=M");
            }
            Segment::Static => {
                self.inst(&format!("@{}.{}", self.file_stem, index));
                self.inst("D=M");
            }
        }
        self.push_d();
    }

    fn lower_pop(&mut self, segment: Segment, index: u16) {
        match segment {
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                // Stage the effective address in R13 first.
                let base = segment.base_register().unwrap();
                self.inst(&format!("@{}", base));
                self.inst("D=M");
                self.inst(&format!("@{}", index));
                self.inst("D=D+A");
                self.inst("@R13");
                self.inst("M=D");
                self.pop_to_d();
                self.inst("@R13");
                self.inst("A=M");
                self.inst("M=D");
            }
            Segment::Temp => {
                self.pop_to_d();
                self.inst(&format!("@{}", 5 + index));
                self.inst("M=D");
            }
            Segment::Pointer => {
                self.pop_to_d();
                self.inst(if index == 0 { "@THIS" } else { "@THAT" });
                self.inst("M=D");
            }
            Segment::Static => {
                self.pop_to_d();
                self.inst(&format!("@{}.{}", self.file_stem, index));
                self.inst("M=D");
            }
            Segment::Constant => unreachable!("rejected by the parser"),
        }
    }

    fn lower_function(&mut self, name: &str, n_locals: u16) {
        self.current_function = Some(name.to_string());
        self.inst(&format!("({})", name));
        for _ in 0..n_locals {
            self.inst("@0");
            self.inst("D=A");
            self.push_d();
        }
    }

    fn lower_call(&mut self, name: &str, n_args: u16) {
        let k = self.next_label_index();
        let return_label = format!("RETURN_{}", k);

        // push return address, then the caller's LCL/ARG/THIS/THAT
        self.inst(&format!("@{}", return_label));
        self.inst("D=A");
        self.push_d();
        for register in ["LCL", "ARG", "THIS", "THAT"] {
            self.inst(&format!("@{}", register));
            self.inst("D=M");
            self.push_d();
        }

        // ARG = SP - nArgs - 5
        self.inst("@SP");
        self.inst("D=M");
        self.inst(&format!("@{}", n_args + 5));
        self.inst("D=D-A");
        self.inst("@ARG");
        self.inst("M=D");

        // LCL = SP
        self.inst("@SP");
        self.inst("D=M");
        self.inst("@LCL");
        self.inst("M=D");

        self.inst(&format!("@{}", name));
        self.inst("0;JMP");
        self.inst(&format!("({})", return_label));
    }

    fn lower_return(&mut self) {
        // FRAME = LCL (R13)
        self.inst("@LCL");
        self.inst("D=M");
        self.inst("@R13");
        self.inst("M=D");

        // RET = *(FRAME - 5) (R14); D still holds FRAME
        self.inst("@5");
        self.inst("A=D-A");
        self.inst("D=M");
        self.inst("@R14");
        self.inst("M=D");

        // *ARG = pop()
        self.pop_to_d();
        self.inst("@ARG");
        self.inst("A=M");
        self.inst("M=D");

        // SP = ARG + 1
        self.inst("@ARG");
        self.inst("D=M+1");
        self.inst("@SP");
        self.inst("M=D");

        // restore THAT, THIS, ARG, LCL from the frame
        for (offset, register) in [(1, "THAT"), (2, "THIS"), (3, "ARG"), (4, "LCL")] {
            self.inst("@R13");
            self.inst("D=M");
            self.inst(&format!("@{}", offset));
            self.inst("A=D-A");
            self.inst("D=M");
            self.inst(&format!("@{}", register));
            self.inst("M=D");
        }

        // goto RET
        self.inst("@R14");
        self.inst("A=M");
        self.inst("0;JMP");
    }

    fn scoped_label(&self, label: &str) -> String {
        match &self.current_function {
            Some(function) => format!("{}${}", function, label),
            None => label.to_string(),
        }
    }

    fn next_label_index(&mut self) -> u32 {
        let k = self.label_counter;
        self.label_counter += 1;
        k
    }

    fn push_d(&mut self) {
        self.inst("@SP");
        self.inst("A=M");
        self.inst("M=D");
        self.inc_sp();
    }

    fn pop_to_d(&mut self) {
        self.inst("@SP");
        self.inst("AM=M-1");
        self.inst("D=M");
    }

    fn inc_sp(&mut self) {
        self.inst("@SP");
        self.inst("M=M+1");
    }

    fn inst(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}
