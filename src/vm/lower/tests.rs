use crate::vm::{lower_units, parse_commands, VmUnit};

fn unit(stem: &str, source: &str) -> VmUnit {
    VmUnit {
        stem: stem.to_string(),
        commands: parse_commands(source).unwrap_or_else(|errs| {
            panic!(
                "parse failed: {:?}",
                errs.iter().map(|e| &e.message).collect::<Vec<_>>()
            )
        }),
    }
}

fn translate(source: &str) -> String {
    lower_units(&[unit("Test", source)], false)
}

fn translate_lines(source: &str) -> Vec<String> {
    translate(source).lines().map(|l| l.to_string()).collect()
}

#[test]
fn test_push_constant_and_add() {
    insta::assert_snapshot!(
        translate("push constant 7\npush constant 8\nadd\n"),
        @r"
    @7
    D=A
    @SP
    A=M
    M=D
    @SP
    M=M+1
    @8
    D=A
    @SP
    A=M
    M=D
    @SP
    M=M+1
    @SP
    AM=M-1
    D=M
    @SP
    AM=M-1
    M=M+D
    @SP
    M=M+1
    "
    );
}

#[test]
fn test_sub_and_bitwise_ops() {
    let out = translate("push constant 9\npush constant 5\nsub\n");
    assert!(out.contains("M=M-D"));
    let out = translate("push constant 9\npush constant 5\nand\n");
    assert!(out.contains("M=M&D"));
    let out = translate("push constant 9\npush constant 5\nor\n");
    assert!(out.contains("M=M|D"));
}

#[test]
fn test_unary_ops_touch_top_in_place() {
    let out = translate_lines("push constant 3\nneg\n");
    assert_eq!(out[7..10], ["@SP", "A=M-1", "M=-M"]);
    // depth preserved: no SP adjustment after the in-place write
    assert_eq!(out.len(), 10);
    let out = translate("push constant 3\nnot\n");
    assert!(out.contains("M=!M"));
}

#[test]
fn test_comparison_shape() {
    let out = translate_lines("push constant 1\npush constant 2\neq\n");
    assert_eq!(
        out[14..],
        [
            "@SP",
            "AM=M-1",
            "D=M",
            "@SP",
            "AM=M-1",
            "D=M-D",
            "@TRUE_0",
            "D;JEQ",
            "@SP",
            "A=M",
            "M=0",
            "@END_0",
            "0;JMP",
            "(TRUE_0)",
            "@SP",
            "A=M",
            "M=-1",
            "(END_0)",
            "@SP",
            "M=M+1",
        ]
    );
}

#[test]
fn test_comparison_jumps() {
    assert!(translate("push constant 1\npush constant 2\ngt\n").contains("D;JGT"));
    assert!(translate("push constant 1\npush constant 2\nlt\n").contains("D;JLT"));
}

#[test]
fn test_comparison_labels_unique_across_unit() {
    let out = translate("push constant 1\npush constant 2\neq\npush constant 3\npush constant 4\nlt\n");
    for label in ["(TRUE_0)", "(END_0)", "(TRUE_1)", "(END_1)"] {
        assert!(out.contains(label), "missing {}", label);
    }
    // every label defined exactly once
    for line in out.lines().filter(|l| l.starts_with('(')) {
        assert_eq!(
            out.lines().filter(|l| l == &line).count(),
            1,
            "label {} redefined",
            line
        );
    }
}

#[test]
fn test_indexed_segment_push() {
    let out = translate_lines("push local 2\n");
    assert_eq!(out[..5], ["@LCL", "D=M", "@2", "A=D+A", "D=M"]);
    let out = translate_lines("push argument 0\n");
    assert_eq!(out[0], "@ARG");
    let out = translate_lines("push this 1\n");
    assert_eq!(out[0], "@THIS");
    let out = translate_lines("push that 3\n");
    assert_eq!(out[0], "@THAT");
}

#[test]
fn test_indexed_segment_pop_stages_address_in_r13() {
    let out = translate_lines("push constant 1\npop argument 2\n");
    assert_eq!(
        out[7..],
        [
            "@ARG",
            "D=M",
            "@2",
            "D=D+A",
            "@R13",
            "M=D",
            "@SP",
            "AM=M-1",
            "D=M",
            "@R13",
            "A=M",
            "M=D",
        ]
    );
}

#[test]
fn test_temp_is_fixed_base_5() {
    let out = translate_lines("push temp 3\n");
    assert_eq!(out[..2], ["@8", "D=M"]);
    let out = translate("push constant 1\npop temp 0\n");
    assert!(out.contains("@5\nM=D"));
}

#[test]
fn test_pointer_is_this_and_that_directly() {
    let out = translate_lines("push pointer 0\n");
    assert_eq!(out[..2], ["@THIS", "D=M"]);
    let out = translate_lines("push pointer 1\n");
    assert_eq!(out[..2], ["@THAT", "D=M"]);
    let out = translate("push constant 1\npop pointer 1\n");
    assert!(out.ends_with("@THAT\nM=D\n"));
}

#[test]
fn test_static_uses_file_stem() {
    let out = translate("push static 3\npush constant 1\npop static 0\n");
    assert!(out.contains("@Test.3"));
    assert!(out.contains("@Test.0"));
}

#[test]
fn test_static_stem_changes_per_unit() {
    let out = lower_units(
        &[
            unit("Foo", "push static 0\n"),
            unit("Bar", "push static 0\n"),
        ],
        false,
    );
    assert!(out.contains("@Foo.0"));
    assert!(out.contains("@Bar.0"));
}

#[test]
fn test_labels_scoped_to_enclosing_function() {
    let out = translate(
        "function Main.loop 0\nlabel TOP\ngoto TOP\npush constant 1\nif-goto TOP\n",
    );
    assert!(out.contains("(Main.loop$TOP)"));
    assert_eq!(out.matches("@Main.loop$TOP").count(), 2);
}

#[test]
fn test_bare_label_outside_function() {
    let out = translate("label START\ngoto START\n");
    assert!(out.contains("(START)"));
    assert!(out.contains("@START"));
    assert!(!out.contains("$"));
}

#[test]
fn test_if_goto_pops_and_jumps_on_nonzero() {
    let out = translate_lines("push constant 1\nif-goto X\n");
    assert_eq!(out[7..], ["@SP", "AM=M-1", "D=M", "@X", "D;JNE"]);
}

#[test]
fn test_function_pushes_zeroed_locals() {
    let out = translate_lines("function Main.main 2\n");
    assert_eq!(out[0], "(Main.main)");
    assert_eq!(out.len(), 1 + 2 * 7);
    assert_eq!(out[1..8], ["@0", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]);
}

#[test]
fn test_call_builds_frame() {
    let out = translate_lines("call Main.run 2\n");
    assert_eq!(out[0], "@RETURN_0");
    assert_eq!(out[1], "D=A");
    // saved registers in order
    for (i, register) in ["@LCL", "@ARG", "@THIS", "@THAT"].iter().enumerate() {
        assert_eq!(out[7 + i * 7], *register);
        assert_eq!(out[8 + i * 7], "D=M");
    }
    // ARG = SP - 2 - 5
    let at = out.iter().position(|l| l == "@7").expect("@7 offset");
    assert_eq!(out[at - 2..at + 4], ["@SP", "D=M", "@7", "D=D-A", "@ARG", "M=D"]);
    // LCL = SP, then jump and land label
    assert_eq!(out[out.len() - 3], "@Main.run");
    assert_eq!(out[out.len() - 2], "0;JMP");
    assert_eq!(out[out.len() - 1], "(RETURN_0)");
}

#[test]
fn test_return_restores_frame() {
    let out = translate("function Main.f 0\npush constant 0\nreturn\n");
    // frame in R13, return address in R14
    assert!(out.contains("@LCL\nD=M\n@R13\nM=D\n@5\nA=D-A\nD=M\n@R14\nM=D"));
    // restore order THAT, THIS, ARG, LCL at offsets 1..4
    let that = out.find("@THAT\nM=D").unwrap();
    let this = out.find("@THIS\nM=D").unwrap();
    let lcl = out.find("@LCL\nM=D").unwrap();
    assert!(that < this && this < lcl);
    assert!(out.ends_with("@R14\nA=M\n0;JMP\n"));
}

#[test]
fn test_bootstrap_prefix() {
    let out = lower_units(&[unit("Sys", "function Sys.init 0\n")], true);
    assert!(out.starts_with("@256\nD=A\n@SP\nM=D\n@RETURN_0\n"));
    assert!(out.contains("@Sys.init\n0;JMP\n(RETURN_0)"));
}

#[test]
fn test_no_bootstrap_when_disabled() {
    let out = lower_units(&[unit("Main", "push constant 1\n")], false);
    assert!(out.starts_with("@1\n"));
    assert!(!out.contains("Sys.init"));
}

#[test]
fn test_call_and_comparison_share_counter() {
    let out = translate("push constant 1\npush constant 1\neq\ncall Main.f 0\n");
    assert!(out.contains("(TRUE_0)"));
    assert!(out.contains("(RETURN_1)"));
}

#[test]
fn test_stack_neutral_command_counts() {
    // push adds 7 instructions, binary op adds 8, so a push/push/op
    // program is 22 lines; no label lines are counted in this program.
    let out = translate_lines("push constant 1\npush constant 2\nand\n");
    assert_eq!(out.len(), 22);
}
