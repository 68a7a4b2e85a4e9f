//! Fixed translation tables for C-instruction fields.
//!
//! The tables are perfect-hash maps built at compile time; lookups of
//! unknown mnemonics return `None` and are surfaced as hard errors by the
//! parser rather than falling back to zero bits.

use phf::phf_map;

/// dest mnemonic → 3 bits.
static DEST_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "M" => "001",
    "D" => "010",
    "MD" => "011",
    "A" => "100",
    "AM" => "101",
    "AD" => "110",
    "AMD" => "111",
};

/// jump mnemonic → 3 bits.
static JUMP_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "JGT" => "001",
    "JEQ" => "010",
    "JGE" => "011",
    "JLT" => "100",
    "JNE" => "101",
    "JLE" => "110",
    "JMP" => "111",
};

/// comp mnemonic → a-bit + 6 c-bits. The 28 canonical forms: 18 with
/// a=0 (A register) and 10 with a=1 (M register).
static COMP_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "0" => "0101010",
    "1" => "0111111",
    "-1" => "0111010",
    "D" => "0001100",
    "A" => "0110000",
    "!D" => "0001101",
    "!A" => "0110001",
    "-D" => "0001111",
    "-A" => "0110011",
    "D+1" => "0011111",
    "A+1" => "0110111",
    "D-1" => "0001110",
    "A-1" => "0110010",
    "D+A" => "0000010",
    "D-A" => "0010011",
    "A-D" => "0000111",
    "D&A" => "0000000",
    "D|A" => "0010101",

    "M" => "1110000",
    "!M" => "1110001",
    "-M" => "1110011",
    "M+1" => "1110111",
    "M-1" => "1110010",
    "D+M" => "1000010",
    "D-M" => "1010011",
    "M-D" => "1000111",
    "D&M" => "1000000",
    "D|M" => "1010101",
};

/// None means no destination (bits 000).
pub fn dest(mnemonic: Option<&str>) -> Option<&'static str> {
    match mnemonic {
        None => Some("000"),
        Some(m) => DEST_MAP.get(m).copied(),
    }
}

/// None means no jump (bits 000).
pub fn jump(mnemonic: Option<&str>) -> Option<&'static str> {
    match mnemonic {
        None => Some("000"),
        Some(m) => JUMP_MAP.get(m).copied(),
    }
}

pub fn comp(mnemonic: &str) -> Option<&'static str> {
    COMP_MAP.get(mnemonic).copied()
}
