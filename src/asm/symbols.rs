use std::collections::HashMap;

use phf::phf_map;

/// Symbols built into the Hack platform.
static PREDEFINED: phf::Map<&'static str, u16> = phf_map! {
    "SP" => 0,
    "LCL" => 1,
    "ARG" => 2,
    "THIS" => 3,
    "THAT" => 4,
    "R0" => 0,
    "R1" => 1,
    "R2" => 2,
    "R3" => 3,
    "R4" => 4,
    "R5" => 5,
    "R6" => 6,
    "R7" => 7,
    "R8" => 8,
    "R9" => 9,
    "R10" => 10,
    "R11" => 11,
    "R12" => 12,
    "R13" => 13,
    "R14" => 14,
    "R15" => 15,
    "SCREEN" => 16384,
    "KBD" => 24576,
};

/// First RAM address handed to program variables.
const FIRST_VARIABLE: u16 = 16;

/// Assembler symbol table: predefined symbols behind a map of labels and
/// variables discovered during the two passes.
pub struct SymbolTable {
    user: HashMap<String, u16>,
    next_variable: u16,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            user: HashMap::new(),
            next_variable: FIRST_VARIABLE,
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        PREDEFINED.contains_key(symbol) || self.user.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<u16> {
        PREDEFINED
            .get(symbol)
            .copied()
            .or_else(|| self.user.get(symbol).copied())
    }

    /// Bind a label to a ROM address (pass one).
    pub fn bind_label(&mut self, symbol: &str, address: u16) {
        self.user.insert(symbol.to_string(), address);
    }

    /// Resolve a symbol, allocating the next free RAM cell the first time
    /// a variable is referenced (pass two).
    pub fn resolve_or_allocate(&mut self, symbol: &str) -> u16 {
        if let Some(address) = self.get(symbol) {
            return address;
        }
        let address = self.next_variable;
        self.user.insert(symbol.to_string(), address);
        self.next_variable += 1;
        address
    }
}
