//! VM code generation from the Jack AST.

mod emitter;

pub use emitter::VmEmitter;

use crate::ast::Class;
use crate::diagnostic::Diagnostic;

/// Compile one parsed class to VM code.
pub fn emit_class(class: &Class) -> Result<String, Vec<Diagnostic>> {
    VmEmitter::new(&class.name.node).emit(class)
}
