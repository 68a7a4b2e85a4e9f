use crate::ast::*;
use crate::diagnostic::Diagnostic;
use crate::span::Spanned;
use crate::symtab::{Kind, SymbolTable};


/// VM emitter — walks the AST and produces VM commands.
///
/// Expressions are folded strictly left-to-right: the Jack grammar has no
/// operator precedence, so `1 + 2 * 3` multiplies the sum.
pub struct VmEmitter {
    output: Vec<String>,
    class_name: String,
    table: SymbolTable,
    /// Counters for `IF_*`/`WHILE_*` labels, monotonic per emitter.
    if_counter: u32,
    while_counter: u32,
    diagnostics: Vec<Diagnostic>,
}

impl VmEmitter {
    pub fn new(class_name: &str) -> Self {
        Self {
            output: Vec::new(),
            class_name: class_name.to_string(),
            table: SymbolTable::new(),
            if_counter: 0,
            while_counter: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn emit(mut self, class: &Class) -> Result<String, Vec<Diagnostic>> {
        for dec in &class.var_decs {
            let kind = match dec.kind {
                ClassVarKind::Static => Kind::Static,
                ClassVarKind::Field => Kind::Field,
            };
            for name in &dec.names {
                self.table.define(&name.node, dec.ty.name(), kind);
            }
        }

        for sub in &class.subroutines {
            self.emit_subroutine(sub);
        }

        if !self.diagnostics.is_empty() {
            return Err(self.diagnostics);
        }
        let mut out = self.output.join("\n");
        out.push('\n');
        Ok(out)
    }

    fn emit_subroutine(&mut self, sub: &SubroutineDec) {
        self.table.start_subroutine();

        // A method receives `this` as argument 0, ahead of its parameters.
        if sub.kind == SubroutineKind::Method {
            let class_name = self.class_name.clone();
            self.table.define("this", &class_name, Kind::Arg);
        }
        for param in &sub.params {
            self.table.define(&param.name.node, param.ty.name(), Kind::Arg);
        }
        for dec in &sub.body.var_decs {
            for name in &dec.names {
                self.table.define(&name.node, dec.ty.name(), Kind::Var);
            }
        }

        let n_locals = self.table.count(Kind::Var);
        self.write(format!(
            "function {}.{} {}",
            self.class_name, sub.name.node, n_locals
        ));

        match sub.kind {
            SubroutineKind::Constructor => {
                // Allocate the object and anchor `this`.
                let n_fields = self.table.count(Kind::Field);
                self.push("constant", n_fields);
                self.call("Memory.alloc", 1);
                self.pop("pointer", 0);
            }
            SubroutineKind::Method => {
                self.push("argument", 0);
                self.pop("pointer", 0);
            }
            SubroutineKind::Function => {}
        }

        self.emit_statements(&sub.body.statements);
    }

    fn emit_statements(&mut self, statements: &[Statement]) {
        for stmt in statements {
            self.emit_statement(stmt);
        }
    }

    fn emit_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Let { name, index, value } => match index {
                Some(index) => {
                    // Compute the target address first, then the value;
                    // stash the value in temp 0 so `pop pointer 1` cannot
                    // clobber THAT before the value is ready.
                    self.push_var(name);
                    self.emit_expression(index);
                    self.arith("add");
                    self.emit_expression(value);
                    self.pop("temp", 0);
                    self.pop("pointer", 1);
                    self.push("temp", 0);
                    self.pop("that", 0);
                }
                None => {
                    self.emit_expression(value);
                    self.pop_var(name);
                }
            },
            Statement::If {
                cond,
                then_body,
                else_body,
            } => {
                let k = self.if_counter;
                self.if_counter += 1;
                let true_label = format!("IF_TRUE{}", k);
                let false_label = format!("IF_FALSE{}", k);
                let end_label = format!("IF_END{}", k);

                self.emit_expression(cond);
                self.if_goto(&true_label);
                self.goto(&false_label);
                self.label(&true_label);
                self.emit_statements(then_body);
                match else_body {
                    Some(else_body) => {
                        self.goto(&end_label);
                        self.label(&false_label);
                        self.emit_statements(else_body);
                        self.label(&end_label);
                    }
                    None => self.label(&false_label),
                }
            }
            Statement::While { cond, body } => {
                let k = self.while_counter;
                self.while_counter += 1;
                let exp_label = format!("WHILE_EXP{}", k);
                let end_label = format!("WHILE_END{}", k);

                self.label(&exp_label);
                self.emit_expression(cond);
                self.arith("not");
                self.if_goto(&end_label);
                self.emit_statements(body);
                self.goto(&exp_label);
                self.label(&end_label);
            }
            Statement::Do(call) => {
                self.emit_call(call);
                // Discard the return value.
                self.pop("temp", 0);
            }
            Statement::Return(value) => {
                match value {
                    Some(expr) => self.emit_expression(expr),
                    None => self.push("constant", 0),
                }
                self.write("return".to_string());
            }
        }
    }

    fn emit_expression(&mut self, expr: &Expression) {
        self.emit_term(&expr.first);
        for (op, term) in &expr.rest {
            self.emit_term(term);
            match op {
                BinOp::Add => self.arith("add"),
                BinOp::Sub => self.arith("sub"),
                BinOp::Mul => self.call("Math.multiply", 2),
                BinOp::Div => self.call("Math.divide", 2),
                BinOp::And => self.arith("and"),
                BinOp::Or => self.arith("or"),
                BinOp::Lt => self.arith("lt"),
                BinOp::Gt => self.arith("gt"),
                BinOp::Eq => self.arith("eq"),
            }
        }
    }

    fn emit_term(&mut self, term: &Term) {
        match term {
            Term::Int(n) => self.push("constant", *n),
            Term::Str(s) => {
                self.push("constant", s.chars().count() as u16);
                self.call("String.new", 1);
                // appendChar returns the receiver, so the string object
                // stays on the stack across the whole chain.
                for ch in s.chars() {
                    self.push("constant", ch as u16);
                    self.call("String.appendChar", 2);
                }
            }
            Term::True => {
                self.push("constant", 0);
                self.arith("not");
            }
            Term::False | Term::Null => self.push("constant", 0),
            Term::This => self.push("pointer", 0),
            Term::Var(name) => self.push_var(name),
            Term::Index(name, index) => {
                self.push_var(name);
                self.emit_expression(index);
                self.arith("add");
                self.pop("pointer", 1);
                self.push("that", 0);
            }
            Term::Call(call) => self.emit_call(call),
            Term::Paren(expr) => self.emit_expression(expr),
            Term::Unary(op, inner) => {
                self.emit_term(inner);
                match op {
                    UnaryOp::Neg => self.arith("neg"),
                    UnaryOp::Not => self.arith("not"),
                }
            }
        }
    }

    fn emit_call(&mut self, call: &SubroutineCall) {
        let (callee, implicit_args) = match &call.receiver {
            // `name(args)` — method on the current object.
            None => {
                self.push("pointer", 0);
                (format!("{}.{}", self.class_name, call.name.node), 1)
            }
            Some(receiver) => match self.table.lookup(&receiver.node) {
                // `obj.name(args)` — push the receiver, dispatch on its type.
                Some(entry) => {
                    let ty = entry.ty.clone();
                    self.push_var(receiver);
                    (format!("{}.{}", ty, call.name.node), 1)
                }
                // `Class.name(args)` — plain function call.
                None => (format!("{}.{}", receiver.node, call.name.node), 0),
            },
        };

        for arg in &call.args {
            self.emit_expression(arg);
        }
        self.call(&callee, call.args.len() as u16 + implicit_args);
    }

    fn push_var(&mut self, name: &Spanned<String>) {
        match self.table.lookup(&name.node) {
            Some(entry) => {
                let (seg, index) = (entry.kind.segment(), entry.index);
                self.push(seg, index);
            }
            None => self.undefined(name),
        }
    }

    fn pop_var(&mut self, name: &Spanned<String>) {
        match self.table.lookup(&name.node) {
            Some(entry) => {
                let (seg, index) = (entry.kind.segment(), entry.index);
                self.pop(seg, index);
            }
            None => self.undefined(name),
        }
    }

    fn undefined(&mut self, name: &Spanned<String>) {
        self.diagnostics.push(
            Diagnostic::error(format!("undefined variable '{}'", name.node), name.span)
                .with_help("declare it with 'var', 'field', 'static', or a parameter".to_string()),
        );
    }

    // ─── VM command writers ───

    fn write(&mut self, line: String) {
        self.output.push(line);
    }

    fn push(&mut self, segment: &str, index: u16) {
        self.write(format!("push {} {}", segment, index));
    }

    fn pop(&mut self, segment: &str, index: u16) {
        self.write(format!("pop {} {}", segment, index));
    }

    fn arith(&mut self, op: &str) {
        self.write(op.to_string());
    }

    fn label(&mut self, label: &str) {
        self.write(format!("label {}", label));
    }

    fn goto(&mut self, label: &str) {
        self.write(format!("goto {}", label));
    }

    fn if_goto(&mut self, label: &str) {
        self.write(format!("if-goto {}", label));
    }

    fn call(&mut self, name: &str, n_args: u16) {
        self.write(format!("call {} {}", name, n_args));
    }
}
