use crate::ast::*;
use crate::diagnostic::Diagnostic;
use crate::lexeme::{Keyword, Token};
use crate::span::{Span, Spanned};

const MAX_NESTING_DEPTH: u32 = 256;

/// Recursive-descent parser over the token stream, one token of lookahead.
pub(crate) struct Parser {
    tokens: Vec<Spanned<Token>>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    depth: u32,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Spanned<Token>>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn parse_class(mut self) -> Result<Class, Vec<Diagnostic>> {
        self.expect_keyword(Keyword::Class);
        let name = self.expect_ident();
        self.expect_sym('{');

        let mut var_decs = Vec::new();
        while self.at_any_keyword(&[Keyword::Static, Keyword::Field]) {
            var_decs.push(self.parse_class_var_dec());
        }

        let mut subroutines = Vec::new();
        while self.at_any_keyword(&[Keyword::Constructor, Keyword::Function, Keyword::Method]) {
            subroutines.push(self.parse_subroutine());
        }

        self.expect_sym('}');
        if !matches!(self.peek(), Token::Eof) {
            self.error_at_current("expected end of file after class body");
        }

        if !self.diagnostics.is_empty() {
            return Err(self.diagnostics);
        }
        Ok(Class {
            name,
            var_decs,
            subroutines,
        })
    }

    fn parse_class_var_dec(&mut self) -> ClassVarDec {
        let kind = if self.eat_keyword(Keyword::Static) {
            ClassVarKind::Static
        } else {
            self.expect_keyword(Keyword::Field);
            ClassVarKind::Field
        };
        let ty = self.parse_type();
        let mut names = vec![self.expect_ident()];
        while self.eat_sym(',') {
            names.push(self.expect_ident());
        }
        self.expect_sym(';');
        ClassVarDec { kind, ty, names }
    }

    fn parse_subroutine(&mut self) -> SubroutineDec {
        let kind = if self.eat_keyword(Keyword::Constructor) {
            SubroutineKind::Constructor
        } else if self.eat_keyword(Keyword::Function) {
            SubroutineKind::Function
        } else {
            self.expect_keyword(Keyword::Method);
            SubroutineKind::Method
        };

        let return_ty = if self.eat_keyword(Keyword::Void) {
            ReturnType::Void
        } else {
            ReturnType::Of(self.parse_type())
        };

        let name = self.expect_ident();
        self.expect_sym('(');
        let params = self.parse_parameter_list();
        self.expect_sym(')');
        let body = self.parse_subroutine_body();

        SubroutineDec {
            kind,
            return_ty,
            name,
            params,
            body,
        }
    }

    fn parse_parameter_list(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if self.at_sym(')') {
            return params;
        }
        loop {
            let ty = self.parse_type();
            let name = self.expect_ident();
            params.push(Param { ty, name });
            if !self.eat_sym(',') {
                break;
            }
        }
        params
    }

    fn parse_subroutine_body(&mut self) -> SubroutineBody {
        self.expect_sym('{');
        let mut var_decs = Vec::new();
        while self.at_keyword(Keyword::Var) {
            var_decs.push(self.parse_var_dec());
        }
        let statements = self.parse_statements();
        self.expect_sym('}');
        SubroutineBody {
            var_decs,
            statements,
        }
    }

    fn parse_var_dec(&mut self) -> VarDec {
        self.expect_keyword(Keyword::Var);
        let ty = self.parse_type();
        let mut names = vec![self.expect_ident()];
        while self.eat_sym(',') {
            names.push(self.expect_ident());
        }
        self.expect_sym(';');
        VarDec { ty, names }
    }

    fn parse_type(&mut self) -> Type {
        if self.eat_keyword(Keyword::Int) {
            Type::Int
        } else if self.eat_keyword(Keyword::Char) {
            Type::Char
        } else if self.eat_keyword(Keyword::Boolean) {
            Type::Boolean
        } else {
            Type::ClassName(self.expect_ident().node)
        }
    }

    /// Parse statements until a token that cannot start one ('}' in
    /// well-formed input).
    fn parse_statements(&mut self) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            let stmt = if self.at_keyword(Keyword::Let) {
                self.parse_let()
            } else if self.at_keyword(Keyword::If) {
                self.parse_if()
            } else if self.at_keyword(Keyword::While) {
                self.parse_while()
            } else if self.at_keyword(Keyword::Do) {
                self.parse_do()
            } else if self.at_keyword(Keyword::Return) {
                self.parse_return()
            } else {
                break;
            };
            statements.push(stmt);
        }
        statements
    }

    fn parse_let(&mut self) -> Statement {
        self.expect_keyword(Keyword::Let);
        let name = self.expect_ident();
        let index = if self.eat_sym('[') {
            let expr = self.parse_expression();
            self.expect_sym(']');
            Some(expr)
        } else {
            None
        };
        self.expect_sym('=');
        let value = self.parse_expression();
        self.expect_sym(';');
        Statement::Let { name, index, value }
    }

    fn parse_if(&mut self) -> Statement {
        self.expect_keyword(Keyword::If);
        self.expect_sym('(');
        let cond = self.parse_expression();
        self.expect_sym(')');
        self.expect_sym('{');
        let then_body = self.parse_statements();
        self.expect_sym('}');
        let else_body = if self.eat_keyword(Keyword::Else) {
            self.expect_sym('{');
            let body = self.parse_statements();
            self.expect_sym('}');
            Some(body)
        } else {
            None
        };
        Statement::If {
            cond,
            then_body,
            else_body,
        }
    }

    fn parse_while(&mut self) -> Statement {
        self.expect_keyword(Keyword::While);
        self.expect_sym('(');
        let cond = self.parse_expression();
        self.expect_sym(')');
        self.expect_sym('{');
        let body = self.parse_statements();
        self.expect_sym('}');
        Statement::While { cond, body }
    }

    fn parse_do(&mut self) -> Statement {
        self.expect_keyword(Keyword::Do);
        let first = self.expect_ident();
        let call = self.parse_call_after_name(first);
        self.expect_sym(';');
        Statement::Do(call)
    }

    fn parse_return(&mut self) -> Statement {
        self.expect_keyword(Keyword::Return);
        let value = if self.at_sym(';') {
            None
        } else {
            Some(self.parse_expression())
        };
        self.expect_sym(';');
        Statement::Return(value)
    }

    fn parse_expression(&mut self) -> Expression {
        if !self.enter_nesting() {
            return Expression {
                first: Term::Int(0),
                rest: Vec::new(),
            };
        }
        let first = self.parse_term();
        let mut rest = Vec::new();
        while let Token::Sym(ch) = *self.peek() {
            let Some(op) = BinOp::from_symbol(ch) else {
                break;
            };
            self.advance();
            rest.push((op, self.parse_term()));
        }
        self.exit_nesting();
        Expression { first, rest }
    }

    fn parse_term(&mut self) -> Term {
        if !self.enter_nesting() {
            return Term::Int(0);
        }
        let term = match self.peek().clone() {
            Token::Int(n) => {
                self.advance();
                Term::Int(n)
            }
            Token::Str(s) => {
                self.advance();
                Term::Str(s)
            }
            Token::Keyword(Keyword::True) => {
                self.advance();
                Term::True
            }
            Token::Keyword(Keyword::False) => {
                self.advance();
                Term::False
            }
            Token::Keyword(Keyword::Null) => {
                self.advance();
                Term::Null
            }
            Token::Keyword(Keyword::This) => {
                self.advance();
                Term::This
            }
            Token::Sym('(') => {
                self.advance();
                let expr = self.parse_expression();
                self.expect_sym(')');
                Term::Paren(Box::new(expr))
            }
            Token::Sym('-') => {
                self.advance();
                Term::Unary(UnaryOp::Neg, Box::new(self.parse_term()))
            }
            Token::Sym('~') => {
                self.advance();
                Term::Unary(UnaryOp::Not, Box::new(self.parse_term()))
            }
            Token::Ident(_) => {
                let name = self.expect_ident();
                match self.peek() {
                    Token::Sym('[') => {
                        self.advance();
                        let index = self.parse_expression();
                        self.expect_sym(']');
                        Term::Index(name, Box::new(index))
                    }
                    Token::Sym('(') | Token::Sym('.') => {
                        Term::Call(self.parse_call_after_name(name))
                    }
                    _ => Term::Var(name),
                }
            }
            other => {
                self.error_at_current(&format!("expected a term, found {}", other.description()));
                self.advance();
                Term::Int(0)
            }
        };
        self.exit_nesting();
        term
    }

    /// Parse the remainder of a subroutine call whose leading identifier
    /// has already been consumed.
    fn parse_call_after_name(&mut self, first: Spanned<String>) -> SubroutineCall {
        let (receiver, name) = if self.eat_sym('.') {
            (Some(first), self.expect_ident())
        } else {
            (None, first)
        };
        self.expect_sym('(');
        let args = self.parse_expression_list();
        self.expect_sym(')');
        SubroutineCall {
            receiver,
            name,
            args,
        }
    }

    fn parse_expression_list(&mut self) -> Vec<Expression> {
        let mut args = Vec::new();
        if self.at_sym(')') {
            return args;
        }
        args.push(self.parse_expression());
        while self.eat_sym(',') {
            args.push(self.parse_expression());
        }
        args
    }

    // ─── Cursor helpers ───

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].node
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn advance(&mut self) -> &Spanned<Token> {
        let tok = &self.tokens[self.pos];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at_sym(&self, ch: char) -> bool {
        *self.peek() == Token::Sym(ch)
    }

    fn at_keyword(&self, kw: Keyword) -> bool {
        *self.peek() == Token::Keyword(kw)
    }

    fn at_any_keyword(&self, kws: &[Keyword]) -> bool {
        kws.iter().any(|&kw| self.at_keyword(kw))
    }

    fn eat_sym(&mut self, ch: char) -> bool {
        if self.at_sym(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.at_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_sym(&mut self, ch: char) -> Span {
        if self.at_sym(ch) {
            let span = self.current_span();
            self.advance();
            span
        } else {
            self.error_at_current(&format!(
                "expected '{}', found {}",
                ch,
                self.peek().description()
            ));
            // Skip the offender so parsing always makes progress.
            let span = self.current_span();
            self.advance();
            span
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Span {
        if self.at_keyword(kw) {
            let span = self.current_span();
            self.advance();
            span
        } else {
            self.error_at_current(&format!(
                "expected '{}', found {}",
                kw,
                self.peek().description()
            ));
            let span = self.current_span();
            self.advance();
            span
        }
    }

    fn expect_ident(&mut self) -> Spanned<String> {
        if let Token::Ident(name) = self.peek() {
            let name = name.clone();
            let span = self.current_span();
            self.advance();
            Spanned::new(name, span)
        } else {
            self.error_at_current(&format!(
                "expected identifier, found {}",
                self.peek().description()
            ));
            let span = self.current_span();
            self.advance();
            Spanned::new(String::new(), span)
        }
    }

    fn enter_nesting(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.error_with_help(
                "nesting depth exceeded (maximum 256 levels)",
                "split deeply nested expressions across several statements",
            );
            return false;
        }
        true
    }

    fn exit_nesting(&mut self) {
        self.depth -= 1;
    }

    fn error_at_current(&mut self, msg: &str) {
        self.diagnostics
            .push(Diagnostic::error(msg.to_string(), self.current_span()));
    }

    fn error_with_help(&mut self, msg: &str, help: &str) {
        self.diagnostics.push(
            Diagnostic::error(msg.to_string(), self.current_span())
                .with_help(help.to_string()),
        );
    }
}
