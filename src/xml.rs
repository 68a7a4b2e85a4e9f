//! Parse-tree XML rendering for the syntax analyzer.
//!
//! Non-terminals become wrapping elements, terminals become
//! `<kind> value </kind>` lines, two spaces of indent per level. The
//! element set mirrors the grammar productions one-to-one, so the output
//! is a faithful serialization of the parse.

use crate::ast::*;
use crate::lexeme::{Keyword, Token};
use crate::span::Spanned;

/// Render the flat `<tokens>` element for tokenizer-only mode.
pub fn tokens_to_xml(tokens: &[Spanned<Token>]) -> String {
    let mut out = String::from("<tokens>\n");
    for tok in tokens {
        match &tok.node {
            Token::Keyword(kw) => terminal_line(&mut out, "keyword", kw.as_str()),
            Token::Sym(ch) => terminal_line(&mut out, "symbol", &escape_symbol(*ch)),
            Token::Ident(name) => terminal_line(&mut out, "identifier", name),
            Token::Int(n) => terminal_line(&mut out, "integerConstant", &n.to_string()),
            Token::Str(s) => terminal_line(&mut out, "stringConstant", s),
            Token::Eof => {}
        }
    }
    out.push_str("</tokens>\n");
    out
}

/// Render the indented parse tree for a class.
pub fn class_to_xml(class: &Class) -> String {
    let mut w = XmlWriter::new();
    w.write_class(class);
    w.out
}

fn terminal_line(out: &mut String, tag: &str, value: &str) {
    out.push_str(&format!("<{}> {} </{}>\n", tag, value, tag));
}

/// `<` `>` `&` `"` are escaped in symbol terminals; everything else is
/// emitted verbatim.
fn escape_symbol(ch: char) -> String {
    match ch {
        '<' => "&lt;".to_string(),
        '>' => "&gt;".to_string(),
        '&' => "&amp;".to_string(),
        '"' => "&quot;".to_string(),
        other => other.to_string(),
    }
}

struct XmlWriter {
    out: String,
    indent: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn open(&mut self, tag: &str) {
        self.line(&format!("<{}>", tag));
        self.indent += 1;
    }

    fn close(&mut self, tag: &str) {
        self.indent -= 1;
        self.line(&format!("</{}>", tag));
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn terminal(&mut self, tag: &str, value: &str) {
        self.line(&format!("<{}> {} </{}>", tag, value, tag));
    }

    fn keyword(&mut self, kw: Keyword) {
        self.terminal("keyword", kw.as_str());
    }

    fn symbol(&mut self, ch: char) {
        let value = escape_symbol(ch);
        self.terminal("symbol", &value);
    }

    fn identifier(&mut self, name: &str) {
        self.terminal("identifier", name);
    }

    fn ty(&mut self, ty: &Type) {
        if ty.is_primitive() {
            self.terminal("keyword", ty.name());
        } else {
            self.identifier(ty.name());
        }
    }

    fn write_class(&mut self, class: &Class) {
        self.open("class");
        self.keyword(Keyword::Class);
        self.identifier(&class.name.node);
        self.symbol('{');
        for dec in &class.var_decs {
            self.write_class_var_dec(dec);
        }
        for sub in &class.subroutines {
            self.write_subroutine(sub);
        }
        self.symbol('}');
        self.close("class");
    }

    fn write_class_var_dec(&mut self, dec: &ClassVarDec) {
        self.open("classVarDec");
        self.keyword(match dec.kind {
            ClassVarKind::Static => Keyword::Static,
            ClassVarKind::Field => Keyword::Field,
        });
        self.ty(&dec.ty);
        self.write_name_list(&dec.names);
        self.symbol(';');
        self.close("classVarDec");
    }

    fn write_name_list(&mut self, names: &[Spanned<String>]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.symbol(',');
            }
            self.identifier(&name.node);
        }
    }

    fn write_subroutine(&mut self, sub: &SubroutineDec) {
        self.open("subroutineDec");
        self.keyword(match sub.kind {
            SubroutineKind::Constructor => Keyword::Constructor,
            SubroutineKind::Function => Keyword::Function,
            SubroutineKind::Method => Keyword::Method,
        });
        match &sub.return_ty {
            ReturnType::Void => self.keyword(Keyword::Void),
            ReturnType::Of(ty) => self.ty(ty),
        }
        self.identifier(&sub.name.node);
        self.symbol('(');
        self.open("parameterList");
        for (i, param) in sub.params.iter().enumerate() {
            if i > 0 {
                self.symbol(',');
            }
            self.ty(&param.ty);
            self.identifier(&param.name.node);
        }
        self.close("parameterList");
        self.symbol(')');

        self.open("subroutineBody");
        self.symbol('{');
        for dec in &sub.body.var_decs {
            self.write_var_dec(dec);
        }
        self.write_statements(&sub.body.statements);
        self.symbol('}');
        self.close("subroutineBody");

        self.close("subroutineDec");
    }

    fn write_var_dec(&mut self, dec: &VarDec) {
        self.open("varDec");
        self.keyword(Keyword::Var);
        self.ty(&dec.ty);
        self.write_name_list(&dec.names);
        self.symbol(';');
        self.close("varDec");
    }

    fn write_statements(&mut self, statements: &[Statement]) {
        self.open("statements");
        for stmt in statements {
            self.write_statement(stmt);
        }
        self.close("statements");
    }

    fn write_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Let { name, index, value } => {
                self.open("letStatement");
                self.keyword(Keyword::Let);
                self.identifier(&name.node);
                if let Some(index) = index {
                    self.symbol('[');
                    self.write_expression(index);
                    self.symbol(']');
                }
                self.symbol('=');
                self.write_expression(value);
                self.symbol(';');
                self.close("letStatement");
            }
            Statement::If {
                cond,
                then_body,
                else_body,
            } => {
                self.open("ifStatement");
                self.keyword(Keyword::If);
                self.symbol('(');
                self.write_expression(cond);
                self.symbol(')');
                self.symbol('{');
                self.write_statements(then_body);
                self.symbol('}');
                if let Some(else_body) = else_body {
                    self.keyword(Keyword::Else);
                    self.symbol('{');
                    self.write_statements(else_body);
                    self.symbol('}');
                }
                // closed on both the one- and two-armed forms
                self.close("ifStatement");
            }
            Statement::While { cond, body } => {
                self.open("whileStatement");
                self.keyword(Keyword::While);
                self.symbol('(');
                self.write_expression(cond);
                self.symbol(')');
                self.symbol('{');
                self.write_statements(body);
                self.symbol('}');
                self.close("whileStatement");
            }
            Statement::Do(call) => {
                self.open("doStatement");
                self.keyword(Keyword::Do);
                self.write_call(call);
                self.symbol(';');
                self.close("doStatement");
            }
            Statement::Return(value) => {
                self.open("returnStatement");
                self.keyword(Keyword::Return);
                if let Some(expr) = value {
                    self.write_expression(expr);
                }
                self.symbol(';');
                self.close("returnStatement");
            }
        }
    }

    fn write_expression(&mut self, expr: &Expression) {
        self.open("expression");
        self.write_term(&expr.first);
        for (op, term) in &expr.rest {
            self.symbol(op.symbol());
            self.write_term(term);
        }
        self.close("expression");
    }

    fn write_term(&mut self, term: &Term) {
        self.open("term");
        match term {
            Term::Int(n) => self.terminal("integerConstant", &n.to_string()),
            Term::Str(s) => self.terminal("stringConstant", s),
            Term::True => self.keyword(Keyword::True),
            Term::False => self.keyword(Keyword::False),
            Term::Null => self.keyword(Keyword::Null),
            Term::This => self.keyword(Keyword::This),
            Term::Var(name) => self.identifier(&name.node),
            Term::Index(name, index) => {
                self.identifier(&name.node);
                self.symbol('[');
                self.write_expression(index);
                self.symbol(']');
            }
            Term::Call(call) => self.write_call(call),
            Term::Paren(expr) => {
                self.symbol('(');
                self.write_expression(expr);
                self.symbol(')');
            }
            Term::Unary(op, inner) => {
                self.symbol(op.symbol());
                self.write_term(inner);
            }
        }
        self.close("term");
    }

    fn write_call(&mut self, call: &SubroutineCall) {
        if let Some(receiver) = &call.receiver {
            self.identifier(&receiver.node);
            self.symbol('.');
        }
        self.identifier(&call.name.node);
        self.symbol('(');
        self.open("expressionList");
        for (i, arg) in call.args.iter().enumerate() {
            if i > 0 {
                self.symbol(',');
            }
            self.write_expression(arg);
        }
        self.close("expressionList");
        self.symbol(')');
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn analyze(source: &str) -> String {
        let (tokens, diags) = Lexer::new(source).tokenize();
        assert!(diags.is_empty(), "lex errors: {:?}", diags);
        let class = Parser::new(tokens).parse_class().unwrap_or_else(|errs| {
            panic!(
                "parse failed: {:?}",
                errs.iter().map(|e| &e.message).collect::<Vec<_>>()
            )
        });
        super::class_to_xml(&class)
    }

    #[test]
    fn test_empty_class() {
        assert_eq!(
            analyze("class Main { }"),
            "<class>\n\
             \x20\x20<keyword> class </keyword>\n\
             \x20\x20<identifier> Main </identifier>\n\
             \x20\x20<symbol> { </symbol>\n\
             \x20\x20<symbol> } </symbol>\n\
             </class>\n"
        );
    }

    #[test]
    fn test_subroutine_with_empty_parameter_list() {
        let xml = analyze("class Main { function void main() { return; } }");
        // parameterList is present even when empty
        assert!(xml.contains("    <parameterList>\n    </parameterList>\n"));
        assert!(xml.contains("<keyword> void </keyword>"));
    }

    #[test]
    fn test_statement_elements() {
        let xml = analyze(
            "class Main { function void main() {
                var int i;
                let i = 0;
                while (i < 3) { let i = i + 1; }
                do Output.printInt(i);
                return;
            } }",
        );
        for tag in [
            "<varDec>",
            "<letStatement>",
            "<whileStatement>",
            "<doStatement>",
            "<returnStatement>",
            "<expressionList>",
        ] {
            assert!(xml.contains(tag), "missing {}", tag);
        }
    }

    #[test]
    fn test_symbol_escaping() {
        let xml = analyze(
            "class Main { function boolean f(int a, int b) { return (a < b) & (b > a); } }",
        );
        assert!(xml.contains("<symbol> &lt; </symbol>"));
        assert!(xml.contains("<symbol> &gt; </symbol>"));
        assert!(xml.contains("<symbol> &amp; </symbol>"));
    }

    #[test]
    fn test_string_constant_terminal() {
        let xml = analyze(
            "class Main { function void main() { do Output.printString(\"ok\"); return; } }",
        );
        assert!(xml.contains("<stringConstant> ok </stringConstant>"));
    }

    #[test]
    fn test_if_without_else_closes_tag() {
        let xml = analyze(
            "class Main { function void f(int n) { if (n = 0) { return; } return; } }",
        );
        let opens = xml.matches("<ifStatement>").count();
        let closes = xml.matches("</ifStatement>").count();
        assert_eq!(opens, 1);
        assert_eq!(closes, 1);
    }

    #[test]
    fn test_if_with_else() {
        let xml = analyze(
            "class Main { function int f(int n) {
                if (n) { return 1; } else { return 2; }
            } }",
        );
        assert!(xml.contains("<keyword> else </keyword>"));
        assert_eq!(xml.matches("</ifStatement>").count(), 1);
    }

    #[test]
    fn test_nested_expression_structure() {
        let xml = analyze("class Main { function int f() { return -(1 + 2); } }");
        // unary term wraps a parenthesized expression
        let at = xml.find("<symbol> - </symbol>").expect("unary minus");
        let rest = &xml[at..];
        assert!(rest.contains("<symbol> ( </symbol>"));
        assert_eq!(rest.matches("<integerConstant>").count(), 2);
    }

    #[test]
    fn test_indentation_depth() {
        let xml = analyze("class Main { function void main() { return; } }");
        // class > subroutineDec > subroutineBody > statements > returnStatement
        assert!(xml.contains("        <returnStatement>"));
    }

    #[test]
    fn test_tokens_mode() {
        let (tokens, _) = Lexer::new("let x = a < 3;").tokenize();
        let xml = super::tokens_to_xml(&tokens);
        assert_eq!(
            xml,
            "<tokens>\n\
             <keyword> let </keyword>\n\
             <identifier> x </identifier>\n\
             <symbol> = </symbol>\n\
             <identifier> a </identifier>\n\
             <symbol> &lt; </symbol>\n\
             <integerConstant> 3 </integerConstant>\n\
             <symbol> ; </symbol>\n\
             </tokens>\n"
        );
    }
}
