//! Parser for Cool's concrete syntax.
//!
//! A `pest` PEG grammar (`src/cool.pest`) plus an AST-builder that walks
//! `pest::iterators::Pair` trees into the compiler's own AST types. This
//! module has no independent error-recovery strategy beyond what `pest`
//! gives it — a syntax error aborts parsing of the file it occurs in and is
//! reported through the same diagnostics channel every other phase uses.

use pest::iterators::{Pair, Pairs};
use pest::Parser as _;

use crate::context::CompilerContext;
use crate::coolast::{CaseBranch, Class, Expr, ExprKind, Feature, Formal, Position, Program, Symbol};

#[derive(pest_derive::Parser)]
#[grammar = "cool.pest"]
struct CoolGrammar;

/// Parse one source file's text into a [`Program`], appending to `ctx`'s
/// interners as literals and names are encountered. On a syntax error, a
/// diagnostic is recorded on `ctx.diagnostics` and `None` is returned so the
/// driver can skip this file's classes while still accumulating errors from
/// any other file passed on the command line.
pub fn parse_file(filename: &str, source: &str, ctx: &mut CompilerContext) -> Option<Program> {
    let mut pairs = match CoolGrammar::parse(Rule::program, source) {
        Ok(pairs) => pairs,
        Err(err) => {
            let (line, message) = describe_pest_error(&err);
            ctx.diagnostics.report(filename, line, message);
            return None;
        }
    };

    let program_pair = pairs.next().expect("Rule::program always produces one pair");
    let mut classes = Vec::new();
    let mut builder = Builder { filename, ctx };

    for pair in program_pair.into_inner() {
        match pair.as_rule() {
            Rule::class_def => classes.push(builder.class_def(pair)),
            Rule::EOI => {}
            other => unreachable!("unexpected top-level rule {other:?}"),
        }
    }

    Some(Program { classes })
}

fn describe_pest_error(err: &pest::error::Error<Rule>) -> (usize, String) {
    let line = match err.line_col {
        pest::error::LineColLocation::Pos((line, _)) => line,
        pest::error::LineColLocation::Span((line, _), _) => line,
    };
    (line, format!("syntax error: {}", err.variant.message()))
}

/// One leaf token produced while parsing, kept for the `--dump-tokens`
/// debug flag. Atomic grammar rules (`object_id`, `int_const`, operators,
/// keywords, ...) have no further inner pairs, so those are exactly the
/// rules pest reports as leaves.
#[derive(Debug, serde::Serialize)]
pub struct Token {
    pub rule: String,
    pub text: String,
    pub line: usize,
}

/// Parse `source` and flatten it into its leaf tokens, for debugging.
/// Returns the same kind of message `parse_file` would report on a syntax
/// error.
pub fn dump_tokens(source: &str) -> Result<Vec<Token>, String> {
    let pairs = CoolGrammar::parse(Rule::program, source).map_err(|err| err.to_string())?;
    let mut tokens = Vec::new();
    for pair in pairs {
        collect_tokens(pair, &mut tokens);
    }
    Ok(tokens)
}

fn collect_tokens(pair: Pair<Rule>, out: &mut Vec<Token>) {
    let mut children = pair.clone().into_inner().peekable();
    if children.peek().is_none() {
        out.push(Token {
            rule: format!("{:?}", pair.as_rule()),
            text: pair.as_str().to_string(),
            line: pair.line_col().0,
        });
        return;
    }
    for child in children {
        collect_tokens(child, out);
    }
}

struct Builder<'a> {
    filename: &'a str,
    ctx: &'a mut CompilerContext,
}

impl Builder<'_> {
    fn position(&self, pair: &Pair<Rule>) -> Position {
        Position::new(self.filename, pair.line_col().0)
    }

    fn type_symbol(&mut self, pair: Pair<Rule>) -> Symbol {
        self.ctx.identifiers.add(pair.as_str())
    }

    fn object_symbol(&mut self, pair: Pair<Rule>) -> Symbol {
        self.ctx.identifiers.add(pair.as_str())
    }

    fn class_def(&mut self, pair: Pair<Rule>) -> Class {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();

        let name = self.type_symbol(inner.next().expect("class name"));

        let mut next = inner.next();
        let parent = match &next {
            Some(p) if p.as_rule() == Rule::type_id => {
                let parent = self.type_symbol(next.take().unwrap());
                next = inner.next();
                parent
            }
            _ => Symbol::from(crate::semant::OBJECT),
        };

        let mut features = Vec::new();
        while let Some(feature_pair) = next {
            features.push(self.feature_def(feature_pair));
            next = inner.next();
        }

        Class {
            name,
            parent,
            filename: Symbol::from(self.filename),
            features,
            position,
        }
    }

    fn feature_def(&mut self, pair: Pair<Rule>) -> Feature {
        let inner = pair.into_inner().next().expect("method_def or attr_def");
        match inner.as_rule() {
            Rule::method_def => self.method_def(inner),
            Rule::attr_def => self.attr_def(inner),
            other => unreachable!("unexpected feature rule {other:?}"),
        }
    }

    fn method_def(&mut self, pair: Pair<Rule>) -> Feature {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();

        let name = self.object_symbol(inner.next().expect("method name"));

        let mut formals = Vec::new();
        let mut next = inner.next().expect("formal, return type or body");
        while next.as_rule() == Rule::formal {
            formals.push(self.formal(next));
            next = inner.next().expect("return type after formals");
        }

        let return_type = self.type_symbol(next);
        let body_pair = inner.next().expect("method body");
        let body = self.expr(body_pair);

        Feature::Method {
            name,
            formals,
            return_type,
            body,
            position,
        }
    }

    fn attr_def(&mut self, pair: Pair<Rule>) -> Feature {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();

        let name = self.object_symbol(inner.next().expect("attribute name"));
        let declared_type = self.type_symbol(inner.next().expect("attribute type"));
        let init = match inner.next() {
            Some(init_pair) => self.expr(init_pair),
            None => Expr::new(ExprKind::NoExpr, position.clone()),
        };

        Feature::Attribute {
            name,
            declared_type,
            init,
            position,
        }
    }

    fn formal(&mut self, pair: Pair<Rule>) -> Formal {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();
        let name = self.object_symbol(inner.next().expect("formal name"));
        let declared_type = self.type_symbol(inner.next().expect("formal type"));
        Formal {
            name,
            declared_type,
            position,
        }
    }

    /// `expr = { assign_expr }`: unwrap the wrapper rule and dispatch on
    /// the real production.
    fn expr(&mut self, pair: Pair<Rule>) -> Expr {
        let inner = pair.into_inner().next().expect("assign_expr");
        self.assign_expr(inner)
    }

    fn assign_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();
        let first = inner.next().expect("assign_expr has at least one child");

        if first.as_rule() == Rule::object_id {
            let name = self.object_symbol(first);
            let rhs_pair = inner.next().expect("assignment rhs");
            let rhs = self.assign_expr(rhs_pair);
            Expr::new(ExprKind::Assign { name, rhs }, position)
        } else {
            self.not_expr(first)
        }
    }

    fn not_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();
        let first = inner.next().expect("not_expr has at least one child");

        if first.as_rule() == Rule::kw_not {
            let operand_pair = inner.next().expect("not operand");
            let operand = self.not_expr(operand_pair);
            Expr::new(ExprKind::Not { expr: operand }, position)
        } else {
            self.compare_expr(first)
        }
    }

    fn compare_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();
        let lhs = self.add_expr(inner.next().expect("compare_expr lhs"));

        let Some(op) = inner.next() else { return lhs };
        let rhs = self.add_expr(inner.next().expect("compare_expr rhs"));

        let kind = match op.as_str() {
            "<=" => ExprKind::LessThanEqualTo { lhs, rhs },
            "<" => ExprKind::LessThan { lhs, rhs },
            "=" => ExprKind::EqualTo { lhs, rhs },
            other => unreachable!("unknown comparison operator {other}"),
        };
        Expr::new(kind, position)
    }

    fn add_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();
        let mut acc = self.mul_expr(inner.next().expect("add_expr first operand"));

        while let Some(op) = inner.next() {
            let rhs = self.mul_expr(inner.next().expect("add_expr rhs"));
            let kind = match op.as_str() {
                "+" => ExprKind::Plus { lhs: acc, rhs },
                "-" => ExprKind::Sub { lhs: acc, rhs },
                other => unreachable!("unknown additive operator {other}"),
            };
            acc = Expr::new(kind, position.clone());
        }
        acc
    }

    fn mul_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();
        let mut acc = self.isvoid_expr(inner.next().expect("mul_expr first operand"));

        while let Some(op) = inner.next() {
            let rhs = self.isvoid_expr(inner.next().expect("mul_expr rhs"));
            let kind = match op.as_str() {
                "*" => ExprKind::Mul { lhs: acc, rhs },
                "/" => ExprKind::Div { lhs: acc, rhs },
                other => unreachable!("unknown multiplicative operator {other}"),
            };
            acc = Expr::new(kind, position.clone());
        }
        acc
    }

    fn isvoid_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();
        let first = inner.next().expect("isvoid_expr has at least one child");

        if first.as_rule() == Rule::kw_isvoid {
            let operand_pair = inner.next().expect("isvoid operand");
            let operand = self.isvoid_expr(operand_pair);
            Expr::new(ExprKind::IsVoid { expr: operand }, position)
        } else {
            self.complement_expr(first)
        }
    }

    fn complement_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();
        let first = inner.next().expect("complement_expr has at least one child");

        if first.as_rule() == Rule::complement_expr {
            let operand = self.complement_expr(first);
            Expr::new(ExprKind::Complement { expr: operand }, position)
        } else {
            self.dispatch_expr(first)
        }
    }

    fn dispatch_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let mut inner = pair.into_inner();
        let mut receiver = self.primary(inner.next().expect("dispatch_expr primary"));

        for tail in inner {
            let tail_position = self.position(&tail);
            let inner_tail = tail.into_inner().next().expect("dispatch_tail variant");
            receiver = match inner_tail.as_rule() {
                Rule::static_dispatch_tail => self.static_dispatch_tail(inner_tail, receiver, tail_position),
                Rule::dynamic_dispatch_tail => self.dynamic_dispatch_tail(inner_tail, receiver, tail_position),
                other => unreachable!("unexpected dispatch tail {other:?}"),
            };
        }

        receiver
    }

    fn static_dispatch_tail(&mut self, pair: Pair<Rule>, receiver: Expr, position: Position) -> Expr {
        let mut inner = pair.into_inner();
        let ancestor_type = self.type_symbol(inner.next().expect("static dispatch ancestor"));
        let method = self.object_symbol(inner.next().expect("static dispatch method"));
        let args = self.args(inner.next());
        Expr::new(
            ExprKind::StaticDispatch {
                receiver,
                ancestor_type,
                method,
                args,
            },
            position,
        )
    }

    fn dynamic_dispatch_tail(&mut self, pair: Pair<Rule>, receiver: Expr, position: Position) -> Expr {
        let mut inner = pair.into_inner();
        let method = self.object_symbol(inner.next().expect("dynamic dispatch method"));
        let args = self.args(inner.next());
        Expr::new(ExprKind::DynamicDispatch { receiver, method, args }, position)
    }

    fn args(&mut self, pair: Option<Pair<Rule>>) -> Vec<Expr> {
        match pair {
            Some(args_pair) => args_pair.into_inner().map(|p| self.expr(p)).collect(),
            None => Vec::new(),
        }
    }

    fn primary(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let inner = pair.into_inner().next().expect("primary always wraps one production");
        match inner.as_rule() {
            Rule::if_expr => self.if_expr(inner),
            Rule::while_expr => self.while_expr(inner),
            Rule::block_expr => self.block_expr(inner),
            Rule::let_expr => self.let_expr(inner),
            Rule::case_expr => self.case_expr(inner),
            Rule::new_expr => self.new_expr(inner),
            Rule::bool_const => Expr::new(ExprKind::BoolConst(inner.as_str() == "true"), position),
            Rule::int_const => {
                let symbol = self.ctx.integers.add(inner.as_str());
                Expr::new(ExprKind::IntConst(symbol), position)
            }
            Rule::string_const => {
                let text = unescape_string_literal(inner.as_str());
                let symbol = self.ctx.strings.add(text);
                Expr::new(ExprKind::StringConst(symbol), position)
            }
            Rule::self_or_call => self.self_or_call(inner),
            Rule::expr => self.expr(inner),
            other => unreachable!("unexpected primary rule {other:?}"),
        }
    }

    fn if_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();
        let predicate = self.expr(next_rule(&mut inner));
        let then_branch = self.expr(next_rule(&mut inner));
        let else_branch = self.expr(next_rule(&mut inner));
        Expr::new(
            ExprKind::If {
                predicate,
                then_branch,
                else_branch,
            },
            position,
        )
    }

    fn while_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();
        let predicate = self.expr(next_rule(&mut inner));
        let body = self.expr(next_rule(&mut inner));
        Expr::new(ExprKind::While { predicate, body }, position)
    }

    fn block_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let body = pair.into_inner().map(|p| self.expr(p)).collect();
        Expr::new(ExprKind::Block { body }, position)
    }

    fn let_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let mut bindings: Vec<Pair<Rule>> = Vec::new();
        let mut body_pair = None;
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::let_binding => bindings.push(p),
                Rule::expr => body_pair = Some(p),
                other => unreachable!("unexpected let_expr child {other:?}"),
            }
        }
        let body = self.expr(body_pair.expect("let always has a body"));

        // Desugar `let x1:T1 <- i1, x2:T2 <- i2 in body` into nested lets,
        // innermost-first, so the checker/codegen only ever see one binding.
        bindings.into_iter().rev().fold(body, |acc, binding_pair| {
            let binding_position = self.position(&binding_pair);
            let mut binding = binding_pair.into_inner();
            let name = self.object_symbol(binding.next().expect("let binding name"));
            let declared_type = self.type_symbol(binding.next().expect("let binding type"));
            let init = match binding.next() {
                Some(init_pair) => self.expr(init_pair),
                None => Expr::new(ExprKind::NoExpr, binding_position.clone()),
            };
            Expr::new(
                ExprKind::Let {
                    name,
                    declared_type,
                    init,
                    body: acc,
                },
                position.clone(),
            )
        })
    }

    fn case_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let mut scrutinee_pair = None;
        let mut branches = Vec::new();
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::expr => scrutinee_pair = Some(p),
                Rule::case_branch => branches.push(self.case_branch(p)),
                other => unreachable!("unexpected case_expr child {other:?}"),
            }
        }
        let scrutinee = self.expr(scrutinee_pair.expect("case always has a scrutinee"));
        Expr::new(ExprKind::Case { scrutinee, branches }, position)
    }

    fn case_branch(&mut self, pair: Pair<Rule>) -> CaseBranch {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();
        let name = self.object_symbol(inner.next().expect("case branch name"));
        let declared_type = self.type_symbol(inner.next().expect("case branch type"));
        let body = self.expr(inner.next().expect("case branch body"));
        CaseBranch {
            name,
            declared_type,
            body,
            position,
        }
    }

    fn new_expr(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let declared_type = self.type_symbol(pair.into_inner().next().expect("new's type"));
        Expr::new(ExprKind::New { declared_type }, position)
    }

    /// `self_or_call = { object_id ~ ("(" ~ args? ~ ")")? }`: the call
    /// parens are optional, so whether a dispatch happened at all has to be
    /// read off the pair's own span rather than `args()`'s result (an empty
    /// argument list and no call at all both produce zero `Expr`s).
    fn self_or_call(&mut self, pair: Pair<Rule>) -> Expr {
        let position = self.position(&pair);
        let had_call = pair.as_str().contains('(');
        let mut inner = pair.into_inner();
        let name = self.object_symbol(inner.next().expect("self_or_call name"));

        if !had_call {
            return Expr::new(ExprKind::Object { name }, position);
        }

        let args = self.args(inner.next());
        Expr::new(ExprKind::SelfDispatch { method: name, args }, position).desugar_self_dispatch()
    }
}

fn unescape_string_literal(raw: &str) -> String {
    let inner = &raw[1..raw.len() - 1];
    unescape::unescape(inner).unwrap_or_else(|| inner.to_string())
}

fn next_rule(inner: &mut Pairs<Rule>) -> Pair<Rule> {
    inner.next().expect("expected another expr child")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> (Option<Program>, CompilerContext) {
        let mut ctx = CompilerContext::new();
        let program = parse_file("t.cl", source, &mut ctx);
        (program, ctx)
    }

    #[test]
    fn parses_minimal_main_class() {
        let (program, ctx) = parse(
            r#"class Main inherits IO { main() : Object { out_string("hi") }; };"#,
        );
        assert!(!ctx.diagnostics.has_errors());
        let program = program.expect("valid program should parse");
        assert_eq!(program.classes.len(), 1);
        assert_eq!(program.classes[0].name.as_str(), "Main");
        assert_eq!(program.classes[0].parent.as_str(), "IO");
    }

    #[test]
    fn parses_attribute_with_initializer() {
        let (program, ctx) = parse("class A { x : Int <- 5; };");
        assert!(!ctx.diagnostics.has_errors());
        let program = program.unwrap();
        let Feature::Attribute { name, init, .. } = &program.classes[0].features[0] else {
            panic!("expected an attribute");
        };
        assert_eq!(name.as_str(), "x");
        assert!(matches!(&*init.kind, ExprKind::IntConst(_)));
    }

    #[test]
    fn self_dispatch_desugars_to_dynamic_dispatch_on_self() {
        let (program, ctx) = parse("class A { f() : Object { g() }; };");
        assert!(!ctx.diagnostics.has_errors());
        let program = program.unwrap();
        let Feature::Method { body, .. } = &program.classes[0].features[0] else {
            panic!("expected a method");
        };
        let ExprKind::DynamicDispatch { receiver, method, .. } = &*body.kind else {
            panic!("expected desugared dynamic dispatch, got {:?}", body.kind);
        };
        assert_eq!(method.as_str(), "g");
        assert!(matches!(&*receiver.kind, ExprKind::Object { name } if name.as_str() == "self"));
    }

    #[test]
    fn multi_binding_let_desugars_to_nested_lets() {
        let (program, ctx) = parse("class A { f() : Int { let x : Int <- 1, y : Int <- 2 in x + y }; };");
        assert!(!ctx.diagnostics.has_errors());
        let program = program.unwrap();
        let Feature::Method { body, .. } = &program.classes[0].features[0] else {
            panic!("expected a method");
        };
        let ExprKind::Let { name, body: inner, .. } = &*body.kind else {
            panic!("expected a let, got {:?}", body.kind);
        };
        assert_eq!(name.as_str(), "x");
        assert!(matches!(&*inner.kind, ExprKind::Let { .. }));
    }

    #[test]
    fn syntax_error_is_reported_with_a_line_number() {
        let (program, ctx) = parse("class A { f() : Int { 1 + }; };");
        assert!(program.is_none());
        assert!(ctx.diagnostics.has_errors());
    }
}
