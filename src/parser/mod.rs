//! Lexical analysis and parsing of Java source into the AST
//!
//! Parsing never fails: syntax errors become diagnostics and the parser
//! resynchronises at statement and member boundaries, so later phases always
//! receive a (possibly partial) compilation unit.

pub mod error;
mod expressions;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod span;
mod statements;

pub use error::{PResult, ParseError, Recovery};
pub use lexer::{tokenize, LexicalToken, Lexer, Token};
pub use parser::{parse, Parser};
pub use span::{HasSpan, Location, Span};

use crate::ast::CompilationUnit;
use crate::config::Config;
use crate::diagnostics::Diagnostic;

/// Tokenize and parse one source text; lexical diagnostics come first
pub fn parse_source(source: &str, config: &Config) -> (CompilationUnit, Vec<Diagnostic>) {
    let (tokens, mut diagnostics) = tokenize(source, config.language_level);
    log::debug!("lexed {} tokens", tokens.len());
    let (unit, parse_diagnostics) = parse(tokens, config);
    diagnostics.extend(parse_diagnostics);
    log::debug!(
        "parsed {} type declarations with {} diagnostics",
        unit.type_decls.len(),
        diagnostics.len()
    );
    (unit, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassMember, Stmt, TypeDecl};
    use crate::config::LanguageLevel;

    fn parse_ok(source: &str) -> CompilationUnit {
        let config = Config::new(LanguageLevel::LATEST);
        let (unit, diagnostics) = parse_source(source, &config);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
        unit
    }

    #[test]
    fn test_parse_simple_class() {
        let unit = parse_ok(
            r#"
package com.example;

public class HelloWorld {
    public static void main(String[] args) {
        System.out.println("Hello, World!");
    }
}
"#,
        );
        assert_eq!(unit.package_name(), Some("com.example"));
        assert_eq!(unit.type_decls.len(), 1);
        assert_eq!(unit.type_decls[0].name(), "HelloWorld");
    }

    #[test]
    fn test_parse_with_imports() {
        let unit = parse_ok(
            r#"
import java.util.List;
import java.util.ArrayList;
import static java.lang.Math.*;

public class TestClass {
    private List<Map.Entry<String, List<Integer>>> items = new ArrayList<>();
}
"#,
        );
        assert_eq!(unit.imports.len(), 3);
        assert!(unit.imports[2].is_static && unit.imports[2].is_wildcard);
    }

    #[test]
    fn test_field_declarators_are_split() {
        let unit = parse_ok("class A { int a, b = 2; }");
        let fields: Vec<_> = unit.type_decls[0]
            .members()
            .iter()
            .filter_map(|m| match m {
                ClassMember::Field(f) => Some(f.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fields, vec!["a", "b"]);
    }

    #[test]
    fn test_enum_with_constant_bodies() {
        let unit = parse_ok("enum Op { PLUS { int apply() { return 1; } }, MINUS; abstract int apply(); }");
        let TypeDecl::Enum(e) = &unit.type_decls[0] else { panic!("expected enum") };
        assert_eq!(e.constants.len(), 2);
        assert!(e.constants[0].body.is_some());
        assert!(e.has_constant_terminator);
        assert_eq!(e.abstract_methods().count(), 1);
    }

    #[test]
    fn test_constructor_invocation_is_extracted() {
        let unit = parse_ok("class A { A() { this(1); } A(int x) { super(); } }");
        let ctors: Vec<_> = unit.type_decls[0]
            .members()
            .iter()
            .filter_map(|m| match m {
                ClassMember::Constructor(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(ctors.len(), 2);
        assert!(ctors.iter().all(|c| c.explicit_invocation.is_some()));
        assert!(ctors.iter().all(|c| c.body.statements.is_empty()));
    }

    #[test]
    fn test_switch_patterns_and_guards() {
        let unit = parse_ok(
            r#"
class A {
    int f(Object o) {
        return switch (o) {
            case null, default -> 0;
            case String s when s.isEmpty() -> 1;
            case Integer i -> { yield i; }
        };
    }
}
"#,
        );
        let ClassMember::Method(m) = &unit.type_decls[0].members()[0] else { panic!("expected method") };
        let body = m.body.as_ref().expect("body");
        let Stmt::Return(r) = &body.statements[0] else { panic!("expected return") };
        let Some(crate::ast::Expr::Switch(s)) = &r.value else { panic!("expected switch expression") };
        assert_eq!(s.cases.len(), 3);
        assert!(s.has_default() && s.has_null() && s.has_patterns());
        assert!(s.cases[1].labels[0].guard.is_some());
    }

    #[test]
    fn test_generic_shift_tokens_are_split() {
        let unit = parse_ok("class A { java.util.Map<String, java.util.List<java.util.List<String>>> m; int x = 8 >> 1; }");
        assert_eq!(unit.type_decls[0].members().len(), 2);
    }

    #[test]
    fn test_lambdas_casts_and_method_refs() {
        parse_ok(
            r#"
class A {
    void f() {
        Runnable r = () -> {};
        java.util.function.Function<String, Integer> g = s -> s.length();
        Object o = (Runnable) () -> {};
        int n = (int) 3.5;
        java.util.function.Supplier<A> s = A::new;
        Class<?> c = int[].class;
    }
}
"#,
        );
    }
}
