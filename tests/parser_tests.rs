use jfront::ast::{ClassMember, TypeDecl};
use jfront::diagnostics::{Category, Diagnostic, Severity};
use jfront::parser::parse_source;
use jfront::{Config, LanguageLevel};

fn diagnostics_at(src: &str, level: LanguageLevel) -> Vec<Diagnostic> {
    parse_source(src, &Config::new(level)).1
}

fn gated(src: &str, level: LanguageLevel, message: &str) {
    let diags = diagnostics_at(src, level);
    assert!(
        diags.iter().any(|d| d.message == message && d.category == Category::FeatureNotAvailable),
        "expected {:?} at {:?}, got {:#?}",
        message,
        level,
        diags
    );
}

fn clean(src: &str, level: LanguageLevel) {
    let diags = diagnostics_at(src, level);
    assert!(diags.is_empty(), "{:#?}", diags);
}

#[test]
fn java5_features() {
    let level = LanguageLevel::V1_4;
    gated("class A { void m(int... xs) { } }", level, "Syntax error, varargs are only available if source level is 1.5 or greater");
    gated(
        "class A<T> { }",
        level,
        "Syntax error, type parameters are only available if source level is 1.5 or greater",
    );
    gated(
        "class A { java.util.List<String> l; }",
        level,
        "Syntax error, parameterized types are only available if source level is 1.5 or greater",
    );
    gated(
        "class A { void m(int[] xs) { for (int x : xs) { } } }",
        level,
        "Syntax error, 'for each' statements are only available if source level is 1.5 or greater",
    );
    gated(
        "import static java.lang.Math.max; class A { }",
        level,
        "Syntax error, static imports are only available if source level is 1.5 or greater",
    );
    clean("class A { void m(int... xs) { for (int x : xs) { } } }", LanguageLevel::V1_5);
}

#[test]
fn lambdas_and_method_references() {
    gated("class A { Runnable r = () -> { }; }", LanguageLevel::V1_7, "Lambda expressions are allowed only at source level 1.8 or above");
    clean("class A { Runnable r = () -> { }; }", LanguageLevel::V1_8);
}

#[test]
fn switch_forms_before_14() {
    let expr = "class A { int m(int i) { return switch (i) { case 1 -> 1; default -> 0; }; } }";
    gated(expr, LanguageLevel::V13, "Switch Expressions are supported from Java 14 onwards only");
    gated(expr, LanguageLevel::V13, "Arrow in case statement supported from Java 14 onwards only");
    clean(expr, LanguageLevel::V14);

    let multi = "class A { void m(int i) { switch (i) { case 1, 2: break; default: break; } } }";
    gated(multi, LanguageLevel::V13, "Multi-constant case labels supported from Java 14 onwards only");
    clean(multi, LanguageLevel::V14);
}

#[test]
fn modern_declarations_and_patterns() {
    gated("record P(int x) { }", LanguageLevel::V15, "The Java feature 'Records' is only available with source level 16 and above");
    gated(
        "class A { String s = \"\"\"\n    hi\n    \"\"\"; }",
        LanguageLevel::V14,
        "The Java feature 'Text Blocks' is only available with source level 15 and above",
    );
    gated(
        "class A { boolean m(Object o) { return o instanceof String s; } }",
        LanguageLevel::V15,
        "The Java feature 'Pattern Matching in instanceof Expressions' is only available with source level 16 and above",
    );
    gated(
        "sealed interface S permits A { } final class A implements S { }",
        LanguageLevel::V16,
        "The Java feature 'Sealed Types' is only available with source level 17 and above",
    );
    gated(
        "class A { int m(Object o) { return switch (o) { case String s -> 1; default -> 0; }; } }",
        LanguageLevel::V17,
        "The Java feature 'Pattern Matching in Switch' is only available with source level 21 and above",
    );
    gated(
        "record P(int x) { } class A { boolean m(Object o) { return o instanceof P(int x); } }",
        LanguageLevel::V17,
        "The Java feature 'Record Patterns' is only available with source level 21 and above",
    );
}

#[test]
fn reserved_words_as_identifiers() {
    let diags = diagnostics_at("class assert { }", LanguageLevel::V1_3);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].severity, Severity::Warning);
    assert_eq!(
        diags[0].message,
        "'assert' should not be used as an identifier, since it is a reserved keyword from source level 1.4 on"
    );

    let diags = diagnostics_at("class enum { }", LanguageLevel::V1_4);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].category, Category::ReservedKeywordAsIdentifier);

    let diags = diagnostics_at("class _ { }", LanguageLevel::V1_8);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].severity, Severity::Warning);
    assert_eq!(
        diags[0].message,
        "'_' should not be used as an identifier, since it is a reserved keyword from source level 1.8 on"
    );

    let diags = diagnostics_at("class _ { }", LanguageLevel::V9);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].severity, Severity::Error);
    assert_eq!(diags[0].message, "'_' is a keyword from source level 9 onwards, cannot be used as identifier");
}

#[test]
fn recovery_continues_after_a_bad_statement() {
    let src = "class A {\n    void m() { int x = 1 int y = 2; }\n    void n() { }\n}\n";
    let (unit, diags) = parse_source(src, &Config::default());
    assert!(!diags.is_empty());
    assert!(diags.iter().all(|d| d.category == Category::SyntaxError), "{:#?}", diags);
    assert_eq!(diags[0].span.start.line, 2);
    let methods: Vec<&str> = unit.type_decls[0]
        .members()
        .iter()
        .filter_map(|m| match m {
            ClassMember::Method(md) => Some(md.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(methods, vec!["m", "n"]);
}

#[test]
fn recovery_after_a_bad_member() {
    let src = "class A { int x; ) void n() { } }\nclass B { }";
    let (unit, diags) = parse_source(src, &Config::default());
    assert!(!diags.is_empty());
    assert!(diags.iter().all(|d| d.category == Category::SyntaxError), "{:#?}", diags);
    assert_eq!(unit.type_decls.len(), 2);
    assert_eq!(unit.type_decls[1].name(), "B");
}

#[test]
fn parse_error_budget() {
    let src = "class A { void m() { ) ) ) ) ) ) ) ) } }";
    let config = Config::default().with_max_parse_errors(2);
    let (_, diags) = parse_source(src, &config);
    let syntax = diags.iter().filter(|d| d.category == Category::SyntaxError).count();
    assert!(syntax <= 2, "{:#?}", diags);
    assert!(syntax >= 1);
}

#[test]
fn enum_constant_list_shapes() {
    let shapes = [("enum E { }", 0, false), ("enum E { ; }", 0, true), ("enum E { A; }", 1, true), ("enum E { A, B }", 2, false)];
    for (src, count, terminated) in shapes {
        let (unit, diags) = parse_source(src, &Config::default());
        assert!(diags.is_empty(), "{}: {:#?}", src, diags);
        let TypeDecl::Enum(e) = &unit.type_decls[0] else { panic!("expected an enum") };
        assert_eq!(e.constants.len(), count, "{}", src);
        assert_eq!(e.has_constant_terminator, terminated, "{}", src);
    }
}
