mod common;

use common::*;
use jfront::codegen::ClassModifier;
use jfront::diagnostics::{Category, Severity};

#[test]
fn final_enum_constant_assigned_in_static_block() {
    let src = "public enum X { BLEU, BLANC, ROUGE; static { BLEU = null; } }";
    let out = compile(src);
    let errs = errors(&out);
    assert_eq!(errs.len(), 1, "{:#?}", out.diagnostics);
    assert_eq!(errs[0].category, Category::FinalFieldAssignment);
    assert_eq!(errs[0].message, "The final field X.BLEU cannot be assigned");
    assert_eq!(at(errs[0]), position_of(src, "BLEU = null", 0));
    assert!(!categories(&out).contains(&Category::DuplicateMember));
}

#[test]
fn duplicate_constant_reported_at_each_occurrence() {
    let src = "public enum X { BLEU, BLANC, ROUGE, BLEU; }";
    let out = compile(src);
    let errs = errors(&out);
    assert_eq!(errs.len(), 2, "{:#?}", out.diagnostics);
    assert!(errs.iter().all(|d| d.category == Category::DuplicateMember));
    assert!(errs.iter().all(|d| d.message == "Duplicate field X.BLEU"));
    assert_eq!(at(errs[0]), position_of(src, "BLEU", 0));
    assert_eq!(at(errs[1]), position_of(src, "BLEU", 1));
}

#[test]
fn sealed_switch_expression_missing_a_subtype() {
    let src = r#"
sealed interface Shape permits Circle, Square, Rect {}
final class Circle implements Shape {}
final class Square implements Shape {}
final class Rect implements Shape {}
class X {
    int area(Shape s) {
        return switch (s) {
            case Circle c -> 1;
            case Square q -> 2;
        };
    }
}
"#;
    let out = compile(src);
    let errs = errors(&out);
    assert_eq!(errs.len(), 1, "{:#?}", out.diagnostics);
    assert_eq!(errs[0].category, Category::SwitchExpressionMustHaveDefault);
    assert_eq!(errs[0].message, "A Switch expression should cover all possible values");
    assert_eq!(at(errs[0]), position_of(src, "switch", 0));
}

#[test]
fn covering_every_permitted_subtype_is_exhaustive() {
    let src = r#"
sealed interface Shape permits Circle, Square {}
final class Circle implements Shape {}
final class Square implements Shape {}
class X {
    int area(Shape s) {
        return switch (s) {
            case Circle c -> 1;
            case Square q -> 2;
        };
    }
}
"#;
    assert_clean(&compile(src));
}

#[test]
fn two_patterns_in_one_label() {
    let src = "class X { void m(Object o) { switch (o) { case Integer i, String s -> { } default -> { } } } }";
    let out = compile(src);
    let errs = errors(&out);
    assert_eq!(errs.len(), 1, "{:#?}", out.diagnostics);
    assert_eq!(errs[0].category, Category::MultiplePatternsInLabel);
    assert_eq!(errs[0].message, "A switch label may not have more than one pattern case label element");
    assert_eq!(at(errs[0]), position_of(src, "String s", 0));
}

#[test]
fn static_field_in_constant_body_needs_static_initializer() {
    let src = r#"
public enum X {
    A {
        static final String value = getString();
        String label() { return value; }
    },
    B {
        String label() { return "b"; }
    };
    static String getString() { return "a"; }
}
"#;
    let out = compile(src);
    assert_clean(&out);
    let plan = &out.plans[0];
    assert_eq!(plan.nested.len(), 2);
    assert_eq!(plan.nested[0].binary_name, "X$1");
    assert!(plan.nested[0].needs_static_initializer);
    assert_eq!(plan.nested[1].binary_name, "X$2");
    assert!(!plan.nested[1].needs_static_initializer);
}

#[test]
fn trivial_enum_round_trip() {
    let out = compile("public enum X { A, B, C; }");
    assert_clean(&out);
    let plan = &out.plans[0];
    assert_eq!(plan.binary_name, "X");
    assert!(plan.needs_values_array);
    assert_eq!(plan.class_modifiers.iter().copied().collect::<Vec<_>>(), vec![ClassModifier::Final]);
}

#[test]
fn values_array_follows_constant_count() {
    for src in ["enum X { }", "enum X { ; }", "enum X { ; void m() {} }"] {
        let out = compile(src);
        assert_clean(&out);
        assert!(!out.plans[0].needs_values_array, "{}", src);
    }
    for src in ["enum X { A }", "enum X { A, }", "enum X { A, B; int f; }"] {
        let out = compile(src);
        assert_clean(&out);
        assert!(out.plans[0].needs_values_array, "{}", src);
    }
}

#[test]
fn labels_after_total_enum_pattern_are_dominated() {
    let prefix = "enum Color { RED, GREEN }\nclass X { void m(Color c) { switch (c) { case Color k -> { } ";
    for later in ["case RED -> { }", "case null -> { }"] {
        let src = format!("{}{} }} }} }}", prefix, later);
        let out = compile(&src);
        let errs = errors(&out);
        assert_eq!(errs.len(), 1, "{}: {:#?}", later, out.diagnostics);
        assert_eq!(errs[0].category, Category::DominatedCaseLabel);
        assert_eq!(errs[0].message, "This case label is dominated by one of the preceding case label");
        assert_eq!(at(errs[0]), position_of(&src, later.trim_start_matches("case "), 0));
    }
}

#[test]
fn rendering_is_idempotent() {
    let src = r#"
public enum X {
    BLEU, BLANC, BLEU;
    static { BLEU = null; }
    void m() { int y = missing; }
}
"#;
    let first = rendered(src);
    let second = rendered(src);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn diagnostics_are_ordered_by_position() {
    let src = r#"
class X {
    void a() { final int z = 0; z = 1; }
    static int f = g;
    static int g = 1;
    void b() { int y = undefinedName; }
    void c() { int x = "s"; }
}
"#;
    let out = compile(src);
    let positions: Vec<(usize, usize)> = out.diagnostics.iter().map(at).collect();
    assert_eq!(positions.len(), 4, "{:#?}", out.diagnostics);
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);

    let text = rendered(src);
    assert!(text.starts_with("----------\n1. ERROR in X.java (at line 3)\n"));
    assert!(text.contains("\n4. ERROR in X.java (at line 7)\n"));
    assert!(out.diagnostics.iter().all(|d| d.severity == Severity::Error));
}
