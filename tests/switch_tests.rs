mod common;

use common::*;
use jfront::diagnostics::{Category, Severity};

fn in_method(params: &str, body: &str) -> String {
    format!("class X {{\n    int m({}) {{\n{}\n        return 0;\n    }}\n}}\n", params, body)
}

fn only(src: &str) -> (Category, String, (usize, usize)) {
    let out = compile(src);
    let list: Vec<_> = out.diagnostics.iter().collect();
    assert_eq!(list.len(), 1, "{}\n{:#?}", src, out.diagnostics);
    (list[0].category, list[0].message.clone(), at(list[0]))
}

#[test]
fn statement_without_default_is_a_warning() {
    let src = in_method("int i", "        switch (i) { case 1: break; }");
    let out = compile(&src);
    let d: Vec<_> = out.diagnostics.iter().collect();
    assert_eq!(d.len(), 1);
    assert_eq!(d[0].severity, Severity::Warning);
    assert_eq!(d[0].category, Category::MissingDefaultCase);
    assert_eq!(d[0].message, "The switch statement should have a default case");
    assert_eq!(at(d[0]), position_of(&src, "switch", 0));
}

#[test]
fn enum_statement_covering_every_constant() {
    let full = format!("enum C {{ R, G }}\n{}", in_method("C c", "        switch (c) { case R: break; case G: break; }"));
    assert_clean(&compile(&full));
    let partial = format!("enum C {{ R, G }}\n{}", in_method("C c", "        switch (c) { case R: break; }"));
    let (category, _, _) = only(&partial);
    assert_eq!(category, Category::MissingDefaultCase);
}

#[test]
fn switch_expression_needs_default() {
    let src = in_method("int i", "        int r = switch (i) { case 1 -> 10; case 2 -> 20; };");
    let (category, message, pos) = only(&src);
    assert_eq!(category, Category::SwitchExpressionMustHaveDefault);
    assert_eq!(message, "A switch expression should have a default case");
    assert_eq!(pos, position_of(&src, "switch", 0));
}

#[test]
fn enum_switch_expression_must_cover_constants() {
    let body = "        int r = switch (c) { case R -> 1; case G -> 2; };";
    let src = format!("enum C {{ R, G, B }}\n{}", in_method("C c", body));
    let (category, message, _) = only(&src);
    assert_eq!(category, Category::SwitchExpressionMustHaveDefault);
    assert_eq!(message, "A Switch expression should cover all possible values");

    let src = format!("enum C {{ R, G }}\n{}", in_method("C c", body));
    assert_clean(&compile(&src));
}

#[test]
fn enhanced_statement_must_be_exhaustive() {
    let src = in_method("Object o", "        switch (o) { case String s -> { } case Integer i -> { } }");
    let (category, message, pos) = only(&src);
    assert_eq!(category, Category::EnhancedSwitchMustBeExhaustive);
    assert_eq!(message, "An enhanced switch statement should be exhaustive; a default label expected");
    assert_eq!(pos, position_of(&src, "switch", 0));
}

#[test]
fn subtype_pattern_after_supertype_is_dominated() {
    let src = in_method("Object o", "        switch (o) { case CharSequence cs -> { } case String s -> { } default -> { } }");
    let (category, _, pos) = only(&src);
    assert_eq!(category, Category::DominatedCaseLabel);
    assert_eq!(pos, position_of(&src, "String s", 0));

    let reversed = in_method("Object o", "        switch (o) { case String s -> { } case CharSequence cs -> { } default -> { } }");
    assert_clean(&compile(&reversed));
}

#[test]
fn guarded_pattern_does_not_dominate() {
    let src = in_method(
        "Object o",
        "        switch (o) { case String s when s.isEmpty() -> { } case String s -> { } default -> { } }",
    );
    assert_clean(&compile(&src));
}

#[test]
fn duplicate_constants() {
    let src = in_method("int i", "        switch (i) { case 1 -> { } case 1 -> { } default -> { } }");
    let (category, message, pos) = only(&src);
    assert_eq!(category, Category::DuplicateCaseLabel);
    assert_eq!(message, "Duplicate case");
    assert_eq!(pos, position_of(&src, "1 ->", 1));

    let strings = in_method("String s", "        switch (s) { case \"a\": break; case \"a\": break; default: break; }");
    assert_eq!(only(&strings).1, "Duplicate case");
}

#[test]
fn unconditional_pattern_with_default() {
    let src = in_method("Object o", "        switch (o) { case Object x -> { } default -> { } }");
    let (category, message, _) = only(&src);
    assert_eq!(category, Category::TotalPatternWithDefault);
    assert_eq!(message, "Switch case cannot have both unconditional pattern and default label");
}

#[test]
fn fall_through_into_a_pattern() {
    let src = in_method(
        "Object o",
        "        switch (o) {\n            case String s:\n                o.hashCode();\n            case Integer i:\n                break;\n            default:\n                break;\n        }",
    );
    let (category, message, pos) = only(&src);
    assert_eq!(category, Category::IllegalFallThroughToPattern);
    assert_eq!(message, "Illegal fall-through to a pattern");
    assert_eq!(pos, position_of(&src, "Integer i", 0));
}

#[test]
fn null_label_combinations() {
    let plain = in_method("Object o", "        switch (o) { case null, String s -> { } default -> { } }");
    assert_clean(&compile(&plain));

    let guarded = in_method("Object o", "        switch (o) { case null, String s when s.isEmpty() -> { } default -> { } }");
    let (category, message, _) = only(&guarded);
    assert_eq!(category, Category::NullWithNonTypePatternNotAllowed);
    assert_eq!(message, "A null case label and patterns can co-exist only if the pattern is a type pattern");
}

#[test]
fn guards() {
    let constant_false = in_method("Object o", "        switch (o) { case String s when false -> { } default -> { } }");
    let (category, message, _) = only(&constant_false);
    assert_eq!(category, Category::FalseConstantGuard);
    assert_eq!(message, "A case label guard cannot have a constant expression with value as 'false'");

    let captured = in_method(
        "Object o",
        "        int n = 1;\n        n = 2;\n        switch (o) { case String s when s.length() == n -> { } default -> { } }",
    );
    let (category, message, pos) = only(&captured);
    assert_eq!(category, Category::GuardRequiresEffectivelyFinalVariable);
    assert_eq!(message, "Local variable n referenced from a guard must be final or effectively final");
    assert_eq!(pos, position_of(&captured, "n ->", 0));
}

#[test]
fn expression_arm_completing_normally() {
    let src = in_method("int i", "        int r = switch (i) { case 1 -> { } default -> 0; };");
    let (category, message, _) = only(&src);
    assert_eq!(category, Category::SwitchArmCompletesNormally);
    assert_eq!(message, "A switch labeled block in a switch expression should not complete normally");

    let yielding = in_method("int i", "        int r = switch (i) { case 1 -> { yield 1; } default -> 0; };");
    assert_clean(&compile(&yielding));
}

#[test]
fn default_label_rules() {
    let twice = in_method("int i", "        switch (i) { default: break; case 1: break; default: break; }");
    let (category, message, pos) = only(&twice);
    assert_eq!(category, Category::DuplicateDefaultCase);
    assert_eq!(message, "The default case is already defined");
    assert_eq!(pos, position_of(&twice, "default", 1));

    let misplaced = in_method("Object o", "        switch (o) { case default -> { } }");
    let out = compile(&misplaced);
    assert!(out.diagnostics.iter().any(|d| d.category == Category::IllegalDefaultPlacement), "{:#?}", out.diagnostics);

    let null_default = in_method("Object o", "        switch (o) { case String s -> { } case null, default -> { } }");
    assert_clean(&compile(&null_default));
}

#[test]
fn patterns_and_constants_do_not_mix() {
    let src = in_method("Object o", "        switch (o) { case String s, 1 -> { } default -> { } }");
    let out = compile(&src);
    let mixed: Vec<_> = out.diagnostics.iter().filter(|d| d.category == Category::MixedPatternAndConstantLabels).collect();
    assert_eq!(mixed.len(), 1, "{:#?}", out.diagnostics);
    assert_eq!(mixed[0].message, "Cannot mix pattern with other case labels");
}

#[test]
fn sealed_hierarchy_with_nested_sealed_subtype() {
    let src = r#"
sealed interface Node permits Leaf, Branch {}
final class Leaf implements Node {}
sealed abstract class Branch implements Node permits Left, Right {}
final class Left extends Branch {}
final class Right extends Branch {}
class X {
    int depth(Node n) {
        return switch (n) {
            case Leaf l -> 0;
            case Left l -> 1;
            case Right r -> 2;
        };
    }
}
"#;
    assert_clean(&compile(src));
}

#[test]
fn constant_true_guard_counts_as_unguarded() {
    let src = in_method("Integer o", "        switch (o) { case Integer x when true -> { } case 1 -> { } }");
    let (category, _, pos) = only(&src);
    assert_eq!(category, Category::DominatedCaseLabel);
    assert_eq!(pos, position_of(&src, "1 ->", 0));

    let with_default = in_method("Object o", "        switch (o) { case Object x when true -> { } default -> { } }");
    let (category, _, _) = only(&with_default);
    assert_eq!(category, Category::TotalPatternWithDefault);
}
