mod common;

use common::*;
use jfront::config::SeverityOverride;
use jfront::diagnostics::{Category, Severity};
use jfront::{CompileOutput, Config, LanguageLevel};

fn has(out: &CompileOutput, category: Category, message: &str) {
    assert!(
        out.diagnostics.iter().any(|d| d.category == category && d.message == message),
        "expected {:?} {:?}, got {:#?}",
        category,
        message,
        out.diagnostics
    );
}

#[test]
fn unresolved_names() {
    let src = "class X { Foo f; int m() { return y; } }";
    let out = compile(src);
    has(&out, Category::UnresolvedName, "Foo cannot be resolved to a type");
    has(&out, Category::UnresolvedName, "y cannot be resolved to a variable");
    let y = out.diagnostics.iter().find(|d| d.message.starts_with("y ")).map(at);
    assert_eq!(y, Some(position_of(src, "y;", 0)));
}

#[test]
fn static_context() {
    let out = compile("class X { int f; static int m() { return f; } }");
    has(&out, Category::StaticContextViolation, "Cannot make a static reference to the non-static field f");

    let out = compile("class X { static int m() { return this.hashCode(); } }");
    has(&out, Category::StaticContextViolation, "Cannot use this in a static context");

    let out = compile("class X { void i() { } static void m() { i(); } }");
    has(
        &out,
        Category::StaticContextViolation,
        "Cannot make a static reference to the non-static method i() from the type X",
    );
}

#[test]
fn forward_references_in_field_initializers() {
    let src = "class X { int a = b; int b = 1; }";
    let out = compile(src);
    assert_eq!(messages(&out), vec!["Cannot reference a field before it is defined"]);
    assert_eq!(at(errors(&out)[0]), position_of(src, "b;", 0));

    // qualified forms count, assignment targets do not
    let out = compile("class X { static int a = X.b; static int b = 1; }");
    assert_eq!(categories(&out), vec![Category::ForwardReference]);
    let out = compile("class X { int a = this.b; int b = 1; }");
    assert_eq!(categories(&out), vec![Category::ForwardReference]);
    assert_clean(&compile("class X { int a = (b = 2) + 1; int b = 1; }"));
}

#[test]
fn duplicate_locals() {
    let src = "class X { void m() { int a = 1; int a = 2; } }";
    let out = compile(src);
    assert_eq!(messages(&out), vec!["Duplicate local variable a"]);
    assert_eq!(at(errors(&out)[0]), position_of(src, "a = 2", 0));

    // sibling blocks may reuse a name
    assert_clean(&compile("class X { void m() { { int a = 1; } { int a = 2; } } }"));
}

#[test]
fn pattern_bindings_are_scoped() {
    let ok = "class X { boolean m(Object o) { return o instanceof String s && s.isEmpty(); } }";
    assert_clean(&compile(ok));

    // a qualifier and a plain read are worded differently
    let out = compile("class X { int m(Object o) { if (o instanceof String s) { } return s.length(); } }");
    has(&out, Category::UnresolvedName, "s cannot be resolved");
    let out = compile("class X { Object m(Object o) { if (o instanceof String s) { } return s; } }");
    has(&out, Category::UnresolvedName, "s cannot be resolved to a variable");
}

#[test]
fn captured_locals() {
    let lambda = "class X { void m() { int n = 1; n = 2; Runnable r = () -> { int k = n; }; } }";
    let out = compile(lambda);
    has(
        &out,
        Category::CapturedVariableNotEffectivelyFinal,
        "Local variable n defined in an enclosing scope must be final or effectively final",
    );
    assert_clean(&compile("class X { void m() { int n = 1; Runnable r = () -> { int k = n; }; } }"));

    let anonymous = "class X { void m() { int n = 1; Runnable r = new Runnable() { public void run() { int k = n; } }; } }";
    let out = compile_at(anonymous, LanguageLevel::V1_7);
    has(
        &out,
        Category::CapturedVariableNotEffectivelyFinal,
        "Cannot refer to the non-final local variable n defined in an enclosing scope",
    );
    assert_clean(&compile_at(&anonymous.replace("int n", "final int n"), LanguageLevel::V1_7));
}

#[test]
fn raw_types_warn() {
    let out = compile("import java.util.List; class X { List l; }");
    let d: Vec<_> = out.diagnostics.iter().collect();
    assert_eq!(d.len(), 1, "{:#?}", out.diagnostics);
    assert_eq!(d[0].severity, Severity::Warning);
    assert_eq!(d[0].category, Category::RawTypeUsage);
    assert_eq!(d[0].message, "List is a raw type. References to generic type List<E> should be parameterized");

    assert_clean(&compile("import java.util.List; class X { List<String> l; }"));
}

#[test]
fn type_mismatch() {
    let out = compile("class X { void m() { int x = \"s\"; } }");
    assert_eq!(messages(&out), vec!["Type mismatch: cannot convert from String to int"]);
    // constant narrowing
    assert_clean(&compile("class X { void m() { byte b = 10; char c = 65; } }"));
}

#[test]
fn method_resolution_failures() {
    let out = compile("class X { void m() { foo(); } }");
    has(&out, Category::UndefinedMethod, "The method foo() is undefined for the type X");

    let out = compile("class X { void f(int a) { } void m() { f(\"s\"); } }");
    has(
        &out,
        Category::InapplicableMethod,
        "The method f(int) in the type X is not applicable for the arguments (String)",
    );

    let out = compile("class X { void f(Integer a, Object b) { } void f(Object a, Integer b) { } void m() { f(1, 2); } }");
    assert_eq!(categories(&out), vec![Category::AmbiguousMethod]);
    assert!(messages(&out)[0].ends_with("is ambiguous for the type X"), "{:?}", messages(&out));
}

#[test]
fn final_assignments() {
    let out = compile("class X { final int f = 1; void m() { f = 2; } }");
    assert_eq!(messages(&out), vec!["The final field X.f cannot be assigned"]);
    assert_clean(&compile("class X { final int f; X() { f = 2; } }"));

    let out = compile("class X { void m() { final int a = 1; a = 2; } }");
    has(
        &out,
        Category::FinalLocalAssignment,
        "The final local variable a cannot be assigned. It must be blank and not using a compound assignment",
    );
    assert_clean(&compile("class X { void m() { final int a; a = 2; } }"));
}

#[test]
fn inherited_abstract_methods() {
    let src = "class X implements Runnable { }";
    let out = compile(src);
    assert_eq!(messages(&out), vec!["The type X must implement the inherited abstract method Runnable.run()"]);
    assert_eq!(at(errors(&out)[0]), position_of(src, "X", 0));

    assert_clean(&compile("abstract class X implements Runnable { }"));
    assert_clean(&compile("class X implements Runnable { public void run() { } }"));
}

#[test]
fn severity_overrides() {
    let src = "import java.util.List; class X { List l; }";
    let ignore = Config::default().with_override(Category::RawTypeUsage, SeverityOverride::Ignore);
    assert_clean(&compile_with(src, &ignore));

    let promote = Config::default().with_override(Category::RawTypeUsage, SeverityOverride::Error);
    let out = compile_with(src, &promote);
    assert!(out.has_errors());
    assert_eq!(out.diagnostics.summary(), "1 problem (1 error)");

    let info = Config::default().with_override(Category::RawTypeUsage, SeverityOverride::Info);
    let out = compile_with(src, &info);
    assert!(!out.has_errors());
    assert_eq!(out.diagnostics.iter().next().map(|d| d.severity), Some(Severity::Info));
}

#[test]
fn render_shows_line_and_carets() {
    let src = "class X {\n    void m() { int x = \"s\"; }\n}\n";
    let text = rendered(src);
    let expected = "----------\n1. ERROR in X.java (at line 2)\n\tvoid m() { int x = \"s\"; }\n\t                   ^^^\nType mismatch: cannot convert from String to int\n----------\n";
    assert_eq!(text, expected);
    assert!(rendered("class X { }").is_empty());
}
