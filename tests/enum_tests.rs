mod common;

use common::*;
use jfront::config::SeverityOverride;
use jfront::diagnostics::{Category, Severity};
use jfront::{Config, LanguageLevel};

fn error_messages(src: &str) -> Vec<String> {
    errors(&compile(src)).into_iter().map(|d| d.message.clone()).collect()
}

#[test]
fn implicit_values_and_value_of_collide() {
    assert_eq!(
        error_messages("enum E { A; public static E[] values() { return null; } }"),
        vec!["The enum E already defines the method values() implicitly"]
    );
    assert_eq!(
        error_messages("enum E { A; public static E valueOf(String s) { return A; } }"),
        vec!["The enum E already defines the method valueOf(String) implicitly"]
    );
    // different parameter list is an overload, not a collision
    assert!(error_messages("enum E { A; static E valueOf(int i) { return A; } }").is_empty());
}

#[test]
fn duplicate_methods_reported_on_both() {
    let src = "enum E { A; void m() {} void m() {} }";
    let out = compile(src);
    let errs = errors(&out);
    assert_eq!(errs.len(), 2, "{:#?}", out.diagnostics);
    assert!(errs.iter().all(|d| d.message == "Duplicate method m() in type E"));
    assert_eq!(at(errs[0]), position_of(src, "m()", 0));
    assert_eq!(at(errs[1]), position_of(src, "m()", 1));
}

#[test]
fn duplicate_constant_and_field() {
    let msgs = error_messages("enum E { A, B; int A; }");
    assert_eq!(msgs, vec!["Duplicate field E.A", "Duplicate field E.A"]);
}

#[test]
fn modifiers_on_constants_enums_and_constructors() {
    assert_eq!(
        error_messages("enum E { public A; }"),
        vec!["Illegal modifier for the enum constant A; no modifier is allowed"]
    );
    assert!(error_messages("final enum E { A }").contains(&"Illegal modifier for the enum E; only public is permitted".to_string()));
    assert!(error_messages("enum E { A; public E() {} }")
        .contains(&"Illegal modifier for the enum constructor; only private is permitted".to_string()));
    assert!(error_messages("enum E { A; private E() {} }").is_empty());
    assert!(error_messages("class O { private static enum M { A } }").is_empty());
}

#[test]
fn super_constructor_call_in_enum() {
    let msgs = error_messages("enum E { A; E() { super(); } }");
    assert!(msgs.contains(&"Cannot invoke super constructor from enum constructor E()".to_string()), "{:?}", msgs);
}

#[test]
fn abstract_methods_need_constant_bodies() {
    let src = "enum E { A { void m() {} }, B; abstract void m(); }";
    let out = compile(src);
    let errs = errors(&out);
    assert_eq!(errs.len(), 1, "{:#?}", out.diagnostics);
    assert_eq!(errs[0].message, "The enum constant B must implement the abstract method m()");
    assert_eq!(at(errs[0]), position_of(src, "B;", 0));

    assert_eq!(
        error_messages("enum E { A, B; abstract void m(); }"),
        vec!["The enum E can only define the abstract method m() if it also defines enum constants with corresponding implementations"]
    );
    assert!(error_messages("enum E { A { void m() {} }, B { void m() {} }; abstract void m(); }").is_empty());
}

#[test]
fn overriding_final_enum_methods() {
    let src = "enum E { A; public int hashCode() { return 0; } }";
    let out = compile(src);
    assert_eq!(messages(&out), vec!["Cannot override the final method from Enum<E>"]);

    let config = Config::default().with_override(Category::MissingOverrideAnnotation, SeverityOverride::Warning);
    let out = compile_with(src, &config);
    let warnings: Vec<_> = out.diagnostics.warnings().map(|d| d.message.clone()).collect();
    assert_eq!(
        warnings,
        vec!["The method hashCode() of type E should be tagged with @Override since it actually overrides a superclass method"]
    );
    assert_eq!(out.diagnostics.errors().count(), 1);
}

#[test]
fn enums_cannot_be_instantiated() {
    assert_eq!(error_messages("enum E { A; static Object o = new E(); }"), vec!["Cannot instantiate the type E"]);
}

#[test]
fn static_enum_fields_in_initializers() {
    assert_eq!(
        error_messages("enum E { A; static int count; E() { count++; } }"),
        vec!["Cannot refer to the static enum field E.count within an initializer"]
    );
    // constant variables are exempt
    assert!(error_messages("enum E { A; static final int MAX = 3; int m; E() { m = MAX; } }").is_empty());
}

#[test]
fn static_enum_fields_in_every_initializer_form() {
    let message = "Cannot refer to the static enum field E.count within an initializer";
    let illegal = [
        "enum E { A; static int count; E() { E.count++; } }",
        "enum E { A; static int count; int v = count; }",
        "enum E { A; static int count; int v; { v = count; } }",
        "enum E { A; static int count; E() { Runnable r = new Runnable() { public void run() { count++; } }; } }",
        "enum E { A; static int count; E() { class L { void g() { count = 1; } } } }",
    ];
    for src in illegal {
        assert_eq!(error_messages(src), vec![message], "{}", src);
    }

    let src = "enum E { A; static final Object O = new Object(); Object o; E() { o = O; } }";
    let out = compile(src);
    let errs = errors(&out);
    assert_eq!(errs.len(), 1, "{:#?}", out.diagnostics);
    assert_eq!(errs[0].category, Category::IllegalStaticReferenceInInitializer);
    assert_eq!(errs[0].message, "Cannot refer to the static enum field E.O within an initializer");
    assert_eq!(at(errs[0]), position_of(src, "O; }", 0));
}

#[test]
fn static_boundaries_end_the_initializer_rule() {
    let legal = [
        "enum E { A; static int count; E() { class L { static void g() { count = 1; } } } }",
        "enum E { A; static int count; static void m() { count++; } }",
        "enum E { A; static int count; static { count = 1; } }",
        "enum E { A; static int count; void m() { count++; } }",
    ];
    for src in legal {
        assert!(error_messages(src).is_empty(), "{}: {:?}", src, error_messages(src));
    }
}

#[test]
fn static_members_of_constant_bodies_follow_level() {
    let src = "enum E { A { static final String value = getString(); }; static String getString() { return \"\"; } }";
    assert!(compile(src).diagnostics.is_empty());
    let old = compile_at(src, LanguageLevel::V1_8);
    let errs = errors(&old);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].category, Category::IllegalStaticMemberInInnerType);
    assert_eq!(
        errs[0].message,
        "The field value cannot be declared static in a non-static inner type, unless initialized with a constant expression"
    );
    // a constant initializer is allowed at any level
    let constant = "enum E { A { static final int N = 1; }; }";
    assert!(compile_at(constant, LanguageLevel::V1_8).diagnostics.is_empty());
}

#[test]
fn missing_override_is_ignored_unless_enabled() {
    let src = "enum E { A; public String toString() { return \"a\"; } }";
    assert!(compile(src).diagnostics.is_empty());
    let config = Config::default().with_override(Category::MissingOverrideAnnotation, SeverityOverride::Error);
    let out = compile_with(src, &config);
    let errs = errors(&out);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].severity, Severity::Error);
    assert_eq!(
        errs[0].message,
        "The method toString() of type E should be tagged with @Override since it actually overrides a superclass method"
    );
}
