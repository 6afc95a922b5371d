mod common;

use std::collections::BTreeSet;

use common::*;
use jfront::codegen::flags::access_flags::*;
use jfront::codegen::{describe, ClassModifier, ShapePlan};
use jfront::LanguageLevel;

fn plans(src: &str) -> Vec<ShapePlan> {
    compile(src).plans
}

fn synthetic<'a>(plan: &'a ShapePlan, name: &str) -> Option<&'a jfront::codegen::SyntheticMethod> {
    plan.synthetic_methods.iter().find(|m| m.name == name)
}

fn modifiers(plan: &ShapePlan) -> Vec<ClassModifier> {
    plan.class_modifiers.iter().copied().collect()
}

#[test]
fn enum_synthetic_members() {
    let p = &plans("package p; public enum Color { RED, GREEN; }")[0];
    assert_eq!(p.binary_name, "p/Color");
    assert_eq!(p.access_flags, ACC_PUBLIC | ACC_FINAL | ACC_SUPER | ACC_ENUM);
    assert!(p.needs_static_initializer);
    assert_eq!(synthetic(p, "values").map(|m| m.descriptor.as_str()), Some("()[Lp/Color;"));
    assert_eq!(synthetic(p, "valueOf").map(|m| m.descriptor.as_str()), Some("(Ljava/lang/String;)Lp/Color;"));
    let dollar = synthetic(p, "$values").expect("$values");
    assert_eq!(dollar.access_flags, ACC_PRIVATE | ACC_STATIC | ACC_SYNTHETIC);
    assert_eq!(p.constructor_signatures, vec!["(Ljava/lang/String;I)V"]);
    assert_eq!(synthetic(p, "<init>").map(|m| m.access_flags), Some(ACC_PRIVATE));
}

#[test]
fn dollar_values_depends_on_level() {
    let old = compile_at("enum E { A }", LanguageLevel::V1_8);
    assert!(old.plans[0].has_synthetic("values"));
    assert!(!old.plans[0].has_synthetic("$values"));
    // no constants, nothing to collect
    assert!(!plans("enum E { }")[0].has_synthetic("$values"));
}

#[test]
fn enum_constructors_take_name_and_ordinal() {
    let src = "enum E { A(1) { }, B(2); final int v; E(int v) { this.v = v; } }";
    let out = compile(src);
    assert_clean(&out);
    let p = &out.plans[0];
    assert_eq!(p.constructor_signatures, vec!["(Ljava/lang/String;II)V"]);
    assert!(!p.has_synthetic("<init>"));
    assert!(modifiers(p).is_empty());

    let body = &p.nested[0];
    assert_eq!(body.binary_name, "E$1");
    assert_eq!(body.constructor_signatures, vec!["(Ljava/lang/String;II)V"]);
    assert_eq!(modifiers(body), vec![ClassModifier::Final]);
    assert_eq!(body.access_flags, ACC_FINAL | ACC_SUPER | ACC_ENUM);
}

#[test]
fn enum_class_modifiers() {
    assert_eq!(modifiers(&plans("enum E { A, B }")[0]), vec![ClassModifier::Final]);
    assert!(modifiers(&plans("enum E { A { }, B }")[0]).is_empty());
    let abstract_enum = &plans("enum Op { PLUS { int apply() { return 1; } }; abstract int apply(); }")[0];
    assert_eq!(modifiers(abstract_enum), vec![ClassModifier::Abstract]);
    assert_ne!(abstract_enum.access_flags & ACC_ABSTRACT, 0);
    assert_eq!(abstract_enum.access_flags & ACC_FINAL, 0);
}

#[test]
fn constant_bodies_numbered_in_order() {
    let p = &plans("enum E { A { }, B, C { }, D { }; }")[0];
    let names: Vec<&str> = p.nested.iter().map(|n| n.binary_name.as_str()).collect();
    assert_eq!(names, vec!["E$1", "E$2", "E$3"]);
}

#[test]
fn default_constructors_follow_class_access() {
    let p = &plans("public class A { }")[0];
    assert_eq!(p.constructor_signatures, vec!["()V"]);
    assert_eq!(synthetic(p, "<init>").map(|m| m.access_flags), Some(ACC_PUBLIC));
    assert_eq!(p.access_flags, ACC_PUBLIC | ACC_SUPER);

    let p = &plans("class A { A(int x) { } }")[0];
    assert_eq!(p.constructor_signatures, vec!["(I)V"]);
    assert!(!p.has_synthetic("<init>"));
}

#[test]
fn inner_classes_receive_the_outer_instance() {
    let p = &plans("class A { class B { } static class C { } }")[0];
    let b = &p.nested[0];
    let c = &p.nested[1];
    assert_eq!(b.binary_name, "A$B");
    assert_eq!(b.constructor_signatures, vec!["(LA;)V"]);
    assert_eq!(c.binary_name, "A$C");
    assert_eq!(c.constructor_signatures, vec!["()V"]);
}

#[test]
fn record_members() {
    let out = compile("record P(int x, String name) { }");
    assert_clean(&out);
    let p = &out.plans[0];
    assert_eq!(modifiers(p), vec![ClassModifier::Final]);
    assert_eq!(p.constructor_signatures, vec!["(ILjava/lang/String;)V"]);
    assert_eq!(synthetic(p, "x").map(|m| m.descriptor.as_str()), Some("()I"));
    assert_eq!(synthetic(p, "name").map(|m| m.descriptor.as_str()), Some("()Ljava/lang/String;"));
    assert_eq!(synthetic(p, "equals").map(|m| m.descriptor.as_str()), Some("(Ljava/lang/Object;)Z"));
    assert!(p.has_synthetic("hashCode") && p.has_synthetic("toString"));

    let declared = &plans("record P(int x) { public int x() { return 1; } public String toString() { return \"\"; } }")[0];
    assert!(!declared.has_synthetic("x"));
    assert!(!declared.has_synthetic("toString"));
    assert!(declared.has_synthetic("hashCode"));
}

#[test]
fn anonymous_and_local_classes_in_source_order() {
    let src = r#"
class A {
    void m() {
        Runnable r = new Runnable() { public void run() { } };
        class L { }
        Object o = new Object() { };
    }
}
"#;
    let p = &plans(src)[0];
    let names: Vec<&str> = p.nested.iter().map(|n| n.binary_name.as_str()).collect();
    assert_eq!(names, vec!["A$1", "A$1L", "A$2"]);
    assert_eq!(p.nested[0].access_flags, ACC_SUPER);
    assert_eq!(p.nested[0].constructor_signatures, vec!["()V"]);
}

#[test]
fn static_initializer_detection() {
    assert!(!plans("class A { static final int X = 1 + 2; static final String S = \"s\"; }")[0].needs_static_initializer);
    assert!(plans("class A { static int[] xs = new int[3]; }")[0].needs_static_initializer);
    assert!(plans("class A { static { } }")[0].needs_static_initializer);
    assert!(plans("class A { static final Object O = new Object(); }")[0].needs_static_initializer);
    assert!(!plans("class A { final Object o = new Object(); }")[0].needs_static_initializer);
}

#[test]
fn flatten_and_describe() {
    let p = &plans("public enum X { A { }, B; }")[0];
    let all: Vec<&str> = p.flatten().iter().map(|n| n.binary_name.as_str()).collect();
    assert_eq!(all, vec!["X", "X$1"]);
    let text = describe(&plans("public enum X { A { }, B; }"));
    assert!(text.starts_with("X [ACC_PUBLIC ACC_SUPER ACC_ENUM]\n  field $VALUES\n  <clinit>\n"), "{}", text);
    assert!(text.contains("X$1 [ACC_FINAL ACC_SUPER ACC_ENUM]\n"), "{}", text);
    assert!(text.contains("  synthetic valueOf(Ljava/lang/String;)LX;\n"), "{}", text);
}

#[test]
fn plans_keep_declaration_order_of_top_level_types() {
    let names: BTreeSet<String> = plans("class A { } interface B { } enum C { X }").into_iter().map(|p| p.binary_name).collect();
    assert_eq!(names, ["A", "B", "C"].iter().map(|s| s.to_string()).collect());
}
