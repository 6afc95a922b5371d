mod common;

use std::fs;
use std::path::PathBuf;

use common::*;
use jfront::diagnostics::Category;
use jfront::{compile_paths, compile_unit, compile_units, render_all, Config, Error, SourceFile};
use tempfile::TempDir;

const A: &str = "package p;\npublic class A {\n    public static int twice(int x) { return x * 2; }\n}\n";
const B: &str = "package p;\nclass B {\n    int m() { return A.twice(3); }\n}\n";
const C: &str = "package p;\nclass C {\n    int m() { return A.missing(); }\n}\n";
const D: &str = "package p;\nclass D {\n    Foo f;\n}\n";

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    let pkg = dir.path().join("p");
    fs::create_dir_all(&pkg).expect("package dir");
    for (name, text) in files {
        fs::write(pkg.join(name), text).expect("write source");
    }
    dir
}

#[test]
fn types_resolve_across_units() {
    init_logging();
    let dir = project(&[("B.java", B), ("A.java", A)]);
    let (sources, outputs) = compile_paths(&[dir.path().to_path_buf()], &Config::default()).expect("compile");
    let names: Vec<&str> = sources.iter().map(|s| s.file_name()).collect();
    assert_eq!(names, vec!["A.java", "B.java"]);
    for out in &outputs {
        assert_clean(out);
    }
    assert_eq!(outputs[1].plans[0].binary_name, "p/B");
}

#[test]
fn a_lone_unit_does_not_see_its_siblings() {
    let out = compile_unit(&SourceFile::new("B.java", B), &Config::default());
    assert!(out.diagnostics.iter().any(|d| d.category == Category::UnresolvedName), "{:#?}", out.diagnostics);
}

#[test]
fn combined_log_is_numbered_across_files() {
    let dir = project(&[("A.java", A), ("C.java", C), ("D.java", D)]);
    let (sources, outputs) = compile_paths(&[dir.path().to_path_buf()], &Config::default()).expect("compile");
    assert!(outputs[0].diagnostics.is_empty());
    assert_eq!(messages(&outputs[1]), vec!["The method missing() is undefined for the type A"]);
    assert_eq!(messages(&outputs[2]), vec!["Foo cannot be resolved to a type"]);

    let text = render_all(&sources, &outputs);
    assert!(text.contains("1. ERROR in C.java (at line 3)\n\tint m() { return A.missing(); }\n"), "{}", text);
    assert!(text.contains("2. ERROR in D.java (at line 3)\n\tFoo f;\n\t^^^\n"), "{}", text);
    assert!(!text.contains("3. "));
}

#[test]
fn batch_results_keep_input_order() {
    let sources = vec![
        SourceFile::new("Z.java", "class Z { Y y; }"),
        SourceFile::new("Y.java", "class Y { Z z; }"),
        SourceFile::new("W.java", "class W { Missing m; }"),
    ];
    let outputs = compile_units(&sources, &Config::default());
    let files: Vec<&str> = outputs.iter().map(|o| o.file.as_str()).collect();
    assert_eq!(files, vec!["Z.java", "Y.java", "W.java"]);
    assert!(!outputs[0].has_errors());
    assert!(!outputs[1].has_errors());
    assert!(outputs[2].has_errors());
}

#[test]
fn single_files_and_unreadable_paths() {
    let dir = project(&[("A.java", A)]);
    let file = dir.path().join("p").join("A.java");
    let (sources, outputs) = compile_paths(&[file], &Config::default()).expect("compile");
    assert_eq!(sources.len(), 1);
    assert!(outputs[0].diagnostics.is_empty());

    let missing = PathBuf::from(dir.path()).join("nope").join("Q.java");
    match compile_paths(&[missing], &Config::default()) {
        Err(Error::Io { path, .. }) => assert!(path.ends_with("Q.java")),
        other => panic!("expected an IO error, got {:?}", other.map(|(s, _)| s.len())),
    }
    assert!(matches!(SourceFile::read(&dir.path().join("absent.java")), Err(Error::Io { .. })));
}

fn parenthesized(depth: usize) -> String {
    format!("class N {{ int m() {{ return {}1{}; }} }}", "(".repeat(depth), ")".repeat(depth))
}

fn too_deep(out: &jfront::CompileOutput) -> bool {
    out.diagnostics
        .iter()
        .any(|d| d.category == Category::SyntaxError && d.message == "Syntax error, the construct is nested too deeply")
}

#[test]
fn deep_nesting_is_reported_not_fatal() {
    init_logging();
    let config = Config::default();
    assert_clean(&compile_unit(&SourceFile::new("N.java", parenthesized(40)), &config));

    let deep = compile_unit(&SourceFile::new("N.java", parenthesized(1000)), &config);
    assert!(too_deep(&deep), "{:#?}", deep.diagnostics);

    let chain = format!("class M {{ int m(int a) {{ return a{}; }} }}", " + a".repeat(1000));
    let unary = format!("class U {{ int m(int a) {{ return {}a; }} }}", "- ".repeat(1000));
    let blocks = format!("class B {{ void m() {{ {}{} }} }}", "{ ".repeat(1000), "} ".repeat(1000));
    let sources = vec![
        SourceFile::new("A.java", "class A { int m() { return ((1 + 2) * 3); } }"),
        SourceFile::new("N.java", parenthesized(1000)),
        SourceFile::new("M.java", chain),
        SourceFile::new("U.java", unary),
        SourceFile::new("B.java", blocks),
    ];
    let outputs = compile_units(&sources, &config);
    assert_eq!(outputs.len(), 5);
    assert_clean(&outputs[0]);
    for out in &outputs[1..] {
        assert!(too_deep(out), "{}: {:#?}", out.file, out.diagnostics);
    }
}
