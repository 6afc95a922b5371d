//! Enum declaration rules
//!
//! Pure functions over one `EnumDecl` plus the facts the checker resolved for
//! it. Member duplication is shared with other type kinds.

use std::collections::HashMap;

use super::classpath::{unimplemented_abstract_methods, ClassPath};
use super::types::{type_list, Type};
use crate::ast::{has_annotation, ClassMember, CtorCallKind, EnumConstant, EnumDecl, MethodDecl, Modifier};
use crate::consts::ENUM_FINAL_METHODS;
use crate::diagnostics::{Category, Diagnostic};

/// Where an enum is declared; each placement permits different modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    TopLevel,
    Member,
    Local,
}

/// What the checker resolved about an enum declaration
#[derive(Debug, Clone)]
pub struct EnumFacts<'a> {
    pub key: &'a str,
    pub placement: Placement,
    /// Resolved parameter types of each declared method, in member order
    pub method_params: &'a [Vec<Type>],
    /// Binary name of each constant body, aligned with the constants
    pub body_keys: &'a [Option<String>],
}

pub fn check_enum(decl: &EnumDecl, facts: &EnumFacts<'_>, index: &dyn ClassPath) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let name = decl.name.as_str();
    let implicit = [("values", Vec::new()), ("valueOf", vec![Type::string()])];
    out.extend(duplicate_members(name, &decl.body, &decl.constants, facts.method_params, &implicit));
    enum_modifiers(decl, facts.placement, &mut out);
    constant_modifiers(&decl.constants, &mut out);
    constructors(decl, &mut out);
    abstract_methods(decl, facts, index, &mut out);
    final_enum_methods(decl, facts, &mut out);
    out
}

/// Fields (and enum constants) declared twice are reported at every
/// occurrence; methods with the same erased signature likewise. A method that
/// collides with one in `implicit` gets the "defined implicitly" message.
pub fn duplicate_members(
    type_name: &str,
    members: &[ClassMember],
    constants: &[EnumConstant],
    method_params: &[Vec<Type>],
    implicit: &[(&str, Vec<Type>)],
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let mut fields: Vec<(&str, crate::ast::Span)> = constants.iter().map(|c| (c.name.as_str(), c.name_span)).collect();
    fields.extend(members.iter().filter_map(|m| match m {
        ClassMember::Field(f) => Some((f.name.as_str(), f.name_span)),
        _ => None,
    }));
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (n, _) in &fields {
        *counts.entry(n).or_default() += 1;
    }
    for (n, span) in &fields {
        if counts[n] > 1 {
            out.push(Diagnostic::new(Category::DuplicateMember, format!("Duplicate field {}.{}", type_name, n), *span));
        }
    }

    let methods: Vec<(&MethodDecl, Vec<Type>)> = members
        .iter()
        .filter_map(|m| match m {
            ClassMember::Method(md) => Some(md),
            _ => None,
        })
        .zip(method_params.iter())
        .map(|(md, params)| (md, params.iter().map(Type::erasure).collect()))
        .collect();
    for (i, (m, erased)) in methods.iter().enumerate() {
        if erased.iter().any(Type::is_unknown) {
            continue;
        }
        let collides_implicitly = implicit
            .iter()
            .any(|(n, params)| *n == m.name && params.iter().map(Type::erasure).collect::<Vec<_>>() == *erased);
        if collides_implicitly {
            out.push(Diagnostic::new(
                Category::DuplicateMemberOrAlreadyDefinedImplicitly,
                format!("The enum {} already defines the method {}({}) implicitly", type_name, m.name, type_list(erased)),
                m.name_span,
            ));
            continue;
        }
        let duplicated = methods
            .iter()
            .enumerate()
            .any(|(j, (other, other_erased))| i != j && other.name == m.name && other_erased == erased);
        if duplicated {
            out.push(Diagnostic::new(
                Category::DuplicateMember,
                format!("Duplicate method {}({}) in type {}", m.name, type_list(&method_params[i]), type_name),
                m.name_span,
            ));
        }
    }
    out
}

fn enum_modifiers(decl: &EnumDecl, placement: Placement, out: &mut Vec<Diagnostic>) {
    let (allowed, message): (&[Modifier], String) = match placement {
        Placement::TopLevel => (
            &[Modifier::Public, Modifier::Strictfp],
            format!("Illegal modifier for the enum {}; only public is permitted", decl.name),
        ),
        Placement::Member => (
            &[Modifier::Public, Modifier::Protected, Modifier::Private, Modifier::Static, Modifier::Strictfp],
            format!(
                "Illegal modifier for the member enum {}; only public, protected, private & static are permitted",
                decl.name
            ),
        ),
        Placement::Local => (
            &[Modifier::Strictfp],
            format!("Illegal modifier for local enum {}; no explicit modifier is permitted", decl.name),
        ),
    };
    if decl.modifiers.iter().any(|m| !allowed.contains(m)) {
        out.push(Diagnostic::new(Category::IllegalModifier, message, decl.name_span));
    }
}

fn constant_modifiers(constants: &[EnumConstant], out: &mut Vec<Diagnostic>) {
    for c in constants.iter().filter(|c| !c.modifiers.is_empty()) {
        out.push(Diagnostic::new(
            Category::IllegalModifierForEnumConstant,
            format!("Illegal modifier for the enum constant {}; no modifier is allowed", c.name),
            c.name_span,
        ));
    }
}

fn constructors(decl: &EnumDecl, out: &mut Vec<Diagnostic>) {
    for member in &decl.body {
        let ClassMember::Constructor(c) = member else { continue };
        if c.modifiers.iter().any(|m| *m != Modifier::Private) {
            out.push(Diagnostic::new(
                Category::IllegalModifier,
                "Illegal modifier for the enum constructor; only private is permitted",
                c.name_span,
            ));
        }
        if let Some(inv) = &c.explicit_invocation {
            if inv.kind == CtorCallKind::Super {
                let params: Vec<String> = c
                    .parameters
                    .iter()
                    .map(|p| if p.varargs { format!("{}...", p.type_ref) } else { p.type_ref.to_string() })
                    .collect();
                out.push(Diagnostic::new(
                    Category::IllegalEnumSuperCall,
                    format!("Cannot invoke super constructor from enum constructor {}({})", decl.name, params.join(", ")),
                    inv.span,
                ));
            }
        }
    }
}

fn abstract_methods(decl: &EnumDecl, facts: &EnumFacts<'_>, index: &dyn ClassPath, out: &mut Vec<Diagnostic>) {
    let Some(missing) = unimplemented_abstract_methods(index, facts.key) else { return };
    if missing.is_empty() {
        return;
    }
    if !decl.has_constant_bodies() {
        for m in decl.abstract_methods() {
            let params: Vec<String> = m.parameters.iter().map(|p| p.type_ref.to_string()).collect();
            out.push(Diagnostic::new(
                Category::AbstractMethodInEnumWithoutBodies,
                format!(
                    "The enum {} can only define the abstract method {}({}) if it also defines enum constants with corresponding implementations",
                    decl.name,
                    m.name,
                    params.join(", ")
                ),
                m.name_span,
            ));
        }
        for m in missing.iter().filter(|m| m.owner != facts.key) {
            out.push(Diagnostic::new(
                Category::MustImplementAbstractMethod,
                format!(
                    "The type {} must implement the inherited abstract method {}.{}",
                    decl.name,
                    Type::simple_name_of(&m.owner),
                    m.signature()
                ),
                decl.name_span,
            ));
        }
        return;
    }
    for (c, body_key) in decl.constants.iter().zip(facts.body_keys.iter()) {
        let unimplemented = match body_key {
            Some(key) => match unimplemented_abstract_methods(index, key) {
                Some(list) => list,
                None => continue,
            },
            None => missing.clone(),
        };
        for m in unimplemented {
            out.push(Diagnostic::new(
                Category::MustImplementAbstractMethod,
                format!("The enum constant {} must implement the abstract method {}", c.name, m.signature()),
                c.name_span,
            ));
        }
    }
}

fn final_enum_methods(decl: &EnumDecl, facts: &EnumFacts<'_>, out: &mut Vec<Diagnostic>) {
    let methods = decl.body.iter().filter_map(|m| match m {
        ClassMember::Method(md) => Some(md),
        _ => None,
    });
    for (m, params) in methods.zip(facts.method_params.iter()) {
        if m.is_static() {
            continue;
        }
        let arity_matches = ENUM_FINAL_METHODS.iter().any(|(n, arity)| *n == m.name && *arity == params.len());
        if !arity_matches {
            continue;
        }
        let params_match = match m.name.as_str() {
            "equals" => params[0].erasure() == Type::object(),
            "compareTo" => params[0].erasure() == Type::class(facts.key) || params[0].is_unknown(),
            _ => true,
        };
        if !params_match {
            continue;
        }
        out.push(Diagnostic::new(
            Category::CannotOverrideFinalMethod,
            format!("Cannot override the final method from Enum<{}>", decl.name),
            m.name_span,
        ));
        if !has_annotation(&m.annotations, "Override") {
            out.push(Diagnostic::new(
                Category::MissingOverrideAnnotation,
                format!(
                    "The method {}({}) of type {} should be tagged with @Override since it actually overrides a superclass method",
                    m.name,
                    type_list(params),
                    decl.name
                ),
                m.name_span,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ast::TypeDecl;
    use crate::config::Config;
    use crate::parser::parse_source;
    use crate::wash::classpath::{CompositeIndex, JdkClassPath};
    use crate::wash::enter::enter_units;

    fn run(source: &str, params: &[Vec<Type>]) -> Vec<String> {
        let config = Config::default();
        let (unit, errors) = parse_source(source, &config);
        assert!(errors.is_empty(), "{:?}", errors);
        let jdk: Arc<dyn ClassPath> = Arc::new(JdkClassPath::new());
        let sources = enter_units(&[("E.java", &unit)], jdk.clone());
        let index = CompositeIndex::new(vec![Arc::new(sources.clone()), jdk]);
        let Some(TypeDecl::Enum(decl)) = unit.type_decls.first() else { panic!("expected an enum") };
        let body_keys: Vec<Option<String>> = decl
            .constants
            .iter()
            .map(|c| c.body.as_body().and_then(|b| sources.key_at("E.java", b.span.start.offset)).map(str::to_string))
            .collect();
        let facts = EnumFacts { key: "E", placement: Placement::TopLevel, method_params: params, body_keys: &body_keys };
        check_enum(decl, &facts, &index).into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn duplicate_constant_reported_twice() {
        let msgs = run("enum E { A, B, A; }", &[]);
        assert_eq!(msgs, vec!["Duplicate field E.A", "Duplicate field E.A"]);
    }

    #[test]
    fn implicit_values_collision() {
        let msgs = run("enum E { A; public static E[] values() { return null; } }", &[vec![]]);
        assert_eq!(msgs, vec!["The enum E already defines the method values() implicitly"]);
    }

    #[test]
    fn constant_modifier() {
        assert_eq!(
            run("enum E { public A; }", &[]),
            vec!["Illegal modifier for the enum constant A; no modifier is allowed"]
        );
    }

    #[test]
    fn abstract_method_coverage() {
        let msgs = run("enum E { A { void m() {} }, B; abstract void m(); }", &[vec![]]);
        assert_eq!(msgs, vec!["The enum constant B must implement the abstract method m()"]);
        let msgs = run("enum E { A, B; abstract void m(); }", &[vec![]]);
        assert_eq!(
            msgs,
            vec!["The enum E can only define the abstract method m() if it also defines enum constants with corresponding implementations"]
        );
    }

    #[test]
    fn final_enum_method_override() {
        let msgs = run("enum E { A; public int hashCode() { return 0; } }", &[vec![]]);
        assert_eq!(msgs, vec!["Cannot override the final method from Enum<E>", "The method hashCode() of type E should be tagged with @Override since it actually overrides a superclass method"]);
    }
}
