//! Overload resolution (JLS 15.12.2)
//!
//! Three applicability phases: strict (subtyping and primitive widening),
//! loose (plus boxing and unboxing), then variable arity. Among the applicable
//! candidates of the first phase that finds any, the most specific one wins.
//! Anything the index cannot decide makes a candidate applicable rather than
//! producing an error.

use super::classpath::{ClassPath, MethodInfo};
use super::types::{is_assignable, is_subtype, type_list, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Strict,
    Loose,
    Varargs,
}

/// Outcome of resolving one call site
#[derive(Debug, Clone)]
pub enum Selection {
    Found { method: MethodInfo, phase: Phase },
    /// Several candidates apply and none is more specific
    Ambiguous(Vec<MethodInfo>),
    /// Candidates exist but none accepts the arguments
    NotApplicable,
    /// Applicable candidates exist but unknown argument types prevent a choice
    Undecided,
    NoCandidates,
}

pub fn select(index: &dyn ClassPath, candidates: &[MethodInfo], args: &[Type]) -> Selection {
    if candidates.is_empty() {
        return Selection::NoCandidates;
    }
    for phase in [Phase::Strict, Phase::Loose, Phase::Varargs] {
        let applicable: Vec<&MethodInfo> =
            candidates.iter().filter(|m| is_applicable(index, m, args, phase)).collect();
        if applicable.is_empty() {
            continue;
        }
        if applicable.len() == 1 {
            return Selection::Found { method: applicable[0].clone(), phase };
        }
        if args.iter().any(Type::is_indeterminate) {
            return Selection::Undecided;
        }
        return most_specific(index, &applicable, phase);
    }
    Selection::NotApplicable
}

fn is_applicable(index: &dyn ClassPath, m: &MethodInfo, args: &[Type], phase: Phase) -> bool {
    let accepts = |arg: &Type, param: &Type| -> bool {
        let verdict = match phase {
            Phase::Strict => is_subtype(index, arg, param),
            Phase::Loose | Phase::Varargs => is_assignable(index, arg, param),
        };
        verdict != Some(false)
    };
    match phase {
        Phase::Strict | Phase::Loose => {
            m.params.len() == args.len() && m.params.iter().zip(args).all(|(p, a)| accepts(a, p))
        }
        Phase::Varargs => {
            if !m.varargs || args.len() + 1 < m.params.len() {
                return false;
            }
            let fixed = m.params.len() - 1;
            let element = match m.params.last().and_then(Type::element) {
                Some(e) => e.clone(),
                None => Type::Unknown,
            };
            m.params[..fixed].iter().zip(args).all(|(p, a)| accepts(a, p))
                && args[fixed..].iter().all(|a| accepts(a, &element))
        }
    }
}

/// Parameter `i` of `m` as seen by a call of the given phase
fn param_at(m: &MethodInfo, i: usize, phase: Phase) -> Option<Type> {
    if phase == Phase::Varargs && m.varargs && i + 1 >= m.params.len() {
        return m.params.last().and_then(Type::element).cloned();
    }
    m.params.get(i).cloned()
}

/// `Some(true)` when every parameter of `a` is a subtype of the matching one
/// of `b`; `None` when some comparison cannot be decided
fn more_specific(index: &dyn ClassPath, a: &MethodInfo, b: &MethodInfo, phase: Phase) -> Option<bool> {
    let n = a.params.len().max(b.params.len());
    let mut decided = true;
    for i in 0..n {
        let (Some(pa), Some(pb)) = (param_at(a, i, phase), param_at(b, i, phase)) else { continue };
        match is_subtype(index, &pa, &pb) {
            Some(true) => {}
            Some(false) => return Some(false),
            None => decided = false,
        }
    }
    if decided {
        Some(true)
    } else {
        None
    }
}

fn most_specific(index: &dyn ClassPath, applicable: &[&MethodInfo], phase: Phase) -> Selection {
    let mut undecided = false;
    let maximal: Vec<&MethodInfo> = applicable
        .iter()
        .copied()
        .filter(|m| {
            applicable.iter().all(|o| {
                if std::ptr::eq(*m, *o) {
                    return true;
                }
                match more_specific(index, m, o, phase) {
                    Some(v) => v,
                    None => {
                        undecided = true;
                        true
                    }
                }
            })
        })
        .collect();
    match maximal.as_slice() {
        [one] => Selection::Found { method: (*one).clone(), phase },
        [first, rest @ ..] if rest.iter().all(|m| m.erased_params() == first.erased_params()) => {
            // inherited and redeclared copies of one signature: prefer a concrete one
            let chosen = maximal.iter().find(|m| !m.is_abstract).unwrap_or(first);
            Selection::Found { method: (*chosen).clone(), phase }
        }
        _ if undecided => Selection::Undecided,
        [] => Selection::Ambiguous(applicable.iter().take(2).map(|m| (*m).clone()).collect()),
        _ => Selection::Ambiguous(maximal.iter().take(2).map(|m| (*m).clone()).collect()),
    }
}

/// Message for a method call that resolved to nothing usable
pub fn method_failure(selection: &Selection, candidates: &[MethodInfo], name: &str, receiver: &str, args: &[Type]) -> Option<String> {
    match selection {
        Selection::Ambiguous(methods) => {
            let m = methods.first()?;
            Some(format!("The method {} is ambiguous for the type {}", m.signature(), receiver))
        }
        Selection::NotApplicable if candidates.len() == 1 => Some(format!(
            "The method {} in the type {} is not applicable for the arguments ({})",
            candidates[0].signature(),
            Type::simple_name_of(&candidates[0].owner),
            type_list(args)
        )),
        Selection::NotApplicable | Selection::NoCandidates => {
            Some(format!("The method {}({}) is undefined for the type {}", name, type_list(args), receiver))
        }
        Selection::Found { .. } | Selection::Undecided => None,
    }
}

/// Message for an instance creation whose constructor did not resolve
pub fn constructor_failure(selection: &Selection, type_name: &str, args: &[Type]) -> Option<String> {
    match selection {
        Selection::Ambiguous(ctors) => {
            let c = ctors.first()?;
            Some(format!("The constructor {}({}) is ambiguous", type_name, type_list(&c.params)))
        }
        Selection::NotApplicable | Selection::NoCandidates => {
            Some(format!("The constructor {}({}) is undefined", type_name, type_list(args)))
        }
        Selection::Found { .. } | Selection::Undecided => None,
    }
}

/// Raw receivers erase generic parameters to `Object`; calling such a method
/// is an unchecked operation. Returns the warning text.
pub fn unchecked_raw_call(index: &dyn ClassPath, receiver: &Type, chosen: &MethodInfo) -> Option<String> {
    let Type::Class { name, args } = receiver else { return None };
    if !args.is_empty() {
        return None;
    }
    let receiver_desc = index.resolve_type(name)?;
    if receiver_desc.type_params.is_empty() {
        return None;
    }
    let owner = index.resolve_type(&chosen.owner)?;
    let declared = owner
        .methods_named(&chosen.name)
        .find(|m| m.params.len() == chosen.params.len() && m.erased_params() == chosen.erased_params())
        .or_else(|| owner.methods_named(&chosen.name).find(|m| m.params.len() == chosen.params.len()))?;
    let class_vars = &owner.type_params;
    let generic = declared.params.iter().any(|p| mentions_any(p, class_vars));
    if !generic {
        return None;
    }
    Some(format!(
        "Type safety: The method {}({}) belongs to the raw type {}. References to generic type {} should be parameterized",
        chosen.name,
        type_list(&declared.erased_params()),
        owner.simple_name(),
        owner.generic_display()
    ))
}

fn mentions_any(t: &Type, vars: &[String]) -> bool {
    match t {
        Type::TypeVar(v) => vars.contains(v),
        Type::Class { args, .. } => args.iter().any(|a| mentions_any(a, vars)),
        Type::Array(e) => mentions_any(e, vars),
        _ => false,
    }
}

/// Return type of a chosen method; results that depend on the method's own
/// type parameters are not inferred
pub fn return_type(method: &MethodInfo) -> Type {
    if mentions_any(&method.ret, &method.type_params) {
        Type::Unknown
    } else {
        method.ret.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wash::classpath::JdkClassPath;
    use crate::wash::types::PrimitiveKind;

    fn method(name: &str, params: Vec<Type>) -> MethodInfo {
        MethodInfo {
            name: name.to_string(),
            params,
            varargs: false,
            ret: Type::Void,
            type_params: Vec::new(),
            is_static: false,
            is_abstract: false,
            is_final: false,
            is_private: false,
            is_deprecated: false,
            owner: "T".to_string(),
        }
    }

    fn chosen(selection: Selection) -> Vec<Type> {
        match selection {
            Selection::Found { method, .. } => method.params,
            other => panic!("expected a method, got {:?}", other),
        }
    }

    #[test]
    fn strict_phase_beats_boxing() {
        let index = JdkClassPath::new();
        let candidates = vec![method("m", vec![Type::class("java.lang.Integer")]), method("m", vec![Type::Primitive(PrimitiveKind::Long)])];
        assert_eq!(chosen(select(&index, &candidates, &[Type::int()])), vec![Type::Primitive(PrimitiveKind::Long)]);
    }

    #[test]
    fn most_specific_reference_parameter() {
        let index = JdkClassPath::new();
        let candidates = vec![method("m", vec![Type::object()]), method("m", vec![Type::string()])];
        assert_eq!(chosen(select(&index, &candidates, &[Type::Null])), vec![Type::string()]);
    }

    #[test]
    fn ambiguous_call() {
        let index = JdkClassPath::new();
        let candidates = vec![
            method("m", vec![Type::string(), Type::object()]),
            method("m", vec![Type::object(), Type::string()]),
        ];
        let selection = select(&index, &candidates, &[Type::string(), Type::string()]);
        assert_eq!(
            method_failure(&selection, &candidates, "m", "T", &[Type::string(), Type::string()]).as_deref(),
            Some("The method m(String, Object) is ambiguous for the type T")
        );
    }

    #[test]
    fn varargs_is_last_resort() {
        let index = JdkClassPath::new();
        let mut spread = method("m", vec![Type::array_of(Type::int(), 1)]);
        spread.varargs = true;
        let candidates = vec![spread, method("m", vec![Type::int(), Type::int()])];
        assert_eq!(chosen(select(&index, &candidates, &[Type::int(), Type::int()])), vec![Type::int(), Type::int()]);
        let selection = select(&index, &candidates, &[Type::int(), Type::int(), Type::int()]);
        assert!(matches!(selection, Selection::Found { phase: Phase::Varargs, .. }));
    }

    #[test]
    fn single_inapplicable_candidate() {
        let index = JdkClassPath::new();
        let candidates = vec![method("m", vec![Type::int()])];
        let selection = select(&index, &candidates, &[Type::string()]);
        assert_eq!(
            method_failure(&selection, &candidates, "m", "T", &[Type::string()]).as_deref(),
            Some("The method m(int) in the type T is not applicable for the arguments (String)")
        );
    }
}
