//! Switch rules
//!
//! `check_switch` is a pure function over a [`SwitchInfo`] summary built by
//! the checker: duplicate constants, dominance, `null`/`default` combinations,
//! fall-through into patterns, guard constants, arm completion and
//! exhaustiveness (enum constants, sealed hierarchies, total patterns).

use std::collections::HashSet;

use super::classpath::ClassPath;
use super::flow::ConstValue;
use super::types::{is_subtype, Type};
use crate::ast::Span;
use crate::config::{Config, Feature};
use crate::consts::HIERARCHY_MAX_STEPS;
use crate::diagnostics::{Category, Diagnostic};

#[derive(Debug, Clone)]
pub struct SwitchInfo {
    pub is_expression: bool,
    pub selector: Type,
    pub keyword_span: Span,
    pub labels: Vec<LabelInfo>,
    pub cases: Vec<CaseInfo>,
}

/// One case label element
#[derive(Debug, Clone)]
pub struct LabelInfo {
    pub kind: LabelKind,
    pub span: Span,
    /// Index into `SwitchInfo::cases`
    pub case_index: usize,
    /// Index of the `case ...` label among all labels of the switch
    pub label_group: usize,
    /// Position of the label within its statement group
    pub position_in_case: usize,
    pub guard: Option<GuardInfo>,
}

#[derive(Debug, Clone)]
pub enum LabelKind {
    Default,
    Null,
    Constant {
        ty: Type,
        value: Option<ConstValue>,
        /// Owner key and name when the constant is an enum constant
        enum_constant: Option<(String, String)>,
    },
    TypePattern {
        ty: Type,
    },
    RecordPattern {
        ty: Type,
    },
}

impl LabelKind {
    fn pattern_type(&self) -> Option<&Type> {
        match self {
            LabelKind::TypePattern { ty } | LabelKind::RecordPattern { ty } => Some(ty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GuardInfo {
    pub span: Span,
    /// Value of a constant guard
    pub constant: Option<bool>,
}

/// One statement group or arrow rule
#[derive(Debug, Clone)]
pub struct CaseInfo {
    pub arrow: bool,
    /// Arrow block or statement group body can complete normally
    pub completes_normally: bool,
    /// Arrow rule with a block body
    pub block_body: bool,
    pub span: Span,
}

pub fn check_switch(info: &SwitchInfo, index: &dyn ClassPath, config: &Config) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    duplicate_constants(info, &mut out);
    null_combinations(info, &mut out);
    dominance(info, index, &mut out);
    default_with_total_pattern(info, index, &mut out);
    fall_through(info, &mut out);
    guards(info, &mut out);
    arm_completion(info, &mut out);
    exhaustiveness(info, index, config, &mut out);
    out
}

fn duplicate_constants(info: &SwitchInfo, out: &mut Vec<Diagnostic>) {
    let mut seen = HashSet::new();
    for label in &info.labels {
        let LabelKind::Constant { value, enum_constant, .. } = &label.kind else { continue };
        let key = match (enum_constant, value) {
            (Some((owner, name)), _) => format!("e:{}.{}", owner, name),
            (None, Some(ConstValue::Str(s))) => format!("s:{}", s),
            (None, Some(v)) => match v.as_i64() {
                Some(i) => format!("i:{}", i),
                None => format!("v:{}", v),
            },
            (None, None) => continue,
        };
        if !seen.insert(key) {
            out.push(Diagnostic::new(Category::DuplicateCaseLabel, "Duplicate case", label.span));
        }
    }
}

fn null_combinations(info: &SwitchInfo, out: &mut Vec<Diagnostic>) {
    for label in &info.labels {
        let with_null = info
            .labels
            .iter()
            .any(|l| l.label_group == label.label_group && matches!(l.kind, LabelKind::Null));
        if !with_null {
            continue;
        }
        let offending = match label.kind {
            LabelKind::RecordPattern { .. } => true,
            LabelKind::TypePattern { .. } => label.guard.is_some(),
            _ => false,
        };
        if offending {
            out.push(Diagnostic::new(
                Category::NullWithNonTypePatternNotAllowed,
                "A null case label and patterns can co-exist only if the pattern is a type pattern",
                label.span,
            ));
        }
    }
}

/// No guard, or a guard that is the constant `true`
fn is_unguarded(label: &LabelInfo) -> bool {
    label.guard.as_ref().map_or(true, |g| g.constant == Some(true))
}

/// Unguarded type pattern matching every value of the selector
fn is_total(label: &LabelInfo, selector: &Type, index: &dyn ClassPath) -> bool {
    match &label.kind {
        LabelKind::TypePattern { ty } if is_unguarded(label) => {
            is_subtype(index, &selector.boxed().erasure(), &ty.erasure()) == Some(true)
        }
        _ => false,
    }
}

fn dominance(info: &SwitchInfo, index: &dyn ClassPath, out: &mut Vec<Diagnostic>) {
    for (j, later) in info.labels.iter().enumerate() {
        let earlier = &info.labels[..j];
        let dominated = match &later.kind {
            LabelKind::Default => false,
            LabelKind::Null => earlier.iter().any(|e| is_total(e, &info.selector, index)),
            LabelKind::Constant { ty, .. } => earlier.iter().any(|e| match &e.kind {
                LabelKind::TypePattern { ty: p } if is_unguarded(e) => {
                    is_subtype(index, &ty.boxed().erasure(), &p.erasure()) == Some(true)
                }
                _ => false,
            }),
            LabelKind::TypePattern { ty } | LabelKind::RecordPattern { ty } => earlier.iter().any(|e| match &e.kind {
                LabelKind::Default => e.label_group != later.label_group,
                LabelKind::TypePattern { ty: p } if is_unguarded(e) => {
                    is_subtype(index, &ty.erasure(), &p.erasure()) == Some(true)
                }
                _ => false,
            }),
        };
        if dominated {
            out.push(Diagnostic::new(
                Category::DominatedCaseLabel,
                "This case label is dominated by one of the preceding case label",
                later.span,
            ));
        }
    }
}

fn default_with_total_pattern(info: &SwitchInfo, index: &dyn ClassPath, out: &mut Vec<Diagnostic>) {
    let default = info.labels.iter().position(|l| matches!(l.kind, LabelKind::Default));
    let total = info.labels.iter().position(|l| is_total(l, &info.selector, index));
    if let (Some(d), Some(t)) = (default, total) {
        let at = info.labels[d.max(t)].span;
        out.push(Diagnostic::new(
            Category::TotalPatternWithDefault,
            "Switch case cannot have both unconditional pattern and default label",
            at,
        ));
    }
}

fn fall_through(info: &SwitchInfo, out: &mut Vec<Diagnostic>) {
    for label in &info.labels {
        if label.kind.pattern_type().is_none() {
            continue;
        }
        let case = &info.cases[label.case_index];
        if case.arrow {
            continue;
        }
        let stacked = label.position_in_case > 0;
        let from_previous = label.position_in_case == 0
            && label.case_index > 0
            && info.cases[label.case_index - 1].completes_normally;
        if stacked || from_previous {
            out.push(Diagnostic::new(
                Category::IllegalFallThroughToPattern,
                "Illegal fall-through to a pattern",
                label.span,
            ));
        }
    }
}

fn guards(info: &SwitchInfo, out: &mut Vec<Diagnostic>) {
    let mut reported = HashSet::new();
    for guard in info.labels.iter().filter_map(|l| l.guard) {
        if guard.constant == Some(false) && reported.insert(guard.span.start.offset) {
            out.push(Diagnostic::new(
                Category::FalseConstantGuard,
                "A case label guard cannot have a constant expression with value as 'false'",
                guard.span,
            ));
        }
    }
}

fn arm_completion(info: &SwitchInfo, out: &mut Vec<Diagnostic>) {
    if !info.is_expression {
        return;
    }
    let last = info.cases.len().checked_sub(1);
    for (i, case) in info.cases.iter().enumerate() {
        let offending = if case.arrow {
            case.block_body && case.completes_normally
        } else {
            Some(i) == last && case.completes_normally
        };
        if offending {
            out.push(Diagnostic::new(
                Category::SwitchArmCompletesNormally,
                "A switch labeled block in a switch expression should not complete normally",
                case.span,
            ));
        }
    }
}

/// Selector types a pre-pattern switch accepts
fn is_legacy_selector(selector: &Type, index: &dyn ClassPath) -> bool {
    match selector {
        Type::Primitive(p) => p.is_integral(),
        Type::Class { name, .. } => {
            matches!(
                name.as_str(),
                "java.lang.String" | "java.lang.Integer" | "java.lang.Short" | "java.lang.Byte" | "java.lang.Character"
            ) || index.resolve_type(name).map(|d| d.is_enum()).unwrap_or(false)
        }
        _ => true,
    }
}

fn exhaustiveness(info: &SwitchInfo, index: &dyn ClassPath, config: &Config, out: &mut Vec<Diagnostic>) {
    let has_default = info.labels.iter().any(|l| matches!(l.kind, LabelKind::Default));
    let enhanced = info.labels.iter().any(|l| l.kind.pattern_type().is_some() || matches!(l.kind, LabelKind::Null))
        || (config.allows(Feature::SwitchPatterns) && !is_legacy_selector(&info.selector, index));
    if has_default {
        return;
    }
    let exhaustive = is_exhaustive(info, index);
    if info.is_expression {
        if exhaustive != Some(true) && exhaustive.is_some() {
            let structured = info
                .selector
                .class_name()
                .and_then(|n| index.resolve_type(n))
                .map(|d| d.is_enum() || d.is_sealed)
                .unwrap_or(false);
            let message = if structured {
                "A Switch expression should cover all possible values"
            } else {
                "A switch expression should have a default case"
            };
            out.push(Diagnostic::new(Category::SwitchExpressionMustHaveDefault, message, info.keyword_span));
        }
    } else if enhanced {
        if exhaustive == Some(false) {
            out.push(Diagnostic::new(
                Category::EnhancedSwitchMustBeExhaustive,
                "An enhanced switch statement should be exhaustive; a default label expected",
                info.keyword_span,
            ));
        }
    } else if exhaustive != Some(true) || !is_enum_selector(&info.selector, index) {
        out.push(Diagnostic::new(
            Category::MissingDefaultCase,
            "The switch statement should have a default case",
            info.keyword_span,
        ));
    }
}

fn is_enum_selector(selector: &Type, index: &dyn ClassPath) -> bool {
    selector.class_name().and_then(|n| index.resolve_type(n)).map(|d| d.is_enum()).unwrap_or(false)
}

/// Whether the labels cover every selector value; `None` when the selector
/// is not known well enough to say
fn is_exhaustive(info: &SwitchInfo, index: &dyn ClassPath) -> Option<bool> {
    if info.selector.is_indeterminate() {
        return None;
    }
    let patterns: Vec<Type> = info
        .labels
        .iter()
        .filter(|l| is_unguarded(l))
        .filter_map(|l| l.kind.pattern_type().map(Type::erasure))
        .collect();
    let constants: HashSet<(String, String)> = info
        .labels
        .iter()
        .filter_map(|l| match &l.kind {
            LabelKind::Constant { enum_constant: Some(c), .. } => Some(c.clone()),
            _ => None,
        })
        .collect();
    match &info.selector {
        Type::Class { name, .. } => {
            if index.resolve_type(name).is_none() {
                return None;
            }
            let mut steps = 0;
            Some(covers(index, name, &patterns, &constants, &mut steps))
        }
        other => Some(
            patterns
                .iter()
                .any(|p| is_subtype(index, &other.boxed().erasure(), p) == Some(true)),
        ),
    }
}

fn covers(
    index: &dyn ClassPath,
    key: &str,
    patterns: &[Type],
    constants: &HashSet<(String, String)>,
    steps: &mut usize,
) -> bool {
    *steps += 1;
    if *steps > HIERARCHY_MAX_STEPS {
        return false;
    }
    let ty = Type::class(key);
    if patterns.iter().any(|p| is_subtype(index, &ty, p) == Some(true)) {
        return true;
    }
    let Some(desc) = index.resolve_type(key) else { return false };
    if desc.is_enum() && !desc.enum_constants.is_empty() {
        return desc.enum_constants.iter().all(|c| constants.contains(&(key.to_string(), c.clone())));
    }
    if desc.is_sealed && !desc.permits.is_empty() && (desc.is_abstract || desc.is_interface()) {
        return desc.permits.iter().all(|p| covers(index, p, patterns, constants, steps));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wash::classpath::JdkClassPath;

    fn span(offset: usize) -> Span {
        let mut s = Span::default();
        s.start.offset = offset;
        s
    }

    fn label(kind: LabelKind, case_index: usize, group: usize) -> LabelInfo {
        LabelInfo { kind, span: span(group * 10), case_index, label_group: group, position_in_case: 0, guard: None }
    }

    fn arrow_case() -> CaseInfo {
        CaseInfo { arrow: true, completes_normally: false, block_body: false, span: Span::default() }
    }

    fn messages(info: &SwitchInfo) -> Vec<String> {
        check_switch(info, &JdkClassPath::new(), &Config::default()).into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn pattern_after_supertype_is_dominated() {
        let info = SwitchInfo {
            is_expression: false,
            selector: Type::object(),
            keyword_span: Span::default(),
            labels: vec![
                label(LabelKind::TypePattern { ty: Type::class("java.lang.CharSequence") }, 0, 0),
                label(LabelKind::TypePattern { ty: Type::string() }, 1, 1),
                label(LabelKind::Default, 2, 2),
            ],
            cases: vec![arrow_case(), arrow_case(), arrow_case()],
        };
        assert_eq!(messages(&info), vec!["This case label is dominated by one of the preceding case label"]);
    }

    #[test]
    fn duplicate_int_constants() {
        let constant = |v| LabelKind::Constant { ty: Type::int(), value: Some(ConstValue::Int(v)), enum_constant: None };
        let info = SwitchInfo {
            is_expression: true,
            selector: Type::int(),
            keyword_span: Span::default(),
            labels: vec![label(constant(1), 0, 0), label(constant(1), 1, 1), label(LabelKind::Default, 2, 2)],
            cases: vec![arrow_case(), arrow_case(), arrow_case()],
        };
        assert_eq!(messages(&info), vec!["Duplicate case"]);
    }

    #[test]
    fn expression_without_default() {
        let info = SwitchInfo {
            is_expression: true,
            selector: Type::int(),
            keyword_span: span(3),
            labels: vec![label(
                LabelKind::Constant { ty: Type::int(), value: Some(ConstValue::Int(1)), enum_constant: None },
                0,
                0,
            )],
            cases: vec![arrow_case()],
        };
        let diags = check_switch(&info, &JdkClassPath::new(), &Config::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "A switch expression should have a default case");
        assert_eq!(diags[0].span.start.offset, 3);
    }

    #[test]
    fn total_pattern_with_default() {
        let info = SwitchInfo {
            is_expression: false,
            selector: Type::object(),
            keyword_span: Span::default(),
            labels: vec![label(LabelKind::TypePattern { ty: Type::object() }, 0, 0), label(LabelKind::Default, 1, 1)],
            cases: vec![arrow_case(), arrow_case()],
        };
        assert_eq!(messages(&info), vec!["Switch case cannot have both unconditional pattern and default label"]);
    }

    #[test]
    fn fall_through_into_pattern() {
        let mut falls = arrow_case();
        falls.arrow = false;
        falls.completes_normally = true;
        let mut second = falls.clone();
        second.completes_normally = false;
        let info = SwitchInfo {
            is_expression: false,
            selector: Type::object(),
            keyword_span: Span::default(),
            labels: vec![
                label(LabelKind::TypePattern { ty: Type::string() }, 0, 0),
                label(LabelKind::TypePattern { ty: Type::object() }, 1, 1),
            ],
            cases: vec![falls, second],
        };
        assert_eq!(messages(&info), vec!["Illegal fall-through to a pattern"]);
    }
}
