//! Structured diagnostics
//!
//! Every phase reports problems by appending `Diagnostic`s to a
//! `DiagnosticLog`. When a pass is complete the log is frozen into an immutable,
//! position-sorted `Diagnostics` list with the configured severity overrides
//! applied. Rendering into the canonical text block lives in `render`.

mod render;

pub use render::{render, render_one, SourceMap};

use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::error::Error;
use crate::parser::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

macro_rules! categories {
    ($($name:ident => $default:expr),* $(,)?) => {
        /// Stable problem-category tag of a diagnostic
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Category {
            $($name),*
        }

        impl Category {
            pub const ALL: &'static [Category] = &[$(Category::$name),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(Category::$name => stringify!($name)),*
                }
            }

            /// Severity used when no override is configured; `None` means ignored
            pub fn default_severity(self) -> Option<Severity> {
                match self {
                    $(Category::$name => $default),*
                }
            }
        }
    };
}

const E: Option<Severity> = Some(Severity::Error);
const W: Option<Severity> = Some(Severity::Warning);
const IGNORE: Option<Severity> = None;

categories! {
    SyntaxError => E,
    UnterminatedLiteral => E,
    FeatureNotAvailable => E,
    ReservedKeywordAsIdentifier => W,
    DuplicateMember => E,
    DuplicateMemberOrAlreadyDefinedImplicitly => E,
    DuplicateLocalVariable => E,
    IllegalModifier => E,
    IllegalModifierForEnumConstant => E,
    UnresolvedName => E,
    UndefinedMethod => E,
    IllegalStaticReferenceInInitializer => E,
    StaticContextViolation => E,
    ForwardReference => E,
    FinalFieldAssignment => E,
    FinalLocalAssignment => E,
    DominatedCaseLabel => E,
    DuplicateCaseLabel => E,
    DuplicateDefaultCase => E,
    IllegalDefaultPlacement => E,
    MultiplePatternsInLabel => E,
    MixedPatternAndConstantLabels => E,
    TotalPatternWithDefault => E,
    MissingDefaultCase => W,
    SwitchExpressionMustHaveDefault => E,
    EnhancedSwitchMustBeExhaustive => E,
    IllegalFallThroughToPattern => E,
    NullWithNonTypePatternNotAllowed => E,
    GuardRequiresEffectivelyFinalVariable => E,
    FalseConstantGuard => E,
    SwitchArmCompletesNormally => E,
    CapturedVariableNotEffectivelyFinal => E,
    CannotOverrideFinalMethod => E,
    MissingOverrideAnnotation => IGNORE,
    MustImplementAbstractMethod => E,
    AbstractMethodInEnumWithoutBodies => E,
    CannotInstantiate => E,
    IllegalEnumSuperCall => E,
    IllegalStaticMemberInInnerType => E,
    AmbiguousMethod => E,
    InapplicableMethod => E,
    TypeMismatch => E,
    RawTypeUsage => W,
    UncheckedRawInvocation => W,
    DeprecatedUsage => W,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownCategory { name: s.to_string() })
    }
}

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    pub span: Span,
    /// Nominal file name used when rendering (`X.java`)
    pub file: String,
}

impl Diagnostic {
    /// Create a diagnostic with the category's default severity (error when the
    /// category is ignored by default; overrides are applied later)
    pub fn new(category: Category, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: category.default_severity().unwrap_or(Severity::Warning),
            category,
            message: message.into(),
            span,
            file: String::new(),
        }
    }

    pub fn error(category: Category, message: impl Into<String>, span: Span) -> Self {
        Self::new(category, message, span).with_severity(Severity::Error)
    }

    pub fn warning(category: Category, message: impl Into<String>, span: Span) -> Self {
        Self::new(category, message, span).with_severity(Severity::Warning)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{} [{}] {}", self.severity, self.file, self.span.start, self.category, self.message)
    }
}

/// Append-only collection of diagnostics for one pass
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    file: String,
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into(), entries: Vec::new() }
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        let diagnostic = if diagnostic.file.is_empty() {
            diagnostic.with_file(self.file.clone())
        } else {
            diagnostic
        };
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for d in diagnostics {
            self.record(d);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply severity overrides, drop ignored categories and sort by position
    pub fn finish(self, config: &Config) -> Diagnostics {
        let mut items: Vec<Diagnostic> = self
            .entries
            .into_iter()
            .filter_map(|d| {
                let explicit = config.severity_overrides.get(&d.category);
                match explicit {
                    Some(o) => o.apply().map(|s| d.with_severity(s)),
                    None if d.category.default_severity().is_none() => None,
                    None => Some(d),
                }
            })
            .collect();
        // stable: equal positions keep discovery order
        items.sort_by(|a, b| {
            (a.file.as_str(), a.span.start.line, a.span.start.column)
                .cmp(&(b.file.as_str(), b.span.start.line, b.span.start.column))
        });
        Diagnostics { items }
    }
}

/// Immutable, ordered result of a completed pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn with_category(&self, category: Category) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.category == category)
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn render(&self, sources: &SourceMap) -> String {
        render(self, sources)
    }

    /// Merge the lists of several units, keeping file/line/column order
    pub fn merge(lists: impl IntoIterator<Item = Diagnostics>) -> Diagnostics {
        let mut items: Vec<Diagnostic> = lists.into_iter().flat_map(|l| l.items).collect();
        items.sort_by(|a, b| {
            (a.file.as_str(), a.span.start.line, a.span.start.column)
                .cmp(&(b.file.as_str(), b.span.start.line, b.span.start.column))
        });
        Diagnostics { items }
    }

    /// "N problems (E errors, W warnings)" summary line
    pub fn summary(&self) -> String {
        let errors = self.errors().count();
        let warnings = self.warnings().count();
        let infos = self.len() - errors - warnings;
        let plural = |n: usize, word: &str| format!("{} {}{}", n, word, if n == 1 { "" } else { "s" });
        let mut parts = Vec::new();
        if errors > 0 {
            parts.push(plural(errors, "error"));
        }
        if warnings > 0 {
            parts.push(plural(warnings, "warning"));
        }
        if infos > 0 {
            parts.push(plural(infos, "info"));
        }
        format!("{} ({})", plural(self.len(), "problem"), parts.join(", "))
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeverityOverride;
    use crate::parser::Location;

    fn at(line: usize, column: usize) -> Span {
        let loc = Location::new(line, column, 0);
        Span::new(loc, loc)
    }

    #[test]
    fn finish_sorts_by_position() {
        let mut log = DiagnosticLog::new("X.java");
        log.record(Diagnostic::new(Category::UnresolvedName, "b", at(5, 2)));
        log.record(Diagnostic::new(Category::UnresolvedName, "a", at(2, 9)));
        log.record(Diagnostic::new(Category::UnresolvedName, "c", at(2, 3)));
        let list = log.finish(&Config::default());
        let messages: Vec<&str> = list.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["c", "a", "b"]);
        assert!(list.iter().all(|d| d.file == "X.java"));
    }

    #[test]
    fn overrides_promote_demote_and_ignore() {
        let config = Config::default()
            .with_override(Category::MissingDefaultCase, SeverityOverride::Error)
            .with_override(Category::TypeMismatch, SeverityOverride::Ignore)
            .with_override(Category::MissingOverrideAnnotation, SeverityOverride::Warning);
        let mut log = DiagnosticLog::new("X.java");
        log.record(Diagnostic::new(Category::MissingDefaultCase, "m", at(1, 1)));
        log.record(Diagnostic::new(Category::TypeMismatch, "t", at(1, 2)));
        log.record(Diagnostic::new(Category::MissingOverrideAnnotation, "o", at(1, 3)));
        let list = log.finish(&config);
        assert_eq!(list.len(), 2);
        assert_eq!(list.as_slice()[0].severity, Severity::Error);
        assert_eq!(list.as_slice()[1].severity, Severity::Warning);
    }

    #[test]
    fn ignored_by_default_categories_are_dropped() {
        let mut log = DiagnosticLog::new("X.java");
        log.record(Diagnostic::new(Category::MissingOverrideAnnotation, "o", at(1, 3)));
        assert!(log.finish(&Config::default()).is_empty());
    }

    #[test]
    fn category_names_round_trip_through_from_str() {
        assert_eq!("DominatedCaseLabel".parse::<Category>().unwrap(), Category::DominatedCaseLabel);
        assert_eq!("missingdefaultcase".parse::<Category>().unwrap(), Category::MissingDefaultCase);
        assert!("NoSuchThing".parse::<Category>().is_err());
    }

    #[test]
    fn summary_counts() {
        let mut log = DiagnosticLog::new("X.java");
        log.record(Diagnostic::new(Category::UnresolvedName, "a", at(1, 1)));
        log.record(Diagnostic::new(Category::RawTypeUsage, "b", at(2, 1)));
        log.record(Diagnostic::new(Category::RawTypeUsage, "c", at(3, 1)));
        let list = log.finish(&Config::default());
        assert_eq!(list.summary(), "3 problems (1 error, 2 warnings)");
    }
}
