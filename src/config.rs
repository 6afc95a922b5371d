//! Compilation configuration
//!
//! `Config` is immutable once built and is threaded explicitly through every
//! phase of the pipeline. It carries the source level, which gates grammar and
//! semantic features, and the per-category severity overrides applied when a
//! diagnostic log is finished.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::diagnostics::{Category, Severity};
use crate::error::Error;

/// Source level of the compilation, one variant per Java feature release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LanguageLevel {
    V1_3,
    V1_4,
    V1_5,
    V1_6,
    V1_7,
    V1_8,
    V9,
    V10,
    V11,
    V12,
    V13,
    V14,
    V15,
    V16,
    V17,
    V18,
    V19,
    V20,
    V21,
}

impl LanguageLevel {
    pub const ALL: &'static [LanguageLevel] = &[
        LanguageLevel::V1_3,
        LanguageLevel::V1_4,
        LanguageLevel::V1_5,
        LanguageLevel::V1_6,
        LanguageLevel::V1_7,
        LanguageLevel::V1_8,
        LanguageLevel::V9,
        LanguageLevel::V10,
        LanguageLevel::V11,
        LanguageLevel::V12,
        LanguageLevel::V13,
        LanguageLevel::V14,
        LanguageLevel::V15,
        LanguageLevel::V16,
        LanguageLevel::V17,
        LanguageLevel::V18,
        LanguageLevel::V19,
        LanguageLevel::V20,
        LanguageLevel::V21,
    ];

    pub const LATEST: LanguageLevel = LanguageLevel::V21;

    /// Feature release number; the 1.x levels map to their minor number.
    pub fn major(self) -> u16 {
        match self {
            LanguageLevel::V1_3 => 3,
            LanguageLevel::V1_4 => 4,
            LanguageLevel::V1_5 => 5,
            LanguageLevel::V1_6 => 6,
            LanguageLevel::V1_7 => 7,
            LanguageLevel::V1_8 => 8,
            LanguageLevel::V9 => 9,
            LanguageLevel::V10 => 10,
            LanguageLevel::V11 => 11,
            LanguageLevel::V12 => 12,
            LanguageLevel::V13 => 13,
            LanguageLevel::V14 => 14,
            LanguageLevel::V15 => 15,
            LanguageLevel::V16 => 16,
            LanguageLevel::V17 => 17,
            LanguageLevel::V18 => 18,
            LanguageLevel::V19 => 19,
            LanguageLevel::V20 => 20,
            LanguageLevel::V21 => 21,
        }
    }

    pub fn allows(self, feature: Feature) -> bool {
        self >= feature.introduced_in()
    }
}

impl Default for LanguageLevel {
    fn default() -> Self {
        LanguageLevel::LATEST
    }
}

impl fmt::Display for LanguageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let major = self.major();
        if major <= 8 {
            write!(f, "1.{}", major)
        } else {
            write!(f, "{}", major)
        }
    }
}

impl FromStr for LanguageLevel {
    type Err = Error;

    /// Accepts `1.4`, `5`, `1.8`, `8`, `17`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("1.").unwrap_or(trimmed);
        let major: u16 = digits
            .parse()
            .map_err(|_| Error::InvalidLanguageLevel { level: s.to_string() })?;
        LanguageLevel::ALL
            .iter()
            .copied()
            .find(|l| l.major() == major)
            .ok_or_else(|| Error::InvalidLanguageLevel { level: s.to_string() })
    }
}

/// Grammar and semantic features gated by the source level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    AssertKeyword,
    Varargs,
    Generics,
    TypeParameters,
    Enums,
    ForEach,
    StaticImports,
    Annotations,
    OverrideOnInterfaceMethods,
    Lambdas,
    UnderscoreKeyword,
    VarLocalInference,
    SwitchExpressions,
    ArrowCases,
    MultiConstantCaseLabels,
    TextBlocks,
    InstanceofPatterns,
    Records,
    StaticMembersInInnerTypes,
    LocalEnumsAndInterfaces,
    SealedTypes,
    SwitchPatterns,
    RecordPatterns,
}

impl Feature {
    pub fn introduced_in(self) -> LanguageLevel {
        use Feature::*;
        match self {
            AssertKeyword => LanguageLevel::V1_4,
            Varargs | Generics | TypeParameters | Enums | ForEach | StaticImports | Annotations => LanguageLevel::V1_5,
            OverrideOnInterfaceMethods => LanguageLevel::V1_6,
            Lambdas => LanguageLevel::V1_8,
            UnderscoreKeyword => LanguageLevel::V9,
            VarLocalInference => LanguageLevel::V10,
            SwitchExpressions | ArrowCases | MultiConstantCaseLabels => LanguageLevel::V14,
            TextBlocks => LanguageLevel::V15,
            InstanceofPatterns | Records | StaticMembersInInnerTypes | LocalEnumsAndInterfaces => {
                LanguageLevel::V16
            }
            SealedTypes => LanguageLevel::V17,
            SwitchPatterns | RecordPatterns => LanguageLevel::V21,
        }
    }

    /// Name used by the "The Java feature '...'" family of messages.
    pub fn display_name(self) -> &'static str {
        use Feature::*;
        match self {
            AssertKeyword => "assert",
            Varargs => "varargs",
            Generics => "parameterized types",
            TypeParameters => "type parameters",
            Enums => "enum declarations",
            ForEach => "'for each' statements",
            StaticImports => "static imports",
            Annotations => "annotations",
            OverrideOnInterfaceMethods => "@Override on interface methods",
            Lambdas => "Lambda expressions",
            UnderscoreKeyword => "'_' keyword",
            VarLocalInference => "'var' local variable type inference",
            SwitchExpressions => "Switch Expressions",
            ArrowCases => "Arrow in case statement",
            MultiConstantCaseLabels => "Multi-constant case labels",
            TextBlocks => "Text Blocks",
            InstanceofPatterns => "Pattern Matching in instanceof Expressions",
            Records => "Records",
            StaticMembersInInnerTypes => "Static members in inner types",
            LocalEnumsAndInterfaces => "Local enums and interfaces",
            SealedTypes => "Sealed Types",
            SwitchPatterns => "Pattern Matching in Switch",
            RecordPatterns => "Record Patterns",
        }
    }

    /// Diagnostic text emitted when the feature is used below its level.
    pub fn unavailable_message(self) -> String {
        use Feature::*;
        let level = self.introduced_in();
        match self {
            Varargs => "Syntax error, varargs are only available if source level is 1.5 or greater".to_string(),
            Generics => {
                "Syntax error, parameterized types are only available if source level is 1.5 or greater".to_string()
            }
            TypeParameters => {
                "Syntax error, type parameters are only available if source level is 1.5 or greater".to_string()
            }
            Enums | ForEach | StaticImports | Annotations => format!(
                "Syntax error, {} are only available if source level is 1.5 or greater",
                self.display_name()
            ),
            Lambdas => "Lambda expressions are allowed only at source level 1.8 or above".to_string(),
            SwitchExpressions => "Switch Expressions are supported from Java 14 onwards only".to_string(),
            ArrowCases | MultiConstantCaseLabels => {
                format!("{} supported from Java 14 onwards only", self.display_name())
            }
            _ => format!(
                "The Java feature '{}' is only available with source level {} and above",
                self.display_name(),
                level
            ),
        }
    }
}

/// Severity override applied to a diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityOverride {
    Error,
    Warning,
    Info,
    Ignore,
}

impl SeverityOverride {
    pub fn apply(self) -> Option<Severity> {
        match self {
            SeverityOverride::Error => Some(Severity::Error),
            SeverityOverride::Warning => Some(Severity::Warning),
            SeverityOverride::Info => Some(Severity::Info),
            SeverityOverride::Ignore => None,
        }
    }
}

/// Compiler configuration shared (read-only) by every pipeline instance
#[derive(Debug, Clone)]
pub struct Config {
    pub language_level: LanguageLevel,
    /// Accept preview language features of the selected level
    pub preview: bool,
    pub severity_overrides: HashMap<Category, SeverityOverride>,
    /// Upper bound on syntax diagnostics collected for a single file
    pub max_parse_errors: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language_level: LanguageLevel::default(),
            preview: false,
            severity_overrides: HashMap::new(),
            max_parse_errors: crate::consts::PARSER_MAX_ERRORS,
        }
    }
}

impl Config {
    pub fn new(language_level: LanguageLevel) -> Self {
        Self { language_level, ..Self::default() }
    }

    pub fn with_override(mut self, category: Category, severity: SeverityOverride) -> Self {
        self.severity_overrides.insert(category, severity);
        self
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_max_parse_errors(mut self, max: usize) -> Self {
        self.max_parse_errors = max.max(1);
        self
    }

    #[inline]
    pub fn allows(&self, feature: Feature) -> bool {
        self.language_level.allows(feature)
    }

    /// Effective severity for a category, `None` when ignored
    pub fn severity_for(&self, category: Category) -> Option<Severity> {
        match self.severity_overrides.get(&category) {
            Some(o) => o.apply(),
            None => category.default_severity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_spellings() {
        assert_eq!("1.4".parse::<LanguageLevel>().unwrap(), LanguageLevel::V1_4);
        assert_eq!("5".parse::<LanguageLevel>().unwrap(), LanguageLevel::V1_5);
        assert_eq!("1.8".parse::<LanguageLevel>().unwrap(), LanguageLevel::V1_8);
        assert_eq!("17".parse::<LanguageLevel>().unwrap(), LanguageLevel::V17);
        assert!("1.2".parse::<LanguageLevel>().is_err());
        assert!("banana".parse::<LanguageLevel>().is_err());
    }

    #[test]
    fn feature_gates_follow_levels() {
        assert!(!LanguageLevel::V1_4.allows(Feature::Varargs));
        assert!(LanguageLevel::V1_5.allows(Feature::Varargs));
        assert!(!LanguageLevel::V17.allows(Feature::SwitchPatterns));
        assert!(LanguageLevel::V21.allows(Feature::RecordPatterns));
        assert_eq!(LanguageLevel::V1_8.to_string(), "1.8");
        assert_eq!(LanguageLevel::V16.to_string(), "16");
    }

    #[test]
    fn feature_messages() {
        assert_eq!(
            Feature::Varargs.unavailable_message(),
            "Syntax error, varargs are only available if source level is 1.5 or greater"
        );
        assert_eq!(
            Feature::MultiConstantCaseLabels.unavailable_message(),
            "Multi-constant case labels supported from Java 14 onwards only"
        );
        assert_eq!(
            Feature::SwitchExpressions.unavailable_message(),
            "Switch Expressions are supported from Java 14 onwards only"
        );
        assert_eq!(
            Feature::SealedTypes.unavailable_message(),
            "The Java feature 'Sealed Types' is only available with source level 17 and above"
        );
    }
}
