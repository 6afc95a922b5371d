// Global safety caps to prevent pathological or infinite loops

// Parser: maximum iterations for any guarded loop
pub const PARSER_MAX_LOOP_ITERS: usize = 200_000;
// Parser: maximum nesting of expressions, statements, types and patterns.
// Checker passes recurse over the tree, so this also bounds them.
pub const PARSER_MAX_DEPTH: usize = 256;
// Parser: default cap on syntax diagnostics per file
pub const PARSER_MAX_ERRORS: usize = 100;

// Type hierarchy walks (supertypes, sealed permits)
pub const HIERARCHY_MAX_STEPS: usize = 10_000;

// Well-known simple names implicitly imported from java.lang
pub const JAVA_LANG_SIMPLE_TYPES: &[&str] = &[
    "Object", "String", "Class", "Enum", "Record", "Number", "Integer", "Long", "Short", "Byte",
    "Character", "Boolean", "Float", "Double", "Void", "CharSequence", "Comparable", "Cloneable",
    "Runnable", "Iterable", "AutoCloseable", "Throwable", "Exception", "RuntimeException", "Error",
    "IllegalArgumentException", "IllegalStateException", "NullPointerException",
    "UnsupportedOperationException", "MatchException", "System", "Math", "StringBuilder",
    "Override", "Deprecated", "SuppressWarnings", "FunctionalInterface", "SafeVarargs",
];

// Methods of java.lang.Enum that an enum may not override
pub const ENUM_FINAL_METHODS: &[(&str, usize)] = &[
    ("clone", 0),
    ("equals", 1),
    ("hashCode", 0),
    ("compareTo", 1),
    ("name", 0),
    ("ordinal", 0),
    ("getDeclaringClass", 0),
];
