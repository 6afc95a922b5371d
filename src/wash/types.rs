//! Semantic types and the conversions between them
//!
//! Class types are identified by their index key: the dotted package name
//! followed by the `$`-separated nesting path (`java.util.Map$Entry`). Types the
//! front end cannot see into are represented by `Type::Unknown`, and every rule
//! that consumes types treats `Unknown` as compatible with everything so that a
//! missing declaration never cascades into secondary errors.

use std::collections::HashMap;
use std::fmt;

use super::classpath::ClassPath;
use crate::consts::HIERARCHY_MAX_STEPS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => PrimitiveKind::Boolean,
            "byte" => PrimitiveKind::Byte,
            "short" => PrimitiveKind::Short,
            "char" => PrimitiveKind::Char,
            "int" => PrimitiveKind::Int,
            "long" => PrimitiveKind::Long,
            "float" => PrimitiveKind::Float,
            "double" => PrimitiveKind::Double,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Index key of the wrapper class
    pub fn box_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Char => "java.lang.Character",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
        }
    }

    pub fn unbox(class_name: &str) -> Option<Self> {
        Some(match class_name {
            "java.lang.Boolean" => PrimitiveKind::Boolean,
            "java.lang.Byte" => PrimitiveKind::Byte,
            "java.lang.Short" => PrimitiveKind::Short,
            "java.lang.Character" => PrimitiveKind::Char,
            "java.lang.Integer" => PrimitiveKind::Int,
            "java.lang.Long" => PrimitiveKind::Long,
            "java.lang.Float" => PrimitiveKind::Float,
            "java.lang.Double" => PrimitiveKind::Double,
            _ => return None,
        })
    }

    pub fn is_numeric(self) -> bool {
        self != PrimitiveKind::Boolean
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Char | PrimitiveKind::Int | PrimitiveKind::Long
        )
    }

    /// Widening primitive conversion (JLS 5.1.2), identity included
    pub fn widens_to(self, target: PrimitiveKind) -> bool {
        use PrimitiveKind::*;
        if self == target {
            return true;
        }
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short => matches!(target, Int | Long | Float | Double),
            Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => matches!(target, Double),
            Double | Boolean => false,
        }
    }

    /// JVM descriptor character
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveKind::Boolean => 'Z',
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Double => 'D',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveKind),
    Void,
    Null,
    Class { name: String, args: Vec<Type> },
    Array(Box<Type>),
    TypeVar(String),
    Wildcard,
    Unknown,
}

impl Type {
    pub fn class(name: impl Into<String>) -> Type {
        Type::Class { name: name.into(), args: Vec::new() }
    }

    pub fn object() -> Type {
        Type::class("java.lang.Object")
    }

    pub fn string() -> Type {
        Type::class("java.lang.String")
    }

    pub fn int() -> Type {
        Type::Primitive(PrimitiveKind::Int)
    }

    pub fn boolean() -> Type {
        Type::Primitive(PrimitiveKind::Boolean)
    }

    pub fn array_of(element: Type, dims: usize) -> Type {
        (0..dims).fold(element, |t, _| Type::Array(Box::new(t)))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Class { .. } | Type::Array(_) | Type::TypeVar(_) | Type::Null | Type::Wildcard)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::Class { name, .. } if name == "java.lang.String")
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.unboxed(), Some(PrimitiveKind::Boolean))
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn type_args(&self) -> &[Type] {
        match self {
            Type::Class { args, .. } => args,
            _ => &[],
        }
    }

    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array(e) => Some(e),
            _ => None,
        }
    }

    /// Primitive view of a primitive or wrapper type
    pub fn unboxed(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(p) => Some(*p),
            Type::Class { name, .. } => PrimitiveKind::unbox(name),
            _ => None,
        }
    }

    /// Reference view used for boxing and pattern/constant comparisons
    pub fn boxed(&self) -> Type {
        match self {
            Type::Primitive(p) => Type::class(p.box_name()),
            other => other.clone(),
        }
    }

    /// True when any part of the type is unknown or a type variable
    pub fn is_indeterminate(&self) -> bool {
        match self {
            Type::Unknown | Type::TypeVar(_) | Type::Wildcard => true,
            Type::Class { args, .. } => args.iter().any(Type::is_indeterminate),
            Type::Array(e) => e.is_indeterminate(),
            _ => false,
        }
    }

    pub fn mentions_type_var(&self) -> bool {
        match self {
            Type::TypeVar(_) => true,
            Type::Class { args, .. } => args.iter().any(Type::mentions_type_var),
            Type::Array(e) => e.mentions_type_var(),
            _ => false,
        }
    }

    /// Replace type variables using `map`; unmapped variables are kept
    pub fn subst(&self, map: &HashMap<String, Type>) -> Type {
        if map.is_empty() {
            return self.clone();
        }
        match self {
            Type::TypeVar(v) => map.get(v).cloned().unwrap_or_else(|| self.clone()),
            Type::Class { name, args } => {
                Type::Class { name: name.clone(), args: args.iter().map(|a| a.subst(map)).collect() }
            }
            Type::Array(e) => Type::Array(Box::new(e.subst(map))),
            other => other.clone(),
        }
    }

    /// Erasure with every type variable replaced by `Object`
    pub fn erasure(&self) -> Type {
        match self {
            Type::TypeVar(_) | Type::Wildcard => Type::object(),
            Type::Class { name, .. } => Type::class(name.clone()),
            Type::Array(e) => Type::Array(Box::new(e.erasure())),
            other => other.clone(),
        }
    }

    /// Simple display name of a class key (`java.util.Map$Entry` → `Map.Entry`)
    /// Local classes (`Outer$1Local`) display as `Local`; anonymous classes
    /// display as their enclosing type.
    pub fn simple_name_of(key: &str) -> String {
        let tail = key.rsplit('.').next().unwrap_or(key);
        let mut parts: Vec<&str> = Vec::new();
        for seg in tail.split('$').filter(|s| !s.is_empty()) {
            let named = seg.trim_start_matches(|c: char| c.is_ascii_digit());
            if named.len() == seg.len() {
                parts.push(seg);
            } else if !named.is_empty() {
                parts = vec![named];
            }
        }
        parts.join(".")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => f.write_str(p.name()),
            Type::Void => f.write_str("void"),
            Type::Null => f.write_str("null"),
            Type::Class { name, args } => {
                write!(f, "{}", Type::simple_name_of(name))?;
                if !args.is_empty() {
                    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                    write!(f, "<{}>", args.join(","))?;
                }
                Ok(())
            }
            Type::Array(e) => write!(f, "{}[]", e),
            Type::TypeVar(v) => f.write_str(v),
            Type::Wildcard => f.write_str("?"),
            Type::Unknown => f.write_str("<unknown>"),
        }
    }
}

/// Render an argument/parameter list the way messages print it: `int, String`
pub fn type_list(types: &[Type]) -> String {
    types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}

/// Direct supertypes of a class key with `args` substituted into them.
/// Returns `None` when the key is not in the index.
pub fn direct_supertypes(index: &dyn ClassPath, key: &str, args: &[Type]) -> Option<Vec<Type>> {
    let desc = index.resolve_type(key)?;
    let map: HashMap<String, Type> = desc.type_params.iter().cloned().zip(args.iter().cloned()).collect();
    let mut out = Vec::new();
    if let Some(sup) = &desc.superclass {
        out.push(sup.subst(&map));
    }
    out.extend(desc.interfaces.iter().map(|i| i.subst(&map)));
    if out.is_empty() && key != "java.lang.Object" {
        out.push(Type::object());
    }
    Some(out)
}

/// Whether class `sub` is `sup` or one of its subtypes; `None` when the walk
/// hits a type the index does not know
pub fn is_subclass(index: &dyn ClassPath, sub: &str, sup: &str) -> Option<bool> {
    if sub == sup || sup == "java.lang.Object" {
        return Some(true);
    }
    let mut queue = vec![sub.to_string()];
    let mut seen = std::collections::HashSet::new();
    let mut complete = true;
    let mut steps = 0;
    while let Some(key) = queue.pop() {
        steps += 1;
        if steps > HIERARCHY_MAX_STEPS {
            return None;
        }
        if !seen.insert(key.clone()) {
            continue;
        }
        match direct_supertypes(index, &key, &[]) {
            Some(supers) => {
                for s in supers {
                    if let Some(name) = s.class_name() {
                        if name == sup {
                            return Some(true);
                        }
                        queue.push(name.to_string());
                    }
                }
            }
            None => complete = false,
        }
    }
    if complete {
        Some(false)
    } else {
        None
    }
}

/// Whether every supertype of `key` is known to the index
pub fn hierarchy_complete(index: &dyn ClassPath, key: &str) -> bool {
    is_subclass(index, key, "\u{0}").is_some()
}

/// Find `target` among the supertypes of `ty` (itself included) and return it
/// with the type arguments seen through the hierarchy
pub fn as_super(index: &dyn ClassPath, ty: &Type, target: &str) -> Option<Type> {
    let mut queue = vec![ty.clone()];
    let mut steps = 0;
    while let Some(t) = queue.pop() {
        steps += 1;
        if steps > HIERARCHY_MAX_STEPS {
            return None;
        }
        let Type::Class { name, args } = &t else { continue };
        if name == target {
            return Some(t.clone());
        }
        if let Some(supers) = direct_supertypes(index, name, args) {
            queue.extend(supers);
        }
    }
    None
}

/// Subtyping between reference or primitive types without boxing (JLS 4.10);
/// `None` when the answer depends on something unknown
pub fn is_subtype(index: &dyn ClassPath, from: &Type, to: &Type) -> Option<bool> {
    match (from, to) {
        (Type::Unknown, _) | (_, Type::Unknown) => None,
        (_, Type::TypeVar(_)) | (Type::TypeVar(_), _) | (_, Type::Wildcard) | (Type::Wildcard, _) => None,
        (Type::Primitive(a), Type::Primitive(b)) => Some(a.widens_to(*b)),
        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => Some(false),
        (Type::Void, _) | (_, Type::Void) => Some(false),
        (Type::Null, _) => Some(true),
        (_, Type::Null) => Some(false),
        (Type::Array(_), Type::Class { name, .. }) => Some(matches!(
            name.as_str(),
            "java.lang.Object" | "java.lang.Cloneable" | "java.io.Serializable"
        )),
        (Type::Array(a), Type::Array(b)) => match (a.as_ref(), b.as_ref()) {
            (Type::Primitive(x), Type::Primitive(y)) => Some(x == y),
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => Some(false),
            (a, b) => is_subtype(index, a, b),
        },
        (Type::Class { .. }, Type::Array(_)) => Some(false),
        (Type::Class { name: a, .. }, Type::Class { name: b, .. }) => is_subclass(index, a, b),
    }
}

/// Assignment conversion (JLS 5.2) minus constant narrowing; `None` means the
/// checker cannot decide and must stay silent
pub fn is_assignable(index: &dyn ClassPath, from: &Type, to: &Type) -> Option<bool> {
    if from.is_indeterminate() || to.is_indeterminate() {
        return None;
    }
    match (from, to) {
        (Type::Primitive(a), Type::Primitive(b)) => Some(a.widens_to(*b)),
        (Type::Primitive(p), Type::Class { .. }) => {
            is_subtype(index, &Type::class(p.box_name()), to)
        }
        (Type::Class { name, .. }, Type::Primitive(b)) => match PrimitiveKind::unbox(name) {
            Some(a) => Some(a.widens_to(*b)),
            None if name == "java.lang.Object" || name == "java.lang.Number" => Some(false),
            None => index.resolve_type(name).map(|_| false),
        },
        _ => is_subtype(index, from, to),
    }
}

/// Binary numeric promotion (JLS 5.6.2)
pub fn promote(a: PrimitiveKind, b: PrimitiveKind) -> PrimitiveKind {
    use PrimitiveKind::*;
    if a == Double || b == Double {
        Double
    } else if a == Float || b == Float {
        Float
    } else if a == Long || b == Long {
        Long
    } else {
        Int
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_is_one_directional() {
        assert!(PrimitiveKind::Int.widens_to(PrimitiveKind::Long));
        assert!(PrimitiveKind::Char.widens_to(PrimitiveKind::Int));
        assert!(!PrimitiveKind::Long.widens_to(PrimitiveKind::Int));
        assert!(!PrimitiveKind::Short.widens_to(PrimitiveKind::Char));
        assert!(!PrimitiveKind::Boolean.widens_to(PrimitiveKind::Int));
    }

    #[test]
    fn display_uses_simple_names() {
        let t = Type::Class {
            name: "java.util.Map$Entry".into(),
            args: vec![Type::string(), Type::Array(Box::new(Type::int()))],
        };
        assert_eq!(t.to_string(), "Map.Entry<String,int[]>");
        assert_eq!(Type::simple_name_of("p.E$1"), "E");
        assert_eq!(type_list(&[Type::int(), Type::string()]), "int, String");
    }

    #[test]
    fn substitution_and_erasure() {
        let list = Type::Class { name: "java.util.List".into(), args: vec![Type::TypeVar("E".into())] };
        let mut map = HashMap::new();
        map.insert("E".to_string(), Type::string());
        assert_eq!(list.subst(&map).to_string(), "List<String>");
        assert_eq!(Type::TypeVar("T".into()).erasure(), Type::object());
        assert!(list.mentions_type_var());
    }

    #[test]
    fn promotion() {
        assert_eq!(promote(PrimitiveKind::Byte, PrimitiveKind::Short), PrimitiveKind::Int);
        assert_eq!(promote(PrimitiveKind::Int, PrimitiveKind::Float), PrimitiveKind::Float);
    }
}
