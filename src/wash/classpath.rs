//! Type descriptors and the class path abstraction
//!
//! The checker looks every type up through `ClassPath`. Source types are
//! served by the `SourceIndex` built in Enter; platform types by
//! `JdkClassPath`, an embedded signature table parsed once on first use.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::types::{PrimitiveKind, Type};
use crate::ast::TypeKind;
use crate::consts::HIERARCHY_MAX_STEPS;

/// Everything the checker needs to know about one class or interface
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Index key: `pkg.Outer$Inner`
    pub name: String,
    pub kind: TypeKind,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_sealed: bool,
    pub is_static: bool,
    pub is_deprecated: bool,
    /// Local or anonymous class
    pub is_local: bool,
    pub type_params: Vec<String>,
    pub superclass: Option<Type>,
    pub interfaces: Vec<Type>,
    /// Keys of the permitted direct subtypes of a sealed type
    pub permits: Vec<String>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub constructors: Vec<MethodInfo>,
    pub enum_constants: Vec<String>,
    /// Simple names of member types
    pub nested: Vec<String>,
    pub outer: Option<String>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_final: false,
            is_abstract: false,
            is_sealed: false,
            is_static: false,
            is_deprecated: false,
            is_local: false,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            permits: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            enum_constants: Vec::new(),
            nested: Vec::new(),
            outer: None,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn simple_name(&self) -> String {
        Type::simple_name_of(&self.name)
    }

    /// The type as seen from inside its own declaration (`List<E>`)
    pub fn this_type(&self) -> Type {
        Type::Class {
            name: self.name.clone(),
            args: self.type_params.iter().map(|p| Type::TypeVar(p.clone())).collect(),
        }
    }

    /// `List<E>` style display used by raw-type messages
    pub fn generic_display(&self) -> String {
        if self.type_params.is_empty() {
            self.simple_name()
        } else {
            format!("{}<{}>", self.simple_name(), self.type_params.join(","))
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodInfo> {
        self.methods.iter().filter(move |m| m.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
    pub is_final: bool,
    pub is_private: bool,
    /// Constant variable (final, initialized with a constant expression)
    pub is_constant: bool,
    pub is_enum_constant: bool,
    pub is_deprecated: bool,
}

#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub name: String,
    pub params: Vec<Type>,
    pub varargs: bool,
    pub ret: Type,
    pub type_params: Vec<String>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_private: bool,
    pub is_deprecated: bool,
    /// Key of the declaring type
    pub owner: String,
}

impl MethodInfo {
    /// Erased parameter list used to compare signatures
    pub fn erased_params(&self) -> Vec<Type> {
        self.params.iter().map(Type::erasure).collect()
    }

    pub fn same_erasure(&self, other: &MethodInfo) -> bool {
        self.name == other.name && self.erased_params() == other.erased_params()
    }

    /// `m(int, String)` as printed in messages
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, super::types::type_list(&self.params))
    }
}

/// Source of type descriptors
pub trait ClassPath: Send + Sync {
    /// Look a type up by index key (`java.util.Map$Entry`)
    fn resolve_type(&self, qualified_name: &str) -> Option<Arc<TypeDescriptor>>;

    /// Whether any known type lives in `package` or a subpackage of it
    fn has_package(&self, package: &str) -> bool;
}

/// Turn a dotted qualified name into an index key by trying `$` nesting from
/// the right (`java.util.Map.Entry` → `java.util.Map$Entry`)
pub fn find_qualified(index: &dyn ClassPath, dotted: &str) -> Option<String> {
    if index.resolve_type(dotted).is_some() {
        return Some(dotted.to_string());
    }
    let mut key = dotted.to_string();
    let dots: Vec<usize> = dotted.match_indices('.').map(|(i, _)| i).collect();
    for &pos in dots.iter().rev() {
        key.replace_range(pos..pos + 1, "$");
        if index.resolve_type(&key).is_some() {
            return Some(key);
        }
    }
    None
}

/// A field found through the hierarchy, with the owner's type arguments applied
#[derive(Debug, Clone)]
pub struct FoundField {
    pub owner: Arc<TypeDescriptor>,
    pub field: FieldInfo,
    pub ty: Type,
}

/// Walk `ty` and its supertypes breadth first, calling `visit` with each
/// descriptor and the substitution of its type parameters. Stops early when
/// `visit` returns `true`. The result is `false` when part of the hierarchy is
/// unknown.
pub fn walk_hierarchy(
    index: &dyn ClassPath,
    ty: &Type,
    visit: &mut dyn FnMut(&Arc<TypeDescriptor>, &HashMap<String, Type>) -> bool,
) -> bool {
    let mut queue = std::collections::VecDeque::new();
    queue.push_back(ty.clone());
    let mut seen = HashSet::new();
    let mut complete = true;
    let mut steps = 0;
    while let Some(t) = queue.pop_front() {
        steps += 1;
        if steps > HIERARCHY_MAX_STEPS {
            return false;
        }
        let Type::Class { name, args } = &t else { continue };
        if !seen.insert(name.clone()) {
            continue;
        }
        let Some(desc) = index.resolve_type(name) else {
            complete = false;
            continue;
        };
        let raw = args.is_empty() && !desc.type_params.is_empty();
        let map: HashMap<String, Type> = if raw {
            desc.type_params.iter().map(|p| (p.clone(), Type::object())).collect()
        } else {
            desc.type_params.iter().cloned().zip(args.iter().cloned()).collect()
        };
        if visit(&desc, &map) {
            return true;
        }
        if let Some(sup) = &desc.superclass {
            queue.push_back(if raw { sup.erasure() } else { sup.subst(&map) });
        }
        for i in &desc.interfaces {
            queue.push_back(if raw { i.erasure() } else { i.subst(&map) });
        }
        if desc.superclass.is_none() && name != "java.lang.Object" {
            queue.push_back(Type::object());
        }
    }
    complete
}

/// Field `name` declared in or inherited by `ty`
pub fn find_field(index: &dyn ClassPath, ty: &Type, name: &str) -> Option<FoundField> {
    let mut found = None;
    walk_hierarchy(index, ty, &mut |desc, map| match desc.field(name) {
        Some(f) => {
            found = Some(FoundField { owner: desc.clone(), field: f.clone(), ty: f.ty.subst(map) });
            true
        }
        None => false,
    });
    found
}

/// Member type `name` declared in or inherited by the type with key `owner`
pub fn find_member_type(index: &dyn ClassPath, owner: &str, name: &str) -> Option<String> {
    let mut found = None;
    walk_hierarchy(index, &Type::class(owner), &mut |desc, _| {
        if desc.nested.iter().any(|n| n == name) {
            found = Some(format!("{}${}", desc.name, name));
            true
        } else {
            false
        }
    });
    found
}

/// Methods named `name` visible in `ty`: declared ones first, then inherited
/// ones not overridden by an already collected signature. Parameter and return
/// types have the receiver's type arguments substituted.
pub fn find_methods(index: &dyn ClassPath, ty: &Type, name: &str) -> (Vec<MethodInfo>, bool) {
    let mut out: Vec<MethodInfo> = Vec::new();
    let complete = walk_hierarchy(index, ty, &mut |desc, map| {
        for m in desc.methods_named(name) {
            let mut m = m.clone();
            m.params = m.params.iter().map(|p| p.subst(map)).collect();
            m.ret = m.ret.subst(map);
            if !out.iter().any(|o| o.same_erasure(&m)) {
                out.push(m);
            }
        }
        false
    });
    (out, complete)
}

/// All abstract methods of `key`'s hierarchy that no class in it implements
pub fn unimplemented_abstract_methods(index: &dyn ClassPath, key: &str) -> Option<Vec<MethodInfo>> {
    let mut concrete: Vec<MethodInfo> = Vec::new();
    let mut abstracts: Vec<MethodInfo> = Vec::new();
    let complete = walk_hierarchy(index, &Type::class(key), &mut |desc, map| {
        for m in &desc.methods {
            if m.is_static || m.is_private {
                continue;
            }
            let mut m = m.clone();
            m.params = m.params.iter().map(|p| p.subst(map)).collect();
            if m.is_abstract {
                abstracts.push(m);
            } else {
                concrete.push(m);
            }
        }
        false
    });
    if !complete {
        return None;
    }
    // a concrete superclass already implements everything above it
    let mut covered: HashSet<String> = HashSet::new();
    if let Some(desc) = index.resolve_type(key) {
        let mut sup = desc.superclass.clone();
        let mut steps = 0;
        while let Some(Type::Class { name, .. }) = sup {
            steps += 1;
            let Some(d) = index.resolve_type(&name) else { break };
            if !d.is_abstract || steps > HIERARCHY_MAX_STEPS {
                walk_hierarchy(index, &Type::class(name.clone()), &mut |above, _| {
                    covered.insert(above.name.clone());
                    false
                });
                break;
            }
            sup = d.superclass.clone();
        }
    }
    let mut missing: Vec<MethodInfo> = Vec::new();
    for a in abstracts.into_iter().filter(|a| !covered.contains(&a.owner)) {
        let implemented = concrete.iter().any(|c| c.same_erasure(&a) || same_arity_unresolved(c, &a));
        if !implemented && !missing.iter().any(|m| m.same_erasure(&a)) {
            missing.push(a);
        }
    }
    Some(missing)
}

// generic interface methods overridden with concrete argument types
// (`compareTo(T)` by `compareTo(Foo)`) compare equal when parameters differ
// only where the abstract one mentions a type variable
fn same_arity_unresolved(c: &MethodInfo, a: &MethodInfo) -> bool {
    c.name == a.name
        && c.params.len() == a.params.len()
        && c.params.iter().zip(&a.params).all(|(cp, ap)| cp.erasure() == ap.erasure() || ap.mentions_type_var())
}

/// Source index first, then the platform
pub struct CompositeIndex {
    layers: Vec<Arc<dyn ClassPath>>,
}

impl CompositeIndex {
    pub fn new(layers: Vec<Arc<dyn ClassPath>>) -> Self {
        Self { layers }
    }
}

impl ClassPath for CompositeIndex {
    fn resolve_type(&self, qualified_name: &str) -> Option<Arc<TypeDescriptor>> {
        self.layers.iter().find_map(|l| l.resolve_type(qualified_name))
    }

    fn has_package(&self, package: &str) -> bool {
        self.layers.iter().any(|l| l.has_package(package))
    }
}

/// Built-in descriptors for the `java.lang`/`java.util`/`java.io` subset
#[derive(Debug, Clone, Copy, Default)]
pub struct JdkClassPath;

static JDK_INDEX: Lazy<JdkIndex> = Lazy::new(|| JdkIndex::parse(include_str!("jdk.sig")));

struct JdkIndex {
    types: HashMap<String, Arc<TypeDescriptor>>,
    packages: HashSet<String>,
}

impl JdkClassPath {
    pub fn new() -> Self {
        JdkClassPath
    }

    /// Number of platform types known
    pub fn len(&self) -> usize {
        JDK_INDEX.types.len()
    }

    pub fn is_empty(&self) -> bool {
        JDK_INDEX.types.is_empty()
    }
}

impl ClassPath for JdkClassPath {
    fn resolve_type(&self, qualified_name: &str) -> Option<Arc<TypeDescriptor>> {
        JDK_INDEX.types.get(qualified_name).cloned()
    }

    fn has_package(&self, package: &str) -> bool {
        JDK_INDEX.packages.contains(package)
    }
}

/// Every package prefix of a key: `java.util.Map$Entry` → `java`, `java.util`
pub fn package_prefixes(key: &str) -> Vec<String> {
    let package = match key.rfind('.') {
        Some(i) => &key[..i],
        None => return Vec::new(),
    };
    let mut out = Vec::new();
    let mut acc = String::new();
    for seg in package.split('.') {
        if !acc.is_empty() {
            acc.push('.');
        }
        acc.push_str(seg);
        out.push(acc.clone());
    }
    out
}

impl JdkIndex {
    fn parse(text: &str) -> Self {
        let blocks = split_blocks(text);
        let mut simple: HashMap<String, String> = HashMap::new();
        for (header, _) in &blocks {
            if let Some(key) = header_key(header) {
                let tail = key.rsplit('.').next().unwrap_or(&key).replace('$', ".");
                simple.insert(tail, key.clone());
            }
        }
        let mut types = HashMap::new();
        let mut packages = HashSet::new();
        for (header, members) in &blocks {
            let desc = parse_block(header, members, &simple);
            packages.extend(package_prefixes(&desc.name));
            types.insert(desc.name.clone(), desc);
        }
        // member types are registered on their outer descriptor
        let nested: Vec<(String, String)> = types
            .keys()
            .filter_map(|k| k.rsplit_once('$').map(|(o, n)| (o.to_string(), n.to_string())))
            .collect();
        for (outer, name) in nested {
            if let Some(d) = types.get_mut(&outer) {
                d.nested.push(name);
            }
        }
        log::trace!("platform index: {} types", types.len());
        Self { types: types.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(), packages }
    }
}

fn split_blocks(text: &str) -> Vec<(String, Vec<String>)> {
    let mut blocks: Vec<(String, Vec<String>)> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            if let Some((_, members)) = blocks.last_mut() {
                members.push(line.trim().to_string());
            }
        } else {
            blocks.push((line.trim().to_string(), Vec::new()));
        }
    }
    blocks
}

const KIND_WORDS: &[&str] = &["class", "interface", "enum", "record", "annotation"];

fn header_key(header: &str) -> Option<String> {
    let mut words = header.split_whitespace();
    words.find(|w| KIND_WORDS.contains(w))?;
    let name = words.next()?;
    Some(name.split('<').next().unwrap_or(name).to_string())
}

fn parse_block(header: &str, members: &[String], simple: &HashMap<String, String>) -> TypeDescriptor {
    let (before_name, rest) = split_header(header);
    let kind = match before_name.iter().find(|w| KIND_WORDS.contains(&w.as_str())).map(String::as_str) {
        Some("interface") => TypeKind::Interface,
        Some("enum") => TypeKind::Enum,
        Some("record") => TypeKind::Record,
        Some("annotation") => TypeKind::Annotation,
        _ => TypeKind::Class,
    };
    let (name_part, clauses) = take_type_text(rest);
    let (key, type_params) = match name_part.find('<') {
        Some(i) => (
            name_part[..i].to_string(),
            name_part[i + 1..name_part.len() - 1].split(',').map(|s| s.trim().to_string()).collect(),
        ),
        None => (name_part.to_string(), Vec::new()),
    };
    let mut desc = TypeDescriptor::new(key.clone(), kind);
    desc.is_final = before_name.iter().any(|w| w == "final");
    desc.is_abstract = before_name.iter().any(|w| w == "abstract") || desc.is_interface();
    desc.is_sealed = before_name.iter().any(|w| w == "sealed");
    desc.is_deprecated = before_name.iter().any(|w| w == "deprecated");
    desc.is_static = key.contains('$');
    desc.outer = key.rsplit_once('$').map(|(o, _)| o.to_string());
    desc.type_params = type_params;

    let mut clause = "";
    for part in split_clauses(clauses) {
        match part.as_str() {
            "extends" | "implements" => clause = if part == "extends" { "extends" } else { "implements" },
            text => {
                for t in split_top_level(text) {
                    let ty = parse_sig_type(&t, &desc.type_params, simple);
                    if clause == "extends" && kind == TypeKind::Class {
                        desc.superclass = Some(ty);
                    } else {
                        desc.interfaces.push(ty);
                    }
                }
            }
        }
    }
    if desc.superclass.is_none() && kind == TypeKind::Class && key != "java.lang.Object" {
        desc.superclass = Some(Type::object());
    }
    if kind == TypeKind::Annotation {
        desc.interfaces.push(Type::class("java.lang.annotation.Annotation"));
    }

    for line in members {
        parse_member(line, &mut desc, simple);
    }
    desc
}

fn split_header(header: &str) -> (Vec<String>, &str) {
    let mut consumed = 0;
    let mut words = Vec::new();
    for w in header.split_whitespace() {
        let at = header[consumed..].find(w).map(|i| i + consumed).unwrap_or(consumed);
        consumed = at + w.len();
        words.push(w.to_string());
        if KIND_WORDS.contains(&w) {
            break;
        }
    }
    (words, header[consumed..].trim())
}

/// Split the leading type text (which may contain spaces inside `<>`) from the rest
fn take_type_text(s: &str) -> (&str, &str) {
    let s = s.trim();
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            c if c.is_whitespace() && depth == 0 => return (&s[..i], s[i..].trim()),
            _ => {}
        }
    }
    (s, "")
}

fn split_clauses(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    for word in s.split_whitespace() {
        if depth == 0 && (word == "extends" || word == "implements") {
            if !current.trim().is_empty() {
                out.push(current.trim().to_string());
            }
            current.clear();
            out.push(word.to_string());
            continue;
        }
        depth += word.matches('<').count() as i32 - word.matches('>').count() as i32;
        current.push_str(word);
        current.push(' ');
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

/// Split on top-level commas
pub(crate) fn split_top_level(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                out.push(s[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = s[start..].trim();
    if !last.is_empty() {
        out.push(last.to_string());
    }
    out
}

const MEMBER_FLAGS: &[&str] = &["static", "final", "abstract", "default", "protected", "const", "deprecated"];

fn parse_member(line: &str, desc: &mut TypeDescriptor, simple: &HashMap<String, String>) {
    let mut rest = line.trim();
    let mut flags = HashSet::new();
    loop {
        let word = rest.split_whitespace().next().unwrap_or("");
        if MEMBER_FLAGS.contains(&word) {
            flags.insert(word);
            rest = rest[word.len()..].trim_start();
        } else {
            break;
        }
    }
    let mut method_vars: Vec<String> = Vec::new();
    if rest.starts_with('<') && !rest.starts_with("<init>") {
        let close = rest.find('>').unwrap_or(rest.len() - 1);
        method_vars = rest[1..close].split(',').map(|s| s.trim().to_string()).collect();
        rest = rest[close + 1..].trim_start();
    }
    let mut vars = desc.type_params.clone();
    vars.extend(method_vars.iter().cloned());

    if let Some(params) = rest.strip_prefix("<init>") {
        let (params, varargs) = parse_params(params, &vars, simple);
        desc.constructors.push(MethodInfo {
            name: "<init>".to_string(),
            params,
            varargs,
            ret: Type::Void,
            type_params: method_vars,
            is_static: false,
            is_abstract: false,
            is_final: false,
            is_private: false,
            is_deprecated: flags.contains("deprecated"),
            owner: desc.name.clone(),
        });
        return;
    }
    let (ty_text, after) = take_type_text(rest);
    let ty = parse_sig_type(ty_text, &vars, simple);
    match after.find('(') {
        Some(open) => {
            let name = after[..open].trim().to_string();
            let (params, varargs) = parse_params(&after[open..], &vars, simple);
            let interface = desc.is_interface();
            desc.methods.push(MethodInfo {
                name,
                params,
                varargs,
                ret: ty,
                type_params: method_vars,
                is_static: flags.contains("static"),
                is_abstract: flags.contains("abstract")
                    || (interface && !flags.contains("static") && !flags.contains("default")),
                is_final: flags.contains("final"),
                is_private: false,
                is_deprecated: flags.contains("deprecated"),
                owner: desc.name.clone(),
            });
        }
        None => desc.fields.push(FieldInfo {
            name: after.trim().to_string(),
            ty,
            is_static: flags.contains("static"),
            is_final: flags.contains("final"),
            is_private: false,
            is_constant: flags.contains("const"),
            is_enum_constant: false,
            is_deprecated: flags.contains("deprecated"),
        }),
    }
}

fn parse_params(text: &str, vars: &[String], simple: &HashMap<String, String>) -> (Vec<Type>, bool) {
    let inner = text.trim().trim_start_matches('(').trim_end_matches(')');
    let mut varargs = false;
    let params = split_top_level(inner)
        .into_iter()
        .map(|p| match p.strip_suffix("...") {
            Some(elem) => {
                varargs = true;
                Type::Array(Box::new(parse_sig_type(elem, vars, simple)))
            }
            None => parse_sig_type(&p, vars, simple),
        })
        .collect();
    (params, varargs)
}

fn parse_sig_type(text: &str, vars: &[String], simple: &HashMap<String, String>) -> Type {
    let mut text = text.trim();
    if text.starts_with('?') {
        return Type::Wildcard;
    }
    let mut dims = 0;
    while let Some(stripped) = text.strip_suffix("[]") {
        dims += 1;
        text = stripped.trim_end();
    }
    let (base, args) = match text.find('<') {
        Some(i) => (&text[..i], split_top_level(&text[i + 1..text.len() - 1])),
        None => (text, Vec::new()),
    };
    let element = if base == "void" {
        Type::Void
    } else if let Some(p) = PrimitiveKind::from_name(base) {
        Type::Primitive(p)
    } else if vars.iter().any(|v| v == base) {
        Type::TypeVar(base.to_string())
    } else {
        let key = resolve_sig_name(base, simple);
        Type::Class { name: key, args: args.iter().map(|a| parse_sig_type(a, vars, simple)).collect() }
    };
    Type::array_of(element, dims)
}

fn resolve_sig_name(name: &str, simple: &HashMap<String, String>) -> String {
    if let Some(key) = simple.get(name) {
        return key.clone();
    }
    if simple.values().any(|k| k == name) {
        return name.to_string();
    }
    // `java.io.Foo` style names outside the table stay as written
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_index_parses() {
        let jdk = JdkClassPath::new();
        assert!(!jdk.is_empty());
        let string = jdk.resolve_type("java.lang.String").expect("String");
        assert!(string.is_final);
        assert!(string.interfaces.iter().any(|i| i.class_name() == Some("java.lang.Comparable")));
        let format = string.methods_named("format").next().expect("format");
        assert!(format.varargs && format.is_static);
        assert!(jdk.has_package("java.util"));
        assert!(jdk.has_package("java"));
    }

    #[test]
    fn nested_platform_types_resolve_by_dotted_name() {
        let jdk = JdkClassPath::new();
        assert_eq!(find_qualified(&jdk, "java.util.Map.Entry").as_deref(), Some("java.util.Map$Entry"));
        let map = jdk.resolve_type("java.util.Map").expect("Map");
        assert!(map.nested.iter().any(|n| n == "Entry"));
    }

    #[test]
    fn enum_final_methods_are_marked() {
        let jdk = JdkClassPath::new();
        let e = jdk.resolve_type("java.lang.Enum").expect("Enum");
        assert!(e.methods_named("ordinal").all(|m| m.is_final));
        assert!(e.methods_named("toString").all(|m| !m.is_final));
    }

    #[test]
    fn inherited_methods_are_substituted() {
        let jdk = JdkClassPath::new();
        let list = Type::Class { name: "java.util.ArrayList".into(), args: vec![Type::string()] };
        let (gets, complete) = find_methods(&jdk, &list, "get");
        assert!(complete);
        assert_eq!(gets[0].ret, Type::string());
        let (sizes, _) = find_methods(&jdk, &list, "size");
        assert_eq!(sizes.len(), 1);
    }

    #[test]
    fn interface_methods_are_abstract_unless_default_or_static() {
        let jdk = JdkClassPath::new();
        let list = jdk.resolve_type("java.util.List").expect("List");
        assert!(list.methods_named("get").all(|m| m.is_abstract));
        assert!(list.methods_named("of").all(|m| m.is_static && !m.is_abstract));
    }
}
