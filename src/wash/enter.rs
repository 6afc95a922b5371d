//! Enter phase - register every declared type into the shared index
//!
//! Enter runs over all compilation units before any of them is checked. It
//! assigns each declaration its binary name (member types `Outer$Inner`, local
//! classes `Outer$1Local`, anonymous classes and enum constant bodies
//! `Outer$1`, `Outer$2`, ... in source order per enclosing class) and builds a
//! `TypeDescriptor` for it. The result is an immutable `SourceIndex` that every
//! later phase shares.
//!
//! Descriptors are built in three stages so that names can be resolved against
//! declarations from any unit: skeletons (names, kinds, member types), then
//! supertypes, then members.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::classpath::{find_member_type, find_qualified, package_prefixes, ClassPath, CompositeIndex, FieldInfo, MethodInfo, TypeDescriptor};
use super::flow::is_constant_expression;
use super::types::{PrimitiveKind, Type};
use crate::ast::{
    child_statements, has_annotation, walk_expr, walk_stmt, Block, ClassBody, ClassMember, CompilationUnit, ConstantBody,
    Expr, ImportDecl, Modifier, NewExpr, Stmt, TypeArg, TypeDecl, TypeKind, TypeRef,
};
use crate::consts::JAVA_LANG_SIMPLE_TYPES;

/// Types declared in the compiled sources
#[derive(Debug, Default, Clone)]
pub struct SourceIndex {
    types: HashMap<String, Arc<TypeDescriptor>>,
    packages: HashSet<String>,
    decl_keys: HashMap<(String, usize), String>,
}

impl SourceIndex {
    /// Key of the type declared at `offset` in `file`: the name offset of a
    /// named declaration or the `{` offset of an anonymous body
    pub fn key_at(&self, file: &str, offset: usize) -> Option<&str> {
        self.decl_keys.get(&(file.to_string(), offset)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.types.contains_key(key)
    }
}

impl ClassPath for SourceIndex {
    fn resolve_type(&self, qualified_name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(qualified_name).cloned()
    }

    fn has_package(&self, package: &str) -> bool {
        self.packages.contains(package)
    }
}

/// Names of platform packages whose contents are only partially known
pub fn is_platform_name(name: &str) -> bool {
    ["java.", "javax.", "jdk.", "sun."].iter().any(|p| name.starts_with(p))
}

/// Lexical position from which a type name is resolved
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    /// Enclosing type keys, outermost first
    pub enclosing: Vec<String>,
    pub type_vars: Vec<String>,
    /// Local classes in scope: simple name and key, innermost last
    pub locals: Vec<(String, String)>,
}

impl NameScope {
    pub fn innermost(&self) -> Option<&str> {
        self.enclosing.last().map(String::as_str)
    }
}

/// Outcome of resolving a written type
#[derive(Debug, Clone)]
pub struct ResolvedType {
    pub ty: Type,
    /// Names that could not be resolved, with the span of their type reference
    pub unresolved: Vec<(String, crate::ast::Span)>,
}

/// Import-aware type name resolution for one compilation unit
#[derive(Clone, Copy)]
pub struct TypeNames<'a> {
    pub package: Option<&'a str>,
    pub imports: &'a [ImportDecl],
    pub index: &'a dyn ClassPath,
}

impl<'a> TypeNames<'a> {
    pub fn new(unit: &'a CompilationUnit, index: &'a dyn ClassPath) -> Self {
        Self { package: unit.package_name(), imports: &unit.imports, index }
    }

    /// An on-demand import the index cannot enumerate makes unknown simple
    /// names unreportable
    pub fn has_opaque_imports(&self) -> bool {
        self.imports.iter().any(|i| {
            i.is_wildcard
                && ((is_platform_name(&i.name) && !i.is_static)
                    || (i.is_static && find_qualified(self.index, &i.name).is_none()))
        })
    }

    fn qualify(&self, simple: &str) -> String {
        match self.package {
            Some(p) => format!("{}.{}", p, simple),
            None => simple.to_string(),
        }
    }

    /// Resolve the first segment of a type name
    pub fn resolve_simple(&self, name: &str, scope: &NameScope) -> Option<Type> {
        if scope.type_vars.iter().any(|v| v == name) {
            return Some(Type::TypeVar(name.to_string()));
        }
        if let Some((_, key)) = scope.locals.iter().rev().find(|(n, _)| n == name) {
            return Some(Type::class(key.clone()));
        }
        for outer in scope.enclosing.iter().rev() {
            if let Some(key) = find_member_type(self.index, outer, name) {
                return Some(Type::class(key));
            }
        }
        for import in self.imports.iter().filter(|i| !i.is_wildcard && i.simple_name() == name) {
            return Some(match find_qualified(self.index, &import.name) {
                Some(key) => Type::class(key),
                None if import.is_static => continue,
                None => Type::class(import.name.clone()),
            });
        }
        let local = self.qualify(name);
        if self.index.resolve_type(&local).is_some() {
            return Some(Type::class(local));
        }
        for import in self.imports.iter().filter(|i| i.is_wildcard) {
            let found = if import.is_static {
                find_qualified(self.index, &import.name).and_then(|owner| find_member_type(self.index, &owner, name))
            } else {
                find_qualified(self.index, &format!("{}.{}", import.name, name))
            };
            if let Some(key) = found {
                return Some(Type::class(key));
            }
        }
        let lang = format!("java.lang.{}", name);
        if self.index.resolve_type(&lang).is_some() || JAVA_LANG_SIMPLE_TYPES.contains(&name) {
            return Some(Type::class(lang));
        }
        None
    }

    /// Resolve a dotted type name; `None` when it names nothing
    pub fn resolve_name(&self, dotted: &str, scope: &NameScope) -> Option<Type> {
        let mut segments = dotted.split('.');
        let first = segments.next()?;
        if let Some(mut ty) = self.resolve_simple(first, scope) {
            for seg in segments {
                let Type::Class { name, .. } = &ty else { return None };
                if self.index.resolve_type(name).is_none() {
                    // opaque platform type: keep the dotted form
                    ty = Type::class(format!("{}${}", name, seg));
                    continue;
                }
                ty = Type::class(find_member_type(self.index, name, seg)?);
            }
            return Some(ty);
        }
        if dotted.contains('.') {
            if let Some(key) = find_qualified(self.index, dotted) {
                return Some(Type::class(key));
            }
            if is_platform_name(dotted) {
                return Some(Type::class(dotted.to_string()));
            }
        }
        None
    }

    /// Resolve a written type with its arguments and dimensions
    pub fn resolve_ref(&self, type_ref: &TypeRef, scope: &NameScope) -> ResolvedType {
        let mut unresolved = Vec::new();
        let ty = self.resolve_ref_into(type_ref, scope, &mut unresolved);
        ResolvedType { ty, unresolved }
    }

    fn resolve_ref_into(
        &self,
        type_ref: &TypeRef,
        scope: &NameScope,
        unresolved: &mut Vec<(String, crate::ast::Span)>,
    ) -> Type {
        let base = if type_ref.name == "void" {
            Type::Void
        } else if let Some(p) = PrimitiveKind::from_name(&type_ref.name) {
            Type::Primitive(p)
        } else if type_ref.name == "var" && type_ref.type_args.is_empty() && self.resolve_simple("var", scope).is_none() {
            Type::Unknown
        } else {
            match self.resolve_name(&type_ref.name, scope) {
                Some(Type::Class { name, .. }) => {
                    let args = type_ref
                        .type_args
                        .iter()
                        .map(|a| match a {
                            TypeArg::Type(t) => self.resolve_ref_into(t, scope, unresolved),
                            TypeArg::Wildcard(w) => {
                                if let Some((_, bound)) = &w.bound {
                                    self.resolve_ref_into(bound, scope, unresolved);
                                }
                                Type::Wildcard
                            }
                        })
                        .collect();
                    Type::Class { name, args }
                }
                Some(other) => other,
                None => {
                    if !self.has_opaque_imports() {
                        unresolved.push((type_ref.name.clone(), type_ref.span));
                    }
                    Type::Unknown
                }
            }
        };
        Type::array_of(base, type_ref.array_dims)
    }
}

enum SiteBody<'u> {
    Named(&'u TypeDecl),
    Anonymous { base: Option<&'u TypeRef>, enum_owner: Option<String>, body: &'u ClassBody },
}

struct DeclSite<'u> {
    key: String,
    unit: usize,
    body: SiteBody<'u>,
    outer: Option<String>,
    is_local: bool,
    scope: NameScope,
}

impl<'u> DeclSite<'u> {
    fn members(&self) -> &'u [ClassMember] {
        match self.body {
            SiteBody::Named(d) => d.members(),
            SiteBody::Anonymous { body, .. } => &body.members,
        }
    }

    fn kind(&self) -> TypeKind {
        match self.body {
            SiteBody::Named(d) => d.kind(),
            SiteBody::Anonymous { .. } => TypeKind::Class,
        }
    }
}

/// Enter phase processor
pub struct Enter<'u> {
    platform: Arc<dyn ClassPath>,
    units: Vec<(&'u str, &'u CompilationUnit)>,
    sites: Vec<DeclSite<'u>>,
    decl_keys: HashMap<(String, usize), String>,
    anonymous_counters: HashMap<String, usize>,
    local_counters: HashMap<(String, String), usize>,
}

impl<'u> Enter<'u> {
    pub fn new(platform: Arc<dyn ClassPath>) -> Self {
        Self {
            platform,
            units: Vec::new(),
            sites: Vec::new(),
            decl_keys: HashMap::new(),
            anonymous_counters: HashMap::new(),
            local_counters: HashMap::new(),
        }
    }

    /// Register the declarations of one unit
    pub fn process(&mut self, file: &'u str, unit: &'u CompilationUnit) {
        let index = self.units.len();
        self.units.push((file, unit));
        let before = self.sites.len();
        for decl in &unit.type_decls {
            let key = unit.qualify(decl.name());
            self.enter_type(index, decl, key, None, false, &NameScope::default());
        }
        log::debug!("enter {}: {} types", file, self.sites.len() - before);
    }

    /// Build the descriptors of every registered declaration
    pub fn finish(self) -> SourceIndex {
        let mut packages = HashSet::new();
        for (_, unit) in &self.units {
            if let Some(p) = unit.package_name() {
                packages.extend(package_prefixes(&format!("{}.X", p)));
            }
        }

        let skeletons: HashMap<String, TypeDescriptor> =
            self.sites.iter().map(|s| (s.key.clone(), self.skeleton(s))).collect();
        let stage = self.stage_index(&skeletons, &packages);

        let mut with_supers = skeletons;
        for site in &self.sites {
            if let Some(desc) = with_supers.get_mut(&site.key) {
                self.fill_supertypes(desc, site, &stage);
            }
        }
        let stage = self.stage_index(&with_supers, &packages);

        let mut complete = with_supers;
        for site in &self.sites {
            if let Some(desc) = complete.get_mut(&site.key) {
                self.fill_members(desc, site, &stage);
            }
        }
        infer_permits(&mut complete);

        log::debug!("source index: {} types in {} units", complete.len(), self.units.len());
        SourceIndex {
            types: complete.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
            packages,
            decl_keys: self.decl_keys,
        }
    }

    fn stage_index(&self, descs: &HashMap<String, TypeDescriptor>, packages: &HashSet<String>) -> CompositeIndex {
        let source = SourceIndex {
            types: descs.iter().map(|(k, v)| (k.clone(), Arc::new(v.clone()))).collect(),
            packages: packages.clone(),
            decl_keys: HashMap::new(),
        };
        CompositeIndex::new(vec![Arc::new(source), self.platform.clone()])
    }

    fn enter_type(
        &mut self,
        unit: usize,
        decl: &'u TypeDecl,
        key: String,
        outer: Option<String>,
        is_local: bool,
        scope: &NameScope,
    ) {
        let file = self.units[unit].0;
        self.decl_keys.insert((file.to_string(), decl.name_span().start.offset), key.clone());
        self.sites.push(DeclSite {
            key: key.clone(),
            unit,
            body: SiteBody::Named(decl),
            outer,
            is_local,
            scope: scope.clone(),
        });

        let mut inner = scope.clone();
        inner.enclosing.push(key.clone());
        inner.type_vars.extend(decl.type_params().iter().map(|p| p.name.clone()));

        if let TypeDecl::Enum(e) = decl {
            for constant in &e.constants {
                for arg in constant.arguments() {
                    self.scan_expr(unit, arg, &key, &inner);
                }
                if let ConstantBody::WithBody(body) = &constant.body {
                    self.enter_anonymous(unit, body, None, Some(key.clone()), &key, &inner);
                }
            }
        }
        self.enter_members(unit, decl.members(), &key, &inner);
    }

    fn enter_members(&mut self, unit: usize, members: &'u [ClassMember], owner: &str, scope: &NameScope) {
        for member in members {
            match member {
                ClassMember::TypeDecl(t) => {
                    let key = format!("{}${}", owner, t.name());
                    self.enter_type(unit, t, key, Some(owner.to_string()), false, scope);
                }
                ClassMember::Field(f) => {
                    if let Some(init) = &f.initializer {
                        self.scan_expr(unit, init, owner, scope);
                    }
                }
                ClassMember::Method(m) => {
                    if let Some(body) = &m.body {
                        let mut s = scope.clone();
                        s.type_vars.extend(m.type_params.iter().map(|p| p.name.clone()));
                        self.scan_block(unit, body, owner, &mut s);
                    }
                }
                ClassMember::Constructor(c) => {
                    let mut s = scope.clone();
                    s.type_vars.extend(c.type_params.iter().map(|p| p.name.clone()));
                    if let Some(inv) = &c.explicit_invocation {
                        for arg in &inv.arguments {
                            self.scan_expr(unit, arg, owner, &s);
                        }
                    }
                    self.scan_block(unit, &c.body, owner, &mut s);
                }
                ClassMember::Initializer(i) => {
                    let mut s = scope.clone();
                    self.scan_block(unit, &i.body, owner, &mut s);
                }
            }
        }
    }

    fn enter_anonymous(
        &mut self,
        unit: usize,
        body: &'u ClassBody,
        base: Option<&'u TypeRef>,
        enum_owner: Option<String>,
        owner: &str,
        scope: &NameScope,
    ) {
        let counter = self.anonymous_counters.entry(owner.to_string()).or_insert(0);
        *counter += 1;
        let key = format!("{}${}", owner, counter);
        let file = self.units[unit].0;
        self.decl_keys.insert((file.to_string(), body.span.start.offset), key.clone());
        self.sites.push(DeclSite {
            key: key.clone(),
            unit,
            body: SiteBody::Anonymous { base, enum_owner, body },
            outer: Some(owner.to_string()),
            is_local: true,
            scope: scope.clone(),
        });
        let mut inner = scope.clone();
        inner.enclosing.push(key.clone());
        self.enter_members(unit, &body.members, &key, &inner);
    }

    fn scan_expr(&mut self, unit: usize, expr: &'u Expr, owner: &str, scope: &NameScope) {
        let mut found: Vec<&'u NewExpr> = Vec::new();
        walk_expr(expr, &mut |e| {
            if let Expr::New(n) = e {
                if n.anonymous_body.is_some() {
                    found.push(n);
                }
            }
            true
        });
        self.enter_anonymous_all(unit, found, owner, scope);
    }

    fn enter_anonymous_all(&mut self, unit: usize, found: Vec<&'u NewExpr>, owner: &str, scope: &NameScope) {
        for n in found {
            if let Some(body) = &n.anonymous_body {
                self.enter_anonymous(unit, body, Some(&n.target_type), None, owner, scope);
            }
        }
    }

    fn scan_block(&mut self, unit: usize, block: &'u Block, owner: &str, scope: &mut NameScope) {
        for stmt in &block.statements {
            self.scan_stmt(unit, stmt, owner, scope);
        }
    }

    fn scan_stmt(&mut self, unit: usize, stmt: &'u Stmt, owner: &str, scope: &mut NameScope) {
        if let Stmt::TypeDecl(decl) = stmt {
            let counter = self
                .local_counters
                .entry((owner.to_string(), decl.name().to_string()))
                .or_insert(0);
            *counter += 1;
            let key = format!("{}${}{}", owner, counter, decl.name());
            scope.locals.push((decl.name().to_string(), key.clone()));
            let s = scope.clone();
            self.enter_type(unit, decl, key, Some(owner.to_string()), true, &s);
            return;
        }
        // anonymous classes in this statement's own expressions
        let mut found: Vec<&'u NewExpr> = Vec::new();
        let shallow = shallow_expressions(stmt);
        for e in shallow {
            walk_expr(e, &mut |x| {
                if let Expr::New(n) = x {
                    if n.anonymous_body.is_some() {
                        found.push(n);
                    }
                }
                true
            });
        }
        self.enter_anonymous_all(unit, found, owner, scope);
        let mut inner = scope.clone();
        for child in child_statements(stmt) {
            self.scan_stmt(unit, child, owner, &mut inner);
        }
    }

    fn names<'s>(&'s self, site: &DeclSite<'_>, index: &'s dyn ClassPath) -> TypeNames<'s> {
        let (_, unit) = self.units[site.unit];
        TypeNames::new(unit, index)
    }

    fn skeleton(&self, site: &DeclSite<'_>) -> TypeDescriptor {
        let mut desc = TypeDescriptor::new(site.key.clone(), site.kind());
        desc.outer = site.outer.clone();
        desc.is_local = site.is_local;
        let outer_is_interface = site
            .outer
            .as_ref()
            .and_then(|o| self.sites.iter().find(|s| &s.key == o))
            .map(|s| matches!(s.kind(), TypeKind::Interface | TypeKind::Annotation))
            .unwrap_or(false);
        if let SiteBody::Named(decl) = site.body {
            let has = |m: Modifier| decl.has_modifier(m);
            desc.type_params = decl.type_params().iter().map(|p| p.name.clone()).collect();
            desc.is_deprecated = has_annotation(decl.annotations(), "Deprecated");
            desc.is_sealed = has(Modifier::Sealed);
            match decl {
                TypeDecl::Class(_) => {
                    desc.is_final = has(Modifier::Final);
                    desc.is_abstract = has(Modifier::Abstract);
                    desc.is_static = site.outer.is_none() || has(Modifier::Static) || outer_is_interface;
                }
                TypeDecl::Interface(_) | TypeDecl::Annotation(_) => {
                    desc.is_abstract = true;
                    desc.is_static = true;
                }
                TypeDecl::Enum(e) => {
                    desc.is_final = !e.has_constant_bodies();
                    desc.is_abstract = e.has_constant_bodies() && e.abstract_methods().next().is_some();
                    desc.is_static = true;
                    desc.enum_constants = e.constants.iter().map(|c| c.name.clone()).collect();
                }
                TypeDecl::Record(_) => {
                    desc.is_final = true;
                    desc.is_static = true;
                }
            }
            desc.nested = decl
                .members()
                .iter()
                .filter_map(|m| match m {
                    ClassMember::TypeDecl(t) => Some(t.name().to_string()),
                    _ => None,
                })
                .collect();
        } else if let SiteBody::Anonymous { body, .. } = site.body {
            desc.nested = body
                .members
                .iter()
                .filter_map(|m| match m {
                    ClassMember::TypeDecl(t) => Some(t.name().to_string()),
                    _ => None,
                })
                .collect();
        }
        desc
    }

    fn site_scope(&self, site: &DeclSite<'_>, desc: &TypeDescriptor) -> NameScope {
        let mut scope = site.scope.clone();
        scope.enclosing.push(site.key.clone());
        scope.type_vars.extend(desc.type_params.iter().cloned());
        scope
    }

    fn fill_supertypes(&self, desc: &mut TypeDescriptor, site: &DeclSite<'_>, index: &dyn ClassPath) {
        let names = self.names(site, index);
        // supertypes are resolved from the declaration's enclosing scope
        let mut scope = site.scope.clone();
        scope.type_vars.extend(desc.type_params.iter().cloned());
        let resolve = |t: &TypeRef| names.resolve_ref(t, &scope).ty;
        match &site.body {
            SiteBody::Named(decl) => {
                match decl {
                    TypeDecl::Class(c) => {
                        desc.superclass = Some(c.extends.as_ref().map(resolve).unwrap_or_else(Type::object));
                        desc.interfaces = c.implements.iter().map(resolve).collect();
                    }
                    TypeDecl::Interface(i) => desc.interfaces = i.extends.iter().map(resolve).collect(),
                    TypeDecl::Enum(e) => {
                        desc.superclass = Some(Type::Class {
                            name: "java.lang.Enum".to_string(),
                            args: vec![Type::class(site.key.clone())],
                        });
                        desc.interfaces = e.implements.iter().map(resolve).collect();
                    }
                    TypeDecl::Record(r) => {
                        desc.superclass = Some(Type::class("java.lang.Record"));
                        desc.interfaces = r.implements.iter().map(resolve).collect();
                    }
                    TypeDecl::Annotation(_) => {
                        desc.interfaces = vec![Type::class("java.lang.annotation.Annotation")];
                    }
                }
                desc.permits = decl
                    .permits()
                    .iter()
                    .filter_map(|p| resolve(p).class_name().map(str::to_string))
                    .collect();
            }
            SiteBody::Anonymous { base, enum_owner, .. } => {
                if let Some(owner) = enum_owner {
                    desc.superclass = Some(Type::class(owner.clone()));
                } else if let Some(base) = base {
                    let ty = resolve(*base);
                    let is_interface = ty
                        .class_name()
                        .and_then(|n| index.resolve_type(n))
                        .map(|d| d.is_interface())
                        .unwrap_or(false);
                    if is_interface {
                        desc.superclass = Some(Type::object());
                        desc.interfaces = vec![ty];
                    } else {
                        desc.superclass = Some(ty);
                    }
                }
            }
        }
    }

    fn fill_members(&self, desc: &mut TypeDescriptor, site: &DeclSite<'_>, index: &dyn ClassPath) {
        let names = self.names(site, index);
        let scope = self.site_scope(site, desc);
        let interface = desc.is_interface();
        let members = site.members();
        let final_constants: HashSet<&str> = members
            .iter()
            .filter_map(|m| match m {
                ClassMember::Field(f) if f.is_final() || interface => {
                    f.initializer.as_ref().filter(|i| is_constant_expression(i, &|_| false)).map(|_| f.name.as_str())
                }
                _ => None,
            })
            .collect();

        if let SiteBody::Named(TypeDecl::Enum(e)) = site.body {
            let self_ty = Type::class(site.key.clone());
            for c in &e.constants {
                desc.fields.push(FieldInfo {
                    name: c.name.clone(),
                    ty: self_ty.clone(),
                    is_static: true,
                    is_final: true,
                    is_private: false,
                    is_constant: false,
                    is_enum_constant: true,
                    is_deprecated: has_annotation(&c.annotations, "Deprecated"),
                });
            }
            desc.methods.push(synthetic_method("values", vec![], Type::Array(Box::new(self_ty.clone())), &site.key));
            desc.methods.push(synthetic_method("valueOf", vec![Type::string()], self_ty, &site.key));
        }
        if let SiteBody::Named(TypeDecl::Record(r)) = site.body {
            for comp in &r.components {
                let ty = names.resolve_ref(&comp.effective_type(), &scope).ty;
                desc.fields.push(FieldInfo {
                    name: comp.name.clone(),
                    ty: ty.clone(),
                    is_static: false,
                    is_final: true,
                    is_private: true,
                    is_constant: false,
                    is_enum_constant: false,
                    is_deprecated: false,
                });
                let declared = members.iter().any(|m| matches!(m, ClassMember::Method(md) if md.name == comp.name && md.parameters.is_empty()));
                if !declared {
                    let mut accessor = synthetic_method(&comp.name, vec![], ty, &site.key);
                    accessor.is_static = false;
                    desc.methods.push(accessor);
                }
            }
            let implicit = [
                ("equals", vec![Type::object()], Type::boolean()),
                ("hashCode", vec![], Type::int()),
                ("toString", vec![], Type::string()),
            ];
            for (name, params, ret) in implicit {
                let arity = params.len();
                let declared = members.iter().any(|m| matches!(m, ClassMember::Method(md) if md.name == name && md.parameters.len() == arity));
                if !declared {
                    let mut method = synthetic_method(name, params, ret, &site.key);
                    method.is_static = false;
                    method.is_final = true;
                    desc.methods.push(method);
                }
            }
        }

        for member in members {
            match member {
                ClassMember::Field(f) => {
                    let is_static = f.is_static() || interface;
                    let is_final = f.is_final() || interface;
                    let ty = names.resolve_ref(&f.type_ref, &scope).ty;
                    let constant_type = ty.is_primitive() || ty.is_string();
                    let is_constant = is_final
                        && constant_type
                        && f
                            .initializer
                            .as_ref()
                            .map(|i| is_constant_expression(i, &|n| final_constants.contains(n)))
                            .unwrap_or(false);
                    desc.fields.push(FieldInfo {
                        name: f.name.clone(),
                        ty,
                        is_static,
                        is_final,
                        is_private: f.modifiers.contains(&Modifier::Private),
                        is_constant,
                        is_enum_constant: false,
                        is_deprecated: has_annotation(&f.annotations, "Deprecated"),
                    });
                }
                ClassMember::Method(m) => {
                    let mut mscope = scope.clone();
                    mscope.type_vars.extend(m.type_params.iter().map(|p| p.name.clone()));
                    let params = m.parameters.iter().map(|p| names.resolve_ref(&p.effective_type(), &mscope).ty).collect();
                    let ret = m.return_type.as_ref().map(|r| names.resolve_ref(r, &mscope).ty).unwrap_or(Type::Void);
                    let is_private = m.modifiers.contains(&Modifier::Private);
                    let is_static = m.is_static();
                    desc.methods.push(MethodInfo {
                        name: m.name.clone(),
                        params,
                        varargs: m.is_varargs(),
                        ret,
                        type_params: m.type_params.iter().map(|p| p.name.clone()).collect(),
                        is_static,
                        is_abstract: m.is_abstract()
                            || (interface && m.body.is_none() && !is_static && !is_private && !m.modifiers.contains(&Modifier::Default)),
                        is_final: m.modifiers.contains(&Modifier::Final),
                        is_private,
                        is_deprecated: has_annotation(&m.annotations, "Deprecated"),
                        owner: site.key.clone(),
                    });
                }
                ClassMember::Constructor(c) => {
                    let params = if c.compact {
                        match site.body {
                            SiteBody::Named(TypeDecl::Record(r)) => {
                                r.components.iter().map(|p| names.resolve_ref(&p.effective_type(), &scope).ty).collect()
                            }
                            _ => Vec::new(),
                        }
                    } else {
                        c.parameters.iter().map(|p| names.resolve_ref(&p.effective_type(), &scope).ty).collect()
                    };
                    desc.constructors.push(MethodInfo {
                        name: "<init>".to_string(),
                        varargs: c.parameters.last().map(|p| p.varargs).unwrap_or(false),
                        params,
                        ret: Type::Void,
                        type_params: c.type_params.iter().map(|p| p.name.clone()).collect(),
                        is_static: false,
                        is_abstract: false,
                        is_final: false,
                        is_private: c.modifiers.contains(&Modifier::Private),
                        is_deprecated: has_annotation(&c.annotations, "Deprecated"),
                        owner: site.key.clone(),
                    });
                }
                ClassMember::Initializer(_) | ClassMember::TypeDecl(_) => {}
            }
        }

        if let SiteBody::Named(TypeDecl::Record(r)) = site.body {
            let canonical: Vec<Type> =
                r.components.iter().map(|p| names.resolve_ref(&p.effective_type(), &scope).ty).collect();
            if !desc.constructors.iter().any(|c| c.params == canonical) {
                let mut ctor = synthetic_method("<init>", canonical, Type::Void, &site.key);
                ctor.is_static = false;
                desc.constructors.push(ctor);
            }
        }
        if desc.constructors.is_empty() && !interface && matches!(site.body, SiteBody::Named(_)) {
            let mut ctor = synthetic_method("<init>", Vec::new(), Type::Void, &site.key);
            ctor.is_static = false;
            ctor.is_private = desc.is_enum();
            desc.constructors.push(ctor);
        }
    }
}

fn synthetic_method(name: &str, params: Vec<Type>, ret: Type, owner: &str) -> MethodInfo {
    MethodInfo {
        name: name.to_string(),
        params,
        varargs: false,
        ret,
        type_params: Vec::new(),
        is_static: true,
        is_abstract: false,
        is_final: false,
        is_private: false,
        is_deprecated: false,
        owner: owner.to_string(),
    }
}

/// Expressions owned directly by a statement, excluding nested statements
fn shallow_expressions(stmt: &Stmt) -> Vec<&Expr> {
    let mut out: Vec<&Expr> = Vec::new();
    match stmt {
        Stmt::If(i) => out.push(&i.condition),
        Stmt::While(w) => out.push(&w.condition),
        Stmt::DoWhile(d) => out.push(&d.condition),
        Stmt::For(f) => {
            out.extend(f.condition.iter());
            out.extend(f.update.iter());
        }
        Stmt::ForEach(f) => out.push(&f.iterable),
        Stmt::Synchronized(s) => out.push(&s.lock),
        Stmt::Switch(s) => {
            out.push(&s.selector);
            for case in &s.cases {
                for label in &case.labels {
                    out.extend(label.constants());
                    out.extend(label.guard.iter());
                }
                match &case.body {
                    crate::ast::CaseBody::Expression(e) => out.push(e),
                    crate::ast::CaseBody::Throw(t) => out.push(&t.expr),
                    _ => {}
                }
            }
        }
        Stmt::Try(t) => {
            for r in &t.resources {
                match r {
                    crate::ast::TryResource::Var { initializer, .. } => out.push(initializer),
                    crate::ast::TryResource::Expr { expr, .. } => out.push(expr),
                }
            }
        }
        Stmt::Labeled(_) | Stmt::Block(_) | Stmt::TypeDecl(_) => {}
        other => {
            let mut all = Vec::new();
            walk_stmt(other, &mut |e| {
                all.push(e);
                false
            });
            out.extend(all);
        }
    }
    out
}

/// A sealed type without `permits` permits its direct subtypes in the same unit
fn infer_permits(descs: &mut HashMap<String, TypeDescriptor>) {
    let sealed: Vec<String> =
        descs.values().filter(|d| d.is_sealed && d.permits.is_empty()).map(|d| d.name.clone()).collect();
    for key in sealed {
        let top = |k: &str| k.split('$').next().unwrap_or(k).to_string();
        let mut subs: Vec<String> = descs
            .values()
            .filter(|d| top(&d.name) == top(&key) || same_package(&d.name, &key))
            .filter(|d| {
                d.superclass.as_ref().and_then(Type::class_name) == Some(key.as_str())
                    || d.interfaces.iter().any(|i| i.class_name() == Some(key.as_str()))
            })
            .filter(|d| !d.is_local)
            .map(|d| d.name.clone())
            .collect();
        subs.sort();
        if let Some(d) = descs.get_mut(&key) {
            d.permits = subs;
        }
    }
}

fn same_package(a: &str, b: &str) -> bool {
    let pkg = |k: &str| k.rfind('.').map(|i| k[..i].to_string()).unwrap_or_default();
    pkg(a) == pkg(b)
}

/// Run Enter over a set of units
pub fn enter_units(units: &[(&str, &CompilationUnit)], platform: Arc<dyn ClassPath>) -> SourceIndex {
    let mut enter = Enter::new(platform);
    for (file, unit) in units {
        enter.process(file, unit);
    }
    enter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::parser::parse_source;
    use crate::wash::classpath::JdkClassPath;

    fn index_of(source: &str) -> (SourceIndex, CompilationUnit) {
        let (unit, diagnostics) = parse_source(source, &Config::default());
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        let index = enter_units(&[("X.java", &unit)], Arc::new(JdkClassPath::new()));
        (index, unit)
    }

    #[test]
    fn binary_names_of_nested_local_and_anonymous_types() {
        let (index, _) = index_of(
            r#"
package p;
class Outer {
    class Inner {}
    void m() {
        class Local {}
        Runnable r = new Runnable() { public void run() {} };
        Object o = new Object() {};
    }
}
"#,
        );
        for key in ["p.Outer", "p.Outer$Inner", "p.Outer$1Local", "p.Outer$1", "p.Outer$2"] {
            assert!(index.contains(key), "missing {}", key);
        }
        let anon = index.resolve_type("p.Outer$1").unwrap();
        assert!(anon.is_local);
        assert_eq!(anon.interfaces[0].class_name(), Some("java.lang.Runnable"));
    }

    #[test]
    fn enum_constant_bodies_are_numbered_in_order() {
        let (index, _) = index_of("enum E { A { }, B, C { }; }");
        let first = index.resolve_type("E$1").unwrap();
        assert_eq!(first.superclass.as_ref().and_then(Type::class_name), Some("E"));
        assert!(index.contains("E$2"));
        assert!(!index.contains("E$3"));
        let e = index.resolve_type("E").unwrap();
        assert!(!e.is_final);
        assert!(e.methods_named("values").next().is_some());
        assert_eq!(e.enum_constants, vec!["A", "B", "C"]);
    }

    #[test]
    fn sealed_permits_are_inferred_from_the_unit() {
        let (index, _) = index_of("sealed interface S {} final class A implements S {} record B() implements S {}");
        let s = index.resolve_type("S").unwrap();
        assert_eq!(s.permits, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn type_names_follow_import_order() {
        let (index, unit) = index_of("import java.util.*; class A { List<String> l; }");
        let composite = CompositeIndex::new(vec![Arc::new(index), Arc::new(JdkClassPath::new())]);
        let names = TypeNames::new(&unit, &composite);
        let scope = NameScope { enclosing: vec!["A".into()], ..Default::default() };
        assert_eq!(names.resolve_name("List", &scope), Some(Type::class("java.util.List")));
        assert_eq!(names.resolve_name("String", &scope), Some(Type::string()));
        assert_eq!(names.resolve_name("Map.Entry", &scope), Some(Type::class("java.util.Map$Entry")));
        assert!(names.has_opaque_imports());
    }

    #[test]
    fn constant_fields_are_detected() {
        let (index, _) = index_of("class A { static final int X = 1 + 2; static final int Y = X * 2; final Object o = null; }");
        let a = index.resolve_type("A").unwrap();
        assert!(a.field("X").unwrap().is_constant);
        assert!(a.field("Y").unwrap().is_constant);
        assert!(!a.field("o").unwrap().is_constant);
    }
}
