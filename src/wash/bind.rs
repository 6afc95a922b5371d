//! Scope binding
//!
//! Walks one compilation unit, builds the scope arena and the symbol table,
//! and resolves every simple name to a local, a field, a type or a package.
//! Name-level problems (unresolved names, static context, forward
//! references, duplicate locals, captures) are reported here; typing is left
//! to the checker.

use std::collections::{HashMap, HashSet};

use super::classpath::{find_field, find_member_type, find_qualified, unimplemented_abstract_methods, ClassPath, FieldInfo};
use super::enter::{is_platform_name, NameScope, SourceIndex, TypeNames};
use super::flow::{can_complete_normally, has_exiting_break};
use super::scope::{
    instance_reachable, top_level_of, EnumConstantInfo, MemberKind, ScopeArena, ScopeId, ScopeKind, Symbol, SymbolId,
    SymbolKind, SymbolTable, TypeFrame,
};
use super::types::{hierarchy_complete, Type};
use super::Context;
use crate::ast::{
    AssignmentOp, BinaryOp, Block, CaseBody, CaseLabelElement, ClassBody, ClassMember, CompilationUnit, ConstantBody,
    ConstructorDecl, EnumDecl, Expr, FieldAccessExpr, IdentifierExpr, InitializerBlock, InstanceOfTarget, LambdaBody,
    LambdaExpr, MethodDecl, MethodRefTarget, Modifier, NodeId, Parameter, Pattern, Span, Stmt, SwitchBlock, ThisExpr,
    TryResource, TypeArg, TypeDecl, TypeRef, UnaryOp,
};
use crate::config::{Config, Feature};
use crate::diagnostics::{Category, Diagnostic};

/// A field reached from a name, with the owner's type arguments applied
#[derive(Debug, Clone)]
pub struct FieldRef {
    pub owner: String,
    pub field: FieldInfo,
    pub ty: Type,
}

/// What a name in expression position denotes
#[derive(Debug, Clone)]
pub enum Resolution {
    Local(SymbolId),
    Field(FieldRef),
    Type(Type),
    Package(String),
}

/// Method chosen for a call site
#[derive(Debug, Clone)]
pub struct MethodTarget {
    pub owner: String,
    pub name: String,
    pub params: Vec<Type>,
    pub ret: Type,
    pub is_static: bool,
}

/// Result of binding one compilation unit
#[derive(Debug, Default)]
pub struct Bindings {
    pub arena: ScopeArena,
    pub symbols: SymbolTable,
    pub resolutions: HashMap<NodeId, Resolution>,
    /// Declared symbol by the offset of its declaring name
    pub decl_symbols: HashMap<usize, SymbolId>,
    /// Resolved written types by the start offset of their reference
    pub type_refs: HashMap<usize, Type>,
    /// Bare case constants that name nothing in scope (enum constants of the selector)
    pub unresolved_case_names: HashSet<NodeId>,
    /// Types computed by the checker
    pub expr_types: HashMap<NodeId, Type>,
    pub method_targets: HashMap<NodeId, MethodTarget>,
}

impl Bindings {
    pub fn resolution(&self, id: NodeId) -> Option<&Resolution> {
        self.resolutions.get(&id)
    }

    pub fn type_of_ref(&self, type_ref: &TypeRef) -> Option<&Type> {
        self.type_refs.get(&type_ref.span.start.offset)
    }

    pub fn symbol_declared_at(&self, name_span: Span) -> Option<SymbolId> {
        self.decl_symbols.get(&name_span.start.offset).copied()
    }

    pub fn expr_type(&self, id: NodeId) -> Option<&Type> {
        self.expr_types.get(&id)
    }
}

/// Bind every name of `unit`
pub fn bind_scopes(unit: &CompilationUnit, ctx: &Context<'_>) -> (Bindings, Vec<Diagnostic>) {
    let mut binder = Binder::new(unit, ctx);
    for decl in &unit.type_decls {
        let key = binder.key_for(decl.name_span().start.offset, || unit.qualify(decl.name()));
        binder.type_decl(decl, key);
    }
    binder.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Value,
    /// Left side of a plain `=`
    AssignTarget,
    /// Receiver of a field access or method call
    Qualifier,
    CaseConstant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Simple,
    This,
    TypeName,
}

#[derive(Debug, Clone, Copy)]
enum DeferredKind {
    Capture,
    Guard,
}

struct Deferred {
    symbol: SymbolId,
    span: Span,
    kind: DeferredKind,
}

/// Pattern variables introduced when a condition is true or false
#[derive(Debug, Default)]
struct Flow {
    when_true: Vec<SymbolId>,
    when_false: Vec<SymbolId>,
}

impl Flow {
    fn negate(self) -> Flow {
        Flow { when_true: self.when_false, when_false: self.when_true }
    }
}

struct Mark {
    scope: ScopeId,
    locals: usize,
}

struct Binder<'a> {
    config: &'a Config,
    sources: &'a SourceIndex,
    index: &'a dyn ClassPath,
    file: &'a str,
    names: TypeNames<'a>,
    out: Bindings,
    diagnostics: Vec<Diagnostic>,
    scope: ScopeId,
    frames: Vec<TypeFrame>,
    name_scope: NameScope,
    method_type_params: Vec<String>,
    /// Case group scope of the guard being bound
    guard_floor: Option<ScopeId>,
    deferred: Vec<Deferred>,
}

impl<'a> Binder<'a> {
    fn new(unit: &'a CompilationUnit, ctx: &Context<'a>) -> Self {
        let mut out = Bindings::default();
        let scope = out.arena.push(ScopeKind::Unit, None);
        Self {
            config: ctx.config,
            sources: ctx.sources,
            index: ctx.index,
            file: ctx.file,
            names: TypeNames::new(unit, ctx.index),
            out,
            diagnostics: Vec::new(),
            scope,
            frames: Vec::new(),
            name_scope: NameScope::default(),
            method_type_params: Vec::new(),
            guard_floor: None,
            deferred: Vec::new(),
        }
    }

    fn finish(mut self) -> (Bindings, Vec<Diagnostic>) {
        let lambdas = self.config.allows(Feature::Lambdas);
        for d in std::mem::take(&mut self.deferred) {
            let sym = self.out.symbols.get(d.symbol);
            let message = match d.kind {
                DeferredKind::Capture if !lambdas && !sym.is_final() => Some((
                    Category::CapturedVariableNotEffectivelyFinal,
                    format!("Cannot refer to the non-final local variable {} defined in an enclosing scope", sym.name),
                )),
                DeferredKind::Capture if lambdas && !sym.is_effectively_final() => Some((
                    Category::CapturedVariableNotEffectivelyFinal,
                    format!("Local variable {} defined in an enclosing scope must be final or effectively final", sym.name),
                )),
                DeferredKind::Guard if !sym.is_effectively_final() => Some((
                    Category::GuardRequiresEffectivelyFinalVariable,
                    format!("Local variable {} referenced from a guard must be final or effectively final", sym.name),
                )),
                _ => None,
            };
            if let Some((category, message)) = message {
                self.diagnostics.push(Diagnostic::new(category, message, d.span));
            }
        }
        log::trace!("bound {} scopes, {} symbols", self.out.arena.len(), self.out.symbols.len());
        (self.out, self.diagnostics)
    }

    fn report(&mut self, category: Category, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::new(category, message, span));
    }

    fn key_for(&self, offset: usize, fallback: impl FnOnce() -> String) -> String {
        self.sources.key_at(self.file, offset).map(str::to_string).unwrap_or_else(fallback)
    }

    // ---- scopes ----

    fn push_scope(&mut self, kind: ScopeKind) -> Mark {
        let mark = Mark { scope: self.scope, locals: self.name_scope.locals.len() };
        self.scope = self.out.arena.push(kind, Some(self.scope));
        mark
    }

    fn pop_scope(&mut self, mark: Mark) {
        self.scope = mark.scope;
        self.name_scope.locals.truncate(mark.locals);
    }

    /// Run `f` in a block scope where `symbols` are bound
    fn with_bindings<R>(&mut self, symbols: &[SymbolId], f: impl FnOnce(&mut Self) -> R) -> R {
        if symbols.is_empty() {
            return f(self);
        }
        let mark = self.push_scope(ScopeKind::Block);
        self.bind_existing(symbols);
        let r = f(self);
        self.pop_scope(mark);
        r
    }

    fn bind_existing(&mut self, symbols: &[SymbolId]) {
        for &sym in symbols {
            let name = self.out.symbols.get(sym).name.clone();
            self.out.arena.bind(self.scope, &name, sym);
        }
    }

    fn with_member<R>(&mut self, kind: MemberKind, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.frames.last().map(|fr| fr.member);
        if let Some(frame) = self.frames.last_mut() {
            frame.member = kind;
        }
        let r = f(self);
        if let (Some(frame), Some(previous)) = (self.frames.last_mut(), previous) {
            frame.member = previous;
        }
        r
    }

    /// Scope where a local declared at the current position lives: colon-form
    /// case groups share the enclosing switch block
    fn decl_scope(&self) -> ScopeId {
        let current = self.out.arena.get(self.scope);
        match (&current.kind, current.parent) {
            (ScopeKind::CaseGroup, Some(parent)) => parent,
            _ => self.scope,
        }
    }

    /// A local, parameter or pattern variable `name` already visible from
    /// `from` inside the same member; the flag is set when the search crossed
    /// a lambda
    fn find_clash(&self, from: ScopeId, name: &str) -> Option<(SymbolId, bool)> {
        let mut crossed_lambda = false;
        for s in self.out.arena.ancestors(from) {
            let kind = &self.out.arena.get(s).kind;
            if matches!(kind, ScopeKind::Type { .. } | ScopeKind::Unit) {
                break;
            }
            if let Some(sym) = self.out.arena.local(s, name) {
                if matches!(
                    self.out.symbols.get(sym).kind,
                    SymbolKind::Local | SymbolKind::Parameter | SymbolKind::PatternVariable
                ) {
                    return Some((sym, crossed_lambda));
                }
            }
            if kind.is_member_boundary() {
                break;
            }
            if *kind == ScopeKind::Lambda {
                crossed_lambda = true;
            }
        }
        None
    }

    fn declare_variable(
        &mut self,
        name: &str,
        name_span: Span,
        kind: SymbolKind,
        ty: Type,
        modifiers: &[Modifier],
        has_initializer: bool,
        into: ScopeId,
    ) -> Option<SymbolId> {
        if name == "_" {
            return None;
        }
        if let Some((_, crossed_lambda)) = self.find_clash(self.scope, name) {
            let message = if crossed_lambda {
                format!(
                    "Lambda expression's local variable {} cannot redeclare another local variable defined in an enclosing scope. ",
                    name
                )
            } else if kind == SymbolKind::Parameter {
                format!("Duplicate parameter {}", name)
            } else {
                format!("Duplicate local variable {}", name)
            };
            self.report(Category::DuplicateLocalVariable, message, name_span);
        }
        let symbol = Symbol::new(name, kind, ty, into, name_span)
            .with_modifiers(modifiers)
            .initialized(has_initializer);
        let id = self.out.symbols.add(symbol);
        self.out.arena.bind(into, name, id);
        self.out.decl_symbols.insert(name_span.start.offset, id);
        Some(id)
    }

    // ---- types ----

    fn type_decl(&mut self, decl: &TypeDecl, key: String) {
        let desc = self.index.resolve_type(&key);
        let constants = decl.as_enum().map(|e| e.constants.as_slice()).unwrap_or(&[]);
        let mut frame = TypeFrame::new(key.clone(), desc, decl.members(), constants);
        if let TypeDecl::Record(r) = decl {
            frame = frame.with_blank_finals(r.components.iter().map(|c| c.name.clone()));
        }
        let saved = self.enter_frame(frame, &key);
        for tp in decl.type_params() {
            for bound in &tp.bounds {
                self.type_ref(bound);
            }
        }
        for sup in decl.supertypes() {
            self.type_ref(sup);
        }
        for p in decl.permits() {
            self.type_ref_with(p, false);
        }
        if let TypeDecl::Record(r) = decl {
            for c in &r.components {
                let ty = self.parameter_type(c);
                self.declare_field_symbol(&c.name, c.name_span, ty, &[Modifier::Private, Modifier::Final], true);
            }
        }
        self.declare_fields(decl.members());
        if let TypeDecl::Enum(e) = decl {
            self.enum_constants(e, &key);
        }
        self.members(decl.members(), &key);
        self.leave_frame(saved);
    }

    fn class_body(&mut self, body: &ClassBody, key: String) {
        let desc = self.index.resolve_type(&key);
        let frame = TypeFrame::new(key.clone(), desc, &body.members, &[]);
        let saved = self.enter_frame(frame, &key);
        self.declare_fields(&body.members);
        self.members(&body.members, &key);
        self.leave_frame(saved);
    }

    fn enter_frame(&mut self, frame: TypeFrame, key: &str) -> (Mark, usize, Option<ScopeId>) {
        let type_vars = self.name_scope.type_vars.len();
        self.name_scope.type_vars.extend(frame.type_params.iter().cloned());
        self.name_scope.enclosing.push(key.to_string());
        self.frames.push(frame);
        let guard = self.guard_floor.take();
        let mark = self.push_scope(ScopeKind::Type { key: key.to_string() });
        (mark, type_vars, guard)
    }

    fn leave_frame(&mut self, (mark, type_vars, guard): (Mark, usize, Option<ScopeId>)) {
        self.pop_scope(mark);
        self.frames.pop();
        self.name_scope.enclosing.pop();
        self.name_scope.type_vars.truncate(type_vars);
        self.guard_floor = guard;
    }

    fn declare_field_symbol(&mut self, name: &str, name_span: Span, ty: Type, modifiers: &[Modifier], init: bool) -> SymbolId {
        let symbol = Symbol::new(name, SymbolKind::Field, ty, self.scope, name_span)
            .with_modifiers(modifiers)
            .initialized(init);
        let id = self.out.symbols.add(symbol);
        self.out.arena.bind(self.scope, name, id);
        self.out.decl_symbols.insert(name_span.start.offset, id);
        id
    }

    fn declare_fields(&mut self, members: &[ClassMember]) {
        let desc = self.frames.last().and_then(|f| f.desc.clone());
        for m in members {
            match m {
                ClassMember::Field(f) => {
                    let ty = desc
                        .as_ref()
                        .and_then(|d| d.field(&f.name))
                        .map(|fi| fi.ty.clone())
                        .unwrap_or(Type::Unknown);
                    self.declare_field_symbol(&f.name, f.name_span, ty, &f.modifiers, f.initializer.is_some());
                }
                ClassMember::Method(md) => {
                    let ty = desc
                        .as_ref()
                        .and_then(|d| d.methods_named(&md.name).find(|mi| mi.params.len() == md.parameters.len()))
                        .map(|mi| mi.ret.clone())
                        .unwrap_or(Type::Unknown);
                    let symbol = Symbol::new(&md.name, SymbolKind::Method, ty, self.scope, md.name_span)
                        .with_modifiers(&md.modifiers);
                    let id = self.out.symbols.add(symbol);
                    self.out.decl_symbols.insert(md.name_span.start.offset, id);
                }
                ClassMember::TypeDecl(t) => {
                    let key = self.key_for(t.name_span().start.offset, || t.name().to_string());
                    let symbol = Symbol::new(t.name(), SymbolKind::Type, Type::class(key), self.scope, t.name_span())
                        .with_modifiers(t.modifiers());
                    let id = self.out.symbols.add(symbol);
                    self.out.decl_symbols.insert(t.name_span().start.offset, id);
                }
                ClassMember::Constructor(_) | ClassMember::Initializer(_) => {}
            }
        }
    }

    fn enum_constants(&mut self, e: &EnumDecl, key: &str) {
        let enum_type = Type::class(key);
        let abstract_methods = unimplemented_abstract_methods(self.index, key).unwrap_or_default();
        for (ordinal, c) in e.constants.iter().enumerate() {
            let body_key = c.body.as_body().and_then(|b| self.sources.key_at(self.file, b.span.start.offset)).map(str::to_string);
            let id = self.declare_field_symbol(
                &c.name,
                c.name_span,
                enum_type.clone(),
                &[Modifier::Public, Modifier::Static, Modifier::Final],
                true,
            );
            self.out.symbols.get_mut(id).enum_constant = Some(EnumConstantInfo {
                ordinal,
                has_body: c.body.is_some(),
                body_key,
                abstract_methods_to_implement: abstract_methods.clone(),
            });
        }
        self.with_member(MemberKind::StaticFieldInit, |b| {
            for c in &e.constants {
                if let Some(frame) = b.frames.last_mut() {
                    frame.initializing = Some(c.name.clone());
                }
                for arg in c.arguments() {
                    b.expr(arg);
                }
                if let ConstantBody::WithBody(body) = &c.body {
                    let body_key = b.key_for(body.span.start.offset, || format!("{}$", key));
                    b.class_body(body, body_key);
                }
            }
            if let Some(frame) = b.frames.last_mut() {
                frame.initializing = None;
            }
        });
    }

    fn members(&mut self, members: &[ClassMember], owner: &str) {
        let interface = self.frames.last().map(|f| f.is_interface()).unwrap_or(false);
        for m in members {
            match m {
                ClassMember::Field(f) => {
                    let kind = if f.is_static() || interface { MemberKind::StaticFieldInit } else { MemberKind::InstanceFieldInit };
                    self.with_member(kind, |b| {
                        b.type_ref(&f.type_ref);
                        if let Some(init) = &f.initializer {
                            if let Some(frame) = b.frames.last_mut() {
                                frame.initializing = Some(f.name.clone());
                            }
                            b.expr(init);
                            if let Some(frame) = b.frames.last_mut() {
                                frame.initializing = None;
                            }
                        }
                    });
                }
                ClassMember::Method(md) => self.method(md),
                ClassMember::Constructor(c) => self.constructor(c),
                ClassMember::Initializer(i) => self.initializer(i),
                ClassMember::TypeDecl(t) => {
                    let key = self.key_for(t.name_span().start.offset, || format!("{}${}", owner, t.name()));
                    self.with_member(MemberKind::Body, |b| b.type_decl(t, key));
                }
            }
        }
    }

    fn method(&mut self, m: &MethodDecl) {
        let kind = if m.is_static() { MemberKind::StaticMethod } else { MemberKind::InstanceMethod };
        let type_vars = self.name_scope.type_vars.len();
        let method_vars = self.method_type_params.len();
        for tp in &m.type_params {
            self.name_scope.type_vars.push(tp.name.clone());
            self.method_type_params.push(tp.name.clone());
        }
        let mark = self.push_scope(ScopeKind::Method { is_static: m.is_static() });
        self.with_member(kind, |b| {
            for tp in &m.type_params {
                for bound in &tp.bounds {
                    b.type_ref(bound);
                }
            }
            if let Some(ret) = &m.return_type {
                b.type_ref(ret);
            }
            for t in &m.throws {
                b.type_ref(t);
            }
            for p in &m.parameters {
                b.parameter(p);
            }
            if let Some(body) = &m.body {
                b.block(body);
            }
            if let Some(default) = &m.default_value {
                b.expr(default);
            }
        });
        self.pop_scope(mark);
        self.name_scope.type_vars.truncate(type_vars);
        self.method_type_params.truncate(method_vars);
    }

    fn constructor(&mut self, c: &ConstructorDecl) {
        let type_vars = self.name_scope.type_vars.len();
        let method_vars = self.method_type_params.len();
        for tp in &c.type_params {
            self.name_scope.type_vars.push(tp.name.clone());
            self.method_type_params.push(tp.name.clone());
        }
        let mark = self.push_scope(ScopeKind::Method { is_static: false });
        self.with_member(MemberKind::Constructor, |b| {
            for t in &c.throws {
                b.type_ref(t);
            }
            for p in &c.parameters {
                b.parameter(p);
            }
            if let Some(inv) = &c.explicit_invocation {
                for a in &inv.arguments {
                    b.expr(a);
                }
            }
            b.block(&c.body);
        });
        self.pop_scope(mark);
        self.name_scope.type_vars.truncate(type_vars);
        self.method_type_params.truncate(method_vars);
    }

    fn initializer(&mut self, i: &InitializerBlock) {
        let kind = if i.is_static { MemberKind::StaticInit } else { MemberKind::InstanceInit };
        let mark = self.push_scope(ScopeKind::Initializer { is_static: i.is_static });
        self.with_member(kind, |b| b.block(&i.body));
        self.pop_scope(mark);
    }

    fn parameter_type(&mut self, p: &Parameter) -> Type {
        let ty = self.type_ref(&p.type_ref);
        if p.varargs {
            Type::array_of(ty, 1)
        } else {
            ty
        }
    }

    fn parameter(&mut self, p: &Parameter) {
        let ty = self.parameter_type(p);
        self.declare_variable(&p.name, p.name_span, SymbolKind::Parameter, ty, &p.modifiers, true, self.scope);
    }

    // ---- written types ----

    fn type_ref(&mut self, t: &TypeRef) -> Type {
        self.type_ref_with(t, true)
    }

    fn type_ref_with(&mut self, t: &TypeRef, raw_check: bool) -> Type {
        let resolved = self.names.resolve_ref(t, &self.name_scope);
        for (name, span) in &resolved.unresolved {
            self.report(Category::UnresolvedName, format!("{} cannot be resolved to a type", name), *span);
        }
        self.static_type_vars(t);
        if raw_check && self.config.allows(Feature::Generics) {
            self.raw_types(t, &resolved.ty);
        }
        self.deprecated_type(t, &resolved.ty);
        self.out.type_refs.insert(t.span.start.offset, resolved.ty.clone());
        resolved.ty
    }

    fn static_type_vars(&mut self, t: &TypeRef) {
        if !t.name.contains('.') && !self.method_type_params.iter().any(|v| *v == t.name) {
            let owner = self.frames.iter().rposition(|f| f.type_params.iter().any(|p| *p == t.name));
            if let Some(i) = owner {
                if !instance_reachable(&self.frames, i) {
                    self.report(
                        Category::StaticContextViolation,
                        format!("Cannot make a static reference to the non-static type {}", t.name),
                        t.span,
                    );
                }
            }
        }
        for arg in &t.type_args {
            match arg {
                TypeArg::Type(inner) => self.static_type_vars(inner),
                TypeArg::Wildcard(w) => {
                    if let Some((_, bound)) = &w.bound {
                        self.static_type_vars(bound);
                    }
                }
            }
        }
    }

    fn raw_types(&mut self, t: &TypeRef, ty: &Type) {
        let mut base = ty;
        while let Type::Array(inner) = base {
            base = inner;
        }
        let Type::Class { name, args } = base else { return };
        if t.type_args.is_empty() && !t.diamond && args.is_empty() {
            if let Some(desc) = self.index.resolve_type(name) {
                if !desc.type_params.is_empty() {
                    let simple = Type::simple_name_of(name);
                    self.report(
                        Category::RawTypeUsage,
                        format!(
                            "{} is a raw type. References to generic type {} should be parameterized",
                            simple,
                            desc.generic_display()
                        ),
                        t.span,
                    );
                }
            }
        }
        for (arg, arg_ty) in t.type_args.iter().zip(args.iter()) {
            if let TypeArg::Type(inner) = arg {
                self.raw_types(inner, arg_ty);
            }
        }
    }

    fn deprecated_type(&mut self, t: &TypeRef, ty: &Type) {
        let mut base = ty;
        while let Type::Array(inner) = base {
            base = inner;
        }
        let Some(name) = base.class_name() else { return };
        let Some(desc) = self.index.resolve_type(name) else { return };
        let current = self.frames.first().map(|f| top_level_of(&f.key).to_string());
        if desc.is_deprecated && current.as_deref() != Some(top_level_of(name)) {
            self.report(
                Category::DeprecatedUsage,
                format!("The type {} is deprecated", Type::simple_name_of(name)),
                t.span,
            );
        }
    }

    // ---- statements ----

    fn block(&mut self, b: &Block) {
        let mark = self.push_scope(ScopeKind::Block);
        self.statements(&b.statements);
        self.pop_scope(mark);
    }

    fn statements(&mut self, statements: &[Stmt]) {
        for s in statements {
            self.stmt(s);
        }
    }

    /// A nested statement gets its own scope
    fn nested(&mut self, s: &Stmt) {
        let mark = self.push_scope(ScopeKind::Block);
        self.stmt(s);
        self.pop_scope(mark);
    }

    fn stmt(&mut self, s: &Stmt) {
        match s {
            Stmt::Expression(e) => {
                self.expr(&e.expr);
            }
            Stmt::Declaration(d) => {
                let base = self.type_ref(&d.type_ref);
                for v in &d.variables {
                    if let Some(init) = &v.initializer {
                        self.expr(init);
                    }
                    let ty = if base.is_unknown() { Type::Unknown } else { Type::array_of(base.clone(), v.array_dims) };
                    let into = self.decl_scope();
                    self.declare_variable(&v.name, v.name_span, SymbolKind::Local, ty, &d.modifiers, v.initializer.is_some(), into);
                }
            }
            Stmt::TypeDecl(t) => {
                let key = self.key_for(t.name_span().start.offset, || t.name().to_string());
                self.name_scope.locals.push((t.name().to_string(), key.clone()));
                let symbol = Symbol::new(t.name(), SymbolKind::Type, Type::class(key.clone()), self.scope, t.name_span());
                let id = self.out.symbols.add(symbol);
                let into = self.decl_scope();
                self.out.arena.bind(into, t.name(), id);
                self.out.decl_symbols.insert(t.name_span().start.offset, id);
                self.type_decl(t, key);
            }
            Stmt::If(i) => {
                let flow = self.expr(&i.condition);
                self.with_bindings(&flow.when_true, |b| b.nested(&i.then_branch));
                if let Some(e) = &i.else_branch {
                    self.with_bindings(&flow.when_false, |b| b.nested(e));
                }
                if !can_complete_normally(&i.then_branch) {
                    self.bind_existing(&flow.when_false);
                }
                if let Some(e) = &i.else_branch {
                    if !can_complete_normally(e) {
                        self.bind_existing(&flow.when_true);
                    }
                }
            }
            Stmt::While(w) => {
                let flow = self.expr(&w.condition);
                self.with_bindings(&flow.when_true, |b| b.nested(&w.body));
                if !has_exiting_break(&w.body) {
                    self.bind_existing(&flow.when_false);
                }
            }
            Stmt::DoWhile(d) => {
                self.nested(&d.body);
                let flow = self.expr(&d.condition);
                if !has_exiting_break(&d.body) {
                    self.bind_existing(&flow.when_false);
                }
            }
            Stmt::For(f) => {
                let mark = self.push_scope(ScopeKind::Block);
                self.statements(&f.init);
                let flow = f.condition.as_ref().map(|c| self.expr(c)).unwrap_or_default();
                self.with_bindings(&flow.when_true, |b| {
                    b.nested(&f.body);
                    for u in &f.update {
                        b.expr(u);
                    }
                });
                self.pop_scope(mark);
                if !has_exiting_break(&f.body) {
                    self.bind_existing(&flow.when_false);
                }
            }
            Stmt::ForEach(f) => {
                let mark = self.push_scope(ScopeKind::Block);
                self.expr(&f.iterable);
                let ty = self.type_ref(&f.type_ref);
                self.declare_variable(&f.name, f.name_span, SymbolKind::Local, ty, &f.modifiers, true, self.scope);
                self.nested(&f.body);
                self.pop_scope(mark);
            }
            Stmt::Switch(sw) => self.switch_block(sw),
            Stmt::Return(r) => {
                if let Some(v) = &r.value {
                    self.expr(v);
                }
            }
            Stmt::Yield(y) => {
                self.expr(&y.value);
            }
            Stmt::Throw(t) => {
                self.expr(&t.expr);
            }
            Stmt::Assert(a) => {
                self.expr(&a.condition);
                if let Some(m) = &a.message {
                    self.expr(m);
                }
            }
            Stmt::Synchronized(s) => {
                self.expr(&s.lock);
                self.block(&s.body);
            }
            Stmt::Labeled(l) => self.stmt(&l.statement),
            Stmt::Block(b) => self.block(b),
            Stmt::Try(t) => {
                let mark = self.push_scope(ScopeKind::Block);
                for r in &t.resources {
                    match r {
                        TryResource::Var { modifiers, type_ref, name, name_span, initializer, .. } => {
                            self.expr(initializer);
                            let ty = self.type_ref(type_ref);
                            self.declare_variable(name, *name_span, SymbolKind::Local, ty, modifiers, true, self.scope);
                        }
                        TryResource::Expr { expr, .. } => {
                            self.expr(expr);
                        }
                    }
                }
                self.block(&t.try_block);
                self.pop_scope(mark);
                for c in &t.catch_clauses {
                    let mark = self.push_scope(ScopeKind::Block);
                    let mut ty = self.type_ref(&c.parameter.type_ref);
                    for alt in &c.alt_types {
                        self.type_ref(alt);
                        ty = Type::class("java.lang.Throwable");
                    }
                    let p = &c.parameter;
                    self.declare_variable(&p.name, p.name_span, SymbolKind::Local, ty, &p.modifiers, true, self.scope);
                    self.block(&c.block);
                    self.pop_scope(mark);
                }
                if let Some(f) = &t.finally_block {
                    self.block(f);
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) => {}
        }
    }

    fn switch_block(&mut self, sw: &SwitchBlock) {
        self.expr(&sw.selector);
        let switch_mark = self.push_scope(ScopeKind::Switch);
        for case in &sw.cases {
            let group_mark = self.push_scope(ScopeKind::CaseGroup);
            let group = self.scope;
            for label in &case.labels {
                for element in &label.elements {
                    match element {
                        CaseLabelElement::Constant(Expr::Identifier(id)) => {
                            self.identifier(id, Position::CaseConstant);
                        }
                        CaseLabelElement::Constant(e) => {
                            self.expr(e);
                        }
                        CaseLabelElement::Pattern(p) => {
                            let symbols = self.pattern_symbols(p);
                            self.bind_existing(&symbols);
                        }
                        CaseLabelElement::Null(_) | CaseLabelElement::Default(_) => {}
                    }
                }
                if let Some(guard) = &label.guard {
                    let saved = self.guard_floor.replace(group);
                    let flow = self.expr(guard);
                    self.guard_floor = saved;
                    self.bind_existing(&flow.when_true);
                }
            }
            match &case.body {
                CaseBody::Statements(stmts) => self.statements(stmts),
                CaseBody::Expression(e) => {
                    self.expr(e);
                }
                CaseBody::Block(b) => self.block(b),
                CaseBody::Throw(t) => {
                    self.expr(&t.expr);
                }
            }
            self.pop_scope(group_mark);
        }
        self.pop_scope(switch_mark);
    }

    fn pattern_symbols(&mut self, p: &Pattern) -> Vec<SymbolId> {
        match p {
            Pattern::Type(tp) => {
                let ty = self.type_ref_with(&tp.type_ref, false);
                self.declare_pattern(&tp.name, tp.name_span, ty, &tp.modifiers).into_iter().collect()
            }
            Pattern::Record(rp) => {
                self.type_ref_with(&rp.type_ref, false);
                rp.subpatterns.iter().flat_map(|s| self.pattern_symbols(s)).collect()
            }
        }
    }

    /// Pattern variables are created unbound; the enclosing construct decides
    /// where they are in scope
    fn declare_pattern(&mut self, name: &str, name_span: Span, ty: Type, modifiers: &[Modifier]) -> Option<SymbolId> {
        if name == "_" {
            return None;
        }
        if self.find_clash(self.scope, name).is_some() {
            self.report(Category::DuplicateLocalVariable, format!("Duplicate local variable {}", name), name_span);
        }
        let symbol = Symbol::new(name, SymbolKind::PatternVariable, ty, self.scope, name_span)
            .with_modifiers(modifiers)
            .initialized(true);
        let id = self.out.symbols.add(symbol);
        self.out.decl_symbols.insert(name_span.start.offset, id);
        Some(id)
    }

    // ---- expressions ----

    fn expr(&mut self, e: &Expr) -> Flow {
        match e {
            Expr::Literal(_) | Expr::Erroneous(_) => Flow::default(),
            Expr::Identifier(id) => {
                self.identifier(id, Position::Value);
                Flow::default()
            }
            Expr::FieldAccess(fa) => {
                self.field_access(fa, Position::Value);
                Flow::default()
            }
            Expr::MethodCall(mc) => {
                match mc.target.as_deref() {
                    Some(Expr::Identifier(id)) => {
                        self.identifier(id, Position::Qualifier);
                    }
                    Some(Expr::FieldAccess(fa)) => {
                        self.field_access(fa, Position::Qualifier);
                    }
                    Some(other) => {
                        self.expr(other);
                    }
                    None => {}
                }
                for t in &mc.type_args {
                    self.type_ref(t);
                }
                for a in &mc.arguments {
                    self.expr(a);
                }
                Flow::default()
            }
            Expr::Binary(b) => match b.operator {
                BinaryOp::LogicalAnd => {
                    let left = self.expr(&b.left);
                    let right = self.with_bindings(&left.when_true, |s| s.expr(&b.right));
                    let mut when_true = left.when_true;
                    when_true.extend(right.when_true);
                    Flow { when_true, when_false: Vec::new() }
                }
                BinaryOp::LogicalOr => {
                    let left = self.expr(&b.left);
                    let right = self.with_bindings(&left.when_false, |s| s.expr(&b.right));
                    let mut when_false = left.when_false;
                    when_false.extend(right.when_false);
                    Flow { when_true: Vec::new(), when_false }
                }
                _ => {
                    self.expr(&b.left);
                    self.expr(&b.right);
                    Flow::default()
                }
            },
            Expr::Unary(u) => match u.operator {
                UnaryOp::Not => self.expr(&u.operand).negate(),
                op if op.is_increment() => {
                    self.assign_target(&u.operand, false);
                    Flow::default()
                }
                _ => {
                    self.expr(&u.operand);
                    Flow::default()
                }
            },
            Expr::Assignment(a) => {
                self.assign_target(&a.target, a.operator == AssignmentOp::Assign);
                self.expr(&a.value);
                Flow::default()
            }
            Expr::ArrayAccess(a) => {
                self.expr(&a.array);
                self.expr(&a.index);
                Flow::default()
            }
            Expr::Cast(c) => {
                self.type_ref(&c.target_type);
                for b in &c.extra_bounds {
                    self.type_ref(b);
                }
                self.expr(&c.expr)
            }
            Expr::InstanceOf(i) => {
                self.expr(&i.expr);
                match &i.target {
                    InstanceOfTarget::Type(t) => {
                        self.type_ref_with(t, false);
                        Flow::default()
                    }
                    InstanceOfTarget::Pattern(p) => Flow { when_true: self.pattern_symbols(p), when_false: Vec::new() },
                }
            }
            Expr::Conditional(c) => {
                let flow = self.expr(&c.condition);
                self.with_bindings(&flow.when_true, |s| s.expr(&c.then_expr));
                self.with_bindings(&flow.when_false, |s| s.expr(&c.else_expr));
                Flow::default()
            }
            Expr::New(n) => {
                if let Some(outer) = &n.outer {
                    self.expr(outer);
                }
                if n.outer.is_none() {
                    self.type_ref(&n.target_type);
                }
                for a in &n.arguments {
                    self.expr(a);
                }
                if let Some(body) = &n.anonymous_body {
                    let key = self.key_for(body.span.start.offset, || format!("{}$", n.target_type.name));
                    self.class_body(body, key);
                }
                Flow::default()
            }
            Expr::NewArray(n) => {
                self.type_ref(&n.element_type);
                for d in &n.dimensions {
                    self.expr(d);
                }
                if let Some(init) = &n.initializer {
                    for el in &init.elements {
                        self.expr(el);
                    }
                }
                Flow::default()
            }
            Expr::ArrayInitializer(init) => {
                for el in &init.elements {
                    self.expr(el);
                }
                Flow::default()
            }
            Expr::Lambda(l) => {
                self.lambda(l);
                Flow::default()
            }
            Expr::MethodRef(m) => {
                match &m.target {
                    MethodRefTarget::Expr(target) => match target.as_ref() {
                        Expr::Identifier(id) => {
                            self.identifier(id, Position::Qualifier);
                        }
                        Expr::FieldAccess(fa) => {
                            self.field_access(fa, Position::Qualifier);
                        }
                        other => {
                            self.expr(other);
                        }
                    },
                    MethodRefTarget::Type(t) => {
                        self.type_ref(t);
                    }
                }
                Flow::default()
            }
            Expr::Switch(sw) => {
                self.switch_block(sw);
                Flow::default()
            }
            Expr::This(t) => {
                self.this_expr(t);
                Flow::default()
            }
            Expr::Super(span) => {
                if let Some(n) = self.frames.len().checked_sub(1) {
                    if !instance_reachable(&self.frames, n) {
                        self.report(Category::StaticContextViolation, "Cannot use super in a static context", *span);
                    }
                }
                Flow::default()
            }
            Expr::ClassLiteral(c) => {
                self.type_ref_with(&c.type_ref, false);
                Flow::default()
            }
            Expr::Parenthesized(p) => self.expr(&p.expr),
        }
    }

    fn assign_target(&mut self, target: &Expr, simple: bool) {
        let position = if simple { Position::AssignTarget } else { Position::Value };
        match target.unparenthesized() {
            Expr::Identifier(id) => {
                if let Some(Resolution::Local(sym)) = self.identifier(id, position) {
                    self.out.symbols.get_mut(sym).assignments.push(id.span);
                }
            }
            Expr::FieldAccess(fa) => {
                self.field_access(fa, position);
            }
            other => {
                self.expr(other);
            }
        }
    }

    fn lambda(&mut self, l: &LambdaExpr) {
        let outer = self.scope;
        let mark = self.push_scope(ScopeKind::Lambda);
        for p in &l.params {
            let ty = match &p.type_ref {
                Some(t) if !t.is_var() => self.type_ref(t),
                _ => Type::Unknown,
            };
            if p.name == "_" {
                continue;
            }
            if self.find_clash(outer, &p.name).is_some() {
                self.report(
                    Category::DuplicateLocalVariable,
                    format!(
                        "Lambda expression's parameter {} cannot redeclare another local variable defined in an enclosing scope. ",
                        p.name
                    ),
                    p.name_span,
                );
            }
            let symbol = Symbol::new(&p.name, SymbolKind::Parameter, ty, self.scope, p.name_span)
                .with_modifiers(&p.modifiers)
                .initialized(true);
            let id = self.out.symbols.add(symbol);
            self.out.arena.bind(self.scope, &p.name, id);
            self.out.decl_symbols.insert(p.name_span.start.offset, id);
        }
        match &l.body {
            LambdaBody::Expr(e) => {
                self.expr(e);
            }
            LambdaBody::Block(b) => self.block(b),
        }
        self.pop_scope(mark);
    }

    fn this_expr(&mut self, t: &ThisExpr) {
        let target = match &t.qualifier {
            None => self.frames.len().checked_sub(1),
            Some(q) => {
                let simple = q.rsplit('.').next().unwrap_or(q);
                self.frames.iter().rposition(|f| f.simple_name() == simple)
            }
        };
        if let Some(i) = target {
            if !instance_reachable(&self.frames, i) {
                self.report(Category::StaticContextViolation, "Cannot use this in a static context", t.span);
            }
        }
    }

    /// Resolve a simple name: locals and fields outward, then static
    /// imports, then (as a qualifier) types and packages
    fn identifier(&mut self, id: &IdentifierExpr, position: Position) -> Option<Resolution> {
        let name = id.name.as_str();
        let mut frame_idx = self.frames.len();
        let mut crossed_lambda = false;
        let mut crossed_type = false;
        let mut outside_guard = false;
        let scopes: Vec<ScopeId> = self.out.arena.ancestors(self.scope).collect();
        for s in scopes {
            let kind = self.out.arena.get(s).kind.clone();
            if let ScopeKind::Type { .. } = kind {
                let Some(i) = frame_idx.checked_sub(1) else { break };
                frame_idx = i;
                if let Some(found) = find_field(self.index, &self.frames[i].this_type(), name) {
                    let fref = FieldRef { owner: found.owner.name.clone(), field: found.field, ty: found.ty };
                    self.check_field_use(&fref, i, id.span, position, Access::Simple);
                    let res = Resolution::Field(fref);
                    self.out.resolutions.insert(id.id, res.clone());
                    return Some(res);
                }
                crossed_type = true;
                continue;
            }
            if let Some(sym) = self.out.arena.local(s, name) {
                if self.out.symbols.get(sym).kind != SymbolKind::Type {
                    if crossed_lambda || crossed_type {
                        self.deferred.push(Deferred { symbol: sym, span: id.span, kind: DeferredKind::Capture });
                    } else if outside_guard {
                        self.deferred.push(Deferred { symbol: sym, span: id.span, kind: DeferredKind::Guard });
                    }
                    let res = Resolution::Local(sym);
                    self.out.resolutions.insert(id.id, res.clone());
                    return Some(res);
                }
            }
            if Some(s) == self.guard_floor {
                outside_guard = true;
            }
            if kind == ScopeKind::Lambda {
                crossed_lambda = true;
            }
        }

        if let Some(fref) = self.static_import_field(name) {
            let res = Resolution::Field(fref);
            self.out.resolutions.insert(id.id, res.clone());
            return Some(res);
        }
        if position == Position::CaseConstant {
            self.out.unresolved_case_names.insert(id.id);
            return None;
        }
        if position == Position::Qualifier {
            if let Some(ty) = self.names.resolve_simple(name, &self.name_scope) {
                let res = Resolution::Type(ty);
                self.out.resolutions.insert(id.id, res.clone());
                return Some(res);
            }
            if self.index.has_package(name) || is_platform_name(&format!("{}.", name)) {
                let res = Resolution::Package(name.to_string());
                self.out.resolutions.insert(id.id, res.clone());
                return Some(res);
            }
        }
        if self.may_be_hidden(name, position) {
            return None;
        }
        let message = if position == Position::Qualifier {
            format!("{} cannot be resolved", name)
        } else {
            format!("{} cannot be resolved to a variable", name)
        };
        self.report(Category::UnresolvedName, message, id.span);
        None
    }

    /// Qualified names: packages, nested types, static fields; value
    /// receivers are left to the checker
    fn field_access(&mut self, fa: &FieldAccessExpr, position: Position) -> Option<Resolution> {
        let target = match fa.target.as_ref() {
            Expr::Identifier(id) => self.identifier(id, Position::Qualifier),
            Expr::FieldAccess(inner) => self.field_access(inner, Position::Qualifier),
            Expr::This(t) if t.qualifier.is_none() => {
                self.this_expr(t);
                let n = self.frames.len().checked_sub(1)?;
                let found = find_field(self.index, &self.frames[n].this_type(), &fa.name)?;
                let fref = FieldRef { owner: found.owner.name.clone(), field: found.field, ty: found.ty };
                self.check_field_use(&fref, n, fa.span, position, Access::This);
                let res = Resolution::Field(fref);
                self.out.resolutions.insert(fa.id, res.clone());
                return Some(res);
            }
            other => {
                self.expr(other);
                return None;
            }
        };
        let res = match target? {
            Resolution::Package(p) => {
                let qualified = format!("{}.{}", p, fa.name);
                if let Some(key) = find_qualified(self.index, &qualified) {
                    Resolution::Type(Type::class(key))
                } else if self.index.has_package(&qualified) {
                    Resolution::Package(qualified)
                } else if is_platform_name(&qualified) {
                    if fa.name.starts_with(|c: char| c.is_ascii_uppercase()) {
                        Resolution::Type(Type::class(qualified))
                    } else {
                        Resolution::Package(qualified)
                    }
                } else {
                    self.report(Category::UnresolvedName, format!("{} cannot be resolved", qualified), fa.span);
                    return None;
                }
            }
            Resolution::Type(ty) => {
                let key = ty.class_name()?.to_string();
                self.index.resolve_type(&key)?;
                if let Some(found) = find_field(self.index, &Type::class(key.clone()), &fa.name) {
                    let fref = FieldRef { owner: found.owner.name.clone(), field: found.field, ty: found.ty };
                    if !fref.field.is_static {
                        self.report(
                            Category::StaticContextViolation,
                            format!("Cannot make a static reference to the non-static field {}", fa.name),
                            fa.span,
                        );
                    } else if let Some(n) = self.frames.len().checked_sub(1) {
                        self.check_field_use(&fref, n, fa.span, position, Access::TypeName);
                    }
                    Resolution::Field(fref)
                } else if let Some(member) = find_member_type(self.index, &key, &fa.name) {
                    Resolution::Type(Type::class(member))
                } else {
                    return None;
                }
            }
            Resolution::Local(_) | Resolution::Field(_) => return None,
        };
        self.out.resolutions.insert(fa.id, res.clone());
        Some(res)
    }

    /// Static context, enum initializer and forward reference rules for a
    /// field reached through frame `i`
    fn check_field_use(&mut self, fref: &FieldRef, i: usize, span: Span, position: Position, access: Access) {
        let name = &fref.field.name;
        if access == Access::Simple && !fref.field.is_static && !instance_reachable(&self.frames, i) {
            self.report(
                Category::StaticContextViolation,
                format!("Cannot make a static reference to the non-static field {}", name),
                span,
            );
            return;
        }
        if fref.field.is_static && !fref.field.is_constant {
            if let Some(e) = self.frames.iter().rposition(|f| f.key == fref.owner && f.is_enum()) {
                let nested = &self.frames[e + 1..];
                let in_initializer = self.frames[e].member.is_instance_initializer()
                    && nested.iter().all(|f| !f.is_static_type && !f.member.is_static());
                if in_initializer {
                    self.report(
                        Category::IllegalStaticReferenceInInitializer,
                        format!(
                            "Cannot refer to the static enum field {}.{} within an initializer",
                            Type::simple_name_of(&fref.owner),
                            name
                        ),
                        span,
                    );
                    return;
                }
            }
        }
        let Some(innermost) = self.frames.last() else { return };
        if position == Position::AssignTarget || innermost.key != fref.owner {
            return;
        }
        if access == Access::Simple && i + 1 != self.frames.len() {
            return;
        }
        let same_staticness = if fref.field.is_static {
            matches!(innermost.member, MemberKind::StaticFieldInit | MemberKind::StaticInit)
        } else {
            matches!(innermost.member, MemberKind::InstanceFieldInit | MemberKind::InstanceInit)
        };
        if !same_staticness {
            return;
        }
        let declared_later = innermost.field_offsets.get(name).map(|&o| o > span.start.offset).unwrap_or(false);
        let self_reference = matches!(innermost.member, MemberKind::StaticFieldInit | MemberKind::InstanceFieldInit)
            && innermost.initializing.as_deref() == Some(name.as_str());
        if declared_later || self_reference {
            self.report(Category::ForwardReference, "Cannot reference a field before it is defined", span);
        }
    }

    fn static_import_field(&self, name: &str) -> Option<FieldRef> {
        for import in self.names.imports.iter().filter(|i| i.is_static) {
            let owner = if import.is_wildcard {
                import.name.clone()
            } else if import.simple_name() == name {
                import.name.rsplit_once('.').map(|(o, _)| o.to_string())?
            } else {
                continue;
            };
            let Some(key) = find_qualified(self.index, &owner) else { continue };
            if let Some(found) = find_field(self.index, &Type::class(key), name) {
                if found.field.is_static {
                    return Some(FieldRef { owner: found.owner.name.clone(), field: found.field, ty: found.ty });
                }
            }
        }
        None
    }

    /// Whether an unresolved name may still exist somewhere the index cannot see
    fn may_be_hidden(&self, name: &str, position: Position) -> bool {
        if self.frames.iter().any(|f| !hierarchy_complete(self.index, &f.key)) {
            return true;
        }
        let static_hidden = self.names.imports.iter().filter(|i| i.is_static).any(|i| {
            let owner = if i.is_wildcard {
                Some(i.name.as_str())
            } else if i.simple_name() == name {
                i.name.rsplit_once('.').map(|(o, _)| o)
            } else {
                None
            };
            owner.map(|o| is_platform_name(o) || find_qualified(self.index, o).is_none()).unwrap_or(false)
        });
        static_hidden || (position == Position::Qualifier && self.names.has_opaque_imports())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::parser::parse_source;
    use crate::wash::classpath::{CompositeIndex, JdkClassPath};
    use crate::wash::enter::enter_units;

    fn bind(source: &str) -> (Bindings, Vec<Diagnostic>) {
        let config = Config::default();
        let (unit, parse_errors) = parse_source(source, &config);
        assert!(parse_errors.is_empty(), "{:?}", parse_errors);
        let jdk: Arc<dyn ClassPath> = Arc::new(JdkClassPath::new());
        let sources = enter_units(&[("T.java", &unit)], jdk.clone());
        let index = CompositeIndex::new(vec![Arc::new(sources.clone()), jdk]);
        let ctx = Context { config: &config, sources: &sources, index: &index, file: "T.java" };
        bind_scopes(&unit, &ctx)
    }

    fn messages(source: &str) -> Vec<String> {
        bind(source).1.into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn resolves_locals_and_fields() {
        let (b, diags) = bind("class T { int f; void m(int p) { int x = p + f; x++; } }");
        assert!(diags.is_empty(), "{:?}", diags);
        let x = b.symbols.iter().find(|(_, s)| s.name == "x").map(|(_, s)| s.clone());
        let x = x.expect("local x");
        assert_eq!(x.kind, SymbolKind::Local);
        assert_eq!(x.assignments.len(), 1);
        assert!(b.resolutions.values().any(|r| matches!(r, Resolution::Field(f) if f.field.name == "f")));
    }

    #[test]
    fn unresolved_variable() {
        assert_eq!(messages("class T { void m() { int x = y; } }"), vec!["y cannot be resolved to a variable"]);
    }

    #[test]
    fn static_context_field() {
        assert_eq!(
            messages("class T { int f; static void m() { int x = f; } }"),
            vec!["Cannot make a static reference to the non-static field f"]
        );
        assert_eq!(messages("class T { static void m() { Object o = this; } }"), vec!["Cannot use this in a static context"]);
    }

    #[test]
    fn forward_reference() {
        assert_eq!(
            messages("class T { static int a = b; static int b = 1; }"),
            vec!["Cannot reference a field before it is defined"]
        );
        assert!(messages("class T { static { b = 2; } static int b = 1; }").is_empty());
    }

    #[test]
    fn duplicate_locals() {
        assert_eq!(messages("class T { void m(int a) { int a = 1; } }"), vec!["Duplicate local variable a"]);
        assert_eq!(
            messages("class T { void m() { int a = 1; Runnable r = () -> { int a = 2; }; } }"),
            vec!["Lambda expression's local variable a cannot redeclare another local variable defined in an enclosing scope. "]
        );
    }

    #[test]
    fn pattern_scope_after_negated_if() {
        let src = "class T { void m(Object o) { if (!(o instanceof String s)) { return; } int n = s.length(); } }";
        assert!(messages(src).is_empty());
        let src = "class T { void m(Object o) { if (!(o instanceof String s)) { } int n = s.length(); } }";
        assert_eq!(messages(src), vec!["s cannot be resolved"]);
    }

    #[test]
    fn captured_locals_must_be_effectively_final() {
        let src = "class T { void m() { int x = 1; x = 2; Runnable r = () -> System.out.println(x); } }";
        assert_eq!(
            messages(src),
            vec!["Local variable x defined in an enclosing scope must be final or effectively final"]
        );
    }

    #[test]
    fn enum_static_field_in_constructor() {
        let src = "enum E { A; static int count; E() { count++; } }";
        assert_eq!(messages(src), vec!["Cannot refer to the static enum field E.count within an initializer"]);
    }

    #[test]
    fn raw_type_warning() {
        let src = "import java.util.List; class T { List l; }";
        assert_eq!(
            messages(src),
            vec!["List is a raw type. References to generic type List<E> should be parameterized"]
        );
    }
}
