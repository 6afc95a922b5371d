//! Attribution
//!
//! Types every expression of a bound compilation unit and applies the rules
//! that need those types: method and constructor resolution, assignment
//! compatibility, final variables, overriding, abstract coverage, duplicate
//! members and switch labels. Results are recorded in [`Bindings`] for the
//! shape planner.

use std::collections::HashMap;

use super::bind::{Bindings, FieldRef, MethodTarget, Resolution};
use super::classpath::{
    find_field, find_methods, find_qualified, unimplemented_abstract_methods, ClassPath, MethodInfo, TypeDescriptor,
};
use super::enter::{is_platform_name, SourceIndex, TypeNames};
use super::enums::{check_enum, duplicate_members, EnumFacts, Placement};
use super::flow::{
    block_can_complete_normally, constant_value, is_constant_expression, statements_can_complete_normally,
};
use super::overload::{constructor_failure, method_failure, return_type, select, unchecked_raw_call, Selection};
use super::scope::{instance_reachable, top_level_of, MemberKind, SymbolId, TypeFrame};
use super::switches::{check_switch, CaseInfo, GuardInfo, LabelInfo, LabelKind, SwitchInfo};
use super::types::{as_super, hierarchy_complete, is_assignable, is_subtype, promote, type_list, PrimitiveKind, Type};
use super::Context;
use crate::ast::{
    has_annotation, ArrayInit, AssignmentOp, AstNode, BinaryOp, Block, CaseBody, CaseLabelElement, ClassBody,
    ClassMember, CompilationUnit, ConstantBody, ConstructorDecl, CtorCallKind, EnumDecl, Expr, FieldAccessExpr,
    InitializerBlock, LambdaBody, Literal, MethodCallExpr, MethodDecl, MethodRefTarget, Modifier, NewExpr, NodeId, Parameter,
    Pattern, Span, Stmt, SwitchBlock, TryResource, TypeDecl, TypeKind, TypeRef, UnaryOp,
};
use crate::config::{Config, Feature};
use crate::consts::ENUM_FINAL_METHODS;
use crate::diagnostics::{Category, Diagnostic};

/// Attribute every type of `unit`
pub fn attribute(unit: &CompilationUnit, bindings: &mut Bindings, ctx: &Context<'_>) -> Vec<Diagnostic> {
    let mut attr = Attr {
        config: ctx.config,
        sources: ctx.sources,
        index: ctx.index,
        file: ctx.file,
        names: TypeNames::new(unit, ctx.index),
        b: bindings,
        diagnostics: Vec::new(),
        frames: Vec::new(),
        returns: Vec::new(),
        final_assignments: HashMap::new(),
        field_hits: HashMap::new(),
    };
    for decl in &unit.type_decls {
        let key = attr.key_for(decl.name_span().start.offset, || unit.qualify(decl.name()));
        attr.type_decl(decl, key, Placement::TopLevel);
    }
    log::trace!("attributed {} expressions", attr.b.expr_types.len());
    attr.diagnostics
}

struct Attr<'a, 'b> {
    config: &'a Config,
    sources: &'a SourceIndex,
    index: &'a dyn ClassPath,
    file: &'a str,
    names: TypeNames<'a>,
    b: &'b mut Bindings,
    diagnostics: Vec<Diagnostic>,
    frames: Vec<TypeFrame>,
    /// Result type `return` values are checked against; `None` inside lambdas
    /// and initializers
    returns: Vec<Option<Type>>,
    /// Assignments seen so far to final locals
    final_assignments: HashMap<SymbolId, usize>,
    /// Fields reached through a value receiver (`expr.f`)
    field_hits: HashMap<NodeId, FieldRef>,
}

impl<'a, 'b> Attr<'a, 'b> {
    fn report(&mut self, category: Category, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::new(category, message, span));
    }

    fn key_for(&self, offset: usize, fallback: impl FnOnce() -> String) -> String {
        self.sources.key_at(self.file, offset).map(str::to_string).unwrap_or_else(fallback)
    }

    fn ref_type(&self, t: &TypeRef) -> Type {
        self.b.type_of_ref(t).cloned().unwrap_or(Type::Unknown)
    }

    fn param_type(&self, p: &Parameter) -> Type {
        let ty = self.ref_type(&p.type_ref);
        if p.varargs && !ty.is_unknown() {
            Type::array_of(ty, 1)
        } else {
            ty
        }
    }

    fn method_params(&self, members: &[ClassMember]) -> Vec<Vec<Type>> {
        members
            .iter()
            .filter_map(|m| match m {
                ClassMember::Method(md) => Some(md.parameters.iter().map(|p| self.param_type(p)).collect()),
                _ => None,
            })
            .collect()
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

    fn same_top_level(&self, key: &str) -> bool {
        self.frames.first().map(|f| top_level_of(&f.key) == top_level_of(key)).unwrap_or(false)
    }

    /// Whether a name the index cannot find may still be declared somewhere
    /// it cannot see
    fn may_be_hidden(&self, name: &str) -> bool {
        self.frames.iter().any(|f| !hierarchy_complete(self.index, &f.key))
            || self.names.imports.iter().filter(|i| i.is_static).any(|i| {
                let owner = if i.is_wildcard {
                    Some(i.name.as_str())
                } else if i.simple_name() == name {
                    i.name.rsplit_once('.').map(|(o, _)| o)
                } else {
                    None
                };
                owner.map(|o| is_platform_name(o) || find_qualified(self.index, o).is_none()).unwrap_or(false)
            })
    }

    // ---- declarations ----

    fn type_decl(&mut self, decl: &TypeDecl, key: String, placement: Placement) {
        let desc = self.index.resolve_type(&key);
        let constants = decl.as_enum().map(|e| e.constants.as_slice()).unwrap_or(&[]);
        let mut frame = TypeFrame::new(key.clone(), desc.clone(), decl.members(), constants);
        if let TypeDecl::Record(r) = decl {
            frame = frame.with_blank_finals(r.components.iter().map(|c| c.name.clone()));
        }
        self.frames.push(frame);
        let method_params = self.method_params(decl.members());
        match decl {
            TypeDecl::Enum(e) => {
                let body_keys: Vec<Option<String>> = e
                    .constants
                    .iter()
                    .map(|c| c.body.as_body().and_then(|b| self.sources.key_at(self.file, b.span.start.offset)).map(str::to_string))
                    .collect();
                let facts = EnumFacts { key: &key, placement, method_params: &method_params, body_keys: &body_keys };
                let found = check_enum(e, &facts, self.index);
                self.diagnostics.extend(found);
            }
            _ => {
                let found = duplicate_members(decl.name(), decl.members(), &[], &method_params, &[]);
                self.diagnostics.extend(found);
                let concrete = desc.as_ref().map(|d| !d.is_abstract).unwrap_or(false);
                if concrete && matches!(decl.kind(), TypeKind::Class | TypeKind::Record) {
                    self.must_implement(decl.name(), &key, decl.name_span());
                }
            }
        }
        self.override_rules(decl.members(), &method_params, &key, decl.name(), decl.kind() == TypeKind::Enum);
        self.inner_static_members(decl.members());
        if let TypeDecl::Enum(e) = decl {
            self.enum_constants(e, &key);
        }
        self.members(decl.members(), &key);
        self.frames.pop();
    }

    /// Body of an anonymous class or an enum constant
    fn class_body(&mut self, body: &ClassBody, key: String, display: &str, check_abstract: bool) {
        let desc = self.index.resolve_type(&key);
        self.frames.push(TypeFrame::new(key.clone(), desc, &body.members, &[]));
        let method_params = self.method_params(&body.members);
        let found = duplicate_members(display, &body.members, &[], &method_params, &[]);
        self.diagnostics.extend(found);
        if check_abstract {
            self.must_implement(display, &key, body.span);
        }
        self.override_rules(&body.members, &method_params, &key, display, false);
        self.inner_static_members(&body.members);
        self.members(&body.members, &key);
        self.frames.pop();
    }

    fn must_implement(&mut self, display: &str, key: &str, span: Span) {
        let Some(missing) = unimplemented_abstract_methods(self.index, key) else { return };
        for m in missing.iter().filter(|m| m.owner != key) {
            self.report(
                Category::MustImplementAbstractMethod,
                format!(
                    "The type {} must implement the inherited abstract method {}.{}",
                    display,
                    Type::simple_name_of(&m.owner),
                    m.signature()
                ),
                span,
            );
        }
    }

    /// Final methods and missing `@Override` for every instance method that
    /// overrides a supertype method
    fn override_rules(&mut self, members: &[ClassMember], method_params: &[Vec<Type>], key: &str, display: &str, is_enum: bool) {
        let Some(desc) = self.index.resolve_type(key) else { return };
        let supers: Vec<Type> = desc.superclass.iter().chain(desc.interfaces.iter()).cloned().collect();
        let methods = members.iter().filter_map(|m| match m {
            ClassMember::Method(md) => Some(md),
            _ => None,
        });
        for (m, params) in methods.zip(method_params) {
            if m.is_static() || m.modifiers.contains(&Modifier::Private) {
                continue;
            }
            if is_enum && ENUM_FINAL_METHODS.iter().any(|(n, arity)| *n == m.name && *arity == params.len()) {
                continue;
            }
            let erased: Vec<Type> = params.iter().map(Type::erasure).collect();
            if erased.iter().any(Type::is_unknown) {
                continue;
            }
            let overridden = supers.iter().find_map(|sup| {
                let (candidates, _) = find_methods(self.index, sup, &m.name);
                candidates.into_iter().find(|c| !c.is_static && !c.is_private && c.erased_params() == erased)
            });
            let Some(overridden) = overridden else { continue };
            if overridden.is_final {
                self.report(
                    Category::CannotOverrideFinalMethod,
                    format!("Cannot override the final method from {}", Type::simple_name_of(&overridden.owner)),
                    m.name_span,
                );
                continue;
            }
            if has_annotation(&m.annotations, "Override") {
                continue;
            }
            let from_interface =
                self.index.resolve_type(&overridden.owner).map(|d| d.is_interface()).unwrap_or(false);
            if from_interface && (desc.is_interface() || !self.config.allows(Feature::OverrideOnInterfaceMethods)) {
                continue;
            }
            let what = if from_interface { "a superinterface method" } else { "a superclass method" };
            self.report(
                Category::MissingOverrideAnnotation,
                format!(
                    "The method {}({}) of type {} should be tagged with @Override since it actually overrides {}",
                    m.name,
                    type_list(params),
                    display,
                    what
                ),
                m.name_span,
            );
        }
    }

    /// Inner types cannot declare static members before static members in
    /// inner types were allowed, except constant fields
    fn inner_static_members(&mut self, members: &[ClassMember]) {
        if self.config.allows(Feature::StaticMembersInInnerTypes) {
            return;
        }
        let inner = self.frames.len() > 1 && self.frames.last().map(|f| !f.is_static_type).unwrap_or(false);
        if !inner {
            return;
        }
        for m in members {
            match m {
                ClassMember::Field(f) if f.is_static() => {
                    let constant = f.is_final()
                        && (self.ref_type(&f.type_ref).is_primitive() || self.ref_type(&f.type_ref).is_string())
                        && f.initializer.as_ref().map(|i| is_constant_expression(i, &|_| true)).unwrap_or(false);
                    if !constant {
                        self.report(
                            Category::IllegalStaticMemberInInnerType,
                            format!(
                                "The field {} cannot be declared static in a non-static inner type, unless initialized with a constant expression",
                                f.name
                            ),
                            f.name_span,
                        );
                    }
                }
                ClassMember::Method(md) if md.is_static() => {
                    self.report(
                        Category::IllegalStaticMemberInInnerType,
                        format!(
                            "The method {} cannot be declared static; static methods can only be declared in a static or top level type",
                            md.name
                        ),
                        md.name_span,
                    );
                }
                _ => {}
            }
        }
    }

    fn enum_constants(&mut self, e: &EnumDecl, key: &str) {
        let ctors = self.index.resolve_type(key).map(|d| d.constructors.clone()).unwrap_or_default();
        let simple = e.name.clone();
        self.with_member(MemberKind::StaticFieldInit, |a| {
            for c in &e.constants {
                let args: Vec<Type> = c.arguments().iter().map(|x| a.expr(x)).collect();
                if !ctors.is_empty() && !args.iter().any(mentions_unknown) {
                    let selection = select(a.index, &ctors, &args);
                    if let Some(message) = constructor_failure(&selection, &simple, &args) {
                        a.report(Category::UndefinedMethod, message, c.name_span);
                    }
                }
                if let ConstantBody::WithBody(body) = &c.body {
                    let body_key = a.key_for(body.span.start.offset, || format!("{}$", key));
                    a.class_body(body, body_key, &simple, false);
                }
            }
        });
    }

    fn members(&mut self, members: &[ClassMember], owner: &str) {
        let interface = self.frames.last().map(|f| f.is_interface()).unwrap_or(false);
        for m in members {
            match m {
                ClassMember::Field(f) => {
                    let kind = if f.is_static() || interface { MemberKind::StaticFieldInit } else { MemberKind::InstanceFieldInit };
                    let declared = self
                        .frames
                        .last()
                        .and_then(|fr| fr.desc.as_ref())
                        .and_then(|d| d.field(&f.name))
                        .map(|fi| fi.ty.clone())
                        .unwrap_or_else(|| self.ref_type(&f.type_ref));
                    if let Some(init) = &f.initializer {
                        self.with_member(kind, |a| {
                            a.returns.push(None);
                            a.initializer(&declared, init);
                            a.returns.pop();
                        });
                    }
                }
                ClassMember::Method(md) => self.method(md),
                ClassMember::Constructor(c) => self.constructor(c),
                ClassMember::Initializer(i) => self.initializer_block(i),
                ClassMember::TypeDecl(t) => {
                    let key = self.key_for(t.name_span().start.offset, || format!("{}${}", owner, t.name()));
                    self.with_member(MemberKind::Body, |a| a.type_decl(t, key, Placement::Member));
                }
            }
        }
    }

    fn method(&mut self, m: &MethodDecl) {
        let kind = if m.is_static() { MemberKind::StaticMethod } else { MemberKind::InstanceMethod };
        let ret = m.return_type.as_ref().map(|t| self.ref_type(t)).unwrap_or(Type::Void);
        self.returns.push(Some(ret));
        self.with_member(kind, |a| {
            if let Some(body) = &m.body {
                a.block(body);
            }
            if let Some(default) = &m.default_value {
                a.expr(default);
            }
        });
        self.returns.pop();
    }

    fn constructor(&mut self, c: &ConstructorDecl) {
        self.returns.push(Some(Type::Void));
        self.with_member(MemberKind::Constructor, |a| {
            if let Some(inv) = &c.explicit_invocation {
                let args: Vec<Type> = inv.arguments.iter().map(|x| a.expr(x)).collect();
                a.explicit_invocation(inv.kind, &args, inv.span);
            }
            a.block(&c.body);
        });
        self.returns.pop();
    }

    /// `this(...)` and `super(...)` resolve against the own or the superclass
    /// constructors
    fn explicit_invocation(&mut self, kind: CtorCallKind, args: &[Type], span: Span) {
        let Some(desc) = self.frames.last().and_then(|f| f.desc.clone()) else { return };
        if desc.is_enum() || args.iter().any(mentions_unknown) {
            return;
        }
        let target = match kind {
            CtorCallKind::This => Some(desc),
            CtorCallKind::Super => desc.superclass.as_ref().and_then(|s| s.class_name()).and_then(|n| self.index.resolve_type(n)),
        };
        let Some(target) = target else { return };
        if target.constructors.is_empty() {
            return;
        }
        let selection = select(self.index, &target.constructors, args);
        if let Some(message) = constructor_failure(&selection, &target.simple_name(), args) {
            self.report(Category::UndefinedMethod, message, span);
        }
    }

    fn initializer_block(&mut self, i: &InitializerBlock) {
        let kind = if i.is_static { MemberKind::StaticInit } else { MemberKind::InstanceInit };
        self.returns.push(None);
        self.with_member(kind, |a| a.block(&i.body));
        self.returns.pop();
    }

    // ---- statements ----

    fn block(&mut self, b: &Block) {
        self.statements(&b.statements);
    }

    fn statements(&mut self, statements: &[Stmt]) {
        for s in statements {
            self.stmt(s);
        }
    }

    fn stmt(&mut self, s: &Stmt) {
        match s {
            Stmt::Expression(e) => {
                self.expr(&e.expr);
            }
            Stmt::Declaration(d) => {
                for v in &d.variables {
                    let sym = self.b.symbol_declared_at(v.name_span);
                    let Some(init) = &v.initializer else { continue };
                    if d.type_ref.is_var() && v.array_dims == 0 && self.ref_type(&d.type_ref).is_unknown() {
                        let ty = self.expr(init);
                        if let Some(sym) = sym {
                            self.b.symbols.get_mut(sym).ty = ty;
                        }
                    } else {
                        let declared = sym.map(|s| self.b.symbols.get(s).ty.clone()).unwrap_or(Type::Unknown);
                        self.initializer(&declared, init);
                    }
                }
            }
            Stmt::TypeDecl(t) => {
                let key = self.key_for(t.name_span().start.offset, || t.name().to_string());
                self.detached(|a| a.type_decl(t, key, Placement::Local));
            }
            Stmt::If(i) => {
                self.condition(&i.condition);
                self.stmt(&i.then_branch);
                if let Some(e) = &i.else_branch {
                    self.stmt(e);
                }
            }
            Stmt::While(w) => {
                self.condition(&w.condition);
                self.stmt(&w.body);
            }
            Stmt::DoWhile(d) => {
                self.stmt(&d.body);
                self.condition(&d.condition);
            }
            Stmt::For(f) => {
                self.statements(&f.init);
                if let Some(c) = &f.condition {
                    self.condition(c);
                }
                for u in &f.update {
                    self.expr(u);
                }
                self.stmt(&f.body);
            }
            Stmt::ForEach(f) => {
                let iterable = self.expr(&f.iterable);
                let element = self.element_type(&iterable);
                if let Some(sym) = self.b.symbol_declared_at(f.name_span) {
                    if f.type_ref.is_var() && self.ref_type(&f.type_ref).is_unknown() {
                        self.b.symbols.get_mut(sym).ty = element;
                    } else {
                        let declared = self.b.symbols.get(sym).ty.clone();
                        if !element.is_unknown() && is_assignable(self.index, &element, &declared) == Some(false) {
                            self.report(
                                Category::TypeMismatch,
                                format!("Type mismatch: cannot convert from element type {} to {}", element, declared),
                                f.iterable.span(),
                            );
                        }
                    }
                }
                self.stmt(&f.body);
            }
            Stmt::Switch(sw) => {
                self.switch_block(sw, false);
            }
            Stmt::Return(r) => {
                if let Some(v) = &r.value {
                    let ty = self.expr(v);
                    if let Some(Some(expected)) = self.returns.last().cloned() {
                        if expected != Type::Void {
                            self.check_assignable(&ty, &expected, v);
                        }
                    }
                }
            }
            Stmt::Yield(y) => {
                self.expr(&y.value);
            }
            Stmt::Throw(t) => {
                self.expr(&t.expr);
            }
            Stmt::Assert(a) => {
                self.condition(&a.condition);
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
                for r in &t.resources {
                    match r {
                        TryResource::Var { type_ref, name_span, initializer, .. } => {
                            let sym = self.b.symbol_declared_at(*name_span);
                            if type_ref.is_var() && self.ref_type(type_ref).is_unknown() {
                                let ty = self.expr(initializer);
                                if let Some(sym) = sym {
                                    self.b.symbols.get_mut(sym).ty = ty;
                                }
                            } else {
                                let declared = self.ref_type(type_ref);
                                self.initializer(&declared, initializer);
                            }
                        }
                        TryResource::Expr { expr, .. } => {
                            self.expr(expr);
                        }
                    }
                }
                self.block(&t.try_block);
                for c in &t.catch_clauses {
                    self.block(&c.block);
                }
                if let Some(f) = &t.finally_block {
                    self.block(f);
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) => {}
        }
    }

    /// Nested type bodies check `return` against their own methods only
    fn detached<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let returns = std::mem::take(&mut self.returns);
        let r = f(self);
        self.returns = returns;
        r
    }

    fn element_type(&self, iterable: &Type) -> Type {
        if let Some(e) = iterable.element() {
            return e.clone();
        }
        match as_super(self.index, iterable, "java.lang.Iterable") {
            Some(Type::Class { args, .. }) => match args.first() {
                Some(Type::Wildcard) | None => Type::Unknown,
                Some(arg) => arg.clone(),
            },
            _ => Type::Unknown,
        }
    }

    fn condition(&mut self, e: &Expr) {
        let ty = self.expr(e);
        if is_assignable(self.index, &ty, &Type::boolean()) == Some(false) {
            self.report(Category::TypeMismatch, format!("Type mismatch: cannot convert from {} to boolean", ty), e.span());
        }
    }

    /// Variable initializer, including nested array initializers
    fn initializer(&mut self, target: &Type, init: &Expr) {
        match init {
            Expr::ArrayInitializer(ai) => self.array_init(target, ai),
            _ => {
                let ty = self.expr(init);
                self.check_assignable(&ty, target, init);
            }
        }
    }

    fn array_init(&mut self, target: &Type, init: &ArrayInit) {
        let element = target.element().cloned().unwrap_or(Type::Unknown);
        for el in &init.elements {
            self.initializer(&element, el);
        }
    }

    fn check_assignable(&mut self, from: &Type, to: &Type, value: &Expr) {
        if is_assignable(self.index, from, to) != Some(false) || self.constant_narrowing(from, to, value) {
            return;
        }
        self.report(Category::TypeMismatch, format!("Type mismatch: cannot convert from {} to {}", from, to), value.span());
    }

    /// An int constant fits a byte, short or char variable when its value
    /// is in range
    fn constant_narrowing(&self, from: &Type, to: &Type, value: &Expr) -> bool {
        let Type::Primitive(source) = from else { return false };
        if !matches!(source, PrimitiveKind::Int | PrimitiveKind::Short | PrimitiveKind::Char | PrimitiveKind::Byte) {
            return false;
        }
        let target = match to {
            Type::Primitive(p) => *p,
            Type::Class { .. } => match to.unboxed() {
                Some(p @ (PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Char)) => p,
                _ => return false,
            },
            _ => return false,
        };
        let range = match target {
            PrimitiveKind::Byte => -128..=127,
            PrimitiveKind::Short => -32768..=32767,
            PrimitiveKind::Char => 0..=65535,
            _ => return false,
        };
        match constant_value(value).and_then(|v| v.as_i64()) {
            Some(v) => range.contains(&v),
            None => is_constant_expression(value, &|_| true),
        }
    }

    // ---- expressions ----

    fn expr(&mut self, e: &Expr) -> Type {
        match e {
            Expr::Literal(l) => match &l.value {
                Literal::Int(_) => Type::int(),
                Literal::Long(_) => Type::Primitive(PrimitiveKind::Long),
                Literal::Float(_) => Type::Primitive(PrimitiveKind::Float),
                Literal::Double(_) => Type::Primitive(PrimitiveKind::Double),
                Literal::Boolean(_) => Type::boolean(),
                Literal::Char(_) => Type::Primitive(PrimitiveKind::Char),
                Literal::String(_) => Type::string(),
                Literal::Null => Type::Null,
            },
            Expr::Identifier(id) => {
                let ty = match self.b.resolution(id.id).cloned() {
                    Some(Resolution::Local(sym)) => self.b.symbols.get(sym).ty.clone(),
                    Some(Resolution::Field(f)) => {
                        self.deprecated_field(&f, id.span);
                        f.ty
                    }
                    _ => Type::Unknown,
                };
                self.b.expr_types.insert(id.id, ty.clone());
                ty
            }
            Expr::FieldAccess(fa) => {
                let ty = self.field_access(fa);
                self.b.expr_types.insert(fa.id, ty.clone());
                ty
            }
            Expr::MethodCall(mc) => {
                let ty = self.method_call(mc);
                self.b.expr_types.insert(mc.id, ty.clone());
                ty
            }
            Expr::Binary(b) => {
                let left = self.expr(&b.left);
                let right = self.expr(&b.right);
                binary_type(b.operator, &left, &right)
            }
            Expr::Unary(u) => {
                let operand = self.expr(&u.operand);
                match u.operator {
                    UnaryOp::Not => Type::boolean(),
                    op if op.is_increment() => {
                        self.final_assignment(&u.operand, true);
                        operand
                    }
                    _ => match operand.unboxed() {
                        Some(p) if p.is_numeric() => Type::Primitive(promote(p, PrimitiveKind::Int)),
                        _ => Type::Unknown,
                    },
                }
            }
            Expr::Assignment(a) => {
                let target = self.expr(&a.target);
                let value = self.expr(&a.value);
                self.final_assignment(&a.target, a.operator != AssignmentOp::Assign);
                if a.operator == AssignmentOp::Assign {
                    self.check_assignable(&value, &target, &a.value);
                }
                target
            }
            Expr::ArrayAccess(a) => {
                let array = self.expr(&a.array);
                self.expr(&a.index);
                array.element().cloned().unwrap_or(Type::Unknown)
            }
            Expr::Cast(c) => {
                self.expr(&c.expr);
                self.ref_type(&c.target_type)
            }
            Expr::InstanceOf(i) => {
                self.expr(&i.expr);
                Type::boolean()
            }
            Expr::Conditional(c) => {
                self.condition(&c.condition);
                let then = self.expr(&c.then_expr);
                let other = self.expr(&c.else_expr);
                self.conditional_type(then, other)
            }
            Expr::New(n) => self.new_expr(n),
            Expr::NewArray(n) => {
                for d in &n.dimensions {
                    self.expr(d);
                }
                let element = self.ref_type(&n.element_type);
                let ty = if element.is_unknown() {
                    Type::Unknown
                } else {
                    Type::array_of(element, n.dimensions.len() + n.extra_dims)
                };
                if let Some(init) = &n.initializer {
                    self.array_init(&ty, init);
                }
                ty
            }
            Expr::ArrayInitializer(init) => {
                for el in &init.elements {
                    self.expr(el);
                }
                Type::Unknown
            }
            Expr::Lambda(l) => {
                self.returns.push(None);
                match &l.body {
                    LambdaBody::Expr(body) => {
                        self.expr(body);
                    }
                    LambdaBody::Block(body) => self.block(body),
                }
                self.returns.pop();
                Type::Unknown
            }
            Expr::MethodRef(m) => {
                if let MethodRefTarget::Expr(target) = &m.target {
                    if !self.names_type(target) {
                        self.expr(target);
                    }
                }
                Type::Unknown
            }
            Expr::Switch(sw) => {
                self.switch_block(sw, true);
                Type::Unknown
            }
            Expr::This(t) => {
                let frame = match &t.qualifier {
                    None => self.frames.last(),
                    Some(q) => {
                        let simple = q.rsplit('.').next().unwrap_or(q);
                        self.frames.iter().rev().find(|f| f.simple_name() == simple)
                    }
                };
                frame.map(TypeFrame::this_type).unwrap_or(Type::Unknown)
            }
            Expr::Super(_) => self
                .frames
                .last()
                .and_then(|f| f.desc.as_ref())
                .and_then(|d| d.superclass.clone())
                .unwrap_or_else(Type::object),
            Expr::ClassLiteral(c) => {
                let arg = match self.ref_type(&c.type_ref) {
                    Type::Void => Type::class("java.lang.Void"),
                    other => other.boxed(),
                };
                Type::Class { name: "java.lang.Class".to_string(), args: vec![arg] }
            }
            Expr::Parenthesized(p) => self.expr(&p.expr),
            Expr::Erroneous(_) => Type::Unknown,
        }
    }

    /// Whether a qualifier was bound as a type or package name
    fn names_type(&self, e: &Expr) -> bool {
        let id = match e {
            Expr::Identifier(i) => i.id,
            Expr::FieldAccess(fa) => fa.id,
            _ => return false,
        };
        matches!(self.b.resolution(id), Some(Resolution::Type(_)) | Some(Resolution::Package(_)))
    }

    fn conditional_type(&self, then: Type, other: Type) -> Type {
        if then == other {
            return then;
        }
        match (&then, &other) {
            (Type::Null, t) | (t, Type::Null) => t.boxed(),
            _ => match (then.unboxed(), other.unboxed()) {
                (Some(a), Some(b)) if a.is_numeric() && b.is_numeric() => Type::Primitive(promote(a, b)),
                _ if is_subtype(self.index, &then, &other) == Some(true) => other,
                _ if is_subtype(self.index, &other, &then) == Some(true) => then,
                _ => Type::Unknown,
            },
        }
    }

    fn deprecated_field(&mut self, f: &FieldRef, span: Span) {
        if f.field.is_deprecated && !self.same_top_level(&f.owner) {
            self.report(
                Category::DeprecatedUsage,
                format!("The field {}.{} is deprecated", Type::simple_name_of(&f.owner), f.field.name),
                span,
            );
        }
    }

    fn field_access(&mut self, fa: &FieldAccessExpr) -> Type {
        if let Some(res) = self.b.resolution(fa.id).cloned() {
            return match res {
                Resolution::Field(f) => {
                    self.deprecated_field(&f, fa.name_span);
                    f.ty
                }
                Resolution::Type(_) | Resolution::Package(_) | Resolution::Local(_) => Type::Unknown,
            };
        }
        let target_res = match fa.target.as_ref() {
            Expr::Identifier(id) => self.b.resolution(id.id).cloned(),
            Expr::FieldAccess(inner) => self.b.resolution(inner.id).cloned(),
            _ => None,
        };
        let target = match target_res {
            Some(Resolution::Package(_)) => return Type::Unknown,
            Some(Resolution::Type(ty)) => ty,
            _ => self.expr(&fa.target),
        };
        match &target {
            Type::Array(_) if fa.name == "length" => Type::int(),
            Type::Class { name, .. } => {
                if let Some(found) = find_field(self.index, &target, &fa.name) {
                    let fref = FieldRef { owner: found.owner.name.clone(), field: found.field, ty: found.ty };
                    self.deprecated_field(&fref, fa.name_span);
                    let ty = fref.ty.clone();
                    self.field_hits.insert(fa.id, fref);
                    return ty;
                }
                if self.index.resolve_type(name).is_some() && hierarchy_complete(self.index, name) {
                    self.report(
                        Category::UnresolvedName,
                        format!("{} cannot be resolved or is not a field", fa.name),
                        fa.name_span,
                    );
                }
                Type::Unknown
            }
            _ => Type::Unknown,
        }
    }

    // ---- final variables ----

    fn final_assignment(&mut self, target: &Expr, compound: bool) {
        match target.unparenthesized() {
            Expr::Identifier(id) => match self.b.resolution(id.id).cloned() {
                Some(Resolution::Local(sym)) => self.final_local(sym, compound, id.span),
                Some(Resolution::Field(f)) => self.final_field(&f, true, id.span),
                _ => {}
            },
            Expr::FieldAccess(fa) => {
                let via_this = matches!(fa.target.as_ref(), Expr::This(t) if t.qualifier.is_none());
                let fref = match self.b.resolution(fa.id).cloned() {
                    Some(Resolution::Field(f)) => Some(f),
                    _ => self.field_hits.get(&fa.id).cloned(),
                };
                if let Some(f) = fref {
                    self.final_field(&f, via_this, fa.span);
                }
            }
            _ => {}
        }
    }

    /// Blank finals may be assigned by simple name or `this.f` from an
    /// initializer or constructor of their own type
    fn final_field(&mut self, f: &FieldRef, direct: bool, span: Span) {
        if !f.field.is_final {
            return;
        }
        let allowed = direct
            && self.frames.last().map_or(false, |frame| {
                frame.key == f.owner
                    && frame.blank_finals.contains(&f.field.name)
                    && if f.field.is_static {
                        matches!(frame.member, MemberKind::StaticInit | MemberKind::StaticFieldInit)
                    } else {
                        matches!(frame.member, MemberKind::Constructor | MemberKind::InstanceInit | MemberKind::InstanceFieldInit)
                    }
            })
            && self.returns.last().map_or(true, |r| r.is_some() || self.in_initializer());
        if !allowed {
            self.report(
                Category::FinalFieldAssignment,
                format!("The final field {}.{} cannot be assigned", Type::simple_name_of(&f.owner), f.field.name),
                span,
            );
        }
    }

    fn in_initializer(&self) -> bool {
        self.frames.last().map(|f| f.member.is_initializer()).unwrap_or(false)
    }

    fn final_local(&mut self, sym: SymbolId, compound: bool, span: Span) {
        let symbol = self.b.symbols.get(sym);
        if !symbol.is_final() {
            return;
        }
        let has_initializer = symbol.has_initializer;
        let name = symbol.name.clone();
        let count = self.final_assignments.entry(sym).or_insert(0);
        *count += 1;
        if has_initializer || compound || *count > 1 {
            self.report(
                Category::FinalLocalAssignment,
                format!(
                    "The final local variable {} cannot be assigned. It must be blank and not using a compound assignment",
                    name
                ),
                span,
            );
        }
    }

    // ---- calls and instance creation ----

    fn method_call(&mut self, mc: &MethodCallExpr) -> Type {
        let receiver = match mc.target.as_deref() {
            None => None,
            Some(Expr::Super(_)) => {
                let sup = self.frames.last().and_then(|f| f.desc.as_ref()).and_then(|d| d.superclass.clone());
                Some((sup.unwrap_or_else(Type::object), false))
            }
            Some(target) => {
                let res = match target {
                    Expr::Identifier(id) => self.b.resolution(id.id).cloned(),
                    Expr::FieldAccess(fa) => self.b.resolution(fa.id).cloned(),
                    _ => None,
                };
                match res {
                    Some(Resolution::Type(ty)) => Some((ty, true)),
                    Some(Resolution::Package(_)) => {
                        for a in &mc.arguments {
                            self.expr(a);
                        }
                        return Type::Unknown;
                    }
                    _ => Some((self.expr(target), false)),
                }
            }
        };
        let args: Vec<Type> = mc.arguments.iter().map(|a| self.expr(a)).collect();
        match receiver {
            None => self.unqualified_call(mc, &args),
            Some((receiver, static_only)) => self.qualified_call(mc, receiver, static_only, &args),
        }
    }

    fn qualified_call(&mut self, mc: &MethodCallExpr, receiver: Type, static_only: bool, args: &[Type]) -> Type {
        let receiver = match receiver {
            Type::Array(_) if mc.name == "clone" && args.is_empty() => return receiver,
            Type::Array(_) => Type::object(),
            Type::Class { .. } => receiver,
            _ => return Type::Unknown,
        };
        let (candidates, complete) = find_methods(self.index, &receiver, &mc.name);
        let selection = select(self.index, &candidates, args);
        if let Selection::Found { method, .. } = &selection {
            if static_only && !method.is_static {
                self.report(
                    Category::StaticContextViolation,
                    format!(
                        "Cannot make a static reference to the non-static method {} from the type {}",
                        method.signature(),
                        Type::simple_name_of(&method.owner)
                    ),
                    mc.name_span,
                );
            }
            return self.after_call(mc, &receiver, method);
        }
        let known = receiver.class_name().map(|n| self.index.resolve_type(n).is_some()).unwrap_or(false);
        if candidates.is_empty() && !(complete && known) {
            return Type::Unknown;
        }
        self.call_failure(mc, &selection, &candidates, &receiver.to_string(), args);
        Type::Unknown
    }

    /// The innermost enclosing type that declares or inherits a method of
    /// the name owns the call; static imports come last
    fn unqualified_call(&mut self, mc: &MethodCallExpr, args: &[Type]) -> Type {
        let mut complete = true;
        for i in (0..self.frames.len()).rev() {
            let receiver = self.frames[i].this_type();
            let (candidates, frame_complete) = find_methods(self.index, &receiver, &mc.name);
            complete &= frame_complete;
            if candidates.is_empty() {
                continue;
            }
            let selection = select(self.index, &candidates, args);
            if let Selection::Found { method, .. } = &selection {
                if !method.is_static && !instance_reachable(&self.frames, i) {
                    self.report(
                        Category::StaticContextViolation,
                        format!(
                            "Cannot make a static reference to the non-static method {} from the type {}",
                            method.signature(),
                            Type::simple_name_of(&method.owner)
                        ),
                        mc.name_span,
                    );
                }
                return self.after_call(mc, &receiver, method);
            }
            self.call_failure(mc, &selection, &candidates, &receiver.to_string(), args);
            return Type::Unknown;
        }
        if let Some((receiver, candidates)) = self.static_import_methods(&mc.name) {
            let selection = select(self.index, &candidates, args);
            if let Selection::Found { method, .. } = &selection {
                return self.after_call(mc, &receiver, method);
            }
            self.call_failure(mc, &selection, &candidates, &receiver.to_string(), args);
            return Type::Unknown;
        }
        if complete && !self.may_be_hidden(&mc.name) && !args.iter().any(mentions_unknown) {
            if let Some(frame) = self.frames.last() {
                let message = format!(
                    "The method {}({}) is undefined for the type {}",
                    mc.name,
                    type_list(args),
                    frame.simple_name()
                );
                self.report(Category::UndefinedMethod, message, mc.name_span);
            }
        }
        Type::Unknown
    }

    fn static_import_methods(&self, name: &str) -> Option<(Type, Vec<MethodInfo>)> {
        for import in self.names.imports.iter().filter(|i| i.is_static) {
            let owner = if import.is_wildcard {
                import.name.clone()
            } else if import.simple_name() == name {
                import.name.rsplit_once('.').map(|(o, _)| o.to_string())?
            } else {
                continue;
            };
            let Some(key) = find_qualified(self.index, &owner) else { continue };
            let receiver = Type::class(key);
            let (candidates, _) = find_methods(self.index, &receiver, name);
            let statics: Vec<MethodInfo> = candidates.into_iter().filter(|m| m.is_static).collect();
            if !statics.is_empty() {
                return Some((receiver, statics));
            }
        }
        None
    }

    fn call_failure(&mut self, mc: &MethodCallExpr, selection: &Selection, candidates: &[MethodInfo], receiver: &str, args: &[Type]) {
        if args.iter().any(mentions_unknown) {
            return;
        }
        let category = match selection {
            Selection::Ambiguous(_) => Category::AmbiguousMethod,
            Selection::NotApplicable if candidates.len() == 1 => Category::InapplicableMethod,
            _ => Category::UndefinedMethod,
        };
        if let Some(message) = method_failure(selection, candidates, &mc.name, receiver, args) {
            self.report(category, message, mc.name_span);
        }
    }

    fn after_call(&mut self, mc: &MethodCallExpr, receiver: &Type, method: &MethodInfo) -> Type {
        self.b.method_targets.insert(
            mc.id,
            MethodTarget {
                owner: method.owner.clone(),
                name: method.name.clone(),
                params: method.params.clone(),
                ret: method.ret.clone(),
                is_static: method.is_static,
            },
        );
        if method.is_deprecated && !self.same_top_level(&method.owner) {
            self.report(
                Category::DeprecatedUsage,
                format!("The method {} from the type {} is deprecated", method.signature(), Type::simple_name_of(&method.owner)),
                mc.name_span,
            );
        }
        if self.config.allows(Feature::Generics) {
            if let Some(message) = unchecked_raw_call(self.index, receiver, method) {
                self.report(Category::UncheckedRawInvocation, message, mc.span);
            }
        }
        if method.name == "getClass" && method.params.is_empty() {
            return Type::Class { name: "java.lang.Class".to_string(), args: vec![Type::Wildcard] };
        }
        return_type(method)
    }

    fn new_expr(&mut self, n: &NewExpr) -> Type {
        if let Some(outer) = &n.outer {
            self.expr(outer);
        }
        let args: Vec<Type> = n.arguments.iter().map(|a| self.expr(a)).collect();
        let ty = if n.outer.is_some() { Type::Unknown } else { self.ref_type(&n.target_type) };
        let simple = n.target_type.simple_name().to_string();
        if let Some(desc) = ty.class_name().and_then(|k| self.index.resolve_type(k)) {
            let abstract_without_body = n.anonymous_body.is_none() && (desc.is_abstract || desc.is_interface());
            if desc.is_enum() || abstract_without_body {
                self.report(Category::CannotInstantiate, format!("Cannot instantiate the type {}", simple), n.target_type.span);
            } else if !desc.is_interface() && !desc.constructors.is_empty() && !args.iter().any(mentions_unknown) {
                let selection = select(self.index, &desc.constructors, &args);
                if let Some(message) = constructor_failure(&selection, &simple, &args) {
                    self.report(Category::UndefinedMethod, message, n.span);
                }
            }
        }
        if let Some(body) = &n.anonymous_body {
            let key = self.key_for(body.span.start.offset, || format!("{}$", n.target_type.name));
            let display = format!("new {}(){{}}", simple);
            self.detached(|a| a.class_body(body, key, &display, true));
        }
        ty
    }

    // ---- switches ----

    fn switch_block(&mut self, sw: &SwitchBlock, is_expression: bool) {
        let selector = self.expr(&sw.selector);
        let enum_desc = selector.class_name().and_then(|n| self.index.resolve_type(n)).filter(|d| d.is_enum());
        let mut labels = Vec::new();
        let mut cases = Vec::new();
        let mut group = 0;
        for (case_index, case) in sw.cases.iter().enumerate() {
            for (position, label) in case.labels.iter().enumerate() {
                let mut kinds = Vec::new();
                for element in &label.elements {
                    let kind = match element {
                        CaseLabelElement::Default(s) => (LabelKind::Default, *s),
                        CaseLabelElement::Null(s) => (LabelKind::Null, *s),
                        CaseLabelElement::Pattern(Pattern::Type(tp)) => {
                            (LabelKind::TypePattern { ty: self.ref_type(&tp.type_ref) }, tp.span)
                        }
                        CaseLabelElement::Pattern(Pattern::Record(rp)) => {
                            (LabelKind::RecordPattern { ty: self.ref_type(&rp.type_ref) }, rp.span)
                        }
                        CaseLabelElement::Constant(c) => {
                            (self.case_constant(c, enum_desc.as_ref().map(|d| d.as_ref()), &selector), c.span())
                        }
                    };
                    kinds.push(kind);
                }
                let guard = label.guard.as_ref().map(|g| {
                    self.condition(g);
                    GuardInfo { span: g.span(), constant: constant_value(g).and_then(|v| v.as_bool()) }
                });
                for (kind, span) in kinds {
                    labels.push(LabelInfo { kind, span, case_index, label_group: group, position_in_case: position, guard });
                }
                group += 1;
            }
            let (completes_normally, block_body) = match &case.body {
                CaseBody::Statements(stmts) => {
                    self.statements(stmts);
                    (statements_can_complete_normally(stmts), false)
                }
                CaseBody::Expression(e) => {
                    self.expr(e);
                    (false, false)
                }
                CaseBody::Block(b) => {
                    self.block(b);
                    (block_can_complete_normally(b), true)
                }
                CaseBody::Throw(t) => {
                    self.expr(&t.expr);
                    (false, false)
                }
            };
            cases.push(CaseInfo { arrow: case.arrow, completes_normally, block_body, span: case.span });
        }
        let info = SwitchInfo { is_expression, selector, keyword_span: sw.keyword_span, labels, cases };
        let found = check_switch(&info, self.index, self.config);
        self.diagnostics.extend(found);
    }

    /// Bare names in an enum switch denote constants of the selector's enum
    fn case_constant(&mut self, c: &Expr, enum_desc: Option<&TypeDescriptor>, selector: &Type) -> LabelKind {
        if let Expr::Identifier(id) = c {
            if self.b.unresolved_case_names.contains(&id.id) {
                if let Some(desc) = enum_desc {
                    if desc.enum_constants.iter().any(|n| *n == id.name) {
                        return LabelKind::Constant {
                            ty: Type::class(desc.name.clone()),
                            value: None,
                            enum_constant: Some((desc.name.clone(), id.name.clone())),
                        };
                    }
                    self.report(
                        Category::UnresolvedName,
                        format!("{} cannot be resolved or is not a field", id.name),
                        id.span,
                    );
                } else if !selector.is_indeterminate() && !self.may_be_hidden(&id.name) {
                    self.report(Category::UnresolvedName, format!("{} cannot be resolved to a variable", id.name), id.span);
                }
                return LabelKind::Constant { ty: Type::Unknown, value: None, enum_constant: None };
            }
        }
        let ty = self.expr(c);
        let resolution = match c.unparenthesized() {
            Expr::Identifier(id) => self.b.resolution(id.id),
            Expr::FieldAccess(fa) => self.b.resolution(fa.id),
            _ => None,
        };
        let enum_constant = match resolution {
            Some(Resolution::Field(f)) if f.field.is_enum_constant => Some((f.owner.clone(), f.field.name.clone())),
            _ => None,
        };
        LabelKind::Constant { ty, value: constant_value(c), enum_constant }
    }
}

fn mentions_unknown(t: &Type) -> bool {
    match t {
        Type::Unknown => true,
        Type::Class { args, .. } => args.iter().any(mentions_unknown),
        Type::Array(e) => mentions_unknown(e),
        _ => false,
    }
}

fn binary_type(op: BinaryOp, left: &Type, right: &Type) -> Type {
    let numeric = || match (left.unboxed(), right.unboxed()) {
        (Some(a), Some(b)) if a.is_numeric() && b.is_numeric() => Type::Primitive(promote(promote(a, b), PrimitiveKind::Int)),
        _ => Type::Unknown,
    };
    match op {
        BinaryOp::Add if left.is_string() || right.is_string() => Type::string(),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => numeric(),
        BinaryOp::LShift | BinaryOp::RShift | BinaryOp::URShift => match left.unboxed() {
            Some(p) if p.is_integral() => Type::Primitive(promote(p, PrimitiveKind::Int)),
            _ => Type::Unknown,
        },
        BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge
        | BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::LogicalAnd
        | BinaryOp::LogicalOr => Type::boolean(),
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => {
            if left.unboxed() == Some(PrimitiveKind::Boolean) && right.unboxed() == Some(PrimitiveKind::Boolean) {
                Type::boolean()
            } else {
                numeric()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::parser::parse_source;
    use crate::wash::bind::bind_scopes;
    use crate::wash::classpath::{CompositeIndex, JdkClassPath};
    use crate::wash::enter::enter_units;

    fn messages_at(source: &str, config: Config) -> Vec<String> {
        let (unit, parse_errors) = parse_source(source, &config);
        assert!(parse_errors.is_empty(), "{:?}", parse_errors);
        let jdk: Arc<dyn ClassPath> = Arc::new(JdkClassPath::new());
        let sources = enter_units(&[("T.java", &unit)], jdk.clone());
        let index = CompositeIndex::new(vec![Arc::new(sources.clone()), jdk]);
        let ctx = Context { config: &config, sources: &sources, index: &index, file: "T.java" };
        let (mut bindings, mut diagnostics) = bind_scopes(&unit, &ctx);
        diagnostics.extend(attribute(&unit, &mut bindings, &ctx));
        diagnostics.into_iter().map(|d| d.message).collect()
    }

    fn messages(source: &str) -> Vec<String> {
        messages_at(source, Config::default())
    }

    #[test]
    fn final_field_assigned_in_static_initializer() {
        let source = "enum Couleur { BLEU, BLANC; static { BLEU = null; } }";
        assert_eq!(messages(source), vec!["The final field Couleur.BLEU cannot be assigned"]);
    }

    #[test]
    fn blank_final_assigned_in_constructor() {
        assert!(messages("class T { final int x; T() { x = 1; } }").is_empty());
        assert_eq!(
            messages("class T { final int x; void m() { x = 1; } }"),
            vec!["The final field T.x cannot be assigned"]
        );
    }

    #[test]
    fn final_local_rules() {
        assert!(messages("class T { void m() { final int x; x = 1; } }").is_empty());
        assert_eq!(
            messages("class T { void m() { final int x = 0; x += 1; } }"),
            vec!["The final local variable x cannot be assigned. It must be blank and not using a compound assignment"]
        );
    }

    #[test]
    fn type_mismatch() {
        assert_eq!(messages("class T { void m() { int x = \"a\"; } }"), vec!["Type mismatch: cannot convert from String to int"]);
        assert!(messages("class T { void m() { byte b = 10; char c = 'a' + 1; } }").is_empty());
    }

    #[test]
    fn undefined_and_inapplicable_methods() {
        assert_eq!(messages("class T { void m() { foo(); } }"), vec!["The method foo() is undefined for the type T"]);
        assert_eq!(
            messages("class T { void f(int i) {} void m() { f(\"s\"); } }"),
            vec!["The method f(int) in the type T is not applicable for the arguments (String)"]
        );
    }

    #[test]
    fn static_reference_to_instance_method() {
        assert_eq!(
            messages("class T { void f() {} static void m() { f(); } }"),
            vec!["Cannot make a static reference to the non-static method f() from the type T"]
        );
    }

    #[test]
    fn enum_cannot_be_instantiated() {
        assert_eq!(messages("enum E { A; static Object o = new E(); }"), vec!["Cannot instantiate the type E"]);
    }

    #[test]
    fn static_field_in_constant_body_depends_on_level() {
        let source = "enum E { A { static final String value = getString(); }; static String getString() { return \"\"; } }";
        assert!(messages(source).is_empty());
        let old = messages_at(source, Config::new(crate::config::LanguageLevel::V1_8));
        assert_eq!(
            old,
            vec!["The field value cannot be declared static in a non-static inner type, unless initialized with a constant expression"]
        );
    }

    #[test]
    fn unimplemented_interface_method() {
        assert_eq!(
            messages("class T implements Runnable { }"),
            vec!["The type T must implement the inherited abstract method Runnable.run()"]
        );
    }
}
