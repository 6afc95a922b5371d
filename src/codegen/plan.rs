//! Code shape planning
//!
//! A [`ShapePlan`] describes, per class file a declaration produces, the
//! synthetic members and flags a binary-compatible generator must emit:
//! the enum `$VALUES` array and its accessors, constructor descriptors with
//! the hidden enum name/ordinal prefix, implicit default constructors, record
//! members and whether a static initializer is needed. Nested plans cover
//! member types, enum constant bodies, local and anonymous classes, ordered
//! by source position.

use std::collections::BTreeSet;

use super::descriptor::{binary_name, method_descriptor};
use super::flags::{access_flags::*, class_flags, default_constructor_flags, modifiers_to_flags};
use crate::ast::{
    child_statements, walk_expr, walk_stmt, Block, ClassBody, ClassMember, CompilationUnit, ConstantBody, EnumConstant,
    EnumDecl, Expr, Modifier, NewExpr, Parameter, Stmt, TypeDecl, TypeKind, TypeRef,
};
use crate::config::LanguageLevel;
use crate::wash::bind::Bindings;
use crate::wash::classpath::TypeDescriptor;
use crate::wash::flow::is_constant_expression;
use crate::wash::types::Type;
use crate::wash::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClassModifier {
    Final,
    Abstract,
}

/// A method the generator emits without a source declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticMethod {
    pub name: String,
    pub descriptor: String,
    pub access_flags: u16,
}

impl SyntheticMethod {
    fn new(name: &str, descriptor: String, access_flags: u16) -> Self {
        Self { name: name.to_string(), descriptor, access_flags }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapePlan {
    /// Internal name, `p/Outer$Inner`
    pub binary_name: String,
    pub needs_values_array: bool,
    pub needs_static_initializer: bool,
    /// Descriptors of every constructor of the class file, written or implicit
    pub constructor_signatures: Vec<String>,
    pub synthetic_methods: Vec<SyntheticMethod>,
    pub class_modifiers: BTreeSet<ClassModifier>,
    pub access_flags: u16,
    pub nested: Vec<ShapePlan>,
}

impl ShapePlan {
    fn new(key: &str) -> Self {
        Self {
            binary_name: binary_name(key),
            needs_values_array: false,
            needs_static_initializer: false,
            constructor_signatures: Vec::new(),
            synthetic_methods: Vec::new(),
            class_modifiers: BTreeSet::new(),
            access_flags: 0,
            nested: Vec::new(),
        }
    }

    pub fn has_synthetic(&self, name: &str) -> bool {
        self.synthetic_methods.iter().any(|m| m.name == name)
    }

    /// This plan and every nested plan, depth first
    pub fn flatten(&self) -> Vec<&ShapePlan> {
        let mut out = vec![self];
        for n in &self.nested {
            out.extend(n.flatten());
        }
        out
    }
}

/// Plan every top-level type of a checked unit
pub fn plan_unit(unit: &CompilationUnit, bindings: &Bindings, ctx: &Context<'_>) -> Vec<ShapePlan> {
    let planner = Planner { bindings, ctx };
    let plans: Vec<ShapePlan> = unit
        .type_decls
        .iter()
        .map(|d| {
            let key = planner.key_for(d.name_span().start.offset, || unit.qualify(d.name()));
            planner.plan_type(d, &key)
        })
        .collect();
    log::debug!("{}: planned {} class files", ctx.file, plans.iter().map(|p| p.flatten().len()).sum::<usize>());
    plans
}

struct Planner<'a> {
    bindings: &'a Bindings,
    ctx: &'a Context<'a>,
}

type Nested = Vec<(usize, ShapePlan)>;

impl<'a> Planner<'a> {
    fn key_for(&self, offset: usize, fallback: impl FnOnce() -> String) -> String {
        self.ctx.sources.key_at(self.ctx.file, offset).map(str::to_string).unwrap_or_else(fallback)
    }

    fn ty(&self, t: &TypeRef) -> Type {
        self.bindings.type_of_ref(t).cloned().unwrap_or(Type::Unknown)
    }

    fn param_types(&self, params: &[Parameter]) -> Vec<Type> {
        params
            .iter()
            .map(|p| {
                let ty = self.ty(&p.type_ref);
                if p.varargs {
                    Type::array_of(ty, 1)
                } else {
                    ty
                }
            })
            .collect()
    }

    fn plan_type(&self, decl: &TypeDecl, key: &str) -> ShapePlan {
        let desc = self.ctx.index.resolve_type(key);
        let mut plan = ShapePlan::new(key);
        let kind = decl.kind();
        plan.class_modifiers = class_modifiers(decl, desc.as_deref());
        plan.access_flags = class_flags(kind, decl.modifiers(), &plan.class_modifiers);
        plan.needs_static_initializer = self.has_static_init(decl.members(), kind == TypeKind::Interface, desc.as_deref());
        let mut nested = Nested::new();
        match decl {
            TypeDecl::Enum(e) => self.plan_enum(e, key, &mut plan, &mut nested),
            TypeDecl::Record(r) => {
                let components = self.param_types(&r.components);
                self.constructors(decl.members(), &[], kind, decl.modifiers(), &mut plan);
                let canonical = method_descriptor(&components, &Type::Void);
                let declared_canonical = decl.members().iter().any(|m| matches!(m, ClassMember::Constructor(c) if c.compact));
                if !declared_canonical && !plan.constructor_signatures.contains(&canonical) {
                    plan.synthetic_methods.push(SyntheticMethod::new("<init>", canonical.clone(), ACC_PUBLIC));
                    plan.constructor_signatures.insert(0, canonical);
                }
                for (c, ty) in r.components.iter().zip(&components) {
                    if !declares_method(decl.members(), &c.name, 0) {
                        let d = method_descriptor(&[], ty);
                        plan.synthetic_methods.push(SyntheticMethod::new(&c.name, d, ACC_PUBLIC));
                    }
                }
                let record_members = [
                    ("toString", Vec::new(), Type::string()),
                    ("hashCode", Vec::new(), Type::int()),
                    ("equals", vec![Type::object()], Type::boolean()),
                ];
                for (name, params, ret) in record_members {
                    if !declares_method(decl.members(), name, params.len()) {
                        let d = method_descriptor(&params, &ret);
                        plan.synthetic_methods.push(SyntheticMethod::new(name, d, ACC_PUBLIC | ACC_FINAL));
                    }
                }
            }
            TypeDecl::Class(_) => {
                let outer = outer_instance(desc.as_deref());
                self.constructors(decl.members(), &outer, kind, decl.modifiers(), &mut plan);
            }
            TypeDecl::Interface(_) | TypeDecl::Annotation(_) => {}
        }
        self.nested_in_members(decl.members(), key, &mut nested);
        plan.nested = sorted(nested);
        plan
    }

    fn plan_enum(&self, e: &EnumDecl, key: &str, plan: &mut ShapePlan, nested: &mut Nested) {
        let this_type = Type::class(key);
        let array = Type::array_of(this_type.clone(), 1);
        plan.needs_values_array = !e.constants.is_empty();
        plan.needs_static_initializer |= !e.constants.is_empty();
        plan.synthetic_methods.push(SyntheticMethod::new("values", method_descriptor(&[], &array), ACC_PUBLIC | ACC_STATIC));
        plan.synthetic_methods.push(SyntheticMethod::new(
            "valueOf",
            method_descriptor(&[Type::string()], &this_type),
            ACC_PUBLIC | ACC_STATIC,
        ));
        if self.ctx.config.language_level >= LanguageLevel::V15 && plan.needs_values_array {
            plan.synthetic_methods.push(SyntheticMethod::new(
                "$values",
                method_descriptor(&[], &array),
                ACC_PRIVATE | ACC_STATIC | ACC_SYNTHETIC,
            ));
        }
        let prefix = [Type::string(), Type::int()];
        self.constructors(&e.body, &prefix, TypeKind::Enum, &e.modifiers, plan);
        for c in &e.constants {
            for arg in c.arguments() {
                self.nested_in_expr(arg, key, nested);
            }
            if let ConstantBody::WithBody(body) = &c.body {
                nested.push((body.span.start.offset, self.plan_constant_body(e, c, body, key)));
            }
        }
    }

    /// Constant bodies are final enum subclasses constructed with the name,
    /// the ordinal and the arguments of the enum constructor they call
    fn plan_constant_body(&self, e: &EnumDecl, c: &EnumConstant, body: &ClassBody, enum_key: &str) -> ShapePlan {
        let key = self.key_for(body.span.start.offset, || format!("{}$", enum_key));
        let desc = self.ctx.index.resolve_type(&key);
        let mut plan = ShapePlan::new(&key);
        plan.class_modifiers.insert(ClassModifier::Final);
        plan.access_flags = ACC_FINAL | ACC_SUPER | ACC_ENUM;
        plan.needs_static_initializer = self.has_static_init(&body.members, false, desc.as_deref());
        let mut params = vec![Type::string(), Type::int()];
        let arity = c.arguments().len();
        let called = e.body.iter().find_map(|m| match m {
            ClassMember::Constructor(ctor) if ctor.parameters.len() == arity => Some(self.param_types(&ctor.parameters)),
            _ => None,
        });
        params.extend(called.unwrap_or_default());
        plan.constructor_signatures.push(method_descriptor(&params, &Type::Void));
        let mut nested = Nested::new();
        self.nested_in_members(&body.members, &key, &mut nested);
        plan.nested = sorted(nested);
        plan
    }

    fn plan_anonymous(&self, n: &NewExpr, body: &ClassBody, owner: &str) -> ShapePlan {
        let key = self.key_for(body.span.start.offset, || format!("{}$", owner));
        let desc = self.ctx.index.resolve_type(&key);
        let mut plan = ShapePlan::new(&key);
        plan.access_flags = ACC_SUPER;
        plan.needs_static_initializer = self.has_static_init(&body.members, false, desc.as_deref());
        let base = self.ty(&n.target_type);
        let base_desc = base.class_name().and_then(|k| self.ctx.index.resolve_type(k));
        let params = base_desc
            .filter(|d| !d.is_interface())
            .and_then(|d| d.constructors.iter().find(|c| c.params.len() == n.arguments.len()).map(|c| c.params.clone()))
            .unwrap_or_default();
        plan.constructor_signatures.push(method_descriptor(&params, &Type::Void));
        let mut nested = Nested::new();
        self.nested_in_members(&body.members, &key, &mut nested);
        plan.nested = sorted(nested);
        plan
    }

    /// Written constructors with the hidden leading parameters, or the
    /// implicit default constructor
    fn constructors(&self, members: &[ClassMember], prefix: &[Type], kind: TypeKind, modifiers: &[Modifier], plan: &mut ShapePlan) {
        for m in members {
            if let ClassMember::Constructor(c) = m {
                let mut params = prefix.to_vec();
                if c.compact {
                    if let Some(desc) = self.ctx.index.resolve_type(&key_of(plan)) {
                        params.extend(desc.fields.iter().filter(|f| !f.is_static).map(|f| f.ty.clone()));
                    }
                } else {
                    params.extend(self.param_types(&c.parameters));
                }
                plan.constructor_signatures.push(method_descriptor(&params, &Type::Void));
            }
        }
        if plan.constructor_signatures.is_empty() && kind != TypeKind::Record {
            let descriptor = method_descriptor(prefix, &Type::Void);
            plan.synthetic_methods.push(SyntheticMethod::new("<init>", descriptor.clone(), default_constructor_flags(kind, modifiers)));
            plan.constructor_signatures.push(descriptor);
        }
    }

    /// Static initializer blocks, or static fields whose value is not a
    /// compile-time constant
    fn has_static_init(&self, members: &[ClassMember], interface: bool, desc: Option<&TypeDescriptor>) -> bool {
        let is_constant_name = |name: &str| desc.and_then(|d| d.field(name)).map(|f| f.is_constant).unwrap_or(false);
        members.iter().any(|m| match m {
            ClassMember::Initializer(i) => i.is_static,
            ClassMember::Field(f) if f.is_static() || interface => match &f.initializer {
                None => false,
                Some(init) => {
                    let ty = self.ty(&f.type_ref);
                    let constant_type = ty.is_primitive() || ty.is_string();
                    let is_final = f.is_final() || interface;
                    !(is_final && constant_type && is_constant_expression(init, &is_constant_name))
                }
            },
            _ => false,
        })
    }

    // ---- nested class files ----

    fn nested_in_members(&self, members: &[ClassMember], owner: &str, out: &mut Nested) {
        for m in members {
            match m {
                ClassMember::TypeDecl(t) => {
                    let key = self.key_for(t.name_span().start.offset, || format!("{}${}", owner, t.name()));
                    out.push((t.name_span().start.offset, self.plan_type(t, &key)));
                }
                ClassMember::Field(f) => {
                    if let Some(init) = &f.initializer {
                        self.nested_in_expr(init, owner, out);
                    }
                }
                ClassMember::Method(md) => {
                    if let Some(body) = &md.body {
                        self.nested_in_block(body, owner, out);
                    }
                }
                ClassMember::Constructor(c) => {
                    if let Some(inv) = &c.explicit_invocation {
                        for a in &inv.arguments {
                            self.nested_in_expr(a, owner, out);
                        }
                    }
                    self.nested_in_block(&c.body, owner, out);
                }
                ClassMember::Initializer(i) => self.nested_in_block(&i.body, owner, out),
            }
        }
    }

    fn nested_in_expr(&self, e: &Expr, owner: &str, out: &mut Nested) {
        let mut found: Vec<&NewExpr> = Vec::new();
        walk_expr(e, &mut |x| {
            if let Expr::New(n) = x {
                if n.anonymous_body.is_some() {
                    found.push(n);
                }
            }
            true
        });
        self.push_anonymous(found, owner, out);
    }

    fn nested_in_block(&self, block: &Block, owner: &str, out: &mut Nested) {
        for s in &block.statements {
            let mut found: Vec<&NewExpr> = Vec::new();
            walk_stmt(s, &mut |x| {
                if let Expr::New(n) = x {
                    if n.anonymous_body.is_some() {
                        found.push(n);
                    }
                }
                true
            });
            self.push_anonymous(found, owner, out);
            self.local_types(s, owner, out);
        }
    }

    fn push_anonymous(&self, found: Vec<&NewExpr>, owner: &str, out: &mut Nested) {
        for n in found {
            if let Some(body) = &n.anonymous_body {
                out.push((body.span.start.offset, self.plan_anonymous(n, body, owner)));
            }
        }
    }

    fn local_types(&self, s: &Stmt, owner: &str, out: &mut Nested) {
        if let Stmt::TypeDecl(t) = s {
            let key = self.key_for(t.name_span().start.offset, || format!("{}$1{}", owner, t.name()));
            out.push((t.name_span().start.offset, self.plan_type(t, &key)));
            return;
        }
        for child in child_statements(s) {
            self.local_types(child, owner, out);
        }
    }
}

fn key_of(plan: &ShapePlan) -> String {
    plan.binary_name.replace('/', ".")
}

fn sorted(mut nested: Nested) -> Vec<ShapePlan> {
    nested.sort_by_key(|(offset, _)| *offset);
    nested.into_iter().map(|(_, p)| p).collect()
}

fn declares_method(members: &[ClassMember], name: &str, arity: usize) -> bool {
    members.iter().any(|m| matches!(m, ClassMember::Method(md) if md.name == name && md.parameters.len() == arity))
}

/// Enums are final unless a constant has a body, and abstract when such an
/// enum leaves abstract methods to its constants
fn class_modifiers(decl: &TypeDecl, desc: Option<&TypeDescriptor>) -> BTreeSet<ClassModifier> {
    let mut out = BTreeSet::new();
    match decl {
        TypeDecl::Enum(e) => {
            let has_bodies = e.constants.iter().any(|c| c.body.is_some());
            if !has_bodies {
                out.insert(ClassModifier::Final);
            } else if desc.map(|d| d.is_abstract).unwrap_or(false) {
                out.insert(ClassModifier::Abstract);
            }
        }
        TypeDecl::Record(_) => {
            out.insert(ClassModifier::Final);
        }
        TypeDecl::Interface(_) | TypeDecl::Annotation(_) => {
            out.insert(ClassModifier::Abstract);
        }
        TypeDecl::Class(_) => {
            let flags = modifiers_to_flags(decl.modifiers());
            if flags & ACC_FINAL != 0 {
                out.insert(ClassModifier::Final);
            }
            if flags & ACC_ABSTRACT != 0 {
                out.insert(ClassModifier::Abstract);
            }
        }
    }
    out
}

/// Inner member classes take their enclosing instance as a hidden first
/// constructor parameter
fn outer_instance(desc: Option<&TypeDescriptor>) -> Vec<Type> {
    match desc {
        Some(d) if !d.is_static && !d.is_local => d.outer.iter().map(|o| Type::class(o.clone())).collect(),
        _ => Vec::new(),
    }
}
