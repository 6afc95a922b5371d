use super::{AstNode, NodeId, Span};
use std::fmt;

// Package and Import Declarations
#[derive(Debug, Clone)]
pub struct PackageDecl {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl fmt::Display for PackageDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "package {};", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub name: String,
    pub is_static: bool,
    pub is_wildcard: bool,
    pub span: Span,
}

impl ImportDecl {
    /// Last segment of a single-type or single-static import
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for ImportDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "import ")?;
        if self.is_static {
            write!(f, "static ")?;
        }
        if self.is_wildcard {
            write!(f, "{}.*;", self.name)
        } else {
            write!(f, "{};", self.name)
        }
    }
}

// Type Declarations
#[derive(Debug, Clone)]
pub enum TypeDecl {
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    Annotation(AnnotationDecl),
    Record(RecordDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "annotation type",
            TypeKind::Record => "record",
        };
        f.write_str(s)
    }
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        match self {
            TypeDecl::Class(c) => &c.name,
            TypeDecl::Interface(i) => &i.name,
            TypeDecl::Enum(e) => &e.name,
            TypeDecl::Annotation(a) => &a.name,
            TypeDecl::Record(r) => &r.name,
        }
    }

    pub fn name_span(&self) -> Span {
        match self {
            TypeDecl::Class(c) => c.name_span,
            TypeDecl::Interface(i) => i.name_span,
            TypeDecl::Enum(e) => e.name_span,
            TypeDecl::Annotation(a) => a.name_span,
            TypeDecl::Record(r) => r.name_span,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            TypeDecl::Class(_) => TypeKind::Class,
            TypeDecl::Interface(_) => TypeKind::Interface,
            TypeDecl::Enum(_) => TypeKind::Enum,
            TypeDecl::Annotation(_) => TypeKind::Annotation,
            TypeDecl::Record(_) => TypeKind::Record,
        }
    }

    pub fn modifiers(&self) -> &[Modifier] {
        match self {
            TypeDecl::Class(c) => &c.modifiers,
            TypeDecl::Interface(i) => &i.modifiers,
            TypeDecl::Enum(e) => &e.modifiers,
            TypeDecl::Annotation(a) => &a.modifiers,
            TypeDecl::Record(r) => &r.modifiers,
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        match self {
            TypeDecl::Class(c) => &c.annotations,
            TypeDecl::Interface(i) => &i.annotations,
            TypeDecl::Enum(e) => &e.annotations,
            TypeDecl::Annotation(a) => &a.annotations,
            TypeDecl::Record(r) => &r.annotations,
        }
    }

    pub fn type_params(&self) -> &[TypeParam] {
        match self {
            TypeDecl::Class(c) => &c.type_params,
            TypeDecl::Interface(i) => &i.type_params,
            TypeDecl::Record(r) => &r.type_params,
            TypeDecl::Enum(_) | TypeDecl::Annotation(_) => &[],
        }
    }

    pub fn members(&self) -> &[ClassMember] {
        match self {
            TypeDecl::Class(c) => &c.body,
            TypeDecl::Interface(i) => &i.body,
            TypeDecl::Enum(e) => &e.body,
            TypeDecl::Annotation(a) => &a.body,
            TypeDecl::Record(r) => &r.body,
        }
    }

    /// Supertypes named in `extends`/`implements`
    pub fn supertypes(&self) -> Vec<&TypeRef> {
        match self {
            TypeDecl::Class(c) => c.extends.iter().chain(c.implements.iter()).collect(),
            TypeDecl::Interface(i) => i.extends.iter().collect(),
            TypeDecl::Enum(e) => e.implements.iter().collect(),
            TypeDecl::Record(r) => r.implements.iter().collect(),
            TypeDecl::Annotation(_) => Vec::new(),
        }
    }

    pub fn permits(&self) -> &[TypeRef] {
        match self {
            TypeDecl::Class(c) => &c.permits,
            TypeDecl::Interface(i) => &i.permits,
            _ => &[],
        }
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers().contains(&modifier)
    }

    pub fn as_enum(&self) -> Option<&EnumDecl> {
        match self {
            TypeDecl::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_interface_like(&self) -> bool {
        matches!(self, TypeDecl::Interface(_) | TypeDecl::Annotation(_))
    }
}

impl AstNode for TypeDecl {
    fn span(&self) -> Span {
        match self {
            TypeDecl::Class(c) => c.span,
            TypeDecl::Interface(i) => i.span,
            TypeDecl::Enum(e) => e.span,
            TypeDecl::Annotation(a) => a.span,
            TypeDecl::Record(r) => r.span,
        }
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.name())
    }
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub name_span: Span,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub permits: Vec<TypeRef>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub name_span: Span,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeRef>,
    pub permits: Vec<TypeRef>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub name_span: Span,
    pub implements: Vec<TypeRef>,
    pub constants: Vec<EnumConstant>,
    /// `;` after the constant list (`enum X { ; }` vs `enum X {}`)
    pub has_constant_terminator: bool,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

impl EnumDecl {
    pub fn has_constant_bodies(&self) -> bool {
        self.constants.iter().any(|c| c.body.is_some())
    }

    pub fn abstract_methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.body.iter().filter_map(|m| match m {
            ClassMember::Method(m) if m.is_abstract() => Some(m),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AnnotationDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub name_span: Span,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct RecordDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub name_span: Span,
    pub type_params: Vec<TypeParam>,
    pub components: Vec<Parameter>,
    pub implements: Vec<TypeRef>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

/// One constant of an enum declaration
#[derive(Debug, Clone)]
pub struct EnumConstant {
    /// Modifiers are not legal here; kept so the checker can report them
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub name_span: Span,
    /// `None` without parentheses, `Some(vec![])` for `A()`
    pub arguments: Option<Vec<Expr>>,
    pub body: ConstantBody,
    pub span: Span,
}

/// Either a plain constant or an implicit anonymous subtype of the enum
#[derive(Debug, Clone)]
pub enum ConstantBody {
    Plain,
    WithBody(ClassBody),
}

impl ConstantBody {
    pub fn is_some(&self) -> bool {
        matches!(self, ConstantBody::WithBody(_))
    }

    pub fn as_body(&self) -> Option<&ClassBody> {
        match self {
            ConstantBody::Plain => None,
            ConstantBody::WithBody(b) => Some(b),
        }
    }
}

impl EnumConstant {
    pub fn arguments(&self) -> &[Expr] {
        self.arguments.as_deref().unwrap_or(&[])
    }
}

/// Body of an anonymous class or an enum constant
#[derive(Debug, Clone)]
pub struct ClassBody {
    pub members: Vec<ClassMember>,
    pub span: Span,
}

// Modifiers and Annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Static,
    Final,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    Default,
    Sealed,
    NonSealed,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Abstract => "abstract",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Native => "native",
            Modifier::Synchronized => "synchronized",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Strictfp => "strictfp",
            Modifier::Default => "default",
            Modifier::Sealed => "sealed",
            Modifier::NonSealed => "non-sealed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct Annotation {
    pub name: String,
    pub arguments: Vec<AnnotationArg>,
    pub span: Span,
}

impl Annotation {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
pub enum AnnotationArg {
    Value(Expr),
    Named(String, Expr),
}

pub fn has_annotation(annotations: &[Annotation], simple: &str) -> bool {
    annotations.iter().any(|a| a.simple_name() == simple)
}

// Type References
#[derive(Debug, Clone)]
pub struct TypeRef {
    /// Dotted name as written, or a primitive keyword
    pub name: String,
    pub type_args: Vec<TypeArg>,
    /// `<>` on an instance creation
    pub diamond: bool,
    pub annotations: Vec<Annotation>,
    pub array_dims: usize,
    pub span: Span,
}

impl TypeRef {
    pub fn simple(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), type_args: Vec::new(), diamond: false, annotations: Vec::new(), array_dims: 0, span }
    }

    pub fn is_primitive(&self) -> bool {
        self.array_dims == 0 && is_primitive_name(&self.name)
    }

    pub fn is_var(&self) -> bool {
        self.array_dims == 0 && self.name == "var" && self.type_args.is_empty()
    }

    pub fn is_void(&self) -> bool {
        self.name == "void" && self.array_dims == 0
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn with_extra_dims(mut self, dims: usize) -> Self {
        self.array_dims += dims;
        self
    }

    pub fn element(&self) -> TypeRef {
        let mut t = self.clone();
        t.array_dims = t.array_dims.saturating_sub(1);
        t
    }
}

pub fn is_primitive_name(name: &str) -> bool {
    matches!(name, "boolean" | "byte" | "short" | "int" | "long" | "char" | "float" | "double")
}

impl AstNode for TypeRef {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.diamond {
            write!(f, "<>")?;
        } else if !self.type_args.is_empty() {
            write!(f, "<")?;
            for (i, a) in self.type_args.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                match a {
                    TypeArg::Type(t) => write!(f, "{}", t)?,
                    TypeArg::Wildcard(w) => match &w.bound {
                        None => write!(f, "?")?,
                        Some((BoundKind::Extends, t)) => write!(f, "? extends {}", t)?,
                        Some((BoundKind::Super, t)) => write!(f, "? super {}", t)?,
                    },
                }
            }
            write!(f, ">")?;
        }
        for _ in 0..self.array_dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum TypeArg {
    Type(TypeRef),
    Wildcard(WildcardType),
}

#[derive(Debug, Clone)]
pub struct WildcardType {
    pub bound: Option<(BoundKind, TypeRef)>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Extends,
    Super,
}

#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub bounds: Vec<TypeRef>,
    pub span: Span,
}

// Class Members
#[derive(Debug, Clone)]
pub enum ClassMember {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Initializer(InitializerBlock),
    TypeDecl(TypeDecl),
}

impl AstNode for ClassMember {
    fn span(&self) -> Span {
        match self {
            ClassMember::Field(f) => f.span,
            ClassMember::Method(m) => m.span,
            ClassMember::Constructor(c) => c.span,
            ClassMember::Initializer(i) => i.span,
            ClassMember::TypeDecl(t) => t.span(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub type_ref: TypeRef,
    pub name: String,
    pub name_span: Span,
    pub initializer: Option<Expr>,
    pub span: Span,
}

impl FieldDecl {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(&Modifier::Final)
    }
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub type_params: Vec<TypeParam>,
    /// `None` for `void`
    pub return_type: Option<TypeRef>,
    pub name: String,
    pub name_span: Span,
    pub parameters: Vec<Parameter>,
    pub throws: Vec<TypeRef>,
    pub body: Option<Block>,
    /// Annotation member `default` value
    pub default_value: Option<Expr>,
    pub span: Span,
}

impl MethodDecl {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(&Modifier::Abstract)
    }

    pub fn is_varargs(&self) -> bool {
        self.parameters.last().map(|p| p.varargs).unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub type_params: Vec<TypeParam>,
    pub name: String,
    pub name_span: Span,
    pub parameters: Vec<Parameter>,
    pub throws: Vec<TypeRef>,
    /// Leading `this(...)` or `super(...)` call
    pub explicit_invocation: Option<ExplicitCtorInvocation>,
    pub body: Block,
    /// Record compact canonical constructor
    pub compact: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExplicitCtorInvocation {
    pub kind: CtorCallKind,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtorCallKind {
    This,
    Super,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub type_ref: TypeRef,
    pub name: String,
    pub name_span: Span,
    pub varargs: bool,
    pub span: Span,
}

impl Parameter {
    /// Declared type with the varargs dimension applied
    pub fn effective_type(&self) -> TypeRef {
        if self.varargs {
            self.type_ref.clone().with_extra_dims(1)
        } else {
            self.type_ref.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct InitializerBlock {
    pub is_static: bool,
    pub body: Block,
    pub span: Span,
}

// Statements
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl AstNode for Block {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression(ExprStmt),
    Declaration(VarDeclStmt),
    TypeDecl(TypeDecl),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    For(ForStmt),
    ForEach(ForEachStmt),
    Switch(SwitchBlock),
    Return(ReturnStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Yield(YieldStmt),
    Try(TryStmt),
    Throw(ThrowStmt),
    Assert(AssertStmt),
    Synchronized(SynchronizedStmt),
    Labeled(LabeledStmt),
    Block(Block),
    Empty(Span),
}

impl AstNode for Stmt {
    fn span(&self) -> Span {
        match self {
            Stmt::Expression(s) => s.span,
            Stmt::Declaration(s) => s.span,
            Stmt::TypeDecl(t) => t.span(),
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::ForEach(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Break(s) => s.span,
            Stmt::Continue(s) => s.span,
            Stmt::Yield(s) => s.span,
            Stmt::Try(s) => s.span,
            Stmt::Throw(s) => s.span,
            Stmt::Assert(s) => s.span,
            Stmt::Synchronized(s) => s.span,
            Stmt::Labeled(s) => s.span,
            Stmt::Block(b) => b.span,
            Stmt::Empty(span) => *span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VarDeclStmt {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub type_ref: TypeRef,
    pub variables: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    pub name: String,
    pub name_span: Span,
    pub array_dims: usize,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DoWhileStmt {
    pub body: Box<Stmt>,
    pub condition: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Vec<Stmt>,
    pub condition: Option<Expr>,
    pub update: Vec<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForEachStmt {
    pub modifiers: Vec<Modifier>,
    pub type_ref: TypeRef,
    pub name: String,
    pub name_span: Span,
    pub iterable: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// A switch statement or switch expression
#[derive(Debug, Clone)]
pub struct SwitchBlock {
    pub selector: Box<Expr>,
    pub cases: Vec<SwitchCase>,
    /// Span of the `switch` keyword
    pub keyword_span: Span,
    pub span: Span,
}

impl SwitchBlock {
    pub fn uses_arrows(&self) -> bool {
        self.cases.iter().any(|c| c.arrow)
    }

    pub fn labels(&self) -> impl Iterator<Item = &SwitchLabel> {
        self.cases.iter().flat_map(|c| c.labels.iter())
    }

    pub fn has_default(&self) -> bool {
        self.labels().any(|l| l.has_default())
    }

    pub fn has_patterns(&self) -> bool {
        self.labels().any(|l| l.pattern().is_some())
    }

    pub fn has_null(&self) -> bool {
        self.labels().any(|l| l.elements.iter().any(|e| matches!(e, CaseLabelElement::Null(_))))
    }
}

/// One statement group (`case A: case B: stmts`) or one arrow rule
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub labels: Vec<SwitchLabel>,
    pub arrow: bool,
    pub body: CaseBody,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum CaseBody {
    Statements(Vec<Stmt>),
    Expression(Expr),
    Block(Block),
    Throw(ThrowStmt),
}

/// `case e1, e2 [when guard]` or `default`
#[derive(Debug, Clone)]
pub struct SwitchLabel {
    pub elements: Vec<CaseLabelElement>,
    pub guard: Option<Expr>,
    pub span: Span,
}

impl SwitchLabel {
    pub fn has_default(&self) -> bool {
        self.elements.iter().any(|e| matches!(e, CaseLabelElement::Default(_)))
    }

    pub fn has_null(&self) -> bool {
        self.elements.iter().any(|e| matches!(e, CaseLabelElement::Null(_)))
    }

    /// First pattern element of the label
    pub fn pattern(&self) -> Option<&Pattern> {
        self.elements.iter().find_map(|e| match e {
            CaseLabelElement::Pattern(p) => Some(p),
            _ => None,
        })
    }

    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.elements.iter().filter_map(|e| match e {
            CaseLabelElement::Pattern(p) => Some(p),
            _ => None,
        })
    }

    pub fn constants(&self) -> impl Iterator<Item = &Expr> {
        self.elements.iter().filter_map(|e| match e {
            CaseLabelElement::Constant(c) => Some(c),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum CaseLabelElement {
    Constant(Expr),
    Pattern(Pattern),
    Null(Span),
    Default(Span),
}

impl AstNode for CaseLabelElement {
    fn span(&self) -> Span {
        match self {
            CaseLabelElement::Constant(e) => e.span(),
            CaseLabelElement::Pattern(p) => p.span(),
            CaseLabelElement::Null(s) | CaseLabelElement::Default(s) => *s,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Pattern {
    Type(TypePattern),
    Record(RecordPattern),
}

impl Pattern {
    pub fn type_ref(&self) -> &TypeRef {
        match self {
            Pattern::Type(t) => &t.type_ref,
            Pattern::Record(r) => &r.type_ref,
        }
    }

    /// Binding variables introduced by the pattern, outermost first
    pub fn bindings(&self) -> Vec<&TypePattern> {
        let mut out = Vec::new();
        fn collect<'a>(p: &'a Pattern, out: &mut Vec<&'a TypePattern>) {
            match p {
                Pattern::Type(t) => out.push(t),
                Pattern::Record(r) => r.subpatterns.iter().for_each(|s| collect(s, out)),
            }
        }
        collect(self, &mut out);
        out
    }
}

impl AstNode for Pattern {
    fn span(&self) -> Span {
        match self {
            Pattern::Type(t) => t.span,
            Pattern::Record(r) => r.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypePattern {
    pub modifiers: Vec<Modifier>,
    pub type_ref: TypeRef,
    pub name: String,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct RecordPattern {
    pub type_ref: TypeRef,
    pub subpatterns: Vec<Pattern>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BreakStmt {
    pub label: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ContinueStmt {
    pub label: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct YieldStmt {
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TryStmt {
    pub resources: Vec<TryResource>,
    pub try_block: Block,
    pub catch_clauses: Vec<CatchClause>,
    pub finally_block: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub parameter: Parameter,
    /// Additional alternatives for multi-catch: `catch (A | B e)`
    pub alt_types: Vec<TypeRef>,
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TryResource {
    Var { modifiers: Vec<Modifier>, type_ref: TypeRef, name: String, name_span: Span, initializer: Expr, span: Span },
    Expr { expr: Expr, span: Span },
}

#[derive(Debug, Clone)]
pub struct ThrowStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AssertStmt {
    pub condition: Expr,
    pub message: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SynchronizedStmt {
    pub lock: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LabeledStmt {
    pub label: String,
    pub statement: Box<Stmt>,
    pub span: Span,
}

// Expressions
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(LiteralExpr),
    Identifier(IdentifierExpr),
    FieldAccess(FieldAccessExpr),
    MethodCall(MethodCallExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Assignment(AssignmentExpr),
    ArrayAccess(ArrayAccessExpr),
    Cast(CastExpr),
    InstanceOf(InstanceOfExpr),
    Conditional(ConditionalExpr),
    New(NewExpr),
    NewArray(NewArrayExpr),
    ArrayInitializer(ArrayInit),
    Lambda(LambdaExpr),
    MethodRef(MethodRefExpr),
    Switch(SwitchBlock),
    This(ThisExpr),
    Super(Span),
    ClassLiteral(ClassLiteralExpr),
    Parenthesized(ParenExpr),
    /// Placeholder produced by error recovery
    Erroneous(Span),
}

impl AstNode for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Identifier(e) => e.span,
            Expr::FieldAccess(e) => e.span,
            Expr::MethodCall(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Assignment(e) => e.span,
            Expr::ArrayAccess(e) => e.span,
            Expr::Cast(e) => e.span,
            Expr::InstanceOf(e) => e.span,
            Expr::Conditional(e) => e.span,
            Expr::New(e) => e.span,
            Expr::NewArray(e) => e.span,
            Expr::ArrayInitializer(e) => e.span,
            Expr::Lambda(e) => e.span,
            Expr::MethodRef(e) => e.span,
            Expr::Switch(e) => e.span,
            Expr::This(e) => e.span,
            Expr::Super(span) => *span,
            Expr::ClassLiteral(e) => e.span,
            Expr::Parenthesized(e) => e.span,
            Expr::Erroneous(span) => *span,
        }
    }
}

impl Expr {
    pub fn span(&self) -> Span {
        AstNode::span(self)
    }

    /// Strip any number of enclosing parentheses
    pub fn unparenthesized(&self) -> &Expr {
        let mut e = self;
        while let Expr::Parenthesized(p) = e {
            e = &p.expr;
        }
        e
    }

    /// Dotted name for `a`, `a.b.c` chains of identifiers
    pub fn as_qualified_name(&self) -> Option<String> {
        match self {
            Expr::Identifier(id) => Some(id.name.clone()),
            Expr::FieldAccess(fa) => fa.target.as_qualified_name().map(|q| format!("{}.{}", q, fa.name)),
            _ => None,
        }
    }

    pub fn is_literal_null(&self) -> bool {
        matches!(self.unparenthesized(), Expr::Literal(LiteralExpr { value: Literal::Null, .. }))
    }
}

#[derive(Debug, Clone)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Long(i64),
    Float(f64),
    Double(f64),
    Boolean(bool),
    Char(char),
    String(String),
    Null,
}

#[derive(Debug, Clone)]
pub struct IdentifierExpr {
    pub name: String,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldAccessExpr {
    pub target: Box<Expr>,
    pub name: String,
    pub name_span: Span,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodCallExpr {
    pub target: Option<Box<Expr>>,
    pub type_args: Vec<TypeRef>,
    pub name: String,
    pub name_span: Span,
    pub arguments: Vec<Expr>,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOp,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Xor,
    LShift,
    RShift,
    URShift,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::URShift => ">>>",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub operator: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn is_increment(self) -> bool {
        matches!(self, UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    LShiftAssign,
    RShiftAssign,
    URShiftAssign,
}

#[derive(Debug, Clone)]
pub struct AssignmentExpr {
    pub target: Box<Expr>,
    pub operator: AssignmentOp,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayAccessExpr {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CastExpr {
    pub target_type: TypeRef,
    /// Additional bounds of an intersection cast
    pub extra_bounds: Vec<TypeRef>,
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InstanceOfExpr {
    pub expr: Box<Expr>,
    pub target: InstanceOfTarget,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum InstanceOfTarget {
    Type(TypeRef),
    Pattern(Pattern),
}

#[derive(Debug, Clone)]
pub struct ConditionalExpr {
    pub condition: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct NewExpr {
    /// Qualifier of an inner class creation (`outer.new Inner()`)
    pub outer: Option<Box<Expr>>,
    pub target_type: TypeRef,
    pub arguments: Vec<Expr>,
    pub anonymous_body: Option<ClassBody>,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct NewArrayExpr {
    pub element_type: TypeRef,
    pub dimensions: Vec<Expr>,
    /// Trailing `[]` pairs without a size expression
    pub extra_dims: usize,
    pub initializer: Option<ArrayInit>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayInit {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LambdaExpr {
    pub params: Vec<LambdaParam>,
    pub body: LambdaBody,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LambdaParam {
    pub modifiers: Vec<Modifier>,
    pub type_ref: Option<TypeRef>,
    pub name: String,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone)]
pub struct MethodRefExpr {
    pub target: MethodRefTarget,
    /// Method name or `new`
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum MethodRefTarget {
    Expr(Box<Expr>),
    Type(TypeRef),
}

#[derive(Debug, Clone)]
pub struct ThisExpr {
    /// `Outer.this`
    pub qualifier: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ClassLiteralExpr {
    pub type_ref: TypeRef,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ParenExpr {
    pub expr: Box<Expr>,
    pub span: Span,
}
