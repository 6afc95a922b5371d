//! Scope arena and symbol table
//!
//! Scopes live in a flat arena; a scope's parent is a plain `ScopeId` index,
//! so lookups walk indices outward and nothing owns its parent. Symbols are
//! stored once in the `SymbolTable` and referenced from scopes by `SymbolId`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::classpath::{MethodInfo, TypeDescriptor};
use super::types::Type;
use crate::ast::{ClassMember, EnumConstant, Modifier, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Unit,
    /// Body of a class, interface, enum, record or anonymous class
    Type { key: String },
    Method { is_static: bool },
    Initializer { is_static: bool },
    Block,
    Lambda,
    Switch,
    /// Pattern variables of one case label group
    CaseGroup,
}

impl ScopeKind {
    /// Scopes where the search for clashing local names stops
    pub fn is_member_boundary(&self) -> bool {
        matches!(self, ScopeKind::Unit | ScopeKind::Type { .. } | ScopeKind::Method { .. } | ScopeKind::Initializer { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    names: HashMap<String, SymbolId>,
}

#[derive(Debug, Clone, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope { kind, parent, names: HashMap::new() });
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.get(id).parent
    }

    pub fn bind(&mut self, scope: ScopeId, name: &str, symbol: SymbolId) {
        self.scopes[scope.0 as usize].names.insert(name.to_string(), symbol);
    }

    /// Symbol declared directly in `scope`
    pub fn local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.get(scope).names.get(name).copied()
    }

    /// Innermost binding of `name` visible from `scope`
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, SymbolId)> {
        self.ancestors(scope).find_map(|s| self.local(s, name).map(|sym| (s, sym)))
    }

    /// `scope` and its parents, innermost first
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), move |s| self.parent(*s))
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Field,
    Local,
    Parameter,
    PatternVariable,
    Method,
    Type,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymbolKind::Field => "field",
            SymbolKind::Local => "local variable",
            SymbolKind::Parameter => "parameter",
            SymbolKind::PatternVariable => "pattern variable",
            SymbolKind::Method => "method",
            SymbolKind::Type => "type",
        };
        f.write_str(s)
    }
}

/// Enum constant facts carried by its field symbol
#[derive(Debug, Clone)]
pub struct EnumConstantInfo {
    pub ordinal: usize,
    pub has_body: bool,
    /// Binary name of the constant body (`E$1`)
    pub body_key: Option<String>,
    /// Abstract methods of the enum the constant must implement
    pub abstract_methods_to_implement: Vec<MethodInfo>,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
    pub modifiers: Vec<Modifier>,
    pub scope: ScopeId,
    pub span: Span,
    pub has_initializer: bool,
    /// Spans of assignments and increments after the declaration
    pub assignments: Vec<Span>,
    pub enum_constant: Option<EnumConstantInfo>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, ty: Type, scope: ScopeId, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            modifiers: Vec::new(),
            scope,
            span,
            has_initializer: false,
            assignments: Vec::new(),
            enum_constant: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }

    pub fn initialized(mut self, has_initializer: bool) -> Self {
        self.has_initializer = has_initializer;
        self
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(&Modifier::Final)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }

    /// JLS 4.12.4: never assigned after initialization, or assigned at most
    /// once when declared without an initializer
    pub fn is_effectively_final(&self) -> bool {
        if self.is_final() {
            return true;
        }
        match self.kind {
            SymbolKind::Parameter | SymbolKind::PatternVariable => self.assignments.is_empty(),
            _ if self.has_initializer => self.assignments.is_empty(),
            _ => self.assignments.len() <= 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().enumerate().map(|(i, s)| (SymbolId(i as u32), s))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Part of a type body a walk is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Body,
    StaticMethod,
    InstanceMethod,
    Constructor,
    StaticInit,
    InstanceInit,
    StaticFieldInit,
    InstanceFieldInit,
}

impl MemberKind {
    pub fn is_static(self) -> bool {
        matches!(self, MemberKind::StaticMethod | MemberKind::StaticInit | MemberKind::StaticFieldInit)
    }

    /// Constructors, instance initializers and instance field initializers
    pub fn is_instance_initializer(self) -> bool {
        matches!(self, MemberKind::Constructor | MemberKind::InstanceInit | MemberKind::InstanceFieldInit)
    }

    /// Field initializers and initializer blocks, static or not
    pub fn is_initializer(self) -> bool {
        matches!(
            self,
            MemberKind::StaticInit | MemberKind::InstanceInit | MemberKind::StaticFieldInit | MemberKind::InstanceFieldInit
        )
    }
}

/// One lexically enclosing type of the walk position
#[derive(Debug, Clone)]
pub struct TypeFrame {
    pub key: String,
    pub desc: Option<Arc<TypeDescriptor>>,
    /// No enclosing instance: top level, static member, enum, record, interface
    pub is_static_type: bool,
    pub member: MemberKind,
    pub type_params: Vec<String>,
    /// Name offsets of the fields and enum constants declared in the body
    pub field_offsets: HashMap<String, usize>,
    /// Final fields declared without an initializer
    pub blank_finals: HashSet<String>,
    /// Field whose initializer is being walked
    pub initializing: Option<String>,
}

impl TypeFrame {
    pub fn new(key: String, desc: Option<Arc<TypeDescriptor>>, members: &[ClassMember], constants: &[EnumConstant]) -> Self {
        let mut field_offsets = HashMap::new();
        let mut blank_finals = HashSet::new();
        for c in constants {
            field_offsets.insert(c.name.clone(), c.name_span.start.offset);
        }
        for m in members {
            if let ClassMember::Field(f) = m {
                field_offsets.insert(f.name.clone(), f.name_span.start.offset);
                if f.is_final() && f.initializer.is_none() {
                    blank_finals.insert(f.name.clone());
                }
            }
        }
        let (is_static_type, type_params) = match &desc {
            Some(d) => (d.is_static, d.type_params.clone()),
            None => (false, Vec::new()),
        };
        Self {
            key,
            desc,
            is_static_type,
            member: MemberKind::Body,
            type_params,
            field_offsets,
            blank_finals,
            initializing: None,
        }
    }

    pub fn with_blank_finals(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.blank_finals.extend(names);
        self
    }

    pub fn this_type(&self) -> Type {
        match &self.desc {
            Some(d) => d.this_type(),
            None => Type::class(self.key.clone()),
        }
    }

    pub fn simple_name(&self) -> String {
        Type::simple_name_of(&self.key)
    }

    pub fn is_interface(&self) -> bool {
        self.desc.as_ref().map(|d| d.is_interface()).unwrap_or(false)
    }

    pub fn is_enum(&self) -> bool {
        self.desc.as_ref().map(|d| d.is_enum()).unwrap_or(false)
    }
}

/// Whether instance members of `frames[i]` are reachable from the innermost
/// frame without crossing a static boundary
pub fn instance_reachable(frames: &[TypeFrame], i: usize) -> bool {
    i < frames.len()
        && frames[i..].iter().all(|f| !f.member.is_static())
        && frames[i + 1..].iter().all(|f| !f.is_static_type)
}

/// Top-level part of a type key (`p.Outer$Inner` → `p.Outer`)
pub fn top_level_of(key: &str) -> &str {
    key.split('$').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_parents_innermost_first() {
        let mut arena = ScopeArena::new();
        let mut table = SymbolTable::new();
        let outer = arena.push(ScopeKind::Method { is_static: false }, None);
        let inner = arena.push(ScopeKind::Block, Some(outer));
        let a = table.add(Symbol::new("x", SymbolKind::Parameter, Type::int(), outer, Span::default()));
        let b = table.add(Symbol::new("x", SymbolKind::Local, Type::int(), inner, Span::default()));
        arena.bind(outer, "x", a);
        assert_eq!(arena.lookup(inner, "x"), Some((outer, a)));
        arena.bind(inner, "x", b);
        assert_eq!(arena.lookup(inner, "x"), Some((inner, b)));
        assert_eq!(arena.lookup(outer, "x"), Some((outer, a)));
        assert_eq!(arena.ancestors(inner).count(), 2);
    }

    #[test]
    fn effectively_final_rules() {
        let scope = ScopeId(0);
        let mut s = Symbol::new("x", SymbolKind::Local, Type::int(), scope, Span::default()).initialized(true);
        assert!(s.is_effectively_final());
        s.assignments.push(Span::default());
        assert!(!s.is_effectively_final());

        let mut late = Symbol::new("y", SymbolKind::Local, Type::int(), scope, Span::default());
        late.assignments.push(Span::default());
        assert!(late.is_effectively_final());
        late.assignments.push(Span::default());
        assert!(!late.is_effectively_final());
    }

    fn frame(member: MemberKind, is_static_type: bool) -> TypeFrame {
        let mut f = TypeFrame::new("A".into(), None, &[], &[]);
        f.member = member;
        f.is_static_type = is_static_type;
        f
    }

    #[test]
    fn static_boundaries_block_instance_access() {
        let frames = vec![frame(MemberKind::InstanceMethod, true), frame(MemberKind::InstanceMethod, false)];
        assert!(instance_reachable(&frames, 0));
        let frames = vec![frame(MemberKind::StaticMethod, true), frame(MemberKind::InstanceMethod, false)];
        assert!(!instance_reachable(&frames, 0));
        assert!(instance_reachable(&frames, 1));
        let frames = vec![frame(MemberKind::Body, true), frame(MemberKind::InstanceMethod, true)];
        assert!(!instance_reachable(&frames, 0));
        assert_eq!(top_level_of("p.Outer$Inner$1"), "p.Outer");
    }
}
