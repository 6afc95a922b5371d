//! Abstract syntax tree for Java compilation units
//!
//! Every node owns its children and carries a `Span`; recovery-synthesized
//! nodes get a zero-width span at the point where the parser resynchronised.
//! Name-bearing expressions carry a `NodeId` that keys the annotation side
//! tables filled by the binder and the checker.

mod nodes;
mod walk;

pub use nodes::*;
pub use walk::*;

pub use crate::parser::span::{HasSpan, Location, Span};

use std::fmt;

/// Identity of a name-bearing expression within one compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// AST node trait that all spanned nodes implement
pub trait AstNode {
    fn span(&self) -> Span;
}

/// Root of a parsed source file
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub package_decl: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub type_decls: Vec<TypeDecl>,
    pub span: Span,
}

impl CompilationUnit {
    pub fn package_name(&self) -> Option<&str> {
        self.package_decl.as_ref().map(|p| p.name.as_str())
    }

    /// Qualified name of a top-level type declared in this unit
    pub fn qualify(&self, simple: &str) -> String {
        match self.package_name() {
            Some(p) => format!("{}.{}", p, simple),
            None => simple.to_string(),
        }
    }

    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        self.type_decls.iter().find(|t| t.name() == name)
    }
}

impl AstNode for CompilationUnit {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for CompilationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref package) = self.package_decl {
            writeln!(f, "{}", package)?;
        }
        for import in &self.imports {
            writeln!(f, "{}", import)?;
        }
        for type_decl in &self.type_decls {
            writeln!(f, "{}", type_decl)?;
        }
        Ok(())
    }
}
