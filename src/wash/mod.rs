//! Semantic checks - the phases between parsing and shape planning
//!
//! - Enter: every type declared in the batch becomes a [`classpath::TypeDescriptor`]
//!   in a [`enter::SourceIndex`], layered over the platform index
//! - Bind: scopes, symbols and name resolution for one unit
//! - Attr: expression types, resolution of calls, assignments, overriding,
//!   enum and switch rules
//!
//! Enter runs once for the whole batch before any unit is checked; bind and
//! attr only read the shared index, so units can be checked in parallel.

pub mod attr;
pub mod bind;
pub mod classpath;
pub mod enter;
pub mod enums;
pub mod flow;
pub mod overload;
pub mod scope;
pub mod switches;
pub mod types;

use crate::ast::CompilationUnit;
use crate::config::Config;
use crate::diagnostics::Diagnostic;

use bind::Bindings;
use classpath::ClassPath;
use enter::SourceIndex;

/// Read-only state shared by the checks of one unit
pub struct Context<'a> {
    pub config: &'a Config,
    /// Types declared anywhere in the batch
    pub sources: &'a SourceIndex,
    /// Batch types layered over the platform index
    pub index: &'a dyn ClassPath,
    /// Nominal file name of the unit, used to find its types in `sources`
    pub file: &'a str,
}

/// Bind and attribute one entered unit
pub fn check(unit: &CompilationUnit, ctx: &Context<'_>) -> (Bindings, Vec<Diagnostic>) {
    let (mut bindings, mut diagnostics) = bind::bind_scopes(unit, ctx);
    let bound = diagnostics.len();
    diagnostics.extend(attr::attribute(unit, &mut bindings, ctx));
    log::debug!(
        "{}: {} binding and {} attribution diagnostics",
        ctx.file,
        bound,
        diagnostics.len() - bound
    );
    (bindings, diagnostics)
}
