//! jfront - a Java compiler front end
//!
//! Lexes, parses and checks Java source and plans the shape of the class
//! files a generator would emit. Problems in the source are reported as
//! ECJ-style diagnostics; nothing is written to disk.
//!
//! ## Architecture
//!
//! - **parser**: logos lexer and recursive-descent parser with error recovery
//! - **ast**: syntax tree of one compilation unit
//! - **wash**: enter, scope binding and attribution (types, overloads, enum and switch rules)
//! - **codegen**: code shape planning (synthetic members, flags, descriptors)
//! - **diagnostics**: diagnostic values, severity overrides and rendering
//! - **bin**: command-line interface
//!
//! ## Compilation Flow
//!
//! ```text
//! source → Lexer → Parser → CompilationUnit ─┐
//! source → Lexer → Parser → CompilationUnit ─┼→ Enter (shared index) → bind → attr → plan → diagnostics
//! source → Lexer → Parser → CompilationUnit ─┘
//! ```

pub mod ast;
pub mod codegen;
pub mod config;
pub mod consts;
pub mod diagnostics;
pub mod error;
pub mod parser;
pub mod wash;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use rayon::prelude::*;

pub use config::{Config, LanguageLevel};
pub use error::{Error, Result};

use ast::CompilationUnit;
use codegen::ShapePlan;
use diagnostics::{Diagnostic, DiagnosticLog, Diagnostics, SourceMap};
use wash::bind::Bindings;
use wash::classpath::{ClassPath, CompositeIndex, JdkClassPath};
use wash::enter::{enter_units, SourceIndex};
use wash::Context;

/// One source text and the path it was read from
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self { path: path.into(), text: text.into() }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        Ok(Self::new(path.display().to_string(), text))
    }

    /// Name diagnostics are reported against (`X.java`)
    pub fn file_name(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }
}

/// Everything the pipeline produces for one unit
#[derive(Debug)]
pub struct CompileOutput {
    /// Nominal file name
    pub file: String,
    pub unit: CompilationUnit,
    pub bindings: Bindings,
    pub diagnostics: Diagnostics,
    pub plans: Vec<ShapePlan>,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Canonical diagnostic text for this unit
    pub fn render(&self, source: &SourceFile) -> String {
        diagnostics::render(&self.diagnostics, &SourceMap::single(self.file.clone(), source.text.clone()))
    }
}

/// Stack for compile workers; deep trees up to the parser's nesting cap fit
const WORKER_STACK_BYTES: usize = 64 * 1024 * 1024;

static POOL: Lazy<Option<rayon::ThreadPool>> = Lazy::new(|| {
    match rayon::ThreadPoolBuilder::new()
        .stack_size(WORKER_STACK_BYTES)
        .thread_name(|i| format!("jfront-worker-{}", i))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!("compile pool unavailable, using the calling thread: {}", e);
            None
        }
    }
});

/// Run `f` on the compile pool, whose threads have room for deeply nested
/// sources. Parallel iterators inside `f` stay on the same pool.
pub fn on_pool<R: Send>(f: impl FnOnce() -> R + Send) -> R {
    match POOL.as_ref() {
        Some(pool) => pool.install(f),
        None => f(),
    }
}

/// Compile a single unit against the platform index
pub fn compile_unit(source: &SourceFile, config: &Config) -> CompileOutput {
    on_pool(|| compile_one(source, config))
}

fn compile_one(source: &SourceFile, config: &Config) -> CompileOutput {
    let platform: Arc<dyn ClassPath> = Arc::new(JdkClassPath::new());
    let (unit, syntax) = parser::parse_source(&source.text, config);
    let sources = enter_units(&[(source.path.as_str(), &unit)], platform.clone());
    check_unit(source, unit, syntax, &sources, platform, config)
}

/// Compile a batch of units that see each other's types.
///
/// Parsing runs in parallel; enter runs once over every unit and is the
/// barrier after which the shared index is frozen; checking and planning then
/// run in parallel again. Results keep the input order.
pub fn compile_units(sources: &[SourceFile], config: &Config) -> Vec<CompileOutput> {
    on_pool(|| compile_batch(sources, config))
}

fn compile_batch(sources: &[SourceFile], config: &Config) -> Vec<CompileOutput> {
    let platform: Arc<dyn ClassPath> = Arc::new(JdkClassPath::new());
    let parsed: Vec<(CompilationUnit, Vec<Diagnostic>)> =
        sources.par_iter().map(|s| parser::parse_source(&s.text, config)).collect();
    let entries: Vec<(&str, &CompilationUnit)> = sources.iter().zip(&parsed).map(|(s, (u, _))| (s.path.as_str(), u)).collect();
    let index = enter_units(&entries, platform.clone());
    log::debug!("entered {} types from {} units", index.len(), sources.len());
    parsed
        .into_par_iter()
        .zip(sources.par_iter())
        .map(|((unit, syntax), source)| check_unit(source, unit, syntax, &index, platform.clone(), config))
        .collect()
}

/// Read and compile every file of `paths`; directories are searched for
/// `*.java` files
pub fn compile_paths(paths: &[PathBuf], config: &Config) -> Result<(Vec<SourceFile>, Vec<CompileOutput>)> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in walkdir::WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|e| Error::config_error(e.to_string()))?;
                if entry.file_type().is_file() && entry.path().extension().map_or(false, |x| x == "java") {
                    files.push(SourceFile::read(entry.path())?);
                }
            }
        } else {
            files.push(SourceFile::read(path)?);
        }
    }
    let outputs = compile_units(&files, config);
    Ok((files, outputs))
}

/// Render the diagnostics of several units as one numbered log
pub fn render_all(sources: &[SourceFile], outputs: &[CompileOutput]) -> String {
    let mut map = SourceMap::new();
    for s in sources {
        map.insert(s.file_name(), s.text.clone());
    }
    let merged = Diagnostics::merge(outputs.iter().map(|o| o.diagnostics.clone()));
    diagnostics::render(&merged, &map)
}

fn check_unit(
    source: &SourceFile,
    unit: CompilationUnit,
    syntax: Vec<Diagnostic>,
    sources: &SourceIndex,
    platform: Arc<dyn ClassPath>,
    config: &Config,
) -> CompileOutput {
    let file = source.file_name().to_string();
    let index = CompositeIndex::new(vec![Arc::new(sources.clone()), platform]);
    let ctx = Context { config, sources, index: &index, file: &source.path };
    let mut log = DiagnosticLog::new(file.clone());
    log.extend(syntax);
    let (bindings, found) = wash::check(&unit, &ctx);
    log.extend(found);
    let plans = codegen::plan_unit(&unit, &bindings, &ctx);
    log::debug!("{}: {} diagnostics before overrides", file, log.len());
    CompileOutput { file, unit, bindings, diagnostics: log.finish(config), plans }
}
