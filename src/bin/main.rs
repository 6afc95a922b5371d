use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};

use jfront::ast::{ClassMember, TypeDecl};
use jfront::config::SeverityOverride;
use jfront::diagnostics::{self, Category, SourceMap};
use jfront::{Config, LanguageLevel, SourceFile};

#[derive(Parser)]
#[command(name = "jfront")]
#[command(about = "Java compiler front end: parse, check and plan class shapes")]
#[command(version)]
struct Cli {
    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Options {
    /// Source language level (e.g. 1.8, 11, 17)
    #[arg(long, default_value = "17")]
    source: LanguageLevel,

    /// Enable preview features
    #[arg(long)]
    preview: bool,

    /// Report a category as an error
    #[arg(long = "error", value_name = "CATEGORY")]
    errors: Vec<Category>,

    /// Report a category as a warning
    #[arg(long = "warning", value_name = "CATEGORY")]
    warnings: Vec<Category>,

    /// Drop a category entirely
    #[arg(long = "ignore", value_name = "CATEGORY")]
    ignored: Vec<Category>,
}

impl Options {
    fn config(&self) -> Config {
        let mut config = Config::new(self.source).with_preview(self.preview);
        for (list, severity) in [
            (&self.errors, SeverityOverride::Error),
            (&self.warnings, SeverityOverride::Warning),
            (&self.ignored, SeverityOverride::Ignore),
        ] {
            for category in list {
                config = config.with_override(*category, severity);
            }
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check .java files (directories are searched recursively)
    Check {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        options: Options,
    },

    /// Parse a .java file and show its declarations
    Parse {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Dump the full syntax tree
        #[arg(short, long)]
        detailed: bool,

        #[command(flatten)]
        options: Options,
    },

    /// Lexically analyze a .java file
    Lex {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Show token locations
        #[arg(short, long)]
        locations: bool,

        #[command(flatten)]
        options: Options,
    },

    /// Show the planned class files of a .java file
    Plan {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        options: Options,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether the input was free of errors
fn run(command: &Commands) -> Result<bool> {
    match command {
        Commands::Check { paths, options } => check(paths, &options.config()),
        Commands::Parse { input, detailed, options } => parse_file(input, *detailed, &options.config()),
        Commands::Lex { input, locations, options } => lex_file(input, *locations, &options.config()),
        Commands::Plan { input, options } => plan_file(input, &options.config()),
    }
}

fn check(paths: &[PathBuf], config: &Config) -> Result<bool> {
    let (sources, outputs) = jfront::compile_paths(paths, config)?;
    log::info!("checked {} files", sources.len());
    let text = jfront::render_all(&sources, &outputs);
    if !text.is_empty() {
        print!("{}", text);
    }
    let merged = diagnostics::Diagnostics::merge(outputs.iter().map(|o| o.diagnostics.clone()));
    if !merged.is_empty() {
        println!("{}", merged.summary());
    }
    Ok(!merged.has_errors())
}

fn read(input: &Path) -> Result<SourceFile> {
    SourceFile::read(input).with_context(|| format!("reading {}", input.display()))
}

fn parse_file(input: &Path, detailed: bool, config: &Config) -> Result<bool> {
    let source = read(input)?;
    let (unit, syntax) = jfront::on_pool(|| jfront::parser::parse_source(&source.text, config));
    if detailed {
        println!("{:#?}", unit);
    } else {
        if let Some(package) = &unit.package_decl {
            println!("package {}", package.name);
        }
        for decl in &unit.type_decls {
            outline(decl, 0);
        }
    }
    report(&source, syntax, config)
}

fn outline(decl: &TypeDecl, depth: usize) {
    println!("{:indent$}{} {} ({} members)", "", decl.kind(), decl.name(), decl.members().len(), indent = depth * 2);
    for member in decl.members() {
        if let ClassMember::TypeDecl(nested) = member {
            outline(nested, depth + 1);
        }
    }
}

fn lex_file(input: &Path, locations: bool, config: &Config) -> Result<bool> {
    let source = read(input)?;
    let (tokens, lexical) = jfront::parser::tokenize(&source.text, config.language_level);
    for token in tokens {
        if locations {
            println!("{:?} at {}:{}", token.token, token.span.start.line, token.span.start.column);
        } else {
            println!("{:?}: '{}'", token.token, token.lexeme);
        }
    }
    report(&source, lexical, config)
}

fn plan_file(input: &Path, config: &Config) -> Result<bool> {
    let source = read(input)?;
    let output = jfront::compile_unit(&source, config);
    print!("{}", jfront::codegen::describe(&output.plans));
    let text = output.render(&source);
    if !text.is_empty() {
        eprint!("{}", text);
    }
    Ok(!output.has_errors())
}

fn report(source: &SourceFile, found: Vec<diagnostics::Diagnostic>, config: &Config) -> Result<bool> {
    let mut log = diagnostics::DiagnosticLog::new(source.file_name());
    log.extend(found);
    let list = log.finish(config);
    let text = diagnostics::render(&list, &SourceMap::single(source.file_name(), source.text.clone()));
    if !text.is_empty() {
        eprint!("{}", text);
    }
    Ok(!list.has_errors())
}
