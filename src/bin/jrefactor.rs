//! CLI for the java-refactor engine.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use java_refactor::config::EngineConfig;
use java_refactor::diff::{file_diff, DiffSummary};
use java_refactor::edit::{self, AnchorKind, AnnotationPlacement, FieldSpec, Visibility};
use java_refactor::imports;
use java_refactor::locator::{self, Declaration, DeclarationKind};
use java_refactor::rename::{self, rename_across, FileStatus, RenameRequest, RenameSummary};
use java_refactor::source::SourceFile;
use java_refactor::types::TypeResolver;
use java_refactor::usage::UsageFinder;
use std::io;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

#[derive(Parser)]
#[command(name = "jrefactor")]
#[command(author, version, about = "Scope-aware refactoring for Java sources", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Engine config file (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log decisions at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only count `this.x` inside the declaring type as a field usage
    #[arg(long, global = true)]
    strict: bool,
}

/// A 1-based position in a file.
#[derive(Args)]
struct Position {
    /// Line number, starting at 1
    #[arg(short, long)]
    line: usize,

    /// Column number, starting at 1
    #[arg(short, long)]
    column: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// List the declarations in a file
    Declarations {
        file: PathBuf,

        /// Only show one kind (class, field, method, parameter, ...)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Show the static type of the name at a position
    TypeOf {
        file: PathBuf,

        #[command(flatten)]
        position: Position,
    },

    /// List the usages of the declaration named at a position
    Usages {
        file: PathBuf,

        #[command(flatten)]
        position: Position,
    },

    /// Rename the declaration named at a position within its file
    Rename {
        file: PathBuf,

        #[command(flatten)]
        position: Position,

        /// New name
        #[arg(short, long)]
        to: String,

        /// Print a diff instead of writing the file
        #[arg(long)]
        dry_run: bool,
    },

    /// Rename calls to a method on receivers of a given type across files
    RenameMethod {
        /// Directory or file to search
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Current method name
        #[arg(short, long)]
        method: String,

        /// Static type of the receivers to update
        #[arg(short, long)]
        receiver: String,

        /// New method name
        #[arg(short, long)]
        to: String,

        /// Print diffs instead of writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Rename a type and update the files that refer to it
    RenameClass {
        /// Directory or file to search
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Current type name
        #[arg(short, long)]
        from: String,

        /// New type name
        #[arg(short, long)]
        to: String,

        /// Package the type is declared in
        #[arg(short, long)]
        package: Option<String>,

        /// Print diffs instead of writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Add an import unless the class is already visible
    AddImport {
        file: PathBuf,

        /// Full class name, e.g. java.util.List
        import: String,

        /// Print a diff instead of writing the file
        #[arg(long)]
        dry_run: bool,
    },

    /// Add an annotation to the declaration named at a position
    AddAnnotation {
        file: PathBuf,

        #[command(flatten)]
        position: Position,

        /// Annotation text, e.g. '@Table(name = "users")'
        annotation: String,

        /// Where to insert: above-declaration or before-first-annotation
        #[arg(long, default_value = "above-declaration", value_parser = parse_placement)]
        placement: AnnotationPlacement,

        /// Print a diff instead of writing the file
        #[arg(long)]
        dry_run: bool,
    },

    /// Add a field to a type
    AddField {
        file: PathBuf,

        /// Type to add the field to
        #[arg(long = "class")]
        class_name: String,

        /// Declared type of the field
        #[arg(long = "type")]
        type_name: String,

        /// Field name
        #[arg(long)]
        name: String,

        /// Where to insert: beginning-of-body, before-first-field, after-last-field, ...
        #[arg(long, default_value = "after-last-field", value_parser = parse_anchor)]
        anchor: AnchorKind,

        /// Make the field public instead of private
        #[arg(long)]
        public: bool,

        #[arg(long = "static")]
        is_static: bool,

        #[arg(long = "final")]
        is_final: bool,

        /// Initializer expression
        #[arg(long)]
        init: Option<String>,

        /// Print a diff instead of writing the file
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let mut config = match &cli.global.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if cli.global.strict {
        config = config.strict();
    }

    match cli.command {
        Commands::Declarations { file, kind } => cmd_declarations(&file, kind.as_deref()),
        Commands::TypeOf { file, position } => cmd_type_of(&file, &position),
        Commands::Usages { file, position } => cmd_usages(&config, &file, &position),
        Commands::Rename {
            file,
            position,
            to,
            dry_run,
        } => cmd_rename(&config, &file, &position, &to, dry_run),
        Commands::RenameMethod {
            path,
            method,
            receiver,
            to,
            dry_run,
        } => {
            let request = RenameRequest::method_calls(method, receiver, to)
                .with_options(config.rename_options());
            cmd_rename_across(&config, &path, &request, dry_run)
        }
        Commands::RenameClass {
            path,
            from,
            to,
            package,
            dry_run,
        } => cmd_rename_class(&config, &path, &from, &to, package.as_deref(), dry_run),
        Commands::AddImport {
            file,
            import,
            dry_run,
        } => {
            let source = open(&file)?;
            let updated = imports::add_import_path(&source, &import)
                .with_context(|| format!("Cannot import {import}"))?;
            finish(&source, &updated, dry_run)
        }
        Commands::AddAnnotation {
            file,
            position,
            annotation,
            placement,
            dry_run,
        } => cmd_add_annotation(&file, &position, &annotation, placement, dry_run),
        Commands::AddField {
            file,
            class_name,
            type_name,
            name,
            anchor,
            public,
            is_static,
            is_final,
            init,
            dry_run,
        } => {
            let mut spec = FieldSpec::new(type_name, name);
            if public {
                spec = spec.with_visibility(Visibility::Public);
            }
            if is_static {
                spec = spec.static_field();
            }
            if is_final {
                spec = spec.final_field();
            }
            if let Some(init) = init {
                spec = spec.with_initializer(init);
            }
            cmd_add_field(&config, &file, &class_name, &spec, anchor, dry_run)
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn parse_anchor(value: &str) -> std::result::Result<AnchorKind, String> {
    AnchorKind::from_name(value).ok_or_else(|| {
        let names: Vec<&str> = AnchorKind::ALL.iter().map(AnchorKind::name).collect();
        format!("unknown anchor '{value}', expected one of: {}", names.join(", "))
    })
}

fn parse_placement(value: &str) -> std::result::Result<AnnotationPlacement, String> {
    AnnotationPlacement::from_name(value).ok_or_else(|| {
        let names: Vec<&str> = AnnotationPlacement::ALL.iter().map(AnnotationPlacement::name).collect();
        format!("unknown placement '{value}', expected one of: {}", names.join(", "))
    })
}

fn open(path: &Path) -> Result<SourceFile> {
    SourceFile::open(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Prints a diff for a dry run, else writes the file.
fn finish(before: &SourceFile, after: &SourceFile, dry_run: bool) -> Result<()> {
    if before.text() == after.text() {
        println!("No changes");
        return Ok(());
    }
    if dry_run {
        print!("{}", file_diff(before, after));
        println!("\n{}", DiffSummary::from_files(before, after));
    } else {
        after.save().context("Failed to write file")?;
        println!("{}", DiffSummary::from_files(before, after));
    }
    Ok(())
}

fn location(file: &SourceFile, node: Node<'_>) -> String {
    let (line, column) = file.position_of(node.start_byte());
    format!("{}:{}", line + 1, column + 1)
}

fn node_at<'tree>(file: &'tree SourceFile, position: &Position) -> Result<Node<'tree>> {
    let line = position.line.checked_sub(1).context("Lines start at 1")?;
    let column = position.column.checked_sub(1).context("Columns start at 1")?;
    file.node_at(line, column)
        .ok_or_else(|| anyhow!("No node at {}:{}", position.line, position.column))
}

/// The declaration a position names: its own name, or a reference to it.
fn target_declaration<'tree>(
    file: &'tree SourceFile,
    resolver: &TypeResolver<'tree>,
    node: Node<'tree>,
) -> Option<Declaration<'tree>> {
    if let Some(decl) = locator::declaration_at(file, node) {
        return Some(decl);
    }
    let name = file.text_of(node);
    match node.kind() {
        "identifier" => {
            let chain = resolver.chain_at(node);
            let is_call = node
                .parent()
                .is_some_and(|parent| parent.kind() == "method_invocation"
                    && parent.child_by_field_name("name") == Some(node));
            if is_call {
                chain.resolve_method(file, name)
            } else {
                chain.resolve(file, name)
            }
        }
        "type_identifier" => locator::find_type_by_name(file, name),
        _ => None,
    }
}

fn cmd_declarations(path: &Path, kind: Option<&str>) -> Result<()> {
    let kind = kind
        .map(|name| {
            DeclarationKind::from_name(name).ok_or_else(|| anyhow!("Unknown declaration kind '{name}'"))
        })
        .transpose()?;
    let file = open(path)?;

    for decl in locator::all_declarations(&file, file.root()) {
        if kind.is_some_and(|kind| kind != decl.kind) {
            continue;
        }
        let declared = decl.type_text(&file).map(|t| format!(": {t}")).unwrap_or_default();
        println!(
            "{}:{} {} {}{declared}",
            path.display(),
            location(&file, decl.name),
            decl.kind,
            decl.name_text(&file),
        );
    }
    Ok(())
}

fn cmd_type_of(path: &Path, position: &Position) -> Result<()> {
    let file = open(path)?;
    let node = node_at(&file, position)?;
    let resolver = TypeResolver::new(&file);

    let resolved = match locator::declaration_at(&file, node) {
        Some(decl) => resolver
            .declaration_type(&decl)
            .ok_or_else(|| anyhow!("'{}' has no declared type", decl.name_text(&file)))?,
        None => resolver.receiver_type(node),
    };
    match &resolved.package {
        Some(package) => println!("{resolved} ({package})"),
        None => println!("{resolved}"),
    }
    Ok(())
}

fn cmd_usages(config: &EngineConfig, path: &Path, position: &Position) -> Result<()> {
    let file = open(path)?;
    let node = node_at(&file, position)?;
    let finder = UsageFinder::new(&file).with_options(config.usage_options());
    let decl = target_declaration(&file, finder.resolver(), node)
        .ok_or_else(|| anyhow!("Nothing declared at {}:{}", position.line, position.column))?;

    let scope = if decl.kind.is_type() { file.root() } else { decl.scope };
    let sites = finder.find_usages(&decl, scope);
    for site in &sites {
        println!(
            "{}:{} {:?}",
            path.display(),
            location(&file, site.reference),
            site.kind
        );
    }
    println!("{} usage(s) of {} '{}'", sites.len(), decl.kind, decl.name_text(&file));
    Ok(())
}

fn cmd_rename(
    config: &EngineConfig,
    path: &Path,
    position: &Position,
    new_name: &str,
    dry_run: bool,
) -> Result<()> {
    let file = open(path)?;
    let node = node_at(&file, position)?;
    let resolver = TypeResolver::new(&file);
    let decl = target_declaration(&file, &resolver, node)
        .ok_or_else(|| anyhow!("Nothing declared at {}:{}", position.line, position.column))?;

    let renamed = rename::rename_with(&file, decl.name, new_name, &config.rename_options())
        .context("Rename failed")?
        .ok_or_else(|| anyhow!("Cannot rename {} '{}'", decl.kind, decl.name_text(&file)))?;

    for (old, new) in &renamed.renamed_variables {
        println!("Renamed variable {old} -> {new}");
    }
    if decl.kind.is_type() {
        if let Some(suggested) = rename::suggested_path(&file, decl.name_text(&file), new_name) {
            println!("Consider moving the file to {}", suggested.display());
        }
    }
    finish(&file, &renamed.file, dry_run)
}

fn cmd_rename_across(
    config: &EngineConfig,
    path: &Path,
    request: &RenameRequest,
    dry_run: bool,
) -> Result<()> {
    let files = config
        .workspace(path)
        .load()
        .with_context(|| format!("Failed to load sources under {}", path.display()))?;
    report(&files, &rename_across(&files, request), dry_run)
}

fn cmd_rename_class(
    config: &EngineConfig,
    path: &Path,
    from: &str,
    to: &str,
    package: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let options = config.rename_options();
    let mut files = config
        .workspace(path)
        .load()
        .with_context(|| format!("Failed to load sources under {}", path.display()))?;

    // The declaring file gets a full rename; every other file only has its
    // references and imports updated.
    let declaring = files.iter().position(|file| {
        locator::find_type_by_name(file, from).is_some()
            && package.is_none_or(|package| locator::package_name(file).as_deref() == Some(package))
    });
    let Some(index) = declaring else {
        bail!("No file declares type '{from}'");
    };
    let declaring = files.remove(index);
    let renamed = rename::rename_class_with(&declaring, from, to, &options)?
        .ok_or_else(|| anyhow!("Cannot rename '{from}'"))?;

    let request = RenameRequest::class_references(from, package, to).with_options(options);
    let outcomes = rename_across(&files, &request);

    if let Some(suggested) = rename::suggested_path(&declaring, from, to) {
        println!("Consider moving {} to {}", declaring.path().unwrap_or(Path::new("?")).display(), suggested.display());
    }
    finish(&declaring, &renamed.file, dry_run)?;
    report(&files, &outcomes, dry_run)
}

fn report(files: &[SourceFile], outcomes: &[rename::FileOutcome], dry_run: bool) -> Result<()> {
    for (before, outcome) in files.iter().zip(outcomes) {
        match (&outcome.status, &outcome.file) {
            (FileStatus::Changed, Some(after)) if dry_run => print!("{}", file_diff(before, after)),
            (FileStatus::Changed, Some(after)) => after
                .save()
                .with_context(|| format!("Failed to write {:?}", outcome.path))?,
            (FileStatus::Failed(message), _) => {
                eprintln!("{}: {message}", outcome.path.as_deref().unwrap_or(Path::new("?")).display())
            }
            _ => {}
        }
    }

    let summary = RenameSummary::from_outcomes(outcomes);
    println!(
        "{} of {} file(s) changed, {} site(s), {} failed",
        summary.changed_files, summary.total_files, summary.total_sites, summary.failed_files
    );
    Ok(())
}

fn cmd_add_field(
    config: &EngineConfig,
    path: &Path,
    class_name: &str,
    spec: &FieldSpec,
    anchor: AnchorKind,
    dry_run: bool,
) -> Result<()> {
    let file = open(path)?;
    let decl = locator::find_type_by_name(&file, class_name)
        .ok_or_else(|| anyhow!("No type named '{class_name}' in {}", path.display()))?;
    let updated = edit::add_field_with(&file, decl.node, spec, anchor, &config.indent)?
        .ok_or_else(|| anyhow!("'{class_name}' cannot hold fields"))?;
    finish(&file, &updated, dry_run)
}

fn cmd_add_annotation(
    path: &Path,
    position: &Position,
    annotation: &str,
    placement: AnnotationPlacement,
    dry_run: bool,
) -> Result<()> {
    let file = open(path)?;
    let node = node_at(&file, position)?;
    let decl = locator::declaration_at(&file, node)
        .ok_or_else(|| anyhow!("No declaration named at {}:{}", position.line, position.column))?;
    let name = decl.name_text(&file).to_string();
    match edit::add_annotation(&file, decl.node, annotation, placement)
        .with_context(|| format!("Cannot annotate '{name}'"))?
    {
        Some(updated) => finish(&file, &updated, dry_run),
        None => {
            println!("'{name}' is already annotated with {annotation}");
            Ok(())
        }
    }
}
