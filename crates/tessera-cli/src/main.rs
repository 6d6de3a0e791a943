mod output;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tessera_core::{TesseraConfig, CONFIG_FILE_NAME};
use tessera_doc::migrate::migrate_document_with;
use tessera_doc::patch::PatchOperation;
use tessera_doc::registry::ComponentCategory;
use tessera_doc::schema::check_wiring;
use tessera_doc::{
    apply_operation, build_registry, compile, decompile, invert, migrate_operation,
    parse_document, ComponentRegistry, Document, UnknownComponentPolicy,
};
use tessera_ir::portable::non_portable_components;
use tessera_ir::{validate_ir, CanonicalIr};

use output::Output;

#[derive(Parser)]
#[command(
    name = "tessera",
    version,
    about = "Tessera — engine-agnostic scene documents",
    long_about = "Validate, migrate, patch and compile Tessera scene documents.\nData goes to stdout as JSON; logs go to stderr."
)]
struct Cli {
    /// Path to the configuration file (default: ./tessera.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new document
    New {
        /// Document name
        #[arg()]
        name: String,

        /// Only the root entity, no starter camera/light/ground
        #[arg(long)]
        empty: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a document: schema, tree invariants and wiring
    Validate {
        #[arg()]
        file: PathBuf,

        /// Reject unknown component types
        #[arg(long)]
        strict: bool,
    },

    /// Compile a document to canonical IR
    Compile {
        #[arg()]
        file: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rebuild a document from canonical IR
    Decompile {
        #[arg()]
        file: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upgrade a saved document to the current format version
    Migrate {
        #[arg()]
        file: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply patch operations to a document
    Apply {
        /// Document to patch
        #[arg()]
        file: PathBuf,

        /// JSON file holding one operation or an array of operations
        #[arg()]
        operations: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the inverse of a patch operation
    Invert {
        #[arg()]
        file: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List registered component types
    Components {
        /// Only list one category (rendering, physics, audio, gameplay, logic, settings)
        #[arg(long)]
        category: Option<String>,
    },

    /// Print the effective configuration
    Config {
        /// Write it to the configuration path
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let config = load_config(&config_path, cli.config.is_some())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log.level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let registry = build_registry();
    let out = Output::new(config.output.pretty);

    match cli.command {
        Commands::New {
            name,
            empty,
            output,
        } => cmd_new(&registry, &out, &name, empty, output.as_deref()),
        Commands::Validate { file, strict } => {
            cmd_validate(&registry, &file, strict || config.validation.strict)
        }
        Commands::Compile { file, output } => {
            cmd_compile(&registry, &config, &out, &file, output.as_deref())
        }
        Commands::Decompile { file, output } => cmd_decompile(&out, &file, output.as_deref()),
        Commands::Migrate { file, output } => {
            cmd_migrate(&registry, &config, &out, &file, output.as_deref())
        }
        Commands::Apply {
            file,
            operations,
            output,
        } => cmd_apply(
            &registry,
            &config,
            &out,
            &file,
            &operations,
            output.as_deref(),
        ),
        Commands::Invert { file, output } => cmd_invert(&out, &file, output.as_deref()),
        Commands::Components { category } => cmd_components(&registry, &out, category.as_deref()),
        Commands::Config { write } => cmd_config(&config, &config_path, write),
    }
}

/// Load the configuration. A missing default file means defaults; a missing
/// file named with `--config` is an error.
fn load_config(path: &Path, explicit: bool) -> Result<TesseraConfig> {
    if !path.exists() && !explicit {
        return Ok(TesseraConfig::default());
    }
    TesseraConfig::load_from_file(path)
        .map_err(|e| anyhow!("failed to load config {}: {}", path.display(), e))
}

fn unknown_policy(strict: bool) -> UnknownComponentPolicy {
    if strict {
        UnknownComponentPolicy::Reject
    } else {
        UnknownComponentPolicy::PassThrough
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Read a saved document, upgrading it to the current format first.
fn load_document(
    registry: &ComponentRegistry,
    config: &TesseraConfig,
    path: &Path,
) -> Result<Document> {
    let raw = read_json(path)?;
    migrate_document_with(raw, registry, unknown_policy(config.validation.strict))
        .with_context(|| format!("failed to load document {}", path.display()))
}

fn cmd_new(
    registry: &ComponentRegistry,
    out: &Output,
    name: &str,
    empty: bool,
    output: Option<&Path>,
) -> Result<()> {
    let doc = if empty {
        Document::empty(name)
    } else {
        Document::default_scene(name, registry)
    };
    tracing::info!(document = %doc.id, entities = doc.entity_count(), "created document");
    out.emit(&doc, output)
}

fn cmd_validate(registry: &ComponentRegistry, file: &Path, strict: bool) -> Result<()> {
    let raw = read_json(file)?;
    let doc = parse_document(raw, registry, unknown_policy(strict))
        .with_context(|| format!("{} is not a valid document", file.display()))?;

    let wiring = check_wiring(&doc, registry);
    for issue in &wiring {
        tracing::warn!("{}", issue);
    }
    let unknown: usize = doc
        .entities
        .values()
        .flat_map(|e| e.components.iter())
        .filter(|c| !registry.contains(&c.component_type))
        .count();

    println!("{}: OK", file.display());
    println!("   entities: {}", doc.entity_count());
    println!("   assets: {}", doc.assets.len());
    println!("   wires: {} ({} unresolved)", doc.wiring.len(), wiring.len());
    if unknown > 0 {
        println!("   unknown components kept as opaque data: {}", unknown);
    }
    Ok(())
}

fn cmd_compile(
    registry: &ComponentRegistry,
    config: &TesseraConfig,
    out: &Output,
    file: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let doc = load_document(registry, config, file)?;
    let ir = compile(&doc, registry);
    let non_portable: usize = ir
        .nodes
        .iter()
        .map(|node| non_portable_components(node).len())
        .sum();
    if non_portable > 0 {
        tracing::info!(
            non_portable,
            "components outside the portable subset depend on engine-specific adapters"
        );
    }
    if config.compile.verify {
        validate_ir(&ir).map_err(|errors| {
            let joined = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n  ");
            anyhow!("compiled IR failed validation:\n  {}", joined)
        })?;
    }
    tracing::info!(nodes = ir.node_count(), document = %doc.name, "compiled document");
    out.emit(&ir, output)
}

fn cmd_decompile(out: &Output, file: &Path, output: Option<&Path>) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;
    let ir = CanonicalIr::from_json(&raw)
        .with_context(|| format!("{} is not canonical IR", file.display()))?;
    validate_ir(&ir).map_err(|errors| {
        let joined = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n  ");
        anyhow!("invalid IR:\n  {}", joined)
    })?;
    out.emit(&decompile(&ir), output)
}

fn cmd_migrate(
    registry: &ComponentRegistry,
    config: &TesseraConfig,
    out: &Output,
    file: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let doc = load_document(registry, config, file)?;
    out.emit(&doc, output)
}

/// Operations are migrated one by one; a JSON array is applied in order.
fn load_operations(path: &Path) -> Result<Vec<PatchOperation>> {
    let raw = read_json(path)?;
    let items = match raw {
        Value::Array(items) => items,
        single => vec![single],
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            migrate_operation(item)
                .with_context(|| format!("operation #{} in {}", i, path.display()))
        })
        .collect()
}

fn cmd_apply(
    registry: &ComponentRegistry,
    config: &TesseraConfig,
    out: &Output,
    file: &Path,
    operations: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let mut doc = load_document(registry, config, file)?;
    for op in load_operations(operations)? {
        doc = apply_operation(&doc, &op, registry)
            .with_context(|| format!("{} operation {} rejected", op.type_name(), op.id))?;
    }
    out.emit(&doc, output)
}

fn cmd_invert(out: &Output, file: &Path, output: Option<&Path>) -> Result<()> {
    let inverses = load_operations(file)?
        .iter()
        .rev()
        .map(invert)
        .collect::<Result<Vec<_>, _>>()?;
    match inverses.as_slice() {
        [single] => out.emit(single, output),
        _ => out.emit(&inverses, output),
    }
}

fn cmd_components(registry: &ComponentRegistry, out: &Output, category: Option<&str>) -> Result<()> {
    let defs = match category {
        Some(category) => {
            let category: ComponentCategory = category.parse()?;
            registry.list_components_by_category(category)
        }
        None => registry.list_components(),
    };
    out.emit(&defs, None)
}

fn cmd_config(config: &TesseraConfig, path: &Path, write: bool) -> Result<()> {
    if write {
        config
            .save_to_file(path)
            .map_err(|e| anyhow!("failed to write {}: {}", path.display(), e))?;
        tracing::info!("wrote {}", path.display());
    }
    print!("{}", toml::to_string(config)?);
    Ok(())
}
