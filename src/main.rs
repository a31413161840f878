use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rust_daoschema::logging::init_logging;
use rust_daoschema::naming::{NameCollisionResolver, NamingCollisionStrategy};
use rust_daoschema::provider::DefaultDataTypeBehavior;
use rust_daoschema::{
    import_simple_schema, infer_schema, load_schema, map_schema_names, ImportOptions,
    InferOptions, Settings,
};

#[derive(Parser)]
#[command(name = "rust-daoschema")]
#[command(author, version, about = "Relational schema inference and management for generated data access layers")]
struct Cli {
    /// Settings file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory; schemas are written to <data-dir>/Schemas
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer a schema from a type catalog
    Infer {
        /// Path to the type catalog JSON file
        #[arg(short = 't', long)]
        catalog: PathBuf,

        /// Root type (repeatable); defaults to every catalog type
        #[arg(short, long = "root")]
        roots: Vec<String>,

        /// Schema name (defaults to one derived from the root types)
        #[arg(short, long)]
        name: Option<String>,

        /// Add an Id key column to every table
        #[arg(long)]
        add_id: bool,

        /// Add Created/Modified audit columns to every table
        #[arg(long)]
        add_audit: bool,

        /// Split inheritance chains into one table per level
        #[arg(long)]
        inheritance: bool,

        /// Column handling for fields without a direct mapping
        #[arg(long)]
        default_data_type: Option<DefaultDataTypeBehavior>,

        /// Fail when inference produces warnings
        #[arg(long)]
        strict: bool,
    },

    /// Apply a simplified schema document
    Import {
        /// Path to the simplified schema JSON file
        #[arg(short, long)]
        schema: PathBuf,

        /// Back up an existing schema file instead of deleting it
        #[arg(long)]
        backup: bool,
    },

    /// Apply a collision-free class/property name map to a schema
    Map {
        /// Path to the schema JSON file
        #[arg(short, long)]
        schema: PathBuf,

        /// Output path for the mapped schema
        #[arg(short, long)]
        output: PathBuf,

        /// Collision strategy
        #[arg(long, default_value = "TypeSuffix")]
        strategy: NamingCollisionStrategy,

        /// Affix used by the type-based strategies
        #[arg(long, default_value = "Dao")]
        suffix: String,
    },

    /// Summarize a persisted schema
    Show {
        /// Path to the schema JSON file
        schema: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    match cli.command {
        Commands::Infer {
            catalog,
            roots,
            name,
            add_id,
            add_audit,
            inheritance,
            default_data_type,
            strict,
        } => {
            settings.add_id_field |= add_id;
            settings.add_audit_fields |= add_audit;
            settings.use_inheritance |= inheritance;
            settings.fail_on_warnings |= strict;
            if let Some(behavior) = default_data_type {
                settings.default_data_type_behavior = behavior;
            }

            let result = infer_schema(InferOptions {
                catalog_path: catalog,
                roots,
                schema_name: name,
                settings,
            })?;

            println!(
                "Schema {}: {} tables, {} foreign keys, {} xrefs",
                result.schema.name,
                result.schema.table_count(),
                result.schema.foreign_keys().len(),
                result.schema.xrefs().count()
            );
            for warning in &result.warnings {
                println!("warning: {}", warning);
            }
        }
        Commands::Import { schema, backup } => {
            settings.backup_existing |= backup;
            let schema = import_simple_schema(ImportOptions {
                simple_schema_path: schema,
                settings,
            })?;
            println!("Schema {}: {} tables", schema.name, schema.table_count());
        }
        Commands::Map {
            schema,
            output,
            strategy,
            suffix,
        } => {
            let resolver = NameCollisionResolver::new(strategy, &suffix);
            let mapped = map_schema_names(&schema, &output, &resolver)?;
            println!(
                "Mapped {} classes and {} properties to {}",
                mapped.schema_name_map.table_names_to_class_names.len(),
                mapped.schema_name_map.column_names_to_property_names.len(),
                output.display()
            );
        }
        Commands::Show { schema } => {
            let schema = load_schema(&schema)?;
            println!("{} ({})", schema.name, schema.db_type);
            for table in schema.tables() {
                println!("  {} [{}]", table.name(), table.class_name());
                for column in table.columns() {
                    let marker = if column.key() {
                        " key"
                    } else if column.as_foreign_key().is_some() {
                        " fk"
                    } else {
                        ""
                    };
                    let null = if column.allow_null() { "" } else { " not null" };
                    println!("    {} {}{}{}", column.name(), column.data_type(), null, marker);
                }
            }
            for xref in schema.xrefs() {
                println!("  xref {} <-> {}", xref.left(), xref.right());
            }
        }
    }

    Ok(())
}
