use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The path to the configuration file
    #[arg(short, long, global = true, default_value = "plantilla.yaml")]
    config_file: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    command: PlantillaCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The directory to write the default configuration into
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Overwrite an existing configuration file
    #[arg(short, long, default_value = "false")]
    force: bool,
}

#[derive(Parser)]
struct ExpandArgs {
    /// Persisted HTML file to expand
    file: PathBuf,

    /// Print editor HTML instead of the node tree
    #[arg(long, default_value = "false")]
    editor_html: bool,
}

#[derive(Parser)]
struct FlattenArgs {
    /// Editor HTML file to flatten
    file: PathBuf,
}

#[derive(Parser)]
struct TagArgs {
    /// Labels to derive variable tags from
    #[arg(required = true)]
    labels: Vec<String>,
}

#[derive(Parser)]
struct CatalogArgs {
    /// Base form JSON; without it only static variables are listed
    form: Option<PathBuf>,

    /// Print the catalog as YAML instead of a table
    #[arg(long, default_value = "false")]
    yaml: bool,
}

#[derive(Parser)]
struct MigrateArgs {
    /// Stored template JSON, possibly in the legacy shape
    file: PathBuf,
}

#[derive(Parser)]
struct SaveArgs {
    /// Template JSON to validate and save
    file: PathBuf,

    /// Editor HTML to flatten as the document content
    #[arg(long)]
    editor_html: Option<PathBuf>,
}

#[derive(Parser)]
struct LoadArgs {
    /// Id of the template to load
    id: String,
}

#[derive(Subcommand)]
enum PlantillaCommand {
    /// Write a default plantilla.yaml
    Init(InitArgs),

    /// Expand persisted HTML into its structured form
    Expand(ExpandArgs),

    /// Flatten editor HTML into persisted HTML
    Flatten(FlattenArgs),

    /// Derive variable tags from labels
    Tag(TagArgs),

    /// List the variables available to a form's templates
    Catalog(CatalogArgs),

    /// Migrate a stored template to the current shape
    Migrate(MigrateArgs),

    /// Validate a template and write it to the store
    Save(SaveArgs),

    /// Read a template from the store
    Load(LoadArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plantilla=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config_file = args.config_file.as_deref();

    match &args.command {
        PlantillaCommand::Init(args) => {
            commands::init::run(args).await?;
        }
        PlantillaCommand::Expand(args) => {
            commands::expand::run(args, config_file).await?;
        }
        PlantillaCommand::Flatten(args) => {
            commands::flatten::run(args, config_file).await?;
        }
        PlantillaCommand::Tag(args) => {
            commands::tag::run(args);
        }
        PlantillaCommand::Catalog(args) => {
            commands::catalog::run(args, config_file).await?;
        }
        PlantillaCommand::Migrate(args) => {
            commands::migrate::run(args).await?;
        }
        PlantillaCommand::Save(args) => {
            commands::store::save(args, config_file).await?;
        }
        PlantillaCommand::Load(args) => {
            commands::store::load(args, config_file).await?;
        }
    }

    Ok(())
}
