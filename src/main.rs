use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use types_ledger::code_owners;
use types_ledger::config::{Options, cache_db_path, log_path};
use types_ledger::logging;
use types_ledger::packages::AllPackages;
use types_ledger::version::cache::Cache;
use types_ledger::version::client::CachedClient;
use types_ledger::version::reconcile::calculate_and_save;
use types_ledger::version::registries::NpmRegistry;
use types_ledger::version::registry::NpmInfoClient;

#[derive(Parser)]
#[command(name = "types-ledger")]
#[command(version, about = "Version ledger and CODEOWNERS tooling for @types packages")]
struct Cli {
    /// JSON options file; missing fields use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare parsed packages with npm and write versions.json and version-changes.json
    CalculateVersions {
        /// Bump every package even if its contents are unchanged
        #[arg(long)]
        force_update: bool,
    },
    /// Generate .github/CODEOWNERS in the DefinitelyTyped checkout
    CodeOwners,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = match &cli.config {
        Some(path) => Options::from_file(path)
            .with_context(|| format!("Failed to read options from {:?}", path))?,
        None => Options::default(),
    };
    let _guard = logging::init(&log_path(&options.data_dir))?;

    match cli.command {
        Command::CalculateVersions { force_update } => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(calculate_versions(&options, force_update)),
        Command::CodeOwners => generate_code_owners(&options),
    }
}

async fn calculate_versions(options: &Options, force_update: bool) -> anyhow::Result<()> {
    let all_packages = AllPackages::read(&options.data_dir)?;
    let registry = NpmRegistry::new(&options.registry.url);

    let client: Box<dyn NpmInfoClient> = if options.cache.enabled {
        let db_path = cache_db_path();
        if let Some(dir) = db_path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create cache directory {:?}", dir))?;
        }
        Box::new(CachedClient::new(Cache::new(&db_path)?, registry))
    } else {
        Box::new(registry)
    };

    calculate_and_save(
        &all_packages,
        force_update,
        client.as_ref(),
        options.registry.concurrency,
        &options.data_dir,
    )
    .await?;
    Ok(())
}

fn generate_code_owners(options: &Options) -> anyhow::Result<()> {
    let all_packages = AllPackages::read(&options.data_dir)?;
    code_owners::write(&options.definitely_typed_path, all_packages.all_typings())
        .context("Failed to write CODEOWNERS")?;
    Ok(())
}
