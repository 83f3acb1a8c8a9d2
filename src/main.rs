use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use artifactory_libver::artifact::{ArtifactInfo, LibraryArtifact};
use artifactory_libver::auth::{DEFAULT_TOKEN_ENV, token_from_env};
use artifactory_libver::config::Config;
use artifactory_libver::entity::Entity;
use artifactory_libver::library_info::{LibraryInfoBuilder, successful};
use artifactory_libver::registries::http_client::create_shared_client;
use artifactory_libver::registries::repository::{RepositoryFilter, list_repositories};
use artifactory_libver::reports::{
    ReportEntry, generate_json_report, generate_markdown_report, generate_text_report,
};

#[derive(Parser)]
#[command(name = "libver")]
#[command(about = "Latest versions and dependency snippets for Artifactory packages", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file (LIBVER_* environment variables override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Environment variable holding the bearer token
    #[arg(long, global = true, default_value = DEFAULT_TOKEN_ENV)]
    token_env: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

/// How the artifact is declared in a build file
#[derive(Args, Debug)]
struct Declaration {
    #[arg(short, long)]
    group: Option<String>,

    #[arg(short, long)]
    artifact: String,

    #[arg(long)]
    packaging: Option<String>,

    #[arg(long)]
    scope: Option<String>,

    /// May be repeated
    #[arg(long = "classifier")]
    classifiers: Vec<String>,

    /// Emit Gradle call notation with an explicit transitive flag
    #[arg(long)]
    transitive: Option<bool>,
}

impl Declaration {
    fn into_artifact(self, repo: impl Into<String>) -> LibraryArtifact {
        let mut lib = LibraryArtifact::new(repo, self.artifact);
        lib.group = self.group;
        lib.packaging = self.packaging;
        lib.scope = self.scope;
        lib.classifiers = self.classifiers;
        lib.transitive = self.transitive;
        lib
    }
}

#[derive(Args, Debug)]
struct Rendering {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// One snippet per declared classifier
    #[arg(long)]
    classifier_variants: bool,

    /// Replace the Scala suffix with `?`
    #[arg(long)]
    template: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the latest version of one artifact
    Resolve {
        #[arg(short, long)]
        repo: String,

        #[command(flatten)]
        declaration: Declaration,

        #[command(flatten)]
        rendering: Rendering,
    },
    /// Resolve every entity of a JSON file (an array of catalog entities)
    Batch {
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        rendering: Rendering,
    },
    /// List repository keys
    Repos {
        /// Keep only these package types (may be repeated)
        #[arg(long = "package-type")]
        package_types: Vec<String>,

        /// Keep only these repository types: local, remote, virtual, federated
        #[arg(long = "repo-type")]
        repo_types: Vec<String>,

        /// Drop keys matching `/pattern/flags` (may be repeated)
        #[arg(long = "exclude")]
        excluded: Vec<String>,
    },
    /// Print snippets for a known version without contacting Artifactory
    Snippets {
        #[arg(long, default_value = "")]
        repo: String,

        #[arg(short, long)]
        version: Option<String>,

        #[command(flatten)]
        declaration: Declaration,

        #[command(flatten)]
        rendering: Rendering,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Resolve {
            repo,
            declaration,
            rendering,
        } => {
            let lib = declaration.into_artifact(repo);
            run_resolve(cli.config.as_deref(), &cli.token_env, lib, rendering).await
        }
        Commands::Batch { file, rendering } => {
            run_batch(cli.config.as_deref(), &cli.token_env, &file, rendering).await
        }
        Commands::Repos {
            package_types,
            repo_types,
            excluded,
        } => {
            let filter = RepositoryFilter::from_options(&package_types, &repo_types, &excluded);
            run_repos(cli.config.as_deref(), &cli.token_env, filter).await
        }
        Commands::Snippets {
            repo,
            version,
            declaration,
            rendering,
        } => {
            let mut lib = declaration.into_artifact(repo);
            lib.version = version;
            run_snippets(lib, rendering)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn make_builder(config: &Config, token_env: &str) -> anyhow::Result<LibraryInfoBuilder> {
    let http = create_shared_client().context("Failed to create HTTP client")?;
    let builder = LibraryInfoBuilder::new(config, http)?;
    Ok(match token_from_env(token_env) {
        Some(token) => builder.with_token(token),
        None => {
            tracing::debug!("No token in {}, sending anonymous requests", token_env);
            builder
        }
    })
}

fn print_report(
    config: Option<&Config>,
    infos: Vec<ArtifactInfo>,
    rendering: &Rendering,
) -> anyhow::Result<()> {
    let artifactory_url = config.and_then(|c| c.artifactory_url().ok());
    let entries: Vec<ReportEntry> = infos
        .into_iter()
        .map(|info| {
            ReportEntry::new(info, rendering.classifier_variants, rendering.template)
                .with_browse_url(artifactory_url)
        })
        .collect();

    let output = match rendering.format {
        OutputFormat::Text => generate_text_report(&entries),
        OutputFormat::Json => generate_json_report(&entries).context("Failed to serialize report")?,
        OutputFormat::Markdown => generate_markdown_report(artifactory_url, &entries),
    };
    println!("{output}");
    Ok(())
}

async fn run_resolve(
    config_path: Option<&Path>,
    token_env: &str,
    lib: LibraryArtifact,
    rendering: Rendering,
) -> anyhow::Result<ExitCode> {
    let config = load_config(config_path)?;
    let builder = make_builder(&config, token_env)?;

    let artifact = lib.artifact.clone();
    let info = builder
        .resolve(lib)
        .await
        .with_context(|| format!("Failed to resolve {artifact}"))?;

    print_report(Some(&config), vec![info], &rendering)?;
    Ok(ExitCode::SUCCESS)
}

async fn run_batch(
    config_path: Option<&Path>,
    token_env: &str,
    file: &Path,
    rendering: Rendering,
) -> anyhow::Result<ExitCode> {
    let config = load_config(config_path)?;
    let builder = make_builder(&config, token_env)?;

    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let entities: Vec<Entity> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of entities", file.display()))?;

    if entities.is_empty() {
        eprintln!("No entities found in {}", file.display());
        return Ok(ExitCode::SUCCESS);
    }

    let total = entities.len();
    let infos = successful(builder.build_all(&entities).await);
    let resolved = infos.len();
    print_report(Some(&config), infos, &rendering)?;

    if resolved == 0 {
        eprintln!("None of the {total} entities could be resolved");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_repos(
    config_path: Option<&Path>,
    token_env: &str,
    filter: RepositoryFilter,
) -> anyhow::Result<ExitCode> {
    let config = load_config(config_path)?;
    let builder = make_builder(&config, token_env)?;

    let repos = list_repositories(builder.client()).await?;
    for key in filter.apply(&repos) {
        println!("{key}");
    }
    Ok(ExitCode::SUCCESS)
}

fn run_snippets(lib: LibraryArtifact, rendering: Rendering) -> anyhow::Result<ExitCode> {
    print_report(None, vec![ArtifactInfo::new(lib)], &rendering)?;
    Ok(ExitCode::SUCCESS)
}
