//! nanosdoc — generate Lua annotations from JSON API descriptors.
//!
//! Reads every descriptor of an API documentation repository (classes, static
//! classes, structs and the enum table) and writes a single
//! `docs/annotations.lua` for lua-language-server.
//!
//! - **GitHub mode**: `nanosdoc --owner nanos-world --repo api --ref main`
//! - **local mode**: `nanosdoc --local path/to/api`

mod collect;
mod config;
mod logging;
mod model;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use collect::github::GithubSource;
use collect::local::LocalSource;
use collect::Source;
use config::{RepoConfig, DEFAULT_API_URL};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Base name of the generated file, extension comes from the renderer.
const OUTPUT_STEM: &str = "annotations";

#[derive(Parser)]
#[command(
    name = "nanosdoc",
    about = "Generate Lua annotations from JSON API descriptors"
)]
struct Cli {
    /// Read descriptors from a local checkout instead of the GitHub API.
    /// Takes precedence over the repository options
    #[arg(long, value_name = "DIR")]
    local: Option<PathBuf>,

    /// GitHub token, sent as a bearer token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Owner of the descriptor repository
    #[arg(long, env = "REPOSITORY_OWNER")]
    owner: Option<String>,

    /// Name of the descriptor repository
    #[arg(long, env = "REPOSITORY_NAME")]
    repo: Option<String>,

    /// Branch, tag or commit to read
    #[arg(long = "ref", env = "REPOSITORY_BRANCH")]
    reference: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Output directory, must not exist yet
    #[arg(short = 'o', long, default_value = "docs")]
    output: PathBuf,

    /// Output format: lua (default), json
    #[arg(short = 'f', long, default_value = "lua")]
    format: String,

    /// Debug logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(logging::LoggingConfig::from_flags(
        cli.verbose,
        cli.quiet,
        cli.log_json,
    ));

    // Fail on a bad format before any network traffic
    let renderer = render::create_renderer(&cli.format)?;

    let source = create_source(&cli)?;
    info!("Building documentation...");
    let docs = collect::collect(source.as_ref()).context("failed to collect descriptors")?;
    info!(
        classes = docs.classes.len(),
        enums = docs.enums.len(),
        "descriptors collected"
    );

    let output = renderer.render(&docs)?;

    fs::create_dir(&cli.output).with_context(|| {
        format!("failed to create output directory: {}", cli.output.display())
    })?;
    let out_path = cli
        .output
        .join(format!("{}.{}", OUTPUT_STEM, renderer.file_extension()));
    fs::write(&out_path, output)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    info!(path = %out_path.display(), "Build finished");
    Ok(())
}

/// Local checkout when `--local` is given, otherwise the GitHub API.
fn create_source(cli: &Cli) -> Result<Box<dyn Source>> {
    if let Some(dir) = &cli.local {
        return Ok(Box::new(LocalSource::new(dir.clone())));
    }

    let config = RepoConfig {
        token: cli.token.clone(),
        owner: cli
            .owner
            .clone()
            .context("--owner is required unless --local is given")?,
        repo: cli
            .repo
            .clone()
            .context("--repo is required unless --local is given")?,
        reference: cli
            .reference
            .clone()
            .context("--ref is required unless --local is given")?,
        api_url: cli.api_url.clone(),
    };
    Ok(Box::new(GithubSource::new(config)))
}
