mod config;
mod plugins;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kiln_lib::{BuildOptions, Component, Plugin, build, discover_components};
use tracing_subscriber::EnvFilter;

use config::CliConfig;
use plugins::CopyPlugin;

/// kiln - component-oriented build pipeline
#[derive(Parser)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Discover components and render them into the dist tree
  Build {
    /// Path to the configuration file (default: kiln.toml)
    #[arg(default_value = "kiln.toml")]
    config: PathBuf,
  },

  /// List the components discovered under the configured root
  List {
    /// Path to the configuration file (default: kiln.toml)
    #[arg(default_value = "kiln.toml")]
    config: PathBuf,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt().with_env_filter(filter).without_time().init();

  match cli.command {
    Commands::Build { config } => cmd_build(&config).await,
    Commands::List { config } => cmd_list(&config),
  }
}

fn load_config(path: &Path) -> Result<CliConfig> {
  if !path.exists() {
    eprintln!("error: config file not found: {}", path.display());
    std::process::exit(1);
  }
  CliConfig::load(path)
}

fn build_options(config: &CliConfig) -> BuildOptions {
  BuildOptions {
    project_name: config.project_name.clone(),
    project_version: config.project_version.clone(),
    project_description: config.project_description.clone(),
    component_root: config.root.clone(),
    manifest_name: config.manifest.clone(),
    dist: config.dist.clone(),
    ..BuildOptions::default()
  }
}

async fn cmd_build(config_path: &Path) -> Result<()> {
  let config = load_config(config_path)?;
  tracing::debug!(config = %config_path.display(), "configuration loaded");

  let plugins: Vec<Arc<dyn Plugin>> = config
    .plugins
    .iter()
    .map(|p| Arc::new(CopyPlugin::new(&p.name, &p.entry)) as Arc<dyn Plugin>)
    .collect();

  let options = build_options(&config);
  let components = build(&options, &plugins).await?;

  let mut failures = 0usize;
  for component in &components {
    for (plugin_name, result) in &component.render_results {
      for error in result.errors() {
        failures += 1;
        eprintln!("error: {}/{}: {}", component.name, plugin_name, error);
      }
    }
  }

  println!("{} component(s) rendered into {}", components.len(), config.dist.display());

  if failures > 0 {
    eprintln!("error: {} render failure(s)", failures);
    std::process::exit(1);
  }

  Ok(())
}

fn cmd_list(config_path: &Path) -> Result<()> {
  let config = load_config(config_path)?;
  let components = discover_components(&config.root, &config.manifest)?;

  if components.is_empty() {
    println!("no components found under {}", config.root.display());
    return Ok(());
  }

  for component in &components {
    print_component(component);
  }

  Ok(())
}

fn print_component(component: &Component) {
  println!("{}  {}", component.name, component.path.display());
}
