#![deny(unsafe_code)]

//! Keel CLI — inspect declarative build-model manifests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use keel_manifest::declared::DeclaredElement;
use keel_manifest::ModelManifest;
use keel_model::NamedContainer;

/// Keel — a named, rule-backed build-model container.
#[derive(Parser)]
#[command(name = "keel", version, about, long_about = None)]
struct Cli {
    /// Path to the model manifest.
    #[arg(short, long, default_value = "keel.toml")]
    manifest: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the model built from the manifest.
    Show {
        /// Emit a JSON report instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List the model's rules in registration order.
    Rules,

    /// Look up a name in the model, running rules on a miss.
    Resolve {
        /// The element name to resolve.
        name: String,
    },

    /// Parse and validate the manifest without building the model.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing subscriber with verbosity level
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Show { json } => cmd_show(&load_manifest(&cli.manifest).await?, json)?,
        Commands::Rules => cmd_rules(&load_manifest(&cli.manifest).await?)?,
        Commands::Resolve { name } => cmd_resolve(&load_manifest(&cli.manifest).await?, &name)?,
        Commands::Check => cmd_check(&cli.manifest).await?,
    }

    Ok(())
}

/// JSON report emitted by `show --json`.
#[derive(Serialize)]
struct ShowReport {
    model: String,
    display_name: String,
    elements: Vec<ElementReport>,
    rules: Vec<String>,
}

#[derive(Serialize)]
struct ElementReport {
    name: String,
    kind: String,
    properties: BTreeMap<String, String>,
}

fn cmd_show(manifest: &ModelManifest, json: bool) -> Result<()> {
    let container: NamedContainer<DeclaredElement> = manifest.build_container();

    if json {
        let report = ShowReport {
            model: manifest.model.name.clone(),
            display_name: container.display_name(),
            elements: container
                .as_map()
                .into_iter()
                .map(|(name, element)| ElementReport {
                    name,
                    kind: element.kind,
                    properties: element.properties,
                })
                .collect(),
            rules: container
                .rules()
                .iter()
                .map(|rule| rule.description())
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", container.display_name());
    for (name, element) in container.as_map() {
        if element.kind.is_empty() {
            println!("  {name}");
        } else {
            println!("  {name} ({})", element.kind);
        }
        for (key, value) in &element.properties {
            println!("    {key} = {value}");
        }
    }
    println!(
        "{} element(s), {} rule(s)",
        container.len(),
        container.rules().len()
    );
    Ok(())
}

fn cmd_rules(manifest: &ModelManifest) -> Result<()> {
    let container = manifest.build_container();
    let rules = container.rules();
    if rules.is_empty() {
        println!("no rules declared.");
        return Ok(());
    }
    for (i, rule) in rules.iter().enumerate() {
        println!("{}. {}", i + 1, rule.description());
    }
    Ok(())
}

fn cmd_resolve(manifest: &ModelManifest, name: &str) -> Result<()> {
    let container = manifest.build_container();
    let registered = container.as_map().contains_key(name);

    match container.find_by_name(name)? {
        Some(element) => {
            let origin = if registered {
                "declared in the manifest"
            } else {
                "materialized by a rule"
            };
            println!("'{name}' resolved ({origin})");
            if !element.kind.is_empty() {
                println!("  kind = {}", element.kind);
            }
            for (key, value) in &element.properties {
                println!("  {key} = {value}");
            }
        }
        None => println!("'{name}' did not resolve."),
    }
    Ok(())
}

async fn cmd_check(path: &Path) -> Result<()> {
    load_manifest(path).await?;
    println!("Manifest at '{}' is valid.", path.display());
    Ok(())
}

async fn load_manifest(path: &Path) -> Result<ModelManifest> {
    let manifest = ModelManifest::load(path)
        .await
        .with_context(|| format!("failed to load manifest at '{}'", path.display()))?;
    info!(
        path = %path.display(),
        elements = manifest.elements.len(),
        rules = manifest.rules.len(),
        "loaded model manifest"
    );
    Ok(manifest)
}
