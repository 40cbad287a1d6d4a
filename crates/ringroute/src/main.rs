//! `ringroute`: route keys over a consistent hashing ring.
//!
//! # Usage
//!
//! ```text
//! ringroute route t-xyz t-abc -n tN-a -n tN-b     # route keys
//! ringroute table -n tN-a -n tN-b -r 4            # print the vnode table
//! ringroute route t-xyz -c ringroute.toml         # nodes from a config file
//! ringroute demo --seed 12345                     # add/remove walkthrough
//! ```

mod config;
mod names;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ringroute_ring::{HashAlgorithm, HashRing};
use tracing::{debug, info, warn};

use config::CliConfig;
use names::generate_names;

/// Ring over plain string node keys, with the hash picked at runtime.
type CliRing = HashRing<String, HashAlgorithm>;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "ringroute",
    version,
    about = "Consistent hashing router with virtual nodes"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Ring overrides shared by every command.
#[derive(Args, Debug, Default)]
struct RingArgs {
    /// Node key to place on the ring (repeatable, replaces config nodes).
    #[arg(short, long = "node")]
    nodes: Vec<String>,

    /// Virtual nodes per node.
    #[arg(short, long)]
    replicas: Option<usize>,

    /// Hash function: "blake3" or "xxh3".
    #[arg(long)]
    hash: Option<HashAlgorithm>,
}

#[derive(Subcommand)]
enum Commands {
    /// Route one or more keys and print their owners.
    Route {
        /// Keys to route.
        #[arg(required = true)]
        keys: Vec<String>,

        #[command(flatten)]
        ring: RingArgs,
    },

    /// Print the ordered virtual node table.
    Table {
        #[command(flatten)]
        ring: RingArgs,
    },

    /// Build a ring from generated names, then add and remove nodes,
    /// printing the routing table after each step.
    Demo {
        /// Seed for node and key generation.
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of generated nodes.
        #[arg(long = "nodes", default_value = "3")]
        node_count: usize,

        /// Number of generated keys.
        #[arg(long = "keys", default_value = "10")]
        key_count: usize,

        #[command(flatten)]
        ring: RingArgs,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    let mut out = io::stdout().lock();
    match cli.command {
        Commands::Route { keys, ring } => {
            apply_overrides(&mut config, ring);
            cmd_route(&mut out, &config, &keys)
        }
        Commands::Table { ring } => {
            apply_overrides(&mut config, ring);
            cmd_table(&mut out, &config)
        }
        Commands::Demo {
            seed,
            node_count,
            key_count,
            ring,
        } => {
            apply_overrides(&mut config, ring);
            cmd_demo(&mut out, &config, seed, node_count, key_count)
        }
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
/// Logs go to stderr so command output stays clean.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// CLI args override config file values.
fn apply_overrides(config: &mut CliConfig, args: RingArgs) {
    if !args.nodes.is_empty() {
        config.ring.nodes = args.nodes;
    }
    if let Some(replicas) = args.replicas {
        config.ring.replicas = replicas;
    }
    if let Some(hash) = args.hash {
        config.ring.hash = hash;
    }
}

/// Build the ring described by the config.
fn build_ring(config: &CliConfig) -> Result<CliRing> {
    let ring = HashRing::with_hasher(
        config.ring.nodes.iter().cloned(),
        config.ring.replicas,
        config.ring.hash,
    )
    .context("failed to build ring")?;

    info!(
        nodes = ring.node_count(),
        vnodes = ring.vnode_count(),
        hash = %config.ring.hash,
        "ring built"
    );
    Ok(ring)
}

// -----------------------------------------------------------------------
// ringroute route / table
// -----------------------------------------------------------------------

fn cmd_route(out: &mut impl Write, config: &CliConfig, keys: &[String]) -> Result<()> {
    let ring = build_ring(config)?;
    if ring.is_empty() {
        warn!("no nodes configured, pass --node or set [ring] nodes");
    }
    for key in keys {
        let owner = ring
            .route(key)
            .with_context(|| format!("failed to route {key}"))?;
        writeln!(out, "{key} -> {owner}")?;
    }
    Ok(())
}

fn cmd_table(out: &mut impl Write, config: &CliConfig) -> Result<()> {
    let ring = build_ring(config)?;
    write!(out, "{ring}")?;
    writeln!(
        out,
        "{} nodes, {} vnodes",
        ring.node_count(),
        ring.vnode_count()
    )?;
    Ok(())
}

// -----------------------------------------------------------------------
// ringroute demo
// -----------------------------------------------------------------------

/// Node added during the demo.
const DEMO_EXTRA_NODE: &str = "tN-Amazing";

fn cmd_demo(
    out: &mut impl Write,
    config: &CliConfig,
    seed: u64,
    node_count: usize,
    key_count: usize,
) -> Result<()> {
    let nodes = generate_names("tN-", 1, node_count, seed)?;
    let keys = generate_names("t-", 3, key_count, seed)?;
    let replicas = config.ring.replicas;

    let mut ring: CliRing = HashRing::with_hasher(nodes.iter().cloned(), replicas, config.ring.hash)
        .context("failed to build demo ring")?;

    writeln!(out, "Initial setup")?;
    print_routes(out, &ring, &keys)?;

    let previous = ring.clone();
    ring.add_node(DEMO_EXTRA_NODE.to_string(), replicas)
        .context("failed to add demo node")?;
    writeln!(out, "Adding {DEMO_EXTRA_NODE}")?;
    print_routes(out, &ring, &keys)?;
    print_moved(out, &previous, &ring, &keys)?;

    for node in nodes.iter().take(2) {
        let previous = ring.clone();
        ring.remove_node(node)
            .with_context(|| format!("failed to remove {node}"))?;
        writeln!(out, "Removing {node}")?;
        print_routes(out, &ring, &keys)?;
        print_moved(out, &previous, &ring, &keys)?;
    }

    Ok(())
}

/// Print `key is routed to node` for every key.
fn print_routes(out: &mut impl Write, ring: &CliRing, keys: &[String]) -> Result<()> {
    for key in keys {
        match ring.route(key) {
            Ok(owner) => writeln!(out, "{key} is routed to {owner}")?,
            Err(e) => writeln!(out, "{key} is unroutable: {e}")?,
        }
    }
    Ok(())
}

fn print_moved(out: &mut impl Write, old: &CliRing, new: &CliRing, keys: &[String]) -> Result<()> {
    let moves = HashRing::diff(old, new, keys);
    debug!(moved = moves.len(), total = keys.len(), "routing changed");
    writeln!(out, "{} of {} keys moved", moves.len(), keys.len())?;
    Ok(())
}
