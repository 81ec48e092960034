//! Tick a sample patrol tree
//!
//! Builds a small tree through the host surface, ticks it for a number of
//! cycles and prints each result. With `--output` the profile is written as a
//! binary dump that `inspect-profile` can read back.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use behavior_tree::{
    ActionError, EngineConfig, Host, LeafAction, ProfileDump, Root, Status, Strategy, coded, leaf,
};

use super::inspect_profile::print_summary;

const ENEMY_VISIBLE: i64 = 1;
const ATTACK: i64 = 2;
const LOW_ENERGY: i64 = 3;
const RECHARGE: i64 = 4;
const WALK: i64 = 5;
const ENGAGE: i64 = 10;
const REST: i64 = 11;
const PATROL: i64 = 20;

/// Tick a sample patrol tree and optionally write its profile
#[derive(Parser)]
pub struct Demo {
    /// Number of ticks to run
    #[arg(short = 'n', long, default_value_t = 20)]
    ticks: u64,

    /// Starting energy of the patrolling agent
    #[arg(long, default_value_t = 6)]
    energy: i64,

    /// Emit a trace line per node tick (shown with RUST_LOG=behavior_tree=debug)
    #[arg(long)]
    trace: bool,

    /// Enable the profiler and print a summary at the end
    #[arg(long)]
    profile: bool,

    /// Write the binary profile dump to this file (implies --profile)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Argument bundle shared by every leaf.
struct Patrol {
    turn: AtomicU64,
    energy: AtomicI64,
}

impl Demo {
    pub fn execute(self) -> Result<()> {
        let env = EngineConfig::from_env();
        let config = env
            .with_profiler(env.profiler_enabled || self.profile || self.output.is_some())
            .with_trace(env.trace_ticks || self.trace);

        let mut host = Host::with_config(config);
        build_patrol(&mut host)?;

        let mut root = Root::new(&host, PATROL as i32);
        anyhow::ensure!(root.can_tick(), "patrol root {} did not resolve", PATROL);

        let patrol = Patrol {
            turn: AtomicU64::new(0),
            energy: AtomicI64::new(self.energy),
        };

        println!("{}", style("=== Patrol Demo ===").bold().green());
        println!();
        for turn in 0..self.ticks {
            patrol.turn.store(turn, Ordering::Relaxed);
            root.tick(&host, &patrol);
            println!(
                "  turn {:>4}  energy {:>3}  {}",
                turn,
                patrol.energy.load(Ordering::Relaxed),
                styled_status(root.tick_result())
            );
        }
        println!();

        if !host.is_profiler_enabled() {
            return Ok(());
        }

        print_summary(&host.profiler().report());

        if let Some(path) = &self.output {
            let ProfileDump::Binary(bytes) = host
                .dump_profile(true)
                .context("Failed to encode profile")?
            else {
                anyhow::bail!("profiler returned a structured dump for a binary request");
            };
            std::fs::write(path, &bytes)
                .with_context(|| format!("Failed to write profile: {}", path.display()))?;
            println!(
                "{} {}",
                style("Profile written to").bold().cyan(),
                path.display()
            );
        }

        Ok(())
    }
}

/// Defines the patrol tree, children first.
///
/// ```text
/// patrol (mem selector)
/// ├── engage (sequence): enemy visible, attack
/// ├── rest (mem sequence): low energy, recharge
/// └── walk
/// ```
fn build_patrol(host: &mut Host<Patrol>) -> Result<()> {
    let leaves: [(i64, LeafAction<Patrol>); 5] = [
        (
            ENEMY_VISIBLE,
            leaf(|p: &Patrol| Ok(status_if(p.turn.load(Ordering::Relaxed) % 7 == 6))),
        ),
        (ATTACK, leaf(|_: &Patrol| Ok(Status::Success))),
        (
            LOW_ENERGY,
            leaf(|p: &Patrol| Ok(status_if(p.energy.load(Ordering::Relaxed) < 3))),
        ),
        (
            RECHARGE,
            coded(|p: &Patrol| {
                let energy = p.energy.fetch_add(2, Ordering::Relaxed) + 2;
                let status = if energy >= 8 {
                    Status::Success
                } else {
                    Status::Running
                };
                Ok(i64::from(status.code()))
            }),
        ),
        (
            WALK,
            leaf(|p: &Patrol| {
                if p.energy.load(Ordering::Relaxed) <= 0 {
                    return Err(ActionError::failed("out of energy"));
                }
                p.energy.fetch_sub(1, Ordering::Relaxed);
                Ok(Status::Success)
            }),
        ),
    ];
    for (id, action) in leaves {
        define(host, id, Strategy::Leaf, None, Some(action))?;
    }

    define(host, ENGAGE, Strategy::Sequence, Some(&[ENEMY_VISIBLE, ATTACK]), None)?;
    define(host, REST, Strategy::MemSequence, Some(&[LOW_ENERGY, RECHARGE]), None)?;
    define(host, PATROL, Strategy::MemSelector, Some(&[ENGAGE, REST, WALK]), None)?;
    Ok(())
}

fn define(
    host: &mut Host<Patrol>,
    id: i64,
    strategy: Strategy,
    children: Option<&[i64]>,
    action: Option<LeafAction<Patrol>>,
) -> Result<()> {
    let defined = host
        .add_node(id, strategy.index() as i64, children, action)
        .with_context(|| format!("Failed to define node {id}"))?;
    anyhow::ensure!(defined, "node {} ({}) was rejected", id, strategy);
    Ok(())
}

fn status_if(condition: bool) -> Status {
    if condition {
        Status::Success
    } else {
        Status::Failure
    }
}

fn styled_status(code: i32) -> String {
    match Status::from_code(code.into()) {
        Some(Status::Success) => style("Success").green().to_string(),
        Some(Status::Failure) => style("Failure").yellow().to_string(),
        Some(Status::Running) => style("Running").cyan().to_string(),
        Some(Status::Error) => style("Error").red().bold().to_string(),
        None => style("unset").dim().to_string(),
    }
}
