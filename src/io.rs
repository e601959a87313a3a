use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::candidates::build_slots;
use crate::catalog::{load_roster, Catalog};
use crate::counters::{merge_seasons, CounterSet};
use crate::data::{Mode, Slot};
use crate::report::{project_solution, ZoneReport};
use crate::round::RoundDocument;
use crate::solver::{find_best_assignment_traced, SearchTrace};

#[derive(Parser)]
#[command(name = "gac-engine", version, about = "Recommend attack-team assignments for a Grand Arena round")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Solve a round and print the recommended attack per defense team
    Solve(RoundArgs),
    /// Print each defense slot's candidate domain without solving
    Domains(RoundArgs),
    /// Merge per-season counter files into a single dataset
    Merge(MergeArgs),
}

#[derive(Args)]
pub struct RoundArgs {
    /// Round input: opponent and player defense zones plus spent attacks
    #[arg(long)]
    pub round: PathBuf,
    /// Game-wide character catalog dump
    #[arg(long)]
    pub catalog: PathBuf,
    /// Player roster dump with gear levels
    #[arg(long)]
    pub roster: PathBuf,
    /// Directory holding the per-mode counter datasets
    #[arg(long)]
    pub data_dir: PathBuf,
    #[arg(long, default_value = "5v5")]
    pub mode: String,
    /// Minimum gear level for a roster unit to be eligible
    #[arg(long, default_value_t = 12)]
    pub min_gear: u8,
    /// Zones to consider; defaults to every opponent zone in the round
    #[arg(long, num_args = 1..)]
    pub focus: Vec<String>,
    /// Exact-match counts at or below this fall back to leader-level data
    #[arg(long, default_value_t = 1)]
    pub threshold: usize,
    /// Write the search trace to this file
    #[arg(long)]
    pub trace: Option<PathBuf>,
    /// Emit the recommendations as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct MergeArgs {
    /// Per-season counter files, oldest first
    #[arg(long, num_args = 1..)]
    pub seasons: Vec<PathBuf>,
    #[arg(long)]
    pub out: PathBuf,
}

pub fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

pub fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Solve(args) => run_round(&args, true),
        Command::Domains(args) => run_round(&args, false),
        Command::Merge(args) => run_merge(&args),
    }
}

fn run_round(args: &RoundArgs, solve: bool) -> Result<(), Box<dyn Error>> {
    let mode = Mode::from_str(&args.mode)?;
    let catalog = Catalog::load(&args.catalog)?;
    let roster = load_roster(&args.roster)?;
    let units = catalog.eligible_units(&roster, args.min_gear)?;
    let counters = CounterSet::load(&args.data_dir.join(mode.file_name()))?;
    let document = RoundDocument::load(&args.round)?;
    let round = document.resolve(&catalog)?;

    let focus: Vec<String> = if args.focus.is_empty() {
        round.opponent.iter().map(|zone| zone.name.clone()).collect()
    } else {
        args.focus.clone()
    };

    let slots = build_slots(&round, &counters, &units, &focus, args.threshold);
    if !solve {
        print_domains(&slots);
        return Ok(());
    }

    let stop = AtomicBool::new(false);
    let mut trace = args.trace.as_ref().map(|_| SearchTrace::default());
    let solution =
        find_best_assignment_traced(&slots, &stop, trace.as_mut()).unwrap_or_default();
    if let (Some(path), Some(trace)) = (&args.trace, &trace) {
        fs::write(path, &trace.buf)?;
    }

    let report = project_solution(&round, &slots, &solution);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, solution.total_win_rate);
    }
    Ok(())
}

fn run_merge(args: &MergeArgs) -> Result<(), Box<dyn Error>> {
    let mut seasons = Vec::with_capacity(args.seasons.len());
    for path in &args.seasons {
        seasons.push(CounterSet::load(path)?);
    }
    let merged = merge_seasons(&seasons);
    merged.save(&args.out)?;
    println!(
        "merged {} seasons into {} ({} leaders, {} counters)",
        args.seasons.len(),
        args.out.display(),
        merged.leader_count(),
        merged.record_count()
    );
    Ok(())
}

fn print_domains(slots: &[Slot]) {
    let mut current_zone: Option<&str> = None;
    for slot in slots {
        if current_zone != Some(slot.zone.as_str()) {
            println!("{}", format!("======= zone {} =======", slot.zone).cyan().bold());
            current_zone = Some(slot.zone.as_str());
        }
        println!("defense: {}", join_names(&slot.defense));
        if slot.candidates.is_empty() {
            println!("{}", "  no affordable counters".yellow());
        }
        for candidate in &slot.candidates {
            let flag = if candidate.has_gl { " [gl defense]" } else { "" };
            println!(
                "  ({:>5.1}) {}{}",
                candidate.win_rate,
                join_names(&candidate.attack),
                flag
            );
        }
        println!();
    }
}

fn print_report(report: &[ZoneReport], total_win_rate: f32) {
    for zone in report {
        println!("{}", format!("======= zone {} =======", zone.zone).cyan().bold());
        for pick in &zone.picks {
            println!("defense: {}", pick.defense.join(", "));
            if pick.has_counter() {
                let rate = format!("{:.1}%", pick.win_rate);
                let rate = if pick.win_rate >= 80.0 {
                    rate.green()
                } else if pick.win_rate >= 50.0 {
                    rate.yellow()
                } else {
                    rate.red()
                };
                println!("attack:  {} ({})", pick.attack.join(", ").green(), rate);
            } else {
                println!("attack:  {}", "no counter available".red());
            }
            println!();
        }
    }
    println!("{}", format!("expected total win rate: {:.1}", total_win_rate).bold());
}

fn join_names(team: &[crate::data::Character]) -> String {
    team.iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<&str>>()
        .join(", ")
}
