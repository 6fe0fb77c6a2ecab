use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use loot_core::state::MAX_PARTY_SIZE;
use loot_core::tier::TierResolver;
use loot_core::{
    Element, EngineConfig, LuckBuff, Party, PartyMember, PathFilter, PoolKind, RewardEngine,
    RunRng, RunState, SpeciesId, Tier,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for the shared random stream
    #[arg(short, long, default_value_t = 42, global = true)]
    seed: u64,
    /// Engine config JSON; defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Histogram of rolled tiers for a pool
    Tiers {
        #[arg(short, long, default_value_t = 100_000)]
        rolls: u32,
        #[arg(short, long, value_enum, default_value_t = PoolArg::Player)]
        pool: PoolArg,
        /// Luck buff level held for every roll
        #[arg(short, long, default_value_t = 0)]
        luck: u8,
    },
    /// Resolve one offer against a synthetic party
    Offer {
        #[arg(short = 'n', long, default_value_t = 4)]
        count: usize,
        #[arg(short, long, value_enum, default_value_t = PoolArg::Player)]
        pool: PoolArg,
        #[arg(short, long, default_value_t = 3)]
        members: usize,
        #[arg(short, long, default_value_t = 0)]
        rerolls: u32,
        /// Print the live weight table before the offer
        #[arg(short, long)]
        weights: bool,
    },
    /// Resolve options from a curated path pool
    Path {
        #[arg(value_enum)]
        filter: FilterArg,
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
        #[arg(short, long, default_value_t = 3)]
        members: usize,
    },
    /// Write the effective config as pretty JSON
    Config { out: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum PoolArg {
    Player,
    Wild,
    Trainer,
    EnemyBuff,
    DailyStarter,
    Draft,
    Debug,
}

impl From<PoolArg> for PoolKind {
    fn from(arg: PoolArg) -> Self {
        match arg {
            PoolArg::Player => PoolKind::Player,
            PoolArg::Wild => PoolKind::Wild,
            PoolArg::Trainer => PoolKind::Trainer,
            PoolArg::EnemyBuff => PoolKind::EnemyBuff,
            PoolArg::DailyStarter => PoolKind::DailyStarter,
            PoolArg::Draft => PoolKind::Draft,
            PoolArg::Debug => PoolKind::Debug,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    TypeSwitchers,
    AbilitySwitchers,
    Berries,
    Tms,
    AddMember,
    Consumables,
    Luck,
}

impl From<FilterArg> for PathFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::TypeSwitchers => PathFilter::TypeSwitchers,
            FilterArg::AbilitySwitchers => PathFilter::AbilitySwitchers,
            FilterArg::Berries => PathFilter::Berries,
            FilterArg::Tms => PathFilter::Tms,
            FilterArg::AddMember => PathFilter::AddMember,
            FilterArg::Consumables => PathFilter::Consumables,
            FilterArg::Luck => PathFilter::Luck,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match args.command {
        Command::Tiers { rolls, pool, luck } => tiers(&config, args.seed, rolls, pool.into(), luck),
        Command::Offer { count, pool, members, rerolls, weights } => {
            let mut engine = RewardEngine::with_default_content(args.seed, config)
                .context("Failed to build the default reward engine")?;
            offer(&mut engine, count, pool.into(), members, rerolls, weights)
        }
        Command::Path { filter, count, members } => {
            let mut engine = RewardEngine::with_default_content(args.seed, config)
                .context("Failed to build the default reward engine")?;
            let mut run = synthetic_run(members);
            for _ in 0..count {
                match engine.resolve_from_path_filter(filter.into(), &mut run) {
                    Some(option) => println!("{}  {}", option.id, option.kind.name),
                    None => println!("(no candidate)"),
                }
            }
            Ok(())
        }
        Command::Config { out } => {
            config
                .write_pretty(&out)
                .with_context(|| format!("Failed to write config: {}", out.display()))?;
            println!("Wrote {}", out.display());
            Ok(())
        }
    }
}

fn tiers(config: &EngineConfig, seed: u64, rolls: u32, pool: PoolKind, luck: u8) -> Result<()> {
    let resolver = TierResolver::new(config);
    let mut rng = RunRng::new(seed);
    let luck = LuckBuff::new(luck, u32::from(luck > 0));
    let mut counts: BTreeMap<Tier, u32> = BTreeMap::new();
    let mut upgrades = 0u64;

    for _ in 0..rolls {
        let roll = resolver.roll(&mut rng, pool, &luck, 0, |_| true);
        *counts.entry(roll.tier).or_default() += 1;
        upgrades += u64::from(roll.upgrade_count);
    }

    println!("{rolls} rolls on {pool:?} (luck {}), {} draws", luck.level, rng.draws());
    for tier in Tier::ALL {
        let count = counts.get(&tier).copied().unwrap_or(0);
        let percent = f64::from(count) * 100.0 / f64::from(rolls.max(1));
        println!("{:>8} {count:>8} {percent:>7.3}%", format!("{tier:?}"));
    }
    println!("upgrades: {upgrades}");
    Ok(())
}

fn offer(
    engine: &mut RewardEngine,
    count: usize,
    pool: PoolKind,
    members: usize,
    rerolls: u32,
    weights: bool,
) -> Result<()> {
    let mut run = synthetic_run(members);
    let snapshot = engine.regenerate_thresholds(&run, pool, rerolls);

    if weights {
        let table = engine.thresholds(pool).context("Thresholds missing after regeneration")?;
        for row in table.diagnostics() {
            println!(
                "{:>7} #{:<2} {:<22} {:>4}/{:<4} {:>6.2}% {:>6.2}%",
                format!("{:?}", row.tier),
                row.index,
                row.reward_id,
                row.weight,
                row.max_weight,
                row.percent_of_tier,
                row.percent_of_total
            );
        }
    }

    let options = engine
        .resolve_batch(count, &snapshot, &mut run, None)
        .context("Failed to resolve the offer")?;
    for option in options {
        let tier = option.tier().map(|tier| format!("{tier:?}")).unwrap_or_else(|| "-".into());
        println!("{}  {:<6} +{}  {}", option.id, tier, option.upgrade_count, option.kind.name);
    }
    Ok(())
}

/// Party of `members` lightly damaged members, one of them fainted.
fn synthetic_run(members: usize) -> RunState {
    let mut party = Party::new();
    for index in 0..members.min(MAX_PARTY_SIZE) {
        let element = Element::ALL[index % Element::ALL.len()];
        let mut member = PartyMember::new(SpeciesId(index as u16 + 1), vec![element]);
        member.hp_percent = 60;
        member.fainted = index == 1;
        party.add(member);
    }
    RunState::with_party(party)
}
