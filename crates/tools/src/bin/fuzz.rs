use anyhow::{Result, bail};
use clap::Parser;
use loot_core::{
    Element, EngineConfig, Party, PartyMember, PathFilter, PoolKind, RewardEngine, RunState,
    SpeciesId, Tier, content::keys,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 1000)]
    rounds: u32,
}

fn below(rng: &mut ChaCha8Rng, bound: u64) -> u64 {
    rng.next_u64() % bound
}

fn random_run(rng: &mut ChaCha8Rng) -> RunState {
    let mut party = Party::new();
    for index in 0..=below(rng, 6) {
        let element = Element::ALL[below(rng, Element::ALL.len() as u64) as usize];
        let mut member = PartyMember::new(SpeciesId(index as u16 + 1), vec![element]);
        member.hp_percent = below(rng, 101) as u8;
        member.fainted = below(rng, 5) == 0;
        member.luck = below(rng, 4) as u8;
        if below(rng, 3) == 0 {
            member.hold(keys::LEFTOVERS, below(rng, 5) as u32);
        }
        party.add(member);
    }
    let mut run = RunState::with_party(party);
    run.persistent.add(keys::EXP_SHARE, below(rng, 6) as u32);
    run.luck.level = below(rng, 4) as u8;
    run.luck.stacks = below(rng, 4) as u32;
    run
}

fn check_tables(engine: &RewardEngine, pool: PoolKind, round: u32) -> Result<()> {
    let Some(table) = engine.thresholds(pool) else {
        bail!("round {round}: no table for {pool:?} after regeneration");
    };
    for (tier, tier_table) in table.tiers() {
        let mut previous = 0;
        for threshold in tier_table.thresholds() {
            if threshold.cumulative <= previous {
                bail!("round {round}: {pool:?} {tier:?} thresholds are not strictly increasing");
            }
            previous = threshold.cumulative;
        }
        if previous != tier_table.total() {
            bail!("round {round}: {pool:?} {tier:?} last breakpoint differs from the total");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .init();
    let args = Args::parse();

    println!("Starting fuzz harness on seed {} for {} rounds...", args.seed, args.rounds);
    let mut engine = RewardEngine::with_default_content(args.seed, EngineConfig::default())?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut offered = 0usize;

    for round in 0..args.rounds {
        let mut run = random_run(&mut rng);
        let rerolls = below(&mut rng, 8) as u32;
        let count = below(&mut rng, 6) as usize + 1;

        let snapshot = engine.regenerate_thresholds(&run, PoolKind::Player, rerolls);
        check_tables(&engine, PoolKind::Player, round)?;
        let luck_before = run.luck.stacks;
        let options = engine.resolve_batch(count, &snapshot, &mut run, None)?;
        if options.len() > count {
            bail!("round {round}: asked for {count} options, got {}", options.len());
        }
        if options.iter().any(|option| option.tier().is_none()) {
            bail!("round {round}: option resolved without a tier");
        }
        if run.luck.stacks > luck_before {
            bail!("round {round}: resolution added luck stacks");
        }
        offered += options.len();

        let members = run.party.ids();
        let member = members[below(&mut rng, members.len() as u64) as usize];
        let capped = run.party.get(member).is_some_and(|m| m.held_count(keys::LEFTOVERS) >= 4);
        let held = engine.enemy_options_for_wave(&run, member, PoolKind::Trainer, 4, 8)?;
        check_tables(&engine, PoolKind::Trainer, round)?;
        if capped && held.iter().any(|option| option.kind.id == keys::LEFTOVERS) {
            bail!("round {round}: offered leftovers to a member already at the cap");
        }

        let filter = PathFilter::ALL[below(&mut rng, PathFilter::ALL.len() as u64) as usize];
        if let Some(option) = engine.resolve_from_path_filter(filter, &mut run) {
            let meta = engine.catalog().meta(&option.kind.id);
            if !meta.is_some_and(|meta| filter.accepts(meta)) {
                bail!("round {round}: {filter:?} offered {}", option.kind.id);
            }
        }

        let buff = engine.enemy_buff_for_tier(&run, Tier::Common, &held)?;
        if buff.is_some_and(|buff| buff.tier() != Some(Tier::Common)) {
            bail!("round {round}: enemy buff resolved away from Common");
        }
    }

    println!(
        "Fuzzing completed successfully: {offered} options, {} draws.",
        engine.rng().draws()
    );
    Ok(())
}
