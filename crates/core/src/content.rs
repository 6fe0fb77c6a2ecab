//! Default reward content: catalog ids, entry factories and the tuned pools.

use std::collections::BTreeSet;
use std::fmt;

use log::warn;

use crate::catalog::{
    Catalog, CatalogError, MemberFilter, RewardCategory, RewardEffect, RewardEntry,
    RewardGenerator, RewardKind, RewardTag, Variant,
};
use crate::pool::{PoolSet, RewardPool, WeightedEntry};
use crate::rng::RunRng;
use crate::state::RunState;
use crate::types::{AbilityId, Berry, Element, MoveId, PoolKind, SpeciesId, Stat, Tier, Unlockable};

pub mod keys {
    pub const POTION: &str = "potion";
    pub const SUPER_POTION: &str = "super_potion";
    pub const HYPER_POTION: &str = "hyper_potion";
    pub const REVIVE: &str = "revive";
    pub const ETHER: &str = "ether";
    pub const MASTER_TOKEN: &str = "master_token";
    pub const DNA_SPLICERS: &str = "dna_splicers";

    pub const BERRY: &str = "berry";
    pub const TEMP_STAT_BOOSTER: &str = "temp_stat_booster";
    pub const TM_COMMON: &str = "tm_common";
    pub const TM_GREAT: &str = "tm_great";
    pub const TM_ULTRA: &str = "tm_ultra";
    pub const TERA_SHARD: &str = "tera_shard";
    pub const ABILITY_CAPSULE: &str = "ability_capsule";
    pub const FORM_CHANGE_ITEM: &str = "form_change_item";
    pub const RECRUIT: &str = "recruit";

    pub const EXP_SHARE: &str = "exp_share";
    pub const GOLDEN_EXP_CHARM: &str = "golden_exp_charm";
    pub const AMULET_COIN: &str = "amulet_coin";
    pub const LUCK_TICKET: &str = "luck_ticket";
    pub const LUCK_CHARM: &str = "luck_charm";

    pub const LEFTOVERS: &str = "leftovers";
    pub const SHELL_BELL: &str = "shell_bell";
    pub const QUICK_CLAW: &str = "quick_claw";
    pub const KINGS_ROCK: &str = "kings_rock";

    pub const ENEMY_DAMAGE_BOOSTER: &str = "enemy_damage_booster";
    pub const ENEMY_DAMAGE_REDUCER: &str = "enemy_damage_reducer";
    pub const ENEMY_HEAL: &str = "enemy_heal";
}

const BERRY_MAX_STACK: u32 = 3;
const SPECIES_COUNT: u32 = 1025;
const ABILITY_COUNT: u32 = 310;
const RECRUIT_ATTEMPTS: usize = 8;

pub fn default_catalog() -> Result<Catalog, CatalogError> {
    let entries: [(&str, fn() -> RewardEntry); 30] = [
        (keys::POTION, potion),
        (keys::SUPER_POTION, super_potion),
        (keys::HYPER_POTION, hyper_potion),
        (keys::REVIVE, revive),
        (keys::ETHER, ether),
        (keys::MASTER_TOKEN, master_token),
        (keys::DNA_SPLICERS, dna_splicers),
        (keys::BERRY, berry),
        (keys::TEMP_STAT_BOOSTER, temp_stat_booster),
        (keys::TM_COMMON, tm_common),
        (keys::TM_GREAT, tm_great),
        (keys::TM_ULTRA, tm_ultra),
        (keys::TERA_SHARD, tera_shard),
        (keys::ABILITY_CAPSULE, ability_capsule),
        (keys::FORM_CHANGE_ITEM, form_change_item),
        (keys::RECRUIT, recruit),
        (keys::EXP_SHARE, exp_share),
        (keys::GOLDEN_EXP_CHARM, golden_exp_charm),
        (keys::AMULET_COIN, amulet_coin),
        (keys::LUCK_TICKET, luck_ticket),
        (keys::LUCK_CHARM, luck_charm),
        (keys::LEFTOVERS, leftovers),
        (keys::SHELL_BELL, shell_bell),
        (keys::QUICK_CLAW, quick_claw),
        (keys::KINGS_ROCK, kings_rock),
        (keys::ENEMY_DAMAGE_BOOSTER, enemy_damage_booster),
        (keys::ENEMY_DAMAGE_REDUCER, enemy_damage_reducer),
        (keys::ENEMY_HEAL, enemy_heal),
        // Registered for overrides only; no pool lists them.
        ("elixir", elixir),
        ("max_revive", max_revive),
    ];

    let mut catalog = Catalog::new();
    for (id, factory) in entries {
        catalog.register(id, factory)?;
    }
    Ok(catalog)
}

pub fn default_pools() -> PoolSet {
    PoolSet::new()
        .with_pool(player_pool())
        .with_pool(wild_pool())
        .with_pool(trainer_pool())
        .with_pool(enemy_buff_pool())
        .with_pool(daily_starter_pool())
        .with_pool(draft_pool())
        .with_pool(debug_pool())
}

// Pools

fn damaged_weight(per_member: i32, cap: i32) -> impl Fn(&RunState, u32) -> i32 {
    move |run, _| (run.party.damaged_count() as i32 * per_member).min(cap)
}

fn fainted_weight(per_member: i32, cap: i32) -> impl Fn(&RunState, u32) -> i32 {
    move |run, _| (run.party.fainted_count() as i32 * per_member).min(cap)
}

fn unlocked_weight(flag: Unlockable, weight: i32) -> impl Fn(&RunState, u32) -> i32 {
    move |run, _| if run.unlocks.contains(flag) { weight } else { 0 }
}

fn player_pool() -> RewardPool {
    RewardPool::new(PoolKind::Player)
        .with_tier(
            Tier::Common,
            vec![
                WeightedEntry::dynamic(keys::POTION, damaged_weight(3, 9), 9),
                WeightedEntry::fixed(keys::ETHER, 3),
                WeightedEntry::fixed(keys::BERRY, 2),
                WeightedEntry::fixed(keys::TEMP_STAT_BOOSTER, 4),
                WeightedEntry::fixed(keys::TM_COMMON, 2),
            ],
        )
        .with_tier(
            Tier::Great,
            vec![
                WeightedEntry::dynamic(keys::SUPER_POTION, damaged_weight(2, 6), 6),
                WeightedEntry::dynamic(keys::REVIVE, fainted_weight(3, 9), 9),
                WeightedEntry::fixed(keys::TM_GREAT, 3),
                // Shards thin out as the player rerolls.
                WeightedEntry::dynamic(keys::TERA_SHARD, |_, rerolls| 4 - rerolls.min(4) as i32, 4),
                WeightedEntry::dynamic(
                    keys::RECRUIT,
                    |run, _| if run.party.is_full() { 0 } else { 3 },
                    3,
                ),
            ],
        )
        .with_tier(
            Tier::Ultra,
            vec![
                WeightedEntry::dynamic(keys::HYPER_POTION, damaged_weight(1, 4), 4),
                WeightedEntry::fixed(keys::TM_ULTRA, 3),
                WeightedEntry::fixed(keys::EXP_SHARE, 2),
                WeightedEntry::fixed(keys::LEFTOVERS, 2),
                WeightedEntry::fixed(keys::QUICK_CLAW, 3),
                WeightedEntry::dynamic(
                    keys::ABILITY_CAPSULE,
                    unlocked_weight(Unlockable::AbilityPool, 2),
                    2,
                ),
                WeightedEntry::dynamic(
                    keys::FORM_CHANGE_ITEM,
                    unlocked_weight(Unlockable::FormChanges, 4),
                    4,
                ),
                WeightedEntry::fixed(keys::LUCK_TICKET, 3),
                WeightedEntry::fixed(keys::AMULET_COIN, 2),
            ],
        )
        .with_tier(
            Tier::Rogue,
            vec![
                WeightedEntry::fixed(keys::SHELL_BELL, 3),
                WeightedEntry::fixed(keys::KINGS_ROCK, 3),
                WeightedEntry::dynamic(keys::DNA_SPLICERS, unlocked_weight(Unlockable::Splicers, 3), 3),
                WeightedEntry::fixed(keys::LUCK_CHARM, 2),
            ],
        )
        .with_tier(
            Tier::Master,
            vec![
                WeightedEntry::dynamic(
                    keys::MASTER_TOKEN,
                    unlocked_weight(Unlockable::MasterRewards, 1),
                    1,
                ),
                WeightedEntry::fixed(keys::GOLDEN_EXP_CHARM, 1),
            ],
        )
}

fn wild_pool() -> RewardPool {
    RewardPool::new(PoolKind::Wild)
        .with_tier(Tier::Common, vec![WeightedEntry::fixed(keys::BERRY, 1)])
        .with_tier(Tier::Great, vec![WeightedEntry::fixed(keys::QUICK_CLAW, 1)])
        .with_tier(
            Tier::Ultra,
            vec![WeightedEntry::fixed(keys::LEFTOVERS, 1), WeightedEntry::fixed(keys::SHELL_BELL, 1)],
        )
        .with_tier(Tier::Rogue, vec![WeightedEntry::fixed(keys::KINGS_ROCK, 1)])
}

fn trainer_pool() -> RewardPool {
    RewardPool::new(PoolKind::Trainer)
        .with_tier(Tier::Common, vec![WeightedEntry::fixed(keys::BERRY, 8)])
        .with_tier(
            Tier::Great,
            vec![WeightedEntry::fixed(keys::QUICK_CLAW, 2), WeightedEntry::fixed(keys::BERRY, 1)],
        )
        .with_tier(
            Tier::Ultra,
            vec![WeightedEntry::fixed(keys::LEFTOVERS, 2), WeightedEntry::fixed(keys::SHELL_BELL, 2)],
        )
        .with_tier(
            Tier::Rogue,
            vec![WeightedEntry::fixed(keys::KINGS_ROCK, 2), WeightedEntry::fixed(keys::LEFTOVERS, 1)],
        )
        .with_tier(Tier::Master, vec![WeightedEntry::fixed(keys::SHELL_BELL, 1)])
}

fn enemy_buff_pool() -> RewardPool {
    RewardPool::new(PoolKind::EnemyBuff)
        .with_tier(
            Tier::Common,
            vec![
                WeightedEntry::fixed(keys::ENEMY_DAMAGE_BOOSTER, 9),
                WeightedEntry::fixed(keys::ENEMY_DAMAGE_REDUCER, 9),
            ],
        )
        .with_tier(Tier::Great, vec![WeightedEntry::fixed(keys::ENEMY_HEAL, 4)])
}

fn daily_starter_pool() -> RewardPool {
    RewardPool::new(PoolKind::DailyStarter)
        .with_tier(Tier::Common, vec![WeightedEntry::fixed(keys::BERRY, 1)])
        .with_tier(Tier::Great, vec![WeightedEntry::fixed(keys::QUICK_CLAW, 1)])
        .with_tier(Tier::Ultra, vec![WeightedEntry::fixed(keys::LEFTOVERS, 1)])
        .with_tier(
            Tier::Rogue,
            vec![WeightedEntry::fixed(keys::SHELL_BELL, 1), WeightedEntry::fixed(keys::KINGS_ROCK, 1)],
        )
}

fn draft_pool() -> RewardPool {
    RewardPool::new(PoolKind::Draft)
        .with_tier(
            Tier::Common,
            vec![WeightedEntry::fixed(keys::POTION, 3), WeightedEntry::fixed(keys::BERRY, 2)],
        )
        .with_tier(Tier::Great, vec![WeightedEntry::fixed(keys::RECRUIT, 3)])
        .with_tier(Tier::Ultra, vec![WeightedEntry::fixed(keys::EXP_SHARE, 1)])
}

fn debug_pool() -> RewardPool {
    RewardPool::new(PoolKind::Debug).with_tier(
        Tier::Common,
        [keys::POTION, keys::BERRY, keys::TERA_SHARD, keys::RECRUIT, keys::LUCK_TICKET, keys::DNA_SPLICERS]
            .into_iter()
            .map(|id| WeightedEntry::fixed(id, 1))
            .collect(),
    )
}

// Concrete entries

fn concrete(name: &str, category: RewardCategory, effect: RewardEffect) -> RewardKind {
    RewardKind::new(name, category, effect)
}

fn potion() -> RewardEntry {
    RewardEntry::Concrete(
        concrete("Potion", RewardCategory::Consumable, RewardEffect::Heal { percent: 20 })
            .with_filter(MemberFilter::Damaged),
    )
}

fn super_potion() -> RewardEntry {
    RewardEntry::Concrete(
        concrete("Super Potion", RewardCategory::Consumable, RewardEffect::Heal { percent: 50 })
            .with_filter(MemberFilter::Damaged),
    )
}

fn hyper_potion() -> RewardEntry {
    RewardEntry::Concrete(
        concrete("Hyper Potion", RewardCategory::Consumable, RewardEffect::Heal { percent: 100 })
            .with_filter(MemberFilter::Damaged),
    )
}

fn revive() -> RewardEntry {
    RewardEntry::Concrete(
        concrete("Revive", RewardCategory::Consumable, RewardEffect::Revive { percent: 50 })
            .with_filter(MemberFilter::Fainted),
    )
}

fn max_revive() -> RewardEntry {
    RewardEntry::Concrete(
        concrete("Max Revive", RewardCategory::Consumable, RewardEffect::Revive { percent: 100 })
            .with_filter(MemberFilter::Fainted),
    )
}

fn ether() -> RewardEntry {
    RewardEntry::Concrete(
        concrete("Ether", RewardCategory::Consumable, RewardEffect::RestorePp { amount: Some(10) })
            .with_filter(MemberFilter::Conscious),
    )
}

fn elixir() -> RewardEntry {
    RewardEntry::Concrete(
        concrete("Elixir", RewardCategory::Consumable, RewardEffect::RestorePp { amount: None })
            .with_filter(MemberFilter::Conscious),
    )
}

fn master_token() -> RewardEntry {
    RewardEntry::Concrete(concrete(
        "Master Token",
        RewardCategory::Consumable,
        RewardEffect::CatchGuarantee,
    ))
}

fn dna_splicers() -> RewardEntry {
    RewardEntry::Concrete(
        concrete("DNA Splicers", RewardCategory::Consumable, RewardEffect::Fusion)
            .with_tags(&[RewardTag::Fusion])
            .with_filter(MemberFilter::Conscious),
    )
}

fn exp_share() -> RewardEntry {
    RewardEntry::Concrete(concrete(
        "Exp. Share",
        RewardCategory::Persistent { max_stack: 5 },
        RewardEffect::ExpBoost { percent: 20 },
    ))
}

fn golden_exp_charm() -> RewardEntry {
    RewardEntry::Concrete(concrete(
        "Golden Exp. Charm",
        RewardCategory::Persistent { max_stack: 10 },
        RewardEffect::ExpBoost { percent: 50 },
    ))
}

fn amulet_coin() -> RewardEntry {
    RewardEntry::Concrete(concrete(
        "Amulet Coin",
        RewardCategory::Persistent { max_stack: 5 },
        RewardEffect::MoneyBoost { percent: 20 },
    ))
}

fn luck_ticket() -> RewardEntry {
    RewardEntry::Concrete(
        concrete(
            "Luck Ticket",
            RewardCategory::Persistent { max_stack: 3 },
            RewardEffect::LuckBoost { level: 2 },
        )
        .with_group("luck")
        .with_tags(&[RewardTag::Luck]),
    )
}

fn luck_charm() -> RewardEntry {
    RewardEntry::Concrete(
        concrete(
            "Luck Charm",
            RewardCategory::Persistent { max_stack: 3 },
            RewardEffect::LuckBoost { level: 3 },
        )
        .with_group("luck")
        .with_tags(&[RewardTag::Luck]),
    )
}

fn held(name: &str, id: &str, max_stack: u32, percent: u8) -> RewardEntry {
    RewardEntry::Concrete(
        concrete(name, RewardCategory::HeldItem { max_stack }, RewardEffect::HeldBoost { percent })
            .with_filter(MemberFilter::Below { reward_id: id.to_string(), max_stack }),
    )
}

fn leftovers() -> RewardEntry {
    held("Leftovers", keys::LEFTOVERS, 4, 6)
}

fn shell_bell() -> RewardEntry {
    held("Shell Bell", keys::SHELL_BELL, 4, 12)
}

fn quick_claw() -> RewardEntry {
    held("Quick Claw", keys::QUICK_CLAW, 3, 10)
}

fn kings_rock() -> RewardEntry {
    held("King's Rock", keys::KINGS_ROCK, 3, 10)
}

fn enemy_damage_booster() -> RewardEntry {
    RewardEntry::Concrete(concrete(
        "Damage Booster",
        RewardCategory::EnemyBuff { max_stack: 5 },
        RewardEffect::EnemyDamageBoost { percent: 5 },
    ))
}

fn enemy_damage_reducer() -> RewardEntry {
    RewardEntry::Concrete(concrete(
        "Protection Token",
        RewardCategory::EnemyBuff { max_stack: 5 },
        RewardEffect::EnemyDamageReduction { percent: 5 },
    ))
}

fn enemy_heal() -> RewardEntry {
    RewardEntry::Concrete(concrete(
        "Recovery Token",
        RewardCategory::EnemyBuff { max_stack: 3 },
        RewardEffect::EnemyHeal { percent: 2 },
    ))
}

// Generators

/// Honors an index variant when it fits, otherwise picks uniformly.
fn pick_variant<T: Copy + fmt::Debug>(
    id: &str,
    choices: &[T],
    variant: Option<&Variant>,
    rng: &mut RunRng,
) -> Option<T> {
    if let Some(variant) = variant {
        match variant.as_index().and_then(|index| choices.get(index as usize)) {
            Some(choice) => return Some(*choice),
            None => warn!("{id}: variant {variant:?} does not fit; picking at random"),
        }
    }
    rng.pick(choices).copied()
}

fn berry() -> RewardEntry {
    let category = RewardCategory::HeldItem { max_stack: BERRY_MAX_STACK };
    RewardEntry::Deferred(
        RewardGenerator::new(category, move |_, variant, rng| {
            let berry = pick_variant(keys::BERRY, &Berry::ALL, variant, rng)?;
            Some(
                RewardKind::new(format!("{berry:?} Berry"), category, RewardEffect::Berry(berry))
                    .with_group("berry")
                    .with_filter(MemberFilter::Below {
                        reward_id: keys::BERRY.to_string(),
                        max_stack: BERRY_MAX_STACK,
                    }),
            )
        })
        .with_tags(&[RewardTag::Berry]),
    )
}

fn temp_stat_booster() -> RewardEntry {
    let category = RewardCategory::Persistent { max_stack: 5 };
    RewardEntry::Deferred(
        RewardGenerator::new(category, move |_, variant, rng| {
            let stat = pick_variant(keys::TEMP_STAT_BOOSTER, &Stat::ALL, variant, rng)?;
            Some(
                RewardKind::new(
                    format!("X {stat:?}"),
                    category,
                    RewardEffect::StatBoost { stat, stages: 1 },
                )
                .with_group("stat_booster"),
            )
        })
        .with_tags(&[RewardTag::StatBoost]),
    )
}

fn tm_common() -> RewardEntry {
    tm(Tier::Common)
}

fn tm_great() -> RewardEntry {
    tm(Tier::Great)
}

fn tm_ultra() -> RewardEntry {
    tm(Tier::Ultra)
}

/// A move some member can still learn at `tier`. The variant, if any, is a move id.
fn tm(tier: Tier) -> RewardEntry {
    RewardEntry::Deferred(
        RewardGenerator::new(RewardCategory::MoveSelect, move |run, variant, rng| {
            let learnable: BTreeSet<MoveId> = run
                .party
                .iter()
                .flat_map(|(_, member)| {
                    member
                        .learnable_moves
                        .iter()
                        .filter(move |learnable| learnable.tier == tier && !member.knows(learnable.id))
                        .map(|learnable| learnable.id)
                })
                .collect();
            let learnable: Vec<MoveId> = learnable.into_iter().collect();

            let requested = variant
                .and_then(Variant::as_index)
                .and_then(|index| u16::try_from(index).ok())
                .map(MoveId);
            let chosen = match requested {
                Some(id) if learnable.contains(&id) => id,
                Some(id) => {
                    warn!("tm: move {id:?} is not learnable at {tier:?}; picking at random");
                    *rng.pick(&learnable)?
                }
                None => *rng.pick(&learnable)?,
            };
            Some(
                RewardKind::new(
                    format!("TM{:03}", chosen.0),
                    RewardCategory::MoveSelect,
                    RewardEffect::TeachMove(chosen),
                )
                .with_filter(MemberFilter::CanLearn(chosen)),
            )
        })
        .with_tags(&[RewardTag::Tm]),
    )
}

fn tera_shard() -> RewardEntry {
    RewardEntry::Deferred(
        RewardGenerator::new(RewardCategory::Consumable, |_, variant, rng| {
            let element = pick_variant(keys::TERA_SHARD, &Element::ALL, variant, rng)?;
            Some(
                RewardKind::new(
                    format!("{element:?} Tera Shard"),
                    RewardCategory::Consumable,
                    RewardEffect::ChangeElement(element),
                )
                .with_group("tera_shard")
                .with_filter(MemberFilter::Conscious),
            )
        })
        .with_tags(&[RewardTag::TypeSwitch]),
    )
}

fn ability_capsule() -> RewardEntry {
    RewardEntry::Deferred(
        RewardGenerator::new(RewardCategory::Consumable, |run, variant, rng| {
            if !run.unlocks.contains(Unlockable::AbilityPool) {
                return None;
            }
            let ability = match variant.and_then(Variant::as_index).map(u16::try_from) {
                Some(Ok(index)) if u32::from(index) < ABILITY_COUNT => AbilityId(index),
                Some(_) => {
                    warn!("ability_capsule: variant {variant:?} is out of range; picking at random");
                    random_ability(rng)
                }
                None => random_ability(rng),
            };
            Some(
                RewardKind::new(
                    "Ability Capsule",
                    RewardCategory::Consumable,
                    RewardEffect::ChangeAbility(ability),
                )
                .with_filter(MemberFilter::Conscious),
            )
        })
        .with_tags(&[RewardTag::AbilitySwitch]),
    )
}

fn random_ability(rng: &mut RunRng) -> AbilityId {
    AbilityId(rng.int_from(ABILITY_COUNT - 1, 1) as u16)
}

/// Form changes some member can reach. The variant, if any, is the form key.
fn form_change_item() -> RewardEntry {
    RewardEntry::Deferred(
        RewardGenerator::new(RewardCategory::FormChangeItem, |run, variant, rng| {
            let forms: BTreeSet<&str> = run
                .party
                .iter()
                .flat_map(|(_, member)| member.form_change_targets.iter().map(String::as_str))
                .collect();
            let forms: Vec<&str> = forms.into_iter().collect();
            let form = match variant.and_then(Variant::as_key) {
                Some(key) if forms.contains(&key) => key,
                Some(key) => {
                    warn!("form_change_item: no member can reach {key}; picking at random");
                    *rng.pick(&forms)?
                }
                None => *rng.pick(&forms)?,
            };
            Some(
                RewardKind::new(
                    format!("{form} Key"),
                    RewardCategory::FormChangeItem,
                    RewardEffect::FormChange { form: form.to_string() },
                )
                .with_group("form_change")
                .with_filter(MemberFilter::HasForm(form.to_string())),
            )
        })
        .with_tags(&[RewardTag::FormChange]),
    )
}

/// A species not yet in the party. Yields nothing once the party is full.
fn recruit() -> RewardEntry {
    RewardEntry::Deferred(
        RewardGenerator::new(RewardCategory::PartyGrant, |run, variant, rng| {
            if run.party.is_full() {
                return None;
            }
            let requested = variant
                .and_then(Variant::as_index)
                .and_then(|index| u16::try_from(index).ok())
                .map(SpeciesId);
            let species = match requested {
                Some(species) if !run.party.contains_species(species) => species,
                _ => (0..RECRUIT_ATTEMPTS)
                    .map(|_| SpeciesId(rng.int_from(SPECIES_COUNT, 1) as u16))
                    .find(|species| !run.party.contains_species(*species))?,
            };
            Some(RewardKind::new(
                format!("Recruit #{:04}", species.0),
                RewardCategory::PartyGrant,
                RewardEffect::AddMember(species),
            ))
        })
        .with_tags(&[RewardTag::AddMember]),
    )
}
