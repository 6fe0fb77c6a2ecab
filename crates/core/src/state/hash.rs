//! Stable fingerprint of everything that feeds live pool weights.
//! The luck buff is excluded because the tier resolver reads it live on every draw.

use std::hash::Hasher;

use slotmap::Key;
use xxhash_rust::xxh3::Xxh3;

use super::RunState;

impl RunState {
    pub fn fingerprint(&self, reroll_count: u32) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u32(self.wave_index);
        hasher.write_u32(reroll_count);

        hasher.write_usize(self.party.len());
        for (id, member) in self.party.iter() {
            hasher.write_u64(id.data().as_ffi());
            hasher.write_u16(member.species.0);
            hasher.write_u16(member.ability.0);
            for element in &member.elements {
                hasher.write_u8(*element as u8);
            }
            hasher.write_u8(0xFF);
            for id in &member.moves {
                hasher.write_u16(id.0);
            }
            hasher.write_u8(0xFF);
            for learnable in &member.learnable_moves {
                hasher.write_u16(learnable.id.0);
                hasher.write_u8(learnable.tier as u8);
            }
            hasher.write_u8(0xFF);
            for form in &member.form_change_targets {
                hasher.write(form.as_bytes());
                hasher.write_u8(0);
            }
            for (reward_id, count) in &member.held {
                hasher.write(reward_id.as_bytes());
                hasher.write_u32(*count);
            }
            hasher.write_u8(member.luck);
            hasher.write_u8(member.hp_percent);
            hasher.write_u8(u8::from(member.fainted));
        }

        for (reward_id, count) in self.persistent.iter() {
            hasher.write(reward_id.as_bytes());
            hasher.write_u32(count);
        }
        for flag in self.unlocks.iter() {
            hasher.write_u8(flag as u8);
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::state::{LuckBuff, PartyMember, RunState};
    use crate::types::{Element, SpeciesId, Unlockable};

    #[test]
    fn fingerprint_tracks_weight_inputs_but_not_luck() {
        let mut run = RunState::default();
        let member = run.party.add(PartyMember::new(SpeciesId(25), vec![Element::Electric]));
        let baseline = run.fingerprint(0);

        assert_ne!(baseline, run.fingerprint(1));

        let mut lucky = run.clone();
        lucky.luck = LuckBuff::new(3, 4);
        assert_eq!(baseline, lucky.fingerprint(0));

        let mut holding = run.clone();
        if let Some(m) = holding.party.get_mut(member) {
            m.hold("leftovers", 1);
        }
        assert_ne!(baseline, holding.fingerprint(0));

        let mut unlocked = run.clone();
        unlocked.unlocks.unlock(Unlockable::AbilityPool);
        assert_ne!(baseline, unlocked.fingerprint(0));
    }
}
