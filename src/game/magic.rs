//! Hero phase magic: spells, prayers and magical interventions

use crate::battle::constants::INTERVENTION_PENALTY;
use crate::battle::magic::RitualEffect;
use crate::combat::resolve_mortal_wounds;
use crate::command::{CommandKind, CommandOutcome, Invocation};
use crate::core::error::CommandError;
use crate::core::types::{PlayerId, UnitId};
use crate::dice::DiceRoller;
use crate::game::state::Game;
use crate::rules::commands::{ritual_hit_buff, ritual_save_buff};

/// A validated spell or prayer attempt
struct Ritual {
    caster: usize,
    target: usize,
    name: String,
    value: u8,
    effect: RitualEffect,
}

impl Game {
    /// Target must be on the side the effect aims at and within `range`
    fn ritual_target(
        &self,
        player: PlayerId,
        caster: usize,
        target: UnitId,
        effect: RitualEffect,
        range: f64,
    ) -> Result<usize, CommandError> {
        let target_index = if effect.targets_enemy() {
            self.enemy_unit(player, target)?
        } else {
            self.friendly_unit(player, target)?
        };
        let distance = self.units[caster].distance_to(&self.units[target_index]);
        if distance > range {
            return Err(CommandError::OutOfRange { distance, max: range });
        }
        Ok(target_index)
    }

    fn validate_cast(
        &self,
        player: PlayerId,
        unit: UnitId,
        spell: &str,
        target: UnitId,
    ) -> Result<Ritual, CommandError> {
        let caster = self.own_unit(player, unit)?;
        let wizard = &self.units[caster];
        if wizard.magic.miscast || wizard.magic.casts >= wizard.wizard {
            return Err(CommandError::NoCastsLeft(unit));
        }
        let spell = wizard.spell(spell).ok_or_else(|| CommandError::UnknownRitual {
            unit,
            name: spell.to_string(),
        })?;
        let target = self.ritual_target(player, caster, target, spell.effect, spell.range)?;

        Ok(Ritual {
            caster,
            target,
            name: spell.name.clone(),
            value: spell.casting_value,
            effect: spell.effect,
        })
    }

    fn validate_chant(
        &self,
        player: PlayerId,
        unit: UnitId,
        prayer: &str,
        target: UnitId,
    ) -> Result<Ritual, CommandError> {
        let caster = self.own_unit(player, unit)?;
        let priest = &self.units[caster];
        if priest.magic.chants >= priest.priest {
            return Err(CommandError::NoChantsLeft(unit));
        }
        let prayer = priest.prayer(prayer).ok_or_else(|| CommandError::UnknownRitual {
            unit,
            name: prayer.to_string(),
        })?;
        let target = self.ritual_target(player, caster, target, prayer.effect, prayer.range)?;

        Ok(Ritual {
            caster,
            target,
            name: prayer.name.clone(),
            value: prayer.chanting_value,
            effect: prayer.effect,
        })
    }

    pub(crate) fn cast(
        &mut self,
        player: PlayerId,
        unit: UnitId,
        spell: &str,
        target: UnitId,
        modifier: i32,
    ) -> Result<CommandOutcome, CommandError> {
        let ritual = self.validate_cast(player, unit, spell, target)?;
        Ok(self.perform_cast(ritual, modifier))
    }

    pub(crate) fn chant(
        &mut self,
        player: PlayerId,
        unit: UnitId,
        prayer: &str,
        target: UnitId,
        modifier: i32,
    ) -> Result<CommandOutcome, CommandError> {
        let ritual = self.validate_chant(player, unit, prayer, target)?;
        Ok(self.perform_chant(ritual, modifier))
    }

    /// Cast or chant out of turn for a command point, at a penalty
    pub(crate) fn magical_intervention(
        &mut self,
        player: PlayerId,
        unit: UnitId,
        invocation: &Invocation,
    ) -> Result<CommandOutcome, CommandError> {
        let ritual = match invocation {
            Invocation::Spell { name, target } => self.validate_cast(player, unit, name, *target)?,
            Invocation::Prayer { name, target } => self.validate_chant(player, unit, name, *target)?,
        };
        self.players[player.index()]
            .tracker
            .spend(CommandKind::MagicalIntervention, Some(unit))?;

        let outcome = match invocation {
            Invocation::Spell { .. } => self.perform_cast(ritual, INTERVENTION_PENALTY),
            Invocation::Prayer { .. } => self.perform_chant(ritual, INTERVENTION_PENALTY),
        };
        Ok(CommandOutcome {
            description: format!("intervenes: {}", outcome.description),
            ..outcome
        })
    }

    /// 2D6 against the casting value; a double 1 miscasts
    fn perform_cast(&mut self, ritual: Ritual, modifier: i32) -> CommandOutcome {
        self.units[ritual.caster].magic.casts += 1;
        let (a, b) = self.dice.two_d6();

        if a == 1 && b == 1 {
            self.units[ritual.caster].magic.miscast = true;
            let amount = self.dice.d3() as u32;
            let damage = resolve_mortal_wounds(&mut self.dice, &mut self.units[ritual.caster], amount);
            return CommandOutcome::failure(format!(
                "{} miscasts {} and suffers {}",
                self.units[ritual.caster].name, ritual.name, damage
            ));
        }

        let total = a as i32 + b as i32 + modifier;
        let caster = self.units[ritual.caster].name.clone();
        if total < ritual.value as i32 {
            return CommandOutcome::failure(format!(
                "{caster} fails to cast {} (rolled {total}, needed {})",
                ritual.name, ritual.value
            ));
        }

        let effect = self.apply_ritual_effect(&ritual);
        CommandOutcome::success(format!("{caster} casts {} (rolled {total}): {effect}", ritual.name))
    }

    /// D6 plus banked ritual points against the chanting value
    fn perform_chant(&mut self, ritual: Ritual, modifier: i32) -> CommandOutcome {
        self.units[ritual.caster].magic.chants += 1;
        let roll = self.dice.d6();
        let caster = self.units[ritual.caster].name.clone();

        if roll == 1 {
            self.units[ritual.caster].magic.ritual_points = 0;
            return CommandOutcome::failure(format!(
                "{caster} rolls a 1 chanting {} and loses all ritual points",
                ritual.name
            ));
        }

        let banked = self.units[ritual.caster].magic.ritual_points;
        let total = roll as i32 + modifier + banked as i32;
        if total < ritual.value as i32 {
            self.units[ritual.caster].magic.ritual_points = banked + roll as u32;
            return CommandOutcome::failure(format!(
                "{caster} chants {} but falls short ({total} of {}); {} ritual points banked",
                ritual.name,
                ritual.value,
                banked + roll as u32
            ));
        }

        self.units[ritual.caster].magic.ritual_points = 0;
        let effect = self.apply_ritual_effect(&ritual);
        CommandOutcome::success(format!("{caster}'s {} is answered ({total}): {effect}", ritual.name))
    }

    fn apply_ritual_effect(&mut self, ritual: &Ritual) -> String {
        let target_id = self.units[ritual.target].id;
        let target_name = self.units[ritual.target].name.clone();
        match ritual.effect {
            RitualEffect::MortalDamage(roll) => {
                let amount = roll.roll(&mut self.dice);
                let damage = resolve_mortal_wounds(&mut self.dice, &mut self.units[ritual.target], amount);
                format!("{target_name} suffers {damage}")
            }
            RitualEffect::Heal(points) => {
                let (healed, returned) = self.units[ritual.target].restore(points);
                format!("{target_name} heals {healed} wound(s) and {returned} model(s) return")
            }
            RitualEffect::HitBuff(amount) => {
                self.rules.add_rule(ritual_hit_buff(&ritual.name, target_id, amount));
                format!("{target_name} gains {amount:+} to hit until end of turn")
            }
            RitualEffect::SaveBuff(amount) => {
                self.rules.add_rule(ritual_save_buff(&ritual.name, target_id, amount));
                format!("{target_name} gains {amount:+} to save until end of turn")
            }
        }
    }
}
