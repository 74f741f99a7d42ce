//! Shooting and melee commands

use ordered_float::OrderedFloat;

use crate::battle::engagement::{engaged_enemies, in_engagement, nearest_enemy};
use crate::battle::weapon::WeaponAbility;
use crate::combat::{resolve_combat, resolve_weapons, CombatResult};
use crate::command::CommandOutcome;
use crate::core::error::CommandError;
use crate::core::types::{PlayerId, Position, UnitId};
use crate::game::state::{split_pair, Game};
use crate::rules::{Axis, RuleContext, Trigger};

/// One-line summary of a unit's attacks against a target
fn summarize(results: &[CombatResult]) -> String {
    let damage: u32 = results.iter().map(CombatResult::total_damage).sum();
    let slain: u32 = results.iter().map(|r| r.models_slain).sum();
    let destroyed = results.iter().any(|r| r.unit_destroyed);
    let mut line = format!("{damage} damage, {slain} slain");
    if destroyed {
        line.push_str(", unit destroyed");
    }
    line
}

struct PileInPlan {
    destination: Position,
    step: f64,
    blocked: Option<String>,
}

impl Game {
    fn log_results(&mut self, results: &[CombatResult]) {
        for result in results {
            self.log.push(format!("  {result}"));
            for note in &result.notes {
                self.log.push(format!("    {note}"));
            }
        }
    }

    pub(crate) fn shoot(
        &mut self,
        player: PlayerId,
        unit: UnitId,
        target: UnitId,
    ) -> Result<CommandOutcome, CommandError> {
        let index = self.own_unit(player, unit)?;
        let shooter = &self.units[index];

        if shooter.flags.shot {
            return Err(CommandError::AlreadyActed { unit, action: "shot" });
        }
        if shooter.flags.ran {
            return Err(CommandError::AlreadyActed { unit, action: "run" });
        }
        if shooter.flags.retreated {
            return Err(CommandError::AlreadyActed { unit, action: "retreated" });
        }

        let target_index = self.enemy_unit(player, target)?;
        let defender = &self.units[target_index];
        let distance = shooter.distance_to(defender);

        // ===== WEAPON SELECTION =====
        let ranged: Vec<usize> = (0..shooter.weapons.len())
            .filter(|&i| shooter.weapons[i].is_ranged())
            .collect();
        if ranged.is_empty() {
            return Err(CommandError::NoWeapons(unit));
        }
        let in_range: Vec<usize> = ranged
            .iter()
            .copied()
            .filter(|&i| shooter.weapons[i].in_range(distance))
            .collect();
        if in_range.is_empty() {
            let max = ranged.iter().map(|&i| shooter.weapons[i].range).fold(0.0, f64::max);
            return Err(CommandError::OutOfRange { distance, max });
        }
        let usable: Vec<usize> = if self.engaged_at(index) {
            in_range
                .into_iter()
                .filter(|&i| shooter.weapons[i].has_ability(WeaponAbility::ShootInCombat))
                .collect()
        } else {
            in_range
        };
        if usable.is_empty() {
            return Err(CommandError::Engaged(unit));
        }

        if !self.board.has_line_of_sight(&shooter.position, &defender.position) {
            return Err(CommandError::NoLineOfSight(target));
        }

        let mut ctx = RuleContext::targeted(Trigger::BeforeShoot, shooter, defender, true);
        self.rules.evaluate(Trigger::BeforeShoot, &mut ctx);
        if let Some(message) = ctx.block_message() {
            return Err(CommandError::Blocked(message.to_string()));
        }

        // ===== RESOLVE =====
        let (shooter, defender) = split_pair(&mut self.units, index, target_index);
        let weapons = usable.iter().map(|&i| &shooter.weapons[i]);
        let results = resolve_weapons(&mut self.dice, &self.rules, shooter, weapons, defender, true);
        let description = format!("{} shoots {}: {}", shooter.name, defender.name, summarize(&results));

        self.units[index].flags.shot = true;
        self.log_results(&results);
        Ok(CommandOutcome::success(description))
    }

    /// Checks shared by pile-in and fight
    fn validate_melee(&self, player: PlayerId, unit: UnitId) -> Result<usize, CommandError> {
        let index = self.own_unit(player, unit)?;
        let fighter = &self.units[index];
        if fighter.flags.fought {
            return Err(CommandError::AlreadyActed { unit, action: "fought" });
        }
        if !self.engaged_at(index) {
            return Err(CommandError::NotEngaged(unit));
        }
        if self.combat_tier.is_some_and(|tier| tier != fighter.strike_order) {
            return Err(CommandError::WrongStrikeTier(unit));
        }
        Ok(index)
    }

    /// Target must be a living enemy inside engagement range
    fn validate_melee_target(&self, player: PlayerId, index: usize, target: UnitId) -> Result<usize, CommandError> {
        let target_index = self.enemy_unit(player, target)?;
        let fighter = &self.units[index];
        let defender = &self.units[target_index];
        if !in_engagement(fighter, defender, &self.board, &self.config) {
            return Err(CommandError::OutOfRange {
                distance: fighter.distance_to(defender),
                max: self.config.engagement_range,
            });
        }
        Ok(target_index)
    }

    /// Resolve melee and mark the unit as having fought
    fn strike(&mut self, index: usize, target_index: usize) -> String {
        let (fighter, defender) = split_pair(&mut self.units, index, target_index);
        let results = resolve_combat(&mut self.dice, &self.rules, fighter, defender);
        let description = if results.is_empty() {
            format!("{} has no melee weapons to fight {}", fighter.name, defender.name)
        } else {
            format!("{} fights {}: {}", fighter.name, defender.name, summarize(&results))
        };

        self.units[index].flags.fought = true;
        self.log_results(&results);
        description
    }

    pub(crate) fn fight(
        &mut self,
        player: PlayerId,
        unit: UnitId,
        target: UnitId,
    ) -> Result<CommandOutcome, CommandError> {
        let index = self.validate_melee(player, unit)?;
        let target_index = self.validate_melee_target(player, index, target)?;
        Ok(CommandOutcome::success(self.strike(index, target_index)))
    }

    /// Where a pile-in would end, how far it goes and whether a rule blocks it
    ///
    /// `None` when the unit cannot get any closer to the nearest enemy. The
    /// `BeforePileIn` rules are evaluated once, aimed at the unmodified
    /// pile-in destination; their modifier then stretches or shortens the move.
    fn plan_pile_in(&self, index: usize) -> Option<PileInPlan> {
        let fighter = &self.units[index];
        let nearest = nearest_enemy(fighter, &self.units)?;
        let room = fighter.distance_to(nearest) - self.config.base_contact_distance;
        if room <= 0.0 {
            return None;
        }

        let aim = fighter.position.toward(&nearest.position, self.config.pile_in_distance.min(room));
        let mut ctx = RuleContext::movement(Trigger::BeforePileIn, fighter, aim);
        self.rules.evaluate(Trigger::BeforePileIn, &mut ctx);
        let allowance = self.config.pile_in_distance + ctx.modifier(Axis::PileIn).total() as f64;
        let step = allowance.min(room);
        if step <= 0.0 {
            return None;
        }
        Some(PileInPlan {
            destination: fighter.position.toward(&nearest.position, step),
            step,
            blocked: ctx.block_message().map(str::to_string),
        })
    }

    /// Move up to the pile-in distance toward the nearest enemy, then fight
    ///
    /// The move never ends closer than base contact and is skipped when it
    /// cannot bring the unit any closer. A blocked pile-in cancels the move
    /// only; the unit still fights.
    pub(crate) fn pile_in_and_fight(
        &mut self,
        player: PlayerId,
        unit: UnitId,
        target: Option<UnitId>,
    ) -> Result<CommandOutcome, CommandError> {
        let index = self.validate_melee(player, unit)?;
        if let Some(target) = target {
            self.validate_melee_target(player, index, target)?;
        }

        // ===== PILE IN =====
        let mut movement = String::new();
        if let Some(plan) = self.plan_pile_in(index) {
            match plan.blocked {
                Some(message) => movement = format!("pile-in blocked ({message}); "),
                None => {
                    let fighter = &mut self.units[index];
                    fighter.move_to(plan.destination);
                    fighter.flags.piled_in = true;
                    movement = format!("piles in {:.1}\"; ", plan.step);
                }
            }
        }

        // ===== FIGHT =====
        let requested = target.and_then(|t| self.validate_melee_target(player, index, t).ok());
        let target_index = match requested {
            Some(target_index) => Some(target_index),
            None => {
                let fighter = &self.units[index];
                engaged_enemies(fighter, &self.units, &self.board, &self.config)
                    .into_iter()
                    .min_by_key(|enemy| (OrderedFloat(fighter.distance_to(enemy)), enemy.id))
                    .and_then(|enemy| self.index_of(enemy.id).ok())
            }
        };

        let Some(target_index) = target_index else {
            self.units[index].flags.fought = true;
            let name = self.units[index].name.clone();
            return Ok(CommandOutcome::failure(format!("{movement}{name} has no enemy left to fight")));
        };
        let description = self.strike(index, target_index);
        Ok(CommandOutcome::success(format!("{movement}{description}")))
    }
}
