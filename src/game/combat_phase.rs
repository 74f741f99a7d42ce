//! Alternating combat phase
//!
//! Three strike tiers fought in order. Inside a tier players take turns
//! activating one unit each, priority player first, until a full cycle
//! passes without anyone activating. A player that passes while it still
//! has units to fight gets one of them fought automatically.

use tracing::debug;

use crate::battle::units::StrikeOrder;
use crate::command::Command;
use crate::core::types::{PlayerId, UnitId};
use crate::game::state::Game;

impl Game {
    /// Units of `player` that still have to fight in `tier`, by id
    pub fn eligible_units(&self, player: PlayerId, tier: StrikeOrder) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self
            .units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.owner == player && u.is_alive() && u.strike_order == tier && !u.flags.fought)
            .filter(|(index, _)| self.engaged_at(*index))
            .map(|(_, u)| u.id)
            .collect();
        ids.sort();
        ids
    }

    pub(crate) fn run_combat_phase(&mut self) {
        let Some(first) = self.priority.or(self.active) else {
            return;
        };
        let order = self.turn_order(first);

        for tier in StrikeOrder::ALL {
            if self.is_over() {
                break;
            }
            if order.iter().all(|&p| self.eligible_units(p, tier).is_empty()) {
                debug!(%tier, "no units to fight, tier skipped");
                continue;
            }
            self.combat_tier = Some(tier);
            self.log.push(format!("Combat: {tier} tier"));

            loop {
                let mut activations = 0;
                for &player in &order {
                    if self.is_over() {
                        break;
                    }
                    if self.eligible_units(player, tier).is_empty() {
                        continue;
                    }
                    if self.activate(player, tier) {
                        activations += 1;
                    }
                }
                if activations == 0 || self.is_over() {
                    break;
                }
            }
        }

        self.combat_tier = None;
        self.acting = self.active;
    }

    /// Prompt `player` for one activation; returns whether a unit fought
    ///
    /// Commands that do not fight (all-out attack, all-out defence) are
    /// applied and the player is asked again. Once the player has been
    /// rejected `max_prompts_per_phase` times a unit is picked for it.
    fn activate(&mut self, player: PlayerId, tier: StrikeOrder) -> bool {
        self.acting = Some(player);

        let mut rejections = 0;
        while rejections < self.config.max_prompts_per_phase {
            let Some(command) = self.ask(player) else {
                break;
            };
            if command.is_end_phase() {
                break;
            }
            let fights = matches!(command, Command::PileIn { .. } | Command::Fight { .. });
            match self.execute(player, command.clone()) {
                Ok(_) if fights || self.is_over() => return true,
                Ok(_) => {}
                Err(err) => {
                    self.notify_rejected(player, &command, &err);
                    rejections += 1;
                }
            }
        }

        self.auto_resolve(player, tier)
    }

    /// Pile in and fight with the lowest-id unit still due to fight
    fn auto_resolve(&mut self, player: PlayerId, tier: StrikeOrder) -> bool {
        let Some(&unit) = self.eligible_units(player, tier).first() else {
            return false;
        };
        self.log.push(format!("{} passes; {unit} fights automatically", self.player_name(player)));

        if self.execute(player, Command::PileIn { unit, target: None }).is_err() {
            if let Ok(index) = self.index_of(unit) {
                self.units[index].flags.fought = true;
            }
            self.log.push(format!("{unit} could not fight and stands down"));
        }
        true
    }
}
