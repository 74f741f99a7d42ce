//! Game session state and command dispatch
//!
//! A `Game` owns everything one battle needs: board, units, rule registry,
//! dice and the command-point ledgers. Nothing is shared between games.

use std::fmt;
use tracing::{info, warn};

use crate::battle::board::{Board, Objective, TerrainPiece};
use crate::battle::engagement::is_engaged;
use crate::battle::units::{StrikeOrder, Unit};
use crate::command::{Command, CommandKind, CommandOutcome, CommandTracker};
use crate::core::config::GameConfig;
use crate::core::error::{CommandError, GameError};
use crate::core::types::{PlayerId, Round, UnitId};
use crate::dice::{DiceRoller, DiceSource};
use crate::game::log::BattleLog;
use crate::game::phase::Phase;
use crate::game::snapshot::{GameSnapshot, ObjectiveSnapshot, PlayerSnapshot, UnitSnapshot};
use crate::game::victory::BattleOutcome;
use crate::player::Player;
use crate::rules::terrain::rules_for_piece;
use crate::rules::RuleEngine;

/// Decision provider usable from any thread
pub type Controller = Box<dyn Player + Send>;

/// Dice owned by one game
pub type Dice = Box<dyn DiceRoller + Send>;

/// One registered player
pub struct PlayerSlot {
    pub id: PlayerId,
    pub name: String,
    pub tracker: CommandTracker,
    pub victory_points: u32,
    pub(crate) controller: Controller,
}

impl fmt::Debug for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerSlot")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("command_points", &self.tracker.points())
            .field("victory_points", &self.victory_points)
            .finish()
    }
}

/// Complete game state
pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) board: Board,
    pub(crate) units: Vec<Unit>,
    pub(crate) rules: RuleEngine,
    pub(crate) dice: Dice,
    pub(crate) players: Vec<PlayerSlot>,

    // Turn state
    pub(crate) round: Round,
    pub(crate) phase: Phase,
    pub(crate) active: Option<PlayerId>,
    /// Player currently being prompted
    pub(crate) acting: Option<PlayerId>,
    pub(crate) priority: Option<PlayerId>,
    pub(crate) combat_tier: Option<StrikeOrder>,

    // Output
    pub(crate) log: BattleLog,
    pub(crate) outcome: Option<BattleOutcome>,
}

impl Game {
    /// Create an empty game. Fails if the config is inconsistent.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_dice(config, DiceSource::new(seed))
    }

    /// Create an empty game rolling `dice` (scripted scenarios)
    pub fn with_dice(config: GameConfig, dice: impl DiceRoller + Send + 'static) -> Result<Self, GameError> {
        config.validate().map_err(GameError::InvalidConfig)?;
        let board = Board::new(config.board_width, config.board_height);

        Ok(Self {
            config,
            board,
            units: Vec::new(),
            rules: RuleEngine::new(),
            dice: Box::new(dice),
            players: Vec::new(),
            round: 0,
            phase: Phase::Hero,
            active: None,
            acting: None,
            priority: None,
            combat_tier: None,
            log: BattleLog::new(),
            outcome: None,
        })
    }

    /// Register a player; ids are handed out in registration order from 0
    pub fn add_player(&mut self, name: &str, controller: Controller) -> PlayerId {
        let id = PlayerId(self.players.len() as u32);
        self.players.push(PlayerSlot {
            id,
            name: name.to_string(),
            tracker: CommandTracker::new(),
            victory_points: 0,
            controller,
        });
        id
    }

    /// Add a unit to the battlefield, assigning it the next free id
    ///
    /// A unit whose owner is not registered yet is still deployed, but no
    /// one can command it and it never counts toward a surviving army.
    pub fn add_unit(&mut self, mut unit: Unit) -> UnitId {
        let id = UnitId(self.units.len() as u32 + 1);
        unit.id = id;
        if self.players.get(unit.owner.index()).is_none() {
            self.log.push(format!(
                "{} ({}) belongs to {}, which is not a registered player",
                unit.name, id, unit.owner
            ));
            warn!(unit = %id, owner = %unit.owner, "unit deployed for an unregistered player");
        }
        self.log.push(format!(
            "{} ({}) deployed at {} for {}",
            unit.name,
            id,
            unit.position,
            self.player_name(unit.owner)
        ));
        self.units.push(unit);
        id
    }

    /// Place a terrain piece and register the rules it contributes
    pub fn add_terrain(&mut self, piece: TerrainPiece) {
        for rule in rules_for_piece(&piece) {
            self.rules.add_rule(rule);
        }
        self.board.add_terrain(piece);
    }

    pub fn add_objective(&mut self, objective: Objective) {
        self.board.add_objective(objective);
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    /// Register global rules (army abilities, scenario effects)
    pub fn rules_mut(&mut self) -> &mut RuleEngine {
        &mut self.rules
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_player(&self) -> Option<PlayerId> {
        self.active
    }

    pub fn priority_player(&self) -> Option<PlayerId> {
        self.priority
    }

    pub fn combat_tier(&self) -> Option<StrikeOrder> {
        self.combat_tier
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn players(&self) -> &[PlayerSlot] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerSlot> {
        self.players.get(id.index())
    }

    pub fn command_points(&self, player: PlayerId) -> u32 {
        self.player(player).map_or(0, |p| p.tracker.points())
    }

    pub fn victory_points(&self, player: PlayerId) -> u32 {
        self.player(player).map_or(0, |p| p.victory_points)
    }

    /// Dice rolled so far this game
    pub fn dice_rolled(&self) -> u64 {
        self.dice.rolls_made()
    }

    pub(crate) fn player_name(&self, id: PlayerId) -> String {
        self.player(id).map_or_else(|| id.to_string(), |p| p.name.clone())
    }

    /// Total wounds left across a player's living units
    pub fn remaining_wounds(&self, player: PlayerId) -> u32 {
        self.units
            .iter()
            .filter(|u| u.owner == player)
            .map(Unit::remaining_wounds)
            .sum()
    }

    pub fn is_engaged(&self, id: UnitId) -> bool {
        self.unit(id)
            .is_some_and(|u| is_engaged(u, &self.units, &self.board, &self.config))
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let units = self
            .units
            .iter()
            .filter(|u| u.is_alive())
            .map(|u| UnitSnapshot {
                id: u.id,
                owner: u.owner,
                name: u.name.clone(),
                position: u.position,
                movement: u.stats.movement,
                save: u.stats.save,
                models_alive: u.living_models(),
                models_total: u.models.len(),
                wounds_remaining: u.remaining_wounds(),
                wounds_max: u.max_wounds(),
                weapons: u.weapons.clone(),
                strike_order: u.strike_order,
                flags: u.flags,
                engaged: is_engaged(u, &self.units, &self.board, &self.config),
                spells: u.spells.iter().map(|s| s.name.clone()).collect(),
                prayers: u.prayers.iter().map(|p| p.name.clone()).collect(),
            })
            .collect();

        GameSnapshot {
            round: self.round,
            phase: self.phase,
            active_player: self.active,
            priority_player: self.priority,
            combat_tier: self.combat_tier,
            players: self
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    id: p.id,
                    name: p.name.clone(),
                    command_points: p.tracker.points(),
                    victory_points: p.victory_points,
                })
                .collect(),
            units,
            objectives: self
                .board
                .objectives
                .iter()
                .map(|o| ObjectiveSnapshot {
                    name: o.name.clone(),
                    position: o.position,
                    controller: o.controller,
                })
                .collect(),
        }
    }

    // ===== TURN STRUCTURE =====

    /// Start a battle round: grant command points, underdog first
    pub fn init_round(&mut self, round: Round) {
        self.round = round;
        let wounds: Vec<(PlayerId, u32)> = self
            .players
            .iter()
            .map(|p| (p.id, self.remaining_wounds(p.id)))
            .collect();
        let underdog = crate::command::underdog(&wounds);

        self.log.push(format!("=== Battle round {round} ==="));
        info!(round, "battle round started");

        let base = self.config.base_command_points;
        let bonus = self.config.underdog_bonus;
        for slot in &mut self.players {
            let extra = if Some(slot.id) == underdog { bonus } else { 0 };
            slot.tracker.init_round(base, extra);
        }
        if let Some(player) = underdog {
            self.log.push(format!(
                "{} is the underdog and receives {} extra command point(s)",
                self.player_name(player),
                bonus
            ));
        }
    }

    /// Hand the turn to `player` and clear per-turn unit state
    pub fn start_turn(&mut self, player: PlayerId) {
        self.active = Some(player);
        self.acting = Some(player);
        for unit in &mut self.units {
            unit.reset_turn();
        }
        self.log.push(format!("--- {}'s turn ---", self.player_name(player)));
    }

    /// Enter `phase`: per-phase command usage is forgotten, the balance stays
    pub fn begin_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.acting = self.active;
        for slot in &mut self.players {
            slot.tracker.reset_phase();
        }
        self.log.push(format!("{phase} phase"));
    }

    /// Leave the current phase, expiring phase-scoped effects
    pub fn end_phase(&mut self) {
        let removed = self.rules.remove_rules_by_source(crate::rules::RuleSource::Command, "");
        if removed > 0 {
            self.log.push(format!("{removed} command effect(s) expire"));
        }

        if self.phase == Phase::EndOfTurn {
            self.score_objectives();
            let removed = self.rules.remove_rules_by_source(crate::rules::RuleSource::Spell, "");
            if removed > 0 {
                self.log.push(format!("{removed} spell effect(s) expire"));
            }
        }
        self.combat_tier = None;
    }

    // ===== COMMAND DISPATCH =====

    /// Validate and apply one command from `player`
    ///
    /// A rejected command leaves the game untouched and is logged. A victory
    /// check runs after every applied command.
    pub fn execute(&mut self, player: PlayerId, command: Command) -> Result<CommandOutcome, CommandError> {
        match self.apply(player, &command) {
            Ok(outcome) => {
                self.log.push(format!("{}: {}", self.player_name(player), outcome.description));
                self.check_victory();
                Ok(outcome)
            }
            Err(err) => {
                self.log.push(format!("Rejected {command}: {err}"));
                Err(err)
            }
        }
    }

    fn apply(&mut self, player: PlayerId, command: &Command) -> Result<CommandOutcome, CommandError> {
        if self.outcome.is_some() {
            return Err(CommandError::GameOver);
        }

        let kind = command.kind();
        if !self.phase.allows(kind) {
            return Err(CommandError::WrongPhase {
                command: kind,
                phase: self.phase,
            });
        }
        self.check_actor(player, kind)?;

        match command {
            Command::Move { unit, destination } => self.move_unit(player, *unit, *destination),
            Command::Run { unit, destination } => self.run_unit(player, *unit, *destination),
            Command::Retreat { unit, destination } => self.retreat_unit(player, *unit, *destination),
            Command::Shoot { unit, target } => self.shoot(player, *unit, *target),
            Command::Charge { unit, target } => self.charge(player, *unit, *target),
            Command::PileIn { unit, target } => self.pile_in_and_fight(player, *unit, *target),
            Command::Fight { unit, target } => self.fight(player, *unit, *target),
            Command::Cast { unit, spell, target } => self.cast(player, *unit, spell, *target, 0),
            Command::Chant { unit, prayer, target } => self.chant(player, *unit, prayer, *target, 0),
            Command::Rally { unit } => self.rally(player, *unit),
            Command::MagicalIntervention { unit, invocation } => {
                self.magical_intervention(player, *unit, invocation)
            }
            Command::AllOutAttack { unit } => self.all_out_attack(player, *unit),
            Command::AllOutDefence { unit } => self.all_out_defence(player, *unit),
            Command::PowerThrough { unit, target } => self.power_through(player, *unit, *target),
            Command::EndPhase => Ok(CommandOutcome::success(format!("ends the {} phase", self.phase))),
        }
    }

    /// Is `player` allowed to issue `kind` right now?
    fn check_actor(&self, player: PlayerId, kind: CommandKind) -> Result<(), CommandError> {
        if self.player(player).is_none() {
            return Err(CommandError::NotYourTurn(player));
        }

        // Interventions come from the players whose turn it is not
        if kind == CommandKind::MagicalIntervention {
            return if Some(player) == self.active {
                Err(CommandError::NotYourTurn(player))
            } else {
                Ok(())
            };
        }

        if Some(player) != self.acting {
            return Err(CommandError::NotYourTurn(player));
        }
        if !self.phase.is_alternating() && Some(player) != self.active {
            return Err(CommandError::NotYourTurn(player));
        }
        Ok(())
    }

    // ===== LOOKUP HELPERS =====

    pub(crate) fn index_of(&self, id: UnitId) -> Result<usize, CommandError> {
        self.units
            .iter()
            .position(|u| u.id == id)
            .ok_or(CommandError::UnknownUnit(id))
    }

    /// Index of a living unit owned by `player`
    pub(crate) fn own_unit(&self, player: PlayerId, id: UnitId) -> Result<usize, CommandError> {
        let index = self.index_of(id)?;
        let unit = &self.units[index];
        if unit.owner != player {
            return Err(CommandError::NotOwner { unit: id, player });
        }
        if unit.is_destroyed() {
            return Err(CommandError::UnitDestroyed(id));
        }
        Ok(index)
    }

    /// Index of a living enemy of `player`
    pub(crate) fn enemy_unit(&self, player: PlayerId, id: UnitId) -> Result<usize, CommandError> {
        let index = self.index_of(id)?;
        let unit = &self.units[index];
        if unit.owner == player {
            return Err(CommandError::InvalidTarget(format!("{id} is a friendly unit")));
        }
        if unit.is_destroyed() {
            return Err(CommandError::UnitDestroyed(id));
        }
        Ok(index)
    }

    /// Index of a living unit on `player`'s side
    pub(crate) fn friendly_unit(&self, player: PlayerId, id: UnitId) -> Result<usize, CommandError> {
        let index = self.index_of(id)?;
        let unit = &self.units[index];
        if unit.owner != player {
            return Err(CommandError::InvalidTarget(format!("{id} is an enemy unit")));
        }
        if unit.is_destroyed() {
            return Err(CommandError::UnitDestroyed(id));
        }
        Ok(index)
    }

    pub(crate) fn engaged_at(&self, index: usize) -> bool {
        is_engaged(&self.units[index], &self.units, &self.board, &self.config)
    }

    /// Force a phase without running the loop (scenario setup)
    pub fn set_phase(&mut self, player: PlayerId, phase: Phase) {
        if self.active != Some(player) {
            self.start_turn(player);
        }
        self.begin_phase(phase);
    }

    /// Prompt for a single decision
    pub(crate) fn ask(&mut self, player: PlayerId) -> Option<Command> {
        let snapshot = self.snapshot();
        let phase = self.phase;
        let slot = self.players.get_mut(player.index())?;
        slot.controller.next_command(player, phase, &snapshot)
    }

    pub(crate) fn notify_rejected(&mut self, player: PlayerId, command: &Command, error: &CommandError) {
        if let Some(slot) = self.players.get_mut(player.index()) {
            slot.controller.on_rejected(command, error);
        }
    }
}

/// Two distinct units borrowed at once: the first shared, the second mutable
pub(crate) fn split_pair(units: &mut [Unit], first: usize, second: usize) -> (&Unit, &mut Unit) {
    debug_assert_ne!(first, second);
    if first < second {
        let (left, right) = units.split_at_mut(second);
        (&left[first], &mut right[0])
    } else {
        let (left, right) = units.split_at_mut(first);
        (&right[0], &mut left[second])
    }
}
