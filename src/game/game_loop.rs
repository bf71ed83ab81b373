//! One actor's turn loop, and a two-thread match runner.
//!
//! Each seat runs a [`GameLoop`] on its own thread. A turn is:
//!
//! 1. wait for the turn token
//! 2. stop the match if it is over
//! 3. refill recipe slots (two on the first turn, one after a brew)
//! 4. extract a marble and resolve its cascade
//! 5. assign held marbles to recipes, brewing whatever completes
//! 6. record the turn and hand the token over
//!
//! A rejected decision is re-prompted up to `max_attempts` times. Running out
//! of attempts, or running past the turn deadline, forfeits the turn: the
//! table goes back to how it was when the token was acquired. With a turn
//! limit set, the deadline holds even for an actor that never answers.

use std::sync::Arc;
use std::thread;

use crate::core::{
    ActionOutcome, ColorCounts, GameConfig, GameError, GameResult, PlayerId, PlayerMap, Table,
    TurnAction, TurnRecord,
};
use crate::dispenser::CascadeEngine;
use crate::players::RECIPE_SLOTS;
use crate::recipes::RecipeCatalog;
use crate::turns::{TurnCoordinator, TurnGuard, TurnNotice};

use super::actor::Actor;
use super::seat::Seat;

/// Drives one seat through its turns.
pub struct GameLoop {
    player: PlayerId,
    name: String,
    seat: Seat,
    coordinator: Arc<TurnCoordinator<Table>>,
    catalog: Arc<RecipeCatalog>,
    engine: CascadeEngine,
    max_turns: Option<u32>,
    max_attempts: u32,
}

impl GameLoop {
    pub fn new(
        player: PlayerId,
        actor: Box<dyn Actor>,
        coordinator: Arc<TurnCoordinator<Table>>,
        catalog: Arc<RecipeCatalog>,
        config: &GameConfig,
    ) -> Self {
        Self {
            player,
            name: actor.name().to_string(),
            seat: Seat::new(actor, Arc::clone(&catalog), config.turn_timeout()),
            coordinator,
            catalog,
            engine: CascadeEngine::new(config.cascade),
            max_turns: config.max_turns,
            max_attempts: config.max_attempts.max(1),
        }
    }

    /// Play until the match closes. Returns the number of turns this seat
    /// took, skipped turns included.
    ///
    /// Fails with `ActorFailed` if the actor's worker thread died; the turn
    /// in progress is rolled back and the match is closed.
    pub fn run(&mut self) -> Result<u32, GameError> {
        let coordinator = Arc::clone(&self.coordinator);
        let mut played = 0;

        while let Some(mut guard) = coordinator.acquire(self.player) {
            if guard.is_over(self.max_turns) {
                let summary = match guard.result() {
                    GameResult::Winner(winner) => {
                        format!("{} wins", guard.player(winner).name())
                    }
                    GameResult::Draw => "draw".to_string(),
                };
                log::info!("match over after {} turns: {}", guard.turns().len(), summary);
                guard.finish(summary);
                break;
            }

            played += 1;
            match self.play_turn(&mut guard) {
                Ok(record) => {
                    let summary = self.summarize(&record);
                    log::info!("turn {}: {}", guard.turn_number(), summary);
                    guard.end_turn(record);
                    guard.release(summary);
                }
                Err(err @ GameError::ActorFailed(_)) => {
                    log::error!("{} left the table: {}", self.name, err);
                    guard.abandon();
                    return Err(err);
                }
                Err(err) => {
                    log::warn!("{} forfeits turn {}: {}", self.name, guard.turn_number(), err);
                    let player = self.player;
                    guard.forfeit_with(err.to_string(), |table| {
                        table.end_turn(TurnRecord {
                            player,
                            skipped: true,
                            ..TurnRecord::default()
                        });
                    });
                }
            }
        }

        Ok(played)
    }

    fn play_turn(&mut self, guard: &mut TurnGuard<'_, Table>) -> Result<TurnRecord, GameError> {
        let mut record = TurnRecord {
            player: self.player,
            ..TurnRecord::default()
        };

        let state = guard.player(self.player);
        let wanted = if state.is_new() {
            RECIPE_SLOTS
        } else {
            state.open_slots().min(1)
        };
        if wanted > 0 {
            self.attempt(guard, |seat, guard, player| {
                Ok(TurnAction::select_recipes(&seat.choose_recipes(guard, player, wanted)?))
            })?;
        }

        let outcome = self.attempt(guard, |seat, guard, player| {
            let (row, col) = seat.choose_extraction(guard, player)?;
            Ok(TurnAction::Extract { row, col })
        })?;
        if let ActionOutcome::Captured(result) = outcome {
            record.captured = result.captured.to_vec();
        }

        let mut rejected = 0;
        loop {
            guard.check_deadline()?;
            let Some((color, slot)) = self.seat.choose_assignment(guard, self.player)? else {
                break;
            };

            let assign = TurnAction::Assign { color, slot };
            if let Err(err) = guard.apply(self.player, &assign, &self.catalog, &self.engine) {
                log::warn!("{} tried to {}: {}", self.name, assign, err);
                self.seat.on_rejected(&err);
                rejected += 1;
                if rejected >= self.max_attempts {
                    break;
                }
                continue;
            }

            let brew = TurnAction::Brew { slot };
            if let ActionOutcome::Brewed(Some(event)) =
                guard.apply(self.player, &brew, &self.catalog, &self.engine)?
            {
                log::info!("{} {}", self.name, event);
                record.brewed.push(event.recipe);
            }
        }

        guard.check_deadline()?;
        Ok(record)
    }

    /// Ask the actor until a decision is accepted or the budget runs out.
    fn attempt(
        &mut self,
        guard: &mut TurnGuard<'_, Table>,
        mut decide: impl FnMut(&mut Seat, &TurnGuard<'_, Table>, PlayerId) -> Result<TurnAction, GameError>,
    ) -> Result<ActionOutcome, GameError> {
        let mut rejected = 0;
        loop {
            guard.check_deadline()?;
            let action = decide(&mut self.seat, guard, self.player)?;
            match guard.apply(self.player, &action, &self.catalog, &self.engine) {
                Ok(outcome) => return Ok(outcome),
                Err(err) => {
                    log::warn!("{} tried to {}: {}", self.name, action, err);
                    self.seat.on_rejected(&err);
                    rejected += 1;
                    if rejected >= self.max_attempts {
                        return Err(err);
                    }
                }
            }
        }
    }

    fn summarize(&self, record: &TurnRecord) -> String {
        let captured: ColorCounts = record.captured.iter().copied().collect();
        let mut summary = format!(
            "{} captured {} marble(s) {}",
            self.name,
            record.captured.len(),
            captured
        );
        if !record.brewed.is_empty() {
            summary.push_str(" and brewed ");
            summary.push_str(&record.brewed.join(", "));
        }
        summary
    }
}

/// Everything a finished match leaves behind.
#[derive(Clone, Debug)]
pub struct MatchReport {
    pub table: Table,
    pub result: GameResult,
    /// Every hand-off, in order.
    pub notices: Vec<TurnNotice>,
    /// Forfeited turns per seat.
    pub skipped: PlayerMap<u32>,
}

/// Play a full match with one thread per actor.
///
/// `actors[0]` sits in the first seat. Fails with `InvalidConfig` before any
/// thread starts if `config` does not validate, and with `ActorFailed` if an
/// actor panics.
pub fn run_match(
    config: &GameConfig,
    catalog: RecipeCatalog,
    actors: [Box<dyn Actor>; 2],
) -> Result<MatchReport, GameError> {
    config
        .validate()
        .map_err(|err| GameError::InvalidConfig(err.to_string()))?;
    let names = [actors[0].name().to_string(), actors[1].name().to_string()];
    let table = Table::new(config, [&names[0], &names[1]])?;
    log::info!(
        "{} vs {} on a {}x{} dispenser (seed {})",
        names[0],
        names[1],
        config.rows,
        config.columns,
        config.seed
    );

    let coordinator =
        Arc::new(TurnCoordinator::idle(table).with_turn_limit(config.turn_timeout()));
    let notices = coordinator.subscribe();
    let catalog = Arc::new(catalog);

    let handles: Vec<_> = PlayerId::all()
        .zip(actors)
        .map(|(player, actor)| {
            let mut game = GameLoop::new(
                player,
                actor,
                Arc::clone(&coordinator),
                Arc::clone(&catalog),
                config,
            );
            thread::spawn(move || game.run())
        })
        .collect();

    coordinator.start(config.starting_player);

    let mut failed = None;
    for (player, handle) in PlayerId::all().zip(handles) {
        match handle.join() {
            Ok(Ok(_)) => {}
            Ok(Err(_)) => {
                failed.get_or_insert(player);
            }
            Err(_) => {
                log::error!("actor thread for {} panicked", player);
                coordinator.shutdown();
                failed.get_or_insert(player);
            }
        }
    }
    if let Some(player) = failed {
        return Err(GameError::ActorFailed(player));
    }

    let skipped = PlayerMap::new(|player| coordinator.skipped(player));
    let table = coordinator
        .read(Table::clone)
        .ok_or(GameError::ActorFailed(config.starting_player))?;
    let result = table.result();
    log::info!("final result: {:?}", result);

    Ok(MatchReport {
        table,
        result,
        notices: notices.try_iter().collect(),
        skipped,
    })
}
