//! Where a seat's decisions are computed.
//!
//! Without a turn limit the actor answers on the seat's own thread. With one,
//! the actor lives on a worker thread and every question is a job on a
//! channel, so the seat stops waiting once the deadline passes and forfeits
//! the turn. An actor that never answers only ties up its own worker; it can
//! no longer keep the turn token.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::core::{Color, GameError, PlayerId, Table};
use crate::recipes::RecipeCatalog;
use crate::turns::TurnGuard;

use super::actor::Actor;

/// Work for the actor thread. Replies travel on a channel the job carries.
type Job = Box<dyn FnOnce(&mut dyn Actor, &RecipeCatalog) + Send>;

pub(crate) enum Seat {
    Local {
        actor: Box<dyn Actor>,
        catalog: Arc<RecipeCatalog>,
    },
    Worker {
        jobs: Sender<Job>,
    },
}

impl Seat {
    /// Run `actor` locally, or on its own thread when turns have a `limit`.
    pub(crate) fn new(
        actor: Box<dyn Actor>,
        catalog: Arc<RecipeCatalog>,
        limit: Option<Duration>,
    ) -> Self {
        if limit.is_none() {
            return Seat::Local { actor, catalog };
        }

        let (jobs, queue) = mpsc::channel::<Job>();
        thread::spawn(move || {
            let mut actor = actor;
            for job in queue {
                job(actor.as_mut(), &catalog);
            }
        });
        Seat::Worker { jobs }
    }

    pub(crate) fn choose_recipes(
        &mut self,
        guard: &TurnGuard<'_, Table>,
        player: PlayerId,
        count: usize,
    ) -> Result<Vec<usize>, GameError> {
        self.ask(guard, player, move |actor, catalog, table, player| {
            actor.choose_recipes(table, catalog, player, count)
        })
    }

    pub(crate) fn choose_extraction(
        &mut self,
        guard: &TurnGuard<'_, Table>,
        player: PlayerId,
    ) -> Result<(usize, usize), GameError> {
        self.ask(guard, player, |actor, _, table, player| {
            actor.choose_extraction(table, player)
        })
    }

    pub(crate) fn choose_assignment(
        &mut self,
        guard: &TurnGuard<'_, Table>,
        player: PlayerId,
    ) -> Result<Option<(Color, usize)>, GameError> {
        self.ask(guard, player, |actor, _, table, player| {
            actor.choose_assignment(table, player)
        })
    }

    pub(crate) fn on_rejected(&mut self, error: &GameError) {
        match self {
            Seat::Local { actor, .. } => actor.on_rejected(error),
            Seat::Worker { jobs } => {
                let error = error.clone();
                // A dead worker surfaces on the next question.
                let _ = jobs.send(Box::new(move |actor, _| actor.on_rejected(&error)));
            }
        }
    }

    /// Ask one question, waiting no longer than the turn has left.
    ///
    /// Fails with `TurnTimeout` when the deadline passes first, and with
    /// `ActorFailed` when the worker thread is gone.
    fn ask<R, F>(
        &mut self,
        guard: &TurnGuard<'_, Table>,
        player: PlayerId,
        decide: F,
    ) -> Result<R, GameError>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn Actor, &RecipeCatalog, &Table, PlayerId) -> R + Send + 'static,
    {
        let jobs = match self {
            Seat::Local { actor, catalog } => {
                return Ok(decide(actor.as_mut(), &**catalog, &**guard, player));
            }
            Seat::Worker { jobs } => jobs,
        };

        let (reply, answer) = mpsc::channel();
        let table = Table::clone(&**guard);
        let job: Job = Box::new(move |actor, catalog| {
            // Nobody is listening if the seat already gave up on this turn.
            let _ = reply.send(decide(actor, catalog, &table, player));
        });
        jobs.send(job).map_err(|_| GameError::ActorFailed(player))?;

        let received = match guard.remaining() {
            Some(wait) => answer.recv_timeout(wait),
            None => answer.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        received.map_err(|err| match err {
            RecvTimeoutError::Timeout => GameError::TurnTimeout {
                player,
                limit: guard.limit().unwrap_or_default(),
            },
            RecvTimeoutError::Disconnected => GameError::ActorFailed(player),
        })
    }
}
