//! Two-actor turn token.
//!
//! The coordinator owns the shared value (in a match, the [`Table`]) and
//! lends it to exactly one actor at a time. Holding a [`TurnGuard`] *is*
//! holding the token: the guard derefs to the shared value, and giving the
//! guard back is the only way to pass the token on.
//!
//! ```text
//!            start(p)                 release
//!   Idle ──────────────> Active(p) ──────────> Active(p.other())
//!    ^                       │
//!    └───── finish / shutdown┘
//! ```
//!
//! Every hand-off goes through one mutex, so all writes made under a guard
//! are visible to the next holder before it reads anything.
//!
//! [`Table`]: crate::core::Table

use std::ops::{Deref, DerefMut};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::notice::{TurnNotice, TurnOutcome};
use crate::core::{GameError, PlayerId, PlayerMap};

/// Who holds the token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnState {
    /// Nobody: before `start`, or after the match ended.
    Idle,
    Active(PlayerId),
}

impl TurnState {
    /// The token holder, if any.
    #[must_use]
    pub fn holder(self) -> Option<PlayerId> {
        match self {
            TurnState::Idle => None,
            TurnState::Active(player) => Some(player),
        }
    }
}

struct Inner<T> {
    state: TurnState,
    /// `None` while lent out to a guard.
    shared: Option<T>,
    /// Set once the match is over; acquirers stop waiting.
    closed: bool,
    turns: u64,
    skipped: PlayerMap<u32>,
    subscribers: Vec<Sender<TurnNotice>>,
}

/// Serializes access to a shared value between two actors.
pub struct TurnCoordinator<T> {
    inner: Mutex<Inner<T>>,
    handoff: Condvar,
    turn_limit: Option<Duration>,
}

impl<T: Clone> TurnCoordinator<T> {
    /// Create a coordinator whose token starts with `first`.
    pub fn new(shared: T, first: PlayerId) -> Self {
        let coordinator = Self::idle(shared);
        coordinator.inner.lock().state = TurnState::Active(first);
        coordinator
    }

    /// Create a coordinator in the pre-start `Idle` state. Acquirers wait
    /// until [`start`](Self::start).
    pub fn idle(shared: T) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: TurnState::Idle,
                shared: Some(shared),
                closed: false,
                turns: 0,
                skipped: PlayerMap::with_value(0),
                subscribers: Vec::new(),
            }),
            handoff: Condvar::new(),
            turn_limit: None,
        }
    }

    /// Give every lent turn a deadline.
    #[must_use]
    pub fn with_turn_limit(mut self, limit: Option<Duration>) -> Self {
        self.turn_limit = limit;
        self
    }

    /// Hand the token to `first`. Returns `false` unless the coordinator is
    /// idle and not yet closed.
    pub fn start(&self, first: PlayerId) -> bool {
        let mut inner = self.inner.lock();
        if inner.closed || inner.state != TurnState::Idle {
            return false;
        }
        inner.state = TurnState::Active(first);
        drop(inner);

        log::debug!("turn token starts with {}", first);
        self.handoff.notify_all();
        true
    }

    #[must_use]
    pub fn state(&self) -> TurnState {
        self.inner.lock().state
    }

    /// Whether the match is over.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Number of hand-offs so far.
    #[must_use]
    pub fn turns_played(&self) -> u64 {
        self.inner.lock().turns
    }

    /// Turns `player` has forfeited.
    #[must_use]
    pub fn skipped(&self, player: PlayerId) -> u32 {
        self.inner.lock().skipped[player]
    }

    /// Receive a [`TurnNotice`] for every subsequent hand-off.
    pub fn subscribe(&self) -> Receiver<TurnNotice> {
        let (tx, rx) = mpsc::channel();
        self.inner.lock().subscribers.push(tx);
        rx
    }

    /// Block until `player` holds the token.
    ///
    /// Returns `None` once the match is closed. An actor must not call this
    /// while it still holds a guard.
    pub fn acquire(&self, player: PlayerId) -> Option<TurnGuard<'_, T>> {
        let mut inner = self.inner.lock();
        loop {
            if inner.closed {
                return None;
            }
            if let Some(shared) = Self::take_if_holder(&mut inner, player) {
                return Some(self.lend(player, shared));
            }
            self.handoff.wait(&mut inner);
        }
    }

    /// Like [`acquire`](Self::acquire), but give up with `TurnTimeout` after
    /// `wait`.
    pub fn acquire_timeout(
        &self,
        player: PlayerId,
        wait: Duration,
    ) -> Result<Option<TurnGuard<'_, T>>, GameError> {
        let deadline = Instant::now() + wait;
        let mut inner = self.inner.lock();
        loop {
            if inner.closed {
                return Ok(None);
            }
            if let Some(shared) = Self::take_if_holder(&mut inner, player) {
                return Ok(Some(self.lend(player, shared)));
            }
            if Instant::now() >= deadline {
                return Err(GameError::TurnTimeout {
                    player,
                    limit: wait,
                });
            }
            self.handoff.wait_until(&mut inner, deadline);
        }
    }

    /// End the match from outside any turn. Waiting actors return `None`.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.state = TurnState::Idle;
        drop(inner);

        log::debug!("turn coordinator shut down");
        self.handoff.notify_all();
    }

    /// Read the shared value while nobody holds it.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.inner.lock().shared.as_ref().map(f)
    }

    /// Take the shared value back. `None` if a guard still has it.
    pub fn into_inner(self) -> Option<T> {
        self.inner.into_inner().shared
    }

    fn take_if_holder(inner: &mut Inner<T>, player: PlayerId) -> Option<T> {
        if inner.state == TurnState::Active(player) {
            inner.shared.take()
        } else {
            None
        }
    }

    fn lend(&self, player: PlayerId, shared: T) -> TurnGuard<'_, T> {
        log::debug!("{} acquired the turn token", player);
        TurnGuard {
            coordinator: self,
            player,
            lease: Some(Lease {
                snapshot: shared.clone(),
                live: shared,
            }),
            limit: self.turn_limit,
            deadline: self.turn_limit.map(|limit| Instant::now() + limit),
        }
    }

    fn hand_back(
        &self,
        player: PlayerId,
        shared: T,
        outcome: TurnOutcome,
        summary: String,
    ) -> TurnNotice {
        let mut inner = self.inner.lock();
        inner.shared = Some(shared);
        inner.turns += 1;

        match outcome {
            TurnOutcome::Finished => {
                inner.closed = true;
                inner.state = TurnState::Idle;
            }
            TurnOutcome::Skipped | TurnOutcome::Completed => {
                if outcome == TurnOutcome::Skipped {
                    inner.skipped[player] += 1;
                }
                if !inner.closed {
                    inner.state = TurnState::Active(player.other());
                }
            }
        }

        let notice = TurnNotice {
            turn: inner.turns,
            player,
            outcome,
            summary,
        };
        inner
            .subscribers
            .retain(|tx| tx.send(notice.clone()).is_ok());
        let state = inner.state;
        drop(inner);

        log::debug!("{} handed off ({:?}), token now {:?}", player, outcome, state);
        self.handoff.notify_all();
        notice
    }

    fn close_with(&self, shared: T) {
        let mut inner = self.inner.lock();
        inner.shared = Some(shared);
        inner.closed = true;
        inner.state = TurnState::Idle;
        drop(inner);
        self.handoff.notify_all();
    }
}

struct Lease<T> {
    live: T,
    /// The shared value as it was when the turn started.
    snapshot: T,
}

/// Exclusive access to the shared value for one turn.
///
/// Give it back with [`release`](Self::release), [`forfeit`](Self::forfeit)
/// or [`finish`](Self::finish). Dropping it without doing so forfeits the
/// turn; dropping it while the thread panics rolls the turn back and closes
/// the coordinator.
pub struct TurnGuard<'a, T: Clone> {
    coordinator: &'a TurnCoordinator<T>,
    player: PlayerId,
    lease: Option<Lease<T>>,
    limit: Option<Duration>,
    deadline: Option<Instant>,
}

impl<T: Clone> TurnGuard<'_, T> {
    /// The token holder.
    #[must_use]
    pub fn holder(&self) -> PlayerId {
        self.player
    }

    /// Time left before the turn limit, if one is set.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// The turn limit this guard was lent under.
    #[must_use]
    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }

    /// Fail with `TurnTimeout` once the turn limit has passed.
    pub fn check_deadline(&self) -> Result<(), GameError> {
        match (self.deadline, self.limit) {
            (Some(deadline), Some(limit)) if Instant::now() >= deadline => {
                Err(GameError::TurnTimeout {
                    player: self.player,
                    limit,
                })
            }
            _ => Ok(()),
        }
    }

    /// Commit the turn and pass the token to the other player.
    pub fn release(mut self, summary: impl Into<String>) -> TurnNotice {
        self.settle(TurnOutcome::Completed, summary.into())
    }

    /// Discard the turn's changes, record a skipped turn and pass the token.
    pub fn forfeit(self, summary: impl Into<String>) -> TurnNotice {
        self.forfeit_with(summary, |_| {})
    }

    /// Like [`forfeit`](Self::forfeit), but apply `amend` to the restored
    /// value before handing it back (e.g. to log the skipped turn).
    pub fn forfeit_with(
        mut self,
        summary: impl Into<String>,
        amend: impl FnOnce(&mut T),
    ) -> TurnNotice {
        self.settle_with(TurnOutcome::Skipped, summary.into(), amend)
    }

    /// Commit the turn and end the match: nobody holds the token afterwards.
    pub fn finish(mut self, summary: impl Into<String>) -> TurnNotice {
        self.settle(TurnOutcome::Finished, summary.into())
    }

    /// Discard the turn's changes and close the coordinator, for a holder
    /// that can no longer play. Nobody holds the token afterwards.
    pub fn abandon(mut self) {
        if let Some(lease) = self.lease.take() {
            self.coordinator.close_with(lease.snapshot);
        }
    }

    fn settle(&mut self, outcome: TurnOutcome, summary: String) -> TurnNotice {
        self.settle_with(outcome, summary, |_| {})
    }

    fn settle_with(
        &mut self,
        outcome: TurnOutcome,
        summary: String,
        amend: impl FnOnce(&mut T),
    ) -> TurnNotice {
        let Some(lease) = self.lease.take() else {
            unreachable!("turn guard settled twice");
        };
        let mut shared = match outcome {
            TurnOutcome::Skipped => lease.snapshot,
            TurnOutcome::Completed | TurnOutcome::Finished => lease.live,
        };
        amend(&mut shared);
        self.coordinator
            .hand_back(self.player, shared, outcome, summary)
    }

    fn lease(&self) -> &Lease<T> {
        match &self.lease {
            Some(lease) => lease,
            None => unreachable!("turn guard used after hand-off"),
        }
    }
}

impl<T: Clone> Deref for TurnGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.lease().live
    }
}

impl<T: Clone> DerefMut for TurnGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.lease {
            Some(lease) => &mut lease.live,
            None => unreachable!("turn guard used after hand-off"),
        }
    }
}

impl<T: Clone> Drop for TurnGuard<'_, T> {
    fn drop(&mut self) {
        if self.lease.is_none() {
            return;
        }
        if std::thread::panicking() {
            log::error!("{} panicked mid-turn; closing the match", self.player);
            if let Some(lease) = self.lease.take() {
                self.coordinator.close_with(lease.snapshot);
            }
        } else {
            log::warn!("{} dropped the turn token without releasing it", self.player);
            self.settle(TurnOutcome::Skipped, "turn abandoned".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    const FIRST: PlayerId = PlayerId::FIRST;
    const SECOND: PlayerId = PlayerId::SECOND;

    #[test]
    fn test_starts_with_first_player() {
        let coordinator = TurnCoordinator::new(0u32, FIRST);
        assert_eq!(coordinator.state(), TurnState::Active(FIRST));
        assert_eq!(coordinator.state().holder(), Some(FIRST));

        let mut guard = coordinator.acquire(FIRST).unwrap();
        *guard += 5;
        let notice = guard.release("added five");

        assert_eq!(notice.turn, 1);
        assert_eq!(notice.outcome, TurnOutcome::Completed);
        assert_eq!(coordinator.state(), TurnState::Active(SECOND));
        assert_eq!(coordinator.read(|v| *v), Some(5));
    }

    #[test]
    fn test_non_holder_times_out() {
        let coordinator = TurnCoordinator::new((), FIRST);
        let result = coordinator.acquire_timeout(SECOND, Duration::from_millis(20));

        assert!(matches!(
            result,
            Err(GameError::TurnTimeout { player, .. }) if player == SECOND
        ));
        assert_eq!(coordinator.state(), TurnState::Active(FIRST));
    }

    #[test]
    fn test_acquire_timeout_succeeds_before_deadline() {
        let coordinator = Arc::new(TurnCoordinator::new(0u32, FIRST));

        let waiter = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || {
                let mut guard = coordinator
                    .acquire_timeout(SECOND, Duration::from_secs(5))
                    .unwrap()
                    .unwrap();
                assert_eq!(guard.holder(), SECOND);
                *guard += 1;
                guard.release("second")
            })
        };

        thread::sleep(Duration::from_millis(20));
        let mut guard = coordinator.acquire(FIRST).unwrap();
        *guard = 10;
        guard.release("first");

        let notice = waiter.join().unwrap();
        assert_eq!(notice.turn, 2);
        assert_eq!(coordinator.read(|v| *v), Some(11));
        assert_eq!(coordinator.state(), TurnState::Active(FIRST));
    }

    #[test]
    fn test_abandon_rolls_back_and_closes() {
        let coordinator = Arc::new(TurnCoordinator::new(vec![1], FIRST));

        let waiter = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || coordinator.acquire(SECOND).is_none())
        };

        let mut guard = coordinator.acquire(FIRST).unwrap();
        guard.push(2);
        guard.abandon();

        assert!(waiter.join().unwrap());
        assert!(coordinator.is_closed());
        assert_eq!(coordinator.state(), TurnState::Idle);
        assert_eq!(coordinator.read(|v| v.clone()), Some(vec![1]));
        assert_eq!(coordinator.turns_played(), 0);
    }

    #[test]
    fn test_idle_until_started() {
        let coordinator = Arc::new(TurnCoordinator::idle(Vec::<PlayerId>::new()));
        assert_eq!(coordinator.state(), TurnState::Idle);

        let waiter = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || {
                let mut guard = coordinator.acquire(SECOND).unwrap();
                guard.push(SECOND);
                guard.release("second went first");
            })
        };

        thread::sleep(Duration::from_millis(20));
        assert!(coordinator.read(|v| v.is_empty()).unwrap());
        assert!(coordinator.start(SECOND));
        waiter.join().unwrap();

        assert_eq!(coordinator.read(|v| v.clone()), Some(vec![SECOND]));
        assert_eq!(coordinator.state(), TurnState::Active(FIRST));
        assert!(!coordinator.start(FIRST));
    }

    #[test]
    fn test_forfeit_rolls_back() {
        let coordinator = TurnCoordinator::new(vec![1, 2, 3], FIRST);

        let mut guard = coordinator.acquire(FIRST).unwrap();
        guard.clear();
        let notice = guard.forfeit("gave up");

        assert_eq!(notice.outcome, TurnOutcome::Skipped);
        assert_eq!(coordinator.read(|v| v.clone()), Some(vec![1, 2, 3]));
        assert_eq!(coordinator.skipped(FIRST), 1);
        assert_eq!(coordinator.state(), TurnState::Active(SECOND));
    }

    #[test]
    fn test_forfeit_with_amends_restored_value() {
        let coordinator = TurnCoordinator::new(vec![1], FIRST);

        let mut guard = coordinator.acquire(FIRST).unwrap();
        guard.push(2);
        guard.forfeit_with("timed out", |v| v.push(0));

        assert_eq!(coordinator.read(|v| v.clone()), Some(vec![1, 0]));
    }

    #[test]
    fn test_dropped_guard_forfeits() {
        let coordinator = TurnCoordinator::new(10, FIRST);
        {
            let mut guard = coordinator.acquire(FIRST).unwrap();
            *guard = 0;
        }

        assert_eq!(coordinator.read(|v| *v), Some(10));
        assert_eq!(coordinator.skipped(FIRST), 1);
        assert_eq!(coordinator.state(), TurnState::Active(SECOND));
    }

    #[test]
    fn test_finish_wakes_waiting_player() {
        let coordinator = Arc::new(TurnCoordinator::new(0, FIRST));

        let waiter = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || coordinator.acquire(SECOND).is_none())
        };

        thread::sleep(Duration::from_millis(20));
        let guard = coordinator.acquire(FIRST).unwrap();
        let notice = guard.finish("dispenser empty");

        assert!(waiter.join().unwrap());
        assert_eq!(notice.outcome, TurnOutcome::Finished);
        assert_eq!(coordinator.state(), TurnState::Idle);
        assert!(coordinator.is_closed());
        assert!(coordinator.acquire(FIRST).is_none());
    }

    #[test]
    fn test_shutdown_during_turn_keeps_token_idle() {
        let coordinator = TurnCoordinator::new(0, FIRST);
        let guard = coordinator.acquire(FIRST).unwrap();
        coordinator.shutdown();
        guard.release("late");

        assert_eq!(coordinator.state(), TurnState::Idle);
        assert_eq!(coordinator.into_inner(), Some(0));
    }

    #[test]
    fn test_deadline() {
        let coordinator =
            TurnCoordinator::new((), FIRST).with_turn_limit(Some(Duration::from_millis(5)));
        let guard = coordinator.acquire(FIRST).unwrap();
        assert!(guard.remaining().is_some());
        assert_eq!(guard.limit(), Some(Duration::from_millis(5)));

        thread::sleep(Duration::from_millis(15));
        assert_eq!(
            guard.check_deadline(),
            Err(GameError::TurnTimeout {
                player: FIRST,
                limit: Duration::from_millis(5)
            })
        );
        guard.forfeit("too slow");
    }

    #[test]
    fn test_no_deadline_by_default() {
        let coordinator = TurnCoordinator::new((), FIRST);
        let guard = coordinator.acquire(FIRST).unwrap();

        assert_eq!(guard.remaining(), None);
        assert!(guard.check_deadline().is_ok());
        guard.release("done");
    }

    #[test]
    fn test_notices_are_broadcast() {
        let coordinator = TurnCoordinator::new((), FIRST);
        let rx = coordinator.subscribe();

        coordinator.acquire(FIRST).unwrap().release("one");
        coordinator.acquire(SECOND).unwrap().forfeit("two");

        let notices: Vec<_> = rx.try_iter().collect();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].player, FIRST);
        assert_eq!(notices[0].summary, "one");
        assert_eq!(notices[1].player, SECOND);
        assert_eq!(notices[1].outcome, TurnOutcome::Skipped);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let coordinator = TurnCoordinator::new((), FIRST);
        drop(coordinator.subscribe());

        coordinator.acquire(FIRST).unwrap().release("nobody listening");
        assert!(coordinator.inner.lock().subscribers.is_empty());
    }

    #[test]
    fn test_two_threads_strictly_alternate() {
        const TURNS_EACH: usize = 50;
        let coordinator = Arc::new(TurnCoordinator::new(Vec::<PlayerId>::new(), FIRST));
        let busy = Arc::new(AtomicBool::new(false));

        let handles: Vec<_> = PlayerId::all()
            .map(|player| {
                let coordinator = Arc::clone(&coordinator);
                let busy = Arc::clone(&busy);
                thread::spawn(move || {
                    for _ in 0..TURNS_EACH {
                        let mut guard = coordinator.acquire(player).unwrap();
                        assert!(!busy.swap(true, Ordering::SeqCst), "two holders at once");
                        guard.push(player);
                        thread::yield_now();
                        busy.store(false, Ordering::SeqCst);
                        guard.release(format!("{player} moved"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let log = coordinator.read(|v| v.clone()).unwrap();
        assert_eq!(log.len(), TURNS_EACH * 2);
        for (i, player) in log.iter().enumerate() {
            let expected = if i % 2 == 0 { FIRST } else { SECOND };
            assert_eq!(*player, expected);
        }
        assert_eq!(coordinator.turns_played(), (TURNS_EACH * 2) as u64);
    }
}
