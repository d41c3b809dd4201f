//! Session state machine.
//!
//! Rest → Reading → Solving → Rest, with `stop` from anywhere and reflexive
//! commands at Rest. The machine only decides; guards and effects are
//! evaluated by a [`SessionHooks`] implementation, normally the
//! orchestrator.
//!
//! | trigger   | source  | dest    | guard            | effect        |
//! |-----------|---------|---------|------------------|---------------|
//! | `Read`    | Rest    | Reading | none             | `StartScan`   |
//! | `Solve`   | Reading | Solving | `ScanFinished`   | `StartSolve`  |
//! | `Success` | Solving | Rest    | `SolveFinished`  | `FinishSolve` |
//! | `Stop`    | any     | Rest    | none             | `StopSession` |
//! | `Command` | Rest    | Rest    | none             | `RunCommand`  |

use tracing::{info, warn};

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Idle, arms available for reflexive commands.
    #[default]
    Rest,
    /// Scan worker running or finished, solution pending.
    Reading,
    /// Solve worker executing the solution.
    Solving,
}

/// Event that can trigger a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Read,
    Solve,
    Success,
    Stop,
    Command,
}

/// Condition checked before a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    ScanFinished,
    SolveFinished,
}

/// Action run when a transition is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    StartScan,
    StartSolve,
    FinishSolve,
    StopSession,
    RunCommand,
}

/// States a transition may start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    State(SessionState),
    Any,
}

impl Source {
    #[inline]
    fn admits(&self, state: SessionState) -> bool {
        match self {
            Source::Any => true,
            Source::State(s) => *s == state,
        }
    }
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub trigger: Trigger,
    pub source: Source,
    pub dest: SessionState,
    pub guard: Option<Guard>,
    pub effect: Effect,
}

/// The complete transition table.
pub const TRANSITIONS: [Transition; 5] = [
    Transition {
        trigger: Trigger::Read,
        source: Source::State(SessionState::Rest),
        dest: SessionState::Reading,
        guard: None,
        effect: Effect::StartScan,
    },
    Transition {
        trigger: Trigger::Solve,
        source: Source::State(SessionState::Reading),
        dest: SessionState::Solving,
        guard: Some(Guard::ScanFinished),
        effect: Effect::StartSolve,
    },
    Transition {
        trigger: Trigger::Success,
        source: Source::State(SessionState::Solving),
        dest: SessionState::Rest,
        guard: Some(Guard::SolveFinished),
        effect: Effect::FinishSolve,
    },
    Transition {
        trigger: Trigger::Stop,
        source: Source::Any,
        dest: SessionState::Rest,
        guard: None,
        effect: Effect::StopSession,
    },
    Transition {
        trigger: Trigger::Command,
        source: Source::State(SessionState::Rest),
        dest: SessionState::Rest,
        guard: None,
        effect: Effect::RunCommand,
    },
];

/// Evaluates guards and runs effects on behalf of the machine.
pub trait SessionHooks {
    fn check(&self, guard: Guard) -> bool;
    fn apply(&mut self, effect: Effect);
}

/// Result of a transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition taken, with the new state.
    Ok(SessionState),
    /// Transition rejected, with the reason. State unchanged.
    Rejected(&'static str),
}

/// Holds the current session state.
#[derive(Debug, Clone, Default)]
pub struct SessionMachine {
    state: SessionState,
}

impl SessionMachine {
    /// New machine at Rest.
    pub const fn new() -> Self {
        Self {
            state: SessionState::Rest,
        }
    }

    #[inline]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Attempt the transition for `trigger`.
    ///
    /// On success the effect runs first, then the state changes. A rejected
    /// trigger is logged as a state machine violation and otherwise ignored.
    pub fn fire(&mut self, trigger: Trigger, hooks: &mut impl SessionHooks) -> TransitionResult {
        let Some(row) = TRANSITIONS.iter().find(|t| t.trigger == trigger) else {
            return self.reject(trigger, "no transition for trigger");
        };
        if !row.source.admits(self.state) {
            return self.reject(trigger, invalid_source_reason(self.state));
        }
        if let Some(guard) = row.guard {
            if !hooks.check(guard) {
                return self.reject(trigger, guard_reason(guard));
            }
        }

        hooks.apply(row.effect);
        let from = self.state;
        self.state = row.dest;
        info!(?from, to = ?self.state, ?trigger, "Session transition");
        TransitionResult::Ok(self.state)
    }

    fn reject(&self, trigger: Trigger, reason: &'static str) -> TransitionResult {
        warn!(state = ?self.state, ?trigger, reason, "State machine violation");
        TransitionResult::Rejected(reason)
    }
}

fn invalid_source_reason(state: SessionState) -> &'static str {
    match state {
        SessionState::Rest => "Rest: only Read, Stop or Command allowed",
        SessionState::Reading => "Reading: only Solve or Stop allowed",
        SessionState::Solving => "Solving: only Success or Stop allowed",
    }
}

fn guard_reason(guard: Guard) -> &'static str {
    match guard {
        Guard::ScanFinished => "scan worker still running",
        Guard::SolveFinished => "solve worker still running",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
