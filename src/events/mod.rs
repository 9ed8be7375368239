//! Level signal definitions and the publish/subscribe bus

use serde::Serialize;

/// Why a player car crashed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrashCause {
    /// Ran into another (bot) car
    AnotherCar,
    /// Ran into a course obstacle
    Obstacle,
}

/// Classified overlap event reported by an external collision detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContactKind {
    /// Another car's body
    Car,
    /// A solid obstacle
    Obstacle,
    /// An exit marker, tagged with the turn it belongs to
    Exit { turn_index: usize },
}

/// Signals exchanged between the turn coordinator and the cars
///
/// Dispatch is synchronous: external observers run in subscription order,
/// then the level's own routing reacts. A reaction may emit nested signals;
/// those dispatch to completion before the outer emission returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum LevelSignal {
    /// Turn unfrozen, cars begin moving
    TurnStarted,
    /// Turn refrozen
    TurnStopped,
    /// Player reached its exit; the turn is done
    TurnCompleted,
    /// First steering input of an armed turn
    FirstPlayerInput,
    /// Player car crashed
    CarCrashed { cause: CrashCause },
    /// Player car arrived at its own exit
    CarArrived,
    /// Reposition every active car at its spawn pose
    ResetActiveCars,
    /// Demote every active car to bot
    PromoteActiveCarsToBot,
    /// Level is over
    LevelFinished {
        played_turns: u32,
        has_next_level: bool,
    },
}

/// Observer callback registered on the bus
pub type SignalHandler = Box<dyn FnMut(&LevelSignal) + Send>;

/// Ordered registry of signal observers
///
/// Observers cannot veto or mutate signals; they are presentation-side
/// listeners (logging, UI). Game-state reactions live in the level itself.
#[derive(Default)]
pub struct SignalBus {
    handlers: Vec<SignalHandler>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer; observers fire in subscription order
    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: FnMut(&LevelSignal) + Send + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Invoke every observer synchronously
    pub fn publish(&mut self, signal: &LevelSignal) {
        for handler in &mut self.handlers {
            handler(signal);
        }
    }
}
