//! Turn coordination and level lifecycle

pub mod loader;

pub use loader::{CheckpointDef, LevelDef, LevelLoadError, ObstacleDef, SpawnDef};

use tracing::{info, warn};
use uuid::Uuid;

use crate::events::{ContactKind, LevelSignal, SignalBus};
use crate::hooks::{Presenter, SceneDirector};
use crate::sim::{Car, CarId, CarRole, CarTuning, ContactOutcome, Pose, Rotation};

/// Structural problems in a level definition
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("level has no checkpoints")]
    Empty,

    #[error("duplicate turn index {0}")]
    DuplicateTurnIndex(usize),

    #[error("turn indices must be contiguous from 0: expected {expected}, found {found}")]
    NonContiguousTurnIndex { expected: usize, found: usize },
}

/// Runtime view of one authored checkpoint
///
/// Missing references degrade to logged defaults, mirroring how the level was
/// authored as loose scene references.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    turn_index: usize,
    entrance: Option<[f32; 2]>,
    exit: Option<[f32; 2]>,
    spawn: Option<Pose>,
}

impl Checkpoint {
    fn from_def(def: &CheckpointDef) -> Self {
        Self {
            turn_index: def.turn_index,
            entrance: def.entrance,
            exit: def.exit,
            spawn: def.spawn.map(|s| Pose::new(s.position[0], s.position[1], s.heading)),
        }
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn entrance_position(&self) -> [f32; 2] {
        self.entrance.unwrap_or_else(|| {
            warn!(turn = self.turn_index, "entrance point missing, using origin");
            [0.0, 0.0]
        })
    }

    pub fn exit_position(&self) -> [f32; 2] {
        self.exit.unwrap_or_else(|| {
            warn!(turn = self.turn_index, "exit point missing, using origin");
            [0.0, 0.0]
        })
    }

    pub fn spawn_pose(&self) -> Pose {
        self.spawn.unwrap_or_else(|| {
            warn!(turn = self.turn_index, "car spawn missing, using identity pose");
            Pose::default()
        })
    }
}

/// Course marker spawned for a turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerKind {
    Entrance,
    Exit { turn_index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub x: f32,
    pub y: f32,
    /// Exit index labels are hidden, not removed, once their turn is over
    pub label_visible: bool,
}

/// The level: ordered checkpoints, active cars and the turn state machine
///
/// All cross-component communication is synchronous signal dispatch; the turn
/// transitions are guarded so out-of-sequence calls are silent no-ops.
pub struct Level {
    name: String,
    checkpoints: Vec<Checkpoint>,
    current_index: usize,

    turn_initiated: bool,
    turn_started: bool,
    played_turns: u32,
    complete: bool,

    /// Global pause: while set, `tick()` advances nothing
    frozen: bool,

    markers: Vec<Marker>,
    cars: Vec<Car>,
    tuning: CarTuning,

    bus: SignalBus,
    presenter: Box<dyn Presenter>,
    scenes: Box<dyn SceneDirector>,
}

impl Level {
    pub fn new(
        def: &LevelDef,
        tuning: CarTuning,
        bus: SignalBus,
        presenter: Box<dyn Presenter>,
        scenes: Box<dyn SceneDirector>,
    ) -> Result<Self, LevelError> {
        if def.checkpoints.is_empty() {
            return Err(LevelError::Empty);
        }

        // Sorted once at load time; the declared indices are the traversal
        // order and must be unique and contiguous from 0.
        let mut checkpoints: Vec<Checkpoint> =
            def.checkpoints.iter().map(Checkpoint::from_def).collect();
        checkpoints.sort_by_key(|c| c.turn_index);
        for (expected, checkpoint) in checkpoints.iter().enumerate() {
            let found = checkpoint.turn_index;
            if found == expected {
                continue;
            }
            if checkpoints.iter().filter(|c| c.turn_index == found).count() > 1 {
                return Err(LevelError::DuplicateTurnIndex(found));
            }
            return Err(LevelError::NonContiguousTurnIndex { expected, found });
        }

        Ok(Self {
            name: def.name.clone(),
            checkpoints,
            current_index: 0,
            turn_initiated: false,
            turn_started: false,
            played_turns: 0,
            complete: false,
            frozen: true,
            markers: Vec::new(),
            cars: Vec::new(),
            tuning,
            bus,
            presenter,
            scenes,
        })
    }

    /// Arm the first turn
    pub fn start_level(&mut self) {
        info!(level = %self.name, checkpoints = self.checkpoints.len(), "starting level");
        self.initiate_turn(false);
    }

    /// Advance every moving car one fixed step, unless the level is frozen
    pub fn tick(&mut self) {
        if self.frozen {
            return;
        }
        for car in &mut self.cars {
            car.step();
        }
    }

    /// Route a steering request to the player car
    ///
    /// A Left/Right press while the turn is armed (initiated but not started)
    /// is the first input that actually starts the turn; releasing to
    /// Straight never arms anything.
    pub fn player_input(&mut self, rotation: Rotation) {
        if let Some(car) = self.cars.iter_mut().find(|c| c.role() == CarRole::Player) {
            car.rotation_input(rotation);
        }

        if rotation != Rotation::Straight && self.turn_initiated && !self.turn_started {
            self.emit(LevelSignal::FirstPlayerInput);
        }
    }

    /// Consume an externally classified contact for one car
    pub fn report_contact(&mut self, car_id: CarId, contact: ContactKind) {
        let Some(car) = self.cars.iter_mut().find(|c| c.id() == car_id) else {
            warn!(car_id = %car_id, "contact reported for unknown car");
            return;
        };

        match car.apply_contact(contact) {
            Some(ContactOutcome::Crashed(cause)) => self.emit(LevelSignal::CarCrashed { cause }),
            Some(ContactOutcome::Arrived) => self.emit(LevelSignal::CarArrived),
            None => {}
        }
    }

    /// Prepare the current checkpoint's turn; no-op past the last checkpoint
    pub fn initiate_turn(&mut self, is_restart: bool) {
        if self.current_index >= self.checkpoints.len() {
            return;
        }

        self.frozen = true;

        if !is_restart {
            self.retire_past_markers();
            self.spawn_markers();
            self.spawn_player_car();
        }

        self.turn_initiated = true;
        // Restarts count as played turns too.
        self.played_turns += 1;

        info!(
            turn = self.current_index,
            restart = is_restart,
            played = self.played_turns,
            "turn initiated"
        );
    }

    /// Initiated -> Started: unfreeze and set the cars moving
    pub fn start_turn(&mut self) {
        if !self.turn_initiated || self.turn_started {
            return;
        }
        self.turn_started = true;
        self.frozen = false;
        self.emit(LevelSignal::TurnStarted);
    }

    /// Started -> Initiated: refreeze
    pub fn stop_turn(&mut self) {
        if !self.turn_started {
            return;
        }
        self.turn_started = false;
        self.frozen = true;
        self.emit(LevelSignal::TurnStopped);
    }

    /// Reposition everything and re-arm the same turn
    pub fn restart_turn(&mut self) {
        self.stop_turn();
        self.emit(LevelSignal::ResetActiveCars);
        self.initiate_turn(true);
    }

    /// Close out the current turn: end the level or line up the next one
    pub fn complete_turn(&mut self) {
        self.emit(LevelSignal::TurnCompleted);

        if self.is_level_completed() {
            self.end_level();
        } else {
            self.prepare_next_turn();
        }
    }

    /// Ask the scene director for the next level, if any
    pub fn advance_to_next_level(&mut self) {
        if !self.scenes.has_next_level() {
            return;
        }
        self.scenes.load_next_level();
    }

    fn prepare_next_turn(&mut self) {
        self.stop_turn();
        self.emit(LevelSignal::ResetActiveCars);
        self.emit(LevelSignal::PromoteActiveCarsToBot);
        self.current_index += 1;
        self.initiate_turn(false);
    }

    fn end_level(&mut self) {
        self.stop_turn();
        self.turn_initiated = false;
        self.turn_started = false;
        self.frozen = true;
        self.complete = true;

        let has_next = self.scenes.has_next_level();
        self.presenter
            .show_level_summary(self.played_turns, has_next);
        info!(
            level = %self.name,
            played_turns = self.played_turns,
            has_next,
            "level finished"
        );
        self.emit(LevelSignal::LevelFinished {
            played_turns: self.played_turns,
            has_next_level: has_next,
        });
    }

    fn is_level_completed(&self) -> bool {
        !self.checkpoints.is_empty() && self.current_index >= self.checkpoints.len() - 1
    }

    /// Destroy stale entrance markers; exit markers persist (labels hidden)
    /// so bot cars can still trigger arrival on them
    fn retire_past_markers(&mut self) {
        self.markers
            .retain(|m| matches!(m.kind, MarkerKind::Exit { .. }));
        for marker in &mut self.markers {
            marker.label_visible = false;
        }
    }

    fn spawn_markers(&mut self) {
        let checkpoint = &self.checkpoints[self.current_index];
        let [ex, ey] = checkpoint.entrance_position();
        let [xx, xy] = checkpoint.exit_position();
        let turn_index = checkpoint.turn_index;

        self.markers.push(Marker {
            kind: MarkerKind::Entrance,
            x: ex,
            y: ey,
            label_visible: true,
        });
        self.markers.push(Marker {
            kind: MarkerKind::Exit { turn_index },
            x: xx,
            y: xy,
            label_visible: true,
        });
    }

    fn spawn_player_car(&mut self) {
        let spawn = self.checkpoints[self.current_index].spawn_pose();
        let car = Car::new(Uuid::new_v4(), self.current_index, self.tuning, spawn);
        info!(car_id = %car.id(), turn = self.current_index, "player car spawned");
        self.cars.push(car);
    }

    /// Synchronous signal dispatch: observers first, then the level's own
    /// routing. Reactions may emit nested signals; they run to completion
    /// before this call returns.
    fn emit(&mut self, signal: LevelSignal) {
        self.bus.publish(&signal);

        match signal {
            LevelSignal::TurnStarted => {
                for car in &mut self.cars {
                    car.start_movement();
                }
            }
            LevelSignal::ResetActiveCars => {
                for car in &mut self.cars {
                    car.reset(self.presenter.as_mut());
                }
            }
            LevelSignal::PromoteActiveCarsToBot => {
                for car in &mut self.cars {
                    car.promote_to_bot(self.presenter.as_mut());
                }
            }
            LevelSignal::FirstPlayerInput => self.start_turn(),
            LevelSignal::CarCrashed { .. } => self.restart_turn(),
            LevelSignal::CarArrived => self.complete_turn(),
            LevelSignal::TurnStopped
            | LevelSignal::TurnCompleted
            | LevelSignal::LevelFinished { .. } => {}
        }
    }

    pub fn current_turn_index(&self) -> usize {
        self.current_index
    }

    pub fn is_turn_initiated(&self) -> bool {
        self.turn_initiated
    }

    pub fn is_turn_started(&self) -> bool {
        self.turn_started
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn played_turns(&self) -> u32 {
        self.played_turns
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }
}
