//! External collaborator seams
//!
//! The simulation core never renders or loads scenes; it issues commands to a
//! [`Presenter`] and asks a [`SceneDirector`] about level progression. Both
//! are fire-and-forget from the core's perspective.

use tracing::info;

use crate::sim::CarId;

/// Visual presentation commands emitted by the core
pub trait Presenter: Send {
    /// Show a car's body after it has been (re)positioned
    fn show_car_body(&mut self, car: CarId);

    /// Hide a car's body before teleporting it
    fn hide_car_body(&mut self, car: CarId);

    /// Recolor a car's body when it is demoted to bot
    fn recolor_car_as_bot(&mut self, car: CarId);

    /// Show the end-of-level summary
    fn show_level_summary(&mut self, played_turns: u32, has_next_level: bool);
}

/// Scene progression queries, consulted only at level end
pub trait SceneDirector: Send {
    fn has_next_level(&self) -> bool;

    fn load_next_level(&mut self);
}

/// Presenter that drops every command; used in tests and headless runs
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn show_car_body(&mut self, _car: CarId) {}

    fn hide_car_body(&mut self, _car: CarId) {}

    fn recolor_car_as_bot(&mut self, _car: CarId) {}

    fn show_level_summary(&mut self, _played_turns: u32, _has_next_level: bool) {}
}

/// Presenter that logs every command through `tracing`
#[derive(Debug, Default)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn show_car_body(&mut self, car: CarId) {
        info!(car_id = %car, "show car body");
    }

    fn hide_car_body(&mut self, car: CarId) {
        info!(car_id = %car, "hide car body");
    }

    fn recolor_car_as_bot(&mut self, car: CarId) {
        info!(car_id = %car, "recolor car as bot");
    }

    fn show_level_summary(&mut self, played_turns: u32, has_next_level: bool) {
        info!(played_turns, has_next_level, "level summary");
    }
}

/// Director for a standalone level with nothing after it
#[derive(Debug, Default)]
pub struct SingleScene;

impl SceneDirector for SingleScene {
    fn has_next_level(&self) -> bool {
        false
    }

    fn load_next_level(&mut self) {}
}
