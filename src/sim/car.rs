//! Car motion controller
//!
//! One `Car` per spawned vehicle. A car starts life as the player car for its
//! turn, records its steering while driving, and is later demoted to a bot
//! that replays that recording deterministically.

use crate::events::{ContactKind, CrashCause};
use crate::hooks::Presenter;

use super::kinematics::Kinematics;
use super::recorder::RotationTimeline;
use super::{CarId, CarRole, CarTuning, Pose, Rotation};

/// What a contact means for the level, if anything
///
/// Bot contacts stop the car silently and produce no outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Crashed(CrashCause),
    Arrived,
}

/// Kinematic car driven by live input (player) or a recorded timeline (bot)
#[derive(Debug)]
pub struct Car {
    id: CarId,
    role: CarRole,
    turn_index: usize,
    tuning: CarTuning,
    spawn: Pose,

    pose: Pose,
    speed: f32,
    tick_count: u64,
    moving: bool,

    rotation: Rotation,
    pending_rotation: Option<Rotation>,

    timeline: RotationTimeline,
}

impl Car {
    pub fn new(id: CarId, turn_index: usize, tuning: CarTuning, spawn: Pose) -> Self {
        Self {
            id,
            role: CarRole::Player,
            turn_index,
            tuning,
            spawn,
            pose: spawn,
            speed: 0.0,
            tick_count: 0,
            moving: false,
            rotation: Rotation::Straight,
            pending_rotation: None,
            timeline: RotationTimeline::new(),
        }
    }

    /// Buffer a steering request for the next tick
    ///
    /// A request equal to the active rotation is dropped, so a held key never
    /// produces duplicate timeline entries. The buffered value is applied at
    /// the start of the next tick, one tick after the call.
    pub fn rotation_input(&mut self, rotation: Rotation) {
        if rotation == self.rotation {
            return;
        }
        self.pending_rotation = Some(rotation);
    }

    /// Idle -> Moving; idempotent
    pub fn start_movement(&mut self) {
        self.moving = true;
    }

    /// Moving -> Idle; flushes the in-progress segment on a player car
    ///
    /// Idempotent: a second stop is a no-op, so the recorder is never
    /// double-flushed.
    pub fn stop_movement(&mut self) {
        if !self.moving {
            return;
        }
        self.moving = false;

        if self.role == CarRole::Player {
            self.timeline.record(self.rotation);
        }
    }

    /// Advance one fixed simulation tick; no-op while idle
    pub fn step(&mut self) {
        if !self.moving {
            return;
        }

        self.tick_count += 1;

        match self.role {
            CarRole::Player => self.timeline.count_up(),
            CarRole::Bot => {
                self.timeline.count_down();
                if self.timeline.is_due() {
                    if let Some(rotation) = self.timeline.replay_step() {
                        self.rotation_input(rotation);
                    }
                }
            }
        }

        self.apply_pending_rotation();

        let dt = self.tuning.movement_precision;
        self.speed = Kinematics::accelerate(
            self.speed,
            self.tuning.max_speed,
            self.tuning.acceleration_factor,
            dt,
        );
        let (x, y) = Kinematics::advance(self.pose.x, self.pose.y, self.pose.heading, self.speed, dt);
        self.pose.x = x;
        self.pose.y = y;

        if self.rotation != Rotation::Straight {
            self.pose.heading = Kinematics::steer(
                self.pose.heading,
                self.rotation.sign(),
                self.tuning.rotation_factor,
                dt,
            );
        }
    }

    fn apply_pending_rotation(&mut self) {
        if let Some(rotation) = self.pending_rotation.take() {
            self.rotation = rotation;
            if self.role == CarRole::Player {
                self.timeline.record(self.rotation);
            }
        }
    }

    /// React to an externally classified overlap event
    pub fn apply_contact(&mut self, contact: ContactKind) -> Option<ContactOutcome> {
        match self.role {
            CarRole::Player => match contact {
                ContactKind::Car => {
                    self.stop_movement();
                    self.timeline.reset_records();
                    Some(ContactOutcome::Crashed(CrashCause::AnotherCar))
                }
                ContactKind::Obstacle => {
                    self.stop_movement();
                    self.timeline.reset_records();
                    Some(ContactOutcome::Crashed(CrashCause::Obstacle))
                }
                ContactKind::Exit { turn_index } if turn_index == self.turn_index => {
                    // Timeline kept intact for bot replay.
                    self.stop_movement();
                    Some(ContactOutcome::Arrived)
                }
                ContactKind::Exit { .. } => None,
            },
            CarRole::Bot => {
                self.stop_movement();
                None
            }
        }
    }

    /// Put the car back at its spawn pose, ready for the next run
    ///
    /// The recorded timeline survives; only its cursor is rewound. One replay
    /// step runs immediately so a bot picks up its first countdown before the
    /// next tick.
    pub fn reset(&mut self, presenter: &mut dyn Presenter) {
        self.moving = false;

        presenter.hide_car_body(self.id);

        self.pose = self.spawn;
        self.speed = 0.0;
        self.tick_count = 0;
        self.rotation = Rotation::Straight;
        self.pending_rotation = None;

        self.timeline.rewind();
        if let Some(rotation) = self.timeline.replay_step() {
            self.rotation_input(rotation);
        }

        presenter.show_car_body(self.id);
    }

    /// One-way transition player -> bot
    pub fn promote_to_bot(&mut self, presenter: &mut dyn Presenter) {
        if self.role == CarRole::Bot {
            return;
        }
        self.role = CarRole::Bot;
        presenter.recolor_car_as_bot(self.id);
    }

    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn role(&self) -> CarRole {
        self.role
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn timeline(&self) -> &RotationTimeline {
        &self.timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::NullPresenter;
    use uuid::Uuid;

    fn test_car() -> Car {
        Car::new(Uuid::new_v4(), 0, CarTuning::default(), Pose::default())
    }

    #[test]
    fn repeated_rotation_input_does_not_grow_the_timeline() {
        let mut car = test_car();
        car.start_movement();

        car.rotation_input(Rotation::Right);
        car.step();
        let len = car.timeline().len();

        // Same value again: debounced against the now-active rotation.
        car.rotation_input(Rotation::Right);
        car.step();
        car.rotation_input(Rotation::Right);
        car.step();
        assert_eq!(car.timeline().len(), len);
    }

    #[test]
    fn rotation_input_takes_effect_one_tick_later() {
        let mut car = test_car();
        car.start_movement();
        car.step();
        car.step();

        car.rotation_input(Rotation::Left);
        assert_eq!(car.rotation(), Rotation::Straight);

        car.step();
        assert_eq!(car.rotation(), Rotation::Left);
    }

    #[test]
    fn stop_movement_flushes_once() {
        let mut car = test_car();
        car.start_movement();
        car.rotation_input(Rotation::Right);
        car.step();
        car.step();

        car.stop_movement();
        let len = car.timeline().len();

        car.stop_movement();
        car.stop_movement();
        assert_eq!(car.timeline().len(), len);
    }

    #[test]
    fn idle_car_does_not_advance() {
        let mut car = test_car();
        car.step();
        car.step();
        assert_eq!(car.tick_count(), 0);
        assert_eq!(car.pose(), Pose::default());
    }

    #[test]
    fn replay_reproduces_the_recorded_rotation_schedule() {
        // Drive a player car with known inputs, then reset, promote and replay
        // on the same tick cadence; the active rotation must match tick for
        // tick.
        let mut car = test_car();
        let inputs: &[(u64, Rotation)] = &[
            (3, Rotation::Right),
            (7, Rotation::Straight),
            (10, Rotation::Left),
        ];
        let total_ticks = 14u64;

        let mut player_schedule = Vec::new();
        car.start_movement();
        for tick in 1..=total_ticks {
            if let Some(&(_, rotation)) = inputs.iter().find(|(at, _)| *at + 1 == tick) {
                // Input arrives between ticks; applied on the next one.
                car.rotation_input(rotation);
            }
            car.step();
            player_schedule.push(car.rotation());
        }
        car.stop_movement();

        let mut presenter = NullPresenter;
        car.reset(&mut presenter);
        car.promote_to_bot(&mut presenter);

        car.start_movement();
        let mut bot_schedule = Vec::new();
        for _ in 1..=total_ticks {
            car.step();
            bot_schedule.push(car.rotation());
        }

        assert_eq!(player_schedule, bot_schedule);
    }

    #[test]
    fn straight_run_replays_straight() {
        let mut car = test_car();
        car.start_movement();
        for _ in 0..20 {
            car.step();
        }
        car.stop_movement();

        let mut presenter = NullPresenter;
        car.reset(&mut presenter);
        car.promote_to_bot(&mut presenter);
        car.start_movement();
        for _ in 0..20 {
            car.step();
            assert_eq!(car.rotation(), Rotation::Straight);
        }
    }

    #[test]
    fn reset_restores_the_spawn_pose_and_state() {
        let spawn = Pose::new(2.0, 3.0, 1.0);
        let mut car = Car::new(Uuid::new_v4(), 0, CarTuning::default(), spawn);
        car.start_movement();
        car.rotation_input(Rotation::Right);
        for _ in 0..10 {
            car.step();
        }
        assert_ne!(car.pose(), spawn);

        car.reset(&mut NullPresenter);
        assert_eq!(car.pose(), spawn);
        assert_eq!(car.speed(), 0.0);
        assert_eq!(car.tick_count(), 0);
        assert_eq!(car.rotation(), Rotation::Straight);
        assert!(!car.is_moving());
    }

    #[test]
    fn player_crash_clears_the_timeline_and_reports_the_cause() {
        let mut car = test_car();
        car.start_movement();
        car.rotation_input(Rotation::Left);
        car.step();
        car.step();
        assert!(car.timeline().len() > 1);

        let outcome = car.apply_contact(ContactKind::Obstacle);
        assert_eq!(outcome, Some(ContactOutcome::Crashed(CrashCause::Obstacle)));
        assert!(!car.is_moving());
        assert_eq!(car.timeline().len(), 1);
    }

    #[test]
    fn player_arrival_keeps_the_timeline() {
        let mut car = test_car();
        car.start_movement();
        car.rotation_input(Rotation::Right);
        car.step();

        let outcome = car.apply_contact(ContactKind::Exit { turn_index: 0 });
        assert_eq!(outcome, Some(ContactOutcome::Arrived));
        assert!(!car.is_moving());
        assert!(car.timeline().len() > 1);
    }

    #[test]
    fn player_ignores_a_foreign_exit() {
        let mut car = test_car();
        car.start_movement();
        car.step();

        let outcome = car.apply_contact(ContactKind::Exit { turn_index: 3 });
        assert_eq!(outcome, None);
        assert!(car.is_moving());
    }

    #[test]
    fn bot_contact_stops_silently_without_touching_the_timeline() {
        let mut car = test_car();
        car.start_movement();
        car.rotation_input(Rotation::Right);
        car.step();
        car.stop_movement();
        let recorded = car.timeline().len();

        let mut presenter = NullPresenter;
        car.reset(&mut presenter);
        car.promote_to_bot(&mut presenter);
        car.start_movement();
        car.step();

        for contact in [
            ContactKind::Car,
            ContactKind::Obstacle,
            ContactKind::Exit { turn_index: 9 },
        ] {
            car.start_movement();
            assert_eq!(car.apply_contact(contact), None);
            assert!(!car.is_moving());
        }
        assert_eq!(car.timeline().len(), recorded);
    }

    #[test]
    fn promotion_is_one_way() {
        let mut car = test_car();
        let mut presenter = NullPresenter;
        assert_eq!(car.role(), CarRole::Player);
        car.promote_to_bot(&mut presenter);
        car.promote_to_bot(&mut presenter);
        assert_eq!(car.role(), CarRole::Bot);
    }

    #[test]
    fn moving_car_accelerates_and_translates_forward() {
        let mut car = test_car();
        car.start_movement();
        for _ in 0..50 {
            car.step();
        }
        assert!(car.speed() > 0.0);
        assert!(car.pose().x > 0.0, "heading 0 drives along +x");
        assert!(car.pose().y.abs() < 1e-4);
    }
}
