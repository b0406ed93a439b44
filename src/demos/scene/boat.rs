use crate::engine::error::{ DemoError, Result };
use crate::engine::utils::math::move_towards;
use glam::{ Mat4, Vec3 };

pub const ARRIVAL_EPSILON: f32 = 0.01;
/// Seconds of accumulated time before the boat takes one step.
pub const STEP_INTERVAL: f32 = 0.01;
pub const STEP_DISTANCE: f32 = 1.0;
/// The boat model is authored at a much larger scale than the scene.
pub const BOAT_SCALE: f32 = 0.0002;

pub fn default_waypoints() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -814.0),
        Vec3::new(300.0, 0.0, -814.0),
        Vec3::new(300.0, 0.0, 0.0)
    ]
}

/// Moves the boat around a closed loop of waypoints at a fixed pace.
#[derive(Debug, Clone)]
pub struct BoatPatrol {
    waypoints: Vec<Vec3>,
    target: usize,
    position: Vec3,
    rotation: f32,
    accumulator: f32,
}

impl BoatPatrol {
    pub fn new(waypoints: Vec<Vec3>) -> Result<Self> {
        if waypoints.is_empty() {
            return Err(DemoError::Patrol("at least one waypoint is required".to_string()));
        }
        Ok(Self {
            waypoints,
            target: 0,
            position: Vec3::ZERO,
            rotation: (-180.0f32).to_radians(),
            accumulator: 0.0,
        })
    }

    pub fn tick(&mut self, delta_time: f32) {
        if self.position.distance(self.waypoints[self.target]) < ARRIVAL_EPSILON {
            self.target = (self.target + 1) % self.waypoints.len();
            self.rotation += (90.0f32).to_radians();
        }

        self.accumulator += delta_time;
        if self.accumulator > STEP_INTERVAL {
            self.position = move_towards(self.position, self.waypoints[self.target], STEP_DISTANCE);
            self.accumulator = 0.0;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn target_index(&self) -> usize {
        self.target
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(BOAT_SCALE)) *
            Mat4::from_translation(self.position) *
            Mat4::from_rotation_y(-self.rotation)
    }

    /// Position in scene units, after the model scale.
    pub fn world_position(&self) -> Vec3 {
        self.position * BOAT_SCALE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_n(patrol: &mut BoatPatrol, n: usize) {
        for _ in 0..n {
            patrol.tick(0.02);
        }
    }

    #[test]
    fn empty_path_is_rejected() {
        assert!(matches!(BoatPatrol::new(Vec::new()), Err(DemoError::Patrol(_))));
    }

    #[test]
    fn starting_on_first_waypoint_turns_toward_second() {
        let mut patrol = BoatPatrol::new(default_waypoints()).unwrap();
        let start_rotation = patrol.rotation();
        patrol.tick(0.02);
        assert_eq!(patrol.target_index(), 1);
        assert!((patrol.rotation() - start_rotation - (90.0f32).to_radians()).abs() < 1e-6);
        assert!((patrol.position() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn steps_wait_for_the_interval() {
        let mut patrol = BoatPatrol::new(vec![Vec3::new(10.0, 0.0, 0.0)]).unwrap();
        patrol.tick(0.004);
        patrol.tick(0.004);
        assert_eq!(patrol.position(), Vec3::ZERO);
        patrol.tick(0.004);
        assert!((patrol.position().x - 1.0).abs() < 1e-6);
        // the accumulator restarted from zero
        patrol.tick(0.004);
        assert!((patrol.position().x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn frozen_time_never_moves() {
        let mut patrol = BoatPatrol::new(vec![Vec3::new(5.0, 0.0, 0.0)]).unwrap();
        for _ in 0..100 {
            patrol.tick(0.0);
        }
        assert_eq!(patrol.position(), Vec3::ZERO);
    }

    #[test]
    fn final_step_lands_on_waypoint() {
        let mut patrol = BoatPatrol::new(vec![Vec3::new(2.5, 0.0, 0.0), Vec3::ZERO]).unwrap();
        tick_n(&mut patrol, 3);
        assert_eq!(patrol.position(), Vec3::new(2.5, 0.0, 0.0));
        patrol.tick(0.02);
        assert_eq!(patrol.target_index(), 1);
    }

    #[test]
    fn full_loop_returns_to_start() {
        let mut patrol = BoatPatrol::new(default_waypoints()).unwrap();
        // the arrival check and the next step share a tick
        tick_n(&mut patrol, 814 + 300 + 814 + 300);
        assert!(patrol.position().length() < 1e-3);
        assert_eq!(patrol.target_index(), 0);
    }

    #[test]
    fn single_waypoint_rotates_on_every_arrival_check() {
        let mut patrol = BoatPatrol::new(vec![Vec3::ZERO]).unwrap();
        let start = patrol.rotation();
        tick_n(&mut patrol, 4);
        assert!((patrol.rotation() - start - (360.0f32).to_radians()).abs() < 1e-5);
        assert_eq!(patrol.position(), Vec3::ZERO);
    }

    #[test]
    fn world_position_applies_model_scale() {
        let mut patrol = BoatPatrol::new(vec![Vec3::new(0.0, 0.0, -814.0)]).unwrap();
        patrol.tick(0.02);
        assert!((patrol.world_position() - Vec3::new(0.0, 0.0, -0.0002)).length() < 1e-8);
        let origin = patrol.model_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - patrol.world_position()).length() < 1e-8);
    }
}
