//! Movement integration and world-edge wrapping

/// Physics helpers shared by players and projectiles
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Teleport a coordinate that left `[-half, half]` to the opposite edge.
    ///
    /// The overshoot is discarded: 1004 in a half-world of 1000 becomes
    /// exactly -1000. A value sitting on the edge is left alone.
    pub fn wrap_axis(value: f32, half: f32) -> f32 {
        if value > half {
            -half
        } else if value < -half {
            half
        } else {
            value
        }
    }

    /// Apply one Euler step then wrap both axes independently
    pub fn step(x: f32, y: f32, dx: f32, dy: f32, half: f32) -> (f32, f32) {
        (
            Self::wrap_axis(x + dx, half),
            Self::wrap_axis(y + dy, half),
        )
    }

    /// Displacement of `speed` units along `angle` (radians)
    pub fn heading(angle: f32, speed: f32) -> (f32, f32) {
        (angle.cos() * speed, angle.sin() * speed)
    }

    /// Strict circle overlap test (touching circles do not collide)
    pub fn circles_overlap(
        x1: f32, y1: f32, radius1: f32,
        x2: f32, y2: f32, radius2: f32,
    ) -> bool {
        let dx = x2 - x1;
        let dy = y2 - y1;
        dx.hypot(dy) < radius1 + radius2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_teleports_without_remainder() {
        let (x, y) = PhysicsSystem::step(999.0, 0.0, 5.0, 0.0, 1000.0);
        assert_eq!(x, -1000.0);
        assert_eq!(y, 0.0);

        let (x, y) = PhysicsSystem::step(0.0, -998.0, 0.0, -3.0, 1000.0);
        assert_eq!(x, 0.0);
        assert_eq!(y, 1000.0);
    }

    #[test]
    fn edge_values_stay_put() {
        assert_eq!(PhysicsSystem::wrap_axis(1000.0, 1000.0), 1000.0);
        assert_eq!(PhysicsSystem::wrap_axis(-1000.0, 1000.0), -1000.0);
        assert_eq!(PhysicsSystem::wrap_axis(1000.01, 1000.0), -1000.0);
    }

    #[test]
    fn overlap_is_strict() {
        assert!(PhysicsSystem::circles_overlap(0.0, 0.0, 4.0, 19.9, 0.0, 16.0));
        assert!(!PhysicsSystem::circles_overlap(0.0, 0.0, 4.0, 20.0, 0.0, 16.0));
        assert!(!PhysicsSystem::circles_overlap(0.0, 0.0, 4.0, 15.0, 15.0, 16.0));
    }

    #[test]
    fn heading_follows_angle() {
        let (dx, dy) = PhysicsSystem::heading(std::f32::consts::FRAC_PI_2, 10.0);
        assert!(dx.abs() < 1e-5);
        assert!((dy - 10.0).abs() < 1e-5);
    }
}
