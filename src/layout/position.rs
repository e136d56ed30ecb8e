//! Position update and grid snapping.

use super::annealing::Thermal;
use super::config::LevelParams;
use super::vector::Vec2;

/// Snap `value` onto the nearest multiple of `grid` if it lies within
/// `tolerance` of it. Returns the new value and the distance moved.
///
/// Values already on the grid stay put and report no movement, so snapping
/// twice is the same as snapping once.
pub fn snap_axis(value: f32, grid: f32, tolerance: f32) -> (f32, f32) {
    if grid <= 0.0 || tolerance <= 0.0 {
        return (value, 0.0);
    }

    let target = (value / grid).round() * grid;
    let offset = (value - target).abs();
    if offset > 0.0 && offset <= tolerance {
        (target, offset)
    } else {
        (value, 0.0)
    }
}

/// Move a node by its velocity if it is fast enough, then let it settle onto
/// the level grid. Returns the new position and the total distance moved.
///
/// A coordinate is never snapped against the net force on that axis.
pub fn advance(
    pos: Vec2,
    velocity: Vec2,
    force: Vec2,
    level: &LevelParams,
    thermal: Thermal,
) -> (Vec2, f32) {
    let mut next = pos;
    let mut moved = 0.0;

    let speed = velocity.length();
    if speed > level.movement_threshold * thermal.threshold() {
        next += velocity;
        moved += speed;
    }

    let tolerance = level.snap_tolerance * thermal.snap();
    let (x, dx) = settle_axis(next.x, force.x, level.grid_size, tolerance);
    let (y, dy) = settle_axis(next.y, force.y, level.grid_size, tolerance);
    (Vec2::new(x, y), moved + dx + dy)
}

fn settle_axis(value: f32, force: f32, grid: f32, tolerance: f32) -> (f32, f32) {
    let (snapped, moved) = snap_axis(value, grid, tolerance);
    if (snapped - value) * force < 0.0 {
        (value, 0.0)
    } else {
        (snapped, moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::LayoutConfig;

    #[test]
    fn test_snap_within_tolerance() {
        assert_eq!(snap_axis(24.5, 25.0, 1.0), (25.0, 0.5));
        let (snapped, moved) = snap_axis(-50.75, 25.0, 1.0);
        assert_eq!(snapped, -50.0);
        assert!((moved - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_snap_outside_tolerance() {
        assert_eq!(snap_axis(23.0, 25.0, 1.0), (23.0, 0.0));
        assert_eq!(snap_axis(12.5, 25.0, 1.0), (12.5, 0.0));
    }

    #[test]
    fn test_snap_is_idempotent() {
        for value in [-101.3, -0.4, 0.0, 17.6, 24.2, 49.9, 1234.9] {
            let (once, _) = snap_axis(value, 25.0, 1.0);
            let (twice, moved) = snap_axis(once, 25.0, 1.0);
            assert_eq!(once, twice);
            assert_eq!(moved, 0.0);
        }
    }

    #[test]
    fn test_snap_disabled() {
        assert_eq!(snap_axis(24.5, 0.0, 1.0), (24.5, 0.0));
        assert_eq!(snap_axis(24.5, 25.0, 0.0), (24.5, 0.0));
    }

    #[test]
    fn test_advance_respects_movement_threshold() {
        let level = LayoutConfig::default().level(0);
        let hot = Thermal::new(1.0);
        let pos = Vec2::new(10.0, 10.0);

        let (still, moved) = advance(pos, Vec2::new(0.05, 0.0), Vec2::ZERO, &level, hot);
        assert_eq!(still, pos);
        assert_eq!(moved, 0.0);

        let (next, moved) = advance(pos, Vec2::new(3.0, 4.0), Vec2::ZERO, &level, hot);
        assert_eq!(next, Vec2::new(13.0, 14.0));
        assert_eq!(moved, 5.0);
    }

    #[test]
    fn test_advance_snaps_when_cold() {
        let level = LayoutConfig::default().level(0);
        let cold = Thermal::new(0.1);

        // Below the movement threshold, but within the snap window.
        let (next, moved) = advance(Vec2::new(49.5, 75.0), Vec2::ZERO, Vec2::ZERO, &level, cold);
        assert_eq!(next, Vec2::new(50.0, 75.0));
        assert_eq!(moved, 0.5);

        let (again, moved) = advance(next, Vec2::ZERO, Vec2::ZERO, &level, cold);
        assert_eq!(again, next);
        assert_eq!(moved, 0.0);
    }

    #[test]
    fn test_snap_after_move() {
        let level = LayoutConfig::default().level(0);
        let cold = Thermal::new(0.1);

        let (next, moved) = advance(Vec2::new(49.0, 0.0), Vec2::new(0.5, 0.0), Vec2::ZERO, &level, cold);
        assert_eq!(next, Vec2::new(50.0, 0.0));
        assert!((moved - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_snap_against_force() {
        let level = LayoutConfig::default().level(0);
        let cold = Thermal::new(0.1);
        let pos = Vec2::new(49.5, 25.4);

        // Pushed away from 50 on x, toward 25 on y.
        let force = Vec2::new(-0.05, -0.05);
        let (next, moved) = advance(pos, Vec2::ZERO, force, &level, cold);
        assert_eq!(next, Vec2::new(49.5, 25.0));
        assert!((moved - 0.4).abs() < 1e-5);
    }
}
