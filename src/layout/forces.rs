//! Pairwise and per-node force terms for one nesting level.
//!
//! Every term works in level units: displacements are divided by the level
//! scale before the (already depth-scaled) constants are applied, which makes
//! a nested level an exact scaled copy of the root level. All functions are
//! pure; the driver decides which pairs to feed in.

use std::f32::consts::FRAC_PI_2;

use rand::Rng;

use super::annealing::Thermal;
use super::config::LevelParams;
use super::vector::Vec2;

/// Distances at or below this count as coincident and get jitter instead.
const COINCIDENT_EPSILON: f32 = 1e-4;

/// Repulsion beyond `min_distance` is multiplied by this much below it.
const CLOSE_RANGE_BOOST: f32 = 2.0;

/// Each endpoint of a near-axis connection takes half of the correction.
const ALIGNMENT_SHARE: f32 = 0.5;

/// Whether two points are close enough to need jitter.
#[inline]
pub fn coincident(p1: Vec2, p2: Vec2) -> bool {
    (p1 - p2).length_squared() <= COINCIDENT_EPSILON * COINCIDENT_EPSILON
}

/// Angle in radians between `delta` and the closest of the x and y axes.
#[inline]
pub fn axis_deviation(delta: Vec2) -> f32 {
    let angle = delta.y.abs().atan2(delta.x.abs());
    angle.min(FRAC_PI_2 - angle)
}

/// Inverse-square push on the node at `p1` away from the node at `p2`.
///
/// Zero beyond `max_repulsion_distance` and for coincident points; see
/// [`jitter`] for the latter.
pub fn repulsion(p1: Vec2, p2: Vec2, level: &LevelParams, thermal: Thermal) -> Vec2 {
    let delta = p1 - p2;
    let distance = delta.length();
    if distance <= COINCIDENT_EPSILON || distance > level.max_repulsion_distance {
        return Vec2::ZERO;
    }

    let scaled = distance / level.scale;
    let mut magnitude = level.repulsion_force / (scaled * scaled);
    if distance < level.min_distance {
        magnitude *= CLOSE_RANGE_BOOST;
    }
    if axis_deviation(delta) <= level.axis_tolerance {
        magnitude *= level.axis_repulsion_damping;
    }
    magnitude *= thermal.force();

    delta * (magnitude / distance)
}

/// Random push separating coincident nodes. Fades out as the simulation cools.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, level: &LevelParams, thermal: Thermal) -> Vec2 {
    let amount = level.jitter * thermal.jitter();
    Vec2::new(
        (rng.random::<f32>() - 0.5) * amount,
        (rng.random::<f32>() - 0.5) * amount,
    )
}

/// Hooke spring pulling `p1` toward (or pushing it from) its neighbour at `p2`.
pub fn spring(p1: Vec2, p2: Vec2, level: &LevelParams, thermal: Thermal) -> Vec2 {
    let delta = p2 - p1;
    let distance = delta.length();
    if distance <= COINCIDENT_EPSILON {
        return Vec2::ZERO;
    }

    let stretch = (distance - level.spring_length) / level.scale;
    let magnitude = level.attraction_force * stretch * thermal.force();
    delta * (magnitude / distance)
}

/// Perpendicular correction that straightens a nearly horizontal or nearly
/// vertical connection. `p1` receives its half; the neighbour computes the
/// opposite half from its own side.
pub fn alignment(p1: Vec2, p2: Vec2, level: &LevelParams, thermal: Thermal) -> Vec2 {
    let delta = p2 - p1;
    if level.alignment_force <= 0.0 || delta.length_squared() == 0.0 {
        return Vec2::ZERO;
    }
    if axis_deviation(delta) > level.axis_tolerance {
        return Vec2::ZERO;
    }

    let strength = level.alignment_force * ALIGNMENT_SHARE * thermal.force() / level.scale;
    if delta.x.abs() >= delta.y.abs() {
        Vec2::new(0.0, delta.y * strength)
    } else {
        Vec2::new(delta.x * strength, 0.0)
    }
}

/// Pull toward the nearest grid intersection; off while fully hot.
pub fn grid_pull(p: Vec2, level: &LevelParams, thermal: Thermal) -> Vec2 {
    let grid = level.grid_size;
    if grid <= 0.0 || level.grid_force <= 0.0 {
        return Vec2::ZERO;
    }

    let target = Vec2::new((p.x / grid).round() * grid, (p.y / grid).round() * grid);
    (target - p) * (level.grid_force * thermal.grid() / level.scale)
}

/// Pull toward the canvas centre (root level) or the parent's centre.
#[inline]
pub fn center_pull(p: Vec2, center: Vec2, level: &LevelParams, thermal: Thermal) -> Vec2 {
    (center - p) * (level.center_strength * thermal.force())
}

/// Cap on the net force magnitude at this level and temperature.
#[inline]
pub fn max_force(level: &LevelParams, thermal: Thermal) -> f32 {
    level.max_force * thermal.max_force()
}

/// `(velocity + force) * damping`, with damping tightened as it cools.
#[inline]
pub fn integrate(velocity: Vec2, force: Vec2, level: &LevelParams, thermal: Thermal) -> Vec2 {
    (velocity + force) * (level.damping * thermal.damping())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::LayoutConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const HOT: Thermal = Thermal { temperature: 1.0 };

    fn root() -> LevelParams {
        LayoutConfig::default().level(0)
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() <= 1e-4 * a.length().max(b.length()).max(1.0)
    }

    #[test]
    fn test_repulsion_pushes_apart() {
        let level = root();
        let f = repulsion(Vec2::new(0.0, 0.0), Vec2::new(100.0, 30.0), &level, HOT);
        assert!(f.x < 0.0);
        assert!(f.y < 0.0);
    }

    #[test]
    fn test_repulsion_zero_beyond_radius() {
        let level = root();
        let p2 = Vec2::new(level.max_repulsion_distance + 1.0, 40.0);
        assert_eq!(repulsion(Vec2::ZERO, p2, &level, HOT), Vec2::ZERO);
    }

    #[test]
    fn test_repulsion_boost_and_axis_damping() {
        let level = root();
        // Off-axis pairs so damping does not apply.
        let near = repulsion(Vec2::ZERO, Vec2::new(70.0, 70.0), &level, HOT);
        let expected = level.repulsion_force / (70.0f32 * 70.0 * 2.0) * CLOSE_RANGE_BOOST;
        assert!((near.length() - expected).abs() < 1e-3);

        // Same distance, one on the x axis.
        let d = (70.0f32 * 70.0 * 2.0).sqrt();
        let on_axis = repulsion(Vec2::ZERO, Vec2::new(d, 0.0), &level, HOT);
        assert!((on_axis.length() - expected * level.axis_repulsion_damping).abs() < 1e-3);
    }

    #[test]
    fn test_repulsion_ignores_coincident_points() {
        let level = root();
        assert_eq!(repulsion(Vec2::ZERO, Vec2::ZERO, &level, HOT), Vec2::ZERO);
        assert!(coincident(Vec2::ZERO, Vec2::new(0.0, 1e-5)));
    }

    #[test]
    fn test_jitter_is_bounded_and_seeded() {
        let level = root();
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let j = jitter(&mut a, &level, HOT);
            assert!(j.x.abs() <= level.jitter * 0.5);
            assert!(j.y.abs() <= level.jitter * 0.5);
            assert_eq!(j, jitter(&mut b, &level, HOT));
        }
    }

    #[test]
    fn test_spring_rest_length() {
        let level = root();
        let rest = Vec2::new(level.spring_length, 0.0);
        assert!(spring(Vec2::ZERO, rest, &level, HOT).length() < 1e-4);

        let stretched = spring(Vec2::ZERO, Vec2::new(200.0, 0.0), &level, HOT);
        assert!(stretched.x > 0.0);
        let compressed = spring(Vec2::ZERO, Vec2::new(50.0, 0.0), &level, HOT);
        assert!(compressed.x < 0.0);
    }

    #[test]
    fn test_alignment_only_near_axis() {
        let level = root();
        let near_horizontal = alignment(Vec2::ZERO, Vec2::new(100.0, 5.0), &level, HOT);
        assert_eq!(near_horizontal.x, 0.0);
        assert!(near_horizontal.y > 0.0);

        let near_vertical = alignment(Vec2::ZERO, Vec2::new(-5.0, 100.0), &level, HOT);
        assert!(near_vertical.x < 0.0);
        assert_eq!(near_vertical.y, 0.0);

        let diagonal = alignment(Vec2::ZERO, Vec2::new(100.0, 100.0), &level, HOT);
        assert_eq!(diagonal, Vec2::ZERO);
    }

    #[test]
    fn test_alignment_halves_cancel() {
        let level = root();
        let (a, b) = (Vec2::new(10.0, 3.0), Vec2::new(140.0, -4.0));
        let sum = alignment(a, b, &level, HOT) + alignment(b, a, &level, HOT);
        assert!(sum.length() < 1e-6);
    }

    #[test]
    fn test_grid_pull_grows_as_it_cools() {
        let level = root();
        let p = Vec2::new(31.0, 49.0);
        assert_eq!(grid_pull(p, &level, HOT), Vec2::ZERO);

        let cold = grid_pull(p, &level, Thermal::new(0.1));
        assert!(cold.x < 0.0);
        assert!(cold.y > 0.0);
    }

    #[test]
    fn test_grid_pull_disabled_without_grid() {
        let level = LayoutConfig {
            grid_size: 0.0,
            ..Default::default()
        }
        .level(0);
        assert_eq!(grid_pull(Vec2::new(3.0, 4.0), &level, Thermal::new(0.1)), Vec2::ZERO);
    }

    #[test]
    fn test_center_pull_points_to_center() {
        let level = root();
        let f = center_pull(Vec2::new(100.0, -50.0), Vec2::ZERO, &level, HOT);
        assert!(close(f, Vec2::new(-1.0, 0.5)));
    }

    #[test]
    fn test_nested_level_is_scaled_copy() {
        let config = LayoutConfig::default();
        let (outer, inner) = (config.level(0), config.level(1));
        let s = inner.scale;
        let (p1, p2) = (Vec2::new(0.0, 0.0), Vec2::new(150.0, 40.0));

        let pairs = [
            (repulsion(p1, p2, &outer, HOT), repulsion(p1 * s, p2 * s, &inner, HOT)),
            (spring(p1, p2, &outer, HOT), spring(p1 * s, p2 * s, &inner, HOT)),
        ];
        for (root_force, nested_force) in pairs {
            assert!(close(root_force * s, nested_force), "{root_force:?} vs {nested_force:?}");
        }
    }

    #[test]
    fn test_integrate_applies_damping() {
        let level = root();
        let v = integrate(Vec2::new(2.0, 0.0), Vec2::new(2.0, 2.0), &level, HOT);
        assert_eq!(v, Vec2::new(2.0, 1.0));
    }
}
