use engine::Vec2;
use rand::Rng;

const MAX_PLACEMENT_ATTEMPTS: u32 = 1024;

/// Axis-aligned rectangle in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bounds {
    pub(crate) min_x: f32,
    pub(crate) max_x: f32,
    pub(crate) min_y: f32,
    pub(crate) max_y: f32,
}

impl Bounds {
    pub(crate) fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Shrinks every edge inwards by `margin`.
    pub(crate) fn inset(&self, margin: f32) -> Bounds {
        Bounds {
            min_x: self.min_x + margin,
            max_x: self.max_x - margin,
            min_y: self.min_y + margin,
            max_y: self.max_y - margin,
        }
    }

    /// Whole-unit point inside the bounds. Fractional edges round inwards.
    pub(crate) fn random_point(&self, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(
            rand_axis(rng, self.min_x, self.max_x),
            rand_axis(rng, self.min_y, self.max_y),
        )
    }
}

/// Midpoint when no whole unit fits between `min` and `max`.
fn rand_axis(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    let (lo, hi) = (min.ceil(), max.floor());
    if lo > hi {
        return (min + max) * 0.5;
    }
    rand_range(rng, lo as i32, hi as i32) as f32
}

/// Whole number in `[min, max]`, both ends included. Reversed ranges are swapped.
pub(crate) fn rand_range(rng: &mut impl Rng, min: i32, max: i32) -> i32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(lo..=hi)
}

/// Uniform float in `[min, max)`. An empty range yields `min`.
pub(crate) fn rand_range_f32(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..max)
}

/// Vector pointing from `from` to `to`.
pub(crate) fn point_to(from: Vec2, to: Vec2) -> Vec2 {
    to - from
}

pub(crate) fn angle_between(from: Vec2, to: Vec2) -> f32 {
    point_to(from, to).angle()
}

/// Random point with both coordinates in `[min, max]` whose squared distance
/// from `avoid` is at least `min_distance_sq`. Falls back to the farthest
/// candidate seen when the square has no point far enough away.
pub(crate) fn rand_pos_away_from(
    rng: &mut impl Rng,
    min: i32,
    max: i32,
    avoid: Vec2,
    min_distance_sq: f32,
) -> Vec2 {
    let mut best = Vec2::new(min as f32, min as f32);
    let mut best_distance_sq = f32::NEG_INFINITY;
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let candidate = Vec2::new(
            rand_range(rng, min, max) as f32,
            rand_range(rng, min, max) as f32,
        );
        let distance_sq = candidate.distance_squared(avoid);
        if distance_sq >= min_distance_sq {
            return candidate;
        }
        if distance_sq > best_distance_sq {
            best = candidate;
            best_distance_sq = distance_sq;
        }
    }
    best
}

/// Maps `n` in `[0, n_max]` onto `[val_min, val_max]` along a quadratic curve.
pub(crate) fn quad_lerp(n: f32, n_max: f32, val_min: f32, val_max: f32) -> f32 {
    if n_max <= 0.0 {
        return val_min;
    }
    let proportion = n / n_max;
    (val_max - val_min) * proportion * proportion + val_min
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn rand_range_is_inclusive_and_order_agnostic() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut saw_min = false;
        let mut saw_max = false;
        for _ in 0..500 {
            let value = rand_range(&mut rng, 5, 2);
            assert!((2..=5).contains(&value));
            saw_min |= value == 2;
            saw_max |= value == 5;
        }
        assert!(saw_min && saw_max);
    }

    #[test]
    fn random_point_rounds_fractional_edges_inwards() {
        let mut rng = SmallRng::seed_from_u64(4);
        let bounds = Bounds {
            min_x: 10.5,
            max_x: 12.5,
            min_y: -3.7,
            max_y: -1.2,
        };
        for _ in 0..200 {
            let point = bounds.random_point(&mut rng);
            assert!(point.x == 11.0 || point.x == 12.0, "x = {}", point.x);
            assert!(point.y == -3.0 || point.y == -2.0, "y = {}", point.y);
        }
    }

    #[test]
    fn random_point_in_sub_unit_bounds_is_the_centre() {
        let mut rng = SmallRng::seed_from_u64(4);
        let bounds = Bounds {
            min_x: 10.25,
            max_x: 10.75,
            min_y: 0.0,
            max_y: 0.0,
        };
        assert_eq!(bounds.random_point(&mut rng), Vec2::new(10.5, 0.0));
    }

    #[test]
    fn empty_float_range_returns_min() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(rand_range_f32(&mut rng, 3.0, 3.0), 3.0);
    }

    #[test]
    fn away_from_point_respects_distance_when_possible() {
        let mut rng = SmallRng::seed_from_u64(11);
        let avoid = Vec2::new(256.0, 256.0);
        for _ in 0..100 {
            let pos = rand_pos_away_from(&mut rng, 80, 440, avoid, 210.0 * 210.0);
            assert!(pos.distance_squared(avoid) >= 210.0 * 210.0);
            assert!((80.0..=440.0).contains(&pos.x));
            assert!((80.0..=440.0).contains(&pos.y));
        }
    }

    #[test]
    fn away_from_point_terminates_when_impossible() {
        let mut rng = SmallRng::seed_from_u64(3);
        let pos = rand_pos_away_from(&mut rng, 0, 10, Vec2::ZERO, 1.0e9);
        assert!((0.0..=10.0).contains(&pos.x));
    }

    #[test]
    fn quad_lerp_hits_both_ends() {
        assert_eq!(quad_lerp(0.0, 4.0, 10.0, 120.0), 10.0);
        assert_eq!(quad_lerp(4.0, 4.0, 10.0, 120.0), 120.0);
        assert_eq!(quad_lerp(2.0, 4.0, 0.0, 100.0), 25.0);
        assert_eq!(quad_lerp(0.0, 0.0, 7.0, 120.0), 7.0);
    }

    #[test]
    fn angle_points_along_positive_y_axis() {
        let angle = angle_between(Vec2::ZERO, Vec2::new(0.0, 3.0));
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
