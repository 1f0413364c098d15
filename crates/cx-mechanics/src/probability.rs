//! Probability helpers shared by events, tunnels and the economy.
//!
//! Every random draw takes the caller's RNG so runs replay from a seed.

use rand::Rng;

use crate::error::{MechError, MechResult};

/// `n!` as a float. `None` for negative `n`, infinity above 170.
pub fn factorial(n: i64) -> Option<f64> {
    if n < 0 {
        return None;
    }
    if n > 170 {
        return Some(f64::INFINITY);
    }
    Some((2..=n).fold(1.0, |acc, i| acc * i as f64))
}

/// Probability of exactly `k` events with rate `lambda`: `λ^k e^-λ / k!`.
pub fn poisson_probability(k: u32, lambda: f64) -> f64 {
    if lambda < 0.0 {
        return 0.0;
    }
    let denom = factorial(i64::from(k)).unwrap_or(f64::INFINITY);
    lambda.powi(k as i32) * (-lambda).exp() / denom
}

/// Chance of at least one event in `hours` at `lambda` per hour.
pub fn poisson_event_chance(lambda: f64, hours: f64) -> f64 {
    if lambda <= 0.0 || hours <= 0.0 {
        return 0.0;
    }
    1.0 - (-lambda * hours).exp()
}

/// `base · e^(-value / scale)`, or 0 for a non-positive scale.
pub fn exponential_decay(base: f64, value: f64, scale: f64) -> f64 {
    if scale <= 0.0 {
        return 0.0;
    }
    base * (-value / scale).exp()
}

/// Box-Muller normal sample.
pub fn normal(rng: &mut impl Rng, mean: f64, std_dev: f64) -> f64 {
    // u1 in (0, 1] keeps ln finite
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + z0 * std_dev
}

/// Uniform float in `[min, max)`.
pub fn uniform(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    rng.random::<f64>() * (max - min) + min
}

/// Uniform integer in `[min, max]`. Returns `min` when the range is empty.
pub fn uniform_int(rng: &mut impl Rng, min: i64, max: i64) -> i64 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}

/// Pick an item with probability proportional to its weight.
///
/// Rejects empty input, negative or non-finite weights, and a non-positive
/// total. Falls back to the last item if rounding leaves the roll unspent.
pub fn weighted_random<'a, T>(rng: &mut impl Rng, items: &'a [(T, f64)]) -> MechResult<&'a T> {
    let Some((last, _)) = items.last() else {
        return Err(MechError::EmptyChoice);
    };
    if let Some((_, bad)) = items.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
        return Err(MechError::InvalidWeight(*bad));
    }
    let total: f64 = items.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return Err(MechError::NonPositiveTotal(total));
    }

    let mut roll = rng.random::<f64>() * total;
    for (item, weight) in items {
        roll -= weight;
        if roll <= 0.0 {
            return Ok(item);
        }
    }
    Ok(last)
}

/// `Σ p·r` over `(probability, reward)` pairs.
pub fn expected_value(outcomes: &[(f64, f64)]) -> f64 {
    outcomes.iter().map(|(p, r)| p * r).sum()
}

/// Clamp `value` to `[min, max]`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * clamp(t, 0.0, 1.0)
}

/// True with `percent`% probability.
pub fn percent_chance(rng: &mut impl Rng, percent: f64) -> bool {
    rng.random::<f64>() * 100.0 < percent
}

/// Roll a die with `sides` faces.
pub fn roll_dice(rng: &mut impl Rng, sides: u32) -> u32 {
    uniform_int(rng, 1, i64::from(sides.max(1))) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn factorial_edges() {
        assert_eq!(factorial(-1), None);
        assert_eq!(factorial(0), Some(1.0));
        assert_eq!(factorial(5), Some(120.0));
        assert_eq!(factorial(171), Some(f64::INFINITY));
    }

    #[test]
    fn poisson_values() {
        // P(k=0 | λ=1) = e^-1
        assert!((poisson_probability(0, 1.0) - (-1.0_f64).exp()).abs() < 1e-12);
        assert_eq!(poisson_probability(2, -1.0), 0.0);
        assert_eq!(poisson_event_chance(0.0, 10.0), 0.0);
        assert_eq!(poisson_event_chance(1.0, 0.0), 0.0);
        assert!((poisson_event_chance(1.0, 1.0) - (1.0 - (-1.0_f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn decay_values() {
        assert_eq!(exponential_decay(0.01, 0.0, 5000.0), 0.01);
        assert_eq!(exponential_decay(0.01, 100.0, 0.0), 0.0);
        assert!((exponential_decay(0.01, 5000.0, 5000.0) - 0.01 / std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn weighted_random_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(42);
        let empty: [(u8, f64); 0] = [];
        assert!(matches!(weighted_random(&mut rng, &empty), Err(MechError::EmptyChoice)));
        assert!(matches!(
            weighted_random(&mut rng, &[("a", 1.0), ("b", -1.0)]),
            Err(MechError::InvalidWeight(_))
        ));
        assert!(matches!(
            weighted_random(&mut rng, &[("a", 0.0), ("b", 0.0)]),
            Err(MechError::NonPositiveTotal(_))
        ));
    }

    #[test]
    fn weighted_random_follows_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let items = [("common", 3.0), ("rare", 1.0)];
        let n = 20_000;
        let common = (0..n)
            .filter(|_| *weighted_random(&mut rng, &items).unwrap() == "common")
            .count();
        let share = common as f64 / n as f64;
        assert!((share - 0.75).abs() < 0.02, "share {share}");
    }

    #[test]
    fn normal_is_centered() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = 10_000;
        let mean = (0..n).map(|_| normal(&mut rng, 100.0, 25.0)).sum::<f64>() / n as f64;
        assert!((mean - 100.0).abs() < 1.5, "mean {mean}");
    }

    #[test]
    fn small_helpers() {
        assert_eq!(expected_value(&[(0.5, 10.0), (0.25, 4.0)]), 6.0);
        assert_eq!(lerp(0.0, 10.0, 2.0), 10.0);
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(!percent_chance(&mut rng, 0.0));
        assert!(percent_chance(&mut rng, 100.0));
    }

    proptest! {
        #[test]
        fn dice_stay_in_range(seed in any::<u64>(), sides in 1u32..100) {
            let mut rng = StdRng::seed_from_u64(seed);
            let v = roll_dice(&mut rng, sides);
            prop_assert!(v >= 1 && v <= sides);
        }

        #[test]
        fn uniform_stays_in_range(seed in any::<u64>(), lo in -100.0f64..100.0, span in 0.0f64..100.0) {
            let mut rng = StdRng::seed_from_u64(seed);
            let v = uniform(&mut rng, lo, lo + span);
            prop_assert!(v >= lo && v <= lo + span);
        }
    }
}
