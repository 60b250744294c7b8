// Synthetic position pool generation and risk classification

use crate::core::random::RandomSource;
use crate::core::types::{Position, RiskClass};
use crate::error::{SimError, SimResult};
use std::ops::Range;

const HEALTH_DECIMALS: i32 = 3;
const PROFIT_DECIMALS: i32 = 2;

/// Build `size` positions with ids `1..=size`, sorted most vulnerable first.
///
/// Health and profit are drawn uniformly from their half-open ranges and
/// rounded (3 and 2 decimals); rounding never pushes a value outside its range.
/// Ties on health keep ascending id order.
pub fn generate_pool<S: AsRef<str>>(
    size: usize,
    health_range: Range<f64>,
    profit_range: Range<f64>,
    assets: &[S],
    rng: &mut dyn RandomSource,
) -> SimResult<Vec<Position>> {
    if assets.is_empty() {
        return Err(SimError::InvalidParameter(
            "assets".to_string(),
            "asset set must not be empty".to_string(),
        ));
    }
    check_range("health_range", &health_range)?;
    check_range("profit_range", &profit_range)?;
    if profit_range.start < 0.0 {
        return Err(SimError::InvalidParameter(
            "profit_range".to_string(),
            format!("profit must be non-negative, got start {}", profit_range.start),
        ));
    }

    let mut pool: Vec<Position> = (1..=size as u32)
        .map(|id| {
            let asset = assets[rng.next_index(assets.len())].as_ref();
            let health = draw_rounded(rng, &health_range, HEALTH_DECIMALS);
            let profit = draw_rounded(rng, &profit_range, PROFIT_DECIMALS);
            Position::new(id, asset, health, profit)
        })
        .collect();

    pool.sort_by(|a, b| a.health.total_cmp(&b.health).then(a.id.cmp(&b.id)));
    Ok(pool)
}

/// Partition of the health domain. Both thresholds are inclusive upper bounds.
pub fn classify(position: &Position, liq_threshold: f64, aot_threshold: f64) -> RiskClass {
    classify_health(position.health, liq_threshold, aot_threshold)
}

pub fn classify_health(health: f64, liq_threshold: f64, aot_threshold: f64) -> RiskClass {
    if health <= liq_threshold {
        RiskClass::Vulnerable
    } else if health <= aot_threshold {
        RiskClass::AtRisk
    } else {
        RiskClass::Safe
    }
}

fn check_range(name: &str, range: &Range<f64>) -> SimResult<()> {
    if !(range.start.is_finite() && range.end.is_finite()) || range.start >= range.end {
        return Err(SimError::InvalidParameter(
            name.to_string(),
            format!("expected start < end, got [{}, {})", range.start, range.end),
        ));
    }
    Ok(())
}

fn draw_rounded(rng: &mut dyn RandomSource, range: &Range<f64>, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let raw = range.start + rng.next_uniform() * (range.end - range.start);
    let rounded = (raw * scale).round() / scale;

    if rounded >= range.end {
        // Step one unit below the exclusive bound
        (((range.end * scale).round() - 1.0) / scale).max(range.start)
    } else {
        rounded.max(range.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::{RngSource, ScriptedSource};

    const ASSETS: [&str; 5] = ["SOL", "USDC", "mSOL", "RAY", "BONK"];

    #[test]
    fn test_pool_is_sorted_with_unique_ids() {
        let mut rng = RngSource::seeded(7);
        let pool = generate_pool(15, 0.95..1.25, 10.0..50.0, &ASSETS, &mut rng).unwrap();

        assert_eq!(pool.len(), 15);
        let mut ids: Vec<u32> = pool.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=15).collect::<Vec<_>>());

        for pair in pool.windows(2) {
            assert!(
                pair[0].health < pair[1].health
                    || (pair[0].health == pair[1].health && pair[0].id < pair[1].id)
            );
        }
        for p in &pool {
            assert!(p.health >= 0.95 && p.health < 1.25);
            assert!(p.profit >= 10.0 && p.profit < 50.0);
            assert!(ASSETS.contains(&p.asset.as_str()));
        }
    }

    #[test]
    fn test_ties_broken_by_id() {
        // asset, health, profit per position: identical health for all three
        let mut rng = ScriptedSource::new(vec![0.0, 0.5, 0.1, 0.0, 0.5, 0.2, 0.0, 0.5, 0.3]);
        let pool = generate_pool(3, 1.0..2.0, 10.0..20.0, &ASSETS, &mut rng).unwrap();

        assert_eq!(pool.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(pool.iter().all(|p| p.health == 1.5));
    }

    #[test]
    fn test_rounding_respects_exclusive_bound() {
        let mut rng = ScriptedSource::constant(0.99999);
        let pool = generate_pool(1, 0.95..1.25, 10.0..50.0, &ASSETS, &mut rng).unwrap();

        assert_eq!(pool[0].health, 1.249);
        assert_eq!(pool[0].profit, 49.99);
    }

    #[test]
    fn test_empty_assets_rejected() {
        let mut rng = RngSource::seeded(1);
        let empty: [&str; 0] = [];
        assert!(generate_pool(3, 0.95..1.25, 10.0..50.0, &empty, &mut rng).is_err());
    }

    #[test]
    fn test_negative_profit_rejected() {
        let mut rng = RngSource::seeded(1);
        assert!(matches!(
            generate_pool(3, 0.95..1.25, -5.0..50.0, &ASSETS, &mut rng),
            Err(SimError::InvalidParameter(name, _)) if name == "profit_range"
        ));
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify_health(1.05, 1.05, 1.20), RiskClass::Vulnerable);
        assert_eq!(classify_health(1.051, 1.05, 1.20), RiskClass::AtRisk);
        assert_eq!(classify_health(1.20, 1.05, 1.20), RiskClass::AtRisk);
        assert_eq!(classify_health(1.201, 1.05, 1.20), RiskClass::Safe);
        assert_eq!(classify_health(0.0, 1.05, 1.20), RiskClass::Vulnerable);
    }
}
