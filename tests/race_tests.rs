// Integration tests for the paired race dashboard

mod common;

use common::create_test_config;
use raiku_race_sim::{
    chart_scale, clamp_rounds, RaceDashboard, RaceProgress, ScriptedSource, TimingConfig,
};
use std::time::Duration;

#[test]
fn test_round_input_is_clamped() {
    assert_eq!(clamp_rounds("25"), 25);
    assert_eq!(clamp_rounds("1000"), 100);
    assert_eq!(clamp_rounds("abc"), 1);
    assert_eq!(clamp_rounds("3.7"), 3);
}

#[test]
fn test_chart_scale_with_zero_profit() {
    assert_eq!(chart_scale(&[0.0, 37.5], 100.0), vec![0.0, 100.0]);
}

#[tokio::test(start_paused = true)]
async fn test_race_rounds_join_both_tracks() {
    let config = create_test_config();
    // Raiku sleeps less, so each round draws Raiku first, then standard
    let draws = vec![0.9, 0.1, 0.9, 0.9, 0.9, 0.5];
    let dashboard = RaceDashboard::new(
        config.simulation.clone(),
        TimingConfig::default(),
        Box::new(ScriptedSource::new(draws)),
    );

    let summary = dashboard.run(3, &RaceProgress::hidden()).await.unwrap();

    assert_eq!(summary.rounds, 3);
    assert_eq!(summary.history.len(), 3);
    assert_eq!(summary.raiku.attempts(), 3);
    assert_eq!(summary.standard.attempts(), 3);
    assert_eq!(summary.raiku.successes(), 3);
    assert_eq!(summary.standard.attempts(), summary.standard.successes() + summary.standard.failures());
    assert_eq!(summary.raiku.total_profit(), 3.0 * 12.50);
    assert!(summary.raiku_advantage >= 0.0);
    assert_eq!(summary.profit_bars[1], 100.0);
}

#[tokio::test(start_paused = true)]
async fn test_race_with_zero_standard_profit_scales_safely() {
    let mut config = create_test_config();
    config.simulation.standard_fail_rate = 1.0;
    let dashboard = RaceDashboard::with_seed(config.simulation.clone(), TimingConfig::instant(), 5);

    let summary = dashboard.run(250, &RaceProgress::hidden()).await.unwrap();

    assert_eq!(summary.rounds, 100);
    assert_eq!(summary.standard.successes(), 0);
    assert_eq!(summary.standard_success_rate, 0.0);
    assert_eq!(summary.profit_bars[0], 0.0);
    assert_eq!(summary.raiku_advantage, 100.0 * 12.50);
}

#[tokio::test(start_paused = true)]
async fn test_dashboard_reset_mid_race_drops_round() {
    let config = create_test_config();
    let dashboard = RaceDashboard::with_seed(config.simulation.clone(), TimingConfig::default(), 3);

    let racing = dashboard.clone();
    let handle = tokio::spawn(async move { racing.run(10, &RaceProgress::hidden()).await });

    // First round resolves at 800ms; reset while it is still in flight
    tokio::time::sleep(Duration::from_millis(500)).await;
    dashboard.reset().unwrap();

    let summary = handle.await.unwrap().unwrap();
    assert_eq!(summary.rounds, 0);
    assert_eq!(dashboard.counters().unwrap().raiku.attempts(), 0);
}
