//! Integration tests for step-motion.
//!
//! Configuration-to-system workflow plus the library-level guarantees:
//! step conservation, signed positions, rate clamping, pause
//! idempotence, and block lifecycle behavior.

mod common;

use common::{bench, TestHooks, TEST_CONFIG};
use step_motion::config::SystemConfig;
use step_motion::{Axis, Block, Millimeters};

const FORWARD: [bool; 3] = [false; 3];

// =============================================================================
// Configuration workflow
// =============================================================================

#[test]
fn parse_full_config() {
    let config: SystemConfig = toml::from_str(TEST_CONFIG).expect("config parses");

    assert_eq!(config.timer.frequency_hz.value(), 100_000);
    assert_eq!(config.timer.acceleration_divider(), 100);
    assert_eq!(config.actuator(Axis::Alpha).name.as_str(), "X");
    assert_eq!(config.actuator(Axis::Gamma).steps_per_mm, 400.0);
    // Default floor applies when the config omits it.
    assert_eq!(config.actuator(Axis::Beta).minimum_rate.value(), 20);
}

#[test]
fn parse_config_rejects_bad_timer() {
    let broken = TEST_CONFIG.replace(
        "acceleration_ticks_per_sec = 1000",
        "acceleration_ticks_per_sec = 7777",
    );
    assert!(step_motion::parse_config(&broken).is_err());
}

#[test]
fn system_starts_disabled_and_idle() {
    let bench = bench();

    assert!(bench.system.is_idle());
    assert!(!bench.system.dispatcher().enable_pins_on());
    for pin in &bench.enable_pins {
        assert!(!pin.is_high());
    }
    assert_eq!(bench.system.motor(Axis::Beta).name(), "Y");
}

// =============================================================================
// Step generation guarantees
// =============================================================================

/// Every commanded step is emitted exactly once across a sequence of
/// same-direction moves.
#[test]
fn step_conservation_across_moves() {
    let mut bench = bench();
    let mut hooks = TestHooks::default();

    let moves = [250_u32, 1, 999, 40, 7];
    for &steps in &moves {
        bench.system.start_move(Axis::Alpha, false, steps, 5_000);
        bench.run_until_idle(&mut hooks, 1_000_000);
    }

    let expected: u32 = moves.iter().sum();
    assert_eq!(bench.pulses(Axis::Alpha), expected);
    assert_eq!(bench.system.motor(Axis::Alpha).position_steps(), expected as i32);
}

/// The signed position is the exact sum of directed moves.
#[test]
fn signed_position_is_exact() {
    let mut bench = bench();
    let mut hooks = TestHooks::default();

    let moves: [(bool, i32); 5] = [(false, 300), (true, 120), (false, 5), (true, 400), (false, 17)];
    for &(direction, steps) in &moves {
        bench.system.start_move(Axis::Beta, direction, steps as u32, 5_000);
        bench.run_until_idle(&mut hooks, 1_000_000);
    }

    let expected: i32 = moves
        .iter()
        .map(|&(d, n)| if d { -n } else { n })
        .sum();
    assert_eq!(bench.system.motor(Axis::Beta).position_steps(), expected);
}

/// Rates are clamped to the configured floor.
#[test]
fn rate_clamped_to_floor() {
    let mut bench = bench();

    let motor = bench.system.motor_mut(Axis::Gamma);
    motor.set_rate(1);
    assert_eq!(motor.rate(), 20);
    motor.set_rate(500);
    assert_eq!(motor.rate(), 500);
}

/// No pulses without a move: an idle or zero-step motor stays silent no
/// matter how long the tick runs.
#[test]
fn no_pulse_without_move() {
    let mut bench = bench();
    let mut hooks = TestHooks::default();

    bench.run_ticks(&mut hooks, 5_000);
    assert_eq!(bench.total_pulses(), 0);

    bench.system.start_move(Axis::Alpha, false, 0, 1_000);
    bench.run_ticks(&mut hooks, 5_000);
    assert_eq!(bench.total_pulses(), 0);
}

/// Repeated pause calls collapse into one: observable state matches a
/// single pause/resume cycle.
#[test]
fn pause_is_idempotent() {
    let mut bench = bench();
    let mut hooks = TestHooks::default();

    bench.system.start_move(Axis::Alpha, false, 500, 2_000);
    bench.run_ticks(&mut hooks, 1_000);

    bench.system.pause();
    bench.system.pause();
    let stepped = bench.system.motor(Axis::Alpha).stepped();
    let rate = bench.system.motor(Axis::Alpha).rate();

    bench.system.resume();
    assert!(bench.system.motor(Axis::Alpha).is_active());
    assert_eq!(bench.system.motor(Axis::Alpha).stepped(), stepped);
    assert_eq!(bench.system.motor(Axis::Alpha).rate(), rate);

    // A redundant resume changes nothing either.
    bench.system.resume();
    assert!(bench.system.motor(Axis::Alpha).is_active());

    bench.run_until_idle(&mut hooks, 1_000_000);
    assert_eq!(bench.pulses(Axis::Alpha), 500);
}

// =============================================================================
// Block lifecycle
// =============================================================================

/// Zero-length and zero-step blocks advance trivially: released at once,
/// no pulses, motors idle.
#[test]
fn trivial_blocks_advance_immediately() {
    let mut bench = bench();
    let mut hooks = TestHooks::default();

    let zero_steps = Block::new([0, 0, 0], FORWARD, 5.0);
    bench.system.begin_block(zero_steps, &mut hooks);
    assert_eq!(hooks.released, 1);

    let zero_length = Block::new([100, 0, 0], FORWARD, 0.0)
        .with_rates(200, 1000, 20, 1000);
    bench.system.begin_block(zero_length, &mut hooks);
    assert_eq!(hooks.released, 2);

    bench.run_ticks(&mut hooks, 2_000);
    assert_eq!(bench.total_pulses(), 0);
    assert!(bench.system.is_idle());
}

/// Back-to-back blocks through the release notification: the conveyor
/// pattern of feeding the next block as soon as the previous one is
/// handed back.
#[test]
fn consecutive_blocks_pipeline_cleanly() {
    let mut bench = bench();
    let mut hooks = TestHooks::default();

    let first = Block::new([200, 100, 0], FORWARD, 2.5)
        .with_rates(200, 2000, 20, 2000)
        .with_acceleration(40, 90, 110);
    bench.system.begin_block(first, &mut hooks);
    bench.run_until(&mut hooks, 2_000_000, |s| s.is_idle());
    assert_eq!(hooks.released, 1);

    let second = Block::new([300, 0, 50], FORWARD, 3.75)
        .with_rates(200, 2000, 20, 2000)
        .with_acceleration(40, 140, 160);
    bench.system.begin_block(second, &mut hooks);
    bench.run_until(&mut hooks, 2_000_000, |s| s.is_idle());
    assert_eq!(hooks.released, 2);

    assert_eq!(bench.pulses(Axis::Alpha), 500);
    assert_eq!(bench.pulses(Axis::Beta), 100);
    assert_eq!(bench.pulses(Axis::Gamma), 50);
}

/// The speed factor tracks the main rate against the cruise rate.
#[test]
fn speed_factor_reaches_unity_at_cruise() {
    let mut bench = bench();
    let mut hooks = TestHooks::default();

    assert!(bench.system.speed_factor().is_none());

    let block = Block::new([1000, 0, 0], FORWARD, 12.5)
        .with_rates(200, 2000, 20, 2000)
        .with_acceleration(40, 450, 550);
    bench.system.begin_block(block, &mut hooks);

    let factor = bench.system.speed_factor().expect("block in flight");
    assert!(factor < 1.0);

    bench.run_until(&mut hooks, 2_000_000, |s| s.motor(Axis::Alpha).stepped() >= 500);
    let factor = bench.system.speed_factor().expect("block in flight");
    assert!((factor - 1.0).abs() < 1e-6);
}

// =============================================================================
// Position API
// =============================================================================

#[test]
fn position_in_millimeters_follows_steps() {
    let mut bench = bench();
    let mut hooks = TestHooks::default();

    // Alpha is 80 steps/mm: 160 steps = 2 mm.
    bench.system.start_move(Axis::Alpha, false, 160, 5_000);
    bench.run_until_idle(&mut hooks, 1_000_000);

    let position = bench.system.position(Axis::Alpha);
    assert!((position.value() - 2.0).abs() < 1e-6);
}

#[test]
fn milestones_and_steps_to_target() {
    let mut bench = bench();

    let motor = bench.system.motor_mut(Axis::Gamma);
    motor.change_last_milestone(Millimeters(10.0));

    // Gamma is 400 steps/mm.
    assert_eq!(motor.position_steps(), 4_000);
    assert_eq!(motor.steps_to_target(Millimeters(11.0)), 400);
    assert_eq!(motor.steps_to_target(Millimeters(9.5)), -200);

    motor.change_steps_per_mm(200.0);
    assert_eq!(motor.position_steps(), 2_000);
    assert!((motor.current_position().value() - 10.0).abs() < 1e-6);
}
