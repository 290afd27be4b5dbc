use std::{cell::RefCell, rc::Rc, time::Duration};

use poke_rpg_core::TickContext;
use poke_rpg_system_tick_runner::{RunnerConfig, RunnerEvent, TickRunner};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn ticks(events: &[RunnerEvent]) -> Vec<TickContext> {
    events
        .iter()
        .filter_map(|event| match event {
            RunnerEvent::Tick(context) => Some(*context),
            RunnerEvent::Throughput { .. } => None,
        })
        .collect()
}

fn started() -> TickRunner {
    let mut runner = TickRunner::default();
    runner.start();
    let mut out = Vec::new();
    runner.on_frame(ms(1_000), &mut out);
    assert!(out.is_empty(), "first frame must only initialise clocks");
    runner
}

#[test]
fn emits_fixed_ticks_with_monotonic_context() {
    let mut runner = started();
    let mut out = Vec::new();
    runner.on_frame(ms(1_150), &mut out);

    let contexts = ticks(&out);
    assert_eq!(contexts.len(), 3);
    for (offset, context) in contexts.iter().enumerate() {
        let index = offset as u64 + 1;
        assert_eq!(context.tick_index, index);
        assert_eq!(context.dt, ms(50));
        assert_eq!(context.sim_time, ms(50 * index));
    }
}

#[test]
fn large_gap_is_clamped_to_frame_budget() {
    let mut runner = started();
    let mut out = Vec::new();
    runner.on_frame(ms(61_000), &mut out);

    assert_eq!(ticks(&out).len(), 10);
    let stats = runner.stats();
    assert_eq!(stats.total_ticks, 10);
    assert_eq!(stats.last_real_delta, ms(60_000));

    out.clear();
    runner.on_frame(ms(61_040), &mut out);
    assert!(ticks(&out).is_empty(), "remainder must be discarded after the cap");
}

#[test]
fn saturated_budget_drops_fractional_remainder() {
    let config = RunnerConfig {
        tick_rate: 20,
        max_ticks_per_frame: 2,
    };
    let mut runner = TickRunner::new(config);
    runner.start();
    let mut out = Vec::new();
    runner.on_frame(ms(0), &mut out);
    runner.on_frame(ms(40), &mut out);
    assert!(out.is_empty());

    // 40ms carried plus 100ms clamped: two ticks, 40ms left over and dropped.
    runner.on_frame(ms(170), &mut out);
    assert_eq!(ticks(&out).len(), 2);

    out.clear();
    runner.on_frame(ms(190), &mut out);
    assert!(ticks(&out).is_empty());
}

#[test]
fn backwards_timestamps_simulate_nothing() {
    let mut runner = started();
    let mut out = Vec::new();
    runner.on_frame(ms(500), &mut out);
    assert!(out.is_empty());
    assert_eq!(runner.stats().last_real_delta, Duration::ZERO);
}

#[test]
fn stop_resets_clock_so_restart_does_not_fast_forward() {
    let mut runner = started();
    let mut out = Vec::new();
    runner.on_frame(ms(1_100), &mut out);
    assert_eq!(ticks(&out).len(), 2);

    runner.stop();
    assert!(!runner.is_running());
    runner.start();

    out.clear();
    runner.on_frame(ms(9_000), &mut out);
    assert!(out.is_empty(), "restart must re-initialise clocks");
    runner.on_frame(ms(9_050), &mut out);

    let contexts = ticks(&out);
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].tick_index, 3);
    assert_eq!(contexts[0].sim_time, ms(150));
}

#[test]
fn start_is_idempotent() {
    let mut runner = started();
    runner.start();
    let mut out = Vec::new();
    runner.on_frame(ms(1_050), &mut out);
    assert_eq!(ticks(&out).len(), 1, "second start must not reset clocks");
}

#[test]
fn throughput_is_sampled_once_per_second() {
    let mut runner = started();
    let mut out = Vec::new();
    let mut samples = Vec::new();
    for frame in 1..=40 {
        out.clear();
        runner.on_frame(ms(1_000 + frame * 50), &mut out);
        samples.extend(out.iter().filter_map(|event| match event {
            RunnerEvent::Throughput { tps } => Some(*tps),
            RunnerEvent::Tick(_) => None,
        }));
    }

    assert_eq!(samples.len(), 2);
    for tps in &samples {
        assert!((tps - 20.0).abs() < 1e-9, "unexpected throughput {tps}");
    }
    assert!((runner.stats().current_tps - 20.0).abs() < 1e-9);
    assert_eq!(runner.stats().target_tps, 20);
}

#[test]
fn listeners_observe_ticks_and_throughput_in_order() {
    let mut runner = TickRunner::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let tick_sub = {
        let seen = Rc::clone(&seen);
        runner.subscribe_tick(move |context| {
            seen.borrow_mut().push(format!("tick {}", context.tick_index));
        })
    };
    let _ = {
        let seen = Rc::clone(&seen);
        runner.subscribe_throughput(move |tps| seen.borrow_mut().push(format!("tps {tps:.0}")))
    };

    runner.start();
    let mut out = Vec::new();
    runner.on_frame(ms(0), &mut out);
    runner.on_frame(ms(500), &mut out);
    runner.on_frame(ms(1_000), &mut out);

    let log = seen.borrow().clone();
    assert_eq!(log.len(), 21);
    assert_eq!(log[0], "tick 1");
    assert_eq!(log[19], "tick 20");
    assert_eq!(log[20], "tps 20");

    assert!(runner.unsubscribe_tick(tick_sub));
    seen.borrow_mut().clear();
    runner.on_frame(ms(1_050), &mut out);
    assert!(seen.borrow().is_empty());
}

#[test]
fn config_loads_from_partial_toml() {
    let config: RunnerConfig = toml::from_str("tick_rate = 40").expect("config parses");
    assert_eq!(config.tick_rate, 40);
    assert_eq!(config.max_ticks_per_frame, 10);
    assert_eq!(config.tick_duration(), ms(25));
}
