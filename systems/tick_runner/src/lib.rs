#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-timestep tick runner.
//!
//! The host feeds wall-clock frame timestamps into [`TickRunner::on_frame`];
//! the runner converts the variable frame deltas into a bounded number of
//! fixed-duration ticks and periodically reports the measured throughput.
//! It is the only component that interprets wall-clock time.

use std::time::Duration;

use poke_rpg_core::{Listeners, Subscription, TickContext};
use serde::{Deserialize, Serialize};

const THROUGHPUT_WINDOW: Duration = Duration::from_secs(1);

/// Tuning of the fixed-timestep clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Target ticks per second.
    pub tick_rate: u32,
    /// Upper bound on ticks simulated for a single frame.
    pub max_ticks_per_frame: u32,
}

impl RunnerConfig {
    /// Fixed duration of one tick.
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    /// Largest frame delta converted into ticks.
    #[must_use]
    pub fn max_frame_delta(&self) -> Duration {
        self.tick_duration()
            .saturating_mul(self.max_ticks_per_frame.max(1))
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20,
            max_ticks_per_frame: 10,
        }
    }
}

/// Events produced while processing a frame, in emission order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RunnerEvent {
    /// One fixed simulation step elapsed.
    Tick(TickContext),
    /// A throughput sample completed.
    Throughput {
        /// Measured ticks per real second over the sample window.
        tps: f64,
    },
}

/// Diagnostic counters of the runner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunnerStats {
    /// Configured tick rate.
    pub target_tps: u32,
    /// Most recent throughput sample.
    pub current_tps: f64,
    /// Ticks executed since construction.
    pub total_ticks: u64,
    /// Simulated time executed since construction.
    pub simulated_time: Duration,
    /// Last unclamped delta between frames.
    pub last_real_delta: Duration,
}

/// Converts host frames into deterministic fixed-duration ticks.
#[derive(Debug)]
pub struct TickRunner {
    config: RunnerConfig,
    running: bool,
    last_timestamp: Option<Duration>,
    accumulator: Duration,
    tick_index: u64,
    sim_time: Duration,
    last_real_delta: Duration,
    sample_start: Option<Duration>,
    ticks_since_sample: u64,
    current_tps: f64,
    tick_listeners: Listeners<TickContext>,
    throughput_listeners: Listeners<f64>,
}

impl TickRunner {
    /// Creates a stopped runner.
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            running: false,
            last_timestamp: None,
            accumulator: Duration::ZERO,
            tick_index: 0,
            sim_time: Duration::ZERO,
            last_real_delta: Duration::ZERO,
            sample_start: None,
            ticks_since_sample: 0,
            current_tps: 0.0,
            tick_listeners: Listeners::new(),
            throughput_listeners: Listeners::new(),
        }
    }

    /// Configuration the runner was built with.
    #[must_use]
    pub const fn config(&self) -> RunnerConfig {
        self.config
    }

    /// Starts accepting frames. Calling it while running has no effect.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        tracing::debug!(tick_rate = self.config.tick_rate, "tick runner started");
    }

    /// Stops accepting frames and discards accumulated real time.
    ///
    /// Tick index and simulated time are kept; the next [`Self::start`]
    /// resumes from them without replaying the stopped interval.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.last_timestamp = None;
        self.accumulator = Duration::ZERO;
        self.sample_start = None;
        self.ticks_since_sample = 0;
        tracing::debug!(total_ticks = self.tick_index, "tick runner stopped");
    }

    /// Reports whether frames are currently converted into ticks.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Processes one host frame carrying a monotonic wall-clock timestamp.
    ///
    /// The first frame after [`Self::start`] only initialises the clocks.
    pub fn on_frame(&mut self, timestamp: Duration, out: &mut Vec<RunnerEvent>) {
        if !self.running {
            return;
        }

        let Some(last) = self.last_timestamp.replace(timestamp) else {
            self.sample_start = Some(timestamp);
            return;
        };

        let real_delta = timestamp.saturating_sub(last);
        self.last_real_delta = real_delta;

        let max_delta = self.config.max_frame_delta();
        if real_delta > max_delta {
            tracing::trace!(?real_delta, ?max_delta, "frame delta clamped");
        }
        self.accumulator += real_delta.min(max_delta);

        let dt = self.config.tick_duration();
        let max_ticks = self.config.max_ticks_per_frame.max(1);
        let mut ticks_this_frame = 0;
        while self.accumulator >= dt && ticks_this_frame < max_ticks {
            self.accumulator -= dt;
            ticks_this_frame += 1;
            let context = self.step(dt);
            out.push(RunnerEvent::Tick(context));
        }

        if ticks_this_frame >= max_ticks && !self.accumulator.is_zero() {
            tracing::trace!(dropped = ?self.accumulator, "catch-up time discarded");
            self.accumulator = Duration::ZERO;
        }

        if let Some(tps) = self.sample_throughput(timestamp) {
            out.push(RunnerEvent::Throughput { tps });
        }
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> RunnerStats {
        RunnerStats {
            target_tps: self.config.tick_rate,
            current_tps: self.current_tps,
            total_ticks: self.tick_index,
            simulated_time: self.sim_time,
            last_real_delta: self.last_real_delta,
        }
    }

    /// Registers a listener invoked for every tick.
    pub fn subscribe_tick<F>(&mut self, listener: F) -> Subscription<TickContext>
    where
        F: FnMut(&TickContext) + 'static,
    {
        self.tick_listeners.subscribe(listener)
    }

    /// Removes a tick listener.
    pub fn unsubscribe_tick(&mut self, subscription: Subscription<TickContext>) -> bool {
        self.tick_listeners.unsubscribe(subscription)
    }

    /// Registers a listener invoked for every throughput sample.
    pub fn subscribe_throughput<F>(&mut self, listener: F) -> Subscription<f64>
    where
        F: FnMut(&f64) + 'static,
    {
        self.throughput_listeners.subscribe(listener)
    }

    /// Removes a throughput listener.
    pub fn unsubscribe_throughput(&mut self, subscription: Subscription<f64>) -> bool {
        self.throughput_listeners.unsubscribe(subscription)
    }

    fn step(&mut self, dt: Duration) -> TickContext {
        self.tick_index += 1;
        self.sim_time += dt;
        self.ticks_since_sample += 1;
        let context = TickContext {
            tick_index: self.tick_index,
            dt,
            sim_time: self.sim_time,
        };
        self.tick_listeners.emit(&context);
        context
    }

    fn sample_throughput(&mut self, now: Duration) -> Option<f64> {
        let Some(start) = self.sample_start else {
            self.sample_start = Some(now);
            self.ticks_since_sample = 0;
            return None;
        };

        let elapsed = now.saturating_sub(start);
        if elapsed < THROUGHPUT_WINDOW {
            return None;
        }

        let tps = self.ticks_since_sample as f64 / elapsed.as_secs_f64();
        self.current_tps = tps;
        self.sample_start = Some(now);
        self.ticks_since_sample = 0;
        tracing::trace!(tps, "throughput sampled");
        self.throughput_listeners.emit(&tps);
        Some(tps)
    }
}

impl Default for TickRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}
