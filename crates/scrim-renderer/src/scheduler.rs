//! Dual-rate frame scheduling
//!
//! Two independent clocks drive the overlay. The script clock decides when
//! draw callbacks run and refill the command list; its interval is set by
//! the configured rate and adjustable at runtime. The repaint gate is
//! armed whenever a script phase completed and consumed by the render
//! phase. Presentation itself runs every host frame regardless and just
//! blits whatever pixels are resident.
//!
//! Time is passed in explicitly (via [`Clock`]) so scheduling is testable
//! without wall-clock dependence.

use std::time::{Duration, Instant};

/// Monotonic time source
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Phase of a deadline clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickState {
    /// Waiting for the deadline
    Idle,
    /// Deadline passed, phase not started yet
    Due,
    /// Phase currently executing
    Running,
}

/// A deadline against a monotonic clock.
///
/// The first poll after construction is immediately due; afterwards each
/// completed phase pushes the deadline one interval past its finish time.
#[derive(Debug)]
pub struct DeadlineClock {
    interval: Duration,
    deadline: Instant,
    state: TickState,
}

impl DeadlineClock {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            deadline: now,
            state: TickState::Idle,
        }
    }

    /// Whether the phase should run at `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.state == TickState::Idle && now >= self.deadline {
            self.state = TickState::Due;
        }
        self.state == TickState::Due
    }

    /// Mark the phase as started
    pub fn begin(&mut self) {
        self.state = TickState::Running;
    }

    /// Mark the phase as finished and advance the deadline
    pub fn finish(&mut self, now: Instant) {
        self.deadline = now + self.interval;
        self.state = TickState::Idle;
    }

    pub fn state(&self) -> TickState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the interval; takes effect from the next completed phase
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }
}

/// The overlay's two execution gates
#[derive(Debug)]
pub struct FrameScheduler {
    script: DeadlineClock,
    repaint_armed: bool,
}

impl FrameScheduler {
    pub fn new(script_interval: Duration, now: Instant) -> Self {
        Self {
            script: DeadlineClock::new(script_interval, now),
            repaint_armed: false,
        }
    }

    /// Whether the script draw phase is due at `now`
    pub fn script_due(&mut self, now: Instant) -> bool {
        self.script.poll(now)
    }

    /// Enter the script phase
    pub fn begin_script(&mut self) {
        self.script.begin();
    }

    /// Leave the script phase: advances the script deadline and arms the
    /// repaint gate
    pub fn finish_script(&mut self, now: Instant) {
        self.script.finish(now);
        self.repaint_armed = true;
    }

    /// Consume the repaint gate.
    ///
    /// Returns true at most once per completed script phase.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.repaint_armed)
    }

    /// Whether a repaint is pending without consuming the gate
    pub fn repaint_armed(&self) -> bool {
        self.repaint_armed
    }

    /// Script rate in Hz
    pub fn rate_hz(&self) -> f64 {
        1.0 / self.script.interval().as_secs_f64()
    }

    /// Set the script rate in Hz; non-positive values are ignored
    pub fn set_rate_hz(&mut self, hz: f64) {
        if hz > 0.0 {
            self.script.set_interval(Duration::from_secs_f64(1.0 / hz));
        }
    }
}
