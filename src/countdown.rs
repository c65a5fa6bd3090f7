//! Round countdown driven by an injected tick source.
//!
//! The countdown never reads the clock itself. A [`TickSource`] is armed when
//! the countdown starts and reports how many whole periods have elapsed; the
//! event loop calls [`Countdown::poll`] to turn those into ticks. Tests use
//! [`ManualTicks`] and advance time by hand.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// Fixed tick period of every countdown.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A cancellable periodic task.
pub trait TickSource {
    /// Start (or restart) firing every `period`.
    fn arm(&mut self, period: Duration);
    /// Stop firing. Disarming an idle source is a no-op.
    fn disarm(&mut self);
    fn is_armed(&self) -> bool;
    /// Whole periods elapsed since the last call. Always 0 while disarmed.
    fn take_due(&mut self) -> u32;
}

/// Tick source backed by the monotonic clock
#[derive(Debug, Clone, Default)]
pub struct WallClockTicks {
    period: Duration,
    next_due: Option<Instant>,
}

impl WallClockTicks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickSource for WallClockTicks {
    fn arm(&mut self, period: Duration) {
        self.period = period;
        self.next_due = Some(Instant::now() + period);
    }

    fn disarm(&mut self) {
        self.next_due = None;
    }

    fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    fn take_due(&mut self) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };
        let now = Instant::now();
        let mut fired = 0;
        while due <= now {
            fired += 1;
            due += self.period;
        }
        self.next_due = Some(due);
        fired
    }
}

/// Fake clock for tests: periods only elapse through [`ManualTicks::advance`].
#[derive(Debug, Clone, Default)]
pub struct ManualTicks {
    armed: bool,
    pending: u32,
    arm_count: u32,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `periods` ticks elapse. Ignored while disarmed.
    pub fn advance(&mut self, periods: u32) {
        if self.armed {
            self.pending += periods;
        }
    }

    /// How many times the source has been armed.
    pub fn arm_count(&self) -> u32 {
        self.arm_count
    }
}

impl TickSource for ManualTicks {
    fn arm(&mut self, _period: Duration) {
        self.armed = true;
        self.pending = 0;
        self.arm_count += 1;
    }

    fn disarm(&mut self) {
        self.armed = false;
        self.pending = 0;
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    fn take_due(&mut self) -> u32 {
        std::mem::take(&mut self.pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Ticked { remaining: u32 },
    /// Fired once per start, on the tick that reaches zero.
    Expired,
}

#[derive(Debug, Clone)]
pub struct Countdown<T: TickSource> {
    duration: u32,
    remaining: u32,
    running: bool,
    expired: bool,
    ticks: T,
}

impl<T: TickSource> Countdown<T> {
    /// A stopped countdown of `duration_secs` (at least one second).
    pub fn new(duration_secs: u32, ticks: T) -> Self {
        let duration = duration_secs.max(1);
        Self {
            duration,
            remaining: duration,
            running: false,
            expired: false,
            ticks,
        }
    }

    /// Restart from the full duration, cancelling any run in progress.
    pub fn start(&mut self) {
        self.stop();
        self.remaining = self.duration;
        self.expired = false;
        self.running = true;
        self.ticks.arm(TICK_PERIOD);
        debug!(duration = self.duration, "countdown started");
    }

    /// Cancel the countdown. Safe to call any number of times.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.ticks.disarm();
            debug!(remaining = self.remaining, "countdown stopped");
        }
    }

    /// Advance by one period.
    pub fn tick(&mut self) -> Option<CountdownEvent> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        trace!(remaining = self.remaining, "countdown tick");
        if self.remaining == 0 {
            self.running = false;
            self.expired = true;
            self.ticks.disarm();
            debug!("countdown expired");
            Some(CountdownEvent::Expired)
        } else {
            Some(CountdownEvent::Ticked {
                remaining: self.remaining,
            })
        }
    }

    /// Apply every tick the source reports as due. Returns the last event.
    pub fn poll(&mut self) -> Option<CountdownEvent> {
        let due = self.ticks.take_due();
        let mut last = None;
        for _ in 0..due {
            match self.tick() {
                Some(event) => last = Some(event),
                None => break,
            }
        }
        last
    }

    /// Change the duration used by the next `start`. A running countdown
    /// keeps going but never has more left than the new duration.
    pub fn set_duration(&mut self, duration_secs: u32) {
        self.duration = duration_secs.max(1);
        if self.running {
            self.remaining = self.remaining.min(self.duration);
        } else {
            self.remaining = self.duration;
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_expired(&self) -> bool {
        self.expired
    }

    /// Remaining share of the duration, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        (self.remaining as f64 / self.duration as f64).clamp(0.0, 1.0)
    }

    pub fn ticks(&self) -> &T {
        &self.ticks
    }

    pub fn ticks_mut(&mut self) -> &mut T {
        &mut self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_ticks_expire_once() {
        let mut countdown = Countdown::new(5, ManualTicks::new());
        countdown.start();

        let events: Vec<_> = (0..5).filter_map(|_| countdown.tick()).collect();
        assert_eq!(
            events.iter().filter(|e| **e == CountdownEvent::Expired).count(),
            1
        );
        assert_eq!(events.last(), Some(&CountdownEvent::Expired));
        assert_eq!(countdown.remaining(), 0);
        assert!(!countdown.is_running());

        // Further ticks are ignored and never go negative
        assert_eq!(countdown.tick(), None);
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn test_shrinking_duration_caps_running_countdown() {
        let mut countdown = Countdown::new(10, ManualTicks::new());
        countdown.start();
        countdown.tick();
        countdown.set_duration(4);
        assert!(countdown.is_running());
        assert_eq!(countdown.remaining(), 4);
        assert_eq!(countdown.progress(), 1.0);

        // Growing it leaves the run alone
        countdown.set_duration(20);
        assert_eq!(countdown.remaining(), 4);

        countdown.stop();
        countdown.set_duration(6);
        assert_eq!(countdown.remaining(), 6);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut countdown = Countdown::new(3, ManualTicks::new());
        countdown.start();
        countdown.stop();
        countdown.stop();
        assert!(!countdown.is_running());
        assert!(!countdown.ticks().is_armed());
        assert_eq!(countdown.tick(), None);
        assert!(!countdown.has_expired());
    }

    #[test]
    fn test_stop_after_expiry_is_noop() {
        let mut countdown = Countdown::new(1, ManualTicks::new());
        countdown.start();
        assert_eq!(countdown.tick(), Some(CountdownEvent::Expired));
        countdown.stop();
        assert!(countdown.has_expired());
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn test_progress_is_monotonic_and_clamped() {
        let mut countdown = Countdown::new(4, ManualTicks::new());
        assert_eq!(countdown.progress(), 1.0);
        countdown.start();
        let mut last = countdown.progress();
        while countdown.tick().is_some() {
            let p = countdown.progress();
            assert!(p <= last);
            assert!((0.0..=1.0).contains(&p));
            last = p;
        }
        assert_eq!(countdown.progress(), 0.0);
    }

    #[test]
    fn test_restart_resets_remaining() {
        let mut countdown = Countdown::new(10, ManualTicks::new());
        countdown.start();
        countdown.tick();
        countdown.tick();
        assert_eq!(countdown.remaining(), 8);

        countdown.start();
        assert_eq!(countdown.remaining(), 10);
        assert!(countdown.is_running());
        assert_eq!(countdown.ticks().arm_count(), 2);
    }

    #[test]
    fn test_poll_consumes_due_ticks() {
        let mut countdown = Countdown::new(5, ManualTicks::new());
        countdown.start();

        countdown.ticks_mut().advance(2);
        assert_eq!(countdown.poll(), Some(CountdownEvent::Ticked { remaining: 3 }));
        assert_eq!(countdown.poll(), None);

        // Overshooting the duration still expires exactly once
        countdown.ticks_mut().advance(10);
        assert_eq!(countdown.poll(), Some(CountdownEvent::Expired));
        assert_eq!(countdown.remaining(), 0);
        countdown.ticks_mut().advance(1);
        assert_eq!(countdown.poll(), None);
    }

    #[test]
    fn test_zero_duration_is_raised_to_one_second() {
        let countdown = Countdown::new(0, ManualTicks::new());
        assert_eq!(countdown.duration(), 1);
    }

    #[test]
    fn test_wall_clock_reports_nothing_while_disarmed() {
        let mut ticks = WallClockTicks::new();
        assert_eq!(ticks.take_due(), 0);
        ticks.arm(Duration::from_secs(60));
        assert!(ticks.is_armed());
        assert_eq!(ticks.take_due(), 0);
        ticks.disarm();
        assert!(!ticks.is_armed());
    }

    #[test]
    fn test_wall_clock_fires_after_period() {
        let mut ticks = WallClockTicks::new();
        ticks.arm(Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(12));
        assert!(ticks.take_due() >= 2);
    }
}
