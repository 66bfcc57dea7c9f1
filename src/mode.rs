//! Transmit/receive arbitration shared between task and interrupt context.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Half-duplex operating mode of the radio.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Powered up as primary receiver, CE high.
    Receiving,
    /// A frame has been handed to the TX FIFO and has not completed yet.
    Transmitting,
}

/// How a frame in flight left the transmitting state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TxOutcome {
    /// Nothing was in flight.
    Idle = 0,
    /// The chip reported the frame as sent.
    Sent = 1,
    /// The chip gave up after the configured number of retransmissions.
    MaxRetries = 2,
    /// No completion was reported within the transmit timeout, the radio
    /// was forced back into receive mode.
    TimedOut = 3,
}

impl From<u8> for TxOutcome {
    fn from(t: u8) -> Self {
        match t {
            1 => TxOutcome::Sent,
            2 => TxOutcome::MaxRetries,
            3 => TxOutcome::TimedOut,
            _ => TxOutcome::Idle,
        }
    }
}

/// The mode flag, the time it last switched to [`Mode::Transmitting`] and
/// how the last frame left that mode.
///
/// Only atomic loads and stores are used, so this works on cores without
/// compare-and-swap.
#[derive(Debug)]
pub struct ModeArbiter {
    transmitting: AtomicBool,
    tx_since_ms: AtomicU32,
    outcome: AtomicU8,
}

impl ModeArbiter {
    /// Starts out in [`Mode::Receiving`].
    pub const fn new() -> Self {
        Self {
            transmitting: AtomicBool::new(false),
            tx_since_ms: AtomicU32::new(0),
            outcome: AtomicU8::new(TxOutcome::Idle as u8),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        if self.transmitting.load(Ordering::Acquire) {
            Mode::Transmitting
        } else {
            Mode::Receiving
        }
    }

    pub(crate) fn enter_transmitting(&self, now_ms: u32) {
        // deadline first, so a reader that sees the flag also sees its start time
        self.tx_since_ms.store(now_ms, Ordering::Relaxed);
        self.outcome.store(TxOutcome::Idle as u8, Ordering::Relaxed);
        self.transmitting.store(true, Ordering::Release);
    }

    pub(crate) fn enter_receiving(&self, outcome: TxOutcome) {
        self.outcome.store(outcome as u8, Ordering::Relaxed);
        self.transmitting.store(false, Ordering::Release);
    }

    /// How the most recent frame left [`Mode::Transmitting`], [`TxOutcome::Idle`]
    /// while it is still in flight.
    pub fn last_outcome(&self) -> TxOutcome {
        if self.transmitting.load(Ordering::Acquire) {
            TxOutcome::Idle
        } else {
            TxOutcome::from(self.outcome.load(Ordering::Relaxed))
        }
    }

    /// Milliseconds spent transmitting, `None` while receiving.
    pub fn elapsed_ms(&self, now_ms: u32) -> Option<u32> {
        match self.mode() {
            Mode::Transmitting => {
                Some(now_ms.wrapping_sub(self.tx_since_ms.load(Ordering::Relaxed)))
            }
            Mode::Receiving => None,
        }
    }

    /// `true` if a frame has been in flight for at least `timeout_ms`.
    pub fn timed_out(&self, now_ms: u32, timeout_ms: u32) -> bool {
        self.elapsed_ms(now_ms)
            .map_or(false, |elapsed| elapsed >= timeout_ms)
    }
}

impl Default for ModeArbiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_receiving() {
        let arbiter = ModeArbiter::new();
        assert_eq!(arbiter.mode(), Mode::Receiving);
        assert_eq!(arbiter.elapsed_ms(1000), None);
        assert!(!arbiter.timed_out(u32::MAX, 0));
    }

    #[test]
    fn times_out_after_bound() {
        let arbiter = ModeArbiter::new();
        arbiter.enter_transmitting(100);
        assert_eq!(arbiter.mode(), Mode::Transmitting);
        assert!(!arbiter.timed_out(599, 500));
        assert!(arbiter.timed_out(600, 500));
        arbiter.enter_receiving(TxOutcome::TimedOut);
        assert!(!arbiter.timed_out(600, 500));
    }

    #[test]
    fn remembers_how_the_last_frame_ended() {
        let arbiter = ModeArbiter::new();
        assert_eq!(arbiter.last_outcome(), TxOutcome::Idle);
        arbiter.enter_transmitting(0);
        assert_eq!(arbiter.last_outcome(), TxOutcome::Idle);
        arbiter.enter_receiving(TxOutcome::MaxRetries);
        assert_eq!(arbiter.last_outcome(), TxOutcome::MaxRetries);
        // a new frame forgets the old outcome
        arbiter.enter_transmitting(10);
        arbiter.enter_receiving(TxOutcome::Sent);
        assert_eq!(arbiter.last_outcome(), TxOutcome::Sent);
    }

    #[test]
    fn survives_clock_wrap() {
        let arbiter = ModeArbiter::new();
        arbiter.enter_transmitting(u32::MAX - 99);
        assert_eq!(arbiter.elapsed_ms(100), Some(200));
        assert!(!arbiter.timed_out(100, 500));
        assert!(arbiter.timed_out(400, 500));
    }
}
