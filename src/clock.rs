//! Millisecond time source used to bound the transmit busy-wait.

/// Monotonic millisecond counter. Wrapping around `u32::MAX` is expected.
///
/// Implemented for closures, so a HAL timer can be handed over directly:
///
/// ```
/// # use nrf24_mailbox::Clock;
/// let mut ticks = 0u32;
/// let mut clock = move || {
///     ticks += 1;
///     ticks
/// };
/// assert_eq!(clock.now_ms(), 1);
/// ```
pub trait Clock {
    /// Milliseconds since some fixed point in the past.
    fn now_ms(&mut self) -> u32;
}

impl<F> Clock for F
where
    F: FnMut() -> u32,
{
    fn now_ms(&mut self) -> u32 {
        self()
    }
}
