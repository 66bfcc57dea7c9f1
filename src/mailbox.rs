//! State shared between the interrupt handler and the application.
//!
//! A [`Mailbox`] is meant to live in a `static` so the application can drain
//! received bytes without access to the driver itself:
//!
//! ```
//! use nrf24_mailbox::Mailbox;
//!
//! static MAILBOX: Mailbox = Mailbox::new();
//!
//! fn poll() {
//!     let mut buf = [0u8; 4];
//!     if MAILBOX.available(2) >= buf.len() {
//!         MAILBOX.drain(2, &mut buf).unwrap();
//!     }
//! }
//! ```

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;

use crate::config::DataPipe;
use crate::error::BufferError;
use crate::mode::{Mode, ModeArbiter, TxOutcome};
use crate::ring_buffer::RingBuffer;
use crate::{PIPE_BUFFER_SIZE, PIPE_COUNT};

/// Receive queue of a single pipe.
///
/// The interrupt handler is the only producer, the application the only
/// consumer. Each operation runs inside one short critical section.
pub struct PipeBuffer<const N: usize> {
    inner: Mutex<RefCell<RingBuffer<N>>>,
}

impl<const N: usize> PipeBuffer<N> {
    /// Creates an empty queue.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(RingBuffer::new())),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut RingBuffer<N>) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.inner.borrow_ref_mut(cs)))
    }

    /// Stores as much of `bytes` as fits and returns how many were stored.
    /// Whatever does not fit is dropped.
    pub(crate) fn push(&self, bytes: &[u8]) -> usize {
        self.with(|ring| {
            bytes
                .iter()
                .take_while(|byte| ring.insert(**byte).is_ok())
                .count()
        })
    }

    /// Number of bytes waiting.
    pub fn len(&self) -> usize {
        self.with(|ring| ring.count())
    }

    /// `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if further bytes would be dropped.
    pub fn is_full(&self) -> bool {
        self.with(|ring| ring.is_full())
    }

    /// Removes exactly `buf.len()` bytes. Fails without removing anything if
    /// fewer are waiting.
    pub fn drain(&self, buf: &mut [u8]) -> Result<(), BufferError> {
        self.with(|ring| {
            check_available(buf.len(), ring.count())?;
            for slot in buf.iter_mut() {
                *slot = ring.remove()?;
            }
            Ok(())
        })
    }

    /// Copies the oldest `buf.len()` bytes without removing them.
    pub fn peek(&self, buf: &mut [u8]) -> Result<(), BufferError> {
        self.with(|ring| {
            check_available(buf.len(), ring.count())?;
            ring.start_peeking();
            for slot in buf.iter_mut() {
                *slot = ring.peek()?;
            }
            Ok(())
        })
    }

    pub(crate) fn reset(&self) {
        self.with(|ring| ring.reset())
    }
}

impl<const N: usize> core::fmt::Debug for PipeBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PipeBuffer")
            .field("len", &self.len())
            .field("capacity", &N)
            .finish()
    }
}

impl<const N: usize> Default for PipeBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_available(requested: usize, available: usize) -> Result<(), BufferError> {
    if requested > available {
        Err(BufferError::Underrun {
            requested,
            available,
        })
    } else {
        Ok(())
    }
}

/// Receive queues, mode flag and counters of one radio.
#[derive(Debug)]
pub struct Mailbox<const N: usize = PIPE_BUFFER_SIZE> {
    pipes: [PipeBuffer<N>; PIPE_COUNT],
    arbiter: ModeArbiter,
    // written from interrupt context only
    checksum_errors: AtomicU32,
    initialized: AtomicBool,
}

impl<const N: usize> Mailbox<N> {
    /// Creates an empty, uninitialized mailbox.
    pub const fn new() -> Self {
        Self {
            pipes: [
                PipeBuffer::new(),
                PipeBuffer::new(),
                PipeBuffer::new(),
                PipeBuffer::new(),
                PipeBuffer::new(),
                PipeBuffer::new(),
            ],
            arbiter: ModeArbiter::new(),
            checksum_errors: AtomicU32::new(0),
            initialized: AtomicBool::new(false),
        }
    }

    /// Capacity of each pipe's queue.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes waiting on `pipe`, 0 for an invalid pipe.
    pub fn available(&self, pipe: u8) -> usize {
        DataPipe::try_from(pipe)
            .map(|pipe| self.pipe(pipe).len())
            .unwrap_or(0)
    }

    /// Removes exactly `buf.len()` bytes received on `pipe`.
    ///
    /// # Errors
    /// [`BufferError::Underrun`] if fewer bytes are [`available`](Self::available);
    /// nothing is removed in that case.
    pub fn drain(&self, pipe: u8, buf: &mut [u8]) -> Result<(), BufferError> {
        self.pipe_checked(pipe)?.drain(buf)
    }

    /// Copies the oldest `buf.len()` bytes received on `pipe` without removing them.
    pub fn peek(&self, pipe: u8, buf: &mut [u8]) -> Result<(), BufferError> {
        self.pipe_checked(pipe)?.peek(buf)
    }

    /// Number of received frames dropped because of a checksum mismatch.
    pub fn checksum_error_count(&self) -> u32 {
        self.checksum_errors.load(Ordering::Relaxed)
    }

    /// Current transmit/receive mode.
    pub fn mode(&self) -> Mode {
        self.arbiter.mode()
    }

    /// How the most recent frame left the transmitting state.
    pub fn last_outcome(&self) -> TxOutcome {
        self.arbiter.last_outcome()
    }

    /// `true` once a driver has initialized the radio.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// The queue of `pipe`.
    pub fn pipe(&self, pipe: DataPipe) -> &PipeBuffer<N> {
        &self.pipes[pipe.index()]
    }

    fn pipe_checked(&self, pipe: u8) -> Result<&PipeBuffer<N>, BufferError> {
        DataPipe::try_from(pipe)
            .map(|pipe| self.pipe(pipe))
            .map_err(BufferError::InvalidPipe)
    }

    pub(crate) fn arbiter(&self) -> &ModeArbiter {
        &self.arbiter
    }

    pub(crate) fn record_checksum_error(&self) {
        let count = self.checksum_errors.load(Ordering::Relaxed);
        self.checksum_errors
            .store(count.wrapping_add(1), Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        self.initialized.store(false, Ordering::Release);
        self.checksum_errors.store(0, Ordering::Relaxed);
        for pipe in &self.pipes {
            pipe.reset();
        }
        self.arbiter.enter_receiving(TxOutcome::Idle);
    }

    pub(crate) fn set_initialized(&self) {
        self.initialized.store(true, Ordering::Release);
    }
}

impl<const N: usize> Default for Mailbox<N> {
    fn default() -> Self {
        Self::new()
    }
}
