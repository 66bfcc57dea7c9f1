//! Fixed capacity byte queue with a non-destructive peek cursor.

use crate::error::BufferError;

/// Single-producer/single-consumer byte ring of capacity `N`.
///
/// Inserting into a full buffer and removing from an empty one are rejected
/// with a [`BufferError`] and leave the cursors untouched.
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize> {
    data: [u8; N],
    write: usize,
    read: usize,
    peek: usize,
    // bytes handed out by `peek` since the last `start_peeking`
    peeked: usize,
    count: usize,
}

impl<const N: usize> RingBuffer<N> {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self {
            data: [0; N],
            write: 0,
            read: 0,
            peek: 0,
            peeked: 0,
            count: 0,
        }
    }

    /// Clears all cursors and the element count.
    pub fn reset(&mut self) {
        self.write = 0;
        self.read = 0;
        self.peek = 0;
        self.peeked = 0;
        self.count = 0;
    }

    /// Appends `byte` at the write cursor.
    pub fn insert(&mut self, byte: u8) -> Result<(), BufferError> {
        if self.is_full() {
            return Err(BufferError::Full);
        }
        self.data[self.write] = byte;
        self.write = (self.write + 1) % N;
        self.count += 1;
        Ok(())
    }

    /// Takes the oldest byte.
    pub fn remove(&mut self) -> Result<u8, BufferError> {
        if self.is_empty() {
            return Err(BufferError::Empty);
        }
        let byte = self.data[self.read];
        self.read = (self.read + 1) % N;
        self.count -= 1;
        // a removal invalidates any peek in progress
        self.start_peeking();
        Ok(byte)
    }

    /// Rewinds the peek cursor to the oldest byte.
    pub fn start_peeking(&mut self) {
        self.peek = self.read;
        self.peeked = 0;
    }

    /// Returns the byte under the peek cursor and advances it, leaving the
    /// contents and count untouched.
    pub fn peek(&mut self) -> Result<u8, BufferError> {
        if self.peeked >= self.count {
            return Err(BufferError::Empty);
        }
        let byte = self.data[self.peek];
        self.peek = (self.peek + 1) % N;
        self.peeked += 1;
        Ok(byte)
    }

    /// Number of bytes stored.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Maximum number of bytes the buffer holds.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// `true` if there is nothing to remove.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `true` if an insert would be rejected.
    pub fn is_full(&self) -> bool {
        self.count == N
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
