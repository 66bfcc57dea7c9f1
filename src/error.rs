use core::fmt;

use crate::mode::TxOutcome;

/// Errors that can occur when sending and receiving data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferError<SPIError, PinError> {
    /// SPI communication error
    Spi(SPIError),
    /// Pin set error
    Pin(PinError),
    /// Communication error with module.
    /// Holds the CONFIG register value read back after initialization.
    CommunicationError(u8),
    /// Register address outside of the memory map. Nothing was sent.
    InvalidRegister(u8),
    /// Pipe index outside of `0..6`.
    InvalidPipe(u8),
    /// RF channel above 125.
    InvalidChannel(u8),
    /// Pipe mask with bits set above pipe 5.
    InvalidPipeMask(u8),
    /// More bytes than fit in a single frame were handed to the single-frame primitive.
    PayloadTooLarge(usize),
    /// A frame of a multi-frame write was not acknowledged, the rest of the
    /// write was abandoned.
    TxFailed(TxOutcome),
    /// Receive buffer error.
    Buffer(BufferError),
}

impl<SPIError, PinError> From<BufferError> for TransferError<SPIError, PinError> {
    fn from(e: BufferError) -> Self {
        TransferError::Buffer(e)
    }
}

/// Errors of the per-pipe receive buffers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// The buffer holds `N` bytes, the byte was not inserted.
    Full,
    /// Nothing left to remove or peek.
    Empty,
    /// Pipe index outside of `0..6`.
    InvalidPipe(u8),
    /// Asked for more bytes than the buffer holds. Nothing was removed.
    Underrun {
        /// Number of bytes asked for.
        requested: usize,
        /// Number of bytes in the buffer.
        available: usize,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Full => f.write_str("buffer full"),
            Self::Empty => f.write_str("buffer empty"),
            Self::InvalidPipe(pipe) => write!(f, "invalid pipe {}", pipe),
            Self::Underrun {
                requested,
                available,
            } => write!(f, "requested {} bytes, {} available", requested, available),
        }
    }
}

/// Reasons a received frame is rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Length byte larger than [`MAX_DATA_COUNT`](crate::MAX_DATA_COUNT).
    Length(u8),
    /// Checksum byte does not match the recomputed checksum.
    Checksum {
        /// Checksum computed over the received length and payload.
        expected: u8,
        /// Checksum byte found in the frame.
        received: u8,
    },
}
