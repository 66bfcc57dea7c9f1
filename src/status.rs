//! Snapshots of the STATUS and FIFO_STATUS registers.

use crate::register::status_bits::{MAX_RT, RX_DR, TX_DS, TX_FULL};
use core::fmt;

/// Content of the STATUS register, clocked out with every command.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Status(u8);

/// Content of the FIFO_STATUS register.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct FIFOStatus(u8);

/// Classification of a [`Status`] snapshot, in the order the interrupt
/// handler looks at the flags.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusEvent {
    /// The frame in flight was sent (and acknowledged, if enabled).
    TransmitComplete,
    /// The frame in flight exhausted its retransmissions.
    MaxRetransmits,
    /// A frame is waiting in the RX FIFO. Holds the raw pipe number, which
    /// may lie outside of `0..6`.
    DataReady(u8),
    /// None of the above.
    Idle,
}

impl Status {
    /// Bit 7 always reads as 0 on a healthy bus.
    pub fn is_valid(&self) -> bool {
        (self.0 & (1 << 7)) == 0
    }
    /// Data ready RX FIFO interrupt.
    pub fn data_ready(&self) -> bool {
        (self.0 & RX_DR) != 0
    }
    /// Data sent TX FIFO interrupt.
    pub fn data_sent(&self) -> bool {
        (self.0 & TX_DS) != 0
    }
    /// Maximum number of retransmits interrupt.
    pub fn reached_max_retries(&self) -> bool {
        (self.0 & MAX_RT) != 0
    }
    /// Pipe number of the payload at the head of the RX FIFO.
    /// `0b111` means the RX FIFO is empty.
    pub fn pipe_number(&self) -> u8 {
        (self.0 >> 1) & 0b111
    }
    /// TX FIFO full flag.
    pub fn tx_full(&self) -> bool {
        (self.0 & TX_FULL) != 0
    }
    /// Raw register value.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Classifies the snapshot. Transmit flags take precedence over received data.
    pub fn event(&self) -> StatusEvent {
        if self.data_sent() {
            StatusEvent::TransmitComplete
        } else if self.reached_max_retries() {
            StatusEvent::MaxRetransmits
        } else if self.data_ready() {
            StatusEvent::DataReady(self.pipe_number())
        } else {
            StatusEvent::Idle
        }
    }
}

impl FIFOStatus {
    /// Returns `true` if there are no available locations in transmission queue
    pub fn tx_full(&self) -> bool {
        self.0 & (1 << 5) != 0
    }

    /// Returns `true` if the transmission queue is empty
    pub fn tx_empty(&self) -> bool {
        self.0 & (1 << 4) != 0
    }

    /// Returns `true` if there are no available locations in receive queue
    pub fn rx_full(&self) -> bool {
        self.0 & (1 << 1) != 0
    }

    /// Returns `true` if the receive queue is empty
    pub fn rx_empty(&self) -> bool {
        self.0 & 1 != 0
    }
}

impl From<u8> for Status {
    fn from(t: u8) -> Self {
        Status(t)
    }
}

impl From<u8> for FIFOStatus {
    fn from(t: u8) -> Self {
        FIFOStatus(t)
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("Invalid status. Something went wrong during communication with nrf24l01");
        }
        f.debug_struct("Status")
            .field("data_ready", &self.data_ready())
            .field("data_sent", &self.data_sent())
            .field("reached_max_retries", &self.reached_max_retries())
            .field("pipe_number", &self.pipe_number())
            .field("tx_full", &self.tx_full())
            .finish()
    }
}

impl fmt::Debug for FIFOStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FIFOStatus")
            .field("tx_full", &self.tx_full())
            .field("tx_empty", &self.tx_empty())
            .field("rx_full", &self.rx_full())
            .field("rx_empty", &self.rx_empty())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Status {{ data_ready: {}, data_sent: {}, max_retries: {}, pipe: {}, tx_full: {} }}",
            self.data_ready(),
            self.data_sent(),
            self.reached_max_retries(),
            self.pipe_number(),
            self.tx_full()
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FIFOStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "FIFOStatus({=u8:#04x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transmit_flags_win() {
        assert_eq!(Status::from(TX_DS | RX_DR).event(), StatusEvent::TransmitComplete);
        assert_eq!(Status::from(MAX_RT | RX_DR).event(), StatusEvent::MaxRetransmits);
    }

    #[test]
    fn data_ready_carries_pipe() {
        let status = Status::from(RX_DR | (2 << 1));
        assert_eq!(status.event(), StatusEvent::DataReady(2));
        let status = Status::from(RX_DR | (0b111 << 1));
        assert_eq!(status.event(), StatusEvent::DataReady(7));
    }

    #[test]
    fn idle() {
        // pipe field reads 0b111 when the RX FIFO is empty
        assert_eq!(Status::from(0b0000_1110).event(), StatusEvent::Idle);
        assert!(Status::from(0x0e).is_valid());
        assert!(!Status::from(0xff).is_valid());
    }
}
