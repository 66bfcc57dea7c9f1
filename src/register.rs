//! Memory map and SPI instruction set of the nRF24L01.

/// Addressable registers of the chip.
#[allow(dead_code, non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Configuration register.
    CONFIG = 0x0,
    /// Enable auto acknowledgement.
    EN_AA = 0x1,
    /// Enabled RX addresses.
    EN_RXADDR = 0x2,
    /// Setup of address widths.
    SETUP_AW = 0x3,
    /// Setup of automatic retransmission.
    SETUP_RETR = 0x4,
    /// RF channel.
    RF_CH = 0x5,
    /// RF setup register.
    RF_SETUP = 0x6,
    /// Status register.
    STATUS = 0x7,
    /// Transmit observe register.
    OBSERVE_TX = 0x8,
    /// Received power detector.
    RPD = 0x9,
    /// Receive address data pipe 0.
    RX_ADDR_P0 = 0xa,
    /// Receive address data pipe 1.
    RX_ADDR_P1 = 0xb,
    /// Receive address data pipe 2.
    RX_ADDR_P2 = 0xc,
    /// Receive address data pipe 3.
    RX_ADDR_P3 = 0xd,
    /// Receive address data pipe 4.
    RX_ADDR_P4 = 0xe,
    /// Receive address data pipe 5.
    RX_ADDR_P5 = 0xf,
    /// Transmit address.
    TX_ADDR = 0x10,
    /// Payload width data pipe 0.
    RX_PW_P0 = 0x11,
    /// Payload width data pipe 1.
    RX_PW_P1 = 0x12,
    /// Payload width data pipe 2.
    RX_PW_P2 = 0x13,
    /// Payload width data pipe 3.
    RX_PW_P3 = 0x14,
    /// Payload width data pipe 4.
    RX_PW_P4 = 0x15,
    /// Payload width data pipe 5.
    RX_PW_P5 = 0x16,
    /// FIFO status register.
    FIFO_STATUS = 0x17,
    /// Enable dynamic payload length.
    DYNPD = 0x1c,
    /// Feature register.
    FEATURE = 0x1d,
}

impl Register {
    pub(crate) fn addr(&self) -> u8 {
        *self as u8
    }

    /// Registers holding a full address (up to 5 bytes, LSByte first).
    pub(crate) fn is_wide(&self) -> bool {
        matches!(self, Register::RX_ADDR_P0 | Register::RX_ADDR_P1 | Register::TX_ADDR)
    }

    pub(crate) fn rx_addr(pipe: u8) -> Option<Self> {
        if pipe < 6 {
            Self::try_from(Register::RX_ADDR_P0.addr() + pipe).ok()
        } else {
            None
        }
    }

    pub(crate) fn rx_payload_width(pipe: u8) -> Option<Self> {
        if pipe < 6 {
            Self::try_from(Register::RX_PW_P0.addr() + pipe).ok()
        } else {
            None
        }
    }
}

/// Validates a raw memory map address.
///
/// Everything outside `0x00..=0x17`, `0x1c` and `0x1d` is rejected before it
/// reaches the bus.
impl TryFrom<u8> for Register {
    type Error = u8;

    fn try_from(addr: u8) -> Result<Self, Self::Error> {
        use Register::*;
        let register = match addr {
            0x00 => CONFIG,
            0x01 => EN_AA,
            0x02 => EN_RXADDR,
            0x03 => SETUP_AW,
            0x04 => SETUP_RETR,
            0x05 => RF_CH,
            0x06 => RF_SETUP,
            0x07 => STATUS,
            0x08 => OBSERVE_TX,
            0x09 => RPD,
            0x0a => RX_ADDR_P0,
            0x0b => RX_ADDR_P1,
            0x0c => RX_ADDR_P2,
            0x0d => RX_ADDR_P3,
            0x0e => RX_ADDR_P4,
            0x0f => RX_ADDR_P5,
            0x10 => TX_ADDR,
            0x11 => RX_PW_P0,
            0x12 => RX_PW_P1,
            0x13 => RX_PW_P2,
            0x14 => RX_PW_P3,
            0x15 => RX_PW_P4,
            0x16 => RX_PW_P5,
            0x17 => FIFO_STATUS,
            0x1c => DYNPD,
            0x1d => FEATURE,
            other => return Err(other),
        };
        Ok(register)
    }
}

#[derive(Clone, Copy)]
pub(crate) enum Instruction {
    /// Read registers
    RR = 0b0000_0000,
    /// Write registers
    /// Last 5 bits are the Memory Map Adress
    WR = 0b0010_0000,
    /// Read RX-payload, used in RX mode.
    RRX = 0b0110_0001,
    /// Write TX-payload, used in TX mode.
    WTX = 0b1010_0000,
    /// Flush TX FIFO, used in TX mode.
    FTX = 0b1110_0001,
    /// Flush RX FIFO, used in RX mode.
    FRX = 0b1110_0010,
    /// No operation. Might be used to read STATUS register.
    NOP = 0b1111_1111,
}

impl Instruction {
    pub(crate) fn opcode(&self) -> u8 {
        *self as u8
    }
}

/// CONFIG register bits.
pub(crate) mod config_bits {
    pub const PRIM_RX: u8 = 1 << 0;
    pub const PWR_UP: u8 = 1 << 1;
    pub const CRCO: u8 = 1 << 2;
    pub const EN_CRC: u8 = 1 << 3;
}

/// STATUS register bits.
pub(crate) mod status_bits {
    pub const TX_FULL: u8 = 1 << 0;
    pub const MAX_RT: u8 = 1 << 4;
    pub const TX_DS: u8 = 1 << 5;
    pub const RX_DR: u8 = 1 << 6;
}
