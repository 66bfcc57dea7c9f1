//! Behavioural model of the radio for driver tests.
//!
//! Every SPI call made while CSN is low is treated as one complete command,
//! which matches how the driver talks to the chip. Transmission happens the
//! moment CE goes high in TX mode and its outcome is decided by [`Link`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use crate::hal::digital::{ErrorType as PinErrorType, OutputPin};
use crate::hal::spi::{ErrorType as SpiErrorType, SpiBus};
use crate::register::config_bits::{PRIM_RX, PWR_UP};
use crate::register::status_bits::{MAX_RT, RX_DR, TX_DS};
use crate::register::{Instruction, Register};
use crate::PAYLOAD_SIZE;

const FIFO_DEPTH: usize = 3;

/// What happens to a frame once it leaves the TX FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Link {
    /// The receiver acknowledges, TX_DS is raised.
    Ack,
    /// Retransmissions run out, MAX_RT is raised.
    Lost,
    /// The chip never reports back.
    Silent,
}

#[derive(Debug)]
pub(crate) struct Chip {
    regs: [u8; 0x1e],
    rx_addr_p0: [u8; 5],
    rx_addr_p1: [u8; 5],
    tx_addr: [u8; 5],
    rx_fifo: VecDeque<(u8, [u8; PAYLOAD_SIZE])>,
    tx_fifo: VecDeque<[u8; PAYLOAD_SIZE]>,
    ce: bool,
    csn_low: bool,
    pub(crate) link: Link,
    /// Frames that were acknowledged, in order.
    pub(crate) sent: Vec<[u8; PAYLOAD_SIZE]>,
    /// Number of times CE started a transmission.
    pub(crate) attempts: usize,
}

impl Chip {
    fn new() -> Self {
        let mut regs = [0; 0x1e];
        regs[Register::CONFIG.addr() as usize] = 0x08;
        regs[Register::EN_AA.addr() as usize] = 0x3f;
        regs[Register::EN_RXADDR.addr() as usize] = 0x03;
        regs[Register::SETUP_AW.addr() as usize] = 0x03;
        regs[Register::SETUP_RETR.addr() as usize] = 0x03;
        regs[Register::RF_CH.addr() as usize] = 0x02;
        regs[Register::RF_SETUP.addr() as usize] = 0x0e;
        regs[Register::RX_ADDR_P2.addr() as usize] = 0xc3;
        regs[Register::RX_ADDR_P3.addr() as usize] = 0xc4;
        regs[Register::RX_ADDR_P4.addr() as usize] = 0xc5;
        regs[Register::RX_ADDR_P5.addr() as usize] = 0xc6;
        Chip {
            regs,
            rx_addr_p0: [0xe7; 5],
            rx_addr_p1: [0xc2; 5],
            tx_addr: [0xe7; 5],
            rx_fifo: VecDeque::new(),
            tx_fifo: VecDeque::new(),
            ce: false,
            csn_low: false,
            link: Link::Ack,
            sent: Vec::new(),
            attempts: 0,
        }
    }

    /// Places a raw payload in the RX FIFO as if it arrived on `pipe`.
    pub(crate) fn inject_rx(&mut self, pipe: u8, raw: [u8; PAYLOAD_SIZE]) {
        self.rx_fifo.push_back((pipe, raw));
        self.regs[Register::STATUS.addr() as usize] |= RX_DR;
    }

    pub(crate) fn register(&self, register: Register) -> u8 {
        self.regs[register.addr() as usize]
    }

    pub(crate) fn rx_pending(&self) -> usize {
        self.rx_fifo.len()
    }

    pub(crate) fn ce(&self) -> bool {
        self.ce
    }

    fn status(&self) -> u8 {
        let flags = self.regs[Register::STATUS.addr() as usize] & (RX_DR | TX_DS | MAX_RT);
        let pipe = self.rx_fifo.front().map_or(0b111, |(pipe, _)| *pipe);
        let tx_full = (self.tx_fifo.len() >= FIFO_DEPTH) as u8;
        flags | (pipe << 1) | tx_full
    }

    fn fifo_status(&self) -> u8 {
        let rx_empty = self.rx_fifo.is_empty() as u8;
        let rx_full = (self.rx_fifo.len() >= FIFO_DEPTH) as u8;
        let tx_empty = self.tx_fifo.is_empty() as u8;
        let tx_full = (self.tx_fifo.len() >= FIFO_DEPTH) as u8;
        rx_empty | (rx_full << 1) | (tx_empty << 4) | (tx_full << 5)
    }

    fn read_register(&self, addr: u8, out: &mut [u8]) {
        let wide = match addr {
            0x0a => Some(&self.rx_addr_p0),
            0x0b => Some(&self.rx_addr_p1),
            0x10 => Some(&self.tx_addr),
            _ => None,
        };
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = match (wide, addr) {
                (Some(wide), _) => wide.get(i).copied().unwrap_or(0),
                (None, 0x07) => self.status(),
                (None, 0x17) => self.fifo_status(),
                (None, _) if i == 0 => self.regs[addr as usize],
                _ => 0,
            };
        }
    }

    fn write_register(&mut self, addr: u8, data: &[u8]) {
        let wide = match addr {
            0x0a => Some(&mut self.rx_addr_p0),
            0x0b => Some(&mut self.rx_addr_p1),
            0x10 => Some(&mut self.tx_addr),
            _ => None,
        };
        match (wide, data.first()) {
            (_, None) => {}
            (Some(wide), Some(_)) => {
                for (slot, byte) in wide.iter_mut().zip(data) {
                    *slot = *byte;
                }
            }
            (None, Some(value)) if addr == Register::STATUS.addr() => {
                self.regs[addr as usize] &= !(value & (RX_DR | TX_DS | MAX_RT));
            }
            (None, Some(value)) => self.regs[addr as usize] = *value,
        }
    }

    fn command(&mut self, words: &mut [u8]) {
        let Some((&mut opcode, data)) = words.split_first_mut() else {
            return;
        };
        let status = self.status();
        match opcode {
            0x00..=0x1f => self.read_register(opcode, data),
            0x20..=0x3f => self.write_register(opcode & 0x1f, data),
            op if op == Instruction::RRX.opcode() => {
                let raw = self.rx_fifo.pop_front().map(|(_, raw)| raw).unwrap_or([0; PAYLOAD_SIZE]);
                for (slot, byte) in data.iter_mut().zip(raw.iter()) {
                    *slot = *byte;
                }
            }
            op if op == Instruction::WTX.opcode() => {
                let mut raw = [0; PAYLOAD_SIZE];
                for (slot, byte) in raw.iter_mut().zip(data.iter()) {
                    *slot = *byte;
                }
                if self.tx_fifo.len() < FIFO_DEPTH {
                    self.tx_fifo.push_back(raw);
                }
            }
            op if op == Instruction::FTX.opcode() => self.tx_fifo.clear(),
            op if op == Instruction::FRX.opcode() => self.rx_fifo.clear(),
            _ => {}
        }
        words[0] = status;
    }

    fn set_ce(&mut self, high: bool) {
        let rising = high && !self.ce;
        self.ce = high;
        let config = self.register(Register::CONFIG);
        if rising && config & PWR_UP != 0 && config & PRIM_RX == 0 {
            self.transmit();
        }
    }

    fn transmit(&mut self) {
        self.attempts += 1;
        if self.link == Link::Silent {
            return;
        }
        let Some(raw) = self.tx_fifo.pop_front() else {
            return;
        };
        let status = Register::STATUS.addr() as usize;
        match self.link {
            Link::Ack => {
                self.sent.push(raw);
                self.regs[status] |= TX_DS;
            }
            _ => {
                // payload stays in the FIFO after MAX_RT
                self.tx_fifo.push_front(raw);
                self.regs[status] |= MAX_RT;
            }
        }
    }
}

pub(crate) type Shared = Rc<RefCell<Chip>>;

/// SPI side of the simulated chip.
#[derive(Debug)]
pub(crate) struct SimBus(Shared);

impl SpiErrorType for SimBus {
    type Error = Infallible;
}

impl SpiBus<u8> for SimBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0);
        self.transfer_in_place(words)
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        let mut copy = words.to_vec();
        self.transfer_in_place(&mut copy)
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        let mut copy = write.to_vec();
        copy.resize(core::cmp::max(read.len(), write.len()), 0);
        self.transfer_in_place(&mut copy)?;
        for (slot, byte) in read.iter_mut().zip(copy) {
            *slot = byte;
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        assert!(chip.csn_low, "SPI traffic with CSN high");
        chip.command(words);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Chip enable line of the simulated chip.
#[derive(Debug)]
pub(crate) struct SimCe(Shared);

/// Chip select line of the simulated chip.
#[derive(Debug)]
pub(crate) struct SimCsn(Shared);

impl PinErrorType for SimCe {
    type Error = Infallible;
}

impl OutputPin for SimCe {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().set_ce(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().set_ce(true);
        Ok(())
    }
}

impl PinErrorType for SimCsn {
    type Error = Infallible;
}

impl OutputPin for SimCsn {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().csn_low = true;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().csn_low = false;
        Ok(())
    }
}

/// IRQ line of the simulated chip, asserted while any status flag is set.
#[cfg(feature = "async")]
#[derive(Debug)]
pub(crate) struct SimIrq(pub(crate) Shared);

#[cfg(feature = "async")]
impl SimIrq {
    fn asserted(&self) -> bool {
        self.0.borrow().register(Register::STATUS) & (RX_DR | TX_DS | MAX_RT) != 0
    }
}

#[cfg(feature = "async")]
impl PinErrorType for SimIrq {
    type Error = Infallible;
}

#[cfg(feature = "async")]
impl embedded_hal_async::digital::Wait for SimIrq {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        assert!(!self.asserted(), "IRQ would never be released");
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        assert!(self.asserted(), "IRQ would never be asserted");
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        panic!("no edges on a simulated IRQ line")
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        panic!("no edges on a simulated IRQ line")
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        panic!("no edges on a simulated IRQ line")
    }
}

/// A powered-on chip with handles for the bus and both control lines.
pub(crate) fn chip(link: Link) -> (Shared, SimBus, SimCe, SimCsn) {
    let shared = Rc::new(RefCell::new(Chip::new()));
    shared.borrow_mut().link = link;
    (
        shared.clone(),
        SimBus(shared.clone()),
        SimCe(shared.clone()),
        SimCsn(shared),
    )
}
