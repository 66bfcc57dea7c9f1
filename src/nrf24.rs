//! nRF24 implementations.

use crate::clock::Clock;
use crate::config::{AddressWidth, AutoRetransmission, DataPipe, DataRate, NrfConfig, PALevel, PipeMask};
use crate::dump::RegisterDump;
use crate::error::{BufferError, TransferError};
use crate::frame::{fragments, Frame};
use crate::hal::delay::DelayNs;
use crate::hal::digital::OutputPin;
use crate::hal::spi::SpiBus;
use crate::mailbox::Mailbox;
use crate::mode::{Mode, TxOutcome};
use crate::register::config_bits::{PRIM_RX, PWR_UP};
use crate::register::status_bits::{MAX_RT, RX_DR, TX_DS};
use crate::register::{Instruction, Register};
use crate::status::{FIFOStatus, Status, StatusEvent};
use crate::{PAYLOAD_SIZE, PIPE_BUFFER_SIZE};
use core::fmt;

/// What [`Nrf24l01::on_interrupt()`] did with the interrupt.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The frame in flight completed (or was abandoned) and the radio is
    /// back in receive mode.
    Transmitted(TxOutcome),
    /// A valid frame was received.
    Received {
        /// Pipe the frame arrived on.
        pipe: DataPipe,
        /// Payload bytes stored in the pipe's buffer.
        stored: usize,
        /// Payload bytes dropped because the pipe's buffer was full.
        dropped: usize,
    },
    /// A frame failed its checksum and was discarded as a whole.
    Corrupted(DataPipe),
    /// The chip reported data on a pipe number outside of `0..6`.
    SpuriousPipe(u8),
    /// Nothing to do.
    Idle,
}

/// The nRF24L01 driver type. This struct encapsulates all functionality.
///
/// The driver owns the SPI bus and the two output lines, the per-pipe
/// receive buffers live in a [`Mailbox`] it borrows. The application reads
/// received bytes through the mailbox (or the driver), the radio's interrupt
/// line must end up calling [`on_interrupt()`](#method.on_interrupt).
///
/// For the different configuration options see: [`NrfConfig`].
///
/// # Examples
/// ```ignore
/// use nrf24_mailbox::{Mailbox, Nrf24l01};
/// use nrf24_mailbox::config::NrfConfig;
///
/// static MAILBOX: Mailbox = Mailbox::new();
///
/// let mut nrf24 = Nrf24l01::new(spi, ce, ncs, || timer.millis(), &MAILBOX, &mut delay, NrfConfig::default())?;
/// nrf24.set_tx_address(b"Node1")?;
/// nrf24.write(b"a message longer than a single thirty byte frame")?;
/// ```
pub struct Nrf24l01<'a, SPI, CE, NCS, CLK, const N: usize = PIPE_BUFFER_SIZE> {
    spi: SPI,
    // SPI Chip Select Pin, active low
    ncs: NCS,
    // Chip Enable Pin
    ce: CE,
    clock: CLK,
    mailbox: &'a Mailbox<N>,
    config: NrfConfig,
    // Transmission buffer, opcode followed by up to a full payload
    tx_buf: [u8; PAYLOAD_SIZE + 1],
}

impl<'a, SPI, CE, NCS, CLK, SPIErr, PinErr, const N: usize> Nrf24l01<'a, SPI, CE, NCS, CLK, N>
where
    SPI: SpiBus<u8, Error = SPIErr>,
    NCS: OutputPin<Error = PinErr>,
    CE: OutputPin<Error = PinErr>,
    CLK: Clock,
{
    const MAX_ADDR_WIDTH: usize = 5;

    /// Creates a new nrf24l01 driver and runs [`init()`](#method.init) with
    /// the given config, leaving the radio listening on the configured pipes.
    pub fn new<D: DelayNs>(
        spi: SPI,
        ce: CE,
        ncs: NCS,
        clock: CLK,
        mailbox: &'a Mailbox<N>,
        delay: &mut D,
        config: NrfConfig,
    ) -> Result<Self, TransferError<SPIErr, PinErr>> {
        let mut chip = Nrf24l01 {
            spi,
            ncs,
            ce,
            clock,
            mailbox,
            config,
            tx_buf: [0; PAYLOAD_SIZE + 1],
        };
        chip.init(delay, config)?;
        Ok(chip)
    }

    /// Resets the error counter, the pipe buffers and the chip's registers,
    /// then powers the chip up in receive mode.
    ///
    /// Every pipe receives static payloads of [`PAYLOAD_SIZE`] bytes.
    pub fn init<D: DelayNs>(
        &mut self,
        delay: &mut D,
        config: NrfConfig,
    ) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.config = config;
        self.mailbox.reset();

        // Set the output pins to the correct levels
        self.set_ce_low()?;
        self.set_ncs_high()?;

        // Technically we require 4.5ms + 14us as a worst case after power on.
        delay.delay_ms(5);

        self.set_retries(config.auto_retry)?;
        self.setup_rf(config.data_rate, config.pa_level)?;
        self.set_address_width(config.addr_width)?;
        self.set_channel(config.channel)?;

        for pipe in 0..6 {
            if let Some(register) = Register::rx_payload_width(pipe) {
                self.write_register(register, PAYLOAD_SIZE as u8)?;
            }
        }
        self.write_register(Register::EN_RXADDR, config.rx_pipes.bits() & PipeMask::ALL.bits())?;

        self.flush_tx()?;
        self.flush_rx()?;
        self.write_register(Register::STATUS, TX_DS | MAX_RT | RX_DR)?;

        self.reset_to_rx(TxOutcome::Idle)?;
        // Power up settling time
        delay.delay_ms(5);

        let config_reg = self.read_register(Register::CONFIG)?;
        if config_reg != self.rx_config() {
            return Err(TransferError::CommunicationError(config_reg));
        }

        self.mailbox.set_initialized();
        #[cfg(feature = "defmt")]
        defmt::debug!("nrf24: initialized on channel {}", config.channel);
        Ok(())
    }

    /// Checks if the chip is connected to the SPI bus.
    pub fn is_connected(&mut self) -> Result<bool, TransferError<SPIErr, PinErr>> {
        let setup = self.read_register(Register::SETUP_AW)?;
        Ok((1..=3).contains(&setup))
    }

    /// Sends `data` of any length, split into frames of
    /// [`MAX_DATA_COUNT`](crate::MAX_DATA_COUNT) bytes.
    ///
    /// Frames go out one after the other, each waiting for the previous one
    /// to complete. An empty `data` sends a single empty frame. Like
    /// [`write_payload()`](#method.write_payload), this returns while the
    /// last frame is still in flight.
    ///
    /// # Errors
    /// [`TransferError::TxFailed`] as soon as a frame other than the last one
    /// is not acknowledged; the remaining frames are not sent.
    pub fn write(&mut self, data: &[u8]) -> Result<(), TransferError<SPIErr, PinErr>> {
        let mut frames = fragments(data).peekable();
        while let Some(frame) = frames.next() {
            self.write_frame(&frame)?;
            if frames.peek().is_some() {
                self.wait_transmit_complete()?;
                match self.mailbox.last_outcome() {
                    TxOutcome::Sent => {}
                    outcome => return Err(TransferError::TxFailed(outcome)),
                }
            }
        }
        Ok(())
    }

    /// Sends a single frame holding at most
    /// [`MAX_DATA_COUNT`](crate::MAX_DATA_COUNT) bytes.
    ///
    /// Blocks while a previous frame is still in flight, bounded by the
    /// transmit timeout. Returns once the frame is in the TX FIFO and the
    /// radio is transmitting; completion is picked up by the interrupt
    /// handler or the next write.
    ///
    /// # Errors
    /// [`TransferError::PayloadTooLarge`] if `data` does not fit in one frame.
    pub fn write_payload(&mut self, data: &[u8]) -> Result<(), TransferError<SPIErr, PinErr>> {
        let frame = Frame::new(data).ok_or(TransferError::PayloadTooLarge(data.len()))?;
        self.write_frame(&frame)
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.wait_transmit_complete()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("nrf24: sending {}", frame);

        self.set_ce_low()?;
        self.power_up_tx()?;
        self.flush_tx()?;

        self.tx_buf[0] = Instruction::WTX.opcode();
        self.tx_buf[1..].copy_from_slice(&frame.encode(self.config.filler));
        self.set_ncs_low()?;
        self.spi_write_tx_buf(PAYLOAD_SIZE)?;
        self.set_ncs_high()?;

        self.set_ce_high()
    }

    /// Busy-waits until the frame in flight completes.
    ///
    /// The wait is bounded: once the transmit timeout has elapsed the radio is
    /// forced back into receive mode and [`TxOutcome::TimedOut`] is returned.
    /// Returns [`TxOutcome::Idle`] if nothing was in flight when called.
    pub fn wait_transmit_complete(&mut self) -> Result<TxOutcome, TransferError<SPIErr, PinErr>> {
        if self.mailbox.mode() == Mode::Receiving {
            return Ok(TxOutcome::Idle);
        }
        loop {
            let status = self.status()?;
            // finished by the interrupt handler in the meantime
            if self.mailbox.mode() == Mode::Receiving {
                return Ok(self.mailbox.last_outcome());
            }
            if status.data_sent() {
                self.power_up_rx(TxOutcome::Sent)?;
                return Ok(TxOutcome::Sent);
            }
            if status.reached_max_retries() {
                self.power_up_rx(TxOutcome::MaxRetries)?;
                return Ok(TxOutcome::MaxRetries);
            }
            if self.recover_timed_out_tx()? {
                return Ok(TxOutcome::TimedOut);
            }
        }
    }

    /// Checks whether a received frame is waiting in the chip.
    ///
    /// While transmitting this always reports `false`; if the frame in flight
    /// has exceeded the transmit timeout the radio is returned to receive
    /// mode first.
    pub fn data_ready(&mut self) -> Result<bool, TransferError<SPIErr, PinErr>> {
        if self.mailbox.mode() == Mode::Transmitting {
            self.recover_timed_out_tx()?;
            return Ok(false);
        }
        Ok(self.status()?.data_ready())
    }

    /// Interrupt entry point, call on a falling edge of the IRQ line.
    ///
    /// Reads the status once and either returns the radio to receive mode
    /// after a transmission, or moves a received frame into its pipe's
    /// buffer. Frames failing their checksum are dropped whole and counted,
    /// bytes that do not fit in a full buffer are dropped.
    ///
    /// One condition is handled per call, transmit completion first. The IRQ
    /// line stays low while a flag is pending, so call again until it returns
    /// [`Event::Idle`] when the line is still asserted.
    pub fn on_interrupt(&mut self) -> Result<Event, TransferError<SPIErr, PinErr>> {
        let status = self.status()?;
        match status.event() {
            StatusEvent::TransmitComplete => {
                self.power_up_rx(TxOutcome::Sent)?;
                Ok(Event::Transmitted(TxOutcome::Sent))
            }
            StatusEvent::MaxRetransmits => {
                self.power_up_rx(TxOutcome::MaxRetries)?;
                Ok(Event::Transmitted(TxOutcome::MaxRetries))
            }
            StatusEvent::DataReady(pipe) => self.receive(pipe),
            StatusEvent::Idle => {
                if self.recover_timed_out_tx()? {
                    Ok(Event::Transmitted(TxOutcome::TimedOut))
                } else {
                    Ok(Event::Idle)
                }
            }
        }
    }

    fn receive(&mut self, pipe: u8) -> Result<Event, TransferError<SPIErr, PinErr>> {
        let pipe = match DataPipe::try_from(pipe) {
            Ok(pipe) => pipe,
            Err(pipe) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("nrf24: data ready on invalid pipe {}", pipe);
                self.write_register(Register::STATUS, RX_DR)?;
                return Ok(Event::SpuriousPipe(pipe));
            }
        };

        let raw = self.read_rx_payload()?;
        self.flush_rx()?;
        self.write_register(Register::STATUS, RX_DR)?;

        match Frame::decode(&raw) {
            Ok(frame) => {
                let payload = frame.payload();
                let stored = self.mailbox.pipe(pipe).push(payload);
                let dropped = payload.len() - stored;
                #[cfg(feature = "defmt")]
                if dropped > 0 {
                    defmt::warn!("nrf24: pipe {} full, dropped {} bytes", pipe, dropped);
                }
                Ok(Event::Received {
                    pipe,
                    stored,
                    dropped,
                })
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("nrf24: discarded frame on pipe {}: {}", pipe, _e);
                self.mailbox.record_checksum_error();
                Ok(Event::Corrupted(pipe))
            }
        }
    }

    /// Forces the radio back into receive mode if the frame in flight has
    /// exceeded the transmit timeout. Returns `true` if it did.
    fn recover_timed_out_tx(&mut self) -> Result<bool, TransferError<SPIErr, PinErr>> {
        let now = self.clock.now_ms();
        if !self.mailbox.arbiter().timed_out(now, self.config.tx_timeout_ms) {
            return Ok(false);
        }
        #[cfg(feature = "defmt")]
        defmt::warn!("nrf24: transmission timed out, back to RX");
        self.reset_to_rx(TxOutcome::TimedOut)?;
        Ok(true)
    }

    /// Current transmit/receive mode.
    pub fn mode(&self) -> Mode {
        self.mailbox.mode()
    }

    /// The mailbox holding the receive buffers.
    pub fn mailbox(&self) -> &'a Mailbox<N> {
        self.mailbox
    }

    /// Bytes waiting on `pipe`, 0 for an invalid pipe.
    pub fn available(&self, pipe: u8) -> usize {
        self.mailbox.available(pipe)
    }

    /// Removes exactly `buf.len()` bytes received on `pipe`.
    ///
    /// # Errors
    /// Fails without removing anything if fewer bytes are
    /// [`available`](#method.available).
    pub fn drain(&self, pipe: u8, buf: &mut [u8]) -> Result<(), BufferError> {
        self.mailbox.drain(pipe, buf)
    }

    /// Copies the oldest `buf.len()` bytes received on `pipe` without removing them.
    pub fn peek(&self, pipe: u8, buf: &mut [u8]) -> Result<(), BufferError> {
        self.mailbox.peek(pipe, buf)
    }

    /// Number of received frames dropped because of a checksum mismatch.
    pub fn checksum_error_count(&self) -> u32 {
        self.mailbox.checksum_error_count()
    }

    /// Sets the receive address of `pipe`.
    ///
    /// Pipes 0 and 1 take a full address (LSByte first, at most 5 bytes).
    /// Pipes 2 to 5 only take their least significant byte, the rest is
    /// shared with pipe 1, so only `addr[0]` is written.
    ///
    /// # Examples
    /// ```ignore
    /// chip.set_rx_pipe_address(1, b"Node1")?;
    /// chip.set_rx_pipe_address(2, b"2")?;
    /// ```
    pub fn set_rx_pipe_address(
        &mut self,
        pipe: u8,
        mut addr: &[u8],
    ) -> Result<(), TransferError<SPIErr, PinErr>> {
        let register = Register::rx_addr(pipe).ok_or(TransferError::InvalidPipe(pipe))?;
        if addr.len() > Self::MAX_ADDR_WIDTH {
            addr = &addr[0..Self::MAX_ADDR_WIDTH];
        }
        match addr.first() {
            None => Ok(()),
            Some(lsb) if !register.is_wide() => self.write_register(register, *lsb),
            Some(_) => self.write_register(register, addr),
        }
    }

    /// Sets the address frames are sent to (LSByte first, at most 5 bytes).
    pub fn set_tx_address(&mut self, mut addr: &[u8]) -> Result<(), TransferError<SPIErr, PinErr>> {
        if addr.len() > Self::MAX_ADDR_WIDTH {
            addr = &addr[0..Self::MAX_ADDR_WIDTH];
        }
        self.write_register(Register::TX_ADDR, addr)
    }

    /// Enables reception on every pipe in `pipes`, leaving the others as they are.
    pub fn enable_pipes<T: Into<PipeMask>>(&mut self, pipes: T) -> Result<(), TransferError<SPIErr, PinErr>> {
        let pipes = Self::checked_mask(pipes.into())?;
        let enabled = self.read_register(Register::EN_RXADDR)?;
        self.write_register(Register::EN_RXADDR, enabled | pipes)
    }

    /// Disables reception on every pipe in `pipes`, leaving the others as they are.
    pub fn disable_pipes<T: Into<PipeMask>>(&mut self, pipes: T) -> Result<(), TransferError<SPIErr, PinErr>> {
        let pipes = Self::checked_mask(pipes.into())?;
        let enabled = self.read_register(Register::EN_RXADDR)?;
        self.write_register(Register::EN_RXADDR, enabled & !pipes)
    }

    fn checked_mask(pipes: PipeMask) -> Result<u8, TransferError<SPIErr, PinErr>> {
        if pipes.is_valid() {
            Ok(pipes.bits())
        } else {
            Err(TransferError::InvalidPipeMask(pipes.bits()))
        }
    }

    /// Setup of automatic retransmission.
    ///
    /// # Examples
    /// ```ignore
    /// // Set the auto transmit delay to ((5 + 1) * 250) + 86 = 1586µs
    /// // and the retransmit count to 15.
    /// nrf24l01.set_retries((5, 15))?;
    /// ```
    pub fn set_retries<T: Into<AutoRetransmission>>(
        &mut self,
        auto_retry: T,
    ) -> Result<(), TransferError<SPIErr, PinErr>> {
        let auto_retry = auto_retry.into();
        self.config.auto_retry = auto_retry;
        self.write_register(Register::SETUP_RETR, auto_retry.register())
    }

    /// Set the frequency channel nRF24L01 operates on.
    /// The frequency will be the channel + 2400 MHz.
    ///
    /// # Errors
    /// [`TransferError::InvalidChannel`] for channels above
    /// [`MAX_CHANNEL`](crate::config::MAX_CHANNEL), nothing is written.
    pub fn set_channel(&mut self, channel: u8) -> Result<(), TransferError<SPIErr, PinErr>> {
        if channel > crate::config::MAX_CHANNEL {
            return Err(TransferError::InvalidChannel(channel));
        }
        self.config.channel = channel;
        self.write_register(Register::RF_CH, channel)
    }

    /// Return the frequency channel nRF24L01 operates on.
    pub fn channel(&mut self) -> Result<u8, TransferError<SPIErr, PinErr>> {
        self.read_register(Register::RF_CH)
    }

    /// Set the address width.
    pub fn set_address_width<T>(&mut self, width: T) -> Result<(), TransferError<SPIErr, PinErr>>
    where
        T: Into<AddressWidth>,
    {
        let width = width.into();
        self.config.addr_width = width;
        self.write_register(Register::SETUP_AW, width.value())
    }

    /// Flush transmission FIFO, used in TX mode.
    pub fn flush_tx(&mut self) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.send_command(Instruction::FTX).map(|_| ())
    }

    /// Flush reciever FIFO, used in RX mode.
    pub fn flush_rx(&mut self) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.send_command(Instruction::FRX).map(|_| ())
    }

    /// Reads the status register from device. See [`Status`].
    pub fn status(&mut self) -> Result<Status, TransferError<SPIErr, PinErr>> {
        self.send_command(Instruction::NOP)
    }

    /// Reads the FIFO status register.
    pub fn fifo_status(&mut self) -> Result<FIFOStatus, TransferError<SPIErr, PinErr>> {
        self.read_register(Register::FIFO_STATUS).map(FIFOStatus::from)
    }

    /// Returns `true` if the transmission queue is empty.
    pub fn tx_fifo_empty(&mut self) -> Result<bool, TransferError<SPIErr, PinErr>> {
        Ok(self.fifo_status()?.tx_empty())
    }

    /// Pipe number of the payload at the head of the RX FIFO, `7` if it is empty.
    pub fn pipe_number(&mut self) -> Result<u8, TransferError<SPIErr, PinErr>> {
        Ok(self.status()?.pipe_number())
    }

    /// Resets the following flags in the status register:
    /// - data sent TX fifo interrupt
    /// - maximum number of number of retries interrupt
    pub fn reset_status(&mut self) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.write_register(Register::STATUS, TX_DS | MAX_RT)
    }

    /// Reads `buf.len()` bytes (at most 5) from the register at `addr`.
    ///
    /// # Errors
    /// [`TransferError::InvalidRegister`] if `addr` is not part of the memory
    /// map, nothing is sent in that case.
    pub fn read_raw_register(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), TransferError<SPIErr, PinErr>> {
        let register = Register::try_from(addr).map_err(TransferError::InvalidRegister)?;
        let len = core::cmp::min(buf.len(), Self::MAX_ADDR_WIDTH);
        self.read_register_bytes(register, &mut buf[..len])
    }

    /// Writes `data` (at most 5 bytes) to the register at `addr`.
    ///
    /// # Errors
    /// [`TransferError::InvalidRegister`] if `addr` is not part of the memory
    /// map, nothing is sent in that case.
    pub fn write_raw_register(&mut self, addr: u8, data: &[u8]) -> Result<(), TransferError<SPIErr, PinErr>> {
        let register = Register::try_from(addr).map_err(TransferError::InvalidRegister)?;
        let len = core::cmp::min(data.len(), Self::MAX_ADDR_WIDTH);
        self.write_register(register, &data[..len])
    }

    /// Reads every register the debug dump shows.
    pub fn register_dump(&mut self) -> Result<RegisterDump, TransferError<SPIErr, PinErr>> {
        let mut dump = RegisterDump {
            pipe_number: self.pipe_number()?,
            config: self.read_register(Register::CONFIG)?,
            en_aa: self.read_register(Register::EN_AA)?,
            en_rxaddr: self.read_register(Register::EN_RXADDR)?,
            setup_aw: self.read_register(Register::SETUP_AW)?,
            setup_retr: self.read_register(Register::SETUP_RETR)?,
            rf_ch: self.read_register(Register::RF_CH)?,
            rf_setup: self.read_register(Register::RF_SETUP)?,
            status: self.status()?.value(),
            observe_tx: self.read_register(Register::OBSERVE_TX)?,
            rpd: self.read_register(Register::RPD)?,
            fifo_status: self.read_register(Register::FIFO_STATUS)?,
            dynpd: self.read_register(Register::DYNPD)?,
            ..RegisterDump::default()
        };
        self.read_register_bytes(Register::RX_ADDR_P0, &mut dump.rx_addr_p0)?;
        self.read_register_bytes(Register::RX_ADDR_P1, &mut dump.rx_addr_p1)?;
        self.read_register_bytes(Register::TX_ADDR, &mut dump.tx_addr)?;
        for pipe in 2..6u8 {
            if let Some(register) = Register::rx_addr(pipe) {
                dump.rx_addr_p2_5[pipe as usize - 2] = self.read_register(register)?;
            }
        }
        for pipe in 0..6u8 {
            if let Some(register) = Register::rx_payload_width(pipe) {
                dump.rx_pw[pipe as usize] = self.read_register(register)?;
            }
        }
        Ok(dump)
    }

    fn rx_config(&self) -> u8 {
        self.config.config_reg() | PWR_UP | PRIM_RX
    }

    fn tx_config(&self) -> u8 {
        self.config.config_reg() | PWR_UP
    }

    /// Enters the transmitting state; CE must be low.
    fn power_up_tx(&mut self) -> Result<(), TransferError<SPIErr, PinErr>> {
        let now = self.clock.now_ms();
        self.mailbox.arbiter().enter_transmitting(now);
        self.write_register(Register::CONFIG, self.tx_config())
    }

    /// Leaves the transmitting state after a completion flag. CE stays high,
    /// so the chip goes straight into RX mode.
    fn power_up_rx(&mut self, outcome: TxOutcome) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.mailbox.arbiter().enter_receiving(outcome);
        self.write_register(Register::CONFIG, self.rx_config())?;
        self.reset_status()
    }

    /// Unconditionally puts the chip into receive mode and clears the transmit flags.
    fn reset_to_rx(&mut self, outcome: TxOutcome) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.set_ce_low()?;
        self.write_register(Register::CONFIG, self.rx_config())?;
        self.set_ce_high()?;
        self.mailbox.arbiter().enter_receiving(outcome);
        self.reset_status()
    }

    fn read_rx_payload(&mut self) -> Result<[u8; PAYLOAD_SIZE], TransferError<SPIErr, PinErr>> {
        self.tx_buf[0] = Instruction::RRX.opcode();
        self.tx_buf[1..].fill(self.config.filler);
        self.set_ncs_low()?;
        let mut raw = [0; PAYLOAD_SIZE];
        // Skip first byte because it contains the status.
        raw.copy_from_slice(&self.spi_transfer_tx_buf(PAYLOAD_SIZE)?[1..]);
        self.set_ncs_high()?;
        Ok(raw)
    }

    /// Sends an instruction over the SPI bus without extra data.
    ///
    /// Returns the status recieved from the device.
    fn send_command(
        &mut self,
        instruction: Instruction,
    ) -> Result<Status, TransferError<SPIErr, PinErr>> {
        self.tx_buf[0] = instruction.opcode();
        self.set_ncs_low()?;
        let status = Status::from(self.spi_transfer_tx_buf(0)?[0]);
        self.set_ncs_high()?;
        Ok(status)
    }

    /// Writes values to a given register.
    ///
    /// This can be anything that can be turned into a buffer of u8's.
    /// `IntoBuf` is currently implemented for T and for &[T].
    /// This means that this function can be polymorphically called for single value writes as well
    /// as for arrays.
    fn write_register<T: IntoBuf<u8>>(
        &mut self,
        register: Register,
        buf: T,
    ) -> Result<(), TransferError<SPIErr, PinErr>> {
        let buf = buf.into_buf();
        // First byte will be the opcode
        self.tx_buf[0] = Instruction::WR.opcode() | register.addr();
        self.tx_buf[1..=buf.len()].copy_from_slice(buf);
        self.set_ncs_low()?;
        self.spi_write_tx_buf(buf.len())?;
        self.set_ncs_high()
    }

    fn read_register(&mut self, register: Register) -> Result<u8, TransferError<SPIErr, PinErr>> {
        let mut value = [0];
        self.read_register_bytes(register, &mut value)?;
        Ok(value[0])
    }

    fn read_register_bytes(
        &mut self,
        register: Register,
        buf: &mut [u8],
    ) -> Result<(), TransferError<SPIErr, PinErr>> {
        let len = buf.len();
        self.tx_buf[0] = Instruction::RR.opcode() | register.addr();
        self.tx_buf[1..=len].fill(0);
        self.set_ncs_low()?;
        buf.copy_from_slice(&self.spi_transfer_tx_buf(len)?[1..]);
        self.set_ncs_high()
    }

    fn setup_rf(
        &mut self,
        data_rate: DataRate,
        level: PALevel,
    ) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.write_register(Register::RF_SETUP, data_rate.rate() | level.level())
    }
}

#[cfg(feature = "async")]
impl<'a, SPI, CE, NCS, CLK, SPIErr, PinErr, const N: usize> Nrf24l01<'a, SPI, CE, NCS, CLK, N>
where
    SPI: SpiBus<u8, Error = SPIErr>,
    NCS: OutputPin<Error = PinErr>,
    CE: OutputPin<Error = PinErr>,
    CLK: Clock,
{
    /// Waits until the IRQ line is asserted and runs
    /// [`on_interrupt()`](#method.on_interrupt).
    ///
    /// The line is level-checked: it stays low while any flag is pending, so
    /// a data-ready flag left over after a transmit completion is picked up by
    /// the next call without waiting for another edge.
    ///
    /// Lets an async executor stand in for interrupt registration:
    /// ```ignore
    /// loop {
    ///     match nrf24.wait_for_interrupt(&mut irq).await? {
    ///         Event::Received { pipe, .. } => signal.signal(pipe),
    ///         _ => {}
    ///     }
    /// }
    /// ```
    pub async fn wait_for_interrupt<IRQ>(
        &mut self,
        irq: &mut IRQ,
    ) -> Result<Event, TransferError<SPIErr, PinErr>>
    where
        IRQ: embedded_hal_async::digital::Wait<Error = PinErr>,
    {
        irq.wait_for_low().await.map_err(TransferError::Pin)?;
        self.on_interrupt()
    }
}

/// Helper functions for setting Chip Select pin.
/// Returns the error enum defined in this crate, so the rest of the code can use the
/// `?` operator.
impl<SPI, CE, NCS, CLK, PinErr, const N: usize> Nrf24l01<'_, SPI, CE, NCS, CLK, N>
where
    NCS: OutputPin<Error = PinErr>,
{
    fn set_ncs_high<SPIErr>(&mut self) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.ncs.set_high().map_err(TransferError::Pin)
    }
    fn set_ncs_low<SPIErr>(&mut self) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.ncs.set_low().map_err(TransferError::Pin)
    }
}

/// Helper functions for setting Chip Enable pin.
/// Returns the error enum defined in this crate, so the rest of the code can use the
/// `?` operator.
impl<SPI, CE, NCS, CLK, PinErr, const N: usize> Nrf24l01<'_, SPI, CE, NCS, CLK, N>
where
    CE: OutputPin<Error = PinErr>,
{
    fn set_ce_high<SPIErr>(&mut self) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.ce.set_high().map_err(TransferError::Pin)
    }
    fn set_ce_low<SPIErr>(&mut self) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.ce.set_low().map_err(TransferError::Pin)
    }
}

/// Helper functions for transfering data over the SPI bus.
/// Returns the error enum defined in this crate, so the rest of the code can use the
/// `?` operator.
impl<SPI, CE, NCS, CLK, SPIErr, const N: usize> Nrf24l01<'_, SPI, CE, NCS, CLK, N>
where
    SPI: SpiBus<u8, Error = SPIErr>,
{
    /// *NOTE*
    /// Make sure the data to be transfered is copied to the TX Buf before calling this function.
    /// Because the first byte always has to be the command, the `len` argument
    /// is the inclusive length.
    fn spi_transfer_tx_buf<PinErr>(
        &mut self,
        len: usize,
    ) -> Result<&[u8], TransferError<SPIErr, PinErr>> {
        self.spi
            .transfer_in_place(&mut self.tx_buf[..=len])
            .map_err(TransferError::Spi)?;
        self.spi.flush().map_err(TransferError::Spi)?;
        Ok(&self.tx_buf[..=len])
    }

    /// *NOTE*
    /// Make sure the data to be written is copied to the TX Buf before calling this function.
    /// Because the first byte always has to be the command, the `len` argument
    /// is the inclusive length.
    fn spi_write_tx_buf<PinErr>(
        &mut self,
        len: usize,
    ) -> Result<(), TransferError<SPIErr, PinErr>> {
        self.spi
            .write(&self.tx_buf[..=len])
            .map_err(TransferError::Spi)?;
        self.spi.flush().map_err(TransferError::Spi)
    }
}

impl<SPI, CE, NCS, CLK, const N: usize> fmt::Debug for Nrf24l01<'_, SPI, CE, NCS, CLK, N>
where
    SPI: fmt::Debug,
    CE: fmt::Debug,
    NCS: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nrf24l01")
            .field("spi", &self.spi)
            .field("ncs", &self.ncs)
            .field("ce", &self.ce)
            .field("mode", &self.mailbox.mode())
            .field("config", &self.config)
            .finish()
    }
}

/// A trait representing a type that can be turned into a buffer.
///
/// Is used for representing single values as well as slices as buffers.
trait IntoBuf<T> {
    fn into_buf(&self) -> &[T];
}

impl<T> IntoBuf<T> for T {
    fn into_buf(&self) -> &[T] {
        core::slice::from_ref(self)
    }
}
impl<T> IntoBuf<T> for &[T] {
    fn into_buf(&self) -> &[T] {
        self
    }
}
