//! Different structs and values for configuration of the chip

use crate::{PIPE_COUNT, TX_MODE_TIMEOUT_MS};

/// Highest RF channel accepted by the driver (2525 MHz).
pub const MAX_CHANNEL: u8 = 125;

/// Configuration applied by [`Nrf24l01::init()`](crate::Nrf24l01::init).
///
/// # Examples
/// ```
/// use nrf24_mailbox::config::{DataRate, NrfConfig, PALevel};
///
/// let config = NrfConfig::default()
///     .channel(66)
///     .data_rate(DataRate::R2Mbps)
///     .pa_level(PALevel::Max)
///     .tx_timeout_ms(250);
/// ```
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NrfConfig {
    pub(crate) channel: u8,
    pub(crate) addr_width: AddressWidth,
    pub(crate) data_rate: DataRate,
    pub(crate) pa_level: PALevel,
    pub(crate) crc_encoding_scheme: Option<EncodingScheme>,
    pub(crate) auto_retry: AutoRetransmission,
    pub(crate) rx_pipes: PipeMask,
    pub(crate) tx_timeout_ms: u32,
    pub(crate) filler: u8,
}

impl Default for NrfConfig {
    fn default() -> Self {
        Self {
            channel: 76,
            addr_width: AddressWidth::default(),
            crc_encoding_scheme: Some(EncodingScheme::R1Byte),
            pa_level: PALevel::default(),
            data_rate: DataRate::default(),
            auto_retry: AutoRetransmission::default(),
            rx_pipes: PipeMask::ALL,
            tx_timeout_ms: TX_MODE_TIMEOUT_MS,
            filler: 0xff,
        }
    }
}

impl NrfConfig {
    /// Sets the RF channel, capped at [`MAX_CHANNEL`].
    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = core::cmp::min(channel & (u8::MAX >> 1), MAX_CHANNEL);
        self
    }
    /// Sets the address width.
    pub fn addr_width<T: Into<AddressWidth>>(mut self, width: T) -> Self {
        self.addr_width = width.into();
        self
    }
    /// Sets the air data rate.
    pub fn data_rate(mut self, data_rate: DataRate) -> Self {
        self.data_rate = data_rate;
        self
    }
    /// Sets the power amplifier level.
    pub fn pa_level(mut self, pa_level: PALevel) -> Self {
        self.pa_level = pa_level;
        self
    }
    /// Sets the hardware CRC scheme, `None` disables it.
    pub fn crc_encoding_scheme(mut self, scheme: Option<EncodingScheme>) -> Self {
        self.crc_encoding_scheme = scheme;
        self
    }
    /// Sets the automatic retransmission delay and count.
    pub fn auto_retry<T: Into<AutoRetransmission>>(mut self, auto_retry: T) -> Self {
        self.auto_retry = auto_retry.into();
        self
    }
    /// Sets the pipes enabled for reception at init.
    pub fn rx_pipes<T: Into<PipeMask>>(mut self, pipes: T) -> Self {
        self.rx_pipes = pipes.into();
        self
    }
    /// Sets how long a frame may stay in flight before the radio is forced
    /// back into receive mode.
    pub fn tx_timeout_ms(mut self, timeout: u32) -> Self {
        self.tx_timeout_ms = timeout;
        self
    }
    /// Sets the byte used to pad frames up to the full payload size.
    pub fn filler(mut self, filler: u8) -> Self {
        self.filler = filler;
        self
    }

    /// Value written to the CONFIG register, without the power and mode bits.
    pub(crate) fn config_reg(&self) -> u8 {
        use crate::register::config_bits::{CRCO, EN_CRC};
        match self.crc_encoding_scheme {
            Some(EncodingScheme::R1Byte) => EN_CRC,
            Some(EncodingScheme::R2Bytes) => EN_CRC | CRCO,
            None => 0,
        }
    }
}

/// Different RF power levels. The higher the level the bigger range, but the more the current
/// consumption.
///
/// Defaults to Min.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PALevel {
    /// -18 dBm, 7 mA current consumption.
    #[default]
    Min = 0b0000_0000,
    /// -12 dBm, 7.5 mA current consumption.
    Low = 0b0000_0010,
    /// -6 dBm, 9.0 mA current consumption.
    High = 0b0000_0100,
    /// -0 dBm, 11.3 mA current consumption.
    Max = 0b0000_0110,
}

impl PALevel {
    pub(crate) fn level(&self) -> u8 {
        *self as u8
    }
}

/// Configured speed at which data will be sent.
///
/// Defaults to 1Mpbs.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    /// 1 Mbps
    #[default]
    R1Mbps = 0b0000_0000,
    /// 2 Mbps
    R2Mbps = 0b0000_1000,
}

impl DataRate {
    pub(crate) fn rate(&self) -> u8 {
        *self as u8
    }
}

/// CRC encoding scheme
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodingScheme {
    /// 1 byte
    R1Byte = 0,
    /// 2 bytes
    R2Bytes = 1,
}

/// Address width
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressWidth {
    /// 3 bytes
    R3Bytes = 1,
    /// 4 bytes
    R4Bytes = 2,
    /// 5 bytes
    #[default]
    R5Bytes = 3,
}

impl AddressWidth {
    pub(crate) fn value(&self) -> u8 {
        *self as u8
    }

    /// Address width in bytes.
    pub fn bytes(&self) -> usize {
        self.value() as usize + 2
    }
}

impl From<u8> for AddressWidth {
    fn from(t: u8) -> Self {
        match t {
            0..=3 => Self::R3Bytes,
            4 => Self::R4Bytes,
            5..=u8::MAX => Self::R5Bytes,
        }
    }
}

/// Configuration of automatic retransmission.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutoRetransmission {
    /// The auto retransmit delay.
    /// Values can be between 0 and 15.
    /// The delay before a retransmit is initiated, is calculated according to the following formula:
    /// > ((**delay** + 1) * 250) + 86 µs
    delay: u8,
    /// The number of times there will be an auto retransmission.
    /// Must be a value between 0 and 15.
    count: u8,
}

impl Default for AutoRetransmission {
    fn default() -> Self {
        Self {
            delay: 5,
            count: 15,
        }
    }
}

impl AutoRetransmission {
    /// Retransmit delay in µs.
    pub fn delay(&self) -> u32 {
        ((self.delay as u32 + 1) * 250) + 86
    }
    /// Number of retransmissions.
    pub fn count(&self) -> u8 {
        self.count
    }
    pub(crate) fn register(&self) -> u8 {
        (self.delay << 4) | self.count
    }
}

impl From<(u8, u8)> for AutoRetransmission {
    fn from((delay, count): (u8, u8)) -> Self {
        Self {
            delay: core::cmp::min(delay, 15),
            count: core::cmp::min(count, 15),
        }
    }
}

/// Representation of the different data pipes through which data can be received
///
/// An nRF24L01 configured as primary RX (PRX) will be able to receive data trough 6 different data
/// pipes.
/// One data pipe will have a unique address but share the same frequency channel.
/// This means that up to 6 different nRF24L01 configured as primary TX (PTX) can communicate with
/// one nRF24L01 configured as PRX, and the nRF24L01 configured as PRX will be able to distinguish
/// between them.
///
/// Data pipe 0 has a unique 40 bit configurable address. Each of data pipe 1-5 has an 8 bit unique
/// address and shares the 32 most significant address bits.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataPipe {
    /// Data pipe 0.
    /// Default pipe with a 40 bit configurable address.
    DP0 = 0,
    /// Data pipe 1.
    DP1 = 1,
    /// Data pipe 2.
    DP2 = 2,
    /// Data pipe 3.
    DP3 = 3,
    /// Data pipe 4.
    DP4 = 4,
    /// Data pipe 5.
    DP5 = 5,
}

impl DataPipe {
    /// Pipe index, `0..6`.
    pub fn pipe(&self) -> u8 {
        *self as u8
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    /// Bit of this pipe in the EN_RXADDR register.
    pub fn mask(&self) -> PipeMask {
        PipeMask(1 << self.pipe())
    }
}

impl From<DataPipe> for u8 {
    fn from(pipe: DataPipe) -> u8 {
        pipe.pipe()
    }
}

/// Pipe indices outside of `0..6` are rejected, the raw value is handed back.
impl TryFrom<u8> for DataPipe {
    type Error = u8;

    fn try_from(t: u8) -> Result<Self, Self::Error> {
        match t {
            0 => Ok(DataPipe::DP0),
            1 => Ok(DataPipe::DP1),
            2 => Ok(DataPipe::DP2),
            3 => Ok(DataPipe::DP3),
            4 => Ok(DataPipe::DP4),
            5 => Ok(DataPipe::DP5),
            other => Err(other),
        }
    }
}

/// Set of data pipes, one bit per pipe as in the EN_RXADDR register.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipeMask(u8);

impl PipeMask {
    /// All six pipes.
    pub const ALL: PipeMask = PipeMask((1 << PIPE_COUNT) - 1);
    /// No pipe.
    pub const NONE: PipeMask = PipeMask(0);

    /// Raw bit mask.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// `true` if no bit above pipe 5 is set.
    pub fn is_valid(&self) -> bool {
        self.0 & !Self::ALL.0 == 0
    }

    /// `true` if `pipe` is part of the set.
    pub fn contains(&self, pipe: DataPipe) -> bool {
        self.0 & pipe.mask().0 != 0
    }
}

impl From<u8> for PipeMask {
    fn from(bits: u8) -> Self {
        PipeMask(bits)
    }
}

impl From<DataPipe> for PipeMask {
    fn from(pipe: DataPipe) -> Self {
        pipe.mask()
    }
}

impl core::ops::BitOr for PipeMask {
    type Output = PipeMask;

    fn bitor(self, rhs: PipeMask) -> PipeMask {
        PipeMask(self.0 | rhs.0)
    }
}

impl core::ops::BitOr for DataPipe {
    type Output = PipeMask;

    fn bitor(self, rhs: DataPipe) -> PipeMask {
        self.mask() | rhs.mask()
    }
}

impl core::ops::BitOr<DataPipe> for PipeMask {
    type Output = PipeMask;

    fn bitor(self, rhs: DataPipe) -> PipeMask {
        self | rhs.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_is_capped() {
        assert_eq!(NrfConfig::default().channel(66).channel, 66);
        assert_eq!(NrfConfig::default().channel(126).channel, MAX_CHANNEL);
        // masked to seven bits first
        assert_eq!(NrfConfig::default().channel(0x80 | 10).channel, 10);
    }

    #[test]
    fn config_register_follows_crc() {
        let config = NrfConfig::default();
        assert_eq!(config.config_reg(), 0b0000_1000);
        assert_eq!(
            config
                .crc_encoding_scheme(Some(EncodingScheme::R2Bytes))
                .config_reg(),
            0b0000_1100
        );
        assert_eq!(config.crc_encoding_scheme(None).config_reg(), 0);
    }

    #[test]
    fn retransmission_is_clamped() {
        let retry: AutoRetransmission = (20, 3).into();
        assert_eq!(retry.delay(), 4086);
        assert_eq!(retry.count(), 3);
        assert_eq!(retry.register(), 0xf3);
        assert_eq!(AutoRetransmission::from((5, 15)).register(), 0x5f);
        assert_eq!(AutoRetransmission::default().delay(), 1586);
    }

    #[test]
    fn pipes() {
        assert_eq!(DataPipe::try_from(5), Ok(DataPipe::DP5));
        assert_eq!(DataPipe::try_from(6), Err(6));
        assert_eq!(DataPipe::try_from(7), Err(7));
        let mask = DataPipe::DP1.mask() | DataPipe::DP4;
        assert_eq!(mask.bits(), 0b0001_0010);
        assert!(mask.contains(DataPipe::DP4));
        assert!(!mask.contains(DataPipe::DP0));
        assert!(PipeMask::ALL.is_valid());
        assert!(!PipeMask::from(0x40).is_valid());
        assert_eq!(DataPipe::DP0 | DataPipe::DP5 | DataPipe::DP2, PipeMask::from(0b10_0101));
    }

    #[test]
    fn address_width() {
        assert_eq!(AddressWidth::from(2), AddressWidth::R3Bytes);
        assert_eq!(AddressWidth::from(9).bytes(), 5);
        assert_eq!(AddressWidth::R4Bytes.bytes(), 4);
    }
}
