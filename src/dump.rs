//! Raw register snapshot for debugging.

use core::fmt;

/// Values of every register of interest, read in one go by
/// [`Nrf24l01::register_dump()`](crate::Nrf24l01::register_dump).
///
/// Addresses are stored in the order the chip clocks them out, LSByte first.
/// The [`Display`](fmt::Display) implementation renders one register per line
/// and can be written to any [`core::fmt::Write`] sink, e.g. a UART:
///
/// ```ignore
/// use core::fmt::Write;
/// let dump = nrf24.register_dump()?;
/// write!(uart, "{}", dump).ok();
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub struct RegisterDump {
    pub pipe_number: u8,
    pub config: u8,
    pub en_aa: u8,
    pub en_rxaddr: u8,
    pub setup_aw: u8,
    pub setup_retr: u8,
    pub rf_ch: u8,
    pub rf_setup: u8,
    pub status: u8,
    pub observe_tx: u8,
    pub rpd: u8,
    pub rx_addr_p0: [u8; 5],
    pub rx_addr_p1: [u8; 5],
    /// Low bytes of pipes 2 to 5, the upper bytes are shared with pipe 1.
    pub rx_addr_p2_5: [u8; 4],
    pub tx_addr: [u8; 5],
    pub rx_pw: [u8; 6],
    pub fifo_status: u8,
    pub dynpd: u8,
}

struct Hex<'a>(&'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in self.0 {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

struct HexList<'a>(&'a [u8]);

impl fmt::Display for HexList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", Hex(core::slice::from_ref(byte)))?;
        }
        Ok(())
    }
}

impl fmt::Display for RegisterDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------------")?;
        writeln!(f, "Pipe: {}", self.pipe_number)?;
        writeln!(f, "CONFIG: {}", Hex(&[self.config]))?;
        writeln!(f, "EN_AA: {}", Hex(&[self.en_aa]))?;
        writeln!(f, "EN_RXADDR: {}", Hex(&[self.en_rxaddr]))?;
        writeln!(f, "SETUP_AW: {}", Hex(&[self.setup_aw]))?;
        writeln!(f, "SETUP_RETR: {}", Hex(&[self.setup_retr]))?;
        writeln!(f, "RF_CH: {}", Hex(&[self.rf_ch]))?;
        writeln!(f, "RF_SETUP: {}", Hex(&[self.rf_setup]))?;
        writeln!(f, "STATUS: {}", Hex(&[self.status]))?;
        writeln!(f, "OBSERVE_TX: {}", Hex(&[self.observe_tx]))?;
        writeln!(f, "RPD: {}", Hex(&[self.rpd]))?;
        writeln!(
            f,
            "RX_ADDR_P0-5: {}, {}, {}",
            Hex(&self.rx_addr_p0),
            Hex(&self.rx_addr_p1),
            HexList(&self.rx_addr_p2_5)
        )?;
        writeln!(f, "TX_ADDR: {}", Hex(&self.tx_addr))?;
        writeln!(f, "RX_PW_P0-5: {}", HexList(&self.rx_pw))?;
        writeln!(f, "FIFO_STATUS: {}", Hex(&[self.fifo_status]))?;
        writeln!(f, "DYNPD: {}", Hex(&[self.dynpd]))?;
        writeln!(f, "------------")
    }
}
