//! Over-the-air frame format.
//!
//! Every transmission is exactly [`PAYLOAD_SIZE`] bytes:
//!
//! ```text
//! | len | payload[0..len] | checksum | filler ... |
//! ```
//!
//! `len` is at most [`MAX_DATA_COUNT`]. Frames carry no sequence number, a
//! write longer than one frame relies on the link delivering its frames in
//! order.

use crate::error::FrameError;
use crate::{MAX_DATA_COUNT, PAYLOAD_SIZE};

/// One's complement of `length` plus the sum of `payload`, modulo 256.
pub fn checksum(length: u8, payload: &[u8]) -> u8 {
    !payload
        .iter()
        .fold(length, |acc, byte| acc.wrapping_add(*byte))
}

/// A single checksummed frame.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    len: u8,
    data: [u8; MAX_DATA_COUNT],
}

impl Frame {
    /// Builds a frame around `payload`, or `None` if it holds more than
    /// [`MAX_DATA_COUNT`] bytes.
    pub fn new(payload: &[u8]) -> Option<Self> {
        if payload.len() > MAX_DATA_COUNT {
            return None;
        }
        let mut data = [0; MAX_DATA_COUNT];
        data[..payload.len()].copy_from_slice(payload);
        Some(Self {
            len: payload.len() as u8,
            data,
        })
    }

    /// The payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// The checksum byte sent with this frame.
    pub fn checksum(&self) -> u8 {
        checksum(self.len, self.payload())
    }

    /// Lays the frame out for the TX FIFO, padding with `filler`.
    pub fn encode(&self, filler: u8) -> [u8; PAYLOAD_SIZE] {
        let len = self.len as usize;
        let mut raw = [filler; PAYLOAD_SIZE];
        raw[0] = self.len;
        raw[1..=len].copy_from_slice(self.payload());
        raw[len + 1] = self.checksum();
        raw
    }

    /// Parses a frame read from the RX FIFO and validates its checksum.
    ///
    /// Filler bytes are ignored.
    pub fn decode(raw: &[u8; PAYLOAD_SIZE]) -> Result<Self, FrameError> {
        let len = raw[0];
        if len as usize > MAX_DATA_COUNT {
            return Err(FrameError::Length(len));
        }
        let payload = &raw[1..=len as usize];
        let received = raw[len as usize + 1];
        let expected = checksum(len, payload);
        if received != expected {
            return Err(FrameError::Checksum { expected, received });
        }
        // length already checked
        Self::new(payload).ok_or(FrameError::Length(len))
    }
}

impl core::fmt::Debug for Frame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Frame")
            .field("len", &self.len)
            .field("payload", &self.payload())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Frame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Frame {{ len: {}, payload: {=[u8]} }}", self.len, self.payload())
    }
}

/// Number of frames a write of `len` bytes is split into.
///
/// An empty write still sends one (empty) frame.
pub fn frame_count(len: usize) -> usize {
    if len == 0 {
        1
    } else {
        len.div_ceil(MAX_DATA_COUNT)
    }
}

/// Splits `data` into frame payloads of [`MAX_DATA_COUNT`] bytes, the last
/// one possibly shorter.
pub fn fragments(data: &[u8]) -> Fragments<'_> {
    Fragments {
        data,
        done: false,
    }
}

/// Iterator returned by [`fragments`].
#[derive(Debug, Clone)]
pub struct Fragments<'a> {
    data: &'a [u8],
    done: bool,
}

impl<'a> Iterator for Fragments<'a> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.done {
            return None;
        }
        let take = core::cmp::min(self.data.len(), MAX_DATA_COUNT);
        let (head, tail) = self.data.split_at(take);
        self.data = tail;
        self.done = tail.is_empty();
        Frame::new(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_complement_of_sum() {
        assert_eq!(checksum(0, &[]), 0xff);
        assert_eq!(checksum(3, &[1, 2, 3]), !9u8);
        // wraps modulo 256
        assert_eq!(checksum(2, &[0xff, 0x02]), !0x03u8);
    }

    #[test]
    fn checksum_detects_single_bit_flips() {
        let data = [0x00u8, 0x10, 0x7f, 0xa5, 0xff];
        let len = data.len() as u8;
        let reference = checksum(len, &data);
        assert_eq!(checksum(len, &data), reference);

        for i in 0..data.len() {
            for bit in 0..8 {
                let mut flipped = data;
                flipped[i] ^= 1 << bit;
                assert_ne!(checksum(len, &flipped), reference);
            }
        }
        for bit in 0..8 {
            assert_ne!(checksum(len ^ (1 << bit), &data), reference);
        }
        // trivial inputs
        assert_ne!(checksum(0, &[]), checksum(1, &[0]));
        assert_ne!(checksum(1, &[0]), checksum(1, &[1]));
    }

    #[test]
    fn encode_layout() {
        let frame = Frame::new(&[0xaa, 0xbb]).unwrap();
        let raw = frame.encode(0xff);
        assert_eq!(raw.len(), PAYLOAD_SIZE);
        assert_eq!(raw[0], 2);
        assert_eq!(&raw[1..3], &[0xaa, 0xbb]);
        assert_eq!(raw[3], checksum(2, &[0xaa, 0xbb]));
        assert!(raw[4..].iter().all(|b| *b == 0xff));
    }

    #[test]
    fn full_frame_has_no_filler() {
        let payload = [0x11u8; MAX_DATA_COUNT];
        let raw = Frame::new(&payload).unwrap().encode(0xff);
        assert_eq!(raw[0] as usize, MAX_DATA_COUNT);
        assert_eq!(raw[PAYLOAD_SIZE - 1], checksum(MAX_DATA_COUNT as u8, &payload));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        assert!(Frame::new(&[0; MAX_DATA_COUNT + 1]).is_none());
    }

    #[test]
    fn decode_rejects_bad_checksum() {
        let mut raw = Frame::new(b"hello").unwrap().encode(0);
        raw[6] ^= 0x01;
        assert!(matches!(
            Frame::decode(&raw),
            Err(FrameError::Checksum { .. })
        ));
    }

    #[test]
    fn decode_rejects_bad_length() {
        let mut raw = [0u8; PAYLOAD_SIZE];
        raw[0] = MAX_DATA_COUNT as u8 + 1;
        assert_eq!(
            Frame::decode(&raw),
            Err(FrameError::Length(MAX_DATA_COUNT as u8 + 1))
        );
    }

    #[test]
    fn decode_ignores_filler() {
        let frame = Frame::new(b"abc").unwrap();
        assert_eq!(Frame::decode(&frame.encode(0x00)), Ok(frame));
        assert_eq!(Frame::decode(&frame.encode(0xff)), Ok(frame));
    }

    #[test]
    fn fragmentation() {
        let data: [u8; 95] = core::array::from_fn(|i| i as u8);
        let frames: std::vec::Vec<Frame> = fragments(&data).collect();
        assert_eq!(frames.len(), frame_count(data.len()));
        assert_eq!(frames.len(), 4);
        assert!(frames[..3].iter().all(|f| f.payload().len() == MAX_DATA_COUNT));
        assert_eq!(frames[3].payload().len(), 5);

        let joined: std::vec::Vec<u8> = frames
            .iter()
            .flat_map(|f| f.payload().iter().copied())
            .collect();
        assert_eq!(&joined[..], &data[..]);
    }

    #[test]
    fn fragmentation_boundaries() {
        assert_eq!(fragments(&[]).count(), 1);
        assert_eq!(frame_count(0), 1);
        assert_eq!(fragments(&[0; MAX_DATA_COUNT]).count(), 1);
        assert_eq!(frame_count(MAX_DATA_COUNT), 1);
        assert_eq!(fragments(&[0; MAX_DATA_COUNT + 1]).count(), 2);
        assert_eq!(frame_count(MAX_DATA_COUNT + 1), 2);
        assert_eq!(fragments(&[0; 2 * MAX_DATA_COUNT]).count(), 2);
        // longer than the u8 count the firmware could express
        assert_eq!(fragments(&[0; 300]).count(), 10);
    }
}
