//! Bit-exact codec for LoRaWAN PHYPayloads, MAC commands and relay wrappers.
//!
//! Encoders append to a caller-owned [`heapless::Vec`] and leave it untouched when they fail.
//! Decoders borrow the input and return owned records.

use heapless::Vec;

use crate::frequency::{Frequency, MAX_FIELD_VALUE, MIN_FREQUENCY};

pub mod creator;
pub mod identifiers;
pub mod maccommandcreator;
pub mod maccommands;
pub mod parser;
pub mod relay;

/// Largest PHYPayload the codec handles.
pub const MAX_PHY_PAYLOAD_SIZE: usize = 256;

/// Buffer holding one PHYPayload.
pub type PhyBuffer = Vec<u8, MAX_PHY_PAYLOAD_SIZE>;

/// Reason a single field could not be encoded or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum FieldError {
    #[error("value {value} out of range {min}..={max}")]
    OutOfRange { min: i64, max: i64, value: i64 },
    #[error("expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("unknown value {value}")]
    Unknown { value: u32 },
    #[error("missing value")]
    Missing,
    #[error("buffer capacity {capacity} exceeded")]
    BufferTooSmall { capacity: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum Error {
    #[error("failed to encode {field}")]
    Encode { field: &'static str, source: FieldError },
    #[error("failed to decode {field}")]
    Decode { field: &'static str, source: FieldError },
    #[error("MAC command {cid:#04x} is not defined in this direction")]
    InvalidMacCommandDirection { cid: u8 },
    #[error("unknown MAC command {cid:#04x}")]
    UnknownMacCommand { cid: u8 },
}

impl Error {
    /// The field the error is tagged with, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Error::Encode { field, .. } | Error::Decode { field, .. } => Some(field),
            _ => None,
        }
    }

    /// The underlying field error, if any.
    pub fn field_error(&self) -> Option<FieldError> {
        match self {
            Error::Encode { source, .. } | Error::Decode { source, .. } => Some(*source),
            _ => None,
        }
    }
}

pub(crate) const fn encode_error(field: &'static str, source: FieldError) -> Error {
    Error::Encode { field, source }
}

pub(crate) const fn decode_error(field: &'static str, source: FieldError) -> Error {
    Error::Decode { field, source }
}

/// Rejects `value` outside `min..=max` before anything is written.
pub(crate) fn check_range(
    field: &'static str,
    value: impl Into<i64>,
    min: impl Into<i64>,
    max: impl Into<i64>,
) -> Result<(), Error> {
    let (value, min, max) = (value.into(), min.into(), max.into());
    if value < min || value > max {
        return Err(encode_error(field, FieldError::OutOfRange { min, max, value }));
    }
    Ok(())
}

/// Takes exactly `len` bytes from the front of `data`.
pub(crate) fn take<'a>(
    field: &'static str,
    data: &'a [u8],
    len: usize,
) -> Result<(&'a [u8], &'a [u8]), Error> {
    if data.len() < len {
        return Err(decode_error(
            field,
            FieldError::LengthMismatch { expected: len, actual: data.len() },
        ));
    }
    Ok(data.split_at(len))
}

/// Fails unless `data` is exactly `len` bytes long.
pub(crate) fn check_length(field: &'static str, data: &[u8], len: usize) -> Result<(), Error> {
    if data.len() != len {
        return Err(decode_error(
            field,
            FieldError::LengthMismatch { expected: len, actual: data.len() },
        ));
    }
    Ok(())
}

pub(crate) fn extend<const N: usize>(
    buf: &mut Vec<u8, N>,
    field: &'static str,
    bytes: &[u8],
) -> Result<(), Error> {
    buf.extend_from_slice(bytes)
        .map_err(|_| encode_error(field, FieldError::BufferTooSmall { capacity: N }))
}

pub(crate) fn push<const N: usize>(
    buf: &mut Vec<u8, N>,
    field: &'static str,
    byte: u8,
) -> Result<(), Error> {
    buf.push(byte)
        .map_err(|_| encode_error(field, FieldError::BufferTooSmall { capacity: N }))
}

/// Runs `f` against `buf` and restores the previous length if it fails.
pub(crate) fn append_all<const N: usize>(
    buf: &mut Vec<u8, N>,
    f: impl FnOnce(&mut Vec<u8, N>) -> Result<(), Error>,
) -> Result<(), Error> {
    let len = buf.len();
    let res = f(buf);
    if res.is_err() {
        buf.truncate(len);
    }
    res
}

fn frequency_bounds(multiplier: u32) -> (i64, i64) {
    let max = i64::try_from(Frequency::max_hz(multiplier)).unwrap_or(i64::MAX);
    (i64::from(MIN_FREQUENCY), max)
}

/// Appends `hz` as a 24-bit field in `multiplier` units. Zero is only accepted with `allow_zero`.
pub(crate) fn append_frequency<const N: usize>(
    buf: &mut Vec<u8, N>,
    field: &'static str,
    hz: u32,
    multiplier: u32,
    allow_zero: bool,
) -> Result<(), Error> {
    if !(allow_zero && hz == 0) {
        let (min, max) = frequency_bounds(multiplier);
        check_range(field, hz, min, max)?;
    }
    let freq = Frequency::from_hz(hz, multiplier).ok_or(encode_error(
        field,
        FieldError::OutOfRange { min: 0, max: i64::from(MAX_FIELD_VALUE), value: i64::from(hz) },
    ))?;
    extend(buf, field, freq.as_ref())
}

/// Reads a 24-bit frequency field and returns it in Hz.
pub(crate) fn read_frequency(
    field: &'static str,
    data: &[u8],
    multiplier: u32,
    allow_zero: bool,
) -> Result<u32, Error> {
    let (raw, _) = take(field, data, 3)?;
    let hz = u24_le(raw).saturating_mul(multiplier);
    if hz == 0 && allow_zero {
        return Ok(0);
    }
    let (min, max) = frequency_bounds(multiplier);
    if i64::from(hz) < min {
        return Err(decode_error(field, FieldError::OutOfRange { min, max, value: i64::from(hz) }));
    }
    Ok(hz)
}

pub(crate) fn bit(byte: u8, n: u8) -> bool {
    byte & (1 << n) != 0
}

pub(crate) fn u24_le(data: &[u8]) -> u32 {
    u32::from(data[0]) | (u32::from(data[1]) << 8) | (u32::from(data[2]) << 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_append_leaves_buffer_untouched() {
        let mut buf: Vec<u8, 4> = Vec::new();
        buf.push(0xaa).unwrap();
        let res = append_all(&mut buf, |buf| {
            extend(buf, "first", &[1, 2])?;
            extend(buf, "second", &[3, 4])
        });
        assert_eq!(res, Err(encode_error("second", FieldError::BufferTooSmall { capacity: 4 })));
        assert_eq!(buf.as_slice(), &[0xaa]);
    }

    #[test]
    fn take_reports_missing_bytes() {
        assert_eq!(
            take("DevAddr", &[1, 2, 3], 4),
            Err(decode_error("DevAddr", FieldError::LengthMismatch { expected: 4, actual: 3 }))
        );
        let (head, rest) = take("DevAddr", &[1, 2, 3, 4, 5], 4).unwrap();
        assert_eq!(head, &[1, 2, 3, 4]);
        assert_eq!(rest, &[5]);
    }

    #[test]
    fn frequency_fields() {
        let mut buf: Vec<u8, 8> = Vec::new();
        append_frequency(&mut buf, "Freq", 868_100_000, 100, false).unwrap();
        assert_eq!(buf.as_slice(), &[0x28, 0x76, 0x84]);
        assert_eq!(read_frequency("Freq", &buf, 100, false), Ok(868_100_000));

        let err = append_frequency(&mut buf, "Freq", 99_999, 100, true).unwrap_err();
        assert_eq!(
            err.field_error(),
            Some(FieldError::OutOfRange { min: 100_000, max: 1_677_721_500, value: 99_999 })
        );
        assert!(append_frequency(&mut buf, "Freq", 0, 100, false).is_err());
        assert_eq!(buf.len(), 3);
        append_frequency(&mut buf, "Freq", 0, 100, true).unwrap();
        assert_eq!(&buf[3..], &[0, 0, 0]);
        assert_eq!(read_frequency("Freq", &[0, 0, 0], 100, true), Ok(0));
        assert!(read_frequency("Freq", &[0, 0, 0], 100, false).is_err());
        assert!(read_frequency("Freq", &[0, 0], 100, true).is_err());
    }

    #[test]
    fn range_check_reports_bounds() {
        assert!(check_range("NbTrans", 15u8, 0, 15).is_ok());
        let err = check_range("NbTrans", 16u8, 0, 15).unwrap_err();
        assert_eq!(err.field(), Some("NbTrans"));
        assert_eq!(err.field_error(), Some(FieldError::OutOfRange { min: 0, max: 15, value: 16 }));
    }
}
