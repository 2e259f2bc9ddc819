//! Relay forwarding wrappers exchanged on FPort 226.
//!
//! An uplink wrapper carries three bytes of radio metadata and the frequency the relay
//! received on, followed by the embedded PHYPayload. A downlink wrapper is the embedded
//! PHYPayload alone.

use heapless::Vec;

use super::{
    append_all, append_frequency, decode_error, encode_error, extend, read_frequency, take,
    u24_le, Error, FieldError, PhyBuffer, MAX_PHY_PAYLOAD_SIZE,
};
use crate::band::Band;
use crate::types::DR;

/// FPort carrying relay wrappers.
pub const RELAY_FPORT: u8 = 226;

/// Length of the metadata and frequency in front of the embedded payload.
pub const FORWARD_UPLINK_HEADER_SIZE: usize = 6;

/// Largest PHYPayload a wrapper embeds.
pub const MAX_EMBEDDED_PAYLOAD_SIZE: usize = MAX_PHY_PAYLOAD_SIZE - FORWARD_UPLINK_HEADER_SIZE;

const MIN_SNR: i8 = -20;
const MAX_SNR: i8 = 11;
const MIN_RSSI: i16 = -142;
const MAX_RSSI: i16 = -15;

/// Wake-on-radio channel the relay received the uplink on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorChannel {
    /// Default channel.
    #[default]
    Default,
    /// Second channel.
    Secondary,
}

/// Uplink forwarded by a relay.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForwardUplinkReq {
    /// Data rate of the received uplink.
    pub data_rate: DR,
    /// SNR in dB. Clipped to -20..11 on encode.
    pub snr: i8,
    /// RSSI in dBm. Clipped to -142..-15 on encode.
    pub rssi: i16,
    /// Wake-on-radio channel.
    pub wor_channel: WorChannel,
    /// Frequency of the received uplink in Hz.
    pub frequency: u32,
    /// Embedded PHYPayload.
    pub raw_payload: Vec<u8, MAX_EMBEDDED_PAYLOAD_SIZE>,
}

/// Downlink sent through a relay.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForwardDownlinkReq {
    /// Embedded PHYPayload.
    pub raw_payload: Vec<u8, MAX_EMBEDDED_PAYLOAD_SIZE>,
}

fn clipped_snr(snr: i8) -> u32 {
    let clipped = snr.clamp(MIN_SNR, MAX_SNR);
    if clipped != snr {
        warn!("relay SNR {} clipped to {}", snr, clipped);
    }
    (clipped - MIN_SNR) as u32
}

fn clipped_rssi(rssi: i16) -> u32 {
    let clipped = rssi.clamp(MIN_RSSI, MAX_RSSI);
    if clipped != rssi {
        warn!("relay RSSI {} clipped to {}", rssi, clipped);
    }
    (-(clipped + 15)) as u32
}

/// Appends a forwarded uplink.
pub fn append_forward_uplink_req<const N: usize>(
    band: &Band,
    buf: &mut Vec<u8, N>,
    req: &ForwardUplinkReq,
) -> Result<(), Error> {
    if band.data_rate(req.data_rate).is_none() {
        return Err(encode_error("DataRate", FieldError::Unknown { value: u32::from(req.data_rate.index()) }));
    }
    if req.raw_payload.is_empty() {
        return Err(encode_error("RawPayload", FieldError::Missing));
    }
    let wor = match req.wor_channel {
        WorChannel::Default => 0,
        WorChannel::Secondary => 1,
    };
    let metadata = u32::from(req.data_rate.index())
        | (clipped_snr(req.snr) << 4)
        | (clipped_rssi(req.rssi) << 9)
        | (wor << 16);
    append_all(buf, |buf| {
        extend(buf, "Metadata", &metadata.to_le_bytes()[..3])?;
        append_frequency(buf, "Frequency", req.frequency, band.freq_multiplier, false)?;
        extend(buf, "RawPayload", &req.raw_payload)
    })
}

/// Encodes a forwarded uplink into a new buffer.
///
/// # Examples
///
/// ```
/// use heapless::Vec;
/// use lorawan_codec::band::{get_latest, BandId};
/// use lorawan_codec::encoding::relay::*;
/// use lorawan_codec::types::DR;
///
/// let band = get_latest(BandId::Eu863870).unwrap();
/// let req = ForwardUplinkReq {
///     data_rate: DR::_5,
///     snr: 7,
///     rssi: -60,
///     wor_channel: WorChannel::Default,
///     frequency: 868_100_000,
///     raw_payload: Vec::from_slice(&[0x40, 0x01, 0x02]).unwrap(),
/// };
/// let bytes = marshal_forward_uplink_req(band, &req).unwrap();
/// assert_eq!(bytes.as_slice(), &[0xb5, 0x5b, 0x00, 0x28, 0x76, 0x84, 0x40, 0x01, 0x02]);
/// assert_eq!(unmarshal_forward_uplink_req(band, &bytes).unwrap(), req);
/// ```
pub fn marshal_forward_uplink_req(band: &Band, req: &ForwardUplinkReq) -> Result<PhyBuffer, Error> {
    let mut buf = PhyBuffer::new();
    append_forward_uplink_req(band, &mut buf, req)?;
    Ok(buf)
}

/// Decodes a forwarded uplink.
pub fn unmarshal_forward_uplink_req(band: &Band, data: &[u8]) -> Result<ForwardUplinkReq, Error> {
    let (metadata, rest) = take("Metadata", data, 3)?;
    let (frequency, payload) = take("Frequency", rest, 3)?;
    let metadata = u24_le(metadata);
    let data_rate = DR::from_nibble(metadata as u8);
    if band.data_rate(data_rate).is_none() {
        return Err(decode_error("DataRate", FieldError::Unknown { value: u32::from(data_rate.index()) }));
    }
    let wor_channel = match (metadata >> 16) & 0x03 {
        0 => WorChannel::Default,
        1 => WorChannel::Secondary,
        v => return Err(decode_error("WorChannel", FieldError::Unknown { value: v })),
    };
    if payload.is_empty() {
        return Err(decode_error("RawPayload", FieldError::Missing));
    }
    let raw_payload = Vec::from_slice(payload).map_err(|_| {
        decode_error(
            "RawPayload",
            FieldError::LengthMismatch { expected: MAX_EMBEDDED_PAYLOAD_SIZE, actual: payload.len() },
        )
    })?;
    Ok(ForwardUplinkReq {
        data_rate,
        snr: ((metadata >> 4) & 0x1f) as i8 + MIN_SNR,
        rssi: -(((metadata >> 9) & 0x7f) as i16) - 15,
        wor_channel,
        frequency: read_frequency("Frequency", frequency, band.freq_multiplier, false)?,
        raw_payload,
    })
}

/// Appends a downlink wrapper.
pub fn append_forward_downlink_req<const N: usize>(
    buf: &mut Vec<u8, N>,
    req: &ForwardDownlinkReq,
) -> Result<(), Error> {
    if req.raw_payload.is_empty() {
        return Err(encode_error("RawPayload", FieldError::Missing));
    }
    extend(buf, "RawPayload", &req.raw_payload)
}

/// Encodes a downlink wrapper into a new buffer.
pub fn marshal_forward_downlink_req(req: &ForwardDownlinkReq) -> Result<PhyBuffer, Error> {
    let mut buf = PhyBuffer::new();
    append_forward_downlink_req(&mut buf, req)?;
    Ok(buf)
}

/// Decodes a downlink wrapper.
pub fn unmarshal_forward_downlink_req(data: &[u8]) -> Result<ForwardDownlinkReq, Error> {
    if data.is_empty() {
        return Err(decode_error("RawPayload", FieldError::Missing));
    }
    let raw_payload = Vec::from_slice(data).map_err(|_| {
        decode_error(
            "RawPayload",
            FieldError::LengthMismatch { expected: MAX_EMBEDDED_PAYLOAD_SIZE, actual: data.len() },
        )
    })?;
    Ok(ForwardDownlinkReq { raw_payload })
}
