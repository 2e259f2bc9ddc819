//! PHYPayload records and their decoders.
//!
//! The encoders for the same records live in [`creator`](super::creator).

use heapless::Vec;

use super::{bit, check_length, decode_error, read_frequency, take, u24_le, Error, FieldError};
use crate::band::CfListType;
use crate::channel_mask::ChannelMask;
use crate::types::{DevAddr, DevNonce, Eui64, JoinNonce, Mic, NetId, DR};

/// Largest FOpts field.
pub const MAX_F_OPTS_SIZE: usize = 15;

/// Largest FRMPayload that fits a PHYPayload next to the smallest FHDR.
pub const MAX_FRM_PAYLOAD_SIZE: usize = super::MAX_PHY_PAYLOAD_SIZE - 13;

/// Length of the CFList trailer of a JoinAccept.
pub const CF_LIST_SIZE: usize = 16;

/// Unit of the CFList frequencies, in Hz.
pub const CF_LIST_FREQ_MULTIPLIER: u32 = 100;

/// Message type carried in the top three bits of the MHDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum MType {
    JoinRequest,
    JoinAccept,
    UnconfirmedDataUp,
    UnconfirmedDataDown,
    ConfirmedDataUp,
    ConfirmedDataDown,
    RejoinRequest,
    Proprietary,
}

impl MType {
    /// Reads the message type from the top three bits of `byte`.
    pub const fn from_mhdr(byte: u8) -> MType {
        match byte >> 5 {
            0 => MType::JoinRequest,
            1 => MType::JoinAccept,
            2 => MType::UnconfirmedDataUp,
            3 => MType::UnconfirmedDataDown,
            4 => MType::ConfirmedDataUp,
            5 => MType::ConfirmedDataDown,
            6 => MType::RejoinRequest,
            _ => MType::Proprietary,
        }
    }

    /// Three bit wire value.
    pub const fn value(self) -> u8 {
        match self {
            MType::JoinRequest => 0,
            MType::JoinAccept => 1,
            MType::UnconfirmedDataUp => 2,
            MType::UnconfirmedDataDown => 3,
            MType::ConfirmedDataUp => 4,
            MType::ConfirmedDataDown => 5,
            MType::RejoinRequest => 6,
            MType::Proprietary => 7,
        }
    }

    /// Whether the frame is sent by an end device.
    pub const fn is_uplink(self) -> bool {
        matches!(
            self,
            MType::JoinRequest
                | MType::RejoinRequest
                | MType::UnconfirmedDataUp
                | MType::ConfirmedDataUp
        )
    }

    /// Whether the frame carries a MACPayload.
    pub const fn is_data(self) -> bool {
        matches!(
            self,
            MType::UnconfirmedDataUp
                | MType::UnconfirmedDataDown
                | MType::ConfirmedDataUp
                | MType::ConfirmedDataDown
        )
    }

    /// Whether the frame must be acknowledged.
    pub const fn is_confirmed(self) -> bool {
        matches!(self, MType::ConfirmedDataUp | MType::ConfirmedDataDown)
    }
}

/// Major version of the frame format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Major {
    /// LoRaWAN R1, the only defined format.
    #[default]
    LoRaWANR1,
}

/// MHDR of a PHYPayload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MHDR {
    /// Message type.
    pub mtype: MType,
    /// Frame format.
    pub major: Major,
}

impl MHDR {
    /// LoRaWAN R1 header for `mtype`.
    pub const fn new(mtype: MType) -> Self {
        Self { mtype, major: Major::LoRaWANR1 }
    }

    /// Decodes the header. The reserved bits 2..4 are ignored.
    pub fn from_byte(byte: u8) -> Result<Self, Error> {
        if byte & 0x03 != 0 {
            return Err(decode_error(
                "Major",
                FieldError::Unknown { value: u32::from(byte & 0x03) },
            ));
        }
        Ok(Self::new(MType::from_mhdr(byte)))
    }

    /// Wire representation.
    pub const fn to_byte(&self) -> u8 {
        self.mtype.value() << 5
    }
}

/// FCtrl flags of an FHDR.
///
/// `adr_ack_req` and `class_b` are only emitted on uplinks, `f_pending` only on downlinks.
/// Which of them a decoded record sets is decided by the direction passed to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FCtrl {
    /// Adaptive data rate enabled.
    pub adr: bool,
    /// The device requests a downlink to validate its ADR state.
    pub adr_ack_req: bool,
    /// Acknowledges the last confirmed frame.
    pub ack: bool,
    /// The device is in class B.
    pub class_b: bool,
    /// The network has more data pending.
    pub f_pending: bool,
}

impl FCtrl {
    /// Decodes the flags and the FOpts length.
    pub fn from_byte(byte: u8, uplink: bool) -> (Self, usize) {
        let f_ctrl = Self {
            adr: bit(byte, 7),
            adr_ack_req: uplink && bit(byte, 6),
            ack: bit(byte, 5),
            class_b: uplink && bit(byte, 4),
            f_pending: !uplink && bit(byte, 4),
        };
        (f_ctrl, usize::from(byte & 0x0f))
    }

    /// Wire representation with the given FOpts length.
    pub fn to_byte(&self, uplink: bool, f_opts_len: u8) -> u8 {
        let mut byte = f_opts_len & 0x0f;
        if self.adr {
            byte |= 1 << 7;
        }
        if uplink && self.adr_ack_req {
            byte |= 1 << 6;
        }
        if self.ack {
            byte |= 1 << 5;
        }
        if (uplink && self.class_b) || (!uplink && self.f_pending) {
            byte |= 1 << 4;
        }
        byte
    }
}

/// Frame header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FHDR {
    /// Device address.
    pub dev_addr: DevAddr,
    /// Frame control flags.
    pub f_ctrl: FCtrl,
    /// Frame counter. Only the low 16 bits go on the wire.
    pub f_cnt: u32,
    /// MAC commands piggybacked in the header.
    pub f_opts: Vec<u8, MAX_F_OPTS_SIZE>,
}

/// MACPayload of a data frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacPayload {
    /// Frame header.
    pub fhdr: FHDR,
    /// Application port. Port 0 carries MAC commands in the FRMPayload.
    pub f_port: Option<u8>,
    /// Opaque, possibly encrypted payload.
    pub frm_payload: Vec<u8, MAX_FRM_PAYLOAD_SIZE>,
}

/// JoinRequest payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinRequestPayload {
    /// Join server identifier.
    pub join_eui: Eui64,
    /// Device identifier.
    pub dev_eui: Eui64,
    /// Device nonce.
    pub dev_nonce: DevNonce,
}

/// RejoinRequest payload. The variant is the rejoin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RejoinRequestPayload {
    /// Resets the context, carries the home network.
    Type0 {
        /// Home network.
        net_id: NetId,
        /// Device identifier.
        dev_eui: Eui64,
        /// RJcount0.
        rejoin_cnt: u16,
    },
    /// Restores a lost session, carries the join server.
    Type1 {
        /// Join server identifier.
        join_eui: Eui64,
        /// Device identifier.
        dev_eui: Eui64,
        /// RJcount1.
        rejoin_cnt: u16,
    },
    /// Rekeys the session, carries the home network.
    Type2 {
        /// Home network.
        net_id: NetId,
        /// Device identifier.
        dev_eui: Eui64,
        /// RJcount0.
        rejoin_cnt: u16,
    },
}

impl RejoinRequestPayload {
    /// Rejoin type byte.
    pub const fn rejoin_type(&self) -> u8 {
        match self {
            RejoinRequestPayload::Type0 { .. } => 0,
            RejoinRequestPayload::Type1 { .. } => 1,
            RejoinRequestPayload::Type2 { .. } => 2,
        }
    }

    /// Device identifier.
    pub const fn dev_eui(&self) -> Eui64 {
        match *self {
            RejoinRequestPayload::Type0 { dev_eui, .. }
            | RejoinRequestPayload::Type1 { dev_eui, .. }
            | RejoinRequestPayload::Type2 { dev_eui, .. } => dev_eui,
        }
    }

    /// Length of the payload on the wire, rejoin type byte included.
    pub const fn len(&self) -> usize {
        rejoin_request_len(self.rejoin_type())
    }
}

const fn rejoin_request_len(rejoin_type: u8) -> usize {
    if rejoin_type == 1 {
        19
    } else {
        14
    }
}

/// Downlink settings of a JoinAccept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DLSettings {
    /// LoRaWAN 1.1 key derivation.
    pub opt_neg: bool,
    /// RX1 data rate offset, 0..7.
    pub rx1_dr_offset: u8,
    /// RX2 data rate.
    pub rx2_dr: DR,
}

impl DLSettings {
    /// Decodes the settings byte.
    pub fn from_byte(byte: u8) -> Self {
        Self { opt_neg: bit(byte, 7), rx1_dr_offset: (byte >> 4) & 0x07, rx2_dr: DR::from_nibble(byte) }
    }
}

/// Channel plan trailer of a JoinAccept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CfList {
    /// Up to five channel frequencies in Hz, zero for unused slots.
    Frequencies([u32; 5]),
    /// Enablement of up to 96 channels.
    ChannelMasks(ChannelMask<12>),
}

impl CfList {
    /// Layout of the trailer.
    pub const fn cf_list_type(&self) -> CfListType {
        match self {
            CfList::Frequencies(_) => CfListType::Frequencies,
            CfList::ChannelMasks(_) => CfListType::ChannelMasks,
        }
    }
}

/// Plaintext JoinAccept payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinAcceptPayload {
    /// 24-bit join nonce.
    pub join_nonce: JoinNonce,
    /// Home network.
    pub home_net_id: NetId,
    /// Assigned device address.
    pub dev_addr: DevAddr,
    /// Downlink settings.
    pub dl_settings: DLSettings,
    /// RX1 delay in seconds, 0..15.
    pub rx_delay: u8,
    /// Optional channel plan.
    pub cf_list: Option<CfList>,
}

/// Largest encrypted JoinAccept body.
pub const MAX_ENCRYPTED_JOIN_ACCEPT_SIZE: usize = 32;

/// Payload of a PHYPayload, picked by the MHDR.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payload {
    /// JoinRequest.
    JoinRequest(JoinRequestPayload),
    /// RejoinRequest.
    RejoinRequest(RejoinRequestPayload),
    /// Encrypted JoinAccept body of 16 or 32 bytes, MIC included.
    JoinAccept(Vec<u8, MAX_ENCRYPTED_JOIN_ACCEPT_SIZE>),
    /// Data frame.
    MacPayload(MacPayload),
}

/// A complete PHYPayload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Message header.
    pub mhdr: MHDR,
    /// Payload.
    pub payload: Payload,
    /// Trailing MIC. A JoinAccept carries its MIC inside the encrypted body, hence `None`.
    pub mic: Option<Mic>,
}

/// Decodes a PHYPayload.
///
/// # Examples
///
/// ```
/// use lorawan_codec::encoding::parser::{unmarshal_message, MType, Payload};
///
/// let data = [0x40, 0x04, 0x03, 0x02, 0x01, 0x80, 0x01, 0x00, 0x01, 0xa6, 0x94, 0x64, 0x26, 0x15];
/// let msg = unmarshal_message(&data).unwrap();
/// assert_eq!(msg.mhdr.mtype, MType::UnconfirmedDataUp);
/// let Payload::MacPayload(mac) = msg.payload else { panic!("not a data frame") };
/// assert_eq!(mac.fhdr.dev_addr.to_u32(), 0x0102_0304);
/// assert_eq!(mac.f_port, Some(1));
/// ```
pub fn unmarshal_message(data: &[u8]) -> Result<Message, Error> {
    let Some((&mhdr, body)) = data.split_first() else {
        return Err(decode_error("MHDR", FieldError::LengthMismatch { expected: 1, actual: 0 }));
    };
    let mhdr = MHDR::from_byte(mhdr)?;
    if mhdr.mtype == MType::JoinAccept {
        if body.len() != 16 && body.len() != 32 {
            return Err(decode_error(
                "JoinAccept",
                FieldError::LengthMismatch {
                    expected: if body.len() < 16 { 16 } else { 32 },
                    actual: body.len(),
                },
            ));
        }
        let encrypted = Vec::from_slice(body).map_err(|_| {
            decode_error(
                "JoinAccept",
                FieldError::BufferTooSmall { capacity: MAX_ENCRYPTED_JOIN_ACCEPT_SIZE },
            )
        })?;
        return Ok(Message { mhdr, payload: Payload::JoinAccept(encrypted), mic: None });
    }
    if body.len() < 4 {
        return Err(decode_error("MIC", FieldError::LengthMismatch { expected: 4, actual: body.len() }));
    }
    let (body, mic) = body.split_at(body.len() - 4);
    let mic = Some(Mic([mic[0], mic[1], mic[2], mic[3]]));
    let payload = match mhdr.mtype {
        MType::JoinRequest => Payload::JoinRequest(unmarshal_join_request_payload(body)?),
        MType::RejoinRequest => Payload::RejoinRequest(unmarshal_rejoin_request_payload(body)?),
        MType::UnconfirmedDataUp
        | MType::ConfirmedDataUp
        | MType::UnconfirmedDataDown
        | MType::ConfirmedDataDown => {
            Payload::MacPayload(unmarshal_mac_payload(body, mhdr.mtype.is_uplink())?)
        }
        MType::JoinAccept | MType::Proprietary => {
            return Err(decode_error("MType", FieldError::Unknown { value: u32::from(mhdr.mtype.value()) }));
        }
    };
    Ok(Message { mhdr, payload, mic })
}

/// Decodes a MACPayload, MIC excluded.
pub fn unmarshal_mac_payload(data: &[u8], uplink: bool) -> Result<MacPayload, Error> {
    let (addr, rest) = take("DevAddr", data, 4)?;
    let (f_ctrl, rest) = take("FCtrl", rest, 1)?;
    let (f_cnt, rest) = take("FCnt", rest, 2)?;
    let (f_ctrl, f_opts_len) = FCtrl::from_byte(f_ctrl[0], uplink);
    let (f_opts, rest) = take("FOpts", rest, f_opts_len)?;

    let dev_addr = DevAddr::from_le_slice(addr)
        .ok_or(decode_error("DevAddr", FieldError::LengthMismatch { expected: 4, actual: addr.len() }))?;
    let fhdr = FHDR {
        dev_addr,
        f_ctrl,
        f_cnt: u32::from(u16::from_le_bytes([f_cnt[0], f_cnt[1]])),
        f_opts: Vec::from_slice(f_opts).map_err(|_| {
            decode_error("FOpts", FieldError::BufferTooSmall { capacity: MAX_F_OPTS_SIZE })
        })?,
    };

    let (f_port, frm_payload) = match rest.split_first() {
        None => (None, Vec::new()),
        Some((&port, frm)) => (
            Some(port),
            Vec::from_slice(frm).map_err(|_| {
                decode_error("FRMPayload", FieldError::BufferTooSmall { capacity: MAX_FRM_PAYLOAD_SIZE })
            })?,
        ),
    };
    trace!("decoded MACPayload of {} with FOpts length {}", dev_addr, f_opts_len);
    Ok(MacPayload { fhdr, f_port, frm_payload })
}

/// Decodes a JoinRequest payload, MIC excluded.
pub fn unmarshal_join_request_payload(data: &[u8]) -> Result<JoinRequestPayload, Error> {
    check_length("JoinRequest", data, 18)?;
    Ok(JoinRequestPayload {
        join_eui: eui(&data[0..8]),
        dev_eui: eui(&data[8..16]),
        dev_nonce: u16::from_le_bytes([data[16], data[17]]),
    })
}

/// Decodes a RejoinRequest payload, MIC excluded.
pub fn unmarshal_rejoin_request_payload(data: &[u8]) -> Result<RejoinRequestPayload, Error> {
    let Some(&rejoin_type) = data.first() else {
        return Err(decode_error("RejoinType", FieldError::Missing));
    };
    if rejoin_type > 2 {
        return Err(decode_error("RejoinType", FieldError::Unknown { value: u32::from(rejoin_type) }));
    }
    check_length("RejoinRequest", data, rejoin_request_len(rejoin_type))?;
    let rejoin_cnt = u16::from_le_bytes([data[data.len() - 2], data[data.len() - 1]]);
    Ok(match rejoin_type {
        1 => RejoinRequestPayload::Type1 {
            join_eui: eui(&data[1..9]),
            dev_eui: eui(&data[9..17]),
            rejoin_cnt,
        },
        t => {
            let net_id = NetId([data[3], data[2], data[1]]);
            let dev_eui = eui(&data[4..12]);
            if t == 0 {
                RejoinRequestPayload::Type0 { net_id, dev_eui, rejoin_cnt }
            } else {
                RejoinRequestPayload::Type2 { net_id, dev_eui, rejoin_cnt }
            }
        }
    })
}

/// Decodes a decrypted JoinAccept payload of 12 or 28 bytes, MIC excluded.
pub fn unmarshal_join_accept_payload(data: &[u8]) -> Result<JoinAcceptPayload, Error> {
    if data.len() != 12 && data.len() != 12 + CF_LIST_SIZE {
        let expected = if data.len() < 12 { 12 } else { 12 + CF_LIST_SIZE };
        return Err(decode_error(
            "JoinAcceptPayload",
            FieldError::LengthMismatch { expected, actual: data.len() },
        ));
    }
    let cf_list = match data.get(12..) {
        Some(trailer) if !trailer.is_empty() => Some(unmarshal_cf_list(trailer)?),
        _ => None,
    };
    Ok(JoinAcceptPayload {
        join_nonce: u24_le(&data[0..3]),
        home_net_id: NetId([data[5], data[4], data[3]]),
        dev_addr: DevAddr([data[9], data[8], data[7], data[6]]),
        dl_settings: DLSettings::from_byte(data[10]),
        rx_delay: data[11] & 0x0f,
        cf_list,
    })
}

/// Decodes a 16-byte CFList.
pub fn unmarshal_cf_list(data: &[u8]) -> Result<CfList, Error> {
    check_length("CFList", data, CF_LIST_SIZE)?;
    match data[15] {
        0 => {
            let mut freqs = [0u32; 5];
            for (freq, chunk) in freqs.iter_mut().zip(data[..15].chunks_exact(3)) {
                *freq = read_frequency("CFList", chunk, CF_LIST_FREQ_MULTIPLIER, true)?;
            }
            Ok(CfList::Frequencies(freqs))
        }
        1 => {
            let mut mask = [0u8; 12];
            mask.copy_from_slice(&data[..12]);
            Ok(CfList::ChannelMasks(ChannelMask::from(mask)))
        }
        t => Err(decode_error("CFListType", FieldError::Unknown { value: u32::from(t) })),
    }
}

fn eui(le: &[u8]) -> Eui64 {
    let mut bytes = [0u8; 8];
    for (dst, src) in bytes.iter_mut().zip(le.iter().rev()) {
        *dst = *src;
    }
    Eui64(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mhdr_rejects_unknown_major() {
        assert_eq!(MHDR::from_byte(0x40).map(|m| m.mtype), Ok(MType::UnconfirmedDataUp));
        assert_eq!(MHDR::from_byte(0x5c).map(|m| m.mtype), Ok(MType::UnconfirmedDataUp));
        assert_eq!(
            MHDR::from_byte(0x41),
            Err(decode_error("Major", FieldError::Unknown { value: 1 }))
        );
    }

    #[test]
    fn f_ctrl_depends_on_direction() {
        let (up, len) = FCtrl::from_byte(0xf3, true);
        assert_eq!(len, 3);
        assert!(up.adr && up.adr_ack_req && up.ack && up.class_b && !up.f_pending);
        let (down, _) = FCtrl::from_byte(0xf3, false);
        assert!(down.adr && !down.adr_ack_req && down.ack && !down.class_b && down.f_pending);

        let all = FCtrl { adr: true, adr_ack_req: true, ack: true, class_b: true, f_pending: true };
        assert_eq!(all.to_byte(true, 3), 0xf3);
        assert_eq!(all.to_byte(false, 3), 0xb3);
    }

    #[test]
    fn data_frame_without_port() {
        let data = [0x60, 0x04, 0x03, 0x02, 0x01, 0x20, 0x05, 0x00, 0x11, 0x22, 0x33, 0x44];
        let msg = unmarshal_message(&data).unwrap();
        assert_eq!(msg.mhdr.mtype, MType::UnconfirmedDataDown);
        let Payload::MacPayload(mac) = msg.payload else { panic!("not a data frame") };
        assert!(mac.fhdr.f_ctrl.ack);
        assert_eq!(mac.fhdr.f_cnt, 5);
        assert_eq!(mac.f_port, None);
        assert!(mac.frm_payload.is_empty());
        assert_eq!(msg.mic, Some(Mic([0x11, 0x22, 0x33, 0x44])));
    }

    #[test]
    fn truncated_f_opts_fail() {
        let data = [0x40, 0x04, 0x03, 0x02, 0x01, 0x05, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04];
        assert_eq!(
            unmarshal_message(&data),
            Err(decode_error("FOpts", FieldError::LengthMismatch { expected: 5, actual: 1 }))
        );
    }

    #[test]
    fn proprietary_is_rejected() {
        let data = [0xe0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            unmarshal_message(&data),
            Err(decode_error("MType", FieldError::Unknown { value: 7 }))
        );
        assert!(unmarshal_message(&[]).is_err());
    }

    #[test]
    fn join_accept_lengths() {
        let mut data = [0u8; 17];
        data[0] = 0x20;
        let msg = unmarshal_message(&data).unwrap();
        assert_eq!(msg.mic, None);
        assert!(matches!(msg.payload, Payload::JoinAccept(ref body) if body.len() == 16));
        assert!(unmarshal_message(&data[..16]).is_err());
    }

    #[test]
    fn join_accept_payload_with_frequencies() {
        let mut data = [0u8; 28];
        data[..12].copy_from_slice(&[
            0x01, 0x02, 0x03, 0x13, 0x00, 0x00, 0x04, 0x03, 0x02, 0x01, 0xa3, 0x05,
        ]);
        // 867.1 MHz in 100 Hz units
        data[12..15].copy_from_slice(&[0x18, 0x4f, 0x84]);
        let ja = unmarshal_join_accept_payload(&data).unwrap();
        assert_eq!(ja.join_nonce, 0x030201);
        assert_eq!(ja.home_net_id.to_u32(), 0x13);
        assert_eq!(ja.dev_addr.to_u32(), 0x0102_0304);
        assert!(ja.dl_settings.opt_neg);
        assert_eq!(ja.dl_settings.rx1_dr_offset, 2);
        assert_eq!(ja.dl_settings.rx2_dr, DR::_3);
        assert_eq!(ja.rx_delay, 5);
        assert_eq!(ja.cf_list, Some(CfList::Frequencies([867_100_000, 0, 0, 0, 0])));
    }

    #[test]
    fn cf_list_type_must_be_known() {
        let mut data = [0u8; 16];
        data[15] = 2;
        assert_eq!(
            unmarshal_cf_list(&data),
            Err(decode_error("CFListType", FieldError::Unknown { value: 2 }))
        );
        data[15] = 1;
        data[0] = 0x01;
        data[11] = 0x80;
        let Ok(CfList::ChannelMasks(mask)) = unmarshal_cf_list(&data) else { panic!("no masks") };
        assert!(mask.is_enabled(0));
        assert!(mask.is_enabled(95));
        assert_eq!(mask.count_enabled(), 2);
    }
}
