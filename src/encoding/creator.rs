//! Encoders for the records of [`parser`](super::parser).

use heapless::Vec;

use super::parser::{
    CfList, JoinAcceptPayload, JoinRequestPayload, MType, MacPayload, Message, Payload,
    RejoinRequestPayload, CF_LIST_FREQ_MULTIPLIER,
};
use super::{
    append_all, append_frequency, check_range, encode_error, extend, push, Error, FieldError,
    PhyBuffer,
};
use crate::frequency::MAX_FIELD_VALUE;
use crate::types::Mic;

/// Appends the wire form of `msg` to `buf`.
///
/// Nothing is written when the message is invalid or does not fit.
pub fn append_message<const N: usize>(buf: &mut Vec<u8, N>, msg: &Message) -> Result<(), Error> {
    append_all(buf, |buf| {
        let mtype = msg.mhdr.mtype;
        push(buf, "MHDR", msg.mhdr.to_byte())?;
        match (&msg.payload, mtype) {
            (Payload::JoinRequest(p), MType::JoinRequest) => append_join_request(buf, p)?,
            (Payload::RejoinRequest(p), MType::RejoinRequest) => append_rejoin_request(buf, p)?,
            (Payload::JoinAccept(body), MType::JoinAccept) => {
                if body.len() != 16 && body.len() != 32 {
                    return Err(encode_error(
                        "JoinAccept",
                        FieldError::LengthMismatch {
                            expected: if body.len() < 16 { 16 } else { 32 },
                            actual: body.len(),
                        },
                    ));
                }
                if msg.mic.is_some() {
                    return Err(encode_error(
                        "MIC",
                        FieldError::LengthMismatch { expected: 0, actual: Mic::LEN },
                    ));
                }
                return extend(buf, "JoinAccept", body);
            }
            (Payload::MacPayload(p), t) if t.is_data() => append_mac_payload(buf, p, t.is_uplink())?,
            _ => {
                return Err(encode_error(
                    "MType",
                    FieldError::Unknown { value: u32::from(mtype.value()) },
                ))
            }
        }
        let mic = msg.mic.ok_or(encode_error("MIC", FieldError::Missing))?;
        extend(buf, "MIC", &mic.0)
    })
}

/// Encodes `msg` into a fresh buffer.
///
/// # Examples
///
/// ```
/// use lorawan_codec::encoding::creator::marshal_message;
/// use lorawan_codec::encoding::parser::{JoinRequestPayload, MType, Message, Payload, MHDR};
/// use lorawan_codec::types::{Eui64, Mic};
///
/// let msg = Message {
///     mhdr: MHDR::new(MType::JoinRequest),
///     payload: Payload::JoinRequest(JoinRequestPayload {
///         join_eui: Eui64::from(0x0102_0304_0506_0708),
///         dev_eui: Eui64::from(0x0203_0405_0607_0809),
///         dev_nonce: 0x0102,
///     }),
///     mic: Some(Mic([0x01, 0x02, 0x03, 0x04])),
/// };
/// let bytes = marshal_message(&msg).unwrap();
/// assert_eq!(bytes.len(), 23);
/// assert_eq!(&bytes[1..9], &[8, 7, 6, 5, 4, 3, 2, 1]);
/// ```
pub fn marshal_message(msg: &Message) -> Result<PhyBuffer, Error> {
    let mut buf = PhyBuffer::new();
    append_message(&mut buf, msg)?;
    Ok(buf)
}

/// Appends a MACPayload, MIC excluded.
pub fn append_mac_payload<const N: usize>(
    buf: &mut Vec<u8, N>,
    payload: &MacPayload,
    uplink: bool,
) -> Result<(), Error> {
    append_all(buf, |buf| {
        let fhdr = &payload.fhdr;
        if payload.f_port.is_none() && !payload.frm_payload.is_empty() {
            return Err(encode_error("FPort", FieldError::Missing));
        }
        extend(buf, "DevAddr", &fhdr.dev_addr.to_le_bytes())?;
        // FOpts capacity keeps the length within the four bit field
        push(buf, "FCtrl", fhdr.f_ctrl.to_byte(uplink, fhdr.f_opts.len() as u8))?;
        extend(buf, "FCnt", &(fhdr.f_cnt as u16).to_le_bytes())?;
        extend(buf, "FOpts", &fhdr.f_opts)?;
        if let Some(port) = payload.f_port {
            push(buf, "FPort", port)?;
            extend(buf, "FRMPayload", &payload.frm_payload)?;
        }
        Ok(())
    })
}

fn append_join_request<const N: usize>(
    buf: &mut Vec<u8, N>,
    payload: &JoinRequestPayload,
) -> Result<(), Error> {
    extend(buf, "JoinEUI", &payload.join_eui.to_le_bytes())?;
    extend(buf, "DevEUI", &payload.dev_eui.to_le_bytes())?;
    extend(buf, "DevNonce", &payload.dev_nonce.to_le_bytes())
}

fn append_rejoin_request<const N: usize>(
    buf: &mut Vec<u8, N>,
    payload: &RejoinRequestPayload,
) -> Result<(), Error> {
    push(buf, "RejoinType", payload.rejoin_type())?;
    let rejoin_cnt = match payload {
        RejoinRequestPayload::Type0 { net_id, dev_eui, rejoin_cnt }
        | RejoinRequestPayload::Type2 { net_id, dev_eui, rejoin_cnt } => {
            extend(buf, "NetID", &net_id.to_le_bytes())?;
            extend(buf, "DevEUI", &dev_eui.to_le_bytes())?;
            rejoin_cnt
        }
        RejoinRequestPayload::Type1 { join_eui, dev_eui, rejoin_cnt } => {
            extend(buf, "JoinEUI", &join_eui.to_le_bytes())?;
            extend(buf, "DevEUI", &dev_eui.to_le_bytes())?;
            rejoin_cnt
        }
    };
    extend(buf, "RJcount", &rejoin_cnt.to_le_bytes())
}

/// Appends a plaintext JoinAccept payload, MIC excluded.
pub fn append_join_accept_payload<const N: usize>(
    buf: &mut Vec<u8, N>,
    payload: &JoinAcceptPayload,
) -> Result<(), Error> {
    append_all(buf, |buf| {
        check_range("JoinNonce", payload.join_nonce, 0, MAX_FIELD_VALUE)?;
        check_range("RX1DROffset", payload.dl_settings.rx1_dr_offset, 0, 7)?;
        check_range("RxDelay", payload.rx_delay, 0, 15)?;

        extend(buf, "JoinNonce", &payload.join_nonce.to_le_bytes()[..3])?;
        extend(buf, "HomeNetID", &payload.home_net_id.to_le_bytes())?;
        extend(buf, "DevAddr", &payload.dev_addr.to_le_bytes())?;
        let dl = &payload.dl_settings;
        let mut settings = (dl.rx1_dr_offset << 4) | dl.rx2_dr.index();
        if dl.opt_neg {
            settings |= 0x80;
        }
        push(buf, "DLSettings", settings)?;
        push(buf, "RxDelay", payload.rx_delay)?;
        if let Some(cf_list) = &payload.cf_list {
            append_cf_list(buf, cf_list)?;
        }
        Ok(())
    })
}

/// Encodes a plaintext JoinAccept payload into a fresh buffer.
pub fn marshal_join_accept_payload(payload: &JoinAcceptPayload) -> Result<Vec<u8, 28>, Error> {
    let mut buf = Vec::new();
    append_join_accept_payload(&mut buf, payload)?;
    Ok(buf)
}

/// Appends a 16-byte CFList.
pub fn append_cf_list<const N: usize>(buf: &mut Vec<u8, N>, cf_list: &CfList) -> Result<(), Error> {
    append_all(buf, |buf| {
        match cf_list {
            CfList::Frequencies(freqs) => {
                for hz in freqs {
                    append_frequency(buf, "CFList", *hz, CF_LIST_FREQ_MULTIPLIER, true)?;
                }
            }
            CfList::ChannelMasks(mask) => {
                extend(buf, "CFList", mask.as_ref())?;
                extend(buf, "CFList", &[0; 3])?;
            }
        }
        push(buf, "CFListType", cf_list.cf_list_type() as u8)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_mask::ChannelMask;
    use crate::encoding::parser::{
        unmarshal_join_accept_payload, unmarshal_message, DLSettings, FCtrl, FHDR, MHDR,
    };
    use crate::types::{DevAddr, Eui64, NetId, DR};

    fn data_up(f_port: Option<u8>, frm: &[u8]) -> Message {
        Message {
            mhdr: MHDR::new(MType::ConfirmedDataUp),
            payload: Payload::MacPayload(MacPayload {
                fhdr: FHDR {
                    dev_addr: DevAddr::from(0x0102_0304),
                    f_ctrl: FCtrl { adr: true, f_pending: true, ..Default::default() },
                    f_cnt: 0x0001_0203,
                    f_opts: Vec::from_slice(&[0x02]).unwrap(),
                },
                f_port,
                frm_payload: Vec::from_slice(frm).unwrap(),
            }),
            mic: Some(Mic([0xaa, 0xbb, 0xcc, 0xdd])),
        }
    }

    #[test]
    fn data_frame_layout() {
        let bytes = marshal_message(&data_up(Some(10), &[0x55])).unwrap();
        assert_eq!(
            bytes.as_slice(),
            &[0x80, 0x04, 0x03, 0x02, 0x01, 0x81, 0x03, 0x02, 0x02, 0x0a, 0x55, 0xaa, 0xbb, 0xcc, 0xdd]
        );
        let decoded = unmarshal_message(&bytes).unwrap();
        let Payload::MacPayload(mac) = decoded.payload else { panic!("not a data frame") };
        assert_eq!(mac.fhdr.f_cnt, 0x0203);
        assert!(!mac.fhdr.f_ctrl.f_pending);
    }

    #[test]
    fn payload_without_port_is_rejected() {
        let mut buf = PhyBuffer::new();
        buf.push(0x42).unwrap();
        let err = append_message(&mut buf, &data_up(None, &[1, 2])).unwrap_err();
        assert_eq!(err, encode_error("FPort", FieldError::Missing));
        assert_eq!(buf.as_slice(), &[0x42]);
        assert!(marshal_message(&data_up(None, &[])).is_ok());
    }

    #[test]
    fn mic_presence_is_checked() {
        let mut msg = data_up(Some(1), &[]);
        msg.mic = None;
        assert_eq!(marshal_message(&msg), Err(encode_error("MIC", FieldError::Missing)));

        let accept = Message {
            mhdr: MHDR::new(MType::JoinAccept),
            payload: Payload::JoinAccept(Vec::from_slice(&[0; 16]).unwrap()),
            mic: Some(Mic::default()),
        };
        assert_eq!(
            marshal_message(&accept),
            Err(encode_error("MIC", FieldError::LengthMismatch { expected: 0, actual: 4 }))
        );
        let accept = Message { mic: None, ..accept };
        assert_eq!(marshal_message(&accept).unwrap().len(), 17);
    }

    #[test]
    fn mtype_must_match_payload() {
        let mut msg = data_up(Some(1), &[]);
        msg.mhdr = MHDR::new(MType::JoinRequest);
        assert_eq!(
            marshal_message(&msg),
            Err(encode_error("MType", FieldError::Unknown { value: 0 }))
        );
    }

    #[test]
    fn rejoin_type_0_layout() {
        let msg = Message {
            mhdr: MHDR::new(MType::RejoinRequest),
            payload: Payload::RejoinRequest(RejoinRequestPayload::Type0 {
                net_id: NetId([0x01, 0x02, 0x03]),
                dev_eui: Eui64::from(0x0102_0304_0506_0708),
                rejoin_cnt: 0x0201,
            }),
            mic: Some(Mic([1, 2, 3, 4])),
        };
        let bytes = marshal_message(&msg).unwrap();
        assert_eq!(bytes.len(), 19);
        assert_eq!(&bytes[..5], &[0xc0, 0x00, 0x03, 0x02, 0x01]);
        assert_eq!(unmarshal_message(&bytes).unwrap(), msg);
    }

    #[test]
    fn join_accept_with_channel_masks() {
        let mut mask = ChannelMask::<12>::default();
        mask.set_channel(8, true);
        let payload = JoinAcceptPayload {
            join_nonce: 0x00ab_cdef,
            home_net_id: NetId([0, 0, 0x13]),
            dev_addr: DevAddr::from(0x2601_1b2c),
            dl_settings: DLSettings { opt_neg: false, rx1_dr_offset: 7, rx2_dr: DR::_8 },
            rx_delay: 1,
            cf_list: Some(CfList::ChannelMasks(mask)),
        };
        let bytes = marshal_join_accept_payload(&payload).unwrap();
        assert_eq!(bytes.len(), 28);
        assert_eq!(&bytes[..3], &[0xef, 0xcd, 0xab]);
        assert_eq!(bytes[10], 0x78);
        assert_eq!(&bytes[12..], &[0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(unmarshal_join_accept_payload(&bytes), Ok(payload));
    }

    #[test]
    fn join_accept_ranges() {
        let payload = JoinAcceptPayload {
            join_nonce: 0x0100_0000,
            home_net_id: NetId::default(),
            dev_addr: DevAddr::default(),
            dl_settings: DLSettings::default(),
            rx_delay: 0,
            cf_list: None,
        };
        let err = marshal_join_accept_payload(&payload).unwrap_err();
        assert_eq!(err.field(), Some("JoinNonce"));
        let payload = JoinAcceptPayload { join_nonce: 1, rx_delay: 16, ..payload };
        assert_eq!(marshal_join_accept_payload(&payload).unwrap_err().field(), Some("RxDelay"));
    }
}
