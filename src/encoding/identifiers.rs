//! Extraction of device identifiers from the head of an uplink, without a full decode.

use super::parser::{MType, MHDR};
use super::{decode_error, take, Error, FieldError};
use crate::types::{DevAddr, Eui64};

/// Identifiers found in an uplink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UplinkMessageIdentifiers {
    /// Message type of the uplink.
    pub mtype: MType,
    /// Device address of a data uplink.
    pub dev_addr: Option<DevAddr>,
    /// DevEUI of a JoinRequest or RejoinRequest.
    pub dev_eui: Option<Eui64>,
    /// JoinEUI of a JoinRequest or a type 1 RejoinRequest.
    pub join_eui: Option<Eui64>,
}

impl UplinkMessageIdentifiers {
    fn new(mtype: MType) -> Self {
        Self { mtype, dev_addr: None, dev_eui: None, join_eui: None }
    }
}

fn read_eui(field: &'static str, data: &[u8]) -> Result<Eui64, Error> {
    let (le, _) = take(field, data, Eui64::LEN)?;
    Eui64::from_le_slice(le).ok_or(decode_error(
        field,
        FieldError::LengthMismatch { expected: Eui64::LEN, actual: le.len() },
    ))
}

/// Reads the identifiers of an uplink PHYPayload.
///
/// Only the bytes holding the identifiers are length checked; the MIC and the rest of the
/// frame are not inspected.
///
/// # Examples
///
/// ```
/// use lorawan_codec::encoding::identifiers::get_uplink_message_identifiers;
/// use lorawan_codec::types::DevAddr;
///
/// let ids = get_uplink_message_identifiers(&[0x40, 0x04, 0x03, 0x02, 0x01]).unwrap();
/// assert_eq!(ids.dev_addr, Some(DevAddr::from(0x0102_0304)));
/// assert_eq!(ids.dev_eui, None);
/// ```
pub fn get_uplink_message_identifiers(data: &[u8]) -> Result<UplinkMessageIdentifiers, Error> {
    let Some((&mhdr, rest)) = data.split_first() else {
        return Err(decode_error("MHDR", FieldError::Missing));
    };
    let mtype = MHDR::from_byte(mhdr)?.mtype;
    let mut ids = UplinkMessageIdentifiers::new(mtype);
    match mtype {
        MType::UnconfirmedDataUp | MType::ConfirmedDataUp => {
            let (le, _) = take("DevAddr", rest, DevAddr::LEN)?;
            ids.dev_addr = DevAddr::from_le_slice(le);
        }
        MType::JoinRequest => {
            let (join_eui, rest) = take("JoinEUI", rest, Eui64::LEN)?;
            ids.join_eui = Some(read_eui("JoinEUI", join_eui)?);
            ids.dev_eui = Some(read_eui("DevEUI", rest)?);
        }
        MType::RejoinRequest => {
            let Some((&rejoin_type, rest)) = rest.split_first() else {
                return Err(decode_error("RejoinType", FieldError::Missing));
            };
            match rejoin_type {
                0 | 2 => {
                    // NetID precedes the DevEUI
                    let (_, rest) = take("NetID", rest, 3)?;
                    ids.dev_eui = Some(read_eui("DevEUI", rest)?);
                }
                1 => {
                    let (join_eui, rest) = take("JoinEUI", rest, Eui64::LEN)?;
                    ids.join_eui = Some(read_eui("JoinEUI", join_eui)?);
                    ids.dev_eui = Some(read_eui("DevEUI", rest)?);
                }
                v => return Err(decode_error("RejoinType", FieldError::Unknown { value: u32::from(v) })),
            }
        }
        other => {
            return Err(decode_error("MType", FieldError::Unknown { value: u32::from(other.value()) }));
        }
    }
    trace!("extracted identifiers of a {} byte uplink", data.len());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uplink_needs_five_bytes() {
        assert_eq!(
            get_uplink_message_identifiers(&[0x80, 0x04, 0x03, 0x02]),
            Err(decode_error("DevAddr", FieldError::LengthMismatch { expected: 4, actual: 3 }))
        );
        let ids = get_uplink_message_identifiers(&[0x80, 0x04, 0x03, 0x02, 0x01]).unwrap();
        assert_eq!(ids.mtype, MType::ConfirmedDataUp);
        assert_eq!(ids.dev_addr, Some(DevAddr::new([1, 2, 3, 4])));
    }

    #[test]
    fn join_request_euis() {
        let mut frame = [0u8; 17];
        frame[1..9].copy_from_slice(&[8, 7, 6, 5, 4, 3, 2, 1]);
        frame[9..17].copy_from_slice(&[0x18, 0x17, 0x16, 0x15, 0x14, 0x13, 0x12, 0x11]);
        let ids = get_uplink_message_identifiers(&frame).unwrap();
        assert_eq!(ids.join_eui, Some(Eui64::from(0x0102_0304_0506_0708)));
        assert_eq!(ids.dev_eui, Some(Eui64::from(0x1112_1314_1516_1718)));
        assert!(get_uplink_message_identifiers(&frame[..16]).is_err());
    }

    #[test]
    fn rejoin_requests() {
        let mut frame = [0u8; 18];
        frame[0] = 0xc0;
        frame[2..5].copy_from_slice(&[0x01, 0x02, 0x03]);
        frame[5..13].copy_from_slice(&[8, 7, 6, 5, 4, 3, 2, 1]);
        let ids = get_uplink_message_identifiers(&frame[..13]).unwrap();
        assert_eq!(ids.dev_eui, Some(Eui64::from(0x0102_0304_0506_0708)));
        assert_eq!(ids.join_eui, None);
        assert!(get_uplink_message_identifiers(&frame[..12]).is_err());

        frame[1] = 1;
        assert!(get_uplink_message_identifiers(&frame[..17]).is_err());
        let ids = get_uplink_message_identifiers(&frame).unwrap();
        assert!(ids.join_eui.is_some());

        frame[1] = 3;
        assert_eq!(
            get_uplink_message_identifiers(&frame),
            Err(decode_error("RejoinType", FieldError::Unknown { value: 3 }))
        );
    }

    #[test]
    fn downlinks_are_rejected() {
        assert_eq!(
            get_uplink_message_identifiers(&[0x60, 1, 2, 3, 4]).unwrap_err().field(),
            Some("MType")
        );
        assert_eq!(
            get_uplink_message_identifiers(&[0x41, 1, 2, 3, 4]).unwrap_err().field(),
            Some("Major")
        );
        assert!(get_uplink_message_identifiers(&[]).is_err());
    }
}
