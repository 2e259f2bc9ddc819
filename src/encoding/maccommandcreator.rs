// Copyright (c) 2018,2020 Ivaylo Petrov
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//
// author: Ivaylo Petrov <ivajloip@gmail.com>

//! Encoders for MAC command streams, as carried in FOpts or a port 0 FRMPayload.

use heapless::Vec;

use super::maccommands::{lookup, DownlinkMacCommand, PayloadBytes, UplinkMacCommand};
use super::{append_all, extend, push, Error};
use crate::band::Band;

fn append_raw<const N: usize>(buf: &mut Vec<u8, N>, cid: u8, payload: &[u8]) -> Result<(), Error> {
    append_all(buf, |buf| {
        push(buf, "CID", cid)?;
        extend(buf, "Raw", payload)
    })
}

fn append_encoded<const N: usize>(buf: &mut Vec<u8, N>, cid: u8, name: &'static str, payload: &PayloadBytes) -> Result<(), Error> {
    append_all(buf, |buf| {
        push(buf, "CID", cid)?;
        extend(buf, name, payload)
    })
}

/// Appends the CID and payload of an uplink command.
pub fn append_uplink<const N: usize>(band: &Band, buf: &mut Vec<u8, N>, cmd: &UplinkMacCommand) -> Result<(), Error> {
    if let UplinkMacCommand::Raw { cid, payload } = cmd {
        return append_raw(buf, *cid, payload);
    }
    let cid = cmd.cid();
    let spec = lookup(cid).ok_or(Error::UnknownMacCommand { cid })?;
    let append = spec.append_uplink.ok_or(Error::InvalidMacCommandDirection { cid })?;
    let mut payload = PayloadBytes::new();
    append(band, cmd, &mut payload)?;
    append_encoded(buf, cid, spec.name, &payload)
}

/// Appends the CID and payload of a downlink command.
pub fn append_downlink<const N: usize>(
    band: &Band,
    buf: &mut Vec<u8, N>,
    cmd: &DownlinkMacCommand,
) -> Result<(), Error> {
    if let DownlinkMacCommand::Raw { cid, payload } = cmd {
        return append_raw(buf, *cid, payload);
    }
    let cid = cmd.cid();
    let spec = lookup(cid).ok_or(Error::UnknownMacCommand { cid })?;
    let append = spec.append_downlink.ok_or(Error::InvalidMacCommandDirection { cid })?;
    let mut payload = PayloadBytes::new();
    append(band, cmd, &mut payload)?;
    append_encoded(buf, cid, spec.name, &payload)
}

/// Appends every command in order. Nothing is written if one of them fails.
///
/// # Examples
///
/// ```
/// use heapless::Vec;
/// use lorawan_codec::band::{get_latest, BandId};
/// use lorawan_codec::encoding::maccommandcreator::append_uplink_mac_commands;
/// use lorawan_codec::encoding::maccommands::*;
///
/// let band = get_latest(BandId::Eu863870).unwrap();
/// let mut fopts: Vec<u8, 15> = Vec::new();
/// let cmds = [
///     UplinkMacCommand::LinkCheckReq(LinkCheckReqPayload),
///     UplinkMacCommand::DevStatusAns(DevStatusAnsPayload { battery: 0xff, margin: -3 }),
/// ];
/// append_uplink_mac_commands(band, &mut fopts, &cmds).unwrap();
/// assert_eq!(fopts.as_slice(), &[0x02, 0x06, 0xff, 0x3d]);
/// ```
pub fn append_uplink_mac_commands<const N: usize>(
    band: &Band,
    buf: &mut Vec<u8, N>,
    cmds: &[UplinkMacCommand],
) -> Result<(), Error> {
    append_all(buf, |buf| cmds.iter().try_for_each(|cmd| append_uplink(band, buf, cmd)))
}

/// Appends every command in order. Nothing is written if one of them fails.
pub fn append_downlink_mac_commands<const N: usize>(
    band: &Band,
    buf: &mut Vec<u8, N>,
    cmds: &[DownlinkMacCommand],
) -> Result<(), Error> {
    append_all(buf, |buf| cmds.iter().try_for_each(|cmd| append_downlink(band, buf, cmd)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::{get_latest, BandId};
    use crate::encoding::maccommands::*;
    use crate::encoding::{encode_error, FieldError};
    use crate::types::DR;

    fn eu868() -> &'static Band {
        get_latest(BandId::Eu863870).unwrap()
    }

    #[test]
    fn rx_param_setup_uses_band_multiplier() {
        let ism = get_latest(BandId::Ism2400).unwrap();
        assert_eq!(ism.freq_multiplier, 200);
        let cmd = DownlinkMacCommand::RXParamSetupReq(RXParamSetupReqPayload {
            rx1_dr_offset: 2,
            rx2_data_rate: DR::_0,
            frequency: 2_423_000_000,
        });
        let mut buf: Vec<u8, 16> = Vec::new();
        append_downlink(ism, &mut buf, &cmd).unwrap();
        let raw = 12_115_000u32.to_le_bytes();
        assert_eq!(buf.as_slice(), &[0x05, 0x20, raw[0], raw[1], raw[2]]);
        assert_eq!(read_downlink(ism, &buf).unwrap(), (cmd, 5));
    }

    #[test]
    fn wrong_direction_is_rejected() {
        let mut buf: Vec<u8, 16> = Vec::new();
        let cmd = UplinkMacCommand::RelayNotifyNewEndDeviceReq(RelayNotifyNewEndDeviceReqPayload {
            dev_addr: Default::default(),
            snr: 0,
            rssi: -50,
        });
        append_uplink(eu868(), &mut buf, &cmd).unwrap();
        assert_eq!(buf.len(), 7);
        assert_eq!(read_downlink(eu868(), &buf), Err(Error::InvalidMacCommandDirection { cid: 0x46 }));
    }

    #[test]
    fn raw_commands_are_written_verbatim() {
        let mut buf: Vec<u8, 16> = Vec::new();
        let cmd = DownlinkMacCommand::Raw { cid: 0x80, payload: Vec::from_slice(&[1, 2, 3]).unwrap() };
        append_downlink(eu868(), &mut buf, &cmd).unwrap();
        assert_eq!(buf.as_slice(), &[0x80, 1, 2, 3]);
    }

    #[test]
    fn failing_command_rolls_back_the_stream() {
        let mut buf: Vec<u8, 16> = Vec::new();
        buf.push(0xee).unwrap();
        let cmds = [
            DownlinkMacCommand::DevStatusReq(DevStatusReqPayload),
            DownlinkMacCommand::RXTimingSetupReq(RXTimingSetupReqPayload { delay: 16 }),
        ];
        assert_eq!(
            append_downlink_mac_commands(eu868(), &mut buf, &cmds),
            Err(encode_error("Delay", FieldError::OutOfRange { min: 0, max: 15, value: 16 }))
        );
        assert_eq!(buf.as_slice(), &[0xee]);
    }

    #[test]
    fn fopts_capacity_is_enforced() {
        let mut fopts: Vec<u8, 15> = Vec::new();
        let cmd = DownlinkMacCommand::LinkADRReq(LinkADRReqPayload {
            data_rate: DR::_0,
            tx_power: 0,
            channel_mask: Default::default(),
            ch_mask_cntl: 0,
            nb_trans: 1,
        });
        let cmds = [cmd.clone(), cmd.clone(), cmd.clone(), cmd];
        let err = append_downlink_mac_commands(eu868(), &mut fopts, &cmds).unwrap_err();
        assert_eq!(err.field_error(), Some(FieldError::BufferTooSmall { capacity: 15 }));
        assert!(fopts.is_empty());
    }
}
