// Copyright (c) 2018,2020 Ivaylo Petrov
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//
// author: Ivaylo Petrov <ivajloip@gmail.com>

//! MAC command payloads, the CID table and the decoders.
//!
//! Every command has a fixed payload length per direction. Commands with a CID missing from
//! the table decode as `Raw` and swallow the rest of the stream.

use chrono::{DateTime, Utc};
use heapless::Vec;

use super::{
    append_frequency, bit, check_length, check_range, decode_error, encode_error, extend, push,
    read_frequency, take, Error, FieldError,
};
use crate::band::Band;
use crate::channel_mask::ChMask16;
use crate::gps;
use crate::types::{AesKey, DevAddr, DeviceClass, Minor, DR};

/// Largest fixed MAC command payload, RelayUpdateUplinkListReq.
pub const MAX_MAC_COMMAND_PAYLOAD_SIZE: usize = 26;

/// Largest payload of a command with an unknown CID.
pub const MAX_RAW_PAYLOAD_SIZE: usize = 255;

/// Buffer holding the payload of one MAC command, CID excluded.
pub type PayloadBytes = Vec<u8, MAX_MAC_COMMAND_PAYLOAD_SIZE>;

/// Fixed-length payload of one MAC command in one direction.
pub trait MacCommandPayload: Sized {
    /// Enum the payload is carried in.
    type Command;
    /// Command identifier.
    const CID: u8;
    /// Sent by the end device.
    const UPLINK: bool;
    /// Length of the payload, CID excluded.
    const LEN: usize;

    /// Appends exactly `LEN` bytes, or nothing on error.
    fn append_payload(&self, band: &Band, buf: &mut PayloadBytes) -> Result<(), Error>;

    /// Decodes exactly `LEN` bytes.
    fn unmarshal_payload(band: &Band, data: &[u8]) -> Result<Self, Error>;

    /// The payload of `cmd` if it carries this command.
    fn from_command(cmd: &Self::Command) -> Option<&Self>;

    /// Wraps the payload.
    fn into_command(self) -> Self::Command;
}

macro_rules! mac_cmd_zero_len {
    (
        $(
            $(#[$outer:meta])*
            struct $type:ident;
        )*
    ) => {
        $(
            $(#[$outer])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
            #[cfg_attr(feature = "defmt", derive(defmt::Format))]
            #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
            pub struct $type;

            impl $type {
                fn append(&self, _: &Band, _: &mut PayloadBytes) -> Result<(), Error> {
                    Ok(())
                }

                fn unmarshal(_: &Band, _: &[u8]) -> Result<Self, Error> {
                    Ok(Self)
                }
            }
        )*
    };
}

macro_rules! mac_cmds {
    (
        $command:ident, uplink=$uplink:expr;
        $(
            $type:ident[cmd=$name:ident, cid=$cid:expr, size=$size:expr]
        )*
    ) => {
        $(
            impl MacCommandPayload for $type {
                type Command = $command;
                const CID: u8 = $cid;
                const UPLINK: bool = $uplink;
                const LEN: usize = $size;

                fn append_payload(&self, band: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
                    let len = buf.len();
                    let res = self.append(band, buf);
                    if res.is_err() {
                        buf.truncate(len);
                    }
                    res
                }

                fn unmarshal_payload(band: &Band, data: &[u8]) -> Result<Self, Error> {
                    check_length(stringify!($name), data, $size)?;
                    Self::unmarshal(band, data)
                }

                fn from_command(cmd: &$command) -> Option<&Self> {
                    match cmd {
                        $command::$name(payload) => Some(payload),
                        _ => None,
                    }
                }

                fn into_command(self) -> $command {
                    $command::$name(self)
                }
            }

            impl From<$type> for $command {
                fn from(payload: $type) -> Self {
                    $command::$name(payload)
                }
            }
        )*
    };
}

macro_rules! mac_cmds_enum {
    (
        $(#[$outer:meta])*
        $vis:vis enum $command:ident {
            $(
                $name:ident($type:ident)
            )*
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[allow(missing_docs)]
        $vis enum $command {
            $(
                $name($type),
            )*
            /// Command with a CID missing from the table, with every byte that followed it.
            Raw { cid: u8, payload: Vec<u8, MAX_RAW_PAYLOAD_SIZE> },
        }

        #[allow(clippy::len_without_is_empty)]
        impl $command {
            /// Command identifier.
            pub fn cid(&self) -> u8 {
                match self {
                    $(
                        Self::$name(_) => <$type as MacCommandPayload>::CID,
                    )*
                    Self::Raw { cid, .. } => *cid,
                }
            }

            /// Command name.
            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        Self::$name(_) => stringify!($name),
                    )*
                    Self::Raw { .. } => "Raw",
                }
            }

            /// Length of the payload, CID excluded.
            pub fn len(&self) -> usize {
                match self {
                    $(
                        Self::$name(_) => <$type as MacCommandPayload>::LEN,
                    )*
                    Self::Raw { payload, .. } => payload.len(),
                }
            }
        }
    };
}

mac_cmds_enum! {
    /// A MAC command sent by an end device.
    pub enum UplinkMacCommand {
        ResetInd(ResetIndPayload)
        LinkCheckReq(LinkCheckReqPayload)
        LinkADRAns(LinkADRAnsPayload)
        DutyCycleAns(DutyCycleAnsPayload)
        RXParamSetupAns(RXParamSetupAnsPayload)
        DevStatusAns(DevStatusAnsPayload)
        NewChannelAns(NewChannelAnsPayload)
        RXTimingSetupAns(RXTimingSetupAnsPayload)
        TXParamSetupAns(TXParamSetupAnsPayload)
        DlChannelAns(DlChannelAnsPayload)
        RekeyInd(RekeyIndPayload)
        ADRParamSetupAns(ADRParamSetupAnsPayload)
        DeviceTimeReq(DeviceTimeReqPayload)
        RejoinParamSetupAns(RejoinParamSetupAnsPayload)
        PingSlotInfoReq(PingSlotInfoReqPayload)
        PingSlotChannelAns(PingSlotChannelAnsPayload)
        BeaconTimingReq(BeaconTimingReqPayload)
        BeaconFreqAns(BeaconFreqAnsPayload)
        DeviceModeInd(DeviceModeIndPayload)
        RelayConfAns(RelayConfAnsPayload)
        RelayEndDeviceConfAns(RelayEndDeviceConfAnsPayload)
        RelayUpdateUplinkListAns(RelayUpdateUplinkListAnsPayload)
        RelayCtrlUplinkListAns(RelayCtrlUplinkListAnsPayload)
        RelayConfigureFwdLimitAns(RelayConfigureFwdLimitAnsPayload)
        RelayNotifyNewEndDeviceReq(RelayNotifyNewEndDeviceReqPayload)
    }
}

mac_cmds_enum! {
    /// A MAC command sent by the network.
    pub enum DownlinkMacCommand {
        ResetConf(ResetConfPayload)
        LinkCheckAns(LinkCheckAnsPayload)
        LinkADRReq(LinkADRReqPayload)
        DutyCycleReq(DutyCycleReqPayload)
        RXParamSetupReq(RXParamSetupReqPayload)
        DevStatusReq(DevStatusReqPayload)
        NewChannelReq(NewChannelReqPayload)
        RXTimingSetupReq(RXTimingSetupReqPayload)
        TXParamSetupReq(TXParamSetupReqPayload)
        DlChannelReq(DlChannelReqPayload)
        RekeyConf(RekeyConfPayload)
        ADRParamSetupReq(ADRParamSetupReqPayload)
        DeviceTimeAns(DeviceTimeAnsPayload)
        ForceRejoinReq(ForceRejoinReqPayload)
        RejoinParamSetupReq(RejoinParamSetupReqPayload)
        PingSlotInfoAns(PingSlotInfoAnsPayload)
        PingSlotChannelReq(PingSlotChannelReqPayload)
        BeaconTimingAns(BeaconTimingAnsPayload)
        BeaconFreqReq(BeaconFreqReqPayload)
        DeviceModeConf(DeviceModeConfPayload)
        RelayConfReq(RelayConfReqPayload)
        RelayEndDeviceConfReq(RelayEndDeviceConfReqPayload)
        RelayUpdateUplinkListReq(RelayUpdateUplinkListReqPayload)
        RelayCtrlUplinkListReq(RelayCtrlUplinkListReqPayload)
        RelayConfigureFwdLimitReq(RelayConfigureFwdLimitReqPayload)
    }
}

mac_cmds! {
    UplinkMacCommand, uplink=true;
    ResetIndPayload[cmd=ResetInd, cid=0x01, size=1]
    LinkCheckReqPayload[cmd=LinkCheckReq, cid=0x02, size=0]
    LinkADRAnsPayload[cmd=LinkADRAns, cid=0x03, size=1]
    DutyCycleAnsPayload[cmd=DutyCycleAns, cid=0x04, size=0]
    RXParamSetupAnsPayload[cmd=RXParamSetupAns, cid=0x05, size=1]
    DevStatusAnsPayload[cmd=DevStatusAns, cid=0x06, size=2]
    NewChannelAnsPayload[cmd=NewChannelAns, cid=0x07, size=1]
    RXTimingSetupAnsPayload[cmd=RXTimingSetupAns, cid=0x08, size=0]
    TXParamSetupAnsPayload[cmd=TXParamSetupAns, cid=0x09, size=0]
    DlChannelAnsPayload[cmd=DlChannelAns, cid=0x0A, size=1]
    RekeyIndPayload[cmd=RekeyInd, cid=0x0B, size=1]
    ADRParamSetupAnsPayload[cmd=ADRParamSetupAns, cid=0x0C, size=0]
    DeviceTimeReqPayload[cmd=DeviceTimeReq, cid=0x0D, size=0]
    RejoinParamSetupAnsPayload[cmd=RejoinParamSetupAns, cid=0x0F, size=1]
    PingSlotInfoReqPayload[cmd=PingSlotInfoReq, cid=0x10, size=1]
    PingSlotChannelAnsPayload[cmd=PingSlotChannelAns, cid=0x11, size=1]
    BeaconTimingReqPayload[cmd=BeaconTimingReq, cid=0x12, size=0]
    BeaconFreqAnsPayload[cmd=BeaconFreqAns, cid=0x13, size=1]
    DeviceModeIndPayload[cmd=DeviceModeInd, cid=0x20, size=1]
    RelayConfAnsPayload[cmd=RelayConfAns, cid=0x40, size=1]
    RelayEndDeviceConfAnsPayload[cmd=RelayEndDeviceConfAns, cid=0x41, size=1]
    RelayUpdateUplinkListAnsPayload[cmd=RelayUpdateUplinkListAns, cid=0x43, size=0]
    RelayCtrlUplinkListAnsPayload[cmd=RelayCtrlUplinkListAns, cid=0x44, size=5]
    RelayConfigureFwdLimitAnsPayload[cmd=RelayConfigureFwdLimitAns, cid=0x45, size=0]
    RelayNotifyNewEndDeviceReqPayload[cmd=RelayNotifyNewEndDeviceReq, cid=0x46, size=6]
}

mac_cmds! {
    DownlinkMacCommand, uplink=false;
    ResetConfPayload[cmd=ResetConf, cid=0x01, size=1]
    LinkCheckAnsPayload[cmd=LinkCheckAns, cid=0x02, size=2]
    LinkADRReqPayload[cmd=LinkADRReq, cid=0x03, size=4]
    DutyCycleReqPayload[cmd=DutyCycleReq, cid=0x04, size=1]
    RXParamSetupReqPayload[cmd=RXParamSetupReq, cid=0x05, size=4]
    DevStatusReqPayload[cmd=DevStatusReq, cid=0x06, size=0]
    NewChannelReqPayload[cmd=NewChannelReq, cid=0x07, size=5]
    RXTimingSetupReqPayload[cmd=RXTimingSetupReq, cid=0x08, size=1]
    TXParamSetupReqPayload[cmd=TXParamSetupReq, cid=0x09, size=1]
    DlChannelReqPayload[cmd=DlChannelReq, cid=0x0A, size=4]
    RekeyConfPayload[cmd=RekeyConf, cid=0x0B, size=1]
    ADRParamSetupReqPayload[cmd=ADRParamSetupReq, cid=0x0C, size=1]
    DeviceTimeAnsPayload[cmd=DeviceTimeAns, cid=0x0D, size=5]
    ForceRejoinReqPayload[cmd=ForceRejoinReq, cid=0x0E, size=2]
    RejoinParamSetupReqPayload[cmd=RejoinParamSetupReq, cid=0x0F, size=1]
    PingSlotInfoAnsPayload[cmd=PingSlotInfoAns, cid=0x10, size=0]
    PingSlotChannelReqPayload[cmd=PingSlotChannelReq, cid=0x11, size=4]
    BeaconTimingAnsPayload[cmd=BeaconTimingAns, cid=0x12, size=3]
    BeaconFreqReqPayload[cmd=BeaconFreqReq, cid=0x13, size=3]
    DeviceModeConfPayload[cmd=DeviceModeConf, cid=0x20, size=1]
    RelayConfReqPayload[cmd=RelayConfReq, cid=0x40, size=5]
    RelayEndDeviceConfReqPayload[cmd=RelayEndDeviceConfReq, cid=0x41, size=6]
    RelayUpdateUplinkListReqPayload[cmd=RelayUpdateUplinkListReq, cid=0x43, size=26]
    RelayCtrlUplinkListReqPayload[cmd=RelayCtrlUplinkListReq, cid=0x44, size=1]
    RelayConfigureFwdLimitReqPayload[cmd=RelayConfigureFwdLimitReq, cid=0x45, size=5]
}

mac_cmd_zero_len! {
    /// Request for link margin and gateway count.
    struct LinkCheckReqPayload;
    /// Acknowledges DutyCycleReq.
    struct DutyCycleAnsPayload;
    /// Requests battery level and margin.
    struct DevStatusReqPayload;
    /// Acknowledges RXTimingSetupReq.
    struct RXTimingSetupAnsPayload;
    /// Acknowledges TXParamSetupReq.
    struct TXParamSetupAnsPayload;
    /// Acknowledges ADRParamSetupReq.
    struct ADRParamSetupAnsPayload;
    /// Request for the network time.
    struct DeviceTimeReqPayload;
    /// Acknowledges PingSlotInfoReq.
    struct PingSlotInfoAnsPayload;
    /// Request for the next beacon timing. Deprecated since LoRaWAN 1.0.3.
    struct BeaconTimingReqPayload;
    /// Acknowledges RelayUpdateUplinkListReq.
    struct RelayUpdateUplinkListAnsPayload;
    /// Acknowledges RelayConfigureFwdLimitReq.
    struct RelayConfigureFwdLimitAnsPayload;
}

fn flags(bits: &[bool]) -> u8 {
    bits.iter().enumerate().fold(0, |acc, (i, &on)| acc | (u8::from(on) << i))
}

macro_rules! minor_version_cmds {
    ($( $(#[$outer:meta])* struct $type:ident; )*) => {
        $(
            $(#[$outer])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            #[cfg_attr(feature = "defmt", derive(defmt::Format))]
            #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
            pub struct $type {
                /// LoRaWAN minor version.
                pub minor: Minor,
            }

            impl $type {
                fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
                    check_range("MinorVersion", self.minor.value(), 0, 15)?;
                    push(buf, "MinorVersion", self.minor.value())
                }

                fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
                    Ok(Self { minor: Minor::from_nibble(data[0]) })
                }
            }
        )*
    };
}

minor_version_cmds! {
    /// ABP device reset indication.
    struct ResetIndPayload;
    /// Answer to ResetInd.
    struct ResetConfPayload;
    /// Session key update indication after a join.
    struct RekeyIndPayload;
    /// Answer to RekeyInd.
    struct RekeyConfPayload;
}

macro_rules! ack_cmds {
    ($( $(#[$outer:meta])* struct $type:ident { $( $(#[$field_meta:meta])* $field:ident ),* $(,)? } )*) => {
        $(
            $(#[$outer])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
            #[cfg_attr(feature = "defmt", derive(defmt::Format))]
            #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
            pub struct $type {
                $(
                    $(#[$field_meta])*
                    pub $field: bool,
                )*
            }

            impl $type {
                fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
                    push(buf, stringify!($type), flags(&[$( self.$field ),*]))
                }

                #[allow(unused_assignments)]
                fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
                    let mut n = 0;
                    $(
                        let $field = bit(data[0], n);
                        n += 1;
                    )*
                    Ok(Self { $( $field ),* })
                }
            }
        )*
    };
}

ack_cmds! {
    /// Answer to LinkADRReq, bit 0 first.
    struct LinkADRAnsPayload {
        /// Channel mask accepted.
        channel_mask_ack,
        /// Data rate accepted.
        data_rate_ack,
        /// TX power accepted.
        power_ack,
    }
    /// Answer to RXParamSetupReq.
    struct RXParamSetupAnsPayload {
        /// RX2 frequency accepted.
        channel_ack,
        /// RX2 data rate accepted.
        rx2_data_rate_ack,
        /// RX1 data rate offset accepted.
        rx1_dr_offset_ack,
    }
    /// Answer to NewChannelReq.
    struct NewChannelAnsPayload {
        /// Frequency usable.
        channel_frequency_ok,
        /// Data rate range usable.
        data_rate_range_ok,
    }
    /// Answer to DlChannelReq.
    struct DlChannelAnsPayload {
        /// Frequency usable.
        channel_frequency_ok,
        /// The uplink frequency of the channel exists.
        uplink_frequency_exists,
    }
    /// Answer to RejoinParamSetupReq.
    struct RejoinParamSetupAnsPayload {
        /// Time limit accepted.
        time_ok,
    }
    /// Answer to PingSlotChannelReq.
    struct PingSlotChannelAnsPayload {
        /// Frequency usable.
        channel_frequency_ok,
        /// Data rate usable.
        data_rate_ok,
    }
    /// Answer to BeaconFreqReq.
    struct BeaconFreqAnsPayload {
        /// Beacon frequency usable.
        beacon_frequency_ok,
    }
    /// Answer to RelayConfReq.
    struct RelayConfAnsPayload {
        /// Second channel frequency accepted.
        second_channel_frequency_ack,
        /// Second channel ACK offset accepted.
        second_channel_ack_offset_ack,
        /// Second channel data rate accepted.
        second_channel_data_rate_ack,
        /// Second channel index accepted.
        second_channel_index_ack,
        /// Default channel index accepted.
        default_channel_index_ack,
        /// CAD periodicity accepted.
        cad_periodicity_ack,
    }
    /// Answer to RelayEndDeviceConfReq.
    struct RelayEndDeviceConfAnsPayload {
        /// Second channel frequency accepted.
        second_channel_frequency_ack,
        /// Second channel ACK offset accepted.
        second_channel_ack_offset_ack,
        /// Second channel data rate accepted.
        second_channel_data_rate_ack,
        /// Second channel index accepted.
        second_channel_index_ack,
        /// Backoff accepted.
        backoff_ack,
    }
}

/// Answer to LinkCheckReq.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkCheckAnsPayload {
    /// Link margin in dB above the demodulation floor, 0..254.
    pub margin: u8,
    /// Number of gateways that received the request.
    pub gateway_count: u8,
}

impl LinkCheckAnsPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("Margin", self.margin, 0, 254)?;
        push(buf, "Margin", self.margin)?;
        push(buf, "GwCnt", self.gateway_count)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self { margin: data[0], gateway_count: data[1] })
    }
}

/// Channel mask, data rate and TX power update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkADRReqPayload {
    /// Data rate to use.
    pub data_rate: DR,
    /// TX power index, 0..15.
    pub tx_power: u8,
    /// Channel mask, interpreted according to `ch_mask_cntl`.
    pub channel_mask: ChMask16,
    /// ChMaskCntl, 0..7.
    pub ch_mask_cntl: u8,
    /// Transmissions per uplink, 0..15.
    pub nb_trans: u8,
}

impl LinkADRReqPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("TXPower", self.tx_power, 0, 15)?;
        check_range("ChMaskCntl", self.ch_mask_cntl, 0, 7)?;
        check_range("NbTrans", self.nb_trans, 0, 15)?;
        push(buf, "DataRate_TXPower", (self.data_rate.index() << 4) | self.tx_power)?;
        extend(buf, "ChMask", self.channel_mask.as_ref())?;
        push(buf, "Redundancy", (self.ch_mask_cntl << 4) | self.nb_trans)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            data_rate: DR::from_nibble(data[0] >> 4),
            tx_power: data[0] & 0x0f,
            channel_mask: ChMask16::from([data[1], data[2]]),
            ch_mask_cntl: (data[3] >> 4) & 0x07,
            nb_trans: data[3] & 0x0f,
        })
    }
}

/// Aggregated duty cycle limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DutyCycleReqPayload {
    /// The duty cycle is `1 / 2^max_duty_cycle`, 0..15.
    pub max_duty_cycle: u8,
}

impl DutyCycleReqPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("MaxDutyCycle", self.max_duty_cycle, 0, 15)?;
        push(buf, "MaxDutyCycle", self.max_duty_cycle)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self { max_duty_cycle: data[0] & 0x0f })
    }

    /// Duty cycle as a fraction.
    pub fn max_duty_cycle(&self) -> f32 {
        1.0 / (1u32 << (self.max_duty_cycle & 0x0f)) as f32
    }
}

/// Receive window parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RXParamSetupReqPayload {
    /// RX1 data rate offset, 0..7.
    pub rx1_dr_offset: u8,
    /// RX2 data rate.
    pub rx2_data_rate: DR,
    /// RX2 frequency in Hz.
    pub frequency: u32,
}

impl RXParamSetupReqPayload {
    fn append(&self, band: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("RX1DROffset", self.rx1_dr_offset, 0, 7)?;
        push(buf, "DLSettings", (self.rx1_dr_offset << 4) | self.rx2_data_rate.index())?;
        append_frequency(buf, "Frequency", self.frequency, band.freq_multiplier, false)
    }

    fn unmarshal(band: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            rx1_dr_offset: (data[0] >> 4) & 0x07,
            rx2_data_rate: DR::from_nibble(data[0]),
            frequency: read_frequency("Frequency", &data[1..], band.freq_multiplier, false)?,
        })
    }
}

/// Battery level and demodulation margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DevStatusAnsPayload {
    /// 0 on external power, 1..254 battery level, 255 unknown.
    pub battery: u8,
    /// SNR margin of the last DevStatusReq in dB, -32..31.
    pub margin: i8,
}

impl DevStatusAnsPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("Margin", self.margin, -32, 31)?;
        push(buf, "Battery", self.battery)?;
        push(buf, "Margin", (self.margin as u8) & 0x3f)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        // sign-extend the 6-bit field
        Ok(Self { battery: data[0], margin: ((data[1] << 2) as i8) >> 2 })
    }
}

/// Creates, modifies or disables a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewChannelReqPayload {
    /// Channel index.
    pub channel_index: u8,
    /// Frequency in Hz, 0 disables the channel.
    pub frequency: u32,
    /// Lowest data rate of the channel.
    pub min_data_rate: DR,
    /// Highest data rate of the channel.
    pub max_data_rate: DR,
}

impl NewChannelReqPayload {
    fn append(&self, band: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        push(buf, "ChIndex", self.channel_index)?;
        append_frequency(buf, "Frequency", self.frequency, band.freq_multiplier, true)?;
        push(buf, "DrRange", (self.max_data_rate.index() << 4) | self.min_data_rate.index())
    }

    fn unmarshal(band: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            channel_index: data[0],
            frequency: read_frequency("Frequency", &data[1..4], band.freq_multiplier, true)?,
            min_data_rate: DR::from_nibble(data[4]),
            max_data_rate: DR::from_nibble(data[4] >> 4),
        })
    }
}

/// Delay of the first receive window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RXTimingSetupReqPayload {
    /// Delay in seconds, 0 meaning 1, 0..15.
    pub delay: u8,
}

impl RXTimingSetupReqPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("Delay", self.delay, 0, 15)?;
        push(buf, "Delay", self.delay)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self { delay: data[0] & 0x0f })
    }
}

/// Dwell time and maximum EIRP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TXParamSetupReqPayload {
    /// 400 ms downlink dwell time limit.
    pub downlink_dwell_time: bool,
    /// 400 ms uplink dwell time limit.
    pub uplink_dwell_time: bool,
    /// Index into the EIRP table, 0..15.
    pub max_eirp: u8,
}

/// Maximum EIRP in dBm by `TXParamSetupReqPayload::max_eirp`.
pub const MAX_EIRP_TABLE: [u8; 16] = [8, 10, 12, 13, 14, 16, 18, 20, 21, 24, 26, 27, 29, 30, 33, 36];

impl TXParamSetupReqPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("MaxEIRP", self.max_eirp, 0, 15)?;
        let byte = (u8::from(self.downlink_dwell_time) << 5)
            | (u8::from(self.uplink_dwell_time) << 4)
            | self.max_eirp;
        push(buf, "EIRP_DwellTime", byte)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            downlink_dwell_time: bit(data[0], 5),
            uplink_dwell_time: bit(data[0], 4),
            max_eirp: data[0] & 0x0f,
        })
    }

    /// Maximum EIRP in dBm.
    pub fn max_eirp_dbm(&self) -> u8 {
        MAX_EIRP_TABLE[usize::from(self.max_eirp & 0x0f)]
    }
}

/// Moves the downlink frequency of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DlChannelReqPayload {
    /// Channel index.
    pub channel_index: u8,
    /// Downlink frequency in Hz.
    pub frequency: u32,
}

impl DlChannelReqPayload {
    fn append(&self, band: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        push(buf, "ChIndex", self.channel_index)?;
        append_frequency(buf, "Frequency", self.frequency, band.freq_multiplier, false)
    }

    fn unmarshal(band: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            channel_index: data[0],
            frequency: read_frequency("Frequency", &data[1..], band.freq_multiplier, false)?,
        })
    }
}

/// ADR_ACK_LIMIT and ADR_ACK_DELAY as powers of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ADRParamSetupReqPayload {
    /// Limit exponent, 0..15.
    pub limit_exp: u8,
    /// Delay exponent, 0..15.
    pub delay_exp: u8,
}

impl ADRParamSetupReqPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("LimitExp", self.limit_exp, 0, 15)?;
        check_range("DelayExp", self.delay_exp, 0, 15)?;
        push(buf, "ADRparam", (self.limit_exp << 4) | self.delay_exp)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self { limit_exp: data[0] >> 4, delay_exp: data[0] & 0x0f })
    }
}

/// Network time at the end of the uplink that carried DeviceTimeReq.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceTimeAnsPayload {
    /// Instant, sent as GPS time with 1/256 s resolution.
    pub time: DateTime<Utc>,
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceTimeAnsPayload {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "DeviceTimeAnsPayload {{ unix: {=i64}, nanos: {=u32} }}",
            self.time.timestamp(),
            self.time.timestamp_subsec_nanos()
        )
    }
}

const NANOS_PER_FRACTION: u32 = 3_906_250;

impl DeviceTimeAnsPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        let out_of_range = || {
            encode_error(
                "GPSTime",
                FieldError::OutOfRange {
                    min: gps::GPS_EPOCH_UNIX,
                    max: gps::GPS_EPOCH_UNIX + i64::from(u32::MAX),
                    value: self.time.timestamp(),
                },
            )
        };
        let gps = gps::to_gps(self.time).ok_or_else(out_of_range)?;
        let fraction = (u64::from(gps.subsec_nanos()) * 256 + 500_000_000) / 1_000_000_000;
        let secs = gps.as_secs() + fraction / 256;
        let secs = u32::try_from(secs).map_err(|_| out_of_range())?;
        extend(buf, "GPSTime", &secs.to_le_bytes())?;
        push(buf, "Fraction", (fraction % 256) as u8)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        let secs = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let gps = core::time::Duration::new(u64::from(secs), u32::from(data[4]) * NANOS_PER_FRACTION);
        let time = gps::from_gps(gps).ok_or(decode_error(
            "GPSTime",
            FieldError::OutOfRange { min: 0, max: i64::from(u32::MAX), value: i64::from(secs) },
        ))?;
        Ok(Self { time })
    }
}

/// Forces the device to send a RejoinRequest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForceRejoinReqPayload {
    /// Delay between retransmissions is `32 s * 2^period + rand(0..32) s`, 0..7.
    pub period: u8,
    /// Retransmissions after the first, 0..7.
    pub max_retries: u8,
    /// RejoinRequest type to send, 0..2.
    pub rejoin_type: u8,
    /// Data rate of the RejoinRequest.
    pub data_rate: DR,
}

impl ForceRejoinReqPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("Period", self.period, 0, 7)?;
        check_range("MaxRetries", self.max_retries, 0, 7)?;
        check_range("RejoinType", self.rejoin_type, 0, 2)?;
        push(buf, "Period_MaxRetries", (self.period << 3) | self.max_retries)?;
        push(buf, "RejoinType_DR", (self.rejoin_type << 4) | self.data_rate.index())
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        let rejoin_type = (data[1] >> 4) & 0x07;
        if rejoin_type > 2 {
            return Err(decode_error("RejoinType", FieldError::Unknown { value: u32::from(rejoin_type) }));
        }
        Ok(Self {
            period: (data[0] >> 3) & 0x07,
            max_retries: data[0] & 0x07,
            rejoin_type,
            data_rate: DR::from_nibble(data[1]),
        })
    }
}

/// Periodic RejoinRequest limits as powers of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RejoinParamSetupReqPayload {
    /// Time limit exponent, 0..15.
    pub max_time_n: u8,
    /// Uplink count exponent, 0..15.
    pub max_count_n: u8,
}

impl RejoinParamSetupReqPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("MaxTimeN", self.max_time_n, 0, 15)?;
        check_range("MaxCountN", self.max_count_n, 0, 15)?;
        push(buf, "RejoinParamSetupReq", (self.max_time_n << 4) | self.max_count_n)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self { max_time_n: data[0] >> 4, max_count_n: data[0] & 0x0f })
    }
}

/// Class B ping slot periodicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PingSlotInfoReqPayload {
    /// One ping slot every `2^periodicity` seconds, 0..7.
    pub periodicity: u8,
}

impl PingSlotInfoReqPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("Periodicity", self.periodicity, 0, 7)?;
        push(buf, "Periodicity", self.periodicity)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self { periodicity: data[0] & 0x07 })
    }
}

/// Class B ping slot channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PingSlotChannelReqPayload {
    /// Frequency in Hz, 0 restores the default hopping.
    pub frequency: u32,
    /// Data rate.
    pub data_rate: DR,
}

impl PingSlotChannelReqPayload {
    fn append(&self, band: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        append_frequency(buf, "Frequency", self.frequency, band.freq_multiplier, true)?;
        push(buf, "DR", self.data_rate.index())
    }

    fn unmarshal(band: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            frequency: read_frequency("Frequency", &data[..3], band.freq_multiplier, true)?,
            data_rate: DR::from_nibble(data[3]),
        })
    }
}

/// Time to the next beacon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeaconTimingAnsPayload {
    /// Delay in 30 ms units.
    pub delay: u16,
    /// Channel of the next beacon.
    pub channel: u8,
}

impl BeaconTimingAnsPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        let [lo, hi] = self.delay.to_le_bytes();
        push(buf, "Delay", lo)?;
        push(buf, "Delay", hi)?;
        push(buf, "Channel", self.channel)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self { delay: u16::from_le_bytes([data[0], data[1]]), channel: data[2] })
    }
}

/// Class B beacon frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeaconFreqReqPayload {
    /// Frequency in Hz, 0 restores the default.
    pub frequency: u32,
}

impl BeaconFreqReqPayload {
    fn append(&self, band: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        append_frequency(buf, "Frequency", self.frequency, band.freq_multiplier, true)
    }

    fn unmarshal(band: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self { frequency: read_frequency("Frequency", data, band.freq_multiplier, true)? })
    }
}

macro_rules! device_mode_cmds {
    ($( $(#[$outer:meta])* struct $type:ident; )*) => {
        $(
            $(#[$outer])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            #[cfg_attr(feature = "defmt", derive(defmt::Format))]
            #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
            pub struct $type {
                /// Device class.
                pub class: DeviceClass,
            }

            impl $type {
                fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
                    push(buf, "Class", self.class.value())
                }

                fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
                    let class = DeviceClass::try_from(data[0]).map_err(|_| {
                        decode_error("Class", FieldError::Unknown { value: u32::from(data[0]) })
                    })?;
                    Ok(Self { class })
                }
            }
        )*
    };
}

device_mode_cmds! {
    /// Class switch indication.
    struct DeviceModeIndPayload;
    /// Answer to DeviceModeInd.
    struct DeviceModeConfPayload;
}

/// Second wake-on-radio channel of a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelaySecondChannel {
    /// ACK offset index, 0..7.
    pub ack_offset: u8,
    /// Data rate.
    pub data_rate: DR,
    /// Frequency in Hz.
    pub frequency: u32,
}

impl RelaySecondChannel {
    /// Low seven bits of a channel settings field.
    fn settings(&self) -> Result<u16, Error> {
        check_range("SecondChAckOffset", self.ack_offset, 0, 7)?;
        Ok(u16::from(self.ack_offset) | (u16::from(self.data_rate.index()) << 3))
    }
}

/// Encodes the second channel settings and frequency around `settings`.
fn append_second_channel(
    band: &Band,
    buf: &mut PayloadBytes,
    second: Option<&RelaySecondChannel>,
    settings: u16,
) -> Result<(), Error> {
    let (settings, frequency) = match second {
        Some(ch) => (settings | ch.settings()? | (1 << 7), ch.frequency),
        None => (settings, 0),
    };
    let [lo, hi] = settings.to_le_bytes();
    push(buf, "ChannelSettings", lo)?;
    push(buf, "ChannelSettings", hi)?;
    if second.is_some() {
        append_frequency(buf, "SecondChFreq", frequency, band.freq_multiplier, false)
    } else {
        append_frequency(buf, "SecondChFreq", 0, band.freq_multiplier, true)
    }
}

fn read_second_channel(band: &Band, settings: u16, freq: &[u8]) -> Result<Option<RelaySecondChannel>, Error> {
    match (settings >> 7) & 0x03 {
        0 => Ok(None),
        1 => Ok(Some(RelaySecondChannel {
            ack_offset: (settings & 0x07) as u8,
            data_rate: DR::from_nibble((settings >> 3) as u8),
            frequency: read_frequency("SecondChFreq", freq, band.freq_multiplier, false)?,
        })),
        v => Err(decode_error("SecondChIdx", FieldError::Unknown { value: u32::from(v) })),
    }
}

/// Relay configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayConfReqPayload {
    /// Relay enabled.
    pub start_stop: bool,
    /// CAD periodicity index, 0..7.
    pub cad_periodicity: u8,
    /// Default channel index, 0..1.
    pub default_channel_index: u8,
    /// Optional second wake-on-radio channel.
    pub second_channel: Option<RelaySecondChannel>,
}

impl RelayConfReqPayload {
    fn append(&self, band: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("CADPeriodicity", self.cad_periodicity, 0, 7)?;
        check_range("DefaultChIdx", self.default_channel_index, 0, 1)?;
        let settings = (u16::from(self.start_stop) << 13)
            | (u16::from(self.cad_periodicity) << 10)
            | (u16::from(self.default_channel_index) << 9);
        append_second_channel(band, buf, self.second_channel.as_ref(), settings)
    }

    fn unmarshal(band: &Band, data: &[u8]) -> Result<Self, Error> {
        let settings = u16::from_le_bytes([data[0], data[1]]);
        Ok(Self {
            start_stop: settings & (1 << 13) != 0,
            cad_periodicity: ((settings >> 10) & 0x07) as u8,
            default_channel_index: ((settings >> 9) & 0x01) as u8,
            second_channel: read_second_channel(band, settings, &data[2..])?,
        })
    }
}

/// Relay mode of an end device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelayEndDeviceMode {
    /// Never uses the relay.
    Disabled,
    /// Always uses the relay.
    Enabled,
    /// Uses the relay after missing downlinks.
    Dynamic {
        /// Number of missed ADRACKReq before switching, as an index 0..3.
        smart_enable_level: u8,
    },
    /// The end device decides.
    EndDeviceControlled,
}

/// Relay configuration of an end device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayEndDeviceConfReqPayload {
    /// Relay mode.
    pub mode: RelayEndDeviceMode,
    /// Backoff in uplinks before retrying the relay, 0..63.
    pub backoff: u8,
    /// Optional second wake-on-radio channel.
    pub second_channel: Option<RelaySecondChannel>,
}

impl RelayEndDeviceConfReqPayload {
    fn append(&self, band: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("Backoff", self.backoff, 0, 63)?;
        let (mode, level) = match self.mode {
            RelayEndDeviceMode::Disabled => (0, 0),
            RelayEndDeviceMode::Enabled => (1, 0),
            RelayEndDeviceMode::Dynamic { smart_enable_level } => {
                check_range("SmartEnableLevel", smart_enable_level, 0, 3)?;
                (2, smart_enable_level)
            }
            RelayEndDeviceMode::EndDeviceControlled => (3, 0),
        };
        push(buf, "Activation", (mode << 2) | level)?;
        append_second_channel(band, buf, self.second_channel.as_ref(), u16::from(self.backoff) << 9)
    }

    fn unmarshal(band: &Band, data: &[u8]) -> Result<Self, Error> {
        let mode = match (data[0] >> 2) & 0x03 {
            0 => RelayEndDeviceMode::Disabled,
            1 => RelayEndDeviceMode::Enabled,
            2 => RelayEndDeviceMode::Dynamic { smart_enable_level: data[0] & 0x03 },
            _ => RelayEndDeviceMode::EndDeviceControlled,
        };
        let settings = u16::from_le_bytes([data[1], data[2]]);
        Ok(Self {
            mode,
            backoff: ((settings >> 9) & 0x3f) as u8,
            second_channel: read_second_channel(band, settings, &data[3..])?,
        })
    }
}

/// Token bucket of a relay forwarding limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayUplinkLimits {
    /// Bucket size factor, 0..3.
    pub bucket_size: u8,
    /// Tokens per hour, 0..63.
    pub reload_rate: u8,
}

/// Adds or updates an end device in the trusted list of a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayUpdateUplinkListReqPayload {
    /// Slot in the list, 0..15.
    pub uplink_list_index: u8,
    /// Forwarding limits of the device.
    pub uplink_limits: RelayUplinkLimits,
    /// Device address.
    pub dev_addr: DevAddr,
    /// Current wake-on-radio frame counter.
    pub w_f_cnt: u32,
    /// Root wake-on-radio session key.
    pub root_wor_s_key: AesKey,
}

impl RelayUpdateUplinkListReqPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("UplinkListIdx", self.uplink_list_index, 0, 15)?;
        check_range("BucketSize", self.uplink_limits.bucket_size, 0, 3)?;
        check_range("ReloadRate", self.uplink_limits.reload_rate, 0, 63)?;
        push(buf, "UplinkListIdx", self.uplink_list_index)?;
        push(buf, "UplinkLimit", (self.uplink_limits.bucket_size << 6) | self.uplink_limits.reload_rate)?;
        extend(buf, "DevAddr", &self.dev_addr.to_le_bytes())?;
        extend(buf, "WFCnt", &self.w_f_cnt.to_le_bytes())?;
        extend(buf, "RootWorSKey", &self.root_wor_s_key.0)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        let mut key = [0u8; 16];
        key.copy_from_slice(&data[10..26]);
        Ok(Self {
            uplink_list_index: data[0] & 0x0f,
            uplink_limits: RelayUplinkLimits { bucket_size: data[1] >> 6, reload_rate: data[1] & 0x3f },
            dev_addr: DevAddr([data[5], data[4], data[3], data[2]]),
            w_f_cnt: u32::from_le_bytes([data[6], data[7], data[8], data[9]]),
            root_wor_s_key: AesKey(key),
        })
    }
}

/// Operation of RelayCtrlUplinkListReq.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelayCtrlUplinkListAction {
    /// Read the wake-on-radio frame counter.
    ReadWFCnt,
    /// Remove the end device from the list.
    RemoveTrustedEndDevice,
}

/// Reads or removes a trusted list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayCtrlUplinkListReqPayload {
    /// Slot in the list, 0..15.
    pub uplink_list_index: u8,
    /// Operation.
    pub action: RelayCtrlUplinkListAction,
}

impl RelayCtrlUplinkListReqPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("UplinkListIdx", self.uplink_list_index, 0, 15)?;
        let action = match self.action {
            RelayCtrlUplinkListAction::ReadWFCnt => 0,
            RelayCtrlUplinkListAction::RemoveTrustedEndDevice => 1,
        };
        push(buf, "CtrlUplinkAction", (action << 4) | self.uplink_list_index)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        let action = match data[0] >> 4 {
            0 => RelayCtrlUplinkListAction::ReadWFCnt,
            1 => RelayCtrlUplinkListAction::RemoveTrustedEndDevice,
            v => return Err(decode_error("CtrlUplinkAction", FieldError::Unknown { value: u32::from(v) })),
        };
        Ok(Self { uplink_list_index: data[0] & 0x0f, action })
    }
}

/// Answer to RelayCtrlUplinkListReq.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayCtrlUplinkListAnsPayload {
    /// The list index exists.
    pub uplink_list_index_ack: bool,
    /// Wake-on-radio frame counter of the entry.
    pub w_f_cnt: u32,
}

impl RelayCtrlUplinkListAnsPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        push(buf, "Status", u8::from(self.uplink_list_index_ack))?;
        extend(buf, "WFCnt", &self.w_f_cnt.to_le_bytes())
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            uplink_list_index_ack: bit(data[0], 0),
            w_f_cnt: u32::from_le_bytes([data[1], data[2], data[3], data[4]]),
        })
    }
}

/// Relay forwarding limit. `None` in a request leaves the limit unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayForwardLimits {
    /// Bucket size factor, 0..3.
    pub bucket_size: u8,
    /// Tokens per hour, 0..126.
    pub reload_rate: u8,
}

/// How the relay resets its limit counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum ResetLimitCounter {
    Zero,
    ReloadRate,
    MaxValue,
    #[default]
    NoChange,
}

const UNCHANGED_RELOAD_RATE: u32 = 0x7f;

/// Forwarding limits of a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayConfigureFwdLimitReqPayload {
    /// Counter reset behavior.
    pub reset_limit_counter: ResetLimitCounter,
    /// Forwarded JoinRequests.
    pub join_req_limits: Option<RelayForwardLimits>,
    /// Notifications of new end devices.
    pub notify_limits: Option<RelayForwardLimits>,
    /// Forwarded uplinks of all devices.
    pub global_uplink_limits: Option<RelayForwardLimits>,
    /// Everything the relay sends.
    pub overall_limits: Option<RelayForwardLimits>,
}

impl RelayConfigureFwdLimitReqPayload {
    /// Limits in wire order, least significant field first.
    fn limits(&self) -> [Option<RelayForwardLimits>; 4] {
        [self.overall_limits, self.global_uplink_limits, self.notify_limits, self.join_req_limits]
    }

    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        let mut reload = 0u32;
        let mut buckets = 0u8;
        for (i, limit) in self.limits().iter().enumerate() {
            let (rate, bucket) = match limit {
                Some(l) => {
                    check_range("ReloadRate", l.reload_rate, 0, 126)?;
                    check_range("BucketSize", l.bucket_size, 0, 3)?;
                    (u32::from(l.reload_rate), l.bucket_size)
                }
                None => (UNCHANGED_RELOAD_RATE, 0),
            };
            reload |= rate << (7 * i);
            buckets |= bucket << (2 * i);
        }
        let reset = match self.reset_limit_counter {
            ResetLimitCounter::Zero => 0,
            ResetLimitCounter::ReloadRate => 1,
            ResetLimitCounter::MaxValue => 2,
            ResetLimitCounter::NoChange => 3,
        };
        reload |= reset << 28;
        extend(buf, "ReloadRate", &reload.to_le_bytes())?;
        push(buf, "LoadCapacity", buckets)
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        let reload = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let limit = |i: u32| {
            let rate = (reload >> (7 * i)) & 0x7f;
            (rate != UNCHANGED_RELOAD_RATE).then(|| RelayForwardLimits {
                bucket_size: (data[4] >> (2 * i)) & 0x03,
                reload_rate: rate as u8,
            })
        };
        Ok(Self {
            reset_limit_counter: match (reload >> 28) & 0x03 {
                0 => ResetLimitCounter::Zero,
                1 => ResetLimitCounter::ReloadRate,
                2 => ResetLimitCounter::MaxValue,
                _ => ResetLimitCounter::NoChange,
            },
            overall_limits: limit(0),
            global_uplink_limits: limit(1),
            notify_limits: limit(2),
            join_req_limits: limit(3),
        })
    }
}

/// Notification of an end device unknown to the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayNotifyNewEndDeviceReqPayload {
    /// Address of the end device.
    pub dev_addr: DevAddr,
    /// SNR of the received uplink in dB, -20..11.
    pub snr: i8,
    /// RSSI of the received uplink in dBm, -142..-15.
    pub rssi: i16,
}

impl RelayNotifyNewEndDeviceReqPayload {
    fn append(&self, _: &Band, buf: &mut PayloadBytes) -> Result<(), Error> {
        check_range("SNR", self.snr, -20, 11)?;
        check_range("RSSI", self.rssi, -142, -15)?;
        let power = ((self.snr + 20) as u16) | (((-self.rssi - 15) as u16) << 5);
        let [lo, hi] = power.to_le_bytes();
        push(buf, "PowerLevel", lo)?;
        push(buf, "PowerLevel", hi)?;
        extend(buf, "DevAddr", &self.dev_addr.to_le_bytes())
    }

    fn unmarshal(_: &Band, data: &[u8]) -> Result<Self, Error> {
        let power = u16::from_le_bytes([data[0], data[1]]);
        Ok(Self {
            snr: (power & 0x1f) as i8 - 20,
            rssi: -(((power >> 5) & 0x7f) as i16) - 15,
            dev_addr: DevAddr([data[5], data[4], data[3], data[2]]),
        })
    }
}

type Appender<C> = fn(&Band, &C, &mut PayloadBytes) -> Result<(), Error>;
type Unmarshaler<C> = fn(&Band, &[u8]) -> Result<C, Error>;

fn append_as<P: MacCommandPayload>(band: &Band, cmd: &P::Command, buf: &mut PayloadBytes) -> Result<(), Error> {
    let payload = P::from_command(cmd).ok_or(Error::InvalidMacCommandDirection { cid: P::CID })?;
    payload.append_payload(band, buf)
}

fn unmarshal_as<P: MacCommandPayload>(band: &Band, data: &[u8]) -> Result<P::Command, Error> {
    P::unmarshal_payload(band, data).map(P::into_command)
}

/// Descriptor of one CID.
///
/// A direction a command is not defined for has no coder functions.
#[derive(Clone, Copy)]
pub struct MacCommandSpec {
    /// Command identifier.
    pub cid: u8,
    /// Command family name.
    pub name: &'static str,
    /// The exchange starts with the uplink command.
    pub initiated_by_device: bool,
    /// Uplink payload length, CID excluded.
    pub uplink_length: usize,
    /// Downlink payload length, CID excluded.
    pub downlink_length: usize,
    pub(crate) append_uplink: Option<Appender<UplinkMacCommand>>,
    pub(crate) unmarshal_uplink: Option<Unmarshaler<UplinkMacCommand>>,
    pub(crate) append_downlink: Option<Appender<DownlinkMacCommand>>,
    pub(crate) unmarshal_downlink: Option<Unmarshaler<DownlinkMacCommand>>,
}

impl MacCommandSpec {
    /// Whether the command is defined for uplinks.
    pub fn has_uplink(&self) -> bool {
        self.unmarshal_uplink.is_some()
    }

    /// Whether the command is defined for downlinks.
    pub fn has_downlink(&self) -> bool {
        self.unmarshal_downlink.is_some()
    }
}

impl core::fmt::Debug for MacCommandSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MacCommandSpec")
            .field("cid", &self.cid)
            .field("name", &self.name)
            .field("initiated_by_device", &self.initiated_by_device)
            .field("uplink_length", &self.uplink_length)
            .field("downlink_length", &self.downlink_length)
            .finish()
    }
}

const fn both<U, D>(name: &'static str, initiated_by_device: bool) -> MacCommandSpec
where
    U: MacCommandPayload<Command = UplinkMacCommand>,
    D: MacCommandPayload<Command = DownlinkMacCommand>,
{
    MacCommandSpec {
        cid: U::CID,
        name,
        initiated_by_device,
        uplink_length: U::LEN,
        downlink_length: D::LEN,
        append_uplink: Some(append_as::<U>),
        unmarshal_uplink: Some(unmarshal_as::<U>),
        append_downlink: Some(append_as::<D>),
        unmarshal_downlink: Some(unmarshal_as::<D>),
    }
}

const fn uplink_only<U>(name: &'static str) -> MacCommandSpec
where
    U: MacCommandPayload<Command = UplinkMacCommand>,
{
    MacCommandSpec {
        cid: U::CID,
        name,
        initiated_by_device: true,
        uplink_length: U::LEN,
        downlink_length: 0,
        append_uplink: Some(append_as::<U>),
        unmarshal_uplink: Some(unmarshal_as::<U>),
        append_downlink: None,
        unmarshal_downlink: None,
    }
}

const fn downlink_only<D>(name: &'static str) -> MacCommandSpec
where
    D: MacCommandPayload<Command = DownlinkMacCommand>,
{
    MacCommandSpec {
        cid: D::CID,
        name,
        initiated_by_device: false,
        uplink_length: 0,
        downlink_length: D::LEN,
        append_uplink: None,
        unmarshal_uplink: None,
        append_downlink: Some(append_as::<D>),
        unmarshal_downlink: Some(unmarshal_as::<D>),
    }
}

static MAC_COMMANDS: [MacCommandSpec; 26] = [
    both::<ResetIndPayload, ResetConfPayload>("Reset", true),
    both::<LinkCheckReqPayload, LinkCheckAnsPayload>("LinkCheck", true),
    both::<LinkADRAnsPayload, LinkADRReqPayload>("LinkADR", false),
    both::<DutyCycleAnsPayload, DutyCycleReqPayload>("DutyCycle", false),
    both::<RXParamSetupAnsPayload, RXParamSetupReqPayload>("RXParamSetup", false),
    both::<DevStatusAnsPayload, DevStatusReqPayload>("DevStatus", false),
    both::<NewChannelAnsPayload, NewChannelReqPayload>("NewChannel", false),
    both::<RXTimingSetupAnsPayload, RXTimingSetupReqPayload>("RXTimingSetup", false),
    both::<TXParamSetupAnsPayload, TXParamSetupReqPayload>("TXParamSetup", false),
    both::<DlChannelAnsPayload, DlChannelReqPayload>("DlChannel", false),
    both::<RekeyIndPayload, RekeyConfPayload>("Rekey", true),
    both::<ADRParamSetupAnsPayload, ADRParamSetupReqPayload>("ADRParamSetup", false),
    both::<DeviceTimeReqPayload, DeviceTimeAnsPayload>("DeviceTime", true),
    downlink_only::<ForceRejoinReqPayload>("ForceRejoin"),
    both::<RejoinParamSetupAnsPayload, RejoinParamSetupReqPayload>("RejoinParamSetup", false),
    both::<PingSlotInfoReqPayload, PingSlotInfoAnsPayload>("PingSlotInfo", true),
    both::<PingSlotChannelAnsPayload, PingSlotChannelReqPayload>("PingSlotChannel", false),
    both::<BeaconTimingReqPayload, BeaconTimingAnsPayload>("BeaconTiming", true),
    both::<BeaconFreqAnsPayload, BeaconFreqReqPayload>("BeaconFreq", false),
    both::<DeviceModeIndPayload, DeviceModeConfPayload>("DeviceMode", true),
    both::<RelayConfAnsPayload, RelayConfReqPayload>("RelayConf", false),
    both::<RelayEndDeviceConfAnsPayload, RelayEndDeviceConfReqPayload>("RelayEndDeviceConf", false),
    both::<RelayUpdateUplinkListAnsPayload, RelayUpdateUplinkListReqPayload>("RelayUpdateUplinkList", false),
    both::<RelayCtrlUplinkListAnsPayload, RelayCtrlUplinkListReqPayload>("RelayCtrlUplinkList", false),
    both::<RelayConfigureFwdLimitAnsPayload, RelayConfigureFwdLimitReqPayload>("RelayConfigureFwdLimit", false),
    uplink_only::<RelayNotifyNewEndDeviceReqPayload>("RelayNotifyNewEndDevice"),
];

/// Descriptor of `cid`, if the codec knows it.
pub fn lookup(cid: u8) -> Option<&'static MacCommandSpec> {
    MAC_COMMANDS.iter().find(|spec| spec.cid == cid)
}

/// Every known descriptor, ordered by CID.
pub fn mac_command_specs() -> &'static [MacCommandSpec] {
    &MAC_COMMANDS
}

fn read_raw<C>(cid: u8, rest: &[u8], raw: impl FnOnce(u8, Vec<u8, MAX_RAW_PAYLOAD_SIZE>) -> C) -> Result<C, Error> {
    debug!("unknown MAC command {}, keeping {} bytes raw", cid, rest.len());
    let payload = Vec::from_slice(rest)
        .map_err(|_| decode_error("Raw", FieldError::BufferTooSmall { capacity: MAX_RAW_PAYLOAD_SIZE }))?;
    Ok(raw(cid, payload))
}

/// Decodes one uplink MAC command from the front of `data`.
///
/// Returns the command and the number of bytes it used, CID included.
pub fn read_uplink(band: &Band, data: &[u8]) -> Result<(UplinkMacCommand, usize), Error> {
    let Some((&cid, rest)) = data.split_first() else {
        return Err(decode_error("CID", FieldError::Missing));
    };
    let Some(spec) = lookup(cid) else {
        let cmd = read_raw(cid, rest, |cid, payload| UplinkMacCommand::Raw { cid, payload })?;
        return Ok((cmd, data.len()));
    };
    let unmarshal = spec.unmarshal_uplink.ok_or(Error::InvalidMacCommandDirection { cid })?;
    let (payload, _) = take(spec.name, rest, spec.uplink_length)?;
    let cmd = unmarshal(band, payload)?;
    trace!("decoded uplink MAC command {}", spec.name);
    Ok((cmd, 1 + spec.uplink_length))
}

/// Decodes one downlink MAC command from the front of `data`.
///
/// Returns the command and the number of bytes it used, CID included.
pub fn read_downlink(band: &Band, data: &[u8]) -> Result<(DownlinkMacCommand, usize), Error> {
    let Some((&cid, rest)) = data.split_first() else {
        return Err(decode_error("CID", FieldError::Missing));
    };
    let Some(spec) = lookup(cid) else {
        let cmd = read_raw(cid, rest, |cid, payload| DownlinkMacCommand::Raw { cid, payload })?;
        return Ok((cmd, data.len()));
    };
    let unmarshal = spec.unmarshal_downlink.ok_or(Error::InvalidMacCommandDirection { cid })?;
    let (payload, _) = take(spec.name, rest, spec.downlink_length)?;
    let cmd = unmarshal(band, payload)?;
    trace!("decoded downlink MAC command {}", spec.name);
    Ok((cmd, 1 + spec.downlink_length))
}

/// Iterator over the MAC commands of an FOpts field or a port 0 FRMPayload.
///
/// Stops after the first error.
pub struct MacCommandIterator<'a, T> {
    band: &'a Band,
    data: &'a [u8],
    index: usize,
    read: fn(&Band, &[u8]) -> Result<(T, usize), Error>,
}

impl<T> Iterator for MacCommandIterator<'_, T> {
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.data.get(self.index..).filter(|d| !d.is_empty())?;
        match (self.read)(self.band, data) {
            Ok((cmd, len)) => {
                self.index += len;
                Some(Ok(cmd))
            }
            Err(err) => {
                self.index = self.data.len();
                Some(Err(err))
            }
        }
    }
}

/// Decodes a stream of uplink MAC commands.
///
/// # Examples
///
/// ```
/// use lorawan_codec::band::{get_latest, BandId};
/// use lorawan_codec::encoding::maccommands::{read_uplink_mac_commands, UplinkMacCommand};
///
/// let band = get_latest(BandId::Eu863870).unwrap();
/// let cmds: Result<Vec<_>, _> = read_uplink_mac_commands(band, &[0x02, 0x03, 0x07]).collect();
/// let cmds = cmds.unwrap();
/// assert_eq!(cmds.len(), 2);
/// assert!(matches!(cmds[1], UplinkMacCommand::LinkADRAns(ans) if ans.power_ack && ans.data_rate_ack));
/// ```
pub fn read_uplink_mac_commands<'a>(band: &'a Band, data: &'a [u8]) -> MacCommandIterator<'a, UplinkMacCommand> {
    MacCommandIterator { band, data, index: 0, read: read_uplink }
}

/// Decodes a stream of downlink MAC commands.
pub fn read_downlink_mac_commands<'a>(
    band: &'a Band,
    data: &'a [u8],
) -> MacCommandIterator<'a, DownlinkMacCommand> {
    MacCommandIterator { band, data, index: 0, read: read_downlink }
}
