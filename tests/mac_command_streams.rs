use chrono::{DateTime, Utc};
use heapless::Vec;
use lorawan_codec::band::{all, Band};
use lorawan_codec::channel_mask::ChMask16;
use lorawan_codec::encoding::maccommandcreator::{append_downlink_mac_commands, append_uplink_mac_commands};
use lorawan_codec::encoding::maccommands::*;
use lorawan_codec::encoding::MAX_PHY_PAYLOAD_SIZE;
use lorawan_codec::types::{DevAddr, DeviceClass, Minor, DR};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn dr(rng: &mut StdRng) -> DR {
    DR::from_nibble(rng.gen())
}

fn frequency(rng: &mut StdRng, band: &Band, allow_zero: bool) -> u32 {
    if allow_zero && rng.gen_bool(0.2) {
        return 0;
    }
    rng.gen_range(1_000..=0x00ff_ffff) * band.freq_multiplier
}

fn second_channel(rng: &mut StdRng, band: &Band) -> Option<RelaySecondChannel> {
    rng.gen_bool(0.5).then(|| RelaySecondChannel {
        ack_offset: rng.gen_range(0..=7),
        data_rate: dr(rng),
        frequency: frequency(rng, band, false),
    })
}

fn fwd_limits(rng: &mut StdRng) -> Option<RelayForwardLimits> {
    rng.gen_bool(0.7).then(|| RelayForwardLimits {
        bucket_size: rng.gen_range(0..=3),
        reload_rate: rng.gen_range(0..=126),
    })
}

fn random_downlink(rng: &mut StdRng, band: &Band) -> DownlinkMacCommand {
    match rng.gen_range(0..20) {
        0 => ResetConfPayload { minor: Minor::One }.into(),
        1 => LinkCheckAnsPayload { margin: rng.gen_range(0..=254), gateway_count: rng.gen() }.into(),
        2 => LinkADRReqPayload {
            data_rate: dr(rng),
            tx_power: rng.gen_range(0..=15),
            channel_mask: ChMask16::from(rng.gen::<u16>()),
            ch_mask_cntl: rng.gen_range(0..=7),
            nb_trans: rng.gen_range(0..=15),
        }
        .into(),
        3 => DutyCycleReqPayload { max_duty_cycle: rng.gen_range(0..=15) }.into(),
        4 => RXParamSetupReqPayload {
            rx1_dr_offset: rng.gen_range(0..=7),
            rx2_data_rate: dr(rng),
            frequency: frequency(rng, band, false),
        }
        .into(),
        5 => DevStatusReqPayload.into(),
        6 => NewChannelReqPayload {
            channel_index: rng.gen(),
            frequency: frequency(rng, band, true),
            min_data_rate: dr(rng),
            max_data_rate: dr(rng),
        }
        .into(),
        7 => TXParamSetupReqPayload {
            downlink_dwell_time: rng.gen(),
            uplink_dwell_time: rng.gen(),
            max_eirp: rng.gen_range(0..=15),
        }
        .into(),
        8 => DlChannelReqPayload { channel_index: rng.gen(), frequency: frequency(rng, band, false) }.into(),
        9 => DeviceTimeAnsPayload {
            // whole 1/256 s steps survive the fraction rounding
            time: DateTime::<Utc>::from_timestamp(
                rng.gen_range(1_500_000_000..2_000_000_000),
                rng.gen_range(0..256u32) * 3_906_250,
            )
            .unwrap(),
        }
        .into(),
        10 => ForceRejoinReqPayload {
            period: rng.gen_range(0..=7),
            max_retries: rng.gen_range(0..=7),
            rejoin_type: rng.gen_range(0..=2),
            data_rate: dr(rng),
        }
        .into(),
        11 => PingSlotChannelReqPayload { frequency: frequency(rng, band, true), data_rate: dr(rng) }.into(),
        12 => BeaconTimingAnsPayload { delay: rng.gen(), channel: rng.gen() }.into(),
        13 => BeaconFreqReqPayload { frequency: frequency(rng, band, true) }.into(),
        14 => DeviceModeConfPayload { class: DeviceClass::C }.into(),
        15 => RelayConfReqPayload {
            start_stop: rng.gen(),
            cad_periodicity: rng.gen_range(0..=7),
            default_channel_index: rng.gen_range(0..=1),
            second_channel: second_channel(rng, band),
        }
        .into(),
        16 => RelayEndDeviceConfReqPayload {
            mode: RelayEndDeviceMode::Dynamic { smart_enable_level: rng.gen_range(0..=3) },
            backoff: rng.gen_range(0..=63),
            second_channel: second_channel(rng, band),
        }
        .into(),
        17 => RelayUpdateUplinkListReqPayload {
            uplink_list_index: rng.gen_range(0..=15),
            uplink_limits: RelayUplinkLimits {
                bucket_size: rng.gen_range(0..=3),
                reload_rate: rng.gen_range(0..=63),
            },
            dev_addr: DevAddr::from(rng.gen::<u32>()),
            w_f_cnt: rng.gen(),
            root_wor_s_key: lorawan_codec::types::AesKey(rng.gen()),
        }
        .into(),
        18 => RelayCtrlUplinkListReqPayload {
            uplink_list_index: rng.gen_range(0..=15),
            action: RelayCtrlUplinkListAction::RemoveTrustedEndDevice,
        }
        .into(),
        _ => RelayConfigureFwdLimitReqPayload {
            reset_limit_counter: ResetLimitCounter::MaxValue,
            join_req_limits: fwd_limits(rng),
            notify_limits: fwd_limits(rng),
            global_uplink_limits: fwd_limits(rng),
            overall_limits: fwd_limits(rng),
        }
        .into(),
    }
}

fn random_uplink(rng: &mut StdRng) -> UplinkMacCommand {
    match rng.gen_range(0..10) {
        0 => ResetIndPayload { minor: Minor::One }.into(),
        1 => LinkCheckReqPayload.into(),
        2 => LinkADRAnsPayload {
            channel_mask_ack: rng.gen(),
            data_rate_ack: rng.gen(),
            power_ack: rng.gen(),
        }
        .into(),
        3 => DevStatusAnsPayload { battery: rng.gen(), margin: rng.gen_range(-32..=31) }.into(),
        4 => DeviceTimeReqPayload.into(),
        5 => PingSlotInfoReqPayload { periodicity: rng.gen_range(0..=7) }.into(),
        6 => DeviceModeIndPayload { class: DeviceClass::B }.into(),
        7 => RelayCtrlUplinkListAnsPayload { uplink_list_index_ack: rng.gen(), w_f_cnt: rng.gen() }.into(),
        8 => RelayNotifyNewEndDeviceReqPayload {
            dev_addr: DevAddr::from(rng.gen::<u32>()),
            snr: rng.gen_range(-20..=11),
            rssi: rng.gen_range(-142..=-15),
        }
        .into(),
        _ => RelayConfAnsPayload { cad_periodicity_ack: true, ..Default::default() }.into(),
    }
}

#[test]
fn random_downlink_streams_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x10ba);
    let bands: std::vec::Vec<_> = all().collect();
    for _ in 0..500 {
        let band = bands[rng.gen_range(0..bands.len())];
        let cmds: std::vec::Vec<_> = (0..rng.gen_range(1..8)).map(|_| random_downlink(&mut rng, band)).collect();
        let mut buf: Vec<u8, MAX_PHY_PAYLOAD_SIZE> = Vec::new();
        append_downlink_mac_commands(band, &mut buf, &cmds).unwrap();
        assert_eq!(buf.len(), cmds.iter().map(|c| 1 + c.len()).sum::<usize>());

        let decoded: Result<std::vec::Vec<_>, _> = read_downlink_mac_commands(band, &buf).collect();
        assert_eq!(decoded.unwrap(), cmds);
    }
}

#[test]
fn random_uplink_streams_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x0bad);
    let band = all().next().unwrap();
    for _ in 0..500 {
        let cmds: std::vec::Vec<_> = (0..rng.gen_range(1..10)).map(|_| random_uplink(&mut rng)).collect();
        let mut buf: Vec<u8, MAX_PHY_PAYLOAD_SIZE> = Vec::new();
        append_uplink_mac_commands(band, &mut buf, &cmds).unwrap();
        let decoded: Result<std::vec::Vec<_>, _> = read_uplink_mac_commands(band, &buf).collect();
        assert_eq!(decoded.unwrap(), cmds);
    }
}

#[test]
fn random_bytes_never_panic() {
    let mut rng = StdRng::seed_from_u64(7);
    let band = all().next().unwrap();
    for _ in 0..2_000 {
        let len = rng.gen_range(0..40);
        let bytes: std::vec::Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        for cmd in read_downlink_mac_commands(band, &bytes).flatten() {
            assert!(cmd.len() < bytes.len());
        }
        let _ = read_uplink_mac_commands(band, &bytes).count();
    }
}
