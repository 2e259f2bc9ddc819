use heapless::Vec;
use lorawan_codec::band::channel_plan::ChMaskCntlPair;
use lorawan_codec::band::{get, get_latest, BandId, PhyVersion};
use lorawan_codec::channel_mask::ChMask16;
use lorawan_codec::encoding::creator::marshal_message;
use lorawan_codec::encoding::maccommandcreator::append_downlink;
use lorawan_codec::encoding::maccommands::{
    read_downlink, DownlinkMacCommand, ForceRejoinReqPayload, LinkADRReqPayload,
    RXParamSetupReqPayload, RelayConfigureFwdLimitReqPayload, RelayForwardLimits,
    ResetLimitCounter,
};
use lorawan_codec::encoding::parser::{
    unmarshal_message, FCtrl, JoinRequestPayload, MType, MacPayload, Message, Payload,
    RejoinRequestPayload, FHDR, MHDR,
};
use lorawan_codec::types::{DevAddr, Eui64, Mic, DR};

const EUI: u64 = 0x42ff_ffff_ffff_ffff;

#[test]
fn unconfirmed_uplink() {
    let bytes = [
        0x40, 0xff, 0xff, 0xff, 0x42, 0xb2, 0x42, 0xff, 0xfe, 0xff, 0x42, 0xfe, 0xff, 0x42, 0xff,
        0xff, 0xff,
    ];
    let msg = unmarshal_message(&bytes).unwrap();
    assert_eq!(msg.mhdr.mtype, MType::UnconfirmedDataUp);
    assert_eq!(msg.mic, Some(Mic::new([0x42, 0xff, 0xff, 0xff])));
    let Payload::MacPayload(mac) = &msg.payload else {
        panic!("expected a data frame, got {:?}", msg.payload);
    };
    assert_eq!(mac.fhdr.dev_addr, DevAddr::from(0x42ff_ffff));
    assert_eq!(
        mac.fhdr.f_ctrl,
        FCtrl { adr: true, adr_ack_req: false, ack: true, class_b: true, f_pending: false }
    );
    assert_eq!(mac.fhdr.f_cnt, 0xff42);
    assert_eq!(mac.fhdr.f_opts.as_slice(), &[0xfe, 0xff]);
    assert_eq!(mac.f_port, Some(0x42));
    assert_eq!(mac.frm_payload.as_slice(), &[0xfe, 0xff]);

    assert_eq!(marshal_message(&msg).unwrap().as_slice(), &bytes);
}

#[test]
fn join_request() {
    let msg = Message {
        mhdr: MHDR::new(MType::JoinRequest),
        payload: Payload::JoinRequest(JoinRequestPayload {
            join_eui: Eui64::from(EUI),
            dev_eui: Eui64::from(EUI),
            dev_nonce: 0x42ff,
        }),
        mic: Some(Mic::new([0x42, 0xff, 0xff, 0xff])),
    };
    let bytes = marshal_message(&msg).unwrap();
    let mut expected = std::vec![0x00];
    for _ in 0..2 {
        expected.extend_from_slice(&[0xff; 7]);
        expected.push(0x42);
    }
    expected.extend_from_slice(&[0xff, 0x42, 0x42, 0xff, 0xff, 0xff]);
    assert_eq!(bytes.as_slice(), expected.as_slice());
    assert_eq!(unmarshal_message(&bytes).unwrap(), msg);
}

#[test]
fn rejoin_request_type_1() {
    let msg = Message {
        mhdr: MHDR::new(MType::RejoinRequest),
        payload: Payload::RejoinRequest(RejoinRequestPayload::Type1 {
            join_eui: Eui64::from(EUI),
            dev_eui: Eui64::from(EUI),
            rejoin_cnt: 0xff42,
        }),
        mic: Some(Mic::new([1, 2, 3, 4])),
    };
    let bytes = marshal_message(&msg).unwrap();
    assert_eq!(bytes.len(), 24);
    assert_eq!(&bytes[..2], &[0xc0, 0x01]);
    assert_eq!(&bytes[2..10], &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x42]);
    assert_eq!(&bytes[10..18], &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x42]);
    assert_eq!(&bytes[18..20], &[0x42, 0xff]);
    assert_eq!(&bytes[20..], &[1, 2, 3, 4]);
    assert_eq!(unmarshal_message(&bytes).unwrap(), msg);
}

#[test]
fn link_adr_req() {
    let band = get_latest(BandId::Eu863870).unwrap();
    let mut mask = ChMask16::default();
    mask.set_channel(2, true);
    mask.set_channel(9, true);
    let cmd = DownlinkMacCommand::LinkADRReq(LinkADRReqPayload {
        data_rate: DR::_5,
        tx_power: 2,
        channel_mask: mask,
        ch_mask_cntl: 1,
        nb_trans: 1,
    });
    let mut buf: Vec<u8, 15> = Vec::new();
    append_downlink(band, &mut buf, &cmd).unwrap();
    assert_eq!(buf.as_slice(), &[0x03, 0x52, 0x04, 0x02, 0x11]);

    let (decoded, len) = read_downlink(band, &buf).unwrap();
    assert_eq!(len, 5);
    assert_eq!(decoded, cmd);
}

#[test]
fn rx_param_setup_req_at_2_4_ghz() {
    let band = get_latest(BandId::Ism2400).unwrap();
    let cmd = DownlinkMacCommand::RXParamSetupReq(RXParamSetupReqPayload {
        rx1_dr_offset: 0,
        rx2_data_rate: DR::_0,
        frequency: 2_423_000_000,
    });
    let mut buf: Vec<u8, 15> = Vec::new();
    append_downlink(band, &mut buf, &cmd).unwrap();
    let packed = 12_115_000u32.to_le_bytes();
    assert_eq!(&buf[2..], &packed[..3]);

    let (decoded, _) = read_downlink(band, &buf).unwrap();
    let DownlinkMacCommand::RXParamSetupReq(payload) = decoded else {
        panic!("unexpected command {:?}", decoded);
    };
    assert_eq!(payload.frequency, 2_423_000_000);
}

#[test]
fn channel_mask_72_enables_one_500khz_channel() {
    let band = get(BandId::Us902928, PhyVersion::Rp002V1_0_4).unwrap();
    let mut current = [false; 72];
    current[..64].fill(true);
    let mut desired = current;
    desired[64] = true;

    let pairs = band.generate_ch_masks(&current, &desired, false).unwrap();
    assert_eq!(pairs.as_slice(), &[ChMaskCntlPair::new(4, ChMask16::from(0x0001u16))]);

    let mut state = current;
    band.ch_mask.apply(&mut state, &pairs).unwrap();
    assert_eq!(state, desired);
}

#[test]
fn data_downlink_with_port_zero_round_trips() {
    let msg = Message {
        mhdr: MHDR::new(MType::ConfirmedDataDown),
        payload: Payload::MacPayload(MacPayload {
            fhdr: FHDR {
                dev_addr: DevAddr::from(0x2601_1234),
                f_ctrl: FCtrl { f_pending: true, ack: true, ..Default::default() },
                f_cnt: 7,
                f_opts: Vec::new(),
            },
            f_port: Some(0),
            frm_payload: Vec::from_slice(&[0x06]).unwrap(),
        }),
        mic: Some(Mic::new([0xde, 0xad, 0xbe, 0xef])),
    };
    let bytes = marshal_message(&msg).unwrap();
    assert_eq!(bytes[0], 0xa0);
    assert_eq!(bytes[5], 0x30);
    assert_eq!(unmarshal_message(&bytes).unwrap(), msg);
}

#[test]
fn force_rejoin_and_forward_limits_on_the_wire() {
    let band = get_latest(BandId::Eu863870).unwrap();
    let mut buf: Vec<u8, 15> = Vec::new();
    let rejoin = DownlinkMacCommand::ForceRejoinReq(ForceRejoinReqPayload {
        period: 3,
        max_retries: 2,
        rejoin_type: 2,
        data_rate: DR::_4,
    });
    append_downlink(band, &mut buf, &rejoin).unwrap();
    assert_eq!(buf.as_slice(), &[0x0e, 0x1a, 0x24]);
    assert_eq!(read_downlink(band, &buf).unwrap(), (rejoin, 3));

    buf.clear();
    let limits = DownlinkMacCommand::RelayConfigureFwdLimitReq(RelayConfigureFwdLimitReqPayload {
        reset_limit_counter: ResetLimitCounter::NoChange,
        join_req_limits: None,
        notify_limits: None,
        global_uplink_limits: None,
        overall_limits: Some(RelayForwardLimits { bucket_size: 2, reload_rate: 5 }),
    });
    append_downlink(band, &mut buf, &limits).unwrap();
    assert_eq!(buf.as_slice(), &[0x45, 0x85, 0xff, 0xff, 0x3f, 0x02]);
    assert_eq!(read_downlink(band, &buf).unwrap(), (limits, 6));
}
