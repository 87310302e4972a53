//! Every fixed-width body must reject one byte too few and one byte too many.

use std::fmt::Debug;

use bytes::{Bytes, BytesMut};
use ipmiprims_message::{
    BootDevice, ChannelAuthCapabilitiesRequest, ChannelAuthCapabilitiesResponse, ChassisControl,
    ChassisControlRequest, ChassisStatusRequest, CompletionCode, Decode, DeviceIdRequest,
    DeviceIdResponse, EnableUserRequest, Encode, GetUserNameRequest, GetUserNameResponse,
    GetUserSummaryRequest, GetUserSummaryResponse, MessageError, PrivilegeLevel,
    SetSystemBootOptionsRequest, SetUserAccessRequest, SetUserNameRequest, SetUserPasswordRequest,
    StatusResponse, SystemBootOptionsRequest, MAX_PASSWORD_LEN,
};

fn assert_exact_width<T>(sample: T, len: usize)
where
    T: Encode + Decode + PartialEq + Debug,
{
    let name = std::any::type_name::<T>();
    let wire = sample.to_bytes().expect("sample should encode");
    assert_eq!(wire.len(), len, "{name}: encoded width");

    let decoded = T::decode(&wire).expect("exact width should decode");
    assert_eq!(decoded, sample, "{name}: decoded value");

    if len > 0 {
        let err = T::decode(&wire[..len - 1]).expect_err("one byte short should fail");
        assert!(
            matches!(err, MessageError::ShortPacket { actual, .. } if actual == len - 1),
            "{name}: short by one gave {err:?}"
        );
    }

    let mut long = BytesMut::from(&wire[..]);
    long.extend_from_slice(&[0x00]);
    let err = T::decode(&long).expect_err("one byte long should fail");
    assert!(
        matches!(err, MessageError::LongPacket { actual, .. } if actual == len + 1),
        "{name}: long by one gave {err:?}"
    );
}

#[test]
fn app_bodies_have_exact_width() {
    assert_exact_width(DeviceIdRequest, 0);
    assert_exact_width(
        ChannelAuthCapabilitiesRequest {
            channel: 0x0e,
            privilege_level: PrivilegeLevel::Operator,
        },
        2,
    );
    assert_exact_width(
        ChannelAuthCapabilitiesResponse {
            channel_number: 0x01,
            auth_type_support: 0x15,
            status: 0x04,
            extended_capabilities: 0x02,
            oem_id: 0x00_1a_2b,
            oem_aux: 0x07,
            ..Default::default()
        },
        9,
    );
    // The optional auxiliary revision makes the full form the fixed upper bound.
    assert_exact_width(
        DeviceIdResponse {
            device_id: 0x20,
            device_revision: 0x81,
            firmware_revision1: 0x02,
            firmware_revision2: 0x14,
            ipmi_version: 0x51,
            additional_device_support: 0xbf,
            manufacturer_id: 0x0157,
            product_id: 0x0b3c,
            aux_firmware_revision: Some([0x01, 0x02, 0x03, 0x04]),
            ..Default::default()
        },
        16,
    );
}

#[test]
fn chassis_bodies_have_exact_width() {
    assert_exact_width(ChassisStatusRequest, 0);
    assert_exact_width(
        ChassisControlRequest {
            control: ChassisControl::PowerCycle,
        },
        1,
    );
    assert_exact_width(
        SystemBootOptionsRequest {
            set_selector: 0x01,
            ..SystemBootOptionsRequest::default()
        },
        3,
    );
    assert_exact_width(
        SetSystemBootOptionsRequest::boot_flags(BootDevice::PXE, true),
        6,
    );
}

#[test]
fn user_bodies_have_exact_width() {
    assert_exact_width(GetUserNameRequest { user_id: 0x03 }, 1);
    assert_exact_width(
        GetUserNameResponse {
            username: "operator".to_string(),
            ..Default::default()
        },
        17,
    );
    assert_exact_width(
        SetUserNameRequest {
            user_id: 0x03,
            username: "operator".to_string(),
        },
        17,
    );
    // Decoding keeps the padding, so only a full-width password compares equal.
    assert_exact_width(
        SetUserPasswordRequest {
            user_id: 0x03,
            password: Bytes::from(vec![b'p'; MAX_PASSWORD_LEN]),
        },
        18,
    );
    assert_exact_width(EnableUserRequest { user_id: 0x03 }, 2);
    assert_exact_width(
        GetUserSummaryRequest {
            channel_number: 0x01,
            user_id: 0x03,
        },
        2,
    );
    assert_exact_width(
        GetUserSummaryResponse {
            max_users: 0x0f,
            enabled_users: 0x02,
            fixed_name_users: 0x01,
            channel_access: 0x34,
            ..Default::default()
        },
        5,
    );
    assert_exact_width(
        SetUserAccessRequest {
            access_options: 0x91,
            user_id: 0x03,
            user_limits: 0x04,
            user_session_limit: 0x00,
        },
        4,
    );
}

#[test]
fn status_body_is_one_byte() {
    assert_exact_width(StatusResponse::default(), 1);
}

#[test]
fn error_completion_skips_the_body() {
    let resp = GetUserNameResponse::decode(&[CompletionCode::INVALID_COMMAND.0])
        .expect("error completion should decode without a body");
    assert_eq!(resp.completion_code, CompletionCode::INVALID_COMMAND);
    assert!(resp.username.is_empty());
}
