//! App network function messages: device identity and channel auth probe.

use bytes::{BufMut, BytesMut};

use crate::codec::{
    completion_code, expect_len, expect_range, get_u24_le, put_u24_le, Decode, Encode,
};
use crate::completion::CompletionCode;
use crate::envelope::Response;
use crate::error::{MessageError, Result};

/// Channel number meaning "the channel this request arrived on".
pub const CURRENT_CHANNEL: u8 = 0x0e;

/// Get Device ID request (no data).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceIdRequest;

impl Encode for DeviceIdRequest {
    fn encode(&self, _dst: &mut BytesMut) -> Result<()> {
        Ok(())
    }
}

impl Decode for DeviceIdRequest {
    fn decode(src: &[u8]) -> Result<Self> {
        expect_len("get device id request", src, 0)?;
        Ok(Self)
    }
}

/// Get Device ID response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIdResponse {
    pub completion_code: CompletionCode,
    pub device_id: u8,
    pub device_revision: u8,
    pub firmware_revision1: u8,
    pub firmware_revision2: u8,
    /// BCD, e.g. `0x51` for IPMI 1.5.
    pub ipmi_version: u8,
    pub additional_device_support: u8,
    /// 24-bit IANA enterprise number.
    pub manufacturer_id: u32,
    pub product_id: u16,
    pub aux_firmware_revision: Option<[u8; 4]>,
}

impl DeviceIdResponse {
    const MESSAGE: &'static str = "get device id response";
    const BASE_LEN: usize = 12;
    const AUX_LEN: usize = 4;

    /// Whether the device reports a firmware update in progress.
    pub fn update_in_progress(&self) -> bool {
        self.firmware_revision1 & 0x80 != 0
    }

    /// IPMI version as `(major, minor)`.
    pub fn ipmi_version_parts(&self) -> (u8, u8) {
        (self.ipmi_version & 0x0f, self.ipmi_version >> 4)
    }
}

impl Encode for DeviceIdResponse {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.completion_code.0);
        if !self.completion_code.is_success() {
            return Ok(());
        }
        dst.put_u8(self.device_id);
        dst.put_u8(self.device_revision);
        dst.put_u8(self.firmware_revision1);
        dst.put_u8(self.firmware_revision2);
        dst.put_u8(self.ipmi_version);
        dst.put_u8(self.additional_device_support);
        put_u24_le(dst, self.manufacturer_id);
        dst.put_u16_le(self.product_id);
        if let Some(aux) = self.aux_firmware_revision {
            dst.put_slice(&aux);
        }
        Ok(())
    }
}

impl Decode for DeviceIdResponse {
    fn decode(src: &[u8]) -> Result<Self> {
        let completion_code = completion_code(Self::MESSAGE, src)?;
        if !completion_code.is_success() {
            return Ok(Self {
                completion_code,
                ..Self::default()
            });
        }
        expect_range(Self::MESSAGE, src, Self::BASE_LEN, Self::BASE_LEN + Self::AUX_LEN)?;
        // The auxiliary revision is all-or-nothing.
        let aux_firmware_revision = match src.len() {
            Self::BASE_LEN => None,
            len if len == Self::BASE_LEN + Self::AUX_LEN => {
                Some([src[12], src[13], src[14], src[15]])
            }
            actual => {
                return Err(MessageError::ShortPacket {
                    message: Self::MESSAGE,
                    expected: Self::BASE_LEN + Self::AUX_LEN,
                    actual,
                })
            }
        };
        Ok(Self {
            completion_code,
            device_id: src[1],
            device_revision: src[2],
            firmware_revision1: src[3],
            firmware_revision2: src[4],
            ipmi_version: src[5],
            additional_device_support: src[6],
            manufacturer_id: get_u24_le(&src[7..10]),
            product_id: u16::from_le_bytes([src[10], src[11]]),
            aux_firmware_revision,
        })
    }
}

impl Response for DeviceIdResponse {
    fn completion_code(&self) -> CompletionCode {
        self.completion_code
    }
}

/// Requested session privilege level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PrivilegeLevel {
    Callback = 0x01,
    User = 0x02,
    Operator = 0x03,
    #[default]
    Administrator = 0x04,
    Oem = 0x05,
}

impl TryFrom<u8> for PrivilegeLevel {
    type Error = MessageError;

    fn try_from(value: u8) -> Result<Self> {
        match value & 0x0f {
            0x01 => Ok(PrivilegeLevel::Callback),
            0x02 => Ok(PrivilegeLevel::User),
            0x03 => Ok(PrivilegeLevel::Operator),
            0x04 => Ok(PrivilegeLevel::Administrator),
            0x05 => Ok(PrivilegeLevel::Oem),
            _ => Err(MessageError::InvalidField {
                field: "privilege level",
                value,
            }),
        }
    }
}

/// Get Channel Authentication Capabilities request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelAuthCapabilitiesRequest {
    pub channel: u8,
    pub privilege_level: PrivilegeLevel,
}

impl Default for ChannelAuthCapabilitiesRequest {
    fn default() -> Self {
        Self {
            channel: CURRENT_CHANNEL,
            privilege_level: PrivilegeLevel::Administrator,
        }
    }
}

impl Encode for ChannelAuthCapabilitiesRequest {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.channel & 0x0f);
        dst.put_u8(self.privilege_level as u8);
        Ok(())
    }
}

impl Decode for ChannelAuthCapabilitiesRequest {
    fn decode(src: &[u8]) -> Result<Self> {
        expect_len("get channel auth capabilities request", src, 2)?;
        Ok(Self {
            channel: src[0] & 0x0f,
            privilege_level: PrivilegeLevel::try_from(src[1])?,
        })
    }
}

/// Get Channel Authentication Capabilities response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelAuthCapabilitiesResponse {
    pub completion_code: CompletionCode,
    pub channel_number: u8,
    pub auth_type_support: u8,
    pub status: u8,
    pub extended_capabilities: u8,
    pub oem_id: u32,
    pub oem_aux: u8,
}

impl ChannelAuthCapabilitiesResponse {
    const MESSAGE: &'static str = "get channel auth capabilities response";
    const LEN: usize = 9;

    pub fn supports_auth_none(&self) -> bool {
        self.auth_type_support & 0x01 != 0
    }

    pub fn supports_md5(&self) -> bool {
        self.auth_type_support & 0x04 != 0
    }

    pub fn supports_straight_password(&self) -> bool {
        self.auth_type_support & 0x10 != 0
    }

    /// Whether the channel advertises IPMI v2.0 (RMCP+) support.
    pub fn supports_v2(&self) -> bool {
        self.auth_type_support & 0x80 != 0 && self.extended_capabilities & 0x02 != 0
    }
}

impl Encode for ChannelAuthCapabilitiesResponse {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.completion_code.0);
        if !self.completion_code.is_success() {
            return Ok(());
        }
        dst.put_u8(self.channel_number);
        dst.put_u8(self.auth_type_support);
        dst.put_u8(self.status);
        dst.put_u8(self.extended_capabilities);
        put_u24_le(dst, self.oem_id);
        dst.put_u8(self.oem_aux);
        Ok(())
    }
}

impl Decode for ChannelAuthCapabilitiesResponse {
    fn decode(src: &[u8]) -> Result<Self> {
        let completion_code = completion_code(Self::MESSAGE, src)?;
        if !completion_code.is_success() {
            return Ok(Self {
                completion_code,
                ..Self::default()
            });
        }
        expect_len(Self::MESSAGE, src, Self::LEN)?;
        Ok(Self {
            completion_code,
            channel_number: src[1],
            auth_type_support: src[2],
            status: src[3],
            extended_capabilities: src[4],
            oem_id: get_u24_le(&src[5..8]),
            oem_aux: src[8],
        })
    }
}

impl Response for ChannelAuthCapabilitiesResponse {
    fn completion_code(&self) -> CompletionCode {
        self.completion_code
    }
}
