//! Chassis network function messages: status, power control, boot options.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{completion_code, expect_len, expect_range, Decode, Encode};
use crate::completion::CompletionCode;
use crate::envelope::Response;
use crate::error::{MessageError, Result};

/// Get Chassis Status request (no data).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChassisStatusRequest;

impl Encode for ChassisStatusRequest {
    fn encode(&self, _dst: &mut BytesMut) -> Result<()> {
        Ok(())
    }
}

impl Decode for ChassisStatusRequest {
    fn decode(src: &[u8]) -> Result<Self> {
        expect_len("chassis status request", src, 0)?;
        Ok(Self)
    }
}

/// Current power state bits (byte 1 of the status response).
pub const SYSTEM_POWER: u8 = 0x01;
pub const POWER_OVERLOAD: u8 = 0x02;
pub const POWER_INTERLOCK: u8 = 0x04;
pub const MAIN_POWER_FAULT: u8 = 0x08;
pub const POWER_CONTROL_FAULT: u8 = 0x10;

/// Policy applied when AC power returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerRestorePolicy {
    AlwaysOff,
    Previous,
    AlwaysOn,
    Unknown,
}

/// Get Chassis Status response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChassisStatusResponse {
    pub completion_code: CompletionCode,
    pub power_state: u8,
    pub last_power_event: u8,
    pub state: u8,
    pub front_panel: Option<u8>,
}

impl ChassisStatusResponse {
    const MESSAGE: &'static str = "chassis status response";

    pub fn is_power_on(&self) -> bool {
        self.power_state & SYSTEM_POWER != 0
    }

    pub fn power_restore_policy(&self) -> PowerRestorePolicy {
        match (self.power_state >> 5) & 0x03 {
            0x00 => PowerRestorePolicy::AlwaysOff,
            0x01 => PowerRestorePolicy::Previous,
            0x02 => PowerRestorePolicy::AlwaysOn,
            _ => PowerRestorePolicy::Unknown,
        }
    }

    pub fn chassis_intrusion(&self) -> bool {
        self.state & 0x01 != 0
    }
}

impl Encode for ChassisStatusResponse {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.completion_code.0);
        if !self.completion_code.is_success() {
            return Ok(());
        }
        dst.put_u8(self.power_state);
        dst.put_u8(self.last_power_event);
        dst.put_u8(self.state);
        if let Some(front_panel) = self.front_panel {
            dst.put_u8(front_panel);
        }
        Ok(())
    }
}

impl Decode for ChassisStatusResponse {
    fn decode(src: &[u8]) -> Result<Self> {
        let completion_code = completion_code(Self::MESSAGE, src)?;
        if !completion_code.is_success() {
            return Ok(Self {
                completion_code,
                ..Self::default()
            });
        }
        expect_range(Self::MESSAGE, src, 4, 5)?;
        Ok(Self {
            completion_code,
            power_state: src[1],
            last_power_event: src[2],
            state: src[3],
            front_panel: src.get(4).copied(),
        })
    }
}

impl Response for ChassisStatusResponse {
    fn completion_code(&self) -> CompletionCode {
        self.completion_code
    }
}

/// Chassis Control operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChassisControl {
    PowerDown = 0x00,
    PowerUp = 0x01,
    PowerCycle = 0x02,
    HardReset = 0x03,
    PulseDiagnosticInterrupt = 0x04,
    SoftShutdown = 0x05,
}

impl TryFrom<u8> for ChassisControl {
    type Error = MessageError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(ChassisControl::PowerDown),
            0x01 => Ok(ChassisControl::PowerUp),
            0x02 => Ok(ChassisControl::PowerCycle),
            0x03 => Ok(ChassisControl::HardReset),
            0x04 => Ok(ChassisControl::PulseDiagnosticInterrupt),
            0x05 => Ok(ChassisControl::SoftShutdown),
            _ => Err(MessageError::InvalidField {
                field: "chassis control",
                value,
            }),
        }
    }
}

/// Chassis Control request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChassisControlRequest {
    pub control: ChassisControl,
}

impl Encode for ChassisControlRequest {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.control as u8);
        Ok(())
    }
}

impl Decode for ChassisControlRequest {
    fn decode(src: &[u8]) -> Result<Self> {
        expect_len("chassis control request", src, 1)?;
        Ok(Self {
            control: ChassisControl::try_from(src[0])?,
        })
    }
}

/// Boot option parameter selector (7 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BootParam(pub u8);

impl BootParam {
    pub const SET_IN_PROGRESS: Self = Self(0x00);
    pub const SERVICE_PARTITION_SELECTOR: Self = Self(0x01);
    pub const SERVICE_PARTITION_SCAN: Self = Self(0x02);
    pub const FLAG_VALID_BIT_CLEARING: Self = Self(0x03);
    pub const BOOT_INFO_ACKNOWLEDGE: Self = Self(0x04);
    pub const BOOT_FLAGS: Self = Self(0x05);
    pub const INITIATOR_INFO: Self = Self(0x06);
    pub const INITIATOR_MAILBOX: Self = Self(0x07);

    /// Declared data length for parameters with a fixed layout.
    pub fn data_len(self) -> Option<usize> {
        match self.0 {
            0x00..=0x03 => Some(1),
            0x04 => Some(2),
            0x05 => Some(5),
            0x06 => Some(9),
            _ => None,
        }
    }
}

impl fmt::Display for BootParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            0x00 => "set-in-progress",
            0x01 => "service-partition-selector",
            0x02 => "service-partition-scan",
            0x03 => "flag-valid-bit-clearing",
            0x04 => "boot-info-acknowledge",
            0x05 => "boot-flags",
            0x06 => "initiator-info",
            0x07 => "initiator-mailbox",
            other => return write!(f, "param-0x{other:02x}"),
        };
        f.write_str(name)
    }
}

/// Boot device selector, as it appears in bits 5:2 of boot flags byte 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BootDevice(pub u8);

impl BootDevice {
    pub const NONE: Self = Self(0x00);
    pub const PXE: Self = Self(0x04);
    pub const DISK: Self = Self(0x08);
    pub const SAFE: Self = Self(0x0c);
    pub const DIAG: Self = Self(0x10);
    pub const CDROM: Self = Self(0x14);
    pub const BIOS: Self = Self(0x18);
    pub const REMOTE_FLOPPY: Self = Self(0x1c);
    pub const REMOTE_CDROM: Self = Self(0x20);
    pub const REMOTE_PRIMARY_MEDIA: Self = Self(0x24);
    pub const REMOTE_DISK: Self = Self(0x2c);
    pub const FLOPPY: Self = Self(0x3c);

    /// Bits of the flags byte that hold the selector.
    pub const MASK: u8 = 0x3c;

    const NAMES: [(&'static str, BootDevice); 12] = [
        ("none", Self::NONE),
        ("pxe", Self::PXE),
        ("disk", Self::DISK),
        ("safe", Self::SAFE),
        ("diag", Self::DIAG),
        ("cdrom", Self::CDROM),
        ("bios", Self::BIOS),
        ("remote-floppy", Self::REMOTE_FLOPPY),
        ("remote-cdrom", Self::REMOTE_CDROM),
        ("remote-primary-media", Self::REMOTE_PRIMARY_MEDIA),
        ("remote-disk", Self::REMOTE_DISK),
        ("floppy", Self::FLOPPY),
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, dev)| *dev)
    }

    pub fn name(self) -> Option<&'static str> {
        Self::NAMES
            .iter()
            .find(|(_, dev)| *dev == self)
            .map(|(n, _)| *n)
    }
}

impl fmt::Display for BootDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:02x}", self.0),
        }
    }
}

/// Persistence flag in boot flags byte 2.
pub const BOOT_FLAG_PERSISTENT: u8 = 0x40;
/// "Boot flags valid" bit in boot flags byte 1.
pub const BOOT_FLAG_VALID: u8 = 0x80;

/// Set System Boot Options request.
///
/// Data for parameters with a declared length must match it exactly,
/// reserved trailing bytes included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetSystemBootOptionsRequest {
    pub param: BootParam,
    pub data: Bytes,
}

impl SetSystemBootOptionsRequest {
    const MESSAGE: &'static str = "set system boot options request";

    pub fn new(param: BootParam, data: impl Into<Bytes>) -> Self {
        Self {
            param,
            data: data.into(),
        }
    }

    /// Boot flags selecting `device`, optionally persistent across boots.
    pub fn boot_flags(device: BootDevice, persistent: bool) -> Self {
        let mut selector = device.0 & BootDevice::MASK;
        if persistent {
            selector |= BOOT_FLAG_PERSISTENT;
        }
        Self::new(
            BootParam::BOOT_FLAGS,
            vec![BOOT_FLAG_VALID, selector, 0x00, 0x00, 0x00],
        )
    }

    fn check_data_len(param: BootParam, data_len: usize) -> Result<()> {
        let Some(expected) = param.data_len() else {
            return Ok(());
        };
        // Sizes are reported for the whole request, selector byte included.
        if data_len < expected {
            return Err(MessageError::ShortPacket {
                message: Self::MESSAGE,
                expected: 1 + expected,
                actual: 1 + data_len,
            });
        }
        if data_len > expected {
            return Err(MessageError::LongPacket {
                message: Self::MESSAGE,
                expected: 1 + expected,
                actual: 1 + data_len,
            });
        }
        Ok(())
    }
}

impl Encode for SetSystemBootOptionsRequest {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        Self::check_data_len(self.param, self.data.len())?;
        dst.reserve(1 + self.data.len());
        dst.put_u8(self.param.0 & 0x7f);
        dst.put_slice(&self.data);
        Ok(())
    }
}

impl Decode for SetSystemBootOptionsRequest {
    fn decode(src: &[u8]) -> Result<Self> {
        let Some((&selector, data)) = src.split_first() else {
            return Err(MessageError::ShortPacket {
                message: Self::MESSAGE,
                expected: 1,
                actual: 0,
            });
        };
        let param = BootParam(selector & 0x7f);
        Self::check_data_len(param, data.len())?;
        Ok(Self::new(param, Bytes::copy_from_slice(data)))
    }
}

/// Get System Boot Options request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemBootOptionsRequest {
    pub param: BootParam,
    pub set_selector: u8,
    pub block_selector: u8,
}

impl SystemBootOptionsRequest {
    pub fn new(param: BootParam) -> Self {
        Self {
            param,
            ..Self::default()
        }
    }
}

impl Encode for SystemBootOptionsRequest {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.param.0 & 0x7f);
        dst.put_u8(self.set_selector);
        dst.put_u8(self.block_selector);
        Ok(())
    }
}

impl Decode for SystemBootOptionsRequest {
    fn decode(src: &[u8]) -> Result<Self> {
        expect_len("get system boot options request", src, 3)?;
        Ok(Self {
            param: BootParam(src[0] & 0x7f),
            set_selector: src[1],
            block_selector: src[2],
        })
    }
}

/// Get System Boot Options response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemBootOptionsResponse {
    pub completion_code: CompletionCode,
    pub version: u8,
    pub param: BootParam,
    /// Parameter data, verbatim.
    pub data: Bytes,
}

impl SystemBootOptionsResponse {
    const MESSAGE: &'static str = "get system boot options response";

    /// Boot device selector from boot flags data.
    pub fn boot_device_selector(&self) -> BootDevice {
        BootDevice(self.data.get(1).copied().unwrap_or(0) & BootDevice::MASK)
    }

    /// Whether the boot flags are marked persistent.
    pub fn is_persistent(&self) -> bool {
        self.data.get(1).copied().unwrap_or(0) & BOOT_FLAG_PERSISTENT != 0
    }

    /// Whether the boot flags carry the "valid" bit.
    pub fn is_valid(&self) -> bool {
        self.data.first().copied().unwrap_or(0) & BOOT_FLAG_VALID != 0
    }
}

impl Encode for SystemBootOptionsResponse {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.completion_code.0);
        if !self.completion_code.is_success() {
            return Ok(());
        }
        dst.put_u8(self.version);
        dst.put_u8(self.param.0 & 0x7f);
        dst.put_slice(&self.data);
        Ok(())
    }
}

impl Decode for SystemBootOptionsResponse {
    fn decode(src: &[u8]) -> Result<Self> {
        let completion_code = completion_code(Self::MESSAGE, src)?;
        if !completion_code.is_success() {
            return Ok(Self {
                completion_code,
                ..Self::default()
            });
        }
        expect_range(Self::MESSAGE, src, 3, usize::MAX)?;
        Ok(Self {
            completion_code,
            version: src[1],
            param: BootParam(src[2] & 0x7f),
            data: Bytes::copy_from_slice(&src[3..]),
        })
    }
}

impl Response for SystemBootOptionsResponse {
    fn completion_code(&self) -> CompletionCode {
        self.completion_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chassis_status_accessors() {
        let resp = ChassisStatusResponse::decode(&[0x00, 0x41, 0x00, 0x01]).unwrap();
        assert!(resp.is_power_on());
        assert_eq!(resp.power_restore_policy(), PowerRestorePolicy::AlwaysOn);
        assert!(resp.chassis_intrusion());
        assert_eq!(resp.front_panel, None);

        let resp = ChassisStatusResponse::decode(&[0x00, 0x00, 0x00, 0x00, 0x11]).unwrap();
        assert!(!resp.is_power_on());
        assert_eq!(resp.front_panel, Some(0x11));
    }

    #[test]
    fn chassis_status_length_bounds() {
        assert!(matches!(
            ChassisStatusResponse::decode(&[0x00, 0x01, 0x00]),
            Err(MessageError::ShortPacket { .. })
        ));
        assert!(matches!(
            ChassisStatusResponse::decode(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x00]),
            Err(MessageError::LongPacket { .. })
        ));
    }

    #[test]
    fn chassis_control_rejects_unknown_operation() {
        assert_eq!(
            ChassisControlRequest::decode(&[0x05]).unwrap().control,
            ChassisControl::SoftShutdown
        );
        assert!(matches!(
            ChassisControlRequest::decode(&[0x09]),
            Err(MessageError::InvalidField { value: 0x09, .. })
        ));
    }

    #[test]
    fn boot_flags_pack_selector_and_persistence() {
        let req = SetSystemBootOptionsRequest::boot_flags(BootDevice::PXE, true);
        let wire = req.to_bytes().unwrap();
        assert_eq!(wire.as_ref(), &[0x05, 0x80, 0x44, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn boot_flags_missing_reserved_bytes_is_short() {
        let req = SetSystemBootOptionsRequest::new(
            BootParam::BOOT_FLAGS,
            vec![0x80, BootDevice::PXE.0 | BOOT_FLAG_PERSISTENT],
        );
        assert_eq!(
            req.to_bytes(),
            Err(MessageError::ShortPacket {
                message: "set system boot options request",
                expected: 6,
                actual: 3,
            })
        );
        assert!(matches!(
            SetSystemBootOptionsRequest::decode(&[0x05, 0x80, 0x44]),
            Err(MessageError::ShortPacket { .. })
        ));
    }

    #[test]
    fn boot_flags_extra_byte_is_long() {
        let req = SetSystemBootOptionsRequest::new(BootParam::BOOT_FLAGS, vec![0u8; 6]);
        assert!(matches!(req.to_bytes(), Err(MessageError::LongPacket { .. })));
    }

    #[test]
    fn mailbox_data_is_variable() {
        let req = SetSystemBootOptionsRequest::new(BootParam::INITIATOR_MAILBOX, vec![1, 2, 3]);
        let wire = req.to_bytes().unwrap();
        assert_eq!(SetSystemBootOptionsRequest::decode(&wire).unwrap(), req);
    }

    #[test]
    fn boot_options_response_exposes_selector() {
        let wire = [0x00, 0x01, 0x05, 0x80, 0x44, 0x00, 0x00, 0x00];
        let resp = SystemBootOptionsResponse::decode(&wire).unwrap();
        assert_eq!(resp.param, BootParam::BOOT_FLAGS);
        assert_eq!(resp.boot_device_selector(), BootDevice::PXE);
        assert!(resp.is_persistent());
        assert!(resp.is_valid());
        assert_eq!(resp.data[1] & 0x40, 0x40);
        assert!(matches!(
            SystemBootOptionsResponse::decode(&wire[..2]),
            Err(MessageError::ShortPacket { .. })
        ));
    }

    #[test]
    fn boot_device_names() {
        assert_eq!(BootDevice::from_name("PXE"), Some(BootDevice::PXE));
        assert_eq!(BootDevice::BIOS.to_string(), "bios");
        assert_eq!(BootDevice(0x30).to_string(), "0x30");
        assert_eq!(BootParam::BOOT_FLAGS.to_string(), "boot-flags");
    }
}
