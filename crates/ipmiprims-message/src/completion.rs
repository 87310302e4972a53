//! Completion codes and the device-reported failure they map to.
//!
//! Every response starts with a one-byte completion code. `0x00` is success;
//! everything else is a failure reported by the device. Codes outside the
//! known set are kept as-is and reported generically.

use std::fmt;

/// Status byte that opens every IPMI response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompletionCode(pub u8);

impl CompletionCode {
    pub const SUCCESS: Self = Self(0x00);

    // Command-specific codes for Get/Set System Boot Options.
    pub const PARAMETER_NOT_SUPPORTED: Self = Self(0x80);
    pub const SET_IN_PROGRESS: Self = Self(0x81);
    pub const READ_ONLY_PARAMETER: Self = Self(0x82);

    pub const NODE_BUSY: Self = Self(0xc0);
    pub const INVALID_COMMAND: Self = Self(0xc1);
    pub const INVALID_COMMAND_FOR_LUN: Self = Self(0xc2);
    pub const TIMEOUT: Self = Self(0xc3);
    pub const OUT_OF_SPACE: Self = Self(0xc4);
    pub const RESERVATION_CANCELLED: Self = Self(0xc5);
    pub const REQUEST_DATA_TRUNCATED: Self = Self(0xc6);
    pub const REQUEST_DATA_LENGTH_INVALID: Self = Self(0xc7);
    pub const REQUEST_DATA_FIELD_LENGTH_LIMIT_EXCEEDED: Self = Self(0xc8);
    pub const PARAMETER_OUT_OF_RANGE: Self = Self(0xc9);
    pub const CANNOT_RETURN_NUMBER_OF_REQUESTED_DATA_BYTES: Self = Self(0xca);
    pub const REQUESTED_SENSOR_NOT_PRESENT: Self = Self(0xcb);
    pub const INVALID_DATA_FIELD_IN_REQUEST: Self = Self(0xcc);
    pub const COMMAND_ILLEGAL_FOR_SENSOR: Self = Self(0xcd);
    pub const COMMAND_RESPONSE_COULD_NOT_BE_PROVIDED: Self = Self(0xce);
    pub const CANNOT_EXECUTE_DUPLICATE_REQUEST: Self = Self(0xcf);
    pub const SDR_IN_UPDATE_MODE: Self = Self(0xd0);
    pub const FIRMWARE_UPDATE_MODE: Self = Self(0xd1);
    pub const INITIALIZATION_IN_PROGRESS: Self = Self(0xd2);
    pub const DESTINATION_UNAVAILABLE: Self = Self(0xd3);
    pub const INSUFFICIENT_PRIVILEGE: Self = Self(0xd4);
    pub const NOT_SUPPORTED_IN_PRESENT_STATE: Self = Self(0xd5);
    pub const COMMAND_DISABLED: Self = Self(0xd6);
    pub const UNSPECIFIED: Self = Self(0xff);

    /// Whether this code reports success.
    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Human-readable name for known codes.
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0x00 => "success",
            0x80 => "parameter not supported",
            0x81 => "set in progress",
            0x82 => "read-only parameter",
            0xc0 => "node busy",
            0xc1 => "invalid command",
            0xc2 => "invalid command for LUN",
            0xc3 => "timeout while processing command",
            0xc4 => "out of space",
            0xc5 => "reservation cancelled",
            0xc6 => "request data truncated",
            0xc7 => "request data length invalid",
            0xc8 => "request data field length limit exceeded",
            0xc9 => "parameter out of range",
            0xca => "cannot return number of requested data bytes",
            0xcb => "requested sensor, data, or record not present",
            0xcc => "invalid data field in request",
            0xcd => "command illegal for sensor or record type",
            0xce => "command response could not be provided",
            0xcf => "cannot execute duplicated request",
            0xd0 => "SDR repository in update mode",
            0xd1 => "device in firmware update mode",
            0xd2 => "BMC initialization in progress",
            0xd3 => "destination unavailable",
            0xd4 => "insufficient privilege level",
            0xd5 => "command not supported in present state",
            0xd6 => "command sub-function disabled or unavailable",
            0xff => "unspecified error",
            _ => return None,
        };
        Some(name)
    }

    /// Map the code to `Ok(())` on success or a [`CompletionError`] otherwise.
    pub fn check(self) -> Result<(), CompletionError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(CompletionError { code: self })
        }
    }
}

impl From<u8> for CompletionCode {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<CompletionCode> for u8 {
    fn from(value: CompletionCode) -> Self {
        value.0
    }
}

impl fmt::Display for CompletionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} (code=0x{:02x})", self.0),
            None => write!(f, "code=0x{:02x}", self.0),
        }
    }
}

/// A nonzero completion code reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionError {
    pub code: CompletionCode,
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code.name() {
            Some(name) => write!(f, "{name} (code=0x{:02x})", self.code.0),
            None => write!(f, "device-reported failure: code=0x{:02x}", self.code.0),
        }
    }
}

impl std::error::Error for CompletionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_checks_ok() {
        assert!(CompletionCode::SUCCESS.is_success());
        assert!(CompletionCode(0).check().is_ok());
    }

    #[test]
    fn known_code_has_name() {
        let err = CompletionCode::INVALID_COMMAND.check().unwrap_err();
        assert_eq!(err.code, CompletionCode(0xc1));
        assert_eq!(err.to_string(), "invalid command (code=0xc1)");
    }

    #[test]
    fn unknown_code_falls_back_to_generic_message() {
        let err = CompletionCode(0x42).check().unwrap_err();
        assert_eq!(err.to_string(), "device-reported failure: code=0x42");
        assert!(CompletionCode(0x42).name().is_none());
    }

    #[test]
    fn boot_option_codes_are_named() {
        assert_eq!(
            CompletionCode::PARAMETER_NOT_SUPPORTED.name(),
            Some("parameter not supported")
        );
        assert_eq!(CompletionCode(0x82).to_string(), "read-only parameter (code=0x82)");
    }
}
