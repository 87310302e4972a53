//! Routing keys: network function (command class) and command code.

use std::fmt;

use crate::error::MessageError;

/// Command class carried to the device alongside the command code.
///
/// Request network functions are even; the matching response class is the
/// request value plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NetworkFunction {
    Chassis = 0x00,
    Bridge = 0x02,
    SensorEvent = 0x04,
    App = 0x06,
    Firmware = 0x08,
    Storage = 0x0a,
    Transport = 0x0c,
}

impl NetworkFunction {
    /// Wire value for requests.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Wire value the device uses for the matching response.
    pub fn response_code(self) -> u8 {
        self as u8 | 0x01
    }

    pub fn name(self) -> &'static str {
        match self {
            NetworkFunction::Chassis => "chassis",
            NetworkFunction::Bridge => "bridge",
            NetworkFunction::SensorEvent => "sensor-event",
            NetworkFunction::App => "app",
            NetworkFunction::Firmware => "firmware",
            NetworkFunction::Storage => "storage",
            NetworkFunction::Transport => "transport",
        }
    }
}

impl TryFrom<u8> for NetworkFunction {
    type Error = MessageError;

    /// Accepts both request and response values.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value & !0x01 {
            0x00 => Ok(NetworkFunction::Chassis),
            0x02 => Ok(NetworkFunction::Bridge),
            0x04 => Ok(NetworkFunction::SensorEvent),
            0x06 => Ok(NetworkFunction::App),
            0x08 => Ok(NetworkFunction::Firmware),
            0x0a => Ok(NetworkFunction::Storage),
            0x0c => Ok(NetworkFunction::Transport),
            _ => Err(MessageError::UnknownNetworkFunction(value)),
        }
    }
}

impl fmt::Display for NetworkFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02x})", self.name(), self.as_u8())
    }
}

/// Command code within a network function.
///
/// Codes are only unique per network function, so the constants below are
/// grouped by class. Any byte is representable so callers can address
/// commands this crate has no payload type for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command(pub u8);

impl Command {
    // App
    pub const GET_DEVICE_ID: Self = Self(0x01);
    pub const COLD_RESET: Self = Self(0x02);
    pub const WARM_RESET: Self = Self(0x03);
    pub const GET_SELF_TEST_RESULTS: Self = Self(0x04);
    pub const GET_CHANNEL_AUTH_CAPABILITIES: Self = Self(0x38);
    pub const GET_SESSION_CHALLENGE: Self = Self(0x39);
    pub const ACTIVATE_SESSION: Self = Self(0x3a);
    pub const SET_SESSION_PRIVILEGE: Self = Self(0x3b);
    pub const CLOSE_SESSION: Self = Self(0x3c);
    pub const SET_USER_ACCESS: Self = Self(0x43);
    pub const GET_USER_ACCESS: Self = Self(0x44);
    pub const SET_USER_NAME: Self = Self(0x45);
    pub const GET_USER_NAME: Self = Self(0x46);
    pub const SET_USER_PASSWORD: Self = Self(0x47);

    // Chassis
    pub const GET_CHASSIS_CAPABILITIES: Self = Self(0x00);
    pub const CHASSIS_STATUS: Self = Self(0x01);
    pub const CHASSIS_CONTROL: Self = Self(0x02);
    pub const SET_SYSTEM_BOOT_OPTIONS: Self = Self(0x08);
    pub const GET_SYSTEM_BOOT_OPTIONS: Self = Self(0x09);

    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl From<u8> for Command {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_code_sets_low_bit() {
        assert_eq!(NetworkFunction::App.response_code(), 0x07);
        assert_eq!(NetworkFunction::Chassis.response_code(), 0x01);
    }

    #[test]
    fn try_from_accepts_request_and_response_values() {
        assert_eq!(NetworkFunction::try_from(0x06), Ok(NetworkFunction::App));
        assert_eq!(NetworkFunction::try_from(0x07), Ok(NetworkFunction::App));
        assert_eq!(
            NetworkFunction::try_from(0x30),
            Err(MessageError::UnknownNetworkFunction(0x30))
        );
    }
}
