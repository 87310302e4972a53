//! Request/response pairing that drives the codec generically.
//!
//! A [`Request`] carries the routing key (network function, command) and a
//! typed payload. Every concrete request type maps to exactly one routing
//! key; arbitrary pairs go through [`RequestPayload::Raw`]. Responses are
//! any type implementing [`Response`].

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::app::{ChannelAuthCapabilitiesRequest, DeviceIdRequest};
use crate::chassis::{
    ChassisControlRequest, ChassisStatusRequest, SetSystemBootOptionsRequest,
    SystemBootOptionsRequest,
};
use crate::codec::{completion_code, expect_len, Decode, Encode};
use crate::completion::CompletionCode;
use crate::error::{MessageError, Result};
use crate::netfn::{Command, NetworkFunction};
use crate::user::{
    EnableUserRequest, GetUserNameRequest, GetUserSummaryRequest, SetUserAccessRequest,
    SetUserNameRequest, SetUserPasswordRequest, OP_ENABLE_USER, OP_SET_PASSWORD,
};

/// A decodable reply that opens with a completion code.
///
/// Callers must check [`Response::completion_code`] before trusting any
/// other field; a failed status leaves the payload at its default.
pub trait Response: Decode {
    fn completion_code(&self) -> CompletionCode;
}

/// Reply carrying nothing but the completion code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusResponse {
    pub completion_code: CompletionCode,
}

pub type SetUserNameResponse = StatusResponse;
pub type SetUserPasswordResponse = StatusResponse;
pub type EnableUserResponse = StatusResponse;
pub type SetUserAccessResponse = StatusResponse;
pub type ChassisControlResponse = StatusResponse;
pub type SetSystemBootOptionsResponse = StatusResponse;

impl Encode for StatusResponse {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.completion_code.0);
        Ok(())
    }
}

impl Decode for StatusResponse {
    fn decode(src: &[u8]) -> Result<Self> {
        const MESSAGE: &str = "status response";
        let completion_code = completion_code(MESSAGE, src)?;
        if completion_code.is_success() {
            expect_len(MESSAGE, src, 1)?;
        }
        Ok(Self { completion_code })
    }
}

impl Response for StatusResponse {
    fn completion_code(&self) -> CompletionCode {
        self.completion_code
    }
}

/// Reply for commands without a typed payload: status plus verbatim data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub completion_code: CompletionCode,
    pub data: Bytes,
}

impl Encode for RawResponse {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(1 + self.data.len());
        dst.put_u8(self.completion_code.0);
        if self.completion_code.is_success() {
            dst.put_slice(&self.data);
        }
        Ok(())
    }
}

impl Decode for RawResponse {
    fn decode(src: &[u8]) -> Result<Self> {
        let completion_code = completion_code("raw response", src)?;
        if !completion_code.is_success() {
            return Ok(Self {
                completion_code,
                ..Self::default()
            });
        }
        Ok(Self {
            completion_code,
            data: Bytes::copy_from_slice(&src[1..]),
        })
    }
}

impl Response for RawResponse {
    fn completion_code(&self) -> CompletionCode {
        self.completion_code
    }
}

macro_rules! request_payloads {
    ($($variant:ident($ty:ty) => ($netfn:ident, $cmd:ident)),* $(,)?) => {
        /// Closed set of request payloads, one variant per message type.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum RequestPayload {
            $($variant($ty),)*
            /// Pre-encoded data for a caller-chosen routing key.
            Raw(Bytes),
        }

        impl RequestPayload {
            /// Routing key implied by a typed payload; `None` for raw data.
            pub fn routing_key(&self) -> Option<(NetworkFunction, Command)> {
                match self {
                    $(RequestPayload::$variant(_) => {
                        Some((NetworkFunction::$netfn, Command::$cmd))
                    })*
                    RequestPayload::Raw(_) => None,
                }
            }
        }

        impl Encode for RequestPayload {
            fn encode(&self, dst: &mut BytesMut) -> Result<()> {
                match self {
                    $(RequestPayload::$variant(inner) => inner.encode(dst),)*
                    RequestPayload::Raw(data) => {
                        dst.put_slice(data);
                        Ok(())
                    }
                }
            }
        }

        $(
            impl From<$ty> for RequestPayload {
                fn from(value: $ty) -> Self {
                    RequestPayload::$variant(value)
                }
            }

            impl From<$ty> for Request {
                fn from(value: $ty) -> Self {
                    Request {
                        network_function: NetworkFunction::$netfn,
                        command: Command::$cmd,
                        payload: RequestPayload::$variant(value),
                    }
                }
            }
        )*
    };
}

request_payloads! {
    DeviceId(DeviceIdRequest) => (App, GET_DEVICE_ID),
    ChannelAuthCapabilities(ChannelAuthCapabilitiesRequest) => (App, GET_CHANNEL_AUTH_CAPABILITIES),
    SetUserAccess(SetUserAccessRequest) => (App, SET_USER_ACCESS),
    GetUserSummary(GetUserSummaryRequest) => (App, GET_USER_ACCESS),
    SetUserName(SetUserNameRequest) => (App, SET_USER_NAME),
    GetUserName(GetUserNameRequest) => (App, GET_USER_NAME),
    SetUserPassword(SetUserPasswordRequest) => (App, SET_USER_PASSWORD),
    EnableUser(EnableUserRequest) => (App, SET_USER_PASSWORD),
    ChassisStatus(ChassisStatusRequest) => (Chassis, CHASSIS_STATUS),
    ChassisControl(ChassisControlRequest) => (Chassis, CHASSIS_CONTROL),
    SetSystemBootOptions(SetSystemBootOptionsRequest) => (Chassis, SET_SYSTEM_BOOT_OPTIONS),
    SystemBootOptions(SystemBootOptionsRequest) => (Chassis, GET_SYSTEM_BOOT_OPTIONS),
}

impl RequestPayload {
    /// Decode request data addressed to `(network_function, command)`.
    ///
    /// Pairs without a typed payload decode as [`RequestPayload::Raw`].
    /// Set User Password carries two payload shapes told apart by the
    /// operation byte.
    pub fn decode(
        network_function: NetworkFunction,
        command: Command,
        src: &[u8],
    ) -> Result<Self> {
        use NetworkFunction::{App, Chassis};

        let payload = match (network_function, command) {
            (App, Command::GET_DEVICE_ID) => DeviceIdRequest::decode(src)?.into(),
            (App, Command::GET_CHANNEL_AUTH_CAPABILITIES) => {
                ChannelAuthCapabilitiesRequest::decode(src)?.into()
            }
            (App, Command::SET_USER_ACCESS) => SetUserAccessRequest::decode(src)?.into(),
            (App, Command::GET_USER_ACCESS) => GetUserSummaryRequest::decode(src)?.into(),
            (App, Command::SET_USER_NAME) => SetUserNameRequest::decode(src)?.into(),
            (App, Command::GET_USER_NAME) => GetUserNameRequest::decode(src)?.into(),
            (App, Command::SET_USER_PASSWORD) => match src.get(1).copied() {
                Some(OP_ENABLE_USER) => EnableUserRequest::decode(src)?.into(),
                Some(OP_SET_PASSWORD) | None => SetUserPasswordRequest::decode(src)?.into(),
                Some(value) => {
                    return Err(MessageError::InvalidField {
                        field: "password operation",
                        value,
                    })
                }
            },
            (Chassis, Command::CHASSIS_STATUS) => ChassisStatusRequest::decode(src)?.into(),
            (Chassis, Command::CHASSIS_CONTROL) => ChassisControlRequest::decode(src)?.into(),
            (Chassis, Command::SET_SYSTEM_BOOT_OPTIONS) => {
                SetSystemBootOptionsRequest::decode(src)?.into()
            }
            (Chassis, Command::GET_SYSTEM_BOOT_OPTIONS) => {
                SystemBootOptionsRequest::decode(src)?.into()
            }
            _ => {
                trace!(%network_function, %command, len = src.len(), "untyped request payload");
                RequestPayload::Raw(Bytes::copy_from_slice(src))
            }
        };
        Ok(payload)
    }
}

/// A command addressed to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    network_function: NetworkFunction,
    command: Command,
    payload: RequestPayload,
}

impl Request {
    /// Request with pre-encoded data for an arbitrary routing key.
    pub fn raw(
        network_function: NetworkFunction,
        command: impl Into<Command>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            network_function,
            command: command.into(),
            payload: RequestPayload::Raw(data.into()),
        }
    }

    /// Decode a request as a device would receive it.
    pub fn decode(network_function: u8, command: u8, src: &[u8]) -> Result<Self> {
        let network_function = NetworkFunction::try_from(network_function)?;
        let command = Command(command);
        let payload = RequestPayload::decode(network_function, command, src)?;
        Ok(Self {
            network_function,
            command,
            payload,
        })
    }

    pub fn network_function(&self) -> NetworkFunction {
        self.network_function
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn payload(&self) -> &RequestPayload {
        &self.payload
    }

    /// Encode the payload bytes that follow the routing key on the wire.
    pub fn encode_payload(&self) -> Result<Bytes> {
        self.payload.to_bytes()
    }
}
