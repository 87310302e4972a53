//! IPMI command/response codec with strict length validation.
//!
//! Every message type knows its exact wire layout:
//! - Requests encode to a fixed or exactly bounded byte sequence
//! - Responses open with a completion code, checked before the payload is trusted
//! - Buffers shorter or longer than the declared size are rejected, never guessed at
//!
//! [`Request`] and [`Response`] pair the codec with the routing key
//! (network function, command) so transports can drive any message generically.

pub mod app;
pub mod chassis;
pub mod codec;
pub mod completion;
pub mod envelope;
pub mod error;
pub mod netfn;
pub mod user;

pub use app::{
    ChannelAuthCapabilitiesRequest, ChannelAuthCapabilitiesResponse, DeviceIdRequest,
    DeviceIdResponse, PrivilegeLevel, CURRENT_CHANNEL,
};
pub use chassis::{
    BootDevice, BootParam, ChassisControl, ChassisControlRequest, ChassisStatusRequest,
    ChassisStatusResponse, PowerRestorePolicy, SetSystemBootOptionsRequest,
    SystemBootOptionsRequest, SystemBootOptionsResponse,
};
pub use codec::{Decode, Encode};
pub use completion::{CompletionCode, CompletionError};
pub use envelope::{
    ChassisControlResponse, EnableUserResponse, RawResponse, Request, RequestPayload, Response,
    SetSystemBootOptionsResponse, SetUserAccessResponse, SetUserNameResponse,
    SetUserPasswordResponse, StatusResponse,
};
pub use error::{MessageError, Result};
pub use netfn::{Command, NetworkFunction};
pub use user::{
    EnableUserRequest, GetUserNameRequest, GetUserNameResponse, GetUserSummaryRequest,
    GetUserSummaryResponse, SetUserAccessRequest, SetUserNameRequest, SetUserPasswordRequest,
    MAX_PASSWORD_LEN, MAX_USERNAME_LEN,
};
