//! User management messages (App network function).

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{completion_code, expect_len, fixed_str, put_fixed, Decode, Encode};
use crate::completion::CompletionCode;
use crate::envelope::Response;
use crate::error::{MessageError, Result};

/// Fixed wire width of a user name.
pub const MAX_USERNAME_LEN: usize = 16;

/// Fixed wire width of an IPMI v1.5 password.
pub const MAX_PASSWORD_LEN: usize = 16;

/// Set User Password operation: enable user.
pub const OP_ENABLE_USER: u8 = 0x01;
/// Set User Password operation: set password.
pub const OP_SET_PASSWORD: u8 = 0x02;

/// Get User Name request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetUserNameRequest {
    pub user_id: u8,
}

impl Encode for GetUserNameRequest {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.user_id);
        Ok(())
    }
}

impl Decode for GetUserNameRequest {
    fn decode(src: &[u8]) -> Result<Self> {
        expect_len("get user name request", src, 1)?;
        Ok(Self { user_id: src[0] })
    }
}

/// Get User Name response: status plus a 16-byte zero-padded name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetUserNameResponse {
    pub completion_code: CompletionCode,
    /// Decoded lossily: bytes that are not UTF-8 come back as U+FFFD.
    pub username: String,
}

impl Encode for GetUserNameResponse {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.completion_code.0);
        if !self.completion_code.is_success() {
            return Ok(());
        }
        put_fixed(dst, "username", self.username.as_bytes(), MAX_USERNAME_LEN)
    }
}

impl Decode for GetUserNameResponse {
    fn decode(src: &[u8]) -> Result<Self> {
        const MESSAGE: &str = "get user name response";
        let completion_code = completion_code(MESSAGE, src)?;
        if !completion_code.is_success() {
            return Ok(Self {
                completion_code,
                ..Self::default()
            });
        }
        expect_len(MESSAGE, src, 1 + MAX_USERNAME_LEN)?;
        Ok(Self {
            completion_code,
            username: fixed_str(&src[1..]),
        })
    }
}

impl Response for GetUserNameResponse {
    fn completion_code(&self) -> CompletionCode {
        self.completion_code
    }
}

/// Set User Name request: user id plus a 16-byte zero-padded name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetUserNameRequest {
    pub user_id: u8,
    /// Decoded lossily, like [`GetUserNameResponse::username`].
    pub username: String,
}

impl Encode for SetUserNameRequest {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.user_id);
        put_fixed(dst, "username", self.username.as_bytes(), MAX_USERNAME_LEN)
    }
}

impl Decode for SetUserNameRequest {
    fn decode(src: &[u8]) -> Result<Self> {
        expect_len("set user name request", src, 1 + MAX_USERNAME_LEN)?;
        Ok(Self {
            user_id: src[0],
            username: fixed_str(&src[1..]),
        })
    }
}

/// Set User Password request with the "set password" operation.
///
/// The password is copied verbatim and zero-padded; it is not
/// null-terminated when it fills the field.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SetUserPasswordRequest {
    pub user_id: u8,
    pub password: Bytes,
}

impl SetUserPasswordRequest {
    const LEN: usize = 2 + MAX_PASSWORD_LEN;
}

impl std::fmt::Debug for SetUserPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetUserPasswordRequest")
            .field("user_id", &self.user_id)
            .field(
                "password",
                &format_args!("<redacted:{} bytes>", self.password.len()),
            )
            .finish()
    }
}

impl Encode for SetUserPasswordRequest {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(Self::LEN);
        dst.put_u8(self.user_id);
        dst.put_u8(OP_SET_PASSWORD);
        put_fixed(dst, "password", &self.password, MAX_PASSWORD_LEN)
    }
}

impl Decode for SetUserPasswordRequest {
    fn decode(src: &[u8]) -> Result<Self> {
        expect_len("set user password request", src, Self::LEN)?;
        if src[1] != OP_SET_PASSWORD {
            return Err(MessageError::InvalidField {
                field: "password operation",
                value: src[1],
            });
        }
        Ok(Self {
            user_id: src[0],
            password: Bytes::copy_from_slice(&src[2..]),
        })
    }
}

/// Set User Password request with the "enable user" operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnableUserRequest {
    pub user_id: u8,
}

impl Encode for EnableUserRequest {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.user_id);
        dst.put_u8(OP_ENABLE_USER);
        Ok(())
    }
}

impl Decode for EnableUserRequest {
    fn decode(src: &[u8]) -> Result<Self> {
        expect_len("enable user request", src, 2)?;
        if src[1] != OP_ENABLE_USER {
            return Err(MessageError::InvalidField {
                field: "password operation",
                value: src[1],
            });
        }
        Ok(Self { user_id: src[0] })
    }
}

/// Get User Access request; the response summarises channel user counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetUserSummaryRequest {
    pub channel_number: u8,
    pub user_id: u8,
}

impl Encode for GetUserSummaryRequest {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.channel_number);
        dst.put_u8(self.user_id);
        Ok(())
    }
}

impl Decode for GetUserSummaryRequest {
    fn decode(src: &[u8]) -> Result<Self> {
        expect_len("get user access request", src, 2)?;
        Ok(Self {
            channel_number: src[0],
            user_id: src[1],
        })
    }
}

/// Get User Access response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetUserSummaryResponse {
    pub completion_code: CompletionCode,
    pub max_users: u8,
    pub enabled_users: u8,
    pub fixed_name_users: u8,
    pub channel_access: u8,
}

impl GetUserSummaryResponse {
    const MESSAGE: &'static str = "get user access response";

    pub fn max_user_count(&self) -> u8 {
        self.max_users & 0x3f
    }

    pub fn enabled_user_count(&self) -> u8 {
        self.enabled_users & 0x3f
    }

    /// Privilege level limit for the queried user on this channel.
    pub fn privilege_limit(&self) -> u8 {
        self.channel_access & 0x0f
    }
}

impl Encode for GetUserSummaryResponse {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(self.completion_code.0);
        if !self.completion_code.is_success() {
            return Ok(());
        }
        dst.put_slice(&[
            self.max_users,
            self.enabled_users,
            self.fixed_name_users,
            self.channel_access,
        ]);
        Ok(())
    }
}

impl Decode for GetUserSummaryResponse {
    fn decode(src: &[u8]) -> Result<Self> {
        let completion_code = completion_code(Self::MESSAGE, src)?;
        if !completion_code.is_success() {
            return Ok(Self {
                completion_code,
                ..Self::default()
            });
        }
        expect_len(Self::MESSAGE, src, 5)?;
        Ok(Self {
            completion_code,
            max_users: src[1],
            enabled_users: src[2],
            fixed_name_users: src[3],
            channel_access: src[4],
        })
    }
}

impl Response for GetUserSummaryResponse {
    fn completion_code(&self) -> CompletionCode {
        self.completion_code
    }
}

/// Set User Access request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetUserAccessRequest {
    /// Change bit, callback/link/messaging flags and channel number.
    pub access_options: u8,
    pub user_id: u8,
    /// Privilege level limit.
    pub user_limits: u8,
    pub user_session_limit: u8,
}

impl Encode for SetUserAccessRequest {
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_slice(&[
            self.access_options,
            self.user_id,
            self.user_limits,
            self.user_session_limit,
        ]);
        Ok(())
    }
}

impl Decode for SetUserAccessRequest {
    fn decode(src: &[u8]) -> Result<Self> {
        expect_len("set user access request", src, 4)?;
        Ok(Self {
            access_options: src[0],
            user_id: src[1],
            user_limits: src[2],
            user_session_limit: src[3],
        })
    }
}
