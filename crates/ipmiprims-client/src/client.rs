use bytes::Bytes;
use ipmiprims_message::{
    BootDevice, BootParam, ChassisControl, ChassisControlRequest, ChassisControlResponse,
    ChassisStatusRequest, ChassisStatusResponse, CompletionCode, DeviceIdRequest,
    DeviceIdResponse, EnableUserRequest, EnableUserResponse, GetUserNameRequest,
    GetUserNameResponse, GetUserSummaryRequest, GetUserSummaryResponse, NetworkFunction,
    RawResponse, Request, Response, SetSystemBootOptionsRequest, SetSystemBootOptionsResponse,
    SetUserAccessRequest, SetUserAccessResponse, SetUserNameRequest, SetUserNameResponse,
    SetUserPasswordRequest, SetUserPasswordResponse, SystemBootOptionsRequest,
    SystemBootOptionsResponse,
};
use ipmiprims_transport::{
    new_transport_with_config, Backend, Connection, LanConfig, Transport, TransportError,
};
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};

/// Set-in-progress values for the boot options parameter.
const SET_COMPLETE: u8 = 0x00;
const SET_IN_PROGRESS: u8 = 0x01;
const COMMIT_WRITE: u8 = 0x02;

/// Owns one open transport for its whole lifetime.
///
/// The transport is opened on construction and closed by [`Client::close`]
/// or, failing that, on drop.
#[derive(Debug)]
pub struct Client<T: Transport = Backend> {
    transport: T,
}

impl Client<Backend> {
    /// Select a backend for `connection` and open it.
    pub fn connect(connection: Connection) -> Result<Self> {
        Self::connect_with_config(connection, LanConfig::default())
    }

    pub fn connect_with_config(connection: Connection, config: LanConfig) -> Result<Self> {
        Self::new(new_transport_with_config(connection, config))
    }
}

impl<T: Transport> Client<T> {
    /// Open `transport` and take ownership of it.
    pub fn new(mut transport: T) -> Result<Self> {
        transport.open()?;
        Ok(Self { transport })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send any request, decoding into a caller-supplied response.
    pub fn send<R: Response>(
        &mut self,
        request: impl Into<Request>,
        response: &mut R,
    ) -> Result<()> {
        let request = request.into();
        self.transport.send(&request, response)?;
        Ok(())
    }

    /// Send a request and return its decoded response.
    pub fn call<R: Response + Default>(&mut self, request: impl Into<Request>) -> Result<R> {
        let mut response = R::default();
        self.send(request, &mut response)?;
        Ok(response)
    }

    pub fn device_id(&mut self) -> Result<DeviceIdResponse> {
        self.call(DeviceIdRequest)
    }

    pub fn chassis_status(&mut self) -> Result<ChassisStatusResponse> {
        self.call(ChassisStatusRequest)
    }

    pub fn chassis_control(&mut self, control: ChassisControl) -> Result<()> {
        info!(?control, "chassis control");
        self.call::<ChassisControlResponse>(ChassisControlRequest { control })?;
        Ok(())
    }

    pub fn boot_options(&mut self, param: BootParam) -> Result<SystemBootOptionsResponse> {
        self.call(SystemBootOptionsRequest::new(param))
    }

    /// Set the next boot device.
    ///
    /// Runs set-in-progress, boot-info acknowledge, boot flags and commit
    /// write. Devices that do not support set-in-progress skip the progress
    /// steps. If a later step fails, set-in-progress is reset to complete.
    pub fn set_boot_device(&mut self, device: BootDevice, persistent: bool) -> Result<()> {
        info!(%device, persistent, "setting boot device");

        let tracked = match self.set_boot_param(BootParam::SET_IN_PROGRESS, vec![SET_IN_PROGRESS])
        {
            Ok(()) => true,
            Err(err) if err.completion_code() == Some(CompletionCode::PARAMETER_NOT_SUPPORTED) => {
                debug!("set-in-progress not supported, continuing without it");
                false
            }
            Err(source) => {
                return Err(ClientError::Sequence {
                    step: "set in progress",
                    source,
                })
            }
        };

        let result = self
            .set_boot_param(BootParam::BOOT_INFO_ACKNOWLEDGE, vec![0x01, 0x01])
            .map_err(|source| ClientError::Sequence {
                step: "boot info acknowledge",
                source,
            })
            .and_then(|()| {
                self.send(
                    SetSystemBootOptionsRequest::boot_flags(device, persistent),
                    &mut SetSystemBootOptionsResponse::default(),
                )
                .map_err(|err| match err {
                    ClientError::Transport(source) => ClientError::Sequence {
                        step: "boot flags",
                        source,
                    },
                    other => other,
                })
            });

        if !tracked {
            return result;
        }
        match result {
            Ok(()) => self
                .set_boot_param(BootParam::SET_IN_PROGRESS, vec![COMMIT_WRITE])
                .map_err(|source| ClientError::Sequence {
                    step: "commit write",
                    source,
                }),
            Err(err) => {
                if let Err(reset) =
                    self.set_boot_param(BootParam::SET_IN_PROGRESS, vec![SET_COMPLETE])
                {
                    warn!(error = %reset, "failed to clear set-in-progress");
                }
                Err(err)
            }
        }
    }

    fn set_boot_param(
        &mut self,
        param: BootParam,
        data: Vec<u8>,
    ) -> std::result::Result<(), TransportError> {
        let request = Request::from(SetSystemBootOptionsRequest::new(param, data));
        self.transport
            .send(&request, &mut SetSystemBootOptionsResponse::default())
    }

    pub fn user_name(&mut self, user_id: u8) -> Result<String> {
        let resp: GetUserNameResponse = self.call(GetUserNameRequest { user_id })?;
        Ok(resp.username)
    }

    pub fn set_user_name(&mut self, user_id: u8, username: &str) -> Result<()> {
        self.call::<SetUserNameResponse>(SetUserNameRequest {
            user_id,
            username: username.to_string(),
        })?;
        Ok(())
    }

    /// Set a user's password. At most 16 bytes.
    pub fn set_user_password(&mut self, user_id: u8, password: &[u8]) -> Result<()> {
        self.call::<SetUserPasswordResponse>(SetUserPasswordRequest {
            user_id,
            password: Bytes::copy_from_slice(password),
        })?;
        Ok(())
    }

    pub fn enable_user(&mut self, user_id: u8) -> Result<()> {
        self.call::<EnableUserResponse>(EnableUserRequest { user_id })?;
        Ok(())
    }

    pub fn user_summary(&mut self, channel: u8, user_id: u8) -> Result<GetUserSummaryResponse> {
        self.call(GetUserSummaryRequest {
            channel_number: channel,
            user_id,
        })
    }

    pub fn set_user_access(&mut self, request: SetUserAccessRequest) -> Result<()> {
        self.call::<SetUserAccessResponse>(request)?;
        Ok(())
    }

    /// Send pre-encoded data for any routing key.
    pub fn raw(
        &mut self,
        network_function: NetworkFunction,
        command: u8,
        data: impl Into<Bytes>,
    ) -> Result<RawResponse> {
        self.call(Request::raw(network_function, command, data))
    }

    /// Close the transport, reporting any failure.
    pub fn close(mut self) -> Result<()> {
        self.transport.close()?;
        Ok(())
    }
}

impl<T: Transport> Drop for Client<T> {
    fn drop(&mut self) {
        if self.transport.is_open() {
            if let Err(err) = self.transport.close() {
                warn!(error = %err, "failed to close transport on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use ipmiprims_message::{Command, Encode, MessageError};
    use ipmiprims_transport::ErrorKind;

    use super::*;

    #[derive(Debug, Default)]
    struct Log {
        opens: usize,
        closes: usize,
        sent: Vec<(NetworkFunction, Command, Vec<u8>)>,
        replies: VecDeque<Vec<u8>>,
        fail_open: bool,
    }

    #[derive(Debug)]
    struct MockTransport {
        log: Rc<RefCell<Log>>,
        open: bool,
    }

    impl Transport for MockTransport {
        fn open(&mut self) -> std::result::Result<(), TransportError> {
            let mut log = self.log.borrow_mut();
            log.opens += 1;
            if log.fail_open {
                return Err(TransportError::Timeout(std::time::Duration::from_secs(1)));
            }
            self.open = true;
            Ok(())
        }

        fn exchange(&mut self, request: &Request) -> std::result::Result<Bytes, TransportError> {
            if !self.open {
                return Err(TransportError::NotOpen);
            }
            let data = request.encode_payload()?;
            let mut log = self.log.borrow_mut();
            log.sent
                .push((request.network_function(), request.command(), data.to_vec()));
            Ok(Bytes::from(log.replies.pop_front().unwrap_or_else(|| vec![0x00])))
        }

        fn close(&mut self) -> std::result::Result<(), TransportError> {
            if self.open {
                self.log.borrow_mut().closes += 1;
            }
            self.open = false;
            Ok(())
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }

    fn client(replies: Vec<Vec<u8>>) -> (Client<MockTransport>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log {
            replies: replies.into(),
            ..Log::default()
        }));
        let transport = MockTransport {
            log: Rc::clone(&log),
            open: false,
        };
        (Client::new(transport).expect("mock should open"), log)
    }

    fn boot_writes(log: &Log) -> Vec<Vec<u8>> {
        log.sent
            .iter()
            .filter(|(_, cmd, _)| *cmd == Command::SET_SYSTEM_BOOT_OPTIONS)
            .map(|(_, _, data)| data.clone())
            .collect()
    }

    #[test]
    fn new_opens_and_drop_closes() {
        let (client, log) = client(Vec::new());
        assert_eq!(log.borrow().opens, 1);
        assert!(client.transport().is_open());
        drop(client);
        assert_eq!(log.borrow().closes, 1);
    }

    #[test]
    fn explicit_close_closes_once() {
        let (client, log) = client(Vec::new());
        client.close().expect("close should succeed");
        assert_eq!(log.borrow().closes, 1);
    }

    #[test]
    fn open_failure_is_returned() {
        let log = Rc::new(RefCell::new(Log {
            fail_open: true,
            ..Log::default()
        }));
        let err = Client::new(MockTransport {
            log: Rc::clone(&log),
            open: false,
        })
        .expect_err("open should fail");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(log.borrow().closes, 0);
    }

    #[test]
    fn set_boot_device_runs_full_sequence() {
        let (mut client, log) = client(Vec::new());
        client
            .set_boot_device(BootDevice::PXE, true)
            .expect("sequence should succeed");
        assert_eq!(
            boot_writes(&log.borrow()),
            vec![
                vec![0x00, 0x01],
                vec![0x04, 0x01, 0x01],
                vec![0x05, 0x80, 0x44, 0x00, 0x00, 0x00],
                vec![0x00, 0x02],
            ]
        );
    }

    #[test]
    fn set_boot_device_without_progress_support() {
        let (mut client, log) = client(vec![vec![0x80]]);
        client
            .set_boot_device(BootDevice::DISK, false)
            .expect("sequence should succeed");
        assert_eq!(
            boot_writes(&log.borrow()),
            vec![
                vec![0x00, 0x01],
                vec![0x04, 0x01, 0x01],
                vec![0x05, 0x80, 0x08, 0x00, 0x00, 0x00],
            ]
        );
    }

    #[test]
    fn failed_boot_flags_clear_set_in_progress() {
        let (mut client, log) = client(vec![vec![0x00], vec![0x00], vec![0xd4]]);
        let err = client
            .set_boot_device(BootDevice::BIOS, false)
            .expect_err("boot flags should fail");
        assert!(matches!(err, ClientError::Sequence { step: "boot flags", .. }));
        assert_eq!(err.completion_code(), Some(CompletionCode::INSUFFICIENT_PRIVILEGE));
        assert_eq!(boot_writes(&log.borrow()).last(), Some(&vec![0x00, 0x00]));
    }

    #[test]
    fn user_name_is_trimmed() {
        let mut reply = vec![0x00];
        reply.extend_from_slice(b"admin");
        reply.resize(17, 0);
        let (mut client, log) = client(vec![reply]);
        assert_eq!(client.user_name(2).expect("user name"), "admin");
        assert_eq!(
            log.borrow().sent[0],
            (NetworkFunction::App, Command::GET_USER_NAME, vec![0x02])
        );
    }

    #[test]
    fn overlong_password_never_reaches_transport() {
        let (mut client, log) = client(Vec::new());
        let err = client
            .set_user_password(3, &[b'x'; 17])
            .expect_err("password should be rejected");
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert!(log.borrow().sent.is_empty());
    }

    #[test]
    fn device_failure_surfaces_code() {
        let (mut client, _log) = client(vec![vec![0xc1]]);
        let err = client
            .raw(NetworkFunction::App, 0xff, Vec::new())
            .expect_err("raw should fail");
        assert_eq!(err.kind(), ErrorKind::Device);
        assert_eq!(err.to_string(), "invalid command (code=0xc1)");
    }

    #[test]
    fn short_reply_is_malformed() {
        let (mut client, _log) = client(vec![vec![0x00, 0x01]]);
        let err = client.chassis_status().expect_err("short reply should fail");
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Message(MessageError::ShortPacket { .. }))
        ));
    }

    #[test]
    fn enable_user_encodes_marker() {
        let (mut client, log) = client(Vec::new());
        client.enable_user(4).expect("enable should succeed");
        client
            .set_user_access(SetUserAccessRequest {
                access_options: 0x91,
                user_id: 4,
                user_limits: 0x04,
                user_session_limit: 0,
            })
            .expect("set access should succeed");
        let expected = SetUserAccessRequest {
            access_options: 0x91,
            user_id: 4,
            user_limits: 0x04,
            user_session_limit: 0,
        }
        .to_bytes()
        .expect("access request should encode");
        let log = log.borrow();
        assert_eq!(log.sent[0].2, vec![0x04, 0x01]);
        assert_eq!(log.sent[1].2, expected.to_vec());
    }
}
