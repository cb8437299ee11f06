use std::borrow::Cow;
use std::time::Duration;

use bytes::Bytes;
use edilink_frame::{
    frame_length, read_ack, read_length, read_payload, write_ack, write_length, write_payload,
    FrameConfig, ACK, SESSION_END,
};
use edilink_transport::Transport;

use crate::error::{Result, SessionError};
use crate::handshake::{handshake_client, HandshakeConfig, HandshakeResult};
use crate::log::{LogHandle, NoopLog};
use crate::state::SessionState;
use crate::status::{op, Status};

/// Configuration for a host session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Security handshake settings.
    pub handshake: HandshakeConfig,
    /// Payload read settings.
    pub frame: FrameConfig,
    /// Bound on opening the TCP stream. `None` blocks until the OS gives up.
    pub connect_timeout: Option<Duration>,
    /// Socket read deadline. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
    /// Socket write deadline. `None` blocks indefinitely.
    pub write_timeout: Option<Duration>,
}

/// A frame received from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    /// Raw payload bytes as read from the stream.
    pub payload: Bytes,
    /// Success status; `len` is the number of bytes read.
    pub status: Status,
}

impl Received {
    /// The payload as text. Invalid UTF-8 is replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// An established session with an EDI host.
///
/// Frames alternate strictly with acknowledgments, so a session handles one
/// operation at a time and is driven through `&mut self`. Teardown consumes
/// the session.
pub struct Session<S> {
    stream: S,
    state: SessionState,
    config: SessionConfig,
    log: LogHandle,
    peer: String,
    handshake: HandshakeResult,
    connected: Status,
}

impl<S: Transport> Session<S> {
    /// Run the security handshake over an already-open stream.
    ///
    /// On failure the stream is dropped.
    pub fn handshake(mut stream: S, config: SessionConfig, log: LogHandle) -> Result<Self> {
        let peer = stream.peer_label();
        log.trace(format_args!("handshake with {peer}"));

        let handshake = match handshake_client(&mut stream, &config.handshake) {
            Ok(result) => result,
            Err(err) => {
                log.error(format_args!("{} error={}", err.op(), err.code()));
                log.error(format_args!("{err}"));
                return Err(err);
            }
        };

        log.info(format_args!("connect: {peer} was successful"));
        Ok(Self {
            stream,
            state: SessionState::Ready,
            config,
            log,
            peer,
            handshake,
            connected: connected_status(),
        })
    }

    /// Wrap a stream that has already completed the handshake elsewhere.
    pub fn from_parts(stream: S, config: SessionConfig, handshake: HandshakeResult) -> Self {
        let peer = stream.peer_label();
        Self {
            stream,
            state: SessionState::Ready,
            config,
            log: NoopLog::handle(),
            peer,
            handshake,
            connected: connected_status(),
        }
    }

    /// Replace the log sink.
    pub fn with_log(mut self, log: LogHandle) -> Self {
        self.log = log;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The remote end, for diagnostics.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// The host's handshake response.
    pub fn handshake_reply(&self) -> &[u8] {
        self.handshake.reply.as_ref()
    }

    /// The success status of the connect that produced this session.
    pub fn connect_status(&self) -> &Status {
        &self.connected
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Send a text payload and wait for the host's acknowledgment.
    pub fn send(&mut self, payload: &str) -> Result<Status> {
        self.send_bytes(payload.as_bytes())
    }

    /// Send a payload and wait for the host's acknowledgment.
    ///
    /// Succeeds only when the host answers with the ACK byte. Any other
    /// byte is a desynchronization failure.
    pub fn send_bytes(&mut self, payload: &[u8]) -> Result<Status> {
        self.expect_ready(op::SEND)?;
        let declared = frame_length(payload).map_err(SessionError::PayloadTooLarge)?;

        self.state = SessionState::Sending;
        let result = self.send_frame(payload, declared);
        self.settle(&result);
        result
    }

    /// Receive one frame and acknowledge it.
    ///
    /// A negative declared length fails with
    /// [`SessionError::EndOfSession`] without reading a payload or writing an
    /// acknowledgment; the session stays usable for teardown.
    pub fn recv(&mut self) -> Result<Received> {
        self.expect_ready(op::RECV)?;

        self.state = SessionState::Receiving;
        let result = self.recv_frame();
        self.settle(&result);
        result
    }

    /// Tear the session down.
    ///
    /// Writes the session-end sentinel, then makes one best-effort attempt
    /// to drain the host's closing frame and acknowledge it, then closes
    /// the stream. Drain and acknowledgment failures are logged and do not
    /// affect the result. If the sentinel cannot be written the error is
    /// returned at once and the stream is only dropped.
    pub fn disconnect(mut self) -> Result<Status> {
        self.log.info(format_args!("disconnect from: {}", self.peer));

        if let Err(err) = write_length(&mut self.stream, SESSION_END) {
            let err = SessionError::WriteSentinel(err);
            self.report(&err);
            return Err(err);
        }

        match self.recv_frame() {
            Ok(drained) => self.log.trace(format_args!(
                "disconnect: drained {} bytes",
                drained.payload.len()
            )),
            Err(err) => self
                .log
                .trace(format_args!("disconnect: drain ended with {err}")),
        }

        if let Err(err) = write_ack(&mut self.stream, ACK) {
            self.log.trace(format_args!("disconnect: final ack not sent: {err}"));
        }

        if let Err(err) = self.stream.close() {
            self.log.warn(format_args!("disconnect: close reported {err}"));
        }

        self.log.info(format_args!(
            "disconnect from: {} clean and successful",
            self.peer
        ));
        Ok(Status::ok(
            op::DISCONNECT,
            "session closed",
            i32::from(SESSION_END),
        ))
    }

    fn send_frame(&mut self, payload: &[u8], declared: i16) -> Result<Status> {
        self.log.trace(format_args!("send: sending length={declared}"));
        self.log.trace(format_args!(
            "send: sending data [{}]",
            String::from_utf8_lossy(payload)
        ));

        write_length(&mut self.stream, declared).map_err(SessionError::WriteLength)?;
        let sent = write_payload(&mut self.stream, payload).map_err(SessionError::WritePayload)?;
        if sent < payload.len() {
            return Err(SessionError::ShortWrite {
                expected: payload.len(),
                sent,
            });
        }

        self.log.trace(format_args!("send: successfully sent length={sent}"));
        self.await_ack()
    }

    fn await_ack(&mut self) -> Result<Status> {
        let got = read_ack(&mut self.stream).map_err(SessionError::ReadAck)?;
        if got != ACK {
            return Err(SessionError::AckMismatch { got });
        }
        Ok(Status::ok(op::READ_ACK, "Successfully received ACK", 0))
    }

    fn recv_frame(&mut self) -> Result<Received> {
        self.log.trace(format_args!("recv from: {}", self.peer));

        let len = read_length(&mut self.stream).map_err(SessionError::ReadLength)?;
        self.log.trace(format_args!("recv length: {len}"));
        if len < 0 {
            return Err(SessionError::EndOfSession { len });
        }

        let payload = read_payload(&mut self.stream, len as usize, &self.config.frame)
            .map_err(SessionError::ReadPayload)?;
        write_ack(&mut self.stream, ACK).map_err(SessionError::SendAck)?;

        let payload = payload.freeze();
        self.log.trace(format_args!("recv: received length={}", payload.len()));
        self.log.trace(format_args!(
            "recv: received data [{}]",
            String::from_utf8_lossy(&payload)
        ));

        let received = i32::try_from(payload.len()).unwrap_or(i32::MAX);
        Ok(Received {
            payload,
            status: Status::ok(op::RECV, "frame received", received),
        })
    }

    fn expect_ready(&self, attempted: &'static str) -> Result<()> {
        if self.state == SessionState::Ready {
            return Ok(());
        }
        let err = SessionError::InvalidState {
            op: attempted,
            state: self.state,
        };
        self.log.warn(format_args!("{err}"));
        Err(err)
    }

    fn settle<T>(&mut self, result: &Result<T>) {
        self.state = match result {
            Ok(_) => SessionState::Ready,
            Err(err) if !err.is_fatal() => SessionState::Ready,
            Err(err) => {
                self.report(err);
                SessionState::Faulted
            }
        };
        if let Err(err) = result {
            if err.is_end_of_session() {
                self.log.info(format_args!("{}", err.status()));
            }
        }
    }

    fn report(&self, err: &SessionError) {
        self.log.error(format_args!("{} error={}", err.op(), err.code()));
        self.log.error(format_args!("{err}"));
    }
}

fn connected_status() -> Status {
    Status::ok(op::CONNECT, "connect successful", 0)
}

impl<S> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("peer", &self.peer)
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Arguments;
    use std::io::{Cursor, ErrorKind, Read, Write};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use edilink_frame::{FrameError, ReceiveMode};

    use super::*;
    use crate::log::SessionLog;
    use crate::status::code;

    struct MockStream {
        input: Cursor<Vec<u8>>,
        written: Vec<u8>,
        write_budget: Option<usize>,
        fail_writes: bool,
        // Write calls that succeed before every later one fails.
        write_calls_left: Option<usize>,
        closes: Arc<AtomicUsize>,
    }

    impl MockStream {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                written: Vec::new(),
                write_budget: None,
                fail_writes: false,
                write_calls_left: None,
                closes: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.fail_writes || self.write_calls_left == Some(0) {
                return Err(std::io::Error::from(ErrorKind::BrokenPipe));
            }
            if let Some(left) = self.write_calls_left.as_mut() {
                *left -= 1;
            }
            let n = match self.write_budget {
                Some(budget) => buf.len().min(budget - self.written.len()),
                None => buf.len(),
            };
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Transport for MockStream {
        fn close(&mut self) -> std::io::Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn peer_label(&self) -> String {
            "mock-host".to_string()
        }
    }

    #[derive(Default)]
    struct RecordingLog {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingLog {
        fn push(&self, level: &str, line: Arguments<'_>) {
            self.lines.lock().unwrap().push(format!("{level}: {line}"));
        }

        fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl SessionLog for RecordingLog {
        fn trace(&self, line: Arguments<'_>) {
            self.push("TRACE", line);
        }
        fn info(&self, line: Arguments<'_>) {
            self.push("INFO", line);
        }
        fn warn(&self, line: Arguments<'_>) {
            self.push("WARNING", line);
        }
        fn error(&self, line: Arguments<'_>) {
            self.push("ERROR", line);
        }
    }

    fn session(input: &[u8]) -> Session<MockStream> {
        session_with(MockStream::new(input), SessionConfig::default())
    }

    fn session_with(stream: MockStream, config: SessionConfig) -> Session<MockStream> {
        Session::from_parts(
            stream,
            config,
            HandshakeResult {
                reply: Bytes::from_static(b"PASS"),
            },
        )
    }

    #[test]
    fn handshake_then_ready() {
        let log = Arc::new(RecordingLog::default());
        let session = Session::handshake(
            MockStream::new(b"PASS"),
            SessionConfig::default(),
            log.clone(),
        )
        .unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.handshake_reply(), b"PASS");
        assert_eq!(session.peer(), "mock-host");

        let connected = session.connect_status();
        assert!(connected.is_ok());
        assert_eq!(connected.op(), op::CONNECT);
        assert_eq!(connected.code(), code::OK);
        assert_eq!(connected.len(), 0);
        assert!(log
            .lines()
            .contains(&"INFO: connect: mock-host was successful".to_string()));
    }

    #[test]
    fn handshake_failure_is_logged() {
        let log = Arc::new(RecordingLog::default());
        let mut stream = MockStream::new(b"PASS");
        stream.fail_writes = true;

        let err = Session::handshake(stream, SessionConfig::default(), log.clone()).unwrap_err();
        assert_eq!(err.code(), code::TOKEN_WRITE_FAILED);
        assert!(log
            .lines()
            .contains(&"ERROR: connect.write_token error=3".to_string()));
    }

    #[test]
    fn send_acknowledged() {
        let mut session = session(b"Y");

        let status = session.send("HELLO").unwrap();

        assert_eq!(status.code(), code::OK);
        assert_eq!(status.op(), op::READ_ACK);
        assert_eq!(status.message(), "Successfully received ACK");
        assert_eq!(session.get_ref().written, b"\x00\x05HELLO".to_vec());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn send_with_wrong_ack_is_desync() {
        let mut session = session(b"N");

        let err = session.send("HELLO").unwrap_err();

        assert!(matches!(err, SessionError::AckMismatch { got: b'N' }));
        assert_eq!(err.status().code(), code::DESYNC);
        assert_eq!(session.state(), SessionState::Faulted);
    }

    #[test]
    fn send_without_ack_is_transfer_failure() {
        let mut session = session(b"");

        let err = session.send("HELLO").unwrap_err();

        assert!(matches!(
            err,
            SessionError::ReadAck(FrameError::ConnectionClosed)
        ));
        assert_eq!(err.code(), code::TRANSFER_FAILED);
    }

    #[test]
    fn short_write_skips_ack_wait() {
        let mut stream = MockStream::new(b"Y");
        // Length field plus three of the five payload bytes.
        stream.write_budget = Some(5);
        let mut session = session_with(stream, SessionConfig::default());

        let err = session.send("HELLO").unwrap_err();

        assert!(matches!(
            err,
            SessionError::ShortWrite {
                expected: 5,
                sent: 3
            }
        ));
        assert_eq!(err.code(), 1);
        assert_eq!(session.get_ref().input.position(), 0);
        assert_eq!(session.state(), SessionState::Faulted);
    }

    #[test]
    fn length_write_failure() {
        let mut stream = MockStream::new(b"Y");
        stream.fail_writes = true;
        let mut session = session_with(stream, SessionConfig::default());

        let err = session.send("HELLO").unwrap_err();
        assert_eq!(err.op(), op::WRITE_LENGTH);
        assert_eq!(err.code(), 1);
    }

    #[test]
    fn payload_write_failure_after_length() {
        let mut stream = MockStream::new(b"Y");
        stream.write_calls_left = Some(1);
        let mut session = session_with(stream, SessionConfig::default());

        let err = session.send("HELLO").unwrap_err();

        assert!(matches!(err, SessionError::WritePayload(FrameError::Io(_))));
        assert_eq!(err.op(), op::WRITE_PAYLOAD);
        assert_eq!(err.code(), code::TRANSFER_FAILED);
        assert_eq!(session.get_ref().written, b"\x00\x05".to_vec());
        assert_eq!(session.get_ref().input.position(), 0);
        assert_eq!(session.state(), SessionState::Faulted);
    }

    #[test]
    fn oversize_payload_rejected_before_io() {
        let mut session = session(b"Y");
        let payload = vec![b'x'; 40_000];

        let err = session.send_bytes(&payload).unwrap_err();

        assert_eq!(err.code(), code::PAYLOAD_TOO_LARGE);
        assert!(session.get_ref().written.is_empty());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn faulted_session_rejects_transfers() {
        let mut session = session(b"N\x00\x01Z");
        session.send("HELLO").unwrap_err();
        let written = session.get_ref().written.len();

        let send_err = session.send("AGAIN").unwrap_err();
        let recv_err = session.recv().unwrap_err();

        assert_eq!(send_err.code(), code::INVALID_STATE);
        assert_eq!(recv_err.code(), code::INVALID_STATE);
        assert_eq!(recv_err.op(), op::RECV);
        assert_eq!(session.get_ref().written.len(), written);
    }

    #[test]
    fn recv_acknowledges_frame() {
        let mut session = session(b"\x00\x05WORLD");

        let received = session.recv().unwrap();

        assert_eq!(received.text(), "WORLD");
        assert_eq!(received.status.code(), code::OK);
        assert_eq!(received.status.len(), 5);
        assert_eq!(session.get_ref().written, b"Y".to_vec());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn recv_empty_frame() {
        let mut session = session(b"\x00\x00");

        let received = session.recv().unwrap();

        assert!(received.payload.is_empty());
        assert_eq!(received.status.len(), 0);
        assert_eq!(session.get_ref().written, b"Y".to_vec());
    }

    #[test]
    fn negative_length_ends_session_without_ack() {
        let mut session = session(&[0xD8, 0xF1]);

        let err = session.recv().unwrap_err();

        let status = err.status();
        assert!(status.is_end_of_session());
        assert_eq!(status.code(), -9999);
        assert_eq!(status.len(), -9999);
        assert!(session.get_ref().written.is_empty());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn any_negative_length_ends_session() {
        let mut session = session(&[0xFF, 0xFF]);

        let err = session.recv().unwrap_err();
        assert!(matches!(err, SessionError::EndOfSession { len: -1 }));
        assert_eq!(err.len(), -1);
    }

    #[test]
    fn length_read_failure_is_code_1() {
        let mut session = session(&[0x00]);

        let err = session.recv().unwrap_err();
        assert_eq!(err.op(), op::READ_LENGTH);
        assert_eq!(err.code(), 1);
    }

    #[test]
    fn payload_read_failure_is_code_1() {
        let mut session = session(b"\x00\x09WOR");

        let err = session.recv().unwrap_err();
        assert_eq!(err.op(), op::READ_PAYLOAD);
        assert_eq!(err.code(), 1);
        assert!(session.get_ref().written.is_empty());
    }

    #[test]
    fn ack_write_failure_resets_length() {
        let mut stream = MockStream::new(b"\x00\x05WORLD");
        stream.fail_writes = true;
        let mut session = session_with(stream, SessionConfig::default());

        let status = session.recv().unwrap_err().status();
        assert_eq!(status.op(), op::SEND_ACK);
        assert_eq!(status.code(), 1);
        assert_eq!(status.len(), 0);
    }

    #[test]
    fn chunked_receive_keeps_over_read() {
        let mut session = session(b"\x00\x03abcd");

        let received = session.recv().unwrap();
        assert_eq!(received.text(), "abcd");
        assert_eq!(received.status.len(), 4);
    }

    #[test]
    fn exact_receive_stops_at_declared_length() {
        let config = SessionConfig {
            frame: FrameConfig {
                receive_mode: ReceiveMode::Exact,
                ..FrameConfig::default()
            },
            ..SessionConfig::default()
        };
        let mut session = session_with(MockStream::new(b"\x00\x03abc\x00\x01d"), config);

        assert_eq!(session.recv().unwrap().text(), "abc");
        assert_eq!(session.recv().unwrap().text(), "d");
        assert_eq!(session.get_ref().written, b"YY".to_vec());
    }

    #[test]
    fn invalid_utf8_is_replaced_in_text() {
        let mut session = session(b"\x00\x02\xFFA");

        let received = session.recv().unwrap();
        assert_eq!(received.payload.as_ref(), b"\xFFA");
        assert_eq!(received.text(), "\u{FFFD}A");
    }

    #[test]
    fn disconnect_drains_and_closes() {
        let session = session(&[0xD8, 0xF1]);
        let closes = Arc::clone(&session.get_ref().closes);

        let status = session.disconnect().unwrap();

        assert_eq!(status.code(), code::OK);
        assert_eq!(status.len(), -9999);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disconnect_logs_start_and_finish() {
        let stream = MockStream::new(&[0xD8, 0xF1]);
        let log = Arc::new(RecordingLog::default());
        let session = session_with(stream, SessionConfig::default()).with_log(log.clone());

        session.disconnect().unwrap();

        let lines = log.lines();
        assert_eq!(lines.first().unwrap(), "INFO: disconnect from: mock-host");
        assert_eq!(
            lines.last().unwrap(),
            "INFO: disconnect from: mock-host clean and successful"
        );
    }

    #[test]
    fn disconnect_closes_once_when_drain_fails() {
        let session = session(b"");
        let closes = Arc::clone(&session.get_ref().closes);

        let status = session.disconnect().unwrap();

        assert!(status.is_ok());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disconnect_acknowledges_drained_payload_frame() {
        let session = session(b"\x00\x02OK");
        let closes = Arc::clone(&session.get_ref().closes);

        assert!(session.disconnect().unwrap().is_ok());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disconnect_sentinel_failure_skips_further_io() {
        let mut stream = MockStream::new(&[0xD8, 0xF1]);
        stream.fail_writes = true;
        let closes = Arc::clone(&stream.closes);
        let session = session_with(stream, SessionConfig::default());

        let status = session.disconnect().unwrap_err().status();

        assert_eq!(status.op(), op::WRITE_SENTINEL);
        assert_eq!(status.code(), 1);
        assert_eq!(status.len(), -9999);
        assert_eq!(closes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn disconnect_from_faulted_session() {
        let mut session = session(b"N");
        session.send("HELLO").unwrap_err();
        let closes = Arc::clone(&session.get_ref().closes);

        assert!(session.disconnect().unwrap().is_ok());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn transfers_are_traced() {
        let log = Arc::new(RecordingLog::default());
        let mut session = session(b"Y").with_log(log.clone());

        session.send("HELLO").unwrap();

        let lines = log.lines();
        assert!(lines.contains(&"TRACE: send: sending length=5".to_string()));
        assert!(lines.contains(&"TRACE: send: sending data [HELLO]".to_string()));
        assert!(lines.contains(&"TRACE: send: successfully sent length=5".to_string()));
    }
}
