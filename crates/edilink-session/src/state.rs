use std::fmt;

/// Protocol state of a live session.
///
/// Only states a caller can observe have variants. Before the handshake
/// completes there is no session value, and [`Session::disconnect`] consumes
/// the session, so "closing" and "closed" are never visible either. `send`
/// and `recv` are accepted only in [`SessionState::Ready`].
///
/// [`Session::disconnect`]: crate::Session::disconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Idle and synchronized with the host.
    Ready,
    /// A frame is being written or its acknowledgment awaited.
    Sending,
    /// A frame is being read or its acknowledgment written.
    Receiving,
    /// An operation failed part way; the stream position is unknown and
    /// only teardown is accepted.
    Faulted,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Ready => "ready",
            SessionState::Sending => "sending",
            SessionState::Receiving => "receiving",
            SessionState::Faulted => "faulted",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
