use edilink_transport::{resolve, EdiStream};

use crate::error::{Result, SessionError};
use crate::log::{LogHandle, NoopLog};
use crate::session::{Session, SessionConfig};

/// Connect to an EDI host and complete the security handshake.
pub fn connect(addr: &str) -> Result<Session<EdiStream>> {
    connect_with_config(addr, SessionConfig::default(), NoopLog::handle())
}

/// Connect with explicit configuration and log sink.
///
/// The returned session carries the success status of this call in
/// [`Session::connect_status`].
///
/// Resolution, connect and each handshake step fail with their own status
/// code. Nothing is retried; a caller that wants another attempt calls this
/// again.
pub fn connect_with_config(
    addr: &str,
    config: SessionConfig,
    log: LogHandle,
) -> Result<Session<EdiStream>> {
    log.info(format_args!("connect: {addr}"));

    let stream = open(addr, &config).inspect_err(|err| {
        log.error(format_args!("{} error={}", err.op(), err.code()));
        log.error(format_args!("{err}"));
    })?;

    Session::handshake(stream, config, log)
}

fn open(addr: &str, config: &SessionConfig) -> Result<EdiStream> {
    let addrs = resolve(addr).map_err(SessionError::Resolve)?;
    let stream = edilink_transport::connect(&addrs, config.connect_timeout)
        .map_err(SessionError::Connect)?;

    stream
        .set_read_timeout(config.read_timeout)
        .and_then(|()| stream.set_write_timeout(config.write_timeout))
        .map_err(SessionError::Connect)?;

    Ok(stream)
}
