use std::io;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{timeout, Duration};
use tracing::trace;

use super::ProbeOutcome;

/// One connection attempt to `host:port`, bounded by `limit` and abandoned
/// as soon as `cancel` turns true.
///
/// Name resolution runs inside the bounded attempt. A successful connection
/// is closed before the outcome is returned.
pub async fn probe_tcp(
    host: &str,
    port: u16,
    limit: Duration,
    mut cancel: watch::Receiver<bool>,
) -> ProbeOutcome {
    if *cancel.borrow() {
        trace!("skipping {}:{}, verdict already settled", host, port);
        return ProbeOutcome::TimedOut;
    }

    tokio::select! {
        biased;
        Ok(_) = cancel.wait_for(|settled| *settled) => {
            trace!("abandoning {}:{}", host, port);
            ProbeOutcome::TimedOut
        }
        res = timeout(limit, TcpStream::connect((host, port))) => match res {
            Ok(Ok(conn)) => {
                drop(conn);
                ProbeOutcome::Reachable
            }
            Ok(Err(e)) => classify(&e),
            Err(_) => ProbeOutcome::TimedOut,
        },
    }
}

/// Maps a failed connect onto an outcome by error kind.
pub fn classify(err: &io::Error) -> ProbeOutcome {
    match err.kind() {
        // peer answered with RST
        io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => ProbeOutcome::Refused,
        io::ErrorKind::TimedOut => ProbeOutcome::TimedOut,
        _ => ProbeOutcome::OtherError,
    }
}
