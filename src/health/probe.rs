//! TCP reachability probe.

use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time;
use url::Url;

use crate::load_balancer::forward::authority_of;

/// Why a backend was judged unreachable.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("backend address has no host/port")]
    InvalidAddress,

    #[error("connect failed: {0}")]
    Unreachable(#[from] io::Error),

    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
}

/// Open (and immediately drop) a TCP connection to the backend.
pub async fn probe(address: &Url, timeout: Duration) -> Result<(), ProbeError> {
    if address.host_str().is_none() || address.port_or_known_default().is_none() {
        return Err(ProbeError::InvalidAddress);
    }
    let target = authority_of(address);

    match time::timeout(timeout, TcpStream::connect(target.as_str())).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(e)) => Err(ProbeError::Unreachable(e)),
        Err(_) => Err(ProbeError::Timeout(timeout)),
    }
}
