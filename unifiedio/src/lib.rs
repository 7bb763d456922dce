use std::{net::SocketAddr, time::Duration};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub mod errors;
pub mod tcp;

use errors::{UnifiedIOError, UnifiedIOResult};

pub enum UnderlyingIO {
    TCP {
        local_addr: Option<SocketAddr>,
        peer_addr: Option<SocketAddr>,
    },
}

pub trait UnifiedIO: AsyncRead + AsyncWrite + Unpin + Send {
    fn get_underlying_io(&self) -> UnderlyingIO;
}

/// Transport-agnostic byte I/O with independent per-side timeouts and byte
/// counters, wrapping any concrete [`UnifiedIO`].
pub struct TimedIO<T: UnifiedIO> {
    inner: T,
    recv_timeout: Duration,
    send_timeout: Duration,
    bytes_received: u64,
    bytes_sent: u64,
}

impl<T: UnifiedIO> TimedIO<T> {
    pub fn new(inner: T, recv_timeout: Duration, send_timeout: Duration) -> Self {
        Self {
            inner,
            recv_timeout,
            send_timeout,
            bytes_received: 0,
            bytes_sent: 0,
        }
    }

    pub fn set_recv_timeout(&mut self, timeout: Duration) {
        self.recv_timeout = timeout;
    }

    pub fn set_send_timeout(&mut self, timeout: Duration) {
        self.send_timeout = timeout;
    }

    pub fn recv_bytes(&self) -> u64 {
        self.bytes_received
    }

    pub fn send_bytes(&self) -> u64 {
        self.bytes_sent
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Reads up to `buf.len()` bytes. A timeout is recoverable: it does not
    /// close the underlying transport, callers may retry.
    pub async fn read(&mut self, buf: &mut [u8]) -> UnifiedIOResult<usize> {
        match tokio::time::timeout(self.recv_timeout, self.inner.read(buf)).await {
            Ok(Ok(0)) => Err(UnifiedIOError::Closed),
            Ok(Ok(n)) => {
                self.bytes_received += n as u64;
                Ok(n)
            }
            Ok(Err(err)) => Err(UnifiedIOError::Io(err)),
            Err(_) => Err(UnifiedIOError::Timeout),
        }
    }

    pub async fn write_all(&mut self, buf: &[u8]) -> UnifiedIOResult<usize> {
        match tokio::time::timeout(self.send_timeout, self.inner.write_all(buf)).await {
            Ok(Ok(())) => {
                self.bytes_sent += buf.len() as u64;
                Ok(buf.len())
            }
            Ok(Err(err)) => Err(UnifiedIOError::Io(err)),
            Err(_) => Err(UnifiedIOError::Timeout),
        }
    }

    pub async fn flush(&mut self) -> UnifiedIOResult<()> {
        match tokio::time::timeout(self.send_timeout, self.inner.flush()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(UnifiedIOError::Io(err)),
            Err(_) => Err(UnifiedIOError::Timeout),
        }
    }
}
