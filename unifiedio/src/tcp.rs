use std::task::Poll;

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
};

use crate::UnifiedIO;

pub struct TcpIO {
    inner: TcpStream,
}

impl TcpIO {
    pub fn new(inner: TcpStream) -> Self {
        inner.set_nodelay(true).ok();
        Self { inner }
    }

    pub fn peer_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.inner.peer_addr()
    }
}

impl UnifiedIO for TcpIO {
    fn get_underlying_io(&self) -> crate::UnderlyingIO {
        crate::UnderlyingIO::TCP {
            local_addr: self.inner.local_addr().ok(),
            peer_addr: self.inner.peer_addr().ok(),
        }
    }
}

impl AsyncRead for TcpIO {
    fn poll_read(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        AsyncRead::poll_read(std::pin::Pin::new(&mut self.get_mut().inner), cx, buf)
    }
}

impl AsyncWrite for TcpIO {
    fn poll_write(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        AsyncWrite::poll_write(std::pin::Pin::new(&mut self.get_mut().inner), cx, buf)
    }

    fn poll_flush(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        AsyncWrite::poll_flush(std::pin::Pin::new(&mut self.get_mut().inner), cx)
    }

    fn poll_shutdown(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        AsyncWrite::poll_shutdown(std::pin::Pin::new(&mut self.get_mut().inner), cx)
    }
}
