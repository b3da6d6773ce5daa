use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// A connected reader stream — implements `Read + Write`.
///
/// Wraps a `TcpStream` with the timeout discipline the transaction layer
/// relies on: the timeout given at connect time bounds every subsequent
/// read and write until changed.
pub struct LanStream {
    inner: TcpStream,
}

impl Read for LanStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for LanStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl LanStream {
    fn from_tcp(stream: TcpStream) -> Self {
        Self { inner: stream }
    }

    /// Set read timeout on the underlying stream. `None` blocks forever.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream. `None` blocks forever.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self::from_tcp(cloned))
    }

    /// Shut down both halves of the connection.
    ///
    /// Unblocks any thread currently waiting in a bounded read on a clone
    /// of this stream.
    pub fn shutdown(&self) -> Result<()> {
        self.inner.shutdown(Shutdown::Both).map_err(Into::into)
    }

    /// Address of the connected peer.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.inner.peer_addr().map_err(Into::into)
    }
}

impl std::fmt::Debug for LanStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanStream")
            .field("peer", &self.inner.peer_addr().ok())
            .finish()
    }
}

/// Connect to a reader at `host:port` (blocking).
///
/// `timeout` bounds the connect attempt and is then installed as the read
/// and write timeout of the returned stream. The first resolved address is
/// used.
pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<LanStream> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            host: host.to_string(),
            port,
            source,
        })?;
    let addr = addrs.next().ok_or_else(|| TransportError::Resolve {
        host: host.to_string(),
        port,
        source: std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "host resolved to no addresses",
        ),
    })?;

    let stream = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|source| TransportError::Connect { addr, source })?;
    stream
        .set_nodelay(true)
        .map_err(|source| TransportError::Connect { addr, source })?;

    let stream = LanStream::from_tcp(stream);
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    debug!(%addr, ?timeout, "connected to reader");
    Ok(stream)
}

/// Listens for reader-side connections. Used by the device emulator.
pub struct LanListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl LanListener {
    /// Bind and listen on `addr`. Port 0 picks an ephemeral port.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let listener =
            TcpListener::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| TransportError::Bind { addr, source })?;
        info!(%local_addr, "listening for reader connections");
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    ///
    /// A blocked accept is released by any connection attempt, including a
    /// throwaway wake-up connection from the owner.
    pub fn accept(&self) -> Result<LanStream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted connection");
        Ok(LanStream::from_tcp(stream))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
