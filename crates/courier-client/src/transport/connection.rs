//! Stream wrapper hiding the socket family from the framing code.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

use courier_config::ServerEndpoint;
#[cfg(unix)]
use socket2::{Domain, SockAddr, Socket, Type};

use crate::error::TransportError;

pub(super) enum Connection {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Connection {
    pub(super) fn set_read_timeout(&self, budget: Duration) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.set_read_timeout(Some(budget)),
            #[cfg(unix)]
            Self::Unix(stream) => stream.set_read_timeout(Some(budget)),
        }
    }

    pub(super) fn set_write_timeout(&self, budget: Duration) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.set_write_timeout(Some(budget)),
            #[cfg(unix)]
            Self::Unix(stream) => stream.set_write_timeout(Some(budget)),
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Self::Unix(stream) => stream.flush(),
        }
    }
}

pub(super) fn connect(
    endpoint: &ServerEndpoint,
    budget: Duration,
) -> Result<Connection, TransportError> {
    match endpoint {
        ServerEndpoint::Tcp { host, port } => {
            let address = resolve_tcp_address(host, *port).map_err(|source| {
                TransportError::Resolve {
                    endpoint: endpoint.to_string(),
                    source: Arc::new(source),
                }
            })?;
            TcpStream::connect_timeout(&address, budget)
                .map(Connection::Tcp)
                .map_err(|source| TransportError::Connect {
                    endpoint: endpoint.to_string(),
                    source: Arc::new(source),
                })
        }
        ServerEndpoint::Unix { path } => {
            #[cfg(unix)]
            {
                connect_unix(path.as_str(), budget).map_err(|source| TransportError::Connect {
                    endpoint: endpoint.to_string(),
                    source: Arc::new(source),
                })
            }

            #[cfg(not(unix))]
            {
                let _ = (path, budget);
                Err(TransportError::UnsupportedUnixTransport(endpoint.to_string()))
            }
        }
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

#[cfg(unix)]
fn connect_unix(path: &str, budget: Duration) -> io::Result<Connection> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path)?;
    socket.connect_timeout(&address, budget)?;
    let stream: UnixStream = socket.into();
    Ok(Connection::Unix(stream))
}
