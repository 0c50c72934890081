//! Fake courier server for transport tests.
//!
//! Accepts one connection on an ephemeral TCP port, records the request line,
//! and answers with canned lines (or with silence, to exercise timeouts).

use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};

/// How the server answers the single connection it accepts.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Write these lines, then close.
    Lines(Vec<String>),
    /// Hold the connection open without answering, then close.
    Silence(Duration),
    /// Write one line a byte at a time, pausing between bytes.
    Trickle {
        /// Line to send, without its terminator.
        line: String,
        /// Pause before each byte.
        pause: Duration,
    },
}

pub(crate) struct FakeServer {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
    result: Arc<Mutex<Option<Result<()>>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeServer {
    pub(crate) fn spawn(reply: Reply) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake server")?;
        listener
            .set_nonblocking(true)
            .context("fake server nonblocking")?;
        let port = listener.local_addr().context("local addr")?.port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let result = Arc::new(Mutex::new(None));
        let requests_clone = Arc::clone(&requests);
        let result_clone = Arc::clone(&result);
        let handle = thread::spawn(move || {
            let outcome = Self::serve_client(&listener, &reply, &requests_clone);
            if let Ok(mut guard) = result_clone.lock() {
                *guard = Some(outcome);
            }
        });
        Ok(Self {
            port,
            requests,
            result,
            handle: Some(handle),
        })
    }

    /// Replies with one envelope line built from `json`.
    pub(crate) fn replying(json: &str) -> Result<Self> {
        Self::spawn(Reply::Lines(vec![json.to_owned()]))
    }

    pub(crate) const fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the server thread and returns the recorded request lines.
    pub(crate) fn take_requests(&mut self) -> Result<Vec<String>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake server thread panicked"))?;
        }
        if let Some(outcome) = self
            .result
            .lock()
            .map_err(|error| anyhow!("lock fake server result: {error}"))?
            .take()
        {
            outcome.context("fake server failed")?;
        }
        let requests = self
            .requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        Ok(requests.clone())
    }

    fn serve_client(
        listener: &TcpListener,
        reply: &Reply,
        requests: &Arc<Mutex<Vec<String>>>,
    ) -> Result<()> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match listener.accept() {
                Ok((stream, _)) => {
                    stream
                        .set_nonblocking(false)
                        .context("fake server blocking stream")?;
                    Self::record_request(&stream, requests)?;
                    return Self::answer(stream, reply);
                }
                Err(ref error)
                    if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < deadline =>
                {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(error) => return Err(error).context("accept connection"),
            }
        }
    }

    fn record_request(stream: &TcpStream, requests: &Arc<Mutex<Vec<String>>>) -> Result<()> {
        let mut line = String::new();
        let mut reader = BufReader::new(stream.try_clone().context("clone stream")?);
        if reader.read_line(&mut line).context("read request")? == 0 {
            return Ok(());
        }
        requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?
            .push(line);
        Ok(())
    }

    fn answer(mut stream: TcpStream, reply: &Reply) -> Result<()> {
        match reply {
            Reply::Lines(lines) => {
                for line in lines {
                    stream.write_all(line.as_bytes())?;
                    stream.write_all(b"\n")?;
                }
                stream.flush().context("flush reply")
            }
            Reply::Silence(hold) => {
                thread::sleep(*hold);
                Ok(())
            }
            Reply::Trickle { line, pause } => {
                for byte in line.bytes().chain(std::iter::once(b'\n')) {
                    thread::sleep(*pause);
                    if stream.write_all(&[byte]).is_err() {
                        // The client gave up; that is the outcome under test.
                        return Ok(());
                    }
                }
                Ok(())
            }
        }
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Returns a port on which nothing is listening.
pub(crate) fn closed_port() -> Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind probe")?;
    let port = listener.local_addr().context("probe addr")?.port();
    drop(listener);
    Ok(port)
}
