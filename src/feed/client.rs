//! TCP clients feeding parsed lines into the store.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::{FeedConfig, FeedProtocol};
use crate::error::{FuseError, Result};
use crate::store::Store;

use super::parser::Parser;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Read timeout, bounds how long a shutdown request goes unnoticed
const POLL_INTERVAL: Duration = Duration::from_millis(500);
/// APRS-IS drops idle clients
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(600);
const DEFAULT_APRS_LOGIN: &str = "user vfrfuse pass -1 vers vfrfuse 0.4";

/// Exponential reconnect delay
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    initial: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            current: initial,
            initial,
            max,
        }
    }

    /// Delay to wait now; doubles the following one up to the maximum
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(120))
    }
}

/// Handshake line sent right after connecting
pub fn handshake(feed: &FeedConfig) -> Option<String> {
    match feed.protocol {
        FeedProtocol::Aprs => Some(format!(
            "{}\r\n",
            feed.login.as_deref().unwrap_or(DEFAULT_APRS_LOGIN)
        )),
        FeedProtocol::Gps => Some(format!(
            "?WATCH={}\r\n",
            serde_json::json!({ "enable": true, "nmea": true })
        )),
        FeedProtocol::Sbs | FeedProtocol::Sensor => None,
    }
}

pub struct FeedClient {
    feed: FeedConfig,
    parser: Box<dyn Parser>,
    store: Arc<Store>,
    shutdown: Arc<AtomicBool>,
}

impl FeedClient {
    pub fn new(
        feed: FeedConfig,
        parser: Box<dyn Parser>,
        store: Arc<Store>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            feed,
            parser,
            store,
            shutdown,
        }
    }

    pub fn spawn(self) -> Result<thread::JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name(format!("feed-{}", self.feed.name))
            .spawn(move || self.run())?;
        Ok(handle)
    }

    /// Connect, read until failure, back off, repeat until shutdown
    pub fn run(&self) {
        let mut backoff = Backoff::default();
        while !self.stopping() {
            match self.session(&mut backoff) {
                Ok(()) => log::info!("[{}] connection closed", self.feed.name),
                Err(e) => log::warn!("[{}] {}", self.feed.name, e),
            }
            if self.stopping() {
                break;
            }
            let delay = backoff.next_delay();
            log::info!("[{}] reconnecting in {:?}", self.feed.name, delay);
            self.sleep(delay);
        }
        log::debug!("[{}] stopped", self.feed.name);
    }

    fn stopping(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    fn sleep(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.stopping() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(POLL_INTERVAL));
        }
    }

    fn connect(&self) -> Result<TcpStream> {
        let addrs = (self.feed.host.as_str(), self.feed.port).to_socket_addrs()?;
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => FuseError::Io(e),
            None => FuseError::Config(format!(
                "{}:{} did not resolve",
                self.feed.host, self.feed.port
            )),
        })
    }

    fn session(&self, backoff: &mut Backoff) -> Result<()> {
        let mut stream = self.connect()?;
        stream.set_read_timeout(Some(POLL_INTERVAL))?;
        log::info!(
            "[{}] connected to {}:{}",
            self.feed.name,
            self.feed.host,
            self.feed.port
        );
        backoff.reset();

        if let Some(line) = handshake(&self.feed) {
            stream.write_all(line.as_bytes())?;
        }

        let mut writer = stream.try_clone()?;
        let mut reader = BufReader::new(stream);
        let mut line = Vec::new();
        let mut last_keep_alive = Instant::now();

        while !self.stopping() {
            if self.feed.protocol == FeedProtocol::Aprs
                && last_keep_alive.elapsed() >= KEEP_ALIVE_INTERVAL
            {
                writer.write_all(b"# keep-alive\r\n")?;
                last_keep_alive = Instant::now();
            }

            match reader.read_until(b'\n', &mut line) {
                Ok(0) => return Ok(()),
                Ok(_) => {
                    // Undecodable bytes fail parsing like any other bad line
                    self.handle_line(&String::from_utf8_lossy(&line));
                    line.clear();
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    // Partial line stays in the buffer
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Parse one line and offer it to the store. Returns whether it was accepted.
    pub fn handle_line(&self, line: &str) -> bool {
        match self.parser.unpack(line, self.feed.priority) {
            Ok(update) => self.store.update(update.key, update.candidate),
            Err(e) => {
                log::trace!("[{}] skipped line: {}", self.feed.name, e);
                false
            }
        }
    }
}
