//! Broadcast server for rendered sentences.
//!
//! An accept thread admits subscribers (bounded count, one connection per
//! IP address); a broadcast thread forwards every emitted byte group to all
//! of them and drops those whose write fails.

use std::io::{ErrorKind, Write};
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::error::Result;

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Why a connection was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    Full,
    DuplicateAddress,
}

struct Subscriber {
    addr: SocketAddr,
    stream: TcpStream,
}

/// Connected subscribers
#[derive(Default)]
struct Subscribers {
    list: Vec<Subscriber>,
}

impl Subscribers {
    fn check(&self, ip: IpAddr, max_clients: usize) -> std::result::Result<(), Refusal> {
        if self.list.len() >= max_clients {
            Err(Refusal::Full)
        } else if self.list.iter().any(|s| s.addr.ip() == ip) {
            Err(Refusal::DuplicateAddress)
        } else {
            Ok(())
        }
    }

    /// Write `data` to everyone, dropping subscribers that fail
    fn broadcast(&mut self, data: &[u8]) {
        self.list.retain_mut(|sub| match sub.stream.write_all(data) {
            Ok(()) => true,
            Err(e) => {
                log::info!("subscriber {} disconnected: {}", sub.addr, e);
                false
            }
        });
    }
}

pub struct Server {
    listener: TcpListener,
    max_clients: usize,
    subscribers: Arc<Mutex<Subscribers>>,
}

impl Server {
    pub fn bind(port: u16, max_clients: usize) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        listener.set_nonblocking(true)?;
        log::info!("listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            max_clients,
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn client_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .list
            .len()
    }

    /// Start the accept and broadcast threads
    pub fn spawn(
        self,
        output: Receiver<Vec<u8>>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Vec<thread::JoinHandle<()>>> {
        let subscribers = Arc::clone(&self.subscribers);
        let broadcast_shutdown = Arc::clone(&shutdown);
        let broadcaster = thread::Builder::new()
            .name("broadcast".into())
            .spawn(move || broadcast_loop(&subscribers, &output, &broadcast_shutdown))?;

        let acceptor = thread::Builder::new()
            .name("accept".into())
            .spawn(move || self.accept_loop(&shutdown))?;

        Ok(vec![acceptor, broadcaster])
    }

    fn accept_loop(&self, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => self.admit(stream, addr),
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    log::warn!("accept failed: {}", e);
                    thread::sleep(POLL_INTERVAL);
                }
            }
        }
        log::debug!("accept loop stopped");
    }

    fn admit(&self, stream: TcpStream, addr: SocketAddr) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(refusal) = subscribers.check(addr.ip(), self.max_clients) {
            log::warn!("refused connection from {}: {:?}", addr, refusal);
            return;
        }
        let configured = stream
            .set_nonblocking(false)
            .and_then(|()| stream.set_write_timeout(Some(WRITE_TIMEOUT)))
            .and_then(|()| stream.set_nodelay(true));
        if let Err(e) = configured {
            log::warn!("could not set up connection from {}: {}", addr, e);
            return;
        }
        log::info!("new subscriber {}", addr);
        subscribers.list.push(Subscriber { addr, stream });
    }
}

fn broadcast_loop(
    subscribers: &Mutex<Subscribers>,
    output: &Receiver<Vec<u8>>,
    shutdown: &AtomicBool,
) {
    while !shutdown.load(Ordering::Relaxed) {
        match output.recv_timeout(POLL_INTERVAL) {
            Ok(data) => subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .broadcast(&data),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    log::debug!("broadcast loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::io::{BufRead, BufReader};
    use std::time::Instant;

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn test_admission_rules() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let stream = TcpStream::connect(addr).unwrap();

        let mut subs = Subscribers::default();
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        assert_eq!(subs.check(ip, 1), Ok(()));
        subs.list.push(Subscriber { addr, stream });
        assert_eq!(subs.check(ip, 2), Err(Refusal::DuplicateAddress));
        assert_eq!(subs.check("10.0.0.1".parse().unwrap(), 1), Err(Refusal::Full));
        assert_eq!(subs.check("10.0.0.1".parse().unwrap(), 2), Ok(()));
    }

    #[test]
    fn test_broadcast_reaches_subscriber() {
        let server = Server::bind(0, 2).unwrap();
        let port = server.local_addr().unwrap().port();
        let counter = Arc::clone(&server.subscribers);
        let (tx, rx) = unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let handles = server.spawn(rx, Arc::clone(&shutdown)).unwrap();

        let client = TcpStream::connect(("127.0.0.1", port)).unwrap();
        assert!(wait_for(|| counter.lock().unwrap().list.len() == 1));

        // Same address again is refused
        let _second = TcpStream::connect(("127.0.0.1", port)).unwrap();
        thread::sleep(Duration::from_millis(500));
        assert_eq!(counter.lock().unwrap().list.len(), 1);

        tx.send(b"$PFLAU,,,,1,0,90,0,0,720,DD1234*5A\r\n".to_vec()).unwrap();
        let mut line = String::new();
        BufReader::new(client).read_line(&mut line).unwrap();
        assert!(line.starts_with("$PFLAU,"));

        shutdown.store(true, Ordering::Relaxed);
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
