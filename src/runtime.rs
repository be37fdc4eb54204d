//! Wires store, feeds and server together and drives the tick loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};

use crate::config::FuseConfig;
use crate::error::Result;
use crate::feed::{FeedClient, create_parser};
use crate::object::{Atmosphere, GpsFix, Payload, Position, RecordKey, Timestamp};
use crate::processor::ObserverContext;
use crate::server::Server;
use crate::store::{Candidate, Store, TickSummary};

/// Emitted groups buffered between the tick and the broadcast thread
const OUTPUT_QUEUE: usize = 1024;

/// Store plus the output side of one tick
pub struct Driver {
    store: Arc<Store>,
    output: Sender<Vec<u8>>,
    /// Geoid separation reported with the fallback fix
    geoid: f64,
}

impl Driver {
    /// Build the store from `config` and seed it with the fallback pressure
    /// and own position
    pub fn new(config: &FuseConfig, output: Sender<Vec<u8>>) -> Self {
        let store = Arc::new(Store::from_config(config));
        store.update(
            RecordKey::ATMOSPHERE,
            Candidate::new(
                Payload::Atmosphere(Atmosphere::new(config.fallback.pressure)),
                0,
                Timestamp::now(),
            ),
        );
        let driver = Self {
            store,
            output,
            geoid: config.fallback.geoid,
        };
        driver.seed_own_fix(config.fallback.position());
        driver
    }

    /// Stand in for a missing receiver so own-ship sentences keep flowing.
    /// Any real fix replaces it, as it carries the lowest priority.
    fn seed_own_fix(&self, position: Position) {
        if self.store.contains(RecordKey::GPS) {
            return;
        }
        log::debug!(
            "own position from fallback at {:.6}, {:.6}",
            position.latitude,
            position.longitude
        );
        self.store.update(
            RecordKey::GPS,
            Candidate::new(
                Payload::GpsFix(GpsFix::fallback(position, self.geoid)),
                0,
                Timestamp::now(),
            ),
        );
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Pull pressure and own position from the store into the observer
    /// context, keeping the previous value of whatever is missing
    pub fn refresh_context(&self) -> ObserverContext {
        let mut ctx = self.store.context();
        if let Some(pressure) = self.store.atmospheric_pressure() {
            ctx.pressure = pressure;
        }
        if let Some(position) = self.store.own_position() {
            ctx.position = position;
        }
        self.store.set_context(ctx);
        ctx
    }

    /// One refresh and tick pass, forwarding output without blocking
    pub fn step(&self) -> TickSummary {
        let ctx = self.refresh_context();
        // A receiver that went silent leaves its last position behind
        self.seed_own_fix(ctx.position);
        let mut dropped = 0usize;
        let summary = self.store.tick(|bytes| match self.output.try_send(bytes.to_vec()) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => dropped += 1,
        });
        if dropped > 0 {
            log::warn!("output queue full, dropped {} groups", dropped);
        }
        log::debug!(
            "tick: {} records, {} rendered, {} degraded, {} evicted, {} failed",
            self.store.len(),
            summary.rendered,
            summary.degraded,
            summary.evicted,
            summary.failed
        );
        summary
    }
}

/// Run the service until `stop` fires or its sender is dropped
pub fn run(config: &FuseConfig, stop: &Receiver<()>) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let (tx, rx) = bounded(OUTPUT_QUEUE);
    let driver = Driver::new(config, tx);

    let mut handles: Vec<JoinHandle<()>> = Vec::new();
    let server = Server::bind(config.general.server_port, config.general.max_clients)?;
    handles.extend(server.spawn(rx, Arc::clone(&shutdown))?);

    for feed in &config.feeds {
        log::info!(
            "feed {} ({:?}) at {}:{}, priority {}",
            feed.name,
            feed.protocol,
            feed.host,
            feed.port,
            feed.priority
        );
        let client = FeedClient::new(
            feed.clone(),
            create_parser(feed.protocol, config),
            Arc::clone(driver.store()),
            Arc::clone(&shutdown),
        );
        handles.push(client.spawn()?);
    }

    let interval = config.general.tick_interval();
    loop {
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                driver.step();
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    log::info!("shutting down");
    shutdown.store(true, Ordering::Relaxed);
    for handle in handles {
        if handle.join().is_err() {
            log::warn!("worker thread panicked");
        }
    }
    Ok(())
}
