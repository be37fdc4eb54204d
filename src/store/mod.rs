//! Concurrent record store.
//!
//! Feed threads call [`Store::update`]; a single driver thread calls
//! [`Store::set_context`] and [`Store::tick`]. Records live in a slot arena
//! behind one mutex, so every update and every tick pass is atomic with
//! respect to the others.

pub mod fusion;
pub mod record;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use chrono::Utc;

use crate::config::{FuseConfig, StoreConfig};
use crate::object::{Atmosphere, Payload, Position, RecordKey, TargetKind};
use crate::processor::{ObserverContext, Processor};

pub use fusion::FusionPolicy;
pub use record::{Candidate, Record};

/// Counters for one tick pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Records whose non-empty buffer was emitted
    pub rendered: usize,
    /// Records removed for staleness
    pub evicted: usize,
    /// Aircraft degraded to transponder fidelity
    pub degraded: usize,
    /// Records whose rendering failed
    pub failed: usize,
}

#[derive(Default)]
struct Arena {
    slots: Vec<Option<Record>>,
    index: HashMap<RecordKey, usize>,
    free: Vec<usize>,
}

impl Arena {
    fn get(&self, key: RecordKey) -> Option<&Record> {
        self.index
            .get(&key)
            .and_then(|&slot| self.slots[slot].as_ref())
    }

    fn get_mut(&mut self, key: RecordKey) -> Option<&mut Record> {
        match self.index.get(&key) {
            Some(&slot) => self.slots[slot].as_mut(),
            None => None,
        }
    }

    fn insert(&mut self, record: Record) {
        let key = record.key;
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(record);
                slot
            }
            None => {
                self.slots.push(Some(record));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, slot);
    }

    fn remove(&mut self, slot: usize) -> Option<Record> {
        let record = self.slots[slot].take()?;
        self.index.remove(&record.key);
        self.free.push(slot);
        Some(record)
    }
}

pub struct Store {
    arena: Mutex<Arena>,
    context: RwLock<ObserverContext>,
    policy: FusionPolicy,
    processor: Processor,
    no_flarm_threshold: u32,
    delete_threshold: u32,
}

impl Store {
    pub fn new(
        thresholds: &StoreConfig,
        policy: FusionPolicy,
        processor: Processor,
        context: ObserverContext,
    ) -> Self {
        Self {
            arena: Mutex::new(Arena::default()),
            context: RwLock::new(context),
            policy,
            processor,
            no_flarm_threshold: thresholds.no_flarm_threshold,
            delete_threshold: thresholds.delete_threshold,
        }
    }

    /// Store wired from a complete configuration, observer at the fallback
    pub fn from_config(config: &FuseConfig) -> Self {
        Self::new(
            &config.store,
            FusionPolicy::from_config(config),
            Processor::new(config.filter.max_distance()),
            ObserverContext::new(config.fallback.position(), config.fallback.pressure),
        )
    }

    fn lock(&self) -> MutexGuard<'_, Arena> {
        self.arena.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offer `candidate` for `key`. Returns whether it was accepted.
    pub fn update(&self, key: RecordKey, candidate: Candidate) -> bool {
        let mut arena = self.lock();
        match arena.get_mut(key) {
            Some(record) => {
                let accepted = self.policy.merge(record, candidate);
                if !accepted {
                    log::trace!("update for {} refused", key);
                }
                accepted
            }
            None => {
                log::debug!("new {:?} record {}", candidate.kind(), key);
                arena.insert(self.policy.create(key, candidate));
                true
            }
        }
    }

    /// Replace the observer snapshot used from the next tick on
    pub fn set_context(&self, ctx: ObserverContext) {
        *self.context.write().unwrap_or_else(PoisonError::into_inner) = ctx;
    }

    pub fn context(&self) -> ObserverContext {
        *self.context.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Age, degrade, evict and render every record once.
    ///
    /// `emit` receives the rendered bytes of each record with output. It
    /// runs under the store lock and must not block.
    pub fn tick<F>(&self, mut emit: F) -> TickSummary
    where
        F: FnMut(&[u8]),
    {
        let ctx = self.context();
        let now = Utc::now();
        let mut summary = TickSummary::default();
        let mut arena = self.lock();

        for slot in 0..arena.slots.len() {
            let Some(record) = arena.slots[slot].as_mut() else {
                continue;
            };

            if record.touched {
                record.touched = false;
            } else if record.is_pinned() {
                record.age = 0;
            } else {
                record.age = record.age.saturating_add(1);
            }

            if record.age == self.no_flarm_threshold && record.degrade() {
                log::debug!("{} degraded to transponder", record.key);
                summary.degraded += 1;
            }

            if record.age >= self.delete_threshold {
                if let Some(removed) = arena.remove(slot) {
                    log::debug!("{} evicted after {} ticks", removed.key, removed.age);
                }
                summary.evicted += 1;
                continue;
            }

            match self
                .processor
                .render(&record.payload, &ctx, now, &mut record.buffer)
            {
                Ok(()) => {
                    if !record.buffer.is_empty() {
                        emit(record.buffer.as_bytes());
                        summary.rendered += 1;
                    }
                }
                Err(e) => {
                    log::warn!("rendering {} failed: {}", record.key, e);
                    record.buffer.clear();
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    pub fn len(&self) -> usize {
        self.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: RecordKey) -> bool {
        self.lock().index.contains_key(&key)
    }

    pub fn age(&self, key: RecordKey) -> Option<u32> {
        self.lock().get(key).map(|record| record.age)
    }

    pub fn target_kind(&self, key: RecordKey) -> Option<TargetKind> {
        self.lock().get(key).and_then(Record::target_kind)
    }

    /// Copy of the payload stored under `key`
    pub fn payload(&self, key: RecordKey) -> Option<Payload> {
        self.lock().get(key).map(|record| record.payload.clone())
    }

    /// Pressure of the atmosphere record, if plausible
    pub fn atmospheric_pressure(&self) -> Option<f64> {
        match self.lock().get(RecordKey::ATMOSPHERE)?.payload {
            Payload::Atmosphere(ref atmosphere)
                if atmosphere.pressure.is_finite()
                    && atmosphere.pressure > Atmosphere::MIN_PRESSURE
                    && atmosphere.pressure < Atmosphere::MAX_PRESSURE =>
            {
                Some(atmosphere.pressure)
            }
            _ => None,
        }
    }

    /// Position of the GPS record
    pub fn own_position(&self) -> Option<Position> {
        match self.lock().get(RecordKey::GPS)?.payload {
            Payload::GpsFix(ref fix) if fix.position.is_valid() => Some(fix.position),
            _ => None,
        }
    }
}
