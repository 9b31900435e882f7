//! Persistence gateway
//!
//! Mirrors the whitelisted slices (`auth`, `expenses`, `users`) to a
//! [`SliceStorage`] and restores them at startup.
//!
//! # Write path
//!
//! Mutations hand a serialized snapshot to [`PersistenceGateway::write`],
//! which stamps it with a sequence number and returns immediately. A
//! dedicated writer thread drains the queue in order, coalescing pending
//! snapshots of the same slice down to the newest one. A snapshot whose
//! sequence is not newer than the last one written for its slice is
//! dropped, so an older write never lands after a newer one.
//!
//! # Blob layout
//!
//! ```json
//! { "expenses": [ ... ], "_persist": { "version": 1 } }
//! ```

use crate::auth::PersistedAuth;
use budget_core::error::{BudgetError, Result};
use budget_core::traits::SliceStorage;
use budget_core::types::{Expense, User};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Current blob format version
pub const PERSIST_VERSION: u32 = 1;

/// A persisted partition of application state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slice {
    Auth,
    Expenses,
    Users,
}

impl Slice {
    pub const ALL: [Slice; 3] = [Slice::Auth, Slice::Expenses, Slice::Users];

    /// Storage key
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Expenses => "expenses",
            Self::Users => "users",
        }
    }
}

impl std::fmt::Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ============================================================================
// Blob encoding
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PersistMeta {
    version: u32,
}

#[derive(Serialize)]
struct BlobOut<'a, T: Serialize> {
    #[serde(flatten)]
    body: &'a T,
    #[serde(rename = "_persist")]
    meta: PersistMeta,
}

#[derive(Deserialize)]
struct BlobIn<T> {
    #[serde(flatten)]
    body: T,
    #[serde(rename = "_persist")]
    meta: PersistMeta,
}

#[derive(Serialize)]
struct ExpensesOut<'a> {
    expenses: &'a [Expense],
}

#[derive(Deserialize)]
struct ExpensesIn {
    expenses: Vec<Expense>,
}

#[derive(Serialize)]
struct UsersOut<'a> {
    users: &'a [User],
}

#[derive(Deserialize)]
struct UsersIn {
    users: Vec<User>,
}

fn encode<T: Serialize>(body: &T) -> Result<String> {
    let blob = BlobOut {
        body,
        meta: PersistMeta {
            version: PERSIST_VERSION,
        },
    };
    Ok(serde_json::to_string(&blob)?)
}

fn decode<T: DeserializeOwned>(slice: Slice, raw: &str) -> Result<T> {
    let blob: BlobIn<T> =
        serde_json::from_str(raw).map_err(|e| BudgetError::malformed(slice.key(), e.to_string()))?;
    if blob.meta.version != PERSIST_VERSION {
        return Err(BudgetError::malformed(
            slice.key(),
            format!(
                "unsupported version {} (expected {})",
                blob.meta.version, PERSIST_VERSION
            ),
        ));
    }
    Ok(blob.body)
}

pub fn encode_auth(auth: &PersistedAuth) -> Result<String> {
    encode(auth)
}

pub fn encode_expenses(expenses: &[Expense]) -> Result<String> {
    encode(&ExpensesOut { expenses })
}

pub fn encode_users(users: &[User]) -> Result<String> {
    encode(&UsersOut { users })
}

pub fn decode_auth(raw: &str) -> Result<PersistedAuth> {
    decode(Slice::Auth, raw)
}

pub fn decode_expenses(raw: &str) -> Result<Vec<Expense>> {
    decode::<ExpensesIn>(Slice::Expenses, raw).map(|body| body.expenses)
}

pub fn decode_users(raw: &str) -> Result<Vec<User>> {
    decode::<UsersIn>(Slice::Users, raw).map(|body| body.users)
}

// ============================================================================
// Restore
// ============================================================================

/// Outcome of reading one slice at startup
#[derive(Debug, Clone, PartialEq)]
pub enum SliceLoad<T> {
    /// Decoded successfully
    Loaded(T),
    /// Nothing stored under the key
    Missing,
    /// Present but unreadable; the caller falls back to defaults
    Discarded,
}

impl<T> SliceLoad<T> {
    pub fn loaded(self) -> Option<T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Missing | Self::Discarded => None,
        }
    }
}

/// Everything read back at startup
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredState {
    pub auth: SliceLoad<PersistedAuth>,
    pub expenses: SliceLoad<Vec<Expense>>,
    pub users: SliceLoad<Vec<User>>,
}

/// Read every slice; never fails
///
/// Storage errors and malformed blobs are logged and reported as
/// `Discarded`.
pub fn restore(storage: &dyn SliceStorage) -> RestoredState {
    RestoredState {
        auth: restore_slice(storage, Slice::Auth, decode_auth),
        expenses: restore_slice(storage, Slice::Expenses, decode_expenses),
        users: restore_slice(storage, Slice::Users, decode_users),
    }
}

fn restore_slice<T>(
    storage: &dyn SliceStorage,
    slice: Slice,
    decode: fn(&str) -> Result<T>,
) -> SliceLoad<T> {
    match storage.read(slice.key()) {
        Ok(None) => {
            debug!(slice = %slice, "no persisted state");
            SliceLoad::Missing
        }
        Ok(Some(raw)) => match decode(&raw) {
            Ok(value) => {
                debug!(slice = %slice, "slice restored");
                SliceLoad::Loaded(value)
            }
            Err(e) => {
                warn!(slice = %slice, error = %e, "discarding persisted slice");
                SliceLoad::Discarded
            }
        },
        Err(e) => {
            warn!(slice = %slice, error = %e, "failed to read persisted slice");
            SliceLoad::Discarded
        }
    }
}

// ============================================================================
// Writer
// ============================================================================

#[derive(Debug)]
struct SliceWrite {
    slice: Slice,
    seq: u64,
    /// `None` removes the key
    body: Option<String>,
}

#[derive(Debug)]
enum WriterCommand {
    Write(SliceWrite),
    Flush(Sender<()>),
    Shutdown,
}

/// Counters kept by the writer thread
#[derive(Debug, Default)]
pub struct WriterStats {
    written: AtomicU64,
    coalesced: AtomicU64,
    failed: AtomicU64,
}

impl WriterStats {
    /// Writes (and removals) that reached storage
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Snapshots superseded before they were written
    pub fn coalesced(&self) -> u64 {
        self.coalesced.load(Ordering::Relaxed)
    }

    /// Writes the storage backend rejected
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Fire-and-forget, per-slice ordered writer
pub struct PersistenceGateway {
    command_tx: Sender<WriterCommand>,
    next_seq: AtomicU64,
    stats: Arc<WriterStats>,
    writer_thread: Option<JoinHandle<()>>,
}

impl PersistenceGateway {
    /// Spawn the writer thread over `storage`
    ///
    /// # Errors
    /// Returns an error if the thread cannot be spawned
    pub fn start(storage: Arc<dyn SliceStorage>) -> Result<Self> {
        let (command_tx, command_rx) = unbounded::<WriterCommand>();
        let stats = Arc::new(WriterStats::default());

        let thread_stats = Arc::clone(&stats);
        let writer_thread = thread::Builder::new()
            .name("budget-persist".to_string())
            .spawn(move || Self::writer_run(storage, command_rx, thread_stats))?;

        Ok(Self {
            command_tx,
            next_seq: AtomicU64::new(1),
            stats,
            writer_thread: Some(writer_thread),
        })
    }

    /// Queue a snapshot of `slice`; returns its sequence number
    pub fn write(&self, slice: Slice, body: String) -> u64 {
        self.enqueue(slice, Some(body))
    }

    /// Queue removal of `slice`
    pub fn remove(&self, slice: Slice) -> u64 {
        self.enqueue(slice, None)
    }

    /// Queue removal of every slice
    pub fn purge(&self) {
        for slice in Slice::ALL {
            self.remove(slice);
        }
    }

    /// Block until everything queued so far has been handed to storage
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if self.command_tx.send(WriterCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    fn enqueue(&self, slice: Slice, body: Option<String>) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let command = WriterCommand::Write(SliceWrite { slice, seq, body });
        if self.command_tx.send(command).is_err() {
            error!(slice = %slice, seq, "persistence writer is gone; dropping write");
        }
        seq
    }

    /// Writer thread main loop
    fn writer_run(
        storage: Arc<dyn SliceStorage>,
        command_rx: Receiver<WriterCommand>,
        stats: Arc<WriterStats>,
    ) {
        let mut last_written: HashMap<Slice, u64> = HashMap::new();
        let mut pending: BTreeMap<Slice, SliceWrite> = BTreeMap::new();

        while let Ok(first) = command_rx.recv() {
            let mut shutdown = false;

            for command in std::iter::once(first).chain(command_rx.try_iter()) {
                match command {
                    WriterCommand::Write(write) => {
                        Self::coalesce(&mut pending, write, &stats);
                    }
                    WriterCommand::Flush(ack) => {
                        Self::apply_pending(&*storage, &mut pending, &mut last_written, &stats);
                        let _ = ack.send(());
                    }
                    WriterCommand::Shutdown => {
                        shutdown = true;
                        break;
                    }
                }
            }

            Self::apply_pending(&*storage, &mut pending, &mut last_written, &stats);
            if shutdown {
                break;
            }
        }

        info!(
            written = stats.written(),
            coalesced = stats.coalesced(),
            failed = stats.failed(),
            "persistence writer stopped"
        );
    }

    fn coalesce(pending: &mut BTreeMap<Slice, SliceWrite>, write: SliceWrite, stats: &WriterStats) {
        match pending.get(&write.slice) {
            Some(existing) if existing.seq > write.seq => {
                stats.coalesced.fetch_add(1, Ordering::Relaxed);
            }
            Some(_) => {
                stats.coalesced.fetch_add(1, Ordering::Relaxed);
                pending.insert(write.slice, write);
            }
            None => {
                pending.insert(write.slice, write);
            }
        }
    }

    fn apply_pending(
        storage: &dyn SliceStorage,
        pending: &mut BTreeMap<Slice, SliceWrite>,
        last_written: &mut HashMap<Slice, u64>,
        stats: &WriterStats,
    ) {
        for (slice, write) in std::mem::take(pending) {
            if last_written
                .get(&slice)
                .is_some_and(|&last| last >= write.seq)
            {
                debug!(slice = %slice, seq = write.seq, "skipping stale write");
                stats.coalesced.fetch_add(1, Ordering::Relaxed);
                continue;
            }
            last_written.insert(slice, write.seq);

            let result = match &write.body {
                Some(body) => storage.write(slice.key(), body),
                None => storage.remove(slice.key()),
            };
            match result {
                Ok(()) => {
                    stats.written.fetch_add(1, Ordering::Relaxed);
                    debug!(slice = %slice, seq = write.seq, "slice persisted");
                }
                Err(e) => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                    error!(slice = %slice, seq = write.seq, error = %e, "failed to persist slice");
                }
            }
        }
    }
}

impl Drop for PersistenceGateway {
    fn drop(&mut self) {
        let _ = self.command_tx.send(WriterCommand::Shutdown);
        if let Some(handle) = self.writer_thread.take() {
            if handle.join().is_err() {
                error!("persistence writer panicked");
            }
        }
    }
}
