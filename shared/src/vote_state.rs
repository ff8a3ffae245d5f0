//! Local vote state of the active voter and its reconciliation with the
//! remote vote table.
//!
//! [`VoteStateStore`] owns the category -> nominee mapping and a sync flag and
//! writes both to a durable [`StateSlot`] after every mutation. Remote calls go
//! through [`VoteService`]; [`SharedVoteStore`] is the handle UI code clones
//! around and the place where the async reconciliation operations live.
//!
//! Only one load is tracked at a time. Starting a new load or clearing the
//! store makes any older in-flight load stale, and its result is dropped when
//! it eventually arrives. Votes confirmed by the remote while a load for the
//! same voter is in flight are replayed on top of that load's result. A vote
//! confirmed after a clear, or while another voter's load is in flight, is
//! not applied locally.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{CategoryId, NomineeId, UserId, VoteMap};

/// Storage key used by the browser client.
pub const STORAGE_KEY: &str = "agw-votes";
pub const SCHEMA_VERSION: u32 = 1;

/// Remote vote persistence, as consumed by the store.
#[async_trait(?Send)]
pub trait VoteService {
    /// Complete vote set of `user_id`. `Ok` with an empty map means the user
    /// has not voted yet; failures must be reported as `Err`.
    async fn fetch_user_votes(&self, user_id: &str) -> Result<VoteMap>;

    /// Upserts the vote of `user_id` in `category_id`.
    async fn submit_vote(&self, user_id: &str, category_id: &str, nominee_id: &str) -> Result<()>;
}

/// Durable key-value slot holding the serialized store.
pub trait StateSlot {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, data: &str) -> std::result::Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to encode vote state: {0}")]
    Encode(serde_json::Error),
    #[error("Failed to decode vote state: {0}")]
    Decode(serde_json::Error),
    #[error("Unsupported vote state version {0}")]
    UnsupportedVersion(u32),
    #[error("Storage unavailable: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteState {
    pub votes: VoteMap,
    pub sync_with_db: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedVotes {
    version: u32,
    votes: Vec<(CategoryId, NomineeId)>,
    sync_with_db: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyState {
    #[serde(default)]
    votes: BTreeMap<CategoryId, NomineeId>,
    #[serde(default)]
    sync_with_db: bool,
}

// Unversioned layout written by earlier releases of the web client.
#[derive(Deserialize)]
struct LegacyBlob {
    state: LegacyState,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredBlob {
    Current(PersistedVotes),
    Legacy(LegacyBlob),
}

impl VoteState {
    pub fn to_blob(&self) -> std::result::Result<String, StoreError> {
        let persisted = PersistedVotes {
            version: SCHEMA_VERSION,
            votes: self.votes.iter().map(|(c, n)| (c.clone(), n.clone())).collect(),
            sync_with_db: self.sync_with_db,
        };
        serde_json::to_string(&persisted).map_err(StoreError::Encode)
    }

    pub fn from_blob(blob: &str) -> std::result::Result<Self, StoreError> {
        match serde_json::from_str::<StoredBlob>(blob).map_err(StoreError::Decode)? {
            StoredBlob::Current(p) if p.version > SCHEMA_VERSION => {
                Err(StoreError::UnsupportedVersion(p.version))
            }
            StoredBlob::Current(p) => Ok(Self {
                // later pairs win, so a hand-edited blob cannot break uniqueness
                votes: p.votes.into_iter().collect(),
                sync_with_db: p.sync_with_db,
            }),
            StoredBlob::Legacy(legacy) => {
                debug!("Migrating legacy vote state blob");
                Ok(Self {
                    votes: legacy.state.votes,
                    sync_with_db: legacy.state.sync_with_db,
                })
            }
        }
    }
}

/// Identifies one `load_votes_from_db` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    user_id: UserId,
}

impl LoadTicket {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched mapping replaced the local one.
    Applied { votes: usize },
    /// A newer load or a clear happened while this one was in flight.
    Stale,
    /// The fetch failed; local state is unchanged.
    Failed,
}

/// Identifies one `submit_vote_to_db` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    clears: u64,
    user_id: UserId,
}

#[derive(Debug)]
struct PendingLoad {
    generation: u64,
    user_id: UserId,
    confirmed: VoteMap,
}

pub struct VoteStateStore<S: StateSlot> {
    state: VoteState,
    slot: S,
    key: String,
    generation: u64,
    clears: u64,
    pending: Option<PendingLoad>,
}

impl<S: StateSlot> VoteStateStore<S> {
    pub fn open(slot: S) -> Self {
        Self::open_with_key(slot, STORAGE_KEY)
    }

    /// Restores the state persisted under `key`, starting empty if there is
    /// none or it cannot be read.
    pub fn open_with_key(slot: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = match slot.load(&key) {
            Some(blob) => VoteState::from_blob(&blob).unwrap_or_else(|e| {
                warn!("Discarding persisted vote state under {}: {}", key, e);
                VoteState::default()
            }),
            None => VoteState::default(),
        };

        Self {
            state,
            slot,
            key,
            generation: 0,
            clears: 0,
            pending: None,
        }
    }

    pub fn set_vote(&mut self, category_id: impl Into<CategoryId>, nominee_id: impl Into<NomineeId>) {
        self.state.votes.insert(category_id.into(), nominee_id.into());
        self.persist();
    }

    pub fn get_vote(&self, category_id: &str) -> Option<&str> {
        self.state.votes.get(category_id).map(String::as_str)
    }

    /// Categories with a recorded vote. The order carries no meaning.
    pub fn voted_categories(&self) -> Vec<CategoryId> {
        self.state.votes.keys().cloned().collect()
    }

    pub fn votes(&self) -> &VoteMap {
        &self.state.votes
    }

    /// Empties the mapping. The sync flag is left as is; in-flight loads and
    /// submits become stale.
    pub fn clear_votes(&mut self) {
        self.state.votes.clear();
        self.generation += 1;
        self.clears += 1;
        self.pending = None;
        self.persist();
    }

    pub fn is_synced(&self) -> bool {
        self.state.sync_with_db
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn state(&self) -> &VoteState {
        &self.state
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn begin_load(&mut self, user_id: impl Into<UserId>) -> LoadTicket {
        let user_id = user_id.into();
        self.generation += 1;
        if self.pending.is_some() {
            debug!("Superseding in-flight vote load");
        }
        self.pending = Some(PendingLoad {
            generation: self.generation,
            user_id: user_id.clone(),
            confirmed: VoteMap::new(),
        });

        LoadTicket {
            generation: self.generation,
            user_id,
        }
    }

    pub fn finish_load(&mut self, ticket: LoadTicket, fetched: Result<VoteMap>) -> LoadOutcome {
        let current = matches!(&self.pending, Some(p) if p.generation == ticket.generation);
        if !current {
            debug!("Dropping stale vote load for {}", ticket.user_id);
            return LoadOutcome::Stale;
        }

        let confirmed = self.pending.take().map(|p| p.confirmed).unwrap_or_default();
        match fetched {
            Ok(mut votes) => {
                votes.extend(confirmed);
                let count = votes.len();
                self.state.votes = votes;
                self.state.sync_with_db = true;
                self.persist();
                info!("Loaded {} votes for {}", count, ticket.user_id);
                LoadOutcome::Applied { votes: count }
            }
            Err(e) => {
                warn!("Failed to load votes for {}: {}", ticket.user_id, e);
                LoadOutcome::Failed
            }
        }
    }

    pub fn begin_submit(&self, user_id: impl Into<UserId>) -> SubmitTicket {
        SubmitTicket {
            clears: self.clears,
            user_id: user_id.into(),
        }
    }

    /// Applies a vote the remote has acknowledged. Returns `false` when the
    /// vote no longer belongs to the local mapping: the store was cleared
    /// since `ticket` was issued, or a load for another voter is in flight.
    pub fn record_confirmed_vote(&mut self, ticket: &SubmitTicket, category_id: &str, nominee_id: &str) -> bool {
        if ticket.clears != self.clears {
            debug!("Dropping vote of {} confirmed after a clear", ticket.user_id);
            return false;
        }
        if let Some(pending) = self.pending.as_mut() {
            if pending.user_id != ticket.user_id {
                debug!("Dropping vote of {} confirmed during a load for {}", ticket.user_id, pending.user_id);
                return false;
            }
            pending.confirmed.insert(category_id.to_string(), nominee_id.to_string());
        }
        self.set_vote(category_id, nominee_id);
        true
    }

    fn persist(&self) {
        let result = self.state.to_blob().and_then(|blob| self.slot.save(&self.key, &blob));
        if let Err(e) = result {
            warn!("Failed to persist vote state: {}", e);
        }
    }
}

/// Cloneable handle to one [`VoteStateStore`], shared by every component of
/// the client. No borrow is held across an await point.
pub struct SharedVoteStore<S: StateSlot> {
    inner: Rc<RefCell<VoteStateStore<S>>>,
}

impl<S: StateSlot> Clone for SharedVoteStore<S> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<S: StateSlot> SharedVoteStore<S> {
    pub fn new(store: VoteStateStore<S>) -> Self {
        Self { inner: Rc::new(RefCell::new(store)) }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn read<R>(&self, f: impl FnOnce(&VoteStateStore<S>) -> R) -> R {
        f(&self.inner.borrow())
    }

    pub fn set_vote(&self, category_id: &str, nominee_id: &str) {
        self.inner.borrow_mut().set_vote(category_id, nominee_id);
    }

    pub fn get_vote(&self, category_id: &str) -> Option<NomineeId> {
        self.inner.borrow().get_vote(category_id).map(str::to_string)
    }

    pub fn voted_categories(&self) -> Vec<CategoryId> {
        self.inner.borrow().voted_categories()
    }

    pub fn clear_votes(&self) {
        self.inner.borrow_mut().clear_votes();
    }

    pub fn is_synced(&self) -> bool {
        self.inner.borrow().is_synced()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.borrow().is_loading()
    }

    /// Replaces the local mapping with the remote vote set of `user_id`.
    ///
    /// Failures are logged and leave local state untouched; the outcome is
    /// informational only.
    pub async fn load_votes_from_db<V>(&self, service: &V, user_id: &str) -> LoadOutcome
    where
        V: VoteService + ?Sized,
    {
        let ticket = self.inner.borrow_mut().begin_load(user_id);
        let fetched = service.fetch_user_votes(ticket.user_id()).await;
        self.inner.borrow_mut().finish_load(ticket, fetched)
    }

    /// Writes one vote through to the remote; local state only follows a
    /// confirmed write that still belongs to the active voter. The result
    /// reports whether the remote accepted the vote.
    pub async fn submit_vote_to_db<V>(
        &self,
        service: &V,
        user_id: &str,
        category_id: &str,
        nominee_id: &str,
    ) -> bool
    where
        V: VoteService + ?Sized,
    {
        let ticket = self.inner.borrow().begin_submit(user_id);
        match service.submit_vote(user_id, category_id, nominee_id).await {
            Ok(()) => {
                self.inner.borrow_mut().record_confirmed_vote(&ticket, category_id, nominee_id);
                true
            }
            Err(e) => {
                warn!("Vote submission for {} in {} failed: {}", user_id, category_id, e);
                false
            }
        }
    }
}

/// In-memory slot, for environments without durable storage.
#[derive(Debug, Default)]
pub struct MemorySlot {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, data: &str) -> Self {
        let slot = Self::default();
        slot.entries.borrow_mut().insert(key.to_string(), data.to_string());
        slot
    }
}

impl StateSlot for MemorySlot {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, data: &str) -> std::result::Result<(), StoreError> {
        self.entries.borrow_mut().insert(key.to_string(), data.to_string());
        Ok(())
    }
}
