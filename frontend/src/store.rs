use std::rc::Rc;
use yew::prelude::*;
use shared::{SharedVoteStore, VoteStateStore};
use crate::{config::CONFIG, storage::LocalStorageSlot};

pub type VoteStore = SharedVoteStore<LocalStorageSlot>;

pub fn open_vote_store() -> VoteStore {
    SharedVoteStore::new(VoteStateStore::open_with_key(LocalStorageSlot, CONFIG.votes_storage_key))
}

/// Bumped after every store mutation so subscribed components re-render.
#[derive(Default, PartialEq)]
pub struct Revision(pub u64);

impl Reducible for Revision {
    type Action = ();

    fn reduce(self: Rc<Self>, _: ()) -> Rc<Self> {
        Rc::new(Revision(self.0.wrapping_add(1)))
    }
}

#[derive(Clone)]
pub struct VoteStoreContext {
    pub store: VoteStore,
    pub revision: u64,
    notify: Callback<()>,
}

impl PartialEq for VoteStoreContext {
    fn eq(&self, other: &Self) -> bool {
        self.store.ptr_eq(&other.store) && self.revision == other.revision
    }
}

impl VoteStoreContext {
    pub fn new(store: VoteStore, revision: u64, notify: Callback<()>) -> Self {
        Self { store, revision, notify }
    }

    /// Call after mutating `store` outside of a render.
    pub fn changed(&self) {
        self.notify.emit(());
    }
}

#[hook]
pub fn use_vote_store() -> VoteStoreContext {
    use_context::<VoteStoreContext>()
        .unwrap_or_else(|| VoteStoreContext::new(open_vote_store(), 0, Callback::noop()))
}
