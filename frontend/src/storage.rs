use shared::{StateSlot, StoreError};
use web_sys::{console, window, Storage};
use crate::config::CONFIG;

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

fn session_storage() -> Option<Storage> {
    window()?.session_storage().ok().flatten()
}

/// Vote state slot backed by `window.localStorage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageSlot;

impl StateSlot for LocalStorageSlot {
    fn load(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn save(&self, key: &str, data: &str) -> Result<(), StoreError> {
        let storage = local_storage()
            .ok_or_else(|| StoreError::Storage("localStorage is not available".into()))?;
        storage
            .set_item(key, data)
            .map_err(|e| StoreError::Storage(format!("{:?}", e)))
    }
}

/// Id of the signed-in voter for this tab, if any.
pub fn voter_id() -> Option<String> {
    session_storage()?
        .get_item(CONFIG.voter_session_key)
        .ok()
        .flatten()
        .filter(|id| !id.is_empty())
}

pub fn set_voter_id(id: Option<&str>) {
    let Some(storage) = session_storage() else {
        console::warn_1(&"sessionStorage is not available".into());
        return;
    };
    let result = match id {
        Some(id) => storage.set_item(CONFIG.voter_session_key, id),
        None => storage.remove_item(CONFIG.voter_session_key),
    };
    if let Err(e) = result {
        console::error_2(&"Failed to update voter session:".into(), &e);
    }
}
