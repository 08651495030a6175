//! Crash-safe session persistence.
//!
//! The state of the document being edited is saved to a key-value store
//! under one key, together with a fingerprint of the document bytes.
//! Saves are debounced; restore only applies a stored session when the
//! fingerprint of the newly loaded bytes matches the stored one.
//! Persistence failures are logged and never block editing.

mod auto_save;
mod fingerprint;
mod record;
mod storage;

pub use auto_save::AutoSaveManager;
pub use fingerprint::{Fingerprint, SAMPLE_BYTES};
pub use record::{SESSION_VERSION, SessionRecord};
pub use storage::{MemoryStorage, SessionStorage, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;
use web_time::Instant;

use crate::config::SessionConfig;
use crate::store::{StateStore, SubscriberError, Subscription};
use record::{VersionProbe, now_millis};

/// Errors while saving or reading a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Session serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No document loaded, so there is nothing to key the session by
    #[error("No document loaded")]
    NoDocument,
}

/// What a restore attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Stored entities were applied
    Restored,
    /// Nothing stored (or the backend could not be read)
    NoSession,
    /// Stored session belongs to a different document; left in place
    FingerprintMismatch,
    /// Stored session has another format version; removed
    Incompatible { version: u32 },
    /// Stored payload could not be parsed; removed
    Corrupt,
}

impl RestoreOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, RestoreOutcome::Restored)
    }
}

/// Clears the restoring flag when dropped.
struct RestoreGuard(Rc<Cell<bool>>);

impl RestoreGuard {
    fn engage(flag: &Rc<Cell<bool>>) -> Self {
        flag.set(true);
        Self(Rc::clone(flag))
    }
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Saves and restores the store through a [`SessionStorage`] backend.
#[derive(Debug)]
pub struct SessionManager<S> {
    storage: S,
    key: String,
    fingerprint: Option<Fingerprint>,
    auto_save: Rc<RefCell<AutoSaveManager>>,
    /// Set while a restore or document reset applies bulk changes.
    restoring: Rc<Cell<bool>>,
    subscription: Option<Subscription>,
}

impl<S: SessionStorage> SessionManager<S> {
    pub fn new(storage: S, config: &SessionConfig) -> Self {
        let auto_save = if config.auto_save {
            AutoSaveManager::new()
        } else {
            AutoSaveManager::disabled()
        }
        .with_debounce_delay(config.debounce_delay());

        Self {
            storage,
            key: config.storage_key.clone(),
            fingerprint: None,
            auto_save: Rc::new(RefCell::new(auto_save)),
            restoring: Rc::new(Cell::new(false)),
            subscription: None,
        }
    }

    /// Watch `store` for changes that a session captures.
    ///
    /// Call [`SessionManager::detach`] on the old store before attaching
    /// to another one.
    pub fn attach(&mut self, store: &mut StateStore) {
        let auto_save = Rc::clone(&self.auto_save);
        let restoring = Rc::clone(&self.restoring);
        let subscription = store.on_any(move |event| {
            if restoring.get() || !event.is_persistent_change() {
                return Ok(());
            }
            let mut auto_save = auto_save
                .try_borrow_mut()
                .map_err(|e| SubscriberError::new(format!("auto-save busy: {e}")))?;
            auto_save.mark_dirty();
            Ok(())
        });
        self.subscription = Some(subscription);
    }

    /// Stop watching `store`.
    pub fn detach(&mut self, store: &mut StateStore) -> bool {
        self.subscription
            .take()
            .is_some_and(|subscription| store.off(subscription))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.auto_save.borrow().is_dirty()
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring.get()
    }

    /// When the pending auto-save is due, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.auto_save.borrow().deadline()
    }

    pub fn set_auto_save(&mut self, enabled: bool) {
        self.auto_save.borrow_mut().set_enabled(enabled);
    }

    /// Reset the store for newly loaded document bytes without scheduling
    /// a save, then try to restore the stored session for them.
    pub fn open_document(&mut self, store: &mut StateStore, bytes: &[u8], page_count: u32) -> RestoreOutcome {
        {
            let _guard = RestoreGuard::engage(&self.restoring);
            store.reset(page_count);
        }
        self.auto_save.borrow_mut().reset();
        self.restore(store, bytes)
    }

    /// Apply the stored session if it was saved for these document bytes.
    ///
    /// On any mismatch the store is left untouched. Undo history is cleared
    /// after a successful restore.
    pub fn restore(&mut self, store: &mut StateStore, bytes: &[u8]) -> RestoreOutcome {
        let fingerprint = Fingerprint::of(bytes);
        self.fingerprint = Some(fingerprint.clone());

        let raw = match self.storage.load(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::debug!("No stored session");
                return RestoreOutcome::NoSession;
            }
            Err(e) => {
                log::warn!("Could not read stored session: {}", e);
                return RestoreOutcome::NoSession;
            }
        };

        let version = match serde_json::from_str::<VersionProbe>(&raw) {
            Ok(probe) => probe.version,
            Err(e) => {
                log::warn!("Stored session is corrupt: {}", e);
                self.discard();
                return RestoreOutcome::Corrupt;
            }
        };
        if version != SESSION_VERSION {
            log::info!(
                "Discarding stored session with version {} (expected {})",
                version,
                SESSION_VERSION
            );
            self.discard();
            return RestoreOutcome::Incompatible { version };
        }

        let record: SessionRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Stored session is corrupt: {}", e);
                self.discard();
                return RestoreOutcome::Corrupt;
            }
        };

        if record.doc_fingerprint != fingerprint.as_str() {
            log::info!(
                "Stored session is for another document ({} vs {})",
                record.doc_fingerprint,
                fingerprint
            );
            return RestoreOutcome::FingerprintMismatch;
        }

        {
            let _guard = RestoreGuard::engage(&self.restoring);
            store.replace_document(record.document());
            let page = match store.page_count() {
                0 => record.current_page.max(1),
                count => record.current_page.clamp(1, count),
            };
            store.set_current_page(page);
            if record.scale.is_finite() && record.scale > 0.0 {
                store.set_scale(record.scale);
            }
            store.set_tool(record.current_tool);
            store.set_selection(None);
            store.clear_history();
        }
        self.auto_save.borrow_mut().reset();

        log::info!(
            "Restored session from {} ({} overlays, {} edits, {} annotations)",
            record.timestamp,
            record.text_overlays.len(),
            record.text_edits.len(),
            record.annotations.len()
        );
        RestoreOutcome::Restored
    }

    /// Write the session now.
    pub fn save(&mut self, store: &StateStore) -> Result<(), SessionError> {
        let fingerprint = self.fingerprint.as_ref().ok_or(SessionError::NoDocument)?;
        let record = SessionRecord::capture(store, fingerprint.as_str(), now_millis());
        let json = record.to_json()?;
        self.storage.save(&self.key, &json)?;
        log::debug!("Session saved ({} bytes)", json.len());
        Ok(())
    }

    /// Save if the debounce period has elapsed. Returns whether a save ran
    /// and succeeded; failures are logged and retried later.
    pub fn poll(&mut self, store: &StateStore, now: Instant) -> bool {
        if !self.auto_save.borrow().should_save_at(now) {
            return false;
        }
        match self.save(store) {
            Ok(()) => {
                self.auto_save.borrow_mut().mark_saved_at(now);
                true
            }
            Err(e) => {
                log::warn!("Auto-save skipped: {}", e);
                self.auto_save.borrow_mut().mark_save_failed_at(now);
                false
            }
        }
    }

    /// Save immediately, bypassing the debounce.
    pub fn flush(&mut self, store: &StateStore) -> Result<(), SessionError> {
        self.save(store)?;
        self.auto_save.borrow_mut().mark_saved_at(Instant::now());
        Ok(())
    }

    /// Remove the stored session.
    pub fn discard(&mut self) {
        if let Err(e) = self.storage.remove(&self.key) {
            log::warn!("Could not remove stored session: {}", e);
        }
    }
}
