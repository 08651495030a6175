//! Auto-save timing with debouncing.
//!
//! A change marks the session dirty and (re)starts the quiet period; a save
//! becomes due once no further change has arrived for the whole debounce
//! delay. Every new change resets the pending deadline instead of queuing
//! another save.

use std::time::Duration;
use web_time::Instant;

/// Decides when a debounced save is due.
#[derive(Debug)]
pub struct AutoSaveManager {
    /// Wait this long after the last change before saving.
    debounce_delay: Duration,

    /// Time of last successful save.
    last_save: Option<Instant>,

    /// Time of last change that needs saving.
    last_change: Option<Instant>,

    /// Whether auto-save is enabled.
    enabled: bool,

    /// Whether there are unsaved changes.
    dirty: bool,
}

impl AutoSaveManager {
    /// Default debounce delay (1 second).
    pub const DEFAULT_DEBOUNCE_DELAY: Duration =
        Duration::from_millis(crate::constants::AUTO_SAVE_DEBOUNCE_MS);

    /// Create a new auto-save manager with default settings.
    pub fn new() -> Self {
        Self {
            debounce_delay: Self::DEFAULT_DEBOUNCE_DELAY,
            last_save: None,
            last_change: None,
            enabled: true,
            dirty: false,
        }
    }

    /// Create a disabled auto-save manager.
    pub fn disabled() -> Self {
        let mut manager = Self::new();
        manager.enabled = false;
        manager
    }

    /// Set the debounce delay.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Mark that a change occurred now.
    pub fn mark_dirty(&mut self) {
        self.mark_dirty_at(Instant::now());
    }

    /// Mark that a change occurred at `now`, restarting the quiet period.
    pub fn mark_dirty_at(&mut self, now: Instant) {
        self.dirty = true;
        self.last_change = Some(now);
        log::trace!("Auto-save: marked dirty");
    }

    /// Check if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// When the pending save becomes due, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        if !self.enabled || !self.dirty {
            return None;
        }
        self.last_change.map(|t| t + self.debounce_delay)
    }

    /// Check if a save is due at `now`.
    pub fn should_save_at(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }

    /// Mark that a save completed successfully.
    pub fn mark_saved_at(&mut self, now: Instant) {
        self.last_save = Some(now);
        self.dirty = false;
        self.last_change = None;
        log::trace!("Auto-save: marked saved");
    }

    /// Mark that a save failed.
    ///
    /// The session stays dirty and the next attempt waits another full
    /// debounce period.
    pub fn mark_save_failed_at(&mut self, now: Instant) {
        self.last_change = Some(now);
        log::trace!("Auto-save: marked save failed");
    }

    /// Set whether auto-save is enabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        log::debug!("Auto-save: enabled = {}", enabled);
    }

    /// Check if auto-save is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    /// Reset all timing state.
    pub fn reset(&mut self) {
        self.last_save = None;
        self.last_change = None;
        self.dirty = false;
    }
}

impl Default for AutoSaveManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let manager = AutoSaveManager::new();
        assert!(!manager.is_dirty());
        assert!(!manager.should_save_at(Instant::now()));
        assert!(manager.is_enabled());
    }

    #[test]
    fn test_debounce_prevents_immediate_save() {
        let t0 = Instant::now();
        let mut manager = AutoSaveManager::new();
        manager.mark_dirty_at(t0);

        assert!(!manager.should_save_at(t0));
        assert!(!manager.should_save_at(t0 + Duration::from_millis(999)));
        assert!(manager.should_save_at(t0 + Duration::from_millis(1000)));
    }

    #[test]
    fn test_new_change_resets_timer() {
        let t0 = Instant::now();
        let mut manager = AutoSaveManager::new();
        manager.mark_dirty_at(t0);
        manager.mark_dirty_at(t0 + Duration::from_millis(800));
        assert!(!manager.should_save_at(t0 + Duration::from_millis(1200)));
        assert!(manager.should_save_at(t0 + Duration::from_millis(1800)));
    }

    #[test]
    fn test_mark_saved() {
        let t0 = Instant::now();
        let mut manager = AutoSaveManager::new();
        manager.mark_dirty_at(t0);
        manager.mark_saved_at(t0 + Duration::from_secs(2));
        assert!(!manager.is_dirty());
        assert_eq!(manager.deadline(), None);
    }

    #[test]
    fn test_failed_save_retries_after_delay() {
        let t0 = Instant::now();
        let mut manager = AutoSaveManager::new();
        manager.mark_dirty_at(t0);
        let failed_at = t0 + Duration::from_secs(1);
        manager.mark_save_failed_at(failed_at);
        assert!(manager.is_dirty());
        assert!(!manager.should_save_at(failed_at));
        assert!(manager.should_save_at(failed_at + Duration::from_secs(1)));
    }

    #[test]
    fn test_disabled() {
        let mut manager = AutoSaveManager::disabled();
        let t0 = Instant::now();
        manager.mark_dirty_at(t0);
        assert!(!manager.should_save_at(t0 + Duration::from_secs(10)));
    }
}
