//! Coordination between the controllers of one thread.
//!
//! A registry is handed to every controller at construction. Controllers
//! register themselves on creation and unregister when dropped; the registry
//! only holds weak references, so it never keeps a controller alive.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

/// Identifies a controller within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(u64);

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "controller-{}", self.0)
    }
}

/// What the registry needs from a controller.
pub trait Pausable {
    /// Pause if currently playing. Returns `true` if playback was stopped.
    fn pause_playback(&self) -> bool;

    fn is_playing(&self) -> bool;
}

/// Live controllers, keyed by id.
#[derive(Default)]
pub struct PlaybackRegistry {
    next_id: Cell<u64>,
    live: RefCell<BTreeMap<ControllerId, Weak<dyn Pausable>>>,
    exclusive: Cell<bool>,
}

impl PlaybackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry where starting one controller pauses all the others.
    pub fn exclusive() -> Self {
        let registry = Self::default();
        registry.exclusive.set(true);
        registry
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive.get()
    }

    pub fn set_exclusive(&self, exclusive: bool) {
        self.exclusive.set(exclusive);
    }

    /// Hand out a fresh id.
    pub fn allocate_id(&self) -> ControllerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        ControllerId(id)
    }

    pub fn register(&self, id: ControllerId, controller: Weak<dyn Pausable>) {
        self.live.borrow_mut().insert(id, controller);
        debug!(%id, live = self.len(), "Registered controller");
    }

    /// Returns `false` if `id` was not registered.
    pub fn unregister(&self, id: ControllerId) -> bool {
        let removed = self.live.borrow_mut().remove(&id).is_some();
        if removed {
            debug!(%id, live = self.len(), "Unregistered controller");
        }
        removed
    }

    pub fn contains(&self, id: ControllerId) -> bool {
        self.live.borrow().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.borrow().is_empty()
    }

    /// Ids of the controllers that are currently playing.
    pub fn playing(&self) -> Vec<ControllerId> {
        self.upgrade_all(None)
            .into_iter()
            .filter(|(_, c)| c.is_playing())
            .map(|(id, _)| id)
            .collect()
    }

    /// Pause every live controller. All are paused when this returns.
    ///
    /// Returns how many were actually playing.
    pub fn pause_all(&self) -> usize {
        let paused = self.pause(None);
        debug!(paused, "Paused all controllers");
        paused
    }

    /// Pause every live controller except `keep`.
    pub fn pause_others(&self, keep: ControllerId) -> usize {
        self.pause(Some(keep))
    }

    /// Called by a controller right before it starts playing.
    pub(crate) fn before_start(&self, id: ControllerId) {
        if self.exclusive.get() {
            let paused = self.pause_others(id);
            if paused > 0 {
                debug!(%id, paused, "Exclusive start paused other controllers");
            }
        }
    }

    fn pause(&self, skip: Option<ControllerId>) -> usize {
        // Strong refs are collected first so a controller may touch the
        // registry from inside its pause.
        self.upgrade_all(skip)
            .into_iter()
            .filter(|(_, c)| c.pause_playback())
            .count()
    }

    fn upgrade_all(&self, skip: Option<ControllerId>) -> Vec<(ControllerId, Rc<dyn Pausable>)> {
        let mut live = self.live.borrow_mut();
        live.retain(|_, weak| weak.strong_count() > 0);
        live.iter()
            .filter(|(id, _)| Some(**id) != skip)
            .filter_map(|(id, weak)| weak.upgrade().map(|c| (*id, c)))
            .collect()
    }
}

impl fmt::Debug for PlaybackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackRegistry")
            .field("live", &self.live.borrow().keys().collect::<Vec<_>>())
            .field("exclusive", &self.exclusive.get())
            .finish()
    }
}
