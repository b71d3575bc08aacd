//! One-shot readiness slot for the loaded models.
//!
//! `Uninitialized → Ready → TornDown`. The slot flips to ready exactly once
//! and is only reset by [`ServiceLifecycle::teardown`] at process shutdown.

pub mod error;


pub use error::LifecycleError;

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::RwLock;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Ready,
    TornDown,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            STATE_READY => LifecycleState::Ready,
            STATE_TORN_DOWN => LifecycleState::TornDown,
            _ => LifecycleState::Uninitialized,
        }
    }
}

const STATE_UNINITIALIZED: u8 = 0;
const STATE_READY: u8 = 1;
const STATE_TORN_DOWN: u8 = 2;

pub struct ServiceLifecycle<T> {
    state: AtomicU8,
    slot: RwLock<Option<Arc<T>>>,
}

impl<T> Default for ServiceLifecycle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ServiceLifecycle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceLifecycle")
            .field("state", &self.state())
            .finish()
    }
}

impl<T> ServiceLifecycle<T> {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_UNINITIALIZED),
            slot: RwLock::new(None),
        }
    }

    /// Installs the service. Fails on every call after the first.
    pub fn mark_ready(&self, service: T) -> Result<(), LifecycleError> {
        let mut slot = self.slot.write();
        self.state
            .compare_exchange(
                STATE_UNINITIALIZED,
                STATE_READY,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|current| LifecycleError::InvalidTransition {
                state: LifecycleState::from_u8(current),
            })?;
        *slot = Some(Arc::new(service));

        info!("Service ready");
        Ok(())
    }

    /// Shared handle to the service, `None` unless ready.
    pub fn get(&self) -> Option<Arc<T>> {
        if self.state.load(Ordering::Acquire) != STATE_READY {
            return None;
        }
        self.slot.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LifecycleState::Ready
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Drops the slot's handle. In-flight requests keep their own `Arc`.
    pub fn teardown(&self) {
        let mut slot = self.slot.write();
        let previous = self.state.swap(STATE_TORN_DOWN, Ordering::AcqRel);
        slot.take();

        if previous != STATE_TORN_DOWN {
            info!(previous = ?LifecycleState::from_u8(previous), "Service torn down");
        }
    }
}
