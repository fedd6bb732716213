//! Memoized environment capability probes.
//!
//! Native engines differ in what they support (completion signaling style,
//! optional node types). A renderer or adapter that has to branch on such a
//! difference asks the [`CapabilityCache`] instead of testing every time.
//!
//! # Semantics
//!
//! - A test function runs **at most once** per [`CapabilityKey`] for the
//!   lifetime of the cache, even when many callers probe concurrently.
//! - Synchronous answers are returned synchronously ([`ProbeResult::Resolved`]);
//!   asynchronous ones are shared by every caller until they resolve
//!   ([`ProbeResult::Pending`]), after which the boolean is cached for good.
//! - A test that fails (`Err`) counts as "not supported". Probe failures are
//!   never surfaced to the caller.
//!
//! # Example
//!
//! ```rust
//! use ondas_core::capability::{CapabilityCache, CapabilityKey, Probe};
//!
//! let cache = CapabilityCache::new();
//! let key = CapabilityKey::new("constant-source", "modern");
//! let supported = cache.probe(key, || Ok(Probe::Ready(true)));
//! assert_eq!(supported.now(), Some(true));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

/// Error type a probe test may fail with. Failures are treated as negative.
pub type ProbeError = Box<dyn std::error::Error + Send + Sync>;

/// An in-flight probe shared by every caller that asked before it resolved.
pub type SharedProbe = Shared<BoxFuture<'static, bool>>;

/// Identity of a capability probe.
///
/// `flavor` scopes the probe to one kind of native engine, so engines with
/// different capabilities never share an answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CapabilityKey {
    /// What is being probed.
    pub name: &'static str,
    /// Which engine flavor it is probed on.
    pub flavor: &'static str,
}

impl CapabilityKey {
    /// Creates a key.
    pub const fn new(name: &'static str, flavor: &'static str) -> Self {
        Self { name, flavor }
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.flavor)
    }
}

/// What a probe test returns: an immediate answer or one still in flight.
pub enum Probe {
    /// The capability was tested synchronously.
    Ready(bool),
    /// The answer arrives asynchronously.
    Pending(BoxFuture<'static, bool>),
}

/// What [`CapabilityCache::probe`] returns.
#[derive(Clone)]
pub enum ProbeResult {
    /// The answer is known.
    Resolved(bool),
    /// The answer is in flight; every caller shares this handle.
    Pending(SharedProbe),
}

impl ProbeResult {
    /// Returns the answer if it is already known.
    pub fn now(&self) -> Option<bool> {
        match self {
            Self::Resolved(value) => Some(*value),
            Self::Pending(shared) => shared.peek().copied(),
        }
    }

    /// Waits for the answer.
    pub async fn resolve(self) -> bool {
        match self {
            Self::Resolved(value) => value,
            Self::Pending(shared) => shared.await,
        }
    }
}

impl fmt::Debug for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(value) => f.debug_tuple("Resolved").field(value).finish(),
            Self::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Per-key state. `started` guards the single test invocation; `value` is set
/// once the answer is known.
#[derive(Default)]
struct Slot {
    value: OnceLock<bool>,
    started: OnceLock<Option<SharedProbe>>,
}

/// Process-wide memo of capability answers.
///
/// Cloning is cheap and clones share state. Use [`global()`](Self::global) for
/// the process-wide instance; tests create private caches with
/// [`new()`](Self::new).
#[derive(Clone, Default)]
pub struct CapabilityCache {
    slots: Arc<Mutex<HashMap<CapabilityKey, Arc<Slot>>>>,
}

impl CapabilityCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide cache, created on first use.
    pub fn global() -> &'static CapabilityCache {
        static GLOBAL: OnceLock<CapabilityCache> = OnceLock::new();
        GLOBAL.get_or_init(CapabilityCache::new)
    }

    /// Probes `key`, invoking `test` only if no answer is cached or in flight.
    ///
    /// `test` must not probe the same key again from inside its synchronous
    /// body.
    pub fn probe<F>(&self, key: CapabilityKey, test: F) -> ProbeResult
    where
        F: FnOnce() -> Result<Probe, ProbeError>,
    {
        let slot = self.slot(key);
        if let Some(&value) = slot.value.get() {
            return ProbeResult::Resolved(value);
        }

        let started = slot.started.get_or_init(|| match test() {
            Ok(Probe::Ready(value)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("capability_probe: {key} = {value}");
                let _ = slot.value.set(value);
                None
            }
            Ok(Probe::Pending(future)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("capability_probe: {key} pending");
                let weak: Weak<Slot> = Arc::downgrade(&slot);
                let settled = async move {
                    let value = future.await;
                    if let Some(slot) = weak.upgrade() {
                        let _ = slot.value.set(value);
                    }
                    value
                };
                Some(settled.boxed().shared())
            }
            Err(_error) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("capability_probe: {key} failed ({_error}), treating as unsupported");
                let _ = slot.value.set(false);
                None
            }
        });

        match (slot.value.get(), started) {
            (Some(&value), _) => ProbeResult::Resolved(value),
            (None, Some(shared)) => ProbeResult::Pending(shared.clone()),
            // A synchronous answer always sets `value` before `started`.
            (None, None) => ProbeResult::Resolved(false),
        }
    }

    /// The resolved answer for `key`, without probing.
    pub fn get(&self, key: CapabilityKey) -> Option<bool> {
        self.lock()
            .get(&key)
            .and_then(|slot| slot.value.get().copied())
    }

    /// Returns true if `key` has a resolved answer.
    pub fn is_resolved(&self, key: CapabilityKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of keys that have been probed.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been probed yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn slot(&self, key: CapabilityKey) -> Arc<Slot> {
        Arc::clone(self.lock().entry(key).or_default())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CapabilityKey, Arc<Slot>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CapabilityCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityCache")
            .field("keys", &self.len())
            .finish()
    }
}
