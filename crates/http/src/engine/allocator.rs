//! Resource accounting for engine handles.
//!
//! Every engine resource (message handles, stream adapters and native stream handles) is
//! created through an [`Allocator`]. The allocator hands out an [`Allocation`] guard per
//! resource and keeps per-kind counters of the live ones, which makes leaks and double
//! releases observable: a guard decrements its counter exactly once, when it is dropped.
//!
//! An allocator can optionally be bounded through [`AllocatorConfig::max_allocations`], in
//! which case [`Allocator::allocate`] fails once the limit is reached.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::error;

use crate::engine::EngineError;

/// The kind of resource an [`Allocation`] accounts for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    /// A request or response message handle
    Message,
    /// A stream adapter wrapping a generic byte stream
    Adapter,
    /// An engine-side duplicate handle of a body stream
    Stream,
}

impl ResourceKind {
    const fn slot(self) -> usize {
        match self {
            ResourceKind::Message => 0,
            ResourceKind::Adapter => 1,
            ResourceKind::Stream => 2,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Message => f.write_str("message"),
            ResourceKind::Adapter => f.write_str("adapter"),
            ResourceKind::Stream => f.write_str("stream"),
        }
    }
}

/// Tunables of an [`Allocator`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AllocatorConfig {
    /// Upper bound of live fallible allocations (messages and adapters), `None` for unbounded.
    ///
    /// Native stream handles are registered without consuming this budget.
    pub max_allocations: Option<usize>,
}

impl AllocatorConfig {
    pub fn with_max_allocations(max_allocations: usize) -> Self {
        Self { max_allocations: Some(max_allocations) }
    }
}

/// A cheaply cloneable handle to a shared resource accountant.
///
/// Clones share the same counters, so a message created with one clone and inspected through
/// another reports consistent numbers.
#[derive(Clone, Default)]
pub struct Allocator {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    config: AllocatorConfig,
    // live fallible allocations, checked against `config.max_allocations`
    bounded: AtomicUsize,
    live: [AtomicUsize; 3],
}

impl Allocator {
    /// Creates an unbounded allocator.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AllocatorConfig) -> Self {
        Self { inner: Arc::new(Inner { config, ..Inner::default() }) }
    }

    pub fn config(&self) -> AllocatorConfig {
        self.inner.config
    }

    /// Reserves one resource of `kind`, failing if the configured limit is reached.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AllocationFailed`] when `max_allocations` resources are live.
    pub fn allocate(&self, kind: ResourceKind) -> Result<Allocation, EngineError> {
        if let Some(limit) = self.inner.config.max_allocations {
            let reserved = self
                .inner
                .bounded
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| (live < limit).then_some(live + 1));
            if reserved.is_err() {
                error!(%kind, limit, "allocation limit reached");
                return Err(EngineError::AllocationFailed { kind, limit });
            }
        } else {
            self.inner.bounded.fetch_add(1, Ordering::AcqRel);
        }

        Ok(self.track(kind, true))
    }

    /// Registers an engine-side stream handle. Counted, never refused.
    pub fn register_stream(&self) -> Allocation {
        self.track(ResourceKind::Stream, false)
    }

    /// Number of live resources of `kind`.
    pub fn live(&self, kind: ResourceKind) -> usize {
        self.inner.live[kind.slot()].load(Ordering::Acquire)
    }

    /// Number of live resources of every kind.
    pub fn live_total(&self) -> usize {
        self.inner.live.iter().map(|counter| counter.load(Ordering::Acquire)).sum()
    }

    fn track(&self, kind: ResourceKind, bounded: bool) -> Allocation {
        self.inner.live[kind.slot()].fetch_add(1, Ordering::AcqRel);
        Allocation { allocator: self.clone(), kind, bounded }
    }
}

impl fmt::Debug for Allocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("config", &self.inner.config)
            .field("messages", &self.live(ResourceKind::Message))
            .field("adapters", &self.live(ResourceKind::Adapter))
            .field("streams", &self.live(ResourceKind::Stream))
            .finish()
    }
}

/// Guard for one live resource. Dropping it releases the resource's accounting.
#[derive(Debug)]
pub struct Allocation {
    allocator: Allocator,
    kind: ResourceKind,
    bounded: bool,
}

impl Allocation {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        let inner = &self.allocator.inner;
        inner.live[self.kind.slot()].fetch_sub(1, Ordering::AcqRel);
        if self.bounded {
            inner.bounded.fetch_sub(1, Ordering::AcqRel);
        }
    }
}
