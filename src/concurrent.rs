use std::{fmt, sync::Arc};

use parking_lot::{Mutex, MutexGuard};

use crate::{
    config::PrewarmEntry, InstanceId, LocalPool, ParentId, Placement, PoolResult, PoolStats,
    Prefab, TemplateId,
};

/// An instance pool that can be shared between threads.
///
/// Every operation takes one mutex guarding the idle queues, the reverse
/// index and the instance arena together, so an acquire can never race a
/// return on the same idle queue and no idle instance is handed out twice.
/// Use [`Self::lock`] to run several operations under a single acquisition.
pub struct Pool<P: Prefab> {
    inner: Mutex<LocalPool<P>>,
}

impl<P: Prefab> Pool<P> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::from(LocalPool::new())
    }

    /// Creates an empty pool with room for `capacity` instances.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from(LocalPool::with_capacity(capacity))
    }

    /// Wraps the pool with an atomic reference counter so it can be handed to
    /// several threads.
    pub fn to_rc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Locks the pool for a batch of operations.
    pub fn lock(&self) -> MutexGuard<'_, LocalPool<P>> {
        self.inner.lock()
    }

    /// Consumes the shared pool and returns the single-threaded one.
    pub fn into_inner(self) -> LocalPool<P> {
        self.inner.into_inner()
    }

    /// See [`LocalPool::register_template`].
    pub fn register_template(&self, name: impl Into<String>, prefab: P) -> PoolResult<TemplateId> {
        self.inner.lock().register_template(name, prefab)
    }

    /// See [`LocalPool::template_id`].
    pub fn template_id(&self, name: &str) -> Option<TemplateId> {
        self.inner.lock().template_id(name)
    }

    /// See [`LocalPool::add_to_pool`].
    pub fn add_to_pool(&self, template: TemplateId, count: usize) -> PoolResult<()> {
        self.inner.lock().add_to_pool(template, count)
    }

    /// See [`LocalPool::prewarm`].
    pub fn prewarm(&self, entries: &[PrewarmEntry]) -> PoolResult<usize> {
        self.inner.lock().prewarm(entries)
    }

    /// See [`LocalPool::acquire`].
    pub fn acquire(&self, template: TemplateId) -> PoolResult<InstanceId> {
        self.inner.lock().acquire(template)
    }

    /// See [`LocalPool::acquire_with`].
    pub fn acquire_with(
        &self,
        template: TemplateId,
        placement: Placement,
        parent: Option<ParentId>,
    ) -> PoolResult<InstanceId> {
        self.inner.lock().acquire_with(template, placement, parent)
    }

    /// See [`LocalPool::release`].
    pub fn release(&self, instance: InstanceId) -> PoolResult<()> {
        self.inner.lock().release(instance)
    }

    /// Runs `f` on an instance while the pool is locked.
    pub fn with_instance<R>(&self, instance: InstanceId, f: impl FnOnce(&P::Instance) -> R) -> Option<R> {
        self.inner.lock().get(instance).map(f)
    }

    /// Runs `f` on a mutable instance while the pool is locked.
    pub fn with_instance_mut<R>(
        &self,
        instance: InstanceId,
        f: impl FnOnce(&mut P::Instance) -> R,
    ) -> Option<R> {
        self.inner.lock().get_mut(instance).map(f)
    }

    /// See [`LocalPool::template_of`].
    pub fn template_of(&self, instance: InstanceId) -> Option<TemplateId> {
        self.inner.lock().template_of(instance)
    }

    /// See [`LocalPool::idle_len`].
    pub fn idle_len(&self, template: TemplateId) -> usize {
        self.inner.lock().idle_len(template)
    }

    /// See [`LocalPool::in_use`].
    pub fn in_use(&self) -> usize {
        self.inner.lock().in_use()
    }

    /// Gets the number of instances ever created.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Checks if the pool has never created an instance.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// See [`LocalPool::stats`].
    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats()
    }
}

impl<P: Prefab> From<LocalPool<P>> for Pool<P> {
    fn from(pool: LocalPool<P>) -> Self {
        Pool {
            inner: Mutex::new(pool),
        }
    }
}

impl<P: Prefab> Default for Pool<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Prefab> fmt::Debug for Pool<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(pool) => f.debug_struct("Pool").field("inner", &*pool).finish(),
            None => f.debug_struct("Pool").field("inner", &"<locked>").finish(),
        }
    }
}
