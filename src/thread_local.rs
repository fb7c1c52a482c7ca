use std::{collections::HashMap, fmt};

use tracing::{debug, info, trace, warn};

use crate::{
    config::PrewarmEntry, InstanceId, ParentId, Placement, PoolError, PoolResult, PoolStats,
    Prefab, Registry, TemplateId, WorldObject,
};

struct TemplateSlot<P> {
    name: String,
    prefab: P,
}

/// An instance pool for a single thread of control.
///
/// The pool owns its templates and every instance it ever created. Callers
/// hold [`InstanceId`] handles and reach the instance through
/// [`Self::get`]/[`Self::get_mut`]. Instances are never destroyed: returning
/// one hides it and queues it for reuse by the next acquire of the same
/// template.
pub struct LocalPool<P: Prefab> {
    templates: Vec<TemplateSlot<P>>,
    names: HashMap<String, TemplateId>,
    instances: Vec<P::Instance>,
    registry: Registry,
    stats: PoolStats,
}

impl<P: Prefab> LocalPool<P> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        LocalPool {
            templates: Vec::new(),
            names: HashMap::new(),
            instances: Vec::new(),
            registry: Registry::new(),
            stats: PoolStats::default(),
        }
    }

    /// Creates an empty pool with room for `capacity` instances before the
    /// arena reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut pool = Self::new();
        pool.instances.reserve(capacity);
        pool
    }

    /// Registers a template under a unique name.
    pub fn register_template(&mut self, name: impl Into<String>, prefab: P) -> PoolResult<TemplateId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(PoolError::DuplicateTemplate { name });
        }
        let id = TemplateId::from_raw(self.templates.len() as u32);
        self.registry.ensure_queue(id);
        self.names.insert(name.clone(), id);
        debug!(template = %id, %name, "registered template");
        self.templates.push(TemplateSlot { name, prefab });
        Ok(id)
    }

    /// Looks a template up by the name it was registered under.
    pub fn template_id(&self, name: &str) -> Option<TemplateId> {
        self.names.get(name).copied()
    }

    /// Returns the prefab behind `template`.
    pub fn prefab(&self, template: TemplateId) -> Option<&P> {
        self.templates.get(template.index()).map(|slot| &slot.prefab)
    }

    /// Returns the name `template` was registered under.
    pub fn template_name(&self, template: TemplateId) -> Option<&str> {
        self.templates.get(template.index()).map(|slot| slot.name.as_str())
    }

    /// Iterates over all templates in registration order.
    pub fn templates(&self) -> impl Iterator<Item = (TemplateId, &str)> + '_ {
        self.templates
            .iter()
            .enumerate()
            .map(|(index, slot)| (TemplateId::from_raw(index as u32), slot.name.as_str()))
    }

    fn slot(&self, template: TemplateId) -> PoolResult<&TemplateSlot<P>> {
        self.templates
            .get(template.index())
            .ok_or(PoolError::UnknownTemplate { id: template })
    }

    /// Constructs and registers a new in-use instance.
    fn create(&mut self, template: TemplateId) -> PoolResult<InstanceId> {
        let instance = self.slot(template)?.prefab.instantiate();
        // Wraps past u32::MAX; register then rejects the recycled handle.
        let id = InstanceId::from_raw(self.instances.len() as u32);
        self.registry.register(id, template)?;
        self.instances.push(instance);
        self.stats.created += 1;
        Ok(id)
    }

    /// Pre-warms the pool with one idle instance of `template`.
    pub fn add_one(&mut self, template: TemplateId) -> PoolResult<()> {
        self.add_to_pool(template, 1)
    }

    /// Pre-warms the pool with `count` idle instances of `template`.
    pub fn add_to_pool(&mut self, template: TemplateId, count: usize) -> PoolResult<()> {
        self.slot(template)?;
        self.instances.reserve(count);
        for _ in 0..count {
            let id = self.create(template)?;
            self.instances[id.index()].set_active(false);
            self.registry.enqueue_idle(template, id)?;
        }
        debug!(%template, count, "added idle instances");
        Ok(())
    }

    /// Applies a list of pre-warm entries, resolving template names first.
    ///
    /// Nothing is created unless every name resolves. Returns the number of
    /// instances created.
    pub fn prewarm(&mut self, entries: &[PrewarmEntry]) -> PoolResult<usize> {
        let resolved = entries
            .iter()
            .map(|entry| {
                self.template_id(&entry.template)
                    .map(|id| (id, entry.count))
                    .ok_or_else(|| PoolError::UnknownTemplateName {
                        name: entry.template.clone(),
                    })
            })
            .collect::<PoolResult<Vec<_>>>()?;

        let mut total = 0;
        for (template, count) in resolved {
            self.add_to_pool(template, count)?;
            total += count;
        }
        info!(templates = entries.len(), instances = total, "pool pre-warmed");
        Ok(total)
    }

    /// Acquires an instance of `template` at the origin with no parent.
    pub fn acquire(&mut self, template: TemplateId) -> PoolResult<InstanceId> {
        self.acquire_with(template, Placement::ORIGIN, None)
    }

    /// Acquires an instance of `template`.
    ///
    /// The oldest idle instance is reused if there is one; otherwise a new
    /// instance is constructed. Either way the instance is placed,
    /// reinitialized if it is [`Resettable`](crate::Resettable), and then activated.
    pub fn acquire_with(
        &mut self,
        template: TemplateId,
        placement: Placement,
        parent: Option<ParentId>,
    ) -> PoolResult<InstanceId> {
        self.slot(template)?;
        let id = match self.registry.dequeue_idle(template) {
            Some(id) => {
                self.stats.reused += 1;
                trace!(%template, instance = %id, "reusing idle instance");
                id
            }
            None => {
                let id = self.create(template)?;
                self.stats.cold_acquires += 1;
                debug!(%template, instance = %id, "idle queue empty, created instance");
                id
            }
        };

        let instance = &mut self.instances[id.index()];
        instance.place(placement, parent);
        if let Some(resettable) = instance.as_resettable() {
            resettable.reinitialize();
        }
        instance.set_active(true);
        Ok(id)
    }

    /// Returns an instance to the pool.
    ///
    /// Unknown instances and instances that are already idle are rejected
    /// with a warning; neither the instance nor the pool is modified.
    pub fn release(&mut self, instance: InstanceId) -> PoolResult<()> {
        let Some(template) = self.registry.lookup_template(instance) else {
            self.stats.rejected += 1;
            warn!(%instance, "attempted to return an instance this pool never created");
            return Err(PoolError::UnknownInstance { id: instance });
        };
        if self.registry.is_idle(instance) == Some(true) {
            self.stats.rejected += 1;
            warn!(%instance, %template, "attempted to return an instance that is already idle");
            return Err(PoolError::AlreadyIdle { id: instance });
        }

        self.instances[instance.index()].set_active(false);
        self.registry.enqueue_idle(template, instance)?;
        self.stats.released += 1;
        trace!(%template, %instance, "instance returned");
        Ok(())
    }

    /// Borrows an instance.
    pub fn get(&self, instance: InstanceId) -> Option<&P::Instance> {
        self.instances.get(instance.index())
    }

    /// Mutably borrows an instance.
    pub fn get_mut(&mut self, instance: InstanceId) -> Option<&mut P::Instance> {
        self.instances.get_mut(instance.index())
    }

    /// Returns the template `instance` was created from.
    pub fn template_of(&self, instance: InstanceId) -> Option<TemplateId> {
        self.registry.lookup_template(instance)
    }

    /// Returns whether `instance` is idle, or `None` if it is unknown.
    pub fn is_idle(&self, instance: InstanceId) -> Option<bool> {
        self.registry.is_idle(instance)
    }

    /// Number of idle instances of `template`.
    pub fn idle_len(&self, template: TemplateId) -> usize {
        self.registry.idle_len(template)
    }

    /// Number of instances currently handed out.
    pub fn in_use(&self) -> usize {
        self.registry.len() - self.registry.total_idle()
    }

    /// Number of instances ever created.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Checks if the pool has never created an instance.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Usage counters.
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Read-only view of the idle queues and reverse index.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl<P: Prefab> Default for LocalPool<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Prefab> fmt::Debug for LocalPool<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalPool")
            .field("templates", &self.templates.len())
            .field("instances", &self.instances.len())
            .field("idle", &self.registry.total_idle())
            .field("stats", &self.stats)
            .finish()
    }
}
