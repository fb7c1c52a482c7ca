use std::collections::{hash_map::Entry as MapEntry, HashMap, VecDeque};

use crate::{InstanceId, PoolError, PoolResult, TemplateId};

#[derive(Debug, Clone, Copy)]
struct Entry {
    template: TemplateId,
    idle: bool,
}

/// Idle queues keyed by template plus the instance → template reverse index.
#[derive(Debug, Default)]
pub struct Registry {
    idle: HashMap<TemplateId, VecDeque<InstanceId>>,
    index: HashMap<InstanceId, Entry>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the idle queue for `template` if it does not exist yet.
    pub fn ensure_queue(&mut self, template: TemplateId) {
        self.idle.entry(template).or_default();
    }

    /// Appends `instance` to the back of `template`'s idle queue.
    ///
    /// The instance must be registered under `template` and currently in use.
    pub fn enqueue_idle(&mut self, template: TemplateId, instance: InstanceId) -> PoolResult<()> {
        let entry = self
            .index
            .get_mut(&instance)
            .ok_or(PoolError::UnknownInstance { id: instance })?;
        if entry.template != template {
            return Err(PoolError::TemplateMismatch {
                id: instance,
                expected: entry.template,
                found: template,
            });
        }
        if entry.idle {
            return Err(PoolError::AlreadyIdle { id: instance });
        }
        entry.idle = true;
        self.idle.entry(template).or_default().push_back(instance);
        Ok(())
    }

    /// Removes the oldest idle instance of `template` and marks it in use.
    pub fn dequeue_idle(&mut self, template: TemplateId) -> Option<InstanceId> {
        let queue = self.idle.get_mut(&template)?;
        while let Some(instance) = queue.pop_front() {
            match self.index.get_mut(&instance) {
                Some(entry) => {
                    entry.idle = false;
                    return Some(instance);
                }
                None => debug_assert!(false, "{instance} queued but not in the reverse index"),
            }
        }
        None
    }

    /// Records that `instance` was created from `template`.
    ///
    /// Newly registered instances start out in use.
    pub fn register(&mut self, instance: InstanceId, template: TemplateId) -> PoolResult<()> {
        match self.index.entry(instance) {
            MapEntry::Occupied(_) => Err(PoolError::AlreadyRegistered { id: instance }),
            MapEntry::Vacant(slot) => {
                slot.insert(Entry {
                    template,
                    idle: false,
                });
                Ok(())
            }
        }
    }

    /// Returns the template `instance` was created from.
    pub fn lookup_template(&self, instance: InstanceId) -> Option<TemplateId> {
        self.index.get(&instance).map(|entry| entry.template)
    }

    /// Returns whether `instance` is idle, or `None` if it is unknown.
    pub fn is_idle(&self, instance: InstanceId) -> Option<bool> {
        self.index.get(&instance).map(|entry| entry.idle)
    }

    /// Number of idle instances of `template`.
    pub fn idle_len(&self, template: TemplateId) -> usize {
        self.idle.get(&template).map_or(0, VecDeque::len)
    }

    /// Idle instances of `template`, next to be reused first.
    pub fn idle_instances(&self, template: TemplateId) -> impl Iterator<Item = InstanceId> + '_ {
        self.idle.get(&template).into_iter().flatten().copied()
    }

    /// Number of idle instances across all templates.
    pub fn total_idle(&self) -> usize {
        self.idle.values().map(VecDeque::len).sum()
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no instance has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
