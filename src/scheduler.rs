use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
    fmt,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use crossbeam_queue::SegQueue;

/// Identifies a scheduled task so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// A queue of payloads to be handed back once their due time passes.
///
/// Scheduling only needs `&self` and is safe from any thread: new tasks go
/// through a lock-free inbox that is drained on the next tick or cancel.
pub struct ReturnScheduler<K> {
    next_task: AtomicU64,
    inbox: SegQueue<(TaskId, Duration, K)>,
    timeline: BinaryHeap<Reverse<(Duration, TaskId)>>,
    tasks: HashMap<TaskId, K>,
    // timeline entries whose task was cancelled
    cancelled: usize,
}

impl<K> ReturnScheduler<K> {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        ReturnScheduler {
            next_task: AtomicU64::new(0),
            inbox: SegQueue::new(),
            timeline: BinaryHeap::new(),
            tasks: HashMap::new(),
            cancelled: 0,
        }
    }

    /// Schedules `key` to fire at `due`.
    pub fn schedule(&self, key: K, due: Duration) -> TaskId {
        let task = TaskId(self.next_task.fetch_add(1, Ordering::Relaxed));
        self.inbox.push((task, due, key));
        task
    }

    /// Schedules `key` to fire `delay` after `now`.
    pub fn schedule_after(&self, key: K, now: Duration, delay: Duration) -> TaskId {
        self.schedule(key, now.saturating_add(delay))
    }

    fn drain_inbox(&mut self) {
        while let Some((task, due, key)) = self.inbox.pop() {
            self.timeline.push(Reverse((due, task)));
            self.tasks.insert(task, key);
        }
    }

    /// Cancels a task. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, task: TaskId) -> bool {
        self.drain_inbox();
        if self.tasks.remove(&task).is_none() {
            return false;
        }
        self.cancelled += 1;
        if self.cancelled > self.tasks.len() {
            self.compact();
        }
        true
    }

    fn compact(&mut self) {
        let tasks = &self.tasks;
        self.timeline.retain(|Reverse((_, task))| tasks.contains_key(task));
        self.cancelled = 0;
    }

    /// Fires every task due at or before `now`, earliest first.
    ///
    /// Tasks with the same due time fire in scheduling order. Returns the
    /// number of tasks fired.
    pub fn tick(&mut self, now: Duration, mut fire: impl FnMut(K)) -> usize {
        self.drain_inbox();
        let mut fired = 0;
        while let Some(&Reverse((due, task))) = self.timeline.peek() {
            if due > now {
                break;
            }
            self.timeline.pop();
            match self.tasks.remove(&task) {
                Some(key) => {
                    fire(key);
                    fired += 1;
                }
                None => self.cancelled = self.cancelled.saturating_sub(1),
            }
        }
        fired
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&mut self) -> Option<Duration> {
        self.drain_inbox();
        while let Some(&Reverse((due, task))) = self.timeline.peek() {
            if self.tasks.contains_key(&task) {
                return Some(due);
            }
            self.timeline.pop();
            self.cancelled = self.cancelled.saturating_sub(1);
        }
        None
    }

    /// Number of tasks that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.tasks.len() + self.inbox.len()
    }
}

impl<K> Default for ReturnScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for ReturnScheduler<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReturnScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
