use std::{collections::HashSet, thread};

use prefab_pool::*;
use rayon::prelude::*;

#[derive(Debug, Default)]
struct Shard {
    active: bool,
    generation: u32,
}

impl WorldObject for Shard {
    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }
}

impl Resettable for Shard {
    fn reinitialize(&mut self) {
        self.generation += 1;
    }
}

fn new_pool() -> (Pool<fn() -> Shard>, TemplateId) {
    let pool: Pool<fn() -> Shard> = Pool::new();
    let t = pool.register_template("shard", Shard::default as fn() -> Shard).unwrap();
    (pool, t)
}

#[test]
fn test_new() {
    let (pool, t) = new_pool();
    let id = pool.acquire(t).unwrap();
    assert_eq!(pool.with_instance(id, |s| s.active), Some(true));
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_parallel_acquire_never_double_issues() {
    let (pool, t) = new_pool();
    pool.add_to_pool(t, 32).unwrap();

    let ids: Vec<_> = (0..128)
        .into_par_iter()
        .map(|_| pool.acquire(t).unwrap())
        .collect();

    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 128);
    assert_eq!(pool.len(), 128);
    assert_eq!(pool.idle_len(t), 0);
    assert_eq!(pool.in_use(), 128);
}

#[test]
fn test_parallel_acquire_release_cycles() {
    let (pool, t) = new_pool();
    pool.add_to_pool(t, 8).unwrap();

    (0..512).into_par_iter().for_each(|_| {
        let id = pool.acquire(t).unwrap();
        assert_eq!(pool.with_instance(id, |s| s.active), Some(true));
        pool.release(id).unwrap();
    });

    assert_eq!(pool.in_use(), 0);
    assert_eq!(pool.idle_len(t), pool.len());
    let stats = pool.stats();
    assert_eq!(stats.created + stats.reused, 8 + 512);
    assert_eq!(stats.released, 512);
    assert_eq!(stats.rejected, 0);
}

#[test]
fn test_release_from_another_thread() {
    let (pool, t) = new_pool();
    let pool = pool.to_rc();
    let id = pool.acquire(t).unwrap();

    let remote = pool.clone();
    thread::spawn(move || remote.release(id).unwrap())
        .join()
        .unwrap();

    assert_eq!(pool.idle_len(t), 1);
    assert_eq!(pool.with_instance(id, |s| s.active), Some(false));
    assert_eq!(pool.template_of(id), Some(t));
}

#[test]
fn test_with_instance_mut_and_reset() {
    let (pool, t) = new_pool();
    let id = pool.acquire(t).unwrap();
    pool.with_instance_mut(id, |s| s.generation = 10).unwrap();
    pool.release(id).unwrap();

    let again = pool.acquire(t).unwrap();
    assert_eq!(again, id);
    assert_eq!(pool.with_instance(again, |s| s.generation), Some(11));
    assert_eq!(pool.with_instance(InstanceId::from_raw(77), |s| s.generation), None);
}

#[test]
fn test_unknown_release_is_rejected() {
    let (pool, t) = new_pool();
    pool.add_to_pool(t, 2).unwrap();
    let stranger = InstanceId::from_raw(5);
    assert_eq!(
        pool.release(stranger),
        Err(PoolError::UnknownInstance { id: stranger })
    );
    assert_eq!(pool.idle_len(t), 2);
}

#[test]
fn test_lock_batches_operations() {
    let (pool, t) = new_pool();
    {
        let mut local = pool.lock();
        let a = local.acquire(t).unwrap();
        let b = local.acquire(t).unwrap();
        local.release(a).unwrap();
        local.release(b).unwrap();
    }
    assert_eq!(pool.idle_len(t), 2);

    let local = pool.into_inner();
    assert_eq!(local.len(), 2);
    assert_eq!(local.template_id("shard"), Some(t));
}
