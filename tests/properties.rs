//! Property-based tests for the acquire/return protocol.
//!
//! Uses `proptest` to drive arbitrary interleavings of pre-warm, acquire and
//! return calls against a pool, checking the pool's invariants after every
//! step.

use std::{
    cell::Cell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use prefab_pool::*;
use proptest::prelude::*;

const TEMPLATES: usize = 3;

#[derive(Debug, Default)]
struct Marker {
    active: bool,
    resets: u32,
}

impl WorldObject for Marker {
    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }
}

impl Resettable for Marker {
    fn reinitialize(&mut self) {
        self.resets += 1;
    }
}

struct MarkerPrefab {
    built: Rc<Cell<usize>>,
}

impl Prefab for MarkerPrefab {
    type Instance = Marker;

    fn instantiate(&self) -> Marker {
        self.built.set(self.built.get() + 1);
        Marker::default()
    }
}

#[derive(Debug, Clone)]
enum Op {
    Add { template: usize, count: usize },
    Acquire { template: usize },
    /// Returns the held instance at this position (modulo the held count).
    Release { slot: usize },
    /// Returns a handle the pool never issued.
    ReleaseStranger { raw: u32 },
    /// Returns an instance that is currently idle.
    ReleaseIdle { slot: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => (0..TEMPLATES, 0usize..4).prop_map(|(template, count)| Op::Add { template, count }),
        3 => (0..TEMPLATES).prop_map(|template| Op::Acquire { template }),
        3 => any::<usize>().prop_map(|slot| Op::Release { slot }),
        1 => (10_000u32..20_000).prop_map(|raw| Op::ReleaseStranger { raw }),
        1 => any::<usize>().prop_map(|slot| Op::ReleaseIdle { slot }),
    ]
}

type Snapshot = Vec<Vec<InstanceId>>;

fn snapshot(pool: &LocalPool<MarkerPrefab>, templates: &[TemplateId]) -> Snapshot {
    templates
        .iter()
        .map(|&t| pool.registry().idle_instances(t).collect())
        .collect()
}

fn check_invariants(
    pool: &LocalPool<MarkerPrefab>,
    templates: &[TemplateId],
    held: &[InstanceId],
    origin: &HashMap<InstanceId, TemplateId>,
) -> Result<(), TestCaseError> {
    let mut seen = HashSet::new();
    for &t in templates {
        for id in pool.registry().idle_instances(t) {
            prop_assert!(seen.insert(id), "{id} queued twice");
            prop_assert_eq!(pool.template_of(id), Some(t));
            prop_assert_eq!(pool.is_idle(id), Some(true));
            prop_assert!(!pool.get(id).unwrap().active);
        }
    }
    let held_set: HashSet<_> = held.iter().copied().collect();
    prop_assert_eq!(held_set.len(), held.len(), "an instance was handed out twice");
    prop_assert!(held_set.is_disjoint(&seen));
    for &id in held {
        prop_assert_eq!(pool.is_idle(id), Some(false));
        prop_assert!(pool.get(id).unwrap().active);
    }
    prop_assert_eq!(seen.len() + held.len(), pool.len());
    prop_assert_eq!(origin.len(), pool.registry().len());
    for (&id, &t) in origin {
        prop_assert_eq!(pool.template_of(id), Some(t));
    }
    Ok(())
}

proptest! {
    /// Every invariant holds after every step of an arbitrary call sequence.
    #[test]
    fn test_protocol_invariants_hold(ops in prop::collection::vec(op_strategy(), 1..120)) {
        let built = Rc::new(Cell::new(0));
        let mut pool = LocalPool::new();
        let templates: Vec<_> = (0..TEMPLATES)
            .map(|i| {
                pool.register_template(format!("t{i}"), MarkerPrefab { built: built.clone() })
                    .unwrap()
            })
            .collect();

        let mut held: Vec<InstanceId> = Vec::new();
        let mut origin: HashMap<InstanceId, TemplateId> = HashMap::new();
        let mut resets_at_return: HashMap<InstanceId, u32> = HashMap::new();

        for op in ops {
            match op {
                Op::Add { template, count } => {
                    let t = templates[template];
                    let before = pool.len();
                    pool.add_to_pool(t, count).unwrap();
                    for raw in before..pool.len() {
                        origin.insert(InstanceId::from_raw(raw as u32), t);
                    }
                }
                Op::Acquire { template } => {
                    let t = templates[template];
                    let front = pool.registry().idle_instances(t).next();
                    let built_before = built.get();

                    let id = pool.acquire(t).unwrap();

                    match front {
                        Some(front) => {
                            prop_assert_eq!(id, front, "idle instance not reused first");
                            prop_assert_eq!(built.get(), built_before);
                            let resets = pool.get(id).unwrap().resets;
                            let at_return = resets_at_return.get(&id).copied().unwrap_or(0);
                            prop_assert!(resets > at_return);
                        }
                        None => {
                            prop_assert_eq!(built.get(), built_before + 1);
                            prop_assert!(origin.insert(id, t).is_none());
                        }
                    }
                    prop_assert!(!held.contains(&id));
                    held.push(id);
                }
                Op::Release { slot } => {
                    if held.is_empty() {
                        continue;
                    }
                    let id = held.swap_remove(slot % held.len());
                    pool.release(id).unwrap();
                    resets_at_return.insert(id, pool.get(id).unwrap().resets);
                }
                Op::ReleaseStranger { raw } => {
                    let id = InstanceId::from_raw(raw);
                    let before = snapshot(&pool, &templates);
                    let indexed = pool.registry().len();
                    prop_assert_eq!(pool.release(id), Err(PoolError::UnknownInstance { id }));
                    prop_assert_eq!(snapshot(&pool, &templates), before);
                    prop_assert_eq!(pool.registry().len(), indexed);
                }
                Op::ReleaseIdle { slot } => {
                    let idle: Vec<_> = snapshot(&pool, &templates).concat();
                    if idle.is_empty() {
                        continue;
                    }
                    let id = idle[slot % idle.len()];
                    let before = snapshot(&pool, &templates);
                    prop_assert_eq!(pool.release(id), Err(PoolError::AlreadyIdle { id }));
                    prop_assert_eq!(snapshot(&pool, &templates), before);
                }
            }
            check_invariants(&pool, &templates, &held, &origin)?;
        }
    }

    /// Back-to-back acquires without a return always yield distinct instances.
    #[test]
    fn test_consecutive_acquires_are_distinct(prewarm in 0usize..4, acquires in 2usize..16) {
        let mut pool = LocalPool::new();
        let t = pool.register_template("marker", Marker::default).unwrap();
        pool.add_to_pool(t, prewarm).unwrap();
        let ids: HashSet<_> = (0..acquires).map(|_| pool.acquire(t).unwrap()).collect();
        prop_assert_eq!(ids.len(), acquires);
        prop_assert_eq!(pool.len(), prewarm.max(acquires));
    }
}
