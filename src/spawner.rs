use std::{collections::HashMap, fmt, time::Duration};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, trace};

use crate::{
    config::{SpawnMode, SpawnerConfig},
    InstanceId, LocalPool, Placement, PoolError, PoolResult, Prefab, ReturnScheduler, TemplateId,
    WorldObject,
};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy)]
enum Expiry {
    Pooled(InstanceId),
    Direct(u64),
}

/// What one [`Spawner::update`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// Objects spawned.
    pub spawned: usize,
    /// Objects retired: returned to the pool or dropped.
    pub retired: usize,
    /// Retirements the pool refused.
    pub rejected: usize,
}

/// Spawns objects at a fixed cadence and retires them after their lifetime.
///
/// In [`SpawnMode::Direct`] the pool is bypassed: objects are built and
/// dropped by the spawner itself.
pub struct Spawner<P: Prefab> {
    config: SpawnerConfig,
    choices: Vec<TemplateId>,
    rng: StdRng,
    next_spawn: Duration,
    expiries: ReturnScheduler<Expiry>,
    direct: HashMap<u64, P::Instance>,
    next_direct: u64,
}

impl<P: Prefab> Spawner<P> {
    /// Creates a spawner for the templates named in `config`, or for every
    /// template of `pool` when the list is empty.
    ///
    /// The first object is spawned on the first update.
    pub fn new(config: SpawnerConfig, pool: &LocalPool<P>) -> PoolResult<Self> {
        let choices = if config.templates.is_empty() {
            pool.templates().map(|(id, _)| id).collect::<Vec<_>>()
        } else {
            config
                .templates
                .iter()
                .map(|name| {
                    pool.template_id(name)
                        .ok_or_else(|| PoolError::UnknownTemplateName { name: name.clone() })
                })
                .collect::<PoolResult<Vec<_>>>()?
        };
        if choices.is_empty() {
            return Err(PoolError::NothingToSpawn);
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!(templates = choices.len(), mode = ?config.mode, "spawner ready");
        Ok(Spawner {
            config,
            choices,
            rng,
            next_spawn: Duration::ZERO,
            expiries: ReturnScheduler::new(),
            direct: HashMap::new(),
            next_direct: 0,
        })
    }

    /// Advances the spawner to `now`.
    ///
    /// Objects whose lifetime has ended are retired first, then one object is
    /// spawned for every interval that has elapsed since the last spawn.
    pub fn update(&mut self, now: Duration, pool: &mut LocalPool<P>) -> PoolResult<SpawnReport> {
        let mut report = SpawnReport::default();

        let direct = &mut self.direct;
        self.expiries.tick(now, |expiry| match expiry {
            Expiry::Pooled(id) => match pool.release(id) {
                Ok(()) => report.retired += 1,
                Err(_) => report.rejected += 1,
            },
            Expiry::Direct(key) => {
                if direct.remove(&key).is_some() {
                    report.retired += 1;
                }
            }
        });

        let interval = self.config.interval().max(MIN_INTERVAL);
        while self.next_spawn <= now {
            let at = self.next_spawn;
            self.spawn_one(at, pool)?;
            report.spawned += 1;
            self.next_spawn = at + interval;
        }
        Ok(report)
    }

    fn spawn_one(&mut self, at: Duration, pool: &mut LocalPool<P>) -> PoolResult<()> {
        let template = self.choices[self.rng.gen_range(0..self.choices.len())];
        let offset = on_unit_sphere(&mut self.rng);
        let origin = self.config.origin;
        let placement = Placement::at([
            origin[0] + offset[0],
            origin[1] + offset[1],
            origin[2] + offset[2],
        ]);

        let expiry = match self.config.mode {
            SpawnMode::Pooled => {
                let id = pool.acquire_with(template, placement, None)?;
                trace!(%template, instance = %id, "spawned from pool");
                Expiry::Pooled(id)
            }
            SpawnMode::Direct => {
                let prefab = pool
                    .prefab(template)
                    .ok_or(PoolError::UnknownTemplate { id: template })?;
                let mut object = prefab.instantiate();
                object.place(placement, None);
                object.set_active(true);
                let key = self.next_direct;
                self.next_direct += 1;
                self.direct.insert(key, object);
                trace!(%template, key, "spawned directly");
                Expiry::Direct(key)
            }
        };
        self.expiries
            .schedule_after(expiry, at, self.config.lifetime());
        Ok(())
    }

    /// Number of spawned objects not yet retired.
    pub fn live(&self) -> usize {
        self.expiries.pending()
    }

    /// Objects built in direct mode that are still alive.
    pub fn direct_objects(&self) -> impl Iterator<Item = &P::Instance> + '_ {
        self.direct.values()
    }

    /// The settings this spawner runs with.
    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }
}

impl<P: Prefab> fmt::Debug for Spawner<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("mode", &self.config.mode)
            .field("templates", &self.choices)
            .field("next_spawn", &self.next_spawn)
            .field("live", &self.live())
            .finish()
    }
}

/// Uniformly distributed point on the unit sphere.
fn on_unit_sphere(rng: &mut impl Rng) -> [f32; 3] {
    loop {
        let v: [f32; 3] = [
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        ];
        let len_sq = v[0] * v[0] + v[1] * v[1] + v[2] * v[2];
        if len_sq > 1e-6 && len_sq <= 1.0 {
            let len = len_sq.sqrt();
            return [v[0] / len, v[1] / len, v[2] / len];
        }
    }
}
