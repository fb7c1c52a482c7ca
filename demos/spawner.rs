//! Runs the periodic spawner against a pre-warmed pool on a simulated clock.
//!
//! ```text
//! cargo run --example spawner -- [pool.toml]
//! RUST_LOG=prefab_pool=debug cargo run --example spawner
//! POOL_SPAWNER__MODE=direct cargo run --example spawner
//! ```

use std::time::{Duration, Instant};

use prefab_pool::{
    config::{load_config, PrewarmEntry},
    spawner::Spawner,
    LocalPool, Prefab, Resettable, WorldObject,
};
use rand::Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(16);
const RUN_FOR: Duration = Duration::from_secs(30);

/// A world object carrying a few KB of per-use state.
struct Debris {
    active: bool,
    position: [f32; 3],
    payload: Box<[i32; 1000]>,
}

impl WorldObject for Debris {
    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn place(&mut self, placement: prefab_pool::Placement, _parent: Option<prefab_pool::ParentId>) {
        self.position = placement.position;
    }

    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }
}

impl Resettable for Debris {
    fn reinitialize(&mut self) {
        let mut rng = rand::thread_rng();
        for slot in self.payload.iter_mut() {
            *slot = rng.gen_range(-99_999..99_999);
        }
    }
}

struct DebrisPrefab;

impl Prefab for DebrisPrefab {
    type Instance = Debris;

    fn instantiate(&self) -> Debris {
        Debris {
            active: true,
            position: [0.0; 3],
            payload: Box::new([0; 1000]),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args().nth(1);
    let mut config = load_config(path.as_deref())?;
    if config.prewarm.is_empty() {
        config.prewarm = vec![PrewarmEntry::new("cube", 200), PrewarmEntry::new("sphere", 200)];
    }

    let mut pool = LocalPool::with_capacity(512);
    pool.register_template("cube", DebrisPrefab)?;
    pool.register_template("sphere", DebrisPrefab)?;
    pool.prewarm(&config.prewarm)?;

    let mut spawner = Spawner::new(config.spawner.clone(), &pool)?;
    let started = Instant::now();
    let mut now = Duration::ZERO;
    let mut spawned = 0;
    let mut retired = 0;
    while now <= RUN_FOR {
        let report = spawner.update(now, &mut pool)?;
        spawned += report.spawned;
        retired += report.retired;
        now += FRAME;
    }

    let stats = pool.stats();
    info!(
        mode = ?config.spawner.mode,
        spawned,
        retired,
        live = spawner.live(),
        instances = pool.len(),
        created = stats.created,
        cold_acquires = stats.cold_acquires,
        reused = stats.reused,
        reuse_ratio = stats.reuse_ratio(),
        elapsed = ?started.elapsed(),
        "simulation finished"
    );
    Ok(())
}
