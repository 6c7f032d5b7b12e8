use tracing::debug;

use super::geometry::quad_lerp;

/// Rest before wave 1, in frames.
const INITIAL_REST: f32 = 180.0;
const REST_BETWEEN_WAVES: f32 = 60.0;
/// Keeps late waves from stretching spawns out forever.
const MAX_TIME_BETWEEN_SPAWNS: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnemyKind {
    Ranged,
    Pursuer,
}

/// Round-robin spawn pattern, restarted every wave.
pub(crate) const SPAWN_QUEUE: [EnemyKind; 5] = [
    EnemyKind::Ranged,
    EnemyKind::Ranged,
    EnemyKind::Pursuer,
    EnemyKind::Ranged,
    EnemyKind::Pursuer,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaveState {
    Resting,
    Spawning,
    Waiting,
}

/// What the scheduler drives. Implemented by the simulation, which owns the
/// enemy pools.
pub(crate) trait WaveHost {
    /// Returns `false` when the pool is full. The spawn still counts.
    fn spawn_enemy(&mut self, kind: EnemyKind) -> bool;
    fn active_enemies(&self) -> usize;
    fn wave_began(&mut self, wave: u32);
    fn wave_ended(&mut self, wave: u32);
}

/// Quadratic plus a little exponential growth. Strictly increasing.
pub(crate) fn wave_population(wave: u32) -> u32 {
    let n = f64::from(wave);
    let population = 0.5 * (n + 2.0).powi(2) + 2.5 * n + 1.1_f64.powf(n).floor() - 5.0;
    population.max(0.0).round() as u32
}

/// Delay after the first spawn of `wave`. 120 for wave 1, tending to 10.
pub(crate) fn first_spawn_delay(wave: u32) -> f32 {
    (110.0 / wave.max(1) as f32 + 10.0).floor()
}

#[derive(Debug, Clone)]
pub(crate) struct WaveScheduler {
    state: WaveState,
    wave: u32,
    wave_time: f32,
    rest_remaining: f32,
    population: u32,
    spawned: u32,
    min_spawn_delay: f32,
    next_spawn_time: f32,
    queue_pos: usize,
}

impl Default for WaveScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveScheduler {
    pub(crate) fn new() -> Self {
        Self {
            state: WaveState::Resting,
            wave: 0,
            wave_time: 0.0,
            rest_remaining: INITIAL_REST,
            population: 0,
            spawned: 0,
            min_spawn_delay: 0.0,
            next_spawn_time: 0.0,
            queue_pos: 0,
        }
    }

    /// Back to before wave 1. The host's pools are its own business.
    pub(crate) fn restart(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn state(&self) -> WaveState {
        self.state
    }

    pub(crate) fn wave(&self) -> u32 {
        self.wave
    }

    pub(crate) fn population(&self) -> u32 {
        self.population
    }

    pub(crate) fn spawned(&self) -> u32 {
        self.spawned
    }

    pub(crate) fn update(&mut self, dt: f32, host: &mut dyn WaveHost) {
        match self.state {
            WaveState::Resting => {
                self.rest_remaining -= dt;
                if self.rest_remaining <= 0.0 {
                    self.begin_next_wave(host);
                }
            }
            WaveState::Spawning => self.update_spawning(dt, host),
            WaveState::Waiting => {
                self.wave_time += dt;
                if host.active_enemies() == 0 {
                    self.state = WaveState::Resting;
                    self.rest_remaining = REST_BETWEEN_WAVES;
                    debug!(wave = self.wave, "wave_finished");
                    host.wave_ended(self.wave);
                }
            }
        }
    }

    fn begin_next_wave(&mut self, host: &mut dyn WaveHost) {
        self.wave += 1;
        host.wave_began(self.wave);
        self.wave_time = 0.0;
        self.next_spawn_time = 0.0;
        self.queue_pos = 0;
        self.population = wave_population(self.wave);
        self.spawned = 0;
        self.min_spawn_delay = first_spawn_delay(self.wave);
        self.state = WaveState::Spawning;
        debug!(
            wave = self.wave,
            population = self.population,
            min_spawn_delay = self.min_spawn_delay,
            "wave_scheduled"
        );
    }

    fn update_spawning(&mut self, dt: f32, host: &mut dyn WaveHost) {
        self.wave_time += dt;
        while self.wave_time >= self.next_spawn_time && self.spawned < self.population {
            let kind = SPAWN_QUEUE[self.queue_pos];
            if !host.spawn_enemy(kind) {
                debug!(wave = self.wave, kind = ?kind, "spawn_skipped_pool_full");
            }
            self.next_spawn_time += quad_lerp(
                self.spawned as f32,
                self.population.saturating_sub(1) as f32,
                self.min_spawn_delay,
                MAX_TIME_BETWEEN_SPAWNS,
            );
            self.queue_pos = (self.queue_pos + 1) % SPAWN_QUEUE.len();
            self.spawned += 1;
        }
        if self.spawned >= self.population {
            self.state = WaveState::Waiting;
        }
    }
}
