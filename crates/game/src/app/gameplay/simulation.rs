use engine::{RenderItem, RenderLayer, Vec2};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info};

use super::body::{Collidable, Positioned};
use super::character::DamageOutcome;
use super::combat::{self, Combatants};
use super::events::{Ending, GameEvent, SpeechLine};
use super::geometry::{rand_pos_away_from, rand_range, Bounds};
use super::hazard::Boulder;
use super::pickup::{Carrot, CarrotKind, PickupArbiter, PickupDecision};
use super::player::Player;
use super::pool::EntityPool;
use super::projectile::Projectile;
use super::pursuer::Pursuer;
use super::ranged::RangedEnemy;
use super::score::Scoreboard;
use super::treasure::Treasure;
use super::waves::{EnemyKind, WaveHost, WaveScheduler};

const OPENING_LINE: SpeechLine = SpeechLine::normal("What a fine day.");
const FIRST_WAVE_LINE: SpeechLine = SpeechLine::normal("!!!!!!!!!!");
const TREASURE_SPOT: Vec2 = Vec2::new(420.0, 240.0);
/// The boulder drops in when this wave begins.
const BOULDER_WAVE: u32 = 5;
const POWER_CARROT_WAVE: u32 = 1;
const CAMERA_OFFSET_PER_SCALE: f32 = 40.0;

/// Arena geometry and population tuning for one game.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SimSettings {
    pub(crate) arena: Bounds,
    /// Pursuers wander inside the arena shrunk by this much.
    pub(crate) wander_margin: f32,
    pub(crate) spawn_min: i32,
    pub(crate) spawn_max: i32,
    pub(crate) min_spawn_distance: f32,
    pub(crate) pickup_min: i32,
    pub(crate) pickup_max: i32,
    pub(crate) enemy_population_limit: usize,
    pub(crate) player_max_health: i32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            arena: Bounds {
                min_x: 32.0,
                max_x: 480.0,
                min_y: 32.0,
                max_y: 480.0,
            },
            wander_margin: 50.0,
            spawn_min: 80,
            spawn_max: 440,
            min_spawn_distance: 210.0,
            pickup_min: 56,
            pickup_max: 456,
            enemy_population_limit: 50,
            player_max_health: 5,
        }
    }
}

/// One frame of player control, already mapped to world space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct PlayerIntent {
    pub(crate) move_dir: Vec2,
    /// World point to dash toward. `None` keeps the previous aim.
    pub(crate) dash_target: Option<Vec2>,
    pub(crate) primary_held: bool,
}

/// The whole arena: every entity, the wave schedule, score and the RNG that
/// feeds all of them.
pub(crate) struct Simulation {
    settings: SimSettings,
    rng: SmallRng,
    player: Player,
    pursuers: EntityPool<Pursuer>,
    ranged: EntityPool<RangedEnemy>,
    projectiles: EntityPool<Projectile>,
    carrots: EntityPool<Carrot>,
    boulder: Boulder,
    treasure: Treasure,
    waves: WaveScheduler,
    scoreboard: Scoreboard,
    ending: Option<Ending>,
    frame: u64,
    events: Vec<GameEvent>,
}

impl Simulation {
    pub(crate) fn new(settings: SimSettings, seed: u64) -> Self {
        let wander = settings.arena.inset(settings.wander_margin);
        let limit = Some(settings.enemy_population_limit);
        let mut simulation = Self {
            rng: SmallRng::seed_from_u64(seed),
            player: Player::new(settings.player_max_health),
            pursuers: EntityPool::new(move || Pursuer::new(wander), limit),
            ranged: EntityPool::new(RangedEnemy::new, limit),
            projectiles: EntityPool::new(Projectile::new, None),
            carrots: EntityPool::new(Carrot::new, None),
            boulder: Boulder::new(),
            treasure: Treasure::new(TREASURE_SPOT),
            waves: WaveScheduler::new(),
            scoreboard: Scoreboard::default(),
            ending: None,
            frame: 0,
            events: Vec::new(),
            settings,
        };
        simulation.restart();
        simulation
    }

    /// Fresh game. Keeps pool storage and the best score.
    pub(crate) fn restart(&mut self) {
        self.pursuers.restart();
        self.ranged.restart();
        self.projectiles.restart();
        self.carrots.restart();
        self.waves.restart();
        self.boulder.deactivate();
        self.treasure.place(TREASURE_SPOT);
        self.scoreboard.restart();
        self.ending = None;
        self.frame = 0;
        self.events.clear();
        self.player.init(self.settings.arena.center());
        self.events.push(GameEvent::Speech(OPENING_LINE));
        info!(
            high_score = self.scoreboard.high_score(),
            "simulation_restarted"
        );
    }

    pub(crate) fn tick(&mut self, dt: f32, intent: PlayerIntent) {
        self.frame += 1;
        self.check_ending();
        self.update_player(dt, intent);
        self.update_entities(dt);
        self.post_update_entities(dt);
        self.treasure.post_update(dt);
        self.resolve_combat();
        self.update_waves(dt);
    }

    pub(crate) fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn ending(&self) -> Option<Ending> {
        self.ending
    }

    pub(crate) fn score(&self) -> u32 {
        self.scoreboard.score()
    }

    pub(crate) fn high_score(&self) -> u32 {
        self.scoreboard.high_score()
    }

    /// True once the game is decided and the score stops counting.
    pub(crate) fn score_frozen(&self) -> bool {
        self.scoreboard.is_frozen()
    }

    pub(crate) fn wave(&self) -> u32 {
        self.waves.wave()
    }

    pub(crate) fn frame(&self) -> u64 {
        self.frame
    }

    pub(crate) fn player(&self) -> &Player {
        &self.player
    }

    pub(crate) fn active_enemies(&self) -> usize {
        self.pursuers.num_active_instances() + self.ranged.num_active_instances()
    }

    /// Camera centre: the player, lifted by its current size.
    pub(crate) fn camera_focus(&self) -> (Vec2, f32) {
        let offset = self.player.body().scale() * CAMERA_OFFSET_PER_SCALE;
        (self.player.position(), offset)
    }

    /// Writes one item per visible entity. Sorting is left to the caller.
    pub(crate) fn render_into(&self, layer: &mut RenderLayer) {
        self.treasure.render(layer);
        for carrot in self.carrots.iter_live() {
            carrot.render(layer);
        }
        self.boulder.render(layer);
        for pursuer in self.pursuers.iter() {
            pursuer.render(layer);
        }
        for enemy in self.ranged.iter() {
            enemy.render(layer);
        }
        for shot in self.projectiles.iter_live() {
            shot.render(layer);
        }
        self.player.render(layer);
        if self.ending.is_some() {
            let (focus, _) = self.camera_focus();
            layer.push(RenderItem {
                draw_order: f32::MAX,
                ..RenderItem::new("ending_banner", focus)
            });
        }
    }

    fn check_ending(&mut self) {
        if self.ending.is_some() {
            return;
        }
        let ending = if !self.player.is_active() && self.player.health().current() <= 0 {
            Ending::Lose
        } else if self.player.has_won() {
            Ending::Win
        } else {
            return;
        };
        self.ending = Some(ending);
        info!(
            ending = ?ending,
            score = self.scoreboard.score(),
            score_frozen = self.scoreboard.is_frozen(),
            wave = self.waves.wave(),
            frame = self.frame,
            "game_over"
        );
        self.events.push(GameEvent::Ending(ending));
    }

    fn update_waves(&mut self, dt: f32) {
        let Self {
            settings,
            rng,
            player,
            pursuers,
            ranged,
            carrots,
            boulder,
            waves,
            events,
            ..
        } = self;
        let mut host = ArenaHost {
            settings,
            rng,
            player_position: player.position(),
            pursuers,
            ranged,
            carrots,
            boulder,
            events,
        };
        waves.update(dt, &mut host);
    }

    fn update_player(&mut self, dt: f32, intent: PlayerIntent) {
        self.player.set_move_input(intent.move_dir);
        if let Some(line) = self.player.update(dt) {
            self.events.push(GameEvent::Speech(line));
        }
        if let Some(target) = intent.dash_target {
            let relative = target - self.player.position();
            self.player.set_dash_dest(relative);
        }
        if intent.primary_held && self.player.attempt_dash() {
            debug!(frame = self.frame, "dash_launched");
        }
    }

    fn update_entities(&mut self, dt: f32) {
        let target = self.player.position();
        self.boulder.update(dt);
        for enemy in self.ranged.iter_mut() {
            let Some(shot) = enemy.update(dt, target, &mut self.rng) else {
                continue;
            };
            match self.projectiles.spawn(&mut self.rng) {
                Some(projectile) => projectile.launch(shot.origin, shot.velocity),
                None => debug!("projectile_pool_exhausted"),
            }
        }
        for pursuer in self.pursuers.iter_mut() {
            pursuer.update(dt, target, &mut self.rng);
        }
        for shot in self.projectiles.iter_mut() {
            shot.update(dt);
        }
        let mut judge = CarrotJudge {
            player: &mut self.player,
        };
        for carrot in self.carrots.iter_mut() {
            carrot.update(dt, target, &mut judge);
        }
    }

    /// Integrates velocity and clamps everything to the arena.
    fn post_update_entities(&mut self, dt: f32) {
        let arena = self.settings.arena;
        self.player.post_update(dt);
        self.player.body_mut().constrain_to_bounds(&arena);
        self.boulder.post_update(dt, &arena);

        for shot in self.projectiles.iter_mut() {
            shot.post_update(dt);
        }
        for enemy in self.ranged.iter_mut() {
            enemy.post_update(dt, &arena);
        }
        for pursuer in self.pursuers.iter_mut() {
            pursuer.post_update(dt, &arena);
        }

        let player_active = self.player.is_active();
        let below_max = self.player.health().is_below_max();
        for carrot in self.carrots.iter_mut() {
            carrot.post_update(dt);
            if !player_active || !carrot.can_pick_up() || !carrot.overlaps(&self.player) {
                continue;
            }
            if carrot.kind() == CarrotKind::Power || below_max {
                carrot.pick_up();
            }
        }
    }

    /// Runs on post-constraint positions only.
    fn resolve_combat(&mut self) {
        let outcomes =
            combat::resolve_projectiles(&mut self.player, &mut self.projectiles, &mut self.rng);
        for outcome in outcomes {
            self.on_player_hit(outcome);
        }

        let report = combat::resolve(
            Combatants {
                player: &mut self.player,
                pursuers: &mut self.pursuers,
                ranged: &mut self.ranged,
                boulder: &mut self.boulder,
            },
            &mut self.rng,
        );
        if report.score > 0 && self.scoreboard.add(report.score) {
            self.events.push(GameEvent::ScoreAdded {
                amount: report.score,
                total: self.scoreboard.score(),
            });
        }
        for outcome in report.player_outcomes {
            self.on_player_hit(outcome);
        }
    }

    fn on_player_hit(&mut self, outcome: DamageOutcome) {
        match outcome {
            DamageOutcome::PowerActivated => {
                self.scoreboard.freeze();
                self.events.push(GameEvent::PowerActivated);
            }
            DamageOutcome::Defeated => self.scoreboard.freeze(),
            DamageOutcome::Ignored | DamageOutcome::Knocked | DamageOutcome::Hurt => {}
        }
        debug!(
            outcome = ?outcome,
            health = self.player.health().current(),
            "player_hit"
        );
    }
}

/// Decides finished carrot pickups against the player's health.
struct CarrotJudge<'a> {
    player: &'a mut Player,
}

impl PickupArbiter for CarrotJudge<'_> {
    fn decide(&mut self, kind: CarrotKind) -> PickupDecision {
        if self.player.health().current() <= 0 {
            return PickupDecision::Reject;
        }
        match kind {
            CarrotKind::Power => {
                self.player.health_mut().power_up();
                self.player.power_up();
                debug!("power_carrot_eaten");
                PickupDecision::Confirm
            }
            CarrotKind::Normal if self.player.health().is_below_max() => {
                self.player.health_mut().add(1);
                PickupDecision::Confirm
            }
            CarrotKind::Normal => PickupDecision::Reject,
        }
    }
}

/// The simulation as seen by the wave scheduler.
struct ArenaHost<'a> {
    settings: &'a SimSettings,
    rng: &'a mut SmallRng,
    player_position: Vec2,
    pursuers: &'a mut EntityPool<Pursuer>,
    ranged: &'a mut EntityPool<RangedEnemy>,
    carrots: &'a mut EntityPool<Carrot>,
    boulder: &'a mut Boulder,
    events: &'a mut Vec<GameEvent>,
}

impl ArenaHost<'_> {
    fn drop_carrot(&mut self, kind: CarrotKind) {
        let (min, max) = (self.settings.pickup_min, self.settings.pickup_max);
        let position = Vec2::new(
            rand_range(&mut *self.rng, min, max) as f32,
            rand_range(&mut *self.rng, min, max) as f32,
        );
        if let Some(carrot) = self.carrots.spawn(&mut *self.rng) {
            carrot.place(kind, position);
            debug!(kind = ?kind, x = position.x, y = position.y, "carrot_dropped");
        }
    }
}

impl WaveHost for ArenaHost<'_> {
    fn spawn_enemy(&mut self, kind: EnemyKind) -> bool {
        let settings = self.settings;
        let position = rand_pos_away_from(
            &mut *self.rng,
            settings.spawn_min,
            settings.spawn_max,
            self.player_position,
            settings.min_spawn_distance * settings.min_spawn_distance,
        );
        let body = match kind {
            EnemyKind::Pursuer => self
                .pursuers
                .spawn(&mut *self.rng)
                .map(|pursuer| pursuer.body_mut()),
            EnemyKind::Ranged => self.ranged.spawn(&mut *self.rng).map(|enemy| enemy.body_mut()),
        };
        let Some(body) = body else {
            return false;
        };
        body.position = position;
        body.refresh_draw_order();
        true
    }

    fn active_enemies(&self) -> usize {
        self.pursuers.num_active_instances() + self.ranged.num_active_instances()
    }

    fn wave_began(&mut self, wave: u32) {
        self.events.push(GameEvent::WaveLabel(wave));
        if wave == POWER_CARROT_WAVE {
            self.events.push(GameEvent::Speech(FIRST_WAVE_LINE));
            self.drop_carrot(CarrotKind::Power);
        }
        if wave == BOULDER_WAVE {
            self.boulder.init(self.settings.arena.center());
            info!(wave, "boulder_dropped");
        }
    }

    fn wave_ended(&mut self, wave: u32) {
        self.events.push(GameEvent::WaveCleared(wave));
        self.drop_carrot(CarrotKind::Normal);
    }
}

#[cfg(test)]
impl Simulation {
    pub(crate) fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub(crate) fn carrots(&self) -> &EntityPool<Carrot> {
        &self.carrots
    }

    pub(crate) fn boulder(&self) -> &Boulder {
        &self.boulder
    }

    pub(crate) fn waves(&self) -> &WaveScheduler {
        &self.waves
    }

    pub(crate) fn projectiles(&self) -> &EntityPool<Projectile> {
        &self.projectiles
    }

    pub(crate) fn launch_projectile(&mut self, origin: Vec2, velocity: Vec2) {
        if let Some(shot) = self.projectiles.spawn(&mut self.rng) {
            shot.launch(origin, velocity);
        }
    }

    pub(crate) fn drop_carrot_at(&mut self, kind: CarrotKind, position: Vec2) {
        if let Some(carrot) = self.carrots.spawn(&mut self.rng) {
            carrot.place(kind, position);
        }
    }

    /// Hurts the player as if something with `source_velocity` hit it.
    pub(crate) fn hit_player(&mut self, source_velocity: Vec2) -> DamageOutcome {
        use super::character::{Damageable, Hit};

        let outcome = self.player.take_damage(
            Hit {
                source_velocity,
                hurts: true,
            },
            &mut self.rng,
        );
        self.on_player_hit(outcome);
        outcome
    }
}
