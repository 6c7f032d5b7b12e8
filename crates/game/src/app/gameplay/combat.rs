use rand::rngs::SmallRng;

use super::body::{Collidable, Positioned};
use super::character::{DamageOutcome, Damageable, Hit};
use super::hazard::Boulder;
use super::player::Player;
use super::pool::{EntityPool, Poolable};
use super::projectile::Projectile;
use super::pursuer::Pursuer;
use super::ranged::RangedEnemy;

pub(crate) const KILL_SCORE: u32 = 1;

/// Everything that can trade blows in one frame, borrowed from the simulation.
pub(crate) struct Combatants<'a> {
    pub(crate) player: &'a mut Player,
    pub(crate) pursuers: &'a mut EntityPool<Pursuer>,
    pub(crate) ranged: &'a mut EntityPool<RangedEnemy>,
    pub(crate) boulder: &'a mut Boulder,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct CombatReport {
    /// Credited once per landed hit, not per defeat.
    pub(crate) score: u32,
    pub(crate) player_outcomes: Vec<DamageOutcome>,
}

impl CombatReport {
    fn player_hit(&mut self, outcome: DamageOutcome) {
        if outcome != DamageOutcome::Ignored {
            self.player_outcomes.push(outcome);
        }
    }
}

/// Bullets that touch a vulnerable player hurt it and are spent.
pub(crate) fn resolve_projectiles(
    player: &mut Player,
    projectiles: &mut EntityPool<Projectile>,
    rng: &mut SmallRng,
) -> Vec<DamageOutcome> {
    let mut outcomes = Vec::new();
    for shot in projectiles.iter_mut() {
        if shot.is_inactive() || !player.is_vulnerable() || !shot.overlaps(&*player) {
            continue;
        }
        let outcome = player.take_damage(Hit::from_body(shot.body()), rng);
        shot.deactivate();
        if outcome != DamageOutcome::Ignored {
            outcomes.push(outcome);
        }
    }
    outcomes
}

/// Runs the melee and boulder rules on post-constraint positions.
pub(crate) fn resolve(combatants: Combatants<'_>, rng: &mut SmallRng) -> CombatReport {
    let Combatants {
        player,
        pursuers,
        ranged,
        boulder,
    } = combatants;
    let mut report = CombatReport::default();

    if player.is_dashing() || player.is_huge_and_moving() {
        let hit = Hit::from_body(player.body());
        for enemy in ranged.iter_mut() {
            if enemy.is_vulnerable() && player.overlaps(&*enemy) {
                enemy.take_damage(hit, rng);
                report.score += KILL_SCORE;
            }
        }
        for pursuer in pursuers.iter_mut() {
            if pursuer.is_vulnerable() && player.overlaps(&*pursuer) {
                pursuer.take_damage(hit, rng);
                report.score += KILL_SCORE;
            }
        }
        if !boulder.is_inactive() && !boulder.is_moving_quick() && player.overlaps(&*boulder) {
            boulder.take_damage(hit);
        }
    } else if player.is_vulnerable() {
        for pursuer in pursuers.iter() {
            if !player.is_vulnerable() {
                break;
            }
            if pursuer.can_damage() && player.overlaps(pursuer) {
                let outcome = player.take_damage(Hit::from_body(pursuer.body()), rng);
                report.player_hit(outcome);
            }
        }
    }

    if !boulder.is_inactive() && boulder.is_moving_quick() {
        let hit = Hit::from_body(boulder.body());
        for enemy in ranged.iter_mut() {
            if enemy.is_vulnerable() && boulder.overlaps(&*enemy) {
                enemy.take_damage(hit, rng);
                report.score += KILL_SCORE;
            }
        }
        for pursuer in pursuers.iter_mut() {
            if pursuer.is_vulnerable() && boulder.overlaps(&*pursuer) {
                pursuer.take_damage(hit, rng);
                report.score += KILL_SCORE;
            }
        }
        if player.is_vulnerable() && boulder.overlaps(&*player) {
            let outcome = player.take_damage(hit.knockback_only(), rng);
            report.player_hit(outcome);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use engine::Vec2;
    use rand::SeedableRng;

    use super::*;
    use crate::app::gameplay::geometry::Bounds;

    fn arena() -> Bounds {
        Bounds {
            min_x: 32.0,
            max_x: 480.0,
            min_y: 32.0,
            max_y: 480.0,
        }
    }

    fn landed_player(at: Vec2) -> Player {
        let mut player = Player::new(5);
        player.init(at);
        while !player.is_active() {
            player.update(1.0);
            player.post_update(1.0);
        }
        player
    }

    fn landed_pursuer(pool: &mut EntityPool<Pursuer>, at: Vec2, rng: &mut SmallRng) {
        let Some(pursuer) = pool.spawn(rng) else {
            panic!("pool refused spawn");
        };
        let far = Vec2::new(10_000.0, 10_000.0);
        while !pursuer.is_vulnerable() {
            pursuer.update(1.0, far, rng);
            pursuer.post_update(1.0, &arena());
        }
        pursuer.body_mut().position = at;
        pursuer.body_mut().velocity = Vec2::ZERO;
    }

    fn pools() -> (EntityPool<Pursuer>, EntityPool<RangedEnemy>) {
        (
            EntityPool::new(|| Pursuer::new(arena().inset(50.0)), None),
            EntityPool::new(RangedEnemy::new, None),
        )
    }

    #[test]
    fn dashing_player_hits_overlapping_pursuer_and_scores() {
        let mut rng = SmallRng::seed_from_u64(21);
        let mut player = landed_player(Vec2::new(200.0, 200.0));
        let (mut pursuers, mut ranged) = pools();
        landed_pursuer(&mut pursuers, Vec2::new(205.0, 200.0), &mut rng);
        let mut boulder = Boulder::new();

        for _ in 0..90 {
            player.update(1.0);
        }
        assert!(player.attempt_dash());

        let report = resolve(
            Combatants {
                player: &mut player,
                pursuers: &mut pursuers,
                ranged: &mut ranged,
                boulder: &mut boulder,
            },
            &mut rng,
        );
        assert_eq!(report.score, KILL_SCORE);
        assert!(report.player_outcomes.is_empty());
        assert!(pursuers.iter().all(|pursuer| !pursuer.is_vulnerable()));
    }

    #[test]
    fn walking_player_is_not_hurt_by_uncharged_pursuer() {
        let mut rng = SmallRng::seed_from_u64(22);
        let mut player = landed_player(Vec2::new(200.0, 200.0));
        let (mut pursuers, mut ranged) = pools();
        landed_pursuer(&mut pursuers, Vec2::new(200.0, 200.0), &mut rng);
        let mut boulder = Boulder::new();

        let report = resolve(
            Combatants {
                player: &mut player,
                pursuers: &mut pursuers,
                ranged: &mut ranged,
                boulder: &mut boulder,
            },
            &mut rng,
        );
        assert_eq!(report, CombatReport::default());
        assert_eq!(player.health().current(), 5);
    }

    #[test]
    fn charged_pursuer_hurts_player_once_per_frame() {
        let mut rng = SmallRng::seed_from_u64(23);
        let spot = Vec2::new(200.0, 200.0);
        let mut player = landed_player(spot);
        let (mut pursuers, mut ranged) = pools();
        landed_pursuer(&mut pursuers, spot, &mut rng);
        landed_pursuer(&mut pursuers, spot, &mut rng);
        for pursuer in pursuers.iter_mut() {
            for _ in 0..120 {
                pursuer.body_mut().position = spot;
                pursuer.update(1.0, spot, &mut rng);
            }
            assert!(pursuer.can_damage());
        }
        let mut boulder = Boulder::new();

        let report = resolve(
            Combatants {
                player: &mut player,
                pursuers: &mut pursuers,
                ranged: &mut ranged,
                boulder: &mut boulder,
            },
            &mut rng,
        );
        assert_eq!(report.player_outcomes, vec![DamageOutcome::Hurt]);
        assert_eq!(player.health().current(), 4);
    }

    #[test]
    fn fast_boulder_only_knocks_player_back() {
        let mut rng = SmallRng::seed_from_u64(24);
        let spot = Vec2::new(200.0, 200.0);
        let mut player = landed_player(spot);
        let (mut pursuers, mut ranged) = pools();
        let mut boulder = Boulder::new();
        boulder.init(spot);
        while !boulder.body().is_grounded() {
            boulder.update(1.0);
            boulder.post_update(1.0, &arena());
        }
        boulder.body_mut().position = spot;
        boulder.take_damage(Hit {
            source_velocity: Vec2::new(10.0, 0.0),
            hurts: true,
        });
        boulder.update(1.0);
        assert!(boulder.is_moving_quick());

        let report = resolve(
            Combatants {
                player: &mut player,
                pursuers: &mut pursuers,
                ranged: &mut ranged,
                boulder: &mut boulder,
            },
            &mut rng,
        );
        assert_eq!(report.player_outcomes, vec![DamageOutcome::Knocked]);
        assert_eq!(player.health().current(), 5);
        assert!(player.body().velocity.x > 9.0);
    }

    #[test]
    fn projectile_is_spent_on_vulnerable_player() {
        let mut rng = SmallRng::seed_from_u64(25);
        let spot = Vec2::new(200.0, 200.0);
        let mut player = landed_player(spot);
        let mut projectiles = EntityPool::new(Projectile::new, None);
        if let Some(shot) = projectiles.spawn(&mut rng) {
            shot.launch(spot, Vec2::new(5.0, 0.0));
        }

        let outcomes = resolve_projectiles(&mut player, &mut projectiles, &mut rng);
        assert_eq!(outcomes, vec![DamageOutcome::Hurt]);
        assert_eq!(projectiles.num_active_instances(), 0);

        let again = resolve_projectiles(&mut player, &mut projectiles, &mut rng);
        assert!(again.is_empty());
    }
}
