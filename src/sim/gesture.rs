//! Pointer gestures on a single actor
//!
//! Grabbing is two-step: pointer-down arms a pending grab, and the grab
//! only becomes a drag once the pointer has been held for `DRAG_HOLD_MS`
//! (the countdown runs in the tick). A quick release disarms it.

use glam::Vec2;
use rand::Rng;

use super::state::{Actor, ActorState, FleePhase, PendingGrab};
use super::tick::confine;
use crate::consts::*;
use crate::random_sign;

/// Whether a new grab may be armed right now
pub fn can_grab(actor: &Actor) -> bool {
    actor.drag_block_ms <= 0.0 && !actor.is_fleeing() && !actor.is_dragging()
}

/// Pointer went down on the actor. Returns false if the grab was refused.
pub fn begin_grab(actor: &mut Actor, pointer: Vec2) -> bool {
    if !can_grab(actor) {
        log::debug!("{} refused grab (cooling down)", actor.identity);
        return false;
    }
    actor.pending_grab = Some(PendingGrab {
        hold_ms: DRAG_HOLD_MS,
        offset: pointer - actor.position,
        latest: pointer,
    });
    true
}

/// Commit a held grab. Called from the tick once the hold elapses.
pub(crate) fn start_drag(actor: &mut Actor, grab_offset: Vec2, latest: Vec2) -> bool {
    if !can_grab(actor) {
        return false;
    }
    log::debug!("{} picked up", actor.identity);
    actor.state = ActorState::Dragging { grab_offset };
    actor.velocity = Vec2::ZERO;
    actor.hop_ms = 0.0;
    actor.on_ground = false;
    drag_to(actor, latest);
    true
}

/// Pointer moved: follow it while dragging, or remember it while holding
pub fn drag_to(actor: &mut Actor, pointer: Vec2) {
    match actor.state {
        ActorState::Dragging { grab_offset } => {
            actor.position = pointer - grab_offset - Vec2::new(0.0, DRAG_LIFT);
        }
        _ => {
            if let Some(grab) = actor.pending_grab.as_mut() {
                grab.latest = pointer;
            }
        }
    }
}

/// Pointer released. Cancels an unfinished grab or drops a dragged actor.
pub fn release(actor: &mut Actor, rng: &mut impl Rng) {
    if actor.pending_grab.take().is_some() {
        log::trace!("{} grab cancelled (quick release)", actor.identity);
    }
    if !actor.is_dragging() {
        return;
    }

    // Dropped outside the strip: snap back inside
    let (min_x, max_x) = actor.x_range();
    let rest = actor.rest_y();
    actor.position.x = actor.position.x.clamp(min_x, max_x);
    if actor.position.y > rest || actor.position.y < actor.bounds.top {
        actor.position.y = rest;
    }

    actor.state = ActorState::Walking;
    actor.drag_block_ms = DRAG_COOLDOWN_MS;
    actor.velocity.x = random_sign(rng) * AMBIENT_SPEED;

    if actor.position.y >= rest {
        actor.position.y = rest;
        actor.on_ground = true;
        actor.velocity.y = -actor.settings.jump_strength * DROP_HOP_FACTOR;
        actor.hop_ms = HOP_DURATION_MS;
    } else {
        // Mid-air drop: fall from here
        actor.velocity.y = 0.0;
        confine(actor);
    }
    actor.update_facing();
    log::debug!(
        "{} dropped at ({:.0}, {:.0})",
        actor.identity,
        actor.position.x,
        actor.position.y
    );
}

/// Double activation at `from_x`: pop up and run the other way.
///
/// Refused while dragged or already fleeing.
pub fn flee(actor: &mut Actor, from_x: f32) -> bool {
    if actor.is_dragging() || actor.is_fleeing() {
        return false;
    }
    log::debug!("{} runs away", actor.identity);
    actor.pending_grab = None;
    actor.velocity.y = -actor.settings.jump_strength * FLEE_POP_FACTOR;
    actor.hop_ms = HOP_DURATION_MS;
    actor.drag_block_ms = DRAG_COOLDOWN_MS;
    actor.state = ActorState::Fleeing {
        phase: FleePhase::Windup { from_x },
        remaining_ms: FLEE_WINDUP_MS,
    };
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ActorSettings;
    use crate::sim::state::{ActorId, GroundBounds};
    use crate::sim::tick::tick_actor;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn actor(rng: &mut Pcg32) -> Actor {
        let mut actor = Actor::new(
            ActorId(1),
            "test",
            ActorSettings {
                stay_chance: 0.0,
                ..Default::default()
            },
            Vec2::new(20.0, 20.0),
            GroundBounds::new(0.0, 400.0, 200.0),
            rng,
        );
        actor.position.x = 100.0;
        actor
    }

    #[test]
    fn test_quick_tap_does_not_drag() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut actor = actor(&mut rng);
        assert!(begin_grab(&mut actor, Vec2::new(110.0, 190.0)));
        tick_actor(&mut actor, 100.0, &mut rng);
        release(&mut actor, &mut rng);
        tick_actor(&mut actor, 100.0, &mut rng);
        assert!(!actor.is_dragging());
        assert!(actor.pending_grab.is_none());
    }

    #[test]
    fn test_hold_starts_drag_and_follows_pointer() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut actor = actor(&mut rng);
        let origin = actor.position + Vec2::new(5.0, 5.0);
        assert!(begin_grab(&mut actor, origin));

        tick_actor(&mut actor, 100.0, &mut rng);
        assert!(!actor.is_dragging());
        let report = tick_actor(&mut actor, 60.0, &mut rng);
        assert!(report.drag_started);
        assert!(actor.is_dragging());
        assert_eq!(actor.velocity, Vec2::ZERO);

        drag_to(&mut actor, Vec2::new(250.0, 80.0));
        assert_eq!(actor.position, Vec2::new(245.0, 65.0));
    }

    #[test]
    fn test_drop_on_ground_walks_with_hop() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut actor = actor(&mut rng);
        actor.state = ActorState::Dragging {
            grab_offset: Vec2::ZERO,
        };
        drag_to(&mut actor, Vec2::new(150.0, 400.0)); // below the ground
        release(&mut actor, &mut rng);

        assert_eq!(actor.state, ActorState::Walking);
        assert_eq!(actor.position, Vec2::new(150.0, 180.0));
        assert!(actor.on_ground);
        assert!((actor.velocity.y + 2.4).abs() < 1e-6);
        assert_eq!(actor.velocity.x.abs(), AMBIENT_SPEED);
        assert_eq!(actor.drag_block_ms, DRAG_COOLDOWN_MS);
    }

    #[test]
    fn test_drop_walks_at_ambient_pace_scaled_once() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut actor = Actor::new(
            ActorId(1),
            "slow",
            ActorSettings {
                stay_chance: 0.0,
                walk_flip_chance: 0.0,
                walk_speed: 0.25,
                ..Default::default()
            },
            Vec2::new(20.0, 20.0),
            GroundBounds::new(0.0, 400.0, 200.0),
            &mut rng,
        );
        actor.state = ActorState::Dragging {
            grab_offset: Vec2::ZERO,
        };
        drag_to(&mut actor, Vec2::new(150.0, 400.0));
        release(&mut actor, &mut rng);
        assert_eq!(actor.velocity.x.abs(), AMBIENT_SPEED);

        // walk_speed applies once, in the tick
        let x = actor.position.x;
        tick_actor(&mut actor, NOMINAL_FRAME_MS, &mut rng);
        let moved = (actor.position.x - x).abs();
        assert!((moved - AMBIENT_SPEED * 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_drop_outside_strip_snaps_back() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut actor = actor(&mut rng);
        actor.state = ActorState::Dragging {
            grab_offset: Vec2::ZERO,
        };
        drag_to(&mut actor, Vec2::new(-300.0, -50.0));
        release(&mut actor, &mut rng);
        assert_eq!(actor.position, Vec2::new(0.0, 180.0));
        assert!(actor.on_ground);
    }

    #[test]
    fn test_drop_mid_air_falls() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut actor = actor(&mut rng);
        actor.state = ActorState::Dragging {
            grab_offset: Vec2::ZERO,
        };
        drag_to(&mut actor, Vec2::new(200.0, 110.0));
        release(&mut actor, &mut rng);
        assert_eq!(actor.position, Vec2::new(200.0, 100.0));
        assert!(!actor.on_ground);

        for _ in 0..200 {
            tick_actor(&mut actor, NOMINAL_FRAME_MS, &mut rng);
            if actor.on_ground {
                break;
            }
        }
        assert!(actor.on_ground);
        assert_eq!(actor.position.y, actor.rest_y());
    }

    #[test]
    fn test_grab_refused_right_after_flee() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut actor = actor(&mut rng);
        let at = actor.position;
        assert!(flee(&mut actor, 0.0));
        assert!(!begin_grab(&mut actor, at));
        assert!(!flee(&mut actor, 0.0));
    }

    #[test]
    fn test_flee_cancels_pending_grab() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut actor = actor(&mut rng);
        let at = actor.position;
        assert!(begin_grab(&mut actor, at));
        assert!(flee(&mut actor, 0.0));
        tick_actor(&mut actor, 100.0, &mut rng);
        tick_actor(&mut actor, 100.0, &mut rng);
        assert!(!actor.is_dragging());
        assert!(actor.is_fleeing());
    }
}
