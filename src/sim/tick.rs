//! Per-actor simulation tick
//!
//! Advances one actor by one display frame. Velocities are tuned per nominal
//! 60 Hz frame and scaled by the real elapsed time, so the walk looks the
//! same on any refresh rate.

use rand::Rng;

use super::gesture;
use super::state::{Actor, ActorState, FleePhase, LookAround};
use crate::consts::*;
use crate::{random_sign, uniform};

/// What happened to an actor during a tick that the driver must react to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Actor started staying (neighbours may need spacing out)
    pub entered_stay: bool,
    /// Actor touched down after being airborne
    pub landed: bool,
    /// A held pointer turned into a drag
    pub drag_started: bool,
}

/// Clamp a raw frame gap into something a tick can safely integrate
pub fn sanitize_elapsed(elapsed_ms: f32) -> f32 {
    if elapsed_ms.is_finite() {
        elapsed_ms.clamp(0.0, MAX_ELAPSED_MS)
    } else {
        0.0
    }
}

/// Advance one actor by `elapsed_ms`
pub fn tick_actor(actor: &mut Actor, elapsed_ms: f32, rng: &mut impl Rng) -> TickReport {
    let dt = sanitize_elapsed(elapsed_ms);
    let scale = dt / NOMINAL_FRAME_MS;
    let mut report = TickReport {
        drag_started: advance_timers(actor, dt, rng),
        ..Default::default()
    };

    // Pointer owns the position while dragging
    if actor.is_dragging() {
        return report;
    }

    // Already launched upward (flee pop, drop hop): don't overwrite it
    if !actor.is_staying() && actor.on_ground && !actor.is_jumping() && actor.velocity.y >= 0.0 {
        start_hop(actor);
    }

    if !actor.is_staying() {
        actor.position.x += actor.velocity.x * actor.settings.walk_speed * scale;
    }

    actor.velocity.y += actor.settings.gravity * scale;
    actor.position.y += actor.velocity.y * scale;

    let was_on_ground = actor.on_ground;
    confine(actor);
    report.landed = actor.on_ground && !was_on_ground;

    if actor.state == ActorState::Walking && actor.on_ground {
        if rng.random::<f32>() < actor.settings.stay_chance {
            enter_stay(actor, rng);
            report.entered_stay = true;
        } else if report.landed && rng.random::<f32>() < actor.settings.walk_flip_chance {
            actor.velocity.x = -actor.velocity.x;
            actor.update_facing();
        }
    }

    report
}

/// Keep an actor on or above the ground and between the walls.
///
/// Landing zeroes vertical velocity; hitting a wall points horizontal
/// velocity back inward.
pub fn confine(actor: &mut Actor) {
    let rest = actor.rest_y();
    if actor.position.y >= rest {
        actor.position.y = rest;
        actor.velocity.y = 0.0;
        actor.on_ground = true;
    } else {
        actor.on_ground = false;
    }

    let (min_x, max_x) = actor.x_range();
    if actor.position.x < min_x {
        actor.position.x = min_x;
        actor.velocity.x = actor.velocity.x.abs();
    } else if actor.position.x > max_x {
        actor.position.x = max_x;
        actor.velocity.x = -actor.velocity.x.abs();
    }

    actor.update_facing();
}

/// Launch a hop and raise the jumping flag
pub fn start_hop(actor: &mut Actor) {
    actor.velocity.y = -actor.settings.jump_strength;
    actor.hop_ms = HOP_DURATION_MS;
}

/// Stop walking for a random dwell, maybe looking around meanwhile
pub fn enter_stay(actor: &mut Actor, rng: &mut impl Rng) {
    let remaining_ms = uniform(
        rng,
        actor.settings.stay_duration_min,
        actor.settings.stay_duration_max,
    );
    let look_around = plan_look_around(rng);
    log::debug!(
        "{} stays for {:.0}ms ({} look-around flips)",
        actor.identity,
        remaining_ms,
        look_around.map_or(0, |l| l.flips_left)
    );

    actor.hop_ms = 0.0;
    actor.state = ActorState::Staying {
        remaining_ms,
        look_around,
        flip_roll_ms: STAY_FLIP_PERIOD_MS,
    };
}

fn plan_look_around(rng: &mut impl Rng) -> Option<LookAround> {
    if rng.random::<f32>() >= LOOK_AROUND_CHANCE {
        return None;
    }
    let flips_left = if rng.random::<f32>() < LOOK_AROUND_SINGLE_CHANCE {
        1
    } else {
        2
    };
    Some(LookAround {
        flips_left,
        next_flip_ms: uniform(rng, 0.0, LOOK_AROUND_FIRST_DELAY_MS),
    })
}

/// Count down every timed transition. Returns true if a drag started.
fn advance_timers(actor: &mut Actor, dt: f32, rng: &mut impl Rng) -> bool {
    actor.hop_ms = (actor.hop_ms - dt).max(0.0);
    actor.drag_block_ms = (actor.drag_block_ms - dt).max(0.0);

    let held = match actor.pending_grab.as_mut() {
        Some(grab) => {
            grab.hold_ms -= dt;
            grab.hold_ms <= 0.0
        }
        None => false,
    };
    let mut drag_started = false;
    if held {
        if let Some(grab) = actor.pending_grab.take() {
            drag_started = gesture::start_drag(actor, grab.offset, grab.latest);
        }
    }

    match actor.state {
        ActorState::Staying { .. } => advance_stay(actor, dt, rng),
        ActorState::Fleeing { .. } => advance_flee(actor, dt, rng),
        ActorState::Walking | ActorState::Dragging { .. } => {}
    }

    drag_started
}

fn advance_stay(actor: &mut Actor, dt: f32, rng: &mut impl Rng) {
    let ActorState::Staying {
        remaining_ms,
        look_around,
        flip_roll_ms,
    } = &mut actor.state
    else {
        return;
    };

    *remaining_ms -= dt;
    if *remaining_ms <= 0.0 {
        log::debug!("{} resumes walking", actor.identity);
        actor.state = ActorState::Walking;
        return;
    }

    let mut flips = 0;

    if let Some(look) = look_around.as_mut() {
        look.next_flip_ms -= dt;
        if look.next_flip_ms <= 0.0 {
            flips += 1;
            look.flips_left = look.flips_left.saturating_sub(1);
            let [min, max] = actor.settings.look_around_interval;
            look.next_flip_ms = uniform(rng, min, max);
        }
    }
    if look_around.is_some_and(|l| l.flips_left == 0) {
        *look_around = None;
    }

    *flip_roll_ms -= dt;
    if *flip_roll_ms <= 0.0 {
        *flip_roll_ms += STAY_FLIP_PERIOD_MS;
        if rng.random::<f32>() < actor.settings.stay_flip_chance {
            flips += 1;
        }
    }

    if flips % 2 == 1 {
        actor.velocity.x = -actor.velocity.x;
        actor.update_facing();
    }
}

fn advance_flee(actor: &mut Actor, dt: f32, rng: &mut impl Rng) {
    let ActorState::Fleeing {
        phase,
        remaining_ms,
    } = &mut actor.state
    else {
        return;
    };

    *remaining_ms -= dt;
    if *remaining_ms > 0.0 {
        return;
    }

    match *phase {
        FleePhase::Windup { from_x } => {
            let center_x = actor.position.x + actor.size.x * 0.5;
            let direction = if from_x < center_x { 1.0 } else { -1.0 };
            *phase = FleePhase::Running;
            *remaining_ms = FLEE_RUN_MS;
            actor.velocity.x = direction * FLEE_SPEED;
            actor.update_facing();
        }
        FleePhase::Running => {
            log::debug!("{} calmed down", actor.identity);
            actor.state = ActorState::Walking;
            actor.velocity.x = random_sign(rng) * AMBIENT_SPEED;
            actor.drag_block_ms = DRAG_COOLDOWN_MS;
            actor.update_facing();
        }
    }
}
