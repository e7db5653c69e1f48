//! Pairwise separation between actors
//!
//! Two concerns live here: soft avoidance between actors that opt in
//! (pushes overlapping sprites apart along the line between them), and
//! stay spacing (a sprite that stops right next to another resting one
//! shuffles over by a body width).

use glam::Vec2;
use rand::Rng;

use super::state::Actor;
use super::tick::confine;
use crate::consts::AVOID_RADIUS_FACTOR;
use crate::random_sign;

/// Below this distance two actors count as stacked on top of each other
const COINCIDENT_EPSILON: f32 = 1e-4;

/// Borrow two distinct actors mutably
fn pair_mut(actors: &mut [Actor], a: usize, b: usize) -> (&mut Actor, &mut Actor) {
    debug_assert_ne!(a, b);
    if a < b {
        let (head, tail) = actors.split_at_mut(b);
        (&mut head[a], &mut tail[0])
    } else {
        let (head, tail) = actors.split_at_mut(a);
        (&mut tail[0], &mut head[b])
    }
}

/// Whether avoidance applies between two actors
fn avoids(me: &Actor, other: &Actor) -> bool {
    me.settings.avoid_collision
        && other.settings.avoid_collision
        && !me.is_dragging()
        && !other.is_dragging()
}

/// Push the actor at `index` and every overlapping neighbour apart.
///
/// Each side takes half the penetration, then both are re-confined to the
/// ground strip. Returns how many neighbours were pushed.
pub fn separate(actors: &mut [Actor], index: usize) -> usize {
    if index >= actors.len() {
        return 0;
    }
    let mut pushed = 0;

    for other in 0..actors.len() {
        if other == index {
            continue;
        }
        let (me, them) = pair_mut(actors, index, other);
        if !avoids(me, them) {
            continue;
        }

        let radius = me.size.x * AVOID_RADIUS_FACTOR;
        let delta = me.position - them.position;
        let distance = delta.length();
        if distance >= radius {
            continue;
        }

        let normal = if distance > COINCIDENT_EPSILON {
            delta / distance
        } else {
            Vec2::X
        };
        let push = normal * (radius - distance) * 0.5;
        me.position += push;
        them.position -= push;
        confine(me);
        confine(them);
        pushed += 1;
    }

    if pushed > 0 {
        log::trace!("{} pushed {} neighbour(s)", actors[index].identity, pushed);
    }
    pushed
}

/// Shuffle a freshly resting actor away from other resting actors.
///
/// For each other Staying actor within `width * stay_spacing`, the actor
/// steps one body width left or right at random. Returns the number of
/// nudges applied.
pub fn space_out(actors: &mut [Actor], index: usize, rng: &mut impl Rng) -> usize {
    let Some(me) = actors.get(index) else {
        return 0;
    };
    let width = me.size.x;
    let reach = width * me.settings.stay_spacing;
    if reach <= 0.0 {
        return 0;
    }

    let x = me.position.x;
    let crowded = actors
        .iter()
        .enumerate()
        .filter(|(i, other)| {
            *i != index && other.is_staying() && (other.position.x - x).abs() < reach
        })
        .count();

    let me = &mut actors[index];
    for _ in 0..crowded {
        me.position.x += random_sign(rng) * width;
    }
    if crowded > 0 {
        confine(me);
        log::debug!(
            "{} shuffled over ({} resting neighbour(s))",
            me.identity,
            crowded
        );
    }
    crowded
}
