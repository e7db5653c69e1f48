//! Interaction detection between resting actors
//!
//! Two resting sprites that look at each other from a short distance
//! "talk": a small cue pops up between them for a moment.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Actor, ActorId, Facing};
use crate::consts::*;

/// A detected facing pair and where its cue goes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionCue {
    /// Centre of the cue, page px
    pub position: Vec2,
    /// (left actor, right actor)
    pub pair: (ActorId, ActorId),
    /// Gap between the two front edges
    pub distance: f32,
}

/// A cue currently on screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveCue {
    pub cue: InteractionCue,
    pub remaining_ms: f32,
}

/// Find the closest pair of resting actors facing each other within the
/// interaction band. At most one pair is reported per scan.
pub fn scan(actors: &[Actor]) -> Option<InteractionCue> {
    let resting: Vec<&Actor> = actors.iter().filter(|a| a.is_staying()).collect();

    let mut best: Option<InteractionCue> = None;
    for (i, a) in resting.iter().enumerate() {
        for b in &resting[i + 1..] {
            let Some(cue) = facing_pair(a, b) else {
                continue;
            };
            if best.is_none_or(|current| cue.distance < current.distance) {
                best = Some(cue);
            }
        }
    }

    if let Some(cue) = &best {
        log::trace!(
            "actors {} and {} face each other {:.1}px apart",
            cue.pair.0.0,
            cue.pair.1.0,
            cue.distance
        );
    }
    best
}

/// Cue for two actors if the left one looks right, the right one looks
/// left, and their front edges are within the band.
fn facing_pair(a: &Actor, b: &Actor) -> Option<InteractionCue> {
    let (left, right) = if a.position.x <= b.position.x {
        (a, b)
    } else {
        (b, a)
    };
    if left.facing != Facing::Right || right.facing != Facing::Left {
        return None;
    }

    let left_front = left.front_edge();
    let right_front = right.front_edge();
    if left_front >= right_front {
        return None;
    }
    let distance = right_front - left_front;
    if !(INTERACTION_MIN_DISTANCE..=INTERACTION_MAX_DISTANCE).contains(&distance) {
        return None;
    }

    let top = left.position.y.min(right.position.y);
    Some(InteractionCue {
        position: Vec2::new((left_front + right_front) * 0.5, top - CUE_LIFT),
        pair: (left.id, right.id),
        distance,
    })
}
