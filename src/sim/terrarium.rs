//! The actor registry and its single driver
//!
//! A [`Terrarium`] owns every actor on the page, the seeded RNG and the
//! simulation clock. The host calls [`Terrarium::step`] once per animation
//! frame and forwards pointer events to the `pointer_*`/`tap` methods.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::{separate, space_out};
use super::gesture;
use super::interaction::{ActiveCue, InteractionCue, scan};
use super::state::{Actor, ActorId, GroundBounds};
use super::tick::{confine, sanitize_elapsed, tick_actor};
use crate::consts::*;
use crate::settings::ActorSettings;

/// Every actor sharing one ground strip
#[derive(Debug, Clone)]
pub struct Terrarium {
    rng: Pcg32,
    /// Simulation clock, ms since creation
    time_ms: f64,
    /// Ordered by spawn; ids are never reused
    actors: Vec<Actor>,
    next_id: u32,
    /// Actor the pointer went down on, until it comes back up
    pointer_target: Option<ActorId>,
    /// Last tap: (actor, clock time)
    last_tap: Option<(ActorId, f64)>,
    cue: Option<ActiveCue>,
}

impl Terrarium {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            time_ms: 0.0,
            actors: Vec::new(),
            next_id: 1,
            pointer_target: None,
            last_tap: None,
            cue: None,
        }
    }

    /// Add an actor standing somewhere on the ground
    pub fn spawn(
        &mut self,
        identity: &str,
        settings: ActorSettings,
        size: Vec2,
        bounds: GroundBounds,
    ) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        let settings = settings.validated(identity);
        let actor = Actor::new(id, identity, settings, size, bounds, &mut self.rng);
        log::info!(
            "{} spawned as #{} at ({:.0}, {:.0})",
            identity,
            id.0,
            actor.position.x,
            actor.position.y
        );
        self.actors.push(actor);
        id
    }

    /// Remove an actor; its timers go with it
    pub fn despawn(&mut self, id: ActorId) -> Option<Actor> {
        let index = self.index_of(id)?;
        if self.pointer_target == Some(id) {
            self.pointer_target = None;
        }
        if self.last_tap.is_some_and(|(tapped, _)| tapped == id) {
            self.last_tap = None;
        }
        if self.cue.is_some_and(|c| c.cue.pair.0 == id || c.cue.pair.1 == id) {
            self.cue = None;
        }
        let actor = self.actors.remove(index);
        log::info!("{} (#{}) removed", actor.identity, id.0);
        Some(actor)
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    fn index_of(&self, id: ActorId) -> Option<usize> {
        self.actors.iter().position(|a| a.id == id)
    }

    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    /// The interaction cue currently on screen, if any
    pub fn cue(&self) -> Option<&ActiveCue> {
        self.cue.as_ref()
    }

    /// The ground moved or resized: re-confine everyone not in hand
    pub fn set_ground(&mut self, bounds: GroundBounds) {
        log::debug!(
            "ground now x {:.0}..{:.0}, y {:.0}",
            bounds.left,
            bounds.right(),
            bounds.ground_y
        );
        for actor in &mut self.actors {
            actor.bounds = bounds;
            if !actor.is_dragging() {
                confine(actor);
            }
        }
    }

    /// The sprite's displayed size changed (image loaded, zoom)
    pub fn resize_actor(&mut self, id: ActorId, size: Vec2) -> bool {
        let Some(actor) = self.actor_mut(id) else {
            return false;
        };
        actor.size = size;
        if !actor.is_dragging() {
            confine(actor);
        }
        true
    }

    /// Advance every actor by one frame.
    ///
    /// Returns the interaction detected this frame, if any; it also becomes
    /// the active cue for `CUE_DURATION_MS`.
    pub fn step(&mut self, elapsed_ms: f32) -> Option<InteractionCue> {
        let dt = sanitize_elapsed(elapsed_ms);
        self.time_ms += f64::from(dt);

        for index in 0..self.actors.len() {
            let report = tick_actor(&mut self.actors[index], dt, &mut self.rng);
            if report.entered_stay {
                space_out(&mut self.actors, index, &mut self.rng);
            }
            if !self.actors[index].is_dragging() {
                separate(&mut self.actors, index);
            }
        }

        if let Some(active) = self.cue.as_mut() {
            active.remaining_ms -= dt;
        }
        if self.cue.is_some_and(|c| c.remaining_ms <= 0.0) {
            self.cue = None;
        }

        let found = scan(&self.actors);
        if let Some(cue) = found {
            if self.cue.is_none() {
                log::debug!("actors {} and {} interact", cue.pair.0.0, cue.pair.1.0);
            }
            self.cue = Some(ActiveCue {
                cue,
                remaining_ms: CUE_DURATION_MS,
            });
        }
        found
    }

    /// Pointer went down on `id`. Returns false if the actor is unknown or
    /// refuses to be picked up right now.
    pub fn pointer_down(&mut self, id: ActorId, at: Vec2) -> bool {
        // A second pointer takes over: let go of whatever the first one held
        if let Some(previous) = self.pointer_target.filter(|&p| p != id) {
            self.pointer_target = None;
            if let Some(index) = self.index_of(previous) {
                gesture::release(&mut self.actors[index], &mut self.rng);
            }
        }
        let Some(actor) = self.actor_mut(id) else {
            return false;
        };
        if !gesture::begin_grab(actor, at) {
            return false;
        }
        self.pointer_target = Some(id);
        true
    }

    /// Pointer moved anywhere on the page
    pub fn pointer_move(&mut self, at: Vec2) {
        let Some(id) = self.pointer_target else {
            return;
        };
        if let Some(actor) = self.actor_mut(id) {
            gesture::drag_to(actor, at);
        }
    }

    /// Pointer came up (or left the page)
    pub fn pointer_up(&mut self, at: Vec2) {
        let Some(id) = self.pointer_target.take() else {
            return;
        };
        let Some(index) = self.index_of(id) else {
            return;
        };
        let actor = &mut self.actors[index];
        gesture::drag_to(actor, at);
        gesture::release(actor, &mut self.rng);
    }

    /// Double click (or double tap) on `id` at `at`: the actor flees
    pub fn double_activate(&mut self, id: ActorId, at: Vec2) -> bool {
        let fled = match self.actor_mut(id) {
            Some(actor) => gesture::flee(actor, at.x),
            None => false,
        };
        if fled && self.pointer_target == Some(id) {
            self.pointer_target = None;
        }
        fled
    }

    /// Single tap on `id`; two taps within `DOUBLE_TAP_MS` count as a
    /// double activation. Returns true if this tap triggered a flee.
    pub fn tap(&mut self, id: ActorId, at: Vec2) -> bool {
        let now = self.time_ms;
        match self.last_tap {
            Some((tapped, when)) if tapped == id && now - when <= DOUBLE_TAP_MS => {
                self.last_tap = None;
                self.double_activate(id, at)
            }
            _ => {
                self.last_tap = Some((id, now));
                false
            }
        }
    }
}
