//! Deterministic actor simulation
//!
//! All behaviour lives here. This module is pure and deterministic:
//! - Elapsed time is fed in by the host, timers are state fields
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No DOM or platform dependencies

pub mod collision;
pub mod gesture;
pub mod interaction;
pub mod state;
pub mod terrarium;
pub mod tick;

pub use collision::{separate, space_out};
pub use interaction::{ActiveCue, InteractionCue, scan};
pub use state::{
    Actor, ActorId, ActorState, Facing, FleePhase, GroundBounds, LookAround, PendingGrab,
    SpriteFrame,
};
pub use terrarium::Terrarium;
pub use tick::{TickReport, confine, sanitize_elapsed, tick_actor};
