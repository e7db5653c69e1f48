//! Tinipix - tiny pixel creatures that wander a page
//!
//! Core modules:
//! - `sim`: Deterministic actor simulation (physics, state machine, gestures)
//! - `settings`: Per-creature configuration and the built-in roster
//! - `platform`: Visual host abstraction and the browser DOM hosts

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{ActorSettings, SettingsError, SettingsTable, Textures};
pub use sim::{Actor, ActorId, ActorState, Facing, GroundBounds, Terrarium};

/// Simulation constants
pub mod consts {
    /// Nominal frame length the per-tick velocities are tuned for (60 Hz)
    pub const NOMINAL_FRAME_MS: f32 = 1000.0 / 60.0;
    /// Longest frame gap fed into one tick (tab switches, debugger pauses)
    pub const MAX_ELAPSED_MS: f32 = 100.0;

    /// How long the jumping flag stays up after a hop starts
    pub const HOP_DURATION_MS: f32 = 100.0;
    /// Horizontal walking speed magnitude (before walk_speed scaling)
    pub const AMBIENT_SPEED: f32 = 2.0;

    /// Avoidance radius as a multiple of sprite width
    pub const AVOID_RADIUS_FACTOR: f32 = 1.2;

    /// Upper bound of the random delay before the first look-around flip
    pub const LOOK_AROUND_FIRST_DELAY_MS: f32 = 2000.0;
    /// Chance that a stay includes any look-around at all
    pub const LOOK_AROUND_CHANCE: f32 = 0.7;
    /// Chance that a look-around is a single flip (otherwise two)
    pub const LOOK_AROUND_SINGLE_CHANCE: f32 = 0.85;
    /// Interval at which stay_flip_chance is rolled while staying
    pub const STAY_FLIP_PERIOD_MS: f32 = 1000.0;

    /// Upward pop on flee, as a multiple of jump strength
    pub const FLEE_POP_FACTOR: f32 = 1.5;
    /// Delay between the pop and the sprint
    pub const FLEE_WINDUP_MS: f32 = 150.0;
    /// Sprint duration
    pub const FLEE_RUN_MS: f32 = 1500.0;
    /// Sprint speed (px/tick before walk_speed scaling)
    pub const FLEE_SPEED: f32 = 6.0;

    /// Pointer must be held this long before a grab turns into a drag
    pub const DRAG_HOLD_MS: f32 = 150.0;
    /// Drag is refused for this long after a flee starts, a flee ends or a drag ends
    pub const DRAG_COOLDOWN_MS: f32 = 500.0;
    /// Sprite floats this far above the grab point while dragged
    pub const DRAG_LIFT: f32 = 10.0;
    /// Corrective hop on a ground-level drop, as a multiple of jump strength
    pub const DROP_HOP_FACTOR: f32 = 1.2;

    /// Two taps on the same sprite within this window count as a double activation
    pub const DOUBLE_TAP_MS: f64 = 300.0;

    /// Front-edge distance band for a facing pair to interact
    pub const INTERACTION_MIN_DISTANCE: f32 = 10.0;
    pub const INTERACTION_MAX_DISTANCE: f32 = 50.0;
    /// Interaction cue floats this far above the higher sprite
    pub const CUE_LIFT: f32 = 20.0;
    /// How long an interaction cue stays visible
    pub const CUE_DURATION_MS: f32 = 500.0;
}

/// Uniform sample in `[min, max)`, tolerating `min == max`
#[inline]
pub fn uniform(rng: &mut impl rand::Rng, min: f32, max: f32) -> f32 {
    min + (max - min) * rng.random::<f32>()
}

/// Random ±1
#[inline]
pub fn random_sign(rng: &mut impl rand::Rng) -> f32 {
    if rng.random::<f32>() < 0.5 { -1.0 } else { 1.0 }
}
