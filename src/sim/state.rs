//! Actor state and core simulation types

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::ActorSettings;
use crate::{random_sign, uniform};

/// Stable handle for an actor inside a [`super::Terrarium`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Which way the sprite is looking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing implied by a horizontal velocity; zero keeps the current one
    pub fn from_velocity(vx: f32, current: Facing) -> Self {
        if vx > 0.0 {
            Facing::Right
        } else if vx < 0.0 {
            Facing::Left
        } else {
            current
        }
    }
}

/// Ground strip an actor walks on (page coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundBounds {
    /// Left edge of the walkable strip
    pub left: f32,
    /// Width of the walkable strip
    pub width: f32,
    /// Vertical offset of the ground line (sprites stand on it)
    pub ground_y: f32,
    /// Highest point a dragged sprite may be dropped at
    pub top: f32,
}

impl GroundBounds {
    pub fn new(left: f32, width: f32, ground_y: f32) -> Self {
        Self {
            left,
            width,
            ground_y,
            top: 0.0,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }
}

/// Pending turn-arounds while staying
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookAround {
    pub flips_left: u8,
    pub next_flip_ms: f32,
}

/// Stage of a flee sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FleePhase {
    /// Popped up, about to sprint away from `from_x`
    Windup { from_x: f32 },
    /// Sprinting
    Running,
}

/// High-level behaviour; exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActorState {
    /// Hopping along the ground
    Walking,
    /// Idle in place until the dwell runs out
    Staying {
        remaining_ms: f32,
        look_around: Option<LookAround>,
        /// Time until stay_flip_chance is rolled again
        flip_roll_ms: f32,
    },
    /// Held by the pointer; physics suspended
    Dragging { grab_offset: Vec2 },
    /// Scripted escape after a double activation
    Fleeing { phase: FleePhase, remaining_ms: f32 },
}

/// Pointer is down on the actor but has not been held long enough to drag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingGrab {
    pub hold_ms: f32,
    /// Pointer position relative to the sprite when it went down
    pub offset: Vec2,
    /// Where the pointer is now
    pub latest: Vec2,
}

/// What the visual host should show for one actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteFrame<'a> {
    pub position: Vec2,
    /// Texture to display (asymmetric creatures only)
    pub texture: Option<&'a str>,
    /// Mirror the element horizontally (symmetric creatures only)
    pub mirrored: bool,
}

/// One wandering creature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    /// Roster key the settings came from
    pub identity: String,
    /// Top-left corner, page px
    pub position: Vec2,
    /// px per nominal tick
    pub velocity: Vec2,
    pub state: ActorState,
    pub on_ground: bool,
    pub facing: Facing,
    pub settings: ActorSettings,
    pub bounds: GroundBounds,
    /// Sprite width/height as displayed
    pub size: Vec2,
    /// Jump flag timer; jumping while > 0
    pub hop_ms: f32,
    /// Drag initiation refused while > 0
    pub drag_block_ms: f32,
    pub pending_grab: Option<PendingGrab>,
}

impl Actor {
    /// Spawn standing on the ground at a random spot, walking a random way
    pub fn new(
        id: ActorId,
        identity: impl Into<String>,
        settings: ActorSettings,
        size: Vec2,
        bounds: GroundBounds,
        rng: &mut impl Rng,
    ) -> Self {
        let mut actor = Self {
            id,
            identity: identity.into(),
            position: Vec2::ZERO,
            velocity: Vec2::new(random_sign(rng) * AMBIENT_SPEED, 0.0),
            state: ActorState::Walking,
            on_ground: true,
            facing: Facing::Right,
            settings,
            bounds,
            size,
            hop_ms: 0.0,
            drag_block_ms: 0.0,
            pending_grab: None,
        };
        let (min_x, max_x) = actor.x_range();
        actor.position = Vec2::new(uniform(rng, min_x, max_x), actor.rest_y());
        actor.facing = Facing::from_velocity(actor.velocity.x, actor.facing);
        actor
    }

    /// Resting height: top edge of a sprite standing on the ground
    pub fn rest_y(&self) -> f32 {
        self.bounds.ground_y - self.size.y
    }

    /// Allowed range for `position.x`
    pub fn x_range(&self) -> (f32, f32) {
        let min = self.bounds.left;
        let max = (self.bounds.right() - self.size.x).max(min);
        (min, max)
    }

    pub fn is_jumping(&self) -> bool {
        self.hop_ms > 0.0
    }

    pub fn is_staying(&self) -> bool {
        matches!(self.state, ActorState::Staying { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ActorState::Dragging { .. })
    }

    pub fn is_fleeing(&self) -> bool {
        matches!(self.state, ActorState::Fleeing { .. })
    }

    /// The x coordinate of the edge the actor is looking out of
    pub fn front_edge(&self) -> f32 {
        match self.facing {
            Facing::Right => self.position.x + self.size.x,
            Facing::Left => self.position.x,
        }
    }

    /// Re-derive facing from the current horizontal velocity
    pub fn update_facing(&mut self) {
        self.facing = Facing::from_velocity(self.velocity.x, self.facing);
    }

    pub fn frame(&self) -> SpriteFrame<'_> {
        let texture = match (&self.settings.textures, self.settings.asymmetric) {
            (Some(textures), true) => Some(match self.facing {
                Facing::Left => textures.left.as_str(),
                Facing::Right => textures.right.as_str(),
            }),
            _ => None,
        };
        SpriteFrame {
            position: self.position,
            texture,
            mirrored: texture.is_none() && self.facing == Facing::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsTable;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn bounds() -> GroundBounds {
        GroundBounds::new(100.0, 400.0, 300.0)
    }

    #[test]
    fn test_spawn_on_ground_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for i in 0..50 {
            let actor = Actor::new(
                ActorId(i),
                "kikan",
                ActorSettings::default(),
                Vec2::new(32.0, 24.0),
                bounds(),
                &mut rng,
            );
            assert_eq!(actor.position.y, 276.0);
            assert!(actor.on_ground);
            assert!(actor.position.x >= 100.0 && actor.position.x <= 468.0);
            assert_eq!(actor.velocity.x.abs(), AMBIENT_SPEED);
            assert_eq!(actor.state, ActorState::Walking);
        }
    }

    #[test]
    fn test_x_range_for_oversized_sprite() {
        let mut rng = Pcg32::seed_from_u64(1);
        let actor = Actor::new(
            ActorId(1),
            "mega",
            ActorSettings::default(),
            Vec2::new(600.0, 50.0),
            bounds(),
            &mut rng,
        );
        assert_eq!(actor.x_range(), (100.0, 100.0));
        assert_eq!(actor.position.x, 100.0);
    }

    #[test]
    fn test_facing_from_velocity() {
        assert_eq!(Facing::from_velocity(1.0, Facing::Left), Facing::Right);
        assert_eq!(Facing::from_velocity(-0.1, Facing::Right), Facing::Left);
        assert_eq!(Facing::from_velocity(0.0, Facing::Left), Facing::Left);
    }

    #[test]
    fn test_front_edge() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut actor = Actor::new(
            ActorId(1),
            "fyn",
            ActorSettings::default(),
            Vec2::new(20.0, 20.0),
            bounds(),
            &mut rng,
        );
        actor.position.x = 200.0;
        actor.facing = Facing::Right;
        assert_eq!(actor.front_edge(), 220.0);
        actor.facing = Facing::Left;
        assert_eq!(actor.front_edge(), 200.0);
    }

    #[test]
    fn test_frame_texture_swap_vs_mirror() {
        let table = SettingsTable::builtin();
        let mut rng = Pcg32::seed_from_u64(9);

        let size = Vec2::splat(16.0);
        let mut favian =
            Actor::new(ActorId(1), "favian", table.get("favian"), size, bounds(), &mut rng);
        favian.facing = Facing::Left;
        let frame = favian.frame();
        assert_eq!(frame.texture, Some("../source/tinipix/tinipix_favian_left.png"));
        assert!(!frame.mirrored);

        let mut duck = Actor::new(ActorId(2), "duck", table.get("duck"), size, bounds(), &mut rng);
        duck.facing = Facing::Left;
        let frame = duck.frame();
        assert_eq!(frame.texture, None);
        assert!(frame.mirrored);
        duck.facing = Facing::Right;
        assert!(!duck.frame().mirrored);
    }
}
