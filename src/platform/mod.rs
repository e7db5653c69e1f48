//! Platform abstraction layer
//!
//! The simulation never touches the page. Each frame the host hands its
//! visual elements to [`present`], which writes positions and facing out
//! through the [`SpriteHost`] and [`CueHost`] traits. The browser
//! implementations live in [`web`] (wasm32 only); tests use fakes.

#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec2;

use crate::sim::{ActorId, Terrarium};

/// Something on screen that shows one actor
pub trait SpriteHost {
    /// Displayed size in page px
    fn size(&self) -> Vec2;
    /// Move the top-left corner to `position`
    fn place(&mut self, position: Vec2);
    /// Apply facing: swap to `texture` if given, otherwise mirror when asked
    fn show(&mut self, texture: Option<&str>, mirrored: bool);
}

/// The floating interaction cue
pub trait CueHost {
    fn show_cue(&mut self, position: Vec2);
    fn hide_cue(&mut self);
}

/// Write every actor's current frame to its host.
///
/// Hosts whose actor is gone are skipped. Returns how many were updated.
pub fn present<H: SpriteHost>(terrarium: &Terrarium, hosts: &mut [(ActorId, H)]) -> usize {
    let mut shown = 0;
    for (id, host) in hosts.iter_mut() {
        let Some(actor) = terrarium.actor(*id) else {
            continue;
        };
        let frame = actor.frame();
        host.place(frame.position);
        host.show(frame.texture, frame.mirrored);
        shown += 1;
    }
    shown
}

/// Show or hide the cue to match the terrarium
pub fn present_cue(terrarium: &Terrarium, host: &mut impl CueHost) {
    match terrarium.cue() {
        Some(active) => host.show_cue(active.cue.position),
        None => host.hide_cue(),
    }
}

/// CSS width for an image shown at `pixel_scale`, once its natural width is known
pub fn scaled_width(natural_width: u32, pixel_scale: f32) -> Option<f32> {
    (natural_width > 0).then(|| natural_width as f32 * pixel_scale)
}

/// Feed host sizes back into the simulation (images finish loading late)
pub fn sync_sizes<H: SpriteHost>(terrarium: &mut Terrarium, hosts: &[(ActorId, H)]) {
    for (id, host) in hosts {
        let size = host.size();
        let changed = terrarium.actor(*id).is_some_and(|a| a.size != size);
        if changed && size.x > 0.0 && size.y > 0.0 {
            log::debug!("actor {} resized to {}x{}", id.0, size.x, size.y);
            terrarium.resize_actor(*id, size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsTable;
    use crate::sim::{ActorState, GroundBounds};

    #[derive(Default)]
    struct FakeSprite {
        size: Vec2,
        position: Option<Vec2>,
        texture: Option<String>,
        mirrored: bool,
    }

    impl SpriteHost for FakeSprite {
        fn size(&self) -> Vec2 {
            self.size
        }

        fn place(&mut self, position: Vec2) {
            self.position = Some(position);
        }

        fn show(&mut self, texture: Option<&str>, mirrored: bool) {
            self.texture = texture.map(str::to_owned);
            self.mirrored = mirrored;
        }
    }

    #[derive(Default)]
    struct FakeCue {
        shown_at: Option<Vec2>,
    }

    impl CueHost for FakeCue {
        fn show_cue(&mut self, position: Vec2) {
            self.shown_at = Some(position);
        }

        fn hide_cue(&mut self) {
            self.shown_at = None;
        }
    }

    fn terrarium() -> (Terrarium, ActorId, ActorId) {
        let table = SettingsTable::builtin();
        let ground = GroundBounds::new(0.0, 800.0, 300.0);
        let mut terrarium = Terrarium::new(11);
        let favian = terrarium.spawn("favian", table.get("favian"), Vec2::splat(16.0), ground);
        let duck = terrarium.spawn("duck", table.get("duck"), Vec2::splat(16.0), ground);
        (terrarium, favian, duck)
    }

    #[test]
    fn test_present_writes_frames() {
        let (mut terrarium, favian, duck) = terrarium();
        if let Some(actor) = terrarium.actor_mut(duck) {
            actor.velocity.x = -2.0;
            actor.update_facing();
        }
        if let Some(actor) = terrarium.actor_mut(favian) {
            actor.velocity.x = 2.0;
            actor.update_facing();
        }

        let mut hosts = vec![
            (favian, FakeSprite::default()),
            (duck, FakeSprite::default()),
            (ActorId(404), FakeSprite::default()),
        ];
        assert_eq!(present(&terrarium, &mut hosts), 2);

        let expected = terrarium.actor(favian).map(|a| a.position);
        assert_eq!(hosts[0].1.position, expected);
        assert_eq!(
            hosts[0].1.texture.as_deref(),
            Some("../source/tinipix/tinipix_favian_right.png")
        );
        assert!(!hosts[0].1.mirrored);

        assert!(hosts[1].1.texture.is_none());
        assert!(hosts[1].1.mirrored);
        assert!(hosts[2].1.position.is_none());
    }

    #[test]
    fn test_present_cue_follows_terrarium() {
        let (mut terrarium, favian, duck) = terrarium();
        let mut cue = FakeCue::default();
        present_cue(&terrarium, &mut cue);
        assert!(cue.shown_at.is_none());

        for (id, x, vx) in [(favian, 100.0, 2.0), (duck, 140.0, -2.0)] {
            if let Some(actor) = terrarium.actor_mut(id) {
                actor.position.x = x;
                actor.velocity.x = vx;
                actor.update_facing();
                actor.state = ActorState::Staying {
                    remaining_ms: 5000.0,
                    look_around: None,
                    flip_roll_ms: 1.0e9,
                };
                actor.settings.stay_flip_chance = 0.0;
            }
        }
        terrarium.step(10.0);
        present_cue(&terrarium, &mut cue);
        let shown = cue.shown_at.expect("cue should be visible");
        assert_eq!(shown.x, (116.0 + 140.0) * 0.5);
    }

    #[test]
    fn test_scaled_width_waits_for_load() {
        assert_eq!(scaled_width(0, 2.0), None);
        assert_eq!(scaled_width(16, 2.0), Some(32.0));
        assert_eq!(scaled_width(16, 1.0), Some(16.0));
    }

    #[test]
    fn test_sync_sizes() {
        let (mut terrarium, favian, duck) = terrarium();
        let hosts = vec![
            (
                favian,
                FakeSprite {
                    size: Vec2::new(32.0, 40.0),
                    ..Default::default()
                },
            ),
            // Not loaded yet: keep the old size
            (duck, FakeSprite::default()),
        ];
        sync_sizes(&mut terrarium, &hosts);
        let favian_size = terrarium.actor(favian).map(|a| a.size);
        assert_eq!(favian_size, Some(Vec2::new(32.0, 40.0)));
        assert_eq!(terrarium.actor(duck).map(|a| a.size), Some(Vec2::splat(16.0)));
        assert_eq!(terrarium.actor(favian).map(|a| a.position.y), Some(260.0));
    }
}
