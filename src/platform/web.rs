//! Browser DOM hosts
//!
//! Sprites are absolutely positioned `<img class="tinipix">` elements;
//! the cue is the `#particle` element faded in and out with opacity.

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlImageElement};

use super::{CueHost, SpriteHost, scaled_width};
use crate::sim::GroundBounds;

/// One `<img>` showing one actor
pub struct DomSprite {
    image: HtmlImageElement,
    /// Still to be applied (the image may not have loaded yet)
    pending_scale: Option<f32>,
    /// Last values written, to skip redundant style writes
    src: Option<String>,
    transform: &'static str,
}

impl DomSprite {
    /// Take over an image element: strip its id (it is only a roster key),
    /// apply the pixel scale and the styles dragging needs.
    pub fn adopt(image: HtmlImageElement, pixel_scale: f32) -> Self {
        image.remove_attribute("id").ok();
        image.set_draggable(false);

        let style = image.style();
        style.set_property("position", "absolute").ok();
        style.set_property("image-rendering", "pixelated").ok();
        style.set_property("user-select", "none").ok();
        style.set_property("pointer-events", "auto").ok();
        style.set_property("backface-visibility", "visible").ok();

        let mut sprite = Self {
            image,
            pending_scale: (pixel_scale != 1.0).then_some(pixel_scale),
            src: None,
            transform: "",
        };
        sprite.apply_pixel_scale();
        sprite
    }

    /// Size the image once its natural width is known
    fn apply_pixel_scale(&mut self) {
        let Some(scale) = self.pending_scale else {
            return;
        };
        let Some(width) = scaled_width(self.image.natural_width(), scale) else {
            return;
        };
        self.image
            .style()
            .set_property("width", &format!("{width}px"))
            .ok();
        self.pending_scale = None;
    }

    pub fn element(&self) -> &HtmlElement {
        &self.image
    }
}

impl SpriteHost for DomSprite {
    fn size(&self) -> Vec2 {
        Vec2::new(
            self.image.offset_width() as f32,
            self.image.offset_height() as f32,
        )
    }

    fn place(&mut self, position: Vec2) {
        self.apply_pixel_scale();
        let style = self.image.style();
        style.set_property("left", &format!("{}px", position.x)).ok();
        style.set_property("top", &format!("{}px", position.y)).ok();
    }

    fn show(&mut self, texture: Option<&str>, mirrored: bool) {
        if let Some(texture) = texture {
            if self.src.as_deref() != Some(texture) {
                self.image.set_src(texture);
                self.src = Some(texture.to_owned());
            }
        }
        let transform = if mirrored { "scale(-1, 1)" } else { "scale(1, 1)" };
        if self.transform != transform {
            self.image.style().set_property("transform", transform).ok();
            self.transform = transform;
        }
    }
}

/// The `#particle` element
pub struct DomCue {
    element: HtmlElement,
    visible: bool,
}

impl DomCue {
    pub fn find(document: &Document) -> Option<Self> {
        let element = document
            .get_element_by_id("particle")?
            .dyn_into::<HtmlElement>()
            .ok()?;
        element.style().set_property("opacity", "0").ok();
        Some(Self {
            element,
            visible: false,
        })
    }
}

impl CueHost for DomCue {
    fn show_cue(&mut self, position: Vec2) {
        let style = self.element.style();
        style.set_property("left", &format!("{}px", position.x)).ok();
        style.set_property("top", &format!("{}px", position.y)).ok();
        if !self.visible {
            style.set_property("opacity", "1").ok();
            self.visible = true;
        }
    }

    fn hide_cue(&mut self) {
        if self.visible {
            self.element.style().set_property("opacity", "0").ok();
            self.visible = false;
        }
    }
}

/// Measure the walkable strip from the `#ground` element
pub fn ground_bounds(document: &Document) -> Option<GroundBounds> {
    let ground = document
        .get_element_by_id("ground")?
        .dyn_into::<HtmlElement>()
        .ok()?;
    Some(GroundBounds::new(
        ground.offset_left() as f32,
        ground.offset_width() as f32,
        ground.offset_top() as f32,
    ))
}
