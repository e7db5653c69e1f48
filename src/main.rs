//! Tinipix entry point
//!
//! On the web this adopts every `.tinipix` image on the page and runs the
//! animation loop. Natively it runs a short headless simulation.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlImageElement, MouseEvent, TouchEvent};

    use tinipix::consts::*;
    use tinipix::platform::web::{DomCue, DomSprite, ground_bounds};
    use tinipix::platform::{SpriteHost, present, present_cue, sync_sizes};
    use tinipix::{ActorId, SettingsTable, Terrarium};

    /// Everything the page loop shares between listeners
    struct Page {
        terrarium: Terrarium,
        sprites: Vec<(ActorId, DomSprite)>,
        cue: Option<DomCue>,
        last_time: f64,
    }

    impl Page {
        fn frame(&mut self, time: f64) {
            let elapsed = if self.last_time > 0.0 {
                (time - self.last_time) as f32
            } else {
                NOMINAL_FRAME_MS
            };
            self.last_time = time;

            sync_sizes(&mut self.terrarium, &self.sprites);
            self.terrarium.step(elapsed);
            present(&self.terrarium, &mut self.sprites);
            if let Some(cue) = self.cue.as_mut() {
                present_cue(&self.terrarium, cue);
            }
        }
    }

    fn mouse_point(event: &MouseEvent) -> Vec2 {
        Vec2::new(event.page_x() as f32, event.page_y() as f32)
    }

    /// First active touch, or the first lifted one on touchend
    fn touch_point(event: &TouchEvent) -> Option<Vec2> {
        event
            .touches()
            .get(0)
            .or_else(|| event.changed_touches().get(0))
            .map(|t| Vec2::new(t.page_x() as f32, t.page_y() as f32))
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        log::info!("Tinipix starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::warn!("no document, nothing to animate");
            return;
        };
        let Some(ground) = ground_bounds(&document) else {
            log::warn!("no #ground element, tinipix disabled");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let mut page = Page {
            terrarium: Terrarium::new(seed),
            sprites: Vec::new(),
            cue: DomCue::find(&document),
            last_time: 0.0,
        };
        if page.cue.is_none() {
            log::warn!("no #particle element, interactions will not show");
        }

        adopt_sprites(&document, ground, &mut page);
        log::info!(
            "{} tinipix on the ground (seed {})",
            page.sprites.len(),
            seed
        );

        let sprites: Vec<(ActorId, web_sys::HtmlElement)> = page
            .sprites
            .iter()
            .map(|(id, sprite)| (*id, sprite.element().clone()))
            .collect();
        let page = Rc::new(RefCell::new(page));

        for (id, element) in &sprites {
            setup_sprite_handlers(element, *id, page.clone());
        }
        setup_document_handlers(&document, page.clone());
        setup_resize(document, page.clone());

        request_animation_frame(page);
    }

    fn adopt_sprites(document: &Document, ground: tinipix::GroundBounds, page: &mut Page) {
        let table = SettingsTable::builtin();
        let Ok(images) = document.query_selector_all(".tinipix") else {
            return;
        };

        for index in 0..images.length() {
            let Some(image) = images
                .get(index)
                .and_then(|node| node.dyn_into::<HtmlImageElement>().ok())
            else {
                continue;
            };
            if image
                .style()
                .get_property_value("visibility")
                .is_ok_and(|v| v == "collapse")
            {
                continue;
            }

            let identity = image.id();
            let overrides = image.get_attribute("data-settings");
            let settings = table.get_with_overrides(&identity, overrides.as_deref());
            if !table.contains(&identity) {
                log::warn!("tinipix '{identity}' has no roster entry, using defaults");
            }

            let sprite = DomSprite::adopt(image, settings.pixel_scale);
            let size = sprite.size();
            let id = page.terrarium.spawn(&identity, settings, size, ground);
            page.sprites.push((id, sprite));
        }
    }

    fn setup_sprite_handlers(
        element: &web_sys::HtmlElement,
        id: ActorId,
        page: Rc<RefCell<Page>>,
    ) {
        // Mouse down: arm a grab
        {
            let page = page.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                page.borrow_mut()
                    .terrarium
                    .pointer_down(id, mouse_point(&event));
            });
            let _ = element
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start: arm a grab
        {
            let page = page.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(at) = touch_point(&event) {
                    page.borrow_mut().terrarium.pointer_down(id, at);
                }
            });
            let _ = element
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Double click: run away
        {
            let page = page.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                page.borrow_mut()
                    .terrarium
                    .double_activate(id, mouse_point(&event));
            });
            let _ = element
                .add_event_listener_with_callback("dblclick", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end on the sprite counts as a tap (double tap runs away)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(at) = touch_point(&event) {
                    page.borrow_mut().terrarium.tap(id, at);
                }
            });
            let _ = element
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_document_handlers(document: &Document, page: Rc<RefCell<Page>>) {
        // Pointer moves anywhere while dragging
        {
            let page = page.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                page.borrow_mut().terrarium.pointer_move(mouse_point(&event));
            });
            let _ = document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let page = page.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(at) = touch_point(&event) {
                    page.borrow_mut().terrarium.pointer_move(at);
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release (or the pointer leaving the page) drops whatever is held
        for kind in ["mouseup", "mouseleave"] {
            let page = page.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                page.borrow_mut().terrarium.pointer_up(mouse_point(&event));
            });
            let _ =
                document.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(at) = touch_point(&event) {
                    page.borrow_mut().terrarium.pointer_up(at);
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(document: Document, page: Rc<RefCell<Page>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            match ground_bounds(&document) {
                Some(bounds) => page.borrow_mut().terrarium.set_ground(bounds),
                None => log::warn!("#ground disappeared, keeping old bounds"),
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(page: Rc<RefCell<Page>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            page_loop(page, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn page_loop(page: Rc<RefCell<Page>>, time: f64) {
        page.borrow_mut().frame(time);
        request_animation_frame(page);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tinipix (native) starting...");
    log::info!("Native mode runs headless - serve the wasm build for the page version");

    run_headless(std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(7));
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drop the whole roster on a virtual ground and let it run for a minute
#[cfg(not(target_arch = "wasm32"))]
fn run_headless(seed: u64) {
    use glam::Vec2;
    use tinipix::consts::NOMINAL_FRAME_MS;
    use tinipix::{GroundBounds, SettingsTable, Terrarium};

    let table = SettingsTable::builtin();
    let ground = GroundBounds::new(0.0, 1200.0, 600.0);
    let mut terrarium = Terrarium::new(seed);
    let identities: Vec<String> = table.identities().map(str::to_owned).collect();
    for identity in &identities {
        terrarium.spawn(identity, table.get(identity), Vec2::new(32.0, 32.0), ground);
    }

    let mut interactions = 0;
    for _ in 0..3600 {
        if terrarium.step(NOMINAL_FRAME_MS).is_some() {
            interactions += 1;
        }
    }
    log::info!(
        "simulated {:.1}s, {} interaction frames",
        terrarium.time_ms() / 1000.0,
        interactions
    );

    match serde_json::to_string_pretty(terrarium.actors()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("could not serialise actors: {e}"),
    }
}
