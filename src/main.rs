//! Dino Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use dino_runner::persistence::{KeyValueStore, LocalStore, MemoryStore};
    use dino_runner::platform::{FixedStep, FrameLoop, SwipeTracker, input};
    use dino_runner::renderer::{RenderOptions, RenderState, ShapeBatch};
    use dino_runner::share::ShareSink;
    use dino_runner::sim::{GameEvent, GamePhase, InputCommand};
    use dino_runner::{Session, Settings, Tuning};

    /// LocalStorage key for a JSON balance override
    const TUNING_KEY: &str = "dino_runner_tuning";

    type WebSession = Session<Box<dyn KeyValueStore>, ShareSink>;

    /// Game instance holding all state
    struct Game {
        session: WebSession,
        batch: ShapeBatch,
        render_state: Option<RenderState>,
        settings: Settings,
        options: RenderOptions,
        step: FixedStep,
        swipe: SwipeTracker,
        start_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(session: WebSession, settings: Settings, start_time: f64) -> Self {
            Self {
                session,
                batch: ShapeBatch::new(),
                render_state: None,
                options: RenderOptions::from_settings(&settings),
                settings,
                step: FixedStep::new(),
                swipe: SwipeTracker::new(),
                start_time,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        fn command(&mut self, command: InputCommand) {
            self.session.on_input_command(command);
        }

        /// Run the simulation ticks due this frame
        fn update(&mut self, time: f64) {
            let ticks = self.step.advance_to(time);
            for _ in 0..ticks {
                for event in self.session.tick() {
                    if event == GameEvent::Started {
                        self.session.sink_mut().clear();
                    }
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let time_secs = ((time - self.start_time) / 1000.0) as f32;
            self.batch.reset();
            self.session.render(&mut self.batch, &self.options, time_secs);

            match render_state.render(&self.batch) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let state = self.session.state();

            set_text(document, "#hud-score .hud-value", &state.score.to_string());
            set_text(
                document,
                "#hud-best .hud-value",
                &self.session.high_score().max(state.score).to_string(),
            );
            set_text(document, "#hud-level .hud-value", &state.level.to_string());
            set_text(
                document,
                "#hud-fuel .hud-value",
                &format!("{:.0}%", state.boost.fuel),
            );
            set_text(document, "#hud-fps .hud-value", &self.fps.to_string());
            set_visible(document, "hud-fps", self.settings.show_fps);

            set_visible(document, "start-prompt", state.phase == GamePhase::Idle);

            let over = state.phase == GamePhase::Over;
            set_visible(document, "game-over", over);
            if !over {
                return;
            }
            if let Some(report) = self.session.report() {
                set_text(document, "#final-score", &report.score.to_string());
                set_text(
                    document,
                    "#final-best",
                    &report.previous_best.max(report.score).to_string(),
                );
                set_visible(document, "new-best", report.new_high_score);
            }
            let offer = self.session.sink().latest();
            if let Some(link) = document.get_element_by_id("share-link")
                && let Some(offer) = offer
            {
                let _ = link.set_attribute("href", &offer.compose_url);
            }
            set_visible(
                document,
                "mint-offer",
                offer.is_some_and(|offer| offer.offer_mint),
            );
        }

        /// Persist settings and push them into the session and renderer
        fn apply_settings(&mut self) {
            self.options = RenderOptions::from_settings(&self.settings);
            let cap = self
                .settings
                .max_particles()
                .min(self.session.tuning().max_particles);
            self.session.set_particle_cap(cap);
            if let Err(err) = self.settings.save(self.session.store_mut()) {
                log::warn!("Failed to save settings: {}", err);
            }
        }

        /// Keys that change preferences rather than play
        fn settings_key(&mut self, key: &str) -> bool {
            match key {
                "f" | "F" => self.settings.show_fps = !self.settings.show_fps,
                "c" | "C" => self.settings.high_contrast = !self.settings.high_contrast,
                "m" | "M" => self.settings.reduced_motion = !self.settings.reduced_motion,
                "q" | "Q" => {
                    let preset = self.settings.quality.next();
                    self.settings.apply_preset(preset);
                    log::info!("Quality: {}", preset.as_str());
                }
                _ => return false,
            }
            self.apply_settings();
            true
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Balance override from LocalStorage, if present and valid
    fn load_tuning(store: &dyn KeyValueStore) -> Tuning {
        match store.get(TUNING_KEY) {
            Ok(Some(json)) => match Tuning::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Using tuning override from {}", TUNING_KEY);
                    tuning
                }
                Err(err) => {
                    log::warn!("Ignoring tuning override: {}", err);
                    Tuning::default()
                }
            },
            Ok(None) => Tuning::default(),
            Err(err) => {
                log::warn!("Could not read tuning override: {}", err);
                Tuning::default()
            }
        }
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStore::open() {
            Ok(store) => Box::new(store),
            Err(err) => {
                log::warn!("{}; progress will not be saved", err);
                Box::new(MemoryStore::new())
            }
        }
    }

    /// Touch position relative to the canvas
    fn touch_pos(canvas: &HtmlCanvasElement, touch: &web_sys::Touch) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        Vec2::new(
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        )
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Dino Runner starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        set_visible(&document, "loading", false);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Storage, preferences and balance
        let store = open_store();
        let settings = Settings::load(&*store);
        let tuning = load_tuning(&*store);
        let field_size = Vec2::new(tuning.field_width, tuning.field_height);
        let page_url = window.location().href().unwrap_or_default();

        let seed = js_sys::Date::now() as u64;
        let session = Session::new(seed, tuning, store, ShareSink::new(page_url));
        let game = Rc::new(RefCell::new(Game::new(session, settings, js_sys::Date::now())));
        game.borrow_mut().apply_settings();

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU, falling back to WebGL2
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height, field_size).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(err) => log::error!("Failed to create render device: {}", err),
        }

        let frame_loop = FrameLoop::new();

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_lifecycle(&canvas, game.clone(), frame_loop.clone());

        set_visible(&document, "hud", true);

        // Start game loop
        request_animation_frame(game, frame_loop);

        log::info!("Dino Runner running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut g = game.borrow_mut();
                if let Some(command) = input::key_down(&key, event.repeat()) {
                    // Keep Space and arrows from scrolling the page
                    event.prevent_default();
                    g.command(command);
                } else if !event.repeat() {
                    g.settings_key(&key);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(command) = input::key_up(&event.key()) {
                    game.borrow_mut().command(command);
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse press
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().command(input::pointer_down());
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let pos = touch_pos(&canvas_clone, &touch);
                    game.borrow_mut().swipe.touch_start(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let pos = touch_pos(&canvas_clone, &touch);
                    let mut g = game.borrow_mut();
                    if let Some(command) = g.swipe.touch_move(pos) {
                        g.command(command);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.changed_touches().get(0) {
                    let pos = touch_pos(&canvas_clone, &touch);
                    let mut g = game.borrow_mut();
                    if let Some(command) = g.swipe.touch_end(pos) {
                        g.command(command);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch cancel
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                let mut g = game.borrow_mut();
                if let Some(command) = g.swipe.touch_cancel() {
                    g.command(command);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchcancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.session.sink_mut().clear();
                g.session.start();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Tab visibility, resize and teardown
    fn setup_lifecycle(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>, frame_loop: FrameLoop) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Hidden tab: release boost and don't replay the gap on return
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.step.reset();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    g.command(InputCommand::StopBoost);
                    log::info!("Tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Resize
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let dpr = window.device_pixel_ratio();
                let width = (canvas_clone.client_width() as f64 * dpr) as u32;
                let height = (canvas_clone.client_height() as f64 * dpr) as u32;
                canvas_clone.set_width(width);
                canvas_clone.set_height(height);
                if let Some(render_state) = game.borrow_mut().render_state.as_mut() {
                    render_state.resize(width, height);
                }
            });
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Page teardown: no frame callback may outlive the page
        {
            let frame_loop = frame_loop.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some(id) = frame_loop.cancel()
                    && let Some(window) = web_sys::window()
                {
                    let _ = window.cancel_animation_frame(id);
                }
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restored from the back/forward cache: start the loop again
        {
            let closure =
                Closure::<dyn FnMut(_)>::new(move |event: web_sys::PageTransitionEvent| {
                    if !event.persisted() || !frame_loop.resume() {
                        return;
                    }
                    {
                        let mut g = game.borrow_mut();
                        g.step.reset();
                        g.command(InputCommand::StopBoost);
                    }
                    request_animation_frame(game.clone(), frame_loop.clone());
                });
            let _ = window
                .add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, frame_loop: FrameLoop) {
        if !frame_loop.is_alive() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let next = frame_loop.clone();
        let closure = Closure::once(move |time: f64| {
            if next.run_frame(|| game_loop(&game, time)) {
                request_animation_frame(game, next);
            }
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => frame_loop.set_pending(id),
            Err(err) => log::error!("requestAnimationFrame failed: {:?}", err),
        }
        closure.forget();
    }

    fn game_loop(game: &Rc<RefCell<Game>>, time: f64) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let mut g = game.borrow_mut();
        g.update(time);
        g.render(time);
        g.update_hud(&document);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Dino Runner (native) starting...");
    log::info!("Native mode runs a headless autopilot; serve the wasm build to play");

    let score = autopilot::run(0xd1e0, 60 * 120);
    println!("Autopilot finished with score {}", score);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run used to smoke-test the loop natively
#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use dino_runner::Session;
    use dino_runner::Tuning;
    use dino_runner::persistence::MemoryStore;
    use dino_runner::renderer::{RenderOptions, ShapeBatch};
    use dino_runner::share::RecordingSink;
    use dino_runner::sim::{GameState, InputCommand, ObstacleKind};

    /// Seconds of look-ahead before an obstacle reaches the player
    const REACTION_TIME: f32 = 0.18;

    /// Jump when a ground obstacle is about to reach the lane
    fn should_jump(state: &GameState, tuning: &Tuning) -> bool {
        if !state.player.on_ground {
            return false;
        }
        let reach = state.current_speed(tuning) * REACTION_TIME;
        let front = state.player.pos.x + state.player.size.x;
        state.obstacles.iter().any(|obstacle| {
            // Birds fly over a grounded runner
            obstacle.kind != ObstacleKind::Bird
                && obstacle.pos.x >= front
                && obstacle.pos.x - front <= reach
        })
    }

    /// Play until game over or `max_ticks`; returns the score
    pub fn run(seed: u64, max_ticks: u32) -> u64 {
        let tuning = Tuning::default();
        let mut session = Session::new(
            seed,
            tuning.clone(),
            MemoryStore::new(),
            RecordingSink::default(),
        );
        session.start();

        for _ in 0..max_ticks {
            if !session.is_running() {
                break;
            }
            if should_jump(session.state(), &tuning) {
                session.on_input_command(InputCommand::Jump);
            }
            session.tick();
        }

        let mut batch = ShapeBatch::new();
        session.render(&mut batch, &RenderOptions::default(), 0.0);
        log::info!("Last frame: {} vertices", batch.vertices.len());

        let state = session.state();
        log::info!(
            "Autopilot: score {}, level {}, {} obstacles passed, {} power-ups",
            state.score,
            state.level,
            state.obstacles_passed,
            state.powerups_collected
        );
        if let Some(report) = session.sink().reports.first() {
            log::info!("Game over report: {:?}", report);
        }
        state.score
    }
}
