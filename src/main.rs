//! Recycle Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.
//!
//! The page is expected to provide a `#canvas` plus optional overlay elements
//! (`#menu`, `#hud`, `#game-over`, buttons, volume sliders, the quality select
//! and effect checkboxes). Missing overlay elements are skipped.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        HtmlCanvasElement, HtmlInputElement, HtmlSelectElement, KeyboardEvent, TouchEvent,
    };

    use recycle_rush::audio::AudioManager;
    use recycle_rush::platform::{FrameScheduler, assets};
    use recycle_rush::renderer::{AssetTable, RenderError, RenderState, Scene};
    use recycle_rush::sim::{Action, GameEvent, GameState, TickInput, TimeOfDay, tick};
    use recycle_rush::{HighScores, QualityPreset, Settings, Tuning};

    /// Minimum horizontal travel (CSS px) for a swipe to count
    const SWIPE_THRESHOLD: f32 = 30.0;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        scheduler: FrameScheduler,
        /// A requestAnimationFrame callback is queued
        frame_pending: bool,
        input: TickInput,
        audio: AudioManager,
        settings: Settings,
        highscores: HighScores,
        assets: AssetTable,
        scene: Scene,
        render_state: Option<RenderState>,
        touch_start: Option<(f32, f32)>,
    }

    impl Game {
        fn new(seed: u64, assets: AssetTable) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_music_volume(settings.music_volume());
            audio.set_sfx_volume(settings.sfx_volume());
            Self {
                state: GameState::with_tuning(seed, Tuning::load()),
                scheduler: FrameScheduler::new(),
                frame_pending: false,
                input: TickInput::default(),
                audio,
                settings,
                highscores: HighScores::load(),
                assets,
                scene: Scene::new(seed),
                render_state: None,
                touch_start: None,
            }
        }

        /// Queue a discrete action for the next tick (ignored outside a run)
        fn queue(&mut self, action: Action) {
            if self.state.is_playing() {
                self.input.actions.push(action);
            }
        }

        fn start_run(&mut self) {
            let seed = js_sys::Date::now() as u64;
            self.state.time_of_day = TimeOfDay::from_hour(js_sys::Date::new_0().get_hours());
            self.state.start_run(seed);
            self.input = TickInput::default();
            self.audio.resume();
            self.audio.reset_music();
            self.scheduler.start();

            set_visible("menu", false);
            set_visible("game-over", false);
            set_visible("hud", true);
        }

        fn return_to_menu(&mut self) {
            self.state.enter_menu();
            self.scheduler.stop();
            set_visible("game-over", false);
            set_visible("hud", false);
            set_visible("menu", true);
            self.show_best();
        }

        /// Run the simulation ticks owed for this frame
        fn update(&mut self, time: f64) {
            let ticks = self.scheduler.advance(time);
            for _ in 0..ticks {
                tick(&mut self.state, &self.input);
                // Actions are one-shot
                self.input.actions.clear();
            }

            self.handle_events();

            if self.state.is_playing() {
                self.audio.update_music(self.state.speed, &self.state.tuning);
            }
            self.scheduler.sync_with(self.state.phase);
        }

        fn handle_events(&mut self) {
            for event in self.state.drain_events() {
                match event {
                    GameEvent::ScoreChanged(score) => set_text("hud-score", &score.to_string()),
                    GameEvent::LivesChanged(lives) => set_text("hud-lives", &lives.to_string()),
                    GameEvent::MultiplierChanged(m) => set_text("hud-multiplier", &format!("x{m}")),
                    GameEvent::Sound(effect) => self.audio.play(effect),
                    GameEvent::GameOver { final_score } => self.game_over(final_score),
                }
            }
        }

        fn game_over(&mut self, final_score: u64) {
            let rank = self.highscores.add_score(final_score, js_sys::Date::now());
            if let Some(rank) = rank {
                self.highscores.save();
                log::info!("New high score #{rank}: {final_score}");
            }
            set_text("final-score", &final_score.to_string());
            set_visible("new-record", rank == Some(1));
            set_visible("game-over", true);
            self.show_best();
        }

        fn show_best(&self) {
            let best = self.highscores.top_score().unwrap_or(0);
            set_text("best-score", &best.to_string());
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let list = self
                .scene
                .build(&self.state, &self.settings, &self.assets, time);
            match render_state.render(&list.tessellate()) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    render_state.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Recycle Rush starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

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

        let sprites = assets::load_all().await;

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, sprites)));

        let render_state = {
            let g = game.borrow();
            init_renderer(&canvas, width, height, &g.assets).await
        };
        match render_state {
            Ok(rs) => game.borrow_mut().render_state = Some(rs),
            Err(e) => log::error!("Rendering disabled: {e}"),
        }

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_volume_sliders(game.clone());
        setup_effect_controls(game.clone());

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }
        game.borrow().show_best();
        set_visible("menu", true);

        // Draw the menu backdrop once; the loop only keeps going during a run
        schedule_frame(&game);

        log::info!("Recycle Rush ready");
    }

    async fn init_renderer(
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
        assets: &AssetTable,
    ) -> Result<RenderState, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(surface, &adapter, width, height, assets).await
    }

    // === DOM helpers ===

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    fn on_click(id: &str, mut handler: impl FnMut() + 'static) {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| handler());
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    // === Input ===

    fn key_action(key: &str) -> Option<Action> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Action::MoveLeft),
            "ArrowRight" | "d" | "D" => Some(Action::MoveRight),
            "ArrowUp" | " " | "w" | "W" => Some(Action::Jump),
            _ => None,
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if !g.state.is_playing() {
                    return;
                }
                if let Some(action) = key_action(&event.key()) {
                    // Keep arrows and space from scrolling the page
                    event.prevent_default();
                    g.queue(action);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start: remember where the swipe began
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut().touch_start =
                        Some((touch.client_x() as f32, touch.client_y() as f32));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end: horizontal swipes change lane
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut g = game.borrow_mut();
                let Some((x0, y0)) = g.touch_start.take() else {
                    return;
                };
                let Some(touch) = event.changed_touches().get(0) else {
                    return;
                };
                let dx = touch.client_x() as f32 - x0;
                let dy = touch.client_y() as f32 - y0;
                if dx.abs() > SWIPE_THRESHOLD && dx.abs() > dy.abs() {
                    event.prevent_default();
                    g.queue(if dx > 0.0 {
                        Action::MoveRight
                    } else {
                        Action::MoveLeft
                    });
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        for id in ["start-btn", "restart-btn"] {
            let game = game.clone();
            on_click(id, move || {
                game.borrow_mut().start_run();
                schedule_frame(&game);
            });
        }

        {
            let game = game.clone();
            on_click("menu-btn", move || {
                game.borrow_mut().return_to_menu();
                schedule_frame(&game);
            });
        }

        // On-screen controls for touch devices
        for (id, action) in [
            ("left-btn", Action::MoveLeft),
            ("right-btn", Action::MoveRight),
            ("jump-btn", Action::Jump),
        ] {
            let game = game.clone();
            on_click(id, move || game.borrow_mut().queue(action));
        }
    }

    #[derive(Clone, Copy)]
    enum VolumeKind {
        Music,
        Sfx,
    }

    fn setup_volume_sliders(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        for (id, kind) in [
            ("music-volume", VolumeKind::Music),
            ("sfx-volume", VolumeKind::Sfx),
        ] {
            let Some(input) = document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                continue;
            };

            let current = {
                let g = game.borrow();
                match kind {
                    VolumeKind::Music => g.settings.music_volume(),
                    VolumeKind::Sfx => g.settings.sfx_volume(),
                }
            };
            input.set_value(&current.to_string());
            set_volume_label(id, current);
            if !game.borrow().audio.is_available() {
                input.set_disabled(true);
            }

            let game = game.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let vol = input_clone.value_as_number() as f32;
                let mut g = game.borrow_mut();
                let g = &mut *g;
                let applied = match kind {
                    VolumeKind::Music => {
                        g.settings.set_music_volume(vol);
                        g.audio.set_music_volume(g.settings.music_volume());
                        g.settings.music_volume()
                    }
                    VolumeKind::Sfx => {
                        g.settings.set_sfx_volume(vol);
                        g.audio.set_sfx_volume(g.settings.sfx_volume());
                        g.settings.sfx_volume()
                    }
                };
                g.settings.save();
                set_volume_label(id, applied);
            });
            let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Which visual setting a checkbox controls
    #[derive(Clone, Copy)]
    enum EffectToggle {
        ScreenShake,
        LightningFlash,
        CashParticles,
        ReducedMotion,
    }

    impl EffectToggle {
        fn get(self, settings: &Settings) -> bool {
            match self {
                EffectToggle::ScreenShake => settings.screen_shake,
                EffectToggle::LightningFlash => settings.lightning_flash,
                EffectToggle::CashParticles => settings.cash_particles,
                EffectToggle::ReducedMotion => settings.reduced_motion,
            }
        }

        fn set(self, settings: &mut Settings, on: bool) {
            match self {
                EffectToggle::ScreenShake => settings.screen_shake = on,
                EffectToggle::LightningFlash => settings.lightning_flash = on,
                EffectToggle::CashParticles => settings.cash_particles = on,
                EffectToggle::ReducedMotion => settings.reduced_motion = on,
            }
        }
    }

    fn setup_effect_controls(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        // Quality preset
        if let Some(select) = document
            .get_element_by_id("quality-select")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        {
            select.set_value(game.borrow().settings.quality.as_str());

            let game = game.clone();
            let select_clone = select.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(preset) = QualityPreset::parse(&select_clone.value()) else {
                    log::warn!("Unknown quality preset {:?}", select_clone.value());
                    return;
                };
                let mut g = game.borrow_mut();
                g.settings.quality = preset;
                g.settings.save();
                log::info!("Quality set to {}", preset.as_str());
            });
            let _ =
                select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Effect checkboxes
        for (id, toggle) in [
            ("screen-shake", EffectToggle::ScreenShake),
            ("lightning-flash", EffectToggle::LightningFlash),
            ("cash-particles", EffectToggle::CashParticles),
            ("reduced-motion", EffectToggle::ReducedMotion),
        ] {
            let Some(input) = document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                continue;
            };
            input.set_checked(toggle.get(&game.borrow().settings));

            let game = game.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                toggle.set(&mut g.settings, input_clone.checked());
                g.settings.save();
            });
            let _ =
                input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn set_volume_label(slider_id: &str, volume: f32) {
        set_text(
            &format!("{slider_id}-label"),
            &format!("{:.0}%", volume * 100.0),
        );
    }

    // === Frame loop ===

    /// Request one animation frame unless one is already queued
    fn schedule_frame(game: &Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.frame_pending {
                return;
            }
            g.frame_pending = true;
        }
        let window = web_sys::window().unwrap();
        let game = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let running = {
            let mut g = game.borrow_mut();
            g.frame_pending = false;
            g.update(time);
            g.render(time);
            g.scheduler.is_running()
        };

        if running {
            schedule_frame(&game);
        }
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
    log::info!("Recycle Rush (native) starting...");
    log::info!("Native mode runs a headless autopilot demo - serve the wasm build to play");

    // Usage: recycle-rush [seed] [tuning.json]
    let args: Vec<String> = std::env::args().collect();
    let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(42);
    let tuning = recycle_rush::Tuning::load_file(args.get(2).map(String::as_str));
    demo::run(seed, tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run driven by a simple obstacle-dodging autopilot
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use recycle_rush::Tuning;
    use recycle_rush::sim::{Action, GameEvent, GameState, TickInput, tick};

    /// Five minutes of simulated time
    const MAX_TICKS: u64 = 60 * 60 * 5;
    /// How far ahead of the truck obstacles are considered
    const LOOKAHEAD: f32 = 900.0;

    pub fn run(seed: u64, tuning: Tuning) {
        let mut state = GameState::with_tuning(seed, tuning);
        state.start_run(seed);
        let mut input = TickInput::default();
        let mut final_score = None;

        while state.is_playing() && state.time_ticks < MAX_TICKS {
            input.actions.clear();
            input.actions.extend(dodge(&state));
            tick(&mut state, &input);

            for event in state.drain_events() {
                if let GameEvent::GameOver { final_score: score } = event {
                    final_score = Some(score);
                }
            }
        }

        let seconds = state.time_ticks as f32 / 60.0;
        match final_score {
            Some(score) => println!("Seed {seed}: game over with {score} points after {seconds:.1}s"),
            None => println!(
                "Seed {seed}: survived {seconds:.1}s with {} points and {} lives",
                state.score, state.lives
            ),
        }
    }

    fn blocked(state: &GameState, lane: usize) -> bool {
        let z = state.player.pos.z;
        state.entities.iter().any(|e| {
            e.lane == lane
                && e.kind.is_obstacle()
                && !e.collected
                && e.pos.z > z - 50.0
                && e.pos.z < z + LOOKAHEAD
        })
    }

    fn dodge(state: &GameState) -> Option<Action> {
        let lane = state.player.lane;
        if !blocked(state, lane) {
            return None;
        }
        if lane > 0 && !blocked(state, lane - 1) {
            Some(Action::MoveLeft)
        } else if lane < 2 && !blocked(state, lane + 1) {
            Some(Action::MoveRight)
        } else {
            None
        }
    }
}
