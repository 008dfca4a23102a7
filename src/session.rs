//! Game session
//!
//! Glue between the simulation and its collaborators. A [`Session`] owns the
//! game state, the input intent queue, the persisted high score, the storage
//! backend and the game-over sink. Platforms only ever talk to this type.

use crate::consts::INPUT_QUEUE_CAPACITY;
use crate::highscores::HighScore;
use crate::persistence::KeyValueStore;
use crate::renderer::{RenderOptions, Surface, draw};
use crate::share::{GameOverReport, GameOverSink};
use crate::sim::{self, GameEvent, GameState, InputCommand, InputQueue};
use crate::tuning::Tuning;

pub struct Session<S: KeyValueStore, N: GameOverSink> {
    state: GameState,
    tuning: Tuning,
    queue: InputQueue,
    high_score: HighScore,
    store: S,
    sink: N,
    /// Report for the current run, once delivered
    report: Option<GameOverReport>,
}

impl<S: KeyValueStore, N: GameOverSink> Session<S, N> {
    /// Create an idle session. Reads the stored high score once.
    pub fn new(seed: u64, tuning: Tuning, store: S, sink: N) -> Self {
        let high_score = HighScore::load(&store);
        Self {
            state: GameState::new(seed, &tuning),
            tuning,
            queue: InputQueue::with_capacity(INPUT_QUEUE_CAPACITY),
            high_score,
            store,
            sink,
            report: None,
        }
    }

    /// Begin a fresh run immediately (no restart lockout)
    pub fn start(&mut self) {
        self.queue.clear();
        self.report = None;
        self.state.start(&self.tuning);
        log::info!("Run {} started", self.state.runs);
    }

    /// Queue a command for the next tick
    pub fn on_input_command(&mut self, command: InputCommand) {
        self.queue.push(command);
    }

    /// Advance one fixed step. Returns the events it raised.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let input = self.queue.drain();
        sim::tick(&mut self.state, &input, &self.tuning);

        let events = self.state.drain_events();
        for event in &events {
            match event {
                GameEvent::Started => self.report = None,
                GameEvent::GameOver { .. } => self.on_game_over(),
                _ => {}
            }
        }
        events
    }

    /// Settle the finished run: update the high score and notify the sink.
    /// Does nothing unless the run is over, and only acts once per run.
    pub fn on_game_over(&mut self) {
        if self.report.is_some() {
            return;
        }
        let Some(score) = self.state.final_score() else {
            return;
        };

        let report = GameOverReport::new(score, self.high_score.best);
        if self.high_score.record(score) {
            log::info!("New high score: {}", score);
            if let Err(err) = self.high_score.save(&mut self.store) {
                log::warn!("Failed to save high score: {}", err);
            }
        }

        self.sink.game_over(&report);
        self.report = Some(report);
    }

    /// Paint the current state
    pub fn render<T: Surface + ?Sized>(
        &self,
        surface: &mut T,
        options: &RenderOptions,
        time_secs: f32,
    ) {
        draw(&self.state, &self.tuning, options, time_secs, surface);
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn final_score(&self) -> Option<u64> {
        self.state.final_score()
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best
    }

    /// Report delivered for the current run, if it has ended
    pub fn report(&self) -> Option<&GameOverReport> {
        self.report.as_ref()
    }

    /// Cap live particles (0 disables them)
    pub fn set_particle_cap(&mut self, cap: usize) {
        self.state.max_particles = cap;
        self.state.particles.truncate(cap);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }
}
