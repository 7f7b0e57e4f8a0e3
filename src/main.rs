//! Lava Drop headless runner
//!
//! Plays a full match with one scripted human and a few AI agents, stepping
//! the simulation with a fixed-timestep accumulator the way an engine host
//! would, and logs what happens.

mod runner {
    use std::path::Path;

    use glam::Vec3;

    use lava_drop::consts::*;
    use lava_drop::sim::{
        EntityKind, GameEvent, MatchState, MoveCommand, PlatformManager, TickInput, tick,
    };
    use lava_drop::{AudioManager, Settings, horizontal_distance};

    /// Simulated render frame length
    const FRAME_DT: f32 = 1.0 / 30.0;
    /// Give up after this many frames (ten minutes)
    const MAX_FRAMES: u32 = 30 * 600;

    const PLATFORM_COUNT: u32 = 7;
    const RING_RADIUS: f32 = 5.0;
    const PLATFORM_RADIUS: f32 = 2.5;

    const BOT_NAMES: [&str; 4] = ["Rojo", "Azul", "Verde", "Oro"];

    /// Host-side game instance
    struct Game {
        state: MatchState,
        audio: AudioManager,
        accumulator: f32,
        human: u32,
        /// Where the scripted human is heading
        human_goal: Option<Vec3>,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            let platforms =
                PlatformManager::ring(PLATFORM_COUNT, RING_RADIUS, PLATFORM_RADIUS, &settings);
            let spawns: Vec<Vec3> = platforms.platforms.iter().map(|p| p.origin).collect();
            let mut state = MatchState::new(seed, settings, platforms);

            let human = state.add_player("You", EntityKind::Human, spawns[0]);
            for (i, name) in BOT_NAMES.iter().enumerate() {
                let spawn = spawns[(i + 1) % spawns.len()];
                state.add_player(*name, EntityKind::Ai, spawn);
            }

            Self {
                state,
                audio: AudioManager::new(),
                accumulator: 0.0,
                human,
                human_goal: None,
            }
        }

        /// Steer the human toward the announced platform
        fn human_input(&self) -> TickInput {
            let mut input = TickInput::default();
            let (Some(goal), Some(me)) = (self.human_goal, self.state.player(self.human)) else {
                return input;
            };
            if me.is_alive() && horizontal_distance(goal, me.pos) > 0.3 {
                input.moves.push(MoveCommand {
                    player_id: self.human,
                    dir: goal - me.pos,
                });
            }
            input
        }

        /// Run simulation ticks for one frame
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.human_input();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                for event in self.state.drain_events() {
                    self.handle_event(&event);
                }
            }
        }

        fn handle_event(&mut self, event: &GameEvent) {
            self.audio.handle_event(event);
            match event {
                GameEvent::SafePlatformSelected { index, .. } => {
                    self.human_goal = self.state.platforms.platforms.get(*index).map(|p| p.pos);
                }
                GameEvent::PlatformsReset => self.human_goal = None,
                GameEvent::RoundStarted { round } => log::info!("== Round {round} =="),
                GameEvent::PlayerEliminated { name, .. } => log::info!("{name} fell into the lava"),
                GameEvent::GameOver { winner, final_time } => {
                    log::info!("Winner: {winner} ({final_time:.2}s)");
                }
                _ => {}
            }
            for effect in self.audio.drain() {
                log::debug!("sfx {effect:?} at volume {:.2}", self.audio.effective_volume());
            }
        }
    }

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let settings = match args.next() {
            Some(path) => Settings::load_from(Path::new(&path)),
            None => Settings::default(),
        };
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(2026);

        log::info!("Lava Drop starting (seed {seed})");
        let mut game = Game::new(seed, settings);

        let mut frames = 0;
        while !game.state.is_game_over() && frames < MAX_FRAMES {
            game.update(FRAME_DT);
            frames += 1;
        }

        let state = &game.state;
        if state.is_game_over() {
            println!(
                "Game over after {} rounds. Winner: {}. Time: {:.2}s",
                state.round,
                state.winner.as_deref().unwrap_or(NO_WINNER),
                state.timer.elapsed()
            );
        } else {
            println!(
                "Stopped after {frames} frames in round {} with {} players standing",
                state.round,
                state.alive_count()
            );
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    runner::run();
}
