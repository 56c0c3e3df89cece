//! Game state and core simulation types
//!
//! Everything the frame loop mutates lives in one owned [`GameState`].

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::modes::{BonusLaneMode, JumpAbility, Weather};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::tuning::Tuning;

/// Top-level state shared with the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen; the scene is drawn once and not simulated
    Menu,
    /// Active run
    Playing,
    /// Run ended, final score reported
    GameOver,
}

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    TrashCan,
    Ellison,
}

/// Collectible variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectibleKind {
    Bottle,
    Can,
    Glass,
    Gameboy,
    Gorbhouse,
    Gorbhouse2,
    Gorboy,
    Trashcoin,
    Oscar,
    Lexnode,
}

impl CollectibleKind {
    pub const ALL: [CollectibleKind; 10] = [
        CollectibleKind::Bottle,
        CollectibleKind::Can,
        CollectibleKind::Glass,
        CollectibleKind::Gameboy,
        CollectibleKind::Gorbhouse,
        CollectibleKind::Gorbhouse2,
        CollectibleKind::Gorboy,
        CollectibleKind::Trashcoin,
        CollectibleKind::Oscar,
        CollectibleKind::Lexnode,
    ];

    /// World extents as (width, height, depth)
    pub fn size(self) -> Vec3 {
        match self {
            CollectibleKind::Gameboy => Vec3::new(50.0, 75.0, 20.0),
            CollectibleKind::Bottle => Vec3::new(30.0, 50.0, 30.0),
            CollectibleKind::Can => Vec3::new(35.0, 40.0, 35.0),
            CollectibleKind::Glass => Vec3::new(30.0, 55.0, 30.0),
            CollectibleKind::Gorbhouse => Vec3::new(100.0, 100.0, 40.0),
            CollectibleKind::Gorbhouse2 => Vec3::new(100.0, 100.0, 40.0),
            CollectibleKind::Gorboy => Vec3::new(120.0, 120.0, 45.0),
            CollectibleKind::Trashcoin => Vec3::new(110.0, 110.0, 40.0),
            CollectibleKind::Oscar => Vec3::new(120.0, 160.0, 50.0),
            CollectibleKind::Lexnode => Vec3::new(90.0, 90.0, 35.0),
        }
    }

    /// Score before the multiplier is applied
    pub fn base_score(self) -> u32 {
        match self {
            CollectibleKind::Gameboy => 50,
            CollectibleKind::Bottle => 10,
            CollectibleKind::Can => 15,
            CollectibleKind::Glass => 20,
            CollectibleKind::Gorbhouse => 30,
            CollectibleKind::Gorbhouse2 => 35,
            CollectibleKind::Gorboy => 40,
            CollectibleKind::Trashcoin => 25,
            CollectibleKind::Oscar => 100,
            CollectibleKind::Lexnode => 45,
        }
    }
}

/// What an entity is; obstacles and collectibles each carry their variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Obstacle(ObstacleKind),
    Collectible(CollectibleKind),
}

impl EntityKind {
    pub fn size(self) -> Vec3 {
        match self {
            EntityKind::Obstacle(_) => Vec3::new(OBSTACLE_WIDTH, OBSTACLE_HEIGHT, OBSTACLE_DEPTH),
            EntityKind::Collectible(kind) => kind.size(),
        }
    }

    pub fn is_obstacle(self) -> bool {
        matches!(self, EntityKind::Obstacle(_))
    }
}

/// An obstacle or collectible travelling toward the camera
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub lane: usize,
    /// World position; y is the base of the entity
    pub pos: Vec3,
    /// (width, height, depth)
    pub size: Vec3,
    /// Terminal: once set the entity no longer collides and is culled next tick
    pub collected: bool,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, lane: usize, z: f32) -> Self {
        Self {
            id,
            kind,
            lane,
            pos: Vec3::new(LANE_X_POSITIONS[lane.min(LANE_COUNT - 1)], 0.0, z),
            size: kind.size(),
            collected: false,
        }
    }
}

/// The player's truck
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// 0..=2; only 0 or 2 while bonus mode is active
    pub lane: usize,
    pub pos: Vec3,
    pub size: Vec3,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            lane: 1,
            pos: Vec3::new(LANE_X_POSITIONS[1], 0.0, PLAYER_Z),
            size: Vec3::new(PLAYER_WIDTH, PLAYER_HEIGHT, PLAYER_DEPTH),
        }
    }
}

impl Player {
    /// Lateral position the truck is steering toward
    pub fn target_x(&self, bonus_active: bool) -> f32 {
        if bonus_active {
            // Left lane maps to the left bonus lane, anything else to the right
            let bonus_lane = if self.lane == 0 { 0 } else { 1 };
            BONUS_LANE_X_POSITIONS[bonus_lane]
        } else {
            LANE_X_POSITIONS[self.lane.min(LANE_COUNT - 1)]
        }
    }

    /// Ease toward the target lane by a fixed fraction of the remaining distance
    pub fn steer(&mut self, bonus_active: bool) {
        let target = self.target_x(bonus_active);
        self.pos.x += (target - self.pos.x) * LANE_SWITCH_SPEED;
    }
}

/// Cash bill flying off the back of the truck (visual only)
#[derive(Debug, Clone, PartialEq)]
pub struct CashParticle {
    pub pos: Vec3,
    pub vel: Vec3,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// 1.0 at spawn, culled at 0
    pub life: f32,
    /// Lifetime in ticks
    pub max_life: f32,
    pub scale: f32,
}

impl CashParticle {
    pub fn step(&mut self) {
        self.pos += self.vel;
        self.vel.y -= 0.02;
        self.rotation += self.rotation_speed;
        self.life -= 1.0 / self.max_life;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0 && self.pos.z > -CAMERA_DISTANCE - 200.0
    }
}

/// Discrete player intents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
}

/// Outbound notifications for the shell (drained once per frame)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    ScoreChanged(u64),
    LivesChanged(u8),
    MultiplierChanged(u32),
    Sound(SoundEffect),
    GameOver { final_score: u64 },
}

/// Sky theme, picked from the local clock when a run starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeOfDay {
    #[default]
    Day,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            h if h >= 20 || h < 6 => TimeOfDay::Night,
            17..=19 => TimeOfDay::Evening,
            _ => TimeOfDay::Day,
        }
    }
}

/// Complete simulation state, owned by the frame loop
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub rng: Pcg32,

    pub player: Player,
    /// Live entities in creation order
    pub entities: Vec<Entity>,

    /// World units per tick
    pub speed: f32,
    /// Speed at the last "speed up" cue
    pub speed_milestone: f32,
    /// Ticks until the next spawn attempt
    pub spawn_timer: f32,

    pub score: u64,
    pub lives: u8,
    /// Consecutive pickups since the last hit
    pub combo: u32,
    pub multiplier: u32,

    /// Remaining screen-shake ticks
    pub screen_shake: u32,
    pub cash: Vec<CashParticle>,
    pub weather: Weather,
    pub jump: JumpAbility,
    pub bonus: BonusLaneMode,
    pub time_of_day: TimeOfDay,

    /// Lane marker scroll (0..ROAD_MARKER_PERIOD)
    pub road_offset: f32,
    /// Simulation tick counter
    pub time_ticks: u64,

    next_id: u32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a state sitting at the menu with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let weather = Weather::new(&mut rng, &tuning);
        Self {
            seed,
            phase: GamePhase::Menu,
            rng,
            player: Player::default(),
            entities: Vec::new(),
            speed: tuning.initial_speed,
            speed_milestone: tuning.initial_speed,
            spawn_timer: 0.0,
            score: 0,
            lives: tuning.max_lives,
            combo: 0,
            multiplier: 1,
            screen_shake: 0,
            cash: Vec::new(),
            weather,
            jump: JumpAbility::default(),
            bonus: BonusLaneMode::default(),
            time_of_day: TimeOfDay::default(),
            road_offset: 0.0,
            time_ticks: 0,
            next_id: 1,
            events: Vec::new(),
            tuning,
        }
    }

    /// Reinitialize every transient field and enter `Playing`
    pub fn start_run(&mut self, seed: u64) {
        let tuning = self.tuning.clone();
        let time_of_day = self.time_of_day;
        *self = Self::with_tuning(seed, tuning);
        self.time_of_day = time_of_day;
        self.phase = GamePhase::Playing;

        self.emit(GameEvent::ScoreChanged(0));
        self.emit(GameEvent::LivesChanged(self.lives));
        self.emit(GameEvent::MultiplierChanged(1));
        log::info!("Run started (seed {seed})");
    }

    /// Leave a finished run and clear the road for the menu backdrop
    pub fn enter_menu(&mut self) {
        let tuning = self.tuning.clone();
        let time_of_day = self.time_of_day;
        *self = Self::with_tuning(self.seed, tuning);
        self.time_of_day = time_of_day;
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, sound: SoundEffect) {
        self.emit(GameEvent::Sound(sound));
    }

    /// Take all events queued since the last drain, in emission order
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_waits_at_menu() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.lives, 3);
        assert_eq!(state.multiplier, 1);
        assert_eq!(state.player.lane, 1);
        assert!(!state.weather.storming);
    }

    #[test]
    fn test_start_run_resets_and_notifies() {
        let mut state = GameState::new(7);
        state.score = 500;
        state.lives = 1;
        state.combo = 4;
        state.multiplier = 3;
        state.time_of_day = TimeOfDay::Night;
        state.entities.push(Entity::new(99, EntityKind::Obstacle(ObstacleKind::TrashCan), 0, 100.0));

        state.start_run(8);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, state.tuning.max_lives);
        assert_eq!((state.combo, state.multiplier), (0, 1));
        assert!(state.entities.is_empty());
        assert_eq!(state.time_of_day, TimeOfDay::Night);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::ScoreChanged(0),
                GameEvent::LivesChanged(3),
                GameEvent::MultiplierChanged(1),
            ]
        );
        assert!(state.pending_events().is_empty());
    }

    #[test]
    fn test_enter_menu_clears_finished_run() {
        let mut state = GameState::new(7);
        state.start_run(8);
        state.time_of_day = TimeOfDay::Evening;
        state.entities.push(Entity::new(99, EntityKind::Obstacle(ObstacleKind::Ellison), 2, 300.0));
        state.cash.push(CashParticle {
            pos: Vec3::new(0.0, 50.0, PLAYER_Z),
            vel: Vec3::ZERO,
            rotation: 0.0,
            rotation_speed: 0.1,
            life: 1.0,
            max_life: 60.0,
            scale: 1.0,
        });
        state.weather.storming = true;
        state.screen_shake = 12;
        state.phase = GamePhase::GameOver;

        state.enter_menu();
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(state.entities.is_empty());
        assert!(state.cash.is_empty());
        assert!(!state.weather.storming);
        assert_eq!(state.screen_shake, 0);
        assert_eq!(state.time_of_day, TimeOfDay::Evening);
        assert!(state.pending_events().is_empty());
    }

    #[test]
    fn test_entity_ids_are_creation_ordered() {
        let mut state = GameState::new(1);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_time_of_day_bands() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Night);
    }

    #[test]
    fn test_bonus_target_x_has_two_positions() {
        let mut player = Player::default();
        player.lane = 0;
        assert_eq!(player.target_x(true), -LANE_WIDTH);
        player.lane = 2;
        assert_eq!(player.target_x(true), LANE_WIDTH);
        player.lane = 1;
        assert_eq!(player.target_x(false), 0.0);
    }

    #[test]
    fn test_steer_eases_exponentially() {
        let mut player = Player::default();
        player.lane = 2;
        player.steer(false);
        assert!((player.pos.x - LANE_WIDTH * LANE_SWITCH_SPEED).abs() < 1e-4);
        for _ in 0..200 {
            player.steer(false);
        }
        assert!((player.pos.x - LANE_WIDTH).abs() < 0.01);
    }
}
