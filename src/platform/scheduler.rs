//! Frame loop scheduling
//!
//! `requestAnimationFrame` timestamps go in, a number of fixed simulation ticks
//! comes out. The loop is only rescheduled while a run is in progress; menus and
//! the game-over screen are drawn once and then the loop goes idle.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::GamePhase;

/// Longest frame delta fed into the accumulator (seconds)
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Nothing scheduled; a single redraw happens on demand
    #[default]
    Idle,
    /// Rescheduled every animation frame
    Running,
}

/// Fixed-timestep accumulator plus the idle/running loop state
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    state: LoopState,
    accumulator: f32,
    /// Previous frame timestamp in milliseconds
    last_time: Option<f64>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Enter the running state with a fresh accumulator.
    ///
    /// Returns true if the loop was idle, i.e. the caller must request the
    /// first animation frame.
    pub fn start(&mut self) -> bool {
        let was_idle = self.state == LoopState::Idle;
        self.state = LoopState::Running;
        self.accumulator = 0.0;
        self.last_time = None;
        was_idle
    }

    /// Stop rescheduling after the current frame
    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            log::debug!("Frame loop idle");
        }
        self.state = LoopState::Idle;
    }

    /// Follow the game phase: run while playing, idle otherwise
    pub fn sync_with(&mut self, phase: GamePhase) {
        match phase {
            GamePhase::Playing => {
                if !self.is_running() {
                    self.start();
                }
            }
            GamePhase::Menu | GamePhase::GameOver => self.stop(),
        }
    }

    /// Feed one frame timestamp (ms) and get the number of ticks to simulate
    pub fn advance(&mut self, time_ms: f64) -> u32 {
        if !self.is_running() {
            return 0;
        }

        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time = Some(time_ms);
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop the backlog instead of replaying it at catch-up speed
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_scheduler_runs_nothing() {
        let mut s = FrameScheduler::new();
        assert_eq!(s.state(), LoopState::Idle);
        assert_eq!(s.advance(16.0), 0);
        assert_eq!(s.advance(1000.0), 0);
    }

    #[test]
    fn test_first_frame_runs_one_tick() {
        let mut s = FrameScheduler::new();
        assert!(s.start());
        assert_eq!(s.advance(5000.0), 1);
        // Already running: no second rAF request needed
        assert!(!s.start());
    }

    #[test]
    fn test_steady_60hz_runs_one_tick_per_frame() {
        let mut s = FrameScheduler::new();
        s.start();
        let frame_ms = 1000.0 / 60.0;
        let mut t = 0.0;
        let mut total = s.advance(t);
        for _ in 0..120 {
            t += frame_ms;
            total += s.advance(t);
        }
        assert!((120..=122).contains(&total), "total ticks {total}");
    }

    #[test]
    fn test_long_stall_is_capped() {
        let mut s = FrameScheduler::new();
        s.start();
        s.advance(0.0);
        assert_eq!(s.advance(10_000.0), MAX_SUBSTEPS);
    }

    #[test]
    fn test_slow_stretch_does_not_replay_backlog() {
        let mut s = FrameScheduler::new();
        s.start();
        let mut t = 0.0;
        s.advance(t);
        // 10 fps owes 6 ticks per frame but only 4 may run
        for _ in 0..100 {
            t += 100.0;
            assert_eq!(s.advance(t), MAX_SUBSTEPS);
        }

        let frame_ms = 1000.0 / 60.0;
        let mut recovered = 0;
        for _ in 0..60 {
            t += frame_ms;
            recovered += s.advance(t);
        }
        assert!((60..=62).contains(&recovered), "recovered ticks {recovered}");
    }

    #[test]
    fn test_follows_game_phase() {
        let mut s = FrameScheduler::new();
        s.sync_with(GamePhase::Playing);
        assert!(s.is_running());
        s.advance(0.0);
        s.sync_with(GamePhase::GameOver);
        assert_eq!(s.state(), LoopState::Idle);
        assert_eq!(s.advance(16.0), 0);
        s.sync_with(GamePhase::Menu);
        assert!(!s.is_running());
    }
}
