//! Timed power modes and weather
//!
//! Each is a small state machine with a single timer (or charge) field that the
//! tick advances once per step.

use rand::Rng;

use crate::consts::*;
use crate::tuning::Tuning;

/// Jump charges plus the ballistic arc of the current jump
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JumpAbility {
    pub charges: u32,
    pub airborne: bool,
    pub height: f32,
    pub velocity: f32,
}

impl JumpAbility {
    /// Replace the charge count (pickups refill rather than stack)
    pub fn grant(&mut self, charges: u32) {
        self.charges = charges;
    }

    /// Start a jump if a charge is available and the truck is grounded
    pub fn try_jump(&mut self, velocity: f32) -> bool {
        if self.charges == 0 || self.airborne {
            return false;
        }
        self.charges -= 1;
        self.airborne = true;
        self.velocity = velocity;
        true
    }

    /// Integrate one tick of the arc; returns the truck's height above ground
    pub fn step(&mut self, gravity: f32) -> f32 {
        if !self.airborne {
            return 0.0;
        }
        self.velocity -= gravity;
        self.height += self.velocity;
        if self.height <= 0.0 {
            self.airborne = false;
            self.height = 0.0;
            self.velocity = 0.0;
        }
        self.height.max(0.0)
    }
}

/// Two-lane bonus mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BonusLaneMode {
    pub active: bool,
    /// Remaining ticks
    pub timer: f32,
    /// Ticks at activation (for the HUD bar)
    pub duration: f32,
}

impl BonusLaneMode {
    pub fn activate(&mut self, duration: f32) {
        self.active = true;
        self.timer = duration;
        self.duration = duration;
    }

    /// Count down one tick; returns true on the tick the mode expires
    pub fn step(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.timer -= 1.0;
        if self.timer <= 0.0 {
            self.active = false;
            self.timer = 0.0;
            return true;
        }
        false
    }

    /// Remaining fraction of the mode (1.0 just after activation)
    pub fn remaining(&self) -> f32 {
        if !self.active || self.duration <= 0.0 {
            return 0.0;
        }
        (self.timer / self.duration).clamp(0.0, 1.0)
    }
}

/// A rain streak in canvas space
#[derive(Debug, Clone, PartialEq)]
pub struct Raindrop {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub length: f32,
}

impl Raindrop {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            x: rng.random::<f32>() * CANVAS_WIDTH,
            y: rng.random::<f32>() * CANVAS_HEIGHT,
            speed: 8.0 + rng.random::<f32>() * 8.0,
            length: 10.0 + rng.random::<f32>() * 20.0,
        }
    }

    fn fall<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.y += self.speed;
        self.x -= self.speed * 0.3;
        if self.y > CANVAS_HEIGHT {
            self.y = -self.length;
            self.x = rng.random::<f32>() * CANVAS_WIDTH * 1.5;
        }
    }
}

/// Free-running storm cycle with rain and lightning
#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    pub storming: bool,
    /// Ticks until the next clear/storm transition
    pub timer: f32,
    /// Ticks before another strike may happen
    pub lightning_cooldown: f32,
    /// Remaining flash ticks (drives overlay intensity)
    pub lightning_flash: u32,
    pub raindrops: Vec<Raindrop>,
}

impl Weather {
    /// Clear skies with a randomized first dwell
    pub fn new<R: Rng + ?Sized>(rng: &mut R, tuning: &Tuning) -> Self {
        Self {
            storming: false,
            timer: tuning.clear_min_ticks + rng.random::<f32>() * tuning.clear_extra_ticks,
            lightning_cooldown: 0.0,
            lightning_flash: 0,
            raindrops: Vec::new(),
        }
    }

    /// Advance one tick; returns true when the sky changed state
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R, tuning: &Tuning) -> bool {
        let mut flipped = false;
        self.timer -= 1.0;
        if self.timer <= 0.0 {
            self.storming = !self.storming;
            self.timer = if self.storming {
                tuning.storm_min_ticks + rng.random::<f32>() * tuning.storm_extra_ticks
            } else {
                tuning.clear_min_ticks + rng.random::<f32>() * tuning.clear_extra_ticks
            };
            if self.storming {
                self.raindrops = (0..RAINDROP_COUNT).map(|_| Raindrop::random(rng)).collect();
            }
            flipped = true;
        }

        if self.storming {
            for drop in &mut self.raindrops {
                drop.fall(rng);
            }

            self.lightning_cooldown -= 1.0;
            if self.lightning_cooldown <= 0.0 && rng.random::<f32>() < tuning.lightning_chance {
                self.lightning_flash = LIGHTNING_FLASH_TICKS;
                self.lightning_cooldown = tuning.lightning_cooldown_min
                    + rng.random::<f32>() * tuning.lightning_cooldown_extra;
            }
            self.lightning_flash = self.lightning_flash.saturating_sub(1);
        }

        flipped
    }

    /// Overlay strength of the current flash in [0, 1]
    pub fn flash_intensity(&self) -> f32 {
        self.lightning_flash as f32 / LIGHTNING_FLASH_TICKS as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_jump_consumes_one_charge_and_lands_at_zero() {
        let tuning = Tuning::default();
        let mut jump = JumpAbility::default();
        assert!(!jump.try_jump(tuning.jump_velocity));

        jump.grant(tuning.jump_charges);
        assert!(jump.try_jump(tuning.jump_velocity));
        assert_eq!(jump.charges, 2);
        // Cannot re-trigger mid-air
        assert!(!jump.try_jump(tuning.jump_velocity));
        assert_eq!(jump.charges, 2);

        let mut peak: f32 = 0.0;
        let mut ticks = 0;
        while jump.airborne {
            peak = peak.max(jump.step(tuning.gravity));
            ticks += 1;
            assert!(ticks < 1000, "jump never landed");
        }
        assert!(peak > 0.0);
        assert_eq!(jump.height, 0.0);
        assert_eq!(jump.step(tuning.gravity), 0.0);
        assert!(jump.try_jump(tuning.jump_velocity));
    }

    #[test]
    fn test_grant_refills_rather_than_stacks() {
        let mut jump = JumpAbility::default();
        jump.grant(3);
        jump.grant(3);
        assert_eq!(jump.charges, 3);
    }

    #[test]
    fn test_bonus_mode_expires_after_duration() {
        let mut bonus = BonusLaneMode::default();
        assert!(!bonus.step());
        bonus.activate(10.0);
        assert_eq!(bonus.remaining(), 1.0);
        for _ in 0..9 {
            assert!(!bonus.step());
            assert!(bonus.active);
        }
        assert!(bonus.step());
        assert!(!bonus.active);
        assert_eq!(bonus.remaining(), 0.0);
    }

    #[test]
    fn test_weather_alternates_with_bounded_dwell() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut weather = Weather::new(&mut rng, &tuning);
        assert!(!weather.storming);
        assert!(weather.timer >= tuning.clear_min_ticks);
        assert!(weather.timer <= tuning.clear_min_ticks + tuning.clear_extra_ticks);

        let mut flips = 0;
        let mut dwell = 0u32;
        for _ in 0..20_000 {
            dwell += 1;
            let before = weather.storming;
            if weather.step(&mut rng, &tuning) {
                flips += 1;
                assert_ne!(before, weather.storming);
                let bound = if before {
                    tuning.storm_min_ticks + tuning.storm_extra_ticks
                } else {
                    tuning.clear_min_ticks + tuning.clear_extra_ticks
                };
                assert!(dwell as f32 <= bound + 1.0);
                dwell = 0;
                if weather.storming {
                    assert_eq!(weather.raindrops.len(), RAINDROP_COUNT);
                }
            }
        }
        assert!(flips >= 4);
    }

    #[test]
    fn test_raindrops_wrap_inside_canvas() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut weather = Weather::new(&mut rng, &tuning);
        weather.timer = 1.0;
        weather.step(&mut rng, &tuning);
        assert!(weather.storming);
        for _ in 0..300 {
            weather.step(&mut rng, &tuning);
            if !weather.storming {
                break;
            }
            for drop in &weather.raindrops {
                assert!(drop.y <= CANVAS_HEIGHT + drop.speed);
                assert!(drop.y >= -30.0);
            }
        }
    }

    #[test]
    fn test_lightning_flash_decays() {
        let mut tuning = Tuning::default();
        tuning.lightning_chance = 1.0;
        let mut rng = Pcg32::seed_from_u64(5);
        let mut weather = Weather::new(&mut rng, &tuning);
        weather.timer = 1.0;
        weather.step(&mut rng, &tuning);
        assert_eq!(weather.lightning_flash, LIGHTNING_FLASH_TICKS - 1);
        assert!(weather.lightning_cooldown >= tuning.lightning_cooldown_min);

        weather.step(&mut rng, &tuning);
        assert_eq!(weather.lightning_flash, LIGHTNING_FLASH_TICKS - 2);
        assert!(weather.flash_intensity() < 1.0);
    }
}
