pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const DEFAULT_TOTAL_TO_SPAWN: usize = 15;
pub const DEFAULT_FAKE_COUNT: usize = 5;
pub const DEFAULT_MIN_DISTANCE: f32 = 3.0;
pub const DEFAULT_POOL_SIZE_PER_ARCHETYPE: usize = 3;
pub const DEFAULT_SPAWN_WEIGHT: u32 = 50;
pub const MAX_SPAWN_WEIGHT: u32 = 100;
pub const DEFAULT_TOTAL_TIME_SECS: f32 = 180.0;
pub const DEFAULT_MAX_CHANCES: u32 = 3;
pub const DEFAULT_WIN_GRACE_DELAY_SECS: f32 = 0.5;
pub const DEFAULT_FEEDBACK_DISPLAY_SECS: f32 = 2.0;

pub const TIMER_WARNING_MS: u64 = 60_000;
pub const TIMER_TICKING_MS: u64 = 30_000;

pub fn secs_to_ms(secs: f32) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs as f64 * 1000.0).round() as u64
}
