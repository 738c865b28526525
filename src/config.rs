//! Application-level configuration constants.

// Countdown behavior
pub const DURATION_SECONDS: u32 = 60;
pub const TICK_MS: u32 = 1_000;
pub const FLASH_MS: u32 = 1_000;

// DOM contract
pub const TIMER_SELECTOR: &str = ".timer";
pub const DISPLAY_SELECTOR: &str = ".timer-display";
pub const EXPIRED_CLASS: &str = "expired";

// Keyboard
pub const SHORTCUT_KEYS: [&str; 3] = ["1", "2", "3"];

// Host page
pub const TIMER_COUNT: usize = 3;
