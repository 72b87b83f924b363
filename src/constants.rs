//! Application-wide constants for tuning and configuration
//!
//! Centralizes magic numbers to make them discoverable and configurable.

/// API base URL used when the config file and CLI leave it unset.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";

/// Messages per page when the config file leaves the limit unset.
pub const DEFAULT_LIMIT: u64 = 20;

/// Selectable "search last N days" windows. 0 means unbounded.
pub const DAY_WINDOW_PRESETS: [u32; 6] = [0, 1, 7, 30, 90, 365];

/// Input poll timeout in milliseconds while a request is in flight.
/// Shorter so spinner updates and responses appear promptly.
pub const POLL_LOADING_MS: u64 = 50;

/// Input poll timeout in milliseconds when idle.
pub const POLL_IDLE_MS: u64 = 150;

/// Spinner animation frame duration in milliseconds.
pub const SPINNER_FRAME_MS: u128 = 80;

/// Width of the date column in the list view.
pub const DATE_COLUMN_WIDTH: u16 = 26;
