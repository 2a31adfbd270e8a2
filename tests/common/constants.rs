//! Shared constants for end-to-end tests
//!
//! When the fixture catalog changes, update only this file.

// ============================================================================
// Fixture Catalog
// ============================================================================

/// Cheapest product, exact match for a bass-heavy Pop query under 500k
pub const BASSHEAD_POP_NAME: &str = "Bass Cannon";

/// Under 500k, bright, Pop
pub const BRIGHT_POP_NAME: &str = "Sparkle Mini";

/// Under 500k, neutral, Rock
pub const NEUTRAL_ROCK_NAME: &str = "Plain Jane";

/// Between 500k and 1jt, Jazz
pub const MID_JAZZ_NAME: &str = "Smooth Operator";

/// Between 1jt and 2jt, detail oriented, Jazz
pub const DETAIL_JAZZ_NAME: &str = "Crystal Pro";

/// Between 1jt and 2jt, EDM
pub const UPPER_EDM_NAME: &str = "Drop Master+";

/// Products priced under 500k in the fixture catalog
pub const UNDER_500K_COUNT: usize = 3;

/// Products in the whole fixture catalog
pub const CATALOG_SIZE: usize = 6;

/// Genres in the fixture catalog, in codebook order
pub const CATALOG_GENRES: [&str; 4] = ["EDM", "Jazz", "Pop", "Rock"];

// ============================================================================
// Request Values
// ============================================================================

pub const BUDGET_UNDER_500K: &str = "< 500k";
pub const BUDGET_1JT_2JT: &str = "1jt-2jt";
pub const BUDGET_ABOVE_2JT: &str = "> 2jt";

pub const BASS_HEAVY: &str = "Bass kuat";
pub const BALANCED: &str = "Seimbang";
pub const DETAILED: &str = "Detail / Jernih";

// ============================================================================
// Image relay
// ============================================================================

/// Relay body limit the test server runs with
pub const TEST_RELAY_MAX_BYTES: u64 = 64 * 1024;

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Timeout for individual test requests
pub const REQUEST_TIMEOUT_SECS: u64 = 5;
