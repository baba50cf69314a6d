// src/constants.rs

/// Id of the singleton settings record
pub const SETTINGS_ID: &str = "default";

/// Redirect target used until the user picks their own
pub const DEFAULT_REDIRECTION_URL: &str = "https://www.goodreads.com/quotes/tag/positive-affirmations";

/// Scheme assumed for user input that carries none
pub const DEFAULT_SCHEME_PREFIX: &str = "https://";

/// Maximum pause length in minutes (24 hours)
pub const MAX_PAUSE_MINUTES: f64 = 24.0 * 60.0;

/// Minimum blocked word length
pub const MIN_WORD_LEN: usize = 2;

/// Maximum blocked word length
pub const MAX_WORD_LEN: usize = 30;

/// Maximum blocked site URL length
pub const MAX_SITE_URL_LEN: usize = 500;

/// Chrome limits native messaging to 1MB (1024 * 1024 bytes)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Frame id of a top-level (main frame) navigation
pub const MAIN_FRAME_ID: i64 = 0;

/// Longest blocked URL echoed back in a redirect frame
pub const MAX_ECHOED_URL_LEN: usize = 2048;
