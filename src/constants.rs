//! Configuration constants for the trivia engine
//!
//! This module contains the defaults, limits and storage keys used
//! throughout the crate so that every component agrees on the same
//! boundaries.

/// Round configuration constants
pub mod round {
    /// Number of questions requested for a round when nothing else is configured
    pub const DEFAULT_QUESTION_COUNT: usize = 10;
    /// Minimum number of questions a round may request
    pub const MIN_QUESTION_COUNT: usize = 1;
    /// Maximum number of questions the remote service hands out per request
    pub const MAX_QUESTION_COUNT: usize = 50;
}

/// Question content limits
pub mod question {
    /// Minimum length of a question prompt
    pub const MIN_PROMPT_LENGTH: usize = 1;
    /// Maximum length of a question prompt
    pub const MAX_PROMPT_LENGTH: usize = 1000;
    /// Minimum length of the correct answer text
    pub const MIN_ANSWER_LENGTH: usize = 1;
    /// Maximum length of a single answer text
    pub const MAX_ANSWER_LENGTH: usize = 500;
    /// Minimum number of incorrect answers accompanying a question
    pub const MIN_INCORRECT_ANSWERS: usize = 1;
    /// Maximum number of incorrect answers accompanying a question
    pub const MAX_INCORRECT_ANSWERS: usize = 7;
}

/// Player identity constants
pub mod identity {
    /// Storage key holding the player's name
    pub const KEY: &str = "username";
    /// Name used when the player submits without giving one
    pub const ANONYMOUS: &str = "Anonymous";
    /// Days a stored identity stays valid
    pub const DEFAULT_TTL_DAYS: u32 = 7;
    /// Maximum days an identity may be configured to live
    pub const MAX_TTL_DAYS: u32 = 365;
    /// Seconds in a day
    pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
}

/// Score ledger constants
pub mod ledger {
    /// Storage key holding the serialized list of score records
    pub const KEY: &str = "scores";
}

/// Remote question service constants
pub mod source {
    /// Endpoint of the Open Trivia Database
    pub const OPEN_TRIVIA_ENDPOINT: &str = "https://opentdb.com/api.php";
    /// Question type requested from the remote service
    pub const QUESTION_TYPE: &str = "multiple";
}
