/// Longest accepted learner id.
pub const MAX_LEARNER_ID_LEN: usize = 64;

/// Upper bound for `?limit=` on the recent responses listing.
pub const MAX_RESPONSES_LIMIT: usize = 100;

/// Upper bound for `?limit=` on the review queue listing.
pub const MAX_REVIEW_QUEUE_LIMIT: usize = 500;

/// Buffered ledger events per broadcast receiver before lagging.
pub const LEDGER_EVENT_CAPACITY: usize = 256;

/// Interval between SSE keep-alive comments, in seconds.
pub const SSE_KEEPALIVE_SECS: u64 = 15;

/// Maximum request body size: 64 KiB.
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Interval between idle learner session sweeps, in seconds.
pub const SESSION_SWEEP_SECS: u64 = 60;
