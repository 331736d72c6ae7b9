// =============================================================================
// Surprise-Me Matcher Constants
// =============================================================================
// Tunables and fixed wire values used by the match runner, kept in one place.

// =============================================================================
// CONNECT REQUESTS
// =============================================================================

/// Request type handled by the match runner
pub const REQUEST_TYPE_SURPRISE_ME: &str = "surpriseMe";

/// Request status values as stored in `connect_requests.status`
pub const REQUEST_STATUS_PENDING: &str = "pending";
pub const REQUEST_STATUS_MATCHED: &str = "matched";
pub const REQUEST_STATUS_EXPIRED: &str = "expired";

/// Unmatched requests older than this (relative to run start) are expired
pub const DEFAULT_EXPIRY_THRESHOLD_HOURS: i64 = 40;

/// Upper bound for a configured expiry threshold (100 years)
pub const MAX_EXPIRY_THRESHOLD_HOURS: i64 = 24 * 365 * 100;

// =============================================================================
// CHATROOMS
// =============================================================================

/// Chatroom type for rooms created by a match
pub const CHATROOM_TYPE_DIRECT: &str = "direct";

/// Chatroom type for multi-user rooms (never created here, only read)
pub const CHATROOM_TYPE_GROUP: &str = "group";

/// Category stamped on every room created by the match runner
pub const CHATROOM_CATEGORY_SURPRISE_ME: &str = "surprise-me";

/// A direct chatroom always has exactly this many participants
pub const DIRECT_CHATROOM_PARTICIPANTS: usize = 2;

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default server port if not specified in environment
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default pool size when DB_MAX_CONNECTIONS is not set
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Message returned with a successful run result
pub const RUN_SUCCESS_MESSAGE: &str = "Surprise-me requests processed successfully";

/// Log filter used when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str =
    "surprise_matcher=info,tower_http=debug,server=debug,match_once=debug";
