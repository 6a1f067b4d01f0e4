/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Page returned when a listing query omits `page`
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when a listing query omits `limit`
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Record name bounds, in characters
pub const NAME_MIN_CHARS: usize = 5;
pub const NAME_MAX_CHARS: usize = 255;

/// Maximum email length, in characters
pub const EMAIL_MAX_CHARS: usize = 255;

/// Minimum message length, in characters
pub const MESSAGE_MIN_CHARS: usize = 3;

/// Interval between unconditional client refreshes
pub const REFRESH_INTERVAL_SECS: u64 = 10;
