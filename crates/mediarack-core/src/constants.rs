//! Shared constants.

/// Maximum length of a sanitized display name, in characters.
pub const MAX_DISPLAY_NAME_LEN: usize = 255;

/// Default timeout applied to metadata-probing HTTP requests, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
