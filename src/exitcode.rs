//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (malformed Newick input)
pub const DATAERR: i32 = 65;

/// Site unreachable or page could not be retrieved
pub const UNAVAILABLE: i32 = 69;

/// Internal software error (HTTP client could not be built)
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
