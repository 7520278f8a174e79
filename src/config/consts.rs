/// Default host of the script listener inside the host application
pub const DEFAULT_LISTENER_HOST: &str = "127.0.0.1";
/// Default port of the script listener (the host's code listener default)
pub const DEFAULT_LISTENER_PORT: u16 = 614;
/// Connect and read timeout for the framed socket backend, in seconds
pub const DEFAULT_SOCKET_TIMEOUT_SECS: u64 = 10;
/// Size of the single response read performed by the socket backend
pub const DEFAULT_READ_BUFFER_BYTES: usize = 4096;
/// Upper bound on a length-prefixed listener response (16 MiB)
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;
/// Suffix of the temp file holding code sent to the listener
pub const DEFAULT_SCRIPT_SUFFIX: &str = ".py";
/// Suffix of the temp file holding a serialized host command
pub const COMMAND_FILE_SUFFIX: &str = ".json";
/// Prefix of every temp file the socket backend creates
pub const TEMP_FILE_PREFIX: &str = "gh_dispatch_";
/// Request timeout of the compute API client, in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
/// Operation budget of a single embedded script run
pub const SCRIPT_MAX_OPERATIONS: u64 = 5_000_000;
