// keys
pub const MAX_KEY_LENGTH: usize = 253;

// ui
pub const MAX_VALUE_PREVIEW: usize = 48;
pub const SECRET_MASK: &str = "********";

// config
pub const CONFIG_DIR_NAME: &str = "kv-edit";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const ENDPOINT_ENV: &str = "KV_EDIT_ENDPOINT";
pub const TOKEN_ENV: &str = "KV_EDIT_TOKEN";

// backend
pub const HTTP_TIMEOUT_SECS: u64 = 30;
pub const TOKEN_COMMAND_TIMEOUT_SECS: u64 = 10;
