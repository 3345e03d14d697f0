// participation
pub const PARTICIPATION_WINDOW: u64 = 64;
pub const PARTICIPATION_SCALE: u64 = 10_000;

// genesis defaults
pub const DEFAULT_BLOCK_INTERVAL: u64 = 3;
pub const DEFAULT_DELEGATES_PER_TERM: u32 = 21;
pub const DEFAULT_ROUNDS_PER_TERM: u64 = 12;
pub const DEFAULT_MAX_TRX_LIFETIME: u64 = 100;

// node defaults
pub const DEFAULT_DATABASE_DIR: &str = "./dpos-db";
pub const DEFAULT_MAILBOX_TIMEOUT_MS: u64 = 500;
