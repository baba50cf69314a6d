/// Version 1: the four record collections.
pub const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS blocked_sites (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS blocked_words (
    id TEXT PRIMARY KEY,
    word TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pause_states (
    id TEXT PRIMARY KEY,
    start_time TEXT NOT NULL,
    duration_minutes REAL NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS settings (
    id TEXT PRIMARY KEY,
    theme TEXT NOT NULL,
    custom_redirection_url TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Version 2: lookup indexes. Additive only.
pub const SCHEMA_V2: &str = r#"
CREATE INDEX IF NOT EXISTS idx_blocked_sites_created_at ON blocked_sites(created_at);
CREATE INDEX IF NOT EXISTS idx_blocked_words_created_at ON blocked_words(created_at);
CREATE INDEX IF NOT EXISTS idx_pause_states_active ON pause_states(is_active) WHERE is_active = 1;
"#;

/// Ordered migrations; the position (1-based) is the schema version.
pub const MIGRATIONS: &[&str] = &[SCHEMA_V1, SCHEMA_V2];
