//! SQL DDL for the local cache. Every statement is idempotent so the schema
//! can be applied on each start.

/// - `characters`: one row per cached character, `id` is the API id.
///   Enums are stored as the API text, `episode_ids` as a JSON array,
///   `created_at` as RFC3339.
/// - `favourites`: character ids only; no foreign key so a favourite
///   survives the character row being evicted.
/// - `key_value`: small JSON blobs such as the settings record.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS characters (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    life_status TEXT NOT NULL,
    species TEXT NOT NULL,
    subtype TEXT NULL,
    gender TEXT NOT NULL,
    origin_name TEXT NOT NULL,
    origin_id INTEGER NULL,
    current_location_name TEXT NOT NULL,
    current_location_id INTEGER NULL,
    image_url TEXT NOT NULL,
    episode_ids TEXT NOT NULL DEFAULT '[]', -- JSON array
    api_url TEXT NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    next_key INTEGER NULL
);

CREATE INDEX IF NOT EXISTS idx_characters_name ON characters(name);

CREATE TABLE IF NOT EXISTS favourites (
    id INTEGER PRIMARY KEY NOT NULL
);

CREATE TABLE IF NOT EXISTS key_value (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
"#;
