//! SQL schema for the Warden SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS applications (
    applicant_id          TEXT PRIMARY KEY,  -- decimal platform user id
    full_name             TEXT NOT NULL,
    email                 TEXT NOT NULL,
    target_username       TEXT NOT NULL,
    motivation            TEXT NOT NULL,
    favorite_aspect       TEXT NOT NULL,
    secondary_link_a      TEXT,
    secondary_link_b      TEXT,
    discussion_thread_ref TEXT NOT NULL,
    vote_message_ref      TEXT NOT NULL,
    source_message_ref    TEXT NOT NULL,
    expiry_at             TEXT NOT NULL,     -- RFC 3339 UTC; never updated
    thumbs_up             INTEGER,
    thumbs_down           INTEGER,
    outcome               TEXT CHECK (outcome IN ('approved', 'denied')),
    -- the verdict is written as a unit
    CHECK ((thumbs_up IS NULL) = (outcome IS NULL)),
    CHECK ((thumbs_down IS NULL) = (outcome IS NULL))
);

PRAGMA user_version = 1;
";
