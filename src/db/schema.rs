//! Database schema and migrations.
//!
//! Migrations are applied in order when the database is opened. The
//! `schema_version` table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: operators and their sessions
    r#"
CREATE TABLE operators (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    email           TEXT NOT NULL UNIQUE,
    password_hash   TEXT NOT NULL,           -- hex scrypt output
    password_salt   TEXT NOT NULL,           -- hex salt
    role            TEXT NOT NULL DEFAULT 'admin',
    created_at      TEXT NOT NULL
);

CREATE TABLE admin_sessions (
    token           TEXT PRIMARY KEY,
    operator_id     INTEGER NOT NULL REFERENCES operators(id) ON DELETE CASCADE,
    created_at      TEXT NOT NULL,
    expires_at      TEXT NOT NULL
);

CREATE INDEX idx_admin_sessions_expires_at ON admin_sessions(expires_at);
"#,
    // v2: submitted applications
    r#"
CREATE TABLE applications (
    id                TEXT PRIMARY KEY,      -- UUID v4, also the storage prefix
    created_at        TEXT NOT NULL,
    last_name         TEXT NOT NULL,
    middle_name       TEXT NOT NULL,
    first_name        TEXT NOT NULL,
    sex               TEXT NOT NULL,
    birth_date        TEXT NOT NULL,
    phone             TEXT NOT NULL,
    email             TEXT NOT NULL,
    address           TEXT,
    institution       TEXT NOT NULL,
    field_of_study    TEXT NOT NULL,
    level             TEXT NOT NULL,
    academic_year     TEXT,
    tools             TEXT NOT NULL DEFAULT '[]',  -- JSON array of names
    tool_proficiency  TEXT,
    motivation        TEXT,
    skills            TEXT,
    resume_path       TEXT NOT NULL,
    portfolio_path    TEXT,
    status            TEXT NOT NULL DEFAULT 'received',
    notes             TEXT
);

CREATE INDEX idx_applications_created_at ON applications(created_at);
"#,
];
