//! SQL schema for the Lore SQLite store.
//!
//! Executed once at connection startup. Set-valued fields (likers) are join
//! tables whose composite primary key enforces set semantics; like counts are
//! always derived from them.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id             TEXT PRIMARY KEY,
    email               TEXT NOT NULL UNIQUE,
    name                TEXT,
    photo_url           TEXT,
    role                TEXT NOT NULL DEFAULT 'user',   -- 'user' | 'admin'
    is_premium          INTEGER NOT NULL DEFAULT 0,
    premium_at          TEXT,
    transaction_json    TEXT,                           -- JSON Transaction or NULL
    transaction_id      TEXT,                           -- copy of transaction id
    created_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lessons (
    lesson_id       TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL,
    category        TEXT NOT NULL,
    emotional_tone  TEXT NOT NULL,
    image           TEXT,
    visibility      TEXT NOT NULL,   -- 'public' | 'private'
    access_level    TEXT NOT NULL,   -- 'free' | 'premium'
    author_email    TEXT NOT NULL,
    author_name     TEXT,
    author_image    TEXT,
    is_featured     INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lesson_likes (
    lesson_id  TEXT NOT NULL REFERENCES lessons(lesson_id) ON DELETE CASCADE,
    actor      TEXT NOT NULL,
    PRIMARY KEY (lesson_id, actor)
);

CREATE TABLE IF NOT EXISTS favorites (
    favorite_id      TEXT PRIMARY KEY,
    lesson_id        TEXT NOT NULL REFERENCES lessons(lesson_id) ON DELETE CASCADE,
    actor            TEXT NOT NULL,
    lesson_title     TEXT NOT NULL,
    lesson_image     TEXT,
    lesson_category  TEXT NOT NULL,
    created_at       TEXT NOT NULL,
    UNIQUE (lesson_id, actor)
);

-- A reply references its root comment; deleting the root removes replies.
CREATE TABLE IF NOT EXISTS comments (
    comment_id    TEXT PRIMARY KEY,
    lesson_id     TEXT NOT NULL REFERENCES lessons(lesson_id) ON DELETE CASCADE,
    parent_id     TEXT REFERENCES comments(comment_id) ON DELETE CASCADE,
    body          TEXT NOT NULL,
    author_email  TEXT NOT NULL,
    author_name   TEXT,
    author_image  TEXT,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS comment_likes (
    comment_id  TEXT NOT NULL REFERENCES comments(comment_id) ON DELETE CASCADE,
    actor       TEXT NOT NULL,
    PRIMARY KEY (comment_id, actor)
);

CREATE TABLE IF NOT EXISTS lesson_reports (
    report_id       TEXT PRIMARY KEY,
    lesson_id       TEXT NOT NULL REFERENCES lessons(lesson_id) ON DELETE CASCADE,
    reporter_email  TEXT NOT NULL,
    reason          TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS lessons_created_idx   ON lessons(created_at);
CREATE INDEX IF NOT EXISTS favorites_actor_idx   ON favorites(actor);
CREATE INDEX IF NOT EXISTS comments_lesson_idx   ON comments(lesson_id, created_at);
CREATE INDEX IF NOT EXISTS reports_lesson_idx    ON lesson_reports(lesson_id);

PRAGMA user_version = 1;
";
