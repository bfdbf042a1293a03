pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS routes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL UNIQUE CHECK (path LIKE '/%' AND instr(path, '//') = 0),
    name TEXT,
    component TEXT,
    redirect TEXT,
    parent_id INTEGER REFERENCES routes(id),
    project_id TEXT,
    title TEXT,
    icon TEXT,
    requires_auth INTEGER NOT NULL DEFAULT 0,
    permission TEXT,
    keep_alive INTEGER NOT NULL DEFAULT 0,
    show_in_menu INTEGER NOT NULL DEFAULT 1,
    show_in_tabs INTEGER NOT NULL DEFAULT 1,
    "order" INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    icon TEXT,
    route_id INTEGER,
    route_path TEXT,
    last_clicked_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_routes_parent ON routes(parent_id);
CREATE INDEX IF NOT EXISTS idx_routes_project ON routes(project_id);
CREATE INDEX IF NOT EXISTS idx_cards_created ON cards(created_at);
"#;
