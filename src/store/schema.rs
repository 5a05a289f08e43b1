pub const SCHEMA: &str = r#"
-- Brands: global identity and default commercial terms
CREATE TABLE IF NOT EXISTS brands (
    brand_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    default_logo TEXT,
    default_affiliate_url TEXT,
    default_bonus TEXT,
    default_rating REAL,
    terms TEXT,
    license TEXT,
    pros TEXT NOT NULL DEFAULT '[]',
    cons TEXT NOT NULL DEFAULT '[]',
    description TEXT,
    website_url TEXT,
    founded_year INTEGER,
    owner TEXT,
    min_deposit TEXT,
    withdrawal_time TEXT,
    accepted_countries TEXT NOT NULL DEFAULT '[]',
    restricted_countries TEXT NOT NULL DEFAULT '[]',
    payment_methods TEXT NOT NULL DEFAULT '[]',
    currencies TEXT NOT NULL DEFAULT '[]',
    game_types TEXT NOT NULL DEFAULT '[]',
    game_providers TEXT NOT NULL DEFAULT '[]',
    languages TEXT NOT NULL DEFAULT '[]',
    support_email TEXT,
    support_channels TEXT NOT NULL DEFAULT '[]',
    has_mobile_app INTEGER NOT NULL DEFAULT 0,
    has_live_chat INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Sites: tenants, keyed by the dashed form of their domain
CREATE TABLE IF NOT EXISTS sites (
    site_key TEXT PRIMARY KEY,
    domain TEXT UNIQUE NOT NULL,
    name TEXT NOT NULL,
    serps TEXT NOT NULL DEFAULT '[]',
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Site-specific deal overrides for a brand
CREATE TABLE IF NOT EXISTS site_brands (
    site_key TEXT NOT NULL REFERENCES sites(site_key) ON DELETE CASCADE,
    brand_id TEXT NOT NULL REFERENCES brands(brand_id) ON DELETE RESTRICT,
    logo TEXT,
    bonus TEXT,
    affiliate_url TEXT,
    rating REAL,
    terms TEXT,
    pros TEXT,
    cons TEXT,
    welcome_package TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (site_key, brand_id)
);

-- Toplists: named ordered brand lists, one slug per site
CREATE TABLE IF NOT EXISTS toplists (
    id TEXT PRIMARY KEY,
    site_key TEXT NOT NULL REFERENCES sites(site_key) ON DELETE CASCADE,
    slug TEXT NOT NULL,
    title TEXT NOT NULL,
    columns TEXT NOT NULL DEFAULT '[]',
    column_labels TEXT NOT NULL DEFAULT '{}',
    pages TEXT NOT NULL DEFAULT '[]',
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),

    UNIQUE(site_key, slug)
);

-- Ranked entries; overrides win over site deals and brand defaults
CREATE TABLE IF NOT EXISTS toplist_items (
    id TEXT PRIMARY KEY,
    toplist_id TEXT NOT NULL REFERENCES toplists(id) ON DELETE CASCADE,
    brand_id TEXT NOT NULL REFERENCES brands(brand_id) ON DELETE RESTRICT,
    position INTEGER NOT NULL,
    logo_override TEXT,
    affiliate_url TEXT,
    bonus TEXT,
    rating REAL,
    cta TEXT,
    review_url TEXT,
    terms_override TEXT,
    license_override TEXT,
    pros_override TEXT,
    cons_override TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Dashboard users
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT UNIQUE NOT NULL,
    name TEXT,
    role TEXT NOT NULL DEFAULT 'editor',
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Sites an editor may manage
CREATE TABLE IF NOT EXISTS user_sites (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    site_key TEXT NOT NULL REFERENCES sites(site_key) ON DELETE CASCADE,
    PRIMARY KEY (user_id, site_key)
);

-- API keys
CREATE TABLE IF NOT EXISTS tokens (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,
    token_lookup TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0,
    user_id TEXT REFERENCES users(id) ON DELETE CASCADE,
    description TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,
    last_used_at TEXT
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_site_brands_brand ON site_brands(brand_id);
CREATE INDEX IF NOT EXISTS idx_toplists_site ON toplists(site_key);
CREATE INDEX IF NOT EXISTS idx_toplist_items_toplist ON toplist_items(toplist_id, position);
CREATE INDEX IF NOT EXISTS idx_toplist_items_brand ON toplist_items(brand_id);
CREATE INDEX IF NOT EXISTS idx_user_sites_site ON user_sites(site_key);
CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_lookup ON tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_tokens_user ON tokens(user_id);
"#;
