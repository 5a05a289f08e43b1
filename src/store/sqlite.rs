use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database. Call `initialize` before use.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_json<T: DeserializeOwned + Default>(s: &str) -> T {
    serde_json::from_str(s).unwrap_or_else(|e| {
        tracing::error!("Invalid JSON column in database: '{}' - {}", s, e);
        T::default()
    })
}

fn parse_json_opt<T: DeserializeOwned + Default>(s: Option<String>) -> Option<T> {
    s.map(|s| parse_json(&s))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Error::from)
}

fn to_json_opt<T: Serialize>(value: Option<&T>) -> Result<Option<String>> {
    value.map(to_json).transpose()
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

const BRAND_COLUMNS: &str = "brand_id, name, default_logo, default_affiliate_url, default_bonus,
    default_rating, terms, license, pros, cons, description, website_url, founded_year, owner,
    min_deposit, withdrawal_time, accepted_countries, restricted_countries, payment_methods,
    currencies, game_types, game_providers, languages, support_email, support_channels,
    has_mobile_app, has_live_chat, created_at, updated_at";

fn brand_from_row(row: &Row<'_>) -> rusqlite::Result<Brand> {
    Ok(Brand {
        brand_id: row.get(0)?,
        name: row.get(1)?,
        default_logo: row.get(2)?,
        default_affiliate_url: row.get(3)?,
        default_bonus: row.get(4)?,
        default_rating: row.get(5)?,
        terms: row.get(6)?,
        license: row.get(7)?,
        pros: parse_json(&row.get::<_, String>(8)?),
        cons: parse_json(&row.get::<_, String>(9)?),
        description: row.get(10)?,
        website_url: row.get(11)?,
        founded_year: row.get(12)?,
        owner: row.get(13)?,
        min_deposit: row.get(14)?,
        withdrawal_time: row.get(15)?,
        accepted_countries: parse_json(&row.get::<_, String>(16)?),
        restricted_countries: parse_json(&row.get::<_, String>(17)?),
        payment_methods: parse_json(&row.get::<_, String>(18)?),
        currencies: parse_json(&row.get::<_, String>(19)?),
        game_types: parse_json(&row.get::<_, String>(20)?),
        game_providers: parse_json(&row.get::<_, String>(21)?),
        languages: parse_json(&row.get::<_, String>(22)?),
        support_email: row.get(23)?,
        support_channels: parse_json(&row.get::<_, String>(24)?),
        has_mobile_app: row.get(25)?,
        has_live_chat: row.get(26)?,
        created_at: parse_datetime(&row.get::<_, String>(27)?),
        updated_at: parse_datetime(&row.get::<_, String>(28)?),
    })
}

fn site_from_row(row: &Row<'_>) -> rusqlite::Result<Site> {
    Ok(Site {
        site_key: row.get(0)?,
        domain: row.get(1)?,
        name: row.get(2)?,
        serps: parse_json(&row.get::<_, String>(3)?),
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

const SITE_BRAND_COLUMNS: &str = "site_key, brand_id, logo, bonus, affiliate_url, rating, terms,
    pros, cons, welcome_package, is_active, created_at, updated_at";

fn site_brand_from_row(row: &Row<'_>) -> rusqlite::Result<SiteBrand> {
    Ok(SiteBrand {
        site_key: row.get(0)?,
        brand_id: row.get(1)?,
        logo: row.get(2)?,
        bonus: row.get(3)?,
        affiliate_url: row.get(4)?,
        rating: row.get(5)?,
        terms: row.get(6)?,
        pros: parse_json_opt(row.get(7)?),
        cons: parse_json_opt(row.get(8)?),
        welcome_package: row.get(9)?,
        is_active: row.get(10)?,
        created_at: parse_datetime(&row.get::<_, String>(11)?),
        updated_at: parse_datetime(&row.get::<_, String>(12)?),
    })
}

const TOPLIST_COLUMNS: &str =
    "id, site_key, slug, title, columns, column_labels, pages, created_at, updated_at";

fn toplist_from_row(row: &Row<'_>) -> rusqlite::Result<Toplist> {
    Ok(Toplist {
        id: row.get(0)?,
        site_key: row.get(1)?,
        slug: row.get(2)?,
        title: row.get(3)?,
        columns: parse_json(&row.get::<_, String>(4)?),
        column_labels: parse_json(&row.get::<_, String>(5)?),
        pages: parse_json(&row.get::<_, String>(6)?),
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        updated_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

const ITEM_COLUMNS: &str = "id, toplist_id, brand_id, position, logo_override, affiliate_url,
    bonus, rating, cta, review_url, terms_override, license_override, pros_override,
    cons_override, created_at";

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ToplistItem> {
    Ok(ToplistItem {
        id: row.get(0)?,
        toplist_id: row.get(1)?,
        brand_id: row.get(2)?,
        position: row.get(3)?,
        logo_override: row.get(4)?,
        affiliate_url: row.get(5)?,
        bonus: row.get(6)?,
        rating: row.get(7)?,
        cta: row.get(8)?,
        review_url: row.get(9)?,
        terms_override: row.get(10)?,
        license_override: row.get(11)?,
        pros_override: parse_json_opt(row.get(12)?),
        cons_override: parse_json_opt(row.get(13)?),
        created_at: parse_datetime(&row.get::<_, String>(14)?),
    })
}

fn insert_item(conn: &Connection, item: &ToplistItem) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO toplist_items ({ITEM_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            item.id,
            item.toplist_id,
            item.brand_id,
            item.position,
            item.logo_override,
            item.affiliate_url,
            item.bonus,
            item.rating,
            item.cta,
            item.review_url,
            item.terms_override,
            item.license_override,
            to_json_opt(item.pros_override.as_ref())?,
            to_json_opt(item.cons_override.as_ref())?,
            format_datetime(&item.created_at),
        ],
    )?;
    Ok(())
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role: Role::parse(&role).unwrap_or_else(|| {
            tracing::error!("Invalid role in database: '{}'", role);
            Role::Editor
        }),
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn insert_user_sites(conn: &Connection, user_id: &str, site_keys: &[String]) -> Result<()> {
    for site_key in site_keys {
        conn.execute(
            "INSERT OR IGNORE INTO user_sites (user_id, site_key) VALUES (?1, ?2)",
            params![user_id, site_key],
        )?;
    }
    Ok(())
}

const TOKEN_COLUMNS: &str = "id, token_hash, token_lookup, is_admin, user_id, description,
    created_at, expires_at, last_used_at";

fn token_from_row(row: &Row<'_>) -> rusqlite::Result<Token> {
    Ok(Token {
        id: row.get(0)?,
        token_hash: row.get(1)?,
        token_lookup: row.get(2)?,
        is_admin: row.get(3)?,
        user_id: row.get(4)?,
        description: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        expires_at: row.get::<_, Option<String>>(7)?.map(|s| parse_datetime(&s)),
        last_used_at: row.get::<_, Option<String>>(8)?.map(|s| parse_datetime(&s)),
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Brand operations

    fn create_brand(&self, brand: &Brand) -> Result<()> {
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO brands ({BRAND_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                             ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29)"
                ),
                params![
                    brand.brand_id,
                    brand.name,
                    brand.default_logo,
                    brand.default_affiliate_url,
                    brand.default_bonus,
                    brand.default_rating,
                    brand.terms,
                    brand.license,
                    to_json(&brand.pros)?,
                    to_json(&brand.cons)?,
                    brand.description,
                    brand.website_url,
                    brand.founded_year,
                    brand.owner,
                    brand.min_deposit,
                    brand.withdrawal_time,
                    to_json(&brand.accepted_countries)?,
                    to_json(&brand.restricted_countries)?,
                    to_json(&brand.payment_methods)?,
                    to_json(&brand.currencies)?,
                    to_json(&brand.game_types)?,
                    to_json(&brand.game_providers)?,
                    to_json(&brand.languages)?,
                    brand.support_email,
                    to_json(&brand.support_channels)?,
                    brand.has_mobile_app,
                    brand.has_live_chat,
                    format_datetime(&brand.created_at),
                    format_datetime(&brand.updated_at),
                ],
            )
            .map_err(Error::from_insert)?;
        Ok(())
    }

    fn get_brand(&self, brand_id: &str) -> Result<Option<Brand>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {BRAND_COLUMNS} FROM brands WHERE brand_id = ?1"),
            params![brand_id],
            brand_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_brands(&self, brand_ids: &[String]) -> Result<Vec<Brand>> {
        if brand_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE brand_id IN ({})",
            placeholders(brand_ids.len())
        ))?;

        let rows = stmt.query_map(params_from_iter(brand_ids.iter()), brand_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_brands(&self, cursor: &str, limit: i32) -> Result<Vec<Brand>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE brand_id > ?1 ORDER BY brand_id LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], brand_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_brand(&self, brand: &Brand) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE brands SET name = ?1, default_logo = ?2, default_affiliate_url = ?3,
                default_bonus = ?4, default_rating = ?5, terms = ?6, license = ?7, pros = ?8,
                cons = ?9, description = ?10, website_url = ?11, founded_year = ?12, owner = ?13,
                min_deposit = ?14, withdrawal_time = ?15, accepted_countries = ?16,
                restricted_countries = ?17, payment_methods = ?18, currencies = ?19,
                game_types = ?20, game_providers = ?21, languages = ?22, support_email = ?23,
                support_channels = ?24, has_mobile_app = ?25, has_live_chat = ?26, updated_at = ?27
             WHERE brand_id = ?28",
            params![
                brand.name,
                brand.default_logo,
                brand.default_affiliate_url,
                brand.default_bonus,
                brand.default_rating,
                brand.terms,
                brand.license,
                to_json(&brand.pros)?,
                to_json(&brand.cons)?,
                brand.description,
                brand.website_url,
                brand.founded_year,
                brand.owner,
                brand.min_deposit,
                brand.withdrawal_time,
                to_json(&brand.accepted_countries)?,
                to_json(&brand.restricted_countries)?,
                to_json(&brand.payment_methods)?,
                to_json(&brand.currencies)?,
                to_json(&brand.game_types)?,
                to_json(&brand.game_providers)?,
                to_json(&brand.languages)?,
                brand.support_email,
                to_json(&brand.support_channels)?,
                brand.has_mobile_app,
                brand.has_live_chat,
                format_datetime(&Utc::now()),
                brand.brand_id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_brand(&self, brand_id: &str) -> Result<bool> {
        let result = self
            .conn()
            .execute("DELETE FROM brands WHERE brand_id = ?1", params![brand_id]);

        match result {
            Ok(rows) => Ok(rows > 0),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::Conflict("brand is still referenced".to_string()))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn existing_brand_ids(&self, brand_ids: &[String]) -> Result<HashSet<String>> {
        if brand_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT brand_id FROM brands WHERE brand_id IN ({})",
            placeholders(brand_ids.len())
        ))?;

        let rows = stmt.query_map(params_from_iter(brand_ids.iter()), |row| row.get(0))?;

        rows.collect::<std::result::Result<HashSet<_>, _>>()
            .map_err(Error::from)
    }

    fn brand_usage(&self, brand_id: &str) -> Result<BrandUsage> {
        let conn = self.conn();
        let site_brands: i64 = conn.query_row(
            "SELECT COUNT(*) FROM site_brands WHERE brand_id = ?1",
            params![brand_id],
            |row| row.get(0),
        )?;
        let toplist_items: i64 = conn.query_row(
            "SELECT COUNT(*) FROM toplist_items WHERE brand_id = ?1",
            params![brand_id],
            |row| row.get(0),
        )?;
        Ok(BrandUsage {
            site_brands,
            toplist_items,
        })
    }

    // Site operations

    fn create_site(&self, site: &Site) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO sites (site_key, domain, name, serps, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    site.site_key,
                    site.domain,
                    site.name,
                    to_json(&site.serps)?,
                    format_datetime(&site.created_at),
                    format_datetime(&site.updated_at),
                ],
            )
            .map_err(Error::from_insert)?;
        Ok(())
    }

    fn get_site(&self, site_key: &str) -> Result<Option<Site>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT site_key, domain, name, serps, created_at, updated_at
             FROM sites WHERE site_key = ?1",
            params![site_key],
            site_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_sites(&self, cursor: &str, limit: i32) -> Result<Vec<Site>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT site_key, domain, name, serps, created_at, updated_at
             FROM sites WHERE site_key > ?1 ORDER BY site_key LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![cursor, limit], site_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_site(&self, site: &Site) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE sites SET name = ?1, serps = ?2, updated_at = ?3 WHERE site_key = ?4",
            params![
                site.name,
                to_json(&site.serps)?,
                format_datetime(&Utc::now()),
                site.site_key
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_site(&self, site_key: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM sites WHERE site_key = ?1", params![site_key])?;
        Ok(rows > 0)
    }

    // Site-brand deal operations

    fn upsert_site_brand(&self, sb: &SiteBrand) -> Result<()> {
        let result = self.conn().execute(
            &format!(
                "INSERT INTO site_brands ({SITE_BRAND_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                 ON CONFLICT(site_key, brand_id) DO UPDATE SET
                    logo = excluded.logo,
                    bonus = excluded.bonus,
                    affiliate_url = excluded.affiliate_url,
                    rating = excluded.rating,
                    terms = excluded.terms,
                    pros = excluded.pros,
                    cons = excluded.cons,
                    welcome_package = excluded.welcome_package,
                    is_active = excluded.is_active,
                    updated_at = excluded.updated_at"
            ),
            params![
                sb.site_key,
                sb.brand_id,
                sb.logo,
                sb.bonus,
                sb.affiliate_url,
                sb.rating,
                sb.terms,
                to_json_opt(sb.pros.as_ref())?,
                to_json_opt(sb.cons.as_ref())?,
                sb.welcome_package,
                sb.is_active,
                format_datetime(&sb.created_at),
                format_datetime(&sb.updated_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Err(Error::NotFound)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_site_brand(&self, site_key: &str, brand_id: &str) -> Result<Option<SiteBrand>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {SITE_BRAND_COLUMNS} FROM site_brands WHERE site_key = ?1 AND brand_id = ?2"
            ),
            params![site_key, brand_id],
            site_brand_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_site_brands(&self, site_key: &str) -> Result<Vec<SiteBrand>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SITE_BRAND_COLUMNS} FROM site_brands WHERE site_key = ?1 ORDER BY brand_id"
        ))?;

        let rows = stmt.query_map(params![site_key], site_brand_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_site_brand(&self, site_key: &str, brand_id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM site_brands WHERE site_key = ?1 AND brand_id = ?2",
            params![site_key, brand_id],
        )?;
        Ok(rows > 0)
    }

    // Toplist operations

    fn create_toplist(&self, toplist: &Toplist, items: &[ToplistItem]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO toplists ({TOPLIST_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                toplist.id,
                toplist.site_key,
                toplist.slug,
                toplist.title,
                to_json(&toplist.columns)?,
                to_json(&toplist.column_labels)?,
                to_json(&toplist.pages)?,
                format_datetime(&toplist.created_at),
                format_datetime(&toplist.updated_at),
            ],
        )
        .map_err(Error::from_insert)?;

        for item in items {
            insert_item(&tx, item)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_toplist(&self, site_key: &str, slug: &str) -> Result<Option<Toplist>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TOPLIST_COLUMNS} FROM toplists WHERE site_key = ?1 AND slug = ?2"),
            params![site_key, slug],
            toplist_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_toplists(&self, site_key: &str, cursor: &str, limit: i32) -> Result<Vec<Toplist>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOPLIST_COLUMNS} FROM toplists
             WHERE site_key = ?1 AND slug > ?2 ORDER BY slug LIMIT ?3"
        ))?;

        let rows = stmt.query_map(params![site_key, cursor, limit], toplist_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_toplist(&self, toplist: &Toplist) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE toplists SET slug = ?1, title = ?2, columns = ?3, column_labels = ?4,
                    pages = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    toplist.slug,
                    toplist.title,
                    to_json(&toplist.columns)?,
                    to_json(&toplist.column_labels)?,
                    to_json(&toplist.pages)?,
                    format_datetime(&Utc::now()),
                    toplist.id,
                ],
            )
            .map_err(Error::from_insert)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_toplist(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM toplists WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn list_toplist_items(&self, toplist_id: &str) -> Result<Vec<ToplistItem>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM toplist_items
             WHERE toplist_id = ?1 ORDER BY position, created_at"
        ))?;

        let rows = stmt.query_map(params![toplist_id], item_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn replace_toplist_items(&self, toplist_id: &str, items: &[ToplistItem]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM toplist_items WHERE toplist_id = ?1",
            params![toplist_id],
        )?;

        for item in items {
            insert_item(&tx, item)?;
        }

        let rows = tx.execute(
            "UPDATE toplists SET updated_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), toplist_id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }

        tx.commit()?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User, site_keys: &[String]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO users (id, email, name, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.email,
                user.name,
                user.role.as_str(),
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        )
        .map_err(Error::from_insert)?;

        insert_user_sites(&tx, &user.id, site_keys)?;

        tx.commit()?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, email, name, role, created_at, updated_at FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, email, name, role, created_at, updated_at FROM users WHERE email = ?1",
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, email, name, role, created_at, updated_at
             FROM users WHERE id > ?1 ORDER BY id LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![cursor, limit], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User, site_keys: Option<&[String]>) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx
            .execute(
                "UPDATE users SET email = ?1, name = ?2, role = ?3, updated_at = ?4 WHERE id = ?5",
                params![
                    user.email,
                    user.name,
                    user.role.as_str(),
                    format_datetime(&Utc::now()),
                    user.id
                ],
            )
            .map_err(Error::from_insert)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }

        if let Some(site_keys) = site_keys {
            tx.execute("DELETE FROM user_sites WHERE user_id = ?1", params![user.id])?;
            insert_user_sites(&tx, &user.id, site_keys)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn list_user_sites(&self, user_id: &str) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT site_key FROM user_sites WHERE user_id = ?1 ORDER BY site_key",
        )?;

        let rows = stmt.query_map(params![user_id], |row| row.get(0))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn user_has_site(&self, user_id: &str, site_key: &str) -> Result<bool> {
        let conn = self.conn();
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM user_sites WHERE user_id = ?1 AND site_key = ?2",
            params![user_id, site_key],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, is_admin, user_id, description, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.is_admin,
                token.user_id,
                token.description,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(Error::TokenLookupCollision)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_id(&self, id: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE id = ?1"),
            params![id],
            token_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE token_lookup = ?1"),
            params![lookup],
            token_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_tokens(&self, cursor: &str, limit: i32) -> Result<Vec<Token>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens WHERE id > ?1 ORDER BY id LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], token_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_user_tokens(&self, user_id: &str) -> Result<Vec<Token>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens WHERE user_id = ?1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![user_id], token_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_token(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tokens WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    fn has_admin_token(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM tokens WHERE is_admin = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
