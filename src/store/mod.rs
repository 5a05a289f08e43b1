mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use std::collections::HashSet;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Brand operations
    fn create_brand(&self, brand: &Brand) -> Result<()>;
    fn get_brand(&self, brand_id: &str) -> Result<Option<Brand>>;
    fn get_brands(&self, brand_ids: &[String]) -> Result<Vec<Brand>>;
    fn list_brands(&self, cursor: &str, limit: i32) -> Result<Vec<Brand>>;
    fn update_brand(&self, brand: &Brand) -> Result<()>;
    fn delete_brand(&self, brand_id: &str) -> Result<bool>;
    /// Returns the subset of `brand_ids` that exist, in a single query.
    fn existing_brand_ids(&self, brand_ids: &[String]) -> Result<HashSet<String>>;
    fn brand_usage(&self, brand_id: &str) -> Result<BrandUsage>;

    // Site operations
    fn create_site(&self, site: &Site) -> Result<()>;
    fn get_site(&self, site_key: &str) -> Result<Option<Site>>;
    fn list_sites(&self, cursor: &str, limit: i32) -> Result<Vec<Site>>;
    fn update_site(&self, site: &Site) -> Result<()>;
    fn delete_site(&self, site_key: &str) -> Result<bool>;

    // Site-brand deal operations
    fn upsert_site_brand(&self, site_brand: &SiteBrand) -> Result<()>;
    fn get_site_brand(&self, site_key: &str, brand_id: &str) -> Result<Option<SiteBrand>>;
    fn list_site_brands(&self, site_key: &str) -> Result<Vec<SiteBrand>>;
    fn delete_site_brand(&self, site_key: &str, brand_id: &str) -> Result<bool>;

    // Toplist operations
    /// Creates the toplist and its items in one transaction.
    fn create_toplist(&self, toplist: &Toplist, items: &[ToplistItem]) -> Result<()>;
    fn get_toplist(&self, site_key: &str, slug: &str) -> Result<Option<Toplist>>;
    fn list_toplists(&self, site_key: &str, cursor: &str, limit: i32) -> Result<Vec<Toplist>>;
    fn update_toplist(&self, toplist: &Toplist) -> Result<()>;
    fn delete_toplist(&self, id: &str) -> Result<bool>;
    fn list_toplist_items(&self, toplist_id: &str) -> Result<Vec<ToplistItem>>;
    /// Deletes every item of the toplist, inserts `items` and bumps `updated_at`, atomically.
    fn replace_toplist_items(&self, toplist_id: &str, items: &[ToplistItem]) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User, site_keys: &[String]) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>>;
    /// Updates the user row and, when given, replaces its site assignments in the same transaction.
    fn update_user(&self, user: &User, site_keys: Option<&[String]>) -> Result<()>;
    fn delete_user(&self, id: &str) -> Result<bool>;
    fn list_user_sites(&self, user_id: &str) -> Result<Vec<String>>;
    fn user_has_site(&self, user_id: &str, site_key: &str) -> Result<bool>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_id(&self, id: &str) -> Result<Option<Token>>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn list_tokens(&self, cursor: &str, limit: i32) -> Result<Vec<Token>>;
    fn list_user_tokens(&self, user_id: &str) -> Result<Vec<Token>>;
    fn delete_token(&self, id: &str) -> Result<bool>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;

    fn has_admin_token(&self) -> Result<bool>;
}
