use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::store::{SqliteStore, Store};
use crate::types::*;

/// Wraps a store so that existence checks always miss, as if a concurrent
/// importer created the record between the check and the insert.
///
/// With `fail_creates` set, brand and toplist inserts fail outright instead.
pub struct StaleReads {
    pub inner: SqliteStore,
    pub fail_creates: bool,
}

impl StaleReads {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            fail_creates: false,
        }
    }

    pub fn failing(inner: SqliteStore) -> Self {
        Self {
            inner,
            fail_creates: true,
        }
    }

    fn check_create(&self) -> Result<()> {
        if self.fail_creates {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        Ok(())
    }
}

impl Store for StaleReads {
    fn initialize(&self) -> Result<()> {
        self.inner.initialize()
    }

    fn create_brand(&self, brand: &Brand) -> Result<()> {
        self.check_create()?;
        self.inner.create_brand(brand)
    }

    fn get_brand(&self, _brand_id: &str) -> Result<Option<Brand>> {
        Ok(None)
    }

    fn get_brands(&self, brand_ids: &[String]) -> Result<Vec<Brand>> {
        self.inner.get_brands(brand_ids)
    }

    fn list_brands(&self, cursor: &str, limit: i32) -> Result<Vec<Brand>> {
        self.inner.list_brands(cursor, limit)
    }

    fn update_brand(&self, brand: &Brand) -> Result<()> {
        self.inner.update_brand(brand)
    }

    fn delete_brand(&self, brand_id: &str) -> Result<bool> {
        self.inner.delete_brand(brand_id)
    }

    fn existing_brand_ids(&self, brand_ids: &[String]) -> Result<HashSet<String>> {
        self.inner.existing_brand_ids(brand_ids)
    }

    fn brand_usage(&self, brand_id: &str) -> Result<BrandUsage> {
        self.inner.brand_usage(brand_id)
    }

    fn create_site(&self, site: &Site) -> Result<()> {
        self.inner.create_site(site)
    }

    fn get_site(&self, site_key: &str) -> Result<Option<Site>> {
        self.inner.get_site(site_key)
    }

    fn list_sites(&self, cursor: &str, limit: i32) -> Result<Vec<Site>> {
        self.inner.list_sites(cursor, limit)
    }

    fn update_site(&self, site: &Site) -> Result<()> {
        self.inner.update_site(site)
    }

    fn delete_site(&self, site_key: &str) -> Result<bool> {
        self.inner.delete_site(site_key)
    }

    fn upsert_site_brand(&self, site_brand: &SiteBrand) -> Result<()> {
        self.inner.upsert_site_brand(site_brand)
    }

    fn get_site_brand(&self, site_key: &str, brand_id: &str) -> Result<Option<SiteBrand>> {
        self.inner.get_site_brand(site_key, brand_id)
    }

    fn list_site_brands(&self, site_key: &str) -> Result<Vec<SiteBrand>> {
        self.inner.list_site_brands(site_key)
    }

    fn delete_site_brand(&self, site_key: &str, brand_id: &str) -> Result<bool> {
        self.inner.delete_site_brand(site_key, brand_id)
    }

    fn create_toplist(&self, toplist: &Toplist, items: &[ToplistItem]) -> Result<()> {
        self.check_create()?;
        self.inner.create_toplist(toplist, items)
    }

    fn get_toplist(&self, _site_key: &str, _slug: &str) -> Result<Option<Toplist>> {
        Ok(None)
    }

    fn list_toplists(&self, site_key: &str, cursor: &str, limit: i32) -> Result<Vec<Toplist>> {
        self.inner.list_toplists(site_key, cursor, limit)
    }

    fn update_toplist(&self, toplist: &Toplist) -> Result<()> {
        self.inner.update_toplist(toplist)
    }

    fn delete_toplist(&self, id: &str) -> Result<bool> {
        self.inner.delete_toplist(id)
    }

    fn list_toplist_items(&self, toplist_id: &str) -> Result<Vec<ToplistItem>> {
        self.inner.list_toplist_items(toplist_id)
    }

    fn replace_toplist_items(&self, toplist_id: &str, items: &[ToplistItem]) -> Result<()> {
        self.inner.replace_toplist_items(toplist_id, items)
    }

    fn create_user(&self, user: &User, site_keys: &[String]) -> Result<()> {
        self.inner.create_user(user, site_keys)
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.inner.get_user(id)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.inner.get_user_by_email(email)
    }

    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>> {
        self.inner.list_users(cursor, limit)
    }

    fn update_user(&self, user: &User, site_keys: Option<&[String]>) -> Result<()> {
        self.inner.update_user(user, site_keys)
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        self.inner.delete_user(id)
    }

    fn list_user_sites(&self, user_id: &str) -> Result<Vec<String>> {
        self.inner.list_user_sites(user_id)
    }

    fn user_has_site(&self, user_id: &str, site_key: &str) -> Result<bool> {
        self.inner.user_has_site(user_id, site_key)
    }

    fn create_token(&self, token: &Token) -> Result<()> {
        self.inner.create_token(token)
    }

    fn get_token_by_id(&self, id: &str) -> Result<Option<Token>> {
        self.inner.get_token_by_id(id)
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        self.inner.get_token_by_lookup(lookup)
    }

    fn list_tokens(&self, cursor: &str, limit: i32) -> Result<Vec<Token>> {
        self.inner.list_tokens(cursor, limit)
    }

    fn list_user_tokens(&self, user_id: &str) -> Result<Vec<Token>> {
        self.inner.list_user_tokens(user_id)
    }

    fn delete_token(&self, id: &str) -> Result<bool> {
        self.inner.delete_token(id)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.inner.update_token_last_used(id)
    }

    fn has_admin_token(&self) -> Result<bool> {
        self.inner.has_admin_token()
    }
}
