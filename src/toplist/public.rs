use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::resolve::{ResolvedItem, SiteDeal, resolve, resolve_deal};
use crate::error::Result;
use crate::store::Store;
use crate::types::{Brand, SiteBrand};

/// The document served to downstream sites.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicToplist {
    pub site_key: String,
    pub slug: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<ResolvedItem>,
}

fn index_by_brand<T, F>(rows: Vec<T>, key: F) -> HashMap<String, T>
where
    F: Fn(&T) -> String,
{
    rows.into_iter().map(|row| (key(&row), row)).collect()
}

/// Loads a toplist and resolves each item against its site deal and brand.
///
/// Returns `None` when the toplist does not exist for the site. Items whose
/// brand row has vanished are skipped.
pub fn build_public_toplist(
    store: &dyn Store,
    site_key: &str,
    slug: &str,
) -> Result<Option<PublicToplist>> {
    let Some(toplist) = store.get_toplist(site_key, slug)? else {
        return Ok(None);
    };

    let items = store.list_toplist_items(&toplist.id)?;

    let brand_ids: Vec<String> = items.iter().map(|i| i.brand_id.clone()).collect();
    let brands: HashMap<String, Brand> =
        index_by_brand(store.get_brands(&brand_ids)?, |b| b.brand_id.clone());
    let deals: HashMap<String, SiteBrand> =
        index_by_brand(store.list_site_brands(site_key)?, |s| s.brand_id.clone());

    let resolved = items
        .iter()
        .filter_map(|item| {
            let Some(brand) = brands.get(&item.brand_id) else {
                tracing::warn!(brand_id = %item.brand_id, "Toplist item references unknown brand");
                return None;
            };
            Some(resolve(brand, deals.get(&item.brand_id), Some(item)))
        })
        .collect();

    Ok(Some(PublicToplist {
        site_key: toplist.site_key,
        slug: toplist.slug,
        title: toplist.title,
        updated_at: toplist.updated_at,
        items: resolved,
    }))
}

/// Resolves a page of brands as seen from one site, in `brand_id` order.
pub fn list_site_deals(
    store: &dyn Store,
    site_key: &str,
    cursor: &str,
    limit: i32,
) -> Result<Vec<SiteDeal>> {
    let brands = store.list_brands(cursor, limit)?;
    let deals: HashMap<String, SiteBrand> =
        index_by_brand(store.list_site_brands(site_key)?, |s| s.brand_id.clone());

    Ok(brands
        .iter()
        .map(|brand| resolve_deal(brand, deals.get(&brand.brand_id)))
        .collect())
}
