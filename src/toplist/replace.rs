use serde::Deserialize;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Rating, ToplistItem};

/// Upper bound on items in one toplist.
pub const MAX_ITEMS: usize = 200;

/// One entry of a full item replacement, in display order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSpec {
    pub brand_id: String,
    #[serde(default)]
    pub logo_override: Option<String>,
    #[serde(default)]
    pub affiliate_url: Option<String>,
    #[serde(default)]
    pub bonus: Option<String>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub cta: Option<String>,
    #[serde(default)]
    pub review_url: Option<String>,
    #[serde(default)]
    pub terms_override: Option<String>,
    #[serde(default)]
    pub license_override: Option<String>,
    #[serde(default)]
    pub pros_override: Option<Vec<String>>,
    #[serde(default)]
    pub cons_override: Option<Vec<String>>,
}

impl ItemSpec {
    #[must_use]
    pub fn into_item(self, toplist_id: &str, position: i64) -> ToplistItem {
        ToplistItem {
            logo_override: self.logo_override,
            affiliate_url: self.affiliate_url,
            bonus: self.bonus,
            rating: self.rating.map(f64::from),
            cta: self.cta,
            review_url: self.review_url,
            terms_override: self.terms_override,
            license_override: self.license_override,
            pros_override: self.pros_override,
            cons_override: self.cons_override,
            ..ToplistItem::new(toplist_id, self.brand_id, position)
        }
    }
}

/// Checks an item list without touching the store.
pub fn validate_items(specs: &[ItemSpec]) -> Result<()> {
    if specs.len() > MAX_ITEMS {
        return Err(Error::BadRequest(format!(
            "a toplist cannot hold more than {MAX_ITEMS} items"
        )));
    }
    if let Some(index) = specs.iter().position(|s| s.brand_id.trim().is_empty()) {
        return Err(Error::BadRequest(format!("items[{index}].brandId is required")));
    }
    Ok(())
}

/// Fails with [`Error::MissingBrands`] naming every unknown brand, in input order.
pub fn ensure_brands_exist(store: &dyn Store, specs: &[ItemSpec]) -> Result<()> {
    let brand_ids: Vec<String> = specs.iter().map(|s| s.brand_id.clone()).collect();
    let existing = store.existing_brand_ids(&brand_ids)?;

    let mut missing: Vec<String> = Vec::new();
    for id in &brand_ids {
        if !existing.contains(id) && !missing.contains(id) {
            missing.push(id.clone());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingBrands(missing))
    }
}

/// Replaces every item of a toplist with `specs`, positioned by array index.
///
/// All referenced brands are checked up front in one query; if any is missing
/// nothing is written and [`Error::MissingBrands`] lists them in input order.
/// Returns the stored items in display order.
pub fn replace_items(
    store: &dyn Store,
    site_key: &str,
    slug: &str,
    specs: Vec<ItemSpec>,
) -> Result<Vec<ToplistItem>> {
    let toplist = store.get_toplist(site_key, slug)?.ok_or(Error::NotFound)?;

    validate_items(&specs)?;
    ensure_brands_exist(store, &specs)?;

    let items: Vec<ToplistItem> = specs
        .into_iter()
        .zip(0_i64..)
        .map(|(spec, position)| spec.into_item(&toplist.id, position))
        .collect();

    store.replace_toplist_items(&toplist.id, &items)?;

    tracing::info!(
        site_key,
        slug,
        count = items.len(),
        "Replaced toplist items"
    );

    Ok(items)
}
