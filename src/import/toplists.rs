use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use indexmap::IndexMap;
use serde::Deserialize;

use super::{ImportReport, RecordError, decode};
use crate::error::{Error, Result};
use crate::naming::{title_from_slug, validate_slug};
use crate::store::Store;
use crate::toplist::{DEFAULT_COLUMNS, MAX_ITEMS};
use crate::types::{Rating, Toplist, ToplistItem};

/// `{"items": {...}, "toplists": {...}, "pageMapping": {...}}`
///
/// Toplists and pages keep the order of the document.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToplistImport {
    #[serde(default)]
    pub items: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub toplists: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub page_mapping: IndexMap<String, Vec<String>>,
}

/// One placement of a brand, referenced from toplist definitions by item id.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDescriptor {
    pub slug: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub affiliate_url: Option<String>,
    #[serde(default)]
    pub bonus: Option<String>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToplistDefinition {
    #[serde(default)]
    pub items: Vec<String>,
}

/// Inverts page → toplists into toplist → pages, keeping page order.
fn pages_by_toplist(page_mapping: &IndexMap<String, Vec<String>>) -> HashMap<&str, Vec<String>> {
    let mut pages: HashMap<&str, Vec<String>> = HashMap::new();
    for (page, slugs) in page_mapping {
        for slug in slugs {
            let entry = pages.entry(slug.as_str()).or_default();
            if !entry.contains(page) {
                entry.push(page.clone());
            }
        }
    }
    pages
}

/// Creates every toplist in `doc` that the site does not have yet.
///
/// Items pointing at unknown item ids or unknown brands are dropped with a
/// warning; surviving items get dense positions starting at 0, and anything
/// past [`MAX_ITEMS`] is dropped with a warning. Fails only if
/// the site does not exist.
pub fn import_toplists(store: &dyn Store, site_key: &str, doc: ToplistImport) -> Result<ImportReport> {
    store.get_site(site_key)?.ok_or(Error::NotFound)?;

    let mut report = ImportReport {
        total: doc.toplists.len(),
        ..Default::default()
    };

    let mut descriptors: HashMap<&str, ItemDescriptor> = HashMap::new();
    let mut bad_items: HashMap<&str, String> = HashMap::new();
    for (id, value) in &doc.items {
        match decode::<ItemDescriptor>(value.clone()) {
            Ok(d) => {
                descriptors.insert(id.as_str(), d);
            }
            Err(e) => {
                bad_items.insert(id.as_str(), e);
            }
        }
    }

    let brand_ids: Vec<String> = descriptors
        .values()
        .map(|d| d.slug.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let existing = store.existing_brand_ids(&brand_ids)?;

    let pages = pages_by_toplist(&doc.page_mapping);

    for (slug, value) in &doc.toplists {
        let definition: ToplistDefinition = match decode(value.clone()) {
            Ok(d) => d,
            Err(e) => {
                report.errors.push(RecordError::slugged(slug, e));
                continue;
            }
        };
        if let Err(e) = validate_slug(slug, "slug") {
            report.errors.push(RecordError::slugged(slug, e));
            continue;
        }

        match store.get_toplist(site_key, slug) {
            Ok(Some(_)) => {
                report.skipped += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                report.errors.push(RecordError::slugged(slug, e));
                continue;
            }
        }

        let now = Utc::now();
        let toplist = Toplist {
            id: uuid::Uuid::new_v4().to_string(),
            site_key: site_key.to_string(),
            slug: slug.clone(),
            title: title_from_slug(slug),
            columns: DEFAULT_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            column_labels: BTreeMap::new(),
            pages: pages.get(slug.as_str()).cloned().unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let mut items: Vec<ToplistItem> = Vec::new();
        let mut overflow = 0usize;
        for item_id in &definition.items {
            let Some(descriptor) = descriptors.get(item_id.as_str()) else {
                let reason = bad_items
                    .get(item_id.as_str())
                    .map_or("not defined", String::as_str);
                report
                    .warnings
                    .push(format!("{slug}: item '{item_id}' skipped ({reason})"));
                continue;
            };
            if !existing.contains(&descriptor.slug) {
                report.warnings.push(format!(
                    "{slug}: item '{item_id}' skipped (brand '{}' not found)",
                    descriptor.slug
                ));
                continue;
            }
            if items.len() == MAX_ITEMS {
                overflow += 1;
                continue;
            }

            let position = items.len() as i64;
            let mut item = ToplistItem::new(&toplist.id, &descriptor.slug, position);
            item.logo_override = descriptor.logo.clone();
            item.affiliate_url = descriptor.affiliate_url.clone();
            item.bonus = descriptor.bonus.clone();
            item.rating = descriptor.rating.map(f64::from);
            items.push(item);
        }
        if overflow > 0 {
            report.warnings.push(format!(
                "{slug}: {overflow} item(s) skipped (limit is {MAX_ITEMS})"
            ));
        }

        match store.create_toplist(&toplist, &items) {
            Ok(()) => {
                tracing::info!(site_key, slug = %slug, items = items.len(), "Imported toplist");
                report.imported += 1;
            }
            Err(Error::AlreadyExists) => report.skipped += 1,
            Err(e) => {
                tracing::warn!(site_key, slug = %slug, error = %e, "Toplist import failed");
                report.errors.push(RecordError::slugged(slug, e));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::import::test_support::StaleReads;
    use crate::store::SqliteStore;
    use crate::types::{Brand, Site};

    fn store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        store
            .create_site(&Site {
                site_key: "cazinou-io".to_string(),
                domain: "cazinou.io".to_string(),
                name: "Cazinou".to_string(),
                serps: Vec::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .unwrap();
        for id in ["betano", "unibet", "superbet"] {
            store.create_brand(&Brand::new(id, id)).unwrap();
        }
        store
    }

    fn payload() -> ToplistImport {
        serde_json::from_value(json!({
            "items": {
                "i1": { "slug": "betano", "bonus": "Exclusive 200%", "rating": "9.5" },
                "i2": { "slug": "ghost-casino" },
                "i3": { "slug": "unibet", "logo": "https://cdn.test/unibet.png" },
                "i4": { "slug": "superbet" }
            },
            "toplists": {
                "best-casinos-2024": { "items": ["i1", "i2", "i3", "i4"] },
                "new-casinos": { "items": ["i4", "missing"] }
            },
            "pageMapping": {
                "/": ["best-casinos-2024"],
                "/casino-online": ["best-casinos-2024", "new-casinos"]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_brand_becomes_warning() {
        let store = store();
        let report = import_toplists(&store, "cazinou-io", payload()).unwrap();
        assert_eq!(report.imported, 2);
        assert!(report.errors.is_empty());
        assert!(report.warnings.iter().any(|w| w.contains("ghost-casino")));
        assert!(report.warnings.iter().any(|w| w.contains("'missing'")));

        let list = store
            .get_toplist("cazinou-io", "best-casinos-2024")
            .unwrap()
            .unwrap();
        assert_eq!(list.title, "Best Casinos 2024");
        assert_eq!(list.pages, vec!["/", "/casino-online"]);

        let items = store.list_toplist_items(&list.id).unwrap();
        let placed: Vec<(&str, i64)> = items
            .iter()
            .map(|i| (i.brand_id.as_str(), i.position))
            .collect();
        assert_eq!(placed, vec![("betano", 0), ("unibet", 1), ("superbet", 2)]);
        assert_eq!(items[0].bonus.as_deref(), Some("Exclusive 200%"));
        assert_eq!(items[0].rating, Some(9.5));
        assert_eq!(items[1].logo_override.as_deref(), Some("https://cdn.test/unibet.png"));
    }

    #[test]
    fn test_three_brands_one_missing() {
        let store = store();
        let doc: ToplistImport = serde_json::from_value(json!({
            "items": {
                "a": { "slug": "betano" },
                "b": { "slug": "unibet" },
                "c": { "slug": "nowhere" }
            },
            "toplists": { "home": { "items": ["a", "c", "b"] } }
        }))
        .unwrap();

        let report = import_toplists(&store, "cazinou-io", doc).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("nowhere"));

        let list = store.get_toplist("cazinou-io", "home").unwrap().unwrap();
        assert_eq!(store.list_toplist_items(&list.id).unwrap().len(), 2);
    }

    #[test]
    fn test_existing_toplists_are_skipped() {
        let store = store();
        import_toplists(&store, "cazinou-io", payload()).unwrap();

        let report = import_toplists(&store, "cazinou-io", payload()).unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.total, 2);
    }

    #[test]
    fn test_bad_definitions_are_isolated() {
        let store = store();
        let doc: ToplistImport = serde_json::from_value(json!({
            "items": { "a": { "slug": "betano" } },
            "toplists": {
                "Bad Slug": { "items": ["a"] },
                "broken": { "items": "a" },
                "fine": { "items": ["a"] }
            }
        }))
        .unwrap();

        let report = import_toplists(&store, "cazinou-io", doc).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_pages_follow_document_order() {
        let store = store();
        let doc: ToplistImport = serde_json::from_value(json!({
            "items": { "a": { "slug": "betano" } },
            "toplists": {
                "zeta": { "items": ["a"] },
                "Alpha": { "items": ["a"] },
                "home": { "items": ["a"] }
            },
            "pageMapping": {
                "/z-page": ["home"],
                "/a-page": ["home", "zeta"],
                "/m-page": ["home"]
            }
        }))
        .unwrap();

        let report = import_toplists(&store, "cazinou-io", doc).unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.errors[0].slug.as_deref(), Some("Alpha"));

        let home = store.get_toplist("cazinou-io", "home").unwrap().unwrap();
        assert_eq!(home.pages, vec!["/z-page", "/a-page", "/m-page"]);
        let zeta = store.get_toplist("cazinou-io", "zeta").unwrap().unwrap();
        assert_eq!(zeta.pages, vec!["/a-page"]);
    }

    #[test]
    fn test_items_past_the_limit_are_dropped() {
        let store = store();
        let ids: Vec<String> = (0..MAX_ITEMS + 5).map(|i| format!("i{i}")).collect();
        let items: serde_json::Map<String, serde_json::Value> = ids
            .iter()
            .map(|id| (id.clone(), json!({ "slug": "betano" })))
            .collect();
        let doc: ToplistImport = serde_json::from_value(json!({
            "items": items,
            "toplists": { "long": { "items": ids } }
        }))
        .unwrap();

        let report = import_toplists(&store, "cazinou-io", doc).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.warnings, vec![format!("long: 5 item(s) skipped (limit is {MAX_ITEMS})")]);

        let list = store.get_toplist("cazinou-io", "long").unwrap().unwrap();
        let stored = store.list_toplist_items(&list.id).unwrap();
        assert_eq!(stored.len(), MAX_ITEMS);
        assert_eq!(stored.last().unwrap().position, MAX_ITEMS as i64 - 1);
    }

    #[test]
    fn test_toplist_created_concurrently_is_skipped() {
        let inner = store();
        import_toplists(&inner, "cazinou-io", payload()).unwrap();
        let store = StaleReads::new(inner);

        let report = import_toplists(&store, "cazinou-io", payload()).unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped, 2);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_failed_create_is_reported() {
        let store = StaleReads::failing(store());

        let report = import_toplists(&store, "cazinou-io", payload()).unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped, 0);
        let slugs: Vec<_> = report.errors.iter().map(|e| e.slug.clone().unwrap()).collect();
        assert_eq!(slugs, vec!["best-casinos-2024", "new-casinos"]);
        assert!(store.inner.get_toplist("cazinou-io", "new-casinos").unwrap().is_none());
    }

    #[test]
    fn test_unknown_site() {
        let store = store();
        assert!(matches!(
            import_toplists(&store, "nope", payload()),
            Err(Error::NotFound)
        ));
    }
}
