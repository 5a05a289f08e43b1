use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Deserialize;

use super::{ImportReport, RecordError, decode};
use crate::error::Error;
use crate::media::LogoPipeline;
use crate::naming::validate_slug;
use crate::store::Store;
use crate::types::{Brand, Rating};

/// `{"brands": {"<display name>": {...}}}`, processed in document order.
#[derive(Debug, Deserialize)]
pub struct BrandImport {
    pub brands: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDescriptor {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub affiliate_url: Option<String>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub bonus: Option<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

enum Outcome {
    Imported,
    Skipped,
}

/// Creates every brand in `doc` whose slug is not taken yet. Existing brands are never touched.
pub async fn import_brands<L: LogoPipeline>(
    store: &dyn Store,
    logos: &L,
    doc: BrandImport,
) -> ImportReport {
    let mut report = ImportReport {
        total: doc.brands.len(),
        ..Default::default()
    };
    let mut seen: HashSet<String> = HashSet::new();

    for (name, value) in doc.brands {
        match import_one(store, logos, &name, value, &mut seen, &mut report.warnings).await {
            Ok(Outcome::Imported) => report.imported += 1,
            Ok(Outcome::Skipped) => report.skipped += 1,
            Err(error) => {
                tracing::warn!(name = %name, error = %error, "Brand import record failed");
                report.errors.push(RecordError::named(&name, error));
            }
        }
    }

    tracing::info!(
        imported = report.imported,
        skipped = report.skipped,
        errors = report.errors.len(),
        "Brand import finished"
    );

    report
}

async fn import_one<L: LogoPipeline>(
    store: &dyn Store,
    logos: &L,
    name: &str,
    value: serde_json::Value,
    seen: &mut HashSet<String>,
    warnings: &mut Vec<String>,
) -> Result<Outcome, String> {
    let descriptor: BrandDescriptor = decode(value)?;

    let slug = descriptor
        .slug
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| "slug is required".to_string())?
        .to_string();
    validate_slug(&slug, "slug")?;

    if !seen.insert(slug.clone()) {
        return Ok(Outcome::Skipped);
    }
    if store.get_brand(&slug).map_err(|e| e.to_string())?.is_some() {
        return Ok(Outcome::Skipped);
    }

    let mut brand = Brand::new(slug.clone(), name.trim());
    brand.default_affiliate_url = non_empty(descriptor.affiliate_url);
    brand.default_rating = descriptor.rating.map(f64::from);
    brand.license = non_empty(descriptor.license);
    brand.default_bonus = non_empty(descriptor.bonus);
    brand.pros = descriptor.pros;
    brand.cons = descriptor.cons;
    brand.description = non_empty(descriptor.description);

    let stored = match non_empty(descriptor.logo) {
        Some(url) => match logos.ingest(&url).await {
            Ok(logo) => {
                brand.default_logo = Some(logo.url.clone());
                Some(logo)
            }
            Err(e) => {
                tracing::warn!(brand_id = %slug, error = %e, "Logo fetch failed, importing without logo");
                warnings.push(format!("{name}: logo not imported ({e})"));
                None
            }
        },
        None => None,
    };

    let result = store.create_brand(&brand);

    if let (Err(_), Some(logo)) = (&result, &stored) {
        if let Err(e) = logos.discard(logo).await {
            tracing::warn!(key = %logo.key, error = %e, "Failed to remove orphaned logo");
        }
    }

    match result {
        Ok(()) => Ok(Outcome::Imported),
        Err(Error::AlreadyExists) => Ok(Outcome::Skipped),
        Err(e) => Err(e.to_string()),
    }
}
