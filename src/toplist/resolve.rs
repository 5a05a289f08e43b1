//! Override merging.
//!
//! A served toplist item is assembled from three layers: the brand's global
//! defaults, the site's deal for that brand, and the toplist item's own
//! overrides. The most specific non-empty value wins. A null, an empty string
//! and an empty list all count as "not set" and fall through to the next layer.

use serde::Serialize;

use crate::types::{Brand, SiteBrand, ToplistItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItem {
    pub brand_id: String,
    pub name: String,
    pub logo: Option<String>,
    pub affiliate_url: Option<String>,
    pub review_url: Option<String>,
    pub bonus: Option<String>,
    pub rating: Option<f64>,
    pub cta: Option<String>,
    pub terms: Option<String>,
    pub license: Option<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// A brand as seen from one site, without any toplist layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDeal {
    pub brand_id: String,
    pub name: String,
    pub logo: Option<String>,
    pub affiliate_url: Option<String>,
    pub bonus: Option<String>,
    pub rating: Option<f64>,
    pub terms: Option<String>,
    pub license: Option<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub welcome_package: Option<String>,
    pub is_active: bool,
    pub has_site_deal: bool,
}

fn set(value: Option<&String>) -> Option<&String> {
    value.filter(|s| !s.trim().is_empty())
}

fn first_text<const N: usize>(layers: [Option<&String>; N]) -> Option<String> {
    layers.into_iter().find_map(set).cloned()
}

fn first_list<const N: usize>(layers: [Option<&Vec<String>>; N]) -> Vec<String> {
    layers
        .into_iter()
        .flatten()
        .find(|list| !list.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Resolves one toplist entry. Never fails; missing layers simply contribute nothing.
#[must_use]
pub fn resolve(brand: &Brand, site: Option<&SiteBrand>, item: Option<&ToplistItem>) -> ResolvedItem {
    ResolvedItem {
        brand_id: brand.brand_id.clone(),
        name: brand.name.clone(),
        logo: first_text([
            item.and_then(|i| i.logo_override.as_ref()),
            site.and_then(|s| s.logo.as_ref()),
            brand.default_logo.as_ref(),
        ]),
        affiliate_url: first_text([
            item.and_then(|i| i.affiliate_url.as_ref()),
            site.and_then(|s| s.affiliate_url.as_ref()),
            brand.default_affiliate_url.as_ref(),
        ]),
        review_url: first_text([item.and_then(|i| i.review_url.as_ref())]),
        bonus: first_text([
            item.and_then(|i| i.bonus.as_ref()),
            site.and_then(|s| s.bonus.as_ref()),
            brand.default_bonus.as_ref(),
        ]),
        // No brand-default fallback for rating in the toplist view.
        rating: item
            .and_then(|i| i.rating)
            .or_else(|| site.and_then(|s| s.rating)),
        cta: first_text([item.and_then(|i| i.cta.as_ref())]),
        terms: first_text([
            item.and_then(|i| i.terms_override.as_ref()),
            site.and_then(|s| s.terms.as_ref()),
            brand.terms.as_ref(),
        ]),
        license: first_text([
            item.and_then(|i| i.license_override.as_ref()),
            brand.license.as_ref(),
        ]),
        pros: first_list([
            item.and_then(|i| i.pros_override.as_ref()),
            site.and_then(|s| s.pros.as_ref()),
            Some(&brand.pros),
        ]),
        cons: first_list([
            item.and_then(|i| i.cons_override.as_ref()),
            site.and_then(|s| s.cons.as_ref()),
            Some(&brand.cons),
        ]),
    }
}

/// Resolves the site-level deal for a brand. Unlike [`resolve`], rating falls back to the brand default.
#[must_use]
pub fn resolve_deal(brand: &Brand, site: Option<&SiteBrand>) -> SiteDeal {
    let base = resolve(brand, site, None);
    SiteDeal {
        brand_id: base.brand_id,
        name: base.name,
        logo: base.logo,
        affiliate_url: base.affiliate_url,
        bonus: base.bonus,
        rating: base.rating.or(brand.default_rating),
        terms: base.terms,
        license: base.license,
        pros: base.pros,
        cons: base.cons,
        welcome_package: first_text([site.and_then(|s| s.welcome_package.as_ref())]),
        is_active: site.is_none_or(|s| s.is_active),
        has_site_deal: site.is_some(),
    }
}
