use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub brand_id: String,
    pub name: String,
    pub default_logo: Option<String>,
    pub default_affiliate_url: Option<String>,
    pub default_bonus: Option<String>,
    pub default_rating: Option<f64>,
    pub terms: Option<String>,
    pub license: Option<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub founded_year: Option<i32>,
    pub owner: Option<String>,
    pub min_deposit: Option<String>,
    pub withdrawal_time: Option<String>,
    pub accepted_countries: Vec<String>,
    pub restricted_countries: Vec<String>,
    pub payment_methods: Vec<String>,
    pub currencies: Vec<String>,
    pub game_types: Vec<String>,
    pub game_providers: Vec<String>,
    pub languages: Vec<String>,
    pub support_email: Option<String>,
    pub support_channels: Vec<String>,
    pub has_mobile_app: bool,
    pub has_live_chat: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Brand {
    /// A brand with only its identity set; every optional field empty.
    #[must_use]
    pub fn new(brand_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            brand_id: brand_id.into(),
            name: name.into(),
            default_logo: None,
            default_affiliate_url: None,
            default_bonus: None,
            default_rating: None,
            terms: None,
            license: None,
            pros: Vec::new(),
            cons: Vec::new(),
            description: None,
            website_url: None,
            founded_year: None,
            owner: None,
            min_deposit: None,
            withdrawal_time: None,
            accepted_countries: Vec::new(),
            restricted_countries: Vec::new(),
            payment_methods: Vec::new(),
            currencies: Vec::new(),
            game_types: Vec::new(),
            game_providers: Vec::new(),
            languages: Vec::new(),
            support_email: None,
            support_channels: Vec::new(),
            has_mobile_app: false,
            has_live_chat: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// How many rows still point at a brand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandUsage {
    pub site_brands: i64,
    pub toplist_items: i64,
}

impl BrandUsage {
    #[must_use]
    pub fn total(&self) -> i64 {
        self.site_brands + self.toplist_items
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Serp {
    pub keyword: String,
    pub geo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub site_key: String,
    pub domain: String,
    pub name: String,
    pub serps: Vec<Serp>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-site deal terms for a brand. `None` fields defer to the brand defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteBrand {
    pub site_key: String,
    pub brand_id: String,
    pub logo: Option<String>,
    pub bonus: Option<String>,
    pub affiliate_url: Option<String>,
    pub rating: Option<f64>,
    pub terms: Option<String>,
    pub pros: Option<Vec<String>>,
    pub cons: Option<Vec<String>>,
    pub welcome_package: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SiteBrand {
    #[must_use]
    pub fn new(site_key: impl Into<String>, brand_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            site_key: site_key.into(),
            brand_id: brand_id.into(),
            logo: None,
            bonus: None,
            affiliate_url: None,
            rating: None,
            terms: None,
            pros: None,
            cons: None,
            welcome_package: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toplist {
    pub id: String,
    pub site_key: String,
    pub slug: String,
    pub title: String,
    pub columns: Vec<String>,
    pub column_labels: BTreeMap<String, String>,
    pub pages: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToplistItem {
    pub id: String,
    pub toplist_id: String,
    pub brand_id: String,
    pub position: i64,
    pub logo_override: Option<String>,
    pub affiliate_url: Option<String>,
    pub bonus: Option<String>,
    pub rating: Option<f64>,
    pub cta: Option<String>,
    pub review_url: Option<String>,
    pub terms_override: Option<String>,
    pub license_override: Option<String>,
    pub pros_override: Option<Vec<String>>,
    pub cons_override: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl ToplistItem {
    #[must_use]
    pub fn new(toplist_id: impl Into<String>, brand_id: impl Into<String>, position: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            toplist_id: toplist_id.into(),
            brand_id: brand_id.into(),
            position,
            logo_override: None,
            affiliate_url: None,
            bonus: None,
            rating: None,
            cta: None,
            review_url: None,
            terms_override: None,
            license_override: None,
            pros_override: None,
            cons_override: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}
