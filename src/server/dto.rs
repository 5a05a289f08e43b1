use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::toplist::ItemSpec;
use crate::types::{Patch, Rating, Role, Serp, Token, Toplist, ToplistItem, User};

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrandRequest {
    pub brand_id: String,
    pub name: String,
    #[serde(default)]
    pub default_logo: Option<String>,
    #[serde(default)]
    pub default_affiliate_url: Option<String>,
    #[serde(default)]
    pub default_bonus: Option<String>,
    #[serde(default)]
    pub default_rating: Option<Rating>,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub min_deposit: Option<String>,
    #[serde(default)]
    pub withdrawal_time: Option<String>,
    #[serde(default)]
    pub accepted_countries: Vec<String>,
    #[serde(default)]
    pub restricted_countries: Vec<String>,
    #[serde(default)]
    pub payment_methods: Vec<String>,
    #[serde(default)]
    pub currencies: Vec<String>,
    #[serde(default)]
    pub game_types: Vec<String>,
    #[serde(default)]
    pub game_providers: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub support_email: Option<String>,
    #[serde(default)]
    pub support_channels: Vec<String>,
    #[serde(default)]
    pub has_mobile_app: bool,
    #[serde(default)]
    pub has_live_chat: bool,
}

/// Partial brand update. `brandId` may be echoed back but never changed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBrandRequest {
    #[serde(default)]
    pub brand_id: Option<String>,
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub default_logo: Patch<String>,
    #[serde(default)]
    pub default_affiliate_url: Patch<String>,
    #[serde(default)]
    pub default_bonus: Patch<String>,
    #[serde(default)]
    pub default_rating: Patch<Rating>,
    #[serde(default)]
    pub terms: Patch<String>,
    #[serde(default)]
    pub license: Patch<String>,
    #[serde(default)]
    pub pros: Patch<Vec<String>>,
    #[serde(default)]
    pub cons: Patch<Vec<String>>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub website_url: Patch<String>,
    #[serde(default)]
    pub founded_year: Patch<i32>,
    #[serde(default)]
    pub owner: Patch<String>,
    #[serde(default)]
    pub min_deposit: Patch<String>,
    #[serde(default)]
    pub withdrawal_time: Patch<String>,
    #[serde(default)]
    pub accepted_countries: Patch<Vec<String>>,
    #[serde(default)]
    pub restricted_countries: Patch<Vec<String>>,
    #[serde(default)]
    pub payment_methods: Patch<Vec<String>>,
    #[serde(default)]
    pub currencies: Patch<Vec<String>>,
    #[serde(default)]
    pub game_types: Patch<Vec<String>>,
    #[serde(default)]
    pub game_providers: Patch<Vec<String>>,
    #[serde(default)]
    pub languages: Patch<Vec<String>>,
    #[serde(default)]
    pub support_email: Patch<String>,
    #[serde(default)]
    pub support_channels: Patch<Vec<String>>,
    #[serde(default)]
    pub has_mobile_app: Patch<bool>,
    #[serde(default)]
    pub has_live_chat: Patch<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSiteRequest {
    pub domain: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub serps: Vec<Serp>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSiteRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub serps: Patch<Vec<Serp>>,
}

/// Upsert body for a site deal. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteBrandRequest {
    #[serde(default)]
    pub logo: Patch<String>,
    #[serde(default)]
    pub bonus: Patch<String>,
    #[serde(default)]
    pub affiliate_url: Patch<String>,
    #[serde(default)]
    pub rating: Patch<Rating>,
    #[serde(default)]
    pub terms: Patch<String>,
    #[serde(default)]
    pub pros: Patch<Vec<String>>,
    #[serde(default)]
    pub cons: Patch<Vec<String>>,
    #[serde(default)]
    pub welcome_package: Patch<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateToplistRequest {
    pub slug: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub column_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub pages: Vec<String>,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateToplistRequest {
    #[serde(default)]
    pub slug: Patch<String>,
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub columns: Patch<Vec<String>>,
    #[serde(default)]
    pub column_labels: Patch<BTreeMap<String, String>>,
    #[serde(default)]
    pub pages: Patch<Vec<String>>,
}

/// A toplist together with its items in display order.
#[derive(Debug, Serialize)]
pub struct ToplistResponse {
    #[serde(flatten)]
    pub toplist: Toplist,
    pub items: Vec<ToplistItem>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceItemsRequest {
    pub items: Vec<ItemSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub site_keys: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub role: Patch<Role>,
    #[serde(default)]
    pub site_keys: Patch<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: User,
    pub site_keys: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateTokenResponse {
    pub token: String,
    pub metadata: Token,
}
