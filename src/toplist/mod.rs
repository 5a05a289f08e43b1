//! Toplist assembly: override resolution, the public document and full item replacement.

mod public;
mod replace;
mod resolve;

pub use public::{PublicToplist, build_public_toplist, list_site_deals};
pub use replace::{ItemSpec, MAX_ITEMS, ensure_brands_exist, replace_items, validate_items};
pub use resolve::{ResolvedItem, SiteDeal, resolve, resolve_deal};

/// Columns shown on a newly created toplist.
pub const DEFAULT_COLUMNS: &[&str] = &["brand", "bonus", "rating", "cta"];
