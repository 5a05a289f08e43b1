use crate::auth::Principal;
use crate::server::AppState;
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::types::Site;

/// Loads a site the caller is allowed to manage.
///
/// Unknown sites are 404 for everyone; known sites outside an editor's
/// assignments are 403.
pub fn require_site(state: &AppState, principal: &Principal, site_key: &str) -> Result<Site, ApiError> {
    let site = state
        .store
        .get_site(site_key)
        .api_err("Failed to get site")?
        .or_not_found("Site not found")?;

    let allowed = principal
        .can_access_site(state.store.as_ref(), site_key)
        .api_err("Failed to check site access")?;

    if !allowed {
        return Err(ApiError::forbidden("No access to this site"));
    }

    Ok(site)
}
