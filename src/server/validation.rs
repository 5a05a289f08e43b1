use serde_json::json;

use crate::naming;
use crate::server::response::ApiError;
use crate::types::Brand;
use crate::types::registry::Registry;

const MAX_NAME_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 254;

pub fn validate_brand_id(brand_id: &str) -> Result<(), ApiError> {
    naming::validate_slug(brand_id, "brandId").map_err(ApiError::bad_request)
}

pub fn validate_slug(slug: &str) -> Result<(), ApiError> {
    naming::validate_slug(slug, "slug").map_err(ApiError::bad_request)
}

pub fn validate_domain(domain: &str) -> Result<(), ApiError> {
    naming::validate_domain(domain).map_err(ApiError::bad_request)
}

pub fn validate_name(name: &str, field: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{field} cannot be empty")));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "{field} cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email.len() <= MAX_EMAIL_LEN
        && !email.chars().any(char::is_whitespace)
        && email
            .split_once('@')
            .is_some_and(|(local, host)| !local.is_empty() && host.contains('.') && !host.starts_with('.'));
    if valid {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!("'{email}' is not a valid email address")))
    }
}

/// Checks every list field against its registry; reports all offending fields at once.
pub fn validate_brand(brand: &Brand) -> Result<(), ApiError> {
    validate_name(&brand.name, "name")?;

    let checks = [
        (Registry::PaymentMethods, "paymentMethods", &brand.payment_methods),
        (Registry::GameTypes, "gameTypes", &brand.game_types),
        (Registry::Countries, "acceptedCountries", &brand.accepted_countries),
        (Registry::Countries, "restrictedCountries", &brand.restricted_countries),
        (Registry::Currencies, "currencies", &brand.currencies),
    ];

    let errors: Vec<String> = checks
        .iter()
        .filter_map(|(registry, field, codes)| registry.check_codes(field, codes).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::bad_request("Invalid brand attributes").with_details(json!({ "fields": errors })))
    }
}
