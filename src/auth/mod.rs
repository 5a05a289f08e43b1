mod helpers;
mod middleware;
mod token;

pub use helpers::{TokenValidationError, ValidatedToken, extract_token, validate_token};
pub use middleware::{AuthError, Principal, RequireAdmin, RequireAuth};
pub use token::{KeyParts, MintedKey, NewToken, TokenGenerator, issue_token, parse_token};
