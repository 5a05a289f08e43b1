mod admin;
pub mod dto;
mod manage;
mod public;
pub mod response;
mod router;
pub mod validation;

pub use admin::admin_router;
pub use manage::manage_router;
pub use router::{AppState, create_router};
