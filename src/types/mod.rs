mod models;
mod patch;
pub mod rating;
pub mod registry;
mod role;

pub use models::*;
pub use patch::Patch;
pub use rating::Rating;
pub use role::Role;
