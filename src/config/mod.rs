mod server;

pub use server::{FileConfig, LogoSection, ServerConfig};
