//! Single-page frontend

/// Editor page served at `/`
pub const INDEX_HTML: &str = include_str!("../assets/index.html");
