//! sikuwat-server: HTTP service for the Sikuwat farmer cooperative
//!
//! Market prices, articles and tips for the public dashboard, admin content
//! management and farmer approval, the farmers' planting log, and the
//! farming assistant. Accounts and images live on the hosted platform and
//! are reached through its REST API.

pub mod auth;
pub mod chat;
pub mod db;
pub mod http;
pub mod models;
pub mod storage;

pub use auth::{AuthProvider, PlatformAuth};
pub use chat::{ChatService, GeminiClient, TextGenerator};
pub use http::{run_server, AppState, ServerConfig};
pub use storage::PlatformStorage;
