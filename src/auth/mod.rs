// Authentication module
// Client-credentials grants and the per-client token cache

mod manager;
mod refresh;
mod types;

pub use manager::AuthManager;
pub use refresh::{identity_token_url, payroll_token_url};
pub use types::{ClientCredentials, TokenData, TokenKind};
