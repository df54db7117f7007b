// Accounts, session tokens and demo mode.
// Every protected handler takes an `AuthUser` extractor.

pub mod accounts;
pub mod demo;
pub mod handlers;
pub mod tokens;

pub use tokens::AuthUser;
