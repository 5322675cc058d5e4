pub mod auth;
pub mod i18n;
pub mod json;
pub mod role;
