pub mod admin;
pub mod assignments;
pub mod attachments;
pub mod auth;
pub mod companies;
pub mod partnerships;
pub mod profiles;
pub mod reviews;
pub mod services;
