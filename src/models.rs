pub mod auth;
pub mod company;
pub mod governance;
pub mod partnership;
pub mod profile;
pub mod review;
pub mod service;
