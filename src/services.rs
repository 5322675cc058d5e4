pub mod auth;
pub mod company_service;
pub mod governance_service;
pub mod job_service;
pub mod lifecycle_service;
pub mod partnership_service;
pub mod profile_service;
pub mod review_service;
