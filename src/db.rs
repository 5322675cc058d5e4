pub mod user_repo;
pub use user_repo::UserRepository;
pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod company_repo;
pub use company_repo::CompanyRepository;
pub mod service_repo;
pub use service_repo::ServiceRepository;
pub mod review_repo;
pub use review_repo::ReviewRepository;
pub mod partnership_repo;
pub use partnership_repo::PartnershipRepository;
pub mod governance_repo;
pub use governance_repo::GovernanceRepository;
