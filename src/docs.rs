// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,

        // --- Users ---
        handlers::auth::get_me,

        // --- Profiles ---
        handlers::profiles::get_my_profile,
        handlers::profiles::update_my_profile,
        handlers::profiles::get_profile,
        handlers::profiles::get_profile_reviews,
        handlers::profiles::report_flag,
        handlers::profiles::list_montadores,

        // --- Companies ---
        handlers::companies::create_company,
        handlers::companies::get_my_company,
        handlers::companies::get_company,
        handlers::companies::update_company,

        // --- Services ---
        handlers::services::create_service,
        handlers::services::list_services,
        handlers::services::get_service,
        handlers::services::update_service,
        handlers::services::delete_service,
        handlers::services::change_status,
        handlers::services::confirm_completion,

        // --- Assignments ---
        handlers::assignments::list_assignments,
        handlers::assignments::invite_montador,
        handlers::assignments::apply,
        handlers::assignments::update_assignment,

        // --- Attachments ---
        handlers::attachments::list_attachments,
        handlers::attachments::add_attachment,
        handlers::attachments::delete_attachment,

        // --- Reviews ---
        handlers::reviews::list_service_reviews,
        handlers::reviews::create_review,

        // --- Partnerships ---
        handlers::partnerships::list_partnerships,
        handlers::partnerships::propose_partnership,
        handlers::partnerships::update_partnership,

        // --- Admin ---
        handlers::admin::list_pending_profiles,
        handlers::admin::approve_profile,
        handlers::admin::block_profile,
        handlers::admin::list_audit_logs,
        handlers::admin::list_flags,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,

            // --- Profiles ---
            models::profile::ProfileRole,
            models::profile::ProfileStatus,
            models::profile::Profile,
            models::profile::UpdateProfilePayload,

            // --- Companies ---
            models::company::Company,
            models::company::CreateCompanyPayload,
            models::company::UpdateCompanyPayload,

            // --- Services ---
            models::service::ServiceStatus,
            models::service::ConfirmationSide,
            models::service::AssignmentStatus,
            models::service::Service,
            models::service::ServiceAssignment,
            models::service::ServiceAttachment,
            models::service::ServiceDetail,
            models::service::CreateServicePayload,
            models::service::UpdateServicePayload,
            models::service::ChangeStatusPayload,
            models::service::InviteMontadorPayload,
            models::service::UpdateAssignmentPayload,
            models::service::ConfirmCompletionPayload,
            models::service::ConfirmationOutcome,
            models::service::ConfirmationResponse,
            models::service::CreateAttachmentPayload,

            // --- Reviews ---
            models::review::Review,
            models::review::CreateReviewPayload,
            models::review::RatingSummary,
            models::review::ProfileReviews,

            // --- Partnerships ---
            models::partnership::PartnershipStatus,
            models::partnership::Partnership,
            models::partnership::CreatePartnershipPayload,
            models::partnership::UpdatePartnershipPayload,

            // --- Governança ---
            models::governance::AuditLog,
            models::governance::Flag,
            models::governance::CreateFlagPayload,
            models::governance::FlagReport,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Profiles", description = "Perfis, busca de montadores e denúncias"),
        (name = "Companies", description = "Empresas parceiras"),
        (name = "Services", description = "Serviços de montagem e ciclo de vida"),
        (name = "Assignments", description = "Convites, candidaturas e equipe"),
        (name = "Attachments", description = "Metadados de anexos"),
        (name = "Reviews", description = "Avaliações em cinco dimensões"),
        (name = "Partnerships", description = "Parcerias entre empresas e montadores"),
        (name = "Admin", description = "Aprovação de perfis e auditoria")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
