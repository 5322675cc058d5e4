// tests/db_flow.rs
//
// Fluxo completo contra um Postgres real. Só roda com TEST_DATABASE_URL definida;
// sem ela os testes passam sem fazer nada.

use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use montador_conecta::{
    common::error::AppError,
    config::{AppConfig, AppState},
    models::{
        auth::RegisterUserPayload,
        company::CreateCompanyPayload,
        governance::AuditLogFilter,
        profile::{Profile, ProfileRole, ProfileStatus},
        review::CreateReviewPayload,
        service::{
            AssignmentStatus, ConfirmationOutcome, ConfirmationSide, CreateServicePayload, Service,
            ServiceFilter, ServiceStatus, UpdateServicePayload,
        },
    },
};

async fn state() -> Option<AppState> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("conexão com o banco de teste");
    sqlx::migrate!().run(&pool).await.expect("migrações");

    let config = AppConfig {
        database_url: url,
        jwt_secret: "segredo-de-teste".into(),
        bind_addr: "127.0.0.1:0".into(),
        db_max_connections: 5,
        jwt_ttl_days: 7,
        flag_block_threshold: 2,
        session_cookie_secure: false,
        cors_allowed_origin: None,
    };

    Some(AppState::from_parts(config, pool).expect("estado da aplicação"))
}

async fn register(state: &AppState, role: ProfileRole) -> Profile {
    let username = format!("teste.{}", &Uuid::new_v4().simple().to_string()[..12]);
    let payload = RegisterUserPayload {
        username,
        password: "segredo123".into(),
        role,
        full_name: "Perfil de Teste".into(),
        cpf: None,
        phone: None,
        city: Some("Campinas".into()),
        state: Some("SP".into()),
    };
    state.auth_service.register_user(&payload).await.expect("cadastro").profile
}

async fn partner_with_company(state: &AppState) -> Profile {
    let partner = register(state, ProfileRole::Partner).await;
    state
        .company_service
        .create_company(
            &partner,
            &CreateCompanyPayload {
                trading_name: "Marcenaria Teste".into(),
                legal_name: None,
                cnpj: None,
                phone: None,
                email: None,
                address: None,
                city: None,
                state: None,
            },
        )
        .await
        .expect("empresa");
    state.profile_service.get_profile(partner.id).await.unwrap()
}

async fn approved_montador(state: &AppState, admin: &Profile) -> Profile {
    let montador = register(state, ProfileRole::Montador).await;
    state.profile_service.approve_profile(admin, montador.id).await.unwrap()
}

async fn publish(state: &AppState, partner: &Profile, team: i32) -> Service {
    let payload: CreateServicePayload = serde_json::from_value(json!({
        "title": "Montagem de dormitório",
        "priceCents": 45000,
        "requiredMontadoresCount": team,
        "publish": true
    }))
    .unwrap();
    state.job_service.create_service(partner, &payload).await.unwrap()
}

async fn join_team(state: &AppState, partner: &Profile, montador: &Profile, service_id: Uuid) -> Uuid {
    let application = state.job_service.apply(montador, service_id).await.unwrap();
    state
        .job_service
        .update_assignment(partner, service_id, application.id, AssignmentStatus::Accepted)
        .await
        .unwrap();
    application.id
}

async fn audit_actions(state: &AppState, entity_type: &str, entity_id: Uuid) -> Vec<serde_json::Value> {
    state
        .governance_service
        .list_audit_logs(&AuditLogFilter {
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id),
            actor_id: None,
            limit: Some(200),
        })
        .await
        .unwrap()
        .into_iter()
        .map(|log| json!({ "action": log.action, "details": log.details }))
        .collect()
}

fn review_for(reviewee_id: Uuid) -> CreateReviewPayload {
    CreateReviewPayload {
        reviewee_id,
        punctuality: 5,
        quality: 4,
        communication: 5,
        professionalism: 5,
        cleanliness: 4,
        comment: Some("Tudo certo".into()),
    }
}

#[tokio::test]
async fn service_goes_from_publication_to_completed() {
    let Some(state) = state().await else {
        eprintln!("TEST_DATABASE_URL ausente; pulando");
        return;
    };

    // --- Cadastro e empresa ---
    let partner = register(&state, ProfileRole::Partner).await;
    let first = register(&state, ProfileRole::Montador).await;
    let second = register(&state, ProfileRole::Montador).await;

    let company = state
        .company_service
        .create_company(
            &partner,
            &CreateCompanyPayload {
                trading_name: "Móveis Teste".into(),
                legal_name: None,
                cnpj: None,
                phone: None,
                email: None,
                address: None,
                city: Some("Campinas".into()),
                state: Some("SP".into()),
            },
        )
        .await
        .expect("empresa");
    let partner = state.profile_service.get_profile(partner.id).await.unwrap();
    assert_eq!(partner.company_id, Some(company.id));

    for montador in [&first, &second] {
        state.profile_service.approve_profile(&partner, montador.id).await.unwrap();
    }

    // --- Serviço para dois montadores ---
    let payload: CreateServicePayload = serde_json::from_value(json!({
        "title": "Montagem de cozinha planejada",
        "priceCents": 80000,
        "requiredMontadoresCount": 2,
        "publish": true
    }))
    .unwrap();
    let service = state.job_service.create_service(&partner, &payload).await.unwrap();
    assert_eq!(service.status, ServiceStatus::Published);

    let application = state.job_service.apply(&first, service.id).await.unwrap();
    state
        .job_service
        .update_assignment(&partner, service.id, application.id, AssignmentStatus::Accepted)
        .await
        .unwrap();
    let current = state.job_service.get_service(service.id).await.unwrap();
    assert_eq!(current.status, ServiceStatus::AwaitingTeam);
    assert_eq!(current.montador_id, Some(first.id));

    let invite = state
        .job_service
        .invite_montador(&partner, service.id, second.id)
        .await
        .unwrap();
    state
        .job_service
        .update_assignment(&second, service.id, invite.id, AssignmentStatus::Accepted)
        .await
        .unwrap();
    let current = state.job_service.get_service(service.id).await.unwrap();
    assert_eq!(current.status, ServiceStatus::InProgress);
    assert!(!current.is_open);

    // --- Confirmação dupla ---
    let step = state
        .lifecycle
        .confirm_completion(service.id, &first, ConfirmationSide::Montador)
        .await
        .unwrap();
    assert_eq!(step.outcome, ConfirmationOutcome::AwaitingOtherSide);
    assert_eq!(step.service.status, ServiceStatus::CompletedPendingConfirmation);

    let again = state
        .lifecycle
        .confirm_completion(service.id, &second, ConfirmationSide::Montador)
        .await
        .unwrap();
    assert_eq!(again.outcome, ConfirmationOutcome::AlreadyConfirmed);
    assert_eq!(again.service.status, ServiceStatus::CompletedPendingConfirmation);

    let done = state
        .lifecycle
        .confirm_completion(service.id, &partner, ConfirmationSide::Company)
        .await
        .unwrap();
    assert_eq!(done.outcome, ConfirmationOutcome::Confirmed);
    assert_eq!(done.service.status, ServiceStatus::CompletedPendingEvaluation);
    assert!(done.service.completed_at.is_some());

    // --- Avaliações fecham o serviço ---
    state
        .review_service
        .create_review(&partner, service.id, &review_for(first.id))
        .await
        .unwrap();
    let current = state.job_service.get_service(service.id).await.unwrap();
    assert_eq!(current.status, ServiceStatus::CompletedPendingEvaluation);

    state
        .review_service
        .create_review(&first, service.id, &review_for(partner.id))
        .await
        .unwrap();
    let current = state.job_service.get_service(service.id).await.unwrap();
    assert_eq!(current.status, ServiceStatus::Completed);

    let summary = state.review_service.profile_reviews(first.id).await.unwrap().summary;
    assert_eq!(summary.review_count, 1);

    let logs = state
        .governance_service
        .list_audit_logs(&AuditLogFilter {
            entity_type: Some("service".into()),
            entity_id: Some(service.id),
            actor_id: None,
            limit: None,
        })
        .await
        .unwrap();
    assert!(logs.iter().any(|log| log.action == "service.status_changed"));
    assert!(logs.iter().any(|log| log.action == "service.completion_confirmed"));
}

#[tokio::test]
async fn service_without_company_is_rejected() {
    let Some(state) = state().await else {
        return;
    };

    let partner = register(&state, ProfileRole::Partner).await;
    let payload: CreateServicePayload = serde_json::from_value(json!({
        "title": "Montagem de guarda-roupa",
        "priceCents": 20000
    }))
    .unwrap();

    let result = state.job_service.create_service(&partner, &payload).await;
    assert!(matches!(result, Err(AppError::CompanyRequired)));
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let Some(state) = state().await else {
        return;
    };

    let username = format!("dup.{}", &Uuid::new_v4().simple().to_string()[..12]);
    let payload = RegisterUserPayload {
        username,
        password: "segredo123".into(),
        role: ProfileRole::Montador,
        full_name: "Primeiro".into(),
        cpf: None,
        phone: None,
        city: None,
        state: None,
    };

    state.auth_service.register_user(&payload).await.unwrap();
    let result = state.auth_service.register_user(&payload).await;
    assert!(matches!(result, Err(AppError::UsernameAlreadyExists)));
}

#[tokio::test]
async fn flags_recommend_block_at_threshold() {
    let Some(state) = state().await else {
        return;
    };

    let target = register(&state, ProfileRole::Montador).await;
    let first = register(&state, ProfileRole::Partner).await;
    let second = register(&state, ProfileRole::Partner).await;

    let report = state
        .governance_service
        .report_flag(&first, target.id, "Não compareceu", None)
        .await
        .unwrap();
    assert_eq!(report.total_flags, 1);
    assert!(!report.block_recommended);

    let report = state
        .governance_service
        .report_flag(&second, target.id, "Atrasou duas horas", None)
        .await
        .unwrap();
    assert_eq!(report.total_flags, 2);
    assert!(report.block_recommended);

    // Só recomendação: o perfil continua como estava
    let profile = state.profile_service.get_profile(target.id).await.unwrap();
    assert_eq!(profile.status, target.status);

    let self_flag = state
        .governance_service
        .report_flag(&target, target.id, "Teste", None)
        .await;
    assert!(matches!(self_flag, Err(AppError::CannotFlagSelf)));
}

#[tokio::test]
async fn removed_montador_loses_primary_role() {
    let Some(state) = state().await else {
        return;
    };

    let partner = partner_with_company(&state).await;
    let first = approved_montador(&state, &partner).await;
    let second = approved_montador(&state, &partner).await;
    let service = publish(&state, &partner, 3).await;

    let first_assignment = join_team(&state, &partner, &first, service.id).await;
    let second_assignment = join_team(&state, &partner, &second, service.id).await;
    let current = state.job_service.get_service(service.id).await.unwrap();
    assert_eq!(current.montador_id, Some(first.id));
    assert_eq!(current.status, ServiceStatus::AwaitingTeam);

    // O principal sai: o próximo aceito assume
    state
        .job_service
        .update_assignment(&partner, service.id, first_assignment, AssignmentStatus::Removed)
        .await
        .unwrap();
    let current = state.job_service.get_service(service.id).await.unwrap();
    assert_eq!(current.montador_id, Some(second.id));

    state
        .job_service
        .update_assignment(&partner, service.id, second_assignment, AssignmentStatus::Removed)
        .await
        .unwrap();
    let current = state.job_service.get_service(service.id).await.unwrap();
    assert_eq!(current.montador_id, None);

    let confirm = state
        .lifecycle
        .confirm_completion(service.id, &first, ConfirmationSide::Montador)
        .await;
    assert!(matches!(confirm, Err(AppError::NotResourceOwner)));
    let current = state.job_service.get_service(service.id).await.unwrap();
    assert_eq!(current.status, ServiceStatus::AwaitingTeam);

    let assigned = state
        .job_service
        .list_services(
            &first,
            &ServiceFilter { assigned_to_me: Some(true), ..Default::default() },
        )
        .await
        .unwrap();
    assert!(assigned.iter().all(|s| s.id != service.id));
}

#[tokio::test]
async fn approving_twice_writes_a_single_audit_entry() {
    let Some(state) = state().await else {
        return;
    };

    let admin = register(&state, ProfileRole::Partner).await;
    let montador = register(&state, ProfileRole::Montador).await;
    assert_eq!(montador.status, ProfileStatus::Pending);

    let approved = state.profile_service.approve_profile(&admin, montador.id).await.unwrap();
    let again = state.profile_service.approve_profile(&admin, montador.id).await.unwrap();
    assert_eq!(approved.status, ProfileStatus::Approved);
    assert_eq!(again.status, ProfileStatus::Approved);

    let count = |actions: &[serde_json::Value], name: &str| {
        actions.iter().filter(|a| a["action"] == name).count()
    };

    let actions = audit_actions(&state, "profile", montador.id).await;
    assert_eq!(count(&actions, "profile.approved"), 1);

    // Bloqueio e desbloqueio (aprovar de novo) contam cada um
    let blocked = state.profile_service.block_profile(&admin, montador.id).await.unwrap();
    assert_eq!(blocked.status, ProfileStatus::Blocked);
    state.profile_service.block_profile(&admin, montador.id).await.unwrap();

    let unblocked = state.profile_service.approve_profile(&admin, montador.id).await.unwrap();
    assert_eq!(unblocked.status, ProfileStatus::Approved);

    let actions = audit_actions(&state, "profile", montador.id).await;
    assert_eq!(count(&actions, "profile.blocked"), 1);
    assert_eq!(count(&actions, "profile.approved"), 2);
}

#[tokio::test]
async fn lowering_team_size_starts_the_service() {
    let Some(state) = state().await else {
        return;
    };

    let partner = partner_with_company(&state).await;
    let montador = approved_montador(&state, &partner).await;
    let service = publish(&state, &partner, 2).await;

    join_team(&state, &partner, &montador, service.id).await;
    let current = state.job_service.get_service(service.id).await.unwrap();
    assert_eq!(current.status, ServiceStatus::AwaitingTeam);
    assert!(current.is_open);

    let updated = state
        .job_service
        .update_service(
            &partner,
            service.id,
            &UpdateServicePayload { required_montadores_count: Some(1), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, ServiceStatus::InProgress);
    assert!(!updated.is_open);
}

#[tokio::test]
async fn concurrent_finalization_completes_once() {
    let Some(state) = state().await else {
        return;
    };

    let partner = partner_with_company(&state).await;
    let montador = approved_montador(&state, &partner).await;
    let service = publish(&state, &partner, 1).await;
    join_team(&state, &partner, &montador, service.id).await;

    // Avaliações gravadas com o serviço já concluído não disparam o fechamento
    state
        .lifecycle
        .transition_status(service.id, ServiceStatus::Completed, Some(partner.id), json!({}))
        .await
        .unwrap();
    state
        .review_service
        .create_review(&partner, service.id, &review_for(montador.id))
        .await
        .unwrap();
    state
        .review_service
        .create_review(&montador, service.id, &review_for(partner.id))
        .await
        .unwrap();
    state
        .lifecycle
        .transition_status(
            service.id,
            ServiceStatus::CompletedPendingEvaluation,
            Some(partner.id),
            json!({}),
        )
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        state.lifecycle.finalize_if_evaluated(service.id, None),
        state.lifecycle.finalize_if_evaluated(service.id, None),
    );
    let finished = [a.unwrap(), b.unwrap()].into_iter().flatten().count();
    assert_eq!(finished, 1);

    let current = state.job_service.get_service(service.id).await.unwrap();
    assert_eq!(current.status, ServiceStatus::Completed);

    let closings = audit_actions(&state, "service", service.id)
        .await
        .into_iter()
        .filter(|a| a["details"]["details"]["reason"] == "both_sides_reviewed")
        .count();
    assert_eq!(closings, 1);
}
