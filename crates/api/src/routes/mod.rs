use axum::extract::{Extension, Path, Query, State};
use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use alumni_domain::directory::{
    AdminDirectoryPage, AdminDirectoryQuery, DirectoryPage, DirectoryService, PublicDirectoryQuery,
};
use alumni_domain::identity::AdminIdentity;
use alumni_domain::moderation::{BulkApproveReport, ModerationEngine};
use alumni_domain::ports::alumni::{StatusFilter, VerifiedFilter};
use alumni_domain::record::{AdminAlumniView, AlumniCategory, PublicAlumniProfile};
use alumni_domain::registration::{RegistrationInput, RegistrationService};
use alumni_domain::verification::VerificationGate;

use crate::middleware::AuthContext;
use crate::{
    error::ApiError, middleware as app_middleware, observability, state::AppState, validation,
};

pub fn router(state: AppState) -> Router {
    let back_office = Router::new()
        .route("/v1/admin/alumni", get(admin_list_alumni))
        .route("/v1/admin/alumni/bulk-approve", post(bulk_approve_alumni))
        .route("/v1/admin/alumni/:alumni_id/approve", post(approve_alumnus))
        .route("/v1/admin/alumni/:alumni_id/reject", post(reject_alumnus))
        .route("/v1/admin/alumni/:alumni_id/verify", post(manually_verify_alumnus))
        .route(
            "/v1/admin/alumni/:alumni_id/resend-verification",
            post(resend_verification),
        )
        .route("/v1/admin/alumni/:alumni_id/feature", post(toggle_featured))
        .route("/v1/admin/alumni/:alumni_id/active", post(set_active))
        .route("/v1/admin/alumni/:alumni_id", delete(delete_alumnus))
        .route_layer(middleware::from_fn(
            app_middleware::require_back_office_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .route("/v1/alumni/register", post(register_alumnus))
        .route("/v1/alumni/verify/:token", get(confirm_verification))
        .route("/v1/directory", get(public_directory))
        .merge(back_office)
        .layer(middleware::from_fn(app_middleware::metrics_layer))
        .layer(app_middleware::timeout_layer())
        .layer(app_middleware::trace_layer())
        .layer(app_middleware::set_request_id_layer())
        .layer(app_middleware::propagate_request_id_layer())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth_middleware,
        ))
        .layer(middleware::from_fn(
            app_middleware::correlation_id_middleware,
        ));

    if !state.config.app_env.eq_ignore_ascii_case("test") {
        app = app.layer(app_middleware::rate_limit_layer());
    }

    app.with_state(state)
}

fn registration_service(state: &AppState) -> RegistrationService {
    RegistrationService::new(state.alumni_repo.clone(), state.dispatcher.clone())
}

fn verification_gate(state: &AppState) -> VerificationGate {
    VerificationGate::new(state.alumni_repo.clone(), state.dispatcher.clone())
}

fn moderation_engine(state: &AppState) -> ModerationEngine {
    ModerationEngine::new(state.alumni_repo.clone(), state.dispatcher.clone())
}

fn directory_service(state: &AppState) -> DirectoryService {
    DirectoryService::new(state.alumni_repo.clone())
}

/// Moderation actions need the admin role; the router only guarantees staff.
fn acting_admin(auth: &AuthContext) -> Result<AdminIdentity, ApiError> {
    if !auth.role.can_moderate() {
        return Err(ApiError::Forbidden);
    }
    let admin_id = auth.admin_id.clone().ok_or(ApiError::Unauthorized)?;
    let display_name = auth.username.clone().unwrap_or_else(|| admin_id.clone());
    Ok(AdminIdentity {
        admin_id,
        display_name,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.app_env.clone(),
    })
}

async fn render_metrics() -> impl IntoResponse {
    observability::render_metrics().unwrap_or_default()
}

#[derive(Debug, Deserialize, Validate)]
struct RegisterAlumniRequest {
    #[validate(length(min = 1, max = 160))]
    name: String,
    #[validate(range(min = 1950, max = 2100))]
    batch_year: i32,
    #[validate(length(max = 40))]
    class_section: Option<String>,
    #[validate(length(max = 40))]
    house: Option<String>,
    #[validate(email)]
    email: String,
    #[validate(length(max = 32))]
    phone: Option<String>,
    #[validate(length(max = 160))]
    location: Option<String>,
    photo_path: Option<String>,
    #[validate(length(max = 160))]
    designation: Option<String>,
    #[validate(length(max = 160))]
    organization: Option<String>,
    category: AlumniCategory,
    #[validate(url)]
    linkedin_url: Option<String>,
    #[validate(length(max = 4000))]
    achievements: Option<String>,
    #[validate(length(max = 4000))]
    story: Option<String>,
    #[validate(length(max = 4000))]
    memories: Option<String>,
    #[validate(length(max = 4000))]
    message: Option<String>,
}

#[derive(Serialize)]
struct RegisterAlumniResponse {
    alumni_id: String,
    slug: String,
    status: &'static str,
}

async fn register_alumnus(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAlumniRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate(&payload)?;
    let record = registration_service(&state)
        .register(RegistrationInput {
            name: payload.name,
            batch_year: payload.batch_year,
            class_section: payload.class_section,
            house: payload.house,
            email: payload.email,
            phone: payload.phone,
            location: payload.location,
            photo_path: payload.photo_path,
            designation: payload.designation,
            organization: payload.organization,
            category: payload.category,
            linkedin_url: payload.linkedin_url,
            achievements: payload.achievements,
            story: payload.story,
            memories: payload.memories,
            message: payload.message,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterAlumniResponse {
            alumni_id: record.alumni_id,
            slug: record.slug,
            status: "pending_verification",
        }),
    ))
}

#[derive(Serialize)]
struct VerifyResponse {
    status: &'static str,
    slug: String,
}

async fn confirm_verification(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let record = verification_gate(&state).confirm_verification(&token).await?;
    Ok(Json(VerifyResponse {
        status: "verified",
        slug: record.slug,
    }))
}

#[derive(Debug, Deserialize)]
struct PublicDirectoryParams {
    category: Option<AlumniCategory>,
    batch_year: Option<i32>,
    page: Option<usize>,
    page_size: Option<usize>,
}

async fn public_directory(
    State(state): State<AppState>,
    Query(params): Query<PublicDirectoryParams>,
) -> Result<Json<DirectoryPage<PublicAlumniProfile>>, ApiError> {
    let page = directory_service(&state)
        .public_list(PublicDirectoryQuery {
            category: params.category,
            batch_year: params.batch_year,
            page: params.page,
            page_size: params.page_size,
        })
        .await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
struct AdminDirectoryParams {
    status: Option<StatusFilter>,
    verified: Option<VerifiedFilter>,
    category: Option<AlumniCategory>,
    batch_year: Option<i32>,
    search: Option<String>,
    page: Option<usize>,
    page_size: Option<usize>,
}

async fn admin_list_alumni(
    State(state): State<AppState>,
    Query(params): Query<AdminDirectoryParams>,
) -> Result<Json<AdminDirectoryPage>, ApiError> {
    let page = directory_service(&state)
        .admin_list(AdminDirectoryQuery {
            status: params.status.unwrap_or_default(),
            verified: params.verified.unwrap_or_default(),
            category: params.category,
            batch_year: params.batch_year,
            search: params.search,
            page: params.page,
            page_size: params.page_size,
        })
        .await?;
    Ok(Json(page))
}

async fn approve_alumnus(
    State(state): State<AppState>,
    Path(alumni_id): Path<String>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<AdminAlumniView>, ApiError> {
    let admin = acting_admin(&auth)?;
    let record = moderation_engine(&state).approve(&alumni_id, &admin).await?;
    observability::register_moderation_decision("approved");
    Ok(Json(record.to_admin_view()))
}

#[derive(Debug, Deserialize, Validate)]
struct RejectAlumniRequest {
    #[validate(length(max = 512))]
    reason: Option<String>,
}

async fn reject_alumnus(
    State(state): State<AppState>,
    Path(alumni_id): Path<String>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<RejectAlumniRequest>,
) -> Result<Json<AdminAlumniView>, ApiError> {
    validation::validate(&payload)?;
    let admin = acting_admin(&auth)?;
    let record = moderation_engine(&state)
        .reject(&alumni_id, &admin, payload.reason)
        .await?;
    observability::register_moderation_decision("rejected");
    Ok(Json(record.to_admin_view()))
}

#[derive(Debug, Deserialize, Validate)]
struct BulkApproveRequest {
    #[validate(length(min = 1, max = 200))]
    alumni_ids: Vec<String>,
}

async fn bulk_approve_alumni(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<BulkApproveRequest>,
) -> Result<Json<BulkApproveReport>, ApiError> {
    validation::validate(&payload)?;
    let admin = acting_admin(&auth)?;
    let report = moderation_engine(&state)
        .bulk_approve(&payload.alumni_ids, &admin)
        .await?;
    observability::register_moderation_decision("bulk_approved");
    Ok(Json(report))
}

async fn manually_verify_alumnus(
    State(state): State<AppState>,
    Path(alumni_id): Path<String>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<AdminAlumniView>, ApiError> {
    let admin = acting_admin(&auth)?;
    let record = verification_gate(&state)
        .manually_verify(&alumni_id, &admin)
        .await?;
    Ok(Json(record.to_admin_view()))
}

async fn resend_verification(
    State(state): State<AppState>,
    Path(alumni_id): Path<String>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<AdminAlumniView>, ApiError> {
    acting_admin(&auth)?;
    let record = verification_gate(&state)
        .request_verification(&alumni_id)
        .await?;
    Ok(Json(record.to_admin_view()))
}

async fn toggle_featured(
    State(state): State<AppState>,
    Path(alumni_id): Path<String>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<AdminAlumniView>, ApiError> {
    acting_admin(&auth)?;
    let record = moderation_engine(&state).toggle_featured(&alumni_id).await?;
    Ok(Json(record.to_admin_view()))
}

#[derive(Debug, Deserialize)]
struct SetActiveRequest {
    is_active: bool,
}

async fn set_active(
    State(state): State<AppState>,
    Path(alumni_id): Path<String>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<Json<AdminAlumniView>, ApiError> {
    acting_admin(&auth)?;
    let record = moderation_engine(&state)
        .set_active(&alumni_id, payload.is_active)
        .await?;
    Ok(Json(record.to_admin_view()))
}

async fn delete_alumnus(
    State(state): State<AppState>,
    Path(alumni_id): Path<String>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, ApiError> {
    let admin = acting_admin(&auth)?;
    moderation_engine(&state).delete(&alumni_id, &admin).await?;
    Ok(StatusCode::NO_CONTENT)
}
