//! # API REST
//!
//! REST API implementation for MedVault.
//!
//! Handles:
//! - HTTP endpoints with axum, nested under `/api/v1`
//! - Bearer token authentication for owner routes
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON error bodies, CORS)
//!
//! Uses `api-shared` for identity tokens and DTOs, and `medvault-core` for all data operations.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod extract;
pub mod handlers;

use api_shared::TokenService;
use axum::{
    routing::{get, post},
    Router,
};
use handlers::{auth, dashboard, health, medications, records, reminders, sharing};
use medvault_core::{
    CoreConfig, Database, MedicationService, RecordService, ReminderService, SharingService,
    UserService,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Application state for the REST API server
///
/// Every service shares the one database pool it was built from. Nothing else is global.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub users: UserService,
    pub records: RecordService,
    pub medications: MedicationService,
    pub reminders: ReminderService,
    pub sharing: SharingService,
}

impl AppState {
    pub fn new(cfg: &CoreConfig, db: Database) -> Self {
        Self {
            tokens: Arc::new(TokenService::from_config(cfg)),
            users: UserService::new(db.clone()),
            records: RecordService::new(db.clone()),
            medications: MedicationService::new(db.clone()),
            reminders: ReminderService::new(db.clone()),
            sharing: SharingService::new(db),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "MedVault API", description = "Personal medical records with expiring share links"),
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::profile,
        dashboard::dashboard,
        sharing::create_share,
        sharing::view_shared,
        sharing::download_shared,
        sharing::my_shares,
        sharing::revoke_share,
        records::create_prescription,
        records::list_prescriptions,
        records::get_prescription,
        records::update_prescription,
        records::delete_prescription,
        records::create_appointment,
        records::list_appointments,
        records::get_appointment,
        records::update_appointment,
        records::delete_appointment,
        records::create_lab_report,
        records::list_lab_reports,
        records::get_lab_report,
        records::update_lab_report,
        records::delete_lab_report,
        records::create_insurance,
        records::list_insurance,
        records::get_insurance,
        records::update_insurance,
        records::delete_insurance,
        medications::create_medication,
        medications::list_medications,
        medications::refill_needed,
        medications::get_medication,
        medications::update_medication,
        medications::delete_medication,
        reminders::create_reminder,
        reminders::list_reminders,
        reminders::upcoming_reminders,
        reminders::get_reminder,
        reminders::update_reminder,
        reminders::delete_reminder,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::dto::RegisterReq,
        api_shared::dto::LoginReq,
        api_shared::dto::UserSummary,
        api_shared::dto::AuthRes,
        api_shared::dto::ProfileRes,
        api_shared::dto::CreateShareReq,
        api_shared::dto::CreateShareRes,
        api_shared::dto::SharedAccessRes,
        api_shared::dto::MySharesRes,
        api_shared::dto::MedicationListRes,
        api_shared::dto::ReminderListRes,
        api_shared::dto::MessageRes,
        api_shared::dto::DashboardRes,
        api_shared::dto::ErrorRes,
        medvault_core::models::User,
        medvault_core::models::UserRole,
        medvault_core::models::Prescription,
        medvault_core::models::NewPrescription,
        medvault_core::models::PrescriptionPatch,
        medvault_core::models::Appointment,
        medvault_core::models::NewAppointment,
        medvault_core::models::AppointmentPatch,
        medvault_core::models::LabReport,
        medvault_core::models::NewLabReport,
        medvault_core::models::LabReportPatch,
        medvault_core::models::HealthInsurance,
        medvault_core::models::NewHealthInsurance,
        medvault_core::models::HealthInsurancePatch,
        medvault_core::models::Medication,
        medvault_core::models::NewMedication,
        medvault_core::models::MedicationPatch,
        medvault_core::models::Reminder,
        medvault_core::models::NewReminder,
        medvault_core::models::ReminderPatch,
        medvault_core::models::ShareScope,
        medvault_core::models::ShareMethod,
        medvault_core::models::AccessAction,
        medvault_core::models::SharedRecord,
        medvault_core::models::AuditLog,
        medvault_core::models::ShareLinkSummary,
        medvault_core::models::RecordBundle,
        medvault_core::models::SharedRecords,
        medvault_core::models::PrescriptionPage,
        medvault_core::models::AppointmentPage,
        medvault_core::models::LabReportPage,
        medvault_core::models::HealthInsurancePage,
        medvault_core::models::MedicationPage,
        medvault_core::models::ReminderPage,
    )),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/profile", get(auth::profile))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/sharing/create", post(sharing::create_share))
        .route("/sharing/my-shares", get(sharing::my_shares))
        .route("/sharing/:id/revoke", post(sharing::revoke_share))
        .route("/share/:token", get(sharing::view_shared))
        .route("/share/:token/download", get(sharing::download_shared))
        .route(
            "/prescriptions",
            post(records::create_prescription).get(records::list_prescriptions),
        )
        .route(
            "/prescriptions/:id",
            get(records::get_prescription)
                .put(records::update_prescription)
                .delete(records::delete_prescription),
        )
        .route(
            "/appointments",
            post(records::create_appointment).get(records::list_appointments),
        )
        .route(
            "/appointments/:id",
            get(records::get_appointment)
                .put(records::update_appointment)
                .delete(records::delete_appointment),
        )
        .route(
            "/lab-reports",
            post(records::create_lab_report).get(records::list_lab_reports),
        )
        .route(
            "/lab-reports/:id",
            get(records::get_lab_report)
                .put(records::update_lab_report)
                .delete(records::delete_lab_report),
        )
        .route(
            "/insurance",
            post(records::create_insurance).get(records::list_insurance),
        )
        .route(
            "/insurance/:id",
            get(records::get_insurance)
                .put(records::update_insurance)
                .delete(records::delete_insurance),
        )
        .route(
            "/medications",
            post(medications::create_medication).get(medications::list_medications),
        )
        .route("/medications/refill-needed", get(medications::refill_needed))
        .route(
            "/medications/:id",
            get(medications::get_medication)
                .put(medications::update_medication)
                .delete(medications::delete_medication),
        )
        .route(
            "/reminders",
            post(reminders::create_reminder).get(reminders::list_reminders),
        )
        .route("/reminders/upcoming", get(reminders::upcoming_reminders))
        .route(
            "/reminders/:id",
            get(reminders::get_reminder)
                .put(reminders::update_reminder)
                .delete(reminders::delete_reminder),
        );

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve the API until the process stops.
///
/// The peer address is made available to handlers for the share audit trail.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
