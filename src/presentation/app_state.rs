// Application state for HTTP handlers
use crate::application::appointment_service::AppointmentService;
use crate::application::auth_service::AuthService;
use crate::application::community_service::CommunityService;
use crate::application::dashboard_service::DashboardService;
use crate::application::document_assembler::DocumentAssembler;
use crate::application::export::LogoLoader;
use crate::application::notification_service::NotificationService;
use crate::application::report_service::{ReportService, ReportSettings};
use crate::application::session_context::SessionContext;
use crate::application::table_layout::GridTableLayout;
use crate::application::user_service::UserService;
use crate::infrastructure::api_client::MedConnectApi;
use crate::infrastructure::config::{DashboardConfig, Settings};
use crate::infrastructure::logo_loader::HttpLogoLoader;
use crate::infrastructure::pdf_writer::PdfWriter;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub report_service: Arc<ReportService>,
    pub notification_service: Arc<NotificationService>,
    pub community_service: CommunityService,
    pub appointment_service: AppointmentService,
    pub user_service: UserService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Wire every service to one session context and one backend client
    pub fn wire(settings: &Settings, dashboard: DashboardConfig) -> anyhow::Result<Self> {
        let session = Arc::new(SessionContext::new());

        // Create repository (infrastructure layer)
        let api = Arc::new(MedConnectApi::new(
            &settings.api.base_url,
            settings.api.timeout(),
            session.clone(),
        )?);

        let logo_loader = settings.report.logo_url.as_ref().map(|source| {
            Arc::new(HttpLogoLoader::new(reqwest::Client::new(), source.clone())) as Arc<dyn LogoLoader>
        });

        // Create services (application layer)
        let report_service = ReportService::new(
            api.clone(),
            session.clone(),
            Arc::new(PdfWriter),
            logo_loader,
            DocumentAssembler::new(Arc::new(GridTableLayout::default())),
            ReportSettings {
                organization: settings.report.organization.clone(),
                logo_timeout: settings.report.logo_timeout(),
            },
        );

        Ok(Self {
            auth_service: AuthService::new(api.clone(), session.clone()),
            report_service: Arc::new(report_service),
            notification_service: Arc::new(NotificationService::new(api.clone(), session.clone())),
            community_service: CommunityService::new(api.clone(), session.clone()),
            appointment_service: AppointmentService::new(api.clone(), session.clone()),
            user_service: UserService::new(api.clone(), session),
            dashboard_service: DashboardService::new(api, dashboard),
        })
    }
}
