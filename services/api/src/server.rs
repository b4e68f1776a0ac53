use crate::cli::ServeArgs;
use crate::infra::{load_rubric, AppState, InMemoryAssessmentRepository, InMemoryRubricCatalog};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rubric_assess::config::AppConfig;
use rubric_assess::error::AppError;
use rubric_assess::telemetry;
use rubric_assess::workflows::assessment::{AssessmentService, Rubric};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let rubric = load_rubric(config.catalog.rubric_path.as_deref())?;
    let catalog = InMemoryRubricCatalog::with_rubric(rubric);
    if config.catalog.rubric_path.is_some() {
        // The standard rubric stays addressable next to a custom one.
        catalog.register(Rubric::standard());
    }

    let repository = Arc::new(InMemoryAssessmentRepository::default());
    let assessment_service = Arc::new(AssessmentService::new(repository, Arc::new(catalog)));

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rubric assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
