use crate::cli::ServeArgs;
use crate::infra::{
    default_submission_config, AppState, InMemoryApplicationStore, InMemoryContactRelay,
    InMemoryDocumentStore, InMemoryMailingList, InMemoryNotifier, OUTREACH_CALL_TIMEOUT,
};
use crate::routes::with_engagement_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dmf_engage::config::AppConfig;
use dmf_engage::error::AppError;
use dmf_engage::telemetry;
use dmf_engage::workflows::outreach::OutreachService;
use dmf_engage::workflows::scholarship::SubmissionPipeline;
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

    let documents = Arc::new(InMemoryDocumentStore::default());
    let records = Arc::new(InMemoryApplicationStore::default());
    let notifier = Arc::new(InMemoryNotifier::default());
    let pipeline = Arc::new(SubmissionPipeline::new(
        documents,
        records,
        notifier,
        default_submission_config(&config.intake),
    ));

    let directory = Arc::new(InMemoryMailingList::default());
    let relay = Arc::new(InMemoryContactRelay::default());
    let outreach = Arc::new(OutreachService::new(directory, relay, OUTREACH_CALL_TIMEOUT));

    let app = with_engagement_routes(pipeline, outreach)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "scholarship intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
