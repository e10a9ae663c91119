use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use praktijk::auth::{session_layer, AuthGate, SingleAdminVerifier};
use praktijk::config::AppConfig;
use praktijk::contact::{ConfiguredTransport, ContactDispatcher, Envelope};
use praktijk::error::AppError;
use praktijk::records::DocumentStore;
use praktijk::telemetry;
use praktijk::web::{site_router, SiteState};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let store = Arc::new(DocumentStore::new(config.storage.data_file.clone()));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        store: Arc::clone(&store),
    };

    let verifier = SingleAdminVerifier::from_config(&config.admin);
    if !verifier.is_configured() {
        warn!("ADMIN_PASSWORD is not set, backoffice logins are disabled");
    }
    let gate = AuthGate::new(Arc::new(verifier));

    let transport = ConfiguredTransport::from_config(&config.mail)?;
    info!(transport = transport.describe(), "mail transport selected");
    let contact = ContactDispatcher::new(Arc::new(transport), Envelope::from_config(&config.mail));

    let site = Arc::new(SiteState::new(store, gate, contact));

    let app = with_operational_routes(site_router(site), &config.storage.public_dir)
        .layer(session_layer(config.environment.is_production()))
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_file = %config.storage.data_file.display(),
        "website ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
