use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_authority_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use model_authority::authority::{
    BenchmarkStore, InMemoryBenchmarkStore, InMemoryMaiHistoryStore, JsonFileBenchmarkStore,
    JsonFileMaiHistoryStore, MaiHistoryStore,
};
use model_authority::config::AppConfig;
use model_authority::error::AppError;
use model_authority::telemetry;
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

    match config.scoring.data_dir.clone() {
        Some(dir) => {
            info!(data_dir = %dir.display(), "using json file history logs");
            serve(
                config,
                Arc::new(JsonFileMaiHistoryStore::new(&dir)),
                Arc::new(JsonFileBenchmarkStore::new(&dir)),
            )
            .await
        }
        None => {
            info!("using in-memory history logs");
            serve(
                config,
                Arc::new(InMemoryMaiHistoryStore::default()),
                Arc::new(InMemoryBenchmarkStore::default()),
            )
            .await
        }
    }
}

async fn serve<H, B>(config: AppConfig, history: Arc<H>, benchmarks: Arc<B>) -> Result<(), AppError>
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(build_service(&config.scoring, history, benchmarks));

    let app = with_authority_routes(service, config.server.require_api_token)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        require_api_token = config.server.require_api_token,
        "model authority service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
