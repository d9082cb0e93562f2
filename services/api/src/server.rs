use crate::cli::ServeArgs;
use crate::infra::{http_desk, AppState};
use crate::routes::with_lottery_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dorm_lottery::config::AppConfig;
use dorm_lottery::error::AppError;
use dorm_lottery::lottery::LotteryScope;
use dorm_lottery::telemetry;
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

    let pre_data = Arc::new(http_desk(&config.lottery, LotteryScope::PreData));
    let realtime = Arc::new(http_desk(&config.lottery, LotteryScope::Realtime));

    let app = with_lottery_routes(pre_data, realtime)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        backend = %config.lottery.base_url,
        "dorm lottery front desk ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
