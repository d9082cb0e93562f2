use dorm_lottery::config::LotteryServiceConfig;
use dorm_lottery::lottery::{HttpLotteryService, LotteryFrontDesk, LotteryScope};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn http_desk(
    config: &LotteryServiceConfig,
    scope: LotteryScope,
) -> LotteryFrontDesk<HttpLotteryService> {
    let service = Arc::new(HttpLotteryService::new(config, scope));
    LotteryFrontDesk::new(scope, service)
}
