// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `formflow serve` command implementation.
//!
//! Builds every component explicitly at startup (no lazy singletons) and
//! wires them together: the spreadsheet-backed record store, the Zalo
//! gateway, the email extractor, the orchestrator pipeline, the webhook
//! server, and the two cron sweeps. Shuts down on SIGTERM/SIGINT.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{info, warn};

use formflow_bot::{MessagePipeline, Orchestrator, RateLimiter, TemplateSet};
use formflow_config::model::FormflowConfig;
use formflow_core::error::FormflowError;
use formflow_core::traits::{EmailExtractor, MessagingGateway, RecordStore};
use formflow_core::types::BotResponse;
use formflow_cron::{
    run_follow_up_loop, run_reconcile_loop, FollowUpSweeper, ReconcileSweeper,
};
use formflow_extract::{DisabledExtractor, LlmExtractor};
use formflow_gateway::{start_server, GatewayState};
use formflow_store::SheetStore;
use formflow_zalo::ZaloGateway;

use crate::shutdown;

/// Stand-in gateway used when no Zalo token is configured. Logs and
/// drops every send, so the rest of the system can run locally.
struct NullGateway;

#[async_trait]
impl MessagingGateway for NullGateway {
    async fn send(&self, response: &BotResponse, user_id: &str) -> Result<(), FormflowError> {
        warn!(user_id, text = %response.text, "no messaging token configured, dropping send");
        Ok(())
    }
}

fn build_gateway(config: &FormflowConfig) -> Result<Arc<dyn MessagingGateway>, FormflowError> {
    match &config.zalo.access_token {
        Some(token) => Ok(Arc::new(ZaloGateway::new(token.clone())?)),
        None => {
            warn!("zalo.access_token not set, outbound messages will be dropped");
            Ok(Arc::new(NullGateway))
        }
    }
}

fn build_extractor(config: &FormflowConfig) -> Result<Arc<dyn EmailExtractor>, FormflowError> {
    if config.extractor.api_key.is_some() {
        Ok(Arc::new(LlmExtractor::new(&config.extractor)?))
    } else {
        warn!("extractor.api_key not set, email extraction disabled");
        Ok(Arc::new(DisabledExtractor))
    }
}

/// Runs the `formflow serve` command.
pub async fn run_serve(config: FormflowConfig) -> Result<(), FormflowError> {
    init_tracing(&config.app.log_level);

    info!("starting formflow serve");

    let store: Arc<dyn RecordStore> = Arc::new(SheetStore::new(&config.sheets)?);
    let gateway = build_gateway(&config)?;
    let extractor = build_extractor(&config)?;

    let orchestrator = Arc::new(Orchestrator::new(
        store.clone(),
        extractor,
        TemplateSet::builtin()?,
        config.form.url.clone(),
    ));
    let pipeline = Arc::new(MessagePipeline::new(orchestrator, gateway.clone()));
    let rate_limiter = Arc::new(RateLimiter::new(
        Duration::from_secs(config.rate_limit.min_interval_secs),
        Duration::from_secs(config.rate_limit.retention_secs),
        Duration::from_secs(config.rate_limit.cleanup_interval_secs),
    ));

    let follow_up = Arc::new(FollowUpSweeper::new(
        store.clone(),
        pipeline.clone(),
        config.follow_up.threshold_secs as i64,
    ));
    let reconciler = Arc::new(ReconcileSweeper::new(store, gateway));

    let cancel = shutdown::install_signal_handler();

    let follow_up_task = tokio::spawn(run_follow_up_loop(
        follow_up,
        Duration::from_secs(config.follow_up.sweep_interval_secs),
        cancel.clone(),
    ));
    let reconcile_task = tokio::spawn(run_reconcile_loop(
        reconciler.clone(),
        Duration::from_secs(config.follow_up.reconcile_interval_secs),
        cancel.clone(),
    ));

    let state = GatewayState {
        pipeline,
        rate_limiter,
        reconciler,
        start_time: Instant::now(),
    };
    let result = start_server(&config.server.host, config.server.port, state, cancel.clone()).await;

    // The server only returns after cancellation or a bind error; either
    // way the sweeps must stop before we exit.
    cancel.cancel();
    let _ = follow_up_task.await;
    let _ = reconcile_task.await;

    info!("formflow serve stopped");
    result
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("formflow={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
