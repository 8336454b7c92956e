//! Application state shared across API handlers

use std::sync::Arc;

use chain_client::{ChainStatus, ContractGateway, RpcGateway, SharedSession};
use locker::LockController;
use locker_core::AppConfig;

/// Controller as wired behind the API: any gateway, the shared session
pub type Controller = LockController<Arc<dyn ContractGateway>, SharedSession>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    session: SharedSession,
    controller: Controller,
    /// Present when the gateway is a JSON-RPC endpoint that can be probed
    rpc: Option<Arc<RpcGateway>>,
}

impl AppState {
    /// State over an arbitrary gateway (no chain probe)
    pub fn new(config: AppConfig, gateway: Arc<dyn ContractGateway>, session: SharedSession) -> Self {
        let controller = LockController::new(gateway, session.clone(), config.escrow, config.tokens.clone());
        Self::from_parts(config, session, controller, None)
    }

    /// State over a JSON-RPC gateway
    pub fn with_rpc(config: AppConfig, rpc: Arc<RpcGateway>, session: SharedSession) -> Self {
        let gateway: Arc<dyn ContractGateway> = rpc.clone();
        let controller = LockController::new(gateway, session.clone(), config.escrow, config.tokens.clone());
        Self::from_parts(config, session, controller, Some(rpc))
    }

    /// State around an already built controller
    pub fn from_parts(
        config: AppConfig,
        session: SharedSession,
        controller: Controller,
        rpc: Option<Arc<RpcGateway>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                session,
                controller,
                rpc,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &SharedSession {
        &self.inner.session
    }

    pub fn controller(&self) -> &Controller {
        &self.inner.controller
    }

    /// Probe the endpoint; offline when there is no JSON-RPC gateway
    pub async fn chain_status(&self) -> ChainStatus {
        match &self.inner.rpc {
            Some(rpc) => rpc.probe(self.inner.config.chain_id).await,
            None => ChainStatus::offline(),
        }
    }
}
