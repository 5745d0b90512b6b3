use std::sync::Arc;

use hepre_core::{CryptoContext, DecompositionBaseLog};
use hepre_storage::{InMemoryKeyStorage, KeyStorage, LocalKeyStorage};

use crate::config::{Config, StorageBackend};
use crate::gateway::RequestGateway;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<RequestGateway>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the crypto context and storage backend.
    ///
    /// Any configuration problem fails here, before the listener binds.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let context = CryptoContext::initialize(&config.parameter_set)?;
        let decomposition = config
            .decomposition_base_log
            .map(DecompositionBaseLog)
            .unwrap_or_else(|| context.default_decomposition());
        context.check_decomposition(decomposition)?;

        let storage: Arc<dyn KeyStorage> = match config.storage.backend {
            StorageBackend::Local => {
                Arc::new(LocalKeyStorage::new(&config.storage.local_path).await?)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory key storage - keys are lost on restart");
                Arc::new(InMemoryKeyStorage::new())
            }
        };

        if config.trust.allow_proxy_key_derivation {
            tracing::warn!(
                "Proxy-side switching key derivation enabled - this server will read both secret keys"
            );
        }

        tracing::info!(
            parameter_set = %config.parameter_set,
            %decomposition,
            slot_capacity = context.slot_capacity(),
            "crypto context ready"
        );

        let gateway = RequestGateway::new(Arc::new(context), storage)
            .with_decomposition(decomposition)
            .with_proxy_key_derivation(config.trust.allow_proxy_key_derivation);

        Ok(Self {
            gateway: Arc::new(gateway),
            config: Arc::new(config.clone()),
        })
    }
}
