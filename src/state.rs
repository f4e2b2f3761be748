// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::blockchain::{
    ChainSubmitter, DisconnectedSubmitter, LocalWallet, ProfileReader, ProfileSubmitter,
    ScholarClient, WalletProvider,
};
use crate::config::AppConfig;
use crate::encryption::{EncryptionContext, RelayerClient};
use crate::error::ScholarError;
use crate::providers::{ContentStore, PinataClient};
use crate::workflow::{ProfileQuery, SubmissionServices, ViewerSession};

/// Live viewer sessions by id.
pub type SessionMap = Arc<RwLock<HashMap<Uuid, Arc<ViewerSession>>>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub encryption: Arc<EncryptionContext>,
    pub wallet: Arc<dyn WalletProvider>,
    pub store: Option<Arc<dyn ContentStore>>,
    pub chain: Arc<dyn ChainSubmitter>,
    pub reader: Arc<dyn ProfileReader>,
    pub sessions: SessionMap,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        encryption: Arc<EncryptionContext>,
        wallet: Arc<dyn WalletProvider>,
        store: Option<Arc<dyn ContentStore>>,
        chain: Arc<dyn ChainSubmitter>,
        reader: Arc<dyn ProfileReader>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            encryption,
            wallet,
            store,
            chain,
            reader,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Wire the production adapters described by `config`.
    pub fn from_config(config: AppConfig) -> Result<Self, ScholarError> {
        let wallet = match config.wallet_private_key.as_deref() {
            Some(key) => LocalWallet::from_hex(key)
                .map_err(|e| ScholarError::Configuration(e.to_string()))?,
            None => {
                tracing::warn!("No wallet key configured; submissions and decryption are disabled");
                LocalWallet::disconnected()
            }
        };

        let chain: Arc<dyn ChainSubmitter> = match wallet.ethereum_wallet() {
            Some(signer) => Arc::new(
                ProfileSubmitter::new(
                    config.network.clone(),
                    &config.rpc_url,
                    signer,
                    config.confirmation_timeout,
                    config.confirmation_poll_interval,
                )
                .map_err(|e| ScholarError::Configuration(e.to_string()))?,
            ),
            None => Arc::new(DisconnectedSubmitter),
        };

        let reader = ScholarClient::new(config.network.clone(), &config.rpc_url)
            .map_err(|e| ScholarError::Configuration(e.to_string()))?;

        let relayer = RelayerClient::new(config.relayer_url.clone())
            .map_err(|e| ScholarError::Configuration(e.to_string()))?;

        let store: Option<Arc<dyn ContentStore>> = match &config.pinata {
            Some(credentials) => Some(Arc::new(PinataClient::new(
                credentials.clone(),
                config.pinata_api_url.clone(),
                config.pinata_gateway_url.clone(),
            )?)),
            None => {
                tracing::warn!("Pinata keys not configured; attachments will be rejected");
                None
            }
        };

        let wallet: Arc<dyn WalletProvider> = Arc::new(wallet);
        let encryption = Arc::new(EncryptionContext::new(
            Arc::new(relayer),
            Arc::clone(&wallet),
            config.network.clone(),
            config.init_retry,
        ));

        Ok(Self::new(
            config,
            encryption,
            wallet,
            store,
            chain,
            Arc::new(reader),
        ))
    }

    pub fn submission_services(&self) -> SubmissionServices {
        SubmissionServices {
            encryption: Arc::clone(&self.encryption),
            wallet: Arc::clone(&self.wallet),
            store: self.store.clone(),
            chain: Arc::clone(&self.chain),
            contract_address: self.config.contract_address.clone(),
        }
    }

    pub fn profile_query(&self) -> ProfileQuery {
        ProfileQuery::new(
            Arc::clone(&self.reader),
            self.config.contract_address.clone(),
        )
    }

    pub async fn session(&self, id: Uuid) -> Option<Arc<ViewerSession>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// End and drop every session idle for at least `ttl`.
    ///
    /// Returns how many sessions were removed.
    pub async fn expire_idle_sessions(&self, ttl: Duration) -> usize {
        let expired: Vec<Arc<ViewerSession>> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, session)| session.is_expired(ttl))
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &expired {
            tracing::info!(
                session_id = %session.id,
                idle_secs = session.idle_for().as_secs(),
                "Idle session expired"
            );
            session.end();
        }
        expired.len()
    }
}
