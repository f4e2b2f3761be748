// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! # Idle Session Sweeper
//!
//! Background task that ends sessions whose viewer stopped making requests.
//! A client that navigates away never deletes its session.
//!
//! Every `sweep_interval` the sweeper removes sessions idle for at least
//! `idle_ttl` and calls [`ViewerSession::end`](crate::workflow::ViewerSession::end)
//! on each, which abandons any in-flight submission and clears decrypted
//! fields.
//!
//! ## Shutdown
//!
//! Stops when its `CancellationToken` is cancelled.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::state::AppState;

pub struct SessionSweeper {
    state: AppState,
    idle_ttl: Duration,
    sweep_interval: Duration,
}

impl SessionSweeper {
    /// Sweeper using the TTL and interval from the state's configuration.
    pub fn new(state: AppState) -> Self {
        let idle_ttl = state.config.session_idle_ttl;
        let sweep_interval = state.config.session_sweep_interval;
        Self {
            state,
            idle_ttl,
            sweep_interval,
        }
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// ```rust,ignore
    /// tokio::spawn(SessionSweeper::new(state.clone()).run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            idle_ttl_secs = self.idle_ttl.as_secs(),
            interval_secs = self.sweep_interval.as_secs(),
            "Session sweeper starting"
        );

        let mut ticker = tokio::time::interval(self.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.state.expire_idle_sessions(self.idle_ttl).await;
                    if removed > 0 {
                        debug!(removed, "Session sweep finished");
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Session sweeper shutting down");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        extract::{Path, State},
        Json,
    };

    use crate::api::profiles::decrypt_field;
    use crate::api::sessions::{create_session, get_session};
    use crate::blockchain::ProfileField;
    use crate::config::AppConfig;
    use crate::workflow::testing::{sample_profile, test_app, FakeReader};
    use crate::workflow::DecryptState;

    #[tokio::test(start_paused = true)]
    async fn abandoned_session_loses_its_decrypted_values() {
        let mut app = test_app(FakeReader::with_profiles(&[1]), true).await;
        app.state.config = Arc::new(AppConfig {
            session_idle_ttl: Duration::from_secs(300),
            session_sweep_interval: Duration::from_secs(30),
            ..(*app.state.config).clone()
        });
        app.encryption.set_plaintext(sample_profile(1).academic_score, 4);

        let (_, Json(created)) = create_session(State(app.state.clone())).await;
        let Json(view) = decrypt_field(
            Path((created.session_id, 1, "academic_score".to_string())),
            State(app.state.clone()),
        )
        .await
        .unwrap();
        assert_eq!(view.state, DecryptState::Resolved { value: 4 });
        let session = app.state.session(created.session_id).await.unwrap();

        let shutdown = CancellationToken::new();
        let sweeper = tokio::spawn(SessionSweeper::new(app.state.clone()).run(shutdown.clone()));

        tokio::time::sleep(Duration::from_secs(200)).await;
        assert!(app.state.session(created.session_id).await.is_some());

        tokio::time::sleep(Duration::from_secs(200)).await;
        assert!(app.state.session(created.session_id).await.is_none());
        assert_eq!(
            session.decrypted.state(1, ProfileField::AcademicScore),
            DecryptState::NotRequested
        );

        shutdown.cancel();
        sweeper.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn active_session_survives_sweeps() {
        let mut app = test_app(FakeReader::default(), true).await;
        app.state.config = Arc::new(AppConfig {
            session_idle_ttl: Duration::from_secs(60),
            session_sweep_interval: Duration::from_secs(10),
            ..(*app.state.config).clone()
        });
        let (_, Json(created)) = create_session(State(app.state.clone())).await;

        let shutdown = CancellationToken::new();
        let sweeper = tokio::spawn(SessionSweeper::new(app.state.clone()).run(shutdown.clone()));

        for _ in 0..10 {
            tokio::time::sleep(Duration::from_secs(40)).await;
            get_session(Path(created.session_id), State(app.state.clone()))
                .await
                .expect("session still live");
        }

        shutdown.cancel();
        sweeper.await.unwrap();
    }
}
