//! Application assembly: database, router, and server lifecycle.

use std::future::IntoFuture;
use std::net::SocketAddr;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::BookkeepingConfig;
use crate::handlers;
use crate::middleware::{auth_middleware, metrics_middleware};
use crate::services::{AuthService, Database};
use service_core::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: BookkeepingConfig,
    pub db: Database,
    pub auth: AuthService,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: BookkeepingConfig) -> Result<Self, AppError> {
        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to PostgreSQL: {}", e);
            e
        })?;
        db.run_migrations().await.map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            e
        })?;

        let auth = AuthService::new(&config.jwt);

        let state = AppState {
            config: config.clone(),
            db,
            auth,
        };

        let protected = Router::new()
            .route(
                "/accounts",
                get(handlers::list_accounts).post(handlers::create_account),
            )
            .route("/accounts/:id", get(handlers::get_account))
            .route(
                "/transactions",
                get(handlers::list_transactions).post(handlers::create_transaction),
            )
            .route("/transactions/:id", get(handlers::get_transaction))
            .route(
                "/invoices",
                get(handlers::list_invoices).post(handlers::create_invoice),
            )
            .route("/invoices/:id", get(handlers::get_invoice))
            .route(
                "/invoices/:id/status",
                post(handlers::update_invoice_status),
            )
            .route("/reports", post(handlers::generate_report))
            .layer(from_fn_with_state(state.clone(), auth_middleware));

        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics_handler))
            .route("/auth/register", post(handlers::register))
            .route("/auth/login", post(handlers::login))
            .merge(protected)
            .layer(from_fn(metrics_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
