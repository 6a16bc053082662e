//! # medchat_api
//!
//! HTTP API library for MedChat.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use medchat_core::store::{
    ConversationStore, CredentialStore, FaqStore, MemoryConversationStore, MemoryCredentialStore,
    MemoryFaqStore, MemorySessionStore, PgStore, SessionStore,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, conversations, faq, health};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub conversations: Arc<dyn ConversationStore>,
    pub faqs: Arc<dyn FaqStore>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// All stores backed by one PostgreSQL pool.
    pub fn postgres(pool: PgPool, config: ApiConfig) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            credentials: store.clone(),
            sessions: store.clone(),
            conversations: store.clone(),
            faqs: store,
            config,
        }
    }

    /// Process-local stores; nothing survives a restart.
    pub fn in_memory(config: ApiConfig) -> Self {
        Self {
            credentials: Arc::new(MemoryCredentialStore::new()),
            sessions: Arc::new(MemorySessionStore::new()),
            conversations: Arc::new(MemoryConversationStore::new()),
            faqs: Arc::new(MemoryFaqStore::new()),
            config,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `medchat_core::store::postgres::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    medchat_core::store::postgres::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_API_HEALTH, get(health::health_handler))
        .route(routes::POST_API_SIGNUP, post(auth::signup_handler))
        .route(routes::POST_API_LOGIN, post(auth::login_handler))
        .route(routes::POST_API_REFRESH, post(auth::refresh_handler))
        .route(routes::POST_API_LOGOUT, post(auth::logout_handler))
        .route(routes::POST_API_FAQ, post(faq::create_faq_handler))
        .route(routes::POST_API_ASK, post(faq::ask_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(
            routes::API_CONVERSATIONS,
            get(conversations::list_conversations_handler)
                .post(conversations::create_conversation_handler),
        )
        .route(
            routes::GET_API_CONVERSATIONS_ID,
            get(conversations::get_conversation_handler),
        )
        .route(
            routes::POST_API_CONVERSATIONS_ID_MESSAGE,
            post(conversations::append_message_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
