//! Shared application state.
//!
//! Every long-lived service is built once at startup and injected here;
//! handlers only ever see these handles.

use std::sync::Arc;

use clinica_auth::{
    AuthConfig, AuthError, AuthState, InMemoryUserDirectory, SessionManager, SessionStore,
};
use clinica_core::auth::RolePermissions;
use clinica_core::cache::TtlTable;
use clinica_core::storage::ConsultaRepository;

use crate::cache::{MemoryCache, QueryCache};
use crate::config::Config;
use crate::storage::{cached::CachedConsultaRepository, inmemory::InMemoryRepository};

#[derive(Clone)]
pub struct AppState {
    /// Consulta repository (cached, wraps underlying storage).
    pub consultas: Arc<dyn ConsultaRepository>,
    /// Query cache shared by every cached repository.
    pub cache: Arc<QueryCache>,
    /// Backend of `cache`, kept for entry counts.
    pub memory: MemoryCache,
    pub auth: AuthState,
}

impl AppState {
    /// Wires the in-memory repository, the query cache and the session
    /// manager together.
    pub fn new(
        memory: MemoryCache,
        ttls: TtlTable,
        auth_config: &AuthConfig,
        users: Arc<InMemoryUserDirectory>,
        roles: RolePermissions,
    ) -> Result<Self, AuthError> {
        let cache = Arc::new(QueryCache::new(Arc::new(memory.clone()), ttls));
        let consultas = CachedConsultaRepository::new(
            Arc::new(InMemoryRepository::new()),
            Arc::clone(&cache),
        );
        let manager = SessionManager::new(
            auth_config,
            users,
            Arc::new(SessionStore::new()),
            roles,
        )?;

        Ok(Self {
            consultas: Arc::new(consultas),
            cache,
            memory,
            auth: AuthState::new(Arc::new(manager)),
        })
    }

    /// Builds the state described by `config`.
    pub fn from_config(
        config: &Config,
        users: Arc<InMemoryUserDirectory>,
        roles: RolePermissions,
    ) -> Result<Self, AuthError> {
        Self::new(
            MemoryCache::new(config.cache_max_entries),
            config.cache_ttls.clone(),
            &config.auth,
            users,
            roles,
        )
    }
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}
