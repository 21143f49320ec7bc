//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use clinica_core::storage::{
    sort_recent_first, Consulta, ConsultaRepository, NewConsulta, RepositoryError, Result,
};

/// In-memory storage backend.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    consultas: Arc<RwLock<HashMap<i64, Consulta>>>,
    next_id: Arc<AtomicI64>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            consultas: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

fn not_found(id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: "Consulta",
        id: id.to_string(),
    }
}

fn validate(consulta: &NewConsulta) -> Result<()> {
    if consulta.motivo.trim().is_empty() {
        return Err(RepositoryError::InvalidData(
            "motivo must not be empty".to_string(),
        ));
    }
    if consulta.costo < 0 {
        return Err(RepositoryError::InvalidData(
            "costo must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl ConsultaRepository for InMemoryRepository {
    async fn list_recent(&self, limit: usize) -> Result<Vec<Consulta>> {
        let consultas = self.consultas.read().await;
        let mut list: Vec<Consulta> = consultas.values().cloned().collect();
        sort_recent_first(&mut list);
        list.truncate(limit);
        Ok(list)
    }

    async fn list_on(&self, day: NaiveDate) -> Result<Vec<Consulta>> {
        let consultas = self.consultas.read().await;
        let mut list: Vec<Consulta> = consultas
            .values()
            .filter(|c| c.is_on(day))
            .cloned()
            .collect();
        sort_recent_first(&mut list);
        Ok(list)
    }

    async fn get(&self, id: i64) -> Result<Option<Consulta>> {
        let consultas = self.consultas.read().await;
        Ok(consultas.get(&id).cloned())
    }

    async fn create(&self, consulta: NewConsulta) -> Result<Consulta> {
        validate(&consulta)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let consulta = consulta.into_consulta(id);

        let mut consultas = self.consultas.write().await;
        consultas.insert(id, consulta.clone());
        Ok(consulta)
    }

    async fn update(&self, id: i64, consulta: NewConsulta) -> Result<Consulta> {
        validate(&consulta)?;

        let mut consultas = self.consultas.write().await;
        let existing = consultas.get_mut(&id).ok_or_else(|| not_found(id))?;
        *existing = consulta.into_consulta(id);
        Ok(existing.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut consultas = self.consultas.write().await;
        consultas.remove(&id).map(|_| ()).ok_or_else(|| not_found(id))
    }
}
