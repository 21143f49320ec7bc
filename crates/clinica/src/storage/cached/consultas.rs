//! Cached consultation repository decorator.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use clinica_core::cache::{groups, QueryKey};
use clinica_core::storage::{Consulta, ConsultaRepository, NewConsulta, Result};

use crate::cache::QueryCache;

/// Cached consultation repository decorator.
///
/// Every read is keyed under the `consultas` group; every successful write
/// drops the group once the repository has applied it. A read that was
/// already running when the group dropped still answers its caller but
/// leaves nothing in the cache, so a read started after a write always
/// reaches the repository.
///
/// # Type Parameters
///
/// * `R` - The underlying repository implementation
pub struct CachedConsultaRepository<R>
where
    R: ConsultaRepository,
{
    repository: Arc<R>,
    cache: Arc<QueryCache>,
}

impl<R> CachedConsultaRepository<R>
where
    R: ConsultaRepository,
{
    pub fn new(repository: Arc<R>, cache: Arc<QueryCache>) -> Self {
        Self { repository, cache }
    }

    async fn invalidate(&self) {
        let removed = self.cache.invalidate_group(groups::CONSULTAS).await;
        tracing::debug!(removed, "Invalidated consultas cache after write");
    }
}

#[async_trait]
impl<R> ConsultaRepository for CachedConsultaRepository<R>
where
    R: ConsultaRepository + 'static,
{
    async fn list_recent(&self, limit: usize) -> Result<Vec<Consulta>> {
        let key = QueryKey::new(groups::CONSULTAS, "completas").param("limit", limit);
        self.cache
            .cached(&key, || self.repository.list_recent(limit))
            .await
    }

    async fn list_on(&self, day: NaiveDate) -> Result<Vec<Consulta>> {
        let key = QueryKey::new(groups::CONSULTAS, "hoy").param("fecha", day);
        self.cache.cached(&key, || self.repository.list_on(day)).await
    }

    async fn get(&self, id: i64) -> Result<Option<Consulta>> {
        let key = QueryKey::new(groups::CONSULTAS, "detalle").param("id", id);
        self.cache.cached(&key, || self.repository.get(id)).await
    }

    async fn create(&self, consulta: NewConsulta) -> Result<Consulta> {
        let created = self.repository.create(consulta).await?;
        self.invalidate().await;

        tracing::debug!(consulta_id = created.id, "Consulta created");
        Ok(created)
    }

    async fn update(&self, id: i64, consulta: NewConsulta) -> Result<Consulta> {
        let updated = self.repository.update(id, consulta).await?;
        self.invalidate().await;

        tracing::debug!(consulta_id = id, "Consulta updated");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.repository.delete(id).await?;
        self.invalidate().await;

        tracing::debug!(consulta_id = id, "Consulta deleted");
        Ok(())
    }
}
