use async_trait::async_trait;
use chrono::NaiveDate;

use super::{Consulta, NewConsulta, Result};

/// Repository for consultation operations.
#[async_trait]
pub trait ConsultaRepository: Send + Sync {
    /// Gets the `limit` most recent consultations, most recent first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Consulta>>;

    /// Gets the consultations scheduled on `day`.
    async fn list_on(&self, day: NaiveDate) -> Result<Vec<Consulta>>;

    /// Gets a consultation by its ID.
    async fn get(&self, id: i64) -> Result<Option<Consulta>>;

    /// Creates a consultation and returns it with its assigned ID.
    async fn create(&self, consulta: NewConsulta) -> Result<Consulta>;

    /// Replaces an existing consultation.
    async fn update(&self, id: i64, consulta: NewConsulta) -> Result<Consulta>;

    /// Deletes a consultation by its ID.
    async fn delete(&self, id: i64) -> Result<()>;
}
