mod error;
mod traits;
mod types;

pub use error::{repository_error_to_status_code, RepositoryError, Result};
pub use traits::ConsultaRepository;
pub use types::{sort_recent_first, Consulta, NewConsulta};
