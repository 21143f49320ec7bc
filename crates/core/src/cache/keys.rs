use std::collections::BTreeMap;
use std::fmt;

/// Cache groups, one per repository whose reads are memoized.
///
/// Every write on a repository invalidates its whole group.
pub mod groups {
    pub const CONSULTAS: &str = "consultas";
    pub const PACIENTES: &str = "pacientes";
    pub const DOCTORES: &str = "doctores";
    pub const ESPECIALIDADES: &str = "especialidades";
    pub const LABORATORIO: &str = "laboratorio";
    pub const FARMACIA: &str = "farmacia";
    pub const MARCAS: &str = "marcas";
    pub const PROVEEDORES: &str = "proveedores";
    pub const GASTOS: &str = "gastos";
    pub const REPORTES: &str = "reportes";
    pub const HOY: &str = "hoy";
}

/// Identity of a memoized query: its group, its name and every effective
/// parameter.
///
/// Renders as `"{group}_{query}"` followed by one `:name=value` segment per
/// parameter, sorted by name. Values are percent-encoded so separators inside
/// a value cannot make two different parameter sets render the same key.
///
/// # Examples
///
/// ```
/// use clinica_core::cache::QueryKey;
///
/// let key = QueryKey::new("consultas", "completas").param("limit", 50);
/// assert_eq!(key.to_string(), "consultas_completas:limit=50");
/// assert_eq!(key.group(), "consultas");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    group: String,
    query: String,
    params: BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new(group: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            query: query.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds an effective parameter. Setting the same name twice keeps the last value.
    pub fn param(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.group, self.query)?;
        for (name, value) in &self.params {
            write!(f, ":{}={}", name, urlencoding::encode(value))?;
        }
        Ok(())
    }
}

/// Returns the glob pattern matching every key rendered for `group`.
pub fn group_pattern(group: &str) -> String {
    format!("{}_*", group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_without_params() {
        let key = QueryKey::new(groups::HOY, "ingresos");
        assert_eq!(key.to_string(), "hoy_ingresos");
    }

    #[test]
    fn test_key_with_single_param() {
        let key = QueryKey::new(groups::CONSULTAS, "completas").param("limit", 50);
        assert_eq!(key.to_string(), "consultas_completas:limit=50");
    }

    #[test]
    fn test_params_are_sorted_by_name() {
        let a = QueryKey::new(groups::GASTOS, "rango")
            .param("hasta", "2024-01-31")
            .param("desde", "2024-01-01");
        let b = QueryKey::new(groups::GASTOS, "rango")
            .param("desde", "2024-01-01")
            .param("hasta", "2024-01-31");

        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(
            a.to_string(),
            "gastos_rango:desde=2024-01-01:hasta=2024-01-31"
        );
    }

    #[test]
    fn test_different_values_never_collide() {
        let a = QueryKey::new(groups::PACIENTES, "buscar").param("q", "ana");
        let b = QueryKey::new(groups::PACIENTES, "buscar").param("q", "ana:limit=5");
        let c = QueryKey::new(groups::PACIENTES, "buscar")
            .param("q", "ana")
            .param("limit", 5);

        assert_ne!(a.to_string(), b.to_string());
        assert_ne!(b.to_string(), c.to_string());
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let key = QueryKey::new(groups::PACIENTES, "buscar").param("q", "josé pérez");
        assert_eq!(key.to_string(), "pacientes_buscar:q=jos%C3%A9%20p%C3%A9rez");
    }

    #[test]
    fn test_repeated_param_keeps_last_value() {
        let key = QueryKey::new(groups::CONSULTAS, "completas")
            .param("limit", 10)
            .param("limit", 50);
        assert_eq!(key.to_string(), "consultas_completas:limit=50");
    }

    #[test]
    fn test_group_pattern() {
        assert_eq!(group_pattern(groups::CONSULTAS), "consultas_*");
    }
}
