//! Role → permission-set mapping.
//!
//! The mapping is configuration: it is loaded from JSON and only looked up
//! here, never computed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{normalize_identifier, Permissions};

/// Permission names used across the clinic modules.
pub mod permission {
    pub const CONSULTAS: &str = "consultas";
    pub const PACIENTES: &str = "pacientes";
    pub const DOCTORES: &str = "doctores";
    pub const LABORATORIO: &str = "laboratorio";
    pub const FARMACIA: &str = "farmacia";
    pub const GASTOS: &str = "gastos";
    pub const REPORTES: &str = "reportes";
    pub const USUARIOS: &str = "usuarios";
    pub const CONFIGURACION: &str = "configuracion";

    pub const ALL: &[&str] = &[
        CONSULTAS,
        PACIENTES,
        DOCTORES,
        LABORATORIO,
        FARMACIA,
        GASTOS,
        REPORTES,
        USUARIOS,
        CONFIGURACION,
    ];
}

/// Permission sets keyed by role name (case-insensitive).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RolePermissions {
    roles: HashMap<String, Permissions>,
}

impl RolePermissions {
    /// Parses a JSON object such as `{"medico": {"consultas": true}}`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let parsed: HashMap<String, Permissions> = serde_json::from_str(json)?;
        Ok(Self {
            roles: parsed
                .into_iter()
                .map(|(role, perms)| (normalize_identifier(&role), perms))
                .collect(),
        })
    }

    /// Default mapping for the clinic roles.
    pub fn builtin() -> Self {
        use permission::*;

        let grant = |granted: &[&str]| -> Permissions {
            ALL.iter()
                .map(|p| (p.to_string(), granted.contains(p)))
                .collect()
        };

        let roles = HashMap::from([
            ("administrador".to_string(), grant(ALL)),
            (
                "medico".to_string(),
                grant(&[CONSULTAS, PACIENTES, LABORATORIO, REPORTES]),
            ),
            (
                "recepcion".to_string(),
                grant(&[CONSULTAS, PACIENTES, DOCTORES]),
            ),
            ("farmacia".to_string(), grant(&[FARMACIA, GASTOS])),
            ("laboratorio".to_string(), grant(&[LABORATORIO, PACIENTES])),
        ]);

        Self { roles }
    }

    pub fn with_role(mut self, role: &str, permissions: Permissions) -> Self {
        self.roles.insert(normalize_identifier(role), permissions);
        self
    }

    /// Permissions of a role; unknown roles get none.
    pub fn for_role(&self, role_name: &str) -> Permissions {
        self.roles
            .get(&normalize_identifier(role_name))
            .cloned()
            .unwrap_or_default()
    }
}
