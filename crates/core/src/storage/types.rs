use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A medical consultation as listed by the clinic front desk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consulta {
    pub id: i64,
    pub paciente_id: i64,
    pub paciente_nombre: String,
    pub doctor_id: i64,
    pub doctor_nombre: String,
    pub fecha: DateTime<Utc>,
    pub motivo: String,
    pub diagnostico: Option<String>,
    /// Fee in cents.
    pub costo: i64,
}

impl Consulta {
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.fecha.date_naive() == day
    }
}

/// Fields supplied when creating or updating a consultation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConsulta {
    pub paciente_id: i64,
    pub paciente_nombre: String,
    pub doctor_id: i64,
    pub doctor_nombre: String,
    pub fecha: DateTime<Utc>,
    pub motivo: String,
    #[serde(default)]
    pub diagnostico: Option<String>,
    pub costo: i64,
}

impl NewConsulta {
    pub fn into_consulta(self, id: i64) -> Consulta {
        Consulta {
            id,
            paciente_id: self.paciente_id,
            paciente_nombre: self.paciente_nombre,
            doctor_id: self.doctor_id,
            doctor_nombre: self.doctor_nombre,
            fecha: self.fecha,
            motivo: self.motivo,
            diagnostico: self.diagnostico,
            costo: self.costo,
        }
    }
}

/// Most recent first, ties broken by id so listings are stable.
pub fn sort_recent_first(consultas: &mut [Consulta]) {
    consultas.sort_by(|a, b| b.fecha.cmp(&a.fecha).then(b.id.cmp(&a.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn consulta(id: i64, fecha: DateTime<Utc>) -> Consulta {
        NewConsulta {
            paciente_id: 1,
            paciente_nombre: "Luis Paz".to_string(),
            doctor_id: 2,
            doctor_nombre: "Dra. Rojas".to_string(),
            fecha,
            motivo: "control".to_string(),
            diagnostico: None,
            costo: 25_000,
        }
        .into_consulta(id)
    }

    #[test]
    fn test_is_on_compares_calendar_day() {
        let c = consulta(1, Utc.with_ymd_and_hms(2024, 3, 5, 23, 30, 0).unwrap());
        assert!(c.is_on(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()));
        assert!(!c.is_on(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()));
    }

    #[test]
    fn test_sort_recent_first() {
        let early = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap();
        let mut list = vec![consulta(1, early), consulta(2, late), consulta(3, early)];

        sort_recent_first(&mut list);

        let ids: Vec<i64> = list.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_new_consulta_diagnostico_defaults_to_none() {
        let json = r#"{
            "paciente_id": 1, "paciente_nombre": "Luis Paz",
            "doctor_id": 2, "doctor_nombre": "Dra. Rojas",
            "fecha": "2024-03-05T09:00:00Z", "motivo": "control", "costo": 25000
        }"#;
        let parsed: NewConsulta = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.diagnostico, None);
    }
}
