use serde::{Deserialize, Serialize};
use std::fmt;

/// One exam/mode combination. Pools and registries are keyed by slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolSlot {
    pub exam: String,
    pub mode: String,
}

impl PoolSlot {
    pub fn new(exam: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            exam: exam.into(),
            mode: mode.into(),
        }
    }
}

impl fmt::Display for PoolSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.exam, self.mode)
    }
}

/// A user receiving a key. Field names double as the CSV log header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "ClaveAsignada")]
    pub assigned_key: String,
    #[serde(rename = "TipoExamen")]
    pub exam: String,
    #[serde(rename = "Modo")]
    pub mode: String,
    #[serde(rename = "CodigoAutorizacion")]
    pub auth_code: Option<String>,
}

impl Registration {
    pub fn slot(&self) -> PoolSlot {
        PoolSlot::new(self.exam.clone(), self.mode.clone())
    }
}
