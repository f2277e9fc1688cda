use crate::config::CatalogSettings;
use crate::models::PoolSlot;
use secrecy::{ExposeSecret, Secret};
use service_core::utils::secret_matches;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog must define at least one exam")]
    NoExams,

    #[error("catalog must define at least one mode")]
    NoModes,

    #[error("invalid {kind} id '{id}': use letters, digits, '-' or '_'")]
    InvalidId { kind: &'static str, id: String },

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("key pool refers to unknown exam '{0}'")]
    UnknownPoolExam(String),

    #[error("key pool refers to unknown mode '{0}'")]
    UnknownPoolMode(String),

    #[error("key pool for {0} is configured more than once")]
    DuplicatePool(PoolSlot),
}

#[derive(Clone)]
pub struct Exam {
    pub id: String,
    pub label: String,
    authorization_code: Option<Secret<String>>,
}

impl Exam {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            authorization_code: None,
        }
    }

    pub fn with_authorization_code(mut self, code: impl Into<String>) -> Self {
        self.authorization_code = Some(Secret::new(code.into()));
        self
    }

    pub fn requires_authorization(&self) -> bool {
        self.authorization_code.is_some()
    }

    /// Open exams accept anything; guarded exams need the exact code.
    pub fn authorizes(&self, supplied: Option<&str>) -> bool {
        match &self.authorization_code {
            None => true,
            Some(expected) => {
                supplied.is_some_and(|code| secret_matches(expected.expose_secret(), code))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    pub id: String,
    pub label: String,
}

impl Mode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// The exams and modes offered by the form, in display order.
#[derive(Clone)]
pub struct Catalog {
    exams: Vec<Exam>,
    modes: Vec<Mode>,
}

impl Catalog {
    pub fn new(exams: Vec<Exam>, modes: Vec<Mode>) -> Result<Self, CatalogError> {
        if exams.is_empty() {
            return Err(CatalogError::NoExams);
        }
        if modes.is_empty() {
            return Err(CatalogError::NoModes);
        }
        check_ids("exam", exams.iter().map(|e| e.id.as_str()))?;
        check_ids("mode", modes.iter().map(|m| m.id.as_str()))?;

        Ok(Self { exams, modes })
    }

    /// Build the catalog and check that every configured pool points at a known slot.
    pub fn from_settings(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let exams = settings
            .exams
            .iter()
            .map(|exam| Exam {
                id: exam.id.clone(),
                label: exam.label.clone(),
                authorization_code: exam.authorization_code.clone(),
            })
            .collect();
        let modes = settings
            .modes
            .iter()
            .map(|mode| Mode::new(mode.id.clone(), mode.label.clone()))
            .collect();

        let catalog = Self::new(exams, modes)?;

        let mut seen = HashSet::new();
        for pool in &settings.pools {
            if catalog.exam(&pool.exam).is_none() {
                return Err(CatalogError::UnknownPoolExam(pool.exam.clone()));
            }
            if catalog.mode(&pool.mode).is_none() {
                return Err(CatalogError::UnknownPoolMode(pool.mode.clone()));
            }
            let slot = PoolSlot::new(pool.exam.clone(), pool.mode.clone());
            if !seen.insert(slot.clone()) {
                return Err(CatalogError::DuplicatePool(slot));
            }
        }

        Ok(catalog)
    }

    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    pub fn exam(&self, id: &str) -> Option<&Exam> {
        self.exams.iter().find(|exam| exam.id == id)
    }

    pub fn mode(&self, id: &str) -> Option<&Mode> {
        self.modes.iter().find(|mode| mode.id == id)
    }

    /// Every exam × mode combination, exam-major.
    pub fn slots(&self) -> Vec<PoolSlot> {
        self.exams
            .iter()
            .flat_map(|exam| {
                self.modes
                    .iter()
                    .map(move |mode| PoolSlot::new(exam.id.clone(), mode.id.clone()))
            })
            .collect()
    }
}

fn check_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CatalogError::InvalidId {
                kind,
                id: id.to_string(),
            });
        }
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
