use secrecy::{ExposeSecret, Secret};
use service_core::utils::secret_matches;

/// Password check for the administrative view.
pub struct AdminGate {
    password: Secret<String>,
}

impl AdminGate {
    pub fn new(password: Secret<String>) -> Self {
        Self { password }
    }

    /// Exact match only; no trimming or case folding.
    pub fn check(&self, candidate: &str) -> bool {
        secret_matches(self.password.expose_secret(), candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check() {
        let gate = AdminGate::new(Secret::new("francisco14%".to_string()));
        assert!(gate.check("francisco14%"));
        assert!(!gate.check("francisco14% "));
        assert!(!gate.check("FRANCISCO14%"));
        assert!(!gate.check(""));
    }
}
