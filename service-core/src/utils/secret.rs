use subtle::ConstantTimeEq;

/// Compare a submitted value against a configured secret using constant-time comparison.
///
/// Length mismatch returns early; only the byte comparison is constant-time.
pub fn secret_matches(expected: &str, candidate: &str) -> bool {
    let expected_bytes = expected.as_bytes();
    let candidate_bytes = candidate.as_bytes();

    if expected_bytes.len() != candidate_bytes.len() {
        return false;
    }

    expected_bytes.ct_eq(candidate_bytes).into()
}
