use subtle::ConstantTimeEq;

/// Check a provided admin key against the configured one in constant time.
///
/// When no key is configured the admin surface is open (local/dev use).
/// A configured key with a missing or wrong header is rejected.
pub fn admin_key_matches(expected: Option<&str>, provided: Option<&str>) -> bool {
    match (expected, provided) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(expected), Some(provided)) => {
            if expected.len() != provided.len() {
                return false;
            }
            expected.as_bytes().ct_eq(provided.as_bytes()).into()
        }
    }
}
