//! Deterministic identifiers for package entities.
//!
//! Identifiers are name-based UUIDs (version 3, OID namespace) over the
//! normalized key fields, so the same logical key yields the same `@id` in
//! every run and on every machine.

use uuid::Uuid;

/// Derive a stable UUID string from one or more key fields.
///
/// Each part is trimmed and lower-cased, then all parts are joined with `/`
/// before hashing. Empty parts keep their slot, so `["a", ""]` and `["a"]`
/// are different keys.
pub fn make_uuid<S: AsRef<str>>(parts: &[S]) -> String {
    let path = parts
        .iter()
        .map(|p| p.as_ref().trim().to_lowercase())
        .collect::<Vec<_>>()
        .join("/");
    Uuid::new_v3(&Uuid::NAMESPACE_OID, path.as_bytes()).to_string()
}

/// Whether an explicit identifier cell holds something usable.
pub fn is_non_empty_str(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_uuid_is_stable() {
        let a = make_uuid(&["TRACI 2.1", "Global warming"]);
        let b = make_uuid(&["TRACI 2.1", "Global warming"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_make_uuid_normalizes_case_and_whitespace() {
        assert_eq!(make_uuid(&["  TRACI "]), make_uuid(&["traci"]));
    }

    #[test]
    fn test_make_uuid_distinguishes_keys() {
        assert_ne!(
            make_uuid(&["TRACI", "GWP"]),
            make_uuid(&["TRACI", "ODP"])
        );
        assert_ne!(make_uuid(&["CO2", "air", "kg"]), make_uuid(&["CO2", "water", "kg"]));
    }

    #[test]
    fn test_make_uuid_keeps_empty_parts() {
        assert_ne!(make_uuid(&["a", ""]), make_uuid(&["a"]));
        assert_ne!(make_uuid(&["TRACI", ""]), make_uuid(&["TRACI"]));
        assert_ne!(make_uuid(&["CO2", "", "kg"]), make_uuid(&["CO2", "kg"]));
        assert_eq!(make_uuid(&["CO2", " ", "kg"]), make_uuid(&["CO2", "", "kg"]));
    }

    #[test]
    fn test_make_uuid_is_version_3() {
        let id = Uuid::parse_str(&make_uuid(&["TRACI"])).unwrap();
        assert_eq!(id.get_version_num(), 3);
    }

    #[test]
    fn test_is_non_empty_str() {
        assert!(is_non_empty_str("0b2d5a70-1c3e-4a6e-9f3c-5e3d1f9a2b11"));
        assert!(!is_non_empty_str(""));
        assert!(!is_non_empty_str("   "));
    }
}
