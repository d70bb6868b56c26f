//! Name normalization applied at the request boundary.
//!
//! Region, departement, centre, election-type and candidate names are stored
//! upper-cased; commune names are capitalized (first letter upper, remainder
//! lower). Every lookup by name compares the normalized form, which is what
//! makes name matching case-insensitive across the API.

/// Trim and upper-case a name.
pub fn upper(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Trim and capitalize a name: first character upper-cased, the rest lowered.
pub fn capitalize(value: &str) -> String {
    let value = value.trim();
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_trims_and_uppercases() {
        assert_eq!(upper("  presidentielle "), "PRESIDENTIELLE");
        assert_eq!(upper("École Annexe"), "ÉCOLE ANNEXE");
    }

    #[test]
    fn capitalize_matches_commune_convention() {
        assert_eq!(capitalize("DAKAR"), "Dakar");
        assert_eq!(capitalize("dakar"), "Dakar");
        assert_eq!(capitalize(" rufisque "), "Rufisque");
        assert_eq!(capitalize(""), "");
    }
}
