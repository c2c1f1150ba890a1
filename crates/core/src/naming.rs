//! Sequential entity code generation.
//!
//! Project codes are department-prefixed and year-scoped
//! (`ENG-2026-0042`); inventory and procurement codes are year-scoped
//! only. The repository layer supplies the next sequence number, this
//! module owns the formatting.

/// Derive a short uppercase prefix from a department name.
///
/// Takes the first three alphanumeric characters; falls back to `GEN`
/// for names with none.
pub fn department_prefix(name: &str) -> String {
    let prefix: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase();
    if prefix.is_empty() {
        "GEN".to_string()
    } else {
        prefix
    }
}

/// Format a project code: `PREFIX-YYYY-NNNN`.
pub fn project_code(prefix: &str, year: i32, sequence: u32) -> String {
    format!("{prefix}-{year}-{sequence:04}")
}

/// Format an inventory record code: `INV-YYYY-NNNN`.
pub fn inventory_code(year: i32, sequence: u32) -> String {
    format!("INV-{year}-{sequence:04}")
}

/// Format a procurement order code: `PO-YYYY-NNNN`.
pub fn procurement_code(year: i32, sequence: u32) -> String {
    format!("PO-{year}-{sequence:04}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_takes_first_three_alphanumerics() {
        assert_eq!(department_prefix("Engineering"), "ENG");
        assert_eq!(department_prefix("Finance & Accounting"), "FIN");
        assert_eq!(department_prefix("IT"), "IT");
    }

    #[test]
    fn prefix_falls_back_for_empty_names() {
        assert_eq!(department_prefix(""), "GEN");
        assert_eq!(department_prefix("---"), "GEN");
    }

    #[test]
    fn project_codes_are_zero_padded() {
        assert_eq!(project_code("ENG", 2026, 42), "ENG-2026-0042");
        assert_eq!(project_code("FIN", 2026, 12345), "FIN-2026-12345");
    }

    #[test]
    fn inventory_and_procurement_codes() {
        assert_eq!(inventory_code(2026, 1), "INV-2026-0001");
        assert_eq!(procurement_code(2026, 7), "PO-2026-0007");
    }
}
