//! Shared category unification table.
//!
//! Project item categories come from free-form procurement requests;
//! inventory records use a small fixed set. This table maps the former
//! onto the latter so inventory synthesized from different sources lands
//! in consistent buckets.

/// Inventory categories.
pub const CATEGORY_TECHNOLOGY: &str = "technology";
pub const CATEGORY_FACILITIES: &str = "facilities";
pub const CATEGORY_FLEET: &str = "fleet";
pub const CATEGORY_CONSUMABLES: &str = "consumables";
pub const CATEGORY_SERVICES: &str = "services";
pub const CATEGORY_GENERAL: &str = "general";

/// All valid inventory categories.
pub const INVENTORY_CATEGORIES: &[&str] = &[
    CATEGORY_TECHNOLOGY,
    CATEGORY_FACILITIES,
    CATEGORY_FLEET,
    CATEGORY_CONSUMABLES,
    CATEGORY_SERVICES,
    CATEGORY_GENERAL,
];

/// Map a project/procurement category onto its inventory category.
///
/// Unknown categories land in the general bucket.
pub fn unify(category: &str) -> &'static str {
    match category {
        "it_equipment" | "software" | "hardware" | "technology" => CATEGORY_TECHNOLOGY,
        "furniture" | "building" | "facilities" => CATEGORY_FACILITIES,
        "vehicle" | "fleet" | "transport" => CATEGORY_FLEET,
        "office_supplies" | "stationery" | "consumables" => CATEGORY_CONSUMABLES,
        "services" | "consulting" | "maintenance" => CATEGORY_SERVICES,
        _ => CATEGORY_GENERAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_map_to_buckets() {
        assert_eq!(unify("it_equipment"), CATEGORY_TECHNOLOGY);
        assert_eq!(unify("furniture"), CATEGORY_FACILITIES);
        assert_eq!(unify("vehicle"), CATEGORY_FLEET);
        assert_eq!(unify("stationery"), CATEGORY_CONSUMABLES);
        assert_eq!(unify("consulting"), CATEGORY_SERVICES);
    }

    #[test]
    fn unknown_categories_fall_back_to_general() {
        assert_eq!(unify("livestock"), CATEGORY_GENERAL);
        assert_eq!(unify(""), CATEGORY_GENERAL);
    }

    #[test]
    fn unified_output_is_always_valid() {
        for input in ["software", "building", "transport", "whatever"] {
            assert!(INVENTORY_CATEGORIES.contains(&unify(input)));
        }
    }
}
