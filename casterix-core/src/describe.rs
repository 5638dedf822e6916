//! Human-readable label lookup.

use crate::catalog::Catalog;

/// Resolves the most specific label the catalog has for a path.
///
/// - category only: the category name;
/// - plus item: the item name;
/// - plus field: the field's long description (falling back to its short
///   name);
/// - plus value: the enumeration label of that value.
///
/// Any undefined step yields an empty string; absence is a normal case,
/// never an error. The category id is widened to `u16` so the BDS
/// pseudo-category (256) is reachable.
pub fn describe(
    catalog: &Catalog,
    category: u16,
    item: Option<&str>,
    field: Option<&str>,
    value: Option<u64>,
) -> String {
    let Some(cat) = catalog.category(category) else {
        return String::new();
    };
    let Some(item_id) = item else {
        return cat.name().to_string();
    };
    let Some(item) = cat.item(item_id) else {
        return String::new();
    };
    let Some(field_name) = field else {
        return item.name.to_string();
    };
    let Some(field) = cat.arena().find_field(item.format, field_name) else {
        return String::new();
    };
    match value {
        None => field
            .description
            .as_deref()
            .unwrap_or(field.name.as_ref())
            .to_string(),
        Some(value) => field
            .values
            .get(&value)
            .map(|label| label.to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CategoryBuilder, Uap};
    use crate::field::{BitsField, Encoding};

    fn catalog() -> Catalog {
        let mut builder = CategoryBuilder::new(48, "Monoradar Target Reports", "1.31");
        let format = builder.formats().fixed(
            1,
            vec![
                BitsField::new("TYP", 8, 6, Encoding::Unsigned)
                    .described("Type of detection")
                    .with_values([(0, "No detection"), (1, "Single PSR detection")]),
                BitsField::new("SIM", 5, 5, Encoding::Unsigned),
            ],
        );
        builder.item("020", "Target Report Descriptor", format);
        builder.uap(Uap::unconditional([Some("020")]));
        Catalog::new(vec![builder.build().unwrap()]).unwrap()
    }

    #[test]
    fn category_level() {
        let catalog = catalog();
        assert_eq!(
            describe(&catalog, 48, None, None, None),
            "Monoradar Target Reports"
        );
        assert_eq!(describe(&catalog, 62, None, None, None), "");
    }

    #[test]
    fn item_level() {
        let catalog = catalog();
        assert_eq!(
            describe(&catalog, 48, Some("020"), None, None),
            "Target Report Descriptor"
        );
        assert_eq!(describe(&catalog, 48, Some("999"), None, None), "");
    }

    #[test]
    fn field_level_prefers_description() {
        let catalog = catalog();
        assert_eq!(
            describe(&catalog, 48, Some("020"), Some("TYP"), None),
            "Type of detection"
        );
        // No long description: falls back to the short name.
        assert_eq!(describe(&catalog, 48, Some("020"), Some("SIM"), None), "SIM");
        assert_eq!(describe(&catalog, 48, Some("020"), Some("NOPE"), None), "");
    }

    #[test]
    fn value_level() {
        let catalog = catalog();
        assert_eq!(
            describe(&catalog, 48, Some("020"), Some("TYP"), Some(1)),
            "Single PSR detection"
        );
        assert_eq!(describe(&catalog, 48, Some("020"), Some("TYP"), Some(9)), "");
    }
}
