//! Output filtering.
//!
//! A [`FilterPredicate`] narrows which fields a decode emits, built from
//! include/exclude rules over `(category, item, field)`. Filtering never
//! changes how many bytes an item consumes; an item with no field left to
//! emit is skipped by length instead of decoded.

/// Whether a rule admits or removes its matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    Include,
    Exclude,
}

/// One filter rule. Unset components match anything, so
/// `FilterRule::include().category(48)` admits all of category 48 and
/// `FilterRule::exclude().field("SAC")` removes every field named SAC.
#[derive(Debug, Clone)]
pub struct FilterRule {
    action: FilterAction,
    category: Option<u8>,
    item: Option<String>,
    field: Option<String>,
}

impl FilterRule {
    pub fn include() -> Self {
        Self::new(FilterAction::Include)
    }

    pub fn exclude() -> Self {
        Self::new(FilterAction::Exclude)
    }

    fn new(action: FilterAction) -> Self {
        Self {
            action,
            category: None,
            item: None,
            field: None,
        }
    }

    pub fn category(mut self, category: u8) -> Self {
        self.category = Some(category);
        self
    }

    pub fn item(mut self, item: &str) -> Self {
        self.item = Some(item.to_string());
        self
    }

    pub fn field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    fn matches(&self, category: u8, item: &str, field: &str) -> bool {
        self.category.is_none_or(|c| c == category)
            && self.item.as_deref().is_none_or(|i| i == item)
            && self.field.as_deref().is_none_or(|f| f == field)
    }

    /// Whether the rule touches the item at all, regardless of field.
    fn matches_item(&self, category: u8, item: &str) -> bool {
        self.category.is_none_or(|c| c == category)
            && self.item.as_deref().is_none_or(|i| i == item)
    }
}

/// Compiled filter. Without any include rule everything is admitted by
/// default; with one, only what an include rule names survives. Exclude
/// rules subtract in both regimes.
#[derive(Debug, Clone)]
pub struct FilterPredicate {
    rules: Vec<FilterRule>,
    has_includes: bool,
}

impl FilterPredicate {
    /// Compiles a rule list into a predicate.
    pub fn build(rules: impl IntoIterator<Item = FilterRule>) -> Self {
        let rules: Vec<FilterRule> = rules.into_iter().collect();
        let has_includes = rules.iter().any(|r| r.action == FilterAction::Include);
        Self {
            rules,
            has_includes,
        }
    }

    /// Whether a concrete field may appear in the output.
    pub fn matches(&self, category: u8, item: &str, field: &str) -> bool {
        let included = !self.has_includes
            || self
                .rules
                .iter()
                .any(|r| r.action == FilterAction::Include && r.matches(category, item, field));
        included
            && !self
                .rules
                .iter()
                .any(|r| r.action == FilterAction::Exclude && r.matches(category, item, field))
    }

    /// Whether any field of the item could appear. A `false` lets the
    /// decoder skip the item by byte length without extracting it.
    pub(crate) fn matches_item(&self, category: u8, item: &str) -> bool {
        let included = !self.has_includes
            || self
                .rules
                .iter()
                .any(|r| r.action == FilterAction::Include && r.matches_item(category, item));
        included
            && !self.rules.iter().any(|r| {
                r.action == FilterAction::Exclude && r.field.is_none() && r.matches_item(category, item)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_admits_everything() {
        let filter = FilterPredicate::build([]);
        assert!(filter.matches(48, "010", "SAC"));
        assert!(filter.matches_item(62, "105"));
    }

    #[test]
    fn include_rules_form_a_whitelist() {
        let filter = FilterPredicate::build([
            FilterRule::include().category(48).item("010"),
            FilterRule::include().category(48).item("040").field("RHO"),
        ]);

        assert!(filter.matches(48, "010", "SAC"));
        assert!(filter.matches(48, "040", "RHO"));
        assert!(!filter.matches(48, "040", "THETA"));
        assert!(!filter.matches(48, "020", "TYP"));
        assert!(!filter.matches(62, "010", "SAC"));

        assert!(filter.matches_item(48, "010"));
        assert!(filter.matches_item(48, "040"));
        assert!(!filter.matches_item(48, "020"));
    }

    #[test]
    fn exclude_subtracts_from_the_default() {
        let filter = FilterPredicate::build([FilterRule::exclude().category(48).item("250")]);

        assert!(filter.matches(48, "010", "SAC"));
        assert!(!filter.matches(48, "250", "MBDATA"));
        assert!(!filter.matches_item(48, "250"));
        assert!(filter.matches_item(62, "250"));
    }

    #[test]
    fn field_level_exclude_keeps_the_item_decodable() {
        let filter = FilterPredicate::build([FilterRule::exclude().item("010").field("SIC")]);

        assert!(filter.matches(48, "010", "SAC"));
        assert!(!filter.matches(48, "010", "SIC"));
        // Another field survives, so the item itself must still decode.
        assert!(filter.matches_item(48, "010"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = FilterPredicate::build([
            FilterRule::include().category(48),
            FilterRule::exclude().category(48).item("020"),
        ]);

        assert!(filter.matches(48, "010", "SAC"));
        assert!(!filter.matches(48, "020", "TYP"));
        assert!(!filter.matches_item(48, "020"));
    }
}
