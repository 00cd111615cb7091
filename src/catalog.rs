//! Session-lifetime institution catalog.
//!
//! The catalog is fetched once per session and never mutated afterwards;
//! everything here is a read-only view or lookup over it. Partner
//! matching is best-effort substring matching against display names,
//! with first-match-wins in catalog order.

use crate::models::Institution;

/// Read-only wrapper around the full institution list.
#[derive(Debug, Clone)]
pub struct InstitutionCatalog {
    institutions: Vec<Institution>,
}

impl InstitutionCatalog {
    /// Wrap a freshly fetched institution list.
    pub fn new(institutions: Vec<Institution>) -> Self {
        Self { institutions }
    }

    /// Number of institutions in the catalog.
    pub fn len(&self) -> usize {
        self.institutions.len()
    }

    /// Whether the catalog is empty.
    #[allow(dead_code)] // Utility accessor
    pub fn is_empty(&self) -> bool {
        self.institutions.is_empty()
    }

    /// Look up an institution by its upstream id.
    pub fn get(&self, id: i64) -> Option<&Institution> {
        self.institutions.iter().find(|i| i.id == id)
    }

    /// Resolve a partner's free-text name to a catalog institution.
    ///
    /// An institution matches when *any* of its display names contains
    /// `partner_name` as a case-sensitive substring. The first match in
    /// catalog order wins; ambiguity between similarly named
    /// institutions is a known limitation of this matching scheme.
    pub fn match_partner(&self, partner_name: &str) -> Option<&Institution> {
        self.institutions
            .iter()
            .find(|inst| inst.names.iter().any(|n| n.name.contains(partner_name)))
    }

    /// Institutions suitable for presenting as receiving choices:
    /// those with at least one name not flagged hidden.
    pub fn receiving_view(&self) -> Vec<&Institution> {
        self.institutions
            .iter()
            .filter(|inst| inst.names.iter().any(|n| !n.hide_in_list))
            .collect()
    }

    /// Find an institution whose display name contains `query`,
    /// case-insensitively. Used for CLI selection by name.
    pub fn find_by_name(&self, query: &str) -> Option<&Institution> {
        let needle = query.to_lowercase();
        self.institutions.iter().find(|inst| {
            inst.names
                .iter()
                .any(|n| n.name.to_lowercase().contains(&needle))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstitutionName;

    fn institution(id: i64, names: &[(&str, bool)]) -> Institution {
        Institution {
            id,
            code: None,
            is_community_college: false,
            names: names
                .iter()
                .map(|(name, hidden)| InstitutionName {
                    name: name.to_string(),
                    has_departments: false,
                    hide_in_list: *hidden,
                })
                .collect(),
        }
    }

    fn catalog() -> InstitutionCatalog {
        InstitutionCatalog::new(vec![
            institution(1, &[("City College of San Marcos", false)]),
            institution(2, &[("San Marcos State University", false)]),
            institution(3, &[("Hidden Campus", true)]),
            institution(4, &[("Lakeview College", false), ("Lakeview CC", true)]),
        ])
    }

    #[test]
    fn test_match_partner_substring() {
        let c = catalog();
        assert_eq!(c.match_partner("Lakeview College").unwrap().id, 4);
        // A match on any name counts, including hidden ones.
        assert_eq!(c.match_partner("Lakeview CC").unwrap().id, 4);
        assert!(c.match_partner("Unknown College").is_none());
    }

    #[test]
    fn test_match_partner_is_case_sensitive() {
        let c = catalog();
        assert!(c.match_partner("lakeview college").is_none());
    }

    #[test]
    fn test_ambiguous_substring_first_match_wins() {
        // Both institutions 1 and 2 contain "San Marcos". Catalog order
        // decides, which can mis-resolve similarly named institutions.
        let c = catalog();
        assert_eq!(c.match_partner("San Marcos").unwrap().id, 1);
    }

    #[test]
    fn test_receiving_view_filters_hidden() {
        let c = catalog();
        let view = c.receiving_view();
        let ids: Vec<i64> = view.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn test_find_by_name_case_insensitive() {
        let c = catalog();
        assert_eq!(c.find_by_name("lakeview").unwrap().id, 4);
        assert_eq!(c.find_by_name("STATE UNIVERSITY").unwrap().id, 2);
        assert!(c.find_by_name("nonexistent").is_none());
    }

    #[test]
    fn test_get_by_id() {
        let c = catalog();
        assert_eq!(c.get(2).unwrap().display_name(), "San Marcos State University");
        assert!(c.get(99).is_none());
    }
}
