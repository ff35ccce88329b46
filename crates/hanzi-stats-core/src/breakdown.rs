//! Category breakdown: cross-reference an aggregate result with the
//! reference catalog.
//!
//! For a category `C`, total set `T`, and reviewed set `R`, the three-way
//! partition is
//!
//! ```text
//! reviewed            = C ∩ R
//! present_unreviewed  = C ∩ T ∖ R
//! absent              = C ∖ T
//! ```
//!
//! The three sets are disjoint and their sizes always sum to `|C|` exactly.
//! The partition is produced for every category, frequency bands included:
//! "absent from the deck" is still well-defined there, and callers decide
//! whether to surface it.
//!
//! Requesting an unregistered category fails with
//! [`CatalogError::CategoryNotFound`] rather than returning zero counts;
//! callers should take names from [`Catalog::categories`].

use crate::catalog::{Catalog, CatalogError};
use crate::models::{AggregateResult, CategoryBreakdown, CategorySummary, Report};

/// Compute the three-way partition of one category against a result.
pub fn breakdown(
    category: &str,
    result: &AggregateResult,
    catalog: &Catalog,
) -> Result<CategoryBreakdown, CatalogError> {
    let members = catalog.members_of(category)?;

    let reviewed = members.intersection(&result.reviewed).copied().collect();
    let present_unreviewed = members
        .intersection(&result.total)
        .filter(|c| !result.reviewed.contains(*c))
        .copied()
        .collect();
    let absent = members.difference(&result.total).copied().collect();

    Ok(CategoryBreakdown {
        category: category.to_string(),
        reviewed,
        present_unreviewed,
        absent,
    })
}

/// Summary rows for the table/progress-bar view. `present_count` counts
/// members observed in the decks (reviewed or not); absent members are
/// excluded from it but still reflected in `category_size`.
pub fn summarize(
    categories: &[String],
    result: &AggregateResult,
    catalog: &Catalog,
) -> Result<Vec<CategorySummary>, CatalogError> {
    categories
        .iter()
        .map(|name| {
            let b = breakdown(name, result, catalog)?;
            Ok(CategorySummary {
                name: name.clone(),
                reviewed_count: b.reviewed.len(),
                present_count: b.present_count(),
                category_size: catalog.size_of(name)?,
            })
        })
        .collect()
}

/// Assemble the full report consumed by the presentation layer.
pub fn build_report(
    categories: &[String],
    result: &AggregateResult,
    catalog: &Catalog,
) -> Result<Report, CatalogError> {
    Ok(Report {
        total: result.total.len(),
        reviewed: result.reviewed.len(),
        categories: summarize(categories, result, catalog)?,
        skipped: result.skipped.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ReferenceTables;
    use std::collections::BTreeSet;

    fn set(chars: &[char]) -> BTreeSet<char> {
        chars.iter().copied().collect()
    }

    /// Catalog with a single populated category, "HSK (2012) Level 1" =
    /// {丁, 七, 万}.
    fn test_catalog() -> Catalog {
        Catalog::from_tables(ReferenceTables {
            hsk2012: vec![('丁', 1), ('七', 1), ('万', 1)],
            ..Default::default()
        })
    }

    fn test_result() -> AggregateResult {
        AggregateResult {
            total: set(&['丁', '七', '丈']),
            reviewed: set(&['丁']),
            skipped: Vec::new(),
        }
    }

    #[test]
    fn three_way_partition() {
        // Category {丁,七,万}, total {丁,七,丈}, reviewed {丁}:
        // reviewed {丁}, present-unreviewed {七}, absent {万}.
        let b = breakdown("HSK (2012) Level 1", &test_result(), &test_catalog()).unwrap();
        assert_eq!(b.reviewed, set(&['丁']));
        assert_eq!(b.present_unreviewed, set(&['七']));
        assert_eq!(b.absent, set(&['万']));
        assert_eq!(b.present_count(), 2);
    }

    #[test]
    fn partition_complete_for_every_category() {
        let catalog = test_catalog();
        let result = test_result();
        for name in catalog.categories() {
            let b = breakdown(name, &result, &catalog).unwrap();
            let size = catalog.size_of(name).unwrap();
            assert_eq!(
                b.reviewed.len() + b.present_unreviewed.len() + b.absent.len(),
                size,
                "partition incomplete for {}",
                name
            );
            // Disjointness.
            assert!(b.reviewed.is_disjoint(&b.present_unreviewed));
            assert!(b.reviewed.is_disjoint(&b.absent));
            assert!(b.present_unreviewed.is_disjoint(&b.absent));
        }
    }

    #[test]
    fn unknown_category_fails_not_zeroes() {
        let err = breakdown("TestBand", &test_result(), &test_catalog()).unwrap_err();
        assert_eq!(err, CatalogError::CategoryNotFound("TestBand".to_string()));
    }

    #[test]
    fn summary_counts() {
        let rows = summarize(
            &["HSK (2012) Level 1".to_string()],
            &test_result(),
            &test_catalog(),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reviewed_count, 1);
        assert_eq!(rows[0].present_count, 2);
        assert_eq!(rows[0].category_size, 3);
    }

    #[test]
    fn report_shape() {
        let catalog = test_catalog();
        let report = build_report(
            &catalog.categories().to_vec(),
            &test_result(),
            &catalog,
        )
        .unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.reviewed, 1);
        assert_eq!(report.categories.len(), 19);
        assert!(report.skipped.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total"], 3);
        assert_eq!(json["categories"][0]["name"], "HSK (2012) Level 1");
        assert_eq!(json["categories"][0]["category_size"], 3);
    }
}
