//! The package table: named groups of unit ids.
//!
//! The table is append-only. Membership lookups deduplicate ids with the
//! first-seen row winning, so a unit resolves to a single package type.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculation::{ALL_DIGITAL_OPTION, ALL_POSTER_OPTION};
use crate::error::{EngineError, EngineResult};
use crate::models::PackageType;

use super::rows::PackageRow;

/// One package membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMember {
    /// Package name.
    pub package_name: String,
    /// Package type of this membership.
    pub package_type: PackageType,
    /// Member unit id.
    pub unit_id: String,
}

/// All stored package memberships.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageTable {
    rows: Vec<PackageMember>,
}

impl PackageTable {
    /// Creates a table from memberships.
    pub fn new(rows: Vec<PackageMember>) -> Self {
        Self { rows }
    }

    /// Builds the table from source rows, skipping rows with an unknown type.
    pub(crate) fn from_rows(rows: Vec<PackageRow>) -> Self {
        let mut skipped = 0usize;
        let members = rows
            .into_iter()
            .filter_map(|row| {
                let package_type = match row.package_type.trim() {
                    "D" => PackageType::Digital,
                    "P" => PackageType::Poster,
                    _ => {
                        skipped += 1;
                        return None;
                    }
                };
                Some(PackageMember {
                    package_name: row.package_name.trim().to_string(),
                    package_type,
                    unit_id: row.unit_id,
                })
            })
            .collect();

        if skipped > 0 {
            warn!(skipped, "Skipped package rows with unknown package type");
        }
        Self::new(members)
    }

    /// Returns every stored membership.
    pub fn rows(&self) -> &[PackageMember] {
        &self.rows
    }

    /// Returns the distinct package names, sorted ascending.
    pub fn names(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.package_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns true when a package with this name is stored.
    pub fn contains(&self, name: &str) -> bool {
        self.rows.iter().any(|row| row.package_name == name)
    }

    /// Returns the members of a package as (unit id, package type) pairs.
    ///
    /// Duplicate ids are dropped; the first row for an id wins.
    pub fn members(&self, name: &str) -> Vec<(String, PackageType)> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter(|row| row.package_name == name)
            .filter(|row| seen.insert(row.unit_id.as_str()))
            .map(|row| (row.unit_id.clone(), row.package_type))
            .collect()
    }

    /// Appends a new named package.
    ///
    /// Ids are trimmed and deduplicated before insertion. Returns the number
    /// of stored memberships.
    ///
    /// # Errors
    ///
    /// - `InvalidPackage` when the name is blank, is one of the synthetic
    ///   all-unit options, or no id remains
    /// - `PackageExists` when the name is already stored
    pub fn append(
        &mut self,
        name: &str,
        package_type: PackageType,
        ids: &[String],
    ) -> EngineResult<usize> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidPackage {
                name: name.to_string(),
                message: "package name must not be empty".to_string(),
            });
        }
        if name == ALL_DIGITAL_OPTION || name == ALL_POSTER_OPTION {
            return Err(EngineError::InvalidPackage {
                name: name.to_string(),
                message: "name is reserved for the all-unit contexts".to_string(),
            });
        }
        if self.contains(name) {
            return Err(EngineError::PackageExists {
                name: name.to_string(),
            });
        }

        let mut seen = HashSet::new();
        let new_rows: Vec<PackageMember> = ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .map(|id| PackageMember {
                package_name: name.to_string(),
                package_type,
                unit_id: id.to_string(),
            })
            .collect();

        if new_rows.is_empty() {
            return Err(EngineError::InvalidPackage {
                name: name.to_string(),
                message: "package must contain at least one unit id".to_string(),
            });
        }

        let count = new_rows.len();
        self.rows.extend(new_rows);
        info!(package = %name, package_type = package_type.code(), units = count, "Stored package");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, package_type: PackageType, id: &str) -> PackageMember {
        PackageMember {
            package_name: name.to_string(),
            package_type,
            unit_id: id.to_string(),
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_members_deduplicate_first_seen_wins() {
        let table = PackageTable::new(vec![
            member("A", PackageType::Digital, "1"),
            member("A", PackageType::Poster, "1"),
            member("A", PackageType::Poster, "2"),
            member("B", PackageType::Poster, "3"),
        ]);

        assert_eq!(
            table.members("A"),
            vec![
                ("1".to_string(), PackageType::Digital),
                ("2".to_string(), PackageType::Poster)
            ]
        );
        assert!(table.members("missing").is_empty());
    }

    #[test]
    fn test_names_are_sorted_and_distinct() {
        let table = PackageTable::new(vec![
            member("종로D", PackageType::Digital, "1"),
            member("강남D", PackageType::Digital, "2"),
            member("강남D", PackageType::Digital, "3"),
        ]);

        assert_eq!(table.names(), vec!["강남D".to_string(), "종로D".to_string()]);
    }

    #[test]
    fn test_append_stores_trimmed_unique_ids() {
        let mut table = PackageTable::default();
        let stored = table
            .append("뷰티", PackageType::Poster, &ids(&[" 10 ", "11", "10", ""]))
            .unwrap();

        assert_eq!(stored, 2);
        assert!(table.contains("뷰티"));
        assert_eq!(table.members("뷰티").len(), 2);
    }

    #[test]
    fn test_append_rejects_duplicate_name() {
        let mut table = PackageTable::new(vec![member("뷰티", PackageType::Poster, "1")]);
        let result = table.append("뷰티", PackageType::Digital, &ids(&["2"]));

        match result {
            Err(EngineError::PackageExists { name }) => assert_eq!(name, "뷰티"),
            other => panic!("Expected PackageExists, got {:?}", other),
        }
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn test_append_rejects_blank_name_and_empty_ids() {
        let mut table = PackageTable::default();

        assert!(matches!(
            table.append("  ", PackageType::Poster, &ids(&["1"])),
            Err(EngineError::InvalidPackage { .. })
        ));
        assert!(matches!(
            table.append("empty", PackageType::Poster, &ids(&[" "])),
            Err(EngineError::InvalidPackage { .. })
        ));
        assert!(table.rows().is_empty());
    }

    #[test]
    fn test_append_rejects_synthetic_option_names() {
        let mut table = PackageTable::default();

        for name in [ALL_DIGITAL_OPTION, " all-poster "] {
            match table.append(name, PackageType::Digital, &ids(&["1"])) {
                Err(EngineError::InvalidPackage { message, .. }) => {
                    assert!(message.contains("reserved"))
                }
                other => panic!("Expected InvalidPackage, got {:?}", other),
            }
        }
        assert!(table.rows().is_empty());
    }

    #[test]
    fn test_from_rows_skips_unknown_types() {
        let table = PackageTable::from_rows(vec![
            PackageRow {
                package_name: "A".to_string(),
                package_type: "D".to_string(),
                unit_id: "1".to_string(),
            },
            PackageRow {
                package_name: "A".to_string(),
                package_type: "X".to_string(),
                unit_id: "2".to_string(),
            },
        ]);

        assert_eq!(table.rows().len(), 1);
    }
}
