//! Property-based tests for the reconciliation planner.
//!
//! These tests use proptest to generate random manifest/actual pairs and
//! verify that the diff invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use std::collections::{BTreeSet, HashMap};
    use std::path::PathBuf;

    use proptest::prelude::*;

    use crate::manifest::ManifestEntry;
    use crate::plan::{classify, diff, PlanEntry};
    use crate::scan::ActualEntry;
    use crate::workspace::Workspace;

    fn workspace() -> Workspace {
        Workspace {
            root: PathBuf::from("/repo"),
            externals_dir: PathBuf::from("/repo/externals"),
        }
    }

    /// Dependency names drawn from a small alphabet so manifest and actual
    /// sets overlap often.
    fn names() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::btree_set("[a-e]{1,2}", 0..8)
            .prop_map(|set| set.into_iter().collect())
    }

    fn manifest_from(names: &[String]) -> Vec<ManifestEntry> {
        names
            .iter()
            .map(|name| ManifestEntry {
                name: name.clone(),
                url: format!("git@example.com:vendor/{name}.git"),
                commit: "master".to_string(),
                symlinks: Vec::new(),
            })
            .collect()
    }

    fn actual_from(names: &[String], ws: &Workspace) -> Vec<ActualEntry> {
        names
            .iter()
            .map(|name| ActualEntry {
                directory: ws.dependency_dir(name),
                remote_url: format!("git@example.com:deployed/{name}.git"),
                head: format!("head-of-{name}"),
            })
            .collect()
    }

    proptest! {
        /// Property: the three diff sets partition the union of manifest and
        /// actual directories; every directory appears in exactly one of
        /// {candidates, create, remove}.
        #[test]
        fn diff_partitions_directory_union(
            manifest_names in names(),
            actual_names in names(),
        ) {
            let ws = workspace();
            let manifest = manifest_from(&manifest_names);
            let actual = actual_from(&actual_names, &ws);

            let union: BTreeSet<PathBuf> = manifest_names
                .iter()
                .chain(actual_names.iter())
                .map(|n| ws.dependency_dir(n))
                .collect();

            let plan = diff(&manifest, actual, &ws);

            let mut counts: HashMap<PathBuf, usize> = HashMap::new();
            for entry in plan
                .candidates
                .iter()
                .chain(plan.create.iter())
                .chain(plan.remove.iter())
            {
                *counts.entry(entry.directory.clone()).or_insert(0) += 1;
            }

            prop_assert_eq!(counts.len(), union.len());
            for dir in &union {
                prop_assert_eq!(
                    counts.get(dir).copied(),
                    Some(1),
                    "{:?} must appear exactly once",
                    dir
                );
            }
        }

        /// Property: candidates are exactly the intersection; creates carry
        /// no previous head, candidates always do.
        #[test]
        fn diff_candidates_are_intersection(
            manifest_names in names(),
            actual_names in names(),
        ) {
            let ws = workspace();
            let manifest = manifest_from(&manifest_names);
            let actual = actual_from(&actual_names, &ws);

            let plan = diff(&manifest, actual, &ws);

            for entry in &plan.candidates {
                prop_assert!(manifest_names.contains(&entry.name));
                prop_assert!(actual_names.contains(&entry.name));
                prop_assert!(entry.previous_head.is_some());
            }
            for entry in &plan.create {
                prop_assert!(manifest_names.contains(&entry.name));
                prop_assert!(!actual_names.contains(&entry.name));
                prop_assert!(entry.previous_head.is_none());
            }
            for entry in &plan.remove {
                prop_assert!(!manifest_names.contains(&entry.name));
            }
        }

        /// Property: classification is a partition of its input, and an
        /// entry stays exactly when its resolved commit equals its previous
        /// head.
        #[test]
        fn classify_splits_on_head_equality(
            specs in proptest::collection::vec(("[a-e]{1,2}", "[0-9a-f]{6}", any::<bool>()), 0..8),
        ) {
            let ws = workspace();
            let candidates: Vec<PlanEntry> = specs
                .iter()
                .map(|(name, hash, moved)| PlanEntry {
                    name: name.clone(),
                    url: "u".to_string(),
                    directory: ws.dependency_dir(name),
                    previous_head: Some(hash.clone()),
                    requested: "v1".to_string(),
                    resolved: Some(if *moved {
                        format!("{hash}-moved")
                    } else {
                        hash.clone()
                    }),
                    symlinks: Vec::new(),
                })
                .collect();

            let total = candidates.len();
            let (stay, update) = classify(candidates);
            prop_assert_eq!(stay.len() + update.len(), total);

            for entry in &stay {
                prop_assert_eq!(&entry.resolved, &entry.previous_head);
            }
            for entry in &update {
                prop_assert_ne!(&entry.resolved, &entry.previous_head);
            }
        }
    }
}
