//! Property-based tests for log rotation.
//!
//! The selection step is checked in memory over many generated directories;
//! a smaller number of cases run against real files.

use pidea_users_cli::rotation::{plan, rotate, FileEntry};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

const BASE: u64 = 1_700_000_000;

fn at(t: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(BASE + t)
}

/// Unique names with a narrow mtime range so ties are common.
fn arb_dir() -> impl Strategy<Value = BTreeMap<String, u64>> {
    prop::collection::btree_map("[a-z]{1,6}", 0u64..6, 0..24)
}

fn entries(files: &BTreeMap<String, u64>) -> Vec<FileEntry> {
    files
        .iter()
        .map(|(name, t)| FileEntry::new(PathBuf::from("/logs").join(name), at(*t)))
        .collect()
}

fn sort_key(e: &FileEntry) -> (SystemTime, PathBuf) {
    (e.modified, e.path.clone())
}

proptest! {
    #[test]
    fn plan_removes_exactly_the_excess(files in arb_dir(), keep in 0usize..30) {
        let all = entries(&files);
        let planned = plan(all.clone(), keep);
        prop_assert_eq!(planned.len(), all.len().saturating_sub(keep));
    }

    #[test]
    fn removed_files_are_never_newer_than_kept_ones(files in arb_dir(), keep in 0usize..30) {
        let all = entries(&files);
        let planned = plan(all.clone(), keep);
        let removed: BTreeSet<_> = planned.iter().map(|e| e.path.clone()).collect();
        let newest_removed = planned.iter().map(sort_key).max();
        let oldest_kept = all
            .iter()
            .filter(|e| !removed.contains(&e.path))
            .map(sort_key)
            .min();
        if let (Some(r), Some(k)) = (newest_removed, oldest_kept) {
            prop_assert!(r < k);
        }
    }

    #[test]
    fn plan_ignores_listing_order(files in arb_dir(), keep in 0usize..30) {
        let forward = entries(&files);
        let mut backward = forward.clone();
        backward.reverse();
        prop_assert_eq!(plan(forward, keep), plan(backward, keep));
    }

    #[test]
    fn replanning_the_survivors_is_a_no_op(files in arb_dir(), keep in 0usize..30) {
        let all = entries(&files);
        let planned = plan(all.clone(), keep);
        let survivors: Vec<_> = all.into_iter().filter(|e| !planned.contains(e)).collect();
        prop_assert!(plan(survivors, keep).is_empty());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn disk_keeps_the_newest_files(files in arb_dir(), keep in 0usize..30) {
        let tmp = TempDir::new().unwrap();
        for (name, t) in &files {
            let file = File::create(tmp.path().join(name)).unwrap();
            file.set_modified(at(*t)).unwrap();
        }

        let mut expected: Vec<(u64, &String)> = files.iter().map(|(n, t)| (*t, n)).collect();
        expected.sort();
        let expected: BTreeSet<String> = expected
            .into_iter()
            .rev()
            .take(keep)
            .map(|(_, n)| n.clone())
            .collect();

        rotate(tmp.path(), keep).unwrap();
        let remaining: BTreeSet<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();

        prop_assert_eq!(remaining.len(), files.len().min(keep));
        prop_assert_eq!(remaining, expected);
        prop_assert!(rotate(tmp.path(), keep).unwrap().removed.is_empty());
    }
}
