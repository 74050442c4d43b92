//! Property-based tests using proptest
//!
//! These tests verify resource id parsing against randomly generated
//! Resource Manager paths.

use proptest::prelude::*;
use tanf::resource::uri::{
    self, get_resource_value, ACCOUNTS, CAPACITY_POOLS, RESOURCE_GROUPS, SNAPSHOTS, SUBSCRIPTIONS,
    VOLUMES,
};
use tanf::resource::{ResourceId, ResourceKind};

const LABELS: [&str; 6] = [
    SUBSCRIPTIONS,
    RESOURCE_GROUPS,
    ACCOUNTS,
    CAPACITY_POOLS,
    VOLUMES,
    SNAPSHOTS,
];

/// Resource name, sometimes spelled like a path label
fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[A-Za-z0-9][A-Za-z0-9_.-]{0,30}",
        1 => prop::sample::select(LABELS.to_vec()).prop_map(String::from),
        1 => prop::sample::select(LABELS.to_vec()).prop_map(|l| l.to_uppercase()),
    ]
}

/// Names for subscription, group, account, pool, volume, snapshot
fn arb_names() -> impl Strategy<Value = [String; 6]> {
    [
        arb_name(),
        arb_name(),
        arb_name(),
        arb_name(),
        arb_name(),
        arb_name(),
    ]
}

fn snapshot_path(n: &[String; 6]) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.NetApp/netAppAccounts/{}/capacityPools/{}/volumes/{}/snapshots/{}",
        n[0], n[1], n[2], n[3], n[4], n[5]
    )
}

proptest! {
    /// Every label yields the name that follows it
    #[test]
    fn test_every_label_round_trips(names in arb_names()) {
        let path = snapshot_path(&names);

        prop_assert_eq!(uri::subscription_id(&path), Some(names[0].as_str()));
        prop_assert_eq!(uri::resource_group(&path), Some(names[1].as_str()));
        prop_assert_eq!(uri::account_name(&path), Some(names[2].as_str()));
        prop_assert_eq!(uri::pool_name(&path), Some(names[3].as_str()));
        prop_assert_eq!(uri::volume_name(&path), Some(names[4].as_str()));
        prop_assert_eq!(uri::snapshot_name(&path), Some(names[5].as_str()));
    }

    /// Labels match regardless of case and leading slash
    #[test]
    fn test_label_case_and_slash_insensitive(names in arb_names()) {
        let path = snapshot_path(&names);

        prop_assert_eq!(get_resource_value(&path, "/VOLUMES"), Some(names[4].as_str()));
        prop_assert_eq!(get_resource_value(&path, "capacitypools"), Some(names[3].as_str()));
    }

    /// Truncated paths have no value for the labels they dropped
    #[test]
    fn test_missing_labels_are_absent(names in arb_names()) {
        let full = snapshot_path(&names);
        let volume_path = full
            .strip_suffix(&format!("/snapshots/{}", names[5]))
            .unwrap();

        prop_assert_eq!(uri::snapshot_name(volume_path), None);
        prop_assert_eq!(uri::volume_name(volume_path), Some(names[4].as_str()));

        let dangling = format!("{}/snapshots/", volume_path);
        prop_assert_eq!(uri::snapshot_name(&dangling), None);
    }

    /// An ancestor named like a descendant's label does not shadow the descendant
    #[test]
    fn test_ancestor_named_like_label(
        names in arb_names(),
        ancestor in 0usize..5,
        label_idx in 1usize..6,
    ) {
        prop_assume!(label_idx > ancestor);
        let mut names = names;
        names[ancestor] = LABELS[label_idx].to_string();
        let path = snapshot_path(&names);

        prop_assert_eq!(get_resource_value(&path, LABELS[ancestor]), Some(LABELS[label_idx]));
        prop_assert_eq!(get_resource_value(&path, LABELS[label_idx]), Some(names[label_idx].as_str()));
    }

    /// Ids rebuilt from a path address the same resource at every level
    #[test]
    fn test_resource_id_from_path(names in arb_names()) {
        let path = snapshot_path(&names);

        let snapshot = ResourceId::from_path(ResourceKind::Snapshot, &path).unwrap();
        prop_assert_eq!(snapshot.names(), &names[1..]);

        let pool = ResourceId::from_path(ResourceKind::Pool, &path).unwrap();
        prop_assert_eq!(pool.name(), names[3].as_str());
        prop_assert_eq!(Some(pool), snapshot.parent().and_then(|v| v.parent()));
    }

    /// Arbitrary input never panics
    #[test]
    fn test_arbitrary_input_does_not_panic(input in ".{0,200}", label in ".{0,20}") {
        let _ = get_resource_value(&input, &label);
    }
}
