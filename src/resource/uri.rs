//! Resource URI parsing
//!
//! ARM resource ids encode the whole ancestor chain, e.g.
//! `/subscriptions/<sub>/resourceGroups/<rg>/providers/Microsoft.NetApp/netAppAccounts/<a>/capacityPools/<p>/volumes/<v>/snapshots/<s>`.
//! Nested resources only report that id (their `name` property is a relative
//! path like `a/p/v/s`), so the id is the only reliable way to recover the
//! names needed to address a resource or any of its ancestors.

/// Segment label for subscriptions
pub const SUBSCRIPTIONS: &str = "subscriptions";
/// Segment label for resource groups
pub const RESOURCE_GROUPS: &str = "resourceGroups";
/// Segment label for NetApp accounts
pub const ACCOUNTS: &str = "netAppAccounts";
/// Segment label for capacity pools
pub const CAPACITY_POOLS: &str = "capacityPools";
/// Segment label for volumes
pub const VOLUMES: &str = "volumes";
/// Segment label for snapshots
pub const SNAPSHOTS: &str = "snapshots";

/// Return the value paired with `label` in `resource_uri`.
///
/// Resource ids alternate keys and values
/// (`subscriptions/<s>/resourceGroups/<rg>/providers/<ns>/netAppAccounts/<a>/...`),
/// so only key positions are compared to the label. A resource named like a
/// label (a pool called `volumes`, say) is a value and never matches. Keys
/// match ignoring ASCII case, with or without a leading `/`. Returns `None`
/// for blank input, a missing label, or an empty trailing value.
pub fn get_resource_value<'a>(resource_uri: &'a str, label: &str) -> Option<&'a str> {
    let label = label.trim_start_matches('/');
    if resource_uri.trim().is_empty() || label.is_empty() {
        return None;
    }

    let segments: Vec<&str> = resource_uri.trim_start_matches('/').split('/').collect();

    segments
        .chunks(2)
        .find(|pair| pair[0].eq_ignore_ascii_case(label))
        .and_then(|pair| pair.get(1).copied())
        .filter(|value| !value.is_empty())
}

/// Subscription id from a resource uri
pub fn subscription_id(resource_uri: &str) -> Option<&str> {
    get_resource_value(resource_uri, SUBSCRIPTIONS)
}

/// Resource group name from a resource uri
pub fn resource_group(resource_uri: &str) -> Option<&str> {
    get_resource_value(resource_uri, RESOURCE_GROUPS)
}

/// NetApp account name from a resource uri
pub fn account_name(resource_uri: &str) -> Option<&str> {
    get_resource_value(resource_uri, ACCOUNTS)
}

/// Capacity pool name from a resource uri
pub fn pool_name(resource_uri: &str) -> Option<&str> {
    get_resource_value(resource_uri, CAPACITY_POOLS)
}

/// Volume name from a resource uri
pub fn volume_name(resource_uri: &str) -> Option<&str> {
    get_resource_value(resource_uri, VOLUMES)
}

/// Snapshot name from a resource uri
pub fn snapshot_name(resource_uri: &str) -> Option<&str> {
    get_resource_value(resource_uri, SNAPSHOTS)
}
