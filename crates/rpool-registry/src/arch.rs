//! Architecture filtering for repository locations.
//!
//! A repository applies to a host when the last path segment of its location
//! is either [`NOARCH`] or the host's machine name (`uname -m`).

use rpool_utils::system::machine;

/// Final path segment of repositories that serve every architecture.
pub const NOARCH: &str = "noarch";

/// Returns `true` if `location` applies to a host whose machine name is `machine`.
///
/// Locations without a `/`, or whose final segment is empty (trailing slash),
/// never match.
///
/// # Example
///
/// ```
/// use rpool_registry::arch::matches_arch;
///
/// assert!(matches_arch("https://repo.example.org/current/noarch", "x86_64"));
/// assert!(matches_arch("/srv/repo/x86_64", "x86_64"));
/// assert!(!matches_arch("/srv/repo/armv7l", "x86_64"));
/// assert!(!matches_arch("/srv/repo/x86_64/", "x86_64"));
/// ```
pub fn matches_arch(location: &str, machine: &str) -> bool {
    match location.rsplit_once('/') {
        Some((_, segment)) if !segment.is_empty() => segment == NOARCH || segment == machine,
        _ => false,
    }
}

/// [`matches_arch`] against the running host.
pub fn matches_host_arch(location: &str) -> bool {
    matches_arch(location, &machine())
}
