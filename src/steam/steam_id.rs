//! Syntactic Steam ID classification.

use lazy_regex::regex_is_match;

/// Returns true if `value` is a SteamID64 of an individual account:
/// 17 decimal digits starting with the `7656119` universe/type prefix.
///
/// Purely syntactic, no network access.
///
/// ```
/// use steamdb_bot::steam::is_steam_id;
///
/// assert!(is_steam_id("76561198287455504"));
/// assert!(!is_steam_id("mrmarblet"));
/// ```
pub fn is_steam_id(value: &str) -> bool {
    regex_is_match!(r"^7656119[0-9]{10}$", value)
}
