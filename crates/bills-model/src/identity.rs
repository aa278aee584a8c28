//! Client-side identity for bills.
//!
//! The remote source does not give bills a usable unique key, so one is
//! derived from stable content:
//!
//! 1. `"{billYear}-{billNo}"` when both are present (e.g. `2024-10`)
//! 2. `"uri-" + digest(uri)` when only the URI is known
//! 3. `"bill-{position}"` as a last resort, position counted from `skip`
//!
//! Keys are reproducible across fetches and sessions, so a favorite stored
//! yesterday still matches the same bill in today's page. Within one result
//! set, later duplicates get `~2`, `~3`, ... appended.

use std::collections::HashSet;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::bill::{Bill, FavoriteBill};
use crate::wire::{BillResult, RawBill};

/// Content-derived key for a single bill, before de-duplication.
#[must_use]
pub fn composite_key(raw: &RawBill, position: u64) -> String {
    let year = present(raw.bill_year.as_deref());
    let number = present(raw.bill_no.as_deref());

    if let (Some(year), Some(number)) = (year, number) {
        return format!("{year}-{number}");
    }

    if let Some(uri) = present(raw.uri.as_deref()) {
        return format!("uri-{}", digest_token(uri));
    }

    format!("bill-{position}")
}

/// Build bills for one result set, giving each a collision-free id.
///
/// Deterministic: the same input always yields the same ids in the same order.
#[must_use]
pub fn assign_identities(results: &[BillResult], skip: u64) -> Vec<Bill> {
    let mut used = HashSet::with_capacity(results.len());

    results
        .iter()
        .zip(skip..)
        .map(|(result, position)| {
            let base = composite_key(&result.bill, position);
            let id = unique_key(&base, &mut used);
            Bill::from_raw(&result.bill, id)
        })
        .collect()
}

/// Deterministic id for a stored favorite written before ids existed.
///
/// Digests every snapshot field except `id`, so entries that differ in any
/// field get different ids. Identical snapshots still share one; callers
/// resolve that with [`unique_key`].
#[must_use]
pub fn synthesize_favorite_id(snapshot: &FavoriteBill) -> String {
    let material = [
        snapshot.bill_no.as_str(),
        snapshot.bill_type.as_str(),
        snapshot.status.as_str(),
        snapshot.sponsor.as_str(),
        snapshot.english_title.as_str(),
        snapshot.irish_title.as_str(),
    ]
    .join("\u{1f}");
    format!("legacy-{}", digest_token(&material))
}

/// `base` if unused, else the first free `base~2`, `base~3`, ...
/// The returned key is recorded in `used`.
pub fn unique_key(base: &str, used: &mut HashSet<String>) -> String {
    if used.insert(base.to_string()) {
        return base.to_string();
    }

    let mut suffix = 2u32;
    loop {
        let candidate = format!("{base}~{suffix}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}

/// base64url of the first 12 bytes of SHA-256: 16 characters.
fn digest_token(input: &str) -> String {
    let hash = Sha256::digest(input.as_bytes());
    URL_SAFE_NO_PAD.encode(&hash[..12])
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(year: Option<&str>, number: Option<&str>, uri: Option<&str>) -> BillResult {
        BillResult {
            bill: RawBill {
                bill_year: year.map(String::from),
                bill_no: number.map(String::from),
                uri: uri.map(String::from),
                ..RawBill::default()
            },
        }
    }

    #[test]
    fn test_composite_key_from_year_and_number() {
        let result = raw(Some("2024"), Some("B10"), Some("ignored"));
        assert_eq!(composite_key(&result.bill, 0), "2024-B10");
    }

    #[test]
    fn test_composite_key_falls_back_to_uri_digest() {
        let result = raw(None, Some("10"), Some("https://data.oireachtas.ie/bill/10"));
        let key = composite_key(&result.bill, 0);
        assert!(key.starts_with("uri-"));
        assert_eq!(key.len(), "uri-".len() + 16);
        assert_eq!(key, composite_key(&result.bill, 99));
    }

    #[test]
    fn test_composite_key_positional_last_resort() {
        let result = raw(Some(" "), None, None);
        assert_eq!(composite_key(&result.bill, 42), "bill-42");
    }

    #[test]
    fn test_assign_identities_is_collision_free() {
        let results = vec![
            raw(Some("2024"), Some("1"), None),
            raw(Some("2024"), Some("1"), None),
            raw(Some("2024"), Some("2"), None),
            raw(Some("2024"), Some("1"), None),
            raw(None, None, None),
        ];

        let ids: Vec<String> = assign_identities(&results, 20)
            .into_iter()
            .map(|bill| bill.id)
            .collect();

        assert_eq!(ids, ["2024-1", "2024-1~2", "2024-2", "2024-1~3", "bill-24"]);
    }

    #[test]
    fn test_assign_identities_is_stable_across_fetches() {
        let results = vec![raw(Some("2023"), Some("45"), None), raw(None, None, Some("u"))];
        assert_eq!(assign_identities(&results, 0), assign_identities(&results, 0));
    }

    #[test]
    fn test_suffix_does_not_collide_with_real_key() {
        let results = vec![
            raw(Some("2024"), Some("1~2"), None),
            raw(Some("2024"), Some("1"), None),
            raw(Some("2024"), Some("1"), None),
        ];
        let ids: Vec<String> = assign_identities(&results, 0)
            .into_iter()
            .map(|bill| bill.id)
            .collect();
        assert_eq!(ids, ["2024-1~2", "2024-1", "2024-1~3"]);
    }

    fn snapshot(bill_no: &str, status: &str, sponsor: &str) -> FavoriteBill {
        FavoriteBill {
            id: String::new(),
            bill_no: bill_no.into(),
            bill_type: "Public".into(),
            status: status.into(),
            sponsor: sponsor.into(),
            english_title: "No title available".into(),
            irish_title: "No title available".into(),
        }
    }

    #[test]
    fn test_synthesized_favorite_id_is_deterministic() {
        let a = synthesize_favorite_id(&snapshot("X", "Current", "A"));
        let b = synthesize_favorite_id(&snapshot("X", "Current", "A"));
        let c = synthesize_favorite_id(&snapshot("Y", "Current", "A"));
        assert!(a.starts_with("legacy-"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_synthesized_favorite_id_covers_every_field() {
        let enacted = synthesize_favorite_id(&snapshot("5", "Enacted", "A"));
        let current = synthesize_favorite_id(&snapshot("5", "Current", "B"));
        assert_ne!(enacted, current);

        let mut with_id = snapshot("5", "Enacted", "A");
        with_id.id = "ignored".into();
        assert_eq!(synthesize_favorite_id(&with_id), enacted);
    }

    #[test]
    fn test_unique_key_appends_first_free_suffix() {
        let mut used = HashSet::from(["k".to_string(), "k~2".to_string()]);
        assert_eq!(unique_key("k", &mut used), "k~3");
        assert_eq!(unique_key("j", &mut used), "j");
        assert!(used.contains("k~3"));
    }
}
