//! Persisted favorites format and its migration.
//!
//! Current shape, version 2:
//!
//! ```json
//! { "state": { "favorites": [ { "id": "2024-10", "billNo": "10", ... } ] }, "version": 2 }
//! ```
//!
//! Older blobs are accepted too: the same envelope at versions 0 and 1 (whose
//! entries carry no `id`), and a bare `{ "favorites": [...] }` object. The
//! transform never panics. Missing fields get display defaults and missing
//! ids are synthesized from content. Entries are never dropped for lacking
//! an id: a synthesized id that is already taken gets a `~n` suffix. Stored
//! ids that repeat collapse to one entry. A version newer than
//! [`STORAGE_VERSION`] fails closed.

use std::collections::{HashMap, HashSet};

use bills_model::{synthesize_favorite_id, unique_key, FavoriteBill, NO_TITLE, UNKNOWN_SPONSOR};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::PersistenceError;

/// Version written by this build.
pub const STORAGE_VERSION: u64 = 2;

#[derive(Serialize)]
struct Envelope<'a> {
    state: State<'a>,
    version: u64,
}

#[derive(Serialize)]
struct State<'a> {
    favorites: &'a [FavoriteBill],
}

/// Favorites recovered from a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub favorites: Vec<FavoriteBill>,
    /// Version the blob was written with; 0 for the bare legacy shape.
    pub version: u64,
}

impl Decoded {
    /// Whether the blob should be rewritten in the current format.
    #[must_use]
    pub const fn is_outdated(&self) -> bool {
        self.version < STORAGE_VERSION
    }
}

/// Serialize favorites in the current format.
///
/// # Errors
/// Returns [`PersistenceError::Corrupt`] if serialization fails.
pub fn encode(favorites: &[FavoriteBill]) -> Result<String, PersistenceError> {
    let envelope = Envelope {
        state: State { favorites },
        version: STORAGE_VERSION,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse and migrate a stored blob.
///
/// # Errors
/// Returns [`PersistenceError::Corrupt`] for invalid JSON,
/// [`PersistenceError::UnsupportedVersion`] for a version newer than this
/// build understands, and [`PersistenceError::Malformed`] when the favorites
/// field is not a list.
pub fn decode(contents: &str) -> Result<Decoded, PersistenceError> {
    let value: Value = serde_json::from_str(contents)?;
    migrate(&value)
}

/// Migrate an already-parsed blob to the current collection.
///
/// # Errors
/// See [`decode`].
pub fn migrate(value: &Value) -> Result<Decoded, PersistenceError> {
    let Some(root) = value.as_object() else {
        return Err(PersistenceError::Malformed("expected an object".into()));
    };

    let (version, state) = match root.get("state") {
        Some(state) => (root.get("version").and_then(Value::as_u64).unwrap_or(0), state),
        None => (0, value),
    };

    if version > STORAGE_VERSION {
        return Err(PersistenceError::UnsupportedVersion(version));
    }

    let entries = match state.get("favorites") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(entries)) => entries.as_slice(),
        Some(_) => return Err(PersistenceError::Malformed("favorites is not a list".into())),
    };

    let migrated: Vec<Migrated> = entries
        .iter()
        .filter_map(Value::as_object)
        .map(migrate_entry)
        .collect();

    Ok(Decoded {
        favorites: resolve_ids(migrated),
        version,
    })
}

struct Migrated {
    favorite: FavoriteBill,
    /// The id was derived here rather than read from storage.
    synthesized: bool,
}

fn migrate_entry(entry: &Map<String, Value>) -> Migrated {
    let mut favorite = FavoriteBill {
        id: String::new(),
        bill_no: text(entry, "billNo").unwrap_or_default(),
        bill_type: text(entry, "billType").unwrap_or_default(),
        status: text(entry, "status").unwrap_or_default(),
        sponsor: text(entry, "sponsor").unwrap_or_else(|| UNKNOWN_SPONSOR.to_string()),
        english_title: text(entry, "englishTitle").unwrap_or_else(|| NO_TITLE.to_string()),
        irish_title: text(entry, "irishTitle").unwrap_or_else(|| NO_TITLE.to_string()),
    };

    let stored = text(entry, "id");
    let synthesized = stored.is_none();
    favorite.id = stored.unwrap_or_else(|| synthesize_favorite_id(&favorite));

    Migrated {
        favorite,
        synthesized,
    }
}

/// Stored ids that repeat collapse: first position, last snapshot.
/// Synthesized ids never merge; a taken one gets a `~n` suffix.
fn resolve_ids(entries: Vec<Migrated>) -> Vec<FavoriteBill> {
    let mut used: HashSet<String> = entries
        .iter()
        .filter(|entry| !entry.synthesized)
        .map(|entry| entry.favorite.id.clone())
        .collect();
    let mut favorites: Vec<FavoriteBill> = Vec::with_capacity(entries.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for Migrated {
        mut favorite,
        synthesized,
    } in entries
    {
        if synthesized {
            favorite.id = unique_key(&favorite.id, &mut used);
            favorites.push(favorite);
        } else if let Some(&index) = positions.get(&favorite.id) {
            favorites[index] = favorite;
        } else {
            positions.insert(favorite.id.clone(), favorites.len());
            favorites.push(favorite);
        }
    }

    favorites
}

fn text(entry: &Map<String, Value>, key: &str) -> Option<String> {
    let value = match entry.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn favorite(id: &str, bill_no: &str) -> FavoriteBill {
        FavoriteBill {
            id: id.into(),
            bill_no: bill_no.into(),
            bill_type: "Public".into(),
            status: "Current".into(),
            sponsor: "Minister for Finance".into(),
            english_title: "Finance Bill".into(),
            irish_title: "An Bille Airgeadais".into(),
        }
    }

    #[test]
    fn test_current_format_round_trips() {
        let favorites = vec![favorite("2024-10", "10"), favorite("2024-11", "11")];
        let encoded = encode(&favorites).unwrap();

        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["version"], 2);
        assert_eq!(value["state"]["favorites"][0]["billNo"], "10");

        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.favorites, favorites);
        assert!(!decoded.is_outdated());
    }

    #[test]
    fn test_bare_legacy_entry_gets_synthesized_id() {
        let decoded = migrate(&json!({ "favorites": [{ "billNo": "X" }] })).unwrap();

        assert_eq!(decoded.version, 0);
        assert!(decoded.is_outdated());
        assert_eq!(decoded.favorites.len(), 1);

        let only = &decoded.favorites[0];
        assert_eq!(only.bill_no, "X");
        assert!(!only.id.is_empty());
        assert_eq!(only.sponsor, UNKNOWN_SPONSOR);
        assert_eq!(only.english_title, NO_TITLE);
        assert_eq!(only.irish_title, NO_TITLE);
    }

    #[test]
    fn test_version_one_envelope_is_migrated() {
        let decoded = migrate(&json!({
            "state": { "favorites": [
                { "billNo": "5", "billType": "Private", "status": "Enacted",
                  "sponsor": "A Member", "englishTitle": "Title", "irishTitle": "Teideal" },
                { "billNo": "6" }
            ] },
            "version": 1
        }))
        .unwrap();

        assert_eq!(decoded.version, 1);
        assert_eq!(decoded.favorites.len(), 2);
        assert_eq!(decoded.favorites[0].bill_type, "Private");
        assert_ne!(decoded.favorites[0].id, decoded.favorites[1].id);
    }

    #[test]
    fn test_synthesized_ids_are_stable_across_loads() {
        let blob = json!({ "favorites": [{ "billNo": "X" }] });
        assert_eq!(
            migrate(&blob).unwrap().favorites,
            migrate(&blob).unwrap().favorites
        );
    }

    #[test]
    fn test_duplicate_ids_collapse_keeping_first_position() {
        let decoded = migrate(&json!({
            "state": { "favorites": [
                { "id": "a", "billNo": "1" },
                { "id": "b", "billNo": "2" },
                { "id": "a", "billNo": "1", "status": "Enacted" }
            ] },
            "version": 2
        }))
        .unwrap();

        let ids: Vec<&str> = decoded.favorites.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(decoded.favorites[0].status, "Enacted");
    }

    #[test]
    fn test_legacy_entries_differing_beyond_title_are_kept_apart() {
        let decoded = migrate(&json!({ "favorites": [
            { "billNo": "5", "billType": "Public", "status": "Enacted", "sponsor": "A" },
            { "billNo": "5", "billType": "Public", "status": "Current", "sponsor": "B" }
        ] }))
        .unwrap();

        assert_eq!(decoded.favorites.len(), 2);
        assert_eq!(decoded.favorites[0].sponsor, "A");
        assert_eq!(decoded.favorites[1].sponsor, "B");
        assert_ne!(decoded.favorites[0].id, decoded.favorites[1].id);
    }

    #[test]
    fn test_identical_legacy_entries_get_suffixed_ids() {
        let decoded = migrate(&json!({ "favorites": [{ "billNo": "5" }, { "billNo": "5" }] })).unwrap();

        assert_eq!(decoded.favorites.len(), 2);
        let first = &decoded.favorites[0].id;
        assert_eq!(decoded.favorites[1].id, format!("{first}~2"));
    }

    #[test]
    fn test_synthesized_id_never_merges_into_stored_id() {
        let synthesized = synthesize_favorite_id(&FavoriteBill {
            id: String::new(),
            bill_no: "7".into(),
            bill_type: String::new(),
            status: String::new(),
            sponsor: UNKNOWN_SPONSOR.into(),
            english_title: NO_TITLE.into(),
            irish_title: NO_TITLE.into(),
        });
        let decoded = migrate(&json!({ "favorites": [
            { "billNo": "7" },
            { "id": synthesized, "billNo": "other" }
        ] }))
        .unwrap();

        assert_eq!(decoded.favorites.len(), 2);
        assert_eq!(decoded.favorites[0].id, format!("{synthesized}~2"));
        assert_eq!(decoded.favorites[1].id, synthesized);
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let decoded = migrate(&json!({ "favorites": [42, null, { "billNo": "1" }, "x"] })).unwrap();
        assert_eq!(decoded.favorites.len(), 1);
    }

    #[test]
    fn test_future_version_fails_closed() {
        let result = migrate(&json!({ "state": { "favorites": [] }, "version": 3 }));
        assert!(matches!(result, Err(PersistenceError::UnsupportedVersion(3))));
    }

    #[test]
    fn test_corrupt_and_malformed_blobs() {
        assert!(matches!(decode("{not json"), Err(PersistenceError::Corrupt(_))));
        assert!(matches!(decode("[]"), Err(PersistenceError::Malformed(_))));
        assert!(matches!(
            decode(r#"{"favorites": "nope"}"#),
            Err(PersistenceError::Malformed(_))
        ));
        assert!(decode("{}").unwrap().favorites.is_empty());
    }
}
