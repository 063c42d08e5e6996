//! # Stash
//!
//! A process-wide, append-only log of captured rows keyed by tag. Unlike
//! rendered output, stashed rows keep their raw values, so a stashed integer
//! comes back as a number and not as display text. Retrieval hands out deep
//! copies: mutating what `get_stash` returns never affects the stored rows.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

use crate::error::{BeholdError, Result};
use crate::item::Item;

static STASH: Lazy<Mutex<HashMap<String, Vec<Item>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn store() -> MutexGuard<'static, HashMap<String, Vec<Item>>> {
    STASH.lock().unwrap_or_else(PoisonError::into_inner)
}

fn known_tags(stash: &HashMap<String, Vec<Item>>) -> Vec<String> {
    let mut tags: Vec<String> = stash.keys().cloned().collect();
    tags.sort();
    tags
}

pub(crate) fn append(tag: &str, row: Item) {
    store().entry(tag.to_string()).or_default().push(row);
}

/// Return a deep copy of the rows recorded under `tag`.
///
/// Errors with the list of currently known tags when `tag` is unknown.
pub fn get_stash(tag: &str) -> Result<Vec<Item>> {
    let stash = store();
    match stash.get(tag) {
        Some(rows) => Ok(rows.clone()),
        None => Err(BeholdError::UnknownStash {
            name: tag.to_string(),
            known: known_tags(&stash),
        }),
    }
}

/// Delete the named tags, or reset the whole stash when `tags` is empty.
///
/// Each name is processed independently: an unknown tag errors, but deletions
/// already applied for earlier names in the call stand.
pub fn clear_stash<I, S>(tags: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut stash = store();
    let mut named_any = false;
    for tag in tags {
        named_any = true;
        let tag = tag.as_ref();
        if stash.remove(tag).is_none() {
            let known = known_tags(&stash);
            return Err(BeholdError::UnknownStash {
                name: tag.to_string(),
                known,
            });
        }
    }
    if !named_any {
        stash.clear();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_lock::serial;
    use serde_json::json;

    fn row(n: i64) -> Item {
        Item::from_pairs([("n", json!(n))])
    }

    #[test]
    fn rows_accumulate_in_order() {
        let _serial = serial();
        clear_stash::<_, &str>([]).unwrap();
        append("stash_order", row(1));
        append("stash_order", row(2));
        append("stash_order", row(3));
        let rows = get_stash("stash_order").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("n"), Some(&json!(1)));
        assert_eq!(rows[2].get("n"), Some(&json!(3)));
        clear_stash(["stash_order"]).unwrap();
    }

    #[test]
    fn get_returns_a_deep_copy() {
        let _serial = serial();
        clear_stash::<_, &str>([]).unwrap();
        append("stash_copy", row(1));
        let mut copied = get_stash("stash_copy").unwrap();
        copied[0].set("n", json!(999));
        copied.push(row(2));
        let fresh = get_stash("stash_copy").unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].get("n"), Some(&json!(1)));
        clear_stash(["stash_copy"]).unwrap();
    }

    #[test]
    fn unknown_tag_errors_with_known_list() {
        let _serial = serial();
        clear_stash::<_, &str>([]).unwrap();
        append("stash_known", row(1));
        let err = get_stash("stash_missing").unwrap_err();
        match err {
            BeholdError::UnknownStash { name, known } => {
                assert_eq!(name, "stash_missing");
                assert!(known.contains(&"stash_known".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
        clear_stash(["stash_known"]).unwrap();
    }

    #[test]
    fn clear_with_no_names_empties_everything() {
        let _serial = serial();
        append("stash_a", row(1));
        append("stash_b", row(2));
        clear_stash::<_, &str>([]).unwrap();
        assert!(get_stash("stash_a").is_err());
        assert!(get_stash("stash_b").is_err());
    }

    #[test]
    fn clear_is_per_name_without_rollback() {
        let _serial = serial();
        clear_stash::<_, &str>([]).unwrap();
        append("stash_first", row(1));
        append("stash_second", row(2));
        let result = clear_stash(["stash_first", "stash_gone", "stash_second"]);
        assert!(result.is_err());
        // The valid deletion before the failure stands.
        assert!(get_stash("stash_first").is_err());
        assert!(get_stash("stash_second").is_ok());
        clear_stash(["stash_second"]).unwrap();
    }
}
