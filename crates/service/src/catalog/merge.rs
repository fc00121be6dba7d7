use std::collections::HashSet;

use models::{EditLedger, Record};

use super::identity::assign_id;

/// Combine remote records with the local edit ledger into the working dataset.
///
/// Deleted ids are dropped, pending updates are overlaid field by field, then
/// local additions are appended unless their id is already taken. Remote order
/// comes first, ledger order after it. Recomputed in full on every change.
pub fn merge(remote: &[Record], ledger: &EditLedger) -> Vec<Record> {
    let deleted: HashSet<&str> = ledger.deleted.iter().map(String::as_str).collect();

    let mut merged: Vec<Record> = remote
        .iter()
        .filter(|r| r.id().map_or(true, |id| !deleted.contains(id)))
        .map(|r| match r.id().and_then(|id| ledger.updated.get(id)) {
            Some(patch) => r.clone().overlaid(patch),
            None => r.clone(),
        })
        .collect();

    let mut used: HashSet<String> = merged.iter().filter_map(|r| r.id().map(str::to_string)).collect();

    for added in &ledger.added {
        let added = assign_id(added.clone());
        let id = added.id().unwrap_or_default().to_string();
        if used.insert(id) {
            merged.push(added);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rec(api: &str, link: &str) -> Record {
        assign_id(Record { api: Some(api.into()), link: Some(link.into()), ..Default::default() })
    }

    fn remote() -> Vec<Record> {
        vec![rec("A", "https://a.test"), rec("B", "https://b.test"), rec("C", "https://c.test")]
    }

    fn ids(rows: &[Record]) -> Vec<&str> {
        rows.iter().map(|r| r.id().unwrap_or_default()).collect()
    }

    #[test]
    fn empty_ledger_is_identity() {
        let remote = remote();
        assert_eq!(merge(&remote, &EditLedger::default()), remote);
    }

    #[test]
    fn deleted_ids_never_surface_even_with_pending_update() {
        let mut ledger = EditLedger::default();
        ledger.deleted.push("B::https://b.test".into());
        ledger.updated.insert(
            "B::https://b.test".into(),
            Record { api: Some("B2".into()), ..Default::default() },
        );
        let out = merge(&remote(), &ledger);
        assert_eq!(ids(&out), vec!["A::https://a.test", "C::https://c.test"]);
    }

    #[test]
    fn updates_overlay_without_losing_fields() {
        let mut base = remote();
        base[0].description = Some("original".into());
        base[0].extra.insert("Stars".into(), serde_json::json!(3));
        let mut ledger = EditLedger::default();
        ledger.updated.insert(
            "A::https://a.test".into(),
            Record { api: Some("A renamed".into()), ..Default::default() }.with_id("A::https://a.test"),
        );

        let out = merge(&base, &ledger);
        assert_eq!(out[0].api.as_deref(), Some("A renamed"));
        assert_eq!(out[0].description.as_deref(), Some("original"));
        assert_eq!(out[0].extra.get("Stars"), Some(&serde_json::json!(3)));
        assert_eq!(out[0].id(), Some("A::https://a.test"));
    }

    #[test]
    fn additions_follow_remote_and_colliding_ids_are_suppressed() {
        let mut ledger = EditLedger::default();
        // same natural key as a remote record, no id yet
        ledger.added.push(Record { api: Some("A".into()), link: Some("https://a.test".into()), ..Default::default() });
        ledger.added.push(rec("D", "https://d.test"));
        ledger.added.push(rec("D", "https://d.test").with_id("D::https://d.test"));

        let out = merge(&remote(), &ledger);
        assert_eq!(
            ids(&out),
            vec!["A::https://a.test", "B::https://b.test", "C::https://c.test", "D::https://d.test"]
        );
        assert_eq!(out[0].api.as_deref(), Some("A"));
    }

    #[test]
    fn works_over_empty_remote() {
        let mut ledger = EditLedger::default();
        ledger.added.push(rec("Local", "https://local.test"));
        ledger.deleted.push("gone".into());
        let out = merge(&[], &ledger);
        assert_eq!(ids(&out), vec!["Local::https://local.test"]);
    }
}
