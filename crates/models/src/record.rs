use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

/// Typed text columns, by wire name.
const TEXT_COLUMNS: [&str; 6] = ["API", "Description", "Category", "Auth", "Cors", "Link"];

/// One catalog entry.
///
/// The known catalog columns are typed; anything else the remote source sends
/// is kept verbatim in `extra` so it survives merges and exports. Every named
/// field is optional, which lets the same type describe a partial record used
/// as an update payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "API", default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Category", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "HTTPS", default, skip_serializing_if = "Option::is_none")]
    pub https: Option<bool>,
    #[serde(rename = "Auth", default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(rename = "Cors", default, skip_serializing_if = "Option::is_none")]
    pub cors: Option<String>,
    #[serde(rename = "Link", default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Decode one catalog entry without rejecting it over a mistyped column.
    ///
    /// A non-string `id` is kept as its JSON text. Any other typed column
    /// holding the wrong JSON type moves into `extra` under its wire name, so
    /// it still serializes verbatim. Only non-objects are refused.
    pub fn from_json_lenient(value: Value) -> Result<Record, ModelError> {
        let Value::Object(mut obj) = value else {
            return Err(ModelError::Validation("catalog entry is not an object".into()));
        };
        if let Some(id) = obj.get_mut("id") {
            if !id.is_string() && !id.is_null() {
                *id = Value::String(id.to_string());
            }
        }
        let mut stray = Map::new();
        let misfit = |v: &Value, name: &str| {
            !v.is_null() && if name == "HTTPS" { !v.is_boolean() } else { !v.is_string() }
        };
        for name in TEXT_COLUMNS.into_iter().chain(["HTTPS"]) {
            if obj.get(name).is_some_and(|v| misfit(v, name)) {
                if let Some(v) = obj.remove(name) {
                    stray.insert(name.to_string(), v);
                }
            }
        }
        let mut record: Record = serde_json::from_value(Value::Object(obj))?;
        record.extra.extend(stray);
        Ok(record)
    }

    /// The assigned identifier, if any. Empty strings count as absent.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|s| !s.is_empty())
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Shallow overlay: every named field set in `patch` replaces ours,
    /// extension entries replace ours key by key, the rest is kept.
    pub fn overlay(&mut self, patch: &Record) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if let Some(v) = src {
                *dst = Some(v.clone());
            }
        }
        take(&mut self.id, &patch.id);
        take(&mut self.api, &patch.api);
        take(&mut self.description, &patch.description);
        take(&mut self.category, &patch.category);
        take(&mut self.https, &patch.https);
        take(&mut self.auth, &patch.auth);
        take(&mut self.cors, &patch.cors);
        take(&mut self.link, &patch.link);
        // a typed value replaces any off-type original kept under the same name
        for column in patch.typed_columns() {
            self.extra.remove(column);
        }
        for (k, v) in &patch.extra {
            self.extra.insert(k.clone(), v.clone());
        }
    }

    pub fn overlaid(mut self, patch: &Record) -> Self {
        self.overlay(patch);
        self
    }

    fn typed_columns(&self) -> impl Iterator<Item = &'static str> {
        [
            ("API", self.api.is_some()),
            ("Description", self.description.is_some()),
            ("Category", self.category.is_some()),
            ("HTTPS", self.https.is_some()),
            ("Auth", self.auth.is_some()),
            ("Cors", self.cors.is_some()),
            ("Link", self.link.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
    }

    /// HTTPS flag rendered as the filter compares it: `"true"`, `"false"`, or
    /// `""` when the source did not say.
    pub fn https_label(&self) -> &'static str {
        match self.https {
            Some(true) => "true",
            Some(false) => "false",
            None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn deserializes_remote_entry_and_keeps_unknown_fields() {
        let raw = json!({
            "API": "Cat Facts",
            "Description": "Daily cat facts",
            "Auth": "",
            "HTTPS": true,
            "Cors": "no",
            "Link": "https://catfact.ninja",
            "Category": "Animals",
            "Popularity": 7
        });
        let rec: Record = serde_json::from_value(raw).expect("decode");
        assert_eq!(rec.id, None);
        assert_eq!(rec.api.as_deref(), Some("Cat Facts"));
        assert_eq!(rec.https, Some(true));
        assert_eq!(rec.extra.get("Popularity"), Some(&json!(7)));

        let back = serde_json::to_value(&rec).expect("encode");
        assert_eq!(back["Popularity"], json!(7));
        assert_eq!(back["API"], json!("Cat Facts"));
        assert!(back.get("id").is_none());
    }

    #[test]
    fn overlay_replaces_named_and_extra_fields_only_when_present() {
        let mut base = Record {
            id: Some("a::b".into()),
            api: Some("Old".into()),
            description: Some("keep me".into()),
            https: Some(false),
            ..Default::default()
        };
        base.extra.insert("Stars".into(), json!(1));
        base.extra.insert("Owner".into(), json!("x"));

        let mut patch = Record { api: Some("New".into()), https: Some(true), ..Default::default() };
        patch.extra.insert("Stars".into(), json!(2));

        base.overlay(&patch);
        assert_eq!(base.id.as_deref(), Some("a::b"));
        assert_eq!(base.api.as_deref(), Some("New"));
        assert_eq!(base.description.as_deref(), Some("keep me"));
        assert_eq!(base.https, Some(true));
        assert_eq!(base.extra.get("Stars"), Some(&json!(2)));
        assert_eq!(base.extra.get("Owner"), Some(&json!("x")));
    }

    #[test]
    fn lenient_decode_keeps_mistyped_columns() {
        let rec = Record::from_json_lenient(json!({
            "id": 42,
            "API": "Odd",
            "HTTPS": "yes",
            "Auth": null,
            "Description": ["not", "text"]
        }))
        .expect("object decodes");
        assert_eq!(rec.id(), Some("42"));
        assert_eq!(rec.api.as_deref(), Some("Odd"));
        assert_eq!(rec.https, None);
        assert_eq!(rec.auth, None);
        assert_eq!(rec.extra.get("HTTPS"), Some(&json!("yes")));

        let back = serde_json::to_value(&rec).expect("encode");
        assert_eq!(back["HTTPS"], json!("yes"));
        assert_eq!(back["Description"], json!(["not", "text"]));

        // a typed edit supersedes the stray value
        let fixed = rec.overlaid(&Record { https: Some(true), ..Default::default() });
        assert_eq!(fixed.extra.get("HTTPS"), None);
        assert_eq!(serde_json::to_value(&fixed).expect("encode")["HTTPS"], json!(true));

        assert!(Record::from_json_lenient(json!(7)).is_err());
    }

    #[test]
    fn empty_id_counts_as_absent() {
        let rec = Record { id: Some(String::new()), ..Default::default() };
        assert_eq!(rec.id(), None);
        assert_eq!(rec.with_id("x").id(), Some("x"));
    }

    #[test]
    fn https_label_matches_filter_values() {
        let mut rec = Record::default();
        assert_eq!(rec.https_label(), "");
        rec.https = Some(true);
        assert_eq!(rec.https_label(), "true");
        rec.https = Some(false);
        assert_eq!(rec.https_label(), "false");
    }
}
