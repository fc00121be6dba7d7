use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::record::Record;

/// CORS value given to entries created locally when the form leaves it open.
pub const DEFAULT_CORS: &str = "unknown";

/// Form input for creating or editing a catalog entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub api: String,
    pub description: String,
    pub category: String,
    pub https: bool,
    pub auth: String,
    #[serde(default)]
    pub cors: Option<String>,
    pub link: String,
}

impl RecordDraft {
    /// Required fields must be non-blank and the link must parse as an absolute URL.
    pub fn validate(&self) -> Result<(), ModelError> {
        let required = [&self.api, &self.description, &self.category, &self.link];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(ModelError::Validation("Please fill in all required fields (*)".into()));
        }
        if url::Url::parse(self.link.trim()).is_err() {
            return Err(ModelError::Validation(
                "Link must be a valid URL starting with http:// or https://".into(),
            ));
        }
        Ok(())
    }

    /// Record for a new entry. The identifier is left for the ledger to assign.
    pub fn to_new_record(&self) -> Result<Record, ModelError> {
        self.validate()?;
        let mut rec = self.trimmed_record();
        if rec.cors.is_none() {
            rec.cors = Some(DEFAULT_CORS.to_string());
        }
        Ok(rec)
    }

    /// Full replacement payload for an existing entry.
    pub fn to_update(&self, id: &str) -> Result<Record, ModelError> {
        self.validate()?;
        Ok(self.trimmed_record().with_id(id))
    }

    fn trimmed_record(&self) -> Record {
        Record {
            id: None,
            api: Some(self.api.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            category: Some(self.category.trim().to_string()),
            https: Some(self.https),
            auth: Some(self.auth.trim().to_string()),
            cors: self.cors.as_ref().map(|c| c.trim().to_string()),
            link: Some(self.link.trim().to_string()),
            extra: Default::default(),
        }
    }
}
