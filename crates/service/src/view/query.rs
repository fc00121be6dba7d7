use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Column a view can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "API")]
    Api,
    Description,
    Category,
    #[serde(rename = "HTTPS")]
    Https,
    Auth,
    Cors,
    Link,
}

impl FromStr for SortKey {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "API" => Ok(SortKey::Api),
            "Description" => Ok(SortKey::Description),
            "Category" => Ok(SortKey::Category),
            "HTTPS" => Ok(SortKey::Https),
            "Auth" => Ok(SortKey::Auth),
            "Cors" => Ok(SortKey::Cors),
            "Link" => Ok(SortKey::Link),
            other => Err(ServiceError::Validation(format!("unknown sort column `{other}`"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self { Self { key: SortKey::Api, direction: SortDirection::Asc } }
}

/// Auth-scheme filter choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthFilter {
    /// Empty or missing auth field.
    None,
    /// Auth field mentions "api".
    ApiKey,
    /// Auth field mentions "oauth".
    OAuth,
}

impl FromStr for AuthFilter {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(AuthFilter::None),
            "apikey" => Ok(AuthFilter::ApiKey),
            "oauth" => Ok(AuthFilter::OAuth),
            other => Err(ServiceError::Validation(format!("unknown auth filter `{other}`"))),
        }
    }
}

/// Field filters; `None` means the filter is unset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub category: Option<String>,
    /// Compared against the stringified flag, i.e. `"true"` or `"false"`.
    pub https: Option<String>,
    pub auth: Option<AuthFilter>,
}

/// Transient search / filter / sort / pagination selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub search: String,
    pub filters: Filters,
    pub sort: SortSpec,
    /// 1-based; clamped into range whenever a view is derived.
    pub page: usize,
    pub per_page: usize,
}

impl ViewState {
    pub fn new(per_page: usize) -> Self {
        Self {
            search: String::new(),
            filters: Filters::default(),
            sort: SortSpec::default(),
            page: 1,
            per_page: per_page.max(1),
        }
    }

    /// Select a sort column: the active column flips direction, a new column
    /// starts ascending. The current page is kept.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort.key == key {
            self.sort.direction = self.sort.direction.flipped();
        } else {
            self.sort = SortSpec { key, direction: SortDirection::Asc };
        }
    }
}

impl Default for ViewState {
    fn default() -> Self { Self::new(10) }
}

/// Pagination control actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageNav {
    First,
    Prev,
    Next,
    Last,
    Page(usize),
}
