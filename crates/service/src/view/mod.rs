//! View pipeline: search → filters → sort → pagination over the working dataset.

pub mod query;
pub mod pagination;
pub mod pipeline;

pub use pagination::Pagination;
pub use pipeline::{categories, derive_view, paginate, working_set, ViewPage};
pub use query::{AuthFilter, Filters, PageNav, SortDirection, SortKey, SortSpec, ViewState};
