//! Data models for Confluence content.
//!
//! - `Page` and its nested `Version`, `PageBody`, `Space`, `Links`
//! - `ContentList`: a single page of listing/search results
//! - `PageUpdate`: the PUT body for a new page version
//! - `AccessibleResource`: a site the OAuth token can reach

pub mod page;
pub mod site;

pub use page::{
    ContentList, Links, Page, PageBody, PageUpdate, Space, Storage, Version, VersionUpdate,
    DEFAULT_VERSION_MESSAGE,
};
pub use site::AccessibleResource;
