use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use crate::models::photo::Photo;

/// Fixed text returned in place of a link when the tier forbids expiring links.
pub const EXPIRING_LINKS_DENIED: &str =
    "You don't have access to generate expiring links, contact Admin to upgrade access tier";

/// Which kind of thumbnail link the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    #[default]
    Plain,
    Expiring,
}

impl LinkMode {
    pub fn from_expiring_flag(expiring: bool) -> Self {
        if expiring {
            LinkMode::Expiring
        } else {
            LinkMode::Plain
        }
    }
}

/// Outcome for a single thumbnail spec.
///
/// Serialized as a bare string, or `null` when the artifact could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkResult {
    PublicUrl(String),
    TokenUrl(String),
    DenialMessage,
    Unavailable,
}

impl LinkResult {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LinkResult::PublicUrl(url) | LinkResult::TokenUrl(url) => Some(url),
            LinkResult::DenialMessage => Some(EXPIRING_LINKS_DENIED),
            LinkResult::Unavailable => None,
        }
    }
}

impl Serialize for LinkResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(value) => serializer.serialize_str(value),
            None => serializer.serialize_none(),
        }
    }
}

/// Link set for one photo, keyed by thumbnail spec name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoLinks {
    pub photo: Photo,
    pub original_link: Option<String>,
    pub thumbnail_links: BTreeMap<String, LinkResult>,
}
