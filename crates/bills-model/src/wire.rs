//! Response shapes of the Oireachtas `/legislation` endpoint.
//!
//! Every field is optional on the wire. The remote source omits or nulls
//! fields freely, so nothing here is allowed to fail deserialization for a
//! missing value; resolution rules live in [`crate::bill`].

use serde::{Deserialize, Serialize};

/// Body of `GET /legislation?limit=&skip=`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillsResponse {
    #[serde(default)]
    pub head: ResponseHead,
    #[serde(default)]
    pub results: Vec<BillResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHead {
    #[serde(default)]
    pub counts: ResultCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultCounts {
    /// Total results for the unfiltered query, across all pages.
    #[serde(default)]
    pub result_count: u64,
}

/// One entry of `results`; the bill itself is nested one level down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillResult {
    #[serde(default)]
    pub bill: RawBill,
}

/// A bill exactly as the remote source describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBill {
    pub bill_no: Option<String>,
    pub bill_year: Option<String>,
    pub bill_type: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub sponsors: Vec<SponsorEntry>,
    /// Older single-sponsor shape, still emitted by some snapshots.
    pub sponsor: Option<SponsorDetail>,
    pub short_title_en: Option<String>,
    pub short_title_ga: Option<String>,
    pub long_title_en: Option<String>,
    pub long_title_ga: Option<String>,
    /// Language-tagged titles, the shape older snapshots use.
    pub titles: Option<Titles>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Titles {
    #[serde(default)]
    pub title: Vec<LangTitle>,
}

impl Titles {
    /// Value of the first title tagged `lang` (`"en"`, `"ga"`).
    #[must_use]
    pub fn find(&self, lang: &str) -> Option<&str> {
        self.title
            .iter()
            .find(|t| t.lang.as_deref() == Some(lang))
            .and_then(|t| t.value.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangTitle {
    pub lang: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorEntry {
    #[serde(default)]
    pub sponsor: SponsorDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorDetail {
    /// The member sponsoring the bill, when it is a person.
    pub by: Option<ShowAs>,
    /// The office sponsoring the bill (e.g. a Minister), when it is not.
    #[serde(rename = "as")]
    pub as_office: Option<ShowAs>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowAs {
    pub show_as: Option<String>,
}
