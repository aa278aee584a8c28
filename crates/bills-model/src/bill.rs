//! Domain records derived from the wire shapes.

use serde::{Deserialize, Serialize};

use crate::wire::{RawBill, SponsorDetail};

/// Display fallback when a bill has no title in the requested language.
pub const NO_TITLE: &str = "No title available";

/// Display fallback when a bill has no resolvable sponsor.
pub const UNKNOWN_SPONSOR: &str = "Unknown";

/// Title language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Irish,
}

impl Language {
    /// Tag used by language-tagged titles on the wire.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Irish => "ga",
        }
    }
}

/// One piece of legislation, with a client-assigned identity.
///
/// Bills are immutable once built; every fetched page yields fresh values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// Client-side identity, see [`crate::identity`].
    pub id: String,
    pub bill_no: String,
    pub bill_year: Option<String>,
    /// Free-form category, compared by exact match when filtering.
    pub bill_type: String,
    pub status: String,
    pub sponsor: Option<String>,
    pub english_title: Option<String>,
    pub irish_title: Option<String>,
    pub uri: String,
}

impl Bill {
    /// Resolve a wire record into a bill carrying `id`.
    #[must_use]
    pub fn from_raw(raw: &RawBill, id: String) -> Self {
        Self {
            id,
            bill_no: raw.bill_no.clone().unwrap_or_default(),
            bill_year: non_blank(raw.bill_year.as_deref()),
            bill_type: raw.bill_type.clone().unwrap_or_default(),
            status: raw.status.clone().unwrap_or_default(),
            sponsor: resolve_sponsor(raw),
            english_title: resolve_title(
                raw,
                raw.short_title_en.as_deref(),
                raw.long_title_en.as_deref(),
                Language::English,
            ),
            irish_title: resolve_title(
                raw,
                raw.short_title_ga.as_deref(),
                raw.long_title_ga.as_deref(),
                Language::Irish,
            ),
            uri: raw.uri.clone().unwrap_or_default(),
        }
    }

    /// Title in `language`, or [`NO_TITLE`].
    #[must_use]
    pub fn title(&self, language: Language) -> &str {
        let title = match language {
            Language::English => self.english_title.as_deref(),
            Language::Irish => self.irish_title.as_deref(),
        };
        title.unwrap_or(NO_TITLE)
    }

    /// Sponsor display name, or [`UNKNOWN_SPONSOR`].
    #[must_use]
    pub fn sponsor_or_unknown(&self) -> &str {
        self.sponsor.as_deref().unwrap_or(UNKNOWN_SPONSOR)
    }
}

/// Short title, then long title, then the language-tagged list.
fn resolve_title(
    raw: &RawBill,
    short: Option<&str>,
    long: Option<&str>,
    language: Language,
) -> Option<String> {
    non_blank(short).or_else(|| non_blank(long)).or_else(|| {
        raw.titles
            .as_ref()
            .and_then(|titles| non_blank(titles.find(language.code())))
    })
}

/// Primary sponsor first, then any sponsor, then the legacy single field.
/// A member name (`by`) wins over an office (`as`).
fn resolve_sponsor(raw: &RawBill) -> Option<String> {
    let primary = raw
        .sponsors
        .iter()
        .find(|entry| entry.sponsor.is_primary == Some(true))
        .and_then(|entry| sponsor_name(&entry.sponsor));

    primary
        .or_else(|| {
            raw.sponsors
                .iter()
                .find_map(|entry| sponsor_name(&entry.sponsor))
        })
        .or_else(|| raw.sponsor.as_ref().and_then(sponsor_name))
}

fn sponsor_name(detail: &SponsorDetail) -> Option<String> {
    let by = detail.by.as_ref().and_then(|s| non_blank(s.show_as.as_deref()));
    by.or_else(|| {
        detail
            .as_office
            .as_ref()
            .and_then(|s| non_blank(s.show_as.as_deref()))
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Summary counts reported by the remote source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageHead {
    /// Count for the unfiltered query. Never recomputed from a filtered subset.
    pub result_count: u64,
}

/// One fetched page of bills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillPage {
    pub results: Vec<Bill>,
    pub head: PageHead,
}

impl BillPage {
    /// Look a bill up by its client-side id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Bill> {
        self.results.iter().find(|bill| bill.id == id)
    }
}

/// A bill snapshot taken at the moment it was favorited.
///
/// Stands on its own: it stays displayable after the source bill has left
/// every fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteBill {
    pub id: String,
    pub bill_no: String,
    pub bill_type: String,
    pub status: String,
    pub sponsor: String,
    pub english_title: String,
    pub irish_title: String,
}

impl From<&Bill> for FavoriteBill {
    fn from(bill: &Bill) -> Self {
        Self {
            id: bill.id.clone(),
            bill_no: bill.bill_no.clone(),
            bill_type: bill.bill_type.clone(),
            status: bill.status.clone(),
            sponsor: bill.sponsor_or_unknown().to_string(),
            english_title: bill.title(Language::English).to_string(),
            irish_title: bill.title(Language::Irish).to_string(),
        }
    }
}

/// An entry of the bill-type filter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillTypeOption<'a> {
    /// Value passed to [`crate::filter::filter_page`]; empty means all types.
    pub value: &'a str,
    pub label: &'a str,
}

const BILL_TYPE_OPTIONS: [BillTypeOption<'static>; 3] = [
    BillTypeOption {
        value: "",
        label: "All Types",
    },
    BillTypeOption {
        value: "Public",
        label: "Public Bill",
    },
    BillTypeOption {
        value: "Private",
        label: "Private Bill",
    },
];

/// Bill types the remote source is known to emit, led by the "all" entry.
///
/// Private members' bills are filed as `Public` by the source, so they have
/// no entry of their own.
#[must_use]
pub const fn bill_type_options() -> &'static [BillTypeOption<'static>] {
    &BILL_TYPE_OPTIONS
}
