//! Bill records for the Oireachtas bills viewer.
//!
//! I/O-free on purpose: this crate is shared by the native client and any
//! WASM front end. It turns remote `/legislation` responses into bills with
//! stable client-side ids and filters fetched pages by bill type.

pub mod bill;
pub mod filter;
pub mod identity;
pub mod wire;

pub use bill::{
    bill_type_options, Bill, BillPage, BillTypeOption, FavoriteBill, Language, PageHead, NO_TITLE,
    UNKNOWN_SPONSOR,
};
pub use filter::{bill_type_choices, distinct_bill_types, filter_page};
pub use identity::{assign_identities, composite_key, synthesize_favorite_id, unique_key};
pub use wire::{BillResult, BillsResponse, LangTitle, RawBill, Titles};

/// Build a page from a remote response fetched with the given `skip`.
#[must_use]
pub fn page_from_response(response: &BillsResponse, skip: u64) -> BillPage {
    BillPage {
        results: assign_identities(&response.results, skip),
        head: PageHead {
            result_count: response.head.counts.result_count,
        },
    }
}
