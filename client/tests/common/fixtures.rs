//! Builders for favorites used across store tests.

use bills_model::FavoriteBill;

/// The snapshot a page row would produce for `bill_no` of 2024.
pub fn favorite(bill_no: &str) -> FavoriteBill {
    FavoriteBill {
        id: format!("2024-{bill_no}"),
        bill_no: bill_no.to_string(),
        bill_type: "Public Bill".to_string(),
        status: "Published".to_string(),
        sponsor: "Unknown".to_string(),
        english_title: "No title available".to_string(),
        irish_title: "No title available".to_string(),
    }
}
