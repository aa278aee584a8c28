//! Client-side bill-type filtering.
//!
//! The remote source ignores type parameters, so filtering happens on one
//! fetched page. The page head is carried over untouched: pagination stays
//! driven by the unfiltered server total, and a filtered page may show fewer
//! rows than its limit while later pages still hold matches.

use std::borrow::Cow;

use crate::bill::{bill_type_options, BillPage, BillTypeOption};

/// Keep the bills of `page` whose type equals `bill_type` exactly.
///
/// An empty `bill_type` returns the page itself, borrowed.
#[must_use]
pub fn filter_page<'a>(page: &'a BillPage, bill_type: &str) -> Cow<'a, BillPage> {
    if bill_type.is_empty() {
        return Cow::Borrowed(page);
    }

    Cow::Owned(BillPage {
        results: page
            .results
            .iter()
            .filter(|bill| bill.bill_type == bill_type)
            .cloned()
            .collect(),
        head: page.head,
    })
}

/// Bill types present in `page`, in first-seen order.
#[must_use]
pub fn distinct_bill_types(page: &BillPage) -> Vec<&str> {
    let mut types: Vec<&str> = Vec::new();
    for bill in &page.results {
        if !types.contains(&bill.bill_type.as_str()) {
            types.push(&bill.bill_type);
        }
    }
    types
}

/// Options for a bill-type filter over `page`: the known catalogue, then any
/// type the page carries that the catalogue lacks, labelled by its value.
#[must_use]
pub fn bill_type_choices(page: &BillPage) -> Vec<BillTypeOption<'_>> {
    let known = bill_type_options();
    let mut choices: Vec<BillTypeOption<'_>> = known.to_vec();
    choices.extend(
        distinct_bill_types(page)
            .into_iter()
            .filter(|value| !value.is_empty() && !known.iter().any(|o| o.value == *value))
            .map(|value| BillTypeOption {
                value,
                label: value,
            }),
    );
    choices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::{Bill, PageHead};

    fn bill(id: &str, bill_type: &str) -> Bill {
        Bill {
            id: id.into(),
            bill_no: id.into(),
            bill_year: None,
            bill_type: bill_type.into(),
            status: "Current".into(),
            sponsor: None,
            english_title: None,
            irish_title: None,
            uri: String::new(),
        }
    }

    fn page() -> BillPage {
        BillPage {
            results: vec![
                bill("1", "Public"),
                bill("2", "Private"),
                bill("3", "Public"),
                bill("4", "public"),
            ],
            head: PageHead { result_count: 137 },
        }
    }

    #[test]
    fn test_empty_filter_borrows_input() {
        let page = page();
        let filtered = filter_page(&page, "");
        assert!(matches!(filtered, Cow::Borrowed(p) if std::ptr::eq(p, &page)));
    }

    #[test]
    fn test_filter_is_exact_and_case_sensitive() {
        let page = page();
        let filtered = filter_page(&page, "Public");
        let ids: Vec<&str> = filtered.results.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(filtered.head.result_count, 137);
    }

    #[test]
    fn test_unknown_type_yields_empty_results_same_head() {
        let page = page();
        let filtered = filter_page(&page, "Money Bill");
        assert!(filtered.results.is_empty());
        assert_eq!(filtered.head, page.head);
    }

    #[test]
    fn test_distinct_bill_types_first_seen_order() {
        assert_eq!(distinct_bill_types(&page()), ["Public", "Private", "public"]);
    }

    #[test]
    fn test_choices_append_unlisted_page_types() {
        let mut page = page();
        page.results.push(bill("5", "Private Members Bill"));
        page.results.push(bill("6", ""));

        let values: Vec<&str> = bill_type_choices(&page).iter().map(|o| o.value).collect();
        assert_eq!(
            values,
            ["", "Public", "Private", "public", "Private Members Bill"]
        );

        let choices = bill_type_choices(&page);
        let extra = choices.last().expect("at least the catalogue");
        assert_eq!(extra.label, "Private Members Bill");
    }

    #[test]
    fn test_choices_for_empty_page_are_the_catalogue() {
        assert_eq!(bill_type_choices(&BillPage::default()), bill_type_options());
    }
}
