use ilpdg_backoffice::pagination::{DEFAULT_PER_PAGE, MAX_PER_PAGE, PageMeta, Pagination};

#[test]
fn test_defaults_when_absent() {
    let page = Pagination {
        page: None,
        per_page: None,
    };
    assert_eq!(page.page(), 1);
    assert_eq!(page.per_page(), DEFAULT_PER_PAGE);
    assert_eq!(page.offset(), 0);
}

#[test]
fn test_out_of_range_values_are_clamped() {
    let page = Pagination::new(0, 1000);
    assert_eq!(page.page(), 1);
    assert_eq!(page.per_page(), MAX_PER_PAGE);

    assert_eq!(Pagination::new(3, 0).per_page(), 1);
}

#[test]
fn test_offset_and_inclusive_range() {
    let page = Pagination::new(3, 20);
    assert_eq!(page.offset(), 40);
    assert_eq!(page.limit(), 20);
    assert_eq!(page.range(), (40, 59));
}

#[test]
fn test_meta_rounds_total_pages_up() {
    assert_eq!(
        Pagination::new(2, 20).meta(41),
        PageMeta {
            page: 2,
            per_page: 20,
            total: 41,
            total_pages: 3,
        }
    );
    assert_eq!(Pagination::default().meta(0).total_pages, 0);
    assert_eq!(Pagination::new(1, 10).meta(10).total_pages, 1);
}
