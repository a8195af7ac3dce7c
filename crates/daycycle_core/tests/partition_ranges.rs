use daycycle_core::{header_block_id, locate_headers, section_range, Block, Section};

fn todo(id: &str, text: &str) -> Block {
    Block::todo(id, text, false)
}

/// Daily at 0, Today at 4, Backlog at 9, Tomorrow absent, 12 blocks.
fn standard_page() -> Vec<Block> {
    vec![
        Block::heading("h-daily", "Daily:"),
        todo("d1", "stretch"),
        todo("d2", "journal"),
        todo("d3", "inbox zero"),
        Block::heading("h-today", "Today:"),
        todo("t1", "a"),
        todo("t2", "b"),
        todo("t3", "c"),
        todo("t4", "d"),
        Block::heading("h-backlog", "Backlog:"),
        todo("b1", "e"),
        todo("b2", "f"),
    ]
}

#[test]
fn locates_first_header_occurrence_per_section() {
    let blocks = standard_page();
    let headers = locate_headers(&blocks);
    assert_eq!(headers.daily, Some(0));
    assert_eq!(headers.today, Some(4));
    assert_eq!(headers.tomorrow, None);
    assert_eq!(headers.backlog, Some(9));
}

#[test]
fn ranges_end_at_next_present_follower_or_list_end() {
    let blocks = standard_page();
    assert_eq!(section_range(&blocks, Section::Daily), Some(1..4));
    assert_eq!(section_range(&blocks, Section::Today), Some(5..9));
    assert_eq!(section_range(&blocks, Section::Tomorrow), None);
    assert_eq!(section_range(&blocks, Section::Backlog), Some(10..12));
}

#[test]
fn decorated_and_prefixed_headers_are_recognized() {
    let blocks = vec![
        Block::heading("h1", "Today: (2/5)"),
        todo("t1", "a"),
        Block::paragraph("h2", "backlog"),
    ];
    let headers = locate_headers(&blocks);
    assert_eq!(headers.today, Some(0));
    assert_eq!(headers.backlog, Some(2));
    assert_eq!(section_range(&blocks, Section::Today), Some(1..2));
}

#[test]
fn duplicate_headers_keep_first_occurrence() {
    let blocks = vec![
        Block::heading("h1", "Today:"),
        todo("t1", "a"),
        Block::heading("h2", "Today:"),
        todo("t2", "b"),
    ];
    let headers = locate_headers(&blocks);
    assert_eq!(headers.today, Some(0));
    assert_eq!(header_block_id(&blocks, Section::Today), Some(&"h1".to_string()));
    // The duplicate header block is plain content of the first section.
    assert_eq!(section_range(&blocks, Section::Today), Some(1..4));
}

#[test]
fn follower_header_before_section_yields_empty_range() {
    let blocks = vec![
        Block::heading("h-backlog", "Backlog:"),
        todo("b1", "x"),
        Block::heading("h-today", "Today:"),
        todo("t1", "y"),
    ];
    // Backlog physically precedes Today, so Today's range clamps empty
    // rather than running backwards.
    assert_eq!(section_range(&blocks, Section::Today), Some(3..3));
    assert_eq!(section_range(&blocks, Section::Backlog), Some(1..4));
}

#[test]
fn absent_sections_have_no_range_or_header_id() {
    let blocks = vec![todo("t1", "loose item")];
    assert_eq!(section_range(&blocks, Section::Today), None);
    assert_eq!(header_block_id(&blocks, Section::Daily), None);
}
