use chrono::NaiveDate;
use textprint_document::{
    Color, DocumentSource, StyleAttrs, TagKind, TextBuffer, TextSpan, Weight,
};
use textprint_printing::{
    CancelFlag, DisplayList, FileInfo, FixedClock, JobState, Margin, MonospaceMeasurer,
    Orientation, PageSetup, PaperSize, PrintJob, PrintJobOptions, StyleRun,
};

fn clock() -> FixedClock {
    FixedClock(
        NaiveDate::from_ymd_opt(2023, 11, 20)
            .and_then(|date| date.and_hms_opt(9, 30, 0))
            .unwrap(),
    )
}

fn bare_options() -> PrintJobOptions {
    let mut options = PrintJobOptions::default();
    options.config.header = None;
    options.config.footer = None;
    options
}

fn small_page() -> PageSetup {
    PageSetup::new(
        PaperSize::from_points(300.0, 200.0),
        Orientation::Portrait,
        Margin::uniform(10.0),
    )
}

#[test]
fn pages_cover_the_document_without_gaps() {
    let document = TextBuffer::from_lines((1..=1000).map(|idx| format!("line {idx}")));
    let measurer = MonospaceMeasurer::default();
    let clock = clock();
    let mut job = PrintJob::new(&document, &measurer, &clock, bare_options()).unwrap();
    job.paginate(&CancelFlag::new()).unwrap();

    let spans: Vec<TextSpan> = job.pagination().unwrap().spans().collect();
    assert!(spans.len() > 1);
    assert_eq!(spans.first().map(|span| span.start), Some(0));
    assert_eq!(spans.last().map(|span| span.end), Some(document.char_len()));
    for pair in spans.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }

    let pages = job.render_all(&CancelFlag::new()).unwrap();
    assert_eq!(pages.len(), spans.len());
    assert_eq!(job.state(), JobState::Finished);
    let printed: Vec<&str> = pages.iter().flat_map(DisplayList::texts).collect();
    assert_eq!(printed.join("\n"), document.text());
}

#[test]
fn line_range_prints_numbered_source_lines() {
    let document = TextBuffer::from_lines((0..40).map(|idx| format!("entry {idx}")));
    let measurer = MonospaceMeasurer::default();
    let clock = clock();
    let mut options = bare_options().with_line_range(10, 19);
    options.config.show_line_numbers = true;

    let mut job = PrintJob::new(&document, &measurer, &clock, options).unwrap();
    job.paginate(&CancelFlag::new()).unwrap();
    assert_eq!(job.page_count(), Some(1));
    assert_eq!(job.pages()[0].offset, document.line_start(10).unwrap());

    let page = job.render_page(0).unwrap();
    let texts = page.texts();
    assert_eq!(texts.len(), 20);
    assert_eq!(&texts[..2], &["11", "entry 10"]);
    assert_eq!(&texts[18..], &["20", "entry 19"]);

    let column = job.geometry().line_numbers.unwrap();
    assert_eq!(column.digits, 2);
    let number = page.glyph_runs().next().unwrap();
    assert_eq!(number.position.x + number.width, column.right());
}

#[test]
fn wrapped_line_continues_on_the_next_page() {
    let long_line = "abcd ".repeat(200);
    let document = TextBuffer::from_lines(["intro", long_line.as_str()]);
    let measurer = MonospaceMeasurer::default();
    let clock = clock();

    let options = PrintJobOptions {
        page_setup: small_page(),
        ..bare_options()
    };
    let mut wrapped = PrintJob::new(&document, &measurer, &clock, options.clone()).unwrap();
    wrapped.paginate(&CancelFlag::new()).unwrap();
    assert_eq!(wrapped.page_count(), Some(2));
    let second = wrapped.page_span(1).unwrap();
    assert!(second.start > document.line_start(1).unwrap());
    assert_eq!(second.end, document.char_len());

    let mut flat = options;
    flat.config.wrap = false;
    let mut unwrapped = PrintJob::new(&document, &measurer, &clock, flat).unwrap();
    unwrapped.paginate(&CancelFlag::new()).unwrap();
    assert_eq!(unwrapped.page_count(), Some(1));
}

#[test]
fn style_runs_reach_the_display_list() {
    let mut document = TextBuffer::from_lines(["fn main() {", "    println!(\"hi\");", "}"]);
    let keyword = StyleAttrs::default()
        .with_foreground(Color::rgb(200, 40, 40))
        .with_weight(Weight::BOLD);
    let bracket = StyleAttrs::default().with_background(Color::rgb(255, 255, 0));
    let tags = document.tags_mut();
    let keyword_tag = tags.register("keyword", TagKind::Style, keyword);
    let bracket_tag = tags.register("bracket", TagKind::BracketMatch, bracket);
    tags.apply(keyword_tag, TextSpan::new(0, 2));
    tags.apply(bracket_tag, TextSpan::new(10, 11));

    let measurer = MonospaceMeasurer::default();
    let clock = clock();
    let mut job = PrintJob::new(&document, &measurer, &clock, bare_options()).unwrap();
    job.paginate(&CancelFlag::new()).unwrap();
    let page = job.render_page(0).unwrap();

    let first = page.glyph_runs().next().unwrap();
    assert_eq!(first.runs, vec![StyleRun::new(0, 2, keyword)]);
    assert!(page.glyph_runs().skip(1).all(|run| run.runs.is_empty()));

    let mut plain = bare_options();
    plain.config.use_styles = false;
    let mut job = PrintJob::new(&document, &measurer, &clock, plain).unwrap();
    job.paginate(&CancelFlag::new()).unwrap();
    let page = job.render_page(0).unwrap();
    assert!(page.glyph_runs().all(|run| run.runs.is_empty()));
}

#[test]
fn header_uses_one_timestamp_for_every_page() {
    let document = TextBuffer::from_lines((1..=60).map(|idx| format!("row {idx}")));
    let measurer = MonospaceMeasurer::default();
    let clock = clock();
    let options = PrintJobOptions {
        page_setup: small_page(),
        ..PrintJobOptions::default()
    }
    .with_file(FileInfo::from_path("/srv/report.log"));

    let mut job = PrintJob::new(&document, &measurer, &clock, options).unwrap();
    job.paginate(&CancelFlag::new()).unwrap();
    let pages = job.render_all(&CancelFlag::new()).unwrap();
    assert!(pages.len() > 2);
    for (index, page) in pages.iter().enumerate() {
        let texts = page.texts();
        assert_eq!(texts[0], "report.log");
        assert_eq!(texts[1], "11/20/23 09:30:00");
        let footer = format!("Page {} of {}", index + 1, pages.len());
        assert_eq!(texts.last().copied(), Some(footer.as_str()));
    }
}

#[test]
fn display_list_serializes_as_tagged_json() {
    let document = TextBuffer::new("hello");
    let measurer = MonospaceMeasurer::default();
    let clock = clock();
    let mut job = PrintJob::new(&document, &measurer, &clock, PrintJobOptions::default()).unwrap();
    job.paginate(&CancelFlag::new()).unwrap();
    let page = job.render_page(0).unwrap();

    let json = serde_json::to_value(&page).unwrap();
    let commands = json["commands"].as_array().unwrap();
    assert!(commands.iter().any(|command| command["type"] == "HorizontalRule"));
    assert!(commands
        .iter()
        .any(|command| command["type"] == "GlyphRun" && command["text"] == "hello"));
}

#[test]
fn preview_png_decodes_to_page_size() {
    let document = TextBuffer::from_lines(["alpha", "beta"]);
    let measurer = MonospaceMeasurer::default();
    let clock = clock();
    let options = PrintJobOptions {
        page_setup: small_page(),
        ..PrintJobOptions::default()
    };
    let mut job = PrintJob::new(&document, &measurer, &clock, options).unwrap();
    job.paginate(&CancelFlag::new()).unwrap();

    let preview = job.preview_page(0, 144).unwrap();
    assert_eq!((preview.width_px, preview.height_px), (600, 400));
    let decoded = image::load_from_memory(&preview.data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (600, 400));
}
