use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use shelf_core::view::{
    Frame, Layout, StatusFilter, TagFilter, ViewConfig, ViewCriteria, ViewEngine, ViewFlavor,
    Viewport, Window,
};
use shelf_core::{Error, Item, Status};
use std::rc::Rc;
use std::time::{Duration, Instant};

fn items(n: usize) -> Vec<Item> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let mut it = Item::new(
                format!("p{i}"),
                String::new(),
                "author".into(),
                format!("post {i}"),
            );
            it.saved_at = base + ChronoDuration::minutes(i as i64);
            it
        })
        .collect()
}

fn engine_with(n: usize) -> ViewEngine {
    let mut e = ViewEngine::new(ViewConfig::default()).unwrap();
    e.set_all(items(n));
    e
}

#[test]
fn rejects_zero_item_height() {
    let cfg = ViewConfig {
        item_height: 0,
        ..ViewConfig::default()
    };
    assert!(matches!(ViewEngine::new(cfg), Err(Error::Validation(_))));
}

#[test]
fn empty_collection_shows_empty_state() {
    let mut e = engine_with(0);
    let frame = e.render().unwrap();
    assert!(matches!(frame, Frame::Empty { placeholder } if placeholder == "No saved posts yet"));
}

#[test]
fn no_match_is_distinct_from_empty() {
    let mut e = engine_with(3);
    e.apply_criteria(ViewCriteria::default().with_search("nothing like this"));
    let frame = e.render().unwrap();
    assert!(matches!(frame, Frame::NoMatch { .. }));
    assert_eq!(e.showing_label(), "Showing 0 posts");
}

#[test]
fn small_view_renders_everything_in_flow() {
    let mut e = engine_with(50);
    let frame = e.render().unwrap();
    assert_eq!(frame.layout(), Some(Layout::Flow));
    assert_eq!(frame.placed().len(), 50);
    assert!(frame.placed().iter().all(|p| p.top.is_none()));
    assert_eq!(frame.placed()[0].node.id, "p49");
    assert_eq!(e.window(), None);
}

#[test]
fn sixty_items_window_at_top() {
    let mut e = engine_with(60);
    e.set_viewport(Viewport::new(0, 900));
    let frame = e.render().unwrap();
    match frame.layout() {
        Some(Layout::Absolute {
            track_height,
            window,
        }) => {
            assert_eq!(track_height, 60 * 180);
            assert_eq!(window, Window { start: 0, end: 15 });
        }
        other => panic!("expected windowed layout, got {other:?}"),
    }
    let placed = frame.placed();
    assert_eq!(placed.len(), 15);
    for (slot, p) in placed.iter().enumerate() {
        assert_eq!(p.index, slot);
        assert_eq!(p.top, Some(slot as u64 * 180));
    }
    assert_eq!(e.window(), Some(Window { start: 0, end: 15 }));
    assert_eq!(e.cache().len(), 15);
}

#[test]
fn scroll_within_same_window_does_not_rerender() {
    let t0 = Instant::now();
    let mut e = engine_with(60);
    e.set_viewport(Viewport::new(0, 900));
    e.render().unwrap();
    assert_eq!(e.render_count(), 1);

    // floor(900 / 180) - 5 == 0: same window
    assert!(!e.on_scroll(900, 900, t0).unwrap());
    assert_eq!(e.render_count(), 1);

    assert!(e.on_scroll(1800, 900, t0 + Duration::from_millis(20)).unwrap());
    assert_eq!(e.render_count(), 2);
    assert_eq!(e.window(), Some(Window { start: 5, end: 20 }));

    // sub-row delta
    assert!(!e.on_scroll(1850, 900, t0 + Duration::from_millis(40)).unwrap());
    assert_eq!(e.render_count(), 2);
}

#[test]
fn scroll_events_inside_throttle_interval_are_dropped() {
    let t0 = Instant::now();
    let mut e = engine_with(100);
    e.set_viewport(Viewport::new(0, 900));
    e.render().unwrap();

    assert!(e.on_scroll(1800, 900, t0).unwrap());
    assert!(!e.on_scroll(9000, 900, t0 + Duration::from_millis(5)).unwrap());
    assert_eq!(e.viewport().scroll_offset, 1800);
    assert_eq!(e.render_count(), 2);

    assert!(e.on_scroll(9000, 900, t0 + Duration::from_millis(16)).unwrap());
    assert_eq!(e.window(), Some(Window { start: 45, end: 60 }));
}

#[test]
fn overlapping_windows_reuse_cached_cards() {
    let t0 = Instant::now();
    let mut e = engine_with(100);
    e.set_viewport(Viewport::new(0, 900));
    e.render().unwrap();
    let before = Rc::clone(&e.frame().find("p90").unwrap().node);
    let builds = e.cache().stats().builds;

    // window 5..20 shares 5..15 with 0..15
    e.on_scroll(1800, 900, t0).unwrap();
    let after = &e.frame().find("p90").unwrap().node;
    assert!(Rc::ptr_eq(&before, after));
    assert_eq!(e.cache().stats().builds, builds + 5);
    assert!(e.frame().find("p99").is_none());
}

#[test]
fn any_filter_pass_makes_cached_cards_stale() {
    let mut e = engine_with(5);
    e.render().unwrap();
    let old = Rc::clone(&e.frame().find("p2").unwrap().node);
    assert!(e.cache().contains("p2"));

    let same = e.criteria().clone();
    e.apply_criteria(same);
    assert!(e.cache().is_empty());
    e.render().unwrap();
    let fresh = &e.frame().find("p2").unwrap().node;
    assert!(!Rc::ptr_eq(&old, fresh));
    assert_eq!(**fresh, *old);
}

#[test]
fn search_is_debounced_until_input_goes_quiet() {
    let t0 = Instant::now();
    let mut e = engine_with(20);
    e.render().unwrap();

    e.on_search_input("post", t0);
    e.on_search_input("post 1", t0 + Duration::from_millis(120));
    assert!(!e.poll(t0 + Duration::from_millis(250)).unwrap());
    assert_eq!(e.criteria().search_term, "");
    assert_eq!(e.next_deadline(), Some(t0 + Duration::from_millis(320)));

    assert!(e.poll(t0 + Duration::from_millis(320)).unwrap());
    assert_eq!(e.criteria().search_term, "post 1");
    // "post 1" and "post 10".."post 19"
    assert_eq!(e.filtered_len(), 11);
    assert_eq!(e.render_count(), 2);
    assert!(!e.poll(t0 + Duration::from_millis(900)).unwrap());
}

#[test]
fn mutations_refilter_and_reset_vanished_tag_filter() {
    let mut e = engine_with(3);
    let mut tagged = Item::new("t".into(), "", "x", "tagged");
    tagged.tags = vec!["solo".into()];
    e.insert(tagged).unwrap();
    assert!(matches!(
        e.insert(Item::new("t".into(), "", "", "")),
        Err(Error::Validation(_))
    ));
    assert_eq!(e.available_tags(), ["solo"]);

    e.apply_criteria(ViewCriteria::default().with_tag(TagFilter::Tag("solo".into())));
    assert_eq!(e.filtered_len(), 1);

    e.remove("t").unwrap();
    assert_eq!(e.criteria().tag, TagFilter::All);
    assert_eq!(e.filtered_len(), 3);
    assert!(matches!(e.remove("t"), Err(Error::NotFound(_))));
}

#[test]
fn stats_and_labels() {
    let mut all = items(4);
    all[0].status = Status::Archived;
    let mut e = ViewEngine::new(ViewConfig::default()).unwrap();
    e.set_all(all);
    e.apply_criteria(ViewCriteria::default().with_status(StatusFilter::Only(Status::Archived)));
    let s = e.stats();
    assert_eq!((s.total, s.unread, s.archived, s.showing), (4, 3, 1, 1));
    assert_eq!(e.showing_label(), "Showing 1 post");
    assert_eq!(
        e.last_updated(),
        Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 3, 0).unwrap())
    );
    let filtered: Vec<_> = e.filtered_view().map(|i| i.id.as_str()).collect();
    assert_eq!(filtered, ["p0"]);
}

#[test]
fn load_error_and_notifications() {
    let t0 = Instant::now();
    let mut e = engine_with(0);
    e.show_load_error("");
    assert!(matches!(e.frame(), Frame::Error { message } if message == "Failed to load posts"));
    e.show_load_error("HTTP 404");
    assert!(e.frame().to_html().contains("HTTP 404"));

    e.notify("Failed to delete post", t0);
    assert_eq!(e.notification(t0 + Duration::from_secs(1)), Some("Failed to delete post"));
    assert_eq!(e.notification(t0 + Duration::from_secs(3)), None);
}

#[test]
fn readonly_flavor_renders_link_only_cards() {
    let cfg = ViewConfig {
        mode: ViewFlavor::ReadOnly,
        ..ViewConfig::default()
    };
    let mut e = ViewEngine::new(cfg).unwrap();
    e.set_all(items(2));
    let html = e.render().unwrap().to_html();
    assert!(html.contains("https://x.com/i/status/p1"));
    assert!(!html.contains(r#"data-action="toggle""#));
}

#[test]
fn virtual_html_sizes_the_track() {
    let mut e = engine_with(51);
    e.set_viewport(Viewport::new(0, 360));
    let html = e.render().unwrap().to_html();
    assert!(html.contains("height: 9180px"));
    assert!(html.contains("top: 180px"));
}

#[test]
fn insert_past_threshold_then_scroll_renders_a_window() {
    let t0 = Instant::now();
    let mut e = engine_with(50);
    e.render().unwrap();
    assert_eq!(e.frame().layout(), Some(Layout::Flow));

    let mut newest = Item::new("fresh".into(), "", "author", "just saved");
    newest.saved_at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    e.insert(newest).unwrap();
    assert!(!e.frame_is_current());

    assert!(e.on_scroll(0, 900, t0).unwrap());
    assert!(e.frame().is_virtual());
    assert_eq!(e.window(), Some(Window { start: 0, end: 15 }));
    assert_eq!(e.frame().placed()[0].node.id, "fresh");
}

#[test]
fn placeholders_are_escaped() {
    let cfg = ViewConfig {
        empty_placeholder: "<b>nothing</b>".into(),
        no_results_placeholder: "a & b".into(),
        ..ViewConfig::default()
    };
    let mut e = ViewEngine::new(cfg.clone()).unwrap();
    let html = e.render().unwrap().to_html();
    assert!(html.contains("&lt;b&gt;nothing&lt;/b&gt;"));

    let mut e = ViewEngine::new(cfg).unwrap();
    e.set_all(items(2));
    e.apply_criteria(ViewCriteria::default().with_search("zzz"));
    let html = e.render().unwrap().to_html();
    assert!(html.contains("a &amp; b"));
}
