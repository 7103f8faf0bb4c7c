//! `shelf view`: drives the list view engine without a browser and prints
//! the materialized frame.

use crate::config::Settings;
use crate::{listing_line, FilterArgs, Format};
use anyhow::Result;
use chrono::Utc;
use clap::Args;
use serde_json::{json, Value};
use shelf_core::view::{Frame, Layout, ViewEngine, ViewFlavor, Viewport};
use shelf_core::{xfer, FileStore, Store};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args, Debug)]
pub(crate) struct ViewArgs {
    #[command(flatten)]
    filter: FilterArgs,
    #[arg(long)]
    search: Option<String>,
    /// Scroll offset in pixels from the top of the list
    #[arg(long, default_value_t = 0)]
    scroll: u32,
    /// Viewport height in pixels
    #[arg(long, default_value_t = 900)]
    viewport: u32,
    /// Render link-only cards
    #[arg(long)]
    readonly: bool,
    /// Load a published mirror file instead of the store (implies --readonly)
    #[arg(long, value_name = "PATH")]
    from_mirror: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

pub(crate) fn run(
    args: &ViewArgs,
    settings: &Settings,
    open_store: impl FnOnce() -> Result<FileStore>,
) -> Result<()> {
    let mut cfg = settings.view_config();
    if args.readonly || args.from_mirror.is_some() {
        cfg.mode = ViewFlavor::ReadOnly;
    }
    let mut engine = ViewEngine::new(cfg)?;

    let loaded = match &args.from_mirror {
        Some(path) => match xfer::read_mirror(path, Utc::now()) {
            Ok(parsed) => {
                if parsed.rejected > 0 {
                    tracing::warn!(rejected = parsed.rejected, "mirror entries without an id ignored");
                }
                engine.set_all(parsed.items);
                true
            }
            Err(e) => {
                engine.show_load_error(&format!("Failed to load posts: {e}"));
                false
            }
        },
        None => {
            engine.set_all(open_store()?.list_all()?);
            true
        }
    };

    if loaded {
        let mut criteria = args.filter.criteria()?;
        if let Some(term) = &args.search {
            criteria = criteria.with_search(term.clone());
        }
        engine.apply_criteria(criteria);
        engine.set_viewport(Viewport::new(0, args.viewport));
        engine.render()?;
        if args.scroll > 0 {
            engine.on_scroll(args.scroll, args.viewport, Instant::now())?;
        }
    }

    match args.format {
        Format::Html => println!("{}", engine.frame().to_html()),
        Format::Json => println!("{}", serde_json::to_string_pretty(&frame_json(&engine))?),
        Format::Text => print_text(&engine, args.from_mirror.is_some()),
    }
    Ok(())
}

fn frame_json(engine: &ViewEngine) -> Value {
    let frame = engine.frame();
    let (state, message) = match frame {
        Frame::Blank => ("blank", None),
        Frame::Empty { placeholder } => ("empty", Some(placeholder.as_str())),
        Frame::NoMatch { placeholder } => ("noMatch", Some(placeholder.as_str())),
        Frame::Error { message } => ("error", Some(message.as_str())),
        Frame::Populated { .. } => ("populated", None),
    };
    let (virtualized, track_height) = match frame.layout() {
        Some(Layout::Absolute { track_height, .. }) => (true, Some(track_height)),
        _ => (false, None),
    };
    let items: Vec<Value> = frame
        .placed()
        .iter()
        .map(|p| {
            json!({
                "index": p.index,
                "top": p.top,
                "id": p.node.id,
                "class": p.node.class,
                "status": p.node.badge.label,
            })
        })
        .collect();
    json!({
        "state": state,
        "message": message,
        "showing": engine.showing_label(),
        "stats": engine.stats(),
        "virtualized": virtualized,
        "window": engine.window().map(|w| [w.start, w.end]),
        "trackHeight": track_height,
        "items": items,
    })
}

fn print_text(engine: &ViewEngine, mirror: bool) {
    let frame = engine.frame();
    if mirror {
        if let Some(at) = engine.last_updated() {
            println!("Last updated: {}", at.format("%b %-d, %Y %H:%M"));
        }
    }
    match frame {
        Frame::Blank => {}
        Frame::Empty { placeholder } | Frame::NoMatch { placeholder } => println!("{placeholder}"),
        Frame::Error { message } => println!("{message}"),
        Frame::Populated { .. } => {
            println!("{}", engine.showing_label());
            if let (Some(w), Some(Layout::Absolute { track_height, .. })) =
                (engine.window(), frame.layout())
            {
                println!(
                    "window {}..{} of {} (track {}px)",
                    w.start,
                    w.end,
                    engine.filtered_len(),
                    track_height
                );
            }
            for p in frame.placed() {
                if let Some(item) = engine.get(&p.node.id) {
                    println!("{:>5}\t{}", p.index, listing_line(item));
                }
            }
        }
    }
}
