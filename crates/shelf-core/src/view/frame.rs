use super::card::{escape_html, RenderedItem};
use super::window::Window;
use std::fmt::Write as _;
use std::rc::Rc;

/// A card placed in the output, at `index` of the ordered view.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub index: usize,
    /// Absolute top offset in pixels; `None` in flow layout.
    pub top: Option<u64>,
    pub node: Rc<RenderedItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Every item, in document order.
    Flow,
    /// Only `window` is materialized inside a track of `track_height` pixels.
    Absolute { track_height: u64, window: Window },
}

/// What the list container currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Frame {
    /// Nothing rendered yet.
    #[default]
    Blank,
    /// The collection is empty.
    Empty { placeholder: String },
    /// Items exist but none pass the filter.
    NoMatch { placeholder: String },
    /// Loading the collection failed.
    Error { message: String },
    Populated { layout: Layout, items: Vec<Placed> },
}

impl Frame {
    pub fn placed(&self) -> &[Placed] {
        match self {
            Frame::Populated { items, .. } => items,
            _ => &[],
        }
    }

    pub fn find(&self, id: &str) -> Option<&Placed> {
        self.placed().iter().find(|p| p.node.id == id)
    }

    pub(crate) fn find_mut(&mut self, id: &str) -> Option<&mut Placed> {
        match self {
            Frame::Populated { items, .. } => items.iter_mut().find(|p| p.node.id == id),
            _ => None,
        }
    }

    pub fn layout(&self) -> Option<Layout> {
        match self {
            Frame::Populated { layout, .. } => Some(*layout),
            _ => None,
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self.layout(), Some(Layout::Absolute { .. }))
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        match self {
            Frame::Blank => {}
            Frame::Empty { placeholder } => {
                let _ = write!(
                    out,
                    r#"<div class="empty-state">{}</div>"#,
                    escape_html(placeholder)
                );
            }
            Frame::NoMatch { placeholder } => {
                let _ = write!(
                    out,
                    r#"<div class="no-results">{}</div>"#,
                    escape_html(placeholder)
                );
            }
            Frame::Error { message } => {
                let _ = write!(out, r#"<div class="error">{}</div>"#, escape_html(message));
            }
            Frame::Populated { layout, items } => match layout {
                Layout::Flow => {
                    out.push_str(r#"<div class="posts">"#);
                    for p in items {
                        p.node.write_html(&mut out, None);
                    }
                    out.push_str("</div>");
                }
                Layout::Absolute { track_height, .. } => {
                    let _ = write!(
                        out,
                        r#"<div class="posts" style="position: relative; height: {track_height}px">"#
                    );
                    for p in items {
                        let style = format!(
                            "position: absolute; top: {}px; left: 0; right: 0",
                            p.top.unwrap_or_default()
                        );
                        p.node.write_html(&mut out, Some(&style));
                    }
                    out.push_str("</div>");
                }
            },
        }
        out
    }
}
