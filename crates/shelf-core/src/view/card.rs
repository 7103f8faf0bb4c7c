//! Rendered representation of a single item.

use crate::{Item, ItemId, Status};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Which view a card belongs to. Resolved once when the engine is built; each
/// flavor has a fixed action set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewFlavor {
    /// The editable library.
    #[default]
    #[serde(rename = "full")]
    Interactive,
    /// The published mirror: browse and open only.
    #[serde(rename = "readonly")]
    ReadOnly,
}

impl ViewFlavor {
    pub fn actions(self) -> &'static [ActionKind] {
        match self {
            ViewFlavor::Interactive => &[
                ActionKind::Open,
                ActionKind::Edit,
                ActionKind::Toggle,
                ActionKind::Delete,
            ],
            ViewFlavor::ReadOnly => &[ActionKind::OpenLink],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Open,
    Edit,
    Toggle,
    Delete,
    OpenLink,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Open | ActionKind::OpenLink => "open",
            ActionKind::Edit => "edit",
            ActionKind::Toggle => "toggle",
            ActionKind::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub kind: ActionKind,
    pub label: String,
    pub title: String,
    /// Status the toggle moves the item to.
    pub intent: Option<Status>,
    /// Escaped target for link actions.
    pub href: Option<String>,
}

impl ActionButton {
    fn new(kind: ActionKind, label: &str, title: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
            title: title.to_string(),
            intent: None,
            href: None,
        }
    }

    fn toggle(status: Status) -> Self {
        let mut b = Self::new(ActionKind::Toggle, "", "");
        b.retarget(status);
        b
    }

    /// Points a toggle button at the status opposite to `current`.
    pub(crate) fn retarget(&mut self, current: Status) {
        let (label, title) = match current {
            Status::Archived => ("Unread", "Mark Unread"),
            Status::Unread => ("Archive", "Archive"),
        };
        self.label = label.to_string();
        self.title = title.to_string();
        self.intent = Some(current.toggled());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub class: String,
    pub label: String,
}

impl StatusBadge {
    pub fn for_status(status: Status) -> Self {
        let label = match status {
            Status::Unread => "Unread",
            Status::Archived => "Archived",
        };
        Self {
            class: format!("status-badge {}", status.as_str()),
            label: label.to_string(),
        }
    }
}

pub const CARD_CLASS: &str = "post-card";
pub const NO_TEXT_PLACEHOLDER: &str = "<em>No text content</em>";

pub(crate) fn card_class(status: Status) -> String {
    match status {
        Status::Archived => format!("{CARD_CLASS} archived"),
        Status::Unread => CARD_CLASS.to_string(),
    }
}

/// A materialized card. All user-supplied text is stored already escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItem {
    pub id: ItemId,
    pub class: String,
    pub badge: StatusBadge,
    pub author: String,
    pub author_href: String,
    pub saved_date: String,
    pub text: String,
    pub tags: Vec<String>,
    pub note: Option<String>,
    pub actions: Vec<ActionButton>,
}

impl RenderedItem {
    pub fn build(item: &Item, flavor: ViewFlavor) -> Self {
        let handle = if item.author.is_empty() {
            "unknown"
        } else {
            item.author.as_str()
        };
        let author = escape_html(handle);
        let text = if item.text.is_empty() {
            NO_TEXT_PLACEHOLDER.to_string()
        } else {
            escape_html(&item.text)
        };
        let actions = flavor
            .actions()
            .iter()
            .map(|&kind| match kind {
                ActionKind::Open => ActionButton::new(kind, "Open", "Open Post"),
                ActionKind::Edit => ActionButton::new(kind, "Edit", "Edit"),
                ActionKind::Toggle => ActionButton::toggle(item.status),
                ActionKind::Delete => ActionButton::new(kind, "Delete", "Delete"),
                ActionKind::OpenLink => {
                    let url = if item.url.is_empty() {
                        format!("https://x.com/i/status/{}", item.id)
                    } else {
                        item.url.clone()
                    };
                    let mut b = ActionButton::new(kind, "Open Post", "Open Post");
                    b.href = Some(escape_html(&url));
                    b
                }
            })
            .collect();
        Self {
            id: item.id.clone(),
            class: card_class(item.status),
            badge: StatusBadge::for_status(item.status),
            author_href: format!("https://x.com/{author}"),
            author,
            saved_date: item.saved_at.format("%b %-d, %Y").to_string(),
            text,
            tags: item.tags.iter().map(|t| escape_html(t)).collect(),
            note: (!item.note.is_empty()).then(|| escape_html(&item.note)),
            actions,
        }
    }

    pub fn toggle_button(&self) -> Option<&ActionButton> {
        self.actions.iter().find(|a| a.kind == ActionKind::Toggle)
    }

    pub fn is_archived(&self) -> bool {
        self.class.split_whitespace().any(|c| c == "archived")
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out, None);
        out
    }

    /// Appends the card markup; `style` lands on the outer element.
    pub fn write_html(&self, out: &mut String, style: Option<&str>) {
        let _ = write!(
            out,
            r#"<div class="{}" data-item-id="{}""#,
            self.class,
            escape_html(&self.id)
        );
        if let Some(style) = style {
            let _ = write!(out, r#" style="{style}""#);
        }
        out.push('>');
        let _ = write!(
            out,
            r#"<div class="post-header"><div class="post-author"><a href="{}" target="_blank" rel="noopener noreferrer">@{}</a><span class="{}">{}</span></div><div class="post-date">{}</div></div>"#,
            self.author_href, self.author, self.badge.class, self.badge.label, self.saved_date
        );
        let _ = write!(out, r#"<div class="post-text">{}</div>"#, self.text);
        if !self.tags.is_empty() {
            out.push_str(r#"<div class="post-tags">"#);
            for t in &self.tags {
                let _ = write!(out, r#"<span class="tag">{t}</span>"#);
            }
            out.push_str("</div>");
        }
        if let Some(note) = &self.note {
            let _ = write!(
                out,
                r#"<div class="post-note"><strong>Note:</strong> {note}</div>"#
            );
        }
        out.push_str(r#"<div class="post-actions">"#);
        for a in &self.actions {
            match &a.href {
                Some(href) => {
                    let _ = write!(
                        out,
                        r#"<a href="{href}" target="_blank" rel="noopener noreferrer" class="action-btn {}-btn">{}</a>"#,
                        a.kind.as_str(),
                        a.label
                    );
                }
                None => {
                    let _ = write!(
                        out,
                        r#"<button class="action-btn {kind}-btn" title="{}" data-action="{kind}">{}</button>"#,
                        a.title,
                        a.label,
                        kind = a.kind.as_str()
                    );
                }
            }
        }
        out.push_str("</div></div>");
    }
}

/// Escapes text for use in markup and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
