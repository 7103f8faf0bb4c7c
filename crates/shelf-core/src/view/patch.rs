//! In-place status patch for a card that is already on screen.

use super::cache::RenderCache;
use super::card::{card_class, ActionKind, RenderedItem, StatusBadge};
use super::frame::Frame;
use crate::{FieldUpdate, Status};
use std::rc::Rc;

/// Flips the status marker, badge, and toggle button of `node`. Text, author,
/// tags and note are left as they are.
pub fn apply_status(node: &mut RenderedItem, status: Status) {
    node.class = card_class(status);
    node.badge = StatusBadge::for_status(status);
    for a in node.actions.iter_mut().filter(|a| a.kind == ActionKind::Toggle) {
        a.retarget(status);
    }
}

/// Patches the placed card for `id`. Returns `false` when the card is not in
/// `frame` or `changes` holds anything besides a status, in which case the
/// caller re-filters and re-renders.
///
/// The cache entry is retired so the next full build starts fresh; the placed
/// card stays visible.
pub(crate) fn patch(frame: &mut Frame, cache: &mut RenderCache, id: &str, changes: &FieldUpdate) -> bool {
    let Some(status) = changes.status.filter(|_| changes.is_status_only()) else {
        return false;
    };
    let Some(placed) = frame.find_mut(id) else {
        return false;
    };
    cache.invalidate(id);
    apply_status(Rc::make_mut(&mut placed.node), status);
    true
}
