pub mod dialog;
pub mod editor;
pub mod help;
pub mod note;
pub mod search;
pub mod status_bar;
pub mod tree;

use ratatui::layout::Rect;

/// A `width` x `height` rect centred in `area`, clipped to it.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    Rect::new(x, y, w, h)
}
