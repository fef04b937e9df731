//! Scrolling view offset

use glam::Vec2;

use super::rect::Rect;

/// Screen-space translation that keeps a target centered without showing
/// anything past the map edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Added to world positions to get screen positions (always <= 0)
    pub offset: Vec2,
    pub screen: Vec2,
}

impl Camera {
    pub fn new(screen: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            screen,
        }
    }

    /// Re-center on `target_center`, clamped so the view stays on a `map_size` map
    pub fn update(&mut self, target_center: Vec2, map_size: Vec2) {
        let centered = self.screen * 0.5 - target_center;
        let upper = centered.min(Vec2::ZERO);
        // Maps smaller than the screen pin to the top-left
        let lower = -(map_size - self.screen).max(Vec2::ZERO);
        self.offset = upper.max(lower);
    }

    /// Rectangle translated into screen space
    #[inline]
    pub fn apply(&self, rect: &Rect) -> Rect {
        rect.translated(self.offset)
    }

    /// Whether any part of a screen-space rectangle is visible
    pub fn is_visible(&self, screen_rect: &Rect) -> bool {
        screen_rect.overlaps(&Rect::from_min_size(Vec2::ZERO, self.screen))
    }
}
