//! Row-level smooth scroll with exponential ease-out.
//!
//! When the logical scroll position jumps, the visible position stays where
//! it was and a row displacement is injected instead.  Each tick the
//! displacement decays toward zero, so the list glides to its new position.
//! A new jump while one is still settling starts from wherever the list is
//! currently drawn, which is what makes later scroll commands supersede
//! earlier ones.

/// Row-offset smooth scroll animator.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    /// Visible position minus logical position, in rows.
    row_offset: f64,
    /// Damping: `offset *= (1 - speed)` each tick.
    speed: f64,
    /// Largest displacement kept after a jump; longer jumps snap the rest.
    max_travel: f64,
}

impl SmoothScroll {
    pub fn new(speed: f64, max_travel: usize) -> Self {
        Self {
            row_offset: 0.0,
            speed: speed.clamp(0.05, 0.95),
            max_travel: max_travel.max(1) as f64,
        }
    }

    /// The logical position moved from `from` to `to`.
    pub fn retarget(&mut self, from: usize, to: usize) {
        let offset = self.row_offset + from as f64 - to as f64;
        self.row_offset = offset.clamp(-self.max_travel, self.max_travel);
    }

    /// Drop any displacement (user-driven scrolling is immediate).
    pub fn settle(&mut self) {
        self.row_offset = 0.0;
    }

    /// Decay the offset toward zero.  Call once per frame.
    pub fn tick(&mut self) {
        self.row_offset *= 1.0 - self.speed;
        if self.row_offset.abs() < 0.4 {
            self.row_offset = 0.0;
        }
    }

    /// Current row displacement (integer rows).
    pub fn row_offset(&self) -> isize {
        self.row_offset.round() as isize
    }

    pub fn is_animating(&self) -> bool {
        self.row_offset != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_keeps_visible_position_then_settles() {
        let mut s = SmoothScroll::new(0.5, 100);
        s.retarget(10, 30);
        assert_eq!(s.row_offset(), -20);

        for _ in 0..20 {
            s.tick();
        }
        assert!(!s.is_animating());
    }

    #[test]
    fn second_jump_starts_from_drawn_position() {
        let mut s = SmoothScroll::new(0.5, 100);
        s.retarget(0, 40);
        s.tick(); // drawn at 40 - 20 = 20
        s.retarget(40, 10);
        // Still drawn at row 20, now relative to 10.
        assert_eq!(s.row_offset(), 10);
    }

    #[test]
    fn long_jumps_are_capped() {
        let mut s = SmoothScroll::new(0.3, 8);
        s.retarget(0, 500);
        assert_eq!(s.row_offset(), -8);
        s.settle();
        assert!(!s.is_animating());
    }
}
