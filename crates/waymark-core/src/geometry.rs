//! Layout boxes and viewport metrics.
//!
//! Element layout is stored in *document* coordinates (as if nothing were
//! scrolled). Viewport-relative boxes, the equivalent of a browser's
//! `getBoundingClientRect()`, are derived from them by subtracting the page
//! scroll offset and the scroll offsets of enclosing scroll containers.

/// Root font size assumed when the host reports none.
pub const DEFAULT_ROOT_FONT_SIZE: f64 = 16.0;

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from position and size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top edge.
    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge.
    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Return a copy shifted by the given offsets.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Whether this rectangle lies vertically within `outer` (edges inclusive).
    pub fn is_vertically_within(&self, outer: &Rect) -> bool {
        self.top() >= outer.top() && self.bottom() <= outer.bottom()
    }

    /// Whether this rectangle overlaps the vertical band `[top, bottom]`.
    ///
    /// Zero-height rectangles count as overlapping when they touch the band.
    pub fn overlaps_band(&self, top: f64, bottom: f64) -> bool {
        if self.height <= 0.0 {
            self.top() >= top && self.top() <= bottom
        } else {
            self.top() < bottom && self.bottom() > top
        }
    }
}

/// Window metrics that the navigation controllers read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// `window.innerWidth` in device pixels.
    pub inner_width: f64,
    /// `window.innerHeight` in device pixels.
    pub inner_height: f64,
    /// `window.outerWidth` in device pixels.
    pub outer_width: f64,
    /// Vertical page scroll offset (`window.scrollY`).
    pub scroll_y: f64,
    /// Computed font size of the root element, in pixels.
    pub root_font_size: f64,
}

impl Viewport {
    /// Create a viewport of the given size, unscrolled, with the default root font size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            inner_width: width,
            inner_height: height,
            outer_width: width,
            scroll_y: 0.0,
            root_font_size: DEFAULT_ROOT_FONT_SIZE,
        }
    }

    /// Set the scroll offset using builder pattern.
    pub fn with_scroll_y(mut self, scroll_y: f64) -> Self {
        self.scroll_y = scroll_y;
        self
    }

    /// Set the root font size using builder pattern.
    pub fn with_root_font_size(mut self, size: f64) -> Self {
        self.root_font_size = size;
        self
    }

    /// Inner width expressed in root-font-size units (`rem`/`em` at the root).
    pub fn width_in_root_units(&self) -> f64 {
        let font_size = if self.root_font_size > 0.0 {
            self.root_font_size
        } else {
            DEFAULT_ROOT_FONT_SIZE
        };
        self.inner_width / font_size
    }

    /// The visible area in viewport coordinates.
    pub fn client_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.inner_width, self.inner_height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}
