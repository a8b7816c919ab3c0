//! Intersection observation.
//!
//! [`RootMargin`] parses the CSS `rootMargin` shorthand handed to the
//! browser's `IntersectionObserver`. [`IntersectionWatcher`] reproduces the
//! observer's notifications headlessly from recorded layout, so the tracker
//! behaves the same with or without a browser behind it.

use std::fmt;
use std::str::FromStr;

use slotmap::SecondaryMap;
use waymark_core::{Document, ElementId, IntersectionEntry, Viewport};

use crate::config::ConfigError;

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginLength {
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the root's height (vertical sides) or width (horizontal).
    Percent(f64),
}

impl MarginLength {
    /// Resolve against the root dimension along this side's axis.
    pub fn resolve(self, basis: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(percent) => basis * percent / 100.0,
        }
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{px}px"),
            Self::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}

/// A parsed `rootMargin` value (top, right, bottom, left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    /// The vertical band, in viewport coordinates, that the margin carves out
    /// of a viewport.
    pub fn band(&self, viewport: &Viewport) -> IntersectionBand {
        let height = viewport.inner_height;
        IntersectionBand {
            top: -self.top.resolve(height),
            bottom: height + self.bottom.resolve(height),
        }
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self {
            top: MarginLength::Px(0.0),
            right: MarginLength::Px(0.0),
            bottom: MarginLength::Px(0.0),
            left: MarginLength::Px(0.0),
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

impl FromStr for RootMargin {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |message: String| ConfigError::InvalidRootMargin {
            value: value.to_string(),
            message,
        };

        let lengths = value
            .split_whitespace()
            .map(|token| parse_length(token).ok_or_else(|| invalid(format!("bad length '{token}'"))))
            .collect::<Result<Vec<_>, _>>()?;

        // CSS margin shorthand expansion.
        let (top, right, bottom, left) = match lengths.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            other => {
                return Err(invalid(format!(
                    "expected 1 to 4 lengths, found {}",
                    other.len()
                )));
            }
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

fn parse_length(token: &str) -> Option<MarginLength> {
    if let Some(number) = token.strip_suffix('%') {
        return number.parse().ok().filter(|n: &f64| n.is_finite()).map(MarginLength::Percent);
    }
    if let Some(number) = token.strip_suffix("px") {
        return number.parse().ok().filter(|n: &f64| n.is_finite()).map(MarginLength::Px);
    }
    // Unitless zero is the only bare number CSS accepts here.
    match token.parse::<f64>() {
        Ok(n) if n == 0.0 => Some(MarginLength::Px(0.0)),
        _ => None,
    }
}

/// A vertical band in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionBand {
    pub top: f64,
    pub bottom: f64,
}

impl IntersectionBand {
    /// Whether `target` intersects the band, and the visible fraction of it.
    pub fn measure(&self, doc: &Document, target: ElementId, viewport: &Viewport) -> Option<(bool, f64)> {
        let rect = doc.client_rect(target, viewport)?;
        if !rect.overlaps_band(self.top, self.bottom) {
            return Some((false, 0.0));
        }
        if rect.height <= 0.0 {
            return Some((true, 1.0));
        }
        let visible = rect.bottom().min(self.bottom) - rect.top().max(self.top);
        Some((true, (visible / rect.height).clamp(0.0, 1.0)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ObservedState {
    intersecting: bool,
    bucket: usize,
}

/// Headless stand-in for an `IntersectionObserver`.
///
/// [`compute`](Self::compute) reports only targets whose intersecting state or
/// threshold bucket changed since the previous call. The first call after
/// [`observe`](Self::observe) reports every target.
#[derive(Debug, Clone, Default)]
pub struct IntersectionWatcher {
    margin: RootMargin,
    thresholds: Vec<f64>,
    targets: Vec<ElementId>,
    states: SecondaryMap<ElementId, ObservedState>,
}

impl IntersectionWatcher {
    /// Create a watcher with a root margin and sorted thresholds.
    pub fn new(margin: RootMargin, thresholds: &[f64]) -> Self {
        let mut thresholds = thresholds.to_vec();
        if thresholds.is_empty() {
            thresholds.push(0.0);
        }
        thresholds.sort_by(f64::total_cmp);
        thresholds.dedup();
        Self {
            margin,
            thresholds,
            targets: Vec::new(),
            states: SecondaryMap::new(),
        }
    }

    /// The root margin.
    pub fn margin(&self) -> RootMargin {
        self.margin
    }

    /// The thresholds, ascending.
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Start observing `targets`, replacing any previous set.
    pub fn observe(&mut self, targets: impl IntoIterator<Item = ElementId>) {
        self.targets = targets.into_iter().collect();
        self.states.clear();
    }

    /// Observed elements in observation order.
    pub fn targets(&self) -> &[ElementId] {
        &self.targets
    }

    /// Stop observing everything.
    pub fn disconnect(&mut self) {
        self.targets.clear();
        self.states.clear();
    }

    /// Measure every target and report the ones that changed.
    pub fn compute(&mut self, doc: &Document, viewport: &Viewport) -> Vec<IntersectionEntry> {
        let band = self.margin.band(viewport);
        let mut changed = Vec::new();
        for &target in &self.targets {
            let Some((intersecting, ratio)) = band.measure(doc, target, viewport) else {
                continue;
            };
            let state = ObservedState {
                intersecting,
                bucket: self.bucket(intersecting, ratio),
            };
            if self.states.get(target) == Some(&state) {
                continue;
            }
            self.states.insert(target, state);
            changed.push(IntersectionEntry {
                target,
                is_intersecting: intersecting,
                ratio,
            });
        }
        changed
    }

    fn bucket(&self, intersecting: bool, ratio: f64) -> usize {
        if !intersecting {
            return 0;
        }
        // An intersecting target always sits above the zero threshold.
        self.thresholds
            .iter()
            .filter(|&&threshold| ratio >= threshold)
            .count()
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::{Rect, el};

    #[test]
    fn test_parse_shorthand() {
        let margin: RootMargin = "-10% 0px -85% 0px".parse().unwrap();
        assert_eq!(margin.top, MarginLength::Percent(-10.0));
        assert_eq!(margin.bottom, MarginLength::Percent(-85.0));
        assert_eq!(margin.left, MarginLength::Px(0.0));

        let margin: RootMargin = "5px 0".parse().unwrap();
        assert_eq!(margin.bottom, MarginLength::Px(5.0));
        assert_eq!(margin.right, MarginLength::Px(0.0));

        let margin: RootMargin = "1px 2px 3px".parse().unwrap();
        assert_eq!(margin.left, MarginLength::Px(2.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "-10% sideways".parse::<RootMargin>(),
            Err(ConfigError::InvalidRootMargin { .. })
        ));
        assert!("".parse::<RootMargin>().is_err());
        assert!("1px 1px 1px 1px 1px".parse::<RootMargin>().is_err());
        assert!("12".parse::<RootMargin>().is_err());
    }

    #[test]
    fn test_band_from_default_margin() {
        let margin: RootMargin = "-10% 0px -85% 0px".parse().unwrap();
        let band = margin.band(&Viewport::new(1280.0, 800.0));
        assert_eq!(band.top, 80.0);
        assert_eq!(band.bottom, 120.0);
    }

    #[test]
    fn test_watcher_reports_changes_only() {
        let mut doc = Document::new();
        let body = doc.body();
        let heading = doc.mount(body, el("h2").id("setup").layout(Rect::new(0.0, 1200.0, 600.0, 40.0)));

        let margin: RootMargin = "-10% 0px -85% 0px".parse().unwrap();
        let mut watcher = IntersectionWatcher::new(margin, &[0.1, 0.0]);
        assert_eq!(watcher.thresholds(), &[0.0, 0.1]);
        watcher.observe([heading]);

        let top = Viewport::new(1280.0, 800.0);
        let first = watcher.compute(&doc, &top);
        assert_eq!(first.len(), 1);
        assert!(!first[0].is_intersecting);
        assert!(watcher.compute(&doc, &top).is_empty());

        // Band covers page 1200..1240 at scroll 1120.
        let scrolled = top.with_scroll_y(1120.0);
        let entries = watcher.compute(&doc, &scrolled);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_intersecting);
        assert_eq!(entries[0].ratio, 1.0);
    }
}
