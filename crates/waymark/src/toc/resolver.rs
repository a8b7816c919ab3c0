//! Active-section resolution.
//!
//! The active section is the last heading whose top lies at or above a probe
//! line placed a fixed fraction of the viewport below the scroll position.
//! Near the very top of the page the first heading always wins.

/// Tunables for [`resolve_active`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverParams {
    /// Scroll offsets at or below this resolve to the first heading.
    pub top_snap: f64,
    /// Probe line offset as a fraction of the viewport height.
    pub probe_ratio: f64,
}

impl Default for ResolverParams {
    fn default() -> Self {
        Self {
            top_snap: 10.0,
            probe_ratio: 0.15,
        }
    }
}

/// The probe line in page coordinates.
pub fn probe_line(scroll_y: f64, viewport_height: f64, probe_ratio: f64) -> f64 {
    scroll_y + viewport_height * probe_ratio
}

/// Pick the active heading.
///
/// `tops` are heading tops in page coordinates, in ascending document order.
/// Returns an index into `tops`, or `None` when there are no headings.
pub fn resolve_active(
    tops: &[f64],
    scroll_y: f64,
    viewport_height: f64,
    params: ResolverParams,
) -> Option<usize> {
    if tops.is_empty() {
        return None;
    }
    if scroll_y <= params.top_snap {
        return Some(0);
    }
    let probe = probe_line(scroll_y, viewport_height, params.probe_ratio);
    Some(tops.iter().rposition(|&top| top <= probe).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPS: [f64; 3] = [0.0, 1200.0, 3000.0];

    fn resolve(scroll_y: f64) -> Option<usize> {
        resolve_active(&TOPS, scroll_y, 800.0, ResolverParams::default())
    }

    #[test]
    fn test_top_snap() {
        assert_eq!(resolve(0.0), Some(0));
        assert_eq!(resolve(10.0), Some(0));
    }

    #[test]
    fn test_probe_line() {
        assert_eq!(probe_line(1150.0, 800.0, 0.15), 1270.0);
        // Probe at 1270 is past the second heading.
        assert_eq!(resolve(1150.0), Some(1));
        assert_eq!(resolve(2000.0), Some(1));
        // Probe at 3000 exactly reaches the third heading.
        assert_eq!(resolve(2880.0), Some(2));
    }

    #[test]
    fn test_no_heading_above_probe_falls_back_to_first() {
        let tops = [500.0, 900.0];
        assert_eq!(resolve_active(&tops, 20.0, 800.0, ResolverParams::default()), Some(0));
    }

    #[test]
    fn test_empty() {
        assert_eq!(resolve_active(&[], 500.0, 800.0, ResolverParams::default()), None);
    }
}
