//! Overlay specifications: `<2->`, `<1,3-4>`, `<-3>`
//!
//! An overlay specification restricts content to a set of passes. The parsed
//! form is an [`OverlaySet`] of explicit pass numbers plus "open" markers
//! encoded as negative numbers: `-n` means "visible on every pass after `n`".
//!
//! ```
//! use beamer_passes::overlay::{OverlaySet, parse, visible, max_overlay};
//!
//! let set = parse("1,2-3,4-");
//! assert_eq!(set.as_slice(), &[-4, 1, 2, 3, 4]);
//! assert!(visible(&set, 100));
//! assert!(!visible(&set, 0));
//! assert_eq!(max_overlay(&set), 4);
//! assert_eq!(max_overlay(&OverlaySet::new()), 1);
//! ```

use std::sync::OnceLock;

use compact_str::CompactString;
use smallvec::SmallVec;

/// Closed ranges longer than this are dropped instead of expanded.
pub const MAX_OVERLAY_SPAN: i32 = 1024;

// =============================================================================
// OverlaySet
// =============================================================================

/// Parsed overlay specification.
///
/// Sorted and deduplicated. Empty means "visible on every pass".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OverlaySet {
    items: SmallVec<[i32; 8]>,
}

impl OverlaySet {
    /// Create an empty set (visible everywhere).
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pass number or open marker.
    pub fn insert(&mut self, value: i32) {
        if let Err(pos) = self.items.binary_search(&value) {
            self.items.insert(pos, value);
        }
    }

    /// Check membership.
    pub fn contains(&self, value: i32) -> bool {
        self.items.binary_search(&value).is_ok()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Members in ascending order (open markers first).
    pub fn as_slice(&self) -> &[i32] {
        &self.items
    }

    /// Iterate over members.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.items.iter().copied()
    }

    /// Check visibility on a pass. See [`visible`].
    #[inline]
    pub fn is_visible(&self, pass: usize) -> bool {
        visible(self, pass)
    }

    /// Largest referenced bound. See [`max_overlay`].
    #[inline]
    pub fn max_bound(&self) -> usize {
        max_overlay(self)
    }
}

impl FromIterator<i32> for OverlaySet {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

// =============================================================================
// Parsing and evaluation
// =============================================================================

/// Parse an overlay specification.
///
/// Items are comma separated:
/// - `N`: only pass N
/// - `N-`: pass N and onward, stored as `{N, -N}`
/// - `-N`: stored as `{N}`
/// - `A-B`: closed range; when `B < A` only the open marker `-A` is kept
///
/// Malformed items are dropped.
pub fn parse(spec: &str) -> OverlaySet {
    let mut set = OverlaySet::new();

    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if !parse_item(part, &mut set) {
            log::debug!("ignoring malformed overlay item {part:?} in <{spec}>");
        }
    }

    set
}

fn parse_item(part: &str, set: &mut OverlaySet) -> bool {
    if !part.contains('-') {
        return match part.parse::<i32>() {
            Ok(number) => {
                set.insert(number);
                true
            }
            Err(_) => false,
        };
    }

    if let Some(rest) = part.strip_prefix('-') {
        return match rest.trim().parse::<i32>() {
            Ok(number) if number > 0 => {
                set.insert(number);
                true
            }
            _ => false,
        };
    }

    if let Some(rest) = part.strip_suffix('-') {
        return match rest.trim().parse::<i32>() {
            Ok(number) if number > 0 => {
                set.insert(number);
                set.insert(-number);
                true
            }
            _ => false,
        };
    }

    let bounds: SmallVec<[&str; 2]> = part
        .split('-')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();
    if bounds.len() != 2 {
        return false;
    }

    let (Ok(a), Ok(b)) = (bounds[0].parse::<i32>(), bounds[1].parse::<i32>()) else {
        return false;
    };

    if b < a {
        set.insert(-a);
        return true;
    }
    if b - a > MAX_OVERLAY_SPAN {
        return false;
    }

    for pass in a..=b {
        set.insert(pass);
    }
    true
}

/// Check if content with this overlay set is visible on `pass`.
///
/// True if the set is empty, contains `pass`, or contains an open marker
/// `-m` with `m < pass`.
pub fn visible(set: &OverlaySet, pass: usize) -> bool {
    if set.is_empty() {
        return true;
    }

    let Ok(pass) = i32::try_from(pass) else {
        // beyond any representable bound: only open markers can match
        return set.iter().any(|v| v < 0);
    };

    set.contains(pass) || set.iter().any(|v| v < 0 && -v < pass)
}

/// Largest bound referenced by the set, or 1 if empty.
pub fn max_overlay(set: &OverlaySet) -> usize {
    set.iter()
        .map(|v| v.unsigned_abs() as usize)
        .max()
        .unwrap_or(1)
        .max(1)
}

// =============================================================================
// Overlay (memoized specification)
// =============================================================================

/// Overlay specification attached to a node, parsed on first use.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    spec: CompactString,
    set: OnceLock<OverlaySet>,
}

impl Overlay {
    /// Create from a raw specification string (without angle brackets).
    pub fn new(spec: impl Into<CompactString>) -> Self {
        Self {
            spec: spec.into(),
            set: OnceLock::new(),
        }
    }

    /// Raw specification.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Check if no overlay was given.
    pub fn is_unrestricted(&self) -> bool {
        self.set().is_empty()
    }

    /// Parsed set.
    pub fn set(&self) -> &OverlaySet {
        self.set.get_or_init(|| parse(&self.spec))
    }

    /// Check visibility on a pass.
    pub fn is_visible(&self, pass: usize) -> bool {
        visible(self.set(), pass)
    }

    /// Largest referenced bound (1 if unrestricted).
    pub fn max_bound(&self) -> usize {
        max_overlay(self.set())
    }
}

impl From<&str> for Overlay {
    fn from(spec: &str) -> Self {
        Self::new(spec)
    }
}

impl PartialEq for Overlay {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_visible_everywhere() {
        let set = parse("");
        assert!(set.is_empty());
        for pass in 1..50 {
            assert!(visible(&set, pass));
        }
        assert!(visible(&parse("   "), 7));
    }

    #[test]
    fn test_mixed_items() {
        let set = parse("1,2-3,4-");
        assert_eq!(set.as_slice(), &[-4, 1, 2, 3, 4]);
        for pass in [1, 2, 3, 4, 5, 100] {
            assert!(visible(&set, pass), "pass {pass}");
        }
        assert!(!visible(&set, 0));
        assert_eq!(max_overlay(&set), 4);
    }

    #[test]
    fn test_single_and_gaps() {
        let set = parse("1,3-4");
        assert!(visible(&set, 1));
        assert!(!visible(&set, 2));
        assert!(visible(&set, 3));
        assert!(visible(&set, 4));
        assert!(!visible(&set, 5));
    }

    #[test]
    fn test_leading_dash_is_kept_symmetrically() {
        let set = parse("-3");
        assert_eq!(set.as_slice(), &[3]);
        assert!(visible(&set, 3));
        assert!(!visible(&set, 2));
    }

    #[test]
    fn test_reversed_range_keeps_open_marker() {
        let set = parse("5-3");
        assert_eq!(set.as_slice(), &[-5]);
        assert!(!visible(&set, 5));
        assert!(visible(&set, 6));
        assert_eq!(max_overlay(&set), 5);
    }

    #[test]
    fn test_malformed_items_are_dropped() {
        let set = parse("a, 2, -, 1-2-3, x-, 0-, 4");
        assert_eq!(set.as_slice(), &[2, 4]);
    }

    #[test]
    fn test_huge_range_is_dropped() {
        let set = parse("1-100000,7");
        assert_eq!(set.as_slice(), &[7]);
    }

    #[test]
    fn test_whitespace_tolerance() {
        let set = parse(" 2 - 3 , 5 - ");
        assert_eq!(set.as_slice(), &[-5, 2, 3, 5]);
    }

    #[test]
    fn test_memoized_overlay() {
        let overlay = Overlay::new("2-");
        assert!(!overlay.is_visible(1));
        assert!(overlay.is_visible(2));
        assert!(overlay.is_visible(9));
        assert_eq!(overlay.max_bound(), 2);
        assert!(Overlay::default().is_unrestricted());
    }
}
