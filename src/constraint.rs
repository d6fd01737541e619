/// One element of a constraint set: a single value or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Single(i128),
    Range(i128, i128),
}

impl Element {
    /// Build a range element, collapsing a degenerate range to a single.
    #[must_use]
    pub fn range(lo: i128, hi: i128) -> Self {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        if lo == hi { Self::Single(lo) } else { Self::Range(lo, hi) }
    }

    fn bounds(self) -> (i128, i128) {
        match self {
            Self::Single(v) => (v, v),
            Self::Range(lo, hi) => (lo, hi),
        }
    }
}

/// A leading fragment split off an object identifier by a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    /// Elements covered by the constraint
    pub content: &'a [u32],
    /// Unconsumed remainder, possibly empty
    pub rest: &'a [u32],
}

/// A `SIZE(…)` or value-range refinement attached to a type.
///
/// After [`normalize`](Self::normalize), elements are sorted and
/// non-overlapping: touching or overlapping ranges are merged and
/// degenerate ranges become singles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    is_size: bool,
    elements: Vec<Element>,
}

impl Constraint {
    pub fn new(is_size: bool) -> Self {
        Self {
            is_size,
            elements: Vec::new(),
        }
    }

    /// Convenience constructor for an already-normalised element set.
    pub fn with_elements(is_size: bool, elements: Vec<Element>) -> Self {
        let mut constraint = Self { is_size, elements };
        constraint.normalize();
        constraint
    }

    #[must_use]
    pub fn is_size(&self) -> bool {
        self.is_size
    }

    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Merge overlapping ranges and absorb singletons.
    pub fn normalize(&mut self) {
        if self.elements.len() < 2 {
            return;
        }
        self.elements.sort_by_key(|e| e.bounds());
        let mut merged: Vec<Element> = Vec::with_capacity(self.elements.len());
        for element in self.elements.drain(..) {
            let (lo, hi) = element.bounds();
            match merged.last_mut() {
                Some(last) if lo <= last.bounds().1.saturating_add(1) => {
                    let (last_lo, last_hi) = last.bounds();
                    *last = Element::range(last_lo, last_hi.max(hi));
                }
                _ => merged.push(element),
            }
        }
        self.elements = merged;
    }

    #[must_use]
    pub fn contains(&self, value: i128) -> bool {
        self.elements.iter().any(|element| {
            let (lo, hi) = element.bounds();
            lo <= value && value <= hi
        })
    }

    /// The exact length dictated by a fixed-size constraint, if any.
    #[must_use]
    pub fn fixed_size(&self) -> Option<i128> {
        match self.elements.as_slice() {
            [Element::Single(n)] => Some(*n),
            [] if self.is_size => Some(0),
            _ => None,
        }
    }

    /// Split the leading fragment this constraint covers off `oid`.
    ///
    /// A value constraint covers the first element when it is in range.
    /// A fixed `SIZE(n)` covers exactly `n` elements. A ranged size
    /// constraint reads a length prefix: the first element gives the
    /// content length, which must itself satisfy the constraint. Returns
    /// `None` when the identifier is too short or out of range.
    #[must_use]
    pub fn extract<'a>(&self, oid: &'a [u32]) -> Option<Split<'a>> {
        if !self.is_size {
            let first = *oid.first()?;
            if !self.contains(i128::from(first)) {
                return None;
            }
            let (content, rest) = oid.split_at(1);
            return Some(Split { content, rest });
        }
        if let Some(n) = self.fixed_size() {
            let n = usize::try_from(n).ok()?;
            if oid.len() < n {
                return None;
            }
            let (content, rest) = oid.split_at(n);
            return Some(Split { content, rest });
        }
        let length = *oid.first()? as usize;
        if !self.contains(length as i128) || oid.len() < 1 + length {
            return None;
        }
        Some(Split {
            content: &oid[1..1 + length],
            rest: &oid[1 + length..],
        })
    }
}

#[test]
fn normalize_merges_overlaps() {
    let c = Constraint::with_elements(
        false,
        vec![
            Element::range(5, 10),
            Element::Single(7),
            Element::range(11, 12),
            Element::Single(40),
        ],
    );
    assert_eq!(c.elements(), &[Element::Range(5, 12), Element::Single(40)]);
    assert!(c.contains(11));
    assert!(!c.contains(13));
}

#[test]
fn value_constraint_takes_first_element() {
    let c = Constraint::with_elements(false, vec![Element::range(0, 255)]);
    let split = c.extract(&[42, 9]).unwrap();
    assert_eq!(split.content, &[42]);
    assert_eq!(split.rest, &[9]);
    assert!(c.extract(&[300]).is_none());
    assert!(c.extract(&[]).is_none());
}

#[test]
fn fixed_size_consumes_exactly() {
    let c = Constraint::with_elements(true, vec![Element::Single(4)]);
    let split = c.extract(&[1, 2, 3, 4, 5]).unwrap();
    assert_eq!(split.content, &[1, 2, 3, 4]);
    assert_eq!(split.rest, &[5]);
    assert!(c.extract(&[1, 2, 3]).is_none());
}

#[test]
fn ranged_size_reads_length_prefix() {
    let c = Constraint::with_elements(true, vec![Element::range(0, 4)]);
    let split = c.extract(&[3, 65, 66, 67, 99]).unwrap();
    assert_eq!(split.content, &[65, 66, 67]);
    assert_eq!(split.rest, &[99]);
    // length prefix outside the declared range
    assert!(c.extract(&[5, 1, 2, 3, 4, 5]).is_none());
    // not enough elements behind the prefix
    assert!(c.extract(&[3, 65]).is_none());
}

#[test]
fn empty_size_consumes_nothing() {
    let c = Constraint::new(true);
    let split = c.extract(&[7, 8]).unwrap();
    assert!(split.content.is_empty());
    assert_eq!(split.rest, &[7, 8]);
}

#[test]
fn split_concatenation_restores_input() {
    let c = Constraint::with_elements(false, vec![Element::range(0, 100)]);
    let oid = [10u32, 20, 30];
    let split = c.extract(&oid).unwrap();
    let mut joined = split.content.to_vec();
    joined.extend_from_slice(split.rest);
    assert_eq!(joined, oid);
}
