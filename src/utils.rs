//! Utility structs and methods
use smallvec::SmallVec;

/// Start offsets of consecutive segments of a buffer
pub(crate) type Bounds = SmallVec<[usize; 8]>;

/// Iterator of all index pairs that cross two different segments of a buffer
///
/// The buffer `[0, end)` is split into consecutive segments, each starting
/// at the offset given in `bounds`. The iterator yields every pair
/// `(i, j)` where `i` is in an earlier segment than `j`. Pairs within
/// the same segment are never yielded.
///
/// # Examples
/// ```
/// use orthoxml::utils::CrossPairs;
///
/// // segments: [0, 1) [1, 3) [3, 4)
/// let mut c = CrossPairs::new(&[0, 1, 3], 4);
///
/// assert_eq!(c.next(), Some((0, 1)));
/// assert_eq!(c.next(), Some((0, 2)));
/// assert_eq!(c.next(), Some((0, 3)));
/// assert_eq!(c.next(), Some((1, 3)));
/// assert_eq!(c.next(), Some((2, 3)));
/// assert!(c.next().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct CrossPairs {
    bounds: Bounds,
    end: usize,
    seg1: usize,
    seg2: usize,
    idx1: usize,
    idx2: usize,
}

impl CrossPairs {
    /// Creates a new `CrossPairs` iterator
    ///
    /// `bounds` are sorted and offsets larger than `end` are clamped to `end`,
    /// i.e. they start empty segments.
    pub fn new(bounds: &[usize], end: usize) -> Self {
        let mut bounds: Bounds = bounds.iter().map(|bound| (*bound).min(end)).collect();
        bounds.sort_unstable();
        Self::from_bounds(bounds, end)
    }

    pub(crate) fn from_bounds(bounds: Bounds, end: usize) -> Self {
        debug_assert!(bounds.windows(2).all(|w| w[0] <= w[1]));
        debug_assert!(bounds.last().map_or(true, |last| *last <= end));
        let mut pairs = Self {
            bounds,
            end,
            seg1: 0,
            seg2: 1,
            idx1: 0,
            idx2: 0,
        };
        pairs.reset_indices();
        pairs
    }

    /// The number of pairs yielded in total
    pub fn total(&self) -> usize {
        let n = self.bounds.len();
        let mut total = 0;
        let mut before = 0;
        for seg in 0..n {
            let len = self.segment_len(seg);
            total += before * len;
            before += len;
        }
        total
    }

    fn segment_len(&self, seg: usize) -> usize {
        let (start, end) = self.segment(seg);
        end - start
    }

    fn segment(&self, seg: usize) -> (usize, usize) {
        let start = self.bounds[seg];
        let end = self.bounds.get(seg + 1).copied().unwrap_or(self.end);
        (start, end)
    }

    fn has_segments(&self) -> bool {
        self.seg1 + 1 < self.bounds.len()
    }

    fn reset_indices(&mut self) {
        if self.has_segments() {
            self.idx1 = self.segment(self.seg1).0;
            self.idx2 = self.segment(self.seg2).0;
        }
    }

    fn next_segment_pair(&mut self) {
        self.seg2 += 1;
        if self.seg2 >= self.bounds.len() {
            self.seg1 += 1;
            self.seg2 = self.seg1 + 1;
        }
        self.reset_indices();
    }
}

impl Iterator for CrossPairs {
    type Item = (usize, usize);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if !self.has_segments() {
                return None;
            }
            let (_, end1) = self.segment(self.seg1);
            let (start2, end2) = self.segment(self.seg2);
            if self.idx1 >= end1 {
                self.next_segment_pair();
                continue;
            }
            if self.idx2 >= end2 {
                self.idx1 += 1;
                self.idx2 = start2;
                continue;
            }
            let pair = (self.idx1, self.idx2);
            self.idx2 += 1;
            return Some(pair);
        }
    }
}
