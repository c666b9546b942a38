//! Depth-grouped frontier and run-level visited set
//!
//! The frontier is an array of depth buckets (bucket index = depth, sized
//! `limit + 1`) that serves both traversal disciplines:
//! - breadth-first drains the lowest non-empty bucket in FIFO slices
//! - depth-first removes a random entry from the deepest non-empty bucket,
//!   falling back to a shallower bucket only once the deeper ones are empty

use rand::Rng;
use std::collections::HashSet;

/// A discovered page that has not been fetched yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Canonical absolute URL to fetch
    pub url: String,

    /// Page the link was found on; `None` for the seed
    pub referrer: Option<String>,

    /// Hops from the seed, fixed at enqueue time
    pub depth: u32,
}

impl FrontierEntry {
    /// The entry for the seed page at depth 0
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            referrer: None,
            depth: 0,
        }
    }

    /// An entry one hop below `referrer`
    pub fn child_of(url: impl Into<String>, referrer: &str, referrer_depth: u32) -> Self {
        Self {
            url: url.into(),
            referrer: Some(referrer.to_string()),
            depth: referrer_depth + 1,
        }
    }
}

/// Worklist of pending entries grouped by depth
#[derive(Debug, Clone)]
pub struct Frontier {
    buckets: Vec<Vec<FrontierEntry>>,
    limit: u32,
}

impl Frontier {
    /// Creates an empty frontier accepting depths `0..=limit`
    pub fn new(limit: u32) -> Self {
        Self {
            buckets: vec![Vec::new(); limit as usize + 1],
            limit,
        }
    }

    /// The deepest depth this frontier accepts
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Appends an entry to the bucket for its depth
    ///
    /// Returns false (and drops the entry) if the depth is beyond the limit.
    pub fn push_at(&mut self, entry: FrontierEntry) -> bool {
        if entry.depth > self.limit {
            return false;
        }
        self.buckets[entry.depth as usize].push(entry);
        true
    }

    /// Removes up to `max` entries, in FIFO order, from the lowest non-empty bucket
    ///
    /// A batch never spans two depths, so a level is fully drained before the
    /// next one is touched.
    pub fn pop_breadth(&mut self, max: usize) -> Vec<FrontierEntry> {
        if max == 0 {
            return Vec::new();
        }

        match self.buckets.iter_mut().find(|bucket| !bucket.is_empty()) {
            Some(bucket) => {
                let take = max.min(bucket.len());
                bucket.drain(..take).collect()
            }
            None => Vec::new(),
        }
    }

    /// Removes one entry at a uniformly random index from the deepest non-empty bucket
    pub fn pop_depth_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<FrontierEntry> {
        let bucket = self
            .buckets
            .iter_mut()
            .rev()
            .find(|bucket| !bucket.is_empty())?;

        let index = rng.random_range(0..bucket.len());
        let entry = bucket.swap_remove(index);
        tracing::trace!(
            "Depth-first pop at depth {} ({} siblings left)",
            entry.depth,
            bucket.len()
        );
        Some(entry)
    }

    /// Returns true if no entries remain at any depth within the limit
    pub fn is_exhausted(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Total number of pending entries
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.is_exhausted()
    }

    /// Number of pending entries at `depth`
    pub fn pending_at(&self, depth: u32) -> usize {
        self.buckets.get(depth as usize).map_or(0, Vec::len)
    }

    /// Depth of the lowest non-empty bucket
    pub fn lowest_pending_depth(&self) -> Option<u32> {
        self.buckets
            .iter()
            .position(|bucket| !bucket.is_empty())
            .map(|depth| depth as u32)
    }

    /// Depth of the deepest non-empty bucket
    pub fn deepest_pending_depth(&self) -> Option<u32> {
        self.buckets
            .iter()
            .rposition(|bucket| !bucket.is_empty())
            .map(|depth| depth as u32)
    }
}

/// URLs already scheduled or visited during one run
///
/// Insertion-only: a URL is reserved when it is enqueued, before its fetch
/// starts, so it can be scheduled at most once and keeps the depth of its
/// first discovery.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    seen: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url`; returns false if it was already claimed
    pub fn reserve(&mut self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
