use std::collections::{HashMap, VecDeque};

use anyhow::Result;
use sha2::{Digest, Sha256};

use super::loader::ColumnSelector;
use super::model::NumericSeries;

// ---------------------------------------------------------------------------
// Cache key
// ---------------------------------------------------------------------------

/// Identity of a parsed series: the content digest plus the column read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    digest: String,
    selector: ColumnSelector,
}

impl CacheKey {
    pub fn new(bytes: &[u8], selector: &ColumnSelector) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        CacheKey {
            digest: format!("{:x}", hasher.finalize()),
            selector: selector.clone(),
        }
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }
}

// ---------------------------------------------------------------------------
// SeriesCache
// ---------------------------------------------------------------------------

/// Parsed series keyed by content identity. Oldest entries go first once
/// `capacity` is reached.
#[derive(Debug)]
pub struct SeriesCache {
    capacity: usize,
    entries: HashMap<CacheKey, NumericSeries>,
    order: VecDeque<CacheKey>,
}

impl SeriesCache {
    pub fn new(capacity: usize) -> Self {
        SeriesCache {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Return the cached series for these bytes, or run `parse` and keep its
    /// result. Parse failures are not cached.
    pub fn get_or_parse<F>(
        &mut self,
        bytes: &[u8],
        selector: &ColumnSelector,
        parse: F,
    ) -> Result<NumericSeries>
    where
        F: FnOnce(&[u8]) -> Result<NumericSeries>,
    {
        let key = CacheKey::new(bytes, selector);
        if let Some(hit) = self.entries.get(&key) {
            log::debug!("series cache hit {} ({selector})", &key.digest[..12]);
            return Ok(hit.clone());
        }

        log::debug!("series cache miss {} ({selector})", &key.digest[..12]);
        let series = parse(bytes)?;
        self.insert(key, series.clone());
        Ok(series)
    }

    fn insert(&mut self, key: CacheKey, series: NumericSeries) {
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, series);
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.order.retain(|k| k != key);
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::data::loader::series_from_csv_str;

    fn parse_counting<'a>(
        calls: &'a Cell<usize>,
        selector: &'a ColumnSelector,
    ) -> impl FnOnce(&[u8]) -> Result<NumericSeries> + 'a {
        move |bytes| {
            calls.set(calls.get() + 1);
            Ok(series_from_csv_str(std::str::from_utf8(bytes)?, selector))
        }
    }

    #[test]
    fn identical_bytes_hit() {
        let mut cache = SeriesCache::new(4);
        let calls = Cell::new(0);
        let sel = ColumnSelector::default();
        let bytes = b"t,v\n1,2\n";

        let a = cache.get_or_parse(bytes, &sel, parse_counting(&calls, &sel)).unwrap();
        let b = cache.get_or_parse(bytes, &sel, parse_counting(&calls, &sel)).unwrap();
        assert_eq!(a, b);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn different_selector_misses() {
        let mut cache = SeriesCache::new(4);
        let calls = Cell::new(0);
        let bytes = b"t,v\n1,2\n";
        let first = ColumnSelector::Position(0);
        let second = ColumnSelector::Position(1);

        let a = cache.get_or_parse(bytes, &first, parse_counting(&calls, &first)).unwrap();
        let b = cache.get_or_parse(bytes, &second, parse_counting(&calls, &second)).unwrap();
        assert_eq!(a.values(), &[1.0]);
        assert_eq!(b.values(), &[2.0]);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn invalidate_forces_reparse() {
        let mut cache = SeriesCache::new(4);
        let calls = Cell::new(0);
        let sel = ColumnSelector::default();
        let bytes = b"t,v\n1,2\n";

        cache.get_or_parse(bytes, &sel, parse_counting(&calls, &sel)).unwrap();
        assert!(cache.invalidate(&CacheKey::new(bytes, &sel)));
        assert!(cache.is_empty());
        cache.get_or_parse(bytes, &sel, parse_counting(&calls, &sel)).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn oldest_entry_is_evicted() {
        let mut cache = SeriesCache::new(2);
        let sel = ColumnSelector::default();
        let calls = Cell::new(0);
        for bytes in [&b"t,v\n1,1\n"[..], b"t,v\n1,2\n", b"t,v\n1,3\n"] {
            cache.get_or_parse(bytes, &sel, parse_counting(&calls, &sel)).unwrap();
        }
        assert_eq!(cache.len(), 2);
        assert!(!cache.invalidate(&CacheKey::new(b"t,v\n1,1\n", &sel)));
        assert!(cache.invalidate(&CacheKey::new(b"t,v\n1,3\n", &sel)));
    }

    #[test]
    fn parse_errors_are_not_cached() {
        let mut cache = SeriesCache::new(2);
        let sel = ColumnSelector::default();
        let res = cache.get_or_parse(b"x", &sel, |_| anyhow::bail!("broken"));
        assert!(res.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn digest_is_hex_sha256() {
        let key = CacheKey::new(b"", &ColumnSelector::default());
        assert_eq!(
            key.digest(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
