use crate::types::{AspectRatio, Size};
use std::collections::{BTreeMap, BTreeSet};

/// Sizes grouped by reduced aspect ratio. Iteration is ordered by ratio
/// value, and sizes within a bucket by area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeMap {
    buckets: BTreeMap<AspectRatio, BTreeSet<Size>>,
}

impl SizeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `size`; zero-area sizes are ignored.
    pub fn add(&mut self, size: Size) -> bool {
        if size.width == 0 || size.height == 0 {
            return false;
        }
        self.buckets
            .entry(size.aspect_ratio())
            .or_default()
            .insert(size)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeSet::len).sum()
    }

    pub fn ratios(&self) -> impl Iterator<Item = AspectRatio> + '_ {
        self.buckets.keys().copied()
    }

    pub fn has_ratio(&self, ratio: &AspectRatio) -> bool {
        self.buckets.contains_key(ratio)
    }

    pub fn sizes(&self, ratio: &AspectRatio) -> Option<&BTreeSet<Size>> {
        self.buckets.get(ratio)
    }

    pub fn contains(&self, size: &Size) -> bool {
        self.buckets
            .get(&size.aspect_ratio())
            .is_some_and(|bucket| bucket.contains(size))
    }

    /// Every size, ascending by area.
    pub fn all(&self) -> BTreeSet<Size> {
        self.buckets.values().flatten().copied().collect()
    }

    pub fn largest(&self) -> Option<Size> {
        self.buckets.values().filter_map(|b| b.last()).max().copied()
    }

    pub fn largest_with_ratio(&self, ratio: &AspectRatio) -> Option<Size> {
        self.buckets.get(ratio).and_then(|b| b.last()).copied()
    }

    /// Drops every bucket whose ratio is not in `other`.
    pub fn retain_ratios_of(&mut self, other: &SizeMap) {
        self.buckets.retain(|ratio, _| other.has_ratio(ratio));
    }

    /// Drops sizes that fail `keep`, then empty buckets.
    pub fn retain_sizes(&mut self, mut keep: impl FnMut(&Size) -> bool) {
        for bucket in self.buckets.values_mut() {
            bucket.retain(|s| keep(s));
        }
        self.buckets.retain(|_, bucket| !bucket.is_empty());
    }
}

impl FromIterator<Size> for SizeMap {
    fn from_iter<T: IntoIterator<Item = Size>>(iter: T) -> Self {
        let mut map = SizeMap::new();
        for size in iter {
            map.add(size);
        }
        map
    }
}

impl<'a> FromIterator<&'a Size> for SizeMap {
    fn from_iter<T: IntoIterator<Item = &'a Size>>(iter: T) -> Self {
        iter.into_iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_ratio() {
        let map: SizeMap = [
            Size::new(1920, 1080),
            Size::new(1280, 720),
            Size::new(640, 480),
            Size::new(0, 480),
        ]
        .iter()
        .collect();

        assert_eq!(map.len(), 3);
        assert_eq!(
            map.ratios().collect::<Vec<_>>(),
            vec![AspectRatio::of(4, 3), AspectRatio::of(16, 9)]
        );
        assert_eq!(
            map.largest_with_ratio(&AspectRatio::of(16, 9)),
            Some(Size::new(1920, 1080))
        );
        assert!(map.contains(&Size::new(1280, 720)));
        assert!(!map.contains(&Size::new(1280, 960)));
    }

    #[test]
    fn test_retain_ratios_of() {
        let mut preview: SizeMap = [Size::new(1920, 1080), Size::new(640, 480)]
            .iter()
            .collect();
        let still: SizeMap = [Size::new(4000, 3000)].iter().collect();
        preview.retain_ratios_of(&still);
        assert_eq!(preview.ratios().collect::<Vec<_>>(), vec![AspectRatio::of(4, 3)]);
    }

    #[test]
    fn test_retain_sizes_drops_empty_buckets() {
        let mut map: SizeMap = [Size::new(3840, 2160), Size::new(640, 480)]
            .iter()
            .collect();
        map.retain_sizes(|s| s.height <= 1080);
        assert!(!map.has_ratio(&AspectRatio::of(16, 9)));
        assert_eq!(map.largest(), Some(Size::new(640, 480)));
    }
}
