use std::collections::BTreeMap;

use widget::{Marker, Poi, PoiId};

/// Which way a toggle flipped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

struct SelectionEntry {
    poi: Poi,
    marker: Box<dyn Marker>,
}

/// Ordered selection keyed by POI id.
///
/// Membership lives in a `BTreeMap` keyed by `PoiId`; presentation and
/// request order is tracked separately as the insertion-order list.
///
/// Ordering contract:
/// - `member_ids` and `iter` yield entries in insertion order, not id order.
/// - At most one entry exists per id at any time.
#[derive(Default)]
pub struct SelectionStore {
    entries: BTreeMap<PoiId, SelectionEntry>,
    order: Vec<PoiId>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: PoiId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Snapshot of selected ids in insertion order.
    pub fn member_ids(&self) -> Vec<PoiId> {
        self.order.clone()
    }

    /// Iterates selected POIs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Poi> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .map(|entry| &entry.poi)
    }

    /// Flips membership for `poi`.
    ///
    /// Insertion runs `make_marker` before touching any state, so a failed
    /// factory leaves the store unchanged. Removal detaches the entry's
    /// marker; the consuming call makes a double-removal unrepresentable.
    pub fn toggle<E>(
        &mut self,
        poi: Poi,
        make_marker: impl FnOnce(&Poi) -> Result<Box<dyn Marker>, E>,
    ) -> Result<Toggle, E> {
        if let Some(entry) = self.entries.remove(&poi.id) {
            self.order.retain(|id| *id != poi.id);
            entry.marker.remove();
            return Ok(Toggle::Removed);
        }

        let marker = make_marker(&poi)?;
        self.order.push(poi.id);
        self.entries.insert(poi.id, SelectionEntry { poi, marker });
        Ok(Toggle::Added)
    }

    /// Removes `id` if present, detaching its marker.
    ///
    /// Returns `false` for a stale id; the caller decides whether that is
    /// worth a diagnostic.
    pub fn remove(&mut self, id: PoiId) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };
        self.order.retain(|other| *other != id);
        entry.marker.remove();
        true
    }

    /// Empties the selection, detaching markers in insertion order.
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.order) {
            if let Some(entry) = self.entries.remove(&id) {
                entry.marker.remove();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use widget::{LngLat, Marker, Poi, PoiId};

    use super::{SelectionStore, Toggle};

    struct CountingMarker(Arc<AtomicU64>);

    impl Marker for CountingMarker {
        fn remove(self: Box<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn poi(id: u64) -> Poi {
        Poi::new(PoiId(id), LngLat::new(10.4, 63.4), 2.0)
    }

    fn counting_factory(
        removals: &Arc<AtomicU64>,
    ) -> impl Fn(&Poi) -> Result<Box<dyn Marker>, &'static str> + '_ {
        move |_| Ok(Box::new(CountingMarker(Arc::clone(removals))))
    }

    #[test]
    fn toggle_flips_membership_on_every_call() {
        let removals = Arc::new(AtomicU64::new(0));
        let mut store = SelectionStore::new();

        for round in 0..5 {
            let expected = if round % 2 == 0 {
                Toggle::Added
            } else {
                Toggle::Removed
            };
            let got = store.toggle(poi(5), counting_factory(&removals)).unwrap();
            assert_eq!(got, expected);
            assert_eq!(store.contains(PoiId(5)), round % 2 == 0);
        }

        // Five calls: three additions, two removals.
        assert!(store.contains(PoiId(5)));
        assert_eq!(removals.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn second_toggle_detaches_the_marker_exactly_once() {
        let removals = Arc::new(AtomicU64::new(0));
        let mut store = SelectionStore::new();

        store.toggle(poi(5), counting_factory(&removals)).unwrap();
        assert_eq!(store.member_ids(), vec![PoiId(5)]);

        store.toggle(poi(5), counting_factory(&removals)).unwrap();
        assert!(store.is_empty());
        assert_eq!(removals.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_factory_leaves_store_unchanged() {
        let mut store = SelectionStore::new();
        let err = store
            .toggle(poi(9), |_| Err::<Box<dyn Marker>, _>("widget not loaded"))
            .unwrap_err();
        assert_eq!(err, "widget not loaded");
        assert!(store.is_empty());
        assert!(!store.contains(PoiId(9)));
    }

    #[test]
    fn member_ids_follow_insertion_order_not_id_order() {
        let removals = Arc::new(AtomicU64::new(0));
        let mut store = SelectionStore::new();

        for id in [3, 7, 2] {
            store.toggle(poi(id), counting_factory(&removals)).unwrap();
        }
        assert_eq!(store.member_ids(), vec![PoiId(3), PoiId(7), PoiId(2)]);

        // Removing the middle entry keeps the relative order of the rest.
        store.toggle(poi(7), counting_factory(&removals)).unwrap();
        assert_eq!(store.member_ids(), vec![PoiId(3), PoiId(2)]);
    }

    #[test]
    fn clear_detaches_one_marker_per_entry() {
        let removals = Arc::new(AtomicU64::new(0));
        let mut store = SelectionStore::new();

        for id in [1, 2, 3] {
            store.toggle(poi(id), counting_factory(&removals)).unwrap();
        }
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.member_ids(), Vec::<PoiId>::new());
        assert_eq!(removals.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn clear_on_empty_store_is_a_noop() {
        let mut store = SelectionStore::new();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn stale_remove_reports_false() {
        let removals = Arc::new(AtomicU64::new(0));
        let mut store = SelectionStore::new();
        store.toggle(poi(1), counting_factory(&removals)).unwrap();

        assert!(!store.remove(PoiId(42)));
        assert_eq!(store.member_ids(), vec![PoiId(1)]);

        assert!(store.remove(PoiId(1)));
        assert!(store.is_empty());
        assert_eq!(removals.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn iter_yields_pois_in_insertion_order() {
        let removals = Arc::new(AtomicU64::new(0));
        let mut store = SelectionStore::new();
        for id in [10, 4, 8] {
            store.toggle(poi(id), counting_factory(&removals)).unwrap();
        }
        let ids: Vec<PoiId> = store.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PoiId(10), PoiId(4), PoiId(8)]);
    }
}
