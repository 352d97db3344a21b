//! Query Translator - turns a [`Query`] into filtered, sorted record pages.
//!
//! Every request re-reads the full record set from the store and runs:
//!
//! ```text
//! fetch_all ──▶ filter (AND of constraints) ──▶ stable sort ──▶ skip/take
//! ```
//!
//! Nothing is cached between a count and a fetch. That is O(N) per page,
//! which is fine for directory-sized data and needs no index support.

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::query::{ConstraintSet, Query, SortDirection, SortKey, SortOrder};
use crate::record::{Field, Record};
use crate::storage::StoreAdapter;

/// Observer notified with the result of every count query.
pub type SizeListener = Arc<dyn Fn(usize) + Send + Sync>;

/// Build the combined predicate for a constraint set.
///
/// A record matches when, for every constraint, the attribute's value
/// contains the constraint value ignoring case. Unset attributes never
/// match. An empty set matches everything.
pub fn predicate(constraints: &ConstraintSet) -> impl Fn(&Record) -> bool {
    let needles: Vec<(Field, String)> = constraints
        .iter()
        .map(|(field, value)| (field, value.to_lowercase()))
        .collect();

    move |record: &Record| {
        needles.iter().all(|(field, needle)| {
            field
                .value(record)
                .is_some_and(|value| value.contains_lowercase(needle))
        })
    }
}

/// Build the composite comparator for a sort-order set.
///
/// Keys apply in order, each refining ties left by the previous one. An
/// unresolved key compares everything as equal. An empty set compares
/// everything as equal, which with a stable sort preserves store order.
pub fn comparator(sort_orders: &[SortOrder]) -> impl Fn(&Record, &Record) -> Ordering + '_ {
    move |a: &Record, b: &Record| {
        sort_orders
            .iter()
            .map(|order| compare_by(order, a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

fn compare_by(order: &SortOrder, a: &Record, b: &Record) -> Ordering {
    let ord = match &order.key {
        SortKey::Field(field) => field.compare(a, b),
        SortKey::Unresolved(_) => Ordering::Equal,
    };
    match order.direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

/// Run a query over an already-materialized record set.
pub fn apply(records: Vec<Record>, query: &Query) -> Vec<Record> {
    let mut records = if query.constraints.is_empty() {
        records
    } else {
        let matches = predicate(&query.constraints);
        records.into_iter().filter(|r| matches(r)).collect()
    };

    if !query.sort_orders.is_empty() {
        // `sort_by` is stable: ties keep their store order.
        records.sort_by(comparator(&query.sort_orders));
    }

    let page = records.into_iter().skip(query.offset);
    match query.limit {
        Some(limit) => page.take(limit).collect(),
        None => page.collect(),
    }
}

/// Runs queries against a record store.
///
/// # Size Listener
/// At most one [`SizeListener`] is registered at a time. Registering a new
/// one replaces the previous one.
pub struct QueryTranslator {
    adapter: StoreAdapter,
    size_listener: Mutex<Option<SizeListener>>,
}

impl QueryTranslator {
    /// Create a translator reading through `adapter`, with no size listener.
    pub fn new(adapter: StoreAdapter) -> Self {
        Self {
            adapter,
            size_listener: Mutex::new(None),
        }
    }

    /// The store adapter queries read from.
    pub fn adapter(&self) -> &StoreAdapter {
        &self.adapter
    }

    /// Fetch one page of matching records.
    pub fn fetch(&self, query: &Query) -> Vec<Record> {
        let records = self.adapter.fetch_all();
        let total = records.len();
        let page = apply(records, query);

        tracing::debug!(
            scanned = total,
            returned = page.len(),
            offset = query.offset,
            limit = ?query.limit,
            "query executed"
        );
        page
    }

    /// Number of records matching `query`, ignoring its pagination window.
    ///
    /// Notifies the registered size listener, if any.
    pub fn count(&self, query: &Query) -> usize {
        let count = apply(self.adapter.fetch_all(), &query.unpaged()).len();

        // Clone out of the slot so the callback runs without the lock held.
        let listener = self.size_listener.lock().clone();
        if let Some(listener) = listener {
            listener(count);
        }
        count
    }

    /// Register the size listener, replacing any previous one.
    pub fn set_size_listener<F>(&self, listener: F)
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        *self.size_listener.lock() = Some(Arc::new(listener));
    }

    /// Remove the size listener.
    pub fn clear_size_listener(&self) {
        *self.size_listener.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRecordStore;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn contact(first: &str, last: &str, city: &str, phone: &str) -> Record {
        Record::new()
            .with_first_name(first)
            .with_last_name(last)
            .with_city(city)
            .with_phone_number(phone)
    }

    fn translator(records: Vec<Record>) -> QueryTranslator {
        let store = MemoryRecordStore::with_records(records).unwrap();
        QueryTranslator::new(StoreAdapter::new(Arc::new(store)))
    }

    fn first_names(records: &[Record]) -> Vec<&str> {
        records
            .iter()
            .map(|r| r.first_name.as_deref().unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_phone_substring_scenario() {
        let qt = translator(vec![
            Record::new().with_phone_number("555-1234"),
            Record::new().with_phone_number("555-5678"),
        ]);

        let page = qt.fetch(&Query::new().filter(Field::PhoneNumber, "555-12"));
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id(), Some(crate::RecordId::new(1)));
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let qt = translator(vec![
            contact("Ada", "Lovelace", "London", "1"),
            contact("Alan", "Turing", "Wilmslow", "2"),
        ]);

        let page = qt.fetch(&Query::new().filter(Field::City, "LON"));
        assert_eq!(first_names(&page), vec!["Ada"]);
    }

    #[test]
    fn test_constraints_are_anded() {
        let qt = translator(vec![
            contact("Ada", "Lovelace", "London", "1"),
            contact("Adam", "Smith", "Kirkcaldy", "2"),
        ]);

        let page = qt.fetch(
            &Query::new()
                .filter(Field::FirstName, "ada")
                .filter(Field::City, "kirk"),
        );
        assert_eq!(first_names(&page), vec!["Adam"]);
    }

    #[test]
    fn test_unset_attribute_never_matches() {
        let qt = translator(vec![Record::new().with_first_name("Nobody")]);
        assert!(qt.fetch(&Query::new().filter(Field::Street, "")).is_empty());
    }

    #[test]
    fn test_filter_on_identity() {
        let qt = translator(vec![
            contact("A", "x", "c", "1"),
            contact("B", "x", "c", "2"),
        ]);
        let page = qt.fetch(&Query::new().filter(Field::Id, "2"));
        assert_eq!(first_names(&page), vec!["B"]);
    }

    #[test]
    fn test_multi_key_sort() {
        let qt = translator(vec![
            contact("Zoe", "Berg", "c", "1"),
            contact("Ann", "Berg", "c", "2"),
            contact("Max", "Aalto", "c", "3"),
        ]);

        let page = qt.fetch(
            &Query::new()
                .sort(Field::LastName, SortDirection::Ascending)
                .sort(Field::FirstName, SortDirection::Descending),
        );
        assert_eq!(first_names(&page), vec!["Max", "Zoe", "Ann"]);
    }

    #[test]
    fn test_identity_sorts_numerically() {
        let records: Vec<Record> = (0..12)
            .map(|i| contact(&format!("n{}", i), "x", "c", &i.to_string()))
            .collect();
        let qt = translator(records);

        let page = qt.fetch(&Query::new().sort(Field::Id, SortDirection::Descending).page(0, 3));
        let ids: Vec<u64> = page.iter().map(|r| r.id().unwrap().0).collect();
        assert_eq!(ids, vec![12, 11, 10]);
    }

    #[test]
    fn test_unknown_sort_key_is_noop() {
        let qt = translator(vec![
            contact("Cy", "x", "c", "1"),
            contact("Al", "x", "c", "2"),
        ]);

        let page = qt.fetch(&Query::new().sort_named("favouriteColour", SortDirection::Ascending));
        assert_eq!(first_names(&page), vec!["Cy", "Al"]);

        // A later resolvable key still applies.
        let page = qt.fetch(
            &Query::new()
                .sort_named("favouriteColour", SortDirection::Ascending)
                .sort_named("firstName", SortDirection::Ascending),
        );
        assert_eq!(first_names(&page), vec!["Al", "Cy"]);
    }

    #[test]
    fn test_pagination_after_filter_and_sort() {
        let records: Vec<Record> = ["e", "a", "d", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, n)| contact(n, "x", "c", &i.to_string()))
            .collect();
        let qt = translator(records);

        let query = Query::new()
            .sort(Field::FirstName, SortDirection::Ascending)
            .page(1, 2);
        assert_eq!(first_names(&qt.fetch(&query)), vec!["b", "c"]);

        let past_end = Query::new().page(10, 5);
        assert!(qt.fetch(&past_end).is_empty());
    }

    #[test]
    fn test_count_ignores_pagination_and_notifies() {
        let qt = translator(vec![
            contact("Ada", "L", "London", "1"),
            contact("Alan", "T", "London", "2"),
            contact("Bob", "B", "Paris", "3"),
        ]);

        let seen = Arc::new(AtomicUsize::new(usize::MAX));
        let seen_clone = Arc::clone(&seen);
        qt.set_size_listener(move |n| seen_clone.store(n, AtomicOrdering::SeqCst));

        let query = Query::new().filter(Field::City, "london").page(0, 1);
        assert_eq!(qt.count(&query), 2);
        assert_eq!(seen.load(AtomicOrdering::SeqCst), 2);

        qt.clear_size_listener();
        assert_eq!(qt.count(&Query::new()), 3);
        assert_eq!(seen.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn test_listener_slot_holds_one_observer() {
        let qt = translator(vec![contact("A", "B", "C", "1")]);
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = Arc::clone(&first);
        qt.set_size_listener(move |_| {
            f.fetch_add(1, AtomicOrdering::SeqCst);
        });
        let s = Arc::clone(&second);
        qt.set_size_listener(move |_| {
            s.fetch_add(1, AtomicOrdering::SeqCst);
        });

        qt.count(&Query::new());
        assert_eq!(first.load(AtomicOrdering::SeqCst), 0);
        assert_eq!(second.load(AtomicOrdering::SeqCst), 1);
    }
}
