use geo_features::{FeatureError, NamedValueStore};
use proptest::prelude::*;

proptest! {
    #[test]
    fn add_then_get_returns_value(key in "[a-z]{1,8}", value in any::<i64>()) {
        let mut store = NamedValueStore::new();
        store.add(key.clone(), value).unwrap();
        prop_assert!(store.contains_key(&key));
        prop_assert_eq!(*store.get(&key).unwrap(), value);
        prop_assert_eq!(store.try_get(&key), Some(&value));
    }

    #[test]
    fn read_only_store_never_changes(
        entries in proptest::collection::btree_map("[a-z]{1,6}", any::<i32>(), 0..8),
        key in "[a-z]{1,6}",
        value in any::<i32>(),
    ) {
        let pairs: Vec<(String, i32)> = entries.into_iter().collect();
        let mut store = NamedValueStore::read_only(pairs.clone()).unwrap();
        let before = store.clone();

        prop_assert!(matches!(store.add(key.clone(), value), Err(FeatureError::ReadOnly)));
        prop_assert!(matches!(store.set(key.clone(), value), Err(FeatureError::ReadOnly)));
        prop_assert!(matches!(store.remove(&key), Err(FeatureError::ReadOnly)));
        prop_assert!(matches!(store.remove_entry(&key, &value), Err(FeatureError::ReadOnly)));
        prop_assert!(matches!(store.clear(), Err(FeatureError::ReadOnly)));

        prop_assert_eq!(&store, &before);
        let seen: Vec<(String, i32)> = store.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(seen, pairs);
    }

    #[test]
    fn enumeration_follows_insertion_order(keys in proptest::collection::hash_set("[a-z]{1,6}", 0..10)) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut store = NamedValueStore::new();
        for (i, key) in keys.iter().enumerate() {
            store.add(key.clone(), i).unwrap();
        }
        let seen: Vec<&String> = store.keys().iter().collect();
        let expected: Vec<&String> = keys.iter().collect();
        prop_assert_eq!(seen, expected);
        prop_assert_eq!(store.values().len(), keys.len());
    }
}
