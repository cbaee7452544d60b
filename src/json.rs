//! Serialized-size measurement for JSON objects.

use serde_json::{Map, Value};

use crate::measure::{MeasureError, MeasuredContainer};

/// `io::Write` sink that only counts what is written, so measuring never
/// allocates an intermediate buffer.
struct ByteCounter(u64);

impl std::io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0 += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl MeasuredContainer for Map<String, Value> {
    type Value = Value;

    fn byte_size(&self) -> Result<u64, MeasureError> {
        let mut counter = ByteCounter(0);
        match serde_json::to_writer(&mut counter, self) {
            Ok(()) => Ok(counter.0),
            Err(source) => Err(MeasureError::Measurement {
                label: self.label(),
                source: Box::new(source),
            }),
        }
    }

    fn keys(&self) -> Vec<String> {
        Map::keys(self).cloned().collect()
    }

    fn get(&self, key: &str) -> Option<Value> {
        Map::get(self, key).cloned()
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        Map::remove(self, key)
    }

    fn insert(&mut self, key: String, value: Value) {
        Map::insert(self, key, value);
    }

    fn label(&self) -> String {
        format!("Map@{:p}", self as *const Self)
    }

    fn as_nested(value: &mut Value) -> Option<&mut Self> {
        value.as_object_mut()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::measure::measure;

    use super::*;

    fn object(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn flat_object_deltas_sum_to_total_minus_braces() {
        let mut state = object(r#"{"a": "xxxx", "bb": 12345, "c": null}"#);
        let total = state.byte_size().unwrap() as i64;

        let tree = measure(&mut state, -1).unwrap();

        // Every byte except the enclosing braces belongs to some entry; the
        // separating commas are absorbed into the per-entry deltas.
        let sum: i64 = tree.children.iter().map(|child| child.size_bytes).sum();
        assert_eq!(sum, total - 2);
        assert_eq!(tree.size_bytes, total);
    }

    #[test]
    fn measurement_is_idempotent() {
        let mut state = object(r#"{"a": "xxxx", "inner": {"x": [1, 2, 3], "y": "zzz"}}"#);

        let first = measure(&mut state, -1).unwrap();
        let second = measure(&mut state, -1).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn nested_object_is_broken_down_and_document_left_intact() {
        let mut state = object(r#"{"inner": {"x": "0123456789", "y": 42}, "flag": true}"#);
        let original = state.clone();

        let tree = measure(&mut state, -1).unwrap();

        assert_eq!(state, original);
        let inner = tree
            .children
            .iter()
            .find(|child| child.key == "inner")
            .unwrap();
        assert_eq!(inner.children.len(), 2);
        // The inner deltas cover everything between the inner braces; what
        // remains of the parent-level delta is the quoted key, the colon and
        // the braces themselves.
        let inner_sum: i64 = inner.children.iter().map(|child| child.size_bytes).sum();
        let overhead = "\"inner\":{}".len() as i64;
        assert_eq!(inner_sum, inner.size_bytes - overhead);
    }

    #[test]
    fn depth_limit_keeps_deep_objects_unbroken() {
        let mut state = object(r#"{"l1": {"l2": {"l3": "deep"}}}"#);

        let tree = measure(&mut state, 1).unwrap();

        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].key, "l1");
        assert!(tree.children[0].children.is_empty());
    }

    #[test]
    fn array_values_are_leaves() {
        let mut state = object(r#"{"list": [1, 2, 3], "n": 7}"#);

        let tree = measure(&mut state, -1).unwrap();

        let list = tree
            .children
            .iter()
            .find(|child| child.key == "list")
            .unwrap();
        assert!(list.children.is_empty());
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|number| Value::Number(number.into())),
            "[a-z0-9]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect()))
        })
    }

    proptest! {
        #[test]
        fn measurement_leaves_any_document_intact(
            entries in prop::collection::btree_map("[a-z]{1,8}", arb_value(), 0..6),
        ) {
            let mut state: Map<String, Value> = entries.into_iter().collect();
            let original = state.clone();

            let tree = measure(&mut state, -1).unwrap();

            prop_assert_eq!(&state, &original);
            prop_assert_eq!(tree.children.len(), original.len());
        }
    }
}
