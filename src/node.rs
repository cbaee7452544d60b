/// One node in a serialized-size breakdown tree.
#[derive(Debug, Clone, PartialEq, Eq, serde_derive::Serialize)]
pub struct BreakdownNode {
    /// The entry's key in its parent container, or an identity-derived label
    /// for the container a recursion level started from.
    pub key: String,
    /// How many serialized bytes this entry contributes. Signed: hosts that
    /// share or intern values across entries can produce small negative
    /// deltas, which are reported as measured rather than clamped.
    pub size_bytes: i64,
    /// One node per key of a broken-down container, in the container's own
    /// iteration order. Empty for scalar values and for nested containers
    /// cut off by the depth limit.
    pub children: Vec<BreakdownNode>,
}

impl BreakdownNode {
    pub(crate) fn leaf(key: String, size_bytes: i64) -> Self {
        Self {
            key,
            size_bytes,
            children: Vec::new(),
        }
    }
}
