//! Differential measurement of a container's per-entry serialized size.
//!
//! The host gives us exactly one size oracle: serialize the whole container
//! and count the bytes. Per-entry contributions are therefore derived by
//! removing one entry at a time, re-measuring, and taking the difference,
//! with every removed entry put back before control returns to the caller.

use crate::node::BreakdownNode;

/// Ways a measurement pass can fail.
///
/// Whatever the failure, the container under measurement has been restored
/// to its pre-call state by the time the error reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum MeasureError {
    /// The serialize-and-measure primitive failed on the container in its
    /// current (possibly partially emptied) state. Retrying on an unchanged
    /// container is expected to fail identically.
    #[error("failed to serialize {label} for measurement")]
    Measurement {
        label: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A value did not survive the remove/reinsert round trip.
    #[error("value under key {key:?} cannot be removed and reinserted faithfully")]
    UnsupportedValue { key: String },
}

/// The primitives a host container must supply to be measurable.
///
/// Nested containers are detected through [`MeasuredContainer::as_nested`]
/// rather than a concrete type check, so the same engine works for any
/// key-value representation the host serializes.
///
/// The engine mutates the container in place for the full duration of a
/// [`measure`] call. Callers must guarantee exclusive access for that long;
/// another thread observing the container mid-call sees it transiently
/// emptied.
pub trait MeasuredContainer {
    /// The host's value type, covering both scalars and nested containers.
    type Value;

    /// Serializes the whole container the way the host transport would and
    /// returns the byte count.
    fn byte_size(&self) -> Result<u64, MeasureError>;

    /// Current keys, in an order that is stable within one call.
    fn keys(&self) -> Vec<String>;

    /// A copy of the value under `key`, used only for the restore snapshot.
    fn get(&self, key: &str) -> Option<Self::Value>;

    /// Removes and returns the value under `key`.
    fn remove(&mut self, key: &str) -> Option<Self::Value>;

    /// Inserts `value` under `key`, replacing any present value.
    fn insert(&mut self, key: String, value: Self::Value);

    /// An identity-derived label for this container, e.g. its address.
    fn label(&self) -> String;

    /// A mutable container view of `value` when it is itself a nested
    /// container, or `None` when it is a scalar.
    fn as_nested(value: &mut Self::Value) -> Option<&mut Self>
    where
        Self: Sized;
}

/// Measures how many serialized bytes each entry of `container` contributes,
/// recursing into nested containers.
///
/// `depth_limit` of `0` skips the breakdown and reports the container's total
/// size as a single leaf; a negative value recurses without limit; a positive
/// `n` descends at most `n` further levels, deeper containers staying
/// unbroken leaves.
///
/// The container comes back observably identical on every exit path,
/// including a failing serialize primitive. The root's `size_bytes` is
/// re-measured after restoration.
pub fn measure<C: MeasuredContainer>(
    container: &mut C,
    depth_limit: i32,
) -> Result<BreakdownNode, MeasureError> {
    if depth_limit == 0 {
        let size = container.byte_size()?;
        return Ok(BreakdownNode::leaf(container.label(), size as i64));
    }

    let label = container.label();
    let children = {
        let mut restore = RestoreGuard::new(container)?;
        restore.measure_children(depth_limit)
        // The guard drops here and puts every snapshot entry back, also when
        // measure_children bailed out early.
    }?;
    let size = container.byte_size()?;

    Ok(BreakdownNode {
        key: label,
        size_bytes: size as i64,
        children,
    })
}

/// Snapshots the container on construction and re-inserts every snapshot
/// entry on drop, so restoration runs on normal return, `?` propagation and
/// unwind alike.
struct RestoreGuard<'a, C: MeasuredContainer> {
    container: &'a mut C,
    snapshot: Vec<(String, C::Value)>,
}

impl<'a, C: MeasuredContainer> RestoreGuard<'a, C> {
    fn new(container: &'a mut C) -> Result<Self, MeasureError> {
        let mut snapshot = Vec::new();
        for key in container.keys() {
            match container.get(&key) {
                Some(value) => snapshot.push((key, value)),
                None => return Err(MeasureError::UnsupportedValue { key }),
            }
        }
        Ok(Self {
            container,
            snapshot,
        })
    }

    fn measure_children(&mut self, depth_limit: i32) -> Result<Vec<BreakdownNode>, MeasureError> {
        let mut prev_size = self.container.byte_size()?;
        let mut children = Vec::with_capacity(self.snapshot.len());

        let keys: Vec<String> = self.snapshot.iter().map(|(key, _)| key.clone()).collect();
        for key in keys {
            // Mutate the original container, not the snapshot copy. Some
            // hosts store values by reference between copies, and only the
            // original reflects that in its serialized size.
            let mut value = match self.container.remove(&key) {
                Some(value) => value,
                None => return Err(MeasureError::UnsupportedValue { key }),
            };
            let new_size = self.container.byte_size()?;
            let delta = prev_size as i64 - new_size as i64;

            // For a nested container the differential delta is the better
            // attribution at this level, so only its children are adopted.
            let nested = match C::as_nested(&mut value) {
                Some(inner) => measure(inner, depth_limit.saturating_sub(1))?.children,
                None => Vec::new(),
            };

            children.push(BreakdownNode {
                key,
                size_bytes: delta,
                children: nested,
            });
            prev_size = new_size;
        }

        Ok(children)
    }
}

impl<C: MeasuredContainer> Drop for RestoreGuard<'_, C> {
    fn drop(&mut self) {
        for (key, value) in self.snapshot.drain(..) {
            self.container.insert(key, value);
        }
    }
}
