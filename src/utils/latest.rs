use std::sync::Mutex;

/// Single-slot overwrite cell shared between one writer and one reader.
///
/// The writer publishes whole values; a burst of publishes between reads
/// collapses to the most recent one. `take_fresh` consumes the dirty flag
/// but keeps the value, so `peek` always sees the latest published state.
#[derive(Debug)]
pub struct LatestCell<T> {
    inner: Mutex<Inner<T>>,
}

#[derive(Debug)]
struct Inner<T> {
    value: Option<T>,
    fresh: bool,
}

impl<T> Default for LatestCell<T> {
    fn default() -> Self {
        LatestCell {
            inner: Mutex::new(Inner {
                value: None,
                fresh: false,
            }),
        }
    }
}

impl<T: Clone> LatestCell<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, value: T) {
        let mut inner = self.inner.lock().unwrap();
        inner.value = Some(value);
        inner.fresh = true;
    }

    /// Returns the latest value only if it has not been consumed yet,
    /// clearing the dirty flag.
    pub fn take_fresh(&self) -> Option<T> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fresh {
            inner.fresh = false;
            inner.value.clone()
        } else {
            None
        }
    }

    /// Latest published value, fresh or not.
    pub fn peek(&self) -> Option<T> {
        self.inner.lock().unwrap().value.clone()
    }

    pub fn is_fresh(&self) -> bool {
        self.inner.lock().unwrap().fresh
    }
}
