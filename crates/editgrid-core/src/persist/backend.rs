use crate::error::Result;

/// Raw session-scoped key/value storage for view-state blobs.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`ViewStateStore`](super::ViewStateStore) handles the "what" (defaults,
/// merging, error policy). All methods take `&self`: backends use interior
/// mutability since the grid is single-threaded.
pub trait SessionBackend {
    /// Read the blob stored under `key`.
    /// Returns Ok(None) when nothing was ever written.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store a blob. MUST be atomic: a reader sees the old or the new blob, never a mix.
    fn save(&self, key: &str, blob: &str) -> Result<()>;

    /// Remove one key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key starting with `prefix` and return how many went.
    /// Keys owned by other tenants of the same session are left alone.
    fn clear(&self, prefix: &str) -> Result<usize>;

    /// All keys currently stored.
    fn keys(&self) -> Result<Vec<String>>;
}

impl<B: SessionBackend + ?Sized> SessionBackend for std::rc::Rc<B> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        (**self).save(key, blob)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn clear(&self, prefix: &str) -> Result<usize> {
        (**self).clear(prefix)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}
