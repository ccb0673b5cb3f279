use std::sync::Arc;

use parking_lot::RwLock;

/// Shared, lock-protected value.
///
/// Used for settings and listener lists that are read on every run and only
/// rarely written.
pub type Atomic<T> = Arc<RwLock<T>>;

#[inline]
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}

pub trait ReadExecutor<T> {
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R;

    /// Clones the current value out of the lock.
    fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.read_with(T::clone)
    }
}

impl<T> ReadExecutor<T> for Atomic<T> {
    #[inline]
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.read();
        f(&guard)
    }
}

pub trait WriteExecutor<T> {
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;

    /// Stores `value` and returns the previous one.
    fn replace(&self, value: T) -> T {
        self.write_with(|current| std::mem::replace(current, value))
    }
}

impl<T> WriteExecutor<T> for Atomic<T> {
    #[inline]
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.write();
        f(&mut guard)
    }
}
