use std::collections::HashSet;
use std::hash::Hash;

/// Sets a busy flag on arm and clears it on drop, so a request future
/// dropped mid-flight never leaves its owner reporting one in flight.
pub(crate) struct BusyGuard<'a> {
    flag: &'a mut bool,
}

impl<'a> BusyGuard<'a> {
    pub(crate) fn arm(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

/// Per-item variant: the key is in the set exactly as long as the guard
/// is alive.
pub(crate) struct MarkGuard<'a, T: Copy + Eq + Hash> {
    set: &'a mut HashSet<T>,
    key: T,
}

impl<'a, T: Copy + Eq + Hash> MarkGuard<'a, T> {
    pub(crate) fn arm(set: &'a mut HashSet<T>, key: T) -> Self {
        set.insert(key);
        Self { set, key }
    }
}

impl<T: Copy + Eq + Hash> Drop for MarkGuard<'_, T> {
    fn drop(&mut self) {
        self.set.remove(&self.key);
    }
}
