/*!
Typed storage for argument values.

Every argument owns one [`Storage`] cell, which holds either a single value or
an ordered sequence of values. A cell normally owns its memory, but it can be
redirected to memory owned by the caller, after which the caller's variable is
the one and only place the value lives.
 */

use core::mem;

/**
A *maybe-owned*, mutable slot. Either the slot owns its value, or it writes
through to a location borrowed from the caller for `'a`.
*/
#[derive(Debug)]
pub enum Slot<'a, T> {
    Owned(T),
    Borrowed(&'a mut T),
}

impl<T> Slot<'_, T> {
    #[inline]
    #[must_use]
    pub fn get(&self) -> &T {
        match *self {
            Self::Owned(ref value) => value,
            Self::Borrowed(ref value) => &**value,
        }
    }

    #[inline]
    #[must_use]
    pub fn get_mut(&mut self) -> &mut T {
        match *self {
            Self::Owned(ref mut value) => value,
            Self::Borrowed(ref mut value) => &mut **value,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        matches!(*self, Self::Owned(_))
    }
}

impl<'a, T: Default> Slot<'a, T> {
    /// Move the current value into `external`, then write through `external`
    /// from now on. Panics if the slot is already borrowed.
    fn redirect(&mut self, external: &'a mut T) {
        assert!(
            self.is_owned(),
            "argument storage was already redirected to external memory"
        );

        *external = mem::take(self.get_mut());
        *self = Self::Borrowed(external);
    }
}

#[derive(Debug)]
enum Cell<'a, T> {
    Single(Slot<'a, T>),
    Multi(Slot<'a, Vec<T>>),
}

/**
The storage cell for a single argument. It's exactly one of single-valued or
multi-valued at a time; see [`Storage::multivalue`].
*/
#[derive(Debug)]
pub struct Storage<'a, T> {
    cell: Cell<'a, T>,
    default: Option<T>,
}

impl<T: Default> Default for Storage<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Default> Storage<'a, T> {
    /// Create a single-valued cell holding `T::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cell: Cell::Single(Slot::Owned(T::default())),
            default: None,
        }
    }

    /**
    Switch this cell to hold a sequence. Any value stored so far is
    discarded, including one that came from a default; the default itself is
    remembered, since some types (such as flags) use it to decide what to
    append.

    If the cell was redirected, the redirection is dropped along with the
    value.
    */
    pub fn multivalue(&mut self) {
        self.cell = Cell::Multi(Slot::Owned(Vec::new()));
    }

    /**
    Move the current value into `external`, and from then on read and write
    through it. Panics if this cell is multi-valued or was already
    redirected.
    */
    pub fn redirect(&mut self, external: &'a mut T) {
        match self.cell {
            Cell::Single(ref mut slot) => slot.redirect(external),
            Cell::Multi(_) => panic!("can't redirect a multi-valued argument to a single value"),
        }
    }

    /**
    Move the current sequence into `external`, and from then on read and
    write through it. Panics if this cell is single-valued or was already
    redirected.
    */
    pub fn redirect_sequence(&mut self, external: &'a mut Vec<T>) {
        match self.cell {
            Cell::Multi(ref mut slot) => slot.redirect(external),
            Cell::Single(_) => panic!("can't redirect a single-valued argument to a sequence"),
        }
    }
}

impl<'a, T> Storage<'a, T> {
    /// Overwrite the value of a single-valued cell, or append to a
    /// multi-valued one.
    pub fn save(&mut self, value: T) {
        match self.cell {
            Cell::Single(ref mut slot) => *slot.get_mut() = value,
            Cell::Multi(ref mut slot) => slot.get_mut().push(value),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_multivalue(&self) -> bool {
        matches!(self.cell, Cell::Multi(_))
    }

    /// False if the cell was redirected to caller-owned memory.
    #[inline]
    #[must_use]
    pub fn owns_memory(&self) -> bool {
        match self.cell {
            Cell::Single(ref slot) => slot.is_owned(),
            Cell::Multi(ref slot) => slot.is_owned(),
        }
    }

    /// The value of a single-valued cell
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self.cell {
            Cell::Single(ref slot) => Some(slot.get()),
            Cell::Multi(_) => None,
        }
    }

    #[must_use]
    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self.cell {
            Cell::Single(ref mut slot) => Some(slot.get_mut()),
            Cell::Multi(_) => None,
        }
    }

    /// The values of a multi-valued cell, in the order they were saved
    #[must_use]
    pub fn values(&self) -> Option<&Vec<T>> {
        match self.cell {
            Cell::Multi(ref slot) => Some(slot.get()),
            Cell::Single(_) => None,
        }
    }

    /// The number of values stored. A single-valued cell always holds one.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.cell {
            Cell::Single(_) => 1,
            Cell::Multi(ref slot) => slot.get().len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }
}

impl<T: Clone> Storage<'_, T> {
    /// Record `value` as the default and store it. Does nothing for a
    /// multi-valued cell, which can only be satisfied by actual values.
    pub fn set_default(&mut self, value: T) -> bool {
        match self.cell {
            Cell::Single(ref mut slot) => {
                *slot.get_mut() = value.clone();
                self.default = Some(value);
                true
            }
            Cell::Multi(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_overwrites() {
        let mut storage = Storage::new();
        assert_eq!(storage.value(), Some(&0));

        storage.save(3);
        storage.save(4);

        assert_eq!(storage.value(), Some(&4));
        assert_eq!(storage.values(), None);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn multi_appends_in_order() {
        let mut storage = Storage::new();
        storage.save(10);
        storage.multivalue();

        assert!(storage.is_empty());

        storage.save(1);
        storage.save(2);

        assert_eq!(storage.values(), Some(&vec![1, 2]));
        assert_eq!(storage.value(), None);
    }

    #[test]
    fn default_is_seeded_but_not_for_multi() {
        let mut storage = Storage::new();
        assert!(storage.set_default(String::from("x")));
        assert_eq!(storage.value().map(String::as_str), Some("x"));
        assert_eq!(storage.default_value().map(String::as_str), Some("x"));

        storage.multivalue();
        assert!(!storage.set_default(String::from("y")));
        assert_eq!(storage.default_value().map(String::as_str), Some("x"));
    }

    #[test]
    fn redirect_moves_current_value() {
        let mut external = String::from("stale");

        {
            let mut storage = Storage::new();
            storage.save(String::from("seed"));
            storage.redirect(&mut external);
            assert!(!storage.owns_memory());
            assert_eq!(storage.value().map(String::as_str), Some("seed"));

            storage.save(String::from("parsed"));
            assert_eq!(storage.value().map(String::as_str), Some("parsed"));
        }

        assert_eq!(external, "parsed");
    }

    #[test]
    fn redirect_sequence() {
        let mut external = vec![99];

        {
            let mut storage = Storage::new();
            storage.multivalue();
            storage.save(1);
            storage.redirect_sequence(&mut external);
            storage.save(2);
        }

        assert_eq!(external, [1, 2]);
    }

    #[test]
    #[should_panic]
    fn redirecting_twice_panics() {
        let mut first = 0;
        let mut second = 0;
        let mut storage = Storage::new();
        storage.redirect(&mut first);
        storage.redirect(&mut second);
    }
}
