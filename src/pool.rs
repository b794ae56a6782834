//! # Scratch Pool
//!
//! Reusable scratch objects for grid traversals.
//!
//! ## Purpose
//!
//! Every repeated field visit needs a row-index list, every encode needs a cell
//! accumulator, and every format key with an `:option` suffix needs a
//! [`FieldOption`]. The pool hands these out and takes them back so a long run of
//! encode/decode calls stops allocating after warm-up.
//!
//! ## Usage
//!
//! ```rust
//! use serde_sheet::ScratchPool;
//!
//! let pool = ScratchPool::new();
//! {
//!     let mut rows = pool.acquire_rows();
//!     rows.push(3);
//! } // truncated and returned here
//!
//! assert_eq!(pool.available_rows(), 1);
//! assert!(pool.acquire_rows().is_empty());
//! ```
//!
//! ## Design
//!
//! A `ScratchPool` is a cheap handle (`Arc`) over one `parking_lot::Mutex` shelf
//! per scratch type, so clones share objects and concurrent callers each get
//! their own instance. [`Pooled`] resets its object and shelves it on drop, which
//! covers early returns through `?` as well as normal exits.

use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::grid::CellEntry;
use crate::FieldOption;

/// Objects kept per shelf; anything beyond is dropped on release.
const SHELF_CAPACITY: usize = 64;

/// A scratch object that can be wiped for reuse.
pub trait Reusable: Default {
    /// Returns the object to its freshly-constructed state.
    fn reset(&mut self);
}

impl<T> Reusable for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl Reusable for FieldOption {
    fn reset(&mut self) {
        FieldOption::reset(self);
    }
}

struct Shelf<T>(Mutex<Vec<T>>);

impl<T: Reusable> Shelf<T> {
    fn new() -> Self {
        Shelf(Mutex::new(Vec::new()))
    }

    fn take(&self) -> T {
        self.0.lock().pop().unwrap_or_default()
    }

    fn give_back(&self, mut item: T) {
        item.reset();
        let mut shelf = self.0.lock();
        if shelf.len() < SHELF_CAPACITY {
            shelf.push(item);
        }
    }

    fn len(&self) -> usize {
        self.0.lock().len()
    }
}

struct ScratchPoolInner {
    rows: Shelf<Vec<usize>>,
    cells: Shelf<Vec<CellEntry>>,
    options: Shelf<FieldOption>,
}

/// Explicit pool handle passed to the encoder and decoder.
#[derive(Clone)]
pub struct ScratchPool {
    inner: Arc<ScratchPoolInner>,
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScratchPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchPool")
            .field("rows", &self.inner.rows.len())
            .field("cells", &self.inner.cells.len())
            .field("options", &self.inner.options.len())
            .finish()
    }
}

impl ScratchPool {
    /// Creates an empty pool; objects are allocated on first use.
    #[must_use]
    pub fn new() -> Self {
        ScratchPool {
            inner: Arc::new(ScratchPoolInner {
                rows: Shelf::new(),
                cells: Shelf::new(),
                options: Shelf::new(),
            }),
        }
    }

    /// Acquires an empty row-index list.
    pub fn acquire_rows(&self) -> Pooled<'_, Vec<usize>> {
        Pooled::new(&self.inner.rows)
    }

    /// Acquires a default [`FieldOption`].
    pub fn acquire_option(&self) -> Pooled<'_, FieldOption> {
        Pooled::new(&self.inner.options)
    }

    pub(crate) fn acquire_cells(&self) -> Pooled<'_, Vec<CellEntry>> {
        Pooled::new(&self.inner.cells)
    }

    /// Number of idle row-index lists.
    #[must_use]
    pub fn available_rows(&self) -> usize {
        self.inner.rows.len()
    }

    /// Number of idle cell accumulators.
    #[must_use]
    pub fn available_cells(&self) -> usize {
        self.inner.cells.len()
    }

    /// Number of idle options.
    #[must_use]
    pub fn available_options(&self) -> usize {
        self.inner.options.len()
    }
}

/// A scratch object that is reset and returned to its pool when dropped.
pub struct Pooled<'a, T: Reusable> {
    item: T,
    shelf: &'a Shelf<T>,
}

impl<'a, T: Reusable> Pooled<'a, T> {
    fn new(shelf: &'a Shelf<T>) -> Self {
        Pooled {
            item: shelf.take(),
            shelf,
        }
    }
}

impl<T: Reusable> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T: Reusable> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

impl<T: Reusable> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        self.shelf.give_back(mem::take(&mut self.item));
    }
}
