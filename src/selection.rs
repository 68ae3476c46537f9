//! The selected-body index shared between the UI and the render loop.
//!
//! [`SelectionHandle`] is a cheap clone around one atomic. The host keeps a
//! clone to drive selection from input handlers on any thread; the scene
//! keeps another and reads it once per frame. Every mutation is a single
//! atomic update, so the index is always inside `[0, count)`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A rejected selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("selection index {index} is outside 0..{count}")]
    OutOfRange { index: i64, count: usize },
}

/// Shared, wrapping index into a fixed-size catalog.
#[derive(Clone, Debug)]
pub struct SelectionHandle {
    index: Arc<AtomicUsize>,
    count: usize,
}

impl SelectionHandle {
    /// Creates a handle over `count` entries starting at `initial`.
    pub fn new(initial: i64, count: usize) -> Result<Self, SelectionError> {
        let index = validate(initial, count)?;
        Ok(Self {
            index: Arc::new(AtomicUsize::new(index)),
            count,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn get_selected_index(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }

    /// Moves to the following entry, wrapping to 0. Returns the new index.
    pub fn select_next(&self) -> usize {
        self.step(|i, n| (i + 1) % n)
    }

    /// Moves to the preceding entry, wrapping to `count - 1`. Returns the new index.
    pub fn select_prev(&self) -> usize {
        self.step(|i, n| (i + n - 1) % n)
    }

    /// Jumps to `index`. Out-of-range values leave the selection unchanged.
    pub fn set_selected_index(&self, index: i64) -> Result<usize, SelectionError> {
        let index = validate(index, self.count)?;
        self.index.store(index, Ordering::Release);
        Ok(index)
    }

    fn step(&self, f: impl Fn(usize, usize) -> usize) -> usize {
        let n = self.count;
        let previous = self
            .index
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some(f(i, n)))
            .unwrap_or_else(|i| i);
        f(previous, n)
    }
}

fn validate(index: i64, count: usize) -> Result<usize, SelectionError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < count)
        .ok_or(SelectionError::OutOfRange { index, count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_wraps_from_last_to_first() {
        let selection = SelectionHandle::new(9, 10).unwrap();
        assert_eq!(selection.select_next(), 0);
        assert_eq!(selection.get_selected_index(), 0);
    }

    #[test]
    fn prev_wraps_from_first_to_last() {
        let selection = SelectionHandle::new(0, 10).unwrap();
        assert_eq!(selection.select_prev(), 9);
        assert_eq!(selection.get_selected_index(), 9);
    }

    #[test]
    fn out_of_range_set_is_rejected_and_keeps_state() {
        let selection = SelectionHandle::new(3, 10).unwrap();

        assert_eq!(
            selection.set_selected_index(10),
            Err(SelectionError::OutOfRange {
                index: 10,
                count: 10
            })
        );
        assert_eq!(
            selection.set_selected_index(-1),
            Err(SelectionError::OutOfRange {
                index: -1,
                count: 10
            })
        );
        assert_eq!(selection.get_selected_index(), 3);

        assert_eq!(selection.set_selected_index(7), Ok(7));
        assert_eq!(selection.get_selected_index(), 7);
    }

    #[test]
    fn invalid_initial_index_is_rejected() {
        assert!(SelectionHandle::new(10, 10).is_err());
        assert!(SelectionHandle::new(0, 0).is_err());
    }

    #[test]
    fn clones_share_the_index() {
        let ui = SelectionHandle::new(0, 10).unwrap();
        let render = ui.clone();
        ui.select_next();
        ui.select_next();
        assert_eq!(render.get_selected_index(), 2);
    }

    #[test]
    fn concurrent_steps_stay_in_range_and_balance() {
        let selection = SelectionHandle::new(0, 10).unwrap();

        let threads: Vec<_> = (0..4)
            .map(|t| {
                let handle = selection.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let i = if t % 2 == 0 {
                            handle.select_next()
                        } else {
                            handle.select_prev()
                        };
                        assert!(i < 10);
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }

        // Two threads stepped forward 2000 times, two backward 2000 times.
        assert_eq!(selection.get_selected_index(), 0);
    }
}
