// Copyright 2025 Lars Brubaker
// License: MIT
//
// Parallel-for over pre-sized output slots.

use rayon::prelude::*;

use crate::error::Result;

/// Run `f(index, slot)` for every slot, on the rayon pool when `parallel`
/// is set.  Each call owns its slot, so no locking is needed.  The first
/// error seen stops the loop; which one is reported is unspecified when
/// running in parallel.
pub fn for_each_slot<T, F>(slots: &mut [T], parallel: bool, f: F) -> Result<()>
where
    T: Send,
    F: Fn(usize, &mut T) -> Result<()> + Sync + Send,
{
    if parallel {
        slots
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(i, slot)| f(i, slot))
    } else {
        slots
            .iter_mut()
            .enumerate()
            .try_for_each(|(i, slot)| f(i, slot))
    }
}
