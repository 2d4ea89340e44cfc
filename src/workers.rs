// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An order-preserving parallel map over a scoped pool of worker
//! threads.  The input is scattered across the workers in contiguous
//! chunks, and the chunks are gathered back in input order, so the
//! output never depends on how the workers were scheduled.

use crate::error::{MandelbrotError, Result};

/// Applies `func` to every item using `tasks` workers and returns the
/// results in input order.  The pool lives only for this call.
pub fn scatter_gather<T, U, F>(tasks: usize, items: &[T], func: F) -> Result<Vec<U>>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync,
{
    if tasks < 1 {
        return Err(MandelbrotError::InvalidTaskCount(tasks));
    }
    if items.is_empty() {
        return Ok(Vec::new());
    }

    // No more workers than items, so the chunk size cannot overflow.
    let workers = tasks.min(items.len());
    let chunk_size = (items.len() + workers - 1) / workers;
    let func = &func;
    crossbeam::scope(|spawner| {
        let handles: Vec<_> = items
            .chunks(chunk_size)
            .map(|chunk| spawner.spawn(move |_| chunk.iter().map(func).collect::<Vec<U>>()))
            .collect();
        debug!("Scattered {} items across {} workers", items.len(), handles.len());

        let mut gathered = Vec::with_capacity(items.len());
        for handle in handles {
            let part = handle.join().map_err(|_| MandelbrotError::WorkerPanicked)?;
            gathered.extend(part);
        }
        Ok(gathered)
    })
    .map_err(|_| MandelbrotError::WorkerPanicked)?
}
