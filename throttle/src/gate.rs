use crate::Error;

#[derive(Debug, Default)]
struct State {
    capacity: usize,
    in_flight: usize,
    // releases that must be swallowed before slots become available again
    debt: usize,
}

/// Counting admission gate with a capacity that can be changed while permits are held.
///
/// Slots are backed by a [`tokio::sync::Semaphore`], so waiters are admitted in FIFO order and
/// an abandoned [`Gate::acquire`] never consumes a slot. Shrinking the gate below the number of
/// admitted permits does not evict anyone: the difference is recorded as debt and paid off by
/// subsequent releases before new work is admitted again.
#[derive(Debug)]
pub struct Gate {
    sem: tokio::sync::Semaphore,
    state: parking_lot::Mutex<State>,
}

impl Gate {
    /// Creates a gate admitting up to `capacity` permits at once.
    ///
    /// The capacity is clamped to [`tokio::sync::Semaphore::MAX_PERMITS`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = std::cmp::min(capacity, tokio::sync::Semaphore::MAX_PERMITS);
        Self {
            sem: tokio::sync::Semaphore::new(capacity),
            state: parking_lot::Mutex::new(State {
                capacity,
                ..Default::default()
            }),
        }
    }

    /// Waits until a slot is free and takes it.
    ///
    /// Cancel safe: dropping the returned future before it resolves leaves the gate untouched.
    pub async fn acquire(&self) -> Result<Permit<'_>, Error> {
        let permit = self.sem.acquire().await.map_err(|_| Error::Closed)?;
        Ok(self.admit(permit))
    }

    /// Takes a slot if one is free right now.
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        self.sem.try_acquire().ok().map(|permit| self.admit(permit))
    }

    fn admit(&self, permit: tokio::sync::SemaphorePermit<'_>) -> Permit<'_> {
        // slots are handed back explicitly in `release` so that debt can be honored
        permit.forget();
        self.state.lock().in_flight += 1;
        Permit { gate: self }
    }

    fn release(&self) {
        let mut state = self.state.lock();
        state.in_flight -= 1;
        if state.debt > 0 {
            state.debt -= 1;
        } else {
            self.sem.add_permits(1);
        }
    }

    /// Sets the number of slots.
    ///
    /// Growing wakes waiters immediately. Shrinking only affects future admissions; permits
    /// already held stay valid until released.
    pub fn resize(&self, capacity: usize) {
        let capacity = std::cmp::min(capacity, tokio::sync::Semaphore::MAX_PERMITS);
        let mut state = self.state.lock();
        match capacity.cmp(&state.capacity) {
            std::cmp::Ordering::Equal => return,
            std::cmp::Ordering::Greater => {
                let grow = capacity - state.capacity;
                let paid = std::cmp::min(grow, state.debt);
                state.debt -= paid;
                self.sem.add_permits(grow - paid);
            }
            std::cmp::Ordering::Less => {
                let shrink = state.capacity - capacity;
                let forgotten = self.sem.forget_permits(shrink);
                state.debt += shrink - forgotten;
            }
        }
        tracing::trace!(
            from = state.capacity,
            to = capacity,
            in_flight = state.in_flight,
            debt = state.debt,
            "resized gate"
        );
        state.capacity = capacity;
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    /// Number of slots that can be taken without waiting.
    #[must_use]
    pub fn available(&self) -> usize {
        self.sem.available_permits()
    }

    /// Stops admitting work; pending and future [`Gate::acquire`] calls fail with
    /// [`Error::Closed`]. Held permits are unaffected.
    pub fn close(&self) {
        self.sem.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sem.is_closed()
    }
}

/// A slot taken from a [`Gate`], handed back on drop.
#[must_use]
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a Gate,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
