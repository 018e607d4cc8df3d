//! Optimistic mutations with compensation.
//!
//! A command changes cached state right away and knows how to undo itself.
//! [`Optimistic::apply`] runs the command and hands back a pending handle;
//! settling the handle with the outcome of the remote call undoes the change
//! on failure. The handle is consumed, so compensation runs at most once.

/// A change to `T` that can be undone.
pub trait OptimisticCommand<T> {
    /// Make the change, remembering whatever is needed to undo it.
    fn apply(&mut self, target: &mut T);

    /// Undo the change.
    fn compensate(self, target: &mut T);
}

/// An applied command waiting for the remote outcome.
#[derive(Debug)]
#[must_use = "settle the pending change or it can never be rolled back"]
pub struct Optimistic<C> {
    command: C,
}

impl<C> Optimistic<C> {
    /// Apply `command` to `target` immediately.
    pub fn apply<T>(target: &mut T, mut command: C) -> Self
    where
        C: OptimisticCommand<T>,
    {
        command.apply(target);
        Self { command }
    }

    /// Keep the change on `Ok`, undo it on `Err`. Passes `result` through.
    ///
    /// # Errors
    ///
    /// Returns `result` unchanged when it is an error.
    pub fn settle<T, R, E>(self, target: &mut T, result: Result<R, E>) -> Result<R, E>
    where
        C: OptimisticCommand<T>,
    {
        if result.is_err() {
            self.command.compensate(target);
        }
        result
    }

    /// Undo the change unconditionally.
    pub fn rollback<T>(self, target: &mut T)
    where
        C: OptimisticCommand<T>,
    {
        self.command.compensate(target);
    }
}
