//! Ownership handles for values handed to callers
//!
//! A [`Handle`] owns its value outright. An *attached* handle may carry a
//! release action that receives the value when the handle is released or
//! dropped; an *adopted* handle owns a private copy and simply frees it.

use std::fmt;
use std::ops::Deref;

/// Action run on an attached value when its handle goes away
pub type ReleaseFn<T> = Box<dyn FnOnce(T)>;

/// How a handle came to own its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// Wraps a value supplied by the caller, with an optional release action
    Attached,
    /// Owns a copy taken from a borrowed value
    Adopted,
}

/// Exclusive owner of one value
pub struct Handle<T> {
    value: Option<T>,
    release: Option<ReleaseFn<T>>,
    kind: HandleKind,
}

impl<T> Handle<T> {
    /// Wrap `value`, running `release` on it when the handle is released
    pub fn attach(value: T, release: Option<ReleaseFn<T>>) -> Self {
        Self {
            value: Some(value),
            release,
            kind: HandleKind::Attached,
        }
    }

    /// Take ownership of a copy of `value`
    pub fn adopt_copy(value: &T) -> Self
    where
        T: Clone,
    {
        Self {
            value: Some(value.clone()),
            release: None,
            kind: HandleKind::Adopted,
        }
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    /// Whether releasing this handle runs an action
    pub fn has_release_action(&self) -> bool {
        self.release.is_some()
    }

    /// Release the handle now, running its release action if any
    pub fn release(mut self) {
        self.run_release();
    }

    /// Give up the value without running the release action
    pub fn into_inner(mut self) -> T {
        self.release = None;
        match self.value.take() {
            Some(value) => value,
            // value is only taken by release paths that consume the handle
            None => unreachable!("handle value already released"),
        }
    }

    fn run_release(&mut self) {
        if let Some(value) = self.value.take() {
            if let Some(release) = self.release.take() {
                release(value);
            }
        }
    }
}

impl<T> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.value {
            Some(value) => value,
            None => unreachable!("handle value already released"),
        }
    }
}

impl<T> AsRef<T> for Handle<T> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T> Drop for Handle<T> {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("release", &self.release.is_some())
            .finish()
    }
}
