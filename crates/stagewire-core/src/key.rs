//! Typed service keys.
//!
//! A [`Key`] pairs a service name with the type of the value stored under
//! it. Contracts, definitions and reads that go through the same key cannot
//! disagree on that type, so the mismatch is caught by the compiler instead
//! of at invocation.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::signature::Signature;

/// A service name bound to its value type at compile time.
///
/// ```
/// use stagewire_core::Key;
///
/// type Multiply = Box<dyn Fn(i64) -> i64 + Send + Sync>;
/// const MULTIPLY: Key<Multiply> = Key::new("multiply");
/// assert_eq!(MULTIPLY.name(), "multiply");
/// ```
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    /// Creates a key. The name is validated when the key is first used.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Returns the service name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: Any> Key<T> {
    /// Returns the signature of the keyed type.
    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature::of::<T>()
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}
