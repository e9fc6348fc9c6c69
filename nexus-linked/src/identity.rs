//! Identity capability for list and ring payloads.
//!
//! Lookups ([`List::get`](crate::List::get), [`Ring::find`](crate::Ring::find))
//! compare the string returned by [`Identify::id`]. The collections never
//! enforce uniqueness: the first match in traversal order wins.

use std::rc::Rc;
use std::sync::Arc;

/// A payload with a stable, caller-assigned identity string.
///
/// # Example
///
/// ```
/// use nexus_linked::Identify;
///
/// struct Session {
///     id: String,
///     user: u64,
/// }
///
/// impl Identify for Session {
///     fn id(&self) -> &str {
///         &self.id
///     }
/// }
///
/// let session = Session { id: "s-1".into(), user: 7 };
/// assert_eq!(session.id(), "s-1");
/// ```
pub trait Identify {
    /// Returns the identity used for lookup.
    ///
    /// Must not change while the value is stored in a collection.
    fn id(&self) -> &str;
}

impl Identify for str {
    #[inline]
    fn id(&self) -> &str {
        self
    }
}

impl Identify for String {
    #[inline]
    fn id(&self) -> &str {
        self
    }
}

impl<T: Identify + ?Sized> Identify for &T {
    #[inline]
    fn id(&self) -> &str {
        (**self).id()
    }
}

impl<T: Identify + ?Sized> Identify for Box<T> {
    #[inline]
    fn id(&self) -> &str {
        (**self).id()
    }
}

impl<T: Identify + ?Sized> Identify for Rc<T> {
    #[inline]
    fn id(&self) -> &str {
        (**self).id()
    }
}

impl<T: Identify + ?Sized> Identify for Arc<T> {
    #[inline]
    fn id(&self) -> &str {
        (**self).id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order {
        id: String,
    }

    impl Identify for Order {
        fn id(&self) -> &str {
            &self.id
        }
    }

    #[test]
    fn string_is_its_own_identity() {
        let s = String::from("abc");
        assert_eq!(s.id(), "abc");
        assert_eq!("xyz".id(), "xyz");
    }

    #[test]
    fn pointers_forward_identity() {
        let order = Order { id: "o-1".into() };
        assert_eq!((&order).id(), "o-1");

        let boxed = Box::new(Order { id: "o-2".into() });
        assert_eq!(boxed.id(), "o-2");

        let shared = Arc::new(Order { id: "o-3".into() });
        assert_eq!(shared.id(), "o-3");

        let local = Rc::new(Order { id: "o-4".into() });
        assert_eq!(local.id(), "o-4");
    }
}
