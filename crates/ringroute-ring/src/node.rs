//! The node identity capability.

use std::rc::Rc;
use std::sync::Arc;

/// Anything that can sit on the ring.
///
/// The ring only needs a stable key that is unique among the registered
/// nodes; it never looks at anything else.
pub trait Node {
    /// The node's identifying key.
    fn key(&self) -> &str;
}

impl Node for str {
    fn key(&self) -> &str {
        self
    }
}

impl Node for String {
    fn key(&self) -> &str {
        self
    }
}

impl<T: Node + ?Sized> Node for &T {
    fn key(&self) -> &str {
        (**self).key()
    }
}

impl<T: Node + ?Sized> Node for Box<T> {
    fn key(&self) -> &str {
        (**self).key()
    }
}

impl<T: Node + ?Sized> Node for Rc<T> {
    fn key(&self) -> &str {
        (**self).key()
    }
}

impl<T: Node + ?Sized> Node for Arc<T> {
    fn key(&self) -> &str {
        (**self).key()
    }
}
