//! The closeable handle abstraction and the factories that produce it

use std::fmt::Debug;

use tempshare_errors::{Error, ResourceError};

/// An externally backed handle with a lookup name and a close operation.
///
/// Implementations are owned by exactly one [`ManagedResource`](crate::ManagedResource),
/// which calls [`Resource::close`] at most once.
pub trait Resource: Send + Debug {
    /// Lookup identity, if the handle has one
    fn name(&self) -> Option<&str>;

    /// Physically release the backing resource
    ///
    /// # Errors
    ///
    /// Returns an error if the backing resource could not be released.
    fn close(&mut self) -> Result<(), ResourceError>;

    /// Whether the backing resource is still present
    fn exists(&self) -> bool {
        true
    }
}

/// Manufactures resources on behalf of a [`ResourceManager`](crate::ResourceManager)
pub trait ResourceFactory {
    /// Create a new physical resource
    ///
    /// # Errors
    ///
    /// Returns whatever error the underlying creation step raised.
    fn create(&self) -> Result<Box<dyn Resource>, Error>;
}

impl<F, R> ResourceFactory for F
where
    F: Fn() -> Result<R, Error>,
    R: Resource + 'static,
{
    fn create(&self) -> Result<Box<dyn Resource>, Error> {
        let resource = self()?;
        Ok(Box::new(resource))
    }
}
