#![deny(clippy::pedantic, unsafe_code)]

//! Reference-counted lifetime management for temporary resources
//!
//! A [`ResourceManager`] is a session of attachments over shared
//! [`ManagedResource`] wrappers. Cloning a manager attaches the clone to every
//! resource the source holds; a resource is physically closed exactly once,
//! when the last attachment is released.

pub mod managed;
pub mod manager;
pub mod resource;
pub mod temp;

pub use managed::{CloseOutcome, ManagedResource};
pub use manager::{ReleaseSummary, ResourceManager};
pub use resource::{Resource, ResourceFactory};
pub use temp::{Compression, TempFile, TempFileFactory, TempSuffix};
