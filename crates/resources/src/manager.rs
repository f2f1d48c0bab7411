//! Sessions of attachments over shared resources
//!
//! A [`ResourceManager`] owns a list of attachments, one per
//! [`ManagedResource`] it tracks. Cloning a manager attaches the clone to the
//! same wrappers without sharing the list, so each session releases its own
//! view independently:
//!
//! ```no_run
//! # fn main() -> tempshare_errors::Result<()> {
//! use tempshare_resources::{ResourceManager, TempFileFactory};
//!
//! let mut first = ResourceManager::new(TempFileFactory::default());
//! let path = first.create(Some(".csv.gz"))?;
//!
//! let mut second = first.clone();
//! first.release_all();
//! assert!(std::path::Path::new(&path).exists());
//!
//! second.release_all();
//! assert!(!std::path::Path::new(&path).exists());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tempshare_errors::{Error, ResourceError};
use tracing::{debug, warn};

use crate::managed::{CloseOutcome, ManagedResource};
use crate::resource::ResourceFactory;
use crate::temp::{TempFileFactory, TempSuffix};

/// Counts from one [`ResourceManager::release_all`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseSummary {
    /// Attachments dropped while other managers still hold the resource
    pub detached: usize,
    /// Resources physically closed by this call
    pub released: usize,
    /// Resources whose physical close failed (logged)
    pub failed: usize,
}

impl ReleaseSummary {
    fn record(&mut self, outcome: CloseOutcome) {
        match outcome {
            CloseOutcome::Detached { .. } | CloseOutcome::AlreadyReleased => self.detached += 1,
            CloseOutcome::Released => self.released += 1,
            CloseOutcome::ReleaseFailed => self.failed += 1,
        }
    }

    /// Total attachments removed
    #[must_use]
    pub fn total(&self) -> usize {
        self.detached + self.released + self.failed
    }
}

/// A caller-facing session tracking a set of resource attachments
#[derive(Debug)]
pub struct ResourceManager {
    factory: Arc<TempFileFactory>,
    resources: Vec<Arc<ManagedResource>>,
}

impl ResourceManager {
    /// Empty manager creating temp files through `factory`
    #[must_use]
    pub fn new(factory: TempFileFactory) -> Self {
        Self {
            factory: Arc::new(factory),
            resources: Vec::new(),
        }
    }

    /// New manager attached to every resource `existing` holds.
    ///
    /// Each resource gains one reference; the two managers keep separate lists.
    #[must_use]
    pub fn from_existing(existing: &ResourceManager) -> Self {
        let resources = existing
            .resources
            .iter()
            .map(ManagedResource::reference)
            .collect::<Vec<_>>();
        debug!(attachments = resources.len(), "derived resource manager");
        Self {
            factory: Arc::clone(&existing.factory),
            resources,
        }
    }

    /// Create a temp file, optionally ending in `suffix`, and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the suffix is invalid or the file cannot be created.
    pub fn create(&mut self, suffix: Option<&str>) -> Result<String, Error> {
        let suffix = suffix.map(TempSuffix::parse).transpose()?;
        let factory = Arc::clone(&self.factory);
        let name = self.create_resource(&|| factory.create_file(suffix.as_ref()))?;
        name.ok_or_else(|| Error::internal("temp file created without a name"))
    }

    /// Manufacture a resource with `factory` and attach it to this manager.
    ///
    /// Returns the resource's name, or `None` for an unnamed resource (which
    /// only [`release_all`](Self::release_all) can release). Factory errors
    /// are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the factory's error, or `ResourceError::DuplicateName` if this
    /// manager already holds a resource with the same name. A rejected
    /// resource is dropped without being closed: its name may refer to the
    /// very resource this manager still holds.
    pub fn create_resource(
        &mut self,
        factory: &impl ResourceFactory,
    ) -> Result<Option<String>, Error> {
        let resource = factory.create()?;

        if let Some(name) = resource.name() {
            if self.contains(name) {
                warn!(name = %name, "rejecting duplicate resource name");
                return Err(ResourceError::DuplicateName {
                    name: name.to_string(),
                }
                .into());
            }
        }

        let managed = ManagedResource::new(resource);
        let name = managed.name().map(str::to_owned);
        debug!(name = ?name, attachments = self.resources.len() + 1, "resource attached");
        self.resources.push(managed);
        Ok(name)
    }

    /// Release this manager's attachment to the resource named `identity`.
    ///
    /// Returns `false` if no such attachment exists.
    pub fn release_one(&mut self, identity: &str) -> bool {
        let Some(index) = self
            .resources
            .iter()
            .position(|r| r.name() == Some(identity))
        else {
            debug!(name = %identity, "no attachment to release");
            return false;
        };

        let managed = self.resources.remove(index);
        managed.close();
        true
    }

    /// Release every attachment held by this manager.
    ///
    /// Close failures are logged by the wrapper and never stop the loop; the
    /// list is empty afterwards.
    pub fn release_all(&mut self) -> ReleaseSummary {
        let mut summary = ReleaseSummary::default();
        for managed in self.resources.drain(..) {
            summary.record(managed.close());
        }

        if summary.total() > 0 {
            debug!(
                detached = summary.detached,
                released = summary.released,
                failed = summary.failed,
                "released all attachments"
            );
        }
        summary
    }

    /// Number of attachments
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Whether this manager holds a resource named `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Names of attached resources, in attachment order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().filter_map(|r| r.name())
    }

    /// Shared count of the attached resource named `name`
    #[must_use]
    pub fn ref_count(&self, name: &str) -> Option<usize> {
        self.find(name).map(|r| r.ref_count())
    }

    fn find(&self, name: &str) -> Option<&Arc<ManagedResource>> {
        self.resources.iter().find(|r| r.name() == Some(name))
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(TempFileFactory::default())
    }
}

impl Clone for ResourceManager {
    fn clone(&self) -> Self {
        Self::from_existing(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Named {
        name: Option<String>,
        closed: Arc<Mutex<Vec<String>>>,
    }

    impl Resource for Named {
        fn name(&self) -> Option<&str> {
            self.name.as_deref()
        }

        fn close(&mut self) -> Result<(), ResourceError> {
            let label = self.name.clone().unwrap_or_else(|| "<unnamed>".to_string());
            self.closed.lock().unwrap().push(label);
            Ok(())
        }
    }

    fn named(
        name: Option<&'static str>,
        closed: &Arc<Mutex<Vec<String>>>,
    ) -> impl Fn() -> Result<Named, Error> {
        let closed = Arc::clone(closed);
        move || {
            Ok(Named {
                name: name.map(str::to_string),
                closed: Arc::clone(&closed),
            })
        }
    }

    #[test]
    fn test_create_resource_returns_name() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ResourceManager::default();

        let name = manager.create_resource(&named(Some("a"), &closed)).unwrap();
        assert_eq!(name.as_deref(), Some("a"));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.ref_count("a"), Some(1));
    }

    #[test]
    fn test_factory_error_propagates_unchanged() {
        let mut manager = ResourceManager::default();
        let calls = AtomicUsize::new(0);
        let failing = || -> Result<Named, Error> {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::internal("factory exploded"))
        };

        let err = manager.create_resource(&failing).unwrap_err();
        assert!(matches!(err, Error::Internal(ref msg) if msg == "factory exploded"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected_without_close() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ResourceManager::default();

        manager.create_resource(&named(Some("dup"), &closed)).unwrap();
        let err = manager
            .create_resource(&named(Some("dup"), &closed))
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Resource(ResourceError::DuplicateName { .. })
        ));
        assert_eq!(manager.len(), 1);
        assert!(closed.lock().unwrap().is_empty());
        assert_eq!(manager.ref_count("dup"), Some(1));

        assert_eq!(manager.release_all().released, 1);
        assert_eq!(closed.lock().unwrap().as_slice(), ["dup"]);
    }

    #[test]
    fn test_unnamed_resources_release_with_all() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ResourceManager::default();

        assert_eq!(manager.create_resource(&named(None, &closed)).unwrap(), None);
        assert_eq!(manager.create_resource(&named(None, &closed)).unwrap(), None);
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.names().count(), 0);

        let summary = manager.release_all();
        assert_eq!(summary.released, 2);
        assert_eq!(closed.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_release_one_detaches_only_first_manager() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let mut first = ResourceManager::default();
        first.create_resource(&named(Some("r"), &closed)).unwrap();
        let mut second = first.clone();

        assert!(first.release_one("r"));
        assert!(!first.contains("r"));
        assert!(!first.release_one("r"));
        assert_eq!(second.ref_count("r"), Some(1));
        assert!(closed.lock().unwrap().is_empty());

        assert!(second.release_one("r"));
        assert_eq!(closed.lock().unwrap().as_slice(), ["r"]);
    }

    #[test]
    fn test_release_one_miss_is_false() {
        let mut manager = ResourceManager::default();
        assert!(!manager.release_one("missing"));
    }

    #[test]
    fn test_release_all_order_is_insertion_order() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ResourceManager::default();
        for name in ["x", "y", "z"] {
            manager.create_resource(&named(Some(name), &closed)).unwrap();
        }

        let summary = manager.release_all();
        assert_eq!(
            summary,
            ReleaseSummary {
                detached: 0,
                released: 3,
                failed: 0
            }
        );
        assert_eq!(closed.lock().unwrap().as_slice(), ["x", "y", "z"]);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_release_all_twice_is_noop() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ResourceManager::default();
        manager.create_resource(&named(Some("once"), &closed)).unwrap();

        assert_eq!(manager.release_all().released, 1);
        assert_eq!(manager.release_all(), ReleaseSummary::default());
        assert_eq!(closed.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_clone_keeps_separate_lists() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let mut first = ResourceManager::default();
        first.create_resource(&named(Some("shared"), &closed)).unwrap();

        let mut second = first.clone();
        first.create_resource(&named(Some("own"), &closed)).unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(second.ref_count("shared"), Some(2));
        assert!(!second.contains("own"));

        let summary = second.release_all();
        assert_eq!(summary.detached, 1);
        assert_eq!(first.ref_count("shared"), Some(1));
    }

    #[test]
    fn test_manager_reusable_after_release_all() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ResourceManager::default();
        manager.create_resource(&named(Some("a"), &closed)).unwrap();
        manager.release_all();

        manager.create_resource(&named(Some("a"), &closed)).unwrap();
        assert_eq!(manager.ref_count("a"), Some(1));
    }

    #[test]
    fn test_dropping_last_manager_closes_via_safety_net() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ResourceManager::default();
        manager.create_resource(&named(Some("leak"), &closed)).unwrap();
        let sibling = manager.clone();

        drop(manager);
        assert!(closed.lock().unwrap().is_empty());
        drop(sibling);
        assert_eq!(closed.lock().unwrap().as_slice(), ["leak"]);
    }
}
