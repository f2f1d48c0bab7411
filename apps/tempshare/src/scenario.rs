//! Scripted fan-out runs over cloned managers

use serde::Serialize;
use std::path::Path;
use tempshare_errors::Error;
use tempshare_resources::{Compression, ResourceManager, TempFileFactory};
use tracing::{info, warn};

/// How each manager lets go of the shared file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseMethod {
    ReleaseOne,
    ReleaseAll,
    Drop,
}

/// Parameters of one fan-out run
#[derive(Debug, Clone)]
pub struct FanoutPlan {
    pub clones: usize,
    pub suffix: Option<String>,
    pub keep: usize,
    pub by_name: bool,
}

/// One release and what it left behind
#[derive(Debug, Clone, Serialize)]
pub struct FanoutStep {
    pub manager: usize,
    pub method: ReleaseMethod,
    /// Attachments this manager let go of
    pub detached: usize,
    pub remaining: usize,
    pub exists: bool,
}

/// Result of a fan-out run
#[derive(Debug, Clone, Serialize)]
pub struct FanoutReport {
    pub path: String,
    pub compressed: bool,
    pub managers: usize,
    pub steps: Vec<FanoutStep>,
}

impl FanoutReport {
    /// Whether the file is gone once every manager has let go
    #[must_use]
    pub fn cleaned_up(&self) -> bool {
        self.steps.last().is_some_and(|s| !s.exists)
    }
}

/// Create one file, clone the owning manager `plan.clones` times (each clone
/// taken from the previous one), then release managers in creation order.
///
/// # Errors
///
/// Returns an error if the file cannot be created.
pub fn run_fanout(factory: TempFileFactory, plan: &FanoutPlan) -> Result<FanoutReport, Error> {
    let mut root = ResourceManager::new(factory);
    let path = root.create(plan.suffix.as_deref())?;
    info!(path = %path, clones = plan.clones, "starting fan-out");

    let mut managers = vec![root];
    for _ in 0..plan.clones {
        let next = managers[managers.len() - 1].clone();
        managers.push(next);
    }

    let total = managers.len();
    let released = total.saturating_sub(plan.keep);
    let kept = managers.split_off(released);
    let mut steps = Vec::with_capacity(total);

    for (index, mut manager) in managers.into_iter().enumerate() {
        let (method, detached) = if plan.by_name {
            let found = manager.release_one(&path);
            if !found {
                warn!(manager = index, path = %path, "manager held no attachment to release");
            }
            (ReleaseMethod::ReleaseOne, usize::from(found))
        } else {
            (ReleaseMethod::ReleaseAll, manager.release_all().total())
        };
        steps.push(FanoutStep {
            manager: index,
            method,
            detached,
            remaining: remaining_count(&kept, &path, total - index - 1),
            exists: Path::new(&path).exists(),
        });
    }

    for (offset, manager) in kept.into_iter().enumerate() {
        let detached = manager.len();
        drop(manager);
        let index = released + offset;
        steps.push(FanoutStep {
            manager: index,
            method: ReleaseMethod::Drop,
            detached,
            remaining: total - index - 1,
            exists: Path::new(&path).exists(),
        });
    }

    Ok(FanoutReport {
        compressed: Compression::detect(&path).is_some(),
        path,
        managers: total,
        steps,
    })
}

// Kept managers report the live count; otherwise the attachments still
// outstanding equal the managers not yet released.
fn remaining_count(kept: &[ResourceManager], path: &str, outstanding: usize) -> usize {
    kept.first()
        .and_then(|m| m.ref_count(path))
        .unwrap_or(outstanding)
}
