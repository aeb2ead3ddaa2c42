//! Argument-vector construction for the mirroring tool.
//!
//! Arguments are always passed to the spawn primitive as a vector, never as
//! a shell-concatenated string, so paths containing spaces or special
//! characters need no quoting.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use mirror_core::types::SyncPlan;

/// List-only flag appended for the validation phase. The tool simulates the
/// mirror without touching the destination.
pub const SIMULATE_FLAG: &str = "/L";

/// Flag preceding each excluded directory name.
pub const EXCLUDE_DIR_FLAG: &str = "/XD";

/// One fully-constructed call to the mirroring tool for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    tool: PathBuf,
    args: Vec<OsString>,
    simulate: bool,
}

impl ToolInvocation {
    /// Invocation for the real mirror pass.
    pub fn real(plan: &SyncPlan, destination: &Path) -> Self {
        Self::build(plan, destination, false)
    }

    /// Invocation for the dry-run validation pass (`/L` appended).
    pub fn simulated(plan: &SyncPlan, destination: &Path) -> Self {
        Self::build(plan, destination, true)
    }

    fn build(plan: &SyncPlan, destination: &Path, simulate: bool) -> Self {
        let mut args: Vec<OsString> = Vec::with_capacity(
            2 + plan.tool_options.len() + 2 * plan.exclusions.len() + usize::from(simulate),
        );
        args.push(plan.source.as_os_str().to_owned());
        args.push(destination.as_os_str().to_owned());
        for option in &plan.tool_options {
            args.push(OsString::from(option));
        }
        for exclusion in &plan.exclusions {
            args.push(OsString::from(EXCLUDE_DIR_FLAG));
            args.push(OsString::from(exclusion));
        }
        if simulate {
            args.push(OsString::from(SIMULATE_FLAG));
        }
        Self {
            tool: plan.tool.clone(),
            args,
            simulate,
        }
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn is_simulate(&self) -> bool {
        self.simulate
    }
}
