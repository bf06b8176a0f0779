//! Isolated module workspaces.
//!
//! Every scenario plans against its own temp-dir copy of the module inputs,
//! so concurrent scenarios never contend on lock files, provider caches, or
//! plan artifacts. The copy is released when the workspace drops.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;

use planguard_vars::VarMap;

use crate::error::{DriverError, DriverResult};

/// Name of the plan artifact inside a workspace.
pub const PLAN_FILE: &str = "tfplan";

/// A temp-dir copy of one module directory.
pub struct ModuleWorkspace {
    module_dir: PathBuf,
    temp: TempDir,
}

impl ModuleWorkspace {
    /// Stage an isolated copy of `module_dir`.
    pub fn stage(module_dir: &Path) -> DriverResult<Self> {
        if !module_dir.is_dir() {
            return Err(DriverError::Workspace(format!(
                "module directory does not exist: {}",
                module_dir.display()
            )));
        }

        let temp = TempDir::with_prefix("planguard-")?;

        let options = fs_extra::dir::CopyOptions::new().content_only(true);
        fs_extra::dir::copy(module_dir, temp.path(), &options)
            .map_err(|e| DriverError::Workspace(e.to_string()))?;

        let staged = WalkDir::new(temp.path())
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .count();
        debug!(
            "Staged {} files from {} into {}",
            staged,
            module_dir.display(),
            temp.path().display()
        );

        Ok(Self {
            module_dir: module_dir.to_path_buf(),
            temp,
        })
    }

    /// The isolated directory the tool runs in.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// The module directory this workspace was staged from.
    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    /// Path of the plan artifact inside the workspace.
    pub fn plan_file(&self) -> PathBuf {
        self.temp.path().join(PLAN_FILE)
    }

    /// Write the variable file the tool auto-loads.
    pub fn write_vars(&self, vars: &VarMap) -> DriverResult<PathBuf> {
        Ok(vars.write_tfvars(self.temp.path())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_module() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("main.tf"), "resource \"null_resource\" \"x\" {}\n")
            .unwrap();
        std::fs::create_dir(dir.path().join("templates")).unwrap();
        std::fs::write(dir.path().join("templates/startup.sh"), "#!/bin/sh\n").unwrap();
        dir
    }

    #[test]
    fn test_stage_copies_module_tree() {
        let module = fixture_module();
        let workspace = ModuleWorkspace::stage(module.path()).unwrap();

        assert!(workspace.path().join("main.tf").exists());
        assert!(workspace.path().join("templates/startup.sh").exists());
        assert_ne!(workspace.path(), module.path());
    }

    #[test]
    fn test_stage_missing_module_fails() {
        let result = ModuleWorkspace::stage(Path::new("/nonexistent/module"));
        assert!(matches!(result, Err(DriverError::Workspace(_))));
    }

    #[test]
    fn test_workspaces_are_independent() {
        let module = fixture_module();
        let first = ModuleWorkspace::stage(module.path()).unwrap();
        let second = ModuleWorkspace::stage(module.path()).unwrap();

        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn test_write_vars_lands_in_workspace() {
        let module = fixture_module();
        let workspace = ModuleWorkspace::stage(module.path()).unwrap();

        let vars = VarMap::new().set("project_id", "test-project");
        let path = workspace.write_vars(&vars).unwrap();

        assert!(path.starts_with(workspace.path()));
        assert!(!module.path().join(path.file_name().unwrap()).exists());
    }

    #[test]
    fn test_workspace_released_on_drop() {
        let module = fixture_module();
        let workspace = ModuleWorkspace::stage(module.path()).unwrap();
        let path = workspace.path().to_path_buf();

        drop(workspace);
        assert!(!path.exists());
    }
}
