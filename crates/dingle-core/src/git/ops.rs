//! Local git plumbing through the system `git` binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use crate::config::DingleConfig;
use crate::error::{DingleError, Result};

/// Inherited variables that would point git at some other repository.
const GIT_ENV_OVERRIDES: [&str; 4] = ["GIT_DIR", "GIT_WORK_TREE", "GIT_INDEX_FILE", "GIT_COMMON_DIR"];

/// Directory a repository clones into: the URL basename without `.git`.
pub fn dir_from_repo(repository: &str) -> String {
    let base = repository
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(repository);
    base.strip_suffix(".git").unwrap_or(base).to_string()
}

/// Clones, merges and tags repositories under a staging directory.
#[derive(Debug, Clone)]
pub struct GitOps {
    staging_dir: PathBuf,
    envs: Vec<(String, String)>,
}

impl GitOps {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            envs: Vec::new(),
        }
    }

    pub fn from_config(config: &DingleConfig) -> Self {
        Self::new(config.staging_dir.clone())
    }

    /// Set an environment variable for every git invocation.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Where `repository` is (or will be) cloned.
    pub fn repo_dir(&self, repository: &str) -> PathBuf {
        self.staging_dir.join(dir_from_repo(repository))
    }

    /// Clone `repository` into the staging directory, replacing a stale clone.
    pub fn clone_repo(&self, repository: &str) -> Result<()> {
        std::fs::create_dir_all(&self.staging_dir)?;

        let target = self.repo_dir(repository);
        if target.exists() {
            warn!("removing stale clone {}", target.display());
            std::fs::remove_dir_all(&target)?;
        }

        info!("cloning {}", repository);
        self.run_git(&self.staging_dir, &["clone", repository])
            .map(|_| ())
            .map_err(|err| DingleError::CloneFailure {
                repository: repository.to_string(),
                message: err.to_string(),
            })
    }

    /// Merge `from` into `into` and push `into` if the merge succeeds.
    pub fn merge(&self, from: &str, into: &str, repository: &str) -> Result<()> {
        let repo = self.repo_dir(repository);
        self.run_git(&repo, &["checkout", from])?;
        self.run_git(&repo, &["pull", "origin", from])?;
        self.run_git(&repo, &["checkout", into])?;
        self.run_git(&repo, &["pull", "origin", into])?;

        info!("merging {} into {} in {}", from, into, repository);
        self.run_git(&repo, &["merge", from])
            .map_err(|err| DingleError::MergeConflict {
                repository: repository.to_string(),
                message: err.to_string(),
            })?;
        self.run_git(&repo, &["push", "origin", into])?;
        Ok(())
    }

    /// Annotate `branch` with `tag` and push tags.
    pub fn tag(&self, tag: &str, branch: &str, repository: &str) -> Result<()> {
        let repo = self.repo_dir(repository);
        self.run_git(&repo, &["checkout", branch])?;

        info!("tagging {} in {} as {}", branch, repository, tag);
        self.run_git(&repo, &["tag", "-a", tag, "-m", tag])?;
        self.run_git(&repo, &["push", "--tags"])?;
        Ok(())
    }

    /// Clone, merge `dev` into `master` and tag `master` for each repository,
    /// stopping at the first failure. Returns the repositories processed.
    pub fn merge_and_tag<S: AsRef<str>>(&self, tag: &str, repositories: &[S]) -> Result<Vec<String>> {
        let mut done = Vec::with_capacity(repositories.len());
        for repository in repositories {
            let repository = repository.as_ref();
            self.clone_repo(repository)?;
            self.merge("dev", "master", repository)?;
            self.tag(tag, "master", repository)?;
            done.push(repository.to_string());
        }
        Ok(done)
    }

    /// Run a git command and return its stdout.
    fn run_git(&self, cwd: &Path, args: &[&str]) -> Result<String> {
        debug!("git {} (in {})", args.join(" "), cwd.display());
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(cwd);
        for key in GIT_ENV_OVERRIDES {
            cmd.env_remove(key);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        let output = cmd.output().map_err(|source| DingleError::RemoteSpawn {
            program: "git".to_string(),
            source,
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let message = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(DingleError::GitCommandFailed {
                args: args.join(" "),
                message: message.trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
