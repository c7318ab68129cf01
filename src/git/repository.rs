use crate::error::{ReleaseError, Result};
use git2::{
    Cred, CredentialType, ErrorClass, ErrorCode, IndexAddOption, PushOptions, RemoteCallbacks,
    Repository as Git2Repo, Status, StatusOptions,
};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Root of the working tree
    pub fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ReleaseError::config("Repository is bare; a working tree is required"))
    }

    fn push_refspecs(&self, remote_name: &str, refspecs: &[String]) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|e| {
            ReleaseError::command(format!("No remote named '{}': {}", remote_name, e))
        })?;

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(remote_callbacks(self.repo.config().ok()));

        let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();
        debug!(remote = remote_name, refspecs = ?refspec_strs, "pushing");

        remote
            .push(&refspec_strs, Some(&mut push_options))
            .map_err(|e| match e.class() {
                ErrorClass::Net => ReleaseError::command(format!("Network error during push: {}", e)),
                ErrorClass::Reference => {
                    ReleaseError::command(format!("Reference error during push: {}", e))
                }
                _ => ReleaseError::command(format!("Push to '{}' failed: {}", remote_name, e)),
            })?;

        info!(remote = remote_name, count = refspecs.len(), "push complete");
        Ok(())
    }
}

/// One way of authenticating against a remote, tried at most once per push
#[derive(Debug, Clone, PartialEq)]
enum CredentialSource {
    Username,
    SshKey(PathBuf),
    SshAgent,
    CredentialHelper,
    Default,
}

impl CredentialSource {
    fn allowed_by(&self, allowed: CredentialType) -> bool {
        match self {
            CredentialSource::Username => allowed.contains(CredentialType::USERNAME),
            CredentialSource::SshKey(_) | CredentialSource::SshAgent => {
                allowed.contains(CredentialType::SSH_KEY)
            }
            CredentialSource::CredentialHelper => {
                allowed.contains(CredentialType::USER_PASS_PLAINTEXT)
            }
            CredentialSource::Default => allowed.contains(CredentialType::DEFAULT),
        }
    }
}

/// Remaining credential sources for one push. libgit2 calls back again after
/// a rejected credential, so each source is handed out only once and the
/// push fails when they run out.
#[derive(Debug)]
struct CredentialAttempts {
    remaining: VecDeque<CredentialSource>,
}

impl CredentialAttempts {
    fn new(ssh_dir: Option<PathBuf>) -> Self {
        let mut remaining = VecDeque::from([CredentialSource::Username]);
        if let Some(ssh_dir) = ssh_dir {
            for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                let path = ssh_dir.join(key);
                if path.exists() {
                    remaining.push_back(CredentialSource::SshKey(path));
                }
            }
        }
        remaining.extend([
            CredentialSource::SshAgent,
            CredentialSource::CredentialHelper,
            CredentialSource::Default,
        ]);
        CredentialAttempts { remaining }
    }

    /// Next untried source the remote accepts, dropping ones it does not
    fn next_allowed(&mut self, allowed: CredentialType) -> Option<CredentialSource> {
        while let Some(source) = self.remaining.pop_front() {
            if source.allowed_by(allowed) {
                return Some(source);
            }
        }
        None
    }
}

/// Credential and push-status callbacks shared by every push.
///
/// Tries SSH keys from ~/.ssh, then the SSH agent, then the git credential
/// helper for HTTPS remotes, then libgit2 defaults. Each is tried once.
fn remote_callbacks<'a>(git_config: Option<git2::Config>) -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = CredentialAttempts::new(dirs::home_dir().map(|home| home.join(".ssh")));

    callbacks.credentials(move |url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        while let Some(source) = attempts.next_allowed(allowed_types) {
            let cred = match &source {
                CredentialSource::Username => Cred::username(username),
                CredentialSource::SshKey(path) => Cred::ssh_key(username, None, path, None),
                CredentialSource::SshAgent => Cred::ssh_key_from_agent(username),
                CredentialSource::CredentialHelper => match git_config.as_ref() {
                    Some(config) => Cred::credential_helper(config, url, username_from_url),
                    None => continue,
                },
                CredentialSource::Default => Cred::default(),
            };
            match cred {
                Ok(cred) => {
                    debug!(source = ?source, "offering credential");
                    return Ok(cred);
                }
                Err(e) => debug!(source = ?source, error = %e, "credential unavailable"),
            }
        }

        Err(git2::Error::from_str("authentication failed"))
    });

    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => Err(git2::Error::from_str(&format!(
            "Remote rejected {}: {}",
            refname, status
        ))),
        None => Ok(()),
    });

    callbacks
}

/// Two-letter `git status --porcelain` code for a libgit2 status
fn porcelain_code(status: Status) -> &'static str {
    if status.is_conflicted() {
        return "UU";
    }
    if status.is_wt_new() && !status.is_index_new() {
        return "??";
    }

    let index = if status.is_index_new() {
        'A'
    } else if status.is_index_modified() {
        'M'
    } else if status.is_index_deleted() {
        'D'
    } else if status.is_index_renamed() {
        'R'
    } else if status.is_index_typechange() {
        'T'
    } else {
        ' '
    };

    let worktree = if status.is_wt_modified() {
        'M'
    } else if status.is_wt_deleted() {
        'D'
    } else if status.is_wt_renamed() {
        'R'
    } else if status.is_wt_typechange() {
        'T'
    } else {
        ' '
    };

    match (index, worktree) {
        ('A', ' ') => "A ",
        ('A', 'M') => "AM",
        ('A', 'D') => "AD",
        ('M', ' ') => "M ",
        ('M', 'M') => "MM",
        ('M', 'D') => "MD",
        ('D', _) => "D ",
        ('R', ' ') => "R ",
        ('R', 'M') => "RM",
        ('T', _) => "T ",
        (' ', 'M') => " M",
        (' ', 'D') => " D",
        (' ', 'R') => " R",
        (' ', 'T') => " T",
        _ => "??",
    }
}

impl super::Repository for Git2Repository {
    fn current_branch(&self) -> Result<String> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head_ref = self.repo.find_reference("HEAD")?;
                let name = head_ref
                    .symbolic_target()
                    .and_then(|target| target.strip_prefix("refs/heads/"))
                    .unwrap_or_default()
                    .to_string();
                return Ok(name);
            }
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            Ok(head.shorthand().unwrap_or_default().to_string())
        } else {
            Ok(String::new())
        }
    }

    fn status(&self) -> Result<Vec<String>> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .include_ignored(false)
            .renames_head_to_index(true);

        let statuses = self.repo.statuses(Some(&mut options))?;

        let changes = statuses
            .iter()
            .filter(|entry| !entry.status().is_ignored())
            .map(|entry| {
                format!(
                    "{} {}",
                    porcelain_code(entry.status()),
                    entry.path().unwrap_or("(non-utf8 path)")
                )
            })
            .collect();

        Ok(changes)
    }

    fn stage(&self, paths: &[&str]) -> Result<()> {
        let workdir = self.workdir()?;
        let mut index = self.repo.index()?;

        for path in paths {
            let relative = path.trim_end_matches('/');
            let absolute = workdir.join(relative);

            if absolute.is_dir() {
                index.add_all([relative], IndexAddOption::DEFAULT, None)?;
                index.update_all([relative], None)?;
            } else if absolute.is_file() {
                index.add_path(Path::new(relative))?;
            } else if index.get_path(Path::new(relative), 0).is_some() {
                index.remove_path(Path::new(relative))?;
            } else {
                return Err(ReleaseError::command(format!(
                    "pathspec '{}' did not match any files",
                    path
                )));
            }
            debug!(path = relative, "staged");
        }

        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = &parent {
            if parent.tree_id() == tree_oid {
                return Err(ReleaseError::command("nothing to commit, working tree clean"));
            }
        }

        let signature = self.repo.signature()?;
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        info!(commit = %oid, summary = message, "created commit");
        Ok(oid.to_string())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo
            .tag_lightweight(name, head.as_object(), false)
            .map_err(|e| ReleaseError::command(format!("Cannot create tag '{}': {}", name, e)))?;

        info!(tag = name, commit = %head.id(), "created tag");
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);
        self.push_refspecs(remote, &[refspec])
    }

    fn push_tags(&self, remote: &str) -> Result<()> {
        let tags = self.repo.tag_names(None)?;
        let refspecs: Vec<String> = tags
            .iter()
            .flatten()
            .map(|tag| format!("refs/tags/{}:refs/tags/{}", tag, tag))
            .collect();

        if refspecs.is_empty() {
            debug!(remote, "no tags to push");
            return Ok(());
        }

        self.push_refspecs(remote, &refspecs)
    }
}
