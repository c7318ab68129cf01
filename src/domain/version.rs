use crate::error::{ReleaseError, Result};
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;
use std::str::FromStr;

/// Kind of version increment requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
    PreMajor,
    PreMinor,
    PrePatch,
    PreRelease,
}

impl VersionBump {
    /// Every accepted bump kind, in the order they are listed to users
    pub const ALL: [VersionBump; 7] = [
        VersionBump::Major,
        VersionBump::Minor,
        VersionBump::Patch,
        VersionBump::PreMajor,
        VersionBump::PreMinor,
        VersionBump::PrePatch,
        VersionBump::PreRelease,
    ];

    /// The name npm uses for this increment
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
            VersionBump::PreMajor => "premajor",
            VersionBump::PreMinor => "preminor",
            VersionBump::PrePatch => "prepatch",
            VersionBump::PreRelease => "prerelease",
        }
    }

    /// Compute the version `npm version <kind>` would write.
    ///
    /// A release bump on a matching prerelease graduates it instead of
    /// incrementing again (`2.0.0-rc.1` + major = `2.0.0`). Prerelease bumps
    /// append `<preid>.0`, or `0` when no preid is given. Build metadata is
    /// always dropped.
    pub fn apply(&self, current: &Version, preid: Option<&str>) -> Result<Version> {
        let mut next = current.clone();
        next.build = BuildMetadata::EMPTY;

        match self {
            VersionBump::Major => release_major(&mut next),
            VersionBump::Minor => release_minor(&mut next),
            VersionBump::Patch => release_patch(&mut next),
            VersionBump::PreMajor => {
                next.pre = Prerelease::EMPTY;
                release_major(&mut next);
                bump_pre(&mut next, preid)?;
            }
            VersionBump::PreMinor => {
                next.pre = Prerelease::EMPTY;
                release_minor(&mut next);
                bump_pre(&mut next, preid)?;
            }
            VersionBump::PrePatch => {
                next.pre = Prerelease::EMPTY;
                release_patch(&mut next);
                bump_pre(&mut next, preid)?;
            }
            VersionBump::PreRelease => {
                if next.pre.is_empty() {
                    release_patch(&mut next);
                }
                bump_pre(&mut next, preid)?;
            }
        }

        Ok(next)
    }
}

fn release_major(v: &mut Version) {
    if v.minor != 0 || v.patch != 0 || v.pre.is_empty() {
        v.major += 1;
    }
    v.minor = 0;
    v.patch = 0;
    v.pre = Prerelease::EMPTY;
}

fn release_minor(v: &mut Version) {
    if v.patch != 0 || v.pre.is_empty() {
        v.minor += 1;
    }
    v.patch = 0;
    v.pre = Prerelease::EMPTY;
}

fn release_patch(v: &mut Version) {
    if v.pre.is_empty() {
        v.patch += 1;
    }
    v.pre = Prerelease::EMPTY;
}

fn bump_pre(v: &mut Version, preid: Option<&str>) -> Result<()> {
    let mut ids: Vec<String> = if v.pre.is_empty() {
        Vec::new()
    } else {
        v.pre.as_str().split('.').map(String::from).collect()
    };

    if ids.is_empty() {
        ids = match preid {
            Some(id) => vec![id.to_string(), "0".to_string()],
            None => vec!["0".to_string()],
        };
    } else {
        let last_numeric = ids
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, id)| id.parse::<u64>().ok().map(|n| (i, n)));

        match last_numeric {
            Some((i, n)) => ids[i] = (n + 1).to_string(),
            None => ids.push("0".to_string()),
        }

        if let Some(id) = preid {
            let same_series = ids[0] == id
                && ids.get(1).map_or(false, |n| n.parse::<u64>().is_ok());
            if !same_series {
                ids = vec![id.to_string(), "0".to_string()];
            }
        }
    }

    v.pre = Prerelease::new(&ids.join(".")).map_err(|e| {
        ReleaseError::invalid_argument(format!("Invalid prerelease identifier: {}", e))
    })?;
    Ok(())
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionBump {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        VersionBump::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = VersionBump::ALL.iter().map(|k| k.as_str()).collect();
                ReleaseError::invalid_argument(format!(
                    "unknown version type '{}' (valid types: {})",
                    s,
                    valid.join(", ")
                ))
            })
    }
}
