//! Instance domain helpers: lookup in a listing, identity validation, and
//! descriptive fields derived from control-plane metadata.
//!
//! Pure functions only: no I/O, no async.

use fleet_common::Instance;

use crate::domain::error::InstanceError;

/// Result of looking an id up in one listing.
#[derive(Debug, PartialEq, Eq)]
pub enum Located<'a> {
    Found(&'a Instance),
    Missing,
    Duplicate,
}

/// Find the instance with `id` in a listing.
///
/// Ids are unique within a well-formed listing; more than one match is
/// reported as `Duplicate` rather than silently picking one.
#[must_use]
pub fn locate<'a>(instances: &'a [Instance], id: &str) -> Located<'a> {
    let mut matches = instances.iter().filter(|i| i.id == id);
    match (matches.next(), matches.next()) {
        (None, _) => Located::Missing,
        (Some(found), None) => Located::Found(found),
        (Some(_), Some(_)) => Located::Duplicate,
    }
}

/// Find the instance with `id`, as an error-typed result.
///
/// # Errors
///
/// Returns `NotFound` or `DuplicateId` when the listing has zero or several
/// instances with this id.
pub fn find<'a>(instances: &'a [Instance], id: &str) -> Result<&'a Instance, InstanceError> {
    match locate(instances, id) {
        Located::Found(instance) => Ok(instance),
        Located::Missing => Err(InstanceError::NotFound(id.to_string())),
        Located::Duplicate => Err(InstanceError::DuplicateId(id.to_string())),
    }
}

/// Validate an instance id typed by the user before it reaches the gateway.
///
/// # Errors
///
/// Returns an error if the id is empty or contains characters that cannot
/// appear in a control-plane id.
pub fn validate_instance_id(id: &str) -> Result<(), InstanceError> {
    let valid = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(InstanceError::InvalidId(id.to_string()))
    }
}

/// Derive an OS name from an image description.
///
/// Image descriptions read like `"Amazon Linux 2023 AMI 2023.3.20240108.0 arm64 HVM kernel-6.1"`;
/// the OS is the part before `" AMI "`. Descriptions that do not split into
/// exactly two parts yield `None`.
#[must_use]
pub fn os_from_image_description(description: &str) -> Option<String> {
    let parts: Vec<&str> = description.split(" AMI ").collect();
    match parts.as_slice() {
        [os, _] if !os.trim().is_empty() => Some(os.trim().to_string()),
        _ => None,
    }
}

/// Broad OS family, used to pick an icon in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    AmazonLinux,
    Ubuntu,
    Windows,
    MacOs,
    Linux,
}

impl OsFamily {
    /// Classify an OS name by its prefix.
    #[must_use]
    pub fn of(os: &str) -> Self {
        if os.starts_with("Amazon Linux") {
            Self::AmazonLinux
        } else if os.starts_with("Ubuntu") {
            Self::Ubuntu
        } else if os.starts_with("Windows") {
            Self::Windows
        } else if os.starts_with("macOS") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /// Short tag for terminal output.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::AmazonLinux => "aws",
            Self::Ubuntu => "ubuntu",
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
        }
    }
}
