use std::fmt;

use crate::oid::Oid;
use crate::path::Path;

/// Possible errors returned by methods on an [`ObjectMap`](crate::ObjectMap).
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ObjectMapError {
    /// `add` was called with something that isn't a non-empty path tuple,
    /// or `remove`/`object_for` was given an input of an unrecognized kind.
    BadArgument(String),
    /// `add` was called with a node whose oid is already registered and
    /// `replace_oid` was false.
    DuplicateOid(Oid),
    /// `add` was called with a path that is already registered.
    DuplicatePath(Path),
    /// `connect`/`disconnect`/`sourceids`/`targetids` referenced an oid
    /// that is not (or no longer) in the map.
    UnregisteredOid(Oid),
}

impl std::error::Error for ObjectMapError {}

impl fmt::Display for ObjectMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectMapError::BadArgument(msg) => {
                write!(f, "Error: bad argument: {msg}")
            }
            ObjectMapError::DuplicateOid(oid) => {
                write!(f, "Error: objectid {oid} already exists")
            }
            ObjectMapError::DuplicatePath(path) => {
                write!(f, "Error: path {path} already exists")
            }
            ObjectMapError::UnregisteredOid(oid) => {
                write!(f, "Error: oid {oid} is not in the object map")
            }
        }
    }
}

/// A fatal, unrecoverable condition in the storage substrate backing the
/// map. The map itself never constructs this; it exists so embedders that
/// layer real persistence underneath can surface it through the same error
/// family.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FatalError;

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error: a fatal error has occurred, the store must be \
             considered corrupted"
        )
    }
}

impl std::error::Error for FatalError {}

pub type FatalResult<T> = Result<T, FatalError>;
