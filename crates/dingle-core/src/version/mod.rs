//! Artifact versioning.
//!
//! - `model`: parse `{name}-#.#.#-#.{arch}.rpm` filenames into a name and a
//!   four-part version tuple
//! - `compare`: version ordering, latest-per-name selection and supersession checks

pub mod compare;
pub mod model;

pub use compare::{compare, has_later_version, latest_per_name, sort_by_version};
pub use model::{ARTIFACT_EXTENSION, Artifact, VersionComponent, VersionTuple, parse_name, parse_version};
