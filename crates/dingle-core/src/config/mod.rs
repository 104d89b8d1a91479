//! Configuration for dingle.
//!
//! A single JSON object, by default at `~/.dingle/dingle.json`:
//! - `values`: raw key lookup with explicit missing-key results
//! - `schema`: the validated, typed configuration
//! - `parser`: JSON parsing with line/column error messages
//! - `store`: locating and loading the config file

pub mod parser;
pub mod schema;
pub mod store;
pub mod values;

pub use parser::{parse_dingle_json, parse_dingle_json_str};
pub use schema::DingleConfig;
pub use store::{ConfigStore, DEFAULT_CONFIG_PATH, expand_tilde};
pub use values::{ConfigValues, REQUIRED_KEYS};
