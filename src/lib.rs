//! # class-map
//!
//! Resolves class names to the source files that declare them. A source tree
//! is scanned once, every class declaration is extracted into a name → path
//! map, and the map is cached beside the tree so later runs skip the scan.
//! A miss triggers at most one rescan before resolution gives up.
//!
//! ## Architecture
//!
//! - **filter**: recognized source file extensions
//! - **lexer**: minimal tokenizer for declaration scanning
//! - **extract**: class names declared in a source text
//! - **scan**: sorted, symlink-free directory walk building a class map
//! - **classmap**: the name → path map
//! - **cache**: checksummed line-based cache file with atomic saves
//! - **config**: scan configuration and CLI resolution
//! - **registry**: owner of config, class map and cache; rebuild and invalidation
//! - **resolver**: the lookup → load → rebuild → retry → fail state machine
//! - **global**: optional process-wide resolver instance
//! - **error**: error enums for each of the above

pub mod cache;
pub mod classmap;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod global;
pub mod lexer;
pub mod registry;
pub mod resolver;
pub mod scan;

pub use classmap::ClassMap;
pub use config::ScanConfig;
pub use error::{CacheError, LoadError, RebuildError, ResolveError, ScanError};
pub use registry::Registry;
pub use resolver::{Resolution, ResolvedBy, Resolver};
