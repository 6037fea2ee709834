//! Layered configuration engine.
//!
//! Loads configuration layers from named locators, merges them and resolves
//! the small templating vocabulary embedded in the values:
//!
//! 1. **Load** - each locator (`loaderName:bareLocator` or a literal map) is
//!    fetched through its registered loader
//! 2. **Include** - `{"_include": [locator, ...]}` nodes are replaced by the
//!    merge of the named layers
//! 3. **Merge** - layers are deep-merged, later layers win
//! 4. **Resolve** - `{"_ref": ...}` directives and `${path}` tokens are
//!    replaced by the values they point to
//!
//! ## Paths
//! - `a.b.0` - absolute path from the root; numeric segments index sequences
//! - `.b` - relative to the node containing the value being resolved
//! - `..b` - one more level up per extra dot
//!
//! ## Tokens
//! - `${path}` - replaced by the value at `path`
//! - `$${path}` - literal `${path}`
//! - `${}` - literal `${}`

mod include;
mod locator;
mod merge;
mod path;
mod processor;
mod resolve;
mod types;

pub use locator::{Loader, Locator};
pub use merge::{deep_merge, deep_merge_all};
pub use path::{PathSpec, resolve_path};
pub use processor::Processor;
pub use resolve::resolve;
pub use types::*;
