pub mod cache;
pub mod cancel;
pub mod describe;
pub mod file;
pub mod lang_def;
pub mod option;
pub mod path;
pub mod printer;
pub mod resolver;
pub mod visit;

#[cfg(test)]
mod tests;

pub use cache::{CacheEntry, CacheMetrics, SourceCache};
pub use cancel::CancelToken;
pub use describe::{BindingMatch, BindingSite, Resolution, TypeDescription, TypeKind};
pub use file::SourceFile;
pub use lang_def::LanguageTrait;
pub use option::ResolveOption;
pub use path::{PathSegment, VariablePath};
pub use printer::{PrintFormat, render, render_reserved};
pub use resolver::Resolver;
pub use visit::{Children, WalkCtx, WalkFlow, WalkOutcome, Walkable, walk};
