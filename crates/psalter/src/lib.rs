pub mod cache;
pub mod macros;
pub mod reference;
pub mod service;

pub use cache::VerseCache;
pub use reference::{Chapter, Citation, VerseNumber, VerseSpec, expand_verse_spec};
pub use service::{HttpVerseService, ServiceError, VerseLookup, VerseRequest};
