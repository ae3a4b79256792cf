pub mod error;
pub mod omdb;
pub mod traits;

pub use error::{SourceError, TransportError};
pub use omdb::OmdbClient;
pub use traits::MovieSource;
