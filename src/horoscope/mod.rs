pub mod cache;
pub mod fetch;
pub mod parsers;
pub mod resolver;
pub mod router;
pub mod signs;

pub use cache::{Clock, DailyCache, SystemClock};
pub use fetch::{Fetch, HttpFetcher};
pub use resolver::HoroscopeService;
pub use router::{parse_source, route, Provider};
pub use signs::{SignCatalog, ZodiacSign};
