//! Queries: finder resolution, fetching and result sets.

mod finder;
mod manager;
mod params;
mod queryset;
mod request;

pub use finder::{Finder, FinderTable};
pub use manager::{default_transport, Manager};
pub use params::QueryParams;
pub use queryset::{Iter, QuerySet};
