//! Domain types for SentiQuant

pub mod ids;
pub mod news;
pub mod price;
pub mod record;

pub use ids::{ContentKey, EntityId};
pub use news::{AnnotatedNews, NewsRecord};
pub use price::{DerivedColumn, PriceRecord, PriceSeries, SeriesError};
pub use record::{CleanSeries, Record};
