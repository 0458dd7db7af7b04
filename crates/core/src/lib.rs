pub mod article;
pub mod cache;
pub mod canonical;
pub mod error;
#[cfg(feature = "fetch")]
pub mod fetch;
#[cfg(feature = "fetch")]
pub mod harvest;
pub mod layout;
pub mod metadata;
pub mod parse;
pub mod reconstruct;
pub mod render;
pub mod vocabulary;

pub use article::{ArticleTextCollection, extract_article};
pub use cache::{ArticleCache, default_cache_dir};
pub use canonical::{WordSet, canonicalize, canonicalize_entries, format_entry};
pub use error::{BeanpressError, Result};
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, HttpFetcher, PageFetcher, fetch_file, fetch_stdin, fetch_url};
#[cfg(feature = "fetch")]
pub use harvest::{Harvest, HarvestConfig, HarvestConfigBuilder, Harvester};
pub use layout::{DEFAULT_COLUMN_CAPACITY, Page, flow};
pub use metadata::{ArticleMetadata, DEFAULT_LISTING_URL, listing_page_url, parse_listing, parse_max_pages};
pub use parse::{Document, Element};
pub use reconstruct::{reconstruct, reconstruct_main_text};
pub use render::{OutputFormat, RenderConfig, render};
pub use vocabulary::{AnnotatedWord, DEFAULT_MIN_LEVEL, extract_vocabulary};
