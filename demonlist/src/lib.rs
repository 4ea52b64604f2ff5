//! Integrated Demonlist - ranked level lists for Geometry Dash
//!
//! This library fetches the TSL and TSL+ demonlists from their static JSON
//! hosts and keeps them in an in-memory [`ListCache`]. A list is published as
//! a manifest (`_list.json`, an array of level names) plus one detail document
//! per level (`{name}.json`). Loading fans out one request per manifest entry
//! and joins the results back into a single list sorted by position.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use demonlist::{DemonlistConfig, DemonlistLoader, ListCache, ListSource, ReqwestClient};
//!
//! let config = DemonlistConfig::default();
//! let client = Arc::new(ReqwestClient::from_config(&config)?);
//! let cache = Arc::new(ListCache::new());
//! let loader = DemonlistLoader::new(client, Arc::clone(&cache), config)?;
//!
//! loader.load_async(ListSource::Tsl).await?;
//! for item in cache.collection(ListSource::Tsl) {
//!     println!("#{} {} ({})", item.position, item.name, item.id);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod loader;
pub mod probe;
pub mod types;

pub use cache::ListCache;
pub use config::DemonlistConfig;
pub use error::{ConfigError, ConfigResult, LoadError, LoadResult};
pub use http::{HttpClient, HttpRequest, HttpResponse, ReqwestClient, TransportError};
pub use loader::{DemonlistLoader, LoadHandle};
pub use probe::{probe, ProbeMode, ProbeOutcome};
pub use types::{DemonPack, ListItem, ListSource};
