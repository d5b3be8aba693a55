//! Survey image service core
//!
//! Answers "give me a pixel cutout around a sky position" requests
//! against the small-bodies-node sky-survey archives. The crate owns
//! the two parts with real decision logic:
//!
//! - translating a PDS4 logical identifier into the correct,
//!   survey-specific, epoch-dependent archive URL ([`resolver`]), and
//! - the cache-aside pipeline that turns a gateway request into a
//!   cache lookup, an optional compute-and-store step, and a uniform
//!   response envelope ([`handler`]).
//!
//! Pixel-level cutout computation, raster encoding, and object storage
//! are external collaborators behind the [`CutoutEngine`],
//! [`ImageEncoder`], and [`ObjectStore`] traits.
//!
//! # Example
//!
//! ```rust,no_run
//! use sbn_sis::{resolve, Lid, ResolverConfig};
//!
//! # fn main() -> sbn_sis::Result<()> {
//! let lid = Lid::parse(
//!     "urn:nasa:pds:gbo.ast.catalina.survey:data_calibrated:g96_20210402_2b_f5q9m2_01_0001.arch",
//! )?;
//! let url = resolve(&lid, &ResolverConfig::default())?;
//! assert!(url.ends_with("G96_20210402_2B_F5Q9M2_01_0001.arch.fz"));
//! # Ok(())
//! # }
//! ```

pub mod cache_key;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod handler;
pub mod lid;
pub mod metrics;
pub mod object_store;
pub mod request;
pub mod resolver;

// Re-export commonly used types
pub use cache_key::derive_cache_key;
pub use config::ServiceConfig;
pub use engine::{Cutout, CutoutEngine, ImageEncoder, PixelData};
pub use error::{Result, SisError};
pub use format::ImageFormat;
pub use handler::CutoutService;
pub use lid::Lid;
pub use metrics::ServiceMetrics;
pub use object_store::{MemoryObjectStore, ObjectStore};
pub use request::{AngularSize, CutoutRequest, GatewayRequest, ResponseEnvelope};
pub use resolver::{resolve, ResolverConfig, SurveyRule};
