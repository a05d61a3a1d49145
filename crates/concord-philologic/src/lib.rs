//! PhiloLogic concordance client and passage record normalization.
//!
//! The interesting logic lives in [`context`] (cleaning highlighted HTML
//! fragments), [`citation`] (deriving stable passage identifiers and deep
//! links from partially-missing citation metadata), and [`rows`] (flattening
//! one search hit into output records). [`query`] is the thin HTTP layer.

pub mod citation;
pub mod context;
pub mod query;
pub mod rows;
