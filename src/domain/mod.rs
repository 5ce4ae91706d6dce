//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw market data (`PricePoint`, `Series`)
//! - indicator parameters and outputs (`IndicatorParams`, `IndicatorRow`, `EnrichedSeries`)
//! - run configuration (`PipelineConfig`, `ForestConfig`, `FetchConfig`)

pub mod types;

pub use types::*;
