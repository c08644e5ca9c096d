//! Collections of forecast grids parsed from NDFD files.

use std::path::Path;

use chrono::{DateTime, Utc};
use firewx_common::ValidWindow;
use tracing::{debug, info, warn};

use crate::error::{NdfdError, NdfdResult};
use crate::grid::ForecastGrid;
use crate::message::{parse_message, split_messages};
use crate::tables::UNKNOWN_FIELD;

/// All grids of one or more NDFD files.
#[derive(Debug, Clone, Default)]
pub struct NdfdDataset {
    grids: Vec<ForecastGrid>,
}

impl NdfdDataset {
    pub fn from_grids(grids: Vec<ForecastGrid>) -> Self {
        Self { grids }
    }

    /// Parse every field of every message in the buffer.
    ///
    /// Fields with unsupported templates are skipped; a buffer with no
    /// decodable field at all is an error.
    pub fn from_bytes(data: &[u8]) -> NdfdResult<Self> {
        let messages = split_messages(data)?;
        if messages.is_empty() {
            return Err(NdfdError::InvalidFormat(
                "no GRIB2 messages found".to_string(),
            ));
        }

        let mut grids = Vec::new();
        for (index, message) in messages.iter().enumerate() {
            let fields = match parse_message(message) {
                Ok(fields) => fields,
                Err(e @ NdfdError::UnsupportedTemplate { .. }) => {
                    warn!(message = index, error = %e, "Skipping message");
                    continue;
                }
                Err(e) => return Err(e),
            };

            for field in &fields {
                let grid = ForecastGrid::from_raw(field)?;
                debug!(
                    message = index,
                    field = %grid.name,
                    start = %grid.window.start,
                    end = %grid.window.end,
                    width = grid.width,
                    height = grid.height,
                    "Decoded field"
                );
                grids.push(grid);
            }
        }

        if grids.is_empty() {
            return Err(NdfdError::InvalidFormat(
                "no decodable fields found".to_string(),
            ));
        }

        Ok(Self { grids })
    }

    pub fn from_file(path: &Path) -> NdfdResult<Self> {
        let data = std::fs::read(path)?;
        let dataset = Self::from_bytes(&data)?;
        info!(
            path = %path.display(),
            grids = dataset.len(),
            "Parsed NDFD file"
        );
        Ok(dataset)
    }

    /// Append the grids of another dataset.
    pub fn merge(&mut self, other: NdfdDataset) {
        self.grids.extend(other.grids);
    }

    pub fn grids(&self) -> &[ForecastGrid] {
        &self.grids
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Grids of a field, ordered by valid window.
    pub fn field(&self, name: &str) -> Vec<&ForecastGrid> {
        let mut grids: Vec<&ForecastGrid> =
            self.grids.iter().filter(|g| g.name == name).collect();
        grids.sort_by_key(|g| g.window);
        grids
    }

    /// Grids of a field, falling back to unrecognised fields when the name
    /// is absent.
    pub fn field_or_unknown(&self, name: &str) -> Vec<&ForecastGrid> {
        let grids = self.field(name);
        if !grids.is_empty() {
            return grids;
        }
        let fallback = self.field(UNKNOWN_FIELD);
        if !fallback.is_empty() {
            debug!(field = name, "Field not found, using unrecognised grids");
        }
        fallback
    }

    /// Distinct field names present.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.grids.iter().map(|g| g.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Valid windows of a field (with the unknown fallback).
    pub fn windows(&self, name: &str) -> Vec<ValidWindow> {
        self.field_or_unknown(name).iter().map(|g| g.window).collect()
    }

    /// The grid of a field whose window starts at `start`.
    pub fn grid_starting_at(&self, name: &str, start: DateTime<Utc>) -> Option<&ForecastGrid> {
        self.field_or_unknown(name)
            .into_iter()
            .find(|g| g.window.start == start)
    }
}
