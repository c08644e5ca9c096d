//! A single product run.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use firewx_common::{ReferenceSystem, RegionKey};
use ndfd_download::NdfdProduct;
use ndfd_parser::NdfdDataset;

use crate::config::Thresholds;
use crate::products::Product;

/// What to plot, where, and optionally with data already in hand.
#[derive(Debug, Clone)]
pub struct ProductRequest {
    pub product: Product,
    pub region: RegionKey,
    pub reference_system: ReferenceSystem,
    /// Overrides the plotter's configured thresholds.
    pub thresholds: Option<Thresholds>,
    /// Datasets supplied by the caller, keyed by NDFD file.
    pub datasets: HashMap<NdfdProduct, NdfdDataset>,
    /// Clock used for period selection and the signature; defaults to now.
    pub now: Option<DateTime<Utc>>,
}

impl ProductRequest {
    pub fn new(product: Product, region: RegionKey) -> Self {
        Self {
            product,
            region,
            reference_system: ReferenceSystem::StatesOnly,
            thresholds: None,
            datasets: HashMap::new(),
            now: None,
        }
    }

    pub fn with_reference_system(mut self, reference_system: ReferenceSystem) -> Self {
        self.reference_system = reference_system;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn with_dataset(mut self, source: NdfdProduct, dataset: NdfdDataset) -> Self {
        self.datasets.insert(source, dataset);
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Inputs the caller did not supply.
    pub fn missing_inputs(&self) -> Vec<NdfdProduct> {
        self.product
            .inputs()
            .into_iter()
            .filter(|p| !self.datasets.contains_key(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_inputs() {
        let req = ProductRequest::new(Product::DryAndWindy, RegionKey::Conus)
            .with_dataset(NdfdProduct::Rh, NdfdDataset::from_grids(Vec::new()));
        assert_eq!(req.missing_inputs(), vec![NdfdProduct::WindSpeed]);
        assert_eq!(req.reference_system, ReferenceSystem::StatesOnly);
    }
}
