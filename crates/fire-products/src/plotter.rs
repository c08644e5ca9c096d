//! Runs product requests end to end: data, frames, animation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use firewx_common::output::gif_path;
use firewx_common::region::BoundaryLayer;
use firewx_common::time::{creation_stamp, label_periods, select_periods};
use firewx_common::{
    FireWxError, FireWxResult, ForecastPeriod, OutputLayout, RegionCatalog, RegionSettings,
    UnitConversion, ValidWindow,
};
use ndfd_download::{DownloadManager, NdfdProduct};
use ndfd_parser::{ForecastGrid, NdfdDataset, StationTable};
use renderer::colormap::Rgba;
use renderer::encode::{save_jpeg, write_gif};
use renderer::{BoolRaster, BoundarySet, BoundaryStyle, Colormap, Figure, FontSet, StationLabel};
use tracing::{debug, info, instrument, warn};

use crate::config::{PlotterConfig, Thresholds};
use crate::mask::{combined_mask, masked_field, trend, Comparison, ThresholdMask};
use crate::pairing::{consecutive, pair_by_start};
use crate::products::{Product, Rendering};
use crate::request::ProductRequest;

const LABEL_COLOR: Rgba = [0, 0, 0, 255];
const MASK_OPACITY: f32 = 0.6;

/// Files written for one product.
#[derive(Debug, Clone)]
pub struct ProductOutput {
    pub product: Product,
    pub directory: PathBuf,
    /// Frame images in period order.
    pub frames: Vec<PathBuf>,
    pub gif: PathBuf,
}

/// What one frame shows.
enum FrameData {
    Field(ForecastGrid),
    /// `shaded` is `grid` with points failing the threshold set missing.
    Threshold {
        grid: ForecastGrid,
        shaded: ForecastGrid,
    },
    Mask(ThresholdMask),
}

impl FrameData {
    /// Grid whose values are labelled at stations.
    fn labelled(&self) -> Option<&ForecastGrid> {
        match self {
            FrameData::Field(grid) | FrameData::Threshold { grid, .. } => Some(grid),
            FrameData::Mask(_) => None,
        }
    }
}

struct Frame {
    window: ValidWindow,
    data: FrameData,
}

/// Boundary line style per layer; finer layers draw thinner and lighter.
fn layer_style(layer: BoundaryLayer) -> BoundaryStyle {
    let (color, width) = match layer {
        BoundaryLayer::States => ([0, 0, 0, 255], 1.4),
        BoundaryLayer::Gacc => ([0, 0, 0, 255], 1.6),
        BoundaryLayer::Cwa => ([30, 30, 30, 255], 1.0),
        BoundaryLayer::Counties | BoundaryLayer::Psa => ([60, 60, 60, 255], 0.6),
        BoundaryLayer::FireZones | BoundaryLayer::PublicZones => ([80, 80, 80, 255], 0.5),
    };
    BoundaryStyle { color, width }
}

/// Produces fire-weather plots.
pub struct Plotter {
    config: PlotterConfig,
    catalog: RegionCatalog,
    fonts: FontSet,
    layout: OutputLayout,
    downloader: DownloadManager,
    /// Boundary layers loaded so far; `None` records a missing file.
    boundaries: Mutex<HashMap<BoundaryLayer, Option<Arc<BoundarySet>>>>,
}

impl Plotter {
    pub fn new(config: PlotterConfig) -> FireWxResult<Self> {
        config.validate()?;

        let catalog = match config.regions_file {
            Some(ref path) => RegionCatalog::from_file(path)?,
            None => RegionCatalog::builtin(),
        };
        let fonts = FontSet::load(config.font.as_deref());
        let layout = OutputLayout::new(&config.output_dir);
        let downloader = DownloadManager::new(config.download_config())?;

        info!(
            output = %config.output_dir.display(),
            regions = catalog.len(),
            font = fonts.has_font(),
            "Plotter ready"
        );

        Ok(Self {
            config,
            catalog,
            fonts,
            layout,
            downloader,
            boundaries: Mutex::new(HashMap::new()),
        })
    }

    /// Replace the font set (tests render without system fonts).
    pub fn with_fonts(mut self, fonts: FontSet) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn config(&self) -> &PlotterConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    /// Fetch whatever data the request lacks, then render it.
    #[instrument(skip(self, request), fields(product = %request.product, region = %request.region.slug()))]
    pub async fn run(&self, mut request: ProductRequest) -> FireWxResult<ProductOutput> {
        let settings = self.catalog.resolve(&request.region)?;

        for source in request.missing_inputs() {
            let dataset = self.load_dataset(&settings.ndfd_sector, source).await?;
            request.datasets.insert(source, dataset);
        }

        self.render(&request, &settings)
    }

    /// Dataset for one NDFD file: the data directory first, then a download.
    async fn load_dataset(&self, sector: &str, source: NdfdProduct) -> FireWxResult<NdfdDataset> {
        if let Some(ref dir) = self.config.data_dir {
            let path = dir.join(source.file_name());
            if path.exists() {
                debug!(path = %path.display(), "Reading local NDFD file");
                return Ok(NdfdDataset::from_file(&path)?);
            }
        }

        let bytes = self.downloader.fetch_product(sector, source).await?;
        Ok(NdfdDataset::from_bytes(&bytes)?)
    }

    /// Render frames and the animation from the datasets in `request`.
    pub fn render(&self, request: &ProductRequest, settings: &RegionSettings) -> FireWxResult<ProductOutput> {
        let product = request.product;
        let thresholds = request
            .thresholds
            .clone()
            .unwrap_or_else(|| self.config.thresholds.clone());
        thresholds.validate()?;
        let now = request.now.unwrap_or_else(Utc::now);

        let frames = build_frames(product, &thresholds, &request.datasets)?;
        let windows: Vec<ValidWindow> = frames.iter().map(|f| f.window).collect();
        let selected = select_periods(&windows, now, self.config.max_periods);
        if selected.is_empty() {
            return Err(FireWxError::DataNotAvailable(format!(
                "{}: no forecast periods after {}",
                product,
                now.format("%Y-%m-%d %H:%MZ")
            )));
        }
        let periods = label_periods(&selected, &settings.time_zone);

        let directory = self.layout.prepare(
            product.category().dir_name(),
            product.dir_name(),
            &settings.name,
            request.reference_system,
        )?;

        let layers = self.boundary_layers(request.reference_system.layers());
        let cmap = product.colormap(&thresholds)?;
        let page = PageText {
            title: product.title(&settings.name, &thresholds),
            caption: product.colorbar_caption(&thresholds),
            signature: creation_stamp(now, &settings.time_zone),
        };
        let decimate = settings.decimate_for(request.reference_system);

        let mut written = Vec::with_capacity(periods.len());
        for period in &periods {
            let Some(frame) = frames.iter().find(|f| f.window.start == period.window.start) else {
                continue;
            };
            let path = directory.join(period.frame_file_name());
            let stations = if product.has_station_labels() { Some(decimate) } else { None };
            self.render_frame(frame, period, settings, &cmap, &layers, &page, stations, &path)?;
            written.push(path);
        }

        let gif = gif_path(&directory, product.dir_name());
        write_gif(&written, &gif, self.config.gif_delay_ms)?;

        info!(
            product = %product,
            region = %settings.key,
            frames = written.len(),
            directory = %directory.display(),
            "Product complete"
        );

        Ok(ProductOutput {
            product,
            directory,
            frames: written,
            gif,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn render_frame(
        &self,
        frame: &Frame,
        period: &ForecastPeriod,
        settings: &RegionSettings,
        cmap: &Colormap,
        layers: &[(BoundaryLayer, Arc<BoundarySet>)],
        page: &PageText,
        station_stride: Option<usize>,
        path: &Path,
    ) -> FireWxResult<()> {
        let mut fig = Figure::new(settings.extent, settings.figure_width, settings.map_height())?;

        match &frame.data {
            FrameData::Field(grid) | FrameData::Threshold { shaded: grid, .. } => {
                fig.fill_field(&|lat: f64, lon: f64| grid.value_at(lat, lon), cmap)?;
            }
            FrameData::Mask(mask) => {
                let color = cmap.colors.first().copied().unwrap_or([214, 39, 40, 255]);
                let raster = BoolRaster::sample(|lat, lon| mask.value_at(lat, lon), fig.view());
                if raster.count() == 0 {
                    debug!(frame = %period.frame_file_name(), "No points meet the criteria");
                }
                fig.fill_mask(&raster, color, MASK_OPACITY)?;
                fig.outline_mask(&raster, color, 1.5);
            }
        }

        for (layer, set) in layers {
            fig.draw_boundaries(set, &layer_style(*layer));
        }

        if let (Some(stride), Some(grid)) = (station_stride, frame.data.labelled()) {
            let labels: Vec<StationLabel> = StationTable::sample(grid, &settings.extent, stride)
                .iter()
                .map(|s| StationLabel {
                    lat: s.lat,
                    lon: s.lon,
                    text: s.label(),
                })
                .collect();
            if labels.is_empty() {
                warn!(frame = %period.frame_file_name(), "No station values inside the extent");
            } else {
                fig.plot_stations(&labels, settings.station_font_size, LABEL_COLOR);
            }
        }

        fig.title(&page.title, settings.title_font_size);
        fig.subtitle(
            &format!("{} ({})", period.heading(), period.time_range_label()),
            settings.subtitle_font_size,
            settings.title_font_size,
        );
        fig.signature(&page.signature, settings.signature_font_size);
        fig.colorbar(cmap, settings.colorbar_shrink, settings.colorbar_font_size, &page.caption);

        let img = fig.render(&self.fonts);
        save_jpeg(&img, path, self.config.jpeg_quality)?;
        debug!(frame = %path.display(), "Wrote frame");
        Ok(())
    }

    /// Boundary sets for `layers`, each read from disk at most once.
    ///
    /// Missing or unreadable files are skipped with a warning.
    fn boundary_layers(&self, layers: &[BoundaryLayer]) -> Vec<(BoundaryLayer, Arc<BoundarySet>)> {
        let mut cache = match self.boundaries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        layers
            .iter()
            .filter_map(|&layer| {
                let entry = cache
                    .entry(layer)
                    .or_insert_with(|| self.read_boundaries(layer).map(Arc::new));
                entry.as_ref().map(|set| (layer, Arc::clone(set)))
            })
            .collect()
    }

    fn read_boundaries(&self, layer: BoundaryLayer) -> Option<BoundarySet> {
        let path = self
            .config
            .boundaries_dir
            .join(format!("{}.geojson", layer.file_stem()));
        if !path.exists() {
            warn!(layer = layer.file_stem(), path = %path.display(), "Boundary file not found, skipping layer");
            return None;
        }
        match BoundarySet::from_file(&path) {
            Ok(set) => {
                info!(layer = layer.file_stem(), lines = set.lines.len(), "Loaded boundaries");
                Some(set)
            }
            Err(e) => {
                warn!(layer = layer.file_stem(), error = %e, "Failed to read boundaries, skipping layer");
                None
            }
        }
    }
}

struct PageText {
    title: String,
    caption: String,
    signature: String,
}

fn dataset<'a>(
    datasets: &'a HashMap<NdfdProduct, NdfdDataset>,
    source: NdfdProduct,
) -> FireWxResult<&'a NdfdDataset> {
    datasets
        .get(&source)
        .ok_or_else(|| FireWxError::DataNotAvailable(source.file_name().to_string()))
}

/// Grids of one NDFD file converted to display units.
fn field_grids(
    datasets: &HashMap<NdfdProduct, NdfdDataset>,
    source: NdfdProduct,
    conversion: UnitConversion,
) -> FireWxResult<Vec<ForecastGrid>> {
    let grids: Vec<ForecastGrid> = dataset(datasets, source)?
        .field_or_unknown(source.field_name())
        .into_iter()
        .map(|g| g.converted(conversion))
        .collect();
    if grids.is_empty() {
        return Err(FireWxError::FieldNotFound(source.field_name().to_string()));
    }
    Ok(grids)
}

/// Everything a product could draw, one entry per valid window.
fn build_frames(
    product: Product,
    thresholds: &Thresholds,
    datasets: &HashMap<NdfdProduct, NdfdDataset>,
) -> FireWxResult<Vec<Frame>> {
    let source = product.source();

    match product.rendering(thresholds) {
        Rendering::Field => Ok(field_grids(datasets, source, product.conversion())?
            .into_iter()
            .map(|grid| Frame {
                window: grid.window,
                data: FrameData::Field(grid),
            })
            .collect()),
        Rendering::Threshold { cmp, threshold } => Ok(field_grids(datasets, source, product.conversion())?
            .into_iter()
            .map(|grid| Frame {
                window: grid.window,
                data: FrameData::Threshold {
                    shaded: masked_field(&grid, cmp, threshold),
                    grid,
                },
            })
            .collect()),
        Rendering::Trend => {
            let grids = field_grids(datasets, source, product.conversion())?;
            let refs: Vec<&ForecastGrid> = grids.iter().collect();
            consecutive(&refs)
                .into_iter()
                .map(|(earlier, later)| {
                    let diff = trend(earlier, later)?;
                    Ok(Frame {
                        window: diff.window,
                        data: FrameData::Field(diff),
                    })
                })
                .collect()
        }
        Rendering::DryAndWind {
            wind,
            rh_threshold,
            wind_threshold,
        } => {
            let rh = field_grids(datasets, source, UnitConversion::None)?;
            let winds = field_grids(datasets, wind, UnitConversion::MsToMph)?;
            let rh_refs: Vec<&ForecastGrid> = rh.iter().collect();
            let wind_refs: Vec<&ForecastGrid> = winds.iter().collect();

            pair_by_start(&rh_refs, &wind_refs)
                .into_iter()
                .map(|(rh, wind)| {
                    let mask = combined_mask(
                        rh,
                        Comparison::AtOrBelow,
                        rh_threshold,
                        wind,
                        Comparison::AtOrAbove,
                        wind_threshold,
                    )?;
                    Ok(Frame {
                        window: rh.window,
                        data: FrameData::Mask(mask),
                    })
                })
                .collect()
        }
    }
}
