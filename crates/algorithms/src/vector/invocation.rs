//! File-to-file simplification: read, check, simplify, write.

use geoslim_core::io::{check_destination, read_layer, write_layer, WriteOptions};
use geoslim_core::{Algorithm, CrsKind, Error, Result};
use std::path::Path;
use tracing::{info, warn};

use super::filter::RegionFilter;
use super::simplify::{LayerSimplify, SimplifyParams, SimplifyReport};

/// Options for [`simplify_file`]
#[derive(Debug, Clone, Default)]
pub struct SimplifyOptions {
    pub params: SimplifyParams,
    /// Replace an existing output layer
    pub overwrite: bool,
    /// Accept a tolerance in degrees for layers in a geographic CRS
    pub allow_geographic: bool,
    /// Regions to drop or keep before simplifying
    pub filter: RegionFilter,
}

/// Simplify the layer at `input` and write the result to `output`.
///
/// Parameters and the destination are checked before the input is read.
/// Nothing is written unless every step succeeds.
pub fn simplify_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &SimplifyOptions,
) -> Result<SimplifyReport> {
    let (input, output) = (input.as_ref(), output.as_ref());
    options.params.validate()?;

    let write_options = WriteOptions {
        overwrite: options.overwrite,
    };
    check_destination(output, &write_options)?;

    let layer = read_layer(input)?;
    match layer.crs.as_ref().map(|crs| (crs, crs.kind())) {
        Some((crs, CrsKind::Projected(unit))) => {
            info!(
                "{}: tolerance {} {} ({})",
                layer.name, options.params.tolerance, unit.name, crs
            );
            if (unit.to_meters - 1.0).abs() > 1e-9 {
                warn!(
                    "{}: layer unit is {}, tolerance {} is {:.3} m",
                    layer.name,
                    unit.name,
                    options.params.tolerance,
                    options.params.tolerance * unit.to_meters
                );
            }
        }
        Some((crs, CrsKind::Geographic)) if !options.allow_geographic => {
            return Err(Error::GeographicCrs {
                crs: crs.identifier(),
                tolerance: options.params.tolerance,
            });
        }
        Some((crs, CrsKind::Geographic)) => {
            warn!(
                "{}: geographic CRS {}, tolerance {} is in degrees",
                layer.name, crs, options.params.tolerance
            );
        }
        Some((crs, CrsKind::Unknown)) => {
            warn!("{}: unrecognized CRS {}, tolerance taken as given", layer.name, crs);
        }
        None => {
            warn!("{}: no .prj found, tolerance taken as given", layer.name);
        }
    }

    let (layer, filtered) = options.filter.apply(layer)?;
    if filtered > 0 {
        info!("{}: {} records removed by filter, {} left", layer.name, filtered, layer.len());
    }

    let (simplified, mut report) = LayerSimplify.execute(layer, options.params.clone())?;
    report.filtered = filtered;
    write_layer(simplified, output, &write_options)?;

    info!(
        "{} records, {} -> {} vertices ({:.1}% removed)",
        report.records,
        report.vertices_before,
        report.vertices_after,
        report.reduction() * 100.0
    );
    Ok(report)
}
