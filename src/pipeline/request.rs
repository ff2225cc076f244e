// src/pipeline/request.rs

//! The user's mosaic request: where, how big, which bands.

use std::fmt;
use std::str::FromStr;

use crate::errors::{Result, WorkflowError};

/// Center of the output as given on the command line.
///
/// The archive search accepts object names such as `M17`; the region grid
/// needs numeric coordinates, which are available only when the center was
/// given as two numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Center {
    raw: String,
    coords: Option<(f64, f64)>,
}

impl Center {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(WorkflowError::ConfigError("center must not be empty".to_string()));
        }

        let parts: Vec<&str> = raw.split_whitespace().collect();
        let coords = match parts.as_slice() {
            [a, b] => match (a.parse::<f64>(), b.parse::<f64>()) {
                (Ok(ra), Ok(dec)) if ra.is_finite() && dec.is_finite() => Some((ra, dec)),
                _ => None,
            },
            _ => None,
        };

        Ok(Self {
            raw: raw.to_string(),
            coords,
        })
    }

    /// The center exactly as the discovery tool should receive it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `(ra, dec)` in degrees, if the center was numeric.
    pub fn coords(&self) -> Option<(f64, f64)> {
        self.coords
    }

    /// Numeric coordinates, or a configuration error naming the center.
    pub fn require_coords(&self) -> Result<(f64, f64)> {
        self.coords.ok_or_else(|| {
            WorkflowError::ConfigError(format!(
                "center '{}' must be given as two numbers (\"ra dec\") to build the output grid",
                self.raw
            ))
        })
    }
}

impl fmt::Display for Center {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One `survey:filter:color` band request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandSpec {
    /// 1-based position on the command line.
    pub id: u32,
    pub survey: String,
    pub filter: String,
    pub color: String,
}

/// `survey:filter:color` without the id, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandDefinition {
    pub survey: String,
    pub filter: String,
    pub color: String,
}

impl FromStr for BandDefinition {
    type Err = WorkflowError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        match parts.as_slice() {
            [survey, filter, color]
                if !survey.is_empty() && !filter.is_empty() && !color.is_empty() =>
            {
                Ok(Self {
                    survey: survey.to_string(),
                    filter: filter.to_string(),
                    color: color.to_lowercase(),
                })
            }
            _ => Err(WorkflowError::ConfigError(format!(
                "invalid band definition '{s}' (expected survey:filter:color, e.g. dss:DSS2B:red)"
            ))),
        }
    }
}

/// Parse band definitions in order, numbering them from 1.
pub fn parse_bands<S: AsRef<str>>(defs: &[S]) -> Result<Vec<BandSpec>> {
    if defs.is_empty() {
        return Err(WorkflowError::ConfigError(
            "at least one --band is required".to_string(),
        ));
    }

    defs.iter()
        .enumerate()
        .map(|(i, def)| {
            let def: BandDefinition = def.as_ref().parse()?;
            Ok(BandSpec {
                id: i as u32 + 1,
                survey: def.survey,
                filter: def.filter,
                color: def.color,
            })
        })
        .collect()
}

/// Everything the assembler needs to know about the requested mosaic.
#[derive(Debug, Clone)]
pub struct MosaicRequest {
    pub center: Center,
    pub degrees: f64,
    pub bands: Vec<BandSpec>,
}

impl MosaicRequest {
    pub fn new<S: AsRef<str>>(center: &str, degrees: f64, bands: &[S]) -> Result<Self> {
        if !(degrees.is_finite() && degrees > 0.0) {
            return Err(WorkflowError::ConfigError(format!(
                "degrees must be a positive number (got {degrees})"
            )));
        }
        Ok(Self {
            center: Center::parse(center)?,
            degrees,
            bands: parse_bands(bands)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_center_has_coordinates() {
        let c = Center::parse(" 10.68   41.27 ").unwrap();
        assert_eq!(c.as_str(), "10.68   41.27");
        assert_eq!(c.coords(), Some((10.68, 41.27)));
    }

    #[test]
    fn named_center_has_no_coordinates() {
        let c = Center::parse("M17").unwrap();
        assert_eq!(c.coords(), None);
        assert!(matches!(c.require_coords(), Err(WorkflowError::ConfigError(_))));
        assert_eq!(c.to_string(), "M17");
    }

    #[test]
    fn bands_are_numbered_from_one() {
        let bands = parse_bands(&["dss:DSS2B:blue", "dss:DSS2R:Red"]).unwrap();
        assert_eq!(bands[0].id, 1);
        assert_eq!(bands[1].id, 2);
        assert_eq!(bands[1].filter, "DSS2R");
        assert_eq!(bands[1].color, "red");
    }

    #[test]
    fn malformed_band_is_rejected() {
        for bad in ["dss:DSS2B", "dss:DSS2B:red:extra", "dss::red"] {
            assert!(
                matches!(bad.parse::<BandDefinition>(), Err(WorkflowError::ConfigError(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn non_positive_degrees_are_rejected() {
        assert!(MosaicRequest::new("10 20", 0.0, &["dss:DSS2B:red"]).is_err());
        assert!(MosaicRequest::new("10 20", f64::NAN, &["dss:DSS2B:red"]).is_err());
        assert!(MosaicRequest::new("10 20", 0.5, &["dss:DSS2B:red"]).is_ok());
    }
}
