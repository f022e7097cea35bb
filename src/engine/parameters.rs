//! Update-step parameters.
//!
//! `Parameters` is plain data: build it in code, or load it from a flat
//! string-keyed config map with [`Parameters::from_config`]. Sizing-field
//! bindings are given by attribute name in config and resolved to typed
//! keys once against the attribute store; the hot path never sees strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::attributes::{AttributeStore, EdgeAttr};
use crate::mesh_error::MeshMorphError;
use crate::phase::{Dimension, PhaseLabel};

/// Tunable parameters for one `update()` step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameters {
    /// Labels of the moving phases. Contact detection merges interfaces of
    /// distinct labels from this list; labels not listed are treated as
    /// gap (ambient) material.
    pub labels: Vec<PhaseLabel>,
    /// Whether a dedicated ambient label exists.
    pub use_ambient: bool,
    /// The ambient (gap) label; ignored unless `use_ambient` is set.
    pub ambient_label: PhaseLabel,

    /// Refine edges longer than this.
    pub upper_threshold: f64,
    /// Coarsen edges shorter than this.
    pub lower_threshold: f64,
    /// Per-label refinement threshold overrides.
    pub upper_overrides: BTreeMap<u32, f64>,
    /// Per-label coarsening threshold overrides.
    pub lower_overrides: BTreeMap<u32, f64>,
    /// Name of a per-edge sizing attribute overriding `upper_threshold`.
    pub upper_threshold_attribute: Option<String>,
    /// Name of a per-edge sizing attribute overriding `lower_threshold`.
    pub lower_threshold_attribute: Option<String>,

    /// Relative position of a split point along the edge, in `(0, 1)`.
    pub split_ratio: f64,
    /// Whether the contact pass runs.
    pub contact_enabled: bool,
    /// Interfaces of distinct phases closer than this are merged.
    pub contact_distance: f64,
    /// Whether the min-angle-improving flip pass runs.
    pub quality_flips: bool,
    /// Spoke edges created by splits take the column default instead of
    /// the parent triangle's edge average.
    pub use_sparse_edge_attributes: bool,

    /// Bisection budget for the motion inversion guard.
    pub max_substep_bisections: u32,
    /// Bound on refine/coarsen fixed-point iterations.
    pub max_passes: u32,

    /// Resolved refinement sizing key; set by [`Parameters::resolve_bindings`].
    #[serde(skip)]
    pub resolved_upper: Option<EdgeAttr>,
    /// Resolved coarsening sizing key; set by [`Parameters::resolve_bindings`].
    #[serde(skip)]
    pub resolved_lower: Option<EdgeAttr>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            use_ambient: false,
            ambient_label: PhaseLabel(0),
            upper_threshold: f64::INFINITY,
            lower_threshold: 0.0,
            upper_overrides: BTreeMap::new(),
            lower_overrides: BTreeMap::new(),
            upper_threshold_attribute: None,
            lower_threshold_attribute: None,
            split_ratio: 0.5,
            contact_enabled: false,
            contact_distance: 0.0,
            quality_flips: false,
            use_sparse_edge_attributes: false,
            max_substep_bisections: 20,
            max_passes: 4,
            resolved_upper: None,
            resolved_lower: None,
        }
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, MeshMorphError> {
    value.parse().map_err(|_| MeshMorphError::ConfigParse {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}

impl Parameters {
    /// Build parameters from a flat config map; unknown keys are an error,
    /// missing keys keep their defaults.
    ///
    /// Recognized keys: `labels` (whitespace-separated), `use_ambient`,
    /// `ambient_label`, `upper_threshold`, `lower_threshold`,
    /// `upper_threshold.<label>`, `lower_threshold.<label>`,
    /// `upper_threshold_attribute`, `lower_threshold_attribute`,
    /// `split_ratio`, `contact_enabled`, `contact_distance`,
    /// `quality_flips`, `use_sparse_edge_attributes`,
    /// `max_substep_bisections`, `max_passes`.
    pub fn from_config(config: &BTreeMap<String, String>) -> Result<Self, MeshMorphError> {
        let mut params = Self::default();
        for (key, value) in config {
            match key.as_str() {
                "labels" => {
                    params.labels = value
                        .split_whitespace()
                        .map(|s| parse::<u32>(key, s).map(PhaseLabel))
                        .collect::<Result<_, _>>()?;
                }
                "use_ambient" => params.use_ambient = parse(key, value)?,
                "ambient_label" => params.ambient_label = PhaseLabel(parse(key, value)?),
                "upper_threshold" => params.upper_threshold = parse(key, value)?,
                "lower_threshold" => params.lower_threshold = parse(key, value)?,
                "upper_threshold_attribute" => {
                    params.upper_threshold_attribute = Some(value.clone());
                }
                "lower_threshold_attribute" => {
                    params.lower_threshold_attribute = Some(value.clone());
                }
                "split_ratio" => params.split_ratio = parse(key, value)?,
                "contact_enabled" => params.contact_enabled = parse(key, value)?,
                "contact_distance" => params.contact_distance = parse(key, value)?,
                "quality_flips" => params.quality_flips = parse(key, value)?,
                "use_sparse_edge_attributes" => {
                    params.use_sparse_edge_attributes = parse(key, value)?;
                }
                "max_substep_bisections" => {
                    params.max_substep_bisections = parse(key, value)?;
                }
                "max_passes" => params.max_passes = parse(key, value)?,
                other => {
                    if let Some(label) = other.strip_prefix("upper_threshold.") {
                        params
                            .upper_overrides
                            .insert(parse(key, label)?, parse(key, value)?);
                    } else if let Some(label) = other.strip_prefix("lower_threshold.") {
                        params
                            .lower_overrides
                            .insert(parse(key, label)?, parse(key, value)?);
                    } else {
                        return Err(MeshMorphError::ConfigParse {
                            key: key.clone(),
                            value: value.clone(),
                        });
                    }
                }
            }
        }
        Ok(params)
    }

    /// Cross-field sanity checks.
    ///
    /// Hard errors for out-of-range values; a `warn!` when the threshold
    /// band is so tight that a coarsening collapse immediately re-triggers
    /// refinement.
    pub fn validate(&self) -> Result<(), MeshMorphError> {
        if !(self.lower_threshold >= 0.0) {
            return Err(MeshMorphError::InvalidParameters(format!(
                "lower_threshold must be non-negative, got {}",
                self.lower_threshold
            )));
        }
        if !(self.upper_threshold > self.lower_threshold) {
            return Err(MeshMorphError::InvalidParameters(format!(
                "upper_threshold ({}) must exceed lower_threshold ({})",
                self.upper_threshold, self.lower_threshold
            )));
        }
        if !(self.split_ratio > 0.0 && self.split_ratio < 1.0) {
            return Err(MeshMorphError::InvalidParameters(format!(
                "split_ratio must lie in (0, 1), got {}",
                self.split_ratio
            )));
        }
        if self.contact_enabled && !(self.contact_distance > 0.0) {
            return Err(MeshMorphError::InvalidParameters(format!(
                "contact_distance must be positive when contact is enabled, got {}",
                self.contact_distance
            )));
        }
        if self.max_passes == 0 {
            return Err(MeshMorphError::InvalidParameters(
                "max_passes must be at least 1".to_owned(),
            ));
        }
        if self.use_ambient && self.labels.contains(&self.ambient_label) {
            return Err(MeshMorphError::InvalidParameters(format!(
                "ambient label {} must not appear in the moving label list",
                self.ambient_label
            )));
        }
        if self.upper_threshold.is_finite() && self.upper_threshold < 2.0 * self.lower_threshold {
            log::warn!(
                "upper_threshold {} < 2 * lower_threshold {}; collapses may re-trigger splits",
                self.upper_threshold,
                self.lower_threshold
            );
        }
        Ok(())
    }

    /// Resolve sizing-attribute names against the store.
    ///
    /// # Errors
    /// [`MeshMorphError::UnresolvedSizingAttribute`] if a named attribute
    /// was never registered as a per-edge column.
    pub fn resolve_bindings(&mut self, attributes: &AttributeStore) -> Result<(), MeshMorphError> {
        self.resolved_upper = self
            .upper_threshold_attribute
            .as_deref()
            .map(|name| {
                attributes.lookup::<EdgeAttr>(name).ok_or_else(|| {
                    MeshMorphError::UnresolvedSizingAttribute {
                        name: name.to_owned(),
                        dimension: Dimension::Edge,
                    }
                })
            })
            .transpose()?;
        self.resolved_lower = self
            .lower_threshold_attribute
            .as_deref()
            .map(|name| {
                attributes.lookup::<EdgeAttr>(name).ok_or_else(|| {
                    MeshMorphError::UnresolvedSizingAttribute {
                        name: name.to_owned(),
                        dimension: Dimension::Edge,
                    }
                })
            })
            .transpose()?;
        Ok(())
    }

    /// Scalar refinement threshold for a label, honoring overrides.
    pub fn refine_threshold(&self, label: PhaseLabel) -> f64 {
        self.upper_overrides
            .get(&label.0)
            .copied()
            .unwrap_or(self.upper_threshold)
    }

    /// Scalar coarsening threshold for a label, honoring overrides.
    pub fn coarsen_threshold(&self, label: PhaseLabel) -> f64 {
        self.lower_overrides
            .get(&label.0)
            .copied()
            .unwrap_or(self.lower_threshold)
    }

    /// Whether `label` names gap material rather than a moving phase.
    pub fn is_ambient(&self, label: PhaseLabel) -> bool {
        if self.use_ambient {
            label == self.ambient_label
        } else {
            !self.labels.contains(&label)
        }
    }
}
