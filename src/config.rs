//! Typed configuration records: components, fixed parameters and targets.

use itertools::Itertools;

use crate::error::{Result, SearchError};
use crate::Series;

/// The component family a specification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    Inductor,
}

impl ComponentKind {
    /// The base unit name for reports.
    pub fn unit(&self) -> &'static str {
        match self {
            ComponentKind::Resistor => "Ohm",
            ComponentKind::Capacitor => "Farad",
            ComponentKind::Inductor => "Henry",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            ComponentKind::Resistor => 0,
            ComponentKind::Capacitor => 1,
            ComponentKind::Inductor => 2,
        }
    }
}

/// Specification of one component to vary during the search.
///
/// A specification resolves to candidate values from exactly one of three
/// sources, checked in order: a fixed value, an explicit value set, or a
/// scale list combined with the standard series of the component's kind.
#[derive(Debug, Clone)]
pub struct ComponentSpec {
    id: String,
    kind: ComponentKind,
    value: Option<f64>,
    value_set: Option<Vec<f64>>,
    value_scale: Option<Vec<f64>>,
    tolerance: f64,
    description: String,
}

impl ComponentSpec {
    /// Create a specification with no value source yet. One of [`value`],
    /// [`value_set`] or [`value_scale`] must be supplied before a search.
    ///
    /// [`value`]: ComponentSpec::value
    /// [`value_set`]: ComponentSpec::value_set
    /// [`value_scale`]: ComponentSpec::value_scale
    pub fn new(id: &str, kind: ComponentKind, tolerance_percent: f64) -> Self {
        ComponentSpec {
            id: id.to_string(),
            kind,
            value: None,
            value_set: None,
            value_scale: None,
            tolerance: tolerance_percent,
            description: String::new(),
        }
    }

    /// Pin the component to a single fixed value.
    pub fn value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Supply an explicit candidate set, used verbatim in the given order.
    pub fn value_set(mut self, values: Vec<f64>) -> Self {
        self.value_set = Some(values);
        self
    }

    /// Supply decade scale factors to combine with the kind's standard
    /// series.
    pub fn value_scale(mut self, scales: Vec<f64>) -> Self {
        self.value_scale = Some(scales);
        self
    }

    /// Attach a free-text description.
    pub fn describe(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Tolerance in percent of the nominal value.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Number of candidate values [`expanded_values`] would produce, without
    /// materializing them.
    ///
    /// [`expanded_values`]: ComponentSpec::expanded_values
    pub fn expanded_len(&self, series: Option<&Series>) -> Result<usize> {
        if self.value.is_some() {
            return Ok(1);
        }
        if let Some(ref set) = self.value_set {
            return Ok(set.len());
        }
        match self.value_scale {
            Some(ref scales) => match series {
                Some(series) => Ok(scales.len() * series.len()),
                None => Err(SearchError::NoSeries {
                    id: self.id.clone(),
                }),
            },
            None => Err(SearchError::NoValueSource {
                id: self.id.clone(),
            }),
        }
    }

    /// Expand the specification into its ordered candidate values.
    ///
    /// A fixed value yields a singleton, an explicit set is returned
    /// verbatim, and a scale list is crossed with the standard series in
    /// scale-major order.
    pub fn expanded_values(&self, series: Option<&Series>) -> Result<Vec<f64>> {
        if let Some(value) = self.value {
            return Ok(vec![value]);
        }
        if let Some(ref set) = self.value_set {
            return Ok(set.clone());
        }
        match self.value_scale {
            Some(ref scales) => {
                let series = series.ok_or_else(|| SearchError::NoSeries {
                    id: self.id.clone(),
                })?;
                Ok(scales
                    .iter()
                    .cartesian_product(series.values().iter())
                    .map(|(scale, unit)| unit * scale)
                    .collect())
            }
            None => Err(SearchError::NoValueSource {
                id: self.id.clone(),
            }),
        }
    }

    /// Three-point manufacturing band around a nominal value:
    /// `[nominal - delta, nominal, nominal + delta]` with
    /// `delta = nominal * tolerance / 100`.
    pub fn tolerance_band(&self, nominal: f64) -> [f64; 3] {
        let delta = nominal * self.tolerance * 0.01;
        [nominal - delta, nominal, nominal + delta]
    }
}

/// A named read-only constant of the circuit, e.g. a supply voltage.
#[derive(Debug, Clone)]
pub struct FixedParam {
    id: String,
    value: f64,
    units: String,
    description: String,
}

impl FixedParam {
    pub fn new(id: &str, value: f64, units: &str) -> Self {
        FixedParam {
            id: id.to_string(),
            value,
            units: units.to_string(),
            description: String::new(),
        }
    }

    /// Attach a free-text description.
    pub fn describe(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A named output of the circuit equations with the value the search aims
/// for.
#[derive(Debug, Clone)]
pub struct Target {
    id: String,
    value: f64,
    units: String,
    description: String,
}

impl Target {
    pub fn new(id: &str, target_value: f64, units: &str) -> Self {
        Target {
            id: id.to_string(),
            value: target_value,
            units: units.to_string(),
            description: String::new(),
        }
    }

    /// Attach a free-text description.
    pub fn describe(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The value the search tries to reach.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
