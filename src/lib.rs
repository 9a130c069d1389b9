//! An exhaustive value search for R, C and L components in circuit design.
//!
//! Given typed specifications for a set of components, fixed circuit
//! parameters and target quantities, it enumerates every combination of
//! candidate values, evaluates the circuit equations for each one and keeps
//! the combination closest to the targets. A second pass sweeps the
//! manufacturing tolerance band around the winning values to bound the worst
//! case deviation.
//!
//! # Example
//! Dimensioning the divider of an asymmetrical inverted Schmitt trigger:
//! R1, R2 and R3 are drawn from the E24 series over four decades, and the
//! two switching thresholds must land on 0.555 V and 0.575 V.
//! ```rust no_run
//! use rcl_calc::*;
//!
//! fn main() {
//!     let scales = vec![100.0, 1000.0, 10000.0, 100000.0];
//!     let calc = RclCalc::new(
//!         vec![
//!             ComponentSpec::new("R1", ComponentKind::Resistor, 1.0)
//!                 .value_scale(scales.clone()),
//!             ComponentSpec::new("R2", ComponentKind::Resistor, 1.0)
//!                 .value_scale(scales.clone()),
//!             ComponentSpec::new("R3", ComponentKind::Resistor, 1.0)
//!                 .value_scale(scales),
//!         ],
//!         vec![FixedParam::new("VCC", 5.0, "Volt")],
//!         vec![
//!             Target::new("V_low_threshold", 0.555, "Volt"),
//!             Target::new("V_high_threshold", 0.575, "Volt"),
//!         ],
//!     )
//!     .expect("Error: Invalid search configuration");
//!
//!     println!("Number of combinations: {}", calc.combinations().unwrap());
//!
//!     let eval = EvalBuilder::new()
//!         .target(
//!             "V_low_threshold",
//!             "VCC * ((R2*R3)/(R2+R3)) / (R1 + (R2*R3)/(R2+R3))",
//!         )
//!         .target(
//!             "V_high_threshold",
//!             "VCC * R2 / (R2 + (R1*R3)/(R1+R3))",
//!         )
//!         .finish();
//!
//!     let best = calc
//!         .search(eval, &Gate::default(), &mut Silent)
//!         .expect("Error: Search failed")
//!         .expect("Error: Search declined");
//!
//!     println!("Error: {:.6}\nValues: {}", best.error(), best);
//! }
//! ```
//! Running this example produces the results:
//! ```text
//! Number of combinations: 884736
//! Error: 0.001869
//! Values: R1: 2K4, R2: 300R, R3: 62K
//! ```

#[macro_use]
extern crate lazy_static;

mod combo;
mod config;
mod error;
mod search;

#[cfg(feature = "expr_builder")]
mod expr_builder;

pub use crate::combo::Combinations;
pub use crate::config::{ComponentKind, ComponentSpec, FixedParam, Target};
pub use crate::error::{Result, SearchError};
pub use crate::search::{
    Env, Gate, Outputs, Progress, RclCalc, Silent, Solution, TargetReading,
    DEFAULT_GATE_THRESHOLD,
};

#[cfg(feature = "expr_builder")]
pub use crate::expr_builder::EvalBuilder;

lazy_static! {
    /// Series constant for the E24 standard resistor series.
    pub static ref E24: Series = Series::new(&[
        1.0, 1.1, 1.2, 1.3, 1.5, 1.6, 1.8, 2.0, 2.2, 2.4, 2.7, 3.0, 3.3, 3.6, 3.9, 4.3, 4.7,
        5.1, 5.6, 6.2, 6.8, 7.5, 8.2, 9.1,
    ]);
    /// Series constant for the E12 standard capacitor series.
    pub static ref E12: Series = Series::new(&[
        1.0, 1.2, 1.5, 1.8, 2.2, 2.7, 3.3, 3.9, 4.7, 5.6, 6.8, 8.2,
    ]);
}

/// A decade of standard unit values for a component family.
///
/// Unlike catalogue part values, a series holds unit values only; decade
/// scaling comes from each component's own scale list. Inductors have no
/// standard series and must use explicit values or value sets.
#[derive(Debug)]
pub struct Series {
    values: Box<[f64]>,
}

impl Series {
    fn new(values: &[f64]) -> Self {
        Series {
            values: values.to_vec().into_boxed_slice(),
        }
    }

    /// The unit values, ascending within the decade.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
