//! Search driver: best-value search and worst-case tolerance analysis.

use std::fmt;
use std::time::{Duration, Instant};

use itertools::Itertools;

use crate::combo::Combinations;
use crate::config::{ComponentKind, ComponentSpec, FixedParam, Target};
use crate::error::{Result, SearchError};
use crate::{Series, E12, E24};

/// Combination count above which [`Gate`] asks for confirmation by default.
pub const DEFAULT_GATE_THRESHOLD: u128 = 25_000_000;

/// Combinations evaluated before the runtime estimate is sampled.
const WARMUP_COMBINATIONS: u128 = 1000;

/// Decision policy guarding against combinatorial explosion.
///
/// Totals at or below the threshold proceed. Above it, a caller-supplied
/// confirmation function decides; without one the gate declines. A declined
/// gate ends the pass cleanly with no solution, it is not an error.
pub struct Gate {
    threshold: u128,
    confirm: Option<Box<dyn Fn(u128) -> bool>>,
}

impl Gate {
    /// Proceed up to `limit` combinations, decline beyond it.
    pub fn threshold(limit: u128) -> Self {
        Gate {
            threshold: limit,
            confirm: None,
        }
    }

    /// Proceed regardless of the combination count.
    pub fn unlimited() -> Self {
        Gate::threshold(u128::MAX)
    }

    /// Proceed up to `limit` combinations, ask `confirm` beyond it.
    pub fn confirm_with(limit: u128, confirm: impl Fn(u128) -> bool + 'static) -> Self {
        Gate {
            threshold: limit,
            confirm: Some(Box::new(confirm)),
        }
    }

    /// Whether a pass over `total` combinations may start.
    pub fn allows(&self, total: u128) -> bool {
        if total <= self.threshold {
            return true;
        }
        match self.confirm {
            Some(ref confirm) => confirm(total),
            None => false,
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Gate::threshold(DEFAULT_GATE_THRESHOLD)
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Gate")
            .field("threshold", &self.threshold)
            .field("confirm", &self.confirm.is_some())
            .finish()
    }
}

/// Observer for enumeration progress. Purely informational; implementations
/// must not influence the search.
pub trait Progress {
    /// Projected total runtime, sampled once after a short warm-up.
    fn estimate(&mut self, _projected: Duration) {}

    /// Milestone callback, fired every half percent of the total.
    fn tick(&mut self, _done: u128, _total: u128) {}

    /// The pass finished enumerating.
    fn finish(&mut self) {}
}

/// Progress observer that reports nothing.
pub struct Silent;

impl Progress for Silent {}

/// Read access to the fixed parameters and the current combination, handed
/// to the evaluator once per combination.
pub struct Env<'a> {
    params: &'a [FixedParam],
    ids: &'a [String],
    values: &'a [f64],
}

impl<'a> Env<'a> {
    /// Value of a fixed parameter.
    pub fn param(&self, id: &str) -> Result<f64> {
        self.params
            .iter()
            .find(|p| p.id() == id)
            .map(|p| p.value())
            .ok_or_else(|| SearchError::UnknownParameter { id: id.to_string() })
    }

    /// Value of a component in the combination under evaluation.
    pub fn component(&self, id: &str) -> Result<f64> {
        self.ids
            .iter()
            .position(|i| i.as_str() == id)
            .map(|i| self.values[i])
            .ok_or_else(|| SearchError::UnknownComponent { id: id.to_string() })
    }

    /// All fixed parameters as `(id, value)` pairs.
    pub fn fixed_params(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.params.iter().map(|p| (p.id(), p.value()))
    }

    /// The current combination as `(id, value)` pairs.
    pub fn component_values(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.ids
            .iter()
            .zip(self.values)
            .map(|(id, v)| (id.as_str(), *v))
    }
}

/// Name-keyed sink for the evaluator's computed target values.
pub struct Outputs {
    ids: Vec<String>,
    slots: Vec<Option<f64>>,
}

impl Outputs {
    fn new(targets: &[Target]) -> Self {
        Outputs {
            ids: targets.iter().map(|t| t.id().to_string()).collect(),
            slots: vec![None; targets.len()],
        }
    }

    /// Record the computed value of one target quantity.
    pub fn set(&mut self, id: &str, value: f64) -> Result<()> {
        match self.ids.iter().position(|i| i.as_str() == id) {
            Some(i) => {
                self.slots[i] = Some(value);
                Ok(())
            }
            None => Err(SearchError::UnknownTarget { id: id.to_string() }),
        }
    }

    fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }

    fn slot(&self, i: usize) -> Option<f64> {
        self.slots[i]
    }

    fn collected(&self) -> Result<Vec<f64>> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| SearchError::TargetNotProduced {
                    id: self.ids[i].clone(),
                })
            })
            .collect()
    }
}

/// One target quantity as obtained by a finished pass.
#[derive(Debug, Clone)]
pub struct TargetReading {
    name: String,
    units: String,
    target: f64,
    obtained: f64,
}

impl TargetReading {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn obtained(&self) -> f64 {
        self.obtained
    }

    /// Absolute deviation from the target value.
    pub fn delta(&self) -> f64 {
        (self.target - self.obtained).abs()
    }
}

/// Immutable snapshot of the extreme combination found by one pass.
#[derive(Debug, Clone)]
pub struct Solution {
    error: f64,
    components: Vec<(String, ComponentKind, f64)>,
    readings: Vec<TargetReading>,
}

impl Solution {
    /// The pass error: Euclidean distance for the value search, summed
    /// absolute distance for the tolerance analysis.
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Chosen value of one component.
    pub fn component(&self, id: &str) -> Option<f64> {
        self.components
            .iter()
            .find(|(cid, _, _)| cid == id)
            .map(|(_, _, v)| *v)
    }

    /// Chosen values in enumeration (ascending identifier) order.
    pub fn components(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.components
            .iter()
            .map(|(id, _, v)| (id.as_str(), *v))
    }

    /// Obtained target values with their deviations.
    pub fn targets(&self) -> &[TargetReading] {
        &self.readings
    }

    /// Reading for one target quantity.
    pub fn target(&self, name: &str) -> Option<&TargetReading> {
        self.readings.iter().find(|r| r.name == name)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sep = if f.alternate() { "\n" } else { ", " };
        write!(
            f,
            "{}",
            self.components
                .iter()
                .map(|(id, kind, v)| format!("{}: {}", id, format_value(*kind, *v)))
                .join(sep)
        )
    }
}

fn format_scaled(v: f64, unit: &str) -> String {
    let mut val = format!("{}", v);
    if val.contains('.') {
        val.replace(".", unit)
    } else {
        val.push_str(unit);
        val
    }
}

/// RKM-style value code, e.g. `4K7` for 4700 Ohm or `1u` for 1e-6 Farad.
fn format_value(kind: ComponentKind, v: f64) -> String {
    match kind {
        ComponentKind::Resistor => {
            if v < 1e3 {
                format_scaled(v, "R")
            } else if v < 1e6 {
                format_scaled(v / 1e3, "K")
            } else {
                format_scaled(v / 1e6, "M")
            }
        }
        ComponentKind::Capacitor => {
            if v < 1e-9 {
                format_scaled(v * 1e12, "p")
            } else if v < 1e-6 {
                format_scaled(v * 1e9, "n")
            } else if v < 1e-3 {
                format_scaled(v * 1e6, "u")
            } else {
                format_scaled(v, "F")
            }
        }
        ComponentKind::Inductor => {
            if v < 1e-6 {
                format_scaled(v * 1e9, "n")
            } else if v < 1e-3 {
                format_scaled(v * 1e6, "u")
            } else if v < 1.0 {
                format_scaled(v * 1e3, "m")
            } else {
                format_scaled(v, "H")
            }
        }
    }
}

/// The two error reducers driven by the enumeration.
#[derive(Clone, Copy)]
enum Pass {
    /// Minimize Euclidean distance to the targets.
    Best,
    /// Maximize summed absolute distance across the tolerance bands.
    Worst,
}

impl Pass {
    fn initial(self) -> f64 {
        match self {
            Pass::Best => f64::INFINITY,
            Pass::Worst => 0.0,
        }
    }

    fn error(self, targets: &[Target], outputs: &Outputs) -> Result<f64> {
        let mut acc = 0.0;
        for (i, target) in targets.iter().enumerate() {
            let obtained = outputs.slot(i).ok_or_else(|| SearchError::TargetNotProduced {
                id: target.id().to_string(),
            })?;
            let delta = target.value() - obtained;
            match self {
                Pass::Best => acc += delta * delta,
                Pass::Worst => acc += delta.abs(),
            }
        }
        Ok(match self {
            Pass::Best => acc.sqrt(),
            Pass::Worst => acc,
        })
    }

    fn improves(self, error: f64, current: f64) -> bool {
        match self {
            Pass::Best => error < current,
            Pass::Worst => error > current,
        }
    }
}

/// Main calculator struct: the typed search space plus the series each
/// component kind draws scaled values from.
#[derive(Debug)]
pub struct RclCalc {
    components: Vec<ComponentSpec>,
    params: Vec<FixedParam>,
    targets: Vec<Target>,
    series: [Option<&'static Series>; 3],
}

impl RclCalc {
    /// Build a calculator over the given components, fixed parameters and
    /// target quantities.
    ///
    /// Components are enumerated in ascending identifier order regardless of
    /// the order supplied here, which keeps snapshots reproducible.
    /// Duplicate component or target identifiers are rejected.
    pub fn new(
        mut components: Vec<ComponentSpec>,
        params: Vec<FixedParam>,
        targets: Vec<Target>,
    ) -> Result<Self> {
        components.sort_by(|a, b| a.id().cmp(b.id()));
        for pair in components.windows(2) {
            if pair[0].id() == pair[1].id() {
                return Err(SearchError::DuplicateComponent {
                    id: pair[0].id().to_string(),
                });
            }
        }
        for (i, target) in targets.iter().enumerate() {
            if targets[..i].iter().any(|t| t.id() == target.id()) {
                return Err(SearchError::DuplicateTarget {
                    id: target.id().to_string(),
                });
            }
        }
        Ok(RclCalc {
            components,
            params,
            targets,
            series: [Some(&E24), Some(&E12), None],
        })
    }

    /// Override the standard series for one component kind.
    pub fn with_series(mut self, kind: ComponentKind, series: &'static Series) -> Self {
        self.series[kind.index()] = Some(series);
        self
    }

    fn series_for(&self, kind: ComponentKind) -> Option<&Series> {
        self.series[kind.index()]
    }

    pub fn components(&self) -> &[ComponentSpec] {
        &self.components
    }

    pub fn params(&self) -> &[FixedParam] {
        &self.params
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Number of combinations the value search will enumerate. Computed from
    /// the candidate list lengths without materializing anything; this maps
    /// fairly directly to the time the search takes.
    pub fn combinations(&self) -> Result<u128> {
        let mut total: u128 = 1;
        for component in &self.components {
            total *= component.expanded_len(self.series_for(component.kind()))? as u128;
        }
        Ok(total)
    }

    /// Exhaustive best-value search.
    ///
    /// Expands every component, then walks the full cartesian product,
    /// evaluating `eval` per combination and keeping the combination whose
    /// outputs minimize the Euclidean distance to the targets. The first
    /// combination reaching the minimum wins; later ties do not replace it.
    ///
    /// Returns `Ok(None)` when the gate declines the combination count or
    /// when there is nothing to enumerate.
    pub fn search<F>(
        &self,
        eval: F,
        gate: &Gate,
        progress: &mut dyn Progress,
    ) -> Result<Option<Solution>>
    where
        F: Fn(&Env, &mut Outputs) -> Result<()>,
    {
        let mut expanded = Vec::with_capacity(self.components.len());
        for component in &self.components {
            expanded.push(component.expanded_values(self.series_for(component.kind()))?);
        }
        self.run_pass(Pass::Best, &expanded, &eval, gate, progress)
    }

    /// Worst-case tolerance analysis around previously found best values.
    ///
    /// Every component contributes its three-point tolerance band centred on
    /// its value in `nominal`; the pass keeps the band combination whose
    /// outputs maximize the summed absolute distance to the targets.
    ///
    /// Fails with [`SearchError::MissingNominal`] if `nominal` holds no value
    /// for some component. The same gate policy applies as for [`search`]:
    /// three points per component still grow as `3^N`.
    ///
    /// [`search`]: RclCalc::search
    pub fn tolerance_analysis<F>(
        &self,
        nominal: &Solution,
        eval: F,
        gate: &Gate,
        progress: &mut dyn Progress,
    ) -> Result<Option<Solution>>
    where
        F: Fn(&Env, &mut Outputs) -> Result<()>,
    {
        let mut bands = Vec::with_capacity(self.components.len());
        for component in &self.components {
            let centre = nominal.component(component.id()).ok_or_else(|| {
                SearchError::MissingNominal {
                    id: component.id().to_string(),
                }
            })?;
            bands.push(component.tolerance_band(centre).to_vec());
        }
        self.run_pass(Pass::Worst, &bands, &eval, gate, progress)
    }

    fn run_pass<F>(
        &self,
        pass: Pass,
        expanded: &[Vec<f64>],
        eval: &F,
        gate: &Gate,
        progress: &mut dyn Progress,
    ) -> Result<Option<Solution>>
    where
        F: Fn(&Env, &mut Outputs) -> Result<()>,
    {
        let ids: Vec<String> = self
            .components
            .iter()
            .map(|c| c.id().to_string())
            .collect();
        let lists: Vec<&[f64]> = expanded.iter().map(|v| v.as_slice()).collect();
        let combos = Combinations::new(lists);
        let total = combos.total();
        if !gate.allows(total) {
            return Ok(None);
        }

        let mut outputs = Outputs::new(&self.targets);
        let mut extreme = pass.initial();
        let mut snapshot: Option<(Vec<f64>, Vec<f64>)> = None;
        let tick_every = std::cmp::max(total / 200, 1);
        let start = Instant::now();

        for (index, values) in combos.enumerate() {
            let index = index as u128;
            if index == WARMUP_COMBINATIONS && total > WARMUP_COMBINATIONS {
                let elapsed = start.elapsed().as_secs_f64();
                let projected = elapsed * total as f64 / WARMUP_COMBINATIONS as f64;
                progress.estimate(Duration::from_secs_f64(projected));
            }
            if index % tick_every == 0 {
                progress.tick(index, total);
            }

            outputs.clear();
            let env = Env {
                params: &self.params,
                ids: &ids,
                values: &values,
            };
            eval(&env, &mut outputs)?;
            let error = pass.error(&self.targets, &outputs)?;

            // Strict comparison: the first combination at a given extreme
            // wins. The snapshot is seeded from the first combination so a
            // worst pass that never exceeds its floor still reports values.
            if pass.improves(error, extreme) || snapshot.is_none() {
                if pass.improves(error, extreme) {
                    extreme = error;
                }
                snapshot = Some((values, outputs.collected()?));
            }
        }
        progress.finish();

        match snapshot {
            Some((values, obtained)) if extreme.is_finite() => {
                let components = self
                    .components
                    .iter()
                    .zip(values)
                    .map(|(c, v)| (c.id().to_string(), c.kind(), v))
                    .collect();
                let readings = self
                    .targets
                    .iter()
                    .zip(obtained)
                    .map(|(t, o)| TargetReading {
                        name: t.id().to_string(),
                        units: t.units().to_string(),
                        target: t.value(),
                        obtained: o,
                    })
                    .collect();
                Ok(Some(Solution {
                    error: extreme,
                    components,
                    readings,
                }))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::config::ComponentKind::{Capacitor, Resistor};

    fn product_eval(env: &Env, out: &mut Outputs) -> Result<()> {
        let x = env.component("X")?;
        let y = env.component("Y")?;
        out.set("T", x * y)
    }

    fn identity_eval(env: &Env, out: &mut Outputs) -> Result<()> {
        let x = env.component("X")?;
        out.set("T", x)
    }

    fn xy_calc() -> RclCalc {
        RclCalc::new(
            vec![
                ComponentSpec::new("X", Resistor, 10.0).value_set(vec![1.0, 2.0, 3.0]),
                ComponentSpec::new("Y", Resistor, 10.0).value_set(vec![10.0, 20.0]),
            ],
            vec![],
            vec![Target::new("T", 25.0, "Volt")],
        )
        .unwrap()
    }

    #[test]
    fn best_pass_finds_the_brute_force_minimum() {
        let calc = xy_calc();
        let best = calc
            .search(product_eval, &Gate::unlimited(), &mut Silent)
            .unwrap()
            .unwrap();

        // Products in enumeration order: 10, 20, 20, 40, 30, 60
        // -> errors 15, 5, 5, 15, 5, 35.
        assert_eq!(best.error(), 5.0);
        // Three combinations tie at error 5; the lexicographically first,
        // (X=1, Y=20), must win.
        assert_eq!(best.component("X"), Some(1.0));
        assert_eq!(best.component("Y"), Some(20.0));
        assert_eq!(best.target("T").unwrap().obtained(), 20.0);
        assert_eq!(best.target("T").unwrap().delta(), 5.0);
    }

    #[test]
    fn no_enumerated_combination_beats_the_best() {
        let calc = xy_calc();
        let best = calc
            .search(product_eval, &Gate::unlimited(), &mut Silent)
            .unwrap()
            .unwrap();
        for x in &[1.0f64, 2.0, 3.0] {
            for y in &[10.0, 20.0] {
                assert!((25.0 - x * y).abs() >= best.error());
            }
        }
    }

    #[test]
    fn search_is_idempotent() {
        let calc = xy_calc();
        let a = calc
            .search(product_eval, &Gate::unlimited(), &mut Silent)
            .unwrap()
            .unwrap();
        let b = calc
            .search(product_eval, &Gate::unlimited(), &mut Silent)
            .unwrap()
            .unwrap();
        assert_eq!(a.error(), b.error());
        assert_eq!(a.component("X"), b.component("X"));
        assert_eq!(a.component("Y"), b.component("Y"));
    }

    #[test]
    fn declined_gate_evaluates_nothing() {
        let calc = xy_calc();
        let calls = Cell::new(0u32);
        let result = calc
            .search(
                |env: &Env, out: &mut Outputs| {
                    calls.set(calls.get() + 1);
                    product_eval(env, out)
                },
                &Gate::threshold(2),
                &mut Silent,
            )
            .unwrap();
        assert!(result.is_none());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn gate_confirmation_decides_above_the_threshold() {
        let calc = xy_calc();
        let declined = calc
            .search(product_eval, &Gate::confirm_with(2, |_| false), &mut Silent)
            .unwrap();
        assert!(declined.is_none());
        let confirmed = calc
            .search(product_eval, &Gate::confirm_with(2, |_| true), &mut Silent)
            .unwrap();
        assert!(confirmed.is_some());
    }

    #[test]
    fn evaluator_error_aborts_the_pass() {
        let calc = xy_calc();
        let result = calc.search(
            |env: &Env, out: &mut Outputs| {
                let x = env.component("X")?;
                if x > 1.5 {
                    return Err(SearchError::evaluator("degenerate combination"));
                }
                out.set("T", x)
            },
            &Gate::unlimited(),
            &mut Silent,
        );
        match result {
            Err(SearchError::Evaluator { .. }) => {}
            other => panic!("expected Evaluator error, got {:?}", other),
        }
    }

    #[test]
    fn unset_target_is_rejected() {
        let calc = xy_calc();
        let result = calc.search(
            |_env: &Env, _out: &mut Outputs| Ok(()),
            &Gate::unlimited(),
            &mut Silent,
        );
        match result {
            Err(SearchError::TargetNotProduced { id }) => assert_eq!(id, "T"),
            other => panic!("expected TargetNotProduced, got {:?}", other),
        }
    }

    #[test]
    fn unknown_target_is_rejected() {
        let calc = xy_calc();
        let result = calc.search(
            |_env: &Env, out: &mut Outputs| out.set("bogus", 1.0),
            &Gate::unlimited(),
            &mut Silent,
        );
        match result {
            Err(SearchError::UnknownTarget { id }) => assert_eq!(id, "bogus"),
            other => panic!("expected UnknownTarget, got {:?}", other),
        }
    }

    #[test]
    fn unknown_component_lookup_is_rejected() {
        let calc = xy_calc();
        let result = calc.search(
            |env: &Env, out: &mut Outputs| {
                let z = env.component("Z")?;
                out.set("T", z)
            },
            &Gate::unlimited(),
            &mut Silent,
        );
        match result {
            Err(SearchError::UnknownComponent { id }) => assert_eq!(id, "Z"),
            other => panic!("expected UnknownComponent, got {:?}", other),
        }
    }

    #[test]
    fn worst_pass_finds_the_band_maximum() {
        let calc = RclCalc::new(
            vec![ComponentSpec::new("X", Resistor, 10.0).value_set(vec![100.0])],
            vec![],
            vec![Target::new("T", 100.0, "Ohm")],
        )
        .unwrap();
        let best = calc
            .search(identity_eval, &Gate::unlimited(), &mut Silent)
            .unwrap()
            .unwrap();
        assert_eq!(best.component("X"), Some(100.0));

        let worst = calc
            .tolerance_analysis(&best, identity_eval, &Gate::unlimited(), &mut Silent)
            .unwrap()
            .unwrap();
        // Band is [90, 100, 110]; both extremes deviate by 10 and the first
        // one (90) must win.
        assert_eq!(worst.error(), 10.0);
        assert_eq!(worst.component("X"), Some(90.0));
    }

    #[test]
    fn worst_pass_with_exact_match_still_reports_values() {
        let calc = RclCalc::new(
            vec![ComponentSpec::new("X", Resistor, 0.0).value_set(vec![100.0])],
            vec![],
            vec![Target::new("T", 100.0, "Ohm")],
        )
        .unwrap();
        let best = calc
            .search(identity_eval, &Gate::unlimited(), &mut Silent)
            .unwrap()
            .unwrap();
        let worst = calc
            .tolerance_analysis(&best, identity_eval, &Gate::unlimited(), &mut Silent)
            .unwrap()
            .unwrap();
        assert_eq!(worst.error(), 0.0);
        assert_eq!(worst.component("X"), Some(100.0));
    }

    #[test]
    fn tolerance_analysis_requires_nominals_for_every_component() {
        let calc = xy_calc();
        let foreign = Solution {
            error: 0.0,
            components: vec![("X".to_string(), Resistor, 1.0)],
            readings: vec![],
        };
        let result = calc.tolerance_analysis(
            &foreign,
            product_eval,
            &Gate::unlimited(),
            &mut Silent,
        );
        match result {
            Err(SearchError::MissingNominal { id }) => assert_eq!(id, "Y"),
            other => panic!("expected MissingNominal, got {:?}", other),
        }
    }

    #[test]
    fn gate_applies_to_the_tolerance_pass_too() {
        let calc = xy_calc();
        let best = calc
            .search(product_eval, &Gate::unlimited(), &mut Silent)
            .unwrap()
            .unwrap();
        // 3^2 = 9 band combinations, above a threshold of 8.
        let worst = calc
            .tolerance_analysis(&best, product_eval, &Gate::threshold(8), &mut Silent)
            .unwrap();
        assert!(worst.is_none());
    }

    #[test]
    fn fixed_parameters_are_visible_to_the_evaluator() {
        let calc = RclCalc::new(
            vec![ComponentSpec::new("X", Resistor, 1.0).value_set(vec![2.0])],
            vec![FixedParam::new("VCC", 5.0, "Volt")],
            vec![Target::new("T", 10.0, "Volt")],
        )
        .unwrap();
        let best = calc
            .search(
                |env: &Env, out: &mut Outputs| {
                    let vcc = env.param("VCC")?;
                    let x = env.component("X")?;
                    out.set("T", vcc * x)
                },
                &Gate::unlimited(),
                &mut Silent,
            )
            .unwrap()
            .unwrap();
        assert_eq!(best.error(), 0.0);
        assert_eq!(best.target("T").unwrap().obtained(), 10.0);
    }

    #[test]
    fn unknown_parameter_lookup_is_rejected() {
        let calc = xy_calc();
        let result = calc.search(
            |env: &Env, out: &mut Outputs| {
                let vee = env.param("VEE")?;
                out.set("T", vee)
            },
            &Gate::unlimited(),
            &mut Silent,
        );
        match result {
            Err(SearchError::UnknownParameter { id }) => assert_eq!(id, "VEE"),
            other => panic!("expected UnknownParameter, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_component_ids_are_rejected() {
        let result = RclCalc::new(
            vec![
                ComponentSpec::new("R1", Resistor, 1.0).value(100.0),
                ComponentSpec::new("R1", Resistor, 1.0).value(200.0),
            ],
            vec![],
            vec![Target::new("T", 1.0, "Volt")],
        );
        match result {
            Err(SearchError::DuplicateComponent { id }) => assert_eq!(id, "R1"),
            other => panic!("expected DuplicateComponent, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_target_ids_are_rejected() {
        let result = RclCalc::new(
            vec![ComponentSpec::new("R1", Resistor, 1.0).value(100.0)],
            vec![],
            vec![Target::new("T", 1.0, "Volt"), Target::new("T", 2.0, "Volt")],
        );
        match result {
            Err(SearchError::DuplicateTarget { id }) => assert_eq!(id, "T"),
            other => panic!("expected DuplicateTarget, got {:?}", other),
        }
    }

    #[test]
    fn components_enumerate_in_ascending_id_order() {
        let calc = RclCalc::new(
            vec![
                ComponentSpec::new("R2", Resistor, 1.0).value(2.0),
                ComponentSpec::new("C1", Capacitor, 1.0).value(3.0),
                ComponentSpec::new("R1", Resistor, 1.0).value(1.0),
            ],
            vec![],
            vec![Target::new("T", 0.0, "Volt")],
        )
        .unwrap();
        let ids: Vec<&str> = calc.components().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["C1", "R1", "R2"]);
    }

    #[test]
    fn configuration_errors_abort_before_the_gate() {
        // The broken component is detected eagerly even though the gate
        // would have declined the pass.
        let calc = RclCalc::new(
            vec![ComponentSpec::new("R1", Resistor, 1.0)],
            vec![],
            vec![Target::new("T", 1.0, "Volt")],
        )
        .unwrap();
        let result = calc.search(product_eval, &Gate::threshold(0), &mut Silent);
        match result {
            Err(SearchError::NoValueSource { id }) => assert_eq!(id, "R1"),
            other => panic!("expected NoValueSource, got {:?}", other),
        }
    }

    struct Recording {
        estimates: usize,
        ticks: usize,
        finished: bool,
    }

    impl Progress for Recording {
        fn estimate(&mut self, _projected: Duration) {
            self.estimates += 1;
        }

        fn tick(&mut self, _done: u128, _total: u128) {
            self.ticks += 1;
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    #[test]
    fn progress_observer_sees_estimate_and_milestones() {
        let values: Vec<f64> = (0..2000).map(|i| i as f64).collect();
        let calc = RclCalc::new(
            vec![ComponentSpec::new("X", Resistor, 1.0).value_set(values)],
            vec![],
            vec![Target::new("T", 1999.0, "Ohm")],
        )
        .unwrap();
        let mut progress = Recording {
            estimates: 0,
            ticks: 0,
            finished: false,
        };
        let best = calc
            .search(identity_eval, &Gate::unlimited(), &mut progress)
            .unwrap()
            .unwrap();
        assert_eq!(best.component("X"), Some(1999.0));
        assert_eq!(progress.estimates, 1);
        // 2000 combinations, milestone every 10 -> ticks at 0, 10, ..., 1990.
        assert_eq!(progress.ticks, 200);
        assert!(progress.finished);
    }

    #[test]
    fn solution_display_uses_value_codes() {
        let solution = Solution {
            error: 0.0,
            components: vec![
                ("C1".to_string(), Capacitor, 1e-6),
                ("R1".to_string(), Resistor, 4700.0),
            ],
            readings: vec![],
        };
        assert_eq!(format!("{}", solution), "C1: 1u, R1: 4K7");
        assert_eq!(format!("{:#}", solution), "C1: 1u\nR1: 4K7");
    }

    #[test]
    fn value_codes_cover_the_unit_ladders() {
        assert_eq!(format_value(ComponentKind::Resistor, 470.0), "470R");
        assert_eq!(format_value(ComponentKind::Resistor, 4700.0), "4K7");
        assert_eq!(format_value(ComponentKind::Resistor, 150_000.0), "150K");
        assert_eq!(format_value(ComponentKind::Resistor, 1_500_000.0), "1M5");
        assert_eq!(format_value(ComponentKind::Capacitor, 100e-12), "100p");
        assert_eq!(format_value(ComponentKind::Capacitor, 4.7e-9), "4n7");
        assert_eq!(format_value(ComponentKind::Capacitor, 1e-6), "1u");
        assert_eq!(format_value(ComponentKind::Inductor, 1e-3), "1m");
        assert_eq!(format_value(ComponentKind::Inductor, 2.2), "2H2");
    }
}
