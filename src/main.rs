//! Worked example: dimensioning the divider network of an asymmetrical
//! inverted Schmitt trigger on a single 5 V supply.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use rcl_calc::*;

/// Console renderer for the search progress: a runtime estimate after the
/// warm-up, then a milestone bar with `|` at 5% and `.` at 1% steps.
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn estimate(&mut self, projected: Duration) {
        let secs = projected.as_secs();
        println!(
            "Estimated time: {} H {} M {} S",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        );
        print!("Progress: ");
        io::stdout().flush().ok();
    }

    fn tick(&mut self, done: u128, total: u128) {
        if done == 0 || total == 0 {
            return;
        }
        let half_percent = done * 200 / total;
        if half_percent % 10 == 0 {
            print!("|");
        } else if half_percent % 2 == 0 {
            print!(".");
        }
        io::stdout().flush().ok();
    }

    fn finish(&mut self) {
        println!();
    }
}

/// Interactive confirmation for searches past the safe combination count.
fn confirm(total: u128) -> bool {
    let stdin = io::stdin();
    loop {
        print!(
            "ALERT: Can take a long time to process, {} combinations, safe [< {}], continue (y, n)? ",
            total, DEFAULT_GATE_THRESHOLD
        );
        io::stdout().flush().ok();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }
        match line.trim() {
            "y" | "Y" => return true,
            "n" | "N" => return false,
            _ => {}
        }
    }
}

/// The circuit equations: both switching thresholds of the trigger as seen
/// from the divider formed by R1, R2 and R3.
fn trigger_thresholds(env: &Env, out: &mut Outputs) -> Result<()> {
    let vcc = env.param("VCC")?;
    let r1 = env.component("R1")?;
    let r2 = env.component("R2")?;
    let r3 = env.component("R3")?;

    let r_total_low = (r2 * r3) / (r2 + r3);
    out.set("V_low_threshold", vcc * r_total_low / (r1 + r_total_low))?;

    let r_total_high = (r1 * r3) / (r1 + r3);
    out.set("V_high_threshold", vcc * r2 / (r2 + r_total_high))?;

    Ok(())
}

/// Sanity checks on the fixed parameters and targets before searching.
fn consistent(vcc: f64, v_low: f64, v_high: f64) -> bool {
    let mut passed = true;
    if !(0.0 < vcc) {
        println!("Error in specification VCC, it has to be: 0 < VCC");
        passed = false;
    }
    if !(v_low < v_high) {
        println!("Error in specification, it has to be: V_low_threshold < V_high_threshold");
        passed = false;
    }
    if !(0.0 <= v_low && v_low <= vcc) {
        println!("Error in specification, it has to be: 0 <= V_low_threshold <= VCC");
        passed = false;
    }
    if !(0.0 <= v_high && v_high <= vcc) {
        println!("Error in specification, it has to be: 0 <= V_high_threshold <= VCC");
        passed = false;
    }
    passed
}

fn print_report(calc: &RclCalc, label: &str, solution: &Solution) {
    println!("Obtained calculation values.");
    for reading in solution.targets() {
        println!(
            "{}_obtained: {:.6} {}  delta: {:.6} {}",
            reading.name(),
            reading.obtained(),
            reading.units(),
            reading.delta(),
            reading.units()
        );
    }
    println!();
    println!("{} component values.", label);
    for component in calc.components() {
        if let Some(value) = solution.component(component.id()) {
            println!(
                "{} {}: {:.9} {} {} %",
                label,
                component.id(),
                value,
                component.kind().unit(),
                component.tolerance()
            );
        }
    }
    println!();
}

fn main() {
    println!("#####################################################");
    println!("#                                                   #");
    println!("#  Platform to search any circuit component values  #");
    println!("#             and tolerance analysis.               #");
    println!("#                                                   #");
    println!("#####################################################");
    println!();

    // OpAmp-friendly resistor decades, 100 Ohm to 1 MOhm.
    let scales = vec![100.0, 1000.0, 10000.0, 100000.0];

    let calc = RclCalc::new(
        vec![
            ComponentSpec::new("R1", ComponentKind::Resistor, 1.0)
                .value_scale(scales.clone())
                .describe("Upper resistor of voltage divider."),
            ComponentSpec::new("R2", ComponentKind::Resistor, 1.0)
                .value_scale(scales.clone())
                .describe("Lower resistor of voltage divider."),
            ComponentSpec::new("R3", ComponentKind::Resistor, 1.0)
                .value_scale(scales)
                .describe("OpAmp feedback resistor."),
            ComponentSpec::new("C1", ComponentKind::Capacitor, 10.0)
                .value(1e-6)
                .describe("Not used capacitor."),
            ComponentSpec::new("C2", ComponentKind::Capacitor, 1.0)
                .value_set(vec![1e-6, 10e-6])
                .describe("Not used capacitor."),
            ComponentSpec::new("L1", ComponentKind::Inductor, 20.0)
                .value(1e-3)
                .describe("Not used inductor."),
        ],
        vec![
            FixedParam::new("VCC", 5.0, "Volt").describe("Positive supply reference voltage."),
            FixedParam::new("GND", 0.0, "Volt").describe("Ground reference voltage."),
        ],
        vec![
            Target::new("V_low_threshold", 0.555, "Volt")
                .describe("The threshold for the lower voltage."),
            Target::new("V_high_threshold", 0.575, "Volt")
                .describe("The threshold for the higher voltage."),
        ],
    )
    .expect("Error: Invalid search configuration");

    println!("### Specification:");
    println!();
    println!("Fixed parameters.");
    for param in calc.params() {
        println!("{}: {:.6} {}", param.id(), param.value(), param.units());
    }
    println!();
    println!("Target calculation values.");
    for target in calc.targets() {
        println!("{}_target: {:.6} {}", target.id(), target.value(), target.units());
    }
    println!();

    let param = |id: &str| {
        calc.params()
            .iter()
            .find(|p| p.id() == id)
            .expect("Error: Missing fixed parameter")
            .value()
    };
    let target = |id: &str| {
        calc.targets()
            .iter()
            .find(|t| t.id() == id)
            .expect("Error: Missing target")
            .value()
    };
    if !consistent(
        param("VCC"),
        target("V_low_threshold"),
        target("V_high_threshold"),
    ) {
        return;
    }

    println!(
        "Number of combinations: {}",
        calc.combinations().expect("Error: Expansion failed")
    );

    let gate = Gate::confirm_with(DEFAULT_GATE_THRESHOLD, confirm);

    let best = calc
        .search(trigger_thresholds, &gate, &mut ConsoleProgress)
        .expect("Error: Search failed");
    let best = match best {
        Some(best) => best,
        None => {
            println!("Search declined.");
            return;
        }
    };

    println!("### Solution");
    println!("Best_error: {:.9}", best.error());
    println!("Best values: {}", best);
    println!();
    print_report(&calc, "Best", &best);

    let worst = calc
        .tolerance_analysis(&best, trigger_thresholds, &gate, &mut ConsoleProgress)
        .expect("Error: Tolerance analysis failed");
    let worst = match worst {
        Some(worst) => worst,
        None => {
            println!("Tolerance analysis declined.");
            return;
        }
    };

    println!("### Tolerance analysis");
    println!("Worst_error: {:.9}", worst.error());
    println!("Worst values: {}", worst);
    println!();
    print_report(&calc, "Worst", &worst);
}
