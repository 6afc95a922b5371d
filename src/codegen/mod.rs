//! Code shape planning for the class files a checked unit produces.
//!
//! Only the shape is planned here (names, flags, synthetic members,
//! constructor descriptors); byte encoding belongs to a downstream writer.

pub mod descriptor;
pub mod flags;
pub mod plan;

use std::fmt::Write as _;

pub use plan::{plan_unit, ClassModifier, ShapePlan, SyntheticMethod};

/// Text dump of plans, one block per class file, used by the `plan` command
pub fn describe(plans: &[ShapePlan]) -> String {
    let mut out = String::new();
    for plan in plans.iter().flat_map(ShapePlan::flatten) {
        let _ = writeln!(out, "{} [{}]", plan.binary_name, flags::flag_names(plan.access_flags).join(" "));
        if plan.needs_values_array {
            let _ = writeln!(out, "  field $VALUES");
        }
        if plan.needs_static_initializer {
            let _ = writeln!(out, "  <clinit>");
        }
        for c in &plan.constructor_signatures {
            let _ = writeln!(out, "  <init>{}", c);
        }
        for m in plan.synthetic_methods.iter().filter(|m| m.name != "<init>") {
            let _ = writeln!(out, "  synthetic {}{}", m.name, m.descriptor);
        }
    }
    out
}
