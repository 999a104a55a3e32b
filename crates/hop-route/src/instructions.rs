//! Human-readable step text and distance/duration formatting.

use hop_core::cardinal_from_bearing;

use crate::step::{Maneuver, Modifier, Step};

/// Instruction sentence for `step`.
///
/// Arrive steps always name the destination stop.  Otherwise the routing
/// service's own instruction wins when present, and the text is synthesised
/// from the maneuver when it is not.
pub fn instruction_text(step: &Step, stop_name: &str) -> String {
    let road = step
        .road_name
        .as_deref()
        .map(|n| format!(" onto {n}"))
        .unwrap_or_default();

    match (step.maneuver, &step.instruction) {
        (Maneuver::Arrive(Some(side)), _) => format!("Arrive at {stop_name} on your {side}."),
        (Maneuver::Arrive(None), _) => format!("Arrive at {stop_name}."),
        (_, Some(text)) => text.clone(),
        (Maneuver::Depart, None) => {
            let dir = cardinal_from_bearing(step.bearing_after);
            match &step.road_name {
                Some(name) => format!("Head {dir} on {name}."),
                None => format!("Head {dir}."),
            }
        }
        (Maneuver::Turn(Some(m)), None) if m.is_left() => format!("Turn left{road}."),
        (Maneuver::Turn(Some(m)), None) if m.is_right() => format!("Turn right{road}."),
        (Maneuver::Turn(Some(Modifier::UTurn)), None) => format!("Make a U-turn{road}."),
        (Maneuver::Turn(_), None) => format!("Continue straight{road}."),
        (Maneuver::NewName, None) => {
            format!("Continue on {}.", step.road_name.as_deref().unwrap_or("the path"))
        }
        (Maneuver::Roundabout(Some(exit)), None) => {
            format!("At the roundabout, take the {exit}{} exit{road}.", ordinal_suffix(exit))
        }
        (Maneuver::Roundabout(None), None) => format!("At the roundabout, continue{road}."),
        (Maneuver::Continue, None) => format!("Continue{road}."),
    }
}

/// `"st"`, `"nd"`, `"rd"`, or `"th"` for `n`.
pub fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (1, k) if k != 11 => "st",
        (2, k) if k != 12 => "nd",
        (3, k) if k != 13 => "rd",
        _ => "th",
    }
}

/// `"850 m"` below a kilometre, `"1.2 km"` above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1_000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.1} km", meters / 1_000.0)
    }
}

/// `""` for zero, `"~1 min"` up to 90 s, `"~N min"` beyond.
pub fn format_duration(seconds: f64) -> String {
    if seconds <= 0.0 || !seconds.is_finite() {
        return String::new();
    }
    let minutes = (seconds / 60.0).round() as i64;
    if minutes <= 1 {
        "~1 min".to_owned()
    } else {
        format!("~{minutes} min")
    }
}
