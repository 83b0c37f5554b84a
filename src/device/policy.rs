//! Which commands the pet's condition allows.

use super::{DeviceStatus, Emotion, HungerReport};

/// Hunger level at which the device forces the sad expression.
pub const CRITICAL_HUNGER_LEVEL: u8 = 0;

/// A critically hungry pet can only look sad.
pub fn emotion_permitted(hunger: Option<&HungerReport>, emotion: Emotion) -> bool {
    match hunger {
        Some(report) if report.critical => emotion == Emotion::Sad,
        _ => true,
    }
}

/// Entering manual mode is refused while the pet is sad and starving.
pub fn manual_switch_permitted(status: &DeviceStatus) -> bool {
    let sad = status.current_eye_state == i64::from(Emotion::Sad.code());
    let starving = status.hunger_level <= CRITICAL_HUNGER_LEVEL;
    !(sad && starving)
}
