//! Colors for notifications and key-field indicators.

use egui::Color32;

use crate::{controller::state::KeyIndicator, notifications::NotificationKind};

pub const SUCCESS: Color32 = Color32::from_rgb(0x2e, 0xcc, 0x71);
pub const ERROR: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);
pub const NOTIFICATION_TEXT: Color32 = Color32::WHITE;

pub fn notification_fill(kind: NotificationKind) -> Color32 {
    match kind {
        NotificationKind::Success => SUCCESS,
        NotificationKind::Error => ERROR,
    }
}

/// `None` keeps the default widget stroke.
pub fn key_indicator_stroke(indicator: KeyIndicator) -> Option<egui::Stroke> {
    match indicator {
        KeyIndicator::Neutral => None,
        KeyIndicator::Valid => Some(egui::Stroke::new(1.5, SUCCESS)),
        KeyIndicator::Invalid => Some(egui::Stroke::new(1.5, ERROR)),
    }
}

/// Scales alpha only; `opacity` is clamped to `0.0..=1.0`.
pub fn faded(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_indicator_keeps_default_stroke() {
        assert!(key_indicator_stroke(KeyIndicator::Neutral).is_none());
        assert_eq!(
            key_indicator_stroke(KeyIndicator::Invalid).map(|s| s.color),
            Some(ERROR)
        );
    }

    #[test]
    fn fully_transparent_notification_disappears() {
        assert_eq!(faded(SUCCESS, 0.0), Color32::TRANSPARENT);
        assert_eq!(faded(ERROR, 1.0), ERROR);
    }
}
