/// DTMF (Dual-Tone Multi-Frequency) digits as delivered by the session platform
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use super::shared::value_objects::ParticipantIdentity;

/// A telephone keypad key. Discriminants are the RFC 2833 event codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum DtmfDigit {
    Zero = 0,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Star,
    Pound,
}

/// Keypad in RFC 2833 telephone-event order: the index is the event code
const KEYPAD: [(DtmfDigit, char); 12] = [
    (DtmfDigit::Zero, '0'),
    (DtmfDigit::One, '1'),
    (DtmfDigit::Two, '2'),
    (DtmfDigit::Three, '3'),
    (DtmfDigit::Four, '4'),
    (DtmfDigit::Five, '5'),
    (DtmfDigit::Six, '6'),
    (DtmfDigit::Seven, '7'),
    (DtmfDigit::Eight, '8'),
    (DtmfDigit::Nine, '9'),
    (DtmfDigit::Star, '*'),
    (DtmfDigit::Pound, '#'),
];

impl DtmfDigit {
    pub fn to_char(&self) -> char {
        KEYPAD[self.code() as usize].1
    }

    pub fn from_char(c: char) -> Option<Self> {
        KEYPAD
            .iter()
            .find(|(_, key)| *key == c)
            .map(|(digit, _)| *digit)
    }

    /// RFC 2833 telephone-event code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u32) -> Option<Self> {
        KEYPAD.get(code as usize).map(|(digit, _)| *digit)
    }
}

impl fmt::Display for DtmfDigit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A key press reported by the platform for one participant
#[derive(Debug, Clone)]
pub struct DtmfEvent {
    pub digit: DtmfDigit,
    pub code: u8,
    pub participant: ParticipantIdentity,
    pub received_at: Instant,
}

impl DtmfEvent {
    pub fn new(digit: DtmfDigit, participant: ParticipantIdentity) -> Self {
        Self {
            digit,
            code: digit.code(),
            participant,
            received_at: Instant::now(),
        }
    }

    /// Build from the platform's `(code, digit)` pair.
    ///
    /// The digit string wins when both are present; the code is only
    /// consulted when the digit is empty. Anything but a single key is rejected.
    pub fn from_platform(code: u32, digit: &str, participant: ParticipantIdentity) -> Option<Self> {
        let mut keys = digit.trim().chars();
        let parsed = match (keys.next(), keys.next()) {
            (Some(c), None) => DtmfDigit::from_char(c),
            (None, _) => DtmfDigit::from_code(code),
            (Some(_), Some(_)) => None,
        }?;

        Some(Self::new(parsed, participant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtmf_digit_conversion() {
        assert_eq!(DtmfDigit::Zero.to_char(), '0');
        assert_eq!(DtmfDigit::Nine.to_char(), '9');
        assert_eq!(DtmfDigit::Star.to_char(), '*');
        assert_eq!(DtmfDigit::Pound.to_char(), '#');

        assert_eq!(DtmfDigit::from_char('5'), Some(DtmfDigit::Five));
        assert_eq!(DtmfDigit::from_char('#'), Some(DtmfDigit::Pound));
        assert_eq!(DtmfDigit::from_char('x'), None);
    }

    #[test]
    fn test_dtmf_codes() {
        assert_eq!(DtmfDigit::Zero.code(), 0);
        assert_eq!(DtmfDigit::Seven.code(), 7);
        assert_eq!(DtmfDigit::Star.code(), 10);
        assert_eq!(DtmfDigit::Pound.code(), 11);

        assert_eq!(DtmfDigit::from_code(3), Some(DtmfDigit::Three));
        assert_eq!(DtmfDigit::from_code(10), Some(DtmfDigit::Star));
        assert_eq!(DtmfDigit::from_code(99), None);
    }

    #[test]
    fn test_from_platform() {
        let caller = ParticipantIdentity::new("sip_caller");

        let event = DtmfEvent::from_platform(2, "2", caller.clone()).unwrap();
        assert_eq!(event.digit, DtmfDigit::Two);
        assert_eq!(event.code, 2);
        assert_eq!(event.participant, caller);

        // Empty digit falls back to the code
        let event = DtmfEvent::from_platform(11, "", caller.clone()).unwrap();
        assert_eq!(event.digit, DtmfDigit::Pound);

        assert!(DtmfEvent::from_platform(0, "A", caller.clone()).is_none());
        assert!(DtmfEvent::from_platform(42, "", caller).is_none());
    }

    #[test]
    fn test_from_platform_single_key_only() {
        let caller = ParticipantIdentity::new("sip_caller");

        assert!(DtmfEvent::from_platform(1, "12", caller.clone()).is_none());
        assert!(DtmfEvent::from_platform(2, "2 2", caller.clone()).is_none());

        let padded = DtmfEvent::from_platform(0, " 3 ", caller).unwrap();
        assert_eq!(padded.digit, DtmfDigit::Three);
    }
}
