//! Canonical E.164 phone number

use serde::{Deserialize, Serialize};
use std::fmt;

use pv_shared::phone::{mask_phone_number, normalize_e164};

use crate::errors::VerificationError;

/// A phone number that has passed normalisation and E.164 validation
///
/// The only way to build one is [`PhoneNumber::parse`], so holding a
/// `PhoneNumber` means the value is canonical and usable as a store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalise and validate raw user input
    ///
    /// Surrounding whitespace and the separators ` -.()` are removed and a
    /// missing leading `+` is added. Anything else is rejected with
    /// [`VerificationError::InvalidPhoneFormat`].
    pub fn parse(input: &str) -> Result<Self, VerificationError> {
        normalize_e164(input)
            .map(Self)
            .ok_or_else(|| VerificationError::InvalidPhoneFormat {
                phone: input.trim().to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Log-safe representation, e.g. `+1******4567`
    pub fn masked(&self) -> String {
        mask_phone_number(&self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = VerificationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalises_separators() {
        let phone = PhoneNumber::parse("1 (555) 123-4567").unwrap();
        assert_eq!(phone.as_str(), "+15551234567");
    }

    #[test]
    fn test_parse_rejects_letters() {
        let err = PhoneNumber::parse(" +1555CALLNOW ").unwrap_err();
        assert_eq!(
            err,
            VerificationError::InvalidPhoneFormat {
                phone: "+1555CALLNOW".to_string()
            }
        );
    }

    #[test]
    fn test_masked_hides_middle_digits() {
        let phone = PhoneNumber::parse("+15551234567").unwrap();
        assert_eq!(phone.masked(), "+1******4567");
    }

    #[test]
    fn test_serde_validates_on_deserialize() {
        let phone: PhoneNumber = serde_json::from_str("\"+44 20 7183 8750\"").unwrap();
        assert_eq!(phone.as_str(), "+442071838750");
        assert!(serde_json::from_str::<PhoneNumber>("\"not-a-phone\"").is_err());
    }
}
