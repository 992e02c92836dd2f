//! Equipment registry entities.
//!
//! Equipment is created once and never modified. Its identifier is generated
//! from the `EQP` sequence (for example `EQP-00001`).

use std::fmt;

use chrono::{DateTime, Utc};

/// Longest accepted mobile contact number.
pub const MOBILE_MAX: usize = 20;
/// Longest accepted free-text column (identifiers, type tags).
pub const TEXT_COLUMN_MAX: usize = 255;

/// Validation failures for equipment input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EquipmentValidationError {
    #[error("eqp_id must not be empty")]
    EmptyId,
    #[error("eqp_id must be at most 255 characters")]
    IdTooLong,
    #[error("mobile must not be empty")]
    EmptyMobile,
    #[error("mobile must be at most 20 characters")]
    MobileTooLong,
    #[error("eqp_type must not be empty")]
    EmptyType,
    #[error("eqp_type must be at most 255 characters")]
    TypeTooLong,
}

impl EquipmentValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::IdTooLong => "eqp_id",
            Self::EmptyMobile | Self::MobileTooLong => "mobile",
            Self::EmptyType | Self::TypeTooLong => "eqp_type",
        }
    }
}

fn bounded_text<E>(raw: &str, max: usize, empty: E, too_long: E) -> Result<String, E> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(trimmed.to_owned())
}

/// Stable equipment identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EquipmentId(String);

impl EquipmentId {
    /// Validate and trim an identifier.
    ///
    /// # Examples
    /// ```
    /// use equipment_movements::domain::EquipmentId;
    ///
    /// let id = EquipmentId::new(" EQP-00001 ").expect("valid id");
    /// assert_eq!(id.as_str(), "EQP-00001");
    /// assert!(EquipmentId::new("  ").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EquipmentValidationError> {
        bounded_text(
            raw.as_ref(),
            TEXT_COLUMN_MAX,
            EquipmentValidationError::EmptyId,
            EquipmentValidationError::IdTooLong,
        )
        .map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EquipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated input for registering equipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEquipment {
    mobile: String,
    eqp_type: String,
}

impl NewEquipment {
    pub fn new(
        mobile: impl AsRef<str>,
        eqp_type: impl AsRef<str>,
    ) -> Result<Self, EquipmentValidationError> {
        Ok(Self {
            mobile: bounded_text(
                mobile.as_ref(),
                MOBILE_MAX,
                EquipmentValidationError::EmptyMobile,
                EquipmentValidationError::MobileTooLong,
            )?,
            eqp_type: bounded_text(
                eqp_type.as_ref(),
                TEXT_COLUMN_MAX,
                EquipmentValidationError::EmptyType,
                EquipmentValidationError::TypeTooLong,
            )?,
        })
    }

    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    pub fn eqp_type(&self) -> &str {
        &self.eqp_type
    }

    /// Attach the generated identifier and creation time.
    pub fn into_equipment(self, eqp_id: EquipmentId, inserted_on: DateTime<Utc>) -> Equipment {
        Equipment {
            eqp_id,
            mobile: self.mobile,
            eqp_type: self.eqp_type,
            inserted_on,
        }
    }
}

/// A registered piece of road/ground equipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equipment {
    eqp_id: EquipmentId,
    mobile: String,
    eqp_type: String,
    inserted_on: DateTime<Utc>,
}

impl Equipment {
    pub fn eqp_id(&self) -> &EquipmentId {
        &self.eqp_id
    }

    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    pub fn eqp_type(&self) -> &str {
        &self.eqp_type
    }

    pub fn inserted_on(&self) -> DateTime<Utc> {
        self.inserted_on
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn new_equipment_trims_fields() {
        let draft = NewEquipment::new(" 9876543210 ", " excavator ").expect("valid");
        assert_eq!(draft.mobile(), "9876543210");
        assert_eq!(draft.eqp_type(), "excavator");
    }

    #[rstest]
    #[case("", "roller", EquipmentValidationError::EmptyMobile)]
    #[case("123456789012345678901", "roller", EquipmentValidationError::MobileTooLong)]
    #[case("98765", " ", EquipmentValidationError::EmptyType)]
    fn new_equipment_rejects_bad_fields(
        #[case] mobile: &str,
        #[case] eqp_type: &str,
        #[case] expected: EquipmentValidationError,
    ) {
        assert_eq!(NewEquipment::new(mobile, eqp_type), Err(expected));
    }

    #[rstest]
    #[case(EquipmentValidationError::IdTooLong, "eqp_id")]
    #[case(EquipmentValidationError::MobileTooLong, "mobile")]
    #[case(EquipmentValidationError::EmptyType, "eqp_type")]
    fn errors_name_their_field(#[case] err: EquipmentValidationError, #[case] field: &str) {
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn into_equipment_keeps_fields() {
        let now = Utc::now();
        let id = EquipmentId::new("EQP-00007").expect("id");
        let equipment = NewEquipment::new("555", "paver")
            .expect("valid")
            .into_equipment(id.clone(), now);
        assert_eq!(equipment.eqp_id(), &id);
        assert_eq!(equipment.eqp_type(), "paver");
        assert_eq!(equipment.inserted_on(), now);
    }
}
