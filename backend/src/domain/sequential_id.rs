//! Human-readable sequential identifiers such as `EQP-00001`.
//!
//! Each scope owns one monotonically increasing counter. Values are rendered
//! with a five-digit zero-padded suffix; the sequence is exhausted once the
//! counter passes 99 999.

/// Largest value representable in a sequential identifier.
pub const SEQUENCE_MAX: u64 = 99_999;

/// A named counter and the prefix its identifiers carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdScope {
    scope: &'static str,
    prefix: &'static str,
}

impl IdScope {
    /// Counter for equipment identifiers.
    pub const EQUIPMENT: IdScope = IdScope {
        scope: "equipment",
        prefix: "EQP",
    };

    /// Counter for route identifiers.
    pub const ROUTE: IdScope = IdScope {
        scope: "equipment_routes",
        prefix: "ROT",
    };

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Render `value` as an identifier in this scope.
    ///
    /// # Examples
    /// ```
    /// use equipment_movements::domain::IdScope;
    ///
    /// assert_eq!(IdScope::EQUIPMENT.format(1).expect("in range"), "EQP-00001");
    /// assert_eq!(IdScope::ROUTE.format(99_999).expect("in range"), "ROT-99999");
    /// assert!(IdScope::ROUTE.format(100_000).is_err());
    /// ```
    pub fn format(&self, value: u64) -> Result<String, SequenceExhausted> {
        if value == 0 || value > SEQUENCE_MAX {
            return Err(SequenceExhausted {
                scope: self.scope,
                value,
            });
        }
        Ok(format!("{}-{value:05}", self.prefix))
    }
}

/// The counter for a scope moved outside `1..=99_999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("id sequence {scope} exhausted at {value}")]
pub struct SequenceExhausted {
    pub scope: &'static str,
    pub value: u64,
}
