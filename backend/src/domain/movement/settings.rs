//! Tunables for the movement write path.

use super::{
    DEFAULT_GPS_TOLERANCE, DEFAULT_MAX_CYCLES_PER_GROUP, SlotLayout, SlotLayoutError,
    StatusStrategy,
};

/// Rejected movement settings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MovementSettingsError {
    #[error(transparent)]
    Layout(#[from] SlotLayoutError),
    #[error("max_cycles_per_group must be at least 1")]
    ZeroCyclesPerGroup,
    #[error("gps tolerance must be a positive finite number (got {0})")]
    InvalidTolerance(f64),
}

/// Validated configuration shared by the cycle writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementSettings {
    layout: SlotLayout,
    max_cycles_per_group: u32,
    status_strategy: StatusStrategy,
}

impl MovementSettings {
    /// Validate settings.
    ///
    /// # Examples
    /// ```
    /// use equipment_movements::domain::movement::{MovementSettings, SlotLayout, StatusStrategy};
    ///
    /// let settings = MovementSettings::new(
    ///     SlotLayout::new(10, 200).expect("layout"),
    ///     6,
    ///     StatusStrategy::GpsMatching { tolerance: 0.001 },
    /// )
    /// .expect("valid settings");
    /// assert_eq!(settings.max_cycles_per_group(), 6);
    /// ```
    pub fn new(
        layout: SlotLayout,
        max_cycles_per_group: u32,
        status_strategy: StatusStrategy,
    ) -> Result<Self, MovementSettingsError> {
        if max_cycles_per_group == 0 {
            return Err(MovementSettingsError::ZeroCyclesPerGroup);
        }
        match status_strategy {
            StatusStrategy::GpsMatching { tolerance }
                if !tolerance.is_finite() || tolerance <= 0.0 =>
            {
                return Err(MovementSettingsError::InvalidTolerance(tolerance));
            }
            _ => {}
        }
        Ok(Self {
            layout,
            max_cycles_per_group,
            status_strategy,
        })
    }

    pub fn layout(&self) -> SlotLayout {
        self.layout
    }

    pub fn max_cycles_per_group(&self) -> u32 {
        self.max_cycles_per_group
    }

    pub fn status_strategy(&self) -> StatusStrategy {
        self.status_strategy
    }

    #[must_use]
    pub fn with_status_strategy(mut self, status_strategy: StatusStrategy) -> Self {
        self.status_strategy = status_strategy;
        self
    }
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            layout: SlotLayout::default(),
            max_cycles_per_group: DEFAULT_MAX_CYCLES_PER_GROUP,
            status_strategy: StatusStrategy::TypeTag,
        }
    }
}

/// GPS strategy with the default tolerance.
pub fn default_gps_strategy() -> StatusStrategy {
    StatusStrategy::GpsMatching {
        tolerance: DEFAULT_GPS_TOLERANCE,
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn defaults_match_documented_values() {
        let settings = MovementSettings::default();
        assert_eq!(settings.layout().slot_count(), 10);
        assert_eq!(settings.layout().slot_capacity(), 200);
        assert_eq!(settings.max_cycles_per_group(), 6);
        assert_eq!(settings.status_strategy(), StatusStrategy::TypeTag);
    }

    #[rstest]
    fn zero_cycles_per_group_is_rejected() {
        let result = MovementSettings::new(SlotLayout::default(), 0, StatusStrategy::TypeTag);
        assert_eq!(result, Err(MovementSettingsError::ZeroCyclesPerGroup));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.5)]
    #[case(f64::INFINITY)]
    fn bad_tolerance_is_rejected(#[case] tolerance: f64) {
        let result = MovementSettings::new(
            SlotLayout::default(),
            6,
            StatusStrategy::GpsMatching { tolerance },
        );
        assert!(matches!(
            result,
            Err(MovementSettingsError::InvalidTolerance(_))
        ));
    }
}
