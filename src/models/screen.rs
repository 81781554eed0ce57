/// Screen currently shown on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Spots,
    SpotsAndPropagation,
    Propagation,
    Clock,
    Settings,
    SleepGracePeriod,
}

impl Screen {
    /// Whether the screen lists spots with an elapsed-time column
    pub fn shows_spots(self) -> bool {
        matches!(self, Screen::Spots | Screen::SpotsAndPropagation)
    }

    /// Whether the screen draws propagation data
    pub fn shows_propagation(self) -> bool {
        matches!(self, Screen::SpotsAndPropagation | Screen::Propagation)
    }
}
