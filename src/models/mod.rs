mod propagation;
mod screen;
mod spot;

pub use propagation::{
    BandCondition, HfBand, PropagationSnapshot, TimeOfDay, VhfConditions, CONDITION_SLOTS,
    HF_BAND_COUNT,
};
pub use screen::Screen;
pub use spot::{format_elapsed_minutes, Spot, SpotMode, CALLSIGN_MAX_LEN, FREQUENCY_MAX_LEN};
