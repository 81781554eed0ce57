pub mod device;
mod line_decoder;
mod propagation_client;
pub mod propagation_parser;
pub mod scheduler;
pub mod session;
mod spot_parser;
mod spot_store;

pub use line_decoder::{LineBuffer, LineDecoder, MAX_LINE_LEN};
pub use propagation_client::{FetchError, PropagationClient, DEFAULT_PROPAGATION_URL};
pub use propagation_parser::parse_propagation;
pub use scheduler::{Action, PowerMode, Scheduler, SleepReason};
pub use session::{FeedStatus, SessionError, SessionManager, TelnetSession};
pub use spot_parser::{classify_mode, ssb_segment, BandSegment, SpotParser, SSB_BAND_PLAN};
pub use spot_store::{SpotStore, SPOT_CAPACITY};
