pub mod player;
pub mod ticker;
pub mod transport;
pub mod visual;

pub use player::{Player, note_interval};
pub use ticker::Ticker;
pub use transport::TransportState;
pub use visual::{VisualEvent, VisualQueue, VisualToken};
