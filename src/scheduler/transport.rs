/// Transport state of one player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransportState::Stopped => "STOP",
            TransportState::Playing => "PLAY",
            TransportState::Paused => "PAUSE",
        }
    }
}
