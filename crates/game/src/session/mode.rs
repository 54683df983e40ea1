#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    Local,
    Connecting,
    Online,
    Finished,
}

impl SessionMode {
    /// True while a network session is pending or active.
    pub fn is_networked(self) -> bool {
        matches!(self, SessionMode::Connecting | SessionMode::Online)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Local => "LOCAL",
            SessionMode::Connecting => "CONNECTING",
            SessionMode::Online => "ONLINE",
            SessionMode::Finished => "FINISHED",
        }
    }
}
