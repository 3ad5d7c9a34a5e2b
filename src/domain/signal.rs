/// Terminal result of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Success(T),
    Error(String),
}

impl<T> FetchOutcome<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Success(data) => FetchOutcome::Success(f(data)),
            FetchOutcome::Error(message) => FetchOutcome::Error(message),
        }
    }
}

/// Auxiliary notification published alongside a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideSignal {
    ShowLoader,
    DismissLoader,
    ShowNetworkAlert,
    Unauthorized,
    ShowToast(String),
}

pub const NETWORK_ALERT: &str = "No network found. Please check your connection";

impl SideSignal {
    /// Text shown to the user for this signal, if it has any.
    pub fn message(&self) -> Option<String> {
        match self {
            SideSignal::ShowToast(message) => Some(message.clone()),
            SideSignal::ShowNetworkAlert => Some(NETWORK_ALERT.to_string()),
            SideSignal::Unauthorized => {
                Some("Unauthorized: stored preferences were cleared".to_string())
            }
            SideSignal::ShowLoader | SideSignal::DismissLoader => None,
        }
    }
}
