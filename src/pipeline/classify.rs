use crate::domain::{ErrorBody, FetchOutcome, SideSignal};
use crate::fetcher::Envelope;
use crate::pipeline::FetchOptions;

/// What a single envelope turns into once the request has returned.
#[derive(Debug, PartialEq)]
pub struct Classification<T> {
    pub outcome: Option<FetchOutcome<T>>,
    pub signals: Vec<SideSignal>,
    /// Stored preferences must be wiped before the signals go out.
    pub clear_preferences: bool,
}

impl<T> Classification<T> {
    fn silent() -> Self {
        Self {
            outcome: None,
            signals: Vec::new(),
            clear_preferences: false,
        }
    }

    fn error(message: String, options: &FetchOptions) -> Self {
        let signals = if options.show_error_toast {
            vec![SideSignal::ShowToast(message.clone())]
        } else {
            Vec::new()
        };
        Self {
            outcome: Some(FetchOutcome::Error(message)),
            signals,
            clear_preferences: false,
        }
    }
}

pub fn classify<T>(envelope: Envelope<T>, options: &FetchOptions) -> Classification<T> {
    let successful = envelope.is_successful();
    let status_message = envelope.status_message();

    match envelope {
        Envelope {
            status,
            body: Some(body),
            ..
        } if successful => {
            if status == 200 || status == 201 {
                Classification {
                    outcome: Some(FetchOutcome::Success(body)),
                    signals: Vec::new(),
                    clear_preferences: false,
                }
            } else {
                Classification::error(status_message, options)
            }
        }
        Envelope { status: 401, .. } => Classification {
            outcome: None,
            signals: vec![SideSignal::Unauthorized],
            clear_preferences: true,
        },
        Envelope { error_body, .. } => {
            match error_body.as_deref().and_then(ErrorBody::detail_of) {
                Some(detail) => Classification::error(detail, options),
                None if options.surface_malformed_errors => {
                    Classification::error(status_message, options)
                }
                None => {
                    tracing::warn!(
                        "Dropping {} response without an error detail",
                        status_message
                    );
                    Classification::silent()
                }
            }
        }
    }
}
