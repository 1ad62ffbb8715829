//! Operation-outcome notifications from the retrieval protocol client.

/// One asynchronous notification about a submitted transfer.
///
/// Every variant carries the file id, so the handler can always validate the
/// notification against the job registry before deciding whether to act.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    /// The remote side finished the operation; the file is ready to fetch.
    Complete { file_id: String },
    /// The operation failed remotely.
    Failed { file_id: String },
    /// Identification progress and other non-terminal notifications.
    Progress { file_id: String },
}

impl TransferEvent {
    pub fn file_id(&self) -> &str {
        match self {
            TransferEvent::Complete { file_id }
            | TransferEvent::Failed { file_id }
            | TransferEvent::Progress { file_id } => file_id,
        }
    }
}
