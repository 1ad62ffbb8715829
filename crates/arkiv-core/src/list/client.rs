//! Contract with the remote checksum-listing service.

use anyhow::Result;
use chrono::{DateTime, Utc};

/// One page request against a single pillar.
#[derive(Debug, Clone)]
pub struct ContributorQuery {
    pub pillar_id: String,
    /// Oldest calculation timestamp to include. The listing loop advances
    /// this cursor page by page.
    pub min_timestamp: Option<DateTime<Utc>>,
    pub max_timestamp: Option<DateTime<Utc>>,
    /// Upper bound on records per page.
    pub max_results: usize,
}

/// One checksum entry as delivered by a pillar.
#[derive(Debug, Clone)]
pub struct ChecksumRecord {
    pub file_id: String,
    /// Checksum in its wire encoding (raw base16 bytes).
    pub checksum: Vec<u8>,
    /// When the pillar calculated the checksum.
    pub calculated: DateTime<Utc>,
}

/// One page of checksum results.
#[derive(Debug, Clone)]
pub struct ChecksumPage {
    pub records: Vec<ChecksumRecord>,
    /// True when the pillar has more results beyond this page.
    pub partial: bool,
}

/// Client side of the checksum query operation. An `Err` from a page query
/// is fatal to the whole listing run; the cursor cannot be trusted across a
/// failed page.
pub trait ChecksumClient {
    fn get_checksums(&self, collection_id: &str, query: &ContributorQuery) -> Result<ChecksumPage>;
}
