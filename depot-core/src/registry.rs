//! Local snapshot of the server's file list plus the pagination cursor.
//!
//! The snapshot is only ever replaced wholesale by a successful listing;
//! mutations are never patched in locally. Each refresh is issued a
//! [`RefreshTicket`] and only the most recently issued ticket may apply its
//! result, so an older response resolving late cannot overwrite a newer one.

use secrecy::SecretString;
use tracing::{debug, error};

use crate::error::ClientError;
use crate::gateway::CrudGateway;
use crate::pagination::{PageView, PaginationState};
use crate::record::FileRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Snapshot replaced, holding this many records
    Applied(usize),
    /// A newer refresh was issued meanwhile; the result was dropped
    Superseded,
}

#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    snapshot: Vec<FileRecord>,
    pagination: PaginationState,
    last_ticket: u64,
}

impl FileRegistry {
    pub fn new(items_per_page: usize) -> Result<Self, ClientError> {
        Ok(Self {
            pagination: PaginationState::new(items_per_page)?,
            ..Default::default()
        })
    }

    pub fn snapshot(&self) -> &[FileRecord] {
        &self.snapshot
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn view(&self) -> PageView<'_, FileRecord> {
        self.pagination.view(&self.snapshot)
    }

    pub fn find(&self, stored_name: &str) -> Option<&FileRecord> {
        self.snapshot.iter().find(|r| r.stored_name == stored_name)
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.last_ticket += 1;
        RefreshTicket(self.last_ticket)
    }

    /// Apply the result of the listing started with `ticket`.
    ///
    /// A failed listing leaves the snapshot untouched and hands the error
    /// back. A superseded ticket is dropped whatever its result.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<FileRecord>, ClientError>,
    ) -> Result<RefreshOutcome, ClientError> {
        if ticket.0 != self.last_ticket {
            debug!(
                "Dropping listing for refresh #{}, #{} is newer",
                ticket.0, self.last_ticket
            );
            return Ok(RefreshOutcome::Superseded);
        }

        match result {
            Ok(records) => {
                debug!("Replacing snapshot with {} records", records.len());
                self.snapshot = records;
                self.pagination.reset();
                Ok(RefreshOutcome::Applied(self.snapshot.len()))
            }
            Err(e) => {
                error!("List error: {}", e);
                Err(e)
            }
        }
    }

    pub async fn refresh(
        &mut self,
        gateway: &dyn CrudGateway,
        api_key: &SecretString,
    ) -> Result<RefreshOutcome, ClientError> {
        let ticket = self.begin_refresh();
        let result = gateway.list(api_key).await;
        self.complete_refresh(ticket, result)
    }

    pub fn go_to_page(&mut self, page: usize) -> bool {
        self.pagination.go_to_page(page, self.snapshot.len())
    }

    pub fn next_page(&mut self) -> bool {
        self.pagination.next_page(self.snapshot.len())
    }

    pub fn prev_page(&mut self) -> bool {
        self.pagination.prev_page(self.snapshot.len())
    }

    pub fn set_items_per_page(&mut self, items_per_page: usize) -> Result<(), ClientError> {
        self.pagination.set_items_per_page(items_per_page)
    }

    /// Forget every record and return to page 1, keeping the page size
    pub fn clear(&mut self) {
        self.snapshot.clear();
        self.pagination.reset();
        // responses still in flight belong to the old session
        self.last_ticket += 1;
    }
}
