use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::cell::{CellKey, ModificationStatus};
use crate::domain::entities::record::{CellValue, Record, RecordId, Row};
use crate::domain::entities::table::{Column, TableId};
use crate::usecase::ports::backend::{BackendError, RecordQuery, RecordsBackend};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Loaded,
    RowsChanged,
    CellStatus {
        key: CellKey,
        status: ModificationStatus,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The edited value equals the displayed one; no request was issued.
    Unchanged,
    /// The backend accepted the commit and its record was reconciled in.
    Committed,
    /// The backend rejected the payload; field errors are on the status.
    Rejected,
    /// Transport or storage failure; no structured errors.
    Failed(String),
    /// A newer commit for the same cell key was issued before this one
    /// resolved; the response was dropped.
    Stale,
}

/// Handle for one in-flight commit. Responses resolve against the ticket;
/// only the most recently issued ticket for a key is applied.
#[derive(Debug)]
pub struct CommitTicket {
    key: CellKey,
    seq: u64,
}

type Listener = Rc<dyn Fn(&RecordStore, &StoreEvent)>;

#[derive(Default)]
struct StoreState {
    table: Option<TableId>,
    columns: Vec<Column>,
    rows: Vec<Row>,
    pending: HashMap<CellKey, CellValue>,
    statuses: HashMap<CellKey, ModificationStatus>,
    issued: HashMap<CellKey, u64>,
}

/// Reactive cache of the open table's rows. All mutation happens here on
/// the UI thread; renderers read snapshots through subscriptions.
pub struct RecordStore {
    backend: Arc<dyn RecordsBackend>,
    state: RefCell<StoreState>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener: Cell<u64>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn RecordsBackend>) -> Self {
        Self {
            backend,
            state: RefCell::new(StoreState::default()),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&RecordStore, &StoreEvent) + 'static) -> SubscriptionId {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .borrow_mut()
            .retain(|(listener_id, _)| *listener_id != id.0);
    }

    fn notify(&self, event: StoreEvent) {
        // Snapshot so listeners may subscribe/unsubscribe while notified.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(self, &event);
        }
    }

    pub fn open_table(&self, table: TableId) -> Result<(), BackendError> {
        let columns = self.backend.load_columns(table)?;
        let page = self
            .backend
            .fetch_records(table, RecordQuery::default())?;

        {
            let mut state = self.state.borrow_mut();
            state.table = Some(table);
            state.columns = columns;
            state.rows = page
                .records
                .into_iter()
                .enumerate()
                .map(|(position, (id, record))| Row::from_record(position, id, record))
                .collect();
            state.pending.clear();
            state.statuses.clear();
            state.issued.clear();
        }

        self.notify(StoreEvent::Loaded);
        Ok(())
    }

    pub fn reload(&self) -> Result<(), BackendError> {
        let table = self.state.borrow().table;
        match table {
            Some(table) => self.open_table(table),
            None => Ok(()),
        }
    }

    #[allow(dead_code)]
    pub fn table(&self) -> Option<TableId> {
        self.state.borrow().table
    }

    pub fn columns(&self) -> Vec<Column> {
        self.state.borrow().columns.clone()
    }

    pub fn rows(&self) -> Vec<Row> {
        self.state.borrow().rows.clone()
    }

    pub fn row(&self, position: usize) -> Option<Row> {
        self.state.borrow().rows.get(position).cloned()
    }

    pub fn statuses(&self) -> HashMap<CellKey, ModificationStatus> {
        self.state.borrow().statuses.clone()
    }

    pub fn cell_status(&self, key: CellKey) -> ModificationStatus {
        self.state
            .borrow()
            .statuses
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }

    /// The value the grid shows: the pending (optimistic) value when a
    /// commit is unresolved or failed, the confirmed value otherwise.
    pub fn display_value(&self, key: CellKey) -> CellValue {
        let state = self.state.borrow();
        if let Some(pending) = state.pending.get(&key) {
            return pending.clone();
        }
        state
            .rows
            .get(key.row)
            .map(|row| row.committed_value(key.column))
            .unwrap_or(CellValue::Null)
    }

    /// Appends a locally-created row with no backing record yet. Returns
    /// its position.
    pub fn append_blank_row(&self) -> usize {
        let position = {
            let mut state = self.state.borrow_mut();
            let position = state.rows.len();
            state.rows.push(Row::blank(position));
            position
        };
        self.notify(StoreEvent::RowsChanged);
        position
    }

    /// Commits one cell of an existing row. No-op updates are suppressed
    /// before any request is issued.
    pub fn update_cell(&self, key: CellKey, value: CellValue) -> CommitOutcome {
        if self.display_value(key) == value {
            return CommitOutcome::Unchanged;
        }

        let (table, record_id) = {
            let state = self.state.borrow();
            let table = match state.table {
                Some(table) => table,
                None => return CommitOutcome::Failed("no table open".to_string()),
            };
            let record_id = match state.rows.get(key.row).and_then(|row| row.record_id) {
                Some(record_id) => record_id,
                None => return CommitOutcome::Failed("row has no backing record".to_string()),
            };
            (table, record_id)
        };

        let ticket = self.begin_commit(key, value.clone());
        let mut patch = Record::new();
        patch.insert(key.column, value);
        let result = self.backend.update_record(table, record_id, patch);
        self.resolve_update(ticket, result)
    }

    /// Commits one cell, creating the record first when the row is new.
    /// This is the single entry point the grid uses.
    pub fn create_or_update_record(&self, key: CellKey, value: CellValue) -> CommitOutcome {
        let is_new = match self.state.borrow().rows.get(key.row) {
            Some(row) => row.is_new,
            None => return CommitOutcome::Failed("row out of range".to_string()),
        };
        if !is_new {
            return self.update_cell(key, value);
        }

        let table = match self.state.borrow().table {
            Some(table) => table,
            None => return CommitOutcome::Failed("no table open".to_string()),
        };

        let ticket = self.begin_commit(key, value);
        let values = {
            let state = self.state.borrow();
            let mut values = Record::new();
            for (pending_key, pending_value) in &state.pending {
                if pending_key.row == key.row {
                    values.insert(pending_key.column, pending_value.clone());
                }
            }
            values
        };
        let result = self.backend.create_record(table, values);
        self.resolve_create(ticket, result)
    }

    /// Stages the pending value, marks the key Processing and issues a
    /// fresh per-key sequence number.
    pub(crate) fn begin_commit(&self, key: CellKey, value: CellValue) -> CommitTicket {
        let seq = {
            let mut state = self.state.borrow_mut();
            state.pending.insert(key, value);
            let seq = state.issued.entry(key).or_insert(0);
            *seq += 1;
            let seq = *seq;
            state
                .statuses
                .insert(key, ModificationStatus::Processing);
            seq
        };
        self.notify(StoreEvent::CellStatus {
            key,
            status: ModificationStatus::Processing,
        });
        CommitTicket { key, seq }
    }

    fn is_stale(&self, ticket: &CommitTicket) -> bool {
        self.state.borrow().issued.get(&ticket.key) != Some(&ticket.seq)
    }

    /// Applies an update response unless a newer commit for the same key
    /// has been issued in the meantime.
    pub(crate) fn resolve_update(
        &self,
        ticket: CommitTicket,
        result: Result<Record, BackendError>,
    ) -> CommitOutcome {
        if self.is_stale(&ticket) {
            debug!(row = ticket.key.row, seq = ticket.seq, "dropping stale update response");
            return CommitOutcome::Stale;
        }

        match result {
            Ok(record) => {
                {
                    let mut state = self.state.borrow_mut();
                    if let Some(row) = state.rows.get_mut(ticket.key.row) {
                        row.record = Some(record);
                    }
                    state.pending.remove(&ticket.key);
                    state.statuses.insert(ticket.key, ModificationStatus::Success);
                }
                self.notify(StoreEvent::CellStatus {
                    key: ticket.key,
                    status: ModificationStatus::Success,
                });
                self.notify(StoreEvent::RowsChanged);
                CommitOutcome::Committed
            }
            Err(error) => self.fail_commit(ticket, error),
        }
    }

    /// Applies a create response: the row gains its backing record and
    /// stops being new; pending values for the whole row are superseded
    /// by the server record.
    pub(crate) fn resolve_create(
        &self,
        ticket: CommitTicket,
        result: Result<(RecordId, Record), BackendError>,
    ) -> CommitOutcome {
        if self.is_stale(&ticket) {
            debug!(row = ticket.key.row, seq = ticket.seq, "dropping stale create response");
            return CommitOutcome::Stale;
        }

        match result {
            Ok((record_id, record)) => {
                {
                    let mut state = self.state.borrow_mut();
                    if let Some(row) = state.rows.get_mut(ticket.key.row) {
                        row.record_id = Some(record_id);
                        row.record = Some(record);
                        row.is_new = false;
                    }
                    let row = ticket.key.row;
                    state.pending.retain(|pending_key, _| pending_key.row != row);
                    // Failures from an earlier rejected create of this row
                    // are superseded by the successful one.
                    state.statuses.retain(|status_key, _| status_key.row != row);
                    state.statuses.insert(ticket.key, ModificationStatus::Success);
                }
                self.notify(StoreEvent::CellStatus {
                    key: ticket.key,
                    status: ModificationStatus::Success,
                });
                self.notify(StoreEvent::RowsChanged);
                CommitOutcome::Committed
            }
            Err(error) => self.fail_commit(ticket, error),
        }
    }

    /// Failure path shared by update and create. Validation errors land
    /// on the cell keys they name; the pending value stays so the grid
    /// keeps showing the last-attempted input.
    fn fail_commit(&self, ticket: CommitTicket, error: BackendError) -> CommitOutcome {
        match error {
            BackendError::Validation(field_errors) => {
                let mut changed: Vec<(CellKey, ModificationStatus)> = Vec::new();
                {
                    let mut state = self.state.borrow_mut();
                    let mut key_covered = false;
                    for (column, errors) in &field_errors {
                        let key = CellKey::new(ticket.key.row, *column);
                        if key == ticket.key {
                            key_covered = true;
                        }
                        let status = ModificationStatus::Failure(errors.clone());
                        state.statuses.insert(key, status.clone());
                        changed.push((key, status));
                    }
                    if !key_covered {
                        let all: Vec<String> =
                            field_errors.values().flatten().cloned().collect();
                        let status = ModificationStatus::Failure(all);
                        state.statuses.insert(ticket.key, status.clone());
                        changed.push((ticket.key, status));
                    }
                }
                for (key, status) in changed {
                    self.notify(StoreEvent::CellStatus { key, status });
                }
                CommitOutcome::Rejected
            }
            BackendError::Message(message) => {
                warn!(row = ticket.key.row, "commit failed: {message}");
                {
                    let mut state = self.state.borrow_mut();
                    state
                        .statuses
                        .insert(ticket.key, ModificationStatus::Failure(Vec::new()));
                }
                self.notify(StoreEvent::CellStatus {
                    key: ticket.key,
                    status: ModificationStatus::Failure(Vec::new()),
                });
                CommitOutcome::Failed(message)
            }
        }
    }
}
