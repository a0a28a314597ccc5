use crate::client::Expense;
use crate::types::ExpenseId;

/// The client's ordered copy of the expense collection.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Expense>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, records: Vec<Expense>) {
        self.records = records;
    }

    pub fn append(&mut self, record: Expense) {
        self.records.push(record);
    }

    /// Swaps the record with the same id in place. Returns false when no record matched.
    pub fn replace(&mut self, record: Expense) -> bool {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: ExpenseId) -> Option<Expense> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(idx))
    }

    pub fn get(&self, id: ExpenseId) -> Option<&Expense> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[Expense] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
