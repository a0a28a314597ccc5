use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// NOTE: the API hands out plain integer ids for both expenses and categories. A marker type per
// id kind keeps them from being passed where the other is expected.
pub struct Id<T> {
    raw: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn new(raw: u64) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> u64 {
        self.raw
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.raw).finish()
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> FromStr for Id<T> {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self::new)
    }
}

impl<T> From<u64> for Id<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.raw)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

pub enum ExpenseMarker {}
pub enum CategoryMarker {}

pub type ExpenseId = Id<ExpenseMarker>;
pub type CategoryId = Id<CategoryMarker>;

/// Lifecycle tag of an expense. Serialized with the API's Portuguese values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
pub enum Status {
    #[default]
    #[serde(rename = "pendente")]
    #[value(alias = "pendente")]
    Pending,
    #[serde(rename = "pago")]
    #[value(alias = "pago")]
    Paid,
    #[serde(rename = "atrasado")]
    #[value(alias = "atrasado")]
    Late,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::Paid, Status::Late];

    /// Value sent over the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Status::Pending => "pendente",
            Status::Paid => "pago",
            Status::Late => "atrasado",
        }
    }

    /// Hex color used to tag the status in tables.
    pub fn color(self) -> &'static str {
        match self {
            Status::Paid => "#28a745",
            Status::Pending => "#ffc107",
            Status::Late => "#dc3545",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Pending => "pending",
            Status::Paid => "paid",
            Status::Late => "late",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_as_plain_numbers() {
        let id: ExpenseId = serde_json::from_str("7").unwrap();
        assert_eq!(id, ExpenseId::new(7));
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        assert_eq!("  42 ".parse::<CategoryId>().unwrap().get(), 42);
        assert!("abc".parse::<ExpenseId>().is_err());
    }

    #[test]
    fn status_uses_portuguese_wire_values() {
        assert_eq!(serde_json::to_string(&Status::Late).unwrap(), "\"atrasado\"");
        let s: Status = serde_json::from_str("\"pago\"").unwrap();
        assert_eq!(s, Status::Paid);
        assert_eq!(Status::default(), Status::Pending);
        assert!(serde_json::from_str::<Status>("\"cancelado\"").is_err());
    }

    #[test]
    fn status_accepts_english_and_portuguese_on_the_command_line() {
        assert_eq!(Status::from_str("paid", true).unwrap(), Status::Paid);
        assert_eq!(Status::from_str("atrasado", true).unwrap(), Status::Late);
    }
}
