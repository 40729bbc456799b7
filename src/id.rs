use serde_derive::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    num::ParseIntError,
    str::FromStr,
};

/// A unique resource identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Hash, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id(i64);

impl Id {
    pub fn as_i64(self) -> i64 { self.0 }
}

impl From<i64> for Id {
    fn from(other: i64) -> Id { Id(other) }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl FromStr for Id {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Id, Self::Err> { s.parse().map(Id) }
}
