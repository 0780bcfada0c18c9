use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Canonical provider identifiers stamped onto every emitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Lseg,
    Yahoo,
}

impl ProviderId {
    pub const ALL: [Self; 2] = [Self::Lseg, Self::Yahoo];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lseg => "lseg",
            Self::Yahoo => "yahoo",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lseg" => Ok(Self::Lseg),
            "yahoo" => Ok(Self::Yahoo),
            other => Err(ConfigError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_source() {
        let source = ProviderId::from_str(" Yahoo ").expect("must parse");
        assert_eq!(source, ProviderId::Yahoo);
    }

    #[test]
    fn rejects_unknown_source() {
        let err = ProviderId::from_str("bloomberg").expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidSource { .. }));
    }
}
