//! HL7 v3 NullFlavor vocabulary

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Reason a C-CDA data element carries no value.
///
/// Codes outside the published vocabulary are kept as [`NullFlavor::Unrecognized`]
/// so that a marker is never mistaken for real content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NullFlavor {
    /// NI
    NoInformation,
    /// INV
    Invalid,
    /// DER
    Derived,
    /// OTH
    Other,
    /// NINF
    NegativeInfinity,
    /// PINF
    PositiveInfinity,
    /// UNC
    Unencoded,
    /// MSK
    Masked,
    /// NA
    NotApplicable,
    /// UNK
    Unknown,
    /// ASKU
    AskedButUnknown,
    /// NAV
    TemporarilyUnavailable,
    /// NASK
    NotAsked,
    /// NAVU
    Unavailable,
    /// QS
    SufficientQuantity,
    /// TRC
    Trace,
    /// NP
    NotPresent,
    Unrecognized(String),
}

impl NullFlavor {
    /// Parse a nullFlavor attribute value. Never fails.
    pub fn parse(code: &str) -> Self {
        match code.trim() {
            "NI" => Self::NoInformation,
            "INV" => Self::Invalid,
            "DER" => Self::Derived,
            "OTH" => Self::Other,
            "NINF" => Self::NegativeInfinity,
            "PINF" => Self::PositiveInfinity,
            "UNC" => Self::Unencoded,
            "MSK" => Self::Masked,
            "NA" => Self::NotApplicable,
            "UNK" => Self::Unknown,
            "ASKU" => Self::AskedButUnknown,
            "NAV" => Self::TemporarilyUnavailable,
            "NASK" => Self::NotAsked,
            "NAVU" => Self::Unavailable,
            "QS" => Self::SufficientQuantity,
            "TRC" => Self::Trace,
            "NP" => Self::NotPresent,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// The code as written in the document.
    pub fn code(&self) -> &str {
        match self {
            Self::NoInformation => "NI",
            Self::Invalid => "INV",
            Self::Derived => "DER",
            Self::Other => "OTH",
            Self::NegativeInfinity => "NINF",
            Self::PositiveInfinity => "PINF",
            Self::Unencoded => "UNC",
            Self::Masked => "MSK",
            Self::NotApplicable => "NA",
            Self::Unknown => "UNK",
            Self::AskedButUnknown => "ASKU",
            Self::TemporarilyUnavailable => "NAV",
            Self::NotAsked => "NASK",
            Self::Unavailable => "NAVU",
            Self::SufficientQuantity => "QS",
            Self::Trace => "TRC",
            Self::NotPresent => "NP",
            Self::Unrecognized(code) => code,
        }
    }
}

impl FromStr for NullFlavor {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for NullFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
