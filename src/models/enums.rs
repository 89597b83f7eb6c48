use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string did not name any variant of a string-backed enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: {value}")]
pub struct InvalidEnumValue {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        $(#[$meta])*
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnumValue {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(
    #[serde(rename_all = "lowercase")]
    DocumentType {
        Sales => "sales",
        Gift => "gift",
        Rental => "rental",
        Authority => "authority",
    }
);

str_enum!(VerificationStatus {
    Original => "Original",
    Fake => "Fake",
    Error => "Error",
});

str_enum!(MatchStatus {
    Match => "Match",
    Mismatch => "Mismatch",
});

str_enum!(SchemaType {
    Text => "string",
});

str_enum!(
    #[serde(rename_all = "lowercase")]
    PipelineState {
        Idle => "idle",
        Rasterizing => "rasterizing",
        Extracting => "extracting",
        Comparing => "comparing",
        Done => "done",
        Error => "error",
    }
);

impl PipelineState {
    /// Legal forward moves. `Error` is only reachable from `Extracting`.
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Rasterizing)
                | (Self::Rasterizing, Self::Extracting)
                | (Self::Extracting, Self::Comparing)
                | (Self::Extracting, Self::Error)
                | (Self::Comparing, Self::Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}
