use std::fmt::Display;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

/// Analysis channel: which ratio/coverage pair a pass works on.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord)]
pub enum Channel {
    /// 5-methylcytosine.
    Mc,
    /// 5-hydroxymethylcytosine.
    Hmc,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Mc, Channel::Hmc];

    /// Lowercase tag used in output file names.
    pub fn file_tag(&self) -> &'static str {
        match self {
            Channel::Mc => "mc",
            Channel::Hmc => "hmc",
        }
    }
}

impl Display for Channel {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Channel::Mc => write!(f, "mC"),
            Channel::Hmc => write!(f, "hmC"),
        }
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mc" | "5mc" => Ok(Channel::Mc),
            "hmc" | "5hmc" => Ok(Channel::Hmc),
            other => Err(format!("Unknown channel: {}", other)),
        }
    }
}

impl Serialize for Channel {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(self.file_tag())
    }
}

impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Cohort membership of a sample.
#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Cohort {
    Case,
    Control,
}

impl Display for Cohort {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Cohort::Case => write!(f, "case"),
            Cohort::Control => write!(f, "control"),
        }
    }
}

/// Strand a series was read from.
#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Strand {
    Forward,
    Reverse,
    /// Forward and reverse counts combined.
    Merged,
}

impl Strand {
    /// Infix used in coverage file names.
    pub fn file_infix(&self) -> &'static str {
        match self {
            Strand::Forward => "forward_",
            Strand::Reverse => "reverse_",
            Strand::Merged => "mix_",
        }
    }
}

impl Display for Strand {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Strand::Forward => write!(f, "forward"),
            Strand::Reverse => write!(f, "reverse"),
            Strand::Merged => write!(f, "merged"),
        }
    }
}

/// Direction of a region's difference, case relative to control.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Case more (hydroxy)methylated than control.
    Hyper,
    /// Case less (hydroxy)methylated than control.
    Hypo,
}

impl Polarity {
    pub fn from_difference(difference: f32) -> Self {
        if difference < 0.0 {
            Polarity::Hypo
        }
        else {
            Polarity::Hyper
        }
    }
}

impl Display for Polarity {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Polarity::Hyper => write!(f, "hyper"),
            Polarity::Hypo => write!(f, "hypo"),
        }
    }
}
