// Domain vocabulary: stat kinds, projection sources, position codes.

use std::fmt;

/// Which side of the box score a projection table covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    Batting,
    Pitching,
}

impl StatKind {
    /// Parse a stat-kind string. Accepts the short file-name form and the
    /// long form ("bat"/"batting", "pit"/"pitching").
    pub fn from_str_kind(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bat" | "batting" => Some(StatKind::Batting),
            "pit" | "pitching" => Some(StatKind::Pitching),
            _ => None,
        }
    }

    /// The short identifier used in file names and config keys.
    pub fn id(&self) -> &'static str {
        match self {
            StatKind::Batting => "bat",
            StatKind::Pitching => "pit",
        }
    }

    /// Label of the per-usage rate column for this side.
    pub fn rate_label(&self) -> &'static str {
        match self {
            StatKind::Batting => "Pts/G",
            StatKind::Pitching => "Pts/IP",
        }
    }

    /// Name of the usage column the rate divides by.
    pub fn usage_column(&self) -> &'static str {
        match self {
            StatKind::Batting => "G",
            StatKind::Pitching => "IP",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// The projection systems the tool understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceName {
    Atc,
    DepthCharts,
    Oopsy,
    Steamer,
    TheBat,
    TheBatX,
    Zips,
    ZipsDc,
}

/// All known sources, in the order the CLI advertises them.
pub const ALL_SOURCES: &[SourceName] = &[
    SourceName::Atc,
    SourceName::DepthCharts,
    SourceName::Oopsy,
    SourceName::Steamer,
    SourceName::TheBat,
    SourceName::TheBatX,
    SourceName::Zips,
    SourceName::ZipsDc,
];

impl SourceName {
    /// Parse a preseason source identifier.
    pub fn from_str_source(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "atc" => Some(SourceName::Atc),
            "fangraphsdc" => Some(SourceName::DepthCharts),
            "oopsy" => Some(SourceName::Oopsy),
            "steamer" => Some(SourceName::Steamer),
            "thebat" => Some(SourceName::TheBat),
            "thebatx" => Some(SourceName::TheBatX),
            "zips" => Some(SourceName::Zips),
            "zipsdc" => Some(SourceName::ZipsDc),
            _ => None,
        }
    }

    /// The preseason identifier (tag in rows, stem in file names).
    pub fn id(&self) -> &'static str {
        match self {
            SourceName::Atc => "atc",
            SourceName::DepthCharts => "fangraphsdc",
            SourceName::Oopsy => "oopsy",
            SourceName::Steamer => "steamer",
            SourceName::TheBat => "thebat",
            SourceName::TheBatX => "thebatx",
            SourceName::Zips => "zips",
            SourceName::ZipsDc => "zipsdc",
        }
    }

    /// The rest-of-season identifier. The upstream vendor is not consistent
    /// about these: steamer appends, atc and oopsy switch to their depth-chart
    /// blends, everything else takes an `r` prefix.
    pub fn ros_id(&self) -> &'static str {
        match self {
            SourceName::Steamer => "steamerr",
            SourceName::Atc => "ratcdc",
            SourceName::Oopsy => "roopsydc",
            SourceName::DepthCharts => "rfangraphsdc",
            SourceName::TheBat => "rthebat",
            SourceName::TheBatX => "rthebatx",
            SourceName::Zips => "rzips",
            SourceName::ZipsDc => "rzipsdc",
        }
    }

    /// Identifier for the requested season window.
    pub fn tag(&self, ros: bool) -> &'static str {
        if ros {
            self.ros_id()
        } else {
            self.id()
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Composite source tag for the blended mean rows, by season window.
pub fn blend_tag(ros: bool) -> &'static str {
    if ros {
        "rzobs"
    } else {
        "zobs"
    }
}

/// Roster position codes with defined meaning. Roster configs may carry
/// other codes; they are passed through but flagged in the logs.
pub const KNOWN_POSITION_CODES: &[&str] = &[
    "C", "1B", "2B", "3B", "SS", "MI", "CI", "LF", "CF", "RF", "OF", "DH", "P", "SP", "RP", "UTIL",
];

pub fn is_known_position(code: &str) -> bool {
    KNOWN_POSITION_CODES.contains(&code)
}
