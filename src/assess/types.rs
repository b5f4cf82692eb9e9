use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const BIO_KEYS: [&str; 5] = ["A1", "A2", "A3", "A4", "A5"];
pub const DOC_KEYS: [&str; 5] = ["B1", "B2", "B3", "B4", "B5"];

/// One ternary rubric value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subscore {
    #[default]
    Zero,
    Half,
    Full,
}

impl Subscore {
    /// Exact members of `{0, 0.5, 1}` only.
    pub fn from_f64(value: f64) -> Option<Self> {
        if value == 0.0 {
            Some(Self::Zero)
        } else if value == 0.5 {
            Some(Self::Half)
        } else if value == 1.0 {
            Some(Self::Full)
        } else {
            None
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::Half => 0.5,
            Self::Full => 1.0,
        }
    }
}

impl Serialize for Subscore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

impl<'de> Deserialize<'de> for Subscore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::from_f64(value)
            .ok_or_else(|| serde::de::Error::custom(format!("{value} is not one of 0, 0.5, 1")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RubricGroup {
    Bio,
    Documentation,
}

impl RubricGroup {
    pub const ALL: [Self; 2] = [Self::Bio, Self::Documentation];

    pub fn keys(self) -> [&'static str; 5] {
        match self {
            Self::Bio => BIO_KEYS,
            Self::Documentation => DOC_KEYS,
        }
    }

    /// Canonical response field.
    pub fn field(self) -> &'static str {
        match self {
            Self::Bio => "bio_subscores",
            Self::Documentation => "documentation_subscores",
        }
    }

    /// Field names models use instead of the canonical one, canonical first.
    pub fn field_aliases(self) -> [&'static str; 3] {
        match self {
            Self::Bio => ["bio_subscores", "bio_subcriteria", "bio_components"],
            Self::Documentation => [
                "documentation_subscores",
                "documentation_subcriteria",
                "documentation_components",
            ],
        }
    }
}

/// Canonical `A1..A5` and `B1..B5` mappings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RubricSubscores {
    pub bio: [Subscore; 5],
    pub documentation: [Subscore; 5],
}

impl RubricSubscores {
    pub fn group(&self, group: RubricGroup) -> &[Subscore; 5] {
        match group {
            RubricGroup::Bio => &self.bio,
            RubricGroup::Documentation => &self.documentation,
        }
    }

    pub fn group_mut(&mut self, group: RubricGroup) -> &mut [Subscore; 5] {
        match group {
            RubricGroup::Bio => &mut self.bio,
            RubricGroup::Documentation => &mut self.documentation,
        }
    }

    /// Look up `A1`..`B5`.
    pub fn get(&self, key: &str) -> Option<Subscore> {
        RubricGroup::ALL.into_iter().find_map(|group| {
            group
                .keys()
                .iter()
                .position(|k| *k == key)
                .map(|idx| self.group(group)[idx])
        })
    }

    pub fn a4(&self) -> Subscore {
        self.bio[3]
    }

    pub fn b2(&self) -> Subscore {
        self.documentation[1]
    }

    pub fn b3(&self) -> Subscore {
        self.documentation[2]
    }

    pub fn mean(&self, group: RubricGroup) -> f64 {
        let values = self.group(group);
        values.iter().map(|s| s.value()).sum::<f64>() / values.len() as f64
    }
}

struct GroupMap<'a>(RubricGroup, &'a [Subscore; 5]);

impl Serialize for GroupMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        for (key, value) in self.0.keys().iter().zip(self.1.iter()) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for RubricSubscores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(
            RubricGroup::Bio.field(),
            &GroupMap(RubricGroup::Bio, &self.bio),
        )?;
        map.serialize_entry(
            RubricGroup::Documentation.field(),
            &GroupMap(RubricGroup::Documentation, &self.documentation),
        )?;
        map.end()
    }
}

/// Composite scores, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub bio_score: f64,
    pub documentation_score: f64,
    pub doc_score_v2: f64,
    pub confidence: f64,
}

/// Violations reported for one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptViolations {
    pub attempt: u32,
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryDiagnostics {
    pub attempts: u32,
    pub schema_errors: Vec<AttemptViolations>,
    pub prompt_augmented: bool,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DecisionKind {
    Add,
    Review,
    DoNotAdd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub kind: DecisionKind,
    pub reasons: Vec<String>,
}

impl Decision {
    pub fn new(kind: DecisionKind, reasons: &[&str]) -> Self {
        Self {
            kind,
            reasons: reasons.iter().map(|r| (*r).to_string()).collect(),
        }
    }
}
