use serde::{Deserialize, Serialize};

use crate::trial::{EventKind, Trial};

/// Per-day expectation in a [`FeedbackTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum DayFlag {
    /// No constraint (-1).
    Ignore,
    /// Light off or plant dead: created glucose must not rise (0).
    Dark,
    /// Light on: created glucose must rise (1).
    Lit,
    /// Plant dead: nothing left in storage (2).
    Dead,
}

impl TryFrom<i8> for DayFlag {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Ignore),
            0 => Ok(Self::Dark),
            1 => Ok(Self::Lit),
            2 => Ok(Self::Dead),
            other => Err(format!("unknown template day flag {other}")),
        }
    }
}

impl From<DayFlag> for i8 {
    fn from(flag: DayFlag) -> Self {
        match flag {
            DayFlag::Ignore => -1,
            DayFlag::Dark => 0,
            DayFlag::Lit => 1,
            DayFlag::Dead => 2,
        }
    }
}

/// Named per-day pattern describing a pedagogically significant trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackTemplate {
    pub name: String,
    pub flags: Vec<DayFlag>,
}

impl FeedbackTemplate {
    #[must_use]
    pub fn new(name: impl Into<String>, flags: Vec<DayFlag>) -> Self {
        Self {
            name: name.into(),
            flags,
        }
    }

    /// Build from raw `-1/0/1/2` flags, rejecting unknown values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first unknown flag.
    pub fn from_raw(name: impl Into<String>, raw: &[i8]) -> Result<Self, String> {
        let flags = raw
            .iter()
            .map(|&flag| DayFlag::try_from(flag))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, flags))
    }

    /// Light for the first `lit_days` days, dark for the rest of `len` entries.
    #[must_use]
    pub fn lit_then_dark(name: impl Into<String>, lit_days: usize, len: usize) -> Self {
        let flags = (0..len)
            .map(|day| match day {
                0 => DayFlag::Ignore,
                d if d <= lit_days => DayFlag::Lit,
                _ => DayFlag::Dark,
            })
            .collect();
        Self::new(name, flags)
    }

    /// Dead from day 1 onwards.
    #[must_use]
    pub fn starved(name: impl Into<String>, len: usize) -> Self {
        let flags = (0..len)
            .map(|day| if day == 0 { DayFlag::Ignore } else { DayFlag::Dead })
            .collect();
        Self::new(name, flags)
    }

    /// Whether every constrained day of `trial` satisfies this template.
    ///
    /// Only trials with at least one completed day can match, and templates
    /// with dead days also need the plant to have died. Past that, a rise in
    /// created glucose needs both days on record; "no rise" and "dead" also
    /// hold for days the trial never reached.
    #[must_use]
    pub fn matches(&self, trial: &Trial) -> bool {
        if trial.last_day() == 0 {
            return false;
        }
        if self.flags.contains(&DayFlag::Dead) && !trial.has_event(EventKind::PlantDied) {
            return false;
        }
        self.flags
            .iter()
            .enumerate()
            .skip(1)
            .all(|(idx, &flag)| {
                let Ok(day) = u32::try_from(idx) else {
                    return false;
                };
                let rose = || match (trial.created_on(day - 1), trial.created_on(day)) {
                    (Some(before), Some(after)) => Some(after > before),
                    _ => None,
                };
                match flag {
                    DayFlag::Ignore => true,
                    DayFlag::Lit => rose() == Some(true),
                    DayFlag::Dark => rose() != Some(true),
                    DayFlag::Dead => trial.stored_on(day).is_none_or(|stored| stored <= 0),
                }
            })
    }
}
