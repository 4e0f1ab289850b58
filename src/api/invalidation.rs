use serde::{Deserialize, Serialize};

/// Session input whose change invalidates derived values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputTopic {
    Geography,
    Dataset,
    Selection,
    Layout,
}

impl InputTopic {
    const fn bit(self) -> u8 {
        match self {
            Self::Geography => 1 << 0,
            Self::Dataset => 1 << 1,
            Self::Selection => 1 << 2,
            Self::Layout => 1 << 3,
        }
    }
}

/// Bitmask of input topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InputTopics {
    bits: u8,
}

impl InputTopics {
    const ALL_BITS: u8 = InputTopic::Geography.bit()
        | InputTopic::Dataset.bit()
        | InputTopic::Selection.bit()
        | InputTopic::Layout.bit();

    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self {
            bits: Self::ALL_BITS,
        }
    }

    #[must_use]
    pub const fn from_topic(topic: InputTopic) -> Self {
        Self { bits: topic.bit() }
    }

    #[must_use]
    pub const fn with_topic(self, topic: InputTopic) -> Self {
        Self {
            bits: self.bits | topic.bit(),
        }
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.bits & other.bits) != 0
    }

    #[must_use]
    pub const fn contains_topic(self, topic: InputTopic) -> bool {
        self.intersects(Self::from_topic(topic))
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }
}

/// Values the pipeline derives from session inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivedValue {
    SizeScale,
    HistogramXScale,
    Bins,
    HistogramYScale,
    FilteredRecords,
    Backdrop,
}

impl DerivedValue {
    pub const ALL: [Self; 6] = [
        Self::SizeScale,
        Self::HistogramXScale,
        Self::Bins,
        Self::HistogramYScale,
        Self::FilteredRecords,
        Self::Backdrop,
    ];

    /// Inputs this value is computed from; any change to one recomputes it.
    #[must_use]
    pub const fn dependencies(self) -> InputTopics {
        let none = InputTopics::none();
        match self {
            Self::SizeScale => none.with_topic(InputTopic::Dataset),
            Self::HistogramXScale | Self::Bins | Self::HistogramYScale => none
                .with_topic(InputTopic::Dataset)
                .with_topic(InputTopic::Layout),
            Self::FilteredRecords => none
                .with_topic(InputTopic::Dataset)
                .with_topic(InputTopic::Selection),
            Self::Backdrop => none
                .with_topic(InputTopic::Geography)
                .with_topic(InputTopic::Layout),
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_only_touches_filtered_records() {
        let changed = InputTopics::from_topic(InputTopic::Selection);
        let affected: Vec<_> = DerivedValue::ALL
            .into_iter()
            .filter(|value| value.dependencies().intersects(changed))
            .collect();
        assert_eq!(affected, vec![DerivedValue::FilteredRecords]);
    }
}
