use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::TrainingError;

/// Stage number of the empty database every pipeline starts from.
pub const EMPTY_STAGE: u8 = 0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Movies,
    Shopify,
}

#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    CreateTables,
    InsertFlatData,
    InsertRatings,
    CreateRelationshipTables,
    InsertRelationshipData,
    Queries,
    Integrity,
}

#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq, Hash)]
pub struct Stage {
    pub dataset: Dataset,
    pub number: u8,
    pub slug: &'static str,
    pub title: &'static str,
    pub kind: StageKind,
}

const MOVIES_STAGES: [Stage; 8] = [
    Stage {
        dataset: Dataset::Movies,
        number: 1,
        slug: "create-tables",
        title: "Create tables with keys, constraints and indices",
        kind: StageKind::CreateTables,
    },
    Stage {
        dataset: Dataset::Movies,
        number: 2,
        slug: "insert-flat-data",
        title: "Insert flat data",
        kind: StageKind::InsertFlatData,
    },
    Stage {
        dataset: Dataset::Movies,
        number: 3,
        slug: "insert-ratings",
        title: "Insert movie ratings",
        kind: StageKind::InsertRatings,
    },
    Stage {
        dataset: Dataset::Movies,
        number: 4,
        slug: "create-relationship-tables",
        title: "Create tables to manage relationships",
        kind: StageKind::CreateRelationshipTables,
    },
    Stage {
        dataset: Dataset::Movies,
        number: 5,
        slug: "insert-relationship-data",
        title: "Insert combined data",
        kind: StageKind::InsertRelationshipData,
    },
    Stage {
        dataset: Dataset::Movies,
        number: 6,
        slug: "queries-single-table",
        title: "Queries on a single table",
        kind: StageKind::Queries,
    },
    Stage {
        dataset: Dataset::Movies,
        number: 7,
        slug: "queries-across-tables",
        title: "Queries across tables",
        kind: StageKind::Queries,
    },
    Stage {
        dataset: Dataset::Movies,
        number: 8,
        slug: "integrity",
        title: "Foreign keys",
        kind: StageKind::Integrity,
    },
];

const SHOPIFY_STAGES: [Stage; 4] = [
    Stage {
        dataset: Dataset::Shopify,
        number: 1,
        slug: "create-tables",
        title: "Create tables with keys, constraints and indices",
        kind: StageKind::CreateTables,
    },
    Stage {
        dataset: Dataset::Shopify,
        number: 2,
        slug: "insert-data",
        title: "Insert app store data",
        kind: StageKind::InsertFlatData,
    },
    Stage {
        dataset: Dataset::Shopify,
        number: 3,
        slug: "queries-single-table",
        title: "Queries on a single table",
        kind: StageKind::Queries,
    },
    Stage {
        dataset: Dataset::Shopify,
        number: 4,
        slug: "queries-across-tables",
        title: "Queries across tables",
        kind: StageKind::Queries,
    },
];

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Movies, Dataset::Shopify];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movies => "movies",
            Self::Shopify => "shopify",
        }
    }

    /// Parse a dataset name.
    ///
    /// # Errors
    /// Returns [`TrainingError::UnknownDataset`] for any other name.
    pub fn parse(value: &str) -> Result<Self, TrainingError> {
        match value {
            "movies" => Ok(Self::Movies),
            "shopify" => Ok(Self::Shopify),
            other => Err(TrainingError::UnknownDataset(other.to_string())),
        }
    }

    /// Stages in ascending order.
    #[must_use]
    pub fn stages(self) -> &'static [Stage] {
        match self {
            Self::Movies => &MOVIES_STAGES,
            Self::Shopify => &SHOPIFY_STAGES,
        }
    }

    /// # Errors
    /// Returns [`TrainingError::UnknownStage`] when the dataset has no such stage.
    pub fn stage(self, number: u8) -> Result<Stage, TrainingError> {
        self.stages().iter().find(|stage| stage.number == number).copied().ok_or_else(|| {
            TrainingError::UnknownStage { dataset: self.as_str().to_string(), stage: number }
        })
    }

    /// The stage whose snapshot `number` starts from, [`EMPTY_STAGE`] for the first one.
    ///
    /// # Errors
    /// Returns [`TrainingError::UnknownStage`] when the dataset has no such stage.
    pub fn previous_stage(self, number: u8) -> Result<u8, TrainingError> {
        let stages = self.stages();
        let position = stages.iter().position(|stage| stage.number == number).ok_or_else(|| {
            TrainingError::UnknownStage { dataset: self.as_str().to_string(), stage: number }
        })?;
        Ok(if position == 0 { EMPTY_STAGE } else { stages[position - 1].number })
    }

    #[must_use]
    pub fn last_stage(self) -> u8 {
        self.stages().last().map_or(EMPTY_STAGE, |stage| stage.number)
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Stage {
    /// Two-digit label used in snapshot file names.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{:02}", self.number)
    }
}
