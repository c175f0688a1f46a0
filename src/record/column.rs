use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::CheeseRecord;

/// A column of the cheese directory file, in header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    CheeseId,
    CheeseNameEn,
    ManufacturerNameEn,
    ManufacturerProvCode,
    ManufacturingTypeEn,
    WebSiteEn,
    FatContentPercent,
    MoisturePercent,
    ParticularitiesEn,
    FlavourEn,
    CharacteristicsEn,
    RipeningEn,
    Organic,
    CategoryTypeEn,
    MilkTypeEn,
    MilkTreatmentTypeEn,
    RindTypeEn,
    LastUpdateDate,
}

impl Column {
    /// Every column, in the order the header row lists them.
    pub const ALL: [Column; 18] = [
        Column::CheeseId,
        Column::CheeseNameEn,
        Column::ManufacturerNameEn,
        Column::ManufacturerProvCode,
        Column::ManufacturingTypeEn,
        Column::WebSiteEn,
        Column::FatContentPercent,
        Column::MoisturePercent,
        Column::ParticularitiesEn,
        Column::FlavourEn,
        Column::CharacteristicsEn,
        Column::RipeningEn,
        Column::Organic,
        Column::CategoryTypeEn,
        Column::MilkTypeEn,
        Column::MilkTreatmentTypeEn,
        Column::RindTypeEn,
        Column::LastUpdateDate,
    ];

    /// The header row written at the top of every saved file.
    pub fn header() -> [&'static str; 18] {
        Self::ALL.map(Column::as_str)
    }

    /// Exact (case-sensitive) column name as it appears in the header.
    pub fn as_str(self) -> &'static str {
        match self {
            Column::CheeseId => "CheeseId",
            Column::CheeseNameEn => "CheeseNameEn",
            Column::ManufacturerNameEn => "ManufacturerNameEn",
            Column::ManufacturerProvCode => "ManufacturerProvCode",
            Column::ManufacturingTypeEn => "ManufacturingTypeEn",
            Column::WebSiteEn => "WebSiteEn",
            Column::FatContentPercent => "FatContentPercent",
            Column::MoisturePercent => "MoisturePercent",
            Column::ParticularitiesEn => "ParticularitiesEn",
            Column::FlavourEn => "FlavourEn",
            Column::CharacteristicsEn => "CharacteristicsEn",
            Column::RipeningEn => "RipeningEn",
            Column::Organic => "Organic",
            Column::CategoryTypeEn => "CategoryTypeEn",
            Column::MilkTypeEn => "MilkTypeEn",
            Column::MilkTreatmentTypeEn => "MilkTreatmentTypeEn",
            Column::RindTypeEn => "RindTypeEn",
            Column::LastUpdateDate => "LastUpdateDate",
        }
    }

    /// Orders two records by this column.
    ///
    /// The id compares as an integer. In the two percentage columns, values
    /// that parse as numbers come first and compare numerically; the rest
    /// follow and compare as text. Everything else compares as text.
    pub fn compare(self, a: &CheeseRecord, b: &CheeseRecord) -> Ordering {
        match self {
            Column::CheeseId => a.cheese_id.cmp(&b.cheese_id),
            Column::FatContentPercent | Column::MoisturePercent => {
                let (left, right) = (a.value(self), b.value(self));
                match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
                    (Ok(x), Ok(y)) => x.total_cmp(&y),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => left.cmp(&right),
                }
            }
            _ => a.value(self).cmp(&b.value(self)),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a name does not match any column exactly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown column: {0}")]
pub struct UnknownColumn(pub String);

impl FromStr for Column {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| UnknownColumn(s.to_string()))
    }
}

/// Direction of an explicit reorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub(crate) fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}
