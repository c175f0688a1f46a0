//! Records - The cheese directory entity and its column vocabulary.
//!
//! Every field originates as text in the delimited file. Only the identity
//! (`CheeseId`) is converted; the descriptive attributes are stored and
//! round-tripped verbatim.
//!
//! ## Example
//!
//! ```
//! use cheese_directory::{CheeseRecord, Column};
//!
//! let record = CheeseRecord {
//!     cheese_id: 228,
//!     cheese_name_en: "Sieur de Duplessis".into(),
//!     ..Default::default()
//! };
//!
//! assert_eq!(record.value(Column::CheeseId), "228");
//! assert_eq!(record.value(Column::CheeseNameEn), "Sieur de Duplessis");
//! ```

mod column;

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use column::{Column, SortOrder, UnknownColumn};

/// Unique business key of a [`CheeseRecord`].
pub type CheeseId = i64;

/// One row of the cheese directory.
///
/// Field order matches the header row written by the store, and each field
/// maps to its column by name (`cheese_name_en` is `CheeseNameEn` on disk).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CheeseRecord {
    pub cheese_id: CheeseId,
    pub cheese_name_en: String,
    pub manufacturer_name_en: String,
    pub manufacturer_prov_code: String,
    pub manufacturing_type_en: String,
    pub web_site_en: String,
    pub fat_content_percent: String,
    pub moisture_percent: String,
    pub particularities_en: String,
    pub flavour_en: String,
    pub characteristics_en: String,
    pub ripening_en: String,
    pub organic: String,
    pub category_type_en: String,
    pub milk_type_en: String,
    pub milk_treatment_type_en: String,
    pub rind_type_en: String,
    pub last_update_date: String,
}

impl CheeseRecord {
    /// Create a record with only its identity set.
    pub fn new(cheese_id: CheeseId) -> Self {
        Self {
            cheese_id,
            ..Self::default()
        }
    }

    /// Returns the identity of this record.
    pub fn id(&self) -> CheeseId {
        self.cheese_id
    }

    /// Text view of a single column.
    pub fn value(&self, column: Column) -> Cow<'_, str> {
        let text = match column {
            Column::CheeseId => return Cow::Owned(self.cheese_id.to_string()),
            Column::CheeseNameEn => &self.cheese_name_en,
            Column::ManufacturerNameEn => &self.manufacturer_name_en,
            Column::ManufacturerProvCode => &self.manufacturer_prov_code,
            Column::ManufacturingTypeEn => &self.manufacturing_type_en,
            Column::WebSiteEn => &self.web_site_en,
            Column::FatContentPercent => &self.fat_content_percent,
            Column::MoisturePercent => &self.moisture_percent,
            Column::ParticularitiesEn => &self.particularities_en,
            Column::FlavourEn => &self.flavour_en,
            Column::CharacteristicsEn => &self.characteristics_en,
            Column::RipeningEn => &self.ripening_en,
            Column::Organic => &self.organic,
            Column::CategoryTypeEn => &self.category_type_en,
            Column::MilkTypeEn => &self.milk_type_en,
            Column::MilkTreatmentTypeEn => &self.milk_treatment_type_en,
            Column::RindTypeEn => &self.rind_type_en,
            Column::LastUpdateDate => &self.last_update_date,
        };
        Cow::Borrowed(text.as_str())
    }
}

impl fmt::Display for CheeseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Name: {}, Manufacturer: {} ({}), Category: {}, Milk: {}",
            self.cheese_id,
            self.cheese_name_en,
            self.manufacturer_name_en,
            self.manufacturer_prov_code,
            self.category_type_en,
            self.milk_type_en
        )
    }
}
