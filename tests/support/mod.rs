//! Shared fixtures: directory files on disk and sample records.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use cheese_directory::{CheeseId, CheeseRecord, Column};
use tempfile::TempDir;

pub const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A dataset file living in its own temporary directory.
pub struct Fixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl Fixture {
    /// An empty directory with no dataset file yet.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("canadianCheeseDirectory.csv");
        Self { dir, path }
    }

    /// A dataset file holding exactly `contents`.
    pub fn with_contents(contents: impl AsRef<[u8]>) -> Self {
        let fixture = Self::empty();
        fs::write(&fixture.path, contents).expect("write fixture");
        fixture
    }

    /// A well-formed dataset with the canonical header and `records`.
    pub fn with_records(records: &[CheeseRecord]) -> Self {
        Self::with_contents(directory_text(records))
    }

    pub fn read(&self) -> String {
        fs::read_to_string(&self.path).expect("read fixture")
    }
}

/// Canonical header row.
pub fn header_line() -> String {
    Column::header().join(",")
}

/// Render records the way the directory file lays them out. Values must not
/// need quoting.
pub fn directory_text(records: &[CheeseRecord]) -> String {
    layout_text(&Column::header(), records)
}

/// Render records under an arbitrary header. Names that are not a column get
/// the value `extra`.
pub fn layout_text(columns: &[&str], records: &[CheeseRecord]) -> String {
    let mut text = columns.join(",");
    text.push_str("\r\n");
    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|name| match name.parse::<Column>() {
                Ok(column) => record.value(column).into_owned(),
                Err(_) => "extra".to_string(),
            })
            .collect();
        text.push_str(&row.join(","));
        text.push_str("\r\n");
    }
    text
}

/// A fully populated record.
pub fn cheese(id: CheeseId, name: &str) -> CheeseRecord {
    CheeseRecord {
        cheese_id: id,
        cheese_name_en: name.into(),
        manufacturer_name_en: "Fromagerie du Presbytère".into(),
        manufacturer_prov_code: "QC".into(),
        manufacturing_type_en: "Farmstead".into(),
        web_site_en: "http://www.fromageriedupresbytere.com".into(),
        fat_content_percent: "27".into(),
        moisture_percent: "40".into(),
        particularities_en: "".into(),
        flavour_en: "Mild".into(),
        characteristics_en: "Creamy".into(),
        ripening_en: "2 Months".into(),
        organic: "0".into(),
        category_type_en: "Firm Cheese".into(),
        milk_type_en: "Cow".into(),
        milk_treatment_type_en: "Thermised".into(),
        rind_type_en: "Washed Rind".into(),
        last_update_date: "2016-02-03".into(),
    }
}

/// Records 1, 2 and 3, in that order.
pub fn three_cheeses() -> Vec<CheeseRecord> {
    vec![
        cheese(1, "Sieur de Duplessis"),
        cheese(2, "Le Cendrillon"),
        cheese(3, "Bleu d'Élizabeth"),
    ]
}

pub fn ids(records: &[CheeseRecord]) -> Vec<CheeseId> {
    records.iter().map(|r| r.cheese_id).collect()
}
