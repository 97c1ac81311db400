use chrono::NaiveDate;
use tracing::debug;

use crate::config::PortalConfig;
use crate::error::Result;
use crate::models::{District, LoadReport, TemporalTable};
use crate::readers::DistrictReader;

/// Records matching `date`, in the order they appear in `table`
pub fn filter_by_date(table: &TemporalTable, date: NaiveDate) -> TemporalTable {
    table.filter_by_date(date)
}

/// A district's table together with how it was parsed
#[derive(Debug, Clone)]
pub struct LoadedDistrict {
    pub table: TemporalTable,
    pub report: LoadReport,
}

/// The result of one district + date selection
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub district: District,
    pub date: NaiveDate,
    pub records: TemporalTable,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Per-session access to district tables.
///
/// Holds at most one loaded district; selecting a different district replaces
/// it. Stores share nothing, so each session gets its own.
pub struct TemporalRecordStore {
    config: PortalConfig,
    reader: DistrictReader,
    cached: Option<LoadedDistrict>,
    loads: usize,
}

impl TemporalRecordStore {
    pub fn new(config: PortalConfig) -> Self {
        Self {
            config,
            reader: DistrictReader::new(),
            cached: None,
            loads: 0,
        }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Read a district's backing file without touching the cache
    pub fn load(&self, district: District) -> Result<LoadedDistrict> {
        let path = self.config.district_path(district);
        debug!(%district, path = %path.display(), "Loading district table");

        let (table, report) = self.reader.read_district(&path, district)?;
        Ok(LoadedDistrict { table, report })
    }

    /// Cached table for `district`, loading it if the district changed
    pub fn table_for(&mut self, district: District) -> Result<&LoadedDistrict> {
        // A failed load leaves the cache empty rather than holding the previous district
        let loaded = match self.cached.take() {
            Some(loaded) if loaded.table.district() == district => {
                debug!(%district, "District table served from cache");
                loaded
            }
            _ => {
                let loaded = self.load(district)?;
                self.loads += 1;
                loaded
            }
        };

        Ok(&*self.cached.insert(loaded))
    }

    /// Load (or reuse) the district and keep the rows for `date`
    pub fn select(&mut self, district: District, date: NaiveDate) -> Result<Selection> {
        let loaded = self.table_for(district)?;
        Ok(Selection {
            district,
            date,
            records: filter_by_date(&loaded.table, date),
        })
    }

    /// Like [`select`](Self::select), rejecting dates outside `[min_date, today]` first
    pub fn query(&mut self, district: District, date: NaiveDate, today: NaiveDate) -> Result<Selection> {
        self.config.validate_date(date, today)?;
        self.select(district, date)
    }

    pub fn cached_district(&self) -> Option<District> {
        self.cached.as_ref().map(|loaded| loaded.table.district())
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Number of file reads performed by this store
    pub fn load_count(&self) -> usize {
        self.loads
    }
}
