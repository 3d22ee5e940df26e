//! In-memory implementations of the domain ports

use std::sync::{Arc, Mutex};

use cronslot_domain::{
    JobCatalog, JobOccurrences, JobSource, ScheduleSink, SynthesizedSchedule, TimeWindowSpec,
};
use cronslot_errors::{PlannerError, PlannerResult};

/// Mock implementation of JobSource for testing
#[derive(Debug, Clone, Default)]
pub struct MockJobSource {
    catalog: JobCatalog,
    fail_with: Option<String>,
}

impl MockJobSource {
    pub fn new(catalog: JobCatalog) -> Self {
        Self {
            catalog,
            fail_with: None,
        }
    }

    /// 每次加载都返回目录错误
    pub fn failing(message: &str) -> Self {
        Self {
            catalog: JobCatalog::default(),
            fail_with: Some(message.to_string()),
        }
    }
}

impl JobSource for MockJobSource {
    fn load_catalog(&self) -> PlannerResult<JobCatalog> {
        match &self.fail_with {
            Some(message) => Err(PlannerError::catalog_error(message.clone())),
            None => Ok(self.catalog.clone()),
        }
    }
}

/// Mock implementation of ScheduleSink that records everything written
#[derive(Debug, Clone, Default)]
pub struct MockScheduleSink {
    schedules: Arc<Mutex<Vec<SynthesizedSchedule>>>,
    lookups: Arc<Mutex<Vec<(TimeWindowSpec, Vec<JobOccurrences>)>>>,
    fits: Arc<Mutex<Vec<(String, Vec<JobOccurrences>)>>>,
}

impl MockScheduleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedules(&self) -> Vec<SynthesizedSchedule> {
        self.schedules.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> Vec<(TimeWindowSpec, Vec<JobOccurrences>)> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn fits(&self) -> Vec<(String, Vec<JobOccurrences>)> {
        self.fits.lock().unwrap().clone()
    }
}

impl ScheduleSink for MockScheduleSink {
    fn write_schedules(&self, schedules: &[SynthesizedSchedule]) -> PlannerResult<()> {
        self.schedules.lock().unwrap().extend_from_slice(schedules);
        Ok(())
    }

    fn write_lookup(&self, rows: &[JobOccurrences], window: &TimeWindowSpec) -> PlannerResult<()> {
        self.lookups.lock().unwrap().push((*window, rows.to_vec()));
        Ok(())
    }

    fn write_fit(&self, candidate: &str, rows: &[JobOccurrences]) -> PlannerResult<()> {
        self.fits
            .lock()
            .unwrap()
            .push((candidate.to_string(), rows.to_vec()));
        Ok(())
    }
}
