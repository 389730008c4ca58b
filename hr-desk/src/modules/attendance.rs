//! Attendance: time entries and daily status reports
//!
//! Employees record their own entries; workforce viewers see everyone's.

use super::{Access, Action, FeatureModule, Governed, ModulePolicy};
use crate::auth::Capability;
use crate::db::{Record, keys};
use crate::utils::validation::{
    MAX_NOTE_LEN, validate_id, validate_optional_text, validate_required_text,
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    DailyStatus, DailyStatusCreate, DailyStatusUpdate, TimeEntry, TimeEntryCreate,
    TimeEntryUpdate,
};
use shared::util::now_millis;

const OWN_OR_WORKFORCE: Access = Access::OwnerOr(Capability::ViewWorkforce);

// ========== Time entries ==========

impl Record for TimeEntry {
    const STORAGE_KEY: &'static str = keys::TIME_ENTRIES;
    const RESOURCE: &'static str = "Time entry";

    fn id(&self) -> i64 {
        self.id
    }

    fn subject_id(&self) -> Option<i64> {
        Some(self.employee_id)
    }
}

/// Worked hours between two clock times, two decimals
///
/// `None` when either side is missing; clock-out before clock-in is an error.
pub fn worked_hours(
    clock_in: NaiveTime,
    clock_out: Option<NaiveTime>,
) -> AppResult<Option<Decimal>> {
    let Some(clock_out) = clock_out else {
        return Ok(None);
    };
    if clock_out < clock_in {
        return Err(AppError::invalid_field(
            "clock_out",
            "clock_out must not be before clock_in",
        ));
    }
    let minutes = (clock_out - clock_in).num_minutes();
    Ok(Some((Decimal::from(minutes) / Decimal::from(60)).round_dp(2)))
}

trait TimeEntryRules {
    fn recompute(&mut self) -> AppResult<()>;
}

impl TimeEntryRules for TimeEntry {
    fn recompute(&mut self) -> AppResult<()> {
        validate_id(self.employee_id, "employee_id")?;
        validate_optional_text(&self.note, "note", MAX_NOTE_LEN)?;
        self.hours = worked_hours(self.clock_in, self.clock_out)?;
        Ok(())
    }
}

impl Governed for TimeEntry {
    type Create = TimeEntryCreate;
    type Update = TimeEntryUpdate;

    const POLICY: ModulePolicy = ModulePolicy {
        name: "time_entries",
        view: OWN_OR_WORKFORCE,
        create: OWN_OR_WORKFORCE,
        edit: OWN_OR_WORKFORCE,
        delete: OWN_OR_WORKFORCE,
    };

    fn build(id: i64, now: i64, input: TimeEntryCreate) -> AppResult<Self> {
        let mut entry = TimeEntry {
            id,
            employee_id: input.employee_id,
            date: input.date,
            clock_in: input.clock_in,
            clock_out: input.clock_out,
            hours: None,
            note: input.note,
            created_at: now,
            updated_at: now,
        };
        entry.recompute()?;
        Ok(entry)
    }

    fn apply(&mut self, patch: TimeEntryUpdate, now: i64) -> AppResult<()> {
        let mut next = self.clone();
        if let Some(date) = patch.date {
            next.date = date;
        }
        if let Some(clock_in) = patch.clock_in {
            next.clock_in = clock_in;
        }
        if patch.clock_out.is_some() {
            next.clock_out = patch.clock_out;
        }
        if patch.note.is_some() {
            next.note = patch.note;
        }
        next.recompute()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

impl FeatureModule<TimeEntry> {
    /// Close an open entry
    pub fn clock_out(&self, id: i64, at: NaiveTime) -> AppResult<TimeEntry> {
        let result = self.try_mutate(id, TimeEntry::POLICY.edit, Action::Edit, |entry, _| {
            entry.apply(
                TimeEntryUpdate {
                    clock_out: Some(at),
                    ..Default::default()
                },
                now_millis(),
            )
        });
        self.report(Action::Edit, result)
    }

    /// Total visible hours of one employee between two dates (inclusive)
    pub fn hours_between(
        &self,
        employee_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Decimal> {
        self.list()?
            .iter()
            .filter(|e| e.employee_id == employee_id && e.date >= from && e.date <= to)
            .filter_map(|e| e.hours)
            .try_fold(Decimal::ZERO, |total, hours| total.checked_add(hours))
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::ValueOutOfRange, "total hours out of range")
                    .with_detail("employee_id", employee_id)
            })
    }
}

// ========== Daily status ==========

impl Record for DailyStatus {
    const STORAGE_KEY: &'static str = keys::DAILY_STATUS;
    const RESOURCE: &'static str = "Daily status";

    fn id(&self) -> i64 {
        self.id
    }

    fn subject_id(&self) -> Option<i64> {
        Some(self.employee_id)
    }
}

trait DailyStatusRules {
    fn validate(&self) -> AppResult<()>;
}

impl DailyStatusRules for DailyStatus {
    fn validate(&self) -> AppResult<()> {
        validate_id(self.employee_id, "employee_id")?;
        validate_required_text(&self.summary, "summary", MAX_NOTE_LEN)?;
        validate_optional_text(&self.blockers, "blockers", MAX_NOTE_LEN)
    }
}

impl Governed for DailyStatus {
    type Create = DailyStatusCreate;
    type Update = DailyStatusUpdate;

    const POLICY: ModulePolicy = ModulePolicy {
        name: "daily_status",
        view: OWN_OR_WORKFORCE,
        create: OWN_OR_WORKFORCE,
        edit: OWN_OR_WORKFORCE,
        delete: OWN_OR_WORKFORCE,
    };

    fn build(id: i64, now: i64, input: DailyStatusCreate) -> AppResult<Self> {
        let status = DailyStatus {
            id,
            employee_id: input.employee_id,
            date: input.date,
            summary: input.summary.trim().to_string(),
            blockers: input.blockers,
            created_at: now,
            updated_at: now,
        };
        status.validate()?;
        Ok(status)
    }

    fn apply(&mut self, patch: DailyStatusUpdate, now: i64) -> AppResult<()> {
        let mut next = self.clone();
        if let Some(summary) = patch.summary {
            next.summary = summary.trim().to_string();
        }
        if patch.blockers.is_some() {
            next.blockers = patch.blockers;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

impl FeatureModule<DailyStatus> {
    /// Visible reports for one day
    pub fn reports_on(&self, date: NaiveDate) -> AppResult<Vec<DailyStatus>> {
        Ok(self.list()?.into_iter().filter(|s| s.date == date).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::test_support::Fixture;
    use shared::error::ErrorCode;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    fn entry(employee_id: i64) -> TimeEntryCreate {
        TimeEntryCreate {
            employee_id,
            date: day(),
            clock_in: time(9, 0),
            clock_out: None,
            note: None,
        }
    }

    #[test]
    fn test_worked_hours() {
        assert_eq!(worked_hours(time(9, 0), None).unwrap(), None);
        assert_eq!(
            worked_hours(time(9, 0), Some(time(17, 30))).unwrap(),
            Some(Decimal::new(85, 1))
        );
        assert_eq!(
            worked_hours(time(9, 0), Some(time(9, 20))).unwrap(),
            Some(Decimal::new(33, 2))
        );
        let err = worked_hours(time(9, 0), Some(time(8, 0))).unwrap_err();
        assert_eq!(err.detail("field").unwrap(), "clock_out");
    }

    #[test]
    fn test_employee_clocks_own_time() {
        let fx = Fixture::new();
        let entries = fx.module::<TimeEntry>();
        fx.login(&fx.employee);

        let open = entries.create(entry(fx.employee.id)).unwrap();
        assert_eq!(open.hours, None);

        let closed = entries.clock_out(open.id, time(17, 0)).unwrap();
        assert_eq!(closed.hours, Some(Decimal::new(8, 0)));
        assert_eq!(
            entries.hours_between(fx.employee.id, day(), day()).unwrap(),
            Decimal::new(8, 0)
        );

        // not on behalf of a colleague
        let err = entries.create(entry(fx.other_employee.id)).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_manager_sees_all_entries() {
        let fx = Fixture::new();
        let entries = fx.module::<TimeEntry>();
        fx.login(&fx.employee);
        entries.create(entry(fx.employee.id)).unwrap();
        fx.login(&fx.other_employee);
        let theirs = entries.create(entry(fx.other_employee.id)).unwrap();
        assert_eq!(entries.list().unwrap().len(), 1);

        fx.login(&fx.manager);
        assert_eq!(entries.enter().records.len(), 2);
        entries.remove(theirs.id).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_clock_out_before_clock_in_rejected() {
        let fx = Fixture::new();
        let entries = fx.module::<TimeEntry>();
        fx.login(&fx.employee);
        let open = entries.create(entry(fx.employee.id)).unwrap();

        let err = entries.clock_out(open.id, time(8, 0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(entries.get(open.id).unwrap().clock_out, None);
    }

    #[test]
    fn test_daily_status() {
        let fx = Fixture::new();
        let reports = fx.module::<DailyStatus>();
        fx.login(&fx.employee);

        let report = reports
            .create(DailyStatusCreate {
                employee_id: fx.employee.id,
                date: day(),
                summary: "Closed two tickets".into(),
                blockers: None,
            })
            .unwrap();
        let updated = reports
            .update(report.id, DailyStatusUpdate {
                blockers: Some("Waiting on VPN access".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(updated.blockers.is_some());

        let err = reports
            .update(report.id, DailyStatusUpdate {
                summary: Some("  ".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.detail("field").unwrap(), "summary");

        fx.login(&fx.other_employee);
        assert!(reports.reports_on(day()).unwrap().is_empty());
        fx.login(&fx.hr);
        assert_eq!(reports.reports_on(day()).unwrap().len(), 1);
    }
}
