use crate::domain::models::EnergyReportRecord;

/// Query-parameter pair for the meter-wise endpoint. Blank or
/// whitespace-only input counts as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    meter_no: Option<String>,
    machine_name: Option<String>,
}

impl ReportFilter {
    pub fn new(meter_no: Option<String>, machine_name: Option<String>) -> Self {
        Self {
            meter_no: normalize(meter_no),
            machine_name: normalize(machine_name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.meter_no.is_none() && self.machine_name.is_none()
    }

    /// The supplied meter number, if it parses as an integer. Non-numeric
    /// input stays a live filter that matches no row on the meter criterion.
    pub fn requested_meter_no(&self) -> Option<i64> {
        self.meter_no.as_deref().and_then(|raw| raw.parse().ok())
    }

    pub fn has_meter_no(&self) -> bool {
        self.meter_no.is_some()
    }

    pub fn machine_name(&self) -> Option<&str> {
        self.machine_name.as_deref()
    }

    fn matches(&self, row: &EnergyReportRecord) -> bool {
        let meter_match = match (self.requested_meter_no(), row.meter_no) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => false,
        };

        let machine_match = match (self.machine_name(), row.machine_name.as_deref()) {
            (Some(wanted), Some(actual)) => {
                actual.to_lowercase().contains(&wanted.to_lowercase())
            }
            _ => false,
        };

        // OR, not AND: a row matching either criterion is kept
        meter_match || machine_match
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn filter_reports(
    rows: Vec<EnergyReportRecord>,
    filter: &ReportFilter,
) -> Vec<EnergyReportRecord> {
    rows.into_iter().filter(|row| filter.matches(row)).collect()
}

#[derive(Debug, Clone, PartialEq)]
enum GroupKey {
    Meter(i64),
    Machine(String),
    Unknown,
}

impl GroupKey {
    fn for_row(row: &EnergyReportRecord) -> Self {
        match (row.meter_no, row.machine_name.as_deref()) {
            (Some(meter), _) => Self::Meter(meter),
            (None, Some(machine)) => Self::Machine(machine.to_string()),
            (None, None) => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MachineGroup {
    pub meter_no: Option<i64>,
    pub machine_name: Option<String>,
    pub rows: Vec<EnergyReportRecord>,
}

/// Partitions rows by meter number, else machine name, else an "Unknown"
/// bucket. Groups appear in first-encountered-key order and keep the row
/// order they were fed in.
pub fn group_reports(rows: Vec<EnergyReportRecord>) -> Vec<MachineGroup> {
    let mut groups: Vec<(GroupKey, MachineGroup)> = Vec::new();

    for row in rows {
        let key = GroupKey::for_row(&row);
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, group)) => group.rows.push(row),
            None => {
                let group = MachineGroup {
                    meter_no: row.meter_no,
                    machine_name: row.machine_name.clone(),
                    rows: vec![row],
                };
                groups.push((key, group));
            }
        }
    }

    groups.into_iter().map(|(_, group)| group).collect()
}
