#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user_id: i64,
    pub user_name: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUserRecord {
    pub user_name: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnergyReportRecord {
    pub id: i64,
    pub meter_no: Option<i64>,
    pub machine_name: Option<String>,
    pub reading_date: String,
    pub energy_kwh: f64,
    pub power_kw: f64,
    pub power_factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEnergyReportRecord {
    pub meter_no: Option<i64>,
    pub machine_name: Option<String>,
    pub reading_date: String,
    pub energy_kwh: f64,
    pub power_kw: f64,
    pub power_factor: Option<f64>,
}
