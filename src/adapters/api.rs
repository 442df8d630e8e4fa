use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::adapters::session::{
    AuthenticatedUser, SessionSettings, build_session_cookie, clear_session_cookie, probe_session,
};
use crate::app::services::{
    CredentialQueryHandler, ReportQueryHandler, ServiceError, SqliteEmsService,
};
use crate::domain::meter_view::{ReportFilter, filter_reports, group_reports};
use crate::domain::models::{EnergyReportRecord, UserRecord};
use crate::domain::session_token::{SessionClaims, TOKEN_TTL, issue_token};

#[derive(Clone)]
pub struct ApiState {
    pub store: SqliteEmsService,
    pub session: SessionSettings,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UserView {
    pub user_id: i64,
    pub user_name: String,
    pub role: String,
}

impl From<&UserRecord> for UserView {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.user_name.clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct EnergyReportView {
    pub id: i64,
    pub meter_no: Option<i64>,
    pub machine_name: Option<String>,
    pub reading_date: String,
    pub energy_kwh: f64,
    pub power_kw: f64,
    pub power_factor: Option<f64>,
}

impl From<EnergyReportRecord> for EnergyReportView {
    fn from(record: EnergyReportRecord) -> Self {
        Self {
            id: record.id,
            meter_no: record.meter_no,
            machine_name: record.machine_name,
            reading_date: record.reading_date,
            energy_kwh: record.energy_kwh,
            power_kw: record.power_kw,
            power_factor: record.power_factor,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct CheckAuthResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionClaims>,
}

#[derive(Debug, Serialize)]
pub struct DashboardDataResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<EnergyReportView>,
}

#[derive(Debug, Deserialize)]
pub struct MeterWiseQuery {
    pub meter_no: Option<String>,
    pub machine_name: Option<String>,
}

/// Filter-shaped payload; also the per-group entry shape in group mode.
/// Field casing follows the wire contract (`Success` / `machineName`).
#[derive(Debug, Serialize)]
pub struct MeterGroupResponse {
    #[serde(rename = "Success")]
    pub success: bool,
    pub meter_no: Option<i64>,
    #[serde(rename = "machineName")]
    pub machine_name: Option<String>,
    pub length: usize,
    pub data: Vec<EnergyReportView>,
}

#[derive(Debug, Serialize)]
pub struct GroupedMachinesResponse {
    #[serde(rename = "Success")]
    pub success: bool,
    pub machines: Vec<MeterGroupResponse>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MeterWiseResponse {
    Filtered(MeterGroupResponse),
    Grouped(GroupedMachinesResponse),
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(ping)
        .service(check_auth)
        .service(login)
        .service(logout)
        .service(dashboard_data)
        .service(data_meter_wise);
}

#[get("/ping")]
async fn ping(state: web::Data<ApiState>) -> impl Responder {
    match state.store.liveness_check() {
        Ok(value) => HttpResponse::Ok().json(serde_json::json!({ "ok": [{ "ok": value }] })),
        Err(error) => HttpResponse::InternalServerError()
            .json(serde_json::json!({ "error": error.to_string() })),
    }
}

#[get("/api/check-auth")]
async fn check_auth(req: HttpRequest, state: web::Data<ApiState>) -> impl Responder {
    // probe only: absence and verification failure both answer 200
    let response = match probe_session(&req, &state.session) {
        Some(claims) => CheckAuthResponse {
            authenticated: true,
            user: Some(claims),
        },
        None => CheckAuthResponse {
            authenticated: false,
            user: None,
        },
    };

    HttpResponse::Ok().json(response)
}

#[post("/api/login")]
async fn login(state: web::Data<ApiState>, body: web::Json<LoginRequest>) -> impl Responder {
    let (Some(user_name), Some(password)) = (
        body.user_name.as_deref().filter(|value| !value.is_empty()),
        body.password.as_deref().filter(|value| !value.is_empty()),
    ) else {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "message": "All fields are required!" }));
    };

    let user = match state.store.find_user_by_credentials(user_name, password) {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized()
                .json(serde_json::json!({ "message": "Invalid credentials" }));
        }
        Err(error) => {
            tracing::error!(error = %error, "credential lookup failed");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "message": error.to_string() }));
        }
    };

    let token = match issue_token(&user, &state.session.jwt_secret, TOKEN_TTL, Utc::now()) {
        Ok(token) => token,
        Err(error) => {
            tracing::error!(error = %error, "session token issuance failed");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "message": error.to_string() }));
        }
    };

    tracing::info!(user_id = user.user_id, user_name = %user.user_name, "login succeeded");

    HttpResponse::Ok()
        .cookie(build_session_cookie(&state.session, token))
        .json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            user: UserView::from(&user),
        })
}

#[post("/api/logout")]
async fn logout(state: web::Data<ApiState>) -> impl Responder {
    HttpResponse::Ok()
        .cookie(clear_session_cookie(&state.session))
        .json(serde_json::json!({ "success": true, "message": "Logged out successfully" }))
}

#[get("/api/ems-dashboard/data")]
async fn dashboard_data(_user: AuthenticatedUser, state: web::Data<ApiState>) -> impl Responder {
    match state.store.list_reports_oldest_first() {
        Ok(rows) => {
            let data: Vec<EnergyReportView> =
                rows.into_iter().map(EnergyReportView::from).collect();
            HttpResponse::Ok().json(DashboardDataResponse {
                success: true,
                count: data.len(),
                data,
            })
        }
        Err(error) => {
            tracing::error!(error = %error, "dashboard query failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "message": "Database query error",
                "error": error.to_string(),
            }))
        }
    }
}

#[get("/api/get-data-meter-wise")]
async fn data_meter_wise(
    state: web::Data<ApiState>,
    query: web::Query<MeterWiseQuery>,
) -> impl Responder {
    let rows = match state.store.list_reports_newest_first() {
        Ok(rows) => rows,
        Err(error) => {
            tracing::error!(error = %error, "meter-wise query failed");
            return meter_wise_error_response(error);
        }
    };

    let query = query.into_inner();
    let filter = ReportFilter::new(query.meter_no, query.machine_name);

    let response = if filter.is_empty() {
        MeterWiseResponse::Grouped(grouped_response(rows))
    } else {
        MeterWiseResponse::Filtered(filtered_response(rows, &filter))
    };

    HttpResponse::Ok().json(response)
}

fn filtered_response(rows: Vec<EnergyReportRecord>, filter: &ReportFilter) -> MeterGroupResponse {
    let kept = filter_reports(rows, filter);

    let meter_no = if filter.has_meter_no() {
        // unparseable input echoes as null
        filter.requested_meter_no()
    } else {
        kept.first().and_then(|row| row.meter_no)
    };

    let machine_name = kept
        .first()
        .and_then(|row| row.machine_name.clone())
        .or_else(|| filter.machine_name().map(ToString::to_string));

    let data: Vec<EnergyReportView> = kept.into_iter().map(EnergyReportView::from).collect();

    MeterGroupResponse {
        success: true,
        meter_no,
        machine_name,
        length: data.len(),
        data,
    }
}

fn grouped_response(rows: Vec<EnergyReportRecord>) -> GroupedMachinesResponse {
    let machines = group_reports(rows)
        .into_iter()
        .map(|group| {
            let machine_name = group
                .machine_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string());
            let data: Vec<EnergyReportView> =
                group.rows.into_iter().map(EnergyReportView::from).collect();

            MeterGroupResponse {
                success: true,
                meter_no: group.meter_no,
                machine_name: Some(machine_name),
                length: data.len(),
                data,
            }
        })
        .collect();

    GroupedMachinesResponse {
        success: true,
        machines,
    }
}

fn meter_wise_error_response(error: ServiceError) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({
        "Success": false,
        "message": "Database query error",
        "error": error.to_string(),
    }))
}
