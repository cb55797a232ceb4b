use self::schema::*;
use crate::AppState;
use crate::utility::hasher::upload_hash;
use actix_web::{post, web};
use chrono::Local;
use schedule_parser::schema::ImportResult;

#[utoipa::path(
    params(Request),
    request_body(
        content = Vec<u8>,
        content_type = "application/octet-stream",
        description = "Spreadsheet file"
    ),
    responses(
        (status = OK, body = Response),
        (
            status = BAD_REQUEST,
            description = "Not a readable spreadsheet, or a blank group name (EMPTY_GROUP_NAME)",
            body = Response
        ),
        (status = NOT_FOUND, description = "Group is absent from the sheet", body = Response),
        (status = UNPROCESSABLE_ENTITY, description = "No lessons for the group", body = Response),
    )
)]
#[post("/schedule")]
pub async fn schedule(
    query: web::Query<Request>,
    body: web::Bytes,
    app_state: web::Data<AppState>,
) -> ServiceResponse {
    let group = query.group.trim();

    if group.is_empty() {
        return Err(ErrorCode::EmptyGroupName).into();
    }

    let layout = &app_state.get_env().layout.sheet;
    let today = Local::now().date_naive();

    let (outcome, groups) = match schedule_parser::open_worksheet(&body) {
        Ok(worksheet) => {
            let skeleton = schedule_parser::parse_skeleton(&worksheet, layout, today);
            let outcome = schedule_parser::parse_group(&worksheet, &skeleton, group, layout);

            (outcome, skeleton.groups.names())
        }
        Err(error) => (Err(error), Vec::new()),
    };

    let status = match &outcome {
        Ok(entries) => {
            log::info!("Imported {} lessons for group '{}'.", entries.len(), group);

            ImportStatus::Imported
        }
        Err(error) => {
            log::info!("Import for group '{}' failed: {}", group, error);

            ImportStatus::from(error)
        }
    };

    Ok(Response {
        result: ImportResult::from_outcome(outcome, groups),
        hash: upload_hash(&body),
        status,
    })
    .into()
}

mod schema {
    use crate::routes::schema::PartialOkResponse;
    use actix_macros::ErrResponse;
    use actix_web::body::EitherBody;
    use actix_web::http::StatusCode;
    use actix_web::{HttpRequest, HttpResponse};
    use derive_more::Display;
    use schedule_parser::schema::{ImportError, ImportResult};
    use serde::{Deserialize, Serialize};
    use utoipa::{IntoParams, ToSchema};

    pub type ServiceResponse = crate::routes::schema::Response<Response, ErrorCode>;

    #[derive(Deserialize, IntoParams)]
    #[into_params(parameter_in = Query)]
    pub struct Request {
        /// Group name as written in the header row.
        #[param(example = "ИСПк-104-52-00")]
        pub group: String,
    }

    /// How the import ended; decides the status of the response.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub enum ImportStatus {
        Imported,
        Unreadable,
        GroupNotFound,
        NoEntries,
    }

    impl From<&ImportError> for ImportStatus {
        fn from(error: &ImportError) -> Self {
            match error {
                ImportError::BadSpreadsheet(_)
                | ImportError::NoWorkSheets
                | ImportError::UnknownWorkSheetRange => ImportStatus::Unreadable,
                ImportError::GroupNotFound { .. } => ImportStatus::GroupNotFound,
                ImportError::NoEntries { .. } => ImportStatus::NoEntries,
            }
        }
    }

    impl ImportStatus {
        pub fn status_code(self) -> StatusCode {
            match self {
                ImportStatus::Imported => StatusCode::OK,
                ImportStatus::Unreadable => StatusCode::BAD_REQUEST,
                ImportStatus::GroupNotFound => StatusCode::NOT_FOUND,
                ImportStatus::NoEntries => StatusCode::UNPROCESSABLE_ENTITY,
            }
        }
    }

    #[derive(Serialize, ToSchema)]
    #[schema(as = ImportSchedule::Response)]
    pub struct Response {
        #[serde(flatten)]
        pub result: ImportResult,

        /// SHA-1 of the uploaded file.
        pub hash: String,

        #[serde(skip)]
        pub status: ImportStatus,
    }

    impl PartialOkResponse for Response {
        fn post_process(
            &mut self,
            _request: &HttpRequest,
            response: &mut HttpResponse<EitherBody<String>>,
        ) {
            *response.status_mut() = self.status.status_code();
        }
    }

    #[derive(Clone, Serialize, Display, ToSchema, ErrResponse)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    #[schema(as = ImportSchedule::ErrorCode)]
    pub enum ErrorCode {
        /// The group query parameter is blank.
        #[status_code = "actix_web::http::StatusCode::BAD_REQUEST"]
        #[display("Group name is required.")]
        EmptyGroupName,
    }
}
