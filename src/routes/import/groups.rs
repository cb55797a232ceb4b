use self::schema::*;
use crate::AppState;
use crate::routes::schema::ResponseError;
use crate::utility::hasher::upload_hash;
use actix_web::{post, web};
use chrono::Local;

#[utoipa::path(
    request_body(
        content = Vec<u8>,
        content_type = "application/octet-stream",
        description = "Spreadsheet file"
    ),
    responses(
        (status = OK, body = Response),
        (
            status = BAD_REQUEST,
            body = ResponseError<ErrorCode>,
            example = json!({
                "code": "BAD_SPREADSHEET",
                "message": "Failed to read spreadsheet file."
            })
        ),
    )
)]
#[post("/groups")]
pub async fn groups(body: web::Bytes, app_state: web::Data<AppState>) -> ServiceResponse {
    let layout = &app_state.get_env().layout.sheet;

    match schedule_parser::list_groups_with(&body, layout, Local::now().date_naive()) {
        Ok(skeleton) => Ok(Response {
            groups: skeleton
                .groups
                .mappings
                .into_iter()
                .map(|mapping| GroupEntry {
                    name: mapping.name,
                    column: mapping.column,
                })
                .collect(),
            conflicts: skeleton.groups.conflicts,
            metadata: skeleton.metadata,
            hash: upload_hash(&body),
        }),
        Err(error) => {
            log::info!("Rejected upload of {} bytes: {}", body.len(), error);

            Err(ErrorCode::from(&error))
        }
    }
    .into()
}

mod schema {
    use actix_macros::{ErrResponse, OkResponse};
    use derive_more::Display;
    use schedule_parser::schema::{GroupConflict, ImportError, SheetMetadata};
    use serde::Serialize;
    use utoipa::ToSchema;

    pub type ServiceResponse = crate::routes::schema::Response<Response, ErrorCode>;

    #[derive(Serialize, ToSchema)]
    #[schema(as = ImportGroups::GroupEntry)]
    pub struct GroupEntry {
        /// Group name.
        #[schema(examples("ИСПк-104-52-00"))]
        pub name: String,

        /// Subject column of the group block.
        pub column: u32,
    }

    #[derive(Serialize, ToSchema, OkResponse)]
    #[schema(as = ImportGroups::Response)]
    pub struct Response {
        /// Groups in header order.
        pub groups: Vec<GroupEntry>,

        /// Names listed above more than one block.
        pub conflicts: Vec<GroupConflict>,

        pub metadata: SheetMetadata,

        /// SHA-1 of the uploaded file.
        #[schema(examples("da39a3ee5e6b4b0d3255bfef95601890afd80709"))]
        pub hash: String,
    }

    #[derive(Clone, Serialize, Display, ToSchema, ErrResponse)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    #[status_code = "actix_web::http::StatusCode::BAD_REQUEST"]
    #[schema(as = ImportGroups::ErrorCode)]
    pub enum ErrorCode {
        /// The file is not a spreadsheet.
        #[display("Failed to read spreadsheet file.")]
        BadSpreadsheet,

        /// The workbook has no sheets.
        #[display("No work sheets found.")]
        NoWorkSheets,

        /// The first sheet has no cells.
        #[display("There is no data on work sheet boundaries.")]
        EmptyWorkSheet,
    }

    impl From<&ImportError> for ErrorCode {
        fn from(error: &ImportError) -> Self {
            match error {
                ImportError::NoWorkSheets => ErrorCode::NoWorkSheets,
                ImportError::UnknownWorkSheetRange => ErrorCode::EmptyWorkSheet,
                _ => ErrorCode::BadSpreadsheet,
            }
        }
    }
}
