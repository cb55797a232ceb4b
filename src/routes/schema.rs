use actix_web::body::EitherBody;
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::{Serialize, Serializer};
use std::convert::Into;
use std::fmt::Display;
use utoipa::PartialSchema;

pub struct Response<T, E>(pub Result<T, E>)
where
    T: Serialize + PartialSchema + PartialOkResponse,
    E: Serialize + PartialSchema + Display + PartialErrResponse;

/// Transform Response<T, E> into Result<T, E>
impl<T, E> From<Response<T, E>> for Result<T, E>
where
    T: Serialize + PartialSchema + PartialOkResponse,
    E: Serialize + PartialSchema + Display + PartialErrResponse,
{
    fn from(value: Response<T, E>) -> Self {
        value.0
    }
}

/// Transform T into Response<T, E>
impl<T, E> From<Result<T, E>> for Response<T, E>
where
    T: Serialize + PartialSchema + PartialOkResponse,
    E: Serialize + PartialSchema + Display + PartialErrResponse,
{
    fn from(value: Result<T, E>) -> Self {
        Response(value)
    }
}

/// Serialize Response<T, E>
impl<T, E> Serialize for Response<T, E>
where
    T: Serialize + PartialSchema + PartialOkResponse,
    E: Serialize + PartialSchema + Display + PartialErrResponse + Clone + Into<ResponseError<E>>,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.0 {
            Ok(ok) => serializer.serialize_some(&ok),
            Err(err) => serializer.serialize_some(&err.clone().into()),
        }
    }
}

/// Serializes the JSON body, the status comes from the error code.
impl<T, E> Responder for Response<T, E>
where
    T: Serialize + PartialSchema + PartialOkResponse,
    E: Serialize + PartialSchema + Display + PartialErrResponse + Clone + Into<ResponseError<E>>,
{
    type Body = EitherBody<String>;

    fn respond_to(mut self, request: &HttpRequest) -> HttpResponse<Self::Body> {
        match serde_json::to_string(&self) {
            Ok(body) => {
                let code = match &self.0 {
                    Ok(_) => StatusCode::OK,
                    Err(e) => {
                        log::debug!("{} answered with {}: {}", request.path(), e.status_code(), e);

                        e.status_code()
                    }
                };

                let mut response = match HttpResponse::build(code)
                    .content_type(mime::APPLICATION_JSON)
                    .message_body(body)
                {
                    Ok(res) => res.map_into_left_body(),
                    Err(err) => HttpResponse::from_error(err).map_into_right_body(),
                };

                if let Ok(ok) = &mut self.0 {
                    ok.post_process(request, &mut response);
                }

                response
            }

            Err(err) => {
                log::error!("Unable to serialize response for {}: {}", request.path(), err);

                HttpResponse::from_error(JsonPayloadError::Serialize(err)).map_into_right_body()
            }
        }
    }
}

/// Successful response body.
///
/// `post_process` may adjust the built response, e.g. its status.
pub trait PartialOkResponse {
    fn post_process(
        &mut self,
        _request: &HttpRequest,
        _response: &mut HttpResponse<EitherBody<String>>,
    ) {
    }
}

impl PartialOkResponse for () {}

/// Error code of a route, with the status it is answered with.
pub trait PartialErrResponse {
    fn status_code(&self) -> StatusCode;
}

/// Body of an error response: the code and its human readable message.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ResponseError<T: Serialize + PartialSchema + Clone> {
    pub code: T,
    pub message: String,
}

impl<T> From<T> for ResponseError<T>
where
    T: Serialize + PartialSchema + Display + Clone,
{
    fn from(code: T) -> Self {
        Self {
            message: format!("{}", code),
            code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_macros::{ErrResponse, OkResponse};
    use actix_web::test::TestRequest;
    use derive_more::Display;
    use utoipa::ToSchema;

    #[derive(Serialize, ToSchema, OkResponse)]
    struct Body {
        value: u8,
    }

    #[derive(Clone, Serialize, Display, ToSchema, ErrResponse)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    #[status_code = "actix_web::http::StatusCode::BAD_REQUEST"]
    enum ErrorCode {
        #[display("Nothing here.")]
        #[status_code = "actix_web::http::StatusCode::NOT_FOUND"]
        Missing,

        #[display("Broken input.")]
        Broken,
    }

    fn respond(result: Result<Body, ErrorCode>) -> HttpResponse<EitherBody<String>> {
        Response(result).respond_to(&TestRequest::default().to_http_request())
    }

    #[test]
    fn status_codes() {
        assert_eq!(respond(Ok(Body { value: 1 })).status(), StatusCode::OK);
        assert_eq!(respond(Err(ErrorCode::Missing)).status(), StatusCode::NOT_FOUND);
        assert_eq!(respond(Err(ErrorCode::Broken)).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_body() {
        let body: Response<Body, ErrorCode> = Err(ErrorCode::Missing).into();

        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"code":"MISSING","message":"Nothing here."}"#
        );
    }
}
