use actix_web::dev::{HttpServiceFactory, Service, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, test, web};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

pub async fn test_app<F, A: 'static>(
    app_state: web::Data<A>,
    factory: F,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
where
    F: HttpServiceFactory + 'static,
{
    test::init_service(App::new().app_data(app_state).service(factory)).await
}

/// POST request carrying a file as the raw body.
pub fn upload_request(uri: &str, body: Vec<u8>) -> actix_http::Request {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::CONTENT_TYPE, "application/octet-stream"))
        .set_payload(body)
        .to_request()
}

/// Percent-encoding of a query value, for names that are not plain ASCII.
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}
