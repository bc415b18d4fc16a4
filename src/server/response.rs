//! Writes a [`HandlerResponse`] onto a `may_minihttp::Response`.

use crate::handler::HandlerResponse;
use may_minihttp::Response;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

pub fn write_response(res: &mut Response, handler_response: HandlerResponse) {
    res.status_code(handler_response.status as usize, status_reason(handler_response.status));
    for (name, value) in &handler_response.headers {
        let header: &'static str = Box::leak(format!("{name}: {value}").into_boxed_str());
        res.header(header);
    }
    res.body_vec(handler_response.body);
}
