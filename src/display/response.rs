//! Response formatting

use crate::http::Response;

/// Status line, headers and pretty-printed body
pub fn format_response(response: &Response) -> String {
    let mut output = format!("HTTP {} {}\n", response.status, reason(response.status));
    for (name, value) in &response.headers {
        output.push_str(&format!("{}: {}\n", name, value));
    }

    if let Some(data) = &response.data {
        output.push('\n');
        match serde_json::to_string_pretty(data) {
            Ok(body) => output.push_str(&body),
            Err(_) => output.push_str(&data.to_string()),
        }
        output.push('\n');
    }
    output
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "",
    }
}
