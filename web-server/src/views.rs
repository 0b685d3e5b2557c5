// web-server/src/views.rs
use actix_web::{http::StatusCode, HttpResponse};
use serde_json::Value;

/// Server-rendered pages and the state each one needs
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Login {
        error: Option<String>,
        success: Option<String>,
    },
    Register {
        error: Option<String>,
        success: Option<String>,
    },
    Upload,
    Report {
        agents: Vec<Value>,
    },
}

impl View {
    pub fn login() -> Self {
        Self::Login { error: None, success: None }
    }

    pub fn register() -> Self {
        Self::Register { error: None, success: None }
    }
}

pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &View) -> String;
}

pub fn render_view(renderer: &dyn ViewRenderer, status: StatusCode, view: &View) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(mime::TEXT_HTML_UTF_8)
        .body(renderer.render(view))
}

/// Plain HTML pages. Styling and scripts live under the static assets directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlViews;

impl ViewRenderer for HtmlViews {
    fn render(&self, view: &View) -> String {
        match view {
            View::Login { error, success } => page(
                "Login",
                &format!(
                    "{}<form method=\"post\" action=\"/agent/login\">\
                     <input type=\"email\" name=\"email\" placeholder=\"Email\" required>\
                     <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\
                     <button type=\"submit\">Log in</button></form>\
                     <p><a href=\"/register\">Create an account</a></p>",
                    flash(error, success)
                ),
            ),
            View::Register { error, success } => page(
                "Register",
                &format!(
                    "{}<form method=\"post\" action=\"/agent/register\">\
                     <input name=\"firstName\" placeholder=\"First name\" required>\
                     <input name=\"lastName\" placeholder=\"Last name\" required>\
                     <input type=\"email\" name=\"email\" placeholder=\"Email\" required>\
                     <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\
                     <button type=\"submit\">Register</button></form>\
                     <p><a href=\"/\">Back to login</a></p>",
                    flash(error, success)
                ),
            ),
            View::Upload => page(
                "Upload agents",
                "<form method=\"post\" action=\"/agent/upload\" enctype=\"multipart/form-data\">\
                 <input type=\"file\" name=\"file\" accept=\".xlsx,.xls,.csv\" required>\
                 <button type=\"submit\">Upload</button></form>\
                 <p><a href=\"/agent/report\">View report</a></p>\
                 <form method=\"post\" action=\"/agent/logout\"><button type=\"submit\">Log out</button></form>",
            ),
            View::Report { agents } => page("Agents report", &report_table(agents)),
        }
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <link rel=\"stylesheet\" href=\"/css/style.css\"></head>\
         <body><h1>{title}</h1>{body}</body></html>",
        title = escape_html(title),
        body = body
    )
}

fn flash(error: &Option<String>, success: &Option<String>) -> String {
    let mut out = String::new();
    if let Some(error) = error {
        out.push_str(&format!("<p class=\"error\">{}</p>", escape_html(error)));
    }
    if let Some(success) = success {
        out.push_str(&format!("<p class=\"success\">{}</p>", escape_html(success)));
    }
    out
}

fn report_table(agents: &[Value]) -> String {
    if agents.is_empty() {
        return "<p>No agents found.</p>".to_string();
    }

    // Columns follow the first row's keys
    let columns: Vec<&String> = match &agents[0] {
        Value::Object(map) => map.keys().collect(),
        _ => Vec::new(),
    };

    let mut html = String::from("<table id=\"agents\"><thead><tr>");
    for column in &columns {
        html.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    html.push_str("</tr></thead><tbody>");

    for agent in agents {
        html.push_str("<tr>");
        for column in &columns {
            let cell = match agent.get(column.as_str()) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            html.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_shows_escaped_error() {
        let html = HtmlViews.render(&View::Login {
            error: Some("<b>bad</b> credentials".into()),
            success: None,
        });
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt; credentials"));
        assert!(!html.contains("class=\"success\""));
    }

    #[test]
    fn report_lists_agents() {
        let html = HtmlViews.render(&View::Report {
            agents: vec![
                json!({"name": "Kofi", "branch_id": 4}),
                json!({"name": "Ama", "branch_id": null}),
            ],
        });
        assert!(html.contains("<th>name</th>"));
        assert!(html.contains("<td>Kofi</td>"));
        assert!(html.contains("<td>4</td>"));
    }

    #[test]
    fn empty_report_has_placeholder() {
        let html = HtmlViews.render(&View::Report { agents: vec![] });
        assert!(html.contains("No agents found."));
    }
}
