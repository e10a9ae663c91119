//! Server-rendered HTML for the public site and the backoffice.

use std::fmt::Write as _;

use crate::contact::ContactSubmission;
use crate::records::{LeavePeriod, Popup};

pub const SITE_NAME: &str = "Praktijk";

/// Outcome banner shown above a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    fn render(&self) -> String {
        let (class, text) = match self {
            Notice::Success(text) => ("notice notice-success", text),
            Notice::Error(text) => ("notice notice-error", text),
        };
        format!(
            "<div class=\"{class}\" role=\"status\">{}</div>\n",
            escape_html(text)
        )
    }
}

/// State needed to render the contact page.
#[derive(Debug, Clone, Default)]
pub struct ContactView {
    pub leave_periods: Vec<LeavePeriod>,
    pub notice: Option<Notice>,
    pub values: ContactSubmission,
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>\n<html lang=\"nl\">\n<head>");
    let _ = writeln!(html, "<meta charset=\"utf-8\">");
    let _ = writeln!(
        html,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
    );
    let _ = writeln!(
        html,
        "<title>{} | {SITE_NAME}</title>",
        escape_html(title)
    );
    let _ = writeln!(
        html,
        "<link rel=\"stylesheet\" href=\"/css/style.css\">\n</head>\n<body>"
    );
    html.push_str(
        "<header class=\"navbar\">\n<a class=\"brand\" href=\"/\">Praktijk</a>\n\
         <nav>\n\
         <a class=\"nav-link\" href=\"/\">Home</a>\n\
         <a class=\"nav-link\" href=\"/treatments\">Behandelingen</a>\n\
         <a class=\"nav-link\" href=\"/info\">Informatie</a>\n\
         <a class=\"nav-link\" href=\"/contact\">Contact</a>\n\
         </nav>\n</header>\n<main>\n",
    );
    html.push_str(body);
    html.push_str(
        "</main>\n<footer>\n<p>&copy; Praktijk</p>\n</footer>\n</body>\n</html>\n",
    );
    html
}

pub fn home(popups: &[Popup]) -> String {
    let mut body = String::new();
    for popup in popups {
        let _ = writeln!(
            body,
            "<aside class=\"popup\" data-popup-id=\"{}\">\n<h2>{}</h2>\n<p>{}</p>\n</aside>",
            popup.id,
            escape_html(&popup.title),
            escape_html(&popup.content)
        );
    }
    body.push_str(
        "<section class=\"hero\">\n<h1>Welkom bij de praktijk</h1>\n\
         <p>Persoonlijke zorg, dicht bij huis.</p>\n\
         <a class=\"button\" href=\"/contact\">Maak een afspraak</a>\n</section>\n",
    );
    layout("Home", &body)
}

pub fn treatments() -> String {
    layout(
        "Behandelingen",
        "<section>\n<h1>Behandelingen</h1>\n\
         <p>Een overzicht van onze behandelingen. Neem contact op voor advies op maat.</p>\n\
         </section>\n",
    )
}

pub fn info() -> String {
    layout(
        "Informatie",
        "<section>\n<h1>Informatie</h1>\n\
         <p>Praktische informatie over afspraken, tarieven en vergoedingen.</p>\n\
         </section>\n",
    )
}

pub fn contact(view: &ContactView) -> String {
    let mut body = String::from("<section>\n<h1>Contact</h1>\n");

    if !view.leave_periods.is_empty() {
        body.push_str("<div class=\"leave-periods\">\n<h2>Afwezigheid</h2>\n<ul>\n");
        for period in &view.leave_periods {
            let _ = writeln!(
                body,
                "<li><strong>{}</strong>: {} t/m {}</li>",
                escape_html(&period.name),
                escape_html(&period.start_date),
                escape_html(&period.end_date)
            );
        }
        body.push_str("</ul>\n</div>\n");
    }

    if let Some(notice) = &view.notice {
        body.push_str(&notice.render());
    }

    let values = &view.values;
    body.push_str("<form method=\"post\" action=\"/contact\" class=\"contact-form\">\n");
    for (name, label, kind, value) in [
        ("name", "Naam", "text", &values.name),
        ("email", "E-mail", "email", &values.email),
        ("phone", "Telefoon", "tel", &values.phone),
        ("subject", "Onderwerp", "text", &values.subject),
    ] {
        let _ = writeln!(
            body,
            "<label for=\"{name}\">{label}</label>\n\
             <input id=\"{name}\" name=\"{name}\" type=\"{kind}\" value=\"{}\" required>",
            escape_html(value)
        );
    }
    let _ = writeln!(
        body,
        "<label for=\"message\">Bericht</label>\n\
         <textarea id=\"message\" name=\"message\" rows=\"6\" required>{}</textarea>",
        escape_html(&values.message)
    );
    body.push_str("<button type=\"submit\">Verstuur</button>\n</form>\n</section>\n");

    layout("Contact", &body)
}

pub fn login(error: Option<&str>) -> String {
    let mut body = String::from("<section class=\"backoffice\">\n<h1>Backoffice</h1>\n");
    if let Some(error) = error {
        body.push_str(&Notice::Error(error.to_string()).render());
    }
    body.push_str(
        "<form method=\"post\" action=\"/backoffice/login\">\n\
         <label for=\"username\">Gebruikersnaam</label>\n\
         <input id=\"username\" name=\"username\" autocomplete=\"username\" required>\n\
         <label for=\"password\">Wachtwoord</label>\n\
         <input id=\"password\" name=\"password\" type=\"password\" autocomplete=\"current-password\" required>\n\
         <button type=\"submit\">Inloggen</button>\n</form>\n</section>\n",
    );
    layout("Inloggen", &body)
}

fn backoffice_nav() -> &'static str {
    "<nav class=\"backoffice-nav\">\n\
     <a href=\"/backoffice\">Dashboard</a>\n\
     <a href=\"/backoffice/verlof\">Verlof</a>\n\
     <a href=\"/backoffice/popups\">Popups</a>\n\
     <a href=\"/backoffice/logout\">Uitloggen</a>\n</nav>\n"
}

pub fn dashboard(username: &str, leave_count: usize, popup_count: usize, active: usize) -> String {
    let mut body = String::from("<section class=\"backoffice\">\n");
    body.push_str(backoffice_nav());
    let _ = writeln!(
        body,
        "<h1>Dashboard</h1>\n<p>Ingelogd als <strong>{}</strong>.</p>\n<ul>\n\
         <li>{leave_count} verlofperiode(s)</li>\n\
         <li>{popup_count} popup(s), waarvan {active} actief</li>\n</ul>\n</section>",
        escape_html(username)
    );
    layout("Dashboard", &body)
}

pub fn leave_admin(periods: &[LeavePeriod]) -> String {
    let mut body = String::from("<section class=\"backoffice\">\n");
    body.push_str(backoffice_nav());
    body.push_str("<h1>Verlof</h1>\n");
    body.push_str(
        "<form method=\"post\" action=\"/backoffice/verlof/add\">\n\
         <label for=\"name\">Omschrijving</label>\n<input id=\"name\" name=\"name\">\n\
         <label for=\"startDate\">Van</label>\n<input id=\"startDate\" name=\"startDate\" type=\"date\" required>\n\
         <label for=\"endDate\">Tot en met</label>\n<input id=\"endDate\" name=\"endDate\" type=\"date\" required>\n\
         <button type=\"submit\">Toevoegen</button>\n</form>\n",
    );

    if periods.is_empty() {
        body.push_str("<p>Er zijn geen verlofperiodes.</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>Omschrijving</th><th>Van</th><th>Tot en met</th><th></th></tr>\n");
        for period in periods {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>\
                 <form method=\"post\" action=\"/backoffice/verlof/delete/{}\">\
                 <button type=\"submit\">Verwijderen</button></form></td></tr>",
                escape_html(&period.name),
                escape_html(&period.start_date),
                escape_html(&period.end_date),
                period.id
            );
        }
        body.push_str("</table>\n");
    }
    body.push_str("</section>\n");
    layout("Verlof beheren", &body)
}

pub fn popups_admin(popups: &[Popup]) -> String {
    let mut body = String::from("<section class=\"backoffice\">\n");
    body.push_str(backoffice_nav());
    body.push_str("<h1>Popups</h1>\n");
    body.push_str(
        "<form method=\"post\" action=\"/backoffice/popups/add\">\n\
         <label for=\"title\">Titel</label>\n<input id=\"title\" name=\"title\" required>\n\
         <label for=\"content\">Inhoud</label>\n<textarea id=\"content\" name=\"content\" rows=\"4\" required></textarea>\n\
         <label><input type=\"checkbox\" name=\"active\"> Direct tonen</label>\n\
         <button type=\"submit\">Toevoegen</button>\n</form>\n",
    );

    if popups.is_empty() {
        body.push_str("<p>Er zijn geen popups.</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>Titel</th><th>Inhoud</th><th>Status</th><th></th></tr>\n");
        for popup in popups {
            let (status, action) = if popup.active {
                ("Actief", "Uitzetten")
            } else {
                ("Inactief", "Aanzetten")
            };
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{status}</td><td>\
                 <form method=\"post\" action=\"/backoffice/popups/toggle/{id}\">\
                 <button type=\"submit\">{action}</button></form>\
                 <form method=\"post\" action=\"/backoffice/popups/delete/{id}\">\
                 <button type=\"submit\">Verwijderen</button></form></td></tr>",
                escape_html(&popup.title),
                escape_html(&popup.content),
                id = popup.id
            );
        }
        body.push_str("</table>\n");
    }
    body.push_str("</section>\n");
    layout("Popups beheren", &body)
}

pub fn not_found() -> String {
    layout(
        "Niet gevonden",
        "<section>\n<h1>Pagina niet gevonden</h1>\n\
         <p>De pagina die u zoekt bestaat niet (meer).</p>\n\
         <a class=\"button\" href=\"/\">Terug naar home</a>\n</section>\n",
    )
}

pub fn server_error() -> String {
    layout(
        "Fout",
        "<section>\n<h1>Er ging iets mis</h1>\n\
         <p>Uw verzoek kon niet worden verwerkt. Probeer het later opnieuw.</p>\n</section>\n",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn escapes_markup_in_user_content() {
        let popup = Popup {
            id: 7,
            title: "<script>alert(1)</script>".to_string(),
            content: "Tom & \"Jerry\"".to_string(),
            active: true,
            created_at: Utc::now(),
        };
        let html = home(&[popup]);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Tom &amp; &quot;Jerry&quot;"));
    }

    #[test]
    fn contact_page_keeps_submitted_values_and_notice() {
        let view = ContactView {
            leave_periods: Vec::new(),
            notice: Some(Notice::Error("Vul alstublieft alle velden in.".to_string())),
            values: ContactSubmission {
                name: "Anna".to_string(),
                ..ContactSubmission::default()
            },
        };
        let html = contact(&view);
        assert!(html.contains("value=\"Anna\""));
        assert!(html.contains("notice-error"));
        assert!(!html.contains("Afwezigheid"));
    }
}
