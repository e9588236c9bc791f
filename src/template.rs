use std::sync::OnceLock;

use regex_lite::Regex;
use time::macros::format_description;
use time::OffsetDateTime;

pub const DATE_MARKER: &str = "<cs371date>";
pub const SERVER_MARKER: &str = "<cs371server>";

static MARKERS: OnceLock<Regex> = OnceLock::new();

fn markers() -> &'static Regex {
    MARKERS.get_or_init(|| {
        Regex::new(r"<cs371date>|<cs371server>").expect("fixed alternation always compiles")
    })
}

/// Server-side rendering of `<cs371date>`, readable text rather than an
/// inline script.
pub fn render_date(at: OffsetDateTime) -> String {
    let format = format_description!("[day]/[month]/[year] [hour]:[minute]:[second]");
    at.format(&format)
        .expect("formatting into a String cannot fail")
}

/// Replaces every marker occurrence on one line; marker-free text passes
/// through byte-for-byte. Explicit token matching, never positional
/// character scanning.
pub fn substitute_line(line: &str, date_text: &str, server_ident: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut tail_start = 0;

    for found in markers().find_iter(line) {
        out.push_str(&line[tail_start..found.start()]);
        match found.as_str() {
            DATE_MARKER => out.push_str(date_text),
            _ => out.push_str(server_ident),
        }
        tail_start = found.end();
    }
    out.push_str(&line[tail_start..]);

    out
}
