use chrono::{Datelike, Local};

use crate::dom;

pub fn update_copyright_year() {
    if let Some(year) = dom::document().and_then(|d| d.get_element_by_id("current-year")) {
        year.set_text_content(Some(&Local::now().year().to_string()));
    }
}
