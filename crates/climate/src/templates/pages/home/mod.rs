use maud::{html, Markup};

use crate::templates::layouts::{base, PageConfig};

/// Route templates advertised on the landing page, in display order.
pub const AVAILABLE_ROUTES: [&str; 5] = [
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/<start>",
    "/api/v1.0/<start>/<end>",
];

pub fn home_page(api_base: &str) -> Markup {
    let config = PageConfig {
        title: "Hawaii Climate API",
        api_base,
    };

    base(&config, content(api_base))
}

fn content(api_base: &str) -> Markup {
    html! {
        h1 { "Hawaii Climate API" }
        p { "Available Routes:" }
        ul {
            @for route in AVAILABLE_ROUTES {
                li { code { (api_base) (route) } }
            }
        }
        p {
            "Dates use the YYYY-MM-DD format. "
            "Omitting <end> computes statistics through the latest observation."
        }
    }
}
