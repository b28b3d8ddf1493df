use super::{CATCH_ALL, RouteDescriptor, Section};

pub const NOT_FOUND_PATH: &str = "/404";

pub fn routes() -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor::page(NOT_FOUND_PATH, "404", "404", Section::Error),
        RouteDescriptor::redirect(CATCH_ALL, NOT_FOUND_PATH, Section::Error),
    ]
}
