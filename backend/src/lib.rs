pub mod auth;
pub mod catchers;
pub mod config;
pub mod cors;
pub mod error;
pub mod processor;
pub mod rate_limiter;
pub mod repository;
pub mod routes;
pub mod store;
pub mod utils;

use rocket::{catchers, routes, Build, Rocket};

use crate::{config::Config, cors::Cors, routes::AppState};

/// Assembles the API with its state, ready to launch.
pub fn build_rocket(config: &Config, state: AppState) -> Rocket<Build> {
    rocket::build()
        .attach(Cors::new(config.allowed_origins.clone()))
        .manage(state)
        .mount(
            "/api",
            routes![
                routes::health,
                routes::all_options,
                routes::list_employees,
                routes::create_employee,
                routes::get_employee,
                routes::update_employee,
                routes::delete_employee,
                routes::list_votes,
                routes::create_vote,
                routes::get_vote,
                routes::cast_ballot,
                routes::get_results,
            ],
        )
        .register(
            "/",
            catchers![
                catchers::bad_request,
                catchers::unauthorized,
                catchers::not_found,
                catchers::unprocessable,
                catchers::internal_error,
            ],
        )
}
