pub mod user_routes;
