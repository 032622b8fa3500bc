//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod auth;
pub mod courses;
pub mod departments;
pub mod dto;
pub mod enrollments;
pub mod error;
pub mod health;
pub mod instructors;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod settings;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` route on `cfg`.
///
/// Fixed segments such as `/departments/match` are registered ahead of the
/// `{id}` routes that share their prefix.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(users::logout)
        .service(users::current_user_profile)
        .service(users::list_users)
        .service(users::update_user)
        .service(instructors::assign_departments)
        .service(instructors::unassign_department)
        .service(instructors::list_departments)
        .service(instructors::assign_courses)
        .service(instructors::unassign_course)
        .service(instructors::list_courses)
        .service(instructors::list_students)
        .service(departments::match_department)
        .service(departments::list_departments)
        .service(departments::create_department)
        .service(departments::update_department)
        .service(departments::delete_department)
        .service(courses::unassigned_courses)
        .service(courses::backfill_departments)
        .service(courses::list_courses)
        .service(courses::create_course)
        .service(courses::update_course)
        .service(enrollments::enroll)
        .service(settings::get_settings)
        .service(settings::update_settings);
}
