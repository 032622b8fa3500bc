//! Diesel table definitions for the catalog and directory store.
//!
//! Kept in step with `migrations/`; regenerate with `diesel print-schema`
//! after changing a migration.

diesel::table! {
    departments (id) {
        id -> Uuid,
        #[max_length = 10]
        code -> Varchar,
        #[max_length = 200]
        name -> Varchar,
        description -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    users (id) {
        id -> Uuid,
        #[max_length = 320]
        email -> Varchar,
        #[max_length = 100]
        display_name -> Varchar,
        #[max_length = 16]
        role -> Varchar,
        #[max_length = 32]
        student_number -> Nullable<Varchar>,
        department_id -> Nullable<Uuid>,
        password_hash -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    courses (id) {
        id -> Uuid,
        #[max_length = 20]
        code -> Varchar,
        #[max_length = 200]
        name -> Varchar,
        department_id -> Nullable<Uuid>,
        instructor_id -> Nullable<Uuid>,
        #[max_length = 8]
        semester -> Varchar,
        year -> Int4,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    instructor_departments (instructor_id, department_id) {
        instructor_id -> Uuid,
        department_id -> Uuid,
        is_primary -> Bool,
        assigned_by -> Nullable<Uuid>,
        assigned_at -> Timestamptz,
        position -> Int4,
    }
}

diesel::table! {
    instructor_courses (instructor_id, course_id) {
        instructor_id -> Uuid,
        course_id -> Uuid,
        is_primary -> Bool,
        assigned_by -> Nullable<Uuid>,
        assigned_at -> Timestamptz,
    }
}

diesel::table! {
    enrollments (student_id, course_id) {
        student_id -> Uuid,
        course_id -> Uuid,
        #[max_length = 16]
        status -> Varchar,
        #[max_length = 8]
        grade -> Nullable<Varchar>,
        enrolled_at -> Timestamptz,
    }
}

diesel::table! {
    system_settings (id) {
        id -> Int2,
        #[max_length = 10]
        default_department_code -> Varchar,
        #[max_length = 8]
        current_semester -> Varchar,
        current_year -> Int4,
        allow_self_enrollment -> Bool,
        revision -> Int4,
        updated_by -> Nullable<Uuid>,
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(enrollments -> courses (course_id));

diesel::allow_tables_to_appear_in_same_query!(
    courses,
    departments,
    enrollments,
    instructor_courses,
    instructor_departments,
    system_settings,
    users,
);
