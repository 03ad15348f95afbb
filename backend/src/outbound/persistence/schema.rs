//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a migration
//! changes a table, update the matching block here (`diesel print-schema`
//! produces the same output from a live database).

diesel::table! {
    /// Accounts of every role. `email` is unique.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        full_name -> Varchar,
        role -> Varchar,
        password_hash -> Text,
        is_active -> Bool,
        deletion_requested_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One profile per student, keyed by the student's user id.
    student_profiles (user_id) {
        user_id -> Uuid,
        country -> Varchar,
        city -> Nullable<Varchar>,
        current_status -> Varchar,
        field_of_interest -> Varchar,
        preferred_degree -> Varchar,
        budget_range -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        cv_key -> Nullable<Text>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Institutions, each owned by exactly one `UNIVERSITY` user.
    universities (id) {
        id -> Uuid,
        owner_user_id -> Uuid,
        institution_name -> Varchar,
        country -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        website -> Nullable<Text>,
        description -> Nullable<Text>,
        logo_key -> Nullable<Text>,
        brochure_key -> Nullable<Text>,
        verification_status -> Varchar,
        rejection_reason -> Nullable<Text>,
        verified_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Links a `UNIVERSITY_REP` user to the institution they represent.
    university_reps (user_id) {
        user_id -> Uuid,
        university_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    programs (id) {
        id -> Uuid,
        university_id -> Uuid,
        name -> Varchar,
        degree_level -> Varchar,
        field_category -> Varchar,
        tuition_fee_usd -> Nullable<Int4>,
        duration_months -> Int4,
        intakes -> Array<Text>,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student interest in a university; one row per pair.
    interests (student_id, university_id) {
        student_id -> Uuid,
        university_id -> Uuid,
        program_id -> Nullable<Uuid>,
        note -> Nullable<Text>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    availability_profiles (university_id) {
        university_id -> Uuid,
        meeting_duration_minutes -> Int4,
        buffer_minutes -> Int4,
        min_notice_hours -> Int4,
        booking_window_days -> Int4,
        utc_offset_minutes -> Int4,
        is_active -> Bool,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Weekly windows in the university's local minutes since midnight.
    availability_slots (university_id, weekday, start_minute) {
        university_id -> Uuid,
        weekday -> Varchar,
        start_minute -> Int4,
        end_minute -> Int4,
    }
}

diesel::table! {
    /// Meetings between a student and a university.
    ///
    /// Partial unique indexes reject two live meetings starting at the same
    /// instant for one university or one student.
    meetings (id) {
        id -> Uuid,
        student_id -> Uuid,
        university_id -> Uuid,
        rep_id -> Nullable<Uuid>,
        program_id -> Nullable<Uuid>,
        starts_at -> Timestamptz,
        ends_at -> Timestamptz,
        status -> Varchar,
        purpose -> Varchar,
        student_note -> Nullable<Text>,
        meeting_link -> Nullable<Text>,
        cancellation_reason -> Nullable<Text>,
        cancelled_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        kind -> Varchar,
        title -> Varchar,
        message -> Text,
        link -> Nullable<Text>,
        read_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    support_tickets (id) {
        id -> Uuid,
        user_id -> Nullable<Uuid>,
        email -> Varchar,
        subject -> Varchar,
        message -> Text,
        category -> Varchar,
        status -> Varchar,
        admin_note -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    host_requests (id) {
        id -> Uuid,
        organization_name -> Varchar,
        contact_name -> Varchar,
        contact_email -> Varchar,
        city -> Varchar,
        country -> Varchar,
        expected_students -> Int4,
        preferred_dates -> Nullable<Text>,
        message -> Nullable<Text>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Campus fair invitations; unique per (request, university).
    host_request_outreach (id) {
        id -> Uuid,
        host_request_id -> Uuid,
        university_id -> Uuid,
        status -> Varchar,
        message -> Nullable<Text>,
        response_note -> Nullable<Text>,
        sent_by -> Uuid,
        sent_at -> Timestamptz,
        responded_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only audit trail. `actor_id` is not a foreign key.
    audit_logs (id) {
        id -> Uuid,
        actor_id -> Nullable<Uuid>,
        action -> Varchar,
        entity_type -> Varchar,
        entity_id -> Nullable<Text>,
        details -> Nullable<Jsonb>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    system_logs (id) {
        id -> Uuid,
        level -> Varchar,
        source -> Varchar,
        message -> Text,
        context -> Nullable<Jsonb>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(student_profiles -> users (user_id));
diesel::joinable!(universities -> users (owner_user_id));
diesel::joinable!(university_reps -> users (user_id));
diesel::joinable!(university_reps -> universities (university_id));
diesel::joinable!(programs -> universities (university_id));
diesel::joinable!(interests -> universities (university_id));
diesel::joinable!(interests -> users (student_id));
diesel::joinable!(availability_slots -> availability_profiles (university_id));
diesel::joinable!(meetings -> universities (university_id));
diesel::joinable!(notifications -> users (user_id));
diesel::joinable!(host_request_outreach -> host_requests (host_request_id));
diesel::joinable!(host_request_outreach -> universities (university_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    student_profiles,
    universities,
    university_reps,
    programs,
    interests,
    availability_profiles,
    availability_slots,
    meetings,
    notifications,
    support_tickets,
    host_requests,
    host_request_outreach,
    audit_logs,
    system_logs,
);
