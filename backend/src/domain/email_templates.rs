//! Plain-text transactional email templates.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{EmailAddress, FullName, HostRequest, Meeting, TimeWindow};

/// A rendered email ready for the [`EmailSender`](super::ports::EmailSender).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: EmailAddress,
    pub subject: String,
    pub text_body: String,
}

impl EmailMessage {
    fn new(to: &EmailAddress, subject: impl Into<String>, text_body: String) -> Self {
        Self {
            to: to.clone(),
            subject: subject.into(),
            text_body,
        }
    }
}

fn when(window: &TimeWindow) -> String {
    format!(
        "{} to {} UTC",
        window.starts_at.format("%A %-d %B %Y, %H:%M"),
        window.ends_at.format("%H:%M")
    )
}

/// Welcome email for a new student.
pub fn student_welcome(to: &EmailAddress, name: &FullName) -> EmailMessage {
    EmailMessage::new(
        to,
        "Welcome to edUmeetup",
        format!(
            "Hi {name},\n\nYour student account is ready. Complete your profile so \
             universities can learn about you, then browse institutions and book \
             meetings with their admissions teams.\n"
        ),
    )
}

/// Welcome email for a new university owner.
pub fn university_welcome(to: &EmailAddress, name: &FullName, institution: &str) -> EmailMessage {
    EmailMessage::new(
        to,
        "Your university registration is under review",
        format!(
            "Hi {name},\n\nThanks for registering {institution}. Our team will review \
             the registration and email you once it has been verified.\n"
        ),
    )
}

/// Credentials for a newly created representative.
pub fn rep_invitation(
    to: &EmailAddress,
    name: &FullName,
    institution: &str,
    temporary_password: &str,
    login_url: &str,
) -> EmailMessage {
    EmailMessage::new(
        to,
        format!("You have been added as a representative of {institution}"),
        format!(
            "Hi {name},\n\nAn account has been created for you to represent \
             {institution} on edUmeetup.\n\nSign in at {login_url} with this \
             temporary password and change it after your first login:\n\n    \
             {temporary_password}\n"
        ),
    )
}

/// The institution was verified.
pub fn verification_approved(to: &EmailAddress, institution: &str) -> EmailMessage {
    EmailMessage::new(
        to,
        format!("{institution} is now verified"),
        format!(
            "Good news: {institution} has been verified. Students can now find your \
             institution, express interest and book meetings.\n"
        ),
    )
}

/// The institution was rejected.
pub fn verification_rejected(to: &EmailAddress, institution: &str, reason: &str) -> EmailMessage {
    EmailMessage::new(
        to,
        format!("{institution} could not be verified"),
        format!(
            "We were unable to verify {institution}.\n\nReason: {reason}\n\nReply to \
             this email or open a support ticket if you would like us to review the \
             registration again.\n"
        ),
    )
}

/// A student asked for a meeting.
pub fn meeting_requested(to: &EmailAddress, student: &FullName, meeting: &Meeting) -> EmailMessage {
    EmailMessage::new(
        to,
        "New meeting request",
        format!(
            "{student} requested a {} meeting on {}.\n\nConfirm or decline it from \
             your dashboard.\n",
            meeting.purpose,
            when(&meeting.window)
        ),
    )
}

/// Staff confirmed a meeting.
pub fn meeting_confirmed(to: &EmailAddress, institution: &str, meeting: &Meeting) -> EmailMessage {
    let link = meeting
        .meeting_link
        .as_deref()
        .map(|link| format!("\nJoin here: {link}\n"))
        .unwrap_or_default();
    EmailMessage::new(
        to,
        format!("Your meeting with {institution} is confirmed"),
        format!(
            "Your meeting with {institution} on {} is confirmed.\n{link}",
            when(&meeting.window)
        ),
    )
}

/// A meeting was cancelled by the other party.
pub fn meeting_cancelled(to: &EmailAddress, meeting: &Meeting) -> EmailMessage {
    let reason = meeting.cancellation_reason.as_deref().unwrap_or("no reason given");
    EmailMessage::new(
        to,
        "A meeting was cancelled",
        format!(
            "The meeting on {} has been cancelled.\n\nReason: {reason}\n",
            when(&meeting.window)
        ),
    )
}

/// Reminder sent to a student within a day of a confirmed meeting.
pub fn meeting_reminder(to: &EmailAddress, institution: &str, meeting: &Meeting) -> EmailMessage {
    EmailMessage::new(
        to,
        format!("Reminder: meeting with {institution}"),
        format!(
            "This is a reminder of your meeting with {institution} on {}.\n",
            when(&meeting.window)
        ),
    )
}

/// Nudge to a university that has not answered a request.
pub fn pending_request_nudge(to: &EmailAddress, meeting: &Meeting) -> EmailMessage {
    EmailMessage::new(
        to,
        "A meeting request is waiting for you",
        format!(
            "A student's meeting request for {} is still pending. Please confirm or \
             cancel it so the student can plan ahead.\n",
            when(&meeting.window)
        ),
    )
}

/// Nudge to a student who has not completed their profile.
pub fn incomplete_profile(to: &EmailAddress, name: &FullName) -> EmailMessage {
    EmailMessage::new(
        to,
        "Finish setting up your profile",
        format!(
            "Hi {name},\n\nUniversities look at your profile before meetings. It only \
             takes a couple of minutes to complete.\n"
        ),
    )
}

/// Invitation to take part in a campus fair.
pub fn outreach_invitation(
    to: &EmailAddress,
    institution: &str,
    request: &HostRequest,
    message: Option<&str>,
) -> EmailMessage {
    let note = message.map(|m| format!("\n{m}\n")).unwrap_or_default();
    EmailMessage::new(
        to,
        format!("Campus fair invitation: {}", request.organization_name),
        format!(
            "{institution} is invited to a campus fair hosted by {} in {}, {} for \
             about {} students.\n{note}\nAnswer the invitation from your dashboard.\n",
            request.organization_name, request.city, request.country, request.expected_students
        ),
    )
}

/// Confirmation that an account will be deleted.
pub fn deletion_confirmation(
    to: &EmailAddress,
    name: &FullName,
    hard_delete_after: DateTime<Utc>,
) -> EmailMessage {
    EmailMessage::new(
        to,
        "Your account deletion request",
        format!(
            "Hi {name},\n\nYour account has been deactivated. All of your data will be \
             permanently deleted after {}.\n",
            hard_delete_after.format("%-d %B %Y")
        ),
    )
}
