//! Campus fair host requests and university outreach.

use std::collections::HashSet;
use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::email_templates;
use crate::domain::ports::{
    AuditRepository, HostRequestRepository, UniversityRepository, UserRepository,
};
use crate::domain::validation::{field_error, optional_text};
use crate::domain::{
    AuditAction, AuditEntry, AuthenticatedUser, Error, HostRequest, HostRequestDraft,
    HostRequestId, HostRequestOutreach, HostRequestStatus, NotificationContent, NotificationKind,
    Notifier, OutreachId, OutreachInvitation, UniversityId, UniversityProfile, UniversityStaff,
    UserId,
};

const OUTREACH_MESSAGE_MAX: usize = 5000;

/// Host request and outreach service.
#[derive(Clone)]
pub struct OutreachService {
    host_requests: Arc<dyn HostRequestRepository>,
    universities: Arc<dyn UniversityRepository>,
    users: Arc<dyn UserRepository>,
    audit: Arc<dyn AuditRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl OutreachService {
    pub fn new(
        host_requests: Arc<dyn HostRequestRepository>,
        universities: Arc<dyn UniversityRepository>,
        users: Arc<dyn UserRepository>,
        audit: Arc<dyn AuditRepository>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            host_requests,
            universities,
            users,
            audit,
            notifier,
            clock,
        }
    }

    /// Public form: an organisation asks to host a campus fair.
    pub async fn submit_host_request(&self, draft: HostRequestDraft) -> Result<HostRequest, Error> {
        let request = HostRequest::submit(draft, self.clock.utc())?;
        self.host_requests.insert(&request).await?;
        info!(host_request_id = %request.id, "host request submitted");
        Ok(request)
    }

    pub async fn list_host_requests(
        &self,
        status: Option<HostRequestStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<HostRequest>, Error> {
        Ok(self.host_requests.list(status, offset, limit).await?)
    }

    async fn host_request(&self, id: &HostRequestId) -> Result<HostRequest, Error> {
        self.host_requests
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("host request not found"))
    }

    pub async fn update_host_request_status(
        &self,
        admin_id: UserId,
        id: &HostRequestId,
        status: HostRequestStatus,
    ) -> Result<HostRequest, Error> {
        let now = self.clock.utc();
        let mut request = self.host_request(id).await?;
        request.transition(status, now)?;
        self.host_requests.update(&request).await?;
        let entry = AuditEntry::new(
            Some(admin_id),
            AuditAction::HostRequestUpdated,
            "host_request",
            Some(request.id.to_string()),
            now,
        )
        .with_details(json!({ "status": status }));
        self.audit.record(&entry).await?;
        Ok(request)
    }

    /// Invite verified universities to an approved host request.
    ///
    /// Universities already invited are skipped; any unverified or unknown
    /// target fails the whole call with the offenders listed in `details`.
    pub async fn send_outreach(
        &self,
        admin_id: UserId,
        id: &HostRequestId,
        university_ids: &[UniversityId],
        message: Option<&str>,
    ) -> Result<Vec<HostRequestOutreach>, Error> {
        let now = self.clock.utc();
        let request = self.host_request(id).await?;
        if request.status != HostRequestStatus::Approved {
            return Err(Error::invalid_request(
                "outreach can only be sent for approved host requests",
            ));
        }
        if university_ids.is_empty() {
            return Err(field_error(
                "universityIds",
                "required",
                "at least one university is required",
            ));
        }
        let message = optional_text("message", message, OUTREACH_MESSAGE_MAX)?;

        let mut targets: Vec<UniversityProfile> = Vec::with_capacity(university_ids.len());
        let mut offenders = Vec::new();
        let mut seen = HashSet::new();
        for university_id in university_ids {
            if !seen.insert(*university_id) {
                continue;
            }
            match self.universities.find(university_id).await? {
                Some(university) if university.is_verified() => targets.push(university),
                _ => offenders.push(university_id.to_string()),
            }
        }
        if !offenders.is_empty() {
            return Err(
                Error::invalid_request("outreach can only target verified universities")
                    .with_details(json!({
                        "field": "universityIds",
                        "code": "not_verified",
                        "universityIds": offenders,
                    })),
            );
        }

        let already: HashSet<UniversityId> = self
            .host_requests
            .list_outreach_for_request(id)
            .await?
            .into_iter()
            .map(|row| row.university_id)
            .collect();
        targets.retain(|university| !already.contains(&university.id));
        let rows: Vec<HostRequestOutreach> = targets
            .iter()
            .map(|university| {
                HostRequestOutreach::send(request.id, university.id, message.clone(), admin_id, now)
            })
            .collect();
        if rows.is_empty() {
            return Ok(rows);
        }
        self.host_requests.insert_outreach(&rows).await?;
        let entry = AuditEntry::new(
            Some(admin_id),
            AuditAction::OutreachSent,
            "host_request",
            Some(request.id.to_string()),
            now,
        )
        .with_details(json!({ "universities": rows.len() }));
        self.audit.record(&entry).await?;

        for university in &targets {
            self.notifier
                .notify(
                    university.owner_user_id,
                    NotificationContent::new(
                        NotificationKind::OutreachReceived,
                        "Campus fair invitation",
                        format!(
                            "You are invited to a campus fair hosted by {}.",
                            request.organization_name
                        ),
                    )
                    .with_link("/university/outreach"),
                )
                .await?;
            if let Some(owner) = self.users.find_by_id(&university.owner_user_id).await? {
                self.notifier
                    .email(email_templates::outreach_invitation(
                        &owner.email,
                        &university.institution_name,
                        &request,
                        message.as_deref(),
                    ))
                    .await;
            }
        }
        info!(host_request_id = %request.id, sent = rows.len(), "outreach sent");
        Ok(rows)
    }

    /// Invitations received by the caller's institution.
    pub async fn list_outreach(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Vec<OutreachInvitation>, Error> {
        let staff = UniversityStaff::resolve(self.universities.as_ref(), user).await?;
        Ok(self
            .host_requests
            .list_outreach_for_university(&staff.university.id)
            .await?)
    }

    /// Accept or decline an invitation. Owner only, answered once.
    pub async fn respond_outreach(
        &self,
        user: &AuthenticatedUser,
        id: &OutreachId,
        accept: bool,
        note: Option<&str>,
    ) -> Result<HostRequestOutreach, Error> {
        let staff = UniversityStaff::resolve(self.universities.as_ref(), user).await?;
        staff.ensure_owner()?;
        let now = self.clock.utc();
        let mut outreach = match self.host_requests.find_outreach(id).await? {
            Some(outreach) if outreach.university_id == staff.university.id => outreach,
            _ => return Err(Error::not_found("invitation not found")),
        };
        outreach.respond(accept, note, now)?;
        self.host_requests.update_outreach(&outreach).await?;
        let entry = AuditEntry::new(
            Some(staff.user_id),
            AuditAction::OutreachResponded,
            "host_request_outreach",
            Some(outreach.id.to_string()),
            now,
        )
        .with_details(json!({ "status": outreach.status }));
        self.audit.record(&entry).await?;
        self.notifier
            .notify(
                outreach.sent_by,
                NotificationContent::new(
                    NotificationKind::OutreachResponded,
                    "Outreach answered",
                    format!(
                        "{} {} the campus fair invitation.",
                        staff.university.institution_name, outreach.status
                    ),
                )
                .with_link("/admin/host-requests"),
            )
            .await?;
        Ok(outreach)
    }
}

#[cfg(test)]
#[path = "outreach_service_tests.rs"]
mod tests;
